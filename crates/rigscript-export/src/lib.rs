//! rigscript Export Pipeline
//!
//! Renders a captured skinned mesh as a Blender Python script:
//! - `model` style: the `model` mapping read by the importer add-on
//! - `builder` style: the mapping plus functions that build the mesh,
//!   armature and skin when run inside Blender

pub mod script;
pub mod session;

pub use script::{LineWrap, ScriptExportOptions, ScriptModel, ScriptStyle, GENERATOR};
pub use session::{ExportReport, ExportSession, STDOUT_DESTINATION};
