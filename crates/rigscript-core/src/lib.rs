//! rigscript Core Library
//!
//! Common types, the unified error type, the axis-convention mapper and
//! tracing setup shared by the rigscript crates.

pub mod coords;
pub mod error;
pub mod logging;
pub mod types;

pub use error::{Error, Result, ResultExt};
pub use types::*;

