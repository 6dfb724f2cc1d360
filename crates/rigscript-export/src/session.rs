//! Export session: capture once, render, write atomically
//!
//! Nothing touches the destination until the whole script is rendered. The
//! file is written to a temporary sibling and renamed into place, so a
//! failed export never leaves a partial script behind.

use rigscript_core::logging::instrument;
use rigscript_core::{Error, Result, ResultExt};
use rigscript_rig::{
    GeometrySnapshot, MeshProvider, RigAnalysis, RigDiagnostics, SkeletonModel, SkeletonProvider,
};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use crate::script::{write_script, ScriptExportOptions, ScriptHeader, ScriptModel};

/// Destination name that selects standard output
pub const STDOUT_DESTINATION: &str = "-";

/// Summary of one export
#[derive(Debug, Clone, Serialize)]
pub struct ExportReport {
    pub mesh: String,
    pub vertices: usize,
    pub triangles: usize,
    pub submeshes: usize,
    pub registered_bones: usize,
    pub bones: usize,
    pub vertex_groups: usize,
    pub root_bone: Option<String>,
    pub diagnostics: RigDiagnostics,
    /// Where the script went (`None` when rendered to a caller's writer)
    pub destination: Option<PathBuf>,
    pub bytes: usize,
}

/// Captured mesh and rig, ready to render
#[derive(Debug, Clone)]
pub struct ExportSession {
    geometry: GeometrySnapshot,
    rig: RigAnalysis,
}

impl ExportSession {
    /// Capture and analyze everything the script needs
    ///
    /// Input is validated here, before any output is opened.
    pub fn prepare<P>(provider: &P) -> Result<Self>
    where
        P: MeshProvider + SkeletonProvider,
    {
        let mesh = provider.mesh_name().to_string();

        let geometry = instrument("capture_geometry", || GeometrySnapshot::capture(provider))
            .with_context(|| format!("capturing mesh '{}'", mesh))?;
        let skeleton = instrument("capture_skeleton", || SkeletonModel::capture(provider))
            .with_context(|| format!("capturing skeleton of '{}'", mesh))?;
        let rig = instrument("analyze_rig", || RigAnalysis::analyze(skeleton, &geometry.weights));

        Ok(Self { geometry, rig })
    }

    /// Captured geometry
    pub fn geometry(&self) -> &GeometrySnapshot {
        &self.geometry
    }

    /// Root, bones and vertex groups
    pub fn rig(&self) -> &RigAnalysis {
        &self.rig
    }

    /// The `model` mapping in target space
    pub fn model(&self) -> ScriptModel {
        ScriptModel::build(&self.geometry, &self.rig)
    }

    /// Render the script to memory
    pub fn render(&self, options: &ScriptExportOptions) -> Result<Vec<u8>> {
        if options.require_skeleton {
            self.rig.require_skeleton()?;
        }

        let header = ScriptHeader::build(&self.geometry, &self.rig, options);
        let model = self.model();

        instrument("render_script", || {
            write_script(Vec::new(), &header, &model, options)
        })
    }

    /// Render the script into a writer
    pub fn export_to_writer<W: Write>(
        &self,
        options: &ScriptExportOptions,
        mut writer: W,
    ) -> Result<ExportReport> {
        let script = self.render(options)?;
        writer.write_all(&script)?;
        writer.flush()?;
        Ok(self.report(None, script.len()))
    }

    /// Render the script and write it to `path`
    ///
    /// An empty path cancels the export and `-` writes to standard output.
    /// Any other path is replaced atomically.
    pub fn export_to_path(
        &self,
        options: &ScriptExportOptions,
        path: impl AsRef<Path>,
    ) -> Result<ExportReport> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            tracing::info!(mesh = %self.geometry.name, "Export cancelled");
            return Err(Error::Cancelled);
        }

        if path.as_os_str() == STDOUT_DESTINATION {
            let stdout = std::io::stdout();
            return self.export_to_writer(options, stdout.lock());
        }

        let script = self.render(options)?;
        write_atomic(path, &script)?;

        let report = self.report(Some(path.to_path_buf()), script.len());
        tracing::info!(
            mesh = %report.mesh,
            path = %path.display(),
            vertices = report.vertices,
            bones = report.bones,
            bytes = report.bytes,
            "Exported script"
        );
        Ok(report)
    }

    /// Summary without rendering
    pub fn report(&self, destination: Option<PathBuf>, bytes: usize) -> ExportReport {
        ExportReport {
            mesh: self.geometry.name.clone(),
            vertices: self.geometry.vertex_count(),
            triangles: self.geometry.triangle_count(),
            submeshes: self.geometry.submeshes.len(),
            registered_bones: self.rig.skeleton.registered_bones().len(),
            bones: self.rig.tree.len(),
            vertex_groups: self.rig.groups.groups.len(),
            root_bone: self.rig.root_name().map(str::to_string),
            diagnostics: self.rig.diagnostics.clone(),
            destination,
            bytes,
        }
    }
}

/// Write bytes to a temporary file next to `path`, then rename it into place
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let unwritable = |source: std::io::Error| Error::Unwritable {
        path: path.to_path_buf(),
        source,
    };

    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };

    let mut temp = NamedTempFile::new_in(dir).map_err(unwritable)?;
    {
        let mut writer = BufWriter::new(&mut temp);
        writer.write_all(bytes).map_err(unwritable)?;
        writer.flush().map_err(unwritable)?;
    }
    temp.as_file().sync_all().map_err(unwritable)?;
    temp.persist(path).map_err(|e| unwritable(e.error))?;

    Ok(())
}
