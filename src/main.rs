//! rigscript CLI
//!
//! Command-line interface for exporting skinned meshes from a scene document
//! as Blender Python model scripts, and for inspecting their rigs.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::{debug, error, info};

use rigscript_core::error::exit_code;
use rigscript_core::logging::{init_with_config, TracingConfig};
use rigscript_export::{ExportReport, ExportSession, ScriptExportOptions, ScriptStyle, STDOUT_DESTINATION};
use rigscript_rig::SceneDocument;

/// rigscript - skinned mesh to Blender script exporter
#[derive(Parser)]
#[command(name = "rigscript")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose output (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Output format for reports
    #[arg(long, global = true, default_value = "text")]
    format: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            _ => Err(format!("Unknown format: {}", s)),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Export a mesh as a Blender Python script
    Export(ExportArgs),

    /// Show mesh counts, root bone and bone tree
    Inspect(InspectArgs),
}

#[derive(Args)]
struct ExportArgs {
    /// Path to the scene document (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Destination script ("-" for stdout, empty to cancel)
    #[arg(short, long)]
    output: String,

    /// Mesh to export (defaults to the first mesh)
    #[arg(short, long)]
    mesh: Option<String>,

    /// Script style: model, builder
    #[arg(long)]
    style: Option<ScriptStyle>,

    /// YAML file with export options
    #[arg(long)]
    config: Option<PathBuf>,

    /// Fail when no root bone is found instead of skipping the skeleton
    #[arg(long)]
    require_skeleton: bool,

    /// Leave the bone tree and rig findings out of the header
    #[arg(long)]
    no_diagnostics: bool,

    /// Vertex tuples per line
    #[arg(long)]
    wrap_verts: Option<usize>,

    /// Normal tuples per line
    #[arg(long)]
    wrap_normals: Option<usize>,

    /// Triangle indices per line
    #[arg(long)]
    wrap_submeshes: Option<usize>,

    /// UV triangles per line
    #[arg(long)]
    wrap_uv: Option<usize>,

    /// Vertex group pairs per line
    #[arg(long)]
    wrap_vg: Option<usize>,
}

#[derive(Args)]
struct InspectArgs {
    /// Path to the scene document (JSON)
    #[arg(short, long)]
    input: PathBuf,

    /// Mesh to inspect (defaults to the first mesh)
    #[arg(short, long)]
    mesh: Option<String>,
}

fn setup_logging(verbosity: u8) {
    init_with_config(TracingConfig::for_verbosity(verbosity));
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => {
            let _ = err.print();
            return if err.use_stderr() {
                ExitCode::from(exit_code::USAGE)
            } else {
                ExitCode::SUCCESS
            };
        }
    };
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Export(args) => cmd_export(args, cli.format),
        Commands::Inspect(args) => cmd_inspect(args, cli.format),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::from(failure_code(&err))
        }
    }
}

/// Exit code for a failed command
fn failure_code(err: &anyhow::Error) -> u8 {
    err.downcast_ref::<rigscript_core::Error>()
        .map_or(exit_code::IO_FAILURE, rigscript_core::Error::exit_code)
}

fn load_document(path: &Path) -> Result<SceneDocument> {
    let document = SceneDocument::from_path(path)?;
    debug!(
        nodes = document.nodes.len(),
        meshes = document.meshes.len(),
        "Loaded scene document"
    );
    Ok(document)
}

fn export_options(args: &ExportArgs) -> Result<ScriptExportOptions> {
    let mut options = match &args.config {
        Some(path) => ScriptExportOptions::from_yaml_path(path)?,
        None => ScriptExportOptions::default(),
    };

    if let Some(style) = args.style {
        options.style = style;
    }
    if args.require_skeleton {
        options.require_skeleton = true;
    }
    if args.no_diagnostics {
        options.diagnostics = false;
    }

    let wrap = &mut options.wrap;
    for (flag, limit) in [
        (args.wrap_verts, &mut wrap.verts),
        (args.wrap_normals, &mut wrap.normals),
        (args.wrap_submeshes, &mut wrap.submeshes),
        (args.wrap_uv, &mut wrap.uv),
        (args.wrap_vg, &mut wrap.vg),
    ] {
        if let Some(value) = flag {
            *limit = value;
        }
    }

    Ok(options)
}

fn cmd_export(args: ExportArgs, format: OutputFormat) -> Result<()> {
    let options = export_options(&args)?;
    let document = load_document(&args.input)?;
    let selected = document.select_mesh(args.mesh.as_deref())?;

    let session = ExportSession::prepare(&selected)?;
    let report = session
        .export_to_path(&options, &args.output)
        .with_context(|| format!("exporting '{}'", report_name(&session)))?;

    // The script itself went to stdout; keep it clean.
    if args.output == STDOUT_DESTINATION {
        info!(mesh = %report.mesh, bytes = report.bytes, "Wrote script to stdout");
        return Ok(());
    }

    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        OutputFormat::Text => {
            println!(
                "Exported '{}' to {} ({} bytes)",
                report.mesh, args.output, report.bytes
            );
            print_summary(&report);
        }
    }

    Ok(())
}

fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> Result<()> {
    let document = load_document(&args.input)?;
    let selected = document.select_mesh(args.mesh.as_deref())?;
    let report = ExportSession::prepare(&selected)?.report(None, 0);

    match format {
        OutputFormat::Json => {
            let json = serde_json::json!({
                "path": args.input,
                "meshes": document.mesh_names(),
                "report": report,
            });
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Text => {
            println!("Scene: {:?}", args.input);
            println!("  Meshes:             {}", document.mesh_names().join(", "));
            println!("Mesh: {}", report.mesh);
            print_summary(&report);

            if !report.diagnostics.tree.is_empty() {
                println!("\nBone tree:");
                for line in &report.diagnostics.tree {
                    println!("  {}", line);
                }
            }
        }
    }

    Ok(())
}

fn report_name(session: &ExportSession) -> &str {
    &session.geometry().name
}

fn print_summary(report: &ExportReport) {
    println!("  Vertices:           {}", report.vertices);
    println!("  Triangles:          {}", report.triangles);
    println!("  Submeshes:          {}", report.submeshes);
    println!("  Registered bones:   {}", report.registered_bones);
    println!("  Exported bones:     {}", report.bones);
    println!("  Vertex groups:      {}", report.vertex_groups);
    match &report.root_bone {
        Some(root) => println!("  Root bone:          {}", root),
        None => println!("  Root bone:          (not found)"),
    }
    for bone in &report.diagnostics.loose_bones {
        println!("  Loose bone:         {}", bone);
    }
}
