//! `pdkgen`: glue generation for guests running a managed runtime on wasm.
//!
//! ```text
//! pdkgen generate --module bin/App.json --output obj/glue --boilerplate env.c
//! pdkgen scan --module bin/App.json --reference Lib
//! pdkgen verify --module bin/App.json --wasm bin/App.wasm
//! ```

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use pdkgen_build::{build, scan_module, verify_guest, BuildConfig, BuildRequest, CONFIG_FILE_NAME};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "pdkgen")]
#[command(author, version, about = "Generate C glue for exported and imported managed methods", long_about = None)]
struct Cli {
    /// Enable verbose output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

/// Options shared by every subcommand that scans a module.
#[derive(Args)]
struct ModuleArgs {
    /// Metadata file of the root module
    #[arg(short, long)]
    module: PathBuf,

    /// Referenced module whose exports are surfaced too (repeatable)
    #[arg(short, long = "reference")]
    references: Vec<String>,

    /// Configuration file (defaults to pdkgen.json next to the module, if present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate glue files into an output directory
    Generate {
        #[command(flatten)]
        module: ModuleArgs,

        /// Output directory (created if missing; stale generated files are removed)
        #[arg(short, long)]
        output: PathBuf,

        /// File whose text opens the reserved module's glue file
        #[arg(short, long)]
        boilerplate: PathBuf,

        /// Override the reserved host module name
        #[arg(long)]
        reserved_module: Option<String>,
    },

    /// Print the export and import bindings as JSON
    Scan {
        #[command(flatten)]
        module: ModuleArgs,
    },

    /// Check a linked guest against the bindings
    Verify {
        #[command(flatten)]
        module: ModuleArgs,

        /// Linked guest module
        #[arg(short, long)]
        wasm: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    // RUST_LOG wins over -v.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Generate {
            module,
            output,
            boilerplate,
            reserved_module,
        } => cmd_generate(module, output, boilerplate, reserved_module),
        Commands::Scan { module } => cmd_scan(module),
        Commands::Verify { module, wasm } => cmd_verify(module, wasm),
    }
}

/// Load the configuration and apply command line overrides.
fn load_config(args: &ModuleArgs) -> Result<BuildConfig> {
    let path = match &args.config {
        Some(path) => Some(path.clone()),
        None => {
            let beside = args
                .module
                .parent()
                .unwrap_or_else(|| Path::new(""))
                .join(CONFIG_FILE_NAME);
            beside.is_file().then_some(beside)
        }
    };

    let mut config = match path {
        Some(path) => BuildConfig::load(&path)
            .with_context(|| format!("loading configuration {}", path.display()))?,
        None => BuildConfig::default(),
    };
    config.references.extend(args.references.iter().cloned());
    Ok(config)
}

fn cmd_generate(
    module: ModuleArgs,
    output: PathBuf,
    boilerplate: PathBuf,
    reserved_module: Option<String>,
) -> Result<ExitCode> {
    let mut config = load_config(&module)?;
    if let Some(name) = reserved_module {
        config.glue.reserved_module = name;
    }
    let boilerplate = std::fs::read_to_string(&boilerplate)
        .with_context(|| format!("reading boilerplate {}", boilerplate.display()))?;

    let request = BuildRequest {
        module_path: module.module,
        output_dir: output,
        boilerplate,
        config,
    };
    let report = build(&request).context("glue generation failed")?;

    for name in &report.removed {
        info!("removed {name}");
    }
    for name in &report.written {
        info!("wrote {name}");
    }

    if report.has_errors() {
        for d in report.diagnostics.iter() {
            eprintln!("{}: {d}", d.symbol);
        }
        let hidden = report.diagnostics.total_errors.saturating_sub(report.diagnostics.entries.len());
        if hidden > 0 {
            eprintln!("... and {hidden} more");
        }
        return Ok(ExitCode::FAILURE);
    }
    Ok(ExitCode::SUCCESS)
}

fn cmd_scan(module: ModuleArgs) -> Result<ExitCode> {
    let config = load_config(&module)?;
    let result = scan_module(&module.module, &config).context("scan failed")?;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(ExitCode::SUCCESS)
}

fn cmd_verify(module: ModuleArgs, wasm: PathBuf) -> Result<ExitCode> {
    let config = load_config(&module)?;
    let scanned = scan_module(&module.module, &config).context("scan failed")?;
    let bytes = std::fs::read(&wasm).with_context(|| format!("reading {}", wasm.display()))?;
    let report = verify_guest(&bytes, &scanned, &config.glue)
        .with_context(|| format!("verifying {}", wasm.display()))?;

    if report.is_ok() {
        println!("{}: all bindings present", wasm.display());
        return Ok(ExitCode::SUCCESS);
    }
    for name in &report.missing_exports {
        warn!("missing export {name}");
        println!("missing export: {name}");
    }
    for import in &report.missing_imports {
        warn!("missing import {}::{}", import.module, import.name);
        println!("missing import: {} {}", import.module, import.name);
    }
    Ok(ExitCode::FAILURE)
}
