//! pdkgen build driver.
//!
//! ```text
//! <root>.json → scan → generate → reconcile <output dir>
//!                                      ↓
//!                        (after linking) verify_guest(<guest>.wasm)
//! ```
//!
//! One build is a synchronous batch: every file is computed in memory before
//! the output directory is touched.

pub mod config;
pub mod error;
pub mod output;
pub mod verify;

use std::path::{Path, PathBuf};

use pdkgen_metadata::{scan, DirectoryModuleReader, ScanResult};
use pdkgen_types::{Diagnostic, Diagnostics};
use serde::Serialize;

pub use config::{BuildConfig, CONFIG_FILE_NAME};
pub use error::{BuildError, BuildResult};
pub use output::{reconcile, Reconciled};
pub use verify::{verify_guest, ImportName, VerifyReport};

/// Inputs of one build.
#[derive(Debug, Clone)]
pub struct BuildRequest {
    /// Metadata file of the root module.
    pub module_path: PathBuf,
    pub output_dir: PathBuf,
    /// Text that opens the reserved module's file.
    pub boilerplate: String,
    pub config: BuildConfig,
}

/// Outcome of a successful build.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BuildReport {
    pub written: Vec<String>,
    pub unchanged: Vec<String>,
    pub removed: Vec<String>,
    pub diagnostics: Diagnostics,
}

impl BuildReport {
    pub fn has_errors(&self) -> bool {
        self.diagnostics.has_errors()
    }

    /// Every generated file name, written or unchanged.
    pub fn files(&self) -> impl Iterator<Item = &str> {
        self.written.iter().chain(&self.unchanged).map(String::as_str)
    }
}

/// Scan the root module named by `module_path` with the configured
/// reference set.
pub fn scan_module(module_path: &Path, config: &BuildConfig) -> BuildResult<ScanResult> {
    let root = DirectoryModuleReader::read_path(module_path)?;
    let reader = DirectoryModuleReader::new(config.module_dir_for(module_path));
    let result = scan(&root, &reader, &config.references)?;
    tracing::debug!(
        module = %root.name,
        exports = result.exports.len(),
        imports = result.imports.len(),
        "scanned"
    );
    Ok(result)
}

/// Run one build: scan, generate, reconcile the output directory.
///
/// Diagnostics do not fail the build; they are logged and returned in the
/// report for the caller to act on.
pub fn build(request: &BuildRequest) -> BuildResult<BuildReport> {
    let config = &request.config;
    let ScanResult {
        exports,
        imports,
        diagnostics: scan_diagnostics,
    } = scan_module(&request.module_path, config)?;

    let mut diagnostics = Diagnostics::new();
    let mut sink = |d: Diagnostic| {
        tracing::error!(code = %d.code, symbol = %d.symbol, "{}", d.message);
        diagnostics.push(d);
    };
    for d in scan_diagnostics.entries {
        sink(d);
    }
    let glue = pdkgen_codegen::generate(&exports, &imports, &request.boilerplate, &config.glue, &mut sink);

    let reconciled = reconcile(&request.output_dir, &glue.files, &config.glue.extension)?;

    tracing::info!(
        output = %request.output_dir.display(),
        written = reconciled.written.len(),
        unchanged = reconciled.unchanged.len(),
        removed = reconciled.removed.len(),
        errors = diagnostics.total_errors,
        "glue generated"
    );

    Ok(BuildReport {
        written: reconciled.written,
        unchanged: reconciled.unchanged,
        removed: reconciled.removed,
        diagnostics,
    })
}
