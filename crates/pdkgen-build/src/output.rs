//! Output directory reconciliation.
//!
//! Not transactional: a failure part-way leaves the directory partially
//! cleaned and partially written. Callers must not run two builds against
//! one directory at the same time.

use std::collections::HashSet;
use std::path::Path;

use pdkgen_codegen::options::is_plain_file_name;
use pdkgen_types::GlueFile;
use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::error::{BuildError, BuildResult};

/// What reconciliation did, by bare file name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Reconciled {
    pub written: Vec<String>,
    pub unchanged: Vec<String>,
    pub removed: Vec<String>,
}

/// Make `dir` hold exactly `files` among its `*.<extension>` files.
///
/// Stale files with the generated extension are removed, files whose
/// content already matches are left untouched, the rest are written.
pub fn reconcile(dir: &Path, files: &[GlueFile], extension: &str) -> BuildResult<Reconciled> {
    for file in files {
        if !is_plain_file_name(&file.name) {
            return Err(BuildError::InvalidFileName {
                name: file.name.clone(),
            });
        }
    }

    std::fs::create_dir_all(dir).map_err(|e| BuildError::io(dir, e))?;

    let mut report = Reconciled::default();
    let keep: HashSet<&str> = files.iter().map(|f| f.name.as_str()).collect();

    let entries = std::fs::read_dir(dir).map_err(|e| BuildError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| BuildError::io(dir, e))?;
        let path = entry.path();
        if !path.is_file() || path.extension().and_then(|e| e.to_str()) != Some(extension) {
            continue;
        }
        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if keep.contains(name) {
            continue;
        }
        std::fs::remove_file(&path).map_err(|e| BuildError::io(&path, e))?;
        tracing::warn!(path = %path.display(), "removed stale generated file");
        report.removed.push(name.to_string());
    }
    report.removed.sort();

    for file in files {
        let path = dir.join(&file.name);
        if matches_existing(&path, file.content.as_bytes()) {
            tracing::debug!(file = %file.name, "unchanged");
            report.unchanged.push(file.name.clone());
            continue;
        }
        std::fs::write(&path, &file.content).map_err(|e| BuildError::io(&path, e))?;
        tracing::debug!(file = %file.name, bytes = file.content.len(), "written");
        report.written.push(file.name.clone());
    }

    Ok(report)
}

fn matches_existing(path: &Path, content: &[u8]) -> bool {
    match std::fs::read(path) {
        Ok(existing) => Sha256::digest(&existing) == Sha256::digest(content),
        Err(_) => false,
    }
}
