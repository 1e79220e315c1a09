//! Build configuration (`pdkgen.json`).

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use pdkgen_codegen::GlueOptions;
use serde::{Deserialize, Serialize};

use crate::error::{BuildError, BuildResult};

/// Conventional configuration file name.
pub const CONFIG_FILE_NAME: &str = "pdkgen.json";

/// Everything a build needs besides its inputs.
///
/// Glue options sit at the top level of the JSON document next to
/// `references` and `module_dir`; missing keys take their defaults.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    #[serde(flatten)]
    pub glue: GlueOptions,
    /// Referenced modules whose exports are surfaced too.
    pub references: BTreeSet<String>,
    /// Directory holding referenced module metadata. Defaults to the root
    /// module's directory.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub module_dir: Option<PathBuf>,
}

impl BuildConfig {
    pub fn from_json(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    pub fn load(path: &Path) -> BuildResult<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| BuildError::io(path, e))?;
        let config = Self::from_json(&text).map_err(|source| BuildError::Config {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "loaded build config");
        Ok(config)
    }

    /// Module directory for a root module at `module_path`.
    pub fn module_dir_for(&self, module_path: &Path) -> PathBuf {
        match &self.module_dir {
            Some(dir) => dir.clone(),
            None => module_path
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_default(),
        }
    }
}
