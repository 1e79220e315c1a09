//! Module readers.
//!
//! The scanner never touches the file system itself; it asks a
//! [`ModuleReader`] for referenced modules by name. The directory reader
//! resolves `<dir>/<name>.json`, the memory reader serves pre-built modules.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::error::{MetadataError, MetadataResult};
use crate::model::ModuleMetadata;

/// Extension of module metadata files.
pub const METADATA_EXTENSION: &str = "json";

/// Source of module metadata, addressed by simple module name.
pub trait ModuleReader {
    fn read_module(&self, name: &str) -> MetadataResult<ModuleMetadata>;
}

/// Reads `<dir>/<name>.json` files.
#[derive(Debug, Clone)]
pub struct DirectoryModuleReader {
    dir: PathBuf,
}

impl DirectoryModuleReader {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path the module `name` is expected at.
    pub fn module_path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.{METADATA_EXTENSION}"))
    }

    /// Read a module from an explicit path (used for the root module).
    pub fn read_path(path: &Path) -> MetadataResult<ModuleMetadata> {
        let text = std::fs::read_to_string(path).map_err(|source| MetadataError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let module = ModuleMetadata::from_json(&text).map_err(|source| MetadataError::Malformed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(module = %module.name, path = %path.display(), "read module metadata");
        Ok(module)
    }
}

impl ModuleReader for DirectoryModuleReader {
    fn read_module(&self, name: &str) -> MetadataResult<ModuleMetadata> {
        let path = self.module_path(name);
        if !path.is_file() {
            return Err(MetadataError::MissingModule {
                name: name.to_string(),
                path,
            });
        }
        let module = Self::read_path(&path)?;
        if module.name != name {
            return Err(MetadataError::NameMismatch {
                path,
                expected: name.to_string(),
                found: module.name,
            });
        }
        Ok(module)
    }
}

/// Serves modules held in memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryModuleReader {
    modules: HashMap<String, ModuleMetadata>,
}

impl MemoryModuleReader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, module: ModuleMetadata) {
        self.modules.insert(module.name.clone(), module);
    }

    pub fn with_module(mut self, module: ModuleMetadata) -> Self {
        self.insert(module);
        self
    }
}

impl ModuleReader for MemoryModuleReader {
    fn read_module(&self, name: &str) -> MetadataResult<ModuleMetadata> {
        self.modules
            .get(name)
            .cloned()
            .ok_or_else(|| MetadataError::MissingModule {
                name: name.to_string(),
                path: PathBuf::from(format!("<memory>/{name}.{METADATA_EXTENSION}")),
            })
    }
}
