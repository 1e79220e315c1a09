//! Generator options.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Host module whose file carries the caller-supplied boilerplate.
pub const DEFAULT_RESERVED_MODULE: &str = "env";
/// Extension of every generated file.
pub const DEFAULT_EXTENSION: &str = "c";
/// Stem of the export file.
pub const DEFAULT_EXPORTS_STEM: &str = "exports";

/// Options controlling file naming and generated text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GlueOptions {
    pub reserved_module: String,
    pub extension: String,
    pub exports_stem: String,
    /// Declared host module name → import module string written into the
    /// `IMPORT(...)` attribute. The generated file keeps the declared name.
    pub module_aliases: BTreeMap<String, String>,
    pub exception_printer: ExceptionPrinter,
}

impl Default for GlueOptions {
    fn default() -> Self {
        let mut module_aliases = BTreeMap::new();
        module_aliases.insert("extism".to_string(), "extism:host/user".to_string());
        Self {
            reserved_module: DEFAULT_RESERVED_MODULE.to_string(),
            extension: DEFAULT_EXTENSION.to_string(),
            exports_stem: DEFAULT_EXPORTS_STEM.to_string(),
            module_aliases,
            exception_printer: ExceptionPrinter::default(),
        }
    }
}

impl GlueOptions {
    pub fn file_name(&self, stem: &str) -> String {
        format!("{stem}.{}", self.extension)
    }

    pub fn exports_file_name(&self) -> String {
        self.file_name(&self.exports_stem)
    }

    pub fn reserved_file_name(&self) -> String {
        self.file_name(&self.reserved_module)
    }

    /// The import module string for a declared host module.
    pub fn import_module<'a>(&'a self, declared: &'a str) -> &'a str {
        self.module_aliases
            .get(declared)
            .map(String::as_str)
            .unwrap_or(declared)
    }
}

/// True if `name` names a file directly inside the output directory.
pub fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty()
        && name != "."
        && name != ".."
        && !name.contains(['/', '\\'])
        && Path::new(name).file_name().is_some_and(|n| n == name)
}

/// The managed routine that describes an exception escaping an export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExceptionPrinter {
    pub module_file: String,
    pub namespace: String,
    pub type_name: String,
    pub method: String,
}

impl Default for ExceptionPrinter {
    fn default() -> Self {
        Self {
            module_file: "Extism.Pdk.dll".to_string(),
            namespace: "Extism".to_string(),
            type_name: "Native".to_string(),
            method: "PrintException".to_string(),
        }
    }
}

impl ExceptionPrinter {
    pub fn full_name(&self) -> String {
        if self.namespace.is_empty() {
            format!("{}.{}", self.type_name, self.method)
        } else {
            format!("{}.{}.{}", self.namespace, self.type_name, self.method)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = GlueOptions::default();
        assert_eq!(opts.reserved_file_name(), "env.c");
        assert_eq!(opts.exports_file_name(), "exports.c");
        assert_eq!(opts.import_module("extism"), "extism:host/user");
        assert_eq!(opts.import_module("host"), "host");
        assert_eq!(opts.exception_printer.full_name(), "Extism.Native.PrintException");
    }

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("env.c"));
        assert!(is_plain_file_name("extism:host.c"));
        assert!(!is_plain_file_name(""));
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name("a/b.c"));
        assert!(!is_plain_file_name("a\\b.c"));
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let opts: GlueOptions =
            serde_json::from_str(r#"{ "reserved_module": "extism", "module_aliases": {} }"#).unwrap();
        assert_eq!(opts.reserved_module, "extism");
        assert_eq!(opts.extension, "c");
        assert_eq!(opts.import_module("extism"), "extism");
        assert_eq!(opts.exception_printer, ExceptionPrinter::default());
    }
}
