//! Binding scanner.
//!
//! Walks the root module and the referenced modules named in the reference
//! set, and classifies every marked static method as an export or an import.
//!
//! - Exports are collected from the root module and, transitively, from every
//!   referenced module whose name is in the reference set. Referenced modules
//!   are visited depth-first in declaration order and contribute their exports
//!   before the module that references them, so the root module comes last.
//! - Imports are collected from the root module only.
//! - A module outside the reference set is never read.
//!
//! Scanning is pure: byte-identical inputs produce identical, identically
//! ordered results.

use std::collections::{BTreeSet, HashSet};

use pdkgen_types::{
    Diagnostic, DiagnosticCode, Diagnostics, ExportBinding, ImportBinding, MethodSignature,
};
use serde::{Deserialize, Serialize};

use crate::error::MetadataResult;
use crate::model::{Marker, MethodDef, ModuleMetadata, TypeDef};
use crate::reader::ModuleReader;

/// Classified bindings of one scan.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanResult {
    pub exports: Vec<ExportBinding>,
    pub imports: Vec<ImportBinding>,
    /// Marker conflicts found while classifying.
    pub diagnostics: Diagnostics,
}

impl ScanResult {
    pub fn is_empty(&self) -> bool {
        self.exports.is_empty() && self.imports.is_empty()
    }
}

/// Scan `root` and the referenced modules in `references`.
///
/// Any referenced module that cannot be read aborts the scan.
pub fn scan(
    root: &ModuleMetadata,
    reader: &dyn ModuleReader,
    references: &BTreeSet<String>,
) -> MetadataResult<ScanResult> {
    let mut scanner = Scanner::new(reader, references);
    scanner.visited.insert(root.name.clone());
    scanner.scan_references(root)?;
    scanner.collect(root, Scope::ExportsAndImports);
    Ok(scanner.result)
}

/// Which binding kinds a module contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Scope {
    ExportsOnly,
    ExportsAndImports,
}

struct Scanner<'a> {
    reader: &'a dyn ModuleReader,
    references: &'a BTreeSet<String>,
    /// Modules already read, including the root.
    visited: HashSet<String>,
    result: ScanResult,
}

impl<'a> Scanner<'a> {
    fn new(reader: &'a dyn ModuleReader, references: &'a BTreeSet<String>) -> Self {
        Self {
            reader,
            references,
            visited: HashSet::new(),
            result: ScanResult::default(),
        }
    }

    fn scan_references(&mut self, module: &ModuleMetadata) -> MetadataResult<()> {
        for name in &module.references {
            if !self.references.contains(name) {
                tracing::trace!(module = %module.name, reference = %name, "reference not in set, skipped");
                continue;
            }
            if !self.visited.insert(name.clone()) {
                continue;
            }
            let referenced = self.reader.read_module(name)?;
            tracing::debug!(module = %module.name, reference = %name, "scanning referenced module");
            self.scan_references(&referenced)?;
            self.collect(&referenced, Scope::ExportsOnly);
        }
        Ok(())
    }

    fn collect(&mut self, module: &ModuleMetadata, scope: Scope) {
        let module_file = module.file_name();
        for ty in &module.types {
            for method in &ty.methods {
                if method.markers.is_empty() {
                    continue;
                }
                if !method.is_static {
                    tracing::debug!(
                        method = %format!("{}.{}::{}", ty.namespace, ty.name, method.name),
                        "instance method carries a binding marker, skipped"
                    );
                    continue;
                }
                self.classify(&module_file, ty, method, scope);
            }
        }
    }

    fn classify(&mut self, module_file: &str, ty: &TypeDef, method: &MethodDef, scope: Scope) {
        let signature = signature(module_file, ty, method);
        let export = method.markers.iter().find(|m| m.is_export());
        let import = method.markers.iter().find(|m| m.is_import());

        match (export, import) {
            (Some(_), Some(_)) => {
                self.result.diagnostics.push(Diagnostic::error(
                    DiagnosticCode::CONFLICTING_MARKERS,
                    signature.full_name(),
                    format!(
                        "{} is marked as both an export and an import; it will not be generated",
                        signature.full_name()
                    ),
                ));
            }
            (Some(Marker::Export { entry_point }), None) => {
                self.result.exports.push(ExportBinding {
                    method: signature,
                    entry_point: entry_point.clone(),
                });
            }
            (None, Some(Marker::Import { module, entry_point })) => {
                if scope == Scope::ExportsAndImports {
                    self.result.imports.push(ImportBinding {
                        method: signature,
                        module: module.clone(),
                        entry_point: entry_point.clone(),
                    });
                } else {
                    tracing::trace!(method = %signature.full_name(), "import in referenced module, skipped");
                }
            }
            _ => {}
        }
    }
}

fn signature(module_file: &str, ty: &TypeDef, method: &MethodDef) -> MethodSignature {
    MethodSignature {
        module_file: module_file.to_string(),
        namespace: ty.namespace.clone(),
        type_name: ty.name.clone(),
        method_name: method.name.clone(),
        parameters: method.parameters.clone(),
        return_type: method.return_type.clone(),
    }
}
