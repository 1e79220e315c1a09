//! Post-link verification of a guest module.
//!
//! Checks that the linked `.wasm` still carries every function the glue
//! promised: one export per wrapped export binding, and one function import
//! per forwarded import binding.

use std::collections::HashSet;

use pdkgen_codegen::{generate_collect, GlueOptions};
use pdkgen_metadata::ScanResult;
use serde::Serialize;
use wasmparser::{ExternalKind, Parser, Payload, TypeRef};

use crate::error::BuildResult;

/// An `(import module, name)` pair the guest should import.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct ImportName {
    pub module: String,
    pub name: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    /// Export names missing from the guest's function exports.
    pub missing_exports: Vec<String>,
    /// Host functions missing from the guest's function imports.
    pub missing_imports: Vec<ImportName>,
}

impl VerifyReport {
    pub fn is_ok(&self) -> bool {
        self.missing_exports.is_empty() && self.missing_imports.is_empty()
    }
}

/// Compare `wasm` against the bindings the glue was generated from.
///
/// The expected functions are the ones the generator bridges for `scan`
/// under `options`; rejected bindings produce no glue and are not expected
/// in the module.
pub fn verify_guest(wasm: &[u8], scan: &ScanResult, options: &GlueOptions) -> BuildResult<VerifyReport> {
    wasmparser::validate(wasm)?;

    let mut exported: HashSet<String> = HashSet::new();
    let mut imported: HashSet<ImportName> = HashSet::new();

    for payload in Parser::new(0).parse_all(wasm) {
        match payload? {
            Payload::ImportSection(reader) => {
                for import in reader {
                    let import = import?;
                    if let TypeRef::Func(_) = import.ty {
                        imported.insert(ImportName {
                            module: import.module.to_string(),
                            name: import.name.to_string(),
                        });
                    }
                }
            }
            Payload::ExportSection(reader) => {
                for export in reader {
                    let export = export?;
                    if export.kind == ExternalKind::Func {
                        exported.insert(export.name.to_string());
                    }
                }
            }
            _ => {}
        }
    }

    // Diagnostics were already reported when the glue was built.
    let glue = generate_collect(&scan.exports, &scan.imports, "", options);
    let mut report = VerifyReport::default();

    for binding in &glue.exports {
        let name = binding.export_name();
        if !exported.contains(name) {
            report.missing_exports.push(name.to_string());
        }
    }

    for binding in &glue.imports {
        let expected = ImportName {
            module: options.import_module(&binding.module).to_string(),
            name: binding.function_name().to_string(),
        };
        if !imported.contains(&expected) {
            report.missing_imports.push(expected);
        }
    }

    if report.is_ok() {
        tracing::debug!(exports = exported.len(), imports = imported.len(), "guest verified");
    } else {
        tracing::warn!(
            missing_exports = report.missing_exports.len(),
            missing_imports = report.missing_imports.len(),
            "guest is missing bound functions"
        );
    }
    Ok(report)
}
