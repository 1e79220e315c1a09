//! Generator entry points.

use pdkgen_types::{
    Diagnostic, DiagnosticCode, DiagnosticSink, Diagnostics, ExportBinding, GlueFile,
    ImportBinding,
};
use serde::Serialize;

use crate::c::SymbolTable;
use crate::exports::emit_exports;
use crate::imports::emit_imports;
use crate::options::GlueOptions;

/// The glue for one scan, with the bindings it actually bridges.
#[derive(Debug, Clone, Default, Serialize)]
pub struct Glue {
    pub files: Vec<GlueFile>,
    /// Exports that received a wrapper.
    pub exports: Vec<ExportBinding>,
    /// Imports that received a forwarder.
    pub imports: Vec<ImportBinding>,
}

/// Render the complete glue file set for one scan.
///
/// Import files come first (in first-seen module order, the reserved
/// module's file included), then the export file if any export was found.
/// Both emitters share one symbol table seeded with the runtime's own
/// functions, so no binding can redefine those or a name another binding
/// already took.
pub fn generate(
    exports: &[ExportBinding],
    imports: &[ImportBinding],
    boilerplate: &str,
    options: &GlueOptions,
    sink: &mut dyn DiagnosticSink,
) -> Glue {
    let mut symbols = SymbolTable::with_runtime_symbols();
    let (mut files, forwarded) = emit_imports(imports, boilerplate, options, &mut symbols, sink);
    let (export_file, wrapped) = emit_exports(exports, options, &mut symbols, sink);

    let mut glue = Glue {
        files: Vec::new(),
        exports: Vec::new(),
        imports: forwarded,
    };
    if let Some(file) = export_file {
        if files.iter().any(|f| f.name.eq_ignore_ascii_case(&file.name)) {
            // Only reachable when the reserved module and the export stem share a name.
            sink.report(Diagnostic::error(
                DiagnosticCode::FILE_NAME_COLLISION,
                &file.name,
                format!("the export file `{}` is already generated for a host module", file.name),
            ));
        } else {
            files.push(file);
            glue.exports = wrapped;
        }
    }
    glue.files = files;

    tracing::debug!(
        files = glue.files.len(),
        exports = glue.exports.len(),
        imports = glue.imports.len(),
        "generated glue"
    );
    glue
}

/// Output of [`generate_collect`].
#[derive(Debug, Clone, Default, Serialize)]
pub struct GenerateOutput {
    pub files: Vec<GlueFile>,
    pub exports: Vec<ExportBinding>,
    pub imports: Vec<ImportBinding>,
    pub diagnostics: Diagnostics,
}

impl GenerateOutput {
    pub fn file(&self, name: &str) -> Option<&GlueFile> {
        self.files.iter().find(|f| f.name == name)
    }

    pub fn file_names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }
}

/// Like [`generate`], collecting diagnostics instead of streaming them.
pub fn generate_collect(
    exports: &[ExportBinding],
    imports: &[ImportBinding],
    boilerplate: &str,
    options: &GlueOptions,
) -> GenerateOutput {
    let mut diagnostics = Diagnostics::new();
    let Glue {
        files,
        exports,
        imports,
    } = generate(exports, imports, boilerplate, options, &mut diagnostics);
    GenerateOutput {
        files,
        exports,
        imports,
        diagnostics,
    }
}
