//! Import glue: one file per host module.
//!
//! Each import binding becomes a raw wasm import declaration plus a
//! forwarding function with the binding's public name:
//!
//! ```c
//! IMPORT("host", "do_something") extern void do_something_import(int32_t p1);
//!
//! void do_something(int32_t p1) {
//!     do_something_import(p1);
//! }
//! ```
//!
//! Files for ordinary modules start with [`PREAMBLE`]. The reserved module's
//! file starts with the caller-supplied boilerplate instead, and is produced
//! even when no binding targets it.

use std::collections::{HashMap, HashSet};

use pdkgen_types::{
    Diagnostic, DiagnosticCode, DiagnosticSink, GlueFile, ImportBinding, PrimitiveKind,
};

use crate::c::{self, SymbolTable, IMPORT_SUFFIX, PREAMBLE};
use crate::options::{is_plain_file_name, GlueOptions};

/// Emit one file per distinct host module among `imports`, plus the reserved
/// module's file if no import targets it, along with the bindings that
/// received a forwarder.
///
/// A module whose file name is not plain, or would land on the export file
/// or another module's file, gets no file; each of its bindings is reported.
/// File names are compared ignoring ASCII case.
pub fn emit_imports(
    imports: &[ImportBinding],
    boilerplate: &str,
    options: &GlueOptions,
    symbols: &mut SymbolTable,
    sink: &mut dyn DiagnosticSink,
) -> (Vec<GlueFile>, Vec<ImportBinding>) {
    let mut files = Vec::new();
    let mut forwarded = Vec::new();
    let mut reserved_written = false;
    let mut taken: HashSet<String> = [options.exports_file_name(), options.reserved_file_name()]
        .iter()
        .map(|n| n.to_ascii_lowercase())
        .collect();

    for (module, bindings) in group_by_module(imports) {
        let file_name = options.file_name(module);
        let is_reserved = module == options.reserved_module;

        if !is_reserved {
            let problem = if !is_plain_file_name(&file_name) {
                Some((
                    DiagnosticCode::INVALID_FILE_NAME,
                    format!(
                        "host module `{module}` does not give a plain file name (`{file_name}`)"
                    ),
                ))
            } else if !taken.insert(file_name.to_ascii_lowercase()) {
                Some((
                    DiagnosticCode::FILE_NAME_COLLISION,
                    format!(
                        "host module `{module}` would be written to `{file_name}`, \
                         which another generated file already uses"
                    ),
                ))
            } else {
                None
            };
            if let Some((code, message)) = problem {
                tracing::warn!(module, file = %file_name, "host module gets no file");
                for binding in bindings {
                    let symbol = binding.method.full_name();
                    sink.report(Diagnostic::error(
                        code,
                        &symbol,
                        format!("{message}; import `{symbol}` is skipped"),
                    ));
                }
                continue;
            }
        }

        let mut blocks = Vec::with_capacity(bindings.len());
        for binding in bindings {
            match render_import(binding, options, symbols, sink) {
                Ok(text) => {
                    blocks.push(text);
                    forwarded.push(binding.clone());
                }
                Err(marker) => blocks.push(marker),
            }
        }

        let header = if is_reserved {
            reserved_written = true;
            boilerplate.to_string()
        } else {
            format!("{PREAMBLE}\n")
        };

        tracing::debug!(module, bindings = blocks.len(), "emitted import file");
        files.push(GlueFile::new(file_name, assemble(&header, &blocks)));
    }

    if !reserved_written {
        files.push(GlueFile::new(options.reserved_file_name(), boilerplate));
    }

    (files, forwarded)
}

/// Group bindings by host module; groups and members keep first-seen order.
fn group_by_module(imports: &[ImportBinding]) -> Vec<(&str, Vec<&ImportBinding>)> {
    let mut groups: Vec<(&str, Vec<&ImportBinding>)> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    for binding in imports {
        let module = binding.module.as_str();
        let slot = *index.entry(module).or_insert_with(|| {
            groups.push((module, Vec::new()));
            groups.len() - 1
        });
        groups[slot].1.push(binding);
    }
    groups
}

fn assemble(header: &str, blocks: &[String]) -> String {
    let mut out = String::from(header);
    if !out.is_empty() && !out.ends_with('\n') {
        out.push('\n');
    }
    for (i, block) in blocks.iter().enumerate() {
        if i > 0 {
            out.push('\n');
        }
        out.push_str(block);
        out.push('\n');
    }
    out
}

/// Render one binding, or an `#error` marker if it cannot be bridged.
fn render_import(
    binding: &ImportBinding,
    options: &GlueOptions,
    symbols: &mut SymbolTable,
    sink: &mut dyn DiagnosticSink,
) -> Result<String, String> {
    match check_import(binding, symbols) {
        Ok(ret) => Ok(render_forwarder(binding, ret, options)),
        Err(diagnostic) => {
            let marker = c::error_marker(&diagnostic.message);
            sink.report(diagnostic);
            Err(marker)
        }
    }
}

/// Validate a binding and return its return kind; the first problem found is
/// the one reported.
fn check_import(
    binding: &ImportBinding,
    symbols: &mut SymbolTable,
) -> Result<PrimitiveKind, Diagnostic> {
    let method = &binding.method;
    let symbol = method.full_name();

    let Some(ret) = method.return_type.kind() else {
        return Err(Diagnostic::error(
            DiagnosticCode::UNSUPPORTED_RETURN_TYPE,
            &symbol,
            format!(
                "unsupported return type `{}` on import `{symbol}`",
                method.return_type
            ),
        ));
    };

    if let Some(p) = method.parameters.iter().find(|p| !p.ty.is_supported_param()) {
        return Err(Diagnostic::error(
            DiagnosticCode::UNSUPPORTED_PARAMETER_TYPE,
            &symbol,
            format!(
                "unsupported parameter type `{}` for `{}` on import `{symbol}`",
                p.ty, p.name
            ),
        ));
    }

    let name = binding.function_name();
    if let Some(bad) = std::iter::once(name)
        .chain(method.parameters.iter().map(|p| p.name.as_str()))
        .find(|n| !c::is_identifier(n))
    {
        return Err(Diagnostic::error(
            DiagnosticCode::INVALID_IDENTIFIER,
            &symbol,
            format!("`{bad}` is not a valid C identifier (import `{symbol}`)"),
        ));
    }

    let raw = format!("{name}{IMPORT_SUFFIX}");
    if symbols.contains(name) || symbols.contains(&raw) {
        return Err(Diagnostic::error(
            DiagnosticCode::DUPLICATE_SYMBOL,
            &symbol,
            format!("`{name}` is already defined; import `{symbol}` is skipped"),
        ));
    }
    symbols.define(name);
    symbols.define(&raw);
    Ok(ret)
}

fn render_forwarder(binding: &ImportBinding, ret: PrimitiveKind, options: &GlueOptions) -> String {
    let method = &binding.method;
    let name = binding.function_name();
    let params = method
        .parameters
        .iter()
        .filter_map(|p| p.ty.kind().map(|k| format!("{} {}", k.native_spelling(), p.name)))
        .collect::<Vec<_>>()
        .join(", ");
    let args = method
        .parameters
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    let return_keyword = if ret.is_void() { "" } else { "return " };

    format!(
        "IMPORT({module}, {entry}) extern {ret} {name}{IMPORT_SUFFIX}({params});\n\
         \n\
         {ret} {name}({params}) {{\n    \
         {return_keyword}{name}{IMPORT_SUFFIX}({args});\n\
         }}",
        module = c::string_literal(options.import_module(&binding.module)),
        entry = c::string_literal(name),
        ret = ret.native_spelling(),
    )
}
