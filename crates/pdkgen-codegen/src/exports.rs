//! Export glue: a single file of wasm-exported wrappers.
//!
//! Every wrapper boots the managed runtime on first use, resolves its target
//! method once, invokes it with no arguments and returns its `int` result.
//! An exception escaping the managed method is reported to the host and
//! surfaces as a return value of 1.

use pdkgen_types::{
    Diagnostic, DiagnosticCode, DiagnosticSink, ExportBinding, GlueFile, PrimitiveKind,
};

use crate::c::{self, SymbolTable, PREAMBLE};
use crate::options::{ExceptionPrinter, GlueOptions};

/// Prefix of the cached method handle behind each wrapper.
const HANDLE_PREFIX: &str = "glue_method_";

/// Emit the export file, or `None` when there is nothing to export, along
/// with the bindings that received a wrapper.
///
/// Exports that cannot be wrapped are reported to `sink` and leave no text
/// behind; the rest of the file is still produced.
pub fn emit_exports(
    exports: &[ExportBinding],
    options: &GlueOptions,
    symbols: &mut SymbolTable,
    sink: &mut dyn DiagnosticSink,
) -> (Option<GlueFile>, Vec<ExportBinding>) {
    if exports.is_empty() {
        return (None, Vec::new());
    }

    let mut out = String::from(PREAMBLE);
    out.push('\n');
    out.push_str(&runtime_support(&options.exception_printer));

    let mut wrapped = Vec::new();
    for binding in exports {
        match check_export(binding, symbols) {
            Ok(()) => {
                out.push('\n');
                out.push_str(&render_wrapper(binding));
                wrapped.push(binding.clone());
            }
            Err(diagnostic) => sink.report(diagnostic),
        }
    }

    tracing::debug!(exports = exports.len(), wrapped = wrapped.len(), "emitted export file");
    (Some(GlueFile::new(options.exports_file_name(), out)), wrapped)
}

fn check_export(binding: &ExportBinding, symbols: &mut SymbolTable) -> Result<(), Diagnostic> {
    let method = &binding.method;
    let symbol = method.full_name();
    let name = binding.export_name();

    if !method.parameters.is_empty() {
        return Err(Diagnostic::error(
            DiagnosticCode::EXPORT_HAS_PARAMETERS,
            &symbol,
            format!("exported functions cannot take parameters: {method}"),
        ));
    }

    // The wrapper reads the boxed result as a C `int`.
    if !matches!(
        method.return_type.kind(),
        Some(PrimitiveKind::Void | PrimitiveKind::I32 | PrimitiveKind::U32)
    ) {
        return Err(Diagnostic::error(
            DiagnosticCode::UNSUPPORTED_RETURN_TYPE,
            &symbol,
            format!(
                "exported functions return void or a 32-bit integer, not `{}`: {method}",
                method.return_type
            ),
        ));
    }

    if !c::is_identifier(name) {
        return Err(Diagnostic::error(
            DiagnosticCode::INVALID_IDENTIFIER,
            &symbol,
            format!("`{name}` is not a valid C identifier (export `{symbol}`)"),
        ));
    }

    let handle = format!("{HANDLE_PREFIX}{name}");
    if symbols.contains(name) || symbols.contains(&handle) {
        return Err(Diagnostic::error(
            DiagnosticCode::DUPLICATE_SYMBOL,
            &symbol,
            format!("`{name}` is already defined; export `{symbol}` is skipped"),
        ));
    }
    symbols.define(name);
    symbols.define(&handle);
    Ok(())
}

fn render_wrapper(binding: &ExportBinding) -> String {
    let method = &binding.method;
    let name = binding.export_name();
    let handle = format!("{HANDLE_PREFIX}{name}");
    let lookup = lookup_call(
        &method.module_file,
        &method.namespace,
        &method.type_name,
        &method.method_name,
    );
    let not_found = c::string_literal(&format!("Failed to lookup method: {name}"));

    format!(
        r#"static MonoMethod* {handle} = NULL;

__attribute__((export_name("{name}"))) int {name}(void)
{{
    initialize_runtime();

    if (!{handle}) {{
        {handle} = {lookup};
        if (!{handle}) {{
            glue_report_error({not_found});
            return 1;
        }}
    }}

    assert({handle});
    return glue_invoke_method({handle});
}}
"#
    )
}

fn lookup_call(module_file: &str, namespace: &str, type_name: &str, method: &str) -> String {
    format!(
        "lookup_dotnet_method({}, {}, {}, {}, -1)",
        c::string_literal(module_file),
        c::string_literal(namespace),
        c::string_literal(type_name),
        c::string_literal(method),
    )
}

/// Runtime bootstrap, error reporting and the shared invoke helper.
fn runtime_support(printer: &ExceptionPrinter) -> String {
    let printer_lookup = lookup_call(
        &printer.module_file,
        &printer.namespace,
        &printer.type_name,
        &printer.method,
    );
    let printer_missing =
        c::string_literal(&format!("Fatal: failed to find {}", printer.full_name()));

    format!(
        r#"ExtismPointer extism_alloc(uint64_t size);
void extism_error_set(ExtismPointer ptr);

void mono_wasm_load_runtime(const char* unused, int debug_level);

#ifdef WASI_AFTER_RUNTIME_LOADED_DECLARATIONS
WASI_AFTER_RUNTIME_LOADED_DECLARATIONS
#endif

void initialize_runtime() {{
    mono_wasm_load_runtime("", 0);
}}

void mono_wasm_invoke_method_ref(MonoMethod* method, MonoObject** this_arg_in, void* params[], MonoObject** out_exc, MonoObject** out_result);
MonoString* mono_object_try_to_string(MonoObject* obj, MonoObject** exc, MonoError* error);
void mono_print_unhandled_exception(MonoObject* exc);

static void glue_report_error(const char* message)
{{
    size_t length = strlen(message);
    ExtismPointer ptr = extism_alloc(length);
    memcpy((void*)ptr, message, length);
    extism_error_set(ptr);
}}

// Guests run on a single thread; the cached handles need no locking.
static MonoMethod* method_print_exception = NULL;

static void glue_print_exception(MonoObject* exc)
{{
    if (!method_print_exception) {{
        method_print_exception = {printer_lookup};
        if (!method_print_exception) {{
            glue_report_error({printer_missing});
            return;
        }}
    }}

    void* method_params[] = {{ exc }};
    MonoObject* nested_exception = NULL;
    MonoObject* result = NULL;
    mono_wasm_invoke_method_ref(method_print_exception, NULL, method_params, &nested_exception, &result);

    if (nested_exception != NULL) {{
        MonoError error;
        MonoObject* string_exc = NULL;
        MonoString* message = mono_object_try_to_string(nested_exception, &string_exc, &error);
        if (!string_exc && message) {{
            char* utf8_message = mono_string_to_utf8(message);
            glue_report_error(utf8_message);
            mono_free(utf8_message);
        }} else {{
            glue_report_error("An exception occurred while handling another exception");
        }}
    }}
}}

static int glue_invoke_method(MonoMethod* method)
{{
    void* method_params[1] = {{ NULL }};
    MonoObject* exception = NULL;
    MonoObject* result = NULL;
    mono_wasm_invoke_method_ref(method, NULL, method_params, &exception, &result);

    if (exception != NULL) {{
        mono_print_unhandled_exception(exception);
        glue_print_exception(exception);
        return 1;
    }}

    if (result == NULL) {{
        return 0;
    }}
    return *(int*)mono_object_unbox(result);
}}
"#
    )
}
