//! C source helpers shared by both emitters.

use std::collections::HashSet;

/// Header of every generated file that does not start with caller text.
pub const PREAMBLE: &str = r#"// Generated by pdkgen. Do not edit.

#include <string.h>
#include <stdint.h>
#include <stdbool.h>
#include <stdlib.h>
#include <stdio.h>
#include <assert.h>

#include <mono/metadata/assembly.h>
#include <mono/metadata/exception.h>

#include "driver.h"

#define IMPORT(a, b) __attribute__((import_module(a), import_name(b)))

typedef uint64_t ExtismPointer;
"#;

/// Suffix of the raw import declaration behind each forwarding function.
pub const IMPORT_SUFFIX: &str = "_import";

const KEYWORDS: &[&str] = &[
    "auto", "break", "case", "char", "const", "continue", "default", "do", "double", "else",
    "enum", "extern", "float", "for", "goto", "if", "inline", "int", "long", "register",
    "restrict", "return", "short", "signed", "sizeof", "static", "struct", "switch", "typedef",
    "union", "unsigned", "void", "volatile", "while", "_Bool", "_Complex", "_Imaginary",
];

/// Whether `name` can be used as a C function name.
pub fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };
    (first == '_' || first.is_ascii_alphabetic())
        && chars.all(|c| c == '_' || c.is_ascii_alphanumeric())
        && !KEYWORDS.contains(&name)
}

/// Render `s` as a C string literal, quotes included.
pub fn string_literal(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\t' => out.push_str("\\t"),
            c if c.is_control() => {
                let mut buf = [0u8; 4];
                for byte in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("\\{byte:03o}"));
                }
            }
            c => out.push(c),
        }
    }
    out.push('"');
    out
}

/// A line that stops the C compiler with `message`.
pub fn error_marker(message: &str) -> String {
    format!("#error {}", string_literal(&format!("pdkgen: {message}")))
}

/// Functions the export runtime support and the host boilerplate define or
/// declare in every guest.
pub const RUNTIME_SYMBOLS: &[&str] = &[
    "initialize_runtime",
    "glue_report_error",
    "glue_print_exception",
    "glue_invoke_method",
    "method_print_exception",
    "extism_alloc",
    "extism_error_set",
    "mono_wasm_load_runtime",
    "mono_wasm_invoke_method_ref",
    "mono_object_try_to_string",
    "mono_object_unbox",
    "mono_string_to_utf8",
    "mono_free",
    "mono_print_unhandled_exception",
    "lookup_dotnet_method",
];

/// Global C symbols defined so far across all generated files.
#[derive(Debug, Default)]
pub struct SymbolTable {
    defined: HashSet<String>,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table that already holds [`RUNTIME_SYMBOLS`].
    pub fn with_runtime_symbols() -> Self {
        Self {
            defined: RUNTIME_SYMBOLS.iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Record `name`; returns false if it was already defined.
    pub fn define(&mut self, name: &str) -> bool {
        self.defined.insert(name.to_string())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.defined.contains(name)
    }
}
