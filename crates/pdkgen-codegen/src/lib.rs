//! pdkgen glue generator: turns scanned bindings into C bridging source.
//!
//! # Output
//!
//! - `<module>.c` for every host module named by an import binding. Each
//!   import becomes an `IMPORT(...)` declaration plus a forwarding function.
//! - `<reserved>.c` always. It starts with the caller-supplied boilerplate;
//!   imports that target the reserved module are appended to it.
//! - `exports.c` when there is at least one export. It holds the runtime
//!   bootstrap, the shared exception path and one wasm-exported wrapper per
//!   export.
//!
//! # Diagnostics
//!
//! Bindings that cannot be bridged are reported through a
//! [`pdkgen_types::DiagnosticSink`] and never stop generation. A rejected
//! import leaves an `#error` line in its file; a rejected export leaves no
//! text. A host module whose file name is not plain, or clashes with another
//! generated file, gets no file at all.
//!
//! # Generated runtime model
//!
//! Guest instances run single-threaded and never re-enter an export, so the
//! cached method handles in `exports.c` are plain mutable statics.

pub mod c;
pub mod exports;
pub mod generator;
pub mod imports;
pub mod options;

pub use generator::{generate, generate_collect, GenerateOutput, Glue};
pub use options::{ExceptionPrinter, GlueOptions};
