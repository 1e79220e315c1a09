//! Shared types for pdkgen.
//!
//! This crate defines the type compatibility table, the method bindings
//! discovered in module metadata, structured diagnostics, and the generated
//! file type used across the metadata scanner, the glue emitters and the
//! build driver.

mod binding;
mod diagnostic;
mod glue;
mod kind;

pub use binding::{ExportBinding, ImportBinding, MethodSignature, Parameter};
pub use diagnostic::{
    Diagnostic, DiagnosticCategory, DiagnosticCode, DiagnosticSink, Diagnostics, Severity,
    MAX_DIAGNOSTICS,
};
pub use glue::GlueFile;
pub use kind::{PrimitiveKind, TypeRef, UnknownPrimitive};
