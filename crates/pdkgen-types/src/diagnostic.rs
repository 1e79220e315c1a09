use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum number of diagnostics stored; later ones are only counted.
pub const MAX_DIAGNOSTICS: usize = 50;

/// Diagnostic severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Error,
    Warning,
}

/// Diagnostic category, determined by code range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticCategory {
    Type,
    Shape,
    Marker,
    Symbol,
}

/// Numeric diagnostic code (G100–G499).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct DiagnosticCode(pub u16);

impl DiagnosticCode {
    // ── Type errors (G100–G199) ──
    pub const UNSUPPORTED_RETURN_TYPE: Self = Self(100);
    pub const UNSUPPORTED_PARAMETER_TYPE: Self = Self(101);

    // ── Shape errors (G200–G299) ──
    pub const EXPORT_HAS_PARAMETERS: Self = Self(200);

    // ── Marker errors (G300–G399) ──
    pub const CONFLICTING_MARKERS: Self = Self(300);

    // ── Symbol errors (G400–G499) ──
    pub const INVALID_IDENTIFIER: Self = Self(400);
    pub const DUPLICATE_SYMBOL: Self = Self(401);
    pub const FILE_NAME_COLLISION: Self = Self(402);
    pub const INVALID_FILE_NAME: Self = Self(403);

    pub fn category(self) -> DiagnosticCategory {
        match self.0 {
            100..=199 => DiagnosticCategory::Type,
            200..=299 => DiagnosticCategory::Shape,
            300..=399 => DiagnosticCategory::Marker,
            _ => DiagnosticCategory::Symbol,
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "G{}", self.0)
    }
}

impl fmt::Display for DiagnosticCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Type => write!(f, "type"),
            Self::Shape => write!(f, "shape"),
            Self::Marker => write!(f, "marker"),
            Self::Symbol => write!(f, "symbol"),
        }
    }
}

/// A recoverable problem with one binding.
///
/// Reporting a diagnostic never stops generation; the offending binding is
/// skipped (or replaced by an `#error` marker) and every other binding is
/// still emitted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostic {
    pub code: DiagnosticCode,
    pub severity: Severity,
    pub category: DiagnosticCategory,
    /// Human-readable message.
    pub message: String,
    /// The managed method the diagnostic is about (`Namespace.Type::Method`).
    pub symbol: String,
}

impl Diagnostic {
    pub fn error(code: DiagnosticCode, symbol: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code,
            severity: Severity::Error,
            category: code.category(),
            message: message.into(),
            symbol: symbol.into(),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}] {}", self.code, self.category, self.message)
    }
}

/// Receives diagnostics as they are produced.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl<F: FnMut(Diagnostic)> DiagnosticSink for F {
    fn report(&mut self, diagnostic: Diagnostic) {
        self(diagnostic)
    }
}

/// Collected diagnostics for one generation run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub entries: Vec<Diagnostic>,
    pub total_errors: usize,
    pub total_warnings: usize,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_errors(&self) -> bool {
        self.total_errors > 0
    }

    pub fn is_empty(&self) -> bool {
        self.total_errors == 0 && self.total_warnings == 0
    }

    /// Add a diagnostic, respecting the [`MAX_DIAGNOSTICS`] limit.
    pub fn push(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => self.total_errors += 1,
            Severity::Warning => self.total_warnings += 1,
        }
        if self.entries.len() < MAX_DIAGNOSTICS {
            self.entries.push(diagnostic);
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    pub fn extend(&mut self, other: Diagnostics) {
        let dropped_errors = other.total_errors - other.iter().filter(|d| d.is_error()).count();
        let dropped_warnings = other.total_warnings - other.iter().filter(|d| !d.is_error()).count();
        for d in other.entries {
            self.push(d);
        }
        self.total_errors += dropped_errors;
        self.total_warnings += dropped_warnings;
    }
}

impl DiagnosticSink for Diagnostics {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(i: usize) -> Diagnostic {
        Diagnostic::error(
            DiagnosticCode::EXPORT_HAS_PARAMETERS,
            format!("App.Functions::Run{i}"),
            "exports cannot take parameters",
        )
    }

    #[test]
    fn test_code_category() {
        assert_eq!(
            DiagnosticCode::UNSUPPORTED_RETURN_TYPE.category(),
            DiagnosticCategory::Type
        );
        assert_eq!(
            DiagnosticCode::UNSUPPORTED_PARAMETER_TYPE.category(),
            DiagnosticCategory::Type
        );
        assert_eq!(
            DiagnosticCode::EXPORT_HAS_PARAMETERS.category(),
            DiagnosticCategory::Shape
        );
        assert_eq!(
            DiagnosticCode::CONFLICTING_MARKERS.category(),
            DiagnosticCategory::Marker
        );
        assert_eq!(
            DiagnosticCode::DUPLICATE_SYMBOL.category(),
            DiagnosticCategory::Symbol
        );
        assert_eq!(
            DiagnosticCode::FILE_NAME_COLLISION.category(),
            DiagnosticCategory::Symbol
        );
        assert_eq!(DiagnosticCode::INVALID_FILE_NAME.to_string(), "G403");
    }

    #[test]
    fn test_display() {
        assert_eq!(DiagnosticCode::INVALID_IDENTIFIER.to_string(), "G400");
        assert_eq!(
            sample(0).to_string(),
            "G200 [shape] exports cannot take parameters"
        );
    }

    #[test]
    fn test_max_limit() {
        let mut diags = Diagnostics::new();
        for i in 0..60 {
            diags.push(sample(i));
        }
        assert_eq!(diags.entries.len(), MAX_DIAGNOSTICS);
        assert_eq!(diags.total_errors, 60);
        assert!(diags.has_errors());
    }

    #[test]
    fn test_extend_keeps_totals() {
        let mut a = Diagnostics::new();
        a.push(sample(0));
        let mut b = Diagnostics::new();
        for i in 0..55 {
            b.push(sample(i));
        }
        a.extend(b);
        assert_eq!(a.total_errors, 56);
        assert_eq!(a.entries.len(), MAX_DIAGNOSTICS);
    }

    #[test]
    fn test_closure_sink() {
        let mut seen = Vec::new();
        {
            let mut sink = |d: Diagnostic| seen.push(d.code);
            sink.report(sample(1));
        }
        assert_eq!(seen, vec![DiagnosticCode::EXPORT_HAS_PARAMETERS]);
    }

    #[test]
    fn test_json_shape() {
        let json = serde_json::to_string(&sample(3)).unwrap();
        assert!(json.contains("\"code\":200"));
        assert!(json.contains("\"severity\":\"error\""));
        assert!(json.contains("\"category\":\"shape\""));
        assert!(json.contains("\"symbol\":\"App.Functions::Run3\""));
    }
}
