//! Diagnostic blobs produced by compiler calls
//!
//! Every fallible compiler call returns its own [`Diagnostics`], independent of
//! the diagnostics of any earlier call.

use serde::Serialize;
use std::fmt;

/// Severity of a single diagnostic
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Additional context attached to another diagnostic
    Note,
    /// Suspicious but compilable input
    Warning,
    /// The call failed
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Severity::Note => f.write_str("note"),
            Severity::Warning => f.write_str("warning"),
            Severity::Error => f.write_str("error"),
        }
    }
}

/// A single rendered diagnostic message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    /// Severity of the message
    pub severity: Severity,
    /// Human-readable text, already prefixed with location and severity
    pub text: String,
}

impl Diagnostic {
    /// Creates a diagnostic reported against `path`
    pub fn new(severity: Severity, path: &str, message: impl fmt::Display) -> Self {
        Self {
            severity,
            text: format!("{path}: {severity}: {message}"),
        }
    }

    /// Shorthand for an error diagnostic
    pub fn error(path: &str, message: impl fmt::Display) -> Self {
        Self::new(Severity::Error, path, message)
    }

    /// Shorthand for a warning diagnostic
    pub fn warning(path: &str, message: impl fmt::Display) -> Self {
        Self::new(Severity::Warning, path, message)
    }

    /// Shorthand for a note diagnostic
    pub fn note(path: &str, message: impl fmt::Display) -> Self {
        Self::new(Severity::Note, path, message)
    }

    /// Wraps text that naga has already rendered with source spans
    pub fn rendered(severity: Severity, text: String) -> Self {
        Self {
            severity,
            text: text.trim_end().to_string(),
        }
    }
}

/// The diagnostic blob of one compiler call
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Diagnostics {
    entries: Vec<Diagnostic>,
}

impl Diagnostics {
    /// Creates an empty blob
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a diagnostic
    pub fn push(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }

    /// Returns true if no diagnostic was produced
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns true if at least one error-level diagnostic was produced
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    /// Returns the highest severity present, if any
    pub fn max_severity(&self) -> Option<Severity> {
        self.entries.iter().map(|d| d.severity).max()
    }

    /// Iterates over the diagnostics in emission order
    pub fn iter(&self) -> impl Iterator<Item = &Diagnostic> {
        self.entries.iter()
    }

    /// Returns the blob as text, one diagnostic per line group
    pub fn text(&self) -> String {
        self.entries.iter().map(|d| d.text.as_str()).collect::<Vec<_>>().join("\n")
    }
}

impl fmt::Display for Diagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text())
    }
}

/// Result of a compiler call: an optional value plus the call's diagnostics
///
/// The value is present if and only if the call succeeded. Diagnostics may
/// accompany success (warnings) as well as failure.
#[derive(Debug, Clone)]
pub struct Diagnosed<T> {
    /// The produced handle, absent on failure
    pub value: Option<T>,
    /// Diagnostics emitted by this call only
    pub diagnostics: Diagnostics,
}

impl<T> Diagnosed<T> {
    /// A successful call
    pub fn ok(value: T, diagnostics: Diagnostics) -> Self {
        Self { value: Some(value), diagnostics }
    }

    /// A failed call; `diagnostics` must explain the failure
    pub fn failed(diagnostics: Diagnostics) -> Self {
        debug_assert!(diagnostics.has_errors(), "failed call without an error diagnostic");
        Self { value: None, diagnostics }
    }

    /// A failed call with a single error diagnostic
    pub fn error(path: &str, message: impl fmt::Display) -> Self {
        let mut diagnostics = Diagnostics::new();
        diagnostics.push(Diagnostic::error(path, message));
        Self::failed(diagnostics)
    }

    /// Returns true if the call succeeded
    pub fn is_ok(&self) -> bool {
        self.value.is_some()
    }

    /// Splits into the value and the diagnostics
    pub fn into_parts(self) -> (Option<T>, Diagnostics) {
        (self.value, self.diagnostics)
    }
}
