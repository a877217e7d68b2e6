//! # Diagnostics
//!
//! Structured events the engine reports while building a document. None of
//! these stop the build on their own; fatal conditions additionally return a
//! [`crate::error::FolioError`].
//!
//! Callers choose where events go by passing a [`DiagnosticSink`]:
//! [`DiagnosticLog`] collects them, [`LogSink`] forwards them to the `log`
//! facade.

use crate::model::Rect;
use serde::Serialize;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

/// Stable identifiers for every event the engine can report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum DiagnosticCode {
    MissingStyleKey,
    MissingBasedOnKey,
    StyleCycle,
    StyleTargetMismatch,
    AtomicElementPaged,
    LayoutOverflow,
    PageContentOversized,
    ResourceUnreadable,
}

impl DiagnosticCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            DiagnosticCode::MissingStyleKey => "missing-style-key",
            DiagnosticCode::MissingBasedOnKey => "missing-based-on-key",
            DiagnosticCode::StyleCycle => "style-cycle",
            DiagnosticCode::StyleTargetMismatch => "style-target-mismatch",
            DiagnosticCode::AtomicElementPaged => "atomic-element-paged",
            DiagnosticCode::LayoutOverflow => "layout-overflow",
            DiagnosticCode::PageContentOversized => "page-content-oversized",
            DiagnosticCode::ResourceUnreadable => "resource-unreadable",
        }
    }
}

impl fmt::Display for DiagnosticCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub code: DiagnosticCode,
    pub message: String,
    /// Where the offending element was, when it had been placed.
    pub bounds: Option<Rect>,
}

impl Diagnostic {
    pub fn new(severity: Severity, code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self {
            severity,
            code,
            message: message.into(),
            bounds: None,
        }
    }

    pub fn error(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Error, code, message)
    }

    pub fn warning(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, code, message)
    }

    pub fn info(code: DiagnosticCode, message: impl Into<String>) -> Self {
        Self::new(Severity::Info, code, message)
    }

    pub fn with_bounds(mut self, bounds: Rect) -> Self {
        self.bounds = Some(bounds);
        self
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

/// Receives events in the order the engine produces them.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

/// Collects every event for later inspection.
#[derive(Debug, Clone, Default)]
pub struct DiagnosticLog {
    entries: Vec<Diagnostic>,
}

impl DiagnosticLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[Diagnostic] {
        &self.entries
    }

    pub fn with_code(&self, code: DiagnosticCode) -> Vec<&Diagnostic> {
        self.entries.iter().filter(|d| d.code == code).collect()
    }

    pub fn count(&self, code: DiagnosticCode) -> usize {
        self.entries.iter().filter(|d| d.code == code).count()
    }

    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|d| d.severity == Severity::Error)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn into_entries(self) -> Vec<Diagnostic> {
        self.entries
    }
}

impl DiagnosticSink for DiagnosticLog {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.entries.push(diagnostic);
    }
}

/// Forwards events to the `log` facade at a level matching their severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DiagnosticSink for LogSink {
    fn report(&mut self, diagnostic: Diagnostic) {
        match diagnostic.severity {
            Severity::Error => log::error!("{}", diagnostic),
            Severity::Warning => log::warn!("{}", diagnostic),
            Severity::Info => log::info!("{}", diagnostic),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_filters_by_code() {
        let mut log = DiagnosticLog::new();
        log.report(Diagnostic::error(DiagnosticCode::MissingStyleKey, "a"));
        log.report(Diagnostic::info(DiagnosticCode::AtomicElementPaged, "b"));
        log.report(Diagnostic::error(DiagnosticCode::MissingStyleKey, "c"));
        assert_eq!(log.count(DiagnosticCode::MissingStyleKey), 2);
        assert_eq!(log.with_code(DiagnosticCode::AtomicElementPaged)[0].message, "b");
        assert!(log.has_errors());
    }

    #[test]
    fn display_uses_stable_code() {
        let d = Diagnostic::warning(DiagnosticCode::ResourceUnreadable, "logo.png");
        assert_eq!(d.to_string(), "[resource-unreadable] logo.png");
    }
}
