//! Structured error types for the Folio engine.
//!
//! Only conditions that must stop a build live here. Everything recoverable
//! (a missing style key, an unreadable image) is reported through
//! [`crate::diagnostics`] instead.

use thiserror::Error;

/// The unified error type returned by all public Folio API functions.
#[derive(Debug, Error)]
pub enum FolioError {
    /// JSON input failed to parse as a valid Folio document.
    #[error("Failed to parse document: {source}{}", format_hint(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// A based-on chain loops back on itself.
    #[error("Style cycle {} while styling {element}", .chain.join(" -> "))]
    StyleCycle { chain: Vec<String>, element: String },

    /// An element is taller than an empty page's content area.
    #[error(
        "{element} needs {required:.1}pt but an empty page only has {available:.1}pt; it can never fit"
    )]
    ContentOversized {
        element: String,
        required: f64,
        available: f64,
    },

    /// Layout or PDF generation failed.
    #[error("Render error: {0}")]
    Render(String),
}

fn format_hint(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for FolioError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the Folio document schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input. Is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        FolioError::Parse { source: e, hint }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_carries_hint() {
        let err: FolioError = serde_json::from_str::<serde_json::Value>("{\"a\": 1,}")
            .unwrap_err()
            .into();
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to parse document"));
        assert!(msg.contains("Hint: Check for trailing commas"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn cycle_message_lists_chain() {
        let err = FolioError::StyleCycle {
            chain: vec!["A".into(), "B".into(), "A".into()],
            element: "Paragraph#p1".into(),
        };
        assert_eq!(
            err.to_string(),
            "Style cycle A -> B -> A while styling Paragraph#p1"
        );
    }
}
