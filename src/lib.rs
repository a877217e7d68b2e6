//! # Folio
//!
//! A paginating document engine: styled element trees in, paged PDF out.
//!
//! Content is never laid out on an endless canvas and sliced afterwards.
//! Each page spec is fitted into its page's content area; what does not fit
//! becomes a continuation that opens the next physical page, with its
//! styling already settled.
//!
//! ## Architecture
//!
//! ```text
//! Input (JSON/API)
//!       ↓
//!   [model]      Document tree: pages, elements, resource dictionaries
//!       ↓
//!   [style]      Priority-aware properties, implicit and explicit styles
//!       ↓
//!   [layout]     Page-bounded measure, arrange and split
//!       ↓
//!   [assembler]  One page spec -> one or more physical pages
//!       ↓
//!   [pdf]        Serialize to PDF bytes
//! ```
//!
//! Recoverable problems (a missing style key, an unreadable image) are
//! reported to a [`DiagnosticSink`](diagnostics::DiagnosticSink) and the
//! build carries on. Conditions that make the output meaningless (a style
//! cycle, content that can never fit) come back as [`FolioError`].

pub mod assembler;
pub mod diagnostics;
pub mod error;
pub mod font;
pub mod image_loader;
pub mod layout;
pub mod model;
pub mod pdf;
pub mod style;
pub mod text;

pub use error::FolioError;

use assembler::DocumentAssembler;
use diagnostics::{DiagnosticSink, LogSink};
use font::FontContext;
use layout::PageOutput;
use model::Document;
use pdf::PdfWriter;

/// Render a document to PDF bytes.
///
/// This is the primary entry point. Diagnostics go to the `log` facade.
pub fn render(document: &Document) -> Result<Vec<u8>, FolioError> {
    render_with_diagnostics(document, &mut LogSink)
}

/// Render a document to PDF bytes, reporting diagnostics to `sink`.
pub fn render_with_diagnostics(
    document: &Document,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<u8>, FolioError> {
    let pages = layout(document, sink)?;
    PdfWriter::new().write(&pages, &document.metadata)
}

/// Render a document described as JSON to PDF bytes.
pub fn render_json(json: &str) -> Result<Vec<u8>, FolioError> {
    let document: Document = serde_json::from_str(json)?;
    render(&document)
}

/// Resolve styles and paginate without serializing. Each returned page
/// holds its positioned draw operations.
pub fn layout(
    document: &Document,
    sink: &mut dyn DiagnosticSink,
) -> Result<Vec<PageOutput>, FolioError> {
    let font_context = FontContext::new();
    DocumentAssembler::new(&font_context).assemble(document, sink)
}
