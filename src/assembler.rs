//! # Document Assembly
//!
//! Drives the per-page loop: resolve styles on a page's content, paginate
//! it, emit a physical page, and go again with the continuation until
//! nothing is left. Each [`PageSpec`] may therefore produce several
//! physical pages.
//!
//! Page defaults come from the page spec when it has its own, otherwise
//! from the document.

use crate::diagnostics::DiagnosticSink;
use crate::error::FolioError;
use crate::font::TextMeasurer;
use crate::layout::{LayoutEngine, PageContent, PageOutput};
use crate::model::{Document, PageSpec};
use crate::style::resolver::StyleResolver;
use crate::style::resources::DictionaryChain;

/// Physical pages one page spec may produce before the build gives up.
pub const MAX_PAGES_PER_SPEC: usize = 10_000;

pub struct DocumentAssembler<'m> {
    engine: LayoutEngine<'m>,
    max_pages_per_spec: usize,
}

impl<'m> DocumentAssembler<'m> {
    pub fn new(measurer: &'m dyn TextMeasurer) -> Self {
        Self {
            engine: LayoutEngine::new(measurer),
            max_pages_per_spec: MAX_PAGES_PER_SPEC,
        }
    }

    pub fn with_page_limit(mut self, limit: usize) -> Self {
        self.max_pages_per_spec = limit.max(1);
        self
    }

    /// Lay out every page spec of `document`, in order.
    pub fn assemble(
        &mut self,
        document: &Document,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<Vec<PageOutput>, FolioError> {
        let mut pages = Vec::new();
        for (index, spec) in document.pages.iter().enumerate() {
            let before = pages.len();
            self.assemble_spec(document, spec, sink, &mut pages)?;
            log::debug!(
                "page spec {} produced {} physical page(s)",
                index,
                pages.len() - before
            );
        }
        log::info!("laid out {} page(s)", pages.len());
        Ok(pages)
    }

    fn assemble_spec(
        &mut self,
        document: &Document,
        spec: &PageSpec,
        sink: &mut dyn DiagnosticSink,
        pages: &mut Vec<PageOutput>,
    ) -> Result<(), FolioError> {
        let defaults = spec.defaults.as_ref().unwrap_or(&document.defaults);
        let (width, height) = spec.config.dimensions();
        let area = spec.config.content_area();
        let mut resolver =
            StyleResolver::new(DictionaryChain::new(&spec.resources, &document.resources));

        let mut content = PageContent::Element(spec.content.clone());
        let mut emitted = 0;
        loop {
            if emitted >= self.max_pages_per_spec {
                return Err(FolioError::Render(format!(
                    "{} still had content after {} pages",
                    spec.content.describe(),
                    emitted
                )));
            }

            match &mut content {
                PageContent::Element(root) => resolver.resolve(root, sink)?,
                // Carried content was resolved and frozen on its first page.
                PageContent::Continuation(_) => {}
            }

            let result = self.engine.paginate(&content, area, defaults, sink)?;
            pages.push(PageOutput {
                width,
                height,
                background: spec.config.background,
                culture: defaults.culture.clone(),
                ops: result.ops,
            });
            emitted += 1;

            match result.continuation {
                Some(next) => {
                    log::debug!("carrying {} onto a new page", next.remaining.describe());
                    content = PageContent::Continuation(next);
                }
                None => return Ok(()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::{DiagnosticCode, DiagnosticLog};
    use crate::layout::tests::Monospace;
    use crate::layout::DrawOp;
    use crate::model::{Edges, Element, ElementType, PageConfig, PageDefaults, PageSize};
    use crate::style::resources::StyleDefinition;
    use crate::style::{Color, Priority};

    fn small_page(content: Element) -> PageSpec {
        let mut spec = PageSpec::new(content);
        spec.config = PageConfig {
            size: PageSize::Custom {
                width: 40.0,
                height: 120.0,
            },
            margin: Edges::uniform(10.0),
            ..Default::default()
        };
        spec
    }

    fn numbered_lines(n: usize) -> Element {
        let words: Vec<String> = (0..n).map(|i| format!("w{:03}", i)).collect();
        let mut el = Element::paragraph(&words.join(" "));
        if let Some(p) = el.as_paragraph_mut() {
            p.line_height.set(1.0, Priority::Local);
        }
        el
    }

    fn doc(pages: Vec<PageSpec>) -> Document {
        Document {
            pages,
            defaults: PageDefaults {
                font_size: 10.0,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn three_page_heights_give_two_continuations() {
        // Content area is 20 x 100: ten 10pt lines per page.
        let m = Monospace;
        let document = doc(vec![small_page(numbered_lines(30))]);
        let pages = DocumentAssembler::new(&m)
            .assemble(&document, &mut DiagnosticLog::new())
            .unwrap();
        assert_eq!(pages.len(), 3);
        assert!(pages.iter().all(|p| p.ops.len() == 10));
    }

    #[test]
    fn continuation_keeps_resolved_style() {
        let m = Monospace;
        let mut spec = small_page(numbered_lines(15).with_style("Red"));
        spec.resources.insert(
            "Red",
            StyleDefinition::new(ElementType::Paragraph).set(|p| p.color = Some(Color::RED)),
        );
        let pages = DocumentAssembler::new(&m)
            .assemble(&doc(vec![spec]), &mut DiagnosticLog::new())
            .unwrap();
        assert_eq!(pages.len(), 2);
        for page in &pages {
            for op in &page.ops {
                if let DrawOp::Text { color, .. } = op {
                    assert_eq!(*color, Color::RED);
                }
            }
        }
    }

    #[test]
    fn page_defaults_override_document_defaults() {
        let m = Monospace;
        let mut spec = small_page(Element::paragraph("x"));
        spec.defaults = Some(PageDefaults {
            culture: "tr-TR".into(),
            color: Color::BLUE,
            ..Default::default()
        });
        let pages = DocumentAssembler::new(&m)
            .assemble(&doc(vec![spec]), &mut DiagnosticLog::new())
            .unwrap();
        assert_eq!(pages[0].culture, "tr-TR");
        match &pages[0].ops[0] {
            DrawOp::Text { color, .. } => assert_eq!(*color, Color::BLUE),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn page_limit_stops_runaway_documents() {
        let m = Monospace;
        let document = doc(vec![small_page(numbered_lines(50))]);
        let err = DocumentAssembler::new(&m)
            .with_page_limit(2)
            .assemble(&document, &mut DiagnosticLog::new())
            .unwrap_err();
        assert!(matches!(err, FolioError::Render(_)));
    }

    #[test]
    fn missing_style_does_not_abort_other_pages() {
        let m = Monospace;
        let document = doc(vec![
            small_page(Element::paragraph("a").with_style("Nope")),
            small_page(Element::paragraph("b")),
        ]);
        let mut log = DiagnosticLog::new();
        let pages = DocumentAssembler::new(&m)
            .assemble(&document, &mut log)
            .unwrap();
        assert_eq!(pages.len(), 2);
        assert_eq!(log.count(DiagnosticCode::MissingStyleKey), 1);
    }
}
