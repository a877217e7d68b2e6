//! # Pagination
//!
//! Fits one page's worth of content into the page's content area and hands
//! back whatever did not fit.
//!
//! The algorithm never lays content out on an unbounded canvas:
//!
//! 1. Measure the node against the room left on the page.
//! 2. If it fits, arrange it and move the cursor down.
//! 3. If it doesn't fit and is atomic (image, rule, horizontal stack, grid,
//!    fixed height, `keep_together`), leave it for the next page.
//! 4. If it doesn't fit and is a paragraph, place as many whole lines as the
//!    room and the orphan/widow minimums allow, and carry the rest.
//! 5. If it doesn't fit and is a vertical stack, place children one by one;
//!    the first child that overflows is split or deferred, and it plus all
//!    later children become the stack's remainder.
//!
//! Remainders are frozen copies: every property pinned at `Local` with page
//! defaults materialised, top margin zeroed. They travel as
//! [`PageContent::Continuation`], which style resolution never touches.
//!
//! A node that cannot place anything at the top of an empty page can never
//! fit, and fails the build instead of looping.

pub mod arrange;
pub mod grid;
pub mod page_break;

use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::error::FolioError;
use crate::font::{StandardFont, TextMeasurer};
use crate::image_loader::{ImageCache, LoadedImage};
use crate::model::{Element, ElementKind, PageDefaults, Paragraph, Rect, Stack};
use crate::style::Color;
use crate::text::{tail_from, TextLayout};
use arrange::{horizontal_offset, push_box, without_top};
use page_break::{count_fitting, decide_break, BreakDecision, EPSILON};
use std::sync::Arc;

/// A positioned drawing instruction, in page coordinates (origin top-left,
/// y down, points).
#[derive(Debug, Clone)]
pub enum DrawOp {
    /// A run of text. `y` is the baseline.
    Text {
        x: f64,
        y: f64,
        text: String,
        font: StandardFont,
        font_size: f64,
        color: Color,
    },
    FillRect {
        rect: Rect,
        color: Color,
    },
    StrokeRect {
        rect: Rect,
        color: Color,
        width: f64,
    },
    Line {
        x1: f64,
        y1: f64,
        x2: f64,
        y2: f64,
        width: f64,
        color: Color,
    },
    Image {
        rect: Rect,
        image: Arc<LoadedImage>,
    },
}

/// One finished physical page.
#[derive(Debug, Clone)]
pub struct PageOutput {
    pub width: f64,
    pub height: f64,
    pub background: Option<Color>,
    /// BCP 47 tag the page's text was shaped for.
    pub culture: String,
    pub ops: Vec<DrawOp>,
}

/// What a page starts from: authored content, or the remainder of the
/// previous page.
#[derive(Debug, Clone)]
pub enum PageContent {
    Element(Element),
    Continuation(Continuation),
}

impl PageContent {
    pub fn element(&self) -> &Element {
        match self {
            PageContent::Element(el) => el,
            PageContent::Continuation(c) => &c.remaining,
        }
    }
}

/// Content carried onto the next page, with its styling already resolved.
#[derive(Debug, Clone)]
pub struct Continuation {
    pub remaining: Element,
}

/// The outcome of laying out one page.
#[derive(Debug)]
pub struct PageResult {
    pub ops: Vec<DrawOp>,
    /// `None` once everything has been placed.
    pub continuation: Option<Continuation>,
}

/// Where a node may go: a column of `width` starting at (`x`, `y`) with
/// `room` points left before the page ends.
#[derive(Debug, Clone, Copy)]
struct Slot {
    x: f64,
    y: f64,
    width: f64,
    room: f64,
}

/// What placing one node did.
enum Placement {
    /// Placed entirely, using this much height.
    Whole(f64),
    /// Placed partly, using this much height; the rest carries over.
    Split(f64, Element),
    /// Nothing placed.
    Deferred,
}

pub struct LayoutEngine<'m> {
    measurer: &'m dyn TextMeasurer,
    text: TextLayout,
    images: ImageCache,
}

impl<'m> LayoutEngine<'m> {
    pub fn new(measurer: &'m dyn TextMeasurer) -> Self {
        Self {
            measurer,
            text: TextLayout::new(),
            images: ImageCache::new(),
        }
    }

    /// Lay out `content` into `area`, starting at the top of an empty page.
    pub fn paginate(
        &mut self,
        content: &PageContent,
        area: Rect,
        defaults: &PageDefaults,
        sink: &mut dyn DiagnosticSink,
    ) -> Result<PageResult, FolioError> {
        let mut ops = Vec::new();
        let slot = Slot {
            x: area.x,
            y: area.y,
            width: area.width,
            room: area.height,
        };
        let continuation = match self.place(content.element(), slot, true, defaults, sink, &mut ops)? {
            Placement::Whole(_) => None,
            Placement::Split(_, remaining) => Some(Continuation { remaining }),
            Placement::Deferred => {
                return Err(FolioError::Render(format!(
                    "{} placed nothing on an empty page",
                    content.element().describe()
                )))
            }
        };
        Ok(PageResult { ops, continuation })
    }

    /// `fresh` is true while nothing has been placed on the page yet.
    fn place(
        &mut self,
        el: &Element,
        slot: Slot,
        fresh: bool,
        d: &PageDefaults,
        sink: &mut dyn DiagnosticSink,
        ops: &mut Vec<DrawOp>,
    ) -> Result<Placement, FolioError> {
        let outer_h = self.outer_height(el, slot.width, d);
        if outer_h <= slot.room + EPSILON {
            self.arrange(el, Rect::new(slot.x, slot.y, slot.width, outer_h), d, sink, ops);
            return Ok(Placement::Whole(outer_h));
        }

        if el.is_splittable() {
            match &el.kind {
                ElementKind::Paragraph(p) => {
                    return self.split_paragraph(el, p, slot, fresh, d, sink, ops)
                }
                ElementKind::VerticalStack(s) => {
                    return self.split_stack(el, s, slot, fresh, d, sink, ops)
                }
                _ => {}
            }
        }

        if fresh {
            return Err(oversized(el, outer_h, slot.room, sink));
        }
        log::debug!("{} moved to the next page", el.describe());
        sink.report(
            Diagnostic::info(
                DiagnosticCode::AtomicElementPaged,
                format!(
                    "{} needs {:.1}pt but only {:.1}pt remain; moved to the next page",
                    el.describe(),
                    outer_h,
                    slot.room.max(0.0)
                ),
            )
            .with_bounds(Rect::new(slot.x, slot.y, slot.width, outer_h)),
        );
        Ok(Placement::Deferred)
    }

    #[allow(clippy::too_many_arguments)]
    fn split_paragraph(
        &mut self,
        el: &Element,
        p: &Paragraph,
        slot: Slot,
        fresh: bool,
        d: &PageDefaults,
        sink: &mut dyn DiagnosticSink,
        ops: &mut Vec<DrawOp>,
    ) -> Result<Placement, FolioError> {
        let margin = *el.layout.margin.value();
        let padding = *el.layout.padding.value();
        let box_w = self.box_width(el, slot.width, d);
        let broken = self.paragraph_lines(p, (box_w - padding.horizontal()).max(0.0), d);
        let line_h = broken.style.line_height;
        let total = broken.lines.len();

        let room = slot.room - margin.top - padding.vertical();
        let heights = vec![line_h; total];
        let keep = match decide_break(
            room.max(0.0),
            &heights,
            true,
            *p.orphans.value() as usize,
            *p.widows.value() as usize,
        ) {
            BreakDecision::Place => total,
            BreakDecision::Split {
                items_on_current_page,
            } => items_on_current_page,
            BreakDecision::MoveToNextPage => 0,
        };
        // At the top of an empty page anything that fits beats moving on.
        let keep = if keep == 0 && fresh {
            count_fitting(room, &heights)
        } else {
            keep
        };

        if keep == 0 {
            if fresh {
                let required = margin.top + padding.vertical() + line_h;
                return Err(oversized(el, required, slot.room, sink));
            }
            log::debug!("{} moved to the next page", el.describe());
            return Ok(Placement::Deferred);
        }

        if keep >= total {
            // Every line fits; only trailing margin spills past the page.
            let outer_h = self.outer_height(el, slot.width, d);
            self.arrange(el, Rect::new(slot.x, slot.y, slot.width, outer_h), d, sink, ops);
            return Ok(Placement::Whole(outer_h.min(slot.room)));
        }

        let avail_w = (slot.width - margin.horizontal()).max(0.0);
        let border = Rect::new(
            slot.x
                + margin.left
                + horizontal_offset(*el.layout.horizontal_alignment.value(), avail_w, box_w),
            slot.y + margin.top,
            box_w,
            padding.vertical() + keep as f64 * line_h,
        );
        push_box(el, border, ops);
        self.draw_lines(
            &broken.style,
            &broken.lines[..keep],
            border.deflate(&padding),
            ops,
        );

        let mut remaining = el.clone();
        if let ElementKind::Paragraph(rest) = &mut remaining.kind {
            rest.text = tail_from(&broken.text, broken.lines[keep].start);
        }
        remaining.freeze(d);
        remaining.layout.margin.freeze(without_top(&margin));

        log::debug!(
            "{} split after {} of {} lines",
            el.describe(),
            keep,
            total
        );
        sink.report(
            Diagnostic::info(
                DiagnosticCode::LayoutOverflow,
                format!(
                    "{} split after {} of {} lines; the rest continues on the next page",
                    el.describe(),
                    keep,
                    total
                ),
            )
            .with_bounds(border),
        );
        Ok(Placement::Split(margin.top + border.height, remaining))
    }

    #[allow(clippy::too_many_arguments)]
    fn split_stack(
        &mut self,
        el: &Element,
        s: &Stack,
        slot: Slot,
        fresh: bool,
        d: &PageDefaults,
        sink: &mut dyn DiagnosticSink,
        ops: &mut Vec<DrawOp>,
    ) -> Result<Placement, FolioError> {
        let margin = *el.layout.margin.value();
        let padding = *el.layout.padding.value();
        let box_w = self.box_width(el, slot.width, d);
        let avail_w = (slot.width - margin.horizontal()).max(0.0);
        let x = slot.x
            + margin.left
            + horizontal_offset(*el.layout.horizontal_alignment.value(), avail_w, box_w);
        let top = slot.y + margin.top;
        let limit = slot.y + slot.room - padding.bottom;
        let child_x = x + padding.left;
        let child_w = (box_w - padding.horizontal()).max(0.0);
        let spacing = *s.spacing.value();

        // Children draw over the background, which needs the final height.
        let mut child_ops = Vec::new();
        let mut cursor = top + padding.top;
        let mut rest: Option<Vec<Element>> = None;
        let mut placed = 0;

        for (i, child) in s.children.iter().enumerate() {
            let gap = if i > 0 { spacing } else { 0.0 };
            let child_slot = Slot {
                x: child_x,
                y: cursor + gap,
                width: child_w,
                room: limit - cursor - gap,
            };
            match self.place(child, child_slot, fresh && i == 0, d, sink, &mut child_ops)? {
                Placement::Whole(h) => {
                    cursor += gap + h;
                    placed += 1;
                }
                Placement::Split(h, remainder) => {
                    cursor += gap + h;
                    placed += 1;
                    let mut carried = vec![remainder];
                    carried.extend(s.children[i + 1..].iter().cloned());
                    rest = Some(carried);
                    break;
                }
                Placement::Deferred if i == 0 => return Ok(Placement::Deferred),
                Placement::Deferred => {
                    rest = Some(s.children[i..].to_vec());
                    break;
                }
            }
        }

        let border = Rect::new(x, top, box_w, cursor - top + padding.bottom);
        push_box(el, border, ops);
        ops.append(&mut child_ops);

        let Some(children) = rest else {
            return Ok(Placement::Whole(margin.top + border.height + margin.bottom));
        };

        let mut remaining = el.clone();
        if let ElementKind::VerticalStack(stack) = &mut remaining.kind {
            stack.children = children;
        }
        remaining.freeze(d);
        remaining.layout.margin.freeze(without_top(&margin));

        log::debug!("{} continues on the next page", el.describe());
        sink.report(
            Diagnostic::info(
                DiagnosticCode::LayoutOverflow,
                format!(
                    "{} overflowed after {} of {} children; the rest continues on the next page",
                    el.describe(),
                    placed,
                    s.children.len()
                ),
            )
            .with_bounds(border),
        );
        Ok(Placement::Split(margin.top + border.height, remaining))
    }
}

fn oversized(
    el: &Element,
    required: f64,
    available: f64,
    sink: &mut dyn DiagnosticSink,
) -> FolioError {
    let element = el.describe();
    sink.report(Diagnostic::error(
        DiagnosticCode::PageContentOversized,
        format!(
            "{} needs {:.1}pt but an empty page only has {:.1}pt",
            element, required, available
        ),
    ));
    FolioError::ContentOversized {
        element,
        required,
        available,
    }
}
