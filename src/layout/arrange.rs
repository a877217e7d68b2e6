//! # Measure and Arrange
//!
//! Sizing and drawing of elements that are placed whole.
//!
//! Box model: `width`/`height` are border-box sizes (padding inside, margin
//! outside). An element with `Fill` horizontal alignment and no fixed width
//! takes the full width of its slot; any other alignment takes its natural
//! width, capped at the slot. Images always take their natural width capped
//! at the slot, whatever the alignment. Vertically, slots handed out by stacks are
//! exactly as tall as the child needs, so vertical alignment only matters
//! inside horizontal stacks and grid cells.

use super::grid;
use super::{DrawOp, LayoutEngine};
use crate::diagnostics::{Diagnostic, DiagnosticCode, DiagnosticSink};
use crate::font::StandardFont;
use crate::image_loader::{abbreviate, LoadedImage};
use crate::model::{
    Edges, Element, ElementKind, Grid, PageDefaults, Paragraph, Rect, Stack, TrackSize,
};
use crate::style::{
    Color, HorizontalAlignment, TextAlign, TextDecorations, TextTransform, VerticalAlignment,
};
use crate::text::{apply_transform, BrokenLine};
use std::sync::Arc;

/// Paragraph properties with page defaults filled in.
#[derive(Debug, Clone)]
pub(crate) struct TextStyle {
    pub font: StandardFont,
    pub font_size: f64,
    pub color: Color,
    pub decorations: TextDecorations,
    pub transform: TextTransform,
    pub align: TextAlign,
    /// Line box height in points.
    pub line_height: f64,
}

impl TextStyle {
    pub fn of(p: &Paragraph, d: &PageDefaults) -> Self {
        let font_size = *p.font_size.get_or(&d.font_size);
        Self {
            font: StandardFont::resolve(
                p.font_family.get_or(&d.font_family),
                *p.font_weight.get_or(&d.font_weight),
                p.font_style.get_or(&d.font_style).is_italic(),
            ),
            font_size,
            color: *p.color.get_or(&d.color),
            decorations: *p.decorations.get_or(&d.decorations),
            transform: *p.text_transform.get_or(&d.text_transform),
            // Alignment has no page default; an unstyled paragraph is Left.
            align: *p.text_align.value(),
            line_height: font_size * p.line_height.value().max(0.0),
        }
    }
}

/// A paragraph broken for a given content width.
pub(crate) struct ParagraphLines {
    pub style: TextStyle,
    /// The text after case transforms; line ranges index into it.
    pub text: String,
    pub lines: Vec<BrokenLine>,
}

pub(crate) fn horizontal_offset(align: HorizontalAlignment, avail: f64, box_w: f64) -> f64 {
    let slack = (avail - box_w).max(0.0);
    match align {
        HorizontalAlignment::Start | HorizontalAlignment::Fill => 0.0,
        HorizontalAlignment::Center => slack / 2.0,
        HorizontalAlignment::End => slack,
    }
}

fn vertical_offset(align: VerticalAlignment, avail: f64, box_h: f64) -> f64 {
    let slack = (avail - box_h).max(0.0);
    match align {
        VerticalAlignment::Start | VerticalAlignment::Fill => 0.0,
        VerticalAlignment::Center => slack / 2.0,
        VerticalAlignment::End => slack,
    }
}

/// Track sizes for one grid at one width.
struct GridPlan {
    columns: Vec<f64>,
    rows: Vec<f64>,
    column_gap: f64,
    row_gap: f64,
    cells: Vec<grid::CellPlacement>,
}

impl LayoutEngine<'_> {
    // ── Sizing ─────────────────────────────────────────────────

    /// Border-box width inside a slot of `slot_w`.
    pub(crate) fn box_width(&mut self, el: &Element, slot_w: f64, d: &PageDefaults) -> f64 {
        let avail = (slot_w - el.layout.margin.value().horizontal()).max(0.0);
        if let Some(w) = *el.layout.width.value() {
            return w.max(0.0).min(avail);
        }
        match (&el.kind, el.layout.horizontal_alignment.value()) {
            // Images only ever shrink to their slot; Fill does not upscale them.
            (ElementKind::Image(_), _) => self.natural_box_width(el, d).min(avail),
            (_, HorizontalAlignment::Fill) => avail,
            _ => self.natural_box_width(el, d).min(avail),
        }
    }

    /// Margin-box width the element would like with unlimited room.
    pub(crate) fn intrinsic_width(&mut self, el: &Element, d: &PageDefaults) -> f64 {
        let m = el.layout.margin.value().horizontal();
        match *el.layout.width.value() {
            Some(w) => w.max(0.0) + m,
            None => self.natural_box_width(el, d) + m,
        }
    }

    fn natural_box_width(&mut self, el: &Element, d: &PageDefaults) -> f64 {
        let padding = el.layout.padding.value().horizontal();
        let content = match &el.kind {
            ElementKind::Paragraph(p) => {
                let style = TextStyle::of(p, d);
                let text = apply_transform(&p.text, style.transform, &d.culture);
                self.text
                    .measure_width(self.measurer, &text, style.font, style.font_size)
            }
            ElementKind::Image(img) => self
                .load_image(&img.source)
                .map(|i| i.intrinsic_size().0)
                .unwrap_or(0.0),
            ElementKind::Line(_) => 0.0,
            ElementKind::VerticalStack(s) => s
                .children
                .iter()
                .map(|c| self.intrinsic_width(c, d))
                .fold(0.0, f64::max),
            ElementKind::HorizontalStack(s) => {
                let widths: f64 = s.children.iter().map(|c| self.intrinsic_width(c, d)).sum();
                widths + gaps(s.children.len(), *s.spacing.value())
            }
            ElementKind::Grid(g) => self.grid_intrinsic_width(g, d),
        };
        content + padding
    }

    /// Border-box height for a border-box width of `box_w`.
    pub(crate) fn box_height(&mut self, el: &Element, box_w: f64, d: &PageDefaults) -> f64 {
        if let Some(h) = *el.layout.height.value() {
            return h.max(0.0);
        }
        let padding = el.layout.padding.value();
        let content_w = (box_w - padding.horizontal()).max(0.0);
        self.content_height(el, content_w, d) + padding.vertical()
    }

    /// Margin-box height inside a slot of `slot_w`.
    pub(crate) fn outer_height(&mut self, el: &Element, slot_w: f64, d: &PageDefaults) -> f64 {
        let box_w = self.box_width(el, slot_w, d);
        self.box_height(el, box_w, d) + el.layout.margin.value().vertical()
    }

    fn content_height(&mut self, el: &Element, content_w: f64, d: &PageDefaults) -> f64 {
        match &el.kind {
            ElementKind::Paragraph(p) => {
                let broken = self.paragraph_lines(p, content_w, d);
                broken.lines.len() as f64 * broken.style.line_height
            }
            ElementKind::Image(img) => match self.load_image(&img.source) {
                Some(image) => {
                    let (nw, nh) = image.intrinsic_size();
                    if nw > 0.0 {
                        nh * content_w / nw
                    } else {
                        0.0
                    }
                }
                None => 0.0,
            },
            ElementKind::Line(rule) => rule.thickness.value().max(0.0),
            ElementKind::VerticalStack(s) => {
                let heights: f64 = s
                    .children
                    .iter()
                    .map(|c| self.outer_height(c, content_w, d))
                    .sum();
                heights + gaps(s.children.len(), *s.spacing.value())
            }
            ElementKind::HorizontalStack(s) => {
                let slots = self.hstack_slots(s, content_w, d);
                s.children
                    .iter()
                    .zip(slots)
                    .map(|(c, w)| self.outer_height(c, w, d))
                    .fold(0.0, f64::max)
            }
            ElementKind::Grid(g) => {
                let plan = self.plan_grid(g, content_w, None, d);
                grid::total_size(&plan.rows, plan.row_gap)
            }
        }
    }

    pub(crate) fn paragraph_lines(
        &mut self,
        p: &Paragraph,
        content_w: f64,
        d: &PageDefaults,
    ) -> ParagraphLines {
        let style = TextStyle::of(p, d);
        let text = apply_transform(&p.text, style.transform, &d.culture);
        let lines = self.text.break_into_lines(
            self.measurer,
            &text,
            content_w,
            style.font,
            style.font_size,
        );
        ParagraphLines { style, text, lines }
    }

    pub(crate) fn load_image(&mut self, source: &str) -> Option<Arc<LoadedImage>> {
        self.images.get_or_load(source).ok()
    }

    /// Slot widths for horizontal stack children: natural widths, shrunk
    /// proportionally when they do not all fit.
    fn hstack_slots(&mut self, s: &Stack, content_w: f64, d: &PageDefaults) -> Vec<f64> {
        let wants: Vec<f64> = s
            .children
            .iter()
            .map(|c| self.intrinsic_width(c, d))
            .collect();
        let avail = (content_w - gaps(wants.len(), *s.spacing.value())).max(0.0);
        let total: f64 = wants.iter().sum();
        if total <= avail || total <= 0.0 {
            wants
        } else {
            let scale = avail / total;
            wants.iter().map(|w| w * scale).collect()
        }
    }

    fn grid_intrinsic_width(&mut self, g: &Grid, d: &PageDefaults) -> f64 {
        let columns = grid::column_template(&g.columns);
        let rows = grid::row_template(&g.rows, &g.cells);
        let cells = grid::place_cells(&g.cells, rows.len(), columns.len());
        let content = self.column_content_sizes(g, &cells, columns.len(), d);
        let sizes: Vec<f64> = columns
            .iter()
            .zip(&content)
            .map(|(track, c)| match track {
                TrackSize::Fixed(pts) => pts.max(0.0),
                TrackSize::Auto | TrackSize::Star(_) => *c,
            })
            .collect();
        grid::total_size(&sizes, *g.column_spacing.value())
    }

    fn column_content_sizes(
        &mut self,
        g: &Grid,
        cells: &[grid::CellPlacement],
        columns: usize,
        d: &PageDefaults,
    ) -> Vec<f64> {
        let mut sizes = vec![0.0; columns];
        for cell in cells.iter().filter(|c| c.column_span == 1) {
            let w = self.intrinsic_width(&g.cells[cell.index].element, d);
            sizes[cell.column] = f64::max(sizes[cell.column], w);
        }
        sizes
    }

    /// Resolve a grid's tracks. `fixed_h` is the content height when the
    /// grid has an explicit height; only then do star rows share space.
    fn plan_grid(
        &mut self,
        g: &Grid,
        content_w: f64,
        fixed_h: Option<f64>,
        d: &PageDefaults,
    ) -> GridPlan {
        let column_gap = *g.column_spacing.value();
        let row_gap = *g.row_spacing.value();
        let column_template = grid::column_template(&g.columns);
        let row_template = grid::row_template(&g.rows, &g.cells);
        let cells = grid::place_cells(&g.cells, row_template.len(), column_template.len());

        let column_content = self.column_content_sizes(g, &cells, column_template.len(), d);
        let columns = grid::resolve_tracks(&column_template, content_w, column_gap, &column_content);

        let mut row_content = vec![0.0; row_template.len()];
        for cell in cells.iter().filter(|c| c.row_span == 1) {
            let cell_w = grid::span_size(&columns, cell.column, cell.column_span, column_gap);
            let h = self.outer_height(&g.cells[cell.index].element, cell_w, d);
            row_content[cell.row] = f64::max(row_content[cell.row], h);
        }
        let rows = match fixed_h {
            Some(h) => grid::resolve_tracks(&row_template, h, row_gap, &row_content),
            None => grid::resolve_tracks(
                &grid::stars_as_auto(&row_template),
                0.0,
                row_gap,
                &row_content,
            ),
        };

        GridPlan {
            columns,
            rows,
            column_gap,
            row_gap,
            cells,
        }
    }

    // ── Drawing ────────────────────────────────────────────────

    /// Draw `el` whole inside `slot` (its margin box).
    pub(crate) fn arrange(
        &mut self,
        el: &Element,
        slot: Rect,
        d: &PageDefaults,
        sink: &mut dyn DiagnosticSink,
        ops: &mut Vec<DrawOp>,
    ) {
        let margin = *el.layout.margin.value();
        let avail_w = (slot.width - margin.horizontal()).max(0.0);
        let avail_h = (slot.height - margin.vertical()).max(0.0);
        let box_w = self.box_width(el, slot.width, d);
        let mut box_h = self.box_height(el, box_w, d);
        let v_align = *el.layout.vertical_alignment.value();
        if el.layout.height.value().is_none() && v_align == VerticalAlignment::Fill {
            box_h = box_h.max(avail_h);
        }

        let border = Rect::new(
            slot.x
                + margin.left
                + horizontal_offset(*el.layout.horizontal_alignment.value(), avail_w, box_w),
            slot.y + margin.top + vertical_offset(v_align, avail_h, box_h),
            box_w,
            box_h,
        );
        push_box(el, border, ops);
        let content = border.deflate(el.layout.padding.value());

        match &el.kind {
            ElementKind::Paragraph(p) => {
                let broken = self.paragraph_lines(p, content.width, d);
                self.draw_lines(&broken.style, &broken.lines, content, ops);
            }
            ElementKind::Image(img) => self.draw_image(el, &img.source, content, sink, ops),
            ElementKind::Line(rule) => {
                let thickness = rule.thickness.value().max(0.0);
                if thickness > 0.0 && content.width > 0.0 {
                    let y = content.y + thickness / 2.0;
                    ops.push(DrawOp::Line {
                        x1: content.x,
                        y1: y,
                        x2: content.right(),
                        y2: y,
                        width: thickness,
                        color: *rule.color.get_or(&d.color),
                    });
                }
            }
            ElementKind::VerticalStack(s) => {
                let spacing = *s.spacing.value();
                let mut y = content.y;
                for child in &s.children {
                    let h = self.outer_height(child, content.width, d);
                    self.arrange(child, Rect::new(content.x, y, content.width, h), d, sink, ops);
                    y += h + spacing;
                }
            }
            ElementKind::HorizontalStack(s) => {
                let spacing = *s.spacing.value();
                let slots = self.hstack_slots(s, content.width, d);
                let mut x = content.x;
                for (child, w) in s.children.iter().zip(slots) {
                    self.arrange(child, Rect::new(x, content.y, w, content.height), d, sink, ops);
                    x += w + spacing;
                }
            }
            ElementKind::Grid(g) => {
                let fixed_h = el.layout.height.value().map(|_| content.height);
                let plan = self.plan_grid(g, content.width, fixed_h, d);
                let col_x = grid::track_offsets(&plan.columns, plan.column_gap);
                let row_y = grid::track_offsets(&plan.rows, plan.row_gap);
                for cell in &plan.cells {
                    let rect = Rect::new(
                        content.x + col_x[cell.column],
                        content.y + row_y[cell.row],
                        grid::span_size(&plan.columns, cell.column, cell.column_span, plan.column_gap),
                        grid::span_size(&plan.rows, cell.row, cell.row_span, plan.row_gap),
                    );
                    self.arrange(&g.cells[cell.index].element, rect, d, sink, ops);
                }
            }
        }
    }

    /// Emit text runs and decorations for `lines`, top-down from `content.y`.
    pub(crate) fn draw_lines(
        &self,
        style: &TextStyle,
        lines: &[BrokenLine],
        content: Rect,
        ops: &mut Vec<DrawOp>,
    ) {
        let ascent = self.measurer.ascent(style.font, style.font_size);
        let half_leading = (style.line_height - style.font_size) / 2.0;
        for (i, line) in lines.iter().enumerate() {
            if line.text.is_empty() {
                continue;
            }
            let x = content.x
                + match style.align {
                    TextAlign::Left | TextAlign::Justify => 0.0,
                    TextAlign::Center => (content.width - line.width) / 2.0,
                    TextAlign::Right => content.width - line.width,
                };
            let baseline = content.y + i as f64 * style.line_height + half_leading + ascent;
            ops.push(DrawOp::Text {
                x,
                y: baseline,
                text: line.text.clone(),
                font: style.font,
                font_size: style.font_size,
                color: style.color,
            });

            let stroke = (style.font_size * 0.05).max(0.5);
            if style.decorations.underline {
                let y = baseline + style.font_size * 0.12;
                ops.push(decoration(x, y, line.width, stroke, style.color));
            }
            if style.decorations.strikethrough {
                let y = baseline - style.font_size * 0.3;
                ops.push(decoration(x, y, line.width, stroke, style.color));
            }
        }
    }

    fn draw_image(
        &mut self,
        el: &Element,
        source: &str,
        content: Rect,
        sink: &mut dyn DiagnosticSink,
        ops: &mut Vec<DrawOp>,
    ) {
        let image = match self.images.get_or_load(source) {
            Ok(image) => image,
            Err(e) => {
                sink.report(
                    Diagnostic::warning(
                        DiagnosticCode::ResourceUnreadable,
                        format!(
                            "{} skipped: image '{}' could not be loaded: {}",
                            el.describe(),
                            abbreviate(source),
                            e
                        ),
                    )
                    .with_bounds(content),
                );
                return;
            }
        };
        let (nw, nh) = image.intrinsic_size();
        if nw <= 0.0 || nh <= 0.0 || content.width <= 0.0 || content.height <= 0.0 {
            return;
        }
        // Uniform fit, centred in the content box.
        let scale = f64::min(content.width / nw, content.height / nh);
        let (w, h) = (nw * scale, nh * scale);
        ops.push(DrawOp::Image {
            rect: Rect::new(
                content.x + (content.width - w) / 2.0,
                content.y + (content.height - h) / 2.0,
                w,
                h,
            ),
            image,
        });
    }
}

/// Background fill and border stroke for a border box, under its content.
pub(crate) fn push_box(el: &Element, border: Rect, ops: &mut Vec<DrawOp>) {
    if border.width <= 0.0 || border.height <= 0.0 {
        return;
    }
    if let Some(color) = *el.layout.background.value() {
        if color.is_visible() {
            ops.push(DrawOp::FillRect {
                rect: border,
                color,
            });
        }
    }
    let width = *el.layout.border_width.value();
    if let Some(color) = *el.layout.border_color.value() {
        if color.is_visible() && width > 0.0 {
            // Keep the stroke inside the box.
            let inset = (width / 2.0).min(border.width / 2.0).min(border.height / 2.0);
            ops.push(DrawOp::StrokeRect {
                rect: border.deflate(&Edges::uniform(inset)),
                color,
                width,
            });
        }
    }
}

fn decoration(x: f64, y: f64, width: f64, stroke: f64, color: Color) -> DrawOp {
    DrawOp::Line {
        x1: x,
        y1: y,
        x2: x + width,
        y2: y,
        width: stroke,
        color,
    }
}

fn gaps(count: usize, spacing: f64) -> f64 {
    spacing * count.saturating_sub(1) as f64
}

/// Shift `edges.top` to zero. Continuations start flush with the page.
pub(crate) fn without_top(edges: &Edges) -> Edges {
    Edges { top: 0.0, ..*edges }
}

#[cfg(test)]
mod tests {
    use super::super::tests::Monospace;
    use super::*;
    use crate::diagnostics::DiagnosticLog;
    use crate::image_loader::tests::png_data_uri;
    use crate::model::{GridCell, Paragraph};
    use crate::style::Priority;

    fn engine(m: &Monospace) -> LayoutEngine<'_> {
        LayoutEngine::new(m)
    }

    #[test]
    fn fill_takes_slot_width() {
        let m = Monospace;
        let mut e = engine(&m);
        let d = PageDefaults::default();
        let el = Element::paragraph("hi");
        assert_eq!(e.box_width(&el, 300.0, &d), 300.0);
    }

    #[test]
    fn start_takes_natural_width() {
        let m = Monospace;
        let mut e = engine(&m);
        let d = PageDefaults {
            font_size: 10.0,
            ..Default::default()
        };
        let mut el = Element::paragraph("abcd");
        el.layout
            .horizontal_alignment
            .set(HorizontalAlignment::Start, Priority::Local);
        el.layout.padding.set(Edges::uniform(2.0), Priority::Local);
        // 4 chars * 5pt + 4pt padding
        assert_eq!(e.box_width(&el, 300.0, &d), 24.0);
    }

    #[test]
    fn vstack_height_adds_spacing_and_margins() {
        let m = Monospace;
        let mut e = engine(&m);
        let d = PageDefaults {
            font_size: 10.0,
            ..Default::default()
        };
        let mut child = Element::paragraph("x");
        child.layout.margin.set(Edges::symmetric(5.0, 0.0), Priority::Local);
        let mut stack = Element::vstack(vec![child.clone(), child]);
        if let ElementKind::VerticalStack(s) = &mut stack.kind {
            s.spacing.set(4.0, Priority::Local);
        }
        // each child: 12pt line + 10pt margins
        assert_eq!(e.outer_height(&stack, 100.0, &d), 22.0 * 2.0 + 4.0);
    }

    #[test]
    fn hstack_height_is_tallest_child() {
        let m = Monospace;
        let mut e = engine(&m);
        let d = PageDefaults {
            font_size: 10.0,
            ..Default::default()
        };
        let tall = Element::from(Paragraph::new("a\nb\nc"));
        let short = Element::paragraph("a");
        let row = Element::hstack(vec![tall, short]);
        assert_eq!(e.outer_height(&row, 100.0, &d), 36.0);
    }

    #[test]
    fn grid_star_column_gets_remainder() {
        let m = Monospace;
        let mut e = engine(&m);
        let d = PageDefaults {
            font_size: 10.0,
            ..Default::default()
        };
        let g = Element::grid(
            vec![TrackSize::Fixed(50.0), TrackSize::Star(1.0)],
            vec![],
            vec![
                GridCell::new(0, 0, Element::paragraph("left")),
                GridCell::new(0, 1, Element::paragraph("right")),
            ],
        );
        let mut ops = Vec::new();
        e.arrange(
            &g,
            Rect::new(0.0, 0.0, 200.0, 12.0),
            &d,
            &mut DiagnosticLog::new(),
            &mut ops,
        );
        let xs: Vec<f64> = ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Text { x, .. } => Some(*x),
                _ => None,
            })
            .collect();
        assert_eq!(xs, vec![0.0, 50.0]);
    }

    #[test]
    fn right_aligned_text() {
        let m = Monospace;
        let mut e = engine(&m);
        let d = PageDefaults {
            font_size: 10.0,
            ..Default::default()
        };
        let el: Element = Paragraph::new("abc").text_align(TextAlign::Right).into();
        let mut ops = Vec::new();
        e.arrange(
            &el,
            Rect::new(0.0, 0.0, 100.0, 12.0),
            &d,
            &mut DiagnosticLog::new(),
            &mut ops,
        );
        match &ops[0] {
            DrawOp::Text { x, .. } => assert_eq!(*x, 85.0),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn underline_emits_line_op() {
        let m = Monospace;
        let mut e = engine(&m);
        let d = PageDefaults {
            decorations: TextDecorations {
                underline: true,
                strikethrough: false,
            },
            ..Default::default()
        };
        let el = Element::paragraph("under");
        let mut ops = Vec::new();
        e.arrange(
            &el,
            Rect::new(0.0, 0.0, 100.0, 20.0),
            &d,
            &mut DiagnosticLog::new(),
            &mut ops,
        );
        assert!(matches!(ops[1], DrawOp::Line { .. }));
    }

    #[test]
    fn border_is_stroked_inside_the_box() {
        let m = Monospace;
        let mut e = engine(&m);
        let d = PageDefaults::default();
        let mut el = Element::line();
        el.layout.height.set(Some(20.0), Priority::Local);
        el.layout.border_color.set(Some(Color::RED), Priority::Local);
        el.layout.border_width.set(2.0, Priority::Local);
        let mut ops = Vec::new();
        e.arrange(
            &el,
            Rect::new(0.0, 0.0, 100.0, 20.0),
            &d,
            &mut DiagnosticLog::new(),
            &mut ops,
        );
        match &ops[0] {
            DrawOp::StrokeRect { rect, color, width } => {
                assert_eq!(*color, Color::RED);
                assert_eq!(*width, 2.0);
                assert_eq!(*rect, Rect::new(1.0, 1.0, 98.0, 18.0));
            }
            other => panic!("border should come first, got {:?}", other),
        }
    }

    fn drawn_image_rect(e: &mut LayoutEngine<'_>, el: &Element, slot_w: f64) -> Rect {
        let d = PageDefaults::default();
        let h = e.outer_height(el, slot_w, &d);
        let mut ops = Vec::new();
        e.arrange(
            el,
            Rect::new(0.0, 0.0, slot_w, h),
            &d,
            &mut DiagnosticLog::new(),
            &mut ops,
        );
        ops.iter()
            .find_map(|op| match op {
                DrawOp::Image { rect, .. } => Some(*rect),
                _ => None,
            })
            .expect("image drawn")
    }

    #[test]
    fn small_image_keeps_natural_size() {
        let m = Monospace;
        let mut e = engine(&m);
        let el = Element::image(&png_data_uri(40, 20));
        assert_eq!(drawn_image_rect(&mut e, &el, 100.0), Rect::new(0.0, 0.0, 40.0, 20.0));
    }

    #[test]
    fn tall_image_is_not_stretched_to_column() {
        let m = Monospace;
        let mut e = engine(&m);
        let el = Element::image(&png_data_uri(10, 600));
        assert_eq!(e.outer_height(&el, 500.0, &PageDefaults::default()), 600.0);
        assert_eq!(drawn_image_rect(&mut e, &el, 500.0), Rect::new(0.0, 0.0, 10.0, 600.0));
    }

    #[test]
    fn wide_image_scales_down_uniformly() {
        let m = Monospace;
        let mut e = engine(&m);
        let el = Element::image(&png_data_uri(200, 100));
        assert_eq!(drawn_image_rect(&mut e, &el, 100.0), Rect::new(0.0, 0.0, 100.0, 50.0));
    }

    #[test]
    fn unreadable_image_is_skipped_with_warning() {
        let m = Monospace;
        let mut e = engine(&m);
        let d = PageDefaults::default();
        let el = Element::image("./missing/logo.png");
        let mut log = DiagnosticLog::new();
        let mut ops = Vec::new();
        assert_eq!(e.outer_height(&el, 100.0, &d), 0.0);
        e.arrange(&el, Rect::new(0.0, 0.0, 100.0, 0.0), &d, &mut log, &mut ops);
        assert!(ops.is_empty());
        assert_eq!(log.count(DiagnosticCode::ResourceUnreadable), 1);
    }
}
