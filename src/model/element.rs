//! # Element Tree
//!
//! A closed set of element kinds: text paragraphs, images, rule lines, and
//! three layout containers (vertical stack, horizontal stack, grid). Every
//! styleable value is a [`Styled`] slot so the resolver can arbitrate
//! between the author, keyed styles and type-wide styles.
//!
//! Containers own their children outright; the tree has no sharing.

use super::{Edges, PageDefaults};
use crate::style::{
    Color, FontStyle, HorizontalAlignment, Priority, StylePatch, Styled, TextAlign,
    TextDecorations, TextTransform, VerticalAlignment,
};
use serde::{Deserialize, Serialize};

/// A node in the document tree.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    /// What kind of element this is, with its kind-specific properties.
    pub kind: ElementKind,

    /// Box properties shared by every kind.
    #[serde(default)]
    pub layout: BoxProps,

    /// Key of an explicit style to apply.
    #[serde(default)]
    pub style: Option<String>,

    /// Identifier reported in diagnostics and errors.
    #[serde(default)]
    pub id: Option<String>,
}

/// The different kinds of elements, each carrying its own properties.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type")]
pub enum ElementKind {
    Paragraph(Paragraph),
    Image(Image),
    Line(Rule),
    VerticalStack(Stack),
    HorizontalStack(Stack),
    Grid(Grid),
}

/// Fieldless tag for [`ElementKind`]. Styles target one of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ElementType {
    Paragraph,
    Image,
    Line,
    VerticalStack,
    HorizontalStack,
    Grid,
}

impl ElementType {
    pub const ALL: [ElementType; 6] = [
        ElementType::Paragraph,
        ElementType::Image,
        ElementType::Line,
        ElementType::VerticalStack,
        ElementType::HorizontalStack,
        ElementType::Grid,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ElementType::Paragraph => "Paragraph",
            ElementType::Image => "Image",
            ElementType::Line => "Line",
            ElementType::VerticalStack => "VerticalStack",
            ElementType::HorizontalStack => "HorizontalStack",
            ElementType::Grid => "Grid",
        }
    }

    /// Dictionary key under which a type-wide (implicit) style is stored.
    pub fn implicit_style_key(&self) -> &'static str {
        match self {
            ElementType::Paragraph => "type:Paragraph",
            ElementType::Image => "type:Image",
            ElementType::Line => "type:Line",
            ElementType::VerticalStack => "type:VerticalStack",
            ElementType::HorizontalStack => "type:HorizontalStack",
            ElementType::Grid => "type:Grid",
        }
    }
}

impl std::fmt::Display for ElementType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Box properties common to all elements.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BoxProps {
    /// Requested width in points. `None` sizes to the slot or content.
    pub width: Styled<Option<f64>>,
    /// Requested height in points. `None` sizes to content.
    pub height: Styled<Option<f64>>,
    pub margin: Styled<Edges>,
    pub padding: Styled<Edges>,
    pub background: Styled<Option<Color>>,
    /// Stroked just inside the border box. `None` draws no border.
    pub border_color: Styled<Option<Color>>,
    pub border_width: Styled<f64>,
    pub horizontal_alignment: Styled<HorizontalAlignment>,
    pub vertical_alignment: Styled<VerticalAlignment>,
    /// Never split this element across pages.
    pub keep_together: Styled<bool>,
}

impl BoxProps {
    fn apply(&mut self, patch: &StylePatch, priority: Priority) {
        if let Some(w) = patch.width {
            self.width.set(Some(w), priority);
        }
        if let Some(h) = patch.height {
            self.height.set(Some(h), priority);
        }
        put(&mut self.margin, &patch.margin, priority);
        put(&mut self.padding, &patch.padding, priority);
        if let Some(bg) = patch.background {
            self.background.set(Some(bg), priority);
        }
        if let Some(c) = patch.border_color {
            self.border_color.set(Some(c), priority);
        }
        put(&mut self.border_width, &patch.border_width, priority);
        put(
            &mut self.horizontal_alignment,
            &patch.horizontal_alignment,
            priority,
        );
        put(
            &mut self.vertical_alignment,
            &patch.vertical_alignment,
            priority,
        );
        put(&mut self.keep_together, &patch.keep_together, priority);
    }

    fn pin(&mut self) {
        self.width.pin();
        self.height.pin();
        self.margin.pin();
        self.padding.pin();
        self.background.pin();
        self.border_color.pin();
        self.border_width.pin();
        self.horizontal_alignment.pin();
        self.vertical_alignment.pin();
        self.keep_together.pin();
    }
}

/// A block of wrapped text.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Paragraph {
    pub text: String,
    pub font_family: Styled<String>,
    pub font_size: Styled<f64>,
    pub font_weight: Styled<u32>,
    pub font_style: Styled<FontStyle>,
    pub color: Styled<Color>,
    pub text_align: Styled<TextAlign>,
    pub decorations: Styled<TextDecorations>,
    pub text_transform: Styled<TextTransform>,
    /// Line height as a multiple of the font size.
    pub line_height: Styled<f64>,
    /// Minimum lines left at the bottom of a page when splitting.
    pub orphans: Styled<u32>,
    /// Minimum lines carried onto the next page when splitting.
    pub widows: Styled<u32>,
}

impl Default for Paragraph {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_family: Styled::default(),
            font_size: Styled::new(0.0),
            font_weight: Styled::new(400),
            font_style: Styled::default(),
            color: Styled::default(),
            text_align: Styled::default(),
            decorations: Styled::default(),
            text_transform: Styled::default(),
            line_height: Styled::new(1.2),
            orphans: Styled::new(1),
            widows: Styled::new(1),
        }
    }
}

impl Paragraph {
    pub fn new(text: &str) -> Self {
        Self {
            text: text.to_string(),
            ..Default::default()
        }
    }

    pub fn font_family(mut self, family: &str) -> Self {
        self.font_family.set(family.to_string(), Priority::Local);
        self
    }

    pub fn font_size(mut self, size: f64) -> Self {
        self.font_size.set(size, Priority::Local);
        self
    }

    pub fn font_weight(mut self, weight: u32) -> Self {
        self.font_weight.set(weight, Priority::Local);
        self
    }

    pub fn color(mut self, color: Color) -> Self {
        self.color.set(color, Priority::Local);
        self
    }

    pub fn text_align(mut self, align: TextAlign) -> Self {
        self.text_align.set(align, Priority::Local);
        self
    }

    pub fn line_height(mut self, multiplier: f64) -> Self {
        self.line_height.set(multiplier, Priority::Local);
        self
    }

    fn apply(&mut self, patch: &StylePatch, priority: Priority) {
        put(&mut self.font_family, &patch.font_family, priority);
        put(&mut self.font_size, &patch.font_size, priority);
        put(&mut self.font_weight, &patch.font_weight, priority);
        put(&mut self.font_style, &patch.font_style, priority);
        put(&mut self.color, &patch.color, priority);
        put(&mut self.text_align, &patch.text_align, priority);
        put(&mut self.decorations, &patch.decorations, priority);
        put(&mut self.text_transform, &patch.text_transform, priority);
        put(&mut self.line_height, &patch.line_height, priority);
        put(&mut self.orphans, &patch.orphans, priority);
        put(&mut self.widows, &patch.widows, priority);
    }

    fn pin(&mut self, defaults: &PageDefaults) {
        self.font_family.pin_with(&defaults.font_family);
        self.font_size.pin_with(&defaults.font_size);
        self.font_weight.pin_with(&defaults.font_weight);
        self.font_style.pin_with(&defaults.font_style);
        self.color.pin_with(&defaults.color);
        self.decorations.pin_with(&defaults.decorations);
        self.text_transform.pin_with(&defaults.text_transform);
        self.text_align.pin();
        self.line_height.pin();
        self.orphans.pin();
        self.widows.pin();
    }
}

/// A raster image drawn into its arranged rectangle.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Image {
    /// Data URI, raw base64, or a file path.
    pub source: String,
}

/// A horizontal rule.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Rule {
    pub thickness: Styled<f64>,
    /// Falls back to the page's text color.
    pub color: Styled<Color>,
}

impl Default for Rule {
    fn default() -> Self {
        Self {
            thickness: Styled::new(1.0),
            color: Styled::default(),
        }
    }
}

/// Children laid out one after another along one axis.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Stack {
    pub children: Vec<Element>,
    /// Gap between consecutive children.
    pub spacing: Styled<f64>,
}

/// Size definition for one grid row or column.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum TrackSize {
    /// Exactly this many points.
    Fixed(f64),
    /// As large as the largest single-span child in the track.
    Auto,
    /// A weighted share of the space left after fixed and auto tracks.
    Star(f64),
}

/// Children placed into cells of a row/column matrix.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Grid {
    pub columns: Vec<TrackSize>,
    pub rows: Vec<TrackSize>,
    pub row_spacing: Styled<f64>,
    pub column_spacing: Styled<f64>,
    pub cells: Vec<GridCell>,
}

/// A grid child and the cell range it occupies.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GridCell {
    #[serde(default)]
    pub row: usize,
    #[serde(default)]
    pub column: usize,
    #[serde(default = "one")]
    pub row_span: usize,
    #[serde(default = "one")]
    pub column_span: usize,
    pub element: Element,
}

fn one() -> usize {
    1
}

impl GridCell {
    pub fn new(row: usize, column: usize, element: Element) -> Self {
        Self {
            row,
            column,
            row_span: 1,
            column_span: 1,
            element,
        }
    }
}

fn put<T: Clone>(slot: &mut Styled<T>, value: &Option<T>, priority: Priority) {
    if let Some(v) = value {
        slot.set(v.clone(), priority);
    }
}

impl Element {
    pub fn new(kind: ElementKind) -> Self {
        Self {
            kind,
            layout: BoxProps::default(),
            style: None,
            id: None,
        }
    }

    pub fn paragraph(text: &str) -> Self {
        Self::new(ElementKind::Paragraph(Paragraph::new(text)))
    }

    pub fn image(source: &str) -> Self {
        Self::new(ElementKind::Image(Image {
            source: source.to_string(),
        }))
    }

    pub fn line() -> Self {
        Self::new(ElementKind::Line(Rule::default()))
    }

    pub fn vstack(children: Vec<Element>) -> Self {
        Self::new(ElementKind::VerticalStack(Stack {
            children,
            spacing: Styled::default(),
        }))
    }

    pub fn hstack(children: Vec<Element>) -> Self {
        Self::new(ElementKind::HorizontalStack(Stack {
            children,
            spacing: Styled::default(),
        }))
    }

    pub fn grid(columns: Vec<TrackSize>, rows: Vec<TrackSize>, cells: Vec<GridCell>) -> Self {
        Self::new(ElementKind::Grid(Grid {
            columns,
            rows,
            row_spacing: Styled::default(),
            column_spacing: Styled::default(),
            cells,
        }))
    }

    /// Opt into the explicit style stored under `key`.
    pub fn with_style(mut self, key: &str) -> Self {
        self.style = Some(key.to_string());
        self
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = Some(id.to_string());
        self
    }

    pub fn element_type(&self) -> ElementType {
        match &self.kind {
            ElementKind::Paragraph(_) => ElementType::Paragraph,
            ElementKind::Image(_) => ElementType::Image,
            ElementKind::Line(_) => ElementType::Line,
            ElementKind::VerticalStack(_) => ElementType::VerticalStack,
            ElementKind::HorizontalStack(_) => ElementType::HorizontalStack,
            ElementKind::Grid(_) => ElementType::Grid,
        }
    }

    /// "Paragraph#intro", or just "Paragraph" without an id.
    pub fn describe(&self) -> String {
        match &self.id {
            Some(id) => format!("{}#{}", self.element_type(), id),
            None => self.element_type().to_string(),
        }
    }

    pub fn as_paragraph(&self) -> Option<&Paragraph> {
        match &self.kind {
            ElementKind::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_paragraph_mut(&mut self) -> Option<&mut Paragraph> {
        match &mut self.kind {
            ElementKind::Paragraph(p) => Some(p),
            _ => None,
        }
    }

    /// Direct children in declared order.
    pub fn children(&self) -> Vec<&Element> {
        match &self.kind {
            ElementKind::VerticalStack(s) | ElementKind::HorizontalStack(s) => {
                s.children.iter().collect()
            }
            ElementKind::Grid(g) => g.cells.iter().map(|c| &c.element).collect(),
            _ => Vec::new(),
        }
    }

    pub fn children_mut(&mut self) -> Vec<&mut Element> {
        match &mut self.kind {
            ElementKind::VerticalStack(s) | ElementKind::HorizontalStack(s) => {
                s.children.iter_mut().collect()
            }
            ElementKind::Grid(g) => g.cells.iter_mut().map(|c| &mut c.element).collect(),
            _ => Vec::new(),
        }
    }

    /// Write every entry of `patch` that exists on this kind at `priority`.
    pub fn apply_patch(&mut self, patch: &StylePatch, priority: Priority) {
        self.layout.apply(patch, priority);
        match &mut self.kind {
            ElementKind::Paragraph(p) => p.apply(patch, priority),
            ElementKind::Image(_) => {}
            ElementKind::Line(r) => {
                put(&mut r.thickness, &patch.stroke_thickness, priority);
                put(&mut r.color, &patch.stroke_color, priority);
            }
            ElementKind::VerticalStack(s) | ElementKind::HorizontalStack(s) => {
                put(&mut s.spacing, &patch.spacing, priority);
            }
            ElementKind::Grid(g) => {
                put(&mut g.row_spacing, &patch.row_spacing, priority);
                put(&mut g.column_spacing, &patch.column_spacing, priority);
            }
        }
    }

    /// Pin every property of this subtree at `Local`, materialising page
    /// defaults, so the values survive onto another page untouched.
    pub fn freeze(&mut self, defaults: &PageDefaults) {
        self.layout.pin();
        match &mut self.kind {
            ElementKind::Paragraph(p) => p.pin(defaults),
            ElementKind::Image(_) => {}
            ElementKind::Line(r) => {
                r.thickness.pin();
                r.color.pin_with(&defaults.color);
            }
            ElementKind::VerticalStack(s) | ElementKind::HorizontalStack(s) => {
                s.spacing.pin();
            }
            ElementKind::Grid(g) => {
                g.row_spacing.pin();
                g.column_spacing.pin();
            }
        }
        for child in self.children_mut() {
            child.freeze(defaults);
        }
    }

    /// Whether pagination may place part of this element and carry the rest.
    pub fn is_splittable(&self) -> bool {
        if *self.layout.keep_together.value() || self.layout.height.value().is_some() {
            return false;
        }
        matches!(
            self.kind,
            ElementKind::Paragraph(_) | ElementKind::VerticalStack(_)
        )
    }
}

impl From<Paragraph> for Element {
    fn from(p: Paragraph) -> Self {
        Element::new(ElementKind::Paragraph(p))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn implicit_keys_are_distinct() {
        let mut keys: Vec<&str> = ElementType::ALL
            .iter()
            .map(|t| t.implicit_style_key())
            .collect();
        keys.sort();
        keys.dedup();
        assert_eq!(keys.len(), ElementType::ALL.len());
    }

    #[test]
    fn apply_patch_respects_local_values() {
        let mut el: Element = Paragraph::new("x").font_size(10.0).into();
        let patch = StylePatch {
            font_size: Some(15.0),
            color: Some(Color::RED),
            ..Default::default()
        };
        el.apply_patch(&patch, Priority::ImplicitStyle);
        let p = el.as_paragraph().unwrap();
        assert_eq!(*p.font_size.value(), 10.0);
        assert_eq!(*p.color.value(), Color::RED);
        assert_eq!(p.color.priority(), Priority::ImplicitStyle);
    }

    #[test]
    fn patch_entries_for_other_kinds_are_ignored() {
        let mut el = Element::line();
        let patch = StylePatch {
            font_size: Some(30.0),
            stroke_thickness: Some(2.0),
            ..Default::default()
        };
        el.apply_patch(&patch, Priority::ExplicitStyle);
        match &el.kind {
            ElementKind::Line(r) => assert_eq!(*r.thickness.value(), 2.0),
            _ => unreachable!(),
        }
    }

    #[test]
    fn freeze_materialises_page_defaults() {
        let mut el = Element::vstack(vec![Element::paragraph("a")]);
        let defaults = PageDefaults {
            font_size: 9.0,
            ..Default::default()
        };
        el.freeze(&defaults);
        let child = el.children()[0].as_paragraph().unwrap();
        assert_eq!(*child.font_size.value(), 9.0);
        assert_eq!(child.font_size.priority(), Priority::Local);
        assert_eq!(el.layout.margin.priority(), Priority::Local);
    }

    #[test]
    fn splittable_kinds() {
        assert!(Element::paragraph("a").is_splittable());
        assert!(Element::vstack(vec![]).is_splittable());
        assert!(!Element::hstack(vec![]).is_splittable());
        assert!(!Element::image("x").is_splittable());
        let mut kept = Element::paragraph("a");
        kept.layout.keep_together.set(true, Priority::Local);
        assert!(!kept.is_splittable());
    }

    #[test]
    fn element_from_json() {
        let json = r#"{
            "kind": { "type": "Paragraph", "text": "Hello", "fontSize": 14 },
            "layout": { "margin": { "top": 4 } },
            "style": "Body",
            "id": "intro"
        }"#;
        let el: Element = serde_json::from_str(json).unwrap();
        assert_eq!(el.describe(), "Paragraph#intro");
        assert_eq!(el.style.as_deref(), Some("Body"));
        let p = el.as_paragraph().unwrap();
        assert_eq!(p.text, "Hello");
        assert_eq!(*p.font_size.value(), 14.0);
        assert_eq!(p.font_size.priority(), Priority::Local);
        assert!(p.color.is_default());
        assert_eq!(el.layout.margin.value().top, 4.0);
    }

    #[test]
    fn grid_from_json() {
        let json = r#"{
            "kind": {
                "type": "Grid",
                "columns": [{ "Fixed": 100 }, "Auto", { "Star": 1 }],
                "rows": ["Auto"],
                "cells": [
                    { "column": 2, "element": { "kind": { "type": "Line" } } }
                ]
            }
        }"#;
        let el: Element = serde_json::from_str(json).unwrap();
        match &el.kind {
            ElementKind::Grid(g) => {
                assert_eq!(g.columns[0], TrackSize::Fixed(100.0));
                assert_eq!(g.columns[2], TrackSize::Star(1.0));
                assert_eq!(g.cells[0].column, 2);
                assert_eq!(g.cells[0].row_span, 1);
            }
            _ => panic!("expected grid"),
        }
    }
}
