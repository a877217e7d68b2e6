//! # Style System
//!
//! Value types for styleable properties, plus the sparse [`StylePatch`] a
//! style definition contributes. A patch only carries the entries its author
//! actually set, so applying one can never downgrade a property it did not
//! touch.
//!
//! Resolution (which patch lands on which element, and at what priority)
//! lives in [`resolver`]; the dictionaries patches are looked up in live in
//! [`resources`].

pub mod property;
pub mod resolver;
pub mod resources;

pub use property::{Priority, Styled};

use crate::model::Edges;
use serde::{Deserialize, Serialize};

/// An RGBA color.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64, // 0.0 - 1.0
    pub g: f64,
    pub b: f64,
    #[serde(default = "opaque")]
    pub a: f64,
}

fn opaque() -> f64 {
    1.0
}

impl Color {
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };
    pub const RED: Color = Color {
        r: 1.0,
        g: 0.0,
        b: 0.0,
        a: 1.0,
    };
    pub const BLUE: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 1.0,
        a: 1.0,
    };
    pub const TRANSPARENT: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
        a: 0.0,
    };

    pub fn rgb(r: f64, g: f64, b: f64) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    pub fn hex(hex: &str) -> Self {
        let hex = hex.trim_start_matches('#');
        let channel = |s: &str| u8::from_str_radix(s, 16).unwrap_or(0) as f64 / 255.0;
        match hex.len() {
            3 => Self::rgb(
                channel(&hex[0..1].repeat(2)),
                channel(&hex[1..2].repeat(2)),
                channel(&hex[2..3].repeat(2)),
            ),
            6 => Self::rgb(channel(&hex[0..2]), channel(&hex[2..4]), channel(&hex[4..6])),
            _ => Self::BLACK,
        }
    }

    pub fn is_visible(&self) -> bool {
        self.a > 0.0
    }
}

impl Default for Color {
    fn default() -> Self {
        Color::BLACK
    }
}

/// Placement of an element inside the slot its parent gives it, horizontally.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum HorizontalAlignment {
    Start,
    Center,
    End,
    #[default]
    Fill,
}

/// Placement of an element inside the slot its parent gives it, vertically.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerticalAlignment {
    Start,
    Center,
    End,
    #[default]
    Fill,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum FontStyle {
    #[default]
    Normal,
    Italic,
    Oblique,
}

impl FontStyle {
    pub fn is_italic(&self) -> bool {
        matches!(self, FontStyle::Italic | FontStyle::Oblique)
    }
}

/// Line alignment within a paragraph. `Justify` lays out as `Left`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextAlign {
    #[default]
    Left,
    Right,
    Center,
    Justify,
}

/// Decorations drawn over a text run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextDecorations {
    #[serde(default)]
    pub underline: bool,
    #[serde(default)]
    pub strikethrough: bool,
}

impl TextDecorations {
    pub const NONE: TextDecorations = TextDecorations {
        underline: false,
        strikethrough: false,
    };

    pub fn is_none(&self) -> bool {
        !self.underline && !self.strikethrough
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum TextTransform {
    #[default]
    None,
    Uppercase,
    Lowercase,
    Capitalize,
}

/// The entries a style definition sets, and nothing else.
///
/// Each field maps onto one [`Styled`] slot of an element. Entries that do not
/// exist on the element kind being styled are ignored when the patch is
/// applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StylePatch {
    // ── Box ────────────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub margin: Option<Edges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub padding: Option<Edges>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub background: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub border_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub horizontal_alignment: Option<HorizontalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vertical_alignment: Option<VerticalAlignment>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub keep_together: Option<bool>,

    // ── Typography ─────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_family: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_size: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_weight: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub font_style: Option<FontStyle>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<Color>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_align: Option<TextAlign>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decorations: Option<TextDecorations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_transform: Option<TextTransform>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line_height: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub orphans: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub widows: Option<u32>,

    // ── Rule line ──────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_thickness: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_color: Option<Color>,

    // ── Containers ─────────────────────────────────────────────
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub row_spacing: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub column_spacing: Option<f64>,
}

impl StylePatch {
    /// Layer `over` on top of `self`: entries set in `over` win.
    pub fn merge(&self, over: &StylePatch) -> StylePatch {
        StylePatch {
            width: over.width.or(self.width),
            height: over.height.or(self.height),
            margin: over.margin.or(self.margin),
            padding: over.padding.or(self.padding),
            background: over.background.or(self.background),
            border_color: over.border_color.or(self.border_color),
            border_width: over.border_width.or(self.border_width),
            horizontal_alignment: over.horizontal_alignment.or(self.horizontal_alignment),
            vertical_alignment: over.vertical_alignment.or(self.vertical_alignment),
            keep_together: over.keep_together.or(self.keep_together),
            font_family: over.font_family.clone().or_else(|| self.font_family.clone()),
            font_size: over.font_size.or(self.font_size),
            font_weight: over.font_weight.or(self.font_weight),
            font_style: over.font_style.or(self.font_style),
            color: over.color.or(self.color),
            text_align: over.text_align.or(self.text_align),
            decorations: over.decorations.or(self.decorations),
            text_transform: over.text_transform.or(self.text_transform),
            line_height: over.line_height.or(self.line_height),
            orphans: over.orphans.or(self.orphans),
            widows: over.widows.or(self.widows),
            stroke_thickness: over.stroke_thickness.or(self.stroke_thickness),
            stroke_color: over.stroke_color.or(self.stroke_color),
            spacing: over.spacing.or(self.spacing),
            row_spacing: over.row_spacing.or(self.row_spacing),
            column_spacing: over.column_spacing.or(self.column_spacing),
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == StylePatch::default()
    }
}
