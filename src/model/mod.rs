//! # Document Model
//!
//! The input representation for the engine: a document is a list of
//! [`PageSpec`]s, each holding one root element plus the page's own style
//! dictionary and defaults. A document-level dictionary and defaults sit
//! behind every page.
//!
//! The element tree itself lives in [`element`].

pub mod element;

pub use element::*;

use crate::style::resources::ResourceDictionary;
use crate::style::{Color, FontStyle, TextDecorations, TextTransform};
use serde::{Deserialize, Serialize};

/// A complete document ready for rendering.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Document {
    /// Pages in order. Each may spill onto further physical pages.
    #[serde(default)]
    pub pages: Vec<PageSpec>,

    /// Document metadata (title, author, etc.)
    #[serde(default)]
    pub metadata: Metadata,

    /// Styles every page falls back to.
    #[serde(default)]
    pub resources: ResourceDictionary,

    /// Defaults for text and rules that nothing else has styled.
    #[serde(default)]
    pub defaults: PageDefaults,
}

/// Document metadata embedded in the PDF.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    pub title: Option<String>,
    pub author: Option<String>,
    pub subject: Option<String>,
    pub creator: Option<String>,
}

/// One authored page: geometry, styles, defaults and the content root.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageSpec {
    #[serde(default)]
    pub config: PageConfig,

    /// Page-level styles, searched before the document's.
    #[serde(default)]
    pub resources: ResourceDictionary,

    /// Overrides the document defaults for this page.
    #[serde(default)]
    pub defaults: Option<PageDefaults>,

    pub content: Element,
}

impl PageSpec {
    pub fn new(content: Element) -> Self {
        Self {
            config: PageConfig::default(),
            resources: ResourceDictionary::new(),
            defaults: None,
            content,
        }
    }
}

/// Configuration for a page: size, orientation, margins, background.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageConfig {
    /// Page size. Defaults to A4.
    #[serde(default)]
    pub size: PageSize,

    #[serde(default)]
    pub orientation: Orientation,

    /// Distance from the paper edge to the content area, in points.
    #[serde(default = "default_margin")]
    pub margin: Edges,

    #[serde(default)]
    pub background: Option<Color>,
}

fn default_margin() -> Edges {
    Edges::uniform(54.0) // ~0.75 inch
}

impl Default for PageConfig {
    fn default() -> Self {
        Self {
            size: PageSize::A4,
            orientation: Orientation::Portrait,
            margin: default_margin(),
            background: None,
        }
    }
}

impl PageConfig {
    /// Paper size in points with orientation applied.
    pub fn dimensions(&self) -> (f64, f64) {
        let (w, h) = self.size.dimensions();
        match self.orientation {
            Orientation::Portrait => (w, h),
            Orientation::Landscape => (h, w),
        }
    }

    /// The content rectangle inside the margins.
    pub fn content_area(&self) -> Rect {
        let (w, h) = self.dimensions();
        Rect {
            x: self.margin.left,
            y: self.margin.top,
            width: (w - self.margin.horizontal()).max(0.0),
            height: (h - self.margin.vertical()).max(0.0),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Orientation {
    #[default]
    Portrait,
    Landscape,
}

/// Standard page sizes in points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub enum PageSize {
    #[default]
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom {
        width: f64,
        height: f64,
    },
}

impl PageSize {
    /// Returns (width, height) in points, portrait.
    pub fn dimensions(&self) -> (f64, f64) {
        match self {
            PageSize::A4 => (595.28, 841.89),
            PageSize::A3 => (841.89, 1190.55),
            PageSize::A5 => (419.53, 595.28),
            PageSize::Letter => (612.0, 792.0),
            PageSize::Legal => (612.0, 1008.0),
            PageSize::Custom { width, height } => (*width, *height),
        }
    }
}

/// Values every page establishes for properties still at `Default` priority.
///
/// They are read at measure/render time and never written onto elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageDefaults {
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_weight")]
    pub font_weight: u32,
    #[serde(default)]
    pub font_style: FontStyle,
    #[serde(default)]
    pub color: Color,
    #[serde(default)]
    pub decorations: TextDecorations,
    #[serde(default)]
    pub text_transform: TextTransform,
    /// BCP 47 tag, e.g. "en-US". Drives case mapping and the PDF /Lang entry.
    #[serde(default = "default_culture")]
    pub culture: String,
}

fn default_font_family() -> String {
    "Helvetica".to_string()
}

fn default_font_size() -> f64 {
    12.0
}

fn default_font_weight() -> u32 {
    400
}

fn default_culture() -> String {
    "en-US".to_string()
}

impl Default for PageDefaults {
    fn default() -> Self {
        Self {
            font_family: default_font_family(),
            font_size: default_font_size(),
            font_weight: default_font_weight(),
            font_style: FontStyle::Normal,
            color: Color::BLACK,
            decorations: TextDecorations::NONE,
            text_transform: TextTransform::None,
            culture: default_culture(),
        }
    }
}

/// Edge values (top, right, bottom, left) used for margin and padding.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Edges {
    #[serde(default)]
    pub top: f64,
    #[serde(default)]
    pub right: f64,
    #[serde(default)]
    pub bottom: f64,
    #[serde(default)]
    pub left: f64,
}

impl Edges {
    pub fn uniform(v: f64) -> Self {
        Self {
            top: v,
            right: v,
            bottom: v,
            left: v,
        }
    }

    pub fn symmetric(vertical: f64, horizontal: f64) -> Self {
        Self {
            top: vertical,
            right: horizontal,
            bottom: vertical,
            left: horizontal,
        }
    }

    pub fn horizontal(&self) -> f64 {
        self.left + self.right
    }

    pub fn vertical(&self) -> f64 {
        self.top + self.bottom
    }
}

/// An axis-aligned rectangle in page space (origin top-left, points).
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    /// Shrink by `edges` on every side, never below zero size.
    pub fn deflate(&self, edges: &Edges) -> Rect {
        Rect {
            x: self.x + edges.left,
            y: self.y + edges.top,
            width: (self.width - edges.horizontal()).max(0.0),
            height: (self.height - edges.vertical()).max(0.0),
        }
    }
}
