//! # Font Management
//!
//! Text measurement against the standard PDF fonts (Helvetica, Times,
//! Courier), which every PDF viewer provides and which never need
//! embedding.
//!
//! Layout measures through the [`TextMeasurer`] trait so tests can swap in
//! a measurer with predictable widths.

pub mod metrics;

pub use metrics::StandardFontMetrics;

/// The standard PDF fonts this engine draws with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StandardFont {
    Helvetica,
    HelveticaBold,
    HelveticaOblique,
    HelveticaBoldOblique,
    TimesRoman,
    TimesBold,
    TimesItalic,
    TimesBoldItalic,
    Courier,
    CourierBold,
    CourierOblique,
    CourierBoldOblique,
}

impl StandardFont {
    /// Pick a face for a family, weight and slant. Unknown families fall
    /// back to Helvetica; weights of 600 and above are bold.
    pub fn resolve(family: &str, weight: u32, italic: bool) -> Self {
        let bold = weight >= 600;
        let family = family.trim().to_ascii_lowercase();
        match family.as_str() {
            "times" | "times-roman" | "times new roman" | "serif" => match (bold, italic) {
                (false, false) => Self::TimesRoman,
                (true, false) => Self::TimesBold,
                (false, true) => Self::TimesItalic,
                (true, true) => Self::TimesBoldItalic,
            },
            "courier" | "courier new" | "monospace" => match (bold, italic) {
                (false, false) => Self::Courier,
                (true, false) => Self::CourierBold,
                (false, true) => Self::CourierOblique,
                (true, true) => Self::CourierBoldOblique,
            },
            _ => match (bold, italic) {
                (false, false) => Self::Helvetica,
                (true, false) => Self::HelveticaBold,
                (false, true) => Self::HelveticaOblique,
                (true, true) => Self::HelveticaBoldOblique,
            },
        }
    }

    /// The PDF name for this font.
    pub fn pdf_name(&self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::HelveticaBold => "Helvetica-Bold",
            Self::HelveticaOblique => "Helvetica-Oblique",
            Self::HelveticaBoldOblique => "Helvetica-BoldOblique",
            Self::TimesRoman => "Times-Roman",
            Self::TimesBold => "Times-Bold",
            Self::TimesItalic => "Times-Italic",
            Self::TimesBoldItalic => "Times-BoldItalic",
            Self::Courier => "Courier",
            Self::CourierBold => "Courier-Bold",
            Self::CourierOblique => "Courier-Oblique",
            Self::CourierBoldOblique => "Courier-BoldOblique",
        }
    }

    pub fn metrics(&self) -> &'static StandardFontMetrics {
        match self {
            Self::Helvetica | Self::HelveticaOblique => &metrics::HELVETICA_METRICS,
            Self::HelveticaBold | Self::HelveticaBoldOblique => &metrics::HELVETICA_BOLD_METRICS,
            Self::TimesRoman | Self::TimesItalic => &metrics::TIMES_ROMAN_METRICS,
            Self::TimesBold | Self::TimesBoldItalic => &metrics::TIMES_BOLD_METRICS,
            Self::Courier
            | Self::CourierBold
            | Self::CourierOblique
            | Self::CourierBoldOblique => &metrics::COURIER_METRICS,
        }
    }
}

/// Measures text for layout.
pub trait TextMeasurer {
    /// Advance width of one character in points.
    fn char_width(&self, ch: char, font: StandardFont, font_size: f64) -> f64;

    /// Distance from the top of a line to its baseline, in points.
    fn ascent(&self, font: StandardFont, font_size: f64) -> f64;

    fn measure_string(&self, text: &str, font: StandardFont, font_size: f64) -> f64 {
        text.chars()
            .map(|ch| self.char_width(ch, font, font_size))
            .sum()
    }
}

/// Measures with the AFM metrics of the standard fonts.
#[derive(Debug, Clone, Copy, Default)]
pub struct FontContext;

impl FontContext {
    pub fn new() -> Self {
        Self
    }
}

impl TextMeasurer for FontContext {
    fn char_width(&self, ch: char, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().char_width(ch, font_size)
    }

    fn ascent(&self, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().ascent(font_size)
    }

    fn measure_string(&self, text: &str, font: StandardFont, font_size: f64) -> f64 {
        font.metrics().measure_string(text, font_size, 0.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_font_context_helvetica() {
        let ctx = FontContext::new();
        let w = ctx.char_width(' ', StandardFont::Helvetica, 12.0);
        assert!((w - 3.336).abs() < 0.001);
    }

    #[test]
    fn test_font_context_bold_wider() {
        let ctx = FontContext::new();
        let regular = ctx.char_width('b', StandardFont::Helvetica, 12.0);
        let bold = ctx.char_width('b', StandardFont::HelveticaBold, 12.0);
        assert!(bold > regular, "Bold b should be wider than regular b");
    }

    #[test]
    fn test_font_resolution_fallback() {
        assert_eq!(
            StandardFont::resolve("UnknownFont", 400, false),
            StandardFont::Helvetica
        );
        assert_eq!(
            StandardFont::resolve("Times", 800, true),
            StandardFont::TimesBoldItalic
        );
        assert_eq!(
            StandardFont::resolve("monospace", 400, false),
            StandardFont::Courier
        );
    }

    #[test]
    fn test_font_weight_snaps() {
        assert_eq!(
            StandardFont::resolve("Helvetica", 600, false),
            StandardFont::HelveticaBold
        );
        assert_eq!(
            StandardFont::resolve("Helvetica", 500, false),
            StandardFont::Helvetica
        );
    }

    #[test]
    fn test_measure_string() {
        let ctx = FontContext::new();
        let w = ctx.measure_string("Hello", StandardFont::Helvetica, 10.0);
        // H 722 + e 556 + l 222 + l 222 + o 556
        assert!((w - 22.78).abs() < 1e-9);
    }
}
