//! # Text Layout
//!
//! Line breaking and case transforms for paragraphs.
//!
//! Breaking is greedy over UAX #14 break opportunities: fill each line until
//! the next character would overflow, then end it at the last opportunity.
//! A word wider than the whole line is force-broken between characters.
//!
//! Every [`BrokenLine`] records the char range of the source text it came
//! from, so pagination can carry the exact unconsumed tail onto the next
//! page.

use crate::font::{StandardFont, TextMeasurer};
use crate::style::TextTransform;
use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line of text after line-breaking.
#[derive(Debug, Clone, PartialEq)]
pub struct BrokenLine {
    /// The line's text, trailing whitespace and newlines removed.
    pub text: String,
    /// First source char index (inclusive).
    pub start: usize,
    /// Last source char index (exclusive). Equals the next line's `start`.
    pub end: usize,
    /// Width of `text` in points.
    pub width: f64,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Each entry is the opportunity *before* that char. Index 0 is always
/// `None`.
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() yields byte offsets of the start of the next segment.
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        let mut char_idx = 0;
        for (byte_idx, _) in text.char_indices() {
            map[byte_idx] = char_idx;
            char_idx += 1;
        }
        map[text.len()] = char_idx;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

fn is_newline(ch: char) -> bool {
    matches!(ch, '\n' | '\r' | '\u{2028}' | '\u{2029}')
}

pub struct TextLayout;

impl Default for TextLayout {
    fn default() -> Self {
        Self::new()
    }
}

impl TextLayout {
    pub fn new() -> Self {
        Self
    }

    /// Break `text` into lines no wider than `max_width`.
    ///
    /// Always returns at least one line; empty text gives one empty line.
    pub fn break_into_lines(
        &self,
        measurer: &dyn TextMeasurer,
        text: &str,
        max_width: f64,
        font: StandardFont,
        font_size: f64,
    ) -> Vec<BrokenLine> {
        let chars: Vec<char> = text.chars().collect();
        if chars.is_empty() {
            return vec![BrokenLine {
                text: String::new(),
                start: 0,
                end: 0,
                width: 0.0,
            }];
        }

        let widths: Vec<f64> = chars
            .iter()
            .map(|&ch| {
                if is_newline(ch) {
                    0.0
                } else {
                    measurer.char_width(ch, font, font_size)
                }
            })
            .collect();
        let break_opps = compute_break_opportunities(text);

        let mut lines = Vec::new();
        let mut line_start = 0;
        let mut line_width = 0.0;
        let mut last_break_point: Option<usize> = None;

        for (i, &ch) in chars.iter().enumerate() {
            if i > 0 {
                match break_opps[i] {
                    Some(BreakOpportunity::Mandatory) => {
                        lines.push(make_line(&chars, &widths, line_start, i));
                        line_start = i;
                        line_width = 0.0;
                        last_break_point = None;
                    }
                    Some(BreakOpportunity::Allowed) => last_break_point = Some(i),
                    None => {}
                }
            }

            // Trailing spaces hang past the edge; they never cause a break.
            if ch.is_whitespace() {
                line_width += widths[i];
                continue;
            }

            if line_width + widths[i] > max_width && line_start < i {
                match last_break_point {
                    Some(bp) if bp > line_start => {
                        lines.push(make_line(&chars, &widths, line_start, bp));
                        line_start = bp;
                        line_width = widths[bp..=i].iter().sum();
                    }
                    _ => {
                        // No opportunity on this line: force a break here.
                        lines.push(make_line(&chars, &widths, line_start, i));
                        line_start = i;
                        line_width = widths[i];
                    }
                }
                last_break_point = None;
                continue;
            }

            line_width += widths[i];
        }

        if line_start < chars.len() || lines.is_empty() {
            lines.push(make_line(&chars, &widths, line_start, chars.len()));
        }

        lines
    }

    /// Width of the widest line when only mandatory breaks apply.
    pub fn measure_width(
        &self,
        measurer: &dyn TextMeasurer,
        text: &str,
        font: StandardFont,
        font_size: f64,
    ) -> f64 {
        self.break_into_lines(measurer, text, f64::INFINITY, font, font_size)
            .iter()
            .map(|l| l.width)
            .fold(0.0, f64::max)
    }
}

fn make_line(chars: &[char], widths: &[f64], start: usize, end: usize) -> BrokenLine {
    let mut visible_end = end;
    while visible_end > start && chars[visible_end - 1].is_whitespace() {
        visible_end -= 1;
    }
    BrokenLine {
        text: chars[start..visible_end].iter().collect(),
        start,
        end,
        width: widths[start..visible_end].iter().sum(),
    }
}

/// The source text from char index `from` onward.
pub fn tail_from(text: &str, from: usize) -> String {
    text.chars().skip(from).collect()
}

/// Apply a case transform. `culture` is a BCP 47 tag; Turkish and
/// Azerbaijani map dotted and dotless i the way those languages do.
pub fn apply_transform(text: &str, transform: TextTransform, culture: &str) -> String {
    let turkic = is_turkic(culture);
    match transform {
        TextTransform::None => text.to_string(),
        TextTransform::Uppercase => text.chars().map(|c| upper(c, turkic)).collect(),
        TextTransform::Lowercase => text.chars().map(|c| lower(c, turkic)).collect(),
        TextTransform::Capitalize => {
            let mut out = String::with_capacity(text.len());
            let mut at_word_start = true;
            for c in text.chars() {
                if at_word_start && c.is_alphabetic() {
                    out.push_str(&upper(c, turkic));
                    at_word_start = false;
                } else {
                    out.push(c);
                    at_word_start = c.is_whitespace();
                }
            }
            out
        }
    }
}

fn is_turkic(culture: &str) -> bool {
    let primary = culture.split(['-', '_']).next().unwrap_or(culture);
    primary.eq_ignore_ascii_case("tr") || primary.eq_ignore_ascii_case("az")
}

fn upper(c: char, turkic: bool) -> String {
    match c {
        'i' if turkic => "\u{130}".to_string(),
        _ => c.to_uppercase().collect(),
    }
}

fn lower(c: char, turkic: bool) -> String {
    match c {
        'I' if turkic => "\u{131}".to_string(),
        '\u{130}' if turkic => "i".to_string(),
        _ => c.to_lowercase().collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Every glyph is `size / 2` wide.
    struct HalfEm;

    impl TextMeasurer for HalfEm {
        fn char_width(&self, _ch: char, _font: StandardFont, font_size: f64) -> f64 {
            font_size / 2.0
        }

        fn ascent(&self, _font: StandardFont, font_size: f64) -> f64 {
            font_size * 0.8
        }
    }

    fn lines(text: &str, max_width: f64) -> Vec<BrokenLine> {
        TextLayout::new().break_into_lines(&HalfEm, text, max_width, StandardFont::Helvetica, 10.0)
    }

    #[test]
    fn test_single_line() {
        let l = lines("Hello", 100.0);
        assert_eq!(l.len(), 1);
        assert_eq!(l[0].text, "Hello");
        assert_eq!(l[0].width, 25.0);
    }

    #[test]
    fn test_breaks_at_spaces() {
        // 5 chars per 25pt; "aaaa bbbb cccc" at 50pt fits "aaaa bbbb" (45pt).
        let l = lines("aaaa bbbb cccc", 50.0);
        assert_eq!(l.len(), 2);
        assert_eq!(l[0].text, "aaaa bbbb");
        assert_eq!(l[1].text, "cccc");
        assert_eq!(l[0].end, l[1].start);
    }

    #[test]
    fn test_trailing_space_not_counted() {
        let l = lines("aaaa bbbb", 25.0);
        assert_eq!(l[0].text, "aaaa");
        assert_eq!(l[0].width, 20.0);
    }

    #[test]
    fn test_mandatory_break() {
        let l = lines("one\ntwo", 1000.0);
        assert_eq!(l.len(), 2);
        assert_eq!(l[0].text, "one");
        assert_eq!(l[1].text, "two");
        assert_eq!(l[1].start, 4);
    }

    #[test]
    fn test_long_word_is_forced() {
        let l = lines("abcdefghij", 25.0);
        assert_eq!(l.len(), 2);
        assert_eq!(l[0].text, "abcde");
        assert_eq!(l[1].text, "fghij");
    }

    #[test]
    fn test_empty_text() {
        let l = lines("", 100.0);
        assert_eq!(l.len(), 1);
        assert!(l[0].text.is_empty());
    }

    #[test]
    fn test_ranges_cover_source() {
        let text = "the quick brown fox jumps over the lazy dog";
        let l = lines(text, 60.0);
        assert!(l.len() > 1);
        assert_eq!(l[0].start, 0);
        assert_eq!(l.last().unwrap().end, text.chars().count());
        for pair in l.windows(2) {
            assert_eq!(pair[0].end, pair[1].start);
        }
        assert!(tail_from(text, l[1].start).starts_with(&l[1].text));
    }

    #[test]
    fn test_measure_width_ignores_wrapping() {
        let w = TextLayout::new().measure_width(&HalfEm, "ab cd", StandardFont::Helvetica, 10.0);
        assert_eq!(w, 25.0);
    }

    #[test]
    fn test_transforms() {
        assert_eq!(apply_transform("hello world", TextTransform::Uppercase, "en-US"), "HELLO WORLD");
        assert_eq!(apply_transform("Hello", TextTransform::Lowercase, "en-US"), "hello");
        assert_eq!(
            apply_transform("hello big world", TextTransform::Capitalize, "en"),
            "Hello Big World"
        );
    }

    #[test]
    fn test_turkish_case_mapping() {
        assert_eq!(apply_transform("istanbul", TextTransform::Uppercase, "tr-TR"), "\u{130}STANBUL");
        assert_eq!(apply_transform("ISPARTA", TextTransform::Lowercase, "tr"), "\u{131}sparta");
        assert_eq!(apply_transform("istanbul", TextTransform::Uppercase, "en-US"), "ISTANBUL");
    }
}
