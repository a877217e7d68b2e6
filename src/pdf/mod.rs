//! # PDF Serializer
//!
//! Takes the laid-out pages from the layout engine and writes a valid PDF file.
//!
//! This is a from-scratch PDF 1.7 writer. Text uses the standard Type1 fonts
//! with WinAnsiEncoding, so nothing is embedded except images.
//!
//! ## PDF Structure (simplified)
//!
//! ```text
//! %PDF-1.7            <- header
//! 1 0 obj ... endobj  <- objects (fonts, pages, content streams, etc.)
//! 2 0 obj ... endobj
//! ...
//! xref                <- cross-reference table (byte offsets of each object)
//! trailer             <- points to the root object
//! %%EOF
//! ```
//!
//! Layout works top-down with y growing downwards; PDF user space has its
//! origin bottom-left, so every y is flipped against the page height here.

use std::fmt::Write as FmtWrite; // for write! on String
use std::io::Write as IoWrite; // for write! on Vec<u8>
use std::sync::Arc;

use crate::error::FolioError;
use crate::font::StandardFont;
use crate::image_loader::{ImagePixelData, LoadedImage};
use crate::layout::{DrawOp, PageOutput};
use crate::model::{Metadata, Rect};
use crate::style::Color;
use miniz_oxide::deflate::compress_to_vec_zlib;

#[derive(Debug, Default)]
pub struct PdfWriter;

/// Tracks allocated PDF objects during writing.
struct PdfBuilder {
    objects: Vec<PdfObject>,
    /// Font -> object id, in resource-name order (/F0, /F1, ...).
    font_objects: Vec<(StandardFont, usize)>,
    /// Image -> XObject id, in resource-name order (/Im0, /Im1, ...).
    /// The same `Arc` on many pages is embedded once.
    image_objects: Vec<(Arc<LoadedImage>, usize)>,
}

struct PdfObject {
    data: Vec<u8>,
}

impl PdfBuilder {
    fn new() -> Self {
        // 0 = placeholder (PDF objects are 1-indexed)
        // 1 = Catalog
        // 2 = Pages (page tree root)
        Self {
            objects: vec![
                PdfObject { data: vec![] },
                PdfObject { data: vec![] },
                PdfObject { data: vec![] },
            ],
            font_objects: Vec::new(),
            image_objects: Vec::new(),
        }
    }

    fn push(&mut self, data: Vec<u8>) -> usize {
        let id = self.objects.len();
        self.objects.push(PdfObject { data });
        id
    }

    fn push_stream(&mut self, dict_entries: &str, payload: &[u8]) -> usize {
        let mut data: Vec<u8> = Vec::new();
        let _ = write!(
            data,
            "<< {} /Length {} >>\nstream\n",
            dict_entries,
            payload.len()
        );
        data.extend_from_slice(payload);
        data.extend_from_slice(b"\nendstream");
        self.push(data)
    }

    fn font_index(&self, font: StandardFont) -> usize {
        self.font_objects
            .iter()
            .position(|(f, _)| *f == font)
            .unwrap_or(0)
    }

    fn image_index(&self, image: &Arc<LoadedImage>) -> Option<usize> {
        self.image_objects
            .iter()
            .position(|(i, _)| Arc::ptr_eq(i, image))
    }
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Write laid-out pages to a PDF byte vector.
    pub fn write(&self, pages: &[PageOutput], metadata: &Metadata) -> Result<Vec<u8>, FolioError> {
        if pages.is_empty() {
            return Err(FolioError::Render("document has no pages".to_string()));
        }

        let mut builder = PdfBuilder::new();
        self.register_fonts(&mut builder, pages);
        self.register_images(&mut builder, pages);

        let mut page_obj_ids: Vec<usize> = Vec::new();
        for page in pages {
            let content = self.build_content_stream(page, &builder);
            let compressed = compress_to_vec_zlib(content.as_bytes(), 6);
            let content_obj_id = builder.push_stream("/Filter /FlateDecode", &compressed);

            let resources = self.build_resource_dict(page, &builder);
            let page_dict = format!(
                "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {:.2} {:.2}] \
                 /Contents {} 0 R /Resources << {} >> >>",
                page.width, page.height, content_obj_id, resources
            );
            page_obj_ids.push(builder.push(page_dict.into_bytes()));
        }

        // Catalog (object 1)
        let lang = &pages[0].culture;
        builder.objects[1].data = if lang.is_empty() {
            b"<< /Type /Catalog /Pages 2 0 R >>".to_vec()
        } else {
            format!(
                "<< /Type /Catalog /Pages 2 0 R /Lang ({}) >>",
                Self::escape_pdf_string(lang)
            )
            .into_bytes()
        };

        // Pages tree (object 2)
        let kids: String = page_obj_ids
            .iter()
            .map(|id| format!("{} 0 R", id))
            .collect::<Vec<_>>()
            .join(" ");
        builder.objects[2].data = format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids,
            page_obj_ids.len()
        )
        .into_bytes();

        let info_obj_id = self.write_info(&mut builder, metadata);
        log::debug!(
            "serializing {} objects ({} fonts, {} images)",
            builder.objects.len() - 1,
            builder.font_objects.len(),
            builder.image_objects.len()
        );
        Ok(self.serialize(&builder, info_obj_id))
    }

    fn write_info(&self, builder: &mut PdfBuilder, metadata: &Metadata) -> usize {
        let mut info = String::from("<< ");
        if let Some(ref title) = metadata.title {
            let _ = write!(info, "/Title ({}) ", Self::escape_pdf_string(title));
        }
        if let Some(ref author) = metadata.author {
            let _ = write!(info, "/Author ({}) ", Self::escape_pdf_string(author));
        }
        if let Some(ref subject) = metadata.subject {
            let _ = write!(info, "/Subject ({}) ", Self::escape_pdf_string(subject));
        }
        let creator = metadata.creator.as_deref().unwrap_or("Folio");
        let _ = write!(
            info,
            "/Creator ({}) /Producer (Folio {}) >>",
            Self::escape_pdf_string(creator),
            env!("CARGO_PKG_VERSION")
        );
        builder.push(info.into_bytes())
    }

    /// Build the PDF content stream for a single page.
    fn build_content_stream(&self, page: &PageOutput, builder: &PdfBuilder) -> String {
        let mut stream = String::new();
        let h = page.height;

        if let Some(bg) = page.background.filter(Color::is_visible) {
            let _ = write!(
                stream,
                "q\n{} rg\n0 0 {:.2} {:.2} re\nf\nQ\n",
                Self::rgb(&bg),
                page.width,
                page.height
            );
        }

        for op in &page.ops {
            self.write_op(&mut stream, op, h, builder);
        }
        stream
    }

    /// Write a single draw operation as PDF operators.
    fn write_op(&self, stream: &mut String, op: &DrawOp, page_height: f64, builder: &PdfBuilder) {
        match op {
            DrawOp::Text {
                x,
                y,
                text,
                font,
                font_size,
                color,
            } => {
                if !color.is_visible() || text.is_empty() {
                    return;
                }
                let _ = write!(
                    stream,
                    "BT\n{} rg\n/F{} {:.2} Tf\n{:.2} {:.2} Td\n({}) Tj\nET\n",
                    Self::rgb(color),
                    builder.font_index(*font),
                    font_size,
                    x,
                    page_height - y,
                    Self::encode_winansi(text)
                );
            }

            DrawOp::FillRect { rect, color } => {
                if !color.is_visible() {
                    return;
                }
                let _ = write!(
                    stream,
                    "q\n{} rg\n{} re\nf\nQ\n",
                    Self::rgb(color),
                    Self::pdf_rect(rect, page_height)
                );
            }

            DrawOp::StrokeRect { rect, color, width } => {
                if !color.is_visible() || *width <= 0.0 {
                    return;
                }
                let _ = write!(
                    stream,
                    "q\n{} RG\n{:.2} w\n{} re\nS\nQ\n",
                    Self::rgb(color),
                    width,
                    Self::pdf_rect(rect, page_height)
                );
            }

            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                width,
                color,
            } => {
                if !color.is_visible() || *width <= 0.0 {
                    return;
                }
                let _ = write!(
                    stream,
                    "q\n{} RG\n{:.2} w\n{:.2} {:.2} m\n{:.2} {:.2} l\nS\nQ\n",
                    Self::rgb(color),
                    width,
                    x1,
                    page_height - y1,
                    x2,
                    page_height - y2
                );
            }

            DrawOp::Image { rect, image } => {
                let Some(idx) = builder.image_index(image) else {
                    return;
                };
                // Image space is the unit square; scale it onto the target rect.
                let _ = write!(
                    stream,
                    "q\n{:.2} 0 0 {:.2} {:.2} {:.2} cm\n/Im{} Do\nQ\n",
                    rect.width,
                    rect.height,
                    rect.x,
                    page_height - rect.y - rect.height,
                    idx
                );
            }
        }
    }

    /// Register every font used across all pages, in a stable order.
    fn register_fonts(&self, builder: &mut PdfBuilder, pages: &[PageOutput]) {
        let mut fonts: Vec<StandardFont> = pages
            .iter()
            .flat_map(|p| p.ops.iter())
            .filter_map(|op| match op {
                DrawOp::Text { font, .. } => Some(*font),
                _ => None,
            })
            .collect();
        fonts.sort();
        fonts.dedup();

        // Always have at least Helvetica
        if fonts.is_empty() {
            fonts.push(StandardFont::Helvetica);
        }

        for font in fonts {
            let font_dict = format!(
                "<< /Type /Font /Subtype /Type1 /BaseFont /{} \
                 /Encoding /WinAnsiEncoding >>",
                font.pdf_name()
            );
            let obj_id = builder.push(font_dict.into_bytes());
            builder.font_objects.push((font, obj_id));
        }
    }

    /// Create XObjects for every distinct image across all pages.
    fn register_images(&self, builder: &mut PdfBuilder, pages: &[PageOutput]) {
        for op in pages.iter().flat_map(|p| p.ops.iter()) {
            if let DrawOp::Image { image, .. } = op {
                if builder.image_index(image).is_none() {
                    let obj_id = Self::write_image_xobject(builder, image);
                    builder.image_objects.push((Arc::clone(image), obj_id));
                }
            }
        }
    }

    /// Write a single image as one or two XObject PDF objects.
    /// Returns the main XObject ID.
    fn write_image_xobject(builder: &mut PdfBuilder, image: &LoadedImage) -> usize {
        match &image.pixel_data {
            ImagePixelData::Jpeg { data, color_space } => {
                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /{} /BitsPerComponent 8 /Filter /DCTDecode",
                    image.width_px,
                    image.height_px,
                    color_space.pdf_name()
                );
                builder.push_stream(&dict, data)
            }

            ImagePixelData::Decoded { rgb, alpha } => {
                // SMask first, so the image dict can point at it
                let smask_ref = alpha
                    .as_ref()
                    .map(|alpha_data| {
                        let dict = format!(
                            "/Type /XObject /Subtype /Image /Width {} /Height {} \
                             /ColorSpace /DeviceGray /BitsPerComponent 8 /Filter /FlateDecode",
                            image.width_px, image.height_px
                        );
                        let id = builder.push_stream(&dict, &compress_to_vec_zlib(alpha_data, 6));
                        format!(" /SMask {} 0 R", id)
                    })
                    .unwrap_or_default();

                let dict = format!(
                    "/Type /XObject /Subtype /Image /Width {} /Height {} \
                     /ColorSpace /DeviceRGB /BitsPerComponent 8 /Filter /FlateDecode{}",
                    image.width_px, image.height_px, smask_ref
                );
                builder.push_stream(&dict, &compress_to_vec_zlib(rgb, 6))
            }
        }
    }

    /// All fonts, plus the images this page draws.
    fn build_resource_dict(&self, page: &PageOutput, builder: &PdfBuilder) -> String {
        let fonts = builder
            .font_objects
            .iter()
            .enumerate()
            .map(|(i, (_, obj_id))| format!("/F{} {} 0 R", i, obj_id))
            .collect::<Vec<_>>()
            .join(" ");

        let mut used: Vec<usize> = page
            .ops
            .iter()
            .filter_map(|op| match op {
                DrawOp::Image { image, .. } => builder.image_index(image),
                _ => None,
            })
            .collect();
        used.sort_unstable();
        used.dedup();

        if used.is_empty() {
            return format!("/Font << {} >>", fonts);
        }
        let images = used
            .iter()
            .map(|&i| format!("/Im{} {} 0 R", i, builder.image_objects[i].1))
            .collect::<Vec<_>>()
            .join(" ");
        format!("/Font << {} >> /XObject << {} >>", fonts, images)
    }

    fn rgb(c: &Color) -> String {
        format!("{:.3} {:.3} {:.3}", c.r, c.g, c.b)
    }

    /// `x y w h` in PDF space for a top-down rect.
    fn pdf_rect(r: &Rect, page_height: f64) -> String {
        format!(
            "{:.2} {:.2} {:.2} {:.2}",
            r.x,
            page_height - r.y - r.height,
            r.width,
            r.height
        )
    }

    /// Escape special characters in a PDF string.
    fn escape_pdf_string(s: &str) -> String {
        s.replace('\\', "\\\\")
            .replace('(', "\\(")
            .replace(')', "\\)")
    }

    /// Encode text as an escaped WinAnsi string body. Characters outside
    /// the encoding become `?`.
    fn encode_winansi(text: &str) -> String {
        let mut out = String::with_capacity(text.len());
        for ch in text.chars() {
            let b = Self::unicode_to_winansi(ch).unwrap_or(b'?');
            match b {
                b'\\' => out.push_str("\\\\"),
                b'(' => out.push_str("\\("),
                b')' => out.push_str("\\)"),
                0x20..=0x7E => out.push(b as char),
                _ => {
                    let _ = write!(out, "\\{:03o}", b);
                }
            }
        }
        out
    }

    /// Map a Unicode codepoint to a WinAnsiEncoding byte value.
    ///
    /// WinAnsiEncoding is based on Windows-1252. Most codepoints in
    /// 0x20..=0x7E and 0xA0..=0xFF map directly. The 0x80..=0x9F range
    /// holds smart quotes, bullets, dashes and a few letters.
    fn unicode_to_winansi(ch: char) -> Option<u8> {
        let cp = ch as u32;
        if (0x20..=0x7E).contains(&cp) || (0xA0..=0xFF).contains(&cp) {
            return Some(cp as u8);
        }
        match cp {
            0x20AC => Some(0x80), // euro
            0x201A => Some(0x82),
            0x0192 => Some(0x83),
            0x201E => Some(0x84),
            0x2026 => Some(0x85), // ellipsis
            0x2020 => Some(0x86),
            0x2021 => Some(0x87),
            0x02C6 => Some(0x88),
            0x2030 => Some(0x89),
            0x0160 => Some(0x8A),
            0x2039 => Some(0x8B),
            0x0152 => Some(0x8C),
            0x017D => Some(0x8E),
            0x2018 => Some(0x91), // curly quotes
            0x2019 => Some(0x92),
            0x201C => Some(0x93),
            0x201D => Some(0x94),
            0x2022 => Some(0x95), // bullet
            0x2013 => Some(0x96), // en dash
            0x2014 => Some(0x97), // em dash
            0x02DC => Some(0x98),
            0x2122 => Some(0x99),
            0x0161 => Some(0x9A),
            0x203A => Some(0x9B),
            0x0153 => Some(0x9C),
            0x017E => Some(0x9E),
            0x0178 => Some(0x9F),
            _ => None,
        }
    }

    /// Serialize all objects into the final PDF byte stream.
    fn serialize(&self, builder: &PdfBuilder, info_obj_id: usize) -> Vec<u8> {
        let mut output: Vec<u8> = Vec::new();
        let mut offsets: Vec<usize> = vec![0; builder.objects.len()];

        // Header, plus a binary comment so transfer tools treat the file as binary
        output.extend_from_slice(b"%PDF-1.7\n");
        output.extend_from_slice(b"%\xe2\xe3\xcf\xd3\n");

        for (i, obj) in builder.objects.iter().enumerate().skip(1) {
            offsets[i] = output.len();
            let _ = write!(output, "{} 0 obj\n", i);
            output.extend_from_slice(&obj.data);
            output.extend_from_slice(b"\nendobj\n\n");
        }

        let xref_offset = output.len();
        let _ = write!(output, "xref\n0 {}\n", builder.objects.len());
        let _ = write!(output, "0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            let _ = write!(output, "{:010} 00000 n \n", offset);
        }

        let _ = write!(
            output,
            "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
            builder.objects.len(),
            info_obj_id,
            xref_offset
        );

        output
    }
}
