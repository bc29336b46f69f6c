use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use anyhow::{Context, Result};
use image::RgbImage;
use printpdf::{
    BuiltinFont, ColorBits, ColorSpace, Image, ImageTransform, ImageXObject, IndirectFontRef,
    Mm, PdfDocument, PdfDocumentReference, PdfLayerReference, Px,
};

// ---------------------------------------------------------------------------
// Page geometry (A4, portrait)
// ---------------------------------------------------------------------------

const PAGE_WIDTH: f64 = 210.0;
const PAGE_HEIGHT: f64 = 297.0;
const MARGIN_LEFT: f64 = 16.0;
const MARGIN_RIGHT: f64 = 16.0;
const MARGIN_TOP: f64 = 18.0;
const MARGIN_BOTTOM: f64 = 18.0;

const PT_TO_MM: f64 = 0.352_778;
/// Rough advance width of Helvetica, as a fraction of the font size.
const AVG_CHAR_EM: f64 = 0.5;

fn mm(v: f64) -> Mm {
    Mm(v as f32)
}

// ---------------------------------------------------------------------------
// PdfWriter – cursor-based page assembly
// ---------------------------------------------------------------------------

/// Thin assembly layer over printpdf: a downward-moving cursor, automatic
/// page breaks, wrapped paragraphs, and image placement. Uses the builtin
/// Helvetica faces so no font assets are needed at run time.
pub struct PdfWriter {
    doc: PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    /// Cursor in mm from the bottom of the page.
    cursor: f64,
}

impl PdfWriter {
    pub fn new(title: &str) -> Result<Self> {
        let (doc, page, layer) =
            PdfDocument::new(title, mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "content");
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .context("registering Helvetica")?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .context("registering Helvetica-Bold")?;
        let layer = doc.get_page(page).get_layer(layer);
        Ok(PdfWriter {
            doc,
            layer,
            regular,
            bold,
            cursor: PAGE_HEIGHT - MARGIN_TOP,
        })
    }

    /// Start a fresh page and reset the cursor.
    pub fn break_page(&mut self) {
        let (page, layer) = self
            .doc
            .add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "content");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.cursor = PAGE_HEIGHT - MARGIN_TOP;
    }

    /// Break the page if fewer than `needed` mm remain. Returns whether a
    /// break happened, so callers can re-emit table headers.
    pub fn ensure_space(&mut self, needed: f64) -> bool {
        if self.cursor - needed < MARGIN_BOTTOM {
            self.break_page();
            true
        } else {
            false
        }
    }

    pub fn spacer(&mut self, height: f64) {
        self.cursor -= height;
    }

    /// One line of text at the current cursor.
    pub fn line(&mut self, text: &str, size: f64, bold: bool, indent: f64) {
        let line_height = size * 1.35 * PT_TO_MM;
        self.ensure_space(line_height);
        let font = if bold { &self.bold } else { &self.regular };
        self.cursor -= line_height;
        self.layer
            .use_text(text, size as f32, mm(MARGIN_LEFT + indent), mm(self.cursor), font);
    }

    pub fn heading(&mut self, text: &str, size: f64) {
        self.line(text, size, true, 0.0);
    }

    /// Word-wrapped body text.
    pub fn paragraph(&mut self, text: &str, size: f64) {
        let avail = PAGE_WIDTH - MARGIN_LEFT - MARGIN_RIGHT;
        let max_chars = (avail / (size * PT_TO_MM * AVG_CHAR_EM)).max(16.0) as usize;
        for line in wrap_text(text, max_chars) {
            self.line(&line, size, false, 0.0);
        }
    }

    /// Text cells at fixed x offsets (mm, relative to the left margin).
    pub fn row(&mut self, cells: &[(f64, String)], size: f64, bold: bool) {
        let line_height = size * 1.5 * PT_TO_MM;
        self.ensure_space(line_height);
        let font = if bold { &self.bold } else { &self.regular };
        self.cursor -= line_height;
        for (offset, text) in cells {
            self.layer
                .use_text(text, size as f32, mm(MARGIN_LEFT + offset), mm(self.cursor), font);
        }
    }

    /// Embed an RGB image scaled to `width` mm, keeping its aspect ratio.
    pub fn image(&mut self, img: &RgbImage, width: f64) -> Result<()> {
        let (px_w, px_h) = img.dimensions();
        if px_w == 0 || px_h == 0 {
            anyhow::bail!("empty image");
        }
        let height = width * px_h as f64 / px_w as f64;
        self.ensure_space(height + 4.0);
        self.cursor -= height;

        // Choosing the DPI so that px_w maps exactly onto `width` mm.
        let dpi = px_w as f64 * 25.4 / width;
        let xobject = ImageXObject {
            width: Px(px_w as usize),
            height: Px(px_h as usize),
            color_space: ColorSpace::Rgb,
            bits_per_component: ColorBits::Bit8,
            interpolate: true,
            image_data: img.as_raw().clone(),
            image_filter: None,
            clipping_bbox: None,
        };
        Image::from(xobject).add_to_layer(
            self.layer.clone(),
            ImageTransform {
                translate_x: Some(mm(MARGIN_LEFT)),
                translate_y: Some(mm(self.cursor)),
                dpi: Some(dpi as f32),
                ..Default::default()
            },
        );
        self.cursor -= 4.0;
        Ok(())
    }

    pub fn save(self, path: &Path) -> Result<()> {
        let file = File::create(path)
            .with_context(|| format!("creating {}", path.display()))?;
        self.doc
            .save(&mut BufWriter::new(file))
            .context("writing PDF")?;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Word wrapping
// ---------------------------------------------------------------------------

/// Greedy wrap on whitespace; a single over-long word gets its own line.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if current.is_empty() {
            current = word.to_string();
        } else if current.chars().count() + 1 + word.chars().count() <= max_chars {
            current.push(' ');
            current.push_str(word);
        } else {
            lines.push(std::mem::take(&mut current));
            current = word.to_string();
        }
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapping_respects_the_limit_and_keeps_words() {
        let lines = wrap_text("a crew of miners answers a distress call in deep space", 20);
        assert!(lines.iter().all(|l| l.chars().count() <= 20));
        assert_eq!(
            lines.join(" "),
            "a crew of miners answers a distress call in deep space"
        );
    }

    #[test]
    fn wrapping_empty_text_yields_no_lines() {
        assert!(wrap_text("   ", 10).is_empty());
    }
}
