use std::io::{BufWriter, Cursor};

use base64::Engine as _;
use log::{debug, warn};
use printpdf::image_crate::DynamicImage;
use printpdf::{
    BuiltinFont, Color, Image, ImageTransform, IndirectFontRef, Line, Mm, PdfDocument,
    PdfDocumentReference, PdfLayerReference, Point, Rgb,
};

use super::layout::{Align, DocumentLayout, LogoBox, Rule, TextRun, Weight, FOOTER_Y, PAGE_H, PAGE_W};
use super::DocumentTemplate;
use crate::error::{Error, Result};

const PT_TO_MM: f32 = 25.4 / 72.0;
const LOGO_DPI: f32 = 300.0;

enum Metrics<'a> {
    Helvetica,
    Face(ttf_parser::Face<'a>),
}

/// Approximate Helvetica advance widths in ems.
fn helvetica_em(ch: char) -> f32 {
    match ch {
        ' ' | '.' | ',' | ':' | ';' | '!' | '\'' | '|' | 'i' | 'j' | 'l' | 'I' | 'f' | 't' => 0.278,
        '-' | '/' | '(' | ')' | 'r' => 0.333,
        '0'..='9' | '$' | '#' | '_' => 0.556,
        'm' | 'M' | 'W' | '%' => 0.833,
        'w' | 'C' | 'D' | 'G' | 'H' | 'N' | 'O' | 'Q' | 'R' | 'U' => 0.722,
        c if c.is_ascii_uppercase() => 0.667,
        c if c.is_ascii_lowercase() => 0.556,
        _ => 0.6,
    }
}

impl Metrics<'_> {
    fn width_mm(&self, text: &str, size_pt: f32, weight: Weight) -> f32 {
        match self {
            Metrics::Helvetica => {
                let em: f32 = text.chars().map(helvetica_em).sum();
                let bold = if weight == Weight::Bold { 1.06 } else { 1.0 };
                em * bold * size_pt * PT_TO_MM
            }
            Metrics::Face(face) => {
                let units_per_em = face.units_per_em() as f32;
                if units_per_em <= 0.0 {
                    return 0.0;
                }
                let units: i32 = text
                    .chars()
                    .filter_map(|ch| face.glyph_index(ch))
                    .map(|gid| face.glyph_hor_advance(gid).unwrap_or(0) as i32)
                    .sum();
                (units as f32 / units_per_em) * size_pt * PT_TO_MM
            }
        }
    }
}

struct Fonts<'a> {
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    metrics: Metrics<'a>,
}

impl<'a> Fonts<'a> {
    /// Built-in Helvetica unless a TTF was supplied. A TTF is used for both
    /// weights.
    fn load(doc: &PdfDocumentReference, ttf: Option<&'a [u8]>) -> Result<Self> {
        match ttf {
            Some(bytes) => {
                let font = doc
                    .add_external_font(Cursor::new(bytes))
                    .map_err(|e| Error::Pdf(e.to_string()))?;
                let face = ttf_parser::Face::parse(bytes, 0)
                    .map_err(|e| Error::Pdf(format!("failed to parse font for measurement: {e}")))?;
                Ok(Self {
                    bold: font.clone(),
                    regular: font,
                    metrics: Metrics::Face(face),
                })
            }
            None => {
                let regular = doc
                    .add_builtin_font(BuiltinFont::Helvetica)
                    .map_err(|e| Error::Pdf(e.to_string()))?;
                let bold = doc
                    .add_builtin_font(BuiltinFont::HelveticaBold)
                    .map_err(|e| Error::Pdf(e.to_string()))?;
                Ok(Self {
                    regular,
                    bold,
                    metrics: Metrics::Helvetica,
                })
            }
        }
    }
}

fn gray(g: f32) -> Color {
    Color::Rgb(Rgb::new(g, g, g, None))
}

fn draw_text(layer: &PdfLayerReference, fonts: &Fonts<'_>, run: &TextRun, y: f32) {
    let font = match run.weight {
        Weight::Regular => &fonts.regular,
        Weight::Bold => &fonts.bold,
    };
    let x = match run.align {
        Align::Left => run.x,
        Align::Right => run.x - fonts.metrics.width_mm(&run.text, run.size, run.weight),
        Align::Center => run.x - fonts.metrics.width_mm(&run.text, run.size, run.weight) / 2.0,
    };
    layer.set_fill_color(gray(run.gray));
    layer.use_text(run.text.as_str(), run.size, Mm(x.max(0.0)), Mm(y), font);
}

fn draw_rule(layer: &PdfLayerReference, rule: &Rule, y: f32) {
    layer.set_outline_color(gray(rule.gray));
    layer.set_outline_thickness(rule.thickness);
    layer.add_line(Line {
        points: vec![
            (Point::new(Mm(rule.x1), Mm(y)), false),
            (Point::new(Mm(rule.x2), Mm(y)), false),
        ],
        is_closed: false,
    });
}

/// Accepts `data:image/*;base64,...`. Anything else yields `None`.
fn decode_logo(url: &str) -> Option<DynamicImage> {
    let s = url.trim();
    if !s.to_ascii_lowercase().starts_with("data:") {
        return None;
    }
    let (meta, data) = s.split_once(',')?;
    if !meta.to_ascii_lowercase().contains(";base64") {
        return None;
    }
    let bytes = base64::engine::general_purpose::STANDARD.decode(data.trim()).ok()?;
    printpdf::image_crate::load_from_memory(&bytes).ok()
}

fn draw_logo(layer: &PdfLayerReference, img: DynamicImage, area: LogoBox) {
    let natural_w = img.width().max(1) as f32 / LOGO_DPI * 25.4;
    let natural_h = img.height().max(1) as f32 / LOGO_DPI * 25.4;
    let scale = (area.max_w / natural_w).min(area.max_h / natural_h).max(0.01);

    let x = area.right - natural_w * scale;
    let bottom = area.top - natural_h * scale;

    Image::from_dynamic_image(&img).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(Mm(x)),
            translate_y: Some(Mm(bottom)),
            rotate: None,
            scale_x: Some(scale),
            scale_y: Some(scale),
            dpi: Some(LOGO_DPI),
        },
    );
}

fn page_layer(layers: &[PdfLayerReference], page: usize) -> Result<&PdfLayerReference> {
    layers
        .get(page)
        .ok_or_else(|| Error::Pdf(format!("layout refers to missing page {}", page + 1)))
}

pub(super) fn paint(layout: &DocumentLayout, template: &DocumentTemplate, title: &str) -> Result<Vec<u8>> {
    let (doc, page1, layer1) = PdfDocument::new(title, Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
    let mut layers = vec![doc.get_page(page1).get_layer(layer1)];
    for _ in 1..layout.page_count {
        let (page, layer) = doc.add_page(Mm(PAGE_W), Mm(PAGE_H), "Layer 1");
        layers.push(doc.get_page(page).get_layer(layer));
    }

    let font_bytes = match &template.font_path {
        Some(path) => Some(std::fs::read(path)?),
        None => None,
    };
    let fonts = Fonts::load(&doc, font_bytes.as_deref())?;

    for block in &layout.blocks {
        for placed in &block.rows {
            let layer = page_layer(&layers, placed.page)?;
            if let Some(rule) = &placed.row.rule {
                draw_rule(layer, rule, placed.baseline);
            }
            for run in &placed.row.runs {
                draw_text(layer, &fonts, run, placed.baseline);
            }
        }
    }

    for (page, runs) in layout.footers.iter().enumerate() {
        let layer = page_layer(&layers, page)?;
        for run in runs {
            draw_text(layer, &fonts, run, FOOTER_Y);
        }
    }

    if let (Some(area), Some(url)) = (layout.logo, template.logo_url.as_deref()) {
        match decode_logo(url) {
            Some(img) => draw_logo(page_layer(&layers, 0)?, img, area),
            None => warn!("logo is not a base64 image data URL; skipping it"),
        }
    }

    drop(layers);
    let mut writer = BufWriter::new(Vec::<u8>::new());
    doc.save(&mut writer).map_err(|e| Error::Pdf(e.to_string()))?;
    let bytes = writer.into_inner().map_err(|e| Error::Pdf(e.to_string()))?;
    debug!("rendered {title}: {} page(s), {} bytes", layout.page_count, bytes.len());
    Ok(bytes)
}
