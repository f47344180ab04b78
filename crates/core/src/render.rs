//! PDF serialization of laid-out pages.

use std::path::PathBuf;

use image::{DynamicImage, Rgb, RgbImage};
use printpdf::{BuiltinFont, Image, ImageTransform, IndirectFontRef, Mm, PdfDocument, PdfLayerReference, Pt};
use tracing::{debug, info};

use crate::blocks::Block;
use crate::layout::{LayoutConfig, Page, Placed, PlacedImage, PlacedLine, layout};
use crate::storage::Storage;
use crate::{FolioError, Result};

/// File extension of rendered documents.
pub const DOCUMENT_EXTENSION: &str = "pdf";

const LAYER_NAME: &str = "Content";

/// Resolution at which one image pixel maps to one point.
const IMAGE_DPI: f32 = 72.0;

fn mm(points: f32) -> Mm {
    Mm::from(Pt(points))
}

/// Serialize blocks into PDF bytes.
pub fn render_pdf(blocks: &[Block], title: &str, config: &LayoutConfig) -> Result<Vec<u8>> {
    let pages = layout(blocks, config);
    let geometry = config.page;

    let (doc, first_page, first_layer) =
        PdfDocument::new(title, mm(geometry.width), mm(geometry.height), LAYER_NAME);
    let font = doc.add_builtin_font(BuiltinFont::Helvetica)?;

    for (i, page) in pages.iter().enumerate() {
        let layer = if i == 0 {
            doc.get_page(first_page).get_layer(first_layer)
        } else {
            let (page_index, layer_index) = doc.add_page(mm(geometry.width), mm(geometry.height), LAYER_NAME);
            doc.get_page(page_index).get_layer(layer_index)
        };
        draw_page(&layer, page, blocks, &font, config)?;
    }

    debug!(pages = pages.len(), blocks = blocks.len(), "serializing document");
    Ok(doc.save_to_bytes()?)
}

fn draw_page(
    layer: &PdfLayerReference, page: &Page, blocks: &[Block], font: &IndirectFontRef, config: &LayoutConfig,
) -> Result<()> {
    for item in &page.items {
        match item {
            Placed::Line(line) => draw_line(layer, line, font, config.font_size),
            Placed::Image(placed) => {
                let Some(Block::Image(block)) = blocks.get(placed.block) else {
                    return Err(FolioError::Render(format!("no image block at index {}", placed.block)));
                };
                draw_image(layer, placed, &block.image);
            }
        }
    }
    Ok(())
}

fn draw_line(layer: &PdfLayerReference, line: &PlacedLine, font: &IndirectFontRef, font_size: f32) {
    layer.begin_text_section();
    layer.set_font(font, font_size);
    layer.set_word_spacing(line.word_spacing);
    layer.set_text_cursor(mm(line.x), mm(line.y));
    layer.write_text(line.text.clone(), font);
    layer.end_text_section();
}

fn draw_image(layer: &PdfLayerReference, placed: &PlacedImage, image: &DynamicImage) {
    let rgb = DynamicImage::ImageRgb8(flatten_onto_white(image));
    let (px_width, px_height) = (rgb.width().max(1) as f32, rgb.height().max(1) as f32);

    Image::from_dynamic_image(&rgb).add_to_layer(
        layer.clone(),
        ImageTransform {
            translate_x: Some(mm(placed.x)),
            translate_y: Some(mm(placed.y)),
            scale_x: Some(placed.width / px_width),
            scale_y: Some(placed.height / px_height),
            dpi: Some(IMAGE_DPI),
            ..Default::default()
        },
    );
}

/// Composite any alpha channel over a white page background.
fn flatten_onto_white(image: &DynamicImage) -> RgbImage {
    let rgba = image.to_rgba8();
    RgbImage::from_fn(rgba.width(), rgba.height(), |x, y| {
        let [r, g, b, a] = rgba.get_pixel(x, y).0;
        let alpha = u16::from(a);
        let blend = |c: u8| ((u16::from(c) * alpha + 255 * (255 - alpha)) / 255) as u8;
        Rgb([blend(r), blend(g), blend(b)])
    })
}

/// Render blocks and write `<stem>.pdf` into storage, replacing any existing file.
pub fn render_document(blocks: &[Block], storage: &Storage, stem: &str, title: Option<&str>) -> Result<PathBuf> {
    let bytes = render_pdf(blocks, title.unwrap_or(stem), &LayoutConfig::default())?;
    let path = storage.write(&document_file_name(stem), &bytes)?;

    info!(path = %path.display(), bytes = bytes.len(), "wrote document");
    Ok(path)
}

pub fn document_file_name(stem: &str) -> String {
    format!("{}.{}", stem, DOCUMENT_EXTENSION)
}
