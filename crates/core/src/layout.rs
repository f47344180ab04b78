//! Page layout for the printer-friendly document.
//!
//! Blocks flow top to bottom into a single frame per page. All measurements
//! are in PDF points with the origin at the bottom-left corner of the page.

use crate::blocks::Block;

pub const POINTS_PER_INCH: f32 = 72.0;

/// Largest drawn width or height of an image (one inch).
pub const IMAGE_CAP: f32 = POINTS_PER_INCH;

/// Vertical gap after every paragraph, heading and image (a quarter inch).
pub const BLOCK_SPACING: f32 = 0.25 * POINTS_PER_INCH;

/// Page size and margins.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// US Letter with one-inch margins.
    pub const LETTER: PageGeometry = PageGeometry { width: 612.0, height: 792.0, margin: 72.0 };

    pub fn frame_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    fn frame_top(&self) -> f32 {
        self.height - self.margin
    }

    fn frame_bottom(&self) -> f32 {
        self.margin
    }
}

#[derive(Debug, Clone)]
pub struct LayoutConfig {
    pub page: PageGeometry,
    pub font_size: f32,
    pub leading: f32,
    pub block_spacing: f32,
    pub image_cap: f32,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            page: PageGeometry::LETTER,
            font_size: 10.0,
            leading: 12.0,
            block_spacing: BLOCK_SPACING,
            image_cap: IMAGE_CAP,
        }
    }
}

/// One line of text; `y` is the baseline.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedLine {
    pub x: f32,
    pub y: f32,
    pub text: String,
    pub word_spacing: f32,
}

/// An image box; `y` is the bottom edge and `block` indexes the input blocks.
#[derive(Debug, Clone, PartialEq)]
pub struct PlacedImage {
    pub block: usize,
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Placed {
    Line(PlacedLine),
    Image(PlacedImage),
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub items: Vec<Placed>,
}

/// Clamp drawn image dimensions to `cap`.
///
/// When either side exceeds the cap, each side is independently limited to
/// it. The aspect ratio is not kept: a 200 x 50 image becomes 72 x 50.
pub fn clamp_image_size(width: f32, height: f32, cap: f32) -> (f32, f32) {
    if width > cap || height > cap { (width.min(cap), height.min(cap)) } else { (width, height) }
}

struct Cursor<'c> {
    config: &'c LayoutConfig,
    pages: Vec<Page>,
    y: f32,
}

impl<'c> Cursor<'c> {
    fn new(config: &'c LayoutConfig) -> Self {
        Self { config, pages: vec![Page::default()], y: config.page.frame_top() }
    }

    fn at_top(&self) -> bool {
        self.y >= self.config.page.frame_top()
    }

    fn remaining(&self) -> f32 {
        self.y - self.config.page.frame_bottom()
    }

    fn new_page(&mut self) {
        self.pages.push(Page::default());
        self.y = self.config.page.frame_top();
    }

    /// Reserve `height` points, breaking the page first if needed.
    fn reserve(&mut self, height: f32) -> f32 {
        if height > self.remaining() && !self.at_top() {
            self.new_page();
        }
        let top = self.y;
        self.y -= height;
        top
    }

    fn push(&mut self, item: Placed) {
        if let Some(page) = self.pages.last_mut() {
            page.items.push(item);
        }
    }

    fn space(&mut self, height: f32) {
        if height <= self.remaining() {
            self.y -= height;
        }
    }

    fn paragraph(&mut self, text: &str) {
        let cfg = self.config;
        let frame_width = cfg.page.frame_width();
        let lines = wrap_words(text, frame_width, cfg.font_size);
        let last = lines.len().saturating_sub(1);

        for (i, words) in lines.into_iter().enumerate() {
            let word_spacing = if i < last { justify_spacing(&words, frame_width, cfg.font_size) } else { 0.0 };
            let top = self.reserve(cfg.leading);
            self.push(Placed::Line(PlacedLine {
                x: cfg.page.margin,
                y: top - cfg.font_size,
                text: words.join(" "),
                word_spacing,
            }));
        }
        self.space(cfg.block_spacing);
    }

    fn image(&mut self, block: usize, width: f32, height: f32) {
        let cfg = self.config;
        let (width, height) = clamp_image_size(width, height, cfg.image_cap);
        let top = self.reserve(height);
        let x = cfg.page.margin + (cfg.page.frame_width() - width).max(0.0) / 2.0;

        self.push(Placed::Image(PlacedImage { block, x, y: top - height, width, height }));
        self.space(cfg.block_spacing);
    }
}

/// Lay blocks out onto pages. An empty input yields one blank page.
pub fn layout(blocks: &[Block], config: &LayoutConfig) -> Vec<Page> {
    let mut cursor = Cursor::new(config);

    for (index, block) in blocks.iter().enumerate() {
        match block {
            Block::Text(text) => cursor.paragraph(&text.text),
            Block::Heading(heading) => cursor.paragraph(&heading.text),
            Block::Image(image) => cursor.image(index, image.width, image.height),
        }
    }

    cursor.pages
}

/// Greedy word wrap. A word wider than the frame gets a line of its own.
pub fn wrap_words(text: &str, max_width: f32, font_size: f32) -> Vec<Vec<String>> {
    let space = char_width(' ', font_size);
    let mut lines: Vec<Vec<String>> = Vec::new();
    let mut current: Vec<String> = Vec::new();
    let mut current_width = 0.0;

    for word in text.split_whitespace() {
        let word = printable(word);
        if word.is_empty() {
            continue;
        }
        let width = text_width(&word, font_size);

        if !current.is_empty() && current_width + space + width > max_width {
            lines.push(std::mem::take(&mut current));
            current_width = 0.0;
        }

        current_width += if current.is_empty() { width } else { space + width };
        current.push(word);
    }

    if !current.is_empty() {
        lines.push(current);
    }

    lines
}

/// Extra space per word gap that stretches a line to the full frame width.
fn justify_spacing(words: &[String], frame_width: f32, font_size: f32) -> f32 {
    let gaps = words.len().saturating_sub(1);
    if gaps == 0 {
        return 0.0;
    }
    let natural = text_width(&words.join(" "), font_size);
    ((frame_width - natural) / gaps as f32).max(0.0)
}

/// Width of `text` set in Helvetica at `font_size`.
pub fn text_width(text: &str, font_size: f32) -> f32 {
    text.chars().map(|c| char_width(c, font_size)).sum()
}

fn char_width(c: char, font_size: f32) -> f32 {
    let units = match c as u32 {
        code @ 32..=126 => HELVETICA_WIDTHS[(code - 32) as usize],
        code @ 0xA0..=0xFF => HELVETICA_LATIN1_WIDTHS[(code - 0xA0) as usize],
        _ => winansi_extra_width(c).unwrap_or(556),
    };
    units as f32 * font_size / 1000.0
}

fn winansi_extra_width(c: char) -> Option<u16> {
    WINANSI_EXTRAS.iter().find(|(extra, _)| *extra == c).map(|(_, width)| *width)
}

/// Map text onto the WinAnsi characters the built-in Helvetica can show.
///
/// Latin-1 letters and the typographic marks WinAnsi encodes pass through.
/// Dashes and primes outside WinAnsi fall back to ASCII look-alikes;
/// anything else becomes `?`.
pub fn printable(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            ' '..='~' | '\u{00A1}'..='\u{00AC}' | '\u{00AE}'..='\u{00FF}' => out.push(c),
            '\u{00AD}' => {}
            c if winansi_extra_width(c).is_some() => out.push(c),
            '\u{2032}' => out.push('\''),
            '\u{2033}' => out.push('"'),
            '\u{2010}'..='\u{2012}' | '\u{2015}' | '\u{2212}' => out.push('-'),
            c if c.is_whitespace() => out.push(' '),
            _ => out.push('?'),
        }
    }
    out
}

/// Advance widths of Helvetica for ASCII 32..=126, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_WIDTHS: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556,
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556,
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556,
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,
];

/// Advance widths of Helvetica for U+00A0..=U+00FF, in 1/1000 em.
#[rustfmt::skip]
const HELVETICA_LATIN1_WIDTHS: [u16; 96] = [
    278, 333, 556, 556, 556, 556, 260, 556, 333, 737, 370, 556, 584, 333, 737, 333,
    400, 584, 333, 333, 333, 556, 537, 278, 333, 333, 365, 556, 834, 834, 834, 611,
    667, 667, 667, 667, 667, 667, 1000, 722, 667, 667, 667, 667, 278, 278, 278, 278,
    722, 722, 778, 778, 778, 778, 778, 584, 778, 722, 722, 722, 722, 667, 667, 611,
    556, 556, 556, 556, 556, 556, 889, 500, 556, 556, 556, 556, 278, 278, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 584, 611, 556, 556, 556, 556, 500, 556, 500,
];

/// Characters WinAnsi places in 0x80..=0x9F, with their Helvetica widths.
#[rustfmt::skip]
const WINANSI_EXTRAS: &[(char, u16)] = &[
    ('\u{20AC}', 556), ('\u{201A}', 222), ('\u{0192}', 556), ('\u{201E}', 333),
    ('\u{2026}', 1000), ('\u{2020}', 556), ('\u{2021}', 556), ('\u{02C6}', 333),
    ('\u{2030}', 1000), ('\u{0160}', 667), ('\u{2039}', 333), ('\u{0152}', 1000),
    ('\u{017D}', 611), ('\u{2018}', 222), ('\u{2019}', 222), ('\u{201C}', 333),
    ('\u{201D}', 333), ('\u{2022}', 350), ('\u{2013}', 556), ('\u{2014}', 1000),
    ('\u{02DC}', 333), ('\u{2122}', 1000), ('\u{0161}', 500), ('\u{203A}', 333),
    ('\u{0153}', 944), ('\u{017E}', 500), ('\u{0178}', 667),
];
