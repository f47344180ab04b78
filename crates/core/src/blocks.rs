//! Normalization of extracted markup into a flat block sequence.
//!
//! [`normalize`] walks the content subtree once and produces markup-free
//! [`ContentNode`]s. [`resolve_blocks`] then turns each node into an optional
//! [`Block`], downloading and decoding images on the way. A node that cannot
//! be turned into a block is skipped without affecting its neighbours.

use image::DynamicImage;
use tracing::{debug, warn};
use url::Url;

use crate::fetch::Fetcher;
use crate::parse::Document;
use crate::Result;

/// Descendant elements that contribute to the rendered document.
pub const FLOW_SELECTOR: &str = "p, img, h1, h2, h3";

/// A content element stripped of markup, in document order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentNode {
    Paragraph(String),
    Heading { level: u8, text: String },
    Image { src: String },
}

/// A paragraph of justified body text.
#[derive(Debug, Clone, PartialEq)]
pub struct TextBlock {
    pub text: String,
}

/// A heading, laid out as plain-flow text.
#[derive(Debug, Clone, PartialEq)]
pub struct HeadingBlock {
    pub level: u8,
    pub text: String,
}

/// A decoded image with its drawn size in points.
#[derive(Debug, Clone)]
pub struct ImageBlock {
    pub source: Url,
    pub image: DynamicImage,
    pub width: f32,
    pub height: f32,
}

/// Renderer input.
#[derive(Debug, Clone)]
pub enum Block {
    Text(TextBlock),
    Heading(HeadingBlock),
    Image(ImageBlock),
}

impl Block {
    pub fn kind(&self) -> &'static str {
        match self {
            Block::Text(_) => "text",
            Block::Heading(_) => "heading",
            Block::Image(_) => "image",
        }
    }
}

/// Walk the extracted subtree and collect its flow elements.
pub fn normalize(content_html: &str) -> Result<Vec<ContentNode>> {
    let doc = Document::parse(content_html);
    let Some(root) = doc.body() else {
        return Ok(Vec::new());
    };

    let nodes = root
        .select(FLOW_SELECTOR)?
        .into_iter()
        .filter_map(|el| match el.tag_name().as_str() {
            "p" => Some(el.visible_text()).filter(|t| !t.is_empty()).map(ContentNode::Paragraph),
            "img" => el
                .attr("src")
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(|src| ContentNode::Image { src: src.to_string() }),
            tag => {
                let level = tag.trim_start_matches('h').parse::<u8>().ok()?;
                Some(el.visible_text())
                    .filter(|t| !t.is_empty())
                    .map(|text| ContentNode::Heading { level, text })
            }
        })
        .collect();

    Ok(nodes)
}

/// Resolve `src` against the page URL unless it is already absolute http(s).
pub fn resolve_image_url(src: &str, base_url: &Url) -> Option<Url> {
    if src.starts_with("http://") || src.starts_with("https://") {
        Url::parse(src).ok()
    } else {
        base_url.join(src).ok()
    }
}

/// Turn each node into a block, skipping images that cannot be used.
pub async fn resolve_blocks(nodes: Vec<ContentNode>, base_url: &Url, fetcher: &Fetcher) -> Vec<Block> {
    let mut blocks = Vec::with_capacity(nodes.len());

    for node in nodes {
        if let Some(block) = resolve_node(node, base_url, fetcher).await {
            blocks.push(block);
        }
    }

    blocks
}

async fn resolve_node(node: ContentNode, base_url: &Url, fetcher: &Fetcher) -> Option<Block> {
    match node {
        ContentNode::Paragraph(text) => Some(Block::Text(TextBlock { text })),
        ContentNode::Heading { level, text } => Some(Block::Heading(HeadingBlock { level, text })),
        ContentNode::Image { src } => {
            let Some(url) = resolve_image_url(&src, base_url) else {
                debug!(src, "skipping image with unresolvable source");
                return None;
            };

            match load_image(&url, fetcher).await {
                Ok(Some(block)) => Some(Block::Image(block)),
                Ok(None) => None,
                Err(e) => {
                    warn!(url = %url, error = %e, "skipping image");
                    None
                }
            }
        }
    }
}

async fn load_image(url: &Url, fetcher: &Fetcher) -> Result<Option<ImageBlock>> {
    let Some(fetched) = fetcher.fetch_image(url).await? else {
        return Ok(None);
    };

    Ok(Some(decode_image(url.clone(), &fetched.body)?))
}

/// Decode image bytes, sizing the block at one point per pixel.
pub fn decode_image(source: Url, bytes: &[u8]) -> Result<ImageBlock> {
    let image = image::load_from_memory(bytes)?;
    let (width, height) = (image.width() as f32, image.height() as f32);

    Ok(ImageBlock { source, image, width, height })
}
