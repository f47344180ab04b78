pub mod archive;
pub mod blocks;
pub mod convert;
pub mod error;
pub mod extract;
pub mod fetch;
pub mod layout;
pub mod parse;
pub mod preprocess;
pub mod render;
pub mod sanitize;
pub mod storage;

pub use archive::{ARCHIVE_MEDIA_TYPE, ARCHIVE_NAME, ArchiveRequest, build_archive};
pub use blocks::{Block, ContentNode, HeadingBlock, ImageBlock, TextBlock, normalize, resolve_blocks};
pub use convert::{ConversionOutcome, ConversionReport, Converter, MAX_URLS, Stage, accepted_urls};
pub use error::{FolioError, Result};
pub use extract::{ExtractedContent, extract_article, extract_from_html};
pub use fetch::{FetchConfig, Fetched, FetchedPage, Fetcher};
#[doc(hidden)]
pub use layout::{LayoutConfig, Page, PageGeometry, Placed, clamp_image_size, layout};
pub use parse::Document;
pub use preprocess::{PreprocessConfig, preprocess_html};
pub use render::{DOCUMENT_EXTENSION, render_document, render_pdf};
pub use sanitize::sanitize_filename;
pub use storage::{DEFAULT_STORAGE_DIR, Storage};
