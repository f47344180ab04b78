//! End-to-end conversion tests against a local HTTP fixture server
use std::io::Cursor;

use folio_core::*;
use httpmock::{Method::GET, MockServer};
use tempfile::TempDir;

fn png_bytes(width: u32, height: u32) -> Vec<u8> {
    let img = image::RgbImage::from_fn(width, height, |x, y| image::Rgb([(x * 7) as u8, (y * 11) as u8, 128]));
    let mut out = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgb8(img).write_to(&mut out, image::ImageFormat::Png).unwrap();
    out.into_inner()
}

fn fast_config() -> FetchConfig {
    FetchConfig { timeout: 5, ..Default::default() }
}

fn story_page(image_url: &str) -> String {
    format!(
        r#"<html><head><title>Story</title><script>track()</script></head>
        <body>
          <nav><p>Home | About</p></nav>
          <article>
            <p>The first paragraph of the story.</p>
            <p>The second paragraph of the story.</p>
            <img src="{image_url}">
          </article>
          <footer><p>Copyright</p></footer>
        </body></html>"#
    )
}

#[tokio::test]
async fn test_single_url_with_paragraphs_and_image() {
    let server = MockServer::start_async().await;
    let image_url = server.url("/img/photo.png");
    let page = server
        .mock_async(|when, then| {
            when.method(GET).path("/news/story");
            then.status(200).header("content-type", "text/html").body(story_page(&image_url));
        })
        .await;
    let image = server
        .mock_async(|when, then| {
            when.method(GET).path("/img/photo.png");
            then.status(200).header("content-type", "image/png").body(png_bytes(40, 30));
        })
        .await;

    let tmp = TempDir::new().unwrap();
    let converter = Converter::new(fast_config(), Storage::open(tmp.path()).unwrap()).unwrap();
    let report = converter.convert_batch(&[server.url("/news/story")]).await;

    assert_eq!(report.documents, vec!["story.pdf"]);
    assert!(report.errors.is_empty());
    page.assert_async().await;
    image.assert_async().await;

    let bytes = std::fs::read(tmp.path().join("story.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_blocks_follow_source_order() {
    let server = MockServer::start_async().await;
    let image_url = server.url("/img/photo.png");
    server
        .mock_async(|when, then| {
            when.method(GET).path("/news/story");
            then.status(200).body(story_page(&image_url));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/img/photo.png");
            then.status(200).body(png_bytes(40, 30));
        })
        .await;

    let fetcher = Fetcher::new(fast_config()).unwrap();
    let extracted = extract_article(&server.url("/news/story"), &fetcher).await.unwrap();
    assert_eq!(extracted.selector, "article");

    let nodes = normalize(&extracted.html).unwrap();
    let blocks = resolve_blocks(nodes, &extracted.base_url, &fetcher).await;
    let kinds: Vec<&str> = blocks.iter().map(Block::kind).collect();
    assert_eq!(kinds, vec!["text", "text", "image"]);

    let pages = layout(&blocks, &LayoutConfig::default());
    assert_eq!(pages.len(), 1);
    assert!(matches!(&pages[0].items[2], Placed::Image(i) if i.width == 40.0 && i.height == 30.0));
}

#[tokio::test]
async fn test_relative_and_broken_images_are_skipped_individually() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/blog/post");
            then.status(200).body(
                r#"<main>
                    <img src="missing.png">
                    <p>Between images.</p>
                    <img src="/static/garbage.png">
                    <img src="pics/ok.png">
                </main>"#,
            );
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/blog/missing.png");
            then.status(404);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/static/garbage.png");
            then.status(200).body("definitely not a png");
        })
        .await;
    let ok = server
        .mock_async(|when, then| {
            when.method(GET).path("/blog/pics/ok.png");
            then.status(200).body(png_bytes(300, 10));
        })
        .await;

    let fetcher = Fetcher::new(fast_config()).unwrap();
    let extracted = extract_article(&server.url("/blog/post"), &fetcher).await.unwrap();
    let blocks = resolve_blocks(normalize(&extracted.html).unwrap(), &extracted.base_url, &fetcher).await;

    ok.assert_async().await;
    let kinds: Vec<&str> = blocks.iter().map(Block::kind).collect();
    assert_eq!(kinds, vec!["text", "image"]);

    let pages = layout(&blocks, &LayoutConfig::default());
    assert!(matches!(&pages[0].items[1], Placed::Image(i) if i.width == 72.0 && i.height == 10.0));
}

#[tokio::test]
async fn test_unreachable_url_reports_error() {
    let tmp = TempDir::new().unwrap();
    let converter = Converter::new(fast_config(), Storage::open(tmp.path()).unwrap()).unwrap();
    let url = "http://folio-test-host.invalid/article";

    let report = converter.convert_batch(&[url]).await;

    assert!(report.documents.is_empty());
    assert_eq!(report.errors.len(), 1);
    assert!(report.errors[0].contains(url));
    assert!(matches!(&report.outcomes[0], ConversionOutcome::Failed { stage: Stage::Extract, .. }));
    assert!(Storage::open(tmp.path()).unwrap().list().unwrap().is_empty());
}

#[tokio::test]
async fn test_error_status_reports_error_and_batch_continues() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/gone");
            then.status(500);
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/fine");
            then.status(200).body("<article><p>Fine.</p></article>");
        })
        .await;

    let tmp = TempDir::new().unwrap();
    let converter = Converter::new(fast_config(), Storage::open(tmp.path()).unwrap()).unwrap();
    let report = converter.convert_batch(&[server.url("/gone"), server.url("/fine")]).await;

    assert_eq!(report.documents, vec!["fine.pdf"]);
    assert_eq!(report.errors, vec![format!("Unable to convert URL: {}", server.url("/gone"))]);
}

#[tokio::test]
async fn test_same_stem_overwrites_with_later_url() {
    let server = MockServer::start_async().await;
    let first = server
        .mock_async(|when, then| {
            when.method(GET).path("/a/post");
            then.status(200).body("<article><p>Short.</p></article>");
        })
        .await;
    let long_body = format!("<article>{}</article>", "<p>A much longer paragraph of text.</p>".repeat(200));
    let second = server
        .mock_async(|when, then| {
            when.method(GET).path("/b/post");
            then.status(200).body(long_body);
        })
        .await;

    let solo_dir = TempDir::new().unwrap();
    let solo = Converter::new(fast_config(), Storage::open(solo_dir.path()).unwrap()).unwrap();
    solo.convert_batch(&[server.url("/a/post")]).await;
    let short_size = std::fs::metadata(solo_dir.path().join("post.pdf")).unwrap().len();

    let tmp = TempDir::new().unwrap();
    let storage = Storage::open(tmp.path()).unwrap();
    let converter = Converter::new(fast_config(), storage.clone()).unwrap();
    let report = converter.convert_batch(&[server.url("/a/post"), server.url("/b/post")]).await;

    assert_eq!(report.documents, vec!["post.pdf", "post.pdf"]);
    assert_eq!(storage.list().unwrap(), vec!["post.pdf"]);
    first.assert_hits_async(2).await;
    second.assert_async().await;

    let final_size = std::fs::metadata(tmp.path().join("post.pdf")).unwrap().len();
    assert!(final_size > short_size);
}

#[tokio::test]
async fn test_namespace_prevents_collision() {
    let server = MockServer::start_async().await;
    for path in ["/a/post", "/b/post"] {
        server
            .mock_async(|when, then| {
                when.method(GET).path(path);
                then.status(200).body("<article><p>Body.</p></article>");
            })
            .await;
    }

    let tmp = TempDir::new().unwrap();
    let storage = Storage::open(tmp.path()).unwrap();
    let one = Converter::new(fast_config(), storage.clone()).unwrap().with_namespace("s1");
    let two = Converter::new(fast_config(), storage.clone()).unwrap().with_namespace("s2");

    one.convert_batch(&[server.url("/a/post")]).await;
    two.convert_batch(&[server.url("/b/post")]).await;

    assert_eq!(storage.list().unwrap(), vec!["s1-post.pdf", "s2-post.pdf"]);
}

#[tokio::test]
async fn test_page_without_flow_elements_renders_empty_document() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/empty");
            then.status(200).body("<article><ul><li>Only a list</li></ul></article>");
        })
        .await;

    let tmp = TempDir::new().unwrap();
    let converter = Converter::new(fast_config(), Storage::open(tmp.path()).unwrap()).unwrap();
    let outcome = converter.convert_url(&server.url("/empty")).await;

    assert_eq!(
        outcome,
        ConversionOutcome::Converted { url: server.url("/empty"), file_name: "empty.pdf".to_string() }
    );
    let bytes = std::fs::read(tmp.path().join("empty.pdf")).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
}

#[tokio::test]
async fn test_archive_of_converted_documents() {
    let server = MockServer::start_async().await;
    for path in ["/first", "/second"] {
        server
            .mock_async(|when, then| {
                when.method(GET).path(path);
                then.status(200).body("<article><p>Archived.</p></article>");
            })
            .await;
    }

    let tmp = TempDir::new().unwrap();
    let storage = Storage::open(tmp.path()).unwrap();
    let converter = Converter::new(fast_config(), storage.clone()).unwrap();
    let report = converter.convert_batch(&[server.url("/first"), server.url("/second")]).await;
    assert_eq!(report.documents, vec!["first.pdf", "second.pdf"]);

    let links: Vec<String> = report.documents.iter().map(|d| format!("http://localhost/download/{d}")).collect();
    let bytes = build_archive(&storage, &links).unwrap();

    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).unwrap();
    let names: Vec<String> = (0..archive.len()).map(|i| archive.by_index(i).unwrap().name().to_string()).collect();
    assert_eq!(names, vec!["first.pdf", "second.pdf"]);
}
