//! HTML for the submission form and its results.

use std::fmt::Write;

use folio_core::MAX_URLS;

/// What the form page shows below the inputs.
#[derive(Debug, Default, Clone)]
pub struct PageView<'a> {
    pub urls: &'a [String],
    pub documents: &'a [String],
    pub errors: &'a [String],
}

/// Escape text for use in element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn render_page(view: &PageView<'_>) -> String {
    let mut inputs = String::new();
    for i in 1..=MAX_URLS {
        let value = view.urls.get(i - 1).map(|u| escape_html(u)).unwrap_or_default();
        let _ = writeln!(
            inputs,
            r#"      <input type="url" name="url{i}" id="url{i}" placeholder="Article URL {i}" value="{value}">"#
        );
    }

    let mut results = String::new();
    if !view.documents.is_empty() {
        results.push_str("    <h2>Generated PDFs</h2>\n    <ul class=\"pdfs\">\n");
        for name in view.documents {
            let name = escape_html(name);
            let _ = writeln!(
                results,
                r#"      <li><a class="download-pdf" href="/download/{name}">{name}</a></li>"#
            );
        }
        results.push_str("    </ul>\n");
    }

    if !view.errors.is_empty() {
        results.push_str("    <h2>Errors</h2>\n    <ul class=\"errors\">\n");
        for error in view.errors {
            let _ = writeln!(results, "      <li class=\"error\">{}</li>", escape_html(error));
        }
        results.push_str("    </ul>\n");
    }

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Printer-friendly articles</title>
  <style>
    body {{ font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }}
    input[type=url] {{ display: block; width: 100%; margin: 0.25rem 0; padding: 0.4rem; }}
    .error {{ color: #a00; }}
  </style>
</head>
<body>
  <h1>Printer-friendly articles</h1>
  <form id="articleForm" method="post" action="/">
{inputs}      <button type="submit">Convert</button>
      <button type="button" id="clearAllUrls">Clear all</button>
  </form>
  <section id="results">
{results}    <button type="button" id="downloadAllPdfs" style="display: none">Download all</button>
  </section>
  <script src="/static/script.js"></script>
</body>
</html>
"#
    )
}
