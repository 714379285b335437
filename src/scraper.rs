//! Page content extraction.
//!
//! Uses reqwest for fetching and scraper for HTML parsing. The extracted text
//! is the text of every paragraph and heading in the page's `main` element
//! (or the whole body when there is none), each followed by a single space.
//! Whitespace runs inside an element collapse to one space, as rendered text
//! would show them.

use reqwest::Client;
use scraper::{ElementRef, Html, Selector};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

/// User-Agent string identifying this scraper
const USER_AGENT: &str = concat!(
    "precis/",
    env!("CARGO_PKG_VERSION"),
    " (https://github.com/cladam/precis)"
);

/// Default timeout for HTTP requests
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const CONTENT_ELEMENTS: &str = "p, h1, h2, h3, h4, h5, h6";

#[derive(Error, Debug)]
pub enum ScraperError {
    #[error("failed to fetch URL: {0}")]
    FetchError(#[from] reqwest::Error),
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("no content found at {0}")]
    NoContent(String),
}

/// Extracted content from a webpage
#[derive(Debug, Clone)]
pub struct WebContent {
    /// Where the content came from (URL or file path)
    pub source: String,
    /// Page title
    pub title: Option<String>,
    /// Concatenated paragraph and heading text
    pub text: String,
}

/// Create a configured HTTP client for scraping
fn create_client() -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(USER_AGENT)
        .timeout(REQUEST_TIMEOUT)
        .build()
}

/// Load content from a URL or a local file.
///
/// `http://` and `https://` sources are fetched. Other sources are file paths:
/// `.html` and `.htm` files are parsed as HTML, anything else is taken as
/// plain text.
pub async fn load(source: &str) -> Result<WebContent, ScraperError> {
    if source.starts_with("http://") || source.starts_with("https://") {
        return fetch_content(source).await;
    }

    let path = Path::new(source);
    let raw = tokio::fs::read_to_string(path)
        .await
        .map_err(|source_err| ScraperError::ReadError {
            path: source.to_string(),
            source: source_err,
        })?;

    let is_html = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("html") || ext.eq_ignore_ascii_case("htm"))
        .unwrap_or(false);

    if is_html {
        parse_page(source, &raw)
    } else {
        debug!(path = source, "reading plain text source");
        let text = collapse_whitespace(&raw);
        if text.is_empty() {
            return Err(ScraperError::NoContent(source.to_string()));
        }
        Ok(WebContent {
            source: source.to_string(),
            title: None,
            text,
        })
    }
}

/// Fetch and extract content from a URL
pub async fn fetch_content(url: &str) -> Result<WebContent, ScraperError> {
    let client = create_client()?;

    info!(url, "fetching page");
    let response = client.get(url).send().await?.error_for_status()?;
    let html = response.text().await?;

    parse_page(url, &html)
}

/// Extract title and text from an HTML document
pub fn parse_page(source: &str, html: &str) -> Result<WebContent, ScraperError> {
    let document = Html::parse_document(html);

    let title = extract_title(&document);
    let text = extract_text(&document);
    debug!(source, chars = text.len(), "extracted page text");

    if text.trim().is_empty() {
        return Err(ScraperError::NoContent(source.to_string()));
    }

    Ok(WebContent {
        source: source.to_string(),
        title,
        text,
    })
}

/// Extract the page title from <title> or <h1>
fn extract_title(document: &Html) -> Option<String> {
    ["title", "h1"].into_iter().find_map(|tag| {
        let selector = Selector::parse(tag).ok()?;
        let element = document.select(&selector).next()?;
        let title: String = element.text().collect();
        let title = title.trim();
        (!title.is_empty()).then(|| title.to_string())
    })
}

/// Text of all paragraphs and headings in `main`, or in `body` when the page
/// has no `main` element
pub fn extract_text(document: &Html) -> String {
    let region = ["main", "body"]
        .into_iter()
        .filter_map(|tag| Selector::parse(tag).ok())
        .find_map(|selector| document.select(&selector).next());

    match region {
        Some(element) => collect_content(element),
        None => String::new(),
    }
}

fn collect_content(region: ElementRef<'_>) -> String {
    let Ok(content_selector) = Selector::parse(CONTENT_ELEMENTS) else {
        return String::new();
    };

    let mut text = String::new();
    for element in region.select(&content_selector) {
        let raw: String = element.text().collect();
        let collapsed = collapse_whitespace(&raw);
        if collapsed.is_empty() {
            continue;
        }
        text.push_str(&collapsed);
        text.push(' ');
    }
    text
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const PAGE: &str = r#"<html><head><title> Sample Page </title></head>
        <body>
          <nav><p>Navigation.</p></nav>
          <main>
            <h1>Heading</h1>
            <p>First paragraph. With <b>bold</b> text.</p>
            <div>Ignored div text.</div>
            <p>Second paragraph!</p>
          </main>
        </body></html>"#;

    #[test]
    fn extracts_from_main_only() {
        let content = parse_page("test", PAGE).unwrap();
        assert_eq!(
            content.text,
            "Heading First paragraph. With bold text. Second paragraph! "
        );
        assert_eq!(content.title.as_deref(), Some("Sample Page"));
    }

    #[test]
    fn falls_back_to_body() {
        let html = "<html><body><h2>Title</h2><p>Body text.</p></body></html>";
        let content = parse_page("test", html).unwrap();
        assert_eq!(content.text, "Title Body text. ");
        assert_eq!(content.title, None);
    }

    #[test]
    fn indented_markup_collapses_to_single_spaces() {
        let html = "<html><body><main>\n    <p>\n        One two three.\n        Four five six.\n    </p>\n    <p>   </p>\n    <h2>\n  Next\n  </h2>\n</main></body></html>";
        let content = parse_page("test", html).unwrap();
        assert_eq!(content.text, "One two three. Four five six. Next ");

        let sentences = crate::summary::segment(&content.text);
        assert_eq!(sentences, vec!["One two three.", " Four five six."]);
        assert_eq!(crate::summary::word_count(sentences[0]), 3);
    }

    #[test]
    fn title_falls_back_to_h1() {
        let html = "<html><body><h1>Big Title</h1><p>x.</p></body></html>";
        let content = parse_page("test", html).unwrap();
        assert_eq!(content.title.as_deref(), Some("Big Title"));
    }

    #[test]
    fn empty_page_has_no_content() {
        let err = parse_page("empty", "<html><body><div>nothing</div></body></html>");
        assert!(matches!(err, Err(ScraperError::NoContent(_))));
    }

    #[tokio::test]
    async fn load_reads_plain_text_and_html_files() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("notes.txt");
        std::fs::write(&txt, "Plain text.\n  No markup.\n").unwrap();
        let html = dir.path().join("page.html");
        std::fs::write(&html, PAGE).unwrap();

        let plain = load(txt.to_str().unwrap()).await.unwrap();
        assert_eq!(plain.text, "Plain text. No markup.");

        let page = load(html.to_str().unwrap()).await.unwrap();
        assert!(page.text.starts_with("Heading "));
    }

    #[tokio::test]
    async fn load_missing_file_fails() {
        let err = load("/definitely/not/here.txt").await;
        assert!(matches!(err, Err(ScraperError::ReadError { .. })));
    }

    #[tokio::test]
    async fn fetch_content_extracts_page() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/article"))
            .respond_with(ResponseTemplate::new(200).set_body_string(PAGE))
            .mount(&server)
            .await;

        let content = fetch_content(&format!("{}/article", server.uri()))
            .await
            .unwrap();
        assert!(content.text.contains("Second paragraph!"));
    }

    #[tokio::test]
    async fn fetch_content_rejects_error_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(404))
            .mount(&server)
            .await;

        let err = fetch_content(&server.uri()).await;
        assert!(matches!(err, Err(ScraperError::FetchError(_))));
    }
}
