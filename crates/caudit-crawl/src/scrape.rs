//! HTML page scraping.
//!
//! Pulls the SEO-relevant fields out of a page: `<title>`, the first `<h1>`, the meta
//! description and the text of the main content area. Failures never propagate; they are
//! recorded in [`PageData::error`].

use scraper::{ElementRef, Html, Selector};
use tracing::warn;

use crate::{CrawlError, Fetcher};

/// Content areas tried in order; the first with enough text wins.
const CONTENT_SELECTORS: &[&str] = &[
    ".article-content",
    ".static-text",
    ".article_content",
    ".article_page",
    ".article-page",
    "#article",
    ".blog-article",
    ".blog_article",
    "article",
    ".blog-content",
    ".post-content",
    ".entry-content",
    ".product-description",
    ".collection-description",
    ".description",
    "main",
    ".main-content",
    "#content",
    ".content",
    "#main",
];

/// Elements whose text never counts as content.
const EXCLUDED_TAGS: &[&str] = &[
    "script", "style", "button", "form", "input", "noscript", "iframe",
];

/// A content area must hold more than this many characters of text.
const MIN_CONTENT_CHARS: usize = 100;

/// Fields scraped from one page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageData {
    /// Requested URL.
    pub url: String,
    /// Text of `<title>`.
    pub title: Option<String>,
    /// Text of the first `<h1>`.
    pub h1: Option<String>,
    /// Trimmed `content` of `<meta name="description">`.
    pub meta_description: Option<String>,
    /// Whitespace-separated tokens in the main content.
    pub word_count: usize,
    /// Main content text with whitespace collapsed.
    pub content_text: String,
    /// Fetch error, when the page could not be retrieved.
    pub error: Option<String>,
}

impl PageData {
    /// True when the page was fetched and has content text.
    pub fn has_content(&self) -> bool {
        self.error.is_none() && !self.content_text.is_empty()
    }
}

/// Compiled selectors for page extraction.
#[derive(Debug, Clone)]
pub struct PageScraper {
    /// `title`.
    title: Selector,
    /// `h1`.
    h1: Selector,
    /// `meta[name="description"]`.
    meta_description: Selector,
    /// Candidate content areas in priority order.
    content: Vec<Selector>,
}

impl PageScraper {
    /// Compiles the built-in selectors.
    pub fn new() -> Result<Self, CrawlError> {
        Ok(Self {
            title: selector("title")?,
            h1: selector("h1")?,
            meta_description: selector(r#"meta[name="description"]"#)?,
            content: CONTENT_SELECTORS
                .iter()
                .map(|css| selector(css))
                .collect::<Result<_, _>>()?,
        })
    }

    /// Fetches and parses `url`; a fetch failure is recorded on the result.
    pub fn scrape(&self, fetcher: &dyn Fetcher, url: &str) -> PageData {
        match fetcher.fetch(url) {
            Ok(html) => self.parse(url, &html),
            Err(err) => {
                warn!(url, error = %err, "failed to fetch page");
                PageData {
                    url: url.to_string(),
                    error: Some(err.to_string()),
                    ..PageData::default()
                }
            }
        }
    }

    /// Extracts page fields from an HTML document.
    pub fn parse(&self, url: &str, html: &str) -> PageData {
        let document = Html::parse_document(html);

        let title = document
            .select(&self.title)
            .next()
            .and_then(|el| non_empty(&el.text().collect::<String>()));
        let h1 = document
            .select(&self.h1)
            .next()
            .and_then(|el| non_empty(&joined_text(el)));
        let meta_description = document
            .select(&self.meta_description)
            .next()
            .and_then(|el| el.value().attr("content"))
            .and_then(non_empty);

        let content_text = self.main_content(&document).unwrap_or_default();
        let word_count = content_text.split_whitespace().count();

        PageData {
            url: url.to_string(),
            title,
            h1,
            meta_description,
            word_count,
            content_text,
            error: None,
        }
    }

    /// Text of the first content area holding more than [`MIN_CONTENT_CHARS`] characters.
    fn main_content(&self, document: &Html) -> Option<String> {
        self.content.iter().find_map(|selector| {
            let element = document.select(selector).next()?;
            let text = content_text(element);
            (text.chars().count() > MIN_CONTENT_CHARS).then_some(text)
        })
    }
}

/// Parses a CSS selector.
fn selector(css: &str) -> Result<Selector, CrawlError> {
    Selector::parse(css).map_err(|err| CrawlError::Selector {
        selector: css.to_string(),
        message: err.to_string(),
    })
}

/// Trimmed value, or `None` when blank.
fn non_empty(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

/// Text fragments of an element joined by single spaces.
fn joined_text(element: ElementRef<'_>) -> String {
    element
        .text()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Content text, skipping fragments inside [`EXCLUDED_TAGS`], whitespace collapsed.
fn content_text(element: ElementRef<'_>) -> String {
    let mut words: Vec<&str> = Vec::new();
    for node in element.descendants() {
        let Some(text) = node.value().as_text() else {
            continue;
        };
        let excluded = node
            .ancestors()
            .take_while(|ancestor| ancestor.id() != element.id())
            .filter_map(|ancestor| ancestor.value().as_element())
            .any(|el| EXCLUDED_TAGS.contains(&el.name()));
        if !excluded {
            words.extend(text.split_whitespace());
        }
    }
    words.join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filler(words: usize) -> String {
        vec!["лоферы"; words].join(" ")
    }

    /// Fetcher that always fails.
    struct Offline;

    impl Fetcher for Offline {
        fn fetch(&self, url: &str) -> Result<String, CrawlError> {
            Err(CrawlError::Status {
                url: url.to_string(),
                status: 503,
            })
        }
    }

    #[test]
    fn extracts_head_fields() {
        let html = format!(
            r#"<html><head>
<title>  Лоферы женские | Shop </title>
<meta name="description" content="  Всё о лоферах.  ">
</head><body>
<h1>Женские <em>лоферы</em></h1>
<h1>Second</h1>
<div class="article-content"><p>{}</p></div>
</body></html>"#,
            filler(30)
        );

        let page = PageScraper::new().unwrap().parse("https://shop.example/blogs/blog/a", &html);
        assert_eq!(page.title.as_deref(), Some("Лоферы женские | Shop"));
        assert_eq!(page.h1.as_deref(), Some("Женские лоферы"));
        assert_eq!(page.meta_description.as_deref(), Some("Всё о лоферах."));
        assert_eq!(page.word_count, 30);
        assert!(page.has_content());
        assert!(page.error.is_none());
    }

    #[test]
    fn missing_fields_are_none() {
        let page = PageScraper::new().unwrap().parse(
            "https://shop.example/x",
            r#"<html><head><meta name="description" content="   "></head><body></body></html>"#,
        );
        assert!(page.title.is_none());
        assert!(page.h1.is_none());
        assert!(page.meta_description.is_none());
        assert_eq!(page.word_count, 0);
        assert!(!page.has_content());
    }

    #[test]
    fn short_content_areas_are_skipped() {
        let html = format!(
            r#"<body>
<div class="article-content">Меню</div>
<main><p>{}</p></main>
</body>"#,
            filler(25)
        );
        let page = PageScraper::new().unwrap().parse("https://shop.example/x", &html);
        assert_eq!(page.word_count, 25);
        assert!(!page.content_text.contains("Меню"));
    }

    #[test]
    fn excluded_tags_do_not_count() {
        let html = format!(
            r#"<body><article>
<script>var tracking = "лоферы лоферы";</script>
<style>.a {{ color: red; }}</style>
<p>{}</p>
<form><button>Купить</button><input value="x"></form>
<noscript>Включите JavaScript</noscript>
</article></body>"#,
            filler(20)
        );
        let page = PageScraper::new().unwrap().parse("https://shop.example/x", &html);
        assert_eq!(page.word_count, 20);
        assert!(!page.content_text.contains("Купить"));
        assert!(!page.content_text.contains("tracking"));
        assert!(!page.content_text.contains("JavaScript"));
    }

    #[test]
    fn whitespace_is_collapsed() {
        let html = format!(
            "<body><main>\n  <p>Первый\n\n абзац</p>\t<p>{}</p>\n</main></body>",
            filler(20)
        );
        let page = PageScraper::new().unwrap().parse("https://shop.example/x", &html);
        assert!(page.content_text.starts_with("Первый абзац лоферы"));
    }

    #[test]
    fn fetch_failure_is_recorded() {
        let page = PageScraper::new().unwrap().scrape(&Offline, "https://shop.example/x");
        assert_eq!(page.url, "https://shop.example/x");
        assert!(page.error.as_deref().unwrap().contains("503"));
        assert_eq!(page.word_count, 0);
    }
}
