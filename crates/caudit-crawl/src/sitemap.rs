//! Sitemap parsing and URL selection.
//!
//! Reads `<urlset>` documents (`<url><loc/><lastmod/></url>`) and `<sitemapindex>` documents
//! (`<sitemap><loc/></sitemap>`). Only elements in the sitemap namespace, or in no namespace,
//! are read, and `<loc>`/`<lastmod>` count only as direct children of their entry. Extension
//! elements such as `<image:loc>` are skipped.

use std::collections::{BTreeMap, HashSet, VecDeque};

use caudit_analysis::ContentType;
use caudit_config::UrlFilter;
use quick_xml::{
    NsReader,
    events::Event,
    name::{Namespace, QName, ResolveResult},
};
use serde_json::{Map, Value, json};
use tracing::{info, warn};

use crate::{CrawlError, Fetcher};

/// Upper bound on nested sitemaps fetched from one index.
const MAX_CHILD_SITEMAPS: usize = 100;

/// Namespace prefixes of the sitemap protocol, current and legacy.
const SITEMAP_NAMESPACES: [&[u8]; 2] = [
    b"http://www.sitemaps.org/schemas/sitemap/",
    b"http://www.google.com/schemas/sitemap/",
];

/// One `<url>` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SitemapEntry {
    /// Page URL from `<loc>`, trimmed.
    pub url: String,
    /// `<lastmod>` value, trimmed, verbatim.
    pub lastmod: Option<String>,
    /// Classification derived from the URL.
    pub content_type: ContentType,
}

impl SitemapEntry {
    /// Creates an entry, classifying the URL.
    pub fn new(url: impl Into<String>, lastmod: Option<String>) -> Self {
        let url = url.into();
        Self {
            content_type: ContentType::from_url(&url),
            url,
            lastmod,
        }
    }
}

/// A parsed sitemap document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapDocument {
    /// Page entries (from a `<urlset>`).
    pub entries: Vec<SitemapEntry>,
    /// Child sitemap URLs (from a `<sitemapindex>`).
    pub sitemaps: Vec<String>,
}

/// Element whose text is being collected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Field {
    /// `<loc>`.
    Loc,
    /// `<lastmod>`.
    Lastmod,
}

/// Container element currently open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Container {
    /// `<url>`.
    Url,
    /// `<sitemap>`.
    Sitemap,
}

/// Whether `name` resolves to the sitemap namespace or to no namespace at all.
fn is_sitemap_element<R>(reader: &NsReader<R>, name: QName<'_>) -> bool {
    match reader.resolve_element(name).0 {
        ResolveResult::Unbound => true,
        ResolveResult::Bound(Namespace(ns)) => {
            SITEMAP_NAMESPACES.iter().any(|prefix| ns.starts_with(prefix))
        }
        ResolveResult::Unknown(_) => false,
    }
}

/// Parses a sitemap or sitemap index.
///
/// Entries without a non-empty `<loc>` are skipped.
pub fn parse_sitemap(xml: &str) -> Result<SitemapDocument, CrawlError> {
    let mut reader = NsReader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut document = SitemapDocument::default();
    // Open element depth, and the depth at which the current container and field opened.
    let mut depth = 0usize;
    let mut container: Option<(Container, usize)> = None;
    let mut field: Option<(Field, usize)> = None;
    let mut loc = String::new();
    let mut lastmod = String::new();

    loop {
        let event = reader.read_event().map_err(|source| CrawlError::Xml {
            position: reader.error_position(),
            source,
        })?;

        match event {
            Event::Start(ref e) => {
                depth += 1;
                if !is_sitemap_element(&reader, e.name()) {
                    continue;
                }
                match (e.local_name().as_ref(), container) {
                    (b"url", None) => {
                        container = Some((Container::Url, depth));
                        loc.clear();
                        lastmod.clear();
                    }
                    (b"sitemap", None) => {
                        container = Some((Container::Sitemap, depth));
                        loc.clear();
                        lastmod.clear();
                    }
                    (b"loc", Some((_, level))) if depth == level + 1 => {
                        field = Some((Field::Loc, depth));
                    }
                    (b"lastmod", Some((_, level))) if depth == level + 1 => {
                        field = Some((Field::Lastmod, depth));
                    }
                    _ => {}
                }
            }
            Event::Text(ref e) => {
                if let Some((target, _)) = field.filter(|&(_, level)| level == depth) {
                    let text = e.unescape().map_err(|source| CrawlError::Xml {
                        position: reader.error_position(),
                        source,
                    })?;
                    push_field(target, &text, &mut loc, &mut lastmod);
                }
            }
            Event::CData(ref e) => {
                if let Some((target, _)) = field.filter(|&(_, level)| level == depth) {
                    push_field(target, &String::from_utf8_lossy(e), &mut loc, &mut lastmod);
                }
            }
            Event::End(_) => {
                if field.is_some_and(|(_, level)| level == depth) {
                    field = None;
                }
                if let Some((kind, _)) = container.filter(|&(_, level)| level == depth) {
                    container = None;
                    let url = loc.trim();
                    match kind {
                        Container::Url if !url.is_empty() => {
                            let modified = Some(lastmod.trim())
                                .filter(|l| !l.is_empty())
                                .map(str::to_string);
                            document.entries.push(SitemapEntry::new(url, modified));
                        }
                        Container::Sitemap if !url.is_empty() => {
                            document.sitemaps.push(url.to_string());
                        }
                        _ => {}
                    }
                }
                depth = depth.saturating_sub(1);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(document)
}

/// Appends element text to the buffer for `field`.
fn push_field(field: Field, text: &str, loc: &mut String, lastmod: &mut String) {
    match field {
        Field::Loc => loc.push_str(text),
        Field::Lastmod => lastmod.push_str(text),
    }
}

/// Fetches a sitemap and every sitemap its index references.
///
/// A failing child sitemap is logged and skipped; a failing root sitemap is an error. URLs
/// listed more than once are kept at their first position.
pub fn fetch_sitemap(fetcher: &dyn Fetcher, url: &str) -> Result<Vec<SitemapEntry>, CrawlError> {
    info!(url, "fetching sitemap");
    let root = parse_sitemap(&fetcher.fetch(url)?)?;

    let mut entries = root.entries;
    let mut visited: HashSet<String> = HashSet::from([url.to_string()]);
    let mut queue: VecDeque<String> = root.sitemaps.into();
    let mut children = 0usize;

    while let Some(child) = queue.pop_front() {
        if !visited.insert(child.clone()) {
            continue;
        }
        if children == MAX_CHILD_SITEMAPS {
            warn!(url = %child, "too many nested sitemaps, ignoring the rest");
            break;
        }
        children += 1;
        match fetcher.fetch(&child).and_then(|xml| parse_sitemap(&xml)) {
            Ok(document) => {
                info!(url = %child, entries = document.entries.len(), "fetched nested sitemap");
                entries.extend(document.entries);
                queue.extend(document.sitemaps);
            }
            Err(err) => warn!(url = %child, error = %err, "skipping nested sitemap"),
        }
    }

    let mut seen = HashSet::new();
    entries.retain(|entry| seen.insert(entry.url.clone()));
    Ok(entries)
}

/// Entries the filter selects, in sitemap order.
pub fn select_entries(entries: &[SitemapEntry], filter: &UrlFilter) -> Vec<SitemapEntry> {
    entries
        .iter()
        .filter(|entry| filter.selects(&entry.url, entry.content_type))
        .cloned()
        .collect()
}

/// Counts over a parsed sitemap.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SitemapStats {
    /// Number of URLs in the sitemap.
    pub total: usize,
    /// URL count per content type.
    pub by_type: BTreeMap<ContentType, usize>,
    /// URLs the configured filter selects.
    pub selected: usize,
}

impl SitemapStats {
    /// Computes statistics for `entries` under `filter`.
    pub fn compute(entries: &[SitemapEntry], filter: &UrlFilter) -> Self {
        let mut by_type = BTreeMap::new();
        let mut selected = 0;
        for entry in entries {
            *by_type.entry(entry.content_type).or_insert(0) += 1;
            if filter.selects(&entry.url, entry.content_type) {
                selected += 1;
            }
        }
        Self {
            total: entries.len(),
            by_type,
            selected,
        }
    }

    /// JSON form used by `caudit sitemap --json`.
    pub fn to_json(&self) -> Value {
        let by_type: Map<String, Value> = self
            .by_type
            .iter()
            .map(|(content_type, count)| (content_type.to_string(), json!(count)))
            .collect();
        json!({
            "total": self.total,
            "by_type": by_type,
            "selected": self.selected,
        })
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::RefCell, collections::HashMap};

    use super::*;

    const URLSET: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <url>
    <loc> https://shop.example/blogs/blog/lofery </loc>
    <lastmod>2024-05-01T10:00:00+03:00</lastmod>
  </url>
  <url>
    <loc>https://shop.example/collection/loafers</loc>
  </url>
  <url>
    <loc>https://shop.example/product/premiata-1?a=1&amp;b=2</loc>
    <lastmod></lastmod>
  </url>
  <url>
    <loc></loc>
  </url>
  <url>
    <loc>https://shop.example/page/about</loc>
  </url>
</urlset>
"#;

    /// Fetcher serving canned documents.
    struct FixtureFetcher {
        pages: HashMap<String, String>,
        requests: RefCell<Vec<String>>,
    }

    impl FixtureFetcher {
        fn new(pages: &[(&str, &str)]) -> Self {
            Self {
                pages: pages
                    .iter()
                    .map(|(url, body)| ((*url).to_string(), (*body).to_string()))
                    .collect(),
                requests: RefCell::new(Vec::new()),
            }
        }
    }

    impl Fetcher for FixtureFetcher {
        fn fetch(&self, url: &str) -> Result<String, CrawlError> {
            self.requests.borrow_mut().push(url.to_string());
            self.pages.get(url).cloned().ok_or_else(|| CrawlError::Status {
                url: url.to_string(),
                status: 404,
            })
        }
    }

    #[test]
    fn parses_urlset() {
        let document = parse_sitemap(URLSET).unwrap();
        assert!(document.sitemaps.is_empty());
        assert_eq!(document.entries.len(), 4);

        let first = &document.entries[0];
        assert_eq!(first.url, "https://shop.example/blogs/blog/lofery");
        assert_eq!(first.lastmod.as_deref(), Some("2024-05-01T10:00:00+03:00"));
        assert_eq!(first.content_type, ContentType::Blog);

        assert_eq!(document.entries[1].content_type, ContentType::Collection);
        assert!(document.entries[1].lastmod.is_none());
        assert_eq!(
            document.entries[2].url,
            "https://shop.example/product/premiata-1?a=1&b=2"
        );
        assert!(document.entries[2].lastmod.is_none());
        assert_eq!(document.entries[3].content_type, ContentType::Other);
    }

    #[test]
    fn parses_without_namespace() {
        let xml = "<urlset><url><loc>https://a.example/blog/x</loc></url></urlset>";
        let document = parse_sitemap(xml).unwrap();
        assert_eq!(document.entries.len(), 1);
    }

    #[test]
    fn parses_prefixed_namespace() {
        let xml = r#"<sm:urlset xmlns:sm="http://www.sitemaps.org/schemas/sitemap/0.9">
<sm:url><sm:loc>https://a.example/blog/x</sm:loc></sm:url></sm:urlset>"#;
        let document = parse_sitemap(xml).unwrap();
        assert_eq!(document.entries[0].url, "https://a.example/blog/x");
    }

    #[test]
    fn parses_sitemap_index() {
        let xml = r#"<sitemapindex xmlns="http://www.sitemaps.org/schemas/sitemap/0.9">
  <sitemap><loc>https://shop.example/sitemap-blogs.xml</loc><lastmod>2024-01-01</lastmod></sitemap>
  <sitemap><loc>https://shop.example/sitemap-products.xml</loc></sitemap>
</sitemapindex>"#;
        let document = parse_sitemap(xml).unwrap();
        assert!(document.entries.is_empty());
        assert_eq!(
            document.sitemaps,
            [
                "https://shop.example/sitemap-blogs.xml",
                "https://shop.example/sitemap-products.xml"
            ]
        );
    }

    #[test]
    fn image_extension_does_not_replace_page_url() {
        let xml = r#"<?xml version="1.0" encoding="UTF-8"?>
<urlset xmlns="http://www.sitemaps.org/schemas/sitemap/0.9"
        xmlns:image="http://www.google.com/schemas/sitemap-image/1.1">
  <url>
    <loc>https://shop.example/products/lofery</loc>
    <lastmod>2024-05-01</lastmod>
    <image:image>
      <image:loc>https://cdn.shop.example/files/lofery.jpg</image:loc>
      <image:title>Лоферы</image:title>
    </image:image>
  </url>
  <url>
    <image:image><image:loc>https://cdn.shop.example/files/kedy.jpg</image:loc></image:image>
    <loc>https://shop.example/products/kedy</loc>
  </url>
</urlset>"#;
        let document = parse_sitemap(xml).unwrap();
        let urls: Vec<&str> = document.entries.iter().map(|e| e.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://shop.example/products/lofery",
                "https://shop.example/products/kedy"
            ]
        );
        assert_eq!(document.entries[0].lastmod.as_deref(), Some("2024-05-01"));
    }

    #[test]
    fn nested_loc_without_namespace_is_ignored() {
        let xml = "<urlset><url><loc>https://a.example/blog/x</loc>\
                   <video><loc>https://a.example/video.mp4</loc></video></url></urlset>";
        let document = parse_sitemap(xml).unwrap();
        assert_eq!(document.entries.len(), 1);
        assert_eq!(document.entries[0].url, "https://a.example/blog/x");
    }

    #[test]
    fn undeclared_prefix_is_skipped() {
        let xml = "<urlset><url><loc>https://a.example/blog/x</loc>\
                   <news:loc>https://a.example/news</news:loc></url></urlset>";
        let document = parse_sitemap(xml).unwrap();
        assert_eq!(document.entries[0].url, "https://a.example/blog/x");
    }

    #[test]
    fn malformed_xml_is_an_error() {
        let err = parse_sitemap("<urlset><url><loc>x</url></urlset>").unwrap_err();
        assert!(matches!(err, CrawlError::Xml { .. }));
    }

    #[test]
    fn fetch_follows_index_and_skips_broken_children() {
        let fetcher = FixtureFetcher::new(&[
            (
                "https://shop.example/sitemap.xml",
                "<sitemapindex><sitemap><loc>https://shop.example/a.xml</loc></sitemap>\
                 <sitemap><loc>https://shop.example/missing.xml</loc></sitemap>\
                 <sitemap><loc>https://shop.example/a.xml</loc></sitemap></sitemapindex>",
            ),
            (
                "https://shop.example/a.xml",
                "<urlset><url><loc>https://shop.example/blogs/blog/a</loc></url>\
                 <url><loc>https://shop.example/blogs/blog/a</loc></url></urlset>",
            ),
        ]);

        let entries = fetch_sitemap(&fetcher, "https://shop.example/sitemap.xml").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].url, "https://shop.example/blogs/blog/a");
        assert_eq!(fetcher.requests.borrow().len(), 3);
    }

    #[test]
    fn fetch_stops_after_child_limit() {
        let children: Vec<String> = (0..=MAX_CHILD_SITEMAPS)
            .map(|i| format!("https://shop.example/sitemap-{i}.xml"))
            .collect();
        let index: String = children
            .iter()
            .map(|url| format!("<sitemap><loc>{url}</loc></sitemap>"))
            .collect();
        let index = format!("<sitemapindex>{index}</sitemapindex>");
        let bodies: Vec<String> = (0..=MAX_CHILD_SITEMAPS)
            .map(|i| {
                format!("<urlset><url><loc>https://shop.example/blogs/blog/{i}</loc></url></urlset>")
            })
            .collect();

        let mut pages: Vec<(&str, &str)> = vec![("https://shop.example/sitemap.xml", index.as_str())];
        pages.extend(
            children
                .iter()
                .zip(&bodies)
                .map(|(url, body)| (url.as_str(), body.as_str())),
        );
        let fetcher = FixtureFetcher::new(&pages);

        let entries = fetch_sitemap(&fetcher, "https://shop.example/sitemap.xml").unwrap();
        assert_eq!(entries.len(), MAX_CHILD_SITEMAPS);
        assert_eq!(fetcher.requests.borrow().len(), MAX_CHILD_SITEMAPS + 1);
        assert_eq!(
            entries.last().map(|e| e.url.as_str()),
            Some("https://shop.example/blogs/blog/99")
        );
    }

    #[test]
    fn fetch_fails_when_root_is_missing() {
        let fetcher = FixtureFetcher::new(&[]);
        let err = fetch_sitemap(&fetcher, "https://shop.example/sitemap.xml").unwrap_err();
        assert!(matches!(err, CrawlError::Status { status: 404, .. }));
    }

    #[test]
    fn stats_and_selection() {
        let entries = parse_sitemap(URLSET).unwrap().entries;
        let filter = UrlFilter::compile(&caudit_config::SiteSettings::default()).unwrap();

        let stats = SitemapStats::compute(&entries, &filter);
        assert_eq!(stats.total, 4);
        assert_eq!(stats.by_type[&ContentType::Blog], 1);
        assert_eq!(stats.by_type[&ContentType::Other], 1);
        assert_eq!(stats.selected, 2);

        let selected = select_entries(&entries, &filter);
        assert_eq!(selected.len(), 2);
        assert_eq!(selected[1].content_type, ContentType::Collection);

        let json = stats.to_json();
        assert_eq!(json["total"], 4);
        assert_eq!(json["by_type"]["blog"], 1);

        let all = select_entries(&entries, &UrlFilter::allow_all());
        assert_eq!(all.len(), 4);
    }
}
