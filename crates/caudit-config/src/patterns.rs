//! URL filter and webmaster file pattern compilation.
//!
//! Compiles the regexes from `[site]` into a filter deciding which sitemap URLs are audited,
//! and the globs from `[webmaster]` into matchers recognizing export files by name.

use std::path::Path;

use caudit_analysis::ContentType;
use globset::{GlobBuilder, GlobMatcher};
use regex::Regex;

use crate::{ConfigError, SiteSettings, WebmasterSettings};

/// Compiled sitemap URL filter.
///
/// A URL is selected when its content type is one of the configured types, it matches at
/// least one include regex (or none are configured), and it matches no exclude regex.
#[derive(Debug, Clone)]
pub struct UrlFilter {
    /// Regexes of which at least one must match.
    include: Vec<Regex>,
    /// Regexes of which none may match.
    exclude: Vec<Regex>,
    /// Content types to audit; empty means all.
    content_types: Vec<ContentType>,
}

impl UrlFilter {
    /// Compiles the filter from site settings.
    pub fn compile(site: &SiteSettings) -> Result<Self, ConfigError> {
        Ok(Self {
            include: compile_regexes(&site.include)?,
            exclude: compile_regexes(&site.exclude)?,
            content_types: site.content_types(),
        })
    }

    /// A filter that selects every URL of every content type.
    pub fn allow_all() -> Self {
        Self {
            include: Vec::new(),
            exclude: Vec::new(),
            content_types: Vec::new(),
        }
    }

    /// Checks the include and exclude regexes.
    pub fn matches_url(&self, url: &str) -> bool {
        let included = self.include.is_empty() || self.include.iter().any(|r| r.is_match(url));
        included && !self.exclude.iter().any(|r| r.is_match(url))
    }

    /// Checks whether a content type is audited.
    pub fn allows_type(&self, content_type: ContentType) -> bool {
        self.content_types.is_empty() || self.content_types.contains(&content_type)
    }

    /// Checks both the URL and its content type.
    pub fn selects(&self, url: &str, content_type: ContentType) -> bool {
        self.allows_type(content_type) && self.matches_url(url)
    }

    /// Content types to audit; empty means all.
    pub fn content_types(&self) -> &[ContentType] {
        &self.content_types
    }
}

/// Compiles a list of regexes, reporting the first invalid one.
fn compile_regexes(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns
        .iter()
        .map(|pattern| {
            Regex::new(pattern).map_err(|source| ConfigError::InvalidUrlPattern {
                pattern: pattern.clone(),
                source,
            })
        })
        .collect()
}

/// Compiled matchers for webmaster export file names.
#[derive(Debug, Clone)]
pub struct WebmasterPatterns {
    /// Matches Yandex Webmaster CSV exports.
    yandex: GlobMatcher,
    /// Matches Google Search Console ZIP exports.
    gsc: GlobMatcher,
}

impl WebmasterPatterns {
    /// Compiles the patterns, substituting `domain` into the Yandex glob.
    pub fn compile(settings: &WebmasterSettings, domain: &str) -> Result<Self, ConfigError> {
        Ok(Self {
            yandex: compile_glob(&settings.yandex_glob(domain))?,
            gsc: compile_glob(&settings.gsc_pattern)?,
        })
    }

    /// True when the file name looks like a Yandex export.
    pub fn is_yandex(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.yandex.is_match(name))
    }

    /// True when the file name looks like a GSC export.
    pub fn is_gsc(&self, path: &Path) -> bool {
        path.file_name().is_some_and(|name| self.gsc.is_match(name))
    }
}

/// Compiles a single case-insensitive glob.
fn compile_glob(pattern: &str) -> Result<GlobMatcher, ConfigError> {
    GlobBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .map(|glob| glob.compile_matcher())
        .map_err(|source| ConfigError::InvalidFilePattern {
            pattern: pattern.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site(include: &[&str], exclude: &[&str], types: &[&str]) -> SiteSettings {
        SiteSettings {
            domain: "shop.example".into(),
            include: include.iter().map(|s| (*s).to_string()).collect(),
            exclude: exclude.iter().map(|s| (*s).to_string()).collect(),
            content_types: types.iter().map(|s| (*s).to_string()).collect(),
            ..SiteSettings::default()
        }
    }

    #[test]
    fn default_filter_selects_blogs_and_collections() {
        let filter = UrlFilter::compile(&SiteSettings::default()).unwrap();
        assert!(filter.selects("https://shop.example/blogs/blog/a", ContentType::Blog));
        assert!(filter.selects(
            "https://shop.example/collection/loafers",
            ContentType::Collection
        ));
        assert!(!filter.selects("https://shop.example/product/x", ContentType::Product));
    }

    #[test]
    fn include_and_exclude_regexes() {
        let filter = UrlFilter::compile(&site(&["/blogs/"], &["/tagged/", r"\?page="], &["blog"]))
            .unwrap();
        assert!(filter.matches_url("https://shop.example/blogs/blog/lofery"));
        assert!(!filter.matches_url("https://shop.example/blogs/blog/tagged/sale"));
        assert!(!filter.matches_url("https://shop.example/blogs/blog?page=2"));
        assert!(!filter.matches_url("https://shop.example/pages/about"));
    }

    #[test]
    fn invalid_regex_is_reported() {
        let err = UrlFilter::compile(&site(&["("], &[], &[])).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrlPattern { .. }));
        assert!(err.to_string().contains("'('"));
    }

    #[test]
    fn allow_all_selects_everything() {
        let filter = UrlFilter::allow_all();
        assert!(filter.selects("https://shop.example/", ContentType::Other));
        assert!(filter.content_types().is_empty());
    }

    #[test]
    fn webmaster_patterns_match_file_names() {
        let patterns =
            WebmasterPatterns::compile(&WebmasterSettings::default(), "shop.example").unwrap();

        assert!(patterns.is_yandex(Path::new("/data/shop.example_2024-06-01.csv")));
        assert!(!patterns.is_yandex(Path::new("/data/other.example_2024-06-01.csv")));
        assert!(patterns.is_gsc(Path::new(
            "/data/shop.example-Performance-on-Search-2024-06-01.zip"
        )));
        assert!(patterns.is_gsc(Path::new("/data/PERFORMANCE.ZIP")));
        assert!(!patterns.is_gsc(Path::new("/data/shop.example_2024.csv")));
    }
}
