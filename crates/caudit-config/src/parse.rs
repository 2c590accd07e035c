//! Configuration file parsing.
//!
//! Parses individual `.caudit.toml` files into intermediate `RawConfig` structures
//! that preserve the optional nature of all fields before merging.

use std::{fs, path::Path};

use serde::Deserialize;
use serde_with::{OneOrMany, serde_as};
#[cfg(test)]
use toml::de::Error as TomlError;

use crate::{ConfigError, ReportFormat};

/// Raw configuration as parsed directly from a TOML file.
///
/// All fields are optional to support partial configs that will be merged.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawConfig {
    /// When true, stop discovery here - ignore parent and global configs.
    pub root: Option<bool>,
    /// Site and crawler settings.
    pub site: Option<RawSiteSettings>,
    /// Input and output locations.
    pub paths: Option<RawPathSettings>,
    /// Webmaster export file patterns.
    pub webmaster: Option<RawWebmasterSettings>,
    /// Analysis thresholds and normalizer settings.
    pub analysis: Option<RawAnalysisSettings>,
    /// Report output settings.
    pub report: Option<RawReportSettings>,
}

/// Raw site settings.
#[serde_as]
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawSiteSettings {
    /// Site domain without scheme.
    pub domain: Option<String>,
    /// Sitemap URL override.
    pub sitemap_url: Option<String>,
    /// User agent sent with every request.
    pub user_agent: Option<String>,
    /// Delay between page requests in milliseconds.
    pub request_delay_ms: Option<u64>,
    /// Request timeout in seconds.
    pub timeout_secs: Option<u64>,
    /// URL regexes a page must match (any).
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub include: Option<Vec<String>>,
    /// URL regexes that exclude a page (any).
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub exclude: Option<Vec<String>>,
    /// Content types to audit.
    #[serde_as(as = "Option<OneOrMany<_>>")]
    pub content_types: Option<Vec<String>>,
}

/// Raw path settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawPathSettings {
    /// Report output directory.
    pub output_dir: Option<String>,
    /// Directory holding webmaster exports.
    pub webmasters_dir: Option<String>,
    /// Page cache file.
    pub cache_file: Option<String>,
    /// Audit log file.
    pub log_file: Option<String>,
}

/// Raw webmaster settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawWebmasterSettings {
    /// Glob for Yandex Webmaster CSV exports.
    pub yandex_pattern: Option<String>,
    /// Glob for Google Search Console ZIP exports.
    pub gsc_pattern: Option<String>,
}

/// Raw analysis settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawAnalysisSettings {
    /// Minimum impressions for gaps and CTR candidates.
    pub min_impressions: Option<u64>,
    /// Maximum keyword gaps.
    pub max_gaps: Option<usize>,
    /// Maximum CTR candidates.
    pub max_ctr_candidates: Option<usize>,
    /// Maximum cannibalization groups.
    pub max_cannibalization_groups: Option<usize>,
    /// Minimum pages per cannibalization group.
    pub min_cannibalization_pages: Option<usize>,
    /// Morphological backend name.
    pub lemmatizer: Option<String>,
    /// Stemming language.
    pub stemmer: Option<String>,
    /// Lemma cache capacity.
    pub cache_capacity: Option<usize>,
    /// Keywords extracted per page.
    pub keywords_per_page: Option<usize>,
    /// Pages below this word count are reported as low content.
    pub min_word_count: Option<usize>,
}

/// Raw report settings.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RawReportSettings {
    /// Which data reports to write.
    pub format: Option<ReportFormat>,
    /// Whether to refresh the `*-latest` symlinks.
    pub latest_symlinks: Option<bool>,
}

/// Parses a configuration file from disk.
pub fn parse_config_file(path: &Path) -> Result<RawConfig, ConfigError> {
    let contents = fs::read_to_string(path).map_err(|source| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source,
    })?;

    parse_config_str(&contents, path)
}

/// Parses configuration from a TOML string.
///
/// The `path` parameter is used for error reporting.
pub fn parse_config_str(contents: &str, path: &Path) -> Result<RawConfig, ConfigError> {
    toml::from_str(contents).map_err(|source| ConfigError::ParseToml {
        path: path.to_path_buf(),
        source,
    })
}

/// Parses configuration from a TOML string without path context.
#[cfg(test)]
pub fn parse_config(contents: &str) -> Result<RawConfig, TomlError> {
    toml::from_str(contents)
}

/// Checks if a config file has `root = true` set.
///
/// Returns false if the file cannot be read or parsed.
pub fn is_root_config(path: &Path) -> bool {
    let Ok(contents) = fs::read_to_string(path) else {
        return false;
    };
    let Ok(config) = toml::from_str::<RawConfig>(&contents) else {
        return false;
    };
    config.root == Some(true)
}
