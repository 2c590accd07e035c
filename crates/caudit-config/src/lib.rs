//! Configuration system for caudit.
//!
//! caudit uses TOML configuration files named `.caudit.toml`. Configuration is resolved by
//! walking up the directory tree from the current working directory, collecting any
//! `.caudit.toml` files found, then loading `~/.caudit.toml` as the global config with lowest
//! precedence.

#![warn(missing_docs)]

mod discovery;
mod error;
mod merge;
mod parse;
mod patterns;
mod resolve;
mod templates;
#[cfg(test)]
mod test_support;
mod validate;

use std::{
    fmt,
    path::{Path, PathBuf},
    str,
};

use caudit_analysis::{AnalysisParams, ContentType, DEFAULT_CACHE_CAPACITY};
pub use discovery::{CONFIG_FILENAME, discover_config_files, global_config_path, is_global_config};
pub use error::ConfigError;
pub use merge::{ParsedConfig, merge_configs};
pub use parse::{
    RawAnalysisSettings, RawConfig, RawPathSettings, RawReportSettings, RawSiteSettings,
    RawWebmasterSettings, parse_config_file, parse_config_str,
};
pub use patterns::{UrlFilter, WebmasterPatterns};
pub use resolve::resolve_path;
use serde::{Deserialize, Serialize};
pub use templates::{global_template, local_template};
pub use validate::ConfigWarning;
use validate::validate_config;

/// Top-level merged configuration for caudit.
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Site and crawler settings.
    pub site: SiteSettings,
    /// Resolved input and output locations.
    pub paths: PathSettings,
    /// Webmaster export file patterns.
    pub webmaster: WebmasterSettings,
    /// Analysis thresholds and normalizer settings.
    pub analysis: AnalysisSettings,
    /// Report output settings.
    pub report: ReportSettings,
    /// Directory containing the most specific config file.
    pub config_root: Option<PathBuf>,
}

impl Config {
    /// Loads configuration by discovering and merging all relevant `.caudit.toml` files.
    ///
    /// Returns `Ok(Config::default())` if no configuration files are found.
    pub fn load(cwd: &Path) -> Result<Self, ConfigError> {
        let config_files = discover_config_files(cwd);
        Self::load_from_files(&config_files)
    }

    /// Loads configuration from a specific list of config file paths.
    ///
    /// Files should be provided in precedence order: highest precedence first.
    pub fn load_from_files(files: &[PathBuf]) -> Result<Self, ConfigError> {
        if files.is_empty() {
            return Ok(Self::default());
        }

        let parsed: Vec<ParsedConfig> = files
            .iter()
            .map(|path| {
                let config = parse_config_file(path)?;
                Ok(ParsedConfig {
                    path: path.clone(),
                    config,
                })
            })
            .collect::<Result<Vec<_>, ConfigError>>()?;

        merge_configs(&parsed)
    }

    /// Compiles the sitemap URL filter.
    pub fn url_filter(&self) -> Result<UrlFilter, ConfigError> {
        UrlFilter::compile(&self.site)
    }

    /// Compiles the webmaster export file matchers.
    pub fn webmaster_patterns(&self) -> Result<WebmasterPatterns, ConfigError> {
        WebmasterPatterns::compile(&self.webmaster, &self.site.domain)
    }

    /// Validates the configuration and returns any warnings.
    pub fn validate(&self) -> Vec<ConfigWarning> {
        validate_config(self)
    }

    /// Serializes the effective settings to TOML format.
    pub fn settings_to_toml(&self) -> Result<String, ConfigError> {
        let serializable = SerializableSettings {
            site: &self.site,
            paths: &self.paths,
            webmaster: &self.webmaster,
            analysis: &self.analysis,
            report: &self.report,
        };
        Ok(toml::to_string_pretty(&serializable)?)
    }
}

/// Site and crawler settings.
#[derive(Debug, Clone, Serialize)]
pub struct SiteSettings {
    /// Site domain without scheme (e.g. `shop.example`).
    pub domain: String,
    /// Explicit sitemap URL; derived from the domain when unset.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sitemap_url: Option<String>,
    /// User agent sent with every request.
    pub user_agent: String,
    /// Delay between page requests in milliseconds.
    pub request_delay_ms: u64,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// URL regexes a page must match (any); empty means all.
    pub include: Vec<String>,
    /// URL regexes that exclude a page (any).
    pub exclude: Vec<String>,
    /// Content types to audit; empty means all.
    pub content_types: Vec<String>,
}

impl Default for SiteSettings {
    fn default() -> Self {
        Self {
            domain: String::new(),
            sitemap_url: None,
            user_agent: String::from("Mozilla/5.0 (compatible; caudit/0.1)"),
            request_delay_ms: 500,
            timeout_secs: 30,
            include: Vec::new(),
            exclude: Vec::new(),
            content_types: vec![
                ContentType::Blog.to_string(),
                ContentType::Collection.to_string(),
            ],
        }
    }
}

impl SiteSettings {
    /// Site root URL, or `None` without a domain.
    pub fn base_url(&self) -> Option<String> {
        let domain = self.domain.trim().trim_end_matches('/');
        (!domain.is_empty()).then(|| format!("https://{domain}"))
    }

    /// Sitemap URL: the explicit setting, else `https://{domain}/sitemap.xml`.
    pub fn sitemap_url(&self) -> Option<String> {
        self.sitemap_url
            .clone()
            .or_else(|| self.base_url().map(|base| format!("{base}/sitemap.xml")))
    }

    /// Content types to audit; unknown names are skipped.
    pub fn content_types(&self) -> Vec<ContentType> {
        self.content_types
            .iter()
            .filter_map(|name| name.parse().ok())
            .collect()
    }
}

/// Resolved input and output locations.
#[derive(Debug, Clone, Serialize)]
pub struct PathSettings {
    /// Report output directory.
    pub output_dir: PathBuf,
    /// Directory holding webmaster exports.
    pub webmasters_dir: PathBuf,
    /// Page cache file.
    pub cache_file: PathBuf,
    /// Audit log file.
    pub log_file: PathBuf,
}

/// Default report output directory.
const DEFAULT_OUTPUT_DIR: &str = "research/content-audit";
/// Default webmaster export directory.
const DEFAULT_WEBMASTERS_DIR: &str = "research/webmasters";
/// Cache file name inside the output directory.
const DEFAULT_CACHE_FILE: &str = ".cache.json";
/// Log file name inside the output directory.
const DEFAULT_LOG_FILE: &str = "audit-log.txt";

impl PathSettings {
    /// Paths derived from an output and a webmasters directory.
    pub fn with_dirs(output_dir: PathBuf, webmasters_dir: PathBuf) -> Self {
        Self {
            cache_file: output_dir.join(DEFAULT_CACHE_FILE),
            log_file: output_dir.join(DEFAULT_LOG_FILE),
            output_dir,
            webmasters_dir,
        }
    }
}

impl Default for PathSettings {
    fn default() -> Self {
        Self::with_dirs(
            PathBuf::from(DEFAULT_OUTPUT_DIR),
            PathBuf::from(DEFAULT_WEBMASTERS_DIR),
        )
    }
}

/// Webmaster export file patterns.
#[derive(Debug, Clone, Serialize)]
pub struct WebmasterSettings {
    /// Glob for Yandex Webmaster CSV exports; `{domain}` is substituted.
    pub yandex_pattern: String,
    /// Glob for Google Search Console ZIP exports.
    pub gsc_pattern: String,
}

impl Default for WebmasterSettings {
    fn default() -> Self {
        Self {
            yandex_pattern: String::from("{domain}_*.csv"),
            gsc_pattern: String::from("*Performance*.zip"),
        }
    }
}

impl WebmasterSettings {
    /// Yandex glob with `{domain}` substituted.
    pub fn yandex_glob(&self, domain: &str) -> String {
        self.yandex_pattern.replace("{domain}", domain.trim())
    }
}

/// Analysis thresholds and normalizer settings.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisSettings {
    /// Minimum impressions for gaps and CTR candidates.
    pub min_impressions: u64,
    /// Maximum keyword gaps.
    pub max_gaps: usize,
    /// Maximum CTR candidates.
    pub max_ctr_candidates: usize,
    /// Maximum cannibalization groups.
    pub max_cannibalization_groups: usize,
    /// Minimum pages per cannibalization group.
    pub min_cannibalization_pages: usize,
    /// Morphological backend (`snowball` or `identity`).
    pub lemmatizer: String,
    /// Stemming language.
    pub stemmer: String,
    /// Lemma cache capacity.
    pub cache_capacity: usize,
    /// Keywords extracted per page.
    pub keywords_per_page: usize,
    /// Pages below this word count are reported as low content.
    pub min_word_count: usize,
}

impl Default for AnalysisSettings {
    fn default() -> Self {
        let params = AnalysisParams::default();
        Self {
            min_impressions: params.min_impressions,
            max_gaps: params.max_gaps,
            max_ctr_candidates: params.max_ctr_candidates,
            max_cannibalization_groups: params.max_groups,
            min_cannibalization_pages: params.min_pages,
            lemmatizer: String::from("snowball"),
            stemmer: String::from("russian"),
            cache_capacity: DEFAULT_CACHE_CAPACITY,
            keywords_per_page: 10,
            min_word_count: 300,
        }
    }
}

impl AnalysisSettings {
    /// Thresholds and caps for the analysis run.
    pub fn params(&self) -> AnalysisParams {
        AnalysisParams {
            min_impressions: self.min_impressions,
            max_gaps: self.max_gaps,
            max_ctr_candidates: self.max_ctr_candidates,
            max_groups: self.max_cannibalization_groups,
            min_pages: self.min_cannibalization_pages,
        }
    }
}

/// Which data reports a run writes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    /// CSV only.
    Csv,
    /// JSON only.
    Json,
    /// CSV and JSON.
    #[default]
    Both,
}

impl ReportFormat {
    /// True when a CSV report is written.
    pub fn includes_csv(self) -> bool {
        matches!(self, Self::Csv | Self::Both)
    }

    /// True when a JSON report is written.
    pub fn includes_json(self) -> bool {
        matches!(self, Self::Json | Self::Both)
    }
}

impl fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Csv => write!(f, "csv"),
            Self::Json => write!(f, "json"),
            Self::Both => write!(f, "both"),
        }
    }
}

impl str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(Self::Csv),
            "json" => Ok(Self::Json),
            "both" | "all" => Ok(Self::Both),
            _ => Err(format!(
                "unknown report format '{s}', expected one of: csv, json, both"
            )),
        }
    }
}

/// Report output settings.
#[derive(Debug, Clone, Serialize)]
pub struct ReportSettings {
    /// Which data reports to write.
    pub format: ReportFormat,
    /// Whether to refresh the `*-latest` symlinks.
    pub latest_symlinks: bool,
}

impl Default for ReportSettings {
    fn default() -> Self {
        Self {
            format: ReportFormat::Both,
            latest_symlinks: true,
        }
    }
}

/// Borrowed view of every section for TOML serialization.
#[derive(Serialize)]
struct SerializableSettings<'a> {
    /// Site settings.
    site: &'a SiteSettings,
    /// Path settings.
    paths: &'a PathSettings,
    /// Webmaster settings.
    webmaster: &'a WebmasterSettings,
    /// Analysis settings.
    analysis: &'a AnalysisSettings,
    /// Report settings.
    report: &'a ReportSettings,
}
