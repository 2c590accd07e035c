//! Configuration merging.
//!
//! Merges multiple `RawConfig` files into a single resolved `Config`, applying precedence
//! rules and resolving paths.

use std::path::{Path, PathBuf};

use crate::{
    AnalysisSettings, Config, ConfigError, PathSettings, ReportSettings, SiteSettings,
    WebmasterSettings,
    parse::{
        RawAnalysisSettings, RawConfig, RawPathSettings, RawReportSettings, RawSiteSettings,
        RawWebmasterSettings,
    },
    resolve::resolve_path,
};

/// A parsed config file with its source path.
pub struct ParsedConfig {
    /// Path to the config file.
    pub path: PathBuf,
    /// Parsed raw configuration.
    pub config: RawConfig,
}

impl ParsedConfig {
    /// Directory containing the config file.
    fn dir(&self) -> &Path {
        self.path.parent().unwrap_or_else(|| Path::new("."))
    }
}

/// Merges multiple configuration files into a single resolved `Config`.
///
/// Configs should be provided in precedence order: highest precedence first (closest to CWD),
/// lowest precedence last (global config).
///
/// Merge rules:
/// - Scalar settings: first defined value wins (highest precedence)
/// - Lists (`include`, `exclude`, `content_types`): first defined list wins completely
/// - Paths: resolved against the directory of the file that sets them; defaults resolve
///   against the directory of the most specific config file
pub fn merge_configs(configs: &[ParsedConfig]) -> Result<Config, ConfigError> {
    let Some(first) = configs.first() else {
        return Ok(Config::default());
    };
    let config_root = first.dir().to_path_buf();

    Ok(Config {
        site: merge_section(configs, |c| c.site.as_ref(), apply_raw_site),
        paths: merge_paths(configs, &config_root)?,
        webmaster: merge_section(configs, |c| c.webmaster.as_ref(), apply_raw_webmaster),
        analysis: merge_section(configs, |c| c.analysis.as_ref(), apply_raw_analysis),
        report: merge_section(configs, |c| c.report.as_ref(), apply_raw_report),
        config_root: Some(config_root),
    })
}

/// Merges one section, applying lowest precedence first so higher precedence overwrites.
fn merge_section<T, R>(
    configs: &[ParsedConfig],
    section: impl Fn(&RawConfig) -> Option<&R>,
    apply: impl Fn(&mut T, &R),
) -> T
where
    T: Default,
{
    let mut result = T::default();
    for parsed in configs.iter().rev() {
        if let Some(raw) = section(&parsed.config) {
            apply(&mut result, raw);
        }
    }
    result
}

/// Applies raw site settings to result.
fn apply_raw_site(result: &mut SiteSettings, raw: &RawSiteSettings) {
    if let Some(ref v) = raw.domain {
        result.domain = v.trim().to_string();
    }
    if let Some(ref v) = raw.sitemap_url {
        result.sitemap_url = Some(v.clone());
    }
    if let Some(ref v) = raw.user_agent {
        result.user_agent = v.clone();
    }
    if let Some(v) = raw.request_delay_ms {
        result.request_delay_ms = v;
    }
    if let Some(v) = raw.timeout_secs {
        result.timeout_secs = v;
    }
    if let Some(ref v) = raw.include {
        result.include = v.clone();
    }
    if let Some(ref v) = raw.exclude {
        result.exclude = v.clone();
    }
    if let Some(ref v) = raw.content_types {
        result.content_types = v.iter().map(|t| t.trim().to_lowercase()).collect();
    }
}

/// Applies raw webmaster settings to result.
fn apply_raw_webmaster(result: &mut WebmasterSettings, raw: &RawWebmasterSettings) {
    if let Some(ref v) = raw.yandex_pattern {
        result.yandex_pattern = v.clone();
    }
    if let Some(ref v) = raw.gsc_pattern {
        result.gsc_pattern = v.clone();
    }
}

/// Applies raw analysis settings to result.
fn apply_raw_analysis(result: &mut AnalysisSettings, raw: &RawAnalysisSettings) {
    if let Some(v) = raw.min_impressions {
        result.min_impressions = v;
    }
    if let Some(v) = raw.max_gaps {
        result.max_gaps = v;
    }
    if let Some(v) = raw.max_ctr_candidates {
        result.max_ctr_candidates = v;
    }
    if let Some(v) = raw.max_cannibalization_groups {
        result.max_cannibalization_groups = v;
    }
    if let Some(v) = raw.min_cannibalization_pages {
        result.min_cannibalization_pages = v;
    }
    if let Some(ref v) = raw.lemmatizer {
        result.lemmatizer = v.trim().to_lowercase();
    }
    if let Some(ref v) = raw.stemmer {
        result.stemmer = v.trim().to_lowercase();
    }
    if let Some(v) = raw.cache_capacity {
        result.cache_capacity = v;
    }
    if let Some(v) = raw.keywords_per_page {
        result.keywords_per_page = v;
    }
    if let Some(v) = raw.min_word_count {
        result.min_word_count = v;
    }
}

/// Applies raw report settings to result.
fn apply_raw_report(result: &mut ReportSettings, raw: &RawReportSettings) {
    if let Some(v) = raw.format {
        result.format = v;
    }
    if let Some(v) = raw.latest_symlinks {
        result.latest_symlinks = v;
    }
}

/// First defined value of a path setting, resolved against its own config directory.
fn first_path(
    configs: &[ParsedConfig],
    field: impl Fn(&RawPathSettings) -> Option<&String>,
) -> Result<Option<PathBuf>, ConfigError> {
    for parsed in configs {
        if let Some(value) = parsed.config.paths.as_ref().and_then(&field) {
            return resolve_path(value, parsed.dir()).map(Some);
        }
    }
    Ok(None)
}

/// Merges path settings.
///
/// The cache and log files default to locations inside the merged output directory.
fn merge_paths(
    configs: &[ParsedConfig],
    config_root: &Path,
) -> Result<PathSettings, ConfigError> {
    let defaults = PathSettings::default();

    let output_dir = first_path(configs, |p| p.output_dir.as_ref())?
        .unwrap_or_else(|| config_root.join(&defaults.output_dir));
    let webmasters_dir = first_path(configs, |p| p.webmasters_dir.as_ref())?
        .unwrap_or_else(|| config_root.join(&defaults.webmasters_dir));

    let mut paths = PathSettings::with_dirs(output_dir, webmasters_dir);
    if let Some(cache_file) = first_path(configs, |p| p.cache_file.as_ref())? {
        paths.cache_file = cache_file;
    }
    if let Some(log_file) = first_path(configs, |p| p.log_file.as_ref())? {
        paths.log_file = log_file;
    }
    Ok(paths)
}
