//! Shared context for running CLI commands.

use std::{
    env,
    path::{Path, PathBuf},
    process::ExitCode,
};

use caudit_analysis::{LemmatizerKind, Normalizer};
use caudit_config::{Config, ReportFormat};
use caudit_crawl::PageCache;
use caudit_report::ReportWriter;
use caudit_webmaster::WebmasterData;

use super::logging;

/// Command execution context built once per CLI invocation.
pub struct CommandContext {
    /// Current working directory.
    pub cwd: PathBuf,
    /// Loaded configuration (default when no config files were found).
    pub config: Config,
}

impl CommandContext {
    /// Loads the current directory and configuration.
    pub fn load() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        let config = load_config_or_failure(&cwd)?;
        Ok(Self { cwd, config })
    }

    /// Loads only the current directory, skipping configuration parsing.
    ///
    /// Used for `init`, which must work even when an existing config file is invalid.
    pub fn load_cwd_only() -> Result<Self, ExitCode> {
        let cwd = current_dir_or_failure()?;
        Ok(Self {
            cwd,
            config: Config::default(),
        })
    }

    /// Ensures a site domain is configured.
    pub fn require_domain(&self) -> Result<&str, ExitCode> {
        let domain = self.config.site.domain.trim();
        if domain.is_empty() {
            eprintln!("error: no site domain configured");
            eprintln!("Run 'caudit init' and set [site] domain in .caudit.toml.");
            return Err(ExitCode::FAILURE);
        }
        Ok(domain)
    }

    /// Sitemap URL from the site settings.
    pub fn require_sitemap_url(&self) -> Result<String, ExitCode> {
        self.config.site.sitemap_url().ok_or_else(|| {
            eprintln!("error: no sitemap URL configured");
            eprintln!("Set [site] domain or [site] sitemap_url in .caudit.toml.");
            ExitCode::FAILURE
        })
    }

    /// Installs logging to stderr and the audit log file.
    pub fn init_logging(&self) {
        logging::init(Some(&self.config.paths.log_file));
    }

    /// Installs logging to stderr only.
    pub fn init_console_logging(&self) {
        logging::init(None);
    }

    /// Builds the text normalizer from the analysis settings.
    pub fn normalizer(&self) -> Result<Normalizer, ExitCode> {
        let analysis = &self.config.analysis;
        let kind: LemmatizerKind = analysis.lemmatizer.parse().map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })?;
        Normalizer::from_settings(kind, &analysis.stemmer, analysis.cache_capacity).map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }

    /// Page cache path.
    pub fn cache_file(&self) -> &Path {
        &self.config.paths.cache_file
    }

    /// Loads the page cache, failing when it is missing or empty.
    pub fn require_cache(&self) -> Result<PageCache, ExitCode> {
        let path = self.cache_file();
        let cache = PageCache::load_or_empty(path);
        if cache.is_empty() {
            eprintln!("error: no cached pages at {}", path.display());
            eprintln!("Run 'caudit full' first.");
            return Err(ExitCode::FAILURE);
        }
        Ok(cache)
    }

    /// Loads the webmaster exports; an unusable pattern or directory yields no data.
    pub fn webmaster_data(&self) -> Result<WebmasterData, ExitCode> {
        let patterns = self.config.webmaster_patterns().map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })?;
        WebmasterData::load(
            &self.config.paths.webmasters_dir,
            &patterns,
            &self.config.site.domain,
        )
        .map_err(|e| {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        })
    }

    /// Report writer for the configured output directory.
    pub fn report_writer(&self) -> ReportWriter {
        ReportWriter::new(&self.config.paths.output_dir)
            .with_min_word_count(self.config.analysis.min_word_count)
    }

    /// Report format: the CLI override, else the configured one.
    pub fn report_format(&self, cli: Option<ReportFormat>) -> ReportFormat {
        cli.unwrap_or(self.config.report.format)
    }
}

/// Returns the current working directory or exits with a consistent error.
fn current_dir_or_failure() -> Result<PathBuf, ExitCode> {
    env::current_dir().map_err(|e| {
        eprintln!("error: could not determine current directory: {e}");
        ExitCode::FAILURE
    })
}

/// Loads configuration from the provided directory or exits with an error.
fn load_config_or_failure(cwd: &Path) -> Result<Config, ExitCode> {
    Config::load(cwd).map_err(|e| {
        eprintln!("error: failed to load configuration: {e}");
        ExitCode::FAILURE
    })
}
