//! Configuration validation.
//!
//! Validates a loaded configuration and reports warnings for potential issues.

use std::fmt;

use caudit_analysis::{ContentType, LemmatizerKind, parse_language};
use globset::Glob;
use regex::Regex;

use crate::Config;

/// A non-fatal warning about the configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigWarning {
    /// No site domain is configured.
    NoDomain,
    /// A URL include/exclude pattern is not a valid regex.
    InvalidUrlPattern {
        /// Pattern that failed to compile.
        pattern: String,
        /// Compiler message.
        message: String,
    },
    /// A webmaster file pattern is not a valid glob.
    InvalidFilePattern {
        /// Pattern that failed to compile.
        pattern: String,
        /// Compiler message.
        message: String,
    },
    /// A configured content type is not recognized.
    UnknownContentType {
        /// The unrecognized name.
        name: String,
    },
    /// Content types are listed but none is recognized.
    NoContentTypes,
    /// The webmaster export directory does not exist.
    WebmastersDirMissing {
        /// Path that doesn't exist.
        path: String,
    },
    /// The lemmatizer backend is not recognized.
    UnknownLemmatizer {
        /// The unrecognized name.
        name: String,
    },
    /// The stemming language is not supported.
    UnknownStemmer {
        /// The unrecognized language.
        name: String,
    },
}

impl fmt::Display for ConfigWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoDomain => write!(f, "no site domain is configured ([site] domain)"),
            Self::InvalidUrlPattern { pattern, message } => {
                write!(f, "URL pattern '{pattern}' is not a valid regex: {message}")
            }
            Self::InvalidFilePattern { pattern, message } => {
                write!(f, "file pattern '{pattern}' is not a valid glob: {message}")
            }
            Self::UnknownContentType { name } => {
                write!(
                    f,
                    "unknown content type '{name}', expected one of: blog, collection, product, other"
                )
            }
            Self::NoContentTypes => {
                write!(f, "none of the listed content types is recognized, auditing all")
            }
            Self::WebmastersDirMissing { path } => {
                write!(f, "webmasters directory does not exist: {path}")
            }
            Self::UnknownLemmatizer { name } => {
                write!(
                    f,
                    "unknown lemmatizer '{name}', expected one of: snowball, identity"
                )
            }
            Self::UnknownStemmer { name } => {
                write!(f, "unsupported stemmer language: {name}")
            }
        }
    }
}

/// Validates the configuration and returns any warnings.
pub fn validate_config(config: &Config) -> Vec<ConfigWarning> {
    let mut warnings = Vec::new();

    if config.site.domain.trim().is_empty() && config.site.sitemap_url.is_none() {
        warnings.push(ConfigWarning::NoDomain);
    }

    for pattern in config.site.include.iter().chain(&config.site.exclude) {
        if let Err(e) = Regex::new(pattern) {
            warnings.push(ConfigWarning::InvalidUrlPattern {
                pattern: pattern.clone(),
                message: e.to_string(),
            });
        }
    }

    let webmaster = &config.webmaster;
    for pattern in [
        webmaster.yandex_glob(&config.site.domain),
        webmaster.gsc_pattern.clone(),
    ] {
        if let Err(e) = Glob::new(&pattern) {
            warnings.push(ConfigWarning::InvalidFilePattern {
                pattern,
                message: e.to_string(),
            });
        }
    }

    warnings.extend(validate_content_types(&config.site.content_types));

    if !config.paths.webmasters_dir.is_dir() {
        warnings.push(ConfigWarning::WebmastersDirMissing {
            path: config.paths.webmasters_dir.display().to_string(),
        });
    }

    match config.analysis.lemmatizer.parse::<LemmatizerKind>() {
        Ok(LemmatizerKind::Snowball) => {
            if parse_language(&config.analysis.stemmer).is_err() {
                warnings.push(ConfigWarning::UnknownStemmer {
                    name: config.analysis.stemmer.clone(),
                });
            }
        }
        Ok(LemmatizerKind::Identity) => {}
        Err(_) => warnings.push(ConfigWarning::UnknownLemmatizer {
            name: config.analysis.lemmatizer.clone(),
        }),
    }

    warnings
}

/// Checks content type names.
fn validate_content_types(names: &[String]) -> Vec<ConfigWarning> {
    let mut warnings: Vec<ConfigWarning> = names
        .iter()
        .filter(|name| name.parse::<ContentType>().is_err())
        .map(|name| ConfigWarning::UnknownContentType { name: name.clone() })
        .collect();

    if !names.is_empty() && warnings.len() == names.len() {
        warnings.push(ConfigWarning::NoContentTypes);
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{PathSettings, SiteSettings, test_support::TestDir};

    fn valid_config(test_dir: &TestDir) -> Config {
        let webmasters = test_dir.dir("research/webmasters");
        Config {
            site: SiteSettings {
                domain: "shop.example".into(),
                ..SiteSettings::default()
            },
            paths: PathSettings::with_dirs(test_dir.path().join("out"), webmasters),
            ..Config::default()
        }
    }

    #[test]
    fn valid_config_has_no_warnings() {
        let test_dir = TestDir::new();
        assert!(validate_config(&valid_config(&test_dir)).is_empty());
    }

    #[test]
    fn missing_domain() {
        let test_dir = TestDir::new();
        let mut config = valid_config(&test_dir);
        config.site.domain = String::new();
        assert_eq!(validate_config(&config), [ConfigWarning::NoDomain]);

        config.site.sitemap_url = Some("https://shop.example/sitemap.xml".into());
        assert!(validate_config(&config).is_empty());
    }

    #[test]
    fn invalid_url_pattern() {
        let test_dir = TestDir::new();
        let mut config = valid_config(&test_dir);
        config.site.exclude = vec!["[unclosed".into()];

        let warnings = validate_config(&config);
        assert_eq!(warnings.len(), 1);
        assert!(matches!(
            &warnings[0],
            ConfigWarning::InvalidUrlPattern { pattern, .. } if pattern == "[unclosed"
        ));
    }

    #[test]
    fn unknown_content_types() {
        let test_dir = TestDir::new();
        let mut config = valid_config(&test_dir);
        config.site.content_types = vec!["landing".into()];

        let warnings = validate_config(&config);
        assert_eq!(
            warnings,
            [
                ConfigWarning::UnknownContentType {
                    name: "landing".into()
                },
                ConfigWarning::NoContentTypes
            ]
        );
    }

    #[test]
    fn missing_webmasters_dir() {
        let test_dir = TestDir::new();
        let mut config = valid_config(&test_dir);
        config.paths.webmasters_dir = test_dir.path().join("nope");

        let warnings = validate_config(&config);
        assert!(matches!(
            warnings.as_slice(),
            [ConfigWarning::WebmastersDirMissing { .. }]
        ));
    }

    #[test]
    fn unknown_stemmer_and_lemmatizer() {
        let test_dir = TestDir::new();
        let mut config = valid_config(&test_dir);
        config.analysis.stemmer = "klingon".into();
        assert_eq!(
            validate_config(&config),
            [ConfigWarning::UnknownStemmer {
                name: "klingon".into()
            }]
        );

        config.analysis.lemmatizer = "identity".into();
        assert!(validate_config(&config).is_empty());

        config.analysis.lemmatizer = "pymorphy".into();
        assert_eq!(
            validate_config(&config),
            [ConfigWarning::UnknownLemmatizer {
                name: "pymorphy".into()
            }]
        );
    }

    #[test]
    fn warning_display() {
        let warning = ConfigWarning::WebmastersDirMissing {
            path: "/srv/shop/research/webmasters".into(),
        };
        assert_eq!(
            warning.to_string(),
            "webmasters directory does not exist: /srv/shop/research/webmasters"
        );
    }
}
