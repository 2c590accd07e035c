//! CLI integration tests for caudit commands.
//!
//! No test touches the network: the commands exercised here either stop before fetching or
//! work from a page cache written by the test.

#![allow(clippy::tests_outside_test_module)]

use std::{fs, path::Path};

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;

/// Project config with a domain and no symlinks.
const CONFIG: &str = r#"root = true

[site]
domain = "shop.example"

[report]
format = "both"
latest_symlinks = false
"#;

/// Page cache with two blog posts sharing a keyword.
const CACHE: &str = r#"{
  "https://shop.example/blogs/blog/lofery": {
    "url": "https://shop.example/blogs/blog/lofery",
    "lastmod": "2024-05-01",
    "content_type": "blog",
    "title": "Лоферы: как выбрать",
    "word_count": 800,
    "top_keywords": ["лоферы", "обувь"]
  },
  "https://shop.example/blogs/blog/lofery-uhod": {
    "url": "https://shop.example/blogs/blog/lofery-uhod",
    "content_type": "blog",
    "title": "Уход за лоферами",
    "word_count": 120,
    "top_keywords": ["лоферы", "замша"]
  }
}"#;

/// Yandex pages export.
const YANDEX_PAGES: &str = "Path,Impressions,Clicks,CTR %,Avg. position\n\
/blogs/blog/lofery,1000,10,\"1,0\",\"3,0\"\n\
/blogs/blog/lofery-uhod,300,12,4,\"6,5\"\n";

/// Yandex queries export.
const YANDEX_QUERIES: &str = "Query,Impressions,Clicks,CTR %,Avg. position\n\
лоферы,1000,10,1,3\n\
купить премиаты,200,0,,\n";

/// Helper to create a temp directory for tests.
fn temp_dir() -> tempfile::TempDir {
    tempfile::tempdir().unwrap()
}

/// Helper to get a caudit command.
fn caudit() -> Command {
    #[allow(deprecated)]
    Command::cargo_bin("caudit").unwrap()
}

/// `caudit` with HOME isolated to `home` and logging quiet.
fn caudit_with_home(home: &Path) -> Command {
    let mut cmd = caudit();
    cmd.env("HOME", home).env("CAUDIT_LOG", "warn");
    cmd
}

/// Strips ANSI escape sequences from a string.
fn strip_ansi(input: &str) -> String {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars();

    while let Some(ch) = chars.next() {
        if ch == '\u{1b}' {
            for c in chars.by_ref() {
                if c == 'm' {
                    break;
                }
            }
        } else {
            output.push(ch);
        }
    }

    output
}

/// A project with config, a page cache and Yandex exports.
fn audited_project(root: &Path) {
    fs::write(root.join(".caudit.toml"), CONFIG).unwrap();
    let output = root.join("research/content-audit");
    fs::create_dir_all(&output).unwrap();
    fs::write(output.join(".cache.json"), CACHE).unwrap();
    let webmasters = root.join("research/webmasters");
    fs::create_dir_all(&webmasters).unwrap();
    fs::write(webmasters.join("shop.example_pages.csv"), YANDEX_PAGES).unwrap();
    fs::write(webmasters.join("shop.example_queries.csv"), YANDEX_QUERIES).unwrap();
}

/// File names in `dir` starting with `prefix` and ending with `suffix`.
fn files_like(dir: &Path, prefix: &str, suffix: &str) -> Vec<String> {
    fs::read_dir(dir)
        .unwrap()
        .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
        .filter(|name| name.starts_with(prefix) && name.ends_with(suffix))
        .collect()
}

mod init {
    use super::*;

    #[test]
    fn creates_config_file() {
        let dir = temp_dir();

        caudit_with_home(dir.path())
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .success()
            .stdout(predicate::str::contains("Created"));

        let contents = fs::read_to_string(dir.path().join(".caudit.toml")).unwrap();
        assert!(contents.contains("# [site]"));
        assert!(contents.contains("# domain = "));
    }

    #[test]
    fn fails_if_config_exists() {
        let dir = temp_dir();
        fs::write(dir.path().join(".caudit.toml"), "existing").unwrap();

        caudit_with_home(dir.path())
            .current_dir(dir.path())
            .arg("init")
            .assert()
            .failure()
            .stderr(predicate::str::contains("already exists"));

        let contents = fs::read_to_string(dir.path().join(".caudit.toml")).unwrap();
        assert_eq!(contents, "existing");
    }

    #[test]
    fn force_overwrites_even_an_invalid_config() {
        let dir = temp_dir();
        fs::write(dir.path().join(".caudit.toml"), "not [valid toml").unwrap();

        caudit_with_home(dir.path())
            .current_dir(dir.path())
            .args(["init", "--force"])
            .assert()
            .success();

        let contents = fs::read_to_string(dir.path().join(".caudit.toml")).unwrap();
        assert!(contents.contains("# [analysis]"));
    }
}

mod config {
    use super::*;

    #[test]
    fn prints_effective_settings() {
        let dir = temp_dir();
        fs::write(dir.path().join(".caudit.toml"), CONFIG).unwrap();

        let output = caudit_with_home(dir.path())
            .current_dir(dir.path())
            .arg("config")
            .output()
            .unwrap();
        assert!(output.status.success());

        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));
        assert!(stdout.contains("[site]"));
        assert!(stdout.contains("shop.example"));
        assert!(stdout.contains("min_impressions = 50"));
        assert!(stdout.contains("latest_symlinks = false"));
    }

    #[test]
    fn invalid_config_is_an_error() {
        let dir = temp_dir();
        fs::write(dir.path().join(".caudit.toml"), "[site]\ndomain = 5\n").unwrap();

        caudit_with_home(dir.path())
            .current_dir(dir.path())
            .arg("config")
            .assert()
            .failure()
            .stderr(predicate::str::contains("failed to load configuration"));
    }
}

mod status {
    use super::*;

    #[test]
    fn without_config_suggests_init() {
        let dir = temp_dir();

        caudit_with_home(dir.path())
            .current_dir(dir.path())
            .arg("status")
            .assert()
            .success()
            .stdout(predicate::str::contains("No configuration files found"));
    }

    #[test]
    fn healthy_project_has_no_issues() {
        let dir = temp_dir();
        audited_project(dir.path());

        let output = caudit_with_home(dir.path())
            .current_dir(dir.path())
            .arg("status")
            .output()
            .unwrap();
        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));
        assert!(output.status.success(), "stdout: {stdout}");
        assert!(stdout.contains("(2 pages)"));
        assert!(stdout.contains("shop.example_pages.csv"));
        assert!(stdout.contains("No issues found."));
    }

    #[test]
    fn missing_webmasters_dir_is_a_warning() {
        let dir = temp_dir();
        fs::write(dir.path().join(".caudit.toml"), CONFIG).unwrap();

        let output = caudit_with_home(dir.path())
            .current_dir(dir.path())
            .arg("status")
            .output()
            .unwrap();
        assert!(!output.status.success());
        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));
        assert!(stdout.contains("Warnings (1):"));
        assert!(stdout.contains("webmasters directory does not exist"));
    }
}

mod full {
    use super::*;

    #[test]
    fn requires_a_domain() {
        let dir = temp_dir();
        fs::write(dir.path().join(".caudit.toml"), "root = true\n").unwrap();

        caudit_with_home(dir.path())
            .current_dir(dir.path())
            .arg("full")
            .assert()
            .failure()
            .stderr(predicate::str::contains("no site domain configured"));
    }

    #[test]
    fn rejects_unknown_format() {
        caudit()
            .args(["full", "--output", "xml"])
            .assert()
            .failure();
    }
}

mod update_webmaster {
    use super::*;

    #[test]
    fn fails_without_cache() {
        let dir = temp_dir();
        fs::write(dir.path().join(".caudit.toml"), CONFIG).unwrap();

        caudit_with_home(dir.path())
            .current_dir(dir.path())
            .arg("update-webmaster")
            .assert()
            .failure()
            .stderr(predicate::str::contains("caudit full"));
    }

    #[test]
    fn enriches_cache_and_writes_reports() {
        let dir = temp_dir();
        audited_project(dir.path());

        caudit_with_home(dir.path())
            .current_dir(dir.path())
            .arg("update-webmaster")
            .assert()
            .success()
            .stdout(predicate::str::contains("Reports:"));

        let output = dir.path().join("research/content-audit");
        assert_eq!(files_like(&output, "site-content-audit-", ".csv").len(), 1);
        assert_eq!(files_like(&output, "site-content-audit-", ".json").len(), 1);
        assert_eq!(files_like(&output, "content-gaps-", ".md").len(), 1);
        assert!(output.join("audit-log.txt").exists());

        let cache: Value =
            serde_json::from_str(&fs::read_to_string(output.join(".cache.json")).unwrap())
                .unwrap();
        let lofery = &cache["https://shop.example/blogs/blog/lofery"];
        assert_eq!(lofery["yandex"]["clicks"], 10);
        assert_eq!(lofery["yandex"]["impressions"], 1000);
        assert!(lofery["gsc"]["clicks"].is_null());
    }

    #[test]
    fn output_flag_limits_data_reports() {
        let dir = temp_dir();
        audited_project(dir.path());

        caudit_with_home(dir.path())
            .current_dir(dir.path())
            .args(["update-webmaster", "--output", "json"])
            .assert()
            .success();

        let output = dir.path().join("research/content-audit");
        assert!(files_like(&output, "site-content-audit-", ".csv").is_empty());
        assert_eq!(files_like(&output, "site-content-audit-", ".json").len(), 1);
        assert_eq!(files_like(&output, "content-gaps-", ".md").len(), 1);
    }
}

mod gaps {
    use super::*;

    #[test]
    fn prints_analysis_as_json() {
        let dir = temp_dir();
        audited_project(dir.path());

        let output = caudit_with_home(dir.path())
            .current_dir(dir.path())
            .args(["gaps", "--json"])
            .output()
            .unwrap();
        assert!(output.status.success());

        let analysis: Value = serde_json::from_slice(&output.stdout).unwrap();
        let gaps = analysis["keyword_gaps"].as_array().unwrap();
        let queries: Vec<&str> = gaps.iter().filter_map(|g| g["query"].as_str()).collect();
        assert!(queries.contains(&"купить премиаты"));
        assert!(!queries.contains(&"лоферы"));
        assert_eq!(analysis["query_counts"]["yandex"], 2);

        let groups = analysis["cannibalization"].as_array().unwrap();
        assert_eq!(groups.len(), 1);
        assert_eq!(groups[0]["pages"].as_array().unwrap().len(), 2);

        let ctr = analysis["ctr_candidates"].as_array().unwrap();
        assert_eq!(ctr[0]["url"], "https://shop.example/blogs/blog/lofery");
        assert_eq!(ctr[0]["potential_clicks"], 100);
    }

    #[test]
    fn prints_tables() {
        let dir = temp_dir();
        audited_project(dir.path());

        let output = caudit_with_home(dir.path())
            .current_dir(dir.path())
            .args(["gaps", "-n", "5"])
            .output()
            .unwrap();
        assert!(output.status.success());
        let stdout = strip_ansi(&String::from_utf8_lossy(&output.stdout));
        assert!(stdout.contains("Keyword gaps"));
        assert!(stdout.contains("купить премиаты"));
        assert!(stdout.contains("Cannibalization"));
    }

    #[test]
    fn gaps_does_not_modify_cache() {
        let dir = temp_dir();
        audited_project(dir.path());

        caudit_with_home(dir.path())
            .current_dir(dir.path())
            .args(["gaps", "--json"])
            .assert()
            .success();

        let cache =
            fs::read_to_string(dir.path().join("research/content-audit/.cache.json")).unwrap();
        assert_eq!(cache, CACHE);
    }
}
