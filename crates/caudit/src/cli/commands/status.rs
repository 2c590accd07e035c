//! Implementation of `caudit status`.

use std::process::ExitCode;

use caudit_config::{Config, ConfigWarning, discover_config_files};
use caudit_crawl::PageCache;
use caudit_webmaster::discover_files;

use crate::cli::{
    context::CommandContext,
    output::{dim, subheader, warning},
};

/// Shows configuration files, site, data locations and validation warnings.
pub fn run(ctx: &CommandContext) -> ExitCode {
    let cwd = &ctx.cwd;

    let config_files = discover_config_files(cwd);
    if config_files.is_empty() {
        println!("{}", dim("No configuration files found."));
        println!();
        println!(
            "Run {} to create a configuration file.",
            subheader("caudit init")
        );
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader("Config files:"));
    for path in &config_files {
        println!("   {}", path.display());
    }
    println!();

    let config = &ctx.config;
    print_site(config);
    print_data(config);

    let warnings = config.validate();
    if warnings.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("   {}", warning(&w.to_string()));
    }
    println!();

    print_hints(&warnings);

    ExitCode::FAILURE
}

/// Domain, sitemap and audited content types.
fn print_site(config: &Config) {
    let site = &config.site;
    println!("{}", subheader("Site:"));
    if site.domain.trim().is_empty() {
        println!("   domain   {}", dim("(not set)"));
    } else {
        println!("   domain   {}", site.domain);
    }
    if let Some(url) = site.sitemap_url() {
        println!("   sitemap  {url}");
    }
    let types = site.content_types();
    if types.is_empty() {
        println!("   types    {}", dim("(all)"));
    } else {
        let names: Vec<&str> = types.iter().map(|t| t.as_str()).collect();
        println!("   types    {}", names.join(", "));
    }
    for pattern in &site.include {
        println!("      + {pattern}");
    }
    for pattern in &site.exclude {
        println!("      - {pattern}");
    }
    println!();
}

/// Output directory, page cache and webmaster exports.
fn print_data(config: &Config) {
    let paths = &config.paths;
    println!("{}", subheader("Data:"));
    println!("   reports     {}", paths.output_dir.display());

    let cache_state = if paths.cache_file.exists() {
        let cache = PageCache::load_or_empty(&paths.cache_file);
        format!("({} pages)", cache.len())
    } else {
        "(not created yet)".to_string()
    };
    println!(
        "   cache       {} {}",
        paths.cache_file.display(),
        dim(&cache_state)
    );

    println!("   webmasters  {}", paths.webmasters_dir.display());
    let found = config
        .webmaster_patterns()
        .ok()
        .and_then(|patterns| discover_files(&paths.webmasters_dir, &patterns).ok())
        .unwrap_or_default();
    let exports = [
        ("Yandex pages", &found.yandex_pages),
        ("Yandex queries", &found.yandex_queries),
        ("GSC archive", &found.gsc_zip),
    ];
    for (label, path) in exports {
        match path {
            Some(path) => println!("      {label:15} {}", path.display()),
            None => println!("      {label:15} {}", dim("(none)")),
        }
    }
    println!();
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    for w in warnings {
        match w {
            ConfigWarning::NoDomain => {
                println!("{}", dim("Hint: set [site] domain in .caudit.toml"));
            }
            ConfigWarning::WebmastersDirMissing { .. } => {
                println!(
                    "{}",
                    dim("Hint: create the directory and put Yandex CSV and GSC ZIP exports in it")
                );
            }
            ConfigWarning::UnknownLemmatizer { .. } | ConfigWarning::UnknownStemmer { .. } => {
                println!(
                    "{}",
                    dim("Hint: [analysis] lemmatizer = \"snowball\", stemmer = \"russian\"")
                );
            }
            _ => {}
        }
    }
}
