//! Clap argument definitions for the `caudit` CLI.

use std::{env, process::exit};

use caudit_config::ReportFormat;
use clap::{Args, CommandFactory, Parser, Subcommand, error::ErrorKind};

/// Parses a report format name.
fn parse_format(s: &str) -> Result<ReportFormat, String> {
    s.parse()
}

/// Top-level CLI options.
#[derive(Parser)]
#[command(name = "caudit", version)]
#[command(about = "SEO content audit - sitemap crawl, webmaster metrics and gap analysis")]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Report output flag shared by commands that write reports.
#[derive(Args, Debug, Clone, Default)]
pub struct ReportArgs {
    /// Data report format: csv, json or both [default: from config]
    #[arg(short = 'o', long, value_parser = parse_format)]
    pub output: Option<ReportFormat>,

    /// Do not draw a progress bar
    #[arg(long)]
    pub no_progress: bool,
}

/// Arguments for `caudit full`.
#[derive(Args, Debug, Clone)]
pub struct FullCommand {
    #[command(flatten)]
    /// Report output flags.
    pub report: ReportArgs,

    /// Re-fetch every page, ignoring the page cache
    #[arg(long)]
    pub force_refresh: bool,
}

/// Arguments for `caudit update-webmaster`.
#[derive(Args, Debug, Clone)]
pub struct UpdateWebmasterCommand {
    #[command(flatten)]
    /// Report output flags.
    pub report: ReportArgs,
}

/// Arguments for `caudit sitemap`.
#[derive(Args, Debug, Clone)]
pub struct SitemapCommand {
    /// Output statistics as JSON
    #[arg(long)]
    pub json: bool,
}

/// Arguments for `caudit gaps`.
#[derive(Args, Debug, Clone)]
pub struct GapsCommand {
    /// Output the analysis as JSON
    #[arg(long)]
    pub json: bool,

    /// Rows shown per section [default: 20]
    #[arg(short = 'n', long)]
    pub limit: Option<usize>,
}

/// Arguments for `caudit init`.
#[derive(Args, Debug, Clone)]
pub struct InitCommand {
    /// Create global ~/.caudit.toml instead
    #[arg(long)]
    pub global: bool,

    /// Overwrite existing configuration file
    #[arg(long)]
    pub force: bool,
}

/// Supported `caudit` subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Run the full audit: sitemap, scrape, webmaster data, analyses, reports
    #[command(after_help = "\
STEPS:
  1. Fetch the sitemap and select pages by content type and URL patterns
  2. Scrape pages, reusing cached ones whose lastmod is unchanged
  3. Save the page cache
  4. Merge Yandex Webmaster and Search Console exports
  5. Run gap analyses and write reports

EXAMPLES:
  caudit full
  caudit full --output json
  caudit full --force-refresh")]
    Full(FullCommand),

    /// Fetch the sitemap and show URL statistics
    Sitemap(SitemapCommand),

    /// Re-merge webmaster exports into cached pages and rewrite reports
    UpdateWebmaster(UpdateWebmasterCommand),

    /// Run the gap analyses on cached pages and print the results
    Gaps(GapsCommand),

    /// Initialize caudit configuration in current directory
    Init(InitCommand),

    /// Show status and validate configuration
    Status,

    /// Show effective configuration settings
    Config,
}

impl Commands {
    /// False for commands that must work while the config file is broken.
    pub fn needs_config(&self) -> bool {
        !matches!(self, Self::Init(_))
    }
}

/// Parses CLI arguments, printing compact help for top-level `--help`.
pub fn parse_cli() -> Cli {
    match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            if e.kind() == ErrorKind::DisplayHelp && env::args().count() <= 2 {
                print_command_help();
                exit(0);
            }
            e.exit();
        }
    }
}

/// Prints the command list with one line per subcommand.
fn print_command_help() {
    let cmd = Cli::command();
    let about = cmd.get_about().map(|s| s.to_string()).unwrap_or_default();
    println!("{about}");
    println!();
    println!("Usage: caudit <COMMAND>");
    println!();
    println!("Commands:");
    for sub in cmd.get_subcommands() {
        let name = sub.get_name();
        if name == "help" {
            continue;
        }
        let about = sub.get_about().map(|s| s.to_string()).unwrap_or_default();
        println!("  {name:17} {about}");
    }
    println!(
        "  {:<17} Print this message or the help of the given subcommand(s)",
        "help"
    );
    println!();
    println!("Options:");
    println!("  -h, --help     Print help");
    println!("  -V, --version  Print version");
    println!();
    println!("Logging: set CAUDIT_LOG (e.g. CAUDIT_LOG=debug) to change verbosity.");
}
