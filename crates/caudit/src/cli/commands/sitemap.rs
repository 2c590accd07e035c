//! Implementation of `caudit sitemap`.

use std::process::ExitCode;

use caudit_crawl::{HttpFetcher, SitemapStats, fetch_sitemap};

use super::shared::fail;
use crate::cli::{
    args::SitemapCommand,
    context::CommandContext,
    output::{dim, header, sitemap_table},
};

/// Fetches the sitemap and prints URL statistics.
pub fn run(ctx: &CommandContext, cmd: &SitemapCommand) -> ExitCode {
    match execute(ctx, cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

/// Fetches, classifies and prints.
fn execute(ctx: &CommandContext, cmd: &SitemapCommand) -> Result<(), ExitCode> {
    let sitemap_url = ctx.require_sitemap_url()?;
    ctx.init_console_logging();
    let filter = ctx.config.url_filter().map_err(fail)?;
    let fetcher = HttpFetcher::from_settings(&ctx.config.site).map_err(fail)?;
    let entries = fetch_sitemap(&fetcher, &sitemap_url).map_err(fail)?;
    let stats = SitemapStats::compute(&entries, &filter);

    if cmd.json {
        let json = serde_json::to_string_pretty(&stats.to_json()).map_err(fail)?;
        println!("{json}");
        return Ok(());
    }

    println!("{} {}", header("Sitemap"), dim(&sitemap_url));
    println!("{}", sitemap_table(&stats));
    Ok(())
}
