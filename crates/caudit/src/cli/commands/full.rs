//! Implementation of `caudit full`.

use std::{process::ExitCode, time::Duration};

use caudit_crawl::{
    CrawlOptions, Crawler, HttpFetcher, PageCache, fetch_sitemap, select_entries,
};
use tracing::info;

use super::shared::{fail, print_enrichment, print_results, run_analysis, write_reports};
use crate::cli::{args::FullCommand, context::CommandContext, output::header};

/// Runs the complete audit pipeline.
pub fn run(ctx: &CommandContext, cmd: &FullCommand) -> ExitCode {
    match execute(ctx, cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

/// Sitemap, scrape, cache, enrich, analyze, report.
fn execute(ctx: &CommandContext, cmd: &FullCommand) -> Result<(), ExitCode> {
    ctx.require_domain()?;
    let sitemap_url = ctx.require_sitemap_url()?;
    ctx.init_logging();
    let config = &ctx.config;
    let filter = config.url_filter().map_err(fail)?;
    // Built before the crawl so a bad lemmatizer setting fails fast.
    let mut normalizer = ctx.normalizer()?;

    let fetcher = HttpFetcher::from_settings(&config.site).map_err(fail)?;
    let entries = fetch_sitemap(&fetcher, &sitemap_url).map_err(fail)?;
    let selected = select_entries(&entries, &filter);
    info!(
        total = entries.len(),
        selected = selected.len(),
        "selected pages for audit"
    );

    let cache = PageCache::load_or_empty(ctx.cache_file());
    let options = CrawlOptions {
        delay: Duration::from_millis(config.site.request_delay_ms),
        keywords_per_page: config.analysis.keywords_per_page,
        force_refresh: cmd.force_refresh,
        progress: !cmd.report.no_progress,
    };
    let crawler = Crawler::new(&fetcher, options).map_err(fail)?;
    let (mut pages, crawl) = crawler.crawl(&selected, &cache);

    PageCache::from_pages(pages.iter().cloned())
        .save(ctx.cache_file())
        .map_err(fail)?;

    let webmaster = ctx.webmaster_data()?;
    let enrichment = webmaster.metrics.enrich(&mut pages);
    let analysis = run_analysis(ctx, &mut normalizer, &pages, &webmaster.queries);
    let paths = write_reports(ctx, &pages, &analysis, ctx.report_format(cmd.report.output))?;

    println!("{}", header("Audit complete"));
    println!(
        "   Sitemap: {} URLs, {} selected",
        entries.len(),
        selected.len()
    );
    println!(
        "   Pages: {} fetched, {} from cache, {} failed",
        crawl.fetched, crawl.reused, crawl.failed
    );
    print_enrichment(pages.len(), enrichment);
    print_results(&analysis, &paths);
    Ok(())
}
