//! Implementation of `caudit update-webmaster`.

use std::process::ExitCode;

use caudit_crawl::PageCache;

use super::shared::{fail, print_enrichment, print_results, run_analysis, write_reports};
use crate::cli::{args::UpdateWebmasterCommand, context::CommandContext, output::header};

/// Re-merges webmaster exports into the cached pages and rewrites the reports.
pub fn run(ctx: &CommandContext, cmd: &UpdateWebmasterCommand) -> ExitCode {
    match execute(ctx, cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

/// Cache, enrich, save, analyze, report.
fn execute(ctx: &CommandContext, cmd: &UpdateWebmasterCommand) -> Result<(), ExitCode> {
    let cache = ctx.require_cache()?;
    ctx.init_logging();
    let mut normalizer = ctx.normalizer()?;

    let mut pages = cache.into_pages();
    let webmaster = ctx.webmaster_data()?;
    let enrichment = webmaster.metrics.enrich(&mut pages);
    PageCache::from_pages(pages.iter().cloned())
        .save(ctx.cache_file())
        .map_err(fail)?;

    let analysis = run_analysis(ctx, &mut normalizer, &pages, &webmaster.queries);
    let paths = write_reports(ctx, &pages, &analysis, ctx.report_format(cmd.report.output))?;

    println!("{}", header("Webmaster data updated"));
    println!("   Cached pages: {}", pages.len());
    print_enrichment(pages.len(), enrichment);
    print_results(&analysis, &paths);
    Ok(())
}
