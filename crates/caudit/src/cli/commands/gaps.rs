//! Implementation of `caudit gaps`.

use std::process::ExitCode;

use caudit_analysis::AuditAnalysis;

use super::shared::{fail, run_analysis};
use crate::cli::{
    args::GapsCommand,
    context::CommandContext,
    output::{cannibalization_table, ctr_table, dim, gaps_table, header},
};

/// Rows per section when `--limit` is not given.
const DEFAULT_LIMIT: usize = 20;

/// Runs the analyses on cached pages and prints the results.
pub fn run(ctx: &CommandContext, cmd: &GapsCommand) -> ExitCode {
    match execute(ctx, cmd) {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => code,
    }
}

/// Loads cache and exports, enriches in memory, prints.
fn execute(ctx: &CommandContext, cmd: &GapsCommand) -> Result<(), ExitCode> {
    let cache = ctx.require_cache()?;
    ctx.init_console_logging();
    let mut normalizer = ctx.normalizer()?;

    let mut pages = cache.into_pages();
    let webmaster = ctx.webmaster_data()?;
    webmaster.metrics.enrich(&mut pages);
    let analysis = run_analysis(ctx, &mut normalizer, &pages, &webmaster.queries);

    if cmd.json {
        let json = serde_json::to_string_pretty(&analysis).map_err(fail)?;
        println!("{json}");
    } else {
        print_tables(&analysis, cmd.limit.unwrap_or(DEFAULT_LIMIT));
    }
    Ok(())
}

/// Prints one table per analysis, skipping empty ones.
fn print_tables(analysis: &AuditAnalysis, limit: usize) {
    let counts = analysis.query_counts;
    println!(
        "{} {}",
        header("Keyword gaps"),
        dim(&format!(
            "({} found; queries: Yandex {}, GSC {})",
            analysis.keyword_gaps.len(),
            counts.yandex,
            counts.gsc
        ))
    );
    if analysis.keyword_gaps.is_empty() {
        println!("   {}", dim("(none)"));
    } else {
        println!("{}", gaps_table(&analysis.keyword_gaps, limit));
    }
    println!();

    println!(
        "{} {}",
        header("CTR candidates"),
        dim(&format!("({} found)", analysis.ctr_candidates.len()))
    );
    if analysis.ctr_candidates.is_empty() {
        println!("   {}", dim("(none)"));
    } else {
        println!("{}", ctr_table(&analysis.ctr_candidates, limit));
    }
    println!();

    println!(
        "{} {}",
        header("Cannibalization"),
        dim(&format!("({} groups)", analysis.cannibalization.len()))
    );
    if analysis.cannibalization.is_empty() {
        println!("   {}", dim("(none)"));
    } else {
        println!("{}", cannibalization_table(&analysis.cannibalization, limit));
    }
}
