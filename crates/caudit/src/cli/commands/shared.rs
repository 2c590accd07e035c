//! Steps shared by the report-writing commands.

use std::{fmt::Display, process::ExitCode};

use caudit_analysis::{AuditAnalysis, Normalizer, PageRecord, QuerySet, analyze};
use caudit_config::ReportFormat;
use caudit_report::ReportPaths;
use caudit_webmaster::EnrichSummary;

use crate::cli::{
    context::CommandContext,
    output::{dim, subheader},
};

/// Prints `error: {err}` and returns the failure code.
pub fn fail(err: impl Display) -> ExitCode {
    eprintln!("error: {err}");
    ExitCode::FAILURE
}

/// Runs the gap analyses with the configured thresholds.
pub fn run_analysis(
    ctx: &CommandContext,
    normalizer: &mut Normalizer,
    pages: &[PageRecord],
    queries: &QuerySet,
) -> AuditAnalysis {
    analyze(normalizer, pages, queries, &ctx.config.analysis.params())
}

/// Writes the dated reports and, when enabled, refreshes the `latest` links.
pub fn write_reports(
    ctx: &CommandContext,
    pages: &[PageRecord],
    analysis: &AuditAnalysis,
    format: ReportFormat,
) -> Result<ReportPaths, ExitCode> {
    let writer = ctx.report_writer();
    let paths = writer
        .write_all(pages, Some(analysis), format)
        .map_err(fail)?;
    if ctx.config.report.latest_symlinks {
        writer.update_latest_links(&paths);
    }
    Ok(paths)
}

/// Prints what was merged from the webmaster exports.
pub fn print_enrichment(pages: usize, summary: EnrichSummary) {
    println!(
        "   Webmaster data: {} of {pages} pages matched {}",
        summary.matched,
        dim(&format!(
            "(Yandex {}, GSC {})",
            summary.with_yandex, summary.with_gsc
        ))
    );
}

/// Prints the analysis counts and the written report files.
pub fn print_results(analysis: &AuditAnalysis, paths: &ReportPaths) {
    println!("   Keyword gaps: {}", analysis.keyword_gaps.len());
    println!("   CTR candidates: {}", analysis.ctr_candidates.len());
    println!("   Cannibalization groups: {}", analysis.cannibalization.len());
    println!();
    println!("{}", subheader("Reports:"));
    for path in paths.all() {
        println!("   {}", path.display());
    }
}
