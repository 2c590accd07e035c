//! CTR optimization candidates.
//!
//! A page qualifies when its observed click-through rate falls well short of what its average
//! search position would normally earn, and closing that gap would bring a meaningful number of
//! extra clicks.

use serde::Serialize;

use crate::PageRecord;

/// A page qualifies when its CTR is below this share of the expected CTR.
pub const CTR_UNDERPERFORMANCE_RATIO: f64 = 0.7;

/// A page qualifies only when more than this many clicks are at stake.
pub const MIN_POTENTIAL_CLICKS: i64 = 5;

/// Position assumed when neither source reports one.
pub const DEFAULT_POSITION: f64 = 20.0;

/// Maximum title length carried into a candidate, in characters.
const TITLE_LIMIT: usize = 80;

/// Expected CTR (percent) for positions 1 through 10.
const EXPECTED_CTR_BY_POSITION: [f64; 10] = [28.0, 15.0, 11.0, 8.0, 7.0, 5.0, 4.0, 3.0, 2.5, 2.0];

/// A page that under-performs its position.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CtrCandidate {
    /// Page URL.
    pub url: String,
    /// Page title, truncated.
    pub title: String,
    /// Impressions over both sources.
    pub impressions: u64,
    /// Clicks over both sources.
    pub clicks: u64,
    /// Observed CTR, percent, two decimals.
    pub current_ctr: f64,
    /// Average position, one decimal.
    pub position: f64,
    /// CTR the position normally earns, percent.
    pub expected_ctr: f64,
    /// Extra clicks at the expected CTR.
    pub potential_clicks: i64,
}

/// Expected CTR for an average position.
///
/// Positions past 10 use the position-10 value; positions below 1 use the position-1 value.
pub fn expected_ctr(position: f64) -> f64 {
    let bucket = (position.floor() as i64).clamp(1, 10);
    EXPECTED_CTR_BY_POSITION[(bucket - 1) as usize]
}

/// Average position across sources, falling back to [`DEFAULT_POSITION`].
fn average_position(page: &PageRecord) -> f64 {
    match (page.yandex.known_position(), page.gsc.known_position()) {
        (Some(y), Some(g)) => (y + g) / 2.0,
        (Some(p), None) | (None, Some(p)) => p,
        (None, None) => DEFAULT_POSITION,
    }
}

/// Rounds to the given number of decimals.
fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Truncates to at most `limit` characters.
pub fn truncate_chars(text: &str, limit: usize) -> String {
    text.chars().take(limit).collect()
}

/// Evaluates one page; `None` when it does not qualify.
fn evaluate(page: &PageRecord, min_impressions: u64) -> Option<CtrCandidate> {
    let impressions = page.total_impressions();
    let clicks = page.total_clicks();
    if impressions < min_impressions || impressions == 0 {
        return None;
    }

    let position = average_position(page);
    let current = clicks as f64 / impressions as f64 * 100.0;
    let expected = expected_ctr(position);
    if current >= expected * CTR_UNDERPERFORMANCE_RATIO {
        return None;
    }

    let potential = (impressions as f64 * expected / 100.0).floor() as i64 - clicks as i64;
    if potential <= MIN_POTENTIAL_CLICKS {
        return None;
    }

    Some(CtrCandidate {
        url: page.url.clone(),
        title: truncate_chars(page.title_or_empty(), TITLE_LIMIT),
        impressions,
        clicks,
        current_ctr: round_to(current, 2),
        position: round_to(position, 1),
        expected_ctr: expected,
        potential_clicks: potential,
    })
}

/// Finds pages whose CTR is well below the expectation for their position.
///
/// Results are ordered by potential clicks, descending; ties keep page order.
pub fn find_ctr_candidates(
    pages: &[PageRecord],
    min_impressions: u64,
    max_results: usize,
) -> Vec<CtrCandidate> {
    let mut candidates: Vec<CtrCandidate> = pages
        .iter()
        .filter_map(|page| evaluate(page, min_impressions))
        .collect();

    candidates.sort_by(|a, b| b.potential_clicks.cmp(&a.potential_clicks));
    candidates.truncate(max_results);
    candidates
}
