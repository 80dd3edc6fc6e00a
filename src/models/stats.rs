//! Athlete performance aggregates for the dashboard.
//!
//! Computed on demand from a set of enriched results; nothing here is
//! stored.

use serde::Serialize;
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::models::{EnrichedResult, Medal};

/// Win/loss and medal totals over a set of results.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AthleteStats {
    // ─── Matches ─────────────────────────────────────────────────
    pub total_matches: u32,
    pub total_wins: u32,
    pub total_losses: u32,
    /// Rounded percentage of matches won (0 with no matches)
    pub win_rate: u32,

    // ─── Medals ──────────────────────────────────────────────────
    pub gold: u32,
    pub silver: u32,
    pub bronze: u32,

    // ─── Filtering ───────────────────────────────────────────────
    /// Number of competitions counted
    pub competitions: u32,
    /// Years present in the unfiltered history, most recent first
    pub available_years: Vec<String>,
}

impl AthleteStats {
    /// Aggregate `results`, optionally restricted to one year ("YYYY").
    ///
    /// `available_years` always reflects the full input so a client can
    /// offer the other years as filters.
    pub fn from_results(results: &[EnrichedResult], year: Option<&str>) -> Self {
        let available: BTreeSet<&str> = results.iter().filter_map(|r| r.year()).collect();
        let mut stats = Self {
            available_years: available.into_iter().rev().map(String::from).collect(),
            ..Self::default()
        };

        for enriched in results
            .iter()
            .filter(|r| year.is_none_or(|y| r.year() == Some(y)))
        {
            let result = &enriched.result;
            stats.competitions += 1;
            stats.total_wins = stats.total_wins.saturating_add(result.wins);
            stats.total_losses = stats.total_losses.saturating_add(result.losses);

            match result.medal {
                Medal::Gold => stats.gold += 1,
                Medal::Silver => stats.silver += 1,
                Medal::Bronze => stats.bronze += 1,
                Medal::None => {}
            }
        }

        stats.total_matches = stats.total_wins.saturating_add(stats.total_losses);
        stats.win_rate = win_rate(stats.total_wins, stats.total_matches);
        stats
    }
}

/// Percentage of `wins` over `matches`, rounded half up.
fn win_rate(wins: u32, matches: u32) -> u32 {
    if matches == 0 {
        return 0;
    }
    ((u64::from(wins) * 100 + u64::from(matches) / 2) / u64::from(matches)) as u32
}
