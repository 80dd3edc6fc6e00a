// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Point-in-time view of the club's collections.
//!
//! Every permission decision is evaluated against a snapshot handed in by
//! the caller. A snapshot is never mutated; after a write, the next request
//! reads a fresh one.

use crate::models::{Competition, CompetitionResult, EnrichedResult, Registration};

#[derive(Debug, Clone, Default)]
pub struct Snapshot {
    /// Sorted by date, newest first
    pub competitions: Vec<Competition>,
    pub results: Vec<CompetitionResult>,
    pub registrations: Vec<Registration>,
}

impl Snapshot {
    /// Build a snapshot, applying the canonical ordering.
    pub fn new(
        mut competitions: Vec<Competition>,
        results: Vec<CompetitionResult>,
        registrations: Vec<Registration>,
    ) -> Self {
        competitions.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| a.id.cmp(&b.id)));
        Self {
            competitions,
            results,
            registrations,
        }
    }

    pub fn competition(&self, id: &str) -> Option<&Competition> {
        self.competitions.iter().find(|c| c.id == id)
    }

    /// All results recorded by one athlete.
    pub fn results_for<'a>(
        &'a self,
        athlete_id: &'a str,
    ) -> impl Iterator<Item = &'a CompetitionResult> + 'a {
        self.results.iter().filter(move |r| r.athlete_id == athlete_id)
    }

    /// The athlete's registration for a competition, if any.
    pub fn registration(&self, athlete_id: &str, competition_id: &str) -> Option<&Registration> {
        self.registrations
            .iter()
            .find(|r| r.athlete_id == athlete_id && r.competition_id == competition_id)
    }

    /// An athlete's history joined with competition details, newest first.
    pub fn history_for(&self, athlete_id: &str) -> Vec<EnrichedResult> {
        let mut history: Vec<EnrichedResult> = self
            .results_for(athlete_id)
            .map(|r| EnrichedResult::new(r.clone(), self.competition(&r.competition_id)))
            .collect();
        history.sort_by(|a, b| b.competition_date.cmp(&a.competition_date));
        history
    }
}
