// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Competition result model.

use crate::models::Competition;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Medal won at a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Medal {
    Gold,
    Silver,
    Bronze,
    #[default]
    None,
}

/// An athlete's outcome at one competition.
///
/// Stored at: `results/{competition_id}_{athlete_id}`, so the store itself
/// rejects a second result for the same pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct CompetitionResult {
    pub id: String,
    pub competition_id: String,
    pub athlete_id: String,
    pub wins: u32,
    pub losses: u32,
    #[serde(default)]
    pub medal: Medal,
    /// Athlete's own reflection
    #[serde(default)]
    pub notes: String,
    /// Generated coach feedback, once requested
    #[serde(default)]
    pub ai_analysis: Option<String>,
    #[serde(default)]
    pub created_at: String,
}

impl CompetitionResult {
    /// Document ID for a (competition, athlete) pair.
    pub fn document_id(competition_id: &str, athlete_id: &str) -> String {
        format!("{}_{}", competition_id, athlete_id)
    }
}

/// Result joined with its competition for history views.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct EnrichedResult {
    #[serde(flatten)]
    pub result: CompetitionResult,
    pub competition_name: String,
    /// Empty if the competition no longer exists
    pub competition_date: String,
    pub competition_location: String,
    pub competition_category: Option<String>,
}

const UNKNOWN_COMPETITION: &str = "Unknown competition";

impl EnrichedResult {
    pub fn new(result: CompetitionResult, competition: Option<&Competition>) -> Self {
        match competition {
            Some(c) => Self {
                result,
                competition_name: c.name.clone(),
                competition_date: c.date.format("%Y-%m-%d").to_string(),
                competition_location: c.location.clone(),
                competition_category: c.target_category.as_ref().map(|t| t.0.clone()),
            },
            None => Self {
                result,
                competition_name: UNKNOWN_COMPETITION.to_string(),
                competition_date: String::new(),
                competition_location: String::new(),
                competition_category: None,
            },
        }
    }

    /// "YYYY" of the competition date, if known.
    pub fn year(&self) -> Option<&str> {
        self.competition_date.get(..4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn result() -> CompetitionResult {
        CompetitionResult {
            id: CompetitionResult::document_id("c1", "u1"),
            competition_id: "c1".to_string(),
            athlete_id: "u1".to_string(),
            wins: 3,
            losses: 1,
            medal: Medal::Silver,
            notes: "Good grips".to_string(),
            ai_analysis: None,
            created_at: String::new(),
        }
    }

    #[test]
    fn test_document_id_combines_pair() {
        assert_eq!(CompetitionResult::document_id("c1", "u1"), "c1_u1");
    }

    #[test]
    fn test_enriched_result_for_missing_competition() {
        let enriched = EnrichedResult::new(result(), None);
        assert_eq!(enriched.competition_name, "Unknown competition");
        assert_eq!(enriched.year(), None);
    }

    #[test]
    fn test_enriched_result_serializes_flat() {
        let json = serde_json::to_value(EnrichedResult::new(result(), None)).unwrap();
        assert_eq!(json["wins"], 3);
        assert_eq!(json["medal"], "silver");
        assert_eq!(json["competition_name"], "Unknown competition");
    }
}
