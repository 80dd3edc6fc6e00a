// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Event registration model.

use crate::models::Competition;
use serde::{Deserialize, Serialize};
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Attendance answer for a registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationStatus {
    Yes,
    No,
    #[default]
    Pending,
}

/// An athlete's sign-up for an upcoming competition.
///
/// Stored at: `registrations/{competition_id}_{athlete_id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Registration {
    pub id: String,
    pub competition_id: String,
    pub athlete_id: String,
    #[serde(default)]
    pub status: RegistrationStatus,
    /// Weight the athlete declared when joining (e.g. "-73kg")
    #[serde(default)]
    pub declared_weight: Option<String>,
    #[serde(default)]
    pub registered_at: String,
}

impl Registration {
    /// Document ID for a (competition, athlete) pair.
    pub fn document_id(competition_id: &str, athlete_id: &str) -> String {
        format!("{}_{}", competition_id, athlete_id)
    }
}

/// A competition on the dashboard, with the viewer's own registration.
#[derive(Debug, Clone, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct UpcomingCompetition {
    #[serde(flatten)]
    pub competition: Competition,
    pub registration: Option<Registration>,
}
