// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Data models for the application.

pub mod competition;
pub mod news;
pub mod registration;
pub mod result;
pub mod snapshot;
pub mod stats;
pub mod user;

pub use competition::{Competition, Visibility};
pub use news::NewsItem;
pub use registration::{Registration, RegistrationStatus, UpcomingCompetition};
pub use result::{CompetitionResult, EnrichedResult, Medal};
pub use snapshot::Snapshot;
pub use stats::AthleteStats;
pub use user::{AgeCategory, Profile, Role, UserCredentials};
