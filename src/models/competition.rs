// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Competition (club event) model.

use crate::models::AgeCategory;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Who may see a competition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Visibility {
    /// Every authenticated user
    #[default]
    Public,
    /// Only the users on the allow-list
    Restricted,
}

/// Competition stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Competition {
    /// Document ID
    pub id: String,
    /// Title (e.g. "Gran Prix Torino")
    pub name: String,
    pub location: String,
    /// Competition day
    #[cfg_attr(feature = "binding-generation", ts(type = "string"))]
    pub date: chrono::NaiveDate,
    /// Intended age category, if any
    #[serde(default)]
    pub target_category: Option<AgeCategory>,
    #[serde(default)]
    pub visibility: Visibility,
    /// User IDs allowed to see a restricted competition.
    /// Older documents may lack the field; absent reads as empty.
    #[serde(default)]
    pub allowed_ids: Option<BTreeSet<String>>,
    /// User ID of the coach/admin who created it
    #[serde(default)]
    pub created_by: String,
}

impl Competition {
    /// Whether `user_id` is on the allow-list (absent list never matches).
    pub fn allows(&self, user_id: &str) -> bool {
        self.allowed_ids
            .as_ref()
            .is_some_and(|ids| ids.contains(user_id))
    }
}
