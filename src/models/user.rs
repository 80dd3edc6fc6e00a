// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! User profile model for storage and API.

use serde::{Deserialize, Serialize};
use std::fmt;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Club role. Drives every permission decision in `services::visibility`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Athlete,
    Coach,
    Admin,
    Dev,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Athlete => "athlete",
            Role::Coach => "coach",
            Role::Admin => "admin",
            Role::Dev => "dev",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Coarse age classification (e.g. "Cadetti", "Junior", "Senior").
///
/// Free-form on purpose: clubs name their categories differently. Comparison
/// ignores surrounding whitespace and ASCII case.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
#[serde(transparent)]
pub struct AgeCategory(pub String);

impl AgeCategory {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// An empty or whitespace-only category carries no information.
    pub fn is_blank(&self) -> bool {
        self.0.trim().is_empty()
    }
}

impl PartialEq for AgeCategory {
    fn eq(&self, other: &Self) -> bool {
        self.0.trim().eq_ignore_ascii_case(other.0.trim())
    }
}

impl Eq for AgeCategory {}

/// User profile stored in Firestore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Profile {
    /// Login name (also used as document ID)
    pub id: String,
    /// Display name
    pub name: String,
    pub role: Role,
    #[serde(default)]
    pub age_category: Option<AgeCategory>,
    /// Weight class (e.g. "-73kg")
    #[serde(default)]
    pub weight_class: Option<String>,
    /// Avatar image URL
    #[serde(default)]
    pub avatar: Option<String>,
    /// When the profile was created (RFC3339)
    #[serde(default)]
    pub created_at: String,
}

impl Profile {
    /// Staff roles manage competitions and see every athlete's results.
    pub fn is_staff(&self) -> bool {
        match self.role {
            Role::Coach | Role::Admin | Role::Dev => true,
            Role::Athlete => false,
        }
    }

    /// Category that actually constrains anything (blank counts as absent).
    pub fn effective_category(&self) -> Option<&AgeCategory> {
        self.age_category.as_ref().filter(|c| !c.is_blank())
    }
}

/// Login secret, kept out of the profile document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserCredentials {
    /// bcrypt hash of the password
    pub password_hash: String,
    /// When the password was last set (RFC3339)
    pub updated_at: String,
    /// Random key bound into session tokens. A recreated account gets a
    /// new one, so tokens issued to an earlier holder of the id stop working.
    #[serde(default)]
    pub session_key: String,
}
