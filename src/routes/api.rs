// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Current-user route.

use crate::error::Result;
use crate::middleware::auth::AuthUser;
use crate::models::Profile;
use crate::services::ModerationScope;
use crate::AppState;
use axum::{extract::State, routing::get, Extension, Json, Router};
use serde::Serialize;
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// The auth middleware is applied in routes/mod.rs for these routes.
pub fn routes() -> Router<Arc<AppState>> {
    Router::new().route("/api/me", get(get_me))
}

/// What the frontend may offer the current user.
#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct Permissions {
    pub manage_competitions: bool,
    pub moderate_news: bool,
    pub moderate_users: bool,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct MeResponse {
    pub user: Profile,
    pub permissions: Permissions,
}

async fn get_me(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<MeResponse>> {
    let filter = &state.visibility;
    let profile = user.profile;

    let permissions = Permissions {
        manage_competitions: profile.is_staff(),
        moderate_news: filter.can_moderate_content(&profile, ModerationScope::News),
        moderate_users: filter.can_moderate_content(&profile, ModerationScope::Users),
    };

    Ok(Json(MeResponse {
        user: profile,
        permissions,
    }))
}
