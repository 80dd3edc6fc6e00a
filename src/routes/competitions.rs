// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Competition listing and management.
//!
//! A competition the viewer may not see answers 404, exactly like a missing
//! one, so restricted events do not leak through their IDs.

use crate::db::new_id;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AgeCategory, Competition, Profile, Visibility};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Extension, Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route(
            "/api/competitions",
            get(list_competitions).post(create_competition),
        )
        .route("/api/competitions/eligible", get(list_eligible))
        .route(
            "/api/competitions/{id}",
            get(get_competition).put(update_competition),
        )
}

/// Body for creating or replacing a competition.
#[derive(Debug, Deserialize, Validate)]
pub struct CompetitionRequest {
    #[validate(length(min = 1, max = 200))]
    pub name: String,
    #[validate(length(min = 1, max = 200))]
    pub location: String,
    pub date: NaiveDate,
    #[validate(length(max = 50))]
    pub target_category: Option<String>,
    #[serde(default)]
    pub visibility: Visibility,
    /// Users allowed to see a restricted competition; ignored when public.
    #[serde(default)]
    #[validate(length(max = 1000))]
    pub allowed_ids: Vec<String>,
}

impl CompetitionRequest {
    /// Build the stored competition. The allow-list is kept only for
    /// restricted competitions.
    fn into_competition(self, id: String, created_by: String) -> Competition {
        let allowed_ids = match self.visibility {
            Visibility::Public => None,
            Visibility::Restricted => Some(
                self.allowed_ids
                    .into_iter()
                    .map(|id| id.trim().to_string())
                    .filter(|id| !id.is_empty())
                    .collect(),
            ),
        };

        Competition {
            id,
            name: self.name.trim().to_string(),
            location: self.location.trim().to_string(),
            date: self.date,
            target_category: self
                .target_category
                .map(AgeCategory::new)
                .filter(|c| !c.is_blank()),
            visibility: self.visibility,
            allowed_ids,
            created_by,
        }
    }
}

/// Every allow-listed ID must name an existing user.
fn check_allow_list(competition: &Competition, users: &[Profile]) -> Result<()> {
    let Some(ids) = &competition.allowed_ids else {
        return Ok(());
    };

    let unknown: Vec<&str> = ids
        .iter()
        .filter(|id| !users.iter().any(|u| &u.id == *id))
        .map(String::as_str)
        .collect();
    if !unknown.is_empty() {
        return Err(AppError::BadRequest(format!(
            "Unknown users in allow-list: {}",
            unknown.join(", ")
        )));
    }
    Ok(())
}

/// Allow-lists name other members; only managers get to read them.
pub(crate) fn present(
    state: &AppState,
    viewer: &Profile,
    competition: &Competition,
) -> Competition {
    let mut competition = competition.clone();
    if !state.visibility.can_edit(viewer, &competition) {
        competition.allowed_ids = None;
    }
    competition
}

/// Load a competition the viewer may see (managers see all of them).
async fn load_visible(state: &AppState, viewer: &Profile, id: &str) -> Result<Competition> {
    let filter = &state.visibility;
    state
        .db
        .get_competition(id)
        .await?
        .filter(|c| filter.can_edit(viewer, c) || filter.is_visible(viewer, c))
        .ok_or_else(|| AppError::NotFound(format!("Competition {}", id)))
}

async fn list_competitions(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Competition>>> {
    let snapshot = state.db.snapshot().await?;
    let viewer = &user.profile;

    let competitions = state
        .visibility
        .visible_competitions(viewer, &snapshot)
        .into_iter()
        .map(|c| present(&state, viewer, c))
        .collect();

    Ok(Json(competitions))
}

/// Competitions the viewer can still submit a result for.
async fn list_eligible(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Competition>>> {
    let snapshot = state.db.snapshot().await?;
    let viewer = &user.profile;

    let competitions = state
        .visibility
        .enterable_competitions(viewer, &snapshot)
        .into_iter()
        .map(|c| present(&state, viewer, c))
        .collect();

    Ok(Json(competitions))
}

async fn get_competition(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<Competition>> {
    let competition = load_visible(&state, &user.profile, &id).await?;
    Ok(Json(present(&state, &user.profile, &competition)))
}

async fn create_competition(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CompetitionRequest>,
) -> Result<(StatusCode, Json<Competition>)> {
    let actor = &user.profile;
    let validated = request.validate();
    let competition = request.into_competition(new_id("c")?, actor.id.clone());

    if !state.visibility.can_edit(actor, &competition) {
        tracing::info!(user_id = %actor.id, "Competition creation denied");
        return Err(AppError::Forbidden(
            "Only coaches and admins manage competitions".to_string(),
        ));
    }
    validated?;
    check_allow_list(&competition, &state.db.list_users().await?)?;

    state.db.set_competition(&competition).await?;
    tracing::info!(
        competition_id = %competition.id,
        created_by = %actor.id,
        visibility = ?competition.visibility,
        "Competition created"
    );

    Ok((StatusCode::CREATED, Json(competition)))
}

async fn update_competition(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<CompetitionRequest>,
) -> Result<Json<Competition>> {
    let actor = &user.profile;
    let existing = load_visible(&state, actor, &id).await?;

    if !state.visibility.can_edit(actor, &existing) {
        tracing::info!(user_id = %actor.id, competition_id = %id, "Competition edit denied");
        return Err(AppError::Forbidden(
            "Only coaches and admins manage competitions".to_string(),
        ));
    }
    request.validate()?;

    let competition = request.into_competition(existing.id, existing.created_by);
    check_allow_list(&competition, &state.db.list_users().await?)?;

    state.db.set_competition(&competition).await?;
    tracing::info!(competition_id = %competition.id, updated_by = %actor.id, "Competition updated");

    Ok(Json(competition))
}
