// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Upcoming events and event registration.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Profile, Registration, RegistrationStatus, UpcomingCompetition};
use crate::routes::competitions::present;
use crate::time_utils::{current_date, now_rfc3339};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/competitions/upcoming", get(list_upcoming))
        .route(
            "/api/competitions/{id}/registration",
            post(join_competition),
        )
        .route("/api/registrations", get(list_registrations))
        .route("/api/registrations/{id}/status", put(update_status))
}

#[derive(Debug, Deserialize, Validate)]
pub struct JoinRequest {
    #[validate(length(min = 1, max = 20))]
    pub declared_weight: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub status: RegistrationStatus,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationQuery {
    pub competition_id: Option<String>,
}

/// Upcoming competitions with the caller's own registration attached.
async fn list_upcoming(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<UpcomingCompetition>>> {
    let snapshot = state.db.snapshot().await?;
    let viewer = &user.profile;

    let upcoming = state
        .visibility
        .upcoming_competitions(viewer, &snapshot, current_date())
        .into_iter()
        .map(|c| UpcomingCompetition {
            competition: present(&state, viewer, c),
            registration: snapshot.registration(&viewer.id, &c.id).cloned(),
        })
        .collect();

    Ok(Json(upcoming))
}

/// Sign the caller up for a competition with their declared weight.
async fn join_competition(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<JoinRequest>,
) -> Result<(StatusCode, Json<Registration>)> {
    let athlete = &user.profile;
    if !state.visibility.can_compete(athlete) {
        return Err(AppError::Forbidden(
            "Only athletes register for competitions".to_string(),
        ));
    }

    let competition = state
        .db
        .get_competition(&id)
        .await?
        .filter(|c| state.visibility.is_visible(athlete, c))
        .ok_or_else(|| AppError::NotFound(format!("Competition {}", id)))?;

    request.validate()?;
    let declared_weight = request.declared_weight.trim();
    if declared_weight.is_empty() {
        return Err(AppError::BadRequest(
            "Declared weight is required".to_string(),
        ));
    }

    let today = current_date();
    if competition.date < today {
        return Err(AppError::BadRequest(format!(
            "Competition {} has already taken place",
            competition.id
        )));
    }

    let existing = state.db.registrations_for_athlete(&athlete.id).await?;
    if !state
        .visibility
        .can_register(athlete, &competition, &existing, today)
    {
        return Err(AppError::Conflict(format!(
            "Already registered for competition {}",
            competition.id
        )));
    }

    let registration = Registration {
        id: Registration::document_id(&competition.id, &athlete.id),
        competition_id: competition.id.clone(),
        athlete_id: athlete.id.clone(),
        status: RegistrationStatus::Pending,
        declared_weight: Some(declared_weight.to_string()),
        registered_at: now_rfc3339(),
    };

    // The store rejects a racing duplicate even after the check above.
    state.db.insert_registration(&registration).await?;
    tracing::info!(
        athlete_id = %athlete.id,
        competition_id = %competition.id,
        "Registration created"
    );

    Ok((StatusCode::CREATED, Json(registration)))
}

/// Athletes get their own registrations; managers get everyone's.
async fn list_registrations(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<RegistrationQuery>,
) -> Result<Json<Vec<Registration>>> {
    let actor = &user.profile;
    let mut registrations = if actor.is_staff() {
        state.db.list_registrations().await?
    } else {
        state.db.registrations_for_athlete(&actor.id).await?
    };

    if let Some(competition_id) = query.competition_id.as_deref().map(str::trim) {
        if !competition_id.is_empty() {
            registrations.retain(|r| r.competition_id == competition_id);
        }
    }

    registrations.sort_by(|a, b| {
        a.competition_id
            .cmp(&b.competition_id)
            .then_with(|| a.athlete_id.cmp(&b.athlete_id))
    });
    Ok(Json(registrations))
}

/// Load a registration the actor may change. Anyone else's answers 404.
async fn load_registration(state: &AppState, actor: &Profile, id: &str) -> Result<Registration> {
    state
        .db
        .get_registration(id)
        .await?
        .filter(|r| state.visibility.can_update_registration(actor, r))
        .ok_or_else(|| AppError::NotFound(format!("Registration {}", id)))
}

async fn update_status(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<Registration>> {
    let actor = &user.profile;
    let mut registration = load_registration(&state, actor, &id).await?;

    registration.status = request.status;
    state.db.update_registration(&registration).await?;
    tracing::info!(
        registration_id = %registration.id,
        status = ?registration.status,
        changed_by = %actor.id,
        "Registration status changed"
    );

    Ok(Json(registration))
}
