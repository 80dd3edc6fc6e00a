// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Result submission, history, statistics, and AI feedback.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{AthleteStats, CompetitionResult, EnrichedResult, Medal, Profile};
use crate::time_utils::now_rfc3339;
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post, put},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

/// Category used for feedback when neither the competition nor the athlete
/// has one.
const DEFAULT_FEEDBACK_CATEGORY: &str = "Senior";

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/results", get(list_results).post(create_result))
        .route("/api/results/{id}/notes", put(update_notes))
        .route("/api/results/{id}/analysis", post(request_analysis))
        .route("/api/stats", get(get_stats))
}

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    /// Whose history; defaults to the caller
    pub athlete_id: Option<String>,
    /// Restrict to one year ("YYYY")
    pub year: Option<String>,
}

impl HistoryQuery {
    fn year(&self) -> Result<Option<&str>> {
        match self.year.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(y) if y.len() == 4 && y.bytes().all(|b| b.is_ascii_digit()) => Ok(Some(y)),
            Some(y) => Err(AppError::BadRequest(format!("Invalid year '{}'", y))),
        }
    }
}

#[derive(Debug, Deserialize, Validate)]
pub struct ResultRequest {
    #[validate(length(min = 1, max = 100))]
    pub competition_id: String,
    #[validate(range(max = 100))]
    pub wins: u32,
    #[validate(range(max = 100))]
    pub losses: u32,
    #[serde(default)]
    pub medal: Medal,
    #[serde(default)]
    #[validate(length(max = 2000))]
    pub notes: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct NotesRequest {
    #[validate(length(max = 2000))]
    pub notes: String,
}

#[derive(Debug, Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct AnalysisResponse {
    pub analysis: String,
    /// False when the fallback text was returned and nothing was stored
    pub generated: bool,
}

/// Resolve whose results a request is about, enforcing that athletes only
/// look at their own.
fn target_athlete(state: &AppState, actor: &Profile, requested: Option<&str>) -> Result<String> {
    let athlete_id = requested
        .map(str::trim)
        .filter(|id| !id.is_empty())
        .unwrap_or(&actor.id);

    if !state.visibility.can_view_results_of(actor, athlete_id) {
        tracing::info!(user_id = %actor.id, athlete_id, "Result history access denied");
        return Err(AppError::Forbidden(
            "Athletes can only view their own results".to_string(),
        ));
    }
    Ok(athlete_id.to_string())
}

/// Load a result the actor may see. Other athletes' results answer 404.
async fn load_result(state: &AppState, actor: &Profile, id: &str) -> Result<CompetitionResult> {
    state
        .db
        .get_result(id)
        .await?
        .filter(|r| state.visibility.can_view_results_of(actor, &r.athlete_id))
        .ok_or_else(|| AppError::NotFound(format!("Result {}", id)))
}

async fn list_results(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<Vec<EnrichedResult>>> {
    let athlete_id = target_athlete(&state, &user.profile, query.athlete_id.as_deref())?;
    let year = query.year()?;

    let snapshot = state.db.snapshot().await?;
    let history = snapshot
        .history_for(&athlete_id)
        .into_iter()
        .filter(|r| year.is_none_or(|y| r.year() == Some(y)))
        .collect();

    Ok(Json(history))
}

async fn get_stats(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Query(query): Query<HistoryQuery>,
) -> Result<Json<AthleteStats>> {
    let athlete_id = target_athlete(&state, &user.profile, query.athlete_id.as_deref())?;
    let year = query.year()?;

    let snapshot = state.db.snapshot().await?;
    let history = snapshot.history_for(&athlete_id);

    Ok(Json(AthleteStats::from_results(&history, year)))
}

/// Record the caller's result for a competition.
async fn create_result(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<ResultRequest>,
) -> Result<(StatusCode, Json<EnrichedResult>)> {
    let athlete = &user.profile;
    if !state.visibility.can_compete(athlete) {
        return Err(AppError::Forbidden(
            "Only athletes record competition results".to_string(),
        ));
    }
    request.validate()?;

    let competition = state
        .db
        .get_competition(&request.competition_id)
        .await?
        .filter(|c| state.visibility.is_visible(athlete, c))
        .ok_or_else(|| AppError::NotFound(format!("Competition {}", request.competition_id)))?;

    let existing = state.db.results_for_athlete(&athlete.id).await?;
    if !state.visibility.can_enter(athlete, &competition, &existing) {
        return Err(AppError::Conflict(format!(
            "Already entered competition {}",
            competition.id
        )));
    }

    let result = CompetitionResult {
        id: CompetitionResult::document_id(&competition.id, &athlete.id),
        competition_id: competition.id.clone(),
        athlete_id: athlete.id.clone(),
        wins: request.wins,
        losses: request.losses,
        medal: request.medal,
        notes: request.notes.trim().to_string(),
        ai_analysis: None,
        created_at: now_rfc3339(),
    };

    // The store rejects a racing duplicate even after the check above.
    state.db.insert_result(&result).await?;

    Ok((
        StatusCode::CREATED,
        Json(EnrichedResult::new(result, Some(&competition))),
    ))
}

async fn update_notes(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<NotesRequest>,
) -> Result<Json<CompetitionResult>> {
    let actor = &user.profile;
    let mut result = load_result(&state, actor, &id).await?;

    if !state.visibility.can_edit_notes(actor, &result) {
        return Err(AppError::Forbidden(
            "Only the athlete can edit their notes".to_string(),
        ));
    }
    request.validate()?;

    result.notes = request.notes.trim().to_string();
    state.db.update_result(&result).await?;
    tracing::debug!(result_id = %result.id, "Notes updated");

    Ok(Json(result))
}

/// Ask for AI feedback on a result and keep it on the result when the model
/// produced any.
async fn request_analysis(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<Json<AnalysisResponse>> {
    let actor = &user.profile;
    let mut result = load_result(&state, actor, &id).await?;

    if !state.visibility.can_edit_notes(actor, &result) {
        return Err(AppError::Forbidden(
            "Only the athlete can request feedback on a result".to_string(),
        ));
    }

    let competition = state.db.get_competition(&result.competition_id).await?;
    let category = competition
        .as_ref()
        .and_then(|c| c.target_category.as_ref())
        .filter(|c| !c.is_blank())
        .or(actor.effective_category())
        .map(|c| c.as_str().to_string())
        .unwrap_or_else(|| DEFAULT_FEEDBACK_CATEGORY.to_string());

    let analysis = state
        .feedback
        .analyze(result.wins, result.losses, &result.notes, &category)
        .await;

    if analysis.is_generated() {
        result.ai_analysis = Some(analysis.text().to_string());
        state.db.update_result(&result).await?;
        tracing::info!(result_id = %result.id, "AI feedback stored");
    }

    Ok(Json(AnalysisResponse {
        analysis: analysis.text().to_string(),
        generated: analysis.is_generated(),
    }))
}
