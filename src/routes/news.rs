// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Club news board.

use crate::db::new_id;
use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::NewsItem;
use crate::services::ModerationScope;
use crate::time_utils::today;
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/news", get(list_news).post(create_news))
        .route("/api/news/{id}", delete(delete_news))
}

#[derive(Debug, Deserialize, Validate)]
pub struct NewsRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(min = 1, max = 10000))]
    pub content: String,
    #[validate(url)]
    pub image_url: Option<String>,
}

/// All news, newest first.
async fn list_news(State(state): State<Arc<AppState>>) -> Result<Json<Vec<NewsItem>>> {
    let mut news = state.db.list_news().await?;
    news.sort_by(|a, b| b.date.cmp(&a.date).then_with(|| b.id.cmp(&a.id)));
    Ok(Json(news))
}

async fn create_news(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<NewsRequest>,
) -> Result<(StatusCode, Json<NewsItem>)> {
    let actor = &user.profile;
    if !state
        .visibility
        .can_moderate_content(actor, ModerationScope::News)
    {
        return Err(AppError::Forbidden(
            "Only coaches and admins publish news".to_string(),
        ));
    }
    request.validate()?;

    let item = NewsItem {
        id: new_id("n")?,
        title: request.title.trim().to_string(),
        content: request.content,
        date: today(),
        author: actor.name.clone(),
        image_url: request.image_url.filter(|u| !u.trim().is_empty()),
    };

    state.db.insert_news(&item).await?;
    tracing::info!(news_id = %item.id, author = %actor.id, "News published");

    Ok((StatusCode::CREATED, Json(item)))
}

async fn delete_news(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let actor = &user.profile;
    if !state
        .visibility
        .can_moderate_content(actor, ModerationScope::News)
    {
        return Err(AppError::Forbidden(
            "Only coaches and admins remove news".to_string(),
        ));
    }

    if state.db.get_news(&id).await?.is_none() {
        return Err(AppError::NotFound(format!("News item {}", id)));
    }

    state.db.delete_news(&id).await?;
    tracing::info!(news_id = %id, removed_by = %actor.id, "News removed");

    Ok(StatusCode::NO_CONTENT)
}
