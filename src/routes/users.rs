// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Member management: roster, account creation, roles, deletion.

use crate::error::{AppError, Result};
use crate::middleware::auth::AuthUser;
use crate::models::{Profile, Role};
use crate::services::{ModerationScope, NewAccount};
use crate::AppState;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, put},
    Extension, Json, Router,
};
use serde::Deserialize;
use std::sync::Arc;
use validator::{Validate, ValidationError};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users", get(list_users).post(create_user))
        .route("/api/users/{id}/role", put(update_role))
        .route("/api/users/{id}", delete(delete_user))
}

/// Login names: ASCII letters, digits, `.`, `_` and `-`. Ids also name
/// Firestore documents, so all-dot ids and `__x__` ids are out.
fn validate_user_id(id: &str) -> std::result::Result<(), ValidationError> {
    if !id
        .bytes()
        .all(|b| b.is_ascii_alphanumeric() || matches!(b, b'.' | b'_' | b'-'))
    {
        return Err(ValidationError::new("user_id_charset"));
    }
    if id.bytes().all(|b| b == b'.') || (id.starts_with("__") && id.ends_with("__")) {
        return Err(ValidationError::new("user_id_reserved"));
    }
    Ok(())
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateUserRequest {
    #[validate(length(min = 2, max = 64), custom(function = "validate_user_id"))]
    pub id: String,
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 4, max = 72))]
    pub password: String,
    pub role: Role,
    #[validate(length(max = 50))]
    pub age_category: Option<String>,
    #[validate(length(max = 20))]
    pub weight_class: Option<String>,
    #[validate(url)]
    pub avatar: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RoleRequest {
    pub role: Role,
}

/// Only a dev may hand out or take away the dev role.
fn check_dev_role(actor: &Profile, touched: Role) -> Result<()> {
    match (touched, actor.role) {
        (Role::Dev, Role::Dev) => Ok(()),
        (Role::Dev, _) => Err(AppError::Forbidden(
            "Only a dev can manage dev accounts".to_string(),
        )),
        _ => Ok(()),
    }
}

/// Admins and devs get every account; coaches get the athlete roster.
async fn list_users(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
) -> Result<Json<Vec<Profile>>> {
    let actor = &user.profile;
    let mut users = state.db.list_users().await?;

    let full_list = state
        .visibility
        .can_moderate_content(actor, ModerationScope::Users);
    if !full_list {
        if !actor.is_staff() {
            return Err(AppError::Forbidden(
                "Athletes cannot list club members".to_string(),
            ));
        }
        users.retain(|u| u.role == Role::Athlete);
    }

    users.sort_by(|a, b| a.name.cmp(&b.name).then_with(|| a.id.cmp(&b.id)));
    Ok(Json(users))
}

async fn create_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Json(request): Json<CreateUserRequest>,
) -> Result<(StatusCode, Json<Profile>)> {
    let actor = &user.profile;
    if !state
        .visibility
        .can_moderate_content(actor, ModerationScope::Users)
    {
        return Err(AppError::Forbidden(
            "Only admins manage accounts".to_string(),
        ));
    }
    check_dev_role(actor, request.role)?;
    request.validate()?;

    let profile = state
        .accounts
        .create(NewAccount {
            id: request.id,
            name: request.name.trim().to_string(),
            role: request.role,
            password: request.password,
            age_category: request.age_category,
            weight_class: request.weight_class,
            avatar: request.avatar,
        })
        .await?;

    tracing::info!(user_id = %profile.id, created_by = %actor.id, "Account created");
    Ok((StatusCode::CREATED, Json(profile)))
}

async fn update_role(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
    Json(request): Json<RoleRequest>,
) -> Result<Json<Profile>> {
    let actor = &user.profile;
    if !state
        .visibility
        .can_moderate_content(actor, ModerationScope::Users)
    {
        return Err(AppError::Forbidden(
            "Only admins manage accounts".to_string(),
        ));
    }
    if actor.id == id {
        return Err(AppError::Forbidden(
            "You cannot change your own role".to_string(),
        ));
    }

    let mut target = state
        .db
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", id)))?;

    check_dev_role(actor, target.role)?;
    check_dev_role(actor, request.role)?;

    let previous = target.role;
    target.role = request.role;
    state.db.upsert_user(&target).await?;

    tracing::info!(
        user_id = %target.id,
        from = %previous,
        to = %target.role,
        changed_by = %actor.id,
        "Role changed"
    );
    Ok(Json(target))
}

async fn delete_user(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<AuthUser>,
    Path(id): Path<String>,
) -> Result<StatusCode> {
    let actor = &user.profile;
    if !state
        .visibility
        .can_moderate_content(actor, ModerationScope::Users)
    {
        return Err(AppError::Forbidden(
            "Only admins manage accounts".to_string(),
        ));
    }

    let target = state
        .db
        .get_user(&id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("User {}", id)))?;

    if !state.visibility.can_delete_user(actor, &target) {
        return Err(AppError::Forbidden(
            "Dev accounts and your own account cannot be deleted".to_string(),
        ));
    }

    let removed = state.db.delete_user(&target.id).await?;
    tracing::info!(
        user_id = %target.id,
        deleted_by = %actor.id,
        documents = removed,
        "Account deleted"
    );

    Ok(StatusCode::NO_CONTENT)
}
