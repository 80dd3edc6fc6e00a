// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Password login and logout.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use validator::Validate;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;

use crate::error::{AppError, Result};
use crate::middleware::auth::{create_jwt, SESSION_COOKIE, SESSION_TTL_SECS};
use crate::models::Profile;
use crate::services::Login;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/auth/login", post(login))
        .route("/auth/logout", post(logout))
}

#[derive(Debug, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(length(min = 1, max = 64))]
    pub user_id: String,
    #[validate(length(min = 1, max = 72))]
    pub password: String,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct LoginResponse {
    pub token: String,
    pub user: Profile,
}

/// Session cookies are `Secure` unless the frontend is served over plain
/// HTTP (local development).
fn session_cookie(value: String, frontend_url: &str) -> Cookie<'static> {
    Cookie::build((SESSION_COOKIE, value))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(frontend_url.starts_with("https://"))
        .max_age(time::Duration::seconds(SESSION_TTL_SECS as i64))
        .build()
}

async fn login(
    State(state): State<Arc<AppState>>,
    jar: CookieJar,
    Json(request): Json<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>)> {
    request.validate()?;
    let user_id = request.user_id.trim();

    let Login {
        profile,
        session_key,
    } = state
        .accounts
        .authenticate(user_id, &request.password)
        .await?
        .ok_or(AppError::Unauthorized)?;

    let token = create_jwt(&profile.id, &session_key, &state.config.jwt_signing_key)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("JWT creation failed: {}", e)))?;

    tracing::info!(user_id = %profile.id, role = %profile.role, "Login successful");

    let jar = jar.add(session_cookie(token.clone(), &state.config.frontend_url));
    Ok((
        jar,
        Json(LoginResponse {
            token,
            user: profile,
        }),
    ))
}

async fn logout(jar: CookieJar) -> (CookieJar, StatusCode) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_cookie_attributes() {
        let cookie = session_cookie("tok".to_string(), "https://judo.example.org");
        assert_eq!(cookie.name(), SESSION_COOKIE);
        assert_eq!(cookie.path(), Some("/"));
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.secure(), Some(true));

        let local = session_cookie("tok".to_string(), "http://localhost:5173");
        assert_eq!(local.secure(), Some(false));
    }

    #[test]
    fn test_login_request_validation() {
        let empty = LoginRequest {
            user_id: String::new(),
            password: "pw".to_string(),
        };
        assert!(empty.validate().is_err());

        let ok = LoginRequest {
            user_id: "mario".to_string(),
            password: "pw".to_string(),
        };
        assert!(ok.validate().is_ok());
    }
}
