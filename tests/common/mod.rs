// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use chrono::NaiveDate;
use judotrack::config::Config;
use judotrack::db::{Database, FirestoreDb, MemoryDb};
use judotrack::middleware::auth::create_jwt;
use judotrack::models::{AgeCategory, Competition, Profile, Role, UserCredentials, Visibility};
use judotrack::routes::create_router;
use judotrack::AppState;
use serde_json::Value;
use std::sync::Arc;
use tower::ServiceExt;

/// Check if emulator is available via environment variable.
#[allow(dead_code)]
pub fn emulator_available() -> bool {
    std::env::var("FIRESTORE_EMULATOR_HOST").is_ok()
}

/// Skip test with message if emulator not available.
#[macro_export]
macro_rules! require_emulator {
    () => {
        if !crate::common::emulator_available() {
            eprintln!("⚠️  Skipping: FIRESTORE_EMULATOR_HOST not set");
            return;
        }
    };
}

/// Create a test database connection.
#[allow(dead_code)]
pub async fn test_db() -> FirestoreDb {
    FirestoreDb::new("test-project")
        .await
        .expect("Failed to connect to Firestore emulator")
}

/// Unique suffix so emulator tests don't collide across runs.
#[allow(dead_code)]
pub fn unique_id(prefix: &str) -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    format!("{}{}", prefix, nanos)
}

/// Create a test app over an empty in-memory store.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (axum::Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (axum::Router, Arc<AppState>) {
    let db = Database::Memory(MemoryDb::new());
    let state = Arc::new(AppState::new(config, db));
    (create_router(state.clone()), state)
}

#[allow(dead_code)]
pub fn profile(id: &str, role: Role, category: Option<&str>) -> Profile {
    Profile {
        id: id.to_string(),
        name: format!("Test {}", id),
        role,
        age_category: category.map(AgeCategory::new),
        weight_class: None,
        avatar: None,
        created_at: "2025-01-01T00:00:00Z".to_string(),
    }
}

/// Store a user directly (no bcrypt, so tests stay fast) and return a
/// bearer token for them.
#[allow(dead_code)]
pub async fn seed_user(
    state: &AppState,
    id: &str,
    role: Role,
    category: Option<&str>,
) -> String {
    let credentials = UserCredentials {
        password_hash: "not-a-real-hash".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
        session_key: session_key(id),
    };
    state
        .db
        .insert_user(&profile(id, role, category), &credentials)
        .await
        .unwrap();
    token_for(state, id)
}

/// Session key given to users stored by `seed_user`.
#[allow(dead_code)]
pub fn session_key(id: &str) -> String {
    format!("seed-{}", id)
}

#[allow(dead_code)]
pub fn token_for(state: &AppState, id: &str) -> String {
    create_jwt(id, &session_key(id), &state.config.jwt_signing_key).unwrap()
}

#[allow(dead_code)]
pub fn competition(
    id: &str,
    date: &str,
    visibility: Visibility,
    allowed: Option<&[&str]>,
    category: Option<&str>,
) -> Competition {
    Competition {
        id: id.to_string(),
        name: format!("Competition {}", id),
        location: "Torino".to_string(),
        date: NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap(),
        target_category: category.map(AgeCategory::new),
        visibility,
        allowed_ids: allowed.map(|ids| ids.iter().map(|s| s.to_string()).collect()),
        created_by: "coach".to_string(),
    }
}

/// Send one request through the router and decode the JSON body
/// (`Value::Null` for empty bodies).
#[allow(dead_code)]
pub async fn send(
    app: &axum::Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, json)
}

/// IDs of the objects in a JSON array response.
#[allow(dead_code)]
pub fn ids(json: &Value) -> Vec<String> {
    json.as_array()
        .unwrap()
        .iter()
        .map(|v| v["id"].as_str().unwrap().to_string())
        .collect()
}
