// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Result submission, history, stats, and feedback over HTTP.

use axum::http::{Method, StatusCode};
use judotrack::models::{Role, Visibility};
use serde_json::json;

mod common;
use common::{competition, create_test_app, seed_user, send};

async fn seed_competitions(state: &judotrack::AppState) {
    for (id, date, visibility, allowed) in [
        ("c2024", "2024-11-10", Visibility::Public, None),
        ("c2025", "2025-03-02", Visibility::Public, None),
        ("c-secret", "2025-05-01", Visibility::Restricted, Some(&["anna"][..])),
    ] {
        state
            .db
            .set_competition(&competition(id, date, visibility, allowed, Some("Junior")))
            .await
            .unwrap();
    }
}

async fn submit(
    app: &axum::Router,
    token: &str,
    competition_id: &str,
    wins: u32,
    losses: u32,
    medal: &str,
) -> (StatusCode, serde_json::Value) {
    send(
        app,
        Method::POST,
        "/api/results",
        Some(token),
        Some(json!({
            "competition_id": competition_id,
            "wins": wins,
            "losses": losses,
            "medal": medal,
            "notes": "Good grips, tired in golden score"
        })),
    )
    .await
}

#[tokio::test]
async fn test_submit_result_and_duplicate_conflict() {
    let (app, state) = create_test_app();
    seed_competitions(&state).await;
    let anna = seed_user(&state, "anna", Role::Athlete, Some("Junior")).await;

    let (status, body) = submit(&app, &anna, "c2025", 3, 1, "silver").await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["id"], "c2025_anna");
    assert_eq!(body["competition_name"], "Competition c2025");
    assert_eq!(body["medal"], "silver");

    let (status, body) = submit(&app, &anna, "c2025", 0, 2, "none").await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"], "conflict");

    let stored = state.db.get_result("c2025_anna").await.unwrap().unwrap();
    assert_eq!(stored.wins, 3);
}

#[tokio::test]
async fn test_submit_to_invisible_competition_is_not_found() {
    let (app, state) = create_test_app();
    seed_competitions(&state).await;
    let luca = seed_user(&state, "luca", Role::Athlete, None).await;

    let (status, _) = submit(&app, &luca, "c-secret", 1, 0, "gold").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = submit(&app, &luca, "c-missing", 1, 0, "gold").await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    assert!(state.db.list_results().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_submit_rejects_out_of_range_counts() {
    let (app, state) = create_test_app();
    seed_competitions(&state).await;
    let anna = seed_user(&state, "anna", Role::Athlete, None).await;

    let (status, _) = submit(&app, &anna, "c2025", 500, 0, "none").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // negative counts don't even deserialize
    let (status, _) = send(
        &app,
        Method::POST,
        "/api/results",
        Some(&anna),
        Some(json!({"competition_id": "c2025", "wins": -1, "losses": 0})),
    )
    .await;
    assert!(status.is_client_error());
}

#[tokio::test]
async fn test_staff_cannot_record_results() {
    let (app, state) = create_test_app();
    seed_competitions(&state).await;
    let coach = seed_user(&state, "coach", Role::Coach, Some("Junior")).await;
    let admin = seed_user(&state, "boss", Role::Admin, None).await;

    for token in [&coach, &admin] {
        let (status, body) = submit(&app, token, "c2025", 4, 0, "gold").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "forbidden");
    }
    assert!(state.db.get_result("c2025_coach").await.unwrap().is_none());
    assert!(state.db.list_results().await.unwrap().is_empty());

    let (status, body) =
        send(&app, Method::GET, "/api/competitions/eligible", Some(&coach), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!([]));
}

#[tokio::test]
async fn test_history_and_stats_by_year() {
    let (app, state) = create_test_app();
    seed_competitions(&state).await;
    let anna = seed_user(&state, "anna", Role::Athlete, Some("Junior")).await;

    submit(&app, &anna, "c2024", 2, 2, "bronze").await;
    submit(&app, &anna, "c2025", 3, 1, "gold").await;
    submit(&app, &anna, "c-secret", 0, 1, "none").await;

    let (status, body) = send(&app, Method::GET, "/api/results", Some(&anna), None).await;
    assert_eq!(status, StatusCode::OK);
    let order: Vec<_> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|r| r["competition_id"].as_str().unwrap())
        .collect();
    assert_eq!(order, ["c-secret", "c2025", "c2024"]);

    let (_, body) = send(&app, Method::GET, "/api/results?year=2024", Some(&anna), None).await;
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, stats) = send(&app, Method::GET, "/api/stats", Some(&anna), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stats["total_matches"], 9);
    assert_eq!(stats["total_wins"], 5);
    assert_eq!(stats["win_rate"], 56);
    assert_eq!(stats["gold"], 1);
    assert_eq!(stats["bronze"], 1);
    assert_eq!(stats["competitions"], 3);
    assert_eq!(stats["available_years"], json!(["2025", "2024"]));

    let (_, stats) = send(&app, Method::GET, "/api/stats?year=2025", Some(&anna), None).await;
    assert_eq!(stats["total_matches"], 5);
    assert_eq!(stats["win_rate"], 60);

    let (status, _) = send(&app, Method::GET, "/api/stats?year=last", Some(&anna), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_athletes_only_see_their_own_results() {
    let (app, state) = create_test_app();
    seed_competitions(&state).await;
    let anna = seed_user(&state, "anna", Role::Athlete, None).await;
    let luca = seed_user(&state, "luca", Role::Athlete, None).await;
    let coach = seed_user(&state, "coach", Role::Coach, None).await;

    submit(&app, &anna, "c2025", 3, 1, "gold").await;

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/results?athlete_id=anna",
        Some(&luca),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _) =
        send(&app, Method::GET, "/api/stats?athlete_id=anna", Some(&luca), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(
        &app,
        Method::GET,
        "/api/results?athlete_id=anna",
        Some(&coach),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_notes_belong_to_the_athlete() {
    let (app, state) = create_test_app();
    seed_competitions(&state).await;
    let anna = seed_user(&state, "anna", Role::Athlete, None).await;
    let luca = seed_user(&state, "luca", Role::Athlete, None).await;
    let coach = seed_user(&state, "coach", Role::Coach, None).await;

    submit(&app, &anna, "c2025", 3, 1, "gold").await;
    let uri = "/api/results/c2025_anna/notes";
    let notes = json!({"notes": "Work on ne-waza"});

    let (status, _) = send(&app, Method::PUT, uri, Some(&luca), Some(notes.clone())).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(&app, Method::PUT, uri, Some(&coach), Some(notes.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = send(&app, Method::PUT, uri, Some(&anna), Some(notes)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["notes"], "Work on ne-waza");
}

#[tokio::test]
async fn test_analysis_without_api_key_falls_back() {
    let (app, state) = create_test_app();
    seed_competitions(&state).await;
    let anna = seed_user(&state, "anna", Role::Athlete, None).await;

    submit(&app, &anna, "c2025", 3, 1, "gold").await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/results/c2025_anna/analysis",
        Some(&anna),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["generated"], false);
    assert!(!body["analysis"].as_str().unwrap().is_empty());

    let stored = state.db.get_result("c2025_anna").await.unwrap().unwrap();
    assert_eq!(stored.ai_analysis, None);
}
