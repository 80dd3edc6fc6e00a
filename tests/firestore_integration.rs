// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore integration tests.
//!
//! These tests require the Firestore emulator to be running
//! (FIRESTORE_EMULATOR_HOST set); they are skipped otherwise.

use judotrack::error::AppError;
use judotrack::models::{
    CompetitionResult, Medal, NewsItem, Registration, RegistrationStatus, Role, UserCredentials,
    Visibility,
};

mod common;
use common::{competition, profile, test_db, unique_id};

fn credentials() -> UserCredentials {
    UserCredentials {
        password_hash: "$2b$10$placeholder".to_string(),
        updated_at: "2025-01-01T00:00:00Z".to_string(),
        session_key: "emulator".to_string(),
    }
}

fn result(competition_id: &str, athlete_id: &str, wins: u32) -> CompetitionResult {
    CompetitionResult {
        id: CompetitionResult::document_id(competition_id, athlete_id),
        competition_id: competition_id.to_string(),
        athlete_id: athlete_id.to_string(),
        wins,
        losses: 1,
        medal: Medal::Bronze,
        notes: String::new(),
        ai_analysis: None,
        created_at: "2025-03-02T18:00:00Z".to_string(),
    }
}

fn registration(competition_id: &str, athlete_id: &str, weight: &str) -> Registration {
    Registration {
        id: Registration::document_id(competition_id, athlete_id),
        competition_id: competition_id.to_string(),
        athlete_id: athlete_id.to_string(),
        status: RegistrationStatus::Pending,
        declared_weight: Some(weight.to_string()),
        registered_at: "2025-03-01T09:00:00Z".to_string(),
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// USER TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_user_insert_and_duplicate() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("u");

    assert!(db.get_user(&id).await.unwrap().is_none());

    let user = profile(&id, Role::Athlete, Some("Junior"));
    db.insert_user(&user, &credentials()).await.unwrap();

    let fetched = db.get_user(&id).await.unwrap().unwrap();
    assert_eq!(fetched, user);
    assert!(db.get_credentials(&id).await.unwrap().is_some());

    let err = db.insert_user(&user, &credentials()).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    println!("✓ User created and duplicate rejected: {}", id);
}

#[tokio::test]
async fn test_user_delete_removes_credentials() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("u");
    db.insert_user(&profile(&id, Role::Coach, None), &credentials())
        .await
        .unwrap();

    db.delete_user(&id).await.unwrap();

    assert!(db.get_user(&id).await.unwrap().is_none());
    assert!(db.get_credentials(&id).await.unwrap().is_none());
}

#[tokio::test]
async fn test_duplicate_user_keeps_original_credentials() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("u");
    db.insert_user(&profile(&id, Role::Athlete, None), &credentials())
        .await
        .unwrap();

    let mut impostor = profile(&id, Role::Admin, None);
    impostor.name = "Impostor".to_string();
    let other = UserCredentials {
        password_hash: "$2b$10$other".to_string(),
        updated_at: "2025-02-01T00:00:00Z".to_string(),
        session_key: "other".to_string(),
    };
    let err = db.insert_user(&impostor, &other).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let kept = db.get_credentials(&id).await.unwrap().unwrap();
    assert_eq!(kept.password_hash, credentials().password_hash);
    assert_eq!(kept.session_key, "emulator");
    assert_eq!(db.get_user(&id).await.unwrap().unwrap().role, Role::Athlete);
}

#[tokio::test]
async fn test_user_delete_cascades() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("u");
    let keep = unique_id("k");
    let comp_id = unique_id("c");
    db.insert_user(&profile(&id, Role::Athlete, None), &credentials())
        .await
        .unwrap();
    db.set_competition(&competition(
        &comp_id,
        "2025-05-01",
        Visibility::Restricted,
        Some(&[id.as_str(), keep.as_str()]),
        None,
    ))
    .await
    .unwrap();
    db.insert_result(&result(&comp_id, &id, 2)).await.unwrap();
    db.insert_result(&result(&comp_id, &keep, 1)).await.unwrap();
    db.insert_registration(&registration(&comp_id, &id, "-57kg"))
        .await
        .unwrap();

    // result, registration, allow-list, credentials, profile
    assert_eq!(db.delete_user(&id).await.unwrap(), 5);

    assert!(db.get_user(&id).await.unwrap().is_none());
    assert!(db.results_for_athlete(&id).await.unwrap().is_empty());
    assert!(db.registrations_for_athlete(&id).await.unwrap().is_empty());
    assert_eq!(db.results_for_athlete(&keep).await.unwrap().len(), 1);

    let comp = db.get_competition(&comp_id).await.unwrap().unwrap();
    assert!(!comp.allows(&id));
    assert!(comp.allows(&keep));
}

// ═══════════════════════════════════════════════════════════════════════════
// COMPETITION & RESULT TESTS
// ═══════════════════════════════════════════════════════════════════════════

#[tokio::test]
async fn test_restricted_competition_round_trip() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("c");
    let comp = competition(
        &id,
        "2025-04-12",
        Visibility::Restricted,
        Some(&["anna", "luca"]),
        Some("Cadetti"),
    );

    db.set_competition(&comp).await.unwrap();
    let fetched = db.get_competition(&id).await.unwrap().unwrap();
    assert_eq!(fetched, comp);
    assert!(fetched.allows("luca"));
}

#[tokio::test]
async fn test_one_result_per_athlete_and_competition() {
    require_emulator!();

    let db = test_db().await;
    let athlete = unique_id("u");
    let comp_id = unique_id("c");

    db.insert_result(&result(&comp_id, &athlete, 2)).await.unwrap();
    let err = db
        .insert_result(&result(&comp_id, &athlete, 5))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let mine = db.results_for_athlete(&athlete).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].wins, 2);

    let mut updated = mine[0].clone();
    updated.notes = "Better footwork".to_string();
    db.update_result(&updated).await.unwrap();

    let fetched = db.get_result(&updated.id).await.unwrap().unwrap();
    assert_eq!(fetched.notes, "Better footwork");
}

#[tokio::test]
async fn test_news_insert_and_delete() {
    require_emulator!();

    let db = test_db().await;
    let id = unique_id("n");
    let item = NewsItem {
        id: id.clone(),
        title: "Stage estivo".to_string(),
        content: "Iscrizioni aperte".to_string(),
        date: "2025-06-01".to_string(),
        author: "Coach".to_string(),
        image_url: None,
    };

    db.insert_news(&item).await.unwrap();
    assert!(db.list_news().await.unwrap().iter().any(|n| n.id == id));

    db.delete_news(&id).await.unwrap();
    assert!(!db.list_news().await.unwrap().iter().any(|n| n.id == id));
}

#[tokio::test]
async fn test_one_registration_per_athlete_and_competition() {
    require_emulator!();

    let db = test_db().await;
    let athlete = unique_id("u");
    let comp_id = unique_id("c");

    db.insert_registration(&registration(&comp_id, &athlete, "-66kg"))
        .await
        .unwrap();
    let err = db
        .insert_registration(&registration(&comp_id, &athlete, "-73kg"))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let mut mine = db.registrations_for_athlete(&athlete).await.unwrap();
    assert_eq!(mine.len(), 1);
    assert_eq!(mine[0].declared_weight.as_deref(), Some("-66kg"));

    mine[0].status = RegistrationStatus::Yes;
    db.update_registration(&mine[0]).await.unwrap();
    let fetched = db.get_registration(&mine[0].id).await.unwrap().unwrap();
    assert_eq!(fetched.status, RegistrationStatus::Yes);
}
