// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Firestore client wrapper with typed operations.
//!
//! Provides high-level operations for:
//! - Users (profile storage) and their credentials
//! - Competitions
//! - Results and registrations (one document per athlete and competition)
//! - News

use crate::db::collections;
use crate::error::AppError;
use crate::models::{
    Competition, CompetitionResult, NewsItem, Profile, Registration, UserCredentials,
};
use firestore::errors::FirestoreError;
use firestore::FirestoreWritePrecondition;

// Firestore limits transaction writes to 500 operations.
const MAX_TRANSACTION_WRITES: usize = 500;

/// Firestore database client.
#[derive(Clone)]
pub struct FirestoreDb {
    client: Option<firestore::FirestoreDb>,
}

/// Map an insert failure, turning "document already exists" into `Conflict`.
fn insert_error(e: FirestoreError, what: &str) -> AppError {
    match e {
        FirestoreError::DataConflictError(_) => {
            AppError::Conflict(format!("{} already exists", what))
        }
        other => AppError::Database(other.to_string()),
    }
}

impl FirestoreDb {
    /// Create a new Firestore client.
    ///
    /// For local development with emulator, set FIRESTORE_EMULATOR_HOST.
    pub async fn new(project_id: &str) -> Result<Self, AppError> {
        // Emulator needs no credentials; skip the ADC lookup entirely.
        if std::env::var("FIRESTORE_EMULATOR_HOST").is_ok() {
            return Self::create_emulator_client(project_id).await;
        }

        let client = firestore::FirestoreDb::new(project_id)
            .await
            .map_err(|e| AppError::Database(format!("Failed to connect to Firestore: {}", e)))?;

        tracing::info!(project = project_id, "Connected to Firestore");

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a Firestore client for the emulator with unauthenticated access.
    async fn create_emulator_client(project_id: &str) -> Result<Self, AppError> {
        tracing::info!("Using unauthenticated connection for Firestore Emulator");

        let token_source = gcloud_sdk::ExternalJwtFunctionSource::new(|| async {
            Ok(gcloud_sdk::Token {
                token_type: "Bearer".to_string(),
                token: gcloud_sdk::SecretValue::new(
                    "eyJhbGciOiJub25lIn0.eyJ1aWQiOiJ0ZXN0In0."
                        .to_string()
                        .into(),
                ),
                expiry: chrono::Utc::now() + chrono::Duration::hours(1),
            })
        });

        let options = firestore::FirestoreDbOptions::new(project_id.to_string());

        let client = firestore::FirestoreDb::with_options_token_source(
            options,
            gcloud_sdk::GCP_DEFAULT_SCOPES.clone(),
            gcloud_sdk::TokenSourceType::ExternalSource(Box::new(token_source)),
        )
        .await
        .map_err(|e| {
            AppError::Database(format!("Failed to connect to Firestore Emulator: {}", e))
        })?;

        tracing::info!(
            project = project_id,
            "Connected to Firestore (Emulator/Unauthenticated)"
        );

        Ok(Self {
            client: Some(client),
        })
    }

    /// Create a mock Firestore client for testing (offline mode).
    ///
    /// All database operations will return an error if called.
    pub fn new_mock() -> Self {
        Self { client: None }
    }

    /// Helper to get the client or return an error if offline.
    fn get_client(&self) -> Result<&firestore::FirestoreDb, AppError> {
        self.client
            .as_ref()
            .ok_or_else(|| AppError::Database("Database not connected (offline mode)".to_string()))
    }

    /// Fetch one document by id.
    async fn get_doc<T>(&self, collection: &str, id: &str) -> Result<Option<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .by_id_in(collection)
            .obj()
            .one(id)
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Fetch a whole collection.
    async fn list_docs<T>(&self, collection: &str) -> Result<Vec<T>, AppError>
    where
        T: for<'de> serde::Deserialize<'de> + Send,
    {
        self.get_client()?
            .fluent()
            .select()
            .from(collection)
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create or overwrite a document.
    async fn set_doc<T>(&self, collection: &str, id: &str, object: &T) -> Result<(), AppError>
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de> + Sync + Send,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .update()
            .in_col(collection)
            .document_id(id)
            .object(object)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Create a document that must not exist yet.
    async fn insert_doc<T>(
        &self,
        collection: &str,
        id: &str,
        object: &T,
        what: &str,
    ) -> Result<(), AppError>
    where
        T: serde::Serialize + for<'de> serde::Deserialize<'de> + Sync + Send,
    {
        let _: () = self
            .get_client()?
            .fluent()
            .insert()
            .into(collection)
            .document_id(id)
            .object(object)
            .execute()
            .await
            .map_err(|e| insert_error(e, what))?;
        Ok(())
    }

    async fn delete_doc(&self, collection: &str, id: &str) -> Result<(), AppError> {
        self.get_client()?
            .fluent()
            .delete()
            .from(collection)
            .document_id(id)
            .execute()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, id: &str) -> Result<Option<Profile>, AppError> {
        self.get_doc(collections::USERS, id).await
    }

    pub async fn list_users(&self) -> Result<Vec<Profile>, AppError> {
        self.list_docs(collections::USERS).await
    }

    pub async fn upsert_user(&self, user: &Profile) -> Result<(), AppError> {
        self.set_doc(collections::USERS, &user.id, user).await
    }

    /// Create a profile and its credentials in one transaction.
    ///
    /// Both writes carry a must-not-exist precondition, so a taken id fails
    /// the whole commit and never leaves half an account behind.
    pub async fn insert_user(
        &self,
        user: &Profile,
        credentials: &UserCredentials,
    ) -> Result<(), AppError> {
        let what = format!("User '{}'", user.id);
        if self.get_user(&user.id).await?.is_some() {
            return Err(AppError::Conflict(format!("{} already exists", what)));
        }

        let client = self.get_client()?;
        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        client
            .fluent()
            .update()
            .in_col(collections::USERS)
            .precondition(FirestoreWritePrecondition::Exists(false))
            .document_id(&user.id)
            .object(user)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add profile to transaction: {}", e))
            })?;

        client
            .fluent()
            .update()
            .in_col(collections::CREDENTIALS)
            .precondition(FirestoreWritePrecondition::Exists(false))
            .document_id(&user.id)
            .object(credentials)
            .add_to_transaction(&mut transaction)
            .map_err(|e| {
                AppError::Database(format!("Failed to add credentials to transaction: {}", e))
            })?;

        transaction
            .commit()
            .await
            .map_err(|e| insert_error(e, &what))?;
        Ok(())
    }

    /// Delete a user and every document that names them.
    ///
    /// Removes from all collections in one transaction:
    /// - `results` and `registrations` (query by athlete_id)
    /// - the id from `competitions/*.allowed_ids`
    /// - `credentials/{id}`
    /// - `users/{id}`
    ///
    /// Returns the number of documents deleted or rewritten.
    pub async fn delete_user(&self, id: &str) -> Result<usize, AppError> {
        let client = self.get_client()?;

        let (results, registrations, mut competitions) = tokio::try_join!(
            self.results_for_athlete(id),
            self.registrations_for_athlete(id),
            self.competitions_allowing(id),
        )?;

        let writes = results.len() + registrations.len() + competitions.len() + 2;
        if writes > MAX_TRANSACTION_WRITES {
            return Err(AppError::Database(format!(
                "User {} is referenced by {} documents, more than one transaction can hold",
                id, writes
            )));
        }

        let mut transaction = client
            .begin_transaction()
            .await
            .map_err(|e| AppError::Database(format!("Failed to begin transaction: {}", e)))?;

        let doomed = results
            .iter()
            .map(|r| (collections::RESULTS, r.id.as_str()))
            .chain(
                registrations
                    .iter()
                    .map(|r| (collections::REGISTRATIONS, r.id.as_str())),
            )
            .chain([(collections::CREDENTIALS, id), (collections::USERS, id)]);

        for (collection, doc_id) in doomed {
            client
                .fluent()
                .delete()
                .from(collection)
                .document_id(doc_id)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add deletion to transaction for {}: {}",
                        collection, e
                    ))
                })?;
        }

        for competition in &mut competitions {
            if let Some(ids) = competition.allowed_ids.as_mut() {
                ids.remove(id);
            }
            client
                .fluent()
                .update()
                .in_col(collections::COMPETITIONS)
                .document_id(&competition.id)
                .object(&*competition)
                .add_to_transaction(&mut transaction)
                .map_err(|e| {
                    AppError::Database(format!(
                        "Failed to add allow-list update to transaction: {}",
                        e
                    ))
                })?;
        }

        transaction
            .commit()
            .await
            .map_err(|e| AppError::Database(format!("Transaction commit failed: {}", e)))?;

        tracing::info!(
            user_id = id,
            results = results.len(),
            registrations = registrations.len(),
            allow_lists = competitions.len(),
            "User data deletion complete"
        );
        Ok(writes)
    }

    pub async fn get_credentials(&self, id: &str) -> Result<Option<UserCredentials>, AppError> {
        self.get_doc(collections::CREDENTIALS, id).await
    }

    // ─── Competition Operations ──────────────────────────────────

    pub async fn get_competition(&self, id: &str) -> Result<Option<Competition>, AppError> {
        self.get_doc(collections::COMPETITIONS, id).await
    }

    pub async fn list_competitions(&self) -> Result<Vec<Competition>, AppError> {
        self.list_docs(collections::COMPETITIONS).await
    }

    pub async fn set_competition(&self, competition: &Competition) -> Result<(), AppError> {
        self.set_doc(collections::COMPETITIONS, &competition.id, competition)
            .await
    }

    /// Competitions whose allow-list names `user_id`.
    async fn competitions_allowing(&self, user_id: &str) -> Result<Vec<Competition>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::COMPETITIONS)
            .filter(|q| q.for_all([q.field("allowed_ids").array_contains(user_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    // ─── Result Operations ───────────────────────────────────────

    pub async fn get_result(&self, id: &str) -> Result<Option<CompetitionResult>, AppError> {
        self.get_doc(collections::RESULTS, id).await
    }

    pub async fn list_results(&self) -> Result<Vec<CompetitionResult>, AppError> {
        self.list_docs(collections::RESULTS).await
    }

    pub async fn results_for_athlete(
        &self,
        athlete_id: &str,
    ) -> Result<Vec<CompetitionResult>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::RESULTS)
            .filter(|q| q.for_all([q.field("athlete_id").eq(athlete_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert a result under its pair-derived document id.
    ///
    /// Firestore rejects the insert if the document exists, so two racing
    /// submissions for the same athlete and competition yield one result.
    pub async fn insert_result(&self, result: &CompetitionResult) -> Result<(), AppError> {
        let doc_id = CompetitionResult::document_id(&result.competition_id, &result.athlete_id);
        self.insert_doc(
            collections::RESULTS,
            &doc_id,
            result,
            "Result for this competition",
        )
        .await?;

        tracing::info!(
            athlete_id = %result.athlete_id,
            competition_id = %result.competition_id,
            "Result stored"
        );
        Ok(())
    }

    pub async fn update_result(&self, result: &CompetitionResult) -> Result<(), AppError> {
        self.set_doc(collections::RESULTS, &result.id, result).await
    }

    // ─── Registration Operations ─────────────────────────────────

    pub async fn get_registration(&self, id: &str) -> Result<Option<Registration>, AppError> {
        self.get_doc(collections::REGISTRATIONS, id).await
    }

    pub async fn list_registrations(&self) -> Result<Vec<Registration>, AppError> {
        self.list_docs(collections::REGISTRATIONS).await
    }

    pub async fn registrations_for_athlete(
        &self,
        athlete_id: &str,
    ) -> Result<Vec<Registration>, AppError> {
        self.get_client()?
            .fluent()
            .select()
            .from(collections::REGISTRATIONS)
            .filter(|q| q.for_all([q.field("athlete_id").eq(athlete_id)]))
            .obj()
            .query()
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Insert under the pair-derived document id; a second registration
    /// for the same pair is a `Conflict`.
    pub async fn insert_registration(&self, registration: &Registration) -> Result<(), AppError> {
        let doc_id =
            Registration::document_id(&registration.competition_id, &registration.athlete_id);
        self.insert_doc(
            collections::REGISTRATIONS,
            &doc_id,
            registration,
            "Registration for this competition",
        )
        .await
    }

    pub async fn update_registration(&self, registration: &Registration) -> Result<(), AppError> {
        self.set_doc(collections::REGISTRATIONS, &registration.id, registration)
            .await
    }

    // ─── News Operations ─────────────────────────────────────────

    pub async fn get_news(&self, id: &str) -> Result<Option<NewsItem>, AppError> {
        self.get_doc(collections::NEWS, id).await
    }

    pub async fn list_news(&self) -> Result<Vec<NewsItem>, AppError> {
        self.list_docs(collections::NEWS).await
    }

    pub async fn insert_news(&self, item: &NewsItem) -> Result<(), AppError> {
        self.insert_doc(collections::NEWS, &item.id, item, "News item")
            .await
    }

    pub async fn delete_news(&self, id: &str) -> Result<(), AppError> {
        self.delete_doc(collections::NEWS, id).await
    }
}
