//! In-process store used when no Firestore project is configured.
//!
//! Data lives in `DashMap`s. With a data file configured, the full state is
//! re-written as JSON after every mutation and loaded again at startup.

use crate::error::AppError;
use crate::models::{
    Competition, CompetitionResult, NewsItem, Profile, Registration, UserCredentials,
};
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

#[derive(Default)]
struct Collections {
    users: DashMap<String, Profile>,
    credentials: DashMap<String, UserCredentials>,
    competitions: DashMap<String, Competition>,
    results: DashMap<String, CompetitionResult>,
    registrations: DashMap<String, Registration>,
    news: DashMap<String, NewsItem>,
}

/// On-disk layout of the data file.
#[derive(Default, Serialize, Deserialize)]
struct PersistedState {
    #[serde(default)]
    users: BTreeMap<String, Profile>,
    #[serde(default)]
    credentials: BTreeMap<String, UserCredentials>,
    #[serde(default)]
    competitions: BTreeMap<String, Competition>,
    #[serde(default)]
    results: BTreeMap<String, CompetitionResult>,
    #[serde(default)]
    registrations: BTreeMap<String, Registration>,
    #[serde(default)]
    news: BTreeMap<String, NewsItem>,
}

fn to_map<V: Clone>(map: &DashMap<String, V>) -> BTreeMap<String, V> {
    map.iter()
        .map(|e| (e.key().clone(), e.value().clone()))
        .collect()
}

fn values<V: Clone>(map: &DashMap<String, V>) -> Vec<V> {
    map.iter().map(|e| e.value().clone()).collect()
}

/// In-memory database, cheap to clone (shared state).
#[derive(Clone, Default)]
pub struct MemoryDb {
    data: Arc<Collections>,
    data_file: Option<PathBuf>,
    /// Serializes file writes so snapshots land in order.
    persist_lock: Arc<tokio::sync::Mutex<()>>,
}

impl MemoryDb {
    /// Empty store with no file backing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load from `path` if it exists; later mutations are written back to it.
    pub async fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, AppError> {
        let path = path.as_ref().to_path_buf();

        let state: PersistedState = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => serde_json::from_str(&raw).map_err(|e| {
                AppError::Database(format!("Invalid data file {}: {}", path.display(), e))
            })?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::info!(path = %path.display(), "Data file not found, starting empty");
                PersistedState::default()
            }
            Err(e) => {
                return Err(AppError::Database(format!(
                    "Failed to read data file {}: {}",
                    path.display(),
                    e
                )))
            }
        };

        let data = Collections {
            users: state.users.into_iter().collect(),
            credentials: state.credentials.into_iter().collect(),
            competitions: state.competitions.into_iter().collect(),
            results: state.results.into_iter().collect(),
            registrations: state.registrations.into_iter().collect(),
            news: state.news.into_iter().collect(),
        };

        tracing::info!(
            path = %path.display(),
            users = data.users.len(),
            competitions = data.competitions.len(),
            results = data.results.len(),
            "Loaded local data file"
        );

        Ok(Self {
            data: Arc::new(data),
            data_file: Some(path),
            persist_lock: Arc::new(tokio::sync::Mutex::new(())),
        })
    }

    /// Write the current state to the data file (no-op without one).
    async fn persist(&self) -> Result<(), AppError> {
        let Some(path) = &self.data_file else {
            return Ok(());
        };

        let _guard = self.persist_lock.lock().await;

        let state = PersistedState {
            users: to_map(&self.data.users),
            credentials: to_map(&self.data.credentials),
            competitions: to_map(&self.data.competitions),
            results: to_map(&self.data.results),
            registrations: to_map(&self.data.registrations),
            news: to_map(&self.data.news),
        };
        let json = serde_json::to_string_pretty(&state)
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Serialize data file: {}", e)))?;

        // Write then rename so a crash never leaves a truncated file.
        let tmp = path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| AppError::Database(format!("Failed to write data file: {}", e)))?;
        tokio::fs::rename(&tmp, path)
            .await
            .map_err(|e| AppError::Database(format!("Failed to replace data file: {}", e)))?;

        tracing::debug!(path = %path.display(), "Data file written");
        Ok(())
    }

    // ─── User Operations ─────────────────────────────────────────

    pub async fn get_user(&self, id: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.data.users.get(id).map(|u| u.clone()))
    }

    pub async fn list_users(&self) -> Result<Vec<Profile>, AppError> {
        Ok(values(&self.data.users))
    }

    pub async fn upsert_user(&self, user: &Profile) -> Result<(), AppError> {
        self.data.users.insert(user.id.clone(), user.clone());
        self.persist().await
    }

    pub async fn insert_user(
        &self,
        user: &Profile,
        credentials: &UserCredentials,
    ) -> Result<(), AppError> {
        match self.data.users.entry(user.id.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(format!("User '{}' already exists", user.id)))
            }
            Entry::Vacant(slot) => {
                slot.insert(user.clone());
            }
        }
        self.data
            .credentials
            .insert(user.id.clone(), credentials.clone());
        self.persist().await
    }

    /// Remove the user and every document that names them, so a later
    /// account with the same id starts clean.
    pub async fn delete_user(&self, id: &str) -> Result<usize, AppError> {
        let mut deleted_count = 0;

        let before = self.data.results.len();
        self.data.results.retain(|_, r| r.athlete_id != id);
        deleted_count += before - self.data.results.len();

        let before = self.data.registrations.len();
        self.data.registrations.retain(|_, r| r.athlete_id != id);
        deleted_count += before - self.data.registrations.len();

        for mut competition in self.data.competitions.iter_mut() {
            if let Some(ids) = competition.allowed_ids.as_mut() {
                if ids.remove(id) {
                    deleted_count += 1;
                }
            }
        }

        deleted_count += usize::from(self.data.credentials.remove(id).is_some());
        deleted_count += usize::from(self.data.users.remove(id).is_some());

        tracing::info!(user_id = id, deleted_count, "User data deletion complete");
        self.persist().await?;
        Ok(deleted_count)
    }

    pub async fn get_credentials(&self, id: &str) -> Result<Option<UserCredentials>, AppError> {
        Ok(self.data.credentials.get(id).map(|c| c.clone()))
    }

    // ─── Competition Operations ──────────────────────────────────

    pub async fn get_competition(&self, id: &str) -> Result<Option<Competition>, AppError> {
        Ok(self.data.competitions.get(id).map(|c| c.clone()))
    }

    pub async fn list_competitions(&self) -> Result<Vec<Competition>, AppError> {
        Ok(values(&self.data.competitions))
    }

    pub async fn set_competition(&self, competition: &Competition) -> Result<(), AppError> {
        self.data
            .competitions
            .insert(competition.id.clone(), competition.clone());
        self.persist().await
    }

    // ─── Result Operations ───────────────────────────────────────

    pub async fn get_result(&self, id: &str) -> Result<Option<CompetitionResult>, AppError> {
        Ok(self.data.results.get(id).map(|r| r.clone()))
    }

    pub async fn list_results(&self) -> Result<Vec<CompetitionResult>, AppError> {
        Ok(values(&self.data.results))
    }

    pub async fn results_for_athlete(
        &self,
        athlete_id: &str,
    ) -> Result<Vec<CompetitionResult>, AppError> {
        Ok(self
            .data
            .results
            .iter()
            .filter(|e| e.athlete_id == athlete_id)
            .map(|e| e.value().clone())
            .collect())
    }

    /// Insert under the pair-derived key; the entry lock makes the
    /// existence check and the insert one step.
    pub async fn insert_result(&self, result: &CompetitionResult) -> Result<(), AppError> {
        let key = CompetitionResult::document_id(&result.competition_id, &result.athlete_id);
        match self.data.results.entry(key) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(
                    "Result for this competition already exists".to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(result.clone());
            }
        }

        tracing::info!(
            athlete_id = %result.athlete_id,
            competition_id = %result.competition_id,
            "Result stored"
        );
        self.persist().await
    }

    pub async fn update_result(&self, result: &CompetitionResult) -> Result<(), AppError> {
        self.data.results.insert(result.id.clone(), result.clone());
        self.persist().await
    }

    // ─── Registration Operations ─────────────────────────────────

    pub async fn get_registration(&self, id: &str) -> Result<Option<Registration>, AppError> {
        Ok(self.data.registrations.get(id).map(|r| r.clone()))
    }

    pub async fn list_registrations(&self) -> Result<Vec<Registration>, AppError> {
        Ok(values(&self.data.registrations))
    }

    pub async fn registrations_for_athlete(
        &self,
        athlete_id: &str,
    ) -> Result<Vec<Registration>, AppError> {
        Ok(self
            .data
            .registrations
            .iter()
            .filter(|e| e.athlete_id == athlete_id)
            .map(|e| e.value().clone())
            .collect())
    }

    pub async fn insert_registration(&self, registration: &Registration) -> Result<(), AppError> {
        let key = Registration::document_id(&registration.competition_id, &registration.athlete_id);
        match self.data.registrations.entry(key) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict(
                    "Registration for this competition already exists".to_string(),
                ))
            }
            Entry::Vacant(slot) => {
                slot.insert(registration.clone());
            }
        }
        self.persist().await
    }

    pub async fn update_registration(&self, registration: &Registration) -> Result<(), AppError> {
        self.data
            .registrations
            .insert(registration.id.clone(), registration.clone());
        self.persist().await
    }

    // ─── News Operations ─────────────────────────────────────────

    pub async fn get_news(&self, id: &str) -> Result<Option<NewsItem>, AppError> {
        Ok(self.data.news.get(id).map(|n| n.clone()))
    }

    pub async fn list_news(&self) -> Result<Vec<NewsItem>, AppError> {
        Ok(values(&self.data.news))
    }

    pub async fn insert_news(&self, item: &NewsItem) -> Result<(), AppError> {
        match self.data.news.entry(item.id.clone()) {
            Entry::Occupied(_) => {
                return Err(AppError::Conflict("News item already exists".to_string()))
            }
            Entry::Vacant(slot) => {
                slot.insert(item.clone());
            }
        }
        self.persist().await
    }

    pub async fn delete_news(&self, id: &str) -> Result<(), AppError> {
        self.data.news.remove(id);
        self.persist().await
    }
}
