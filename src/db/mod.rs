//! Database layer (Firestore or local in-memory store).

pub mod firestore;
pub mod memory;

pub use firestore::FirestoreDb;
pub use memory::MemoryDb;

use crate::config::StorageBackend;
use crate::error::{AppError, Result};
use crate::models::{
    Competition, CompetitionResult, NewsItem, Profile, Registration, Snapshot, UserCredentials,
};
use ring::rand::{SecureRandom, SystemRandom};

/// Collection names as constants.
pub mod collections {
    pub const USERS: &str = "users";
    /// Password hashes (keyed by user id)
    pub const CREDENTIALS: &str = "credentials";
    pub const COMPETITIONS: &str = "competitions";
    /// Results (keyed by `{competition_id}_{athlete_id}`)
    pub const RESULTS: &str = "results";
    /// Event sign-ups (keyed by `{competition_id}_{athlete_id}`)
    pub const REGISTRATIONS: &str = "registrations";
    pub const NEWS: &str = "news";
}

/// Generate a document ID such as `c1700000000000-9f3a61b2`.
///
/// Millisecond timestamp keeps IDs roughly ordered; the random suffix keeps
/// two writes in the same millisecond apart.
pub fn new_id(prefix: &str) -> Result<String> {
    let mut suffix = [0u8; 4];
    SystemRandom::new()
        .fill(&mut suffix)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Random ID generation failed")))?;
    Ok(format!(
        "{}{}-{}",
        prefix,
        chrono::Utc::now().timestamp_millis(),
        hex::encode(suffix)
    ))
}

/// Storage backend selected at startup.
#[derive(Clone)]
pub enum Database {
    Firestore(FirestoreDb),
    Memory(MemoryDb),
}

macro_rules! delegate {
    ($self:ident, $db:ident => $call:expr) => {
        match $self {
            Database::Firestore($db) => $call,
            Database::Memory($db) => $call,
        }
    };
}

impl Database {
    /// Connect to the configured backend.
    pub async fn connect(storage: &StorageBackend) -> Result<Self> {
        match storage {
            StorageBackend::Firestore { project_id } => {
                Ok(Self::Firestore(FirestoreDb::new(project_id).await?))
            }
            StorageBackend::Memory { data_file } => match data_file {
                Some(path) => Ok(Self::Memory(MemoryDb::load_from_file(path).await?)),
                None => Ok(Self::Memory(MemoryDb::new())),
            },
        }
    }

    // ─── Users ───────────────────────────────────────────────────

    pub async fn get_user(&self, id: &str) -> Result<Option<Profile>> {
        delegate!(self, db => db.get_user(id).await)
    }

    pub async fn list_users(&self) -> Result<Vec<Profile>> {
        delegate!(self, db => db.list_users().await)
    }

    pub async fn upsert_user(&self, user: &Profile) -> Result<()> {
        delegate!(self, db => db.upsert_user(user).await)
    }

    /// Create a user with its credentials. Fails with `Conflict` if the id
    /// is taken.
    pub async fn insert_user(&self, user: &Profile, credentials: &UserCredentials) -> Result<()> {
        delegate!(self, db => db.insert_user(user, credentials).await)
    }

    /// Remove a user and everything that names them: credentials, results,
    /// registrations, and allow-list entries. Returns the number of
    /// documents deleted or rewritten.
    pub async fn delete_user(&self, id: &str) -> Result<usize> {
        delegate!(self, db => db.delete_user(id).await)
    }

    pub async fn get_credentials(&self, id: &str) -> Result<Option<UserCredentials>> {
        delegate!(self, db => db.get_credentials(id).await)
    }

    // ─── Competitions ────────────────────────────────────────────

    pub async fn get_competition(&self, id: &str) -> Result<Option<Competition>> {
        delegate!(self, db => db.get_competition(id).await)
    }

    pub async fn list_competitions(&self) -> Result<Vec<Competition>> {
        delegate!(self, db => db.list_competitions().await)
    }

    /// Create or replace a competition document.
    pub async fn set_competition(&self, competition: &Competition) -> Result<()> {
        delegate!(self, db => db.set_competition(competition).await)
    }

    // ─── Results ─────────────────────────────────────────────────

    pub async fn get_result(&self, id: &str) -> Result<Option<CompetitionResult>> {
        delegate!(self, db => db.get_result(id).await)
    }

    pub async fn list_results(&self) -> Result<Vec<CompetitionResult>> {
        delegate!(self, db => db.list_results().await)
    }

    pub async fn results_for_athlete(&self, athlete_id: &str) -> Result<Vec<CompetitionResult>> {
        delegate!(self, db => db.results_for_athlete(athlete_id).await)
    }

    /// Store a new result. Fails with `Conflict` if the athlete already has a
    /// result for that competition.
    pub async fn insert_result(&self, result: &CompetitionResult) -> Result<()> {
        delegate!(self, db => db.insert_result(result).await)
    }

    pub async fn update_result(&self, result: &CompetitionResult) -> Result<()> {
        delegate!(self, db => db.update_result(result).await)
    }

    // ─── Registrations ───────────────────────────────────────────

    pub async fn get_registration(&self, id: &str) -> Result<Option<Registration>> {
        delegate!(self, db => db.get_registration(id).await)
    }

    pub async fn list_registrations(&self) -> Result<Vec<Registration>> {
        delegate!(self, db => db.list_registrations().await)
    }

    pub async fn registrations_for_athlete(&self, athlete_id: &str) -> Result<Vec<Registration>> {
        delegate!(self, db => db.registrations_for_athlete(athlete_id).await)
    }

    /// Store a new registration. Fails with `Conflict` if the athlete already
    /// registered for that competition.
    pub async fn insert_registration(&self, registration: &Registration) -> Result<()> {
        delegate!(self, db => db.insert_registration(registration).await)
    }

    pub async fn update_registration(&self, registration: &Registration) -> Result<()> {
        delegate!(self, db => db.update_registration(registration).await)
    }

    // ─── News ────────────────────────────────────────────────────

    pub async fn get_news(&self, id: &str) -> Result<Option<NewsItem>> {
        delegate!(self, db => db.get_news(id).await)
    }

    pub async fn list_news(&self) -> Result<Vec<NewsItem>> {
        delegate!(self, db => db.list_news().await)
    }

    pub async fn insert_news(&self, item: &NewsItem) -> Result<()> {
        delegate!(self, db => db.insert_news(item).await)
    }

    pub async fn delete_news(&self, id: &str) -> Result<()> {
        delegate!(self, db => db.delete_news(id).await)
    }

    // ─── Snapshot ────────────────────────────────────────────────

    /// Read every collection the competition rules look at.
    pub async fn snapshot(&self) -> Result<Snapshot> {
        let (competitions, results, registrations) = tokio::try_join!(
            self.list_competitions(),
            self.list_results(),
            self.list_registrations(),
        )?;
        Ok(Snapshot::new(competitions, results, registrations))
    }
}
