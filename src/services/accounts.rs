// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Account management: password hashing, login checks, and first-run
//! bootstrap of the dev account.

use crate::config::{MAX_BCRYPT_COST, MIN_BCRYPT_COST};
use crate::db::Database;
use crate::error::{AppError, Result};
use crate::models::{AgeCategory, Profile, Role, UserCredentials};
use crate::time_utils::now_rfc3339;
use ring::rand::{SecureRandom, SystemRandom};

/// Login name of the account created on an empty database.
pub const BOOTSTRAP_USER_ID: &str = "admin";

/// Hash a password with bcrypt.
pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&cost) {
        return Err(AppError::Internal(anyhow::anyhow!(
            "Invalid bcrypt cost: {} (must be {}-{})",
            cost,
            MIN_BCRYPT_COST,
            MAX_BCRYPT_COST
        )));
    }

    bcrypt::hash(password, cost)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password hashing failed: {}", e)))
}

/// Check a password against a stored bcrypt hash.
pub fn verify_password(password: &str, hash: &str) -> Result<bool> {
    bcrypt::verify(password, hash)
        .map_err(|e| AppError::Internal(anyhow::anyhow!("Password verification failed: {}", e)))
}

/// Fresh random key for binding session tokens to one account lifetime.
pub fn new_session_key() -> Result<String> {
    let mut key = [0u8; 16];
    SystemRandom::new()
        .fill(&mut key)
        .map_err(|_| AppError::Internal(anyhow::anyhow!("Session key generation failed")))?;
    Ok(hex::encode(key))
}

/// A successful login.
#[derive(Debug, Clone)]
pub struct Login {
    pub profile: Profile,
    pub session_key: String,
}

/// Fields for a new account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub id: String,
    pub name: String,
    pub role: Role,
    pub password: String,
    pub age_category: Option<String>,
    pub weight_class: Option<String>,
    pub avatar: Option<String>,
}

#[derive(Clone)]
pub struct AccountService {
    db: Database,
    bcrypt_cost: u32,
}

impl AccountService {
    pub fn new(db: Database, bcrypt_cost: u32) -> Self {
        Self { db, bcrypt_cost }
    }

    /// Create a profile and its credentials. `Conflict` if the id is taken.
    pub async fn create(&self, account: NewAccount) -> Result<Profile> {
        let now = now_rfc3339();
        let avatar = account.avatar.filter(|a| !a.trim().is_empty()).or_else(|| {
            Some(format!(
                "https://ui-avatars.com/api/?name={}&background=random",
                account.name.replace(' ', "+")
            ))
        });

        let profile = Profile {
            id: account.id,
            name: account.name,
            role: account.role,
            age_category: account
                .age_category
                .map(AgeCategory::new)
                .filter(|c| !c.is_blank()),
            weight_class: account.weight_class.filter(|w| !w.trim().is_empty()),
            avatar,
            created_at: now.clone(),
        };

        // bcrypt is deliberately slow; keep it off the async workers.
        let password = account.password;
        let cost = self.bcrypt_cost;
        let password_hash = tokio::task::spawn_blocking(move || hash_password(&password, cost))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Hashing task failed: {}", e)))??;

        let credentials = UserCredentials {
            password_hash,
            updated_at: now,
            session_key: new_session_key()?,
        };

        self.db.insert_user(&profile, &credentials).await?;
        tracing::info!(user_id = %profile.id, role = %profile.role, "User created");
        Ok(profile)
    }

    /// Resolve a login. Returns `None` for an unknown user or a wrong
    /// password, without saying which.
    pub async fn authenticate(&self, user_id: &str, password: &str) -> Result<Option<Login>> {
        let Some(credentials) = self.db.get_credentials(user_id).await? else {
            tracing::debug!(user_id, "Login for unknown user");
            return Ok(None);
        };

        let password = password.to_string();
        let hash = credentials.password_hash.clone();
        let valid = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
            .await
            .map_err(|e| AppError::Internal(anyhow::anyhow!("Verify task failed: {}", e)))??;

        if !valid {
            tracing::info!(user_id, "Login rejected: wrong password");
            return Ok(None);
        }

        Ok(self.db.get_user(user_id).await?.map(|profile| Login {
            profile,
            session_key: credentials.session_key,
        }))
    }

    /// On an empty database, create the `admin` dev account so someone can
    /// log in and set the club up. Returns whether it was created.
    pub async fn bootstrap(&self, password: &str) -> Result<bool> {
        if !self.db.list_users().await?.is_empty() {
            return Ok(false);
        }

        if password == BOOTSTRAP_USER_ID {
            tracing::warn!("Bootstrap dev account uses the default password; change it");
        }

        let created = self
            .create(NewAccount {
                id: BOOTSTRAP_USER_ID.to_string(),
                name: "Developer".to_string(),
                role: Role::Dev,
                password: password.to_string(),
                age_category: None,
                weight_class: None,
                avatar: None,
            })
            .await;

        match created {
            Ok(_) => {
                tracing::info!(user_id = BOOTSTRAP_USER_ID, "Bootstrap dev account created");
                Ok(true)
            }
            // Another instance won the race
            Err(AppError::Conflict(_)) => Ok(false),
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::MemoryDb;

    fn service() -> AccountService {
        AccountService::new(Database::Memory(MemoryDb::new()), MIN_BCRYPT_COST)
    }

    fn account(id: &str, role: Role) -> NewAccount {
        NewAccount {
            id: id.to_string(),
            name: "Mario Rossi".to_string(),
            role,
            password: "judo-secret".to_string(),
            age_category: Some("Junior".to_string()),
            weight_class: Some("".to_string()),
            avatar: None,
        }
    }

    #[test]
    fn test_hash_rejects_weak_cost() {
        assert!(hash_password("pw", 4).is_err());
    }

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("pw", MIN_BCRYPT_COST).unwrap();
        assert!(verify_password("pw", &hash).unwrap());
        assert!(!verify_password("other", &hash).unwrap());
    }

    #[tokio::test]
    async fn test_create_and_authenticate() {
        let accounts = service();
        let profile = accounts.create(account("mario", Role::Athlete)).await.unwrap();

        assert_eq!(profile.age_category, Some(AgeCategory::new("Junior")));
        assert_eq!(profile.weight_class, None);
        assert!(profile.avatar.unwrap().contains("Mario+Rossi"));

        let login = accounts
            .authenticate("mario", "judo-secret")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(login.profile.id, "mario");
        assert_eq!(login.session_key.len(), 32);
        assert!(accounts.authenticate("mario", "wrong").await.unwrap().is_none());
        assert!(accounts.authenticate("nobody", "x").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_create_duplicate_is_conflict() {
        let accounts = service();
        accounts.create(account("mario", Role::Athlete)).await.unwrap();
        let err = accounts
            .create(account("mario", Role::Coach))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_bootstrap_only_on_empty_database() {
        let accounts = service();
        assert!(accounts.bootstrap("s3cret").await.unwrap());
        assert!(!accounts.bootstrap("s3cret").await.unwrap());

        let admin = accounts.authenticate("admin", "s3cret").await.unwrap().unwrap();
        assert_eq!(admin.profile.role, Role::Dev);
    }

    #[tokio::test]
    async fn test_recreated_account_gets_new_session_key() {
        let db = Database::Memory(MemoryDb::new());
        let accounts = AccountService::new(db.clone(), MIN_BCRYPT_COST);

        accounts.create(account("mario", Role::Athlete)).await.unwrap();
        let first = db.get_credentials("mario").await.unwrap().unwrap();

        db.delete_user("mario").await.unwrap();
        accounts.create(account("mario", Role::Athlete)).await.unwrap();
        let second = db.get_credentials("mario").await.unwrap().unwrap();

        assert_ne!(first.session_key, second.session_key);
    }
}
