//! Application configuration loaded from environment variables.

use crate::services::visibility::CategoryPolicy;
use std::env;
use std::path::PathBuf;

/// Lowest bcrypt cost accepted for password hashing.
pub const MIN_BCRYPT_COST: u32 = 10;
/// Highest bcrypt cost accepted (anything above adds seconds per login).
pub const MAX_BCRYPT_COST: u32 = 14;
const DEFAULT_BCRYPT_COST: u32 = 12;

const DEFAULT_GEMINI_MODEL: &str = "gemini-2.0-flash";

/// Where club data lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StorageBackend {
    /// Hosted Firestore (or the emulator when FIRESTORE_EMULATOR_HOST is set)
    Firestore { project_id: String },
    /// In-process store, optionally mirrored to a JSON file
    Memory { data_file: Option<PathBuf> },
}

/// Application configuration, loaded once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    // --- Environment Variables (non-sensitive) ---
    /// Frontend URL allowed by CORS
    pub frontend_url: String,
    /// Server port
    pub port: u16,
    pub storage: StorageBackend,
    /// Whether a competition's target category hides it from other categories
    pub category_policy: CategoryPolicy,
    /// Gemini model used for performance feedback
    pub gemini_model: String,
    /// bcrypt work factor for new passwords
    pub bcrypt_cost: u32,

    // --- Secrets ---
    /// JWT signing key for session tokens (raw bytes)
    pub jwt_signing_key: Vec<u8>,
    /// Gemini API key; feedback is disabled without it
    pub gemini_api_key: Option<String>,
    /// Password for the `admin` dev account created on an empty database
    pub bootstrap_dev_password: String,
}

impl Config {
    /// Config for tests: in-memory storage, fixed key, cheapest bcrypt cost.
    pub fn test_default() -> Self {
        Self {
            frontend_url: "http://localhost:5173".to_string(),
            port: 8080,
            storage: StorageBackend::Memory { data_file: None },
            category_policy: CategoryPolicy::Advisory,
            gemini_model: DEFAULT_GEMINI_MODEL.to_string(),
            bcrypt_cost: MIN_BCRYPT_COST,
            jwt_signing_key: b"test_jwt_key_32_bytes_minimum!!".to_vec(),
            gemini_api_key: None,
            bootstrap_dev_password: "admin".to_string(),
        }
    }

    /// Load configuration from environment variables (and `.env` if present).
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok(); // Load .env file if present

        let storage = match env::var("STORAGE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .trim()
            .to_ascii_lowercase()
            .as_str()
        {
            "firestore" => StorageBackend::Firestore {
                project_id: env::var("GCP_PROJECT_ID")
                    .map_err(|_| ConfigError::Missing("GCP_PROJECT_ID"))?,
            },
            "memory" => StorageBackend::Memory {
                data_file: env::var("DATA_FILE")
                    .ok()
                    .filter(|p| !p.trim().is_empty())
                    .map(PathBuf::from),
            },
            other => {
                return Err(ConfigError::Invalid(
                    "STORAGE_BACKEND",
                    format!("expected 'firestore' or 'memory', got '{}'", other),
                ))
            }
        };

        let category_policy = match env::var("CATEGORY_POLICY") {
            Ok(raw) => raw
                .parse()
                .map_err(|e| ConfigError::Invalid("CATEGORY_POLICY", e))?,
            Err(_) => CategoryPolicy::default(),
        };

        let bcrypt_cost = match env::var("BCRYPT_COST") {
            Ok(raw) => raw
                .trim()
                .parse()
                .map_err(|_| ConfigError::Invalid("BCRYPT_COST", raw.clone()))?,
            Err(_) => DEFAULT_BCRYPT_COST,
        };
        if !(MIN_BCRYPT_COST..=MAX_BCRYPT_COST).contains(&bcrypt_cost) {
            return Err(ConfigError::Invalid(
                "BCRYPT_COST",
                format!(
                    "{} (must be {}-{})",
                    bcrypt_cost, MIN_BCRYPT_COST, MAX_BCRYPT_COST
                ),
            ));
        }

        Ok(Self {
            frontend_url: env::var("FRONTEND_URL")
                .unwrap_or_else(|_| "http://localhost:5173".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()
                .unwrap_or(8080),
            storage,
            category_policy,
            gemini_model: env::var("GEMINI_MODEL")
                .unwrap_or_else(|_| DEFAULT_GEMINI_MODEL.to_string()),
            bcrypt_cost,

            jwt_signing_key: env::var("JWT_SIGNING_KEY")
                .map_err(|_| ConfigError::Missing("JWT_SIGNING_KEY"))?
                .into_bytes(),
            gemini_api_key: env::var("GEMINI_API_KEY")
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty()),
            bootstrap_dev_password: env::var("BOOTSTRAP_DEV_PASSWORD")
                .map(|v| v.trim().to_string())
                .unwrap_or_else(|_| "admin".to_string()),
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {0}: {1}")]
    Invalid(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    // Single test touching the process environment, so no cross-test races.
    #[test]
    fn test_config_from_env() {
        env::set_var("JWT_SIGNING_KEY", "test_jwt_key_32_bytes_minimum!!");
        env::set_var("STORAGE_BACKEND", "memory");
        env::set_var("CATEGORY_POLICY", "strict");
        env::remove_var("BCRYPT_COST");
        env::remove_var("DATA_FILE");

        let config = Config::from_env().expect("Config should load");

        assert_eq!(config.storage, StorageBackend::Memory { data_file: None });
        assert_eq!(config.category_policy, CategoryPolicy::Strict);
        assert_eq!(config.bcrypt_cost, DEFAULT_BCRYPT_COST);

        env::set_var("BCRYPT_COST", "4");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("BCRYPT_COST", _)));

        env::remove_var("BCRYPT_COST");
        env::set_var("STORAGE_BACKEND", "postgres");
        let err = Config::from_env().unwrap_err();
        assert!(matches!(err, ConfigError::Invalid("STORAGE_BACKEND", _)));

        env::remove_var("STORAGE_BACKEND");
        env::remove_var("CATEGORY_POLICY");
    }
}
