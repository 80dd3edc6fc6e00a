// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! JudoTrack: competition tracking for a judo club
//!
//! This crate provides the backend API for recording athletes' competition
//! results and deciding which competitions each club member may see and
//! enter.

pub mod config;
pub mod db;
pub mod error;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod time_utils;

use config::Config;
use db::Database;
use services::{AccountService, FeedbackService, VisibilityFilter};

/// Shared application state.
pub struct AppState {
    pub config: Config,
    pub db: Database,
    pub visibility: VisibilityFilter,
    pub accounts: AccountService,
    pub feedback: FeedbackService,
}

impl AppState {
    /// Wire the services for `config` on top of an opened database.
    pub fn new(config: Config, db: Database) -> Self {
        let visibility = VisibilityFilter::new(config.category_policy);
        let accounts = AccountService::new(db.clone(), config.bcrypt_cost);
        let feedback =
            FeedbackService::new(config.gemini_api_key.clone(), config.gemini_model.clone());

        Self {
            config,
            db,
            visibility,
            accounts,
            feedback,
        }
    }
}
