// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Services module - business logic layer.

pub mod accounts;
pub mod feedback;
pub mod visibility;

pub use accounts::{AccountService, Login, NewAccount};
pub use feedback::{Analysis, FeedbackService};
pub use visibility::{CategoryPolicy, ModerationScope, VisibilityFilter};
