// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Competition visibility and enrollment rules.
//!
//! Decides which competitions a viewer may see and enter, and which
//! mutations an actor may perform. Everything here is a pure function of
//! its inputs: no I/O, no errors. Missing data never widens access.

use crate::models::{
    Competition, CompetitionResult, Profile, Registration, Role, Snapshot, Visibility,
};
use chrono::NaiveDate;
use std::str::FromStr;

/// How `target_category` on a public competition is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CategoryPolicy {
    /// Category is informational; the competition stays visible.
    #[default]
    Advisory,
    /// A viewer whose category differs does not see the competition.
    Strict,
}

impl FromStr for CategoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(Self::Advisory),
            "strict" => Ok(Self::Strict),
            other => Err(format!("unknown category policy '{}'", other)),
        }
    }
}

/// Content an actor may moderate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModerationScope {
    News,
    Users,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct VisibilityFilter {
    category_policy: CategoryPolicy,
}

impl VisibilityFilter {
    pub fn new(category_policy: CategoryPolicy) -> Self {
        Self { category_policy }
    }

    /// Whether `viewer` may see `competition` in listings.
    pub fn is_visible(&self, viewer: &Profile, competition: &Competition) -> bool {
        match competition.visibility {
            Visibility::Restricted => competition.allows(&viewer.id),
            Visibility::Public => match self.category_policy {
                CategoryPolicy::Advisory => true,
                CategoryPolicy::Strict => self.category_matches(viewer, competition),
            },
        }
    }

    /// Absent categories on either side impose no constraint.
    fn category_matches(&self, viewer: &Profile, competition: &Competition) -> bool {
        let target = competition
            .target_category
            .as_ref()
            .filter(|c| !c.is_blank());
        match (target, viewer.effective_category()) {
            (Some(target), Some(own)) => target == own,
            _ => true,
        }
    }

    /// Visible and not yet entered: what an athlete is offered in the
    /// result form.
    pub fn is_eligible_to_enter(
        &self,
        viewer: &Profile,
        competition: &Competition,
        existing_results: &[CompetitionResult],
    ) -> bool {
        self.can_enter(viewer, competition, existing_results)
    }

    /// Only athletes compete: results and registrations are theirs alone.
    pub fn can_compete(&self, actor: &Profile) -> bool {
        match actor.role {
            Role::Athlete => true,
            Role::Coach | Role::Admin | Role::Dev => false,
        }
    }

    /// Whether `viewer` may submit a result against `competition`.
    ///
    /// At most one result per (athlete, competition).
    pub fn can_enter(
        &self,
        viewer: &Profile,
        competition: &Competition,
        existing_results: &[CompetitionResult],
    ) -> bool {
        if !self.can_compete(viewer) || !self.is_visible(viewer, competition) {
            return false;
        }
        !existing_results
            .iter()
            .any(|r| r.athlete_id == viewer.id && r.competition_id == competition.id)
    }

    /// Whether `viewer` may sign up for `competition`: a visible event that
    /// has not happened yet, at most one registration per pair.
    pub fn can_register(
        &self,
        viewer: &Profile,
        competition: &Competition,
        existing_registrations: &[Registration],
        today: NaiveDate,
    ) -> bool {
        if !self.can_compete(viewer) || !self.is_visible(viewer, competition) {
            return false;
        }
        competition.date >= today
            && !existing_registrations
                .iter()
                .any(|r| r.athlete_id == viewer.id && r.competition_id == competition.id)
    }

    /// The athlete answers their own registration; managers confirm or
    /// decline anyone's.
    pub fn can_update_registration(&self, actor: &Profile, registration: &Registration) -> bool {
        actor.id == registration.athlete_id || can_manage_competitions(actor.role)
    }

    /// Whether `actor` may create or edit competition metadata.
    pub fn can_edit(&self, actor: &Profile, _competition: &Competition) -> bool {
        can_manage_competitions(actor.role)
    }

    pub fn can_moderate_content(&self, actor: &Profile, scope: ModerationScope) -> bool {
        match (actor.role, scope) {
            (Role::Admin | Role::Dev, _) => true,
            (Role::Coach, ModerationScope::News) => true,
            (Role::Coach, ModerationScope::Users) => false,
            (Role::Athlete, _) => false,
        }
    }

    /// Athletes see only their own results; staff see everyone's.
    pub fn can_view_results_of(&self, actor: &Profile, athlete_id: &str) -> bool {
        match actor.role {
            Role::Athlete => actor.id == athlete_id,
            Role::Coach | Role::Admin | Role::Dev => true,
        }
    }

    /// Notes belong to the athlete who wrote them.
    pub fn can_edit_notes(&self, actor: &Profile, result: &CompetitionResult) -> bool {
        actor.id == result.athlete_id
    }

    /// Dev accounts and the actor's own account are never deletable.
    pub fn can_delete_user(&self, actor: &Profile, target: &Profile) -> bool {
        if actor.id == target.id {
            return false;
        }
        match target.role {
            Role::Dev => false,
            Role::Athlete | Role::Coach | Role::Admin => {
                self.can_moderate_content(actor, ModerationScope::Users)
            }
        }
    }

    /// Competitions listed for `viewer`: everything for staff, the visible
    /// subset for athletes. Keeps the snapshot's ordering.
    pub fn visible_competitions<'a>(
        &self,
        viewer: &Profile,
        snapshot: &'a Snapshot,
    ) -> Vec<&'a Competition> {
        let manage_all = can_manage_competitions(viewer.role);
        snapshot
            .competitions
            .iter()
            .filter(|c| manage_all || self.is_visible(viewer, c))
            .collect()
    }

    /// Listed competitions from `today` on, soonest first.
    pub fn upcoming_competitions<'a>(
        &self,
        viewer: &Profile,
        snapshot: &'a Snapshot,
        today: NaiveDate,
    ) -> Vec<&'a Competition> {
        let manage_all = can_manage_competitions(viewer.role);
        let mut upcoming: Vec<&Competition> = snapshot
            .competitions
            .iter()
            .filter(|c| c.date >= today && (manage_all || self.is_visible(viewer, c)))
            .collect();
        upcoming.sort_by(|a, b| a.date.cmp(&b.date).then_with(|| a.id.cmp(&b.id)));
        upcoming
    }

    /// Competitions `viewer` may still submit a result for.
    pub fn enterable_competitions<'a>(
        &self,
        viewer: &Profile,
        snapshot: &'a Snapshot,
    ) -> Vec<&'a Competition> {
        snapshot
            .competitions
            .iter()
            .filter(|c| self.can_enter(viewer, c, &snapshot.results))
            .collect()
    }
}

fn can_manage_competitions(role: Role) -> bool {
    match role {
        Role::Coach | Role::Admin | Role::Dev => true,
        Role::Athlete => false,
    }
}
