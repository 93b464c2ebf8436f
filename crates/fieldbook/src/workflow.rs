//! # Workflow
//!
//! Every entity moves through a fixed set of states:
//!
//! ```text
//! pending-entry ──► pending-review ──► complete
//!                     ▲        │
//!                     │        ▼
//!                 pending-correction
//! ```
//!
//! `complete` has no outgoing transitions and makes the entity read-only.
//! An entity that was never saved is implicitly `pending-entry`.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StateName {
    PendingEntry,
    PendingReview,
    PendingCorrection,
    Complete,
}

impl StateName {
    pub const ALL: [StateName; 4] = [
        StateName::PendingEntry,
        StateName::PendingReview,
        StateName::PendingCorrection,
        StateName::Complete,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            StateName::PendingEntry => "pending-entry",
            StateName::PendingReview => "pending-review",
            StateName::PendingCorrection => "pending-correction",
            StateName::Complete => "complete",
        }
    }

    /// States reachable in one step from `self`.
    pub fn successors(&self) -> &'static [StateName] {
        allowed_successors(*self)
    }

    pub fn is_terminal(&self) -> bool {
        self.successors().is_empty()
    }
}

impl fmt::Display for StateName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StateName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        StateName::ALL
            .into_iter()
            .find(|state| state.as_str() == s)
            .ok_or_else(|| format!("unknown state '{}'", s))
    }
}

/// The static transition table.
pub fn allowed_successors(state: StateName) -> &'static [StateName] {
    match state {
        StateName::PendingEntry => &[StateName::PendingReview],
        StateName::PendingReview => &[StateName::PendingCorrection, StateName::Complete],
        StateName::PendingCorrection => &[StateName::PendingReview],
        StateName::Complete => &[],
    }
}

/// Which transitions a form offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TransitionMode {
    /// No workflow sub-form
    #[default]
    None,
    /// Successors of the entity's current state
    Available,
    /// Every state
    All,
}

impl TransitionMode {
    /// States to offer for an entity currently in `current`.
    ///
    /// An entity without a state is treated as `pending-entry`.
    pub fn offered(&self, current: Option<StateName>) -> Vec<StateName> {
        match self {
            TransitionMode::None => Vec::new(),
            TransitionMode::All => StateName::ALL.to_vec(),
            TransitionMode::Available => {
                allowed_successors(current.unwrap_or(StateName::PendingEntry)).to_vec()
            }
        }
    }
}
