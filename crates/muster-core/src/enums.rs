//! Categories, sign actions, presence status, and lifecycle states for Muster.
//!
//! All enums use `snake_case` serialization via `#[serde(rename_all = "snake_case")]`.
//! `RecoveryState` provides `allowed_next_states()` to enforce valid lifecycle
//! transitions at the store layer.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::CoreError;

// ---------------------------------------------------------------------------
// Category
// ---------------------------------------------------------------------------

/// Which roster a person belongs to. Staff and client id spaces are disjoint.
///
/// Declaration order is the reconciliation sort order: staff before clients.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Staff,
    Client,
}

impl Category {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Staff => "staff",
            Self::Client => "client",
        }
    }

    /// Title-cased label used in reports and channel messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Staff => "Staff",
            Self::Client => "Client",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "staff" => Ok(Self::Staff),
            "client" | "clients" => Ok(Self::Client),
            other => Err(CoreError::Validation(format!(
                "unsupported person type '{other}' (expected staff or client)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// SignAction
// ---------------------------------------------------------------------------

/// The action carried by a sign event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SignAction {
    SignIn,
    SignOut,
}

impl SignAction {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign_in",
            Self::SignOut => "sign_out",
        }
    }
}

impl fmt::Display for SignAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SignAction {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "sign_in" | "in" => Ok(Self::SignIn),
            "sign_out" | "out" => Ok(Self::SignOut),
            other => Err(CoreError::Validation(format!(
                "unsupported action '{other}' (expected sign_in or sign_out)"
            ))),
        }
    }
}

// ---------------------------------------------------------------------------
// PresenceStatus
// ---------------------------------------------------------------------------

/// Latest known status of a person on a given day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PresenceStatus {
    SignIn,
    SignOut,
    NoEvent,
}

impl PresenceStatus {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SignIn => "sign_in",
            Self::SignOut => "sign_out",
            Self::NoEvent => "no_event",
        }
    }

    /// Only a standing sign-in counts as present.
    #[must_use]
    pub const fn is_present(self) -> bool {
        matches!(self, Self::SignIn)
    }
}

impl From<SignAction> for PresenceStatus {
    fn from(action: SignAction) -> Self {
        match action {
            SignAction::SignIn => Self::SignIn,
            SignAction::SignOut => Self::SignOut,
        }
    }
}

impl fmt::Display for PresenceStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// AttendanceMark
// ---------------------------------------------------------------------------

/// Per-row mark in the daily schedule matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum AttendanceMark {
    Present,
    Absent,
}

impl AttendanceMark {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Present => "present",
            Self::Absent => "absent",
        }
    }
}

impl fmt::Display for AttendanceMark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// RecoveryState
// ---------------------------------------------------------------------------

/// Lifecycle of the durable event log.
///
/// ```text
/// empty → loading → ready ⇄ flushing
///                 → failed
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecoveryState {
    Empty,
    Loading,
    Ready,
    Flushing,
    Failed,
}

impl RecoveryState {
    /// Valid next states from the current state.
    #[must_use]
    #[allow(clippy::match_same_arms)]
    pub const fn allowed_next_states(self) -> &'static [Self] {
        match self {
            Self::Empty => &[Self::Loading],
            Self::Loading => &[Self::Ready, Self::Failed],
            Self::Ready => &[Self::Flushing, Self::Ready],
            Self::Flushing => &[Self::Ready],
            Self::Failed => &[Self::Loading],
        }
    }

    /// Check whether transitioning to `next` is allowed.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        self.allowed_next_states().contains(&next)
    }

    /// Whether the log accepts appends in this state.
    #[must_use]
    pub const fn accepts_appends(self) -> bool {
        matches!(self, Self::Ready | Self::Flushing)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Empty => "empty",
            Self::Loading => "loading",
            Self::Ready => "ready",
            Self::Flushing => "flushing",
            Self::Failed => "failed",
        }
    }
}

impl fmt::Display for RecoveryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
