//! Listing status, origin and admin intents, plus the status classifier.
//!
//! The backend reports status in two incompatible shapes: an explicit
//! `status` string on some endpoints, and independent `aprobado` / `activo`
//! booleans on others. [`classify`] folds both into exactly one [`Status`].

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Status string for a listing that is live and bookable.
pub const STATUS_ACTIVE: &str = "active";

/// Status string for a listing awaiting an admin decision.
pub const STATUS_PENDING: &str = "pending";

/// Status string for an approved listing that has been switched off.
pub const STATUS_SUSPENDED: &str = "suspended";

/// Status string for a rejected (soft-deleted upstream) listing.
pub const STATUS_REJECTED: &str = "rejected";

/// All recognized status strings.
pub const VALID_STATUSES: &[&str] = &[
    STATUS_ACTIVE,
    STATUS_PENDING,
    STATUS_SUSPENDED,
    STATUS_REJECTED,
];

/// Canonical listing status. Exactly one per listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Status {
    Pending,
    Active,
    Suspended,
    /// Terminal. No transition leaves this state.
    Rejected,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => STATUS_PENDING,
            Self::Active => STATUS_ACTIVE,
            Self::Suspended => STATUS_SUSPENDED,
            Self::Rejected => STATUS_REJECTED,
        }
    }

    /// Human-readable badge label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Active => "Active",
            Self::Suspended => "Suspended",
            Self::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Rejected)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = CoreError;

    /// Case-insensitive parse over the fixed vocabulary.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            STATUS_ACTIVE => Ok(Self::Active),
            STATUS_PENDING => Ok(Self::Pending),
            STATUS_SUSPENDED => Ok(Self::Suspended),
            STATUS_REJECTED => Ok(Self::Rejected),
            _ => Err(CoreError::Validation(format!(
                "Invalid status '{s}'. Must be one of: {}",
                VALID_STATUSES.join(", ")
            ))),
        }
    }
}

/// Which backend collection a listing came from. Decides the operation
/// family used to act on it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Origin {
    /// A canonical parking-lot record.
    DirectListing,
    /// An owner-submitted approval request with no canonical record yet.
    ApprovalRequest,
}

/// Admin-level action, independent of the remote operation that
/// satisfies it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Approve,
    Reject,
    ToggleActivation,
}

impl Intent {
    pub const ALL: [Intent; 3] = [Intent::Approve, Intent::Reject, Intent::ToggleActivation];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Approve => "approve",
            Self::Reject => "reject",
            Self::ToggleActivation => "toggle_activation",
        }
    }
}

impl fmt::Display for Intent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The raw fields the classifier looks at.
#[derive(Debug, Clone, Copy, Default)]
pub struct StatusFields<'a> {
    pub status: Option<&'a str>,
    pub approved: Option<bool>,
    pub active: Option<bool>,
}

/// Result of classifying a record: the canonical status plus the raw
/// status string when it fell outside the vocabulary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Classification {
    pub status: Status,
    /// Unrecognized explicit status, kept for display.
    pub unrecognized: Option<String>,
}

/// Derive the canonical status of a record. Pure and total.
///
/// Priority:
/// 1. a non-empty explicit `status` string, mapped over the vocabulary;
///    unrecognized strings classify as `Pending`,
/// 2. the `approved` / `active` booleans,
/// 3. `Pending`.
pub fn classify(fields: StatusFields<'_>) -> Status {
    classify_detailed(fields).status
}

/// Like [`classify`], but also reports an unrecognized explicit status.
pub fn classify_detailed(fields: StatusFields<'_>) -> Classification {
    if let Some(raw) = fields.status.map(str::trim).filter(|s| !s.is_empty()) {
        return match raw.parse::<Status>() {
            Ok(status) => Classification {
                status,
                unrecognized: None,
            },
            Err(_) => Classification {
                status: Status::Pending,
                unrecognized: Some(raw.to_string()),
            },
        };
    }

    let status = match fields.approved {
        Some(false) => Status::Pending,
        Some(true) if fields.active == Some(true) => Status::Active,
        Some(true) => Status::Suspended,
        None => Status::Pending,
    };
    Classification {
        status,
        unrecognized: None,
    }
}
