//! Capability matrix: which remote operations can satisfy an admin intent
//! for a listing of a given origin and status.
//!
//! Chains are ordered. The dispatcher tries them strictly in sequence and
//! stops at the first success. A `(intent, origin, status)` cell with no
//! chain is an invalid transition and must fail before any remote call.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::status::{Intent, Origin, Status};

/// Reason sent with a reject when the caller supplies none.
pub const DEFAULT_REJECT_REASON: &str = "Rejected from admin console";

/// A single request/acknowledge call against the listing store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Operation {
    ApproveRequest,
    RejectRequest,
    ApproveListing,
    RejectListing,
    DeleteListing,
    ToggleActivation,
    /// Raw field patch setting `approved = true, active = true`.
    PatchApproved,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ApproveRequest => "approve-request",
            Self::RejectRequest => "reject-request",
            Self::ApproveListing => "approve-listing",
            Self::RejectListing => "reject-listing",
            Self::DeleteListing => "delete-listing",
            Self::ToggleActivation => "toggle-activation",
            Self::PatchApproved => "direct-field-patch",
        }
    }

    /// Irreversible and loses the reject reason upstream.
    pub fn is_lossy(&self) -> bool {
        matches!(self, Self::DeleteListing)
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether rejecting a direct listing may fall back to deleting it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum RejectPolicy {
    /// `reject-listing`, then `delete-listing` if the reject endpoint fails.
    #[default]
    AllowDeleteFallback,
    /// `reject-listing` only.
    RequireRejectEndpoint,
}

impl FromStr for RejectPolicy {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "allow-delete-fallback" => Ok(Self::AllowDeleteFallback),
            "require-reject-endpoint" => Ok(Self::RequireRejectEndpoint),
            other => Err(CoreError::Validation(format!(
                "Invalid reject policy '{other}'. Must be one of: allow-delete-fallback, require-reject-endpoint"
            ))),
        }
    }
}

const APPROVE_REQUEST: &[Operation] = &[Operation::ApproveRequest];
const APPROVE_LISTING: &[Operation] = &[Operation::ApproveListing, Operation::PatchApproved];
const TOGGLE: &[Operation] = &[Operation::ToggleActivation];
const REJECT_REQUEST: &[Operation] = &[Operation::RejectRequest];
const REJECT_OR_DELETE: &[Operation] = &[Operation::RejectListing, Operation::DeleteListing];
const REJECT_ONLY: &[Operation] = &[Operation::RejectListing];

/// Status a listing reaches when `intent` succeeds from `status`, or
/// `None` if the lifecycle has no such edge.
pub fn next_status(status: Status, intent: Intent) -> Option<Status> {
    match (status, intent) {
        (Status::Pending, Intent::Approve) => Some(Status::Active),
        (Status::Suspended, Intent::Approve) => Some(Status::Active),
        (Status::Pending | Status::Suspended, Intent::Reject) => Some(Status::Rejected),
        (Status::Active, Intent::ToggleActivation) => Some(Status::Suspended),
        (Status::Suspended, Intent::ToggleActivation) => Some(Status::Active),
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CapabilityMatrix {
    reject_policy: RejectPolicy,
}

impl CapabilityMatrix {
    pub fn new(reject_policy: RejectPolicy) -> Self {
        Self { reject_policy }
    }

    pub fn reject_policy(&self) -> RejectPolicy {
        self.reject_policy
    }

    /// Ordered candidate operations for an intent, or `None` when the
    /// transition is not allowed.
    pub fn candidates(&self, origin: Origin, status: Status, intent: Intent) -> Option<&'static [Operation]> {
        next_status(status, intent)?;

        match (intent, origin, status) {
            (Intent::Approve, Origin::ApprovalRequest, Status::Pending) => Some(APPROVE_REQUEST),
            (Intent::Approve, Origin::DirectListing, Status::Pending) => Some(APPROVE_LISTING),
            (Intent::Approve, Origin::DirectListing, Status::Suspended) => Some(TOGGLE),
            (Intent::Reject, Origin::ApprovalRequest, Status::Pending) => Some(REJECT_REQUEST),
            (Intent::Reject, Origin::DirectListing, _) => Some(match self.reject_policy {
                RejectPolicy::AllowDeleteFallback => REJECT_OR_DELETE,
                RejectPolicy::RequireRejectEndpoint => REJECT_ONLY,
            }),
            (Intent::ToggleActivation, Origin::DirectListing, _) => Some(TOGGLE),
            _ => None,
        }
    }

    /// Intents that have a candidate chain for this origin and status.
    pub fn allowed_intents(&self, origin: Origin, status: Status) -> Vec<Intent> {
        Intent::ALL
            .into_iter()
            .filter(|intent| self.candidates(origin, status, *intent).is_some())
            .collect()
    }
}
