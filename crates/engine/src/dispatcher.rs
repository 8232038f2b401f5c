//! Executes admin intents against the listing store.
//!
//! The capability matrix picks an ordered chain of candidate operations for
//! the listing's origin and status. Candidates run strictly in sequence: the
//! first success wins, any failure advances to the next candidate, and
//! exhaustion reports the last failure. The dispatcher never edits local
//! state; a successful acknowledgement always requires a refetch.

use std::sync::Arc;

use serde::Serialize;

use parkctl_core::capability::{CapabilityMatrix, Operation, DEFAULT_REJECT_REASON};
use parkctl_core::listing::CanonicalListing;
use parkctl_core::status::{Intent, Origin};
use parkctl_core::types::{DbId, ListingId};
use parkctl_store::{FieldPatch, ListingStore, StoreError};

use crate::error::DispatchError;

/// Successful outcome of [`Dispatcher::execute`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DispatchAck {
    pub listing_id: ListingId,
    pub intent: Intent,
    /// The candidate that succeeded.
    pub operation: Operation,
    /// Candidates tried, including the successful one.
    pub attempts: usize,
    /// Reject reason kept client-side because the succeeding operation
    /// could not carry it upstream.
    pub recorded_reason: Option<String>,
    /// The canonical set is stale until rebuilt by the reconciler.
    pub refresh_required: bool,
}

impl DispatchAck {
    pub fn used_fallback(&self) -> bool {
        self.attempts > 1
    }
}

/// Resolved ids an operation is sent with.
#[derive(Debug, Clone, Copy)]
struct Target {
    lot_id: Option<DbId>,
    request_id: Option<DbId>,
}

impl Target {
    fn of(listing: &CanonicalListing) -> Self {
        let request_id = listing.approval_request_id.or(match listing.id {
            ListingId::Request(id) => Some(id),
            ListingId::Lot(_) => None,
        });
        let lot_id = match listing.origin {
            Origin::DirectListing => listing.id.lot_id(),
            Origin::ApprovalRequest => None,
        };
        Self { lot_id, request_id }
    }

    /// The database id `operation` is sent with.
    fn resolve(&self, id: ListingId, operation: Operation) -> Result<DbId, DispatchError> {
        let (resolved, reason) = match operation {
            Operation::ApproveRequest | Operation::RejectRequest => {
                (self.request_id, "no approval request id")
            }
            _ => (self.lot_id, "no parking lot id"),
        };
        resolved.ok_or(DispatchError::MalformedListing { id, operation, reason })
    }
}

pub struct Dispatcher<S> {
    store: Arc<S>,
    matrix: CapabilityMatrix,
}

impl<S> Clone for Dispatcher<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
            matrix: self.matrix,
        }
    }
}

impl<S: ListingStore> Dispatcher<S> {
    pub fn new(store: Arc<S>, matrix: CapabilityMatrix) -> Self {
        Self { store, matrix }
    }

    pub fn matrix(&self) -> &CapabilityMatrix {
        &self.matrix
    }

    /// Execute `intent` on `listing`.
    ///
    /// `reason` only applies to [`Intent::Reject`]; when absent,
    /// [`DEFAULT_REJECT_REASON`] is used. Invalid transitions and listings
    /// missing a required id fail before any remote call.
    pub async fn execute(
        &self,
        listing: &CanonicalListing,
        intent: Intent,
        reason: Option<&str>,
    ) -> Result<DispatchAck, DispatchError> {
        let chain = self
            .matrix
            .candidates(listing.origin, listing.status, intent)
            .ok_or(DispatchError::InvalidTransition {
                id: listing.id,
                origin: listing.origin,
                status: listing.status,
                intent,
            })?;

        let target = Target::of(listing);
        let steps = chain
            .iter()
            .map(|&operation| {
                target
                    .resolve(listing.id, operation)
                    .map(|db_id| (operation, db_id))
            })
            .collect::<Result<Vec<_>, _>>()?;

        let reason = reason
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .unwrap_or(DEFAULT_REJECT_REASON);

        let mut last: Option<(Operation, StoreError)> = None;
        for (index, (operation, db_id)) in steps.iter().copied().enumerate() {
            if operation.is_lossy() {
                tracing::warn!(
                    listing_id = %listing.id,
                    %operation,
                    reason,
                    "Reject endpoint failed; deleting listing, reason kept client-side",
                );
            }

            match self.run(operation, db_id, reason).await {
                Ok(()) => {
                    tracing::info!(
                        listing_id = %listing.id,
                        %intent,
                        %operation,
                        attempts = index + 1,
                        "Listing action acknowledged",
                    );
                    return Ok(DispatchAck {
                        listing_id: listing.id,
                        intent,
                        operation,
                        attempts: index + 1,
                        recorded_reason: operation.is_lossy().then(|| reason.to_string()),
                        refresh_required: true,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        listing_id = %listing.id,
                        %operation,
                        status_code = e.status_code(),
                        error = %e,
                        "Candidate operation failed",
                    );
                    last = Some((operation, e));
                }
            }
        }

        let attempts = steps.len();
        match last {
            Some((operation, last)) => {
                tracing::error!(
                    listing_id = %listing.id,
                    %intent,
                    attempts,
                    error = %last,
                    "All candidate operations failed",
                );
                Err(DispatchError::Exhausted {
                    id: listing.id,
                    intent,
                    operation,
                    attempts,
                    last,
                })
            }
            // The matrix never yields an empty chain.
            None => Err(DispatchError::InvalidTransition {
                id: listing.id,
                origin: listing.origin,
                status: listing.status,
                intent,
            }),
        }
    }

    async fn run(&self, operation: Operation, db_id: DbId, reason: &str) -> Result<(), StoreError> {
        match operation {
            Operation::ApproveRequest => self.store.approve_request(db_id).await,
            Operation::RejectRequest => self.store.reject_request(db_id, reason).await,
            Operation::ApproveListing => self.store.approve_listing(db_id).await,
            Operation::RejectListing => self.store.reject_listing(db_id).await,
            Operation::DeleteListing => self.store.delete_listing(db_id).await,
            Operation::ToggleActivation => self.store.toggle_activation(db_id).await,
            Operation::PatchApproved => {
                self.store
                    .patch_listing_fields(db_id, &FieldPatch::approve_and_activate())
                    .await
            }
        }
    }
}
