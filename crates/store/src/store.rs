use std::future::Future;

use serde::Serialize;

use parkctl_core::record::{ApprovalRequestRecord, ListingRecord};
use parkctl_core::types::DbId;

use crate::error::StoreError;

/// Partial update of a parking-lot record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FieldPatch {
    #[serde(rename = "aprobado", skip_serializing_if = "Option::is_none")]
    pub approved: Option<bool>,
    #[serde(rename = "activo", skip_serializing_if = "Option::is_none")]
    pub active: Option<bool>,
}

impl FieldPatch {
    /// The patch used to approve a lot when the approve endpoint fails.
    pub fn approve_and_activate() -> Self {
        Self {
            approved: Some(true),
            active: Some(true),
        }
    }
}

/// Operations offered by the remote listing store.
///
/// Each call is a single request/acknowledge step. Retries, timeouts and
/// cancellation belong to the implementation's transport.
pub trait ListingStore: Send + Sync {
    /// Every canonical parking lot.
    fn list_direct_listings(&self) -> impl Future<Output = Result<Vec<ListingRecord>, StoreError>> + Send;

    /// Lots awaiting approval (narrower fallback endpoint).
    fn list_pending_listings(&self) -> impl Future<Output = Result<Vec<ListingRecord>, StoreError>> + Send;

    /// Approved lots (narrower fallback endpoint).
    fn list_approved_listings(&self) -> impl Future<Output = Result<Vec<ListingRecord>, StoreError>> + Send;

    /// Approval requests still awaiting a decision.
    fn list_pending_approval_requests(
        &self,
    ) -> impl Future<Output = Result<Vec<ApprovalRequestRecord>, StoreError>> + Send;

    fn approve_listing(&self, id: DbId) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn reject_listing(&self, id: DbId) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn delete_listing(&self, id: DbId) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn toggle_activation(&self, id: DbId) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn patch_listing_fields(
        &self,
        id: DbId,
        fields: &FieldPatch,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn approve_request(&self, request_id: DbId) -> impl Future<Output = Result<(), StoreError>> + Send;

    fn reject_request(
        &self,
        request_id: DbId,
        reason: &str,
    ) -> impl Future<Output = Result<(), StoreError>> + Send;
}
