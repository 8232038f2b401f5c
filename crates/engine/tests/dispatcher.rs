//! Dispatcher candidate chains against a scripted store.

mod common;

use std::sync::Arc;

use assert_matches::assert_matches;
use serde_json::json;

use common::ScriptedStore;
use parkctl_core::capability::{CapabilityMatrix, Operation, RejectPolicy, DEFAULT_REJECT_REASON};
use parkctl_core::listing::CanonicalListing;
use parkctl_core::status::{Intent, Origin, Status};
use parkctl_core::types::ListingId;
use parkctl_engine::{DispatchError, Dispatcher, Reconciler};
use parkctl_store::StoreError;

struct Harness {
    store: Arc<ScriptedStore>,
    reconciler: Reconciler<ScriptedStore>,
    dispatcher: Dispatcher<ScriptedStore>,
}

impl Harness {
    fn new(store: ScriptedStore) -> Self {
        Self::with_policy(store, RejectPolicy::default())
    }

    fn with_policy(store: ScriptedStore, policy: RejectPolicy) -> Self {
        let store = Arc::new(store);
        Self {
            reconciler: Reconciler::new(Arc::clone(&store)),
            dispatcher: Dispatcher::new(Arc::clone(&store), CapabilityMatrix::new(policy)),
            store,
        }
    }

    async fn listings(&self) -> Vec<CanonicalListing> {
        self.reconciler.reconcile().await.unwrap()
    }

    /// Refetch and return one listing, leaving the call log empty.
    async fn listing(&self, id: ListingId) -> CanonicalListing {
        let listing = self
            .listings()
            .await
            .into_iter()
            .find(|l| l.id == id)
            .unwrap_or_else(|| panic!("listing {id} missing"));
        self.store.clear_calls();
        listing
    }
}

fn two_sources() -> ScriptedStore {
    ScriptedStore::new()
        .with_lots(json!([{ "id": 1, "nombre": "Lot A", "aprobado": false }]))
        .with_requests(json!([{ "id": 9, "estacionamiento_creado": null, "nombre": "Lot B" }]))
}

// ---------------------------------------------------------------------------
// Approval requests
// ---------------------------------------------------------------------------

/// Approving a synthetic request entry only calls the request endpoint, and
/// the request is gone after the next refresh.
#[tokio::test]
async fn approving_request_targets_request_endpoint_only() {
    let h = Harness::new(two_sources());
    let listing = h.listing(ListingId::Request(9)).await;

    let ack = h.dispatcher.execute(&listing, Intent::Approve, None).await.unwrap();

    assert_eq!(ack.operation, Operation::ApproveRequest);
    assert_eq!(ack.attempts, 1);
    assert!(ack.refresh_required);
    assert_eq!(h.store.action_calls(), vec!["approve_request(9)"]);

    let after = h.listings().await;
    assert!(after.iter().all(|l| l.id != ListingId::Request(9)));
    assert!(after.iter().any(|l| l.id == ListingId::Lot(1)));
}

/// Rejecting a request sends the caller's reason.
#[tokio::test]
async fn rejecting_request_sends_reason() {
    let h = Harness::new(two_sources());
    let listing = h.listing(ListingId::Request(9)).await;

    h.dispatcher
        .execute(&listing, Intent::Reject, Some("Duplicate submission"))
        .await
        .unwrap();

    assert_eq!(h.store.action_calls(), vec!["reject_request(9, Duplicate submission)"]);
}

/// A blank reason is replaced by the default one.
#[tokio::test]
async fn blank_reason_uses_default() {
    let h = Harness::new(two_sources());
    let listing = h.listing(ListingId::Request(9)).await;

    h.dispatcher.execute(&listing, Intent::Reject, Some("   ")).await.unwrap();

    assert_eq!(
        h.store.action_calls(),
        vec![format!("reject_request(9, {DEFAULT_REJECT_REASON})")]
    );
}

/// Requests cannot be toggled; nothing is sent.
#[tokio::test]
async fn toggling_request_is_invalid() {
    let h = Harness::new(two_sources());
    let listing = h.listing(ListingId::Request(9)).await;

    let err = h
        .dispatcher
        .execute(&listing, Intent::ToggleActivation, None)
        .await
        .unwrap_err();

    assert_matches!(
        err,
        DispatchError::InvalidTransition { origin: Origin::ApprovalRequest, .. }
    );
    assert!(err.is_local());
    assert!(h.store.calls().is_empty());
}

// ---------------------------------------------------------------------------
// Direct listings
// ---------------------------------------------------------------------------

/// The approve endpoint failing falls back to the field patch, and the chain
/// stops at the first success.
#[tokio::test]
async fn approve_falls_back_to_field_patch() {
    let h = Harness::new(two_sources().failing("approve_listing"));
    let listing = h.listing(ListingId::Lot(1)).await;

    let ack = h.dispatcher.execute(&listing, Intent::Approve, None).await.unwrap();

    assert_eq!(ack.operation, Operation::PatchApproved);
    assert_eq!(ack.attempts, 2);
    assert!(ack.used_fallback());
    assert_eq!(ack.recorded_reason, None);
    assert_eq!(
        h.store.action_calls(),
        vec!["approve_listing(1)", "patch_listing_fields(1)"]
    );

    let lot = h.listing(ListingId::Lot(1)).await;
    assert_eq!(lot.status, Status::Active);
}

/// The first candidate succeeding means no fallback is attempted.
#[tokio::test]
async fn approve_stops_at_first_success() {
    let h = Harness::new(two_sources());
    let listing = h.listing(ListingId::Lot(1)).await;

    let ack = h.dispatcher.execute(&listing, Intent::Approve, None).await.unwrap();

    assert_eq!(ack.operation, Operation::ApproveListing);
    assert!(!ack.used_fallback());
    assert_eq!(h.store.action_calls(), vec!["approve_listing(1)"]);
}

/// Every candidate failing reports the last failure and mutates nothing.
#[tokio::test]
async fn exhausted_chain_reports_last_failure() {
    let h = Harness::new(
        two_sources()
            .failing("approve_listing")
            .failing("patch_listing_fields"),
    );
    let listing = h.listing(ListingId::Lot(1)).await;

    let err = h.dispatcher.execute(&listing, Intent::Approve, None).await.unwrap_err();

    assert_matches!(
        &err,
        DispatchError::Exhausted {
            operation: Operation::PatchApproved,
            attempts: 2,
            last: StoreError::Api { status: 500, .. },
            ..
        }
    );
    assert!(!err.is_local());
    assert_eq!(h.store.mutations(), 0);

    let lot = h.listing(ListingId::Lot(1)).await;
    assert_eq!(lot.status, Status::Pending);
}

/// Reject endpoint down: the lot is deleted and the reason recorded.
#[tokio::test]
async fn reject_falls_back_to_delete() {
    let h = Harness::new(two_sources().failing("reject_listing"));
    let listing = h.listing(ListingId::Lot(1)).await;

    let ack = h
        .dispatcher
        .execute(&listing, Intent::Reject, Some("Fake address"))
        .await
        .unwrap();

    assert_eq!(ack.operation, Operation::DeleteListing);
    assert_eq!(ack.recorded_reason.as_deref(), Some("Fake address"));
    assert_eq!(h.store.action_calls(), vec!["reject_listing(1)", "delete_listing(1)"]);
    assert!(h.listings().await.iter().all(|l| l.id != ListingId::Lot(1)));
}

/// With delete disallowed the reject endpoint is the only candidate.
#[tokio::test]
async fn strict_policy_never_deletes() {
    let h = Harness::with_policy(
        two_sources().failing("reject_listing"),
        RejectPolicy::RequireRejectEndpoint,
    );
    let listing = h.listing(ListingId::Lot(1)).await;

    let err = h.dispatcher.execute(&listing, Intent::Reject, None).await.unwrap_err();

    assert_matches!(err, DispatchError::Exhausted { attempts: 1, .. });
    assert_eq!(h.store.action_calls(), vec!["reject_listing(1)"]);
    assert_eq!(h.store.mutations(), 0);
}

/// Toggle flips an active lot to suspended and back.
#[tokio::test]
async fn toggle_round_trips_activation() {
    let h = Harness::new(
        ScriptedStore::new().with_lots(json!([{ "id": 3, "aprobado": true, "activo": true }])),
    );

    let active = h.listing(ListingId::Lot(3)).await;
    assert_eq!(active.status, Status::Active);
    h.dispatcher.execute(&active, Intent::ToggleActivation, None).await.unwrap();

    let suspended = h.listing(ListingId::Lot(3)).await;
    assert_eq!(suspended.status, Status::Suspended);
    h.dispatcher.execute(&suspended, Intent::ToggleActivation, None).await.unwrap();

    assert_eq!(h.listing(ListingId::Lot(3)).await.status, Status::Active);
}

/// Approving a suspended lot reactivates it through the toggle endpoint.
#[tokio::test]
async fn approving_suspended_lot_reactivates() {
    let h = Harness::new(
        ScriptedStore::new().with_lots(json!([{ "id": 3, "aprobado": true, "activo": false }])),
    );
    let listing = h.listing(ListingId::Lot(3)).await;

    let ack = h.dispatcher.execute(&listing, Intent::Approve, None).await.unwrap();

    assert_eq!(ack.operation, Operation::ToggleActivation);
    assert_eq!(h.store.action_calls(), vec!["toggle_activation(3)"]);
}

/// Terminal and out-of-lifecycle intents fail before any remote call.
#[tokio::test]
async fn invalid_transitions_make_no_calls() {
    let h = Harness::new(ScriptedStore::new().with_lots(json!([
        { "id": 1, "status": "rejected" },
        { "id": 2, "aprobado": true, "activo": true },
        { "id": 3, "aprobado": false },
    ])));
    let listings = h.listings().await;
    h.store.clear_calls();
    let [rejected, active, pending] = [1, 2, 3].map(|id| {
        listings
            .iter()
            .find(|l| l.id == ListingId::Lot(id))
            .cloned()
            .unwrap()
    });

    for intent in Intent::ALL {
        let err = h.dispatcher.execute(&rejected, intent, None).await.unwrap_err();
        assert_matches!(err, DispatchError::InvalidTransition { status: Status::Rejected, .. });
    }
    assert_matches!(
        h.dispatcher.execute(&active, Intent::Approve, None).await,
        Err(DispatchError::InvalidTransition { .. })
    );
    assert_matches!(
        h.dispatcher.execute(&pending, Intent::ToggleActivation, None).await,
        Err(DispatchError::InvalidTransition { .. })
    );

    assert!(h.store.calls().is_empty());
}

/// A listing whose identity does not match its origin is refused before
/// any call, instead of being sent with a placeholder id.
#[tokio::test]
async fn listing_without_usable_id_is_malformed() {
    let h = Harness::new(
        two_sources().with_requests(json!([{ "id": 9, "estacionamiento_creado": 5 }])),
    );
    let mut direct = h.listing(ListingId::Lot(1)).await;
    direct.id = ListingId::Request(4);
    let mut request = h.listing(ListingId::Lot(5)).await;
    request.approval_request_id = None;

    assert_matches!(
        h.dispatcher.execute(&direct, Intent::Approve, None).await,
        Err(DispatchError::MalformedListing { reason: "no parking lot id", .. })
    );
    assert_matches!(
        h.dispatcher.execute(&request, Intent::Reject, Some("dup")).await,
        Err(DispatchError::MalformedListing { operation: Operation::RejectRequest, .. })
    );
    assert!(h.store.calls().is_empty());
}
