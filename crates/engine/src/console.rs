//! Caller-side orchestration for the listings screen.
//!
//! [`AdminConsole`] refreshes the canonical set, performs actions through
//! the dispatcher, reports outcomes to the injected notifier, and refetches
//! after every successful action. At most one action per listing id is in
//! flight at a time; actions on different listings may run concurrently.

use std::collections::HashSet;
use std::sync::{Arc, Mutex};

use parkctl_core::capability::{CapabilityMatrix, Operation};
use parkctl_core::catalog::allowed_intents;
use parkctl_core::listing::CanonicalListing;
use parkctl_core::status::{Intent, Origin, Status};
use parkctl_core::types::ListingId;
use parkctl_store::ListingStore;

use crate::dispatcher::{DispatchAck, Dispatcher};
use crate::error::{ConsoleError, DispatchError};
use crate::notifier::{Notification, Notifier};
use crate::reconciler::Reconciler;

/// Result of [`AdminConsole::perform`].
#[derive(Debug, Clone)]
pub struct ActionOutcome {
    pub ack: DispatchAck,
    /// Canonical set rebuilt after the action, or `None` if that refresh
    /// failed (already reported through the notifier).
    pub listings: Option<Vec<CanonicalListing>>,
}

pub struct AdminConsole<S> {
    reconciler: Reconciler<S>,
    dispatcher: Dispatcher<S>,
    notifier: Arc<dyn Notifier>,
    in_flight: Mutex<HashSet<ListingId>>,
}

/// Marks a listing busy for the guard's lifetime.
struct InFlight<'a> {
    set: &'a Mutex<HashSet<ListingId>>,
    id: ListingId,
}

impl<'a> InFlight<'a> {
    fn acquire(set: &'a Mutex<HashSet<ListingId>>, id: ListingId) -> Option<Self> {
        let mut ids = set.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ids.insert(id).then(|| Self { set, id })
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        let mut ids = self.set.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        ids.remove(&self.id);
    }
}

impl<S: ListingStore> AdminConsole<S> {
    pub fn new(store: Arc<S>, matrix: CapabilityMatrix, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            reconciler: Reconciler::new(Arc::clone(&store)),
            dispatcher: Dispatcher::new(store, matrix),
            notifier,
            in_flight: Mutex::new(HashSet::new()),
        }
    }

    pub fn matrix(&self) -> &CapabilityMatrix {
        self.dispatcher.matrix()
    }

    pub fn allowed_intents(&self, listing: &CanonicalListing) -> Vec<Intent> {
        allowed_intents(listing, self.matrix())
    }

    pub fn is_in_flight(&self, id: ListingId) -> bool {
        self.in_flight
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains(&id)
    }

    /// Rebuild the canonical set. A failed refresh is reported and returned.
    pub async fn refresh(&self) -> Result<Vec<CanonicalListing>, ConsoleError> {
        match self.reconciler.reconcile().await {
            Ok(listings) => Ok(listings),
            Err(e) => {
                self.notifier
                    .notify(Notification::error("Could not load listings from the server"));
                Err(e.into())
            }
        }
    }

    /// Perform `intent` on `listing`, then refetch.
    pub async fn perform(
        &self,
        listing: &CanonicalListing,
        intent: Intent,
        reason: Option<&str>,
    ) -> Result<ActionOutcome, ConsoleError> {
        let _guard = InFlight::acquire(&self.in_flight, listing.id).ok_or_else(|| {
            tracing::warn!(listing_id = %listing.id, %intent, "Action rejected, listing busy");
            ConsoleError::Busy(listing.id)
        })?;

        let ack = match self.dispatcher.execute(listing, intent, reason).await {
            Ok(ack) => ack,
            Err(e) => {
                self.notifier
                    .notify(Notification::error(failure_message(&e)).for_listing(listing.id));
                return Err(e.into());
            }
        };

        self.notifier
            .notify(Notification::success(success_message(listing, &ack)).for_listing(listing.id));

        let listings = self.refresh().await.ok();
        Ok(ActionOutcome { ack, listings })
    }

    /// Refetch, locate `id`, and perform `intent` on it.
    pub async fn perform_by_id(
        &self,
        id: ListingId,
        intent: Intent,
        reason: Option<&str>,
    ) -> Result<ActionOutcome, ConsoleError> {
        let listings = self.refresh().await?;
        let listing = listings
            .into_iter()
            .find(|l| l.id == id)
            .ok_or(ConsoleError::NotFound(id))?;
        self.perform(&listing, intent, reason).await
    }
}

fn success_message(listing: &CanonicalListing, ack: &DispatchAck) -> String {
    match (ack.intent, ack.operation) {
        (Intent::Approve, _) if listing.origin == Origin::ApprovalRequest => {
            "Approval request approved".to_string()
        }
        (Intent::Approve, Operation::ToggleActivation) => "Listing reactivated".to_string(),
        (Intent::Approve, _) => "Listing approved".to_string(),
        (Intent::Reject, Operation::DeleteListing) => "Listing deleted".to_string(),
        (Intent::Reject, _) if listing.origin == Origin::ApprovalRequest => {
            "Approval request rejected".to_string()
        }
        (Intent::Reject, _) => "Listing rejected".to_string(),
        (Intent::ToggleActivation, _) if listing.status == Status::Active => {
            "Listing suspended".to_string()
        }
        (Intent::ToggleActivation, _) => "Listing activated".to_string(),
    }
}

fn failure_message(err: &DispatchError) -> String {
    match err {
        DispatchError::Exhausted { last, .. } => format!("Error: {last}"),
        other => format!("Error: {other}"),
    }
}
