//! Rebuilds the canonical listing set from both backend collections.
//!
//! The direct collection is fetched first, falling back to the pending-only
//! and approved-only endpoints when it fails. Approval requests are always
//! fetched. A failed source contributes nothing; only when both fail does
//! the refresh fail. The merged set is returned whole or not at all.

use std::sync::Arc;

use parkctl_core::listing::{normalize_listing, normalize_request, CanonicalListing};
use parkctl_core::merge::merge;
use parkctl_core::record::ListingRecord;
use parkctl_core::status::{STATUS_ACTIVE, STATUS_PENDING};
use parkctl_store::{ListingStore, StoreError};

use crate::error::{FetchError, PartialFetchError};

/// Source names used in logs.
const SOURCE_DIRECT: &str = "direct_listings";
const SOURCE_PENDING: &str = "pending_listings";
const SOURCE_APPROVED: &str = "approved_listings";
const SOURCE_REQUESTS: &str = "approval_requests";

pub struct Reconciler<S> {
    store: Arc<S>,
}

impl<S> Clone for Reconciler<S> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<S: ListingStore> Reconciler<S> {
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Fetch, classify and merge both collections.
    ///
    /// Fails with [`FetchError`] only when neither source answered.
    pub async fn reconcile(&self) -> Result<Vec<CanonicalListing>, FetchError> {
        let direct = self.fetch_direct().await;
        let requests = self.fetch_requests().await;

        let (requests, direct) = match (requests, direct) {
            (Err(requests), Err(direct)) => {
                let err = FetchError { direct, requests };
                tracing::error!(error = %err, "Listing refresh failed");
                return Err(err);
            }
            (requests, direct) => (
                absorb(SOURCE_REQUESTS, requests),
                absorb(SOURCE_DIRECT, direct),
            ),
        };

        let merged = merge(requests, direct);
        tracing::info!(count = merged.len(), "Listings reconciled");
        Ok(merged)
    }

    async fn fetch_direct(&self) -> Result<Vec<CanonicalListing>, StoreError> {
        match self.store.list_direct_listings().await {
            Ok(records) => Ok(normalize_lots(records)),
            Err(primary) => {
                tracing::warn!(
                    error = %primary,
                    "Direct listings unavailable, trying pending/approved endpoints",
                );
                self.fetch_direct_fallback(primary).await
            }
        }
    }

    /// Pending-only and approved-only endpoints, each tagged with the status
    /// its endpoint implies. Fails with the primary error when both fail.
    async fn fetch_direct_fallback(&self, primary: StoreError) -> Result<Vec<CanonicalListing>, StoreError> {
        let pending = self.store.list_pending_listings().await;
        let approved = self.store.list_approved_listings().await;

        if pending.is_err() && approved.is_err() {
            return Err(primary);
        }

        let tagged = |result: Result<Vec<ListingRecord>, StoreError>, source: &'static str, status: &str| {
            absorb(source, result)
                .into_iter()
                .map(|record| record.with_provisional_status(status))
                .collect::<Vec<_>>()
        };

        let mut records = tagged(pending, SOURCE_PENDING, STATUS_PENDING);
        records.extend(tagged(approved, SOURCE_APPROVED, STATUS_ACTIVE));
        Ok(normalize_lots(records))
    }

    async fn fetch_requests(&self) -> Result<Vec<CanonicalListing>, StoreError> {
        let records = self.store.list_pending_approval_requests().await?;
        Ok(records
            .into_iter()
            .map(|record| normalize_request(record).logged())
            .collect())
    }
}

fn normalize_lots(records: Vec<ListingRecord>) -> Vec<CanonicalListing> {
    records
        .into_iter()
        .filter_map(|record| match normalize_listing(record) {
            Ok(normalized) => Some(normalized.logged()),
            Err(issue) => {
                tracing::warn!(error = %issue, "Skipping listing without identity");
                None
            }
        })
        .collect()
}

/// A failed source contributes an empty list.
fn absorb<T>(source_name: &'static str, result: Result<Vec<T>, StoreError>) -> Vec<T> {
    result.unwrap_or_else(|error| {
        let partial = PartialFetchError { source_name, error };
        tracing::warn!(error = %partial, "Treating listing source as empty");
        Vec::new()
    })
}
