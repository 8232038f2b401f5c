use parkctl_core::capability::Operation;
use parkctl_core::status::{Intent, Origin, Status};
use parkctl_core::types::ListingId;
use parkctl_store::StoreError;

/// Every listing source is unreachable. Fatal to the current refresh only.
#[derive(Debug, thiserror::Error)]
#[error("All listing sources are unreachable (listings: {direct}; approval requests: {requests})")]
pub struct FetchError {
    pub direct: StoreError,
    pub requests: StoreError,
}

/// One source failed while the other answered. Logged and treated as an
/// empty contribution; never returned to callers.
#[derive(Debug, thiserror::Error)]
#[error("Listing source `{source_name}` failed: {error}")]
pub struct PartialFetchError {
    pub source_name: &'static str,
    #[source]
    pub error: StoreError,
}

#[derive(Debug, thiserror::Error)]
pub enum DispatchError {
    /// The lifecycle has no edge for this intent; no remote call was made.
    #[error("Cannot {intent} listing {id}: not allowed for a {status} listing from {origin:?}")]
    InvalidTransition {
        id: ListingId,
        origin: Origin,
        status: Status,
        intent: Intent,
    },

    /// The listing lacks the id an operation in its chain needs; no remote
    /// call was made.
    #[error("Listing {id} cannot be targeted by {operation}: {reason}")]
    MalformedListing {
        id: ListingId,
        operation: Operation,
        reason: &'static str,
    },

    /// Every candidate operation failed. Carries the last failure.
    #[error("Could not {intent} listing {id} after {attempts} attempt(s); last ({operation}): {last}")]
    Exhausted {
        id: ListingId,
        intent: Intent,
        operation: Operation,
        attempts: usize,
        #[source]
        last: StoreError,
    },
}

impl DispatchError {
    /// True when the error was raised before contacting the store.
    pub fn is_local(&self) -> bool {
        !matches!(self, Self::Exhausted { .. })
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConsoleError {
    /// Another action on the same listing has not finished yet.
    #[error("An action on listing {0} is already in progress")]
    Busy(ListingId),

    #[error("Listing not found: {0}")]
    NotFound(ListingId),

    #[error(transparent)]
    Fetch(#[from] FetchError),

    #[error(transparent)]
    Dispatch(#[from] DispatchError),
}
