use crate::types::ListingId;

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Invalid listing id '{0}'")]
    InvalidId(String),

    #[error("Listing not found: {0}")]
    NotFound(ListingId),
}

/// A malformed field found while normalizing a raw record.
///
/// Never fatal: the offending value is replaced by its documented default
/// (or clamped) and the issue is logged.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("listing {listing}: field `{field}` {problem}")]
pub struct ValidationError {
    pub listing: String,
    pub field: &'static str,
    pub problem: String,
}

impl ValidationError {
    pub fn new(listing: impl Into<String>, field: &'static str, problem: impl Into<String>) -> Self {
        Self {
            listing: listing.into(),
            field,
            problem: problem.into(),
        }
    }
}
