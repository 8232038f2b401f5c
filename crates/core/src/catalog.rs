//! Filtering, search and summary over the canonical set.

use std::str::FromStr;

use serde::Serialize;

use crate::capability::CapabilityMatrix;
use crate::error::CoreError;
use crate::listing::CanonicalListing;
use crate::status::{Intent, Status};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter {
    #[default]
    All,
    Only(Status),
}

impl StatusFilter {
    pub fn matches(&self, status: Status) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl FromStr for StatusFilter {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(Self::All);
        }
        s.parse().map(Self::Only)
    }
}

/// Status filter plus a free-text search over name, address and owner.
#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub status: StatusFilter,
    pub search: String,
}

impl ListingFilter {
    pub fn new(status: StatusFilter, search: impl Into<String>) -> Self {
        Self {
            status,
            search: search.into(),
        }
    }

    /// Case-insensitive. An empty search matches everything.
    pub fn matches(&self, listing: &CanonicalListing) -> bool {
        if !self.status.matches(listing.status) {
            return false;
        }
        let needle = self.search.trim().to_lowercase();
        if needle.is_empty() {
            return true;
        }
        listing.name.to_lowercase().contains(&needle)
            || listing.address.to_lowercase().contains(&needle)
            || listing.owner_display_name().to_lowercase().contains(&needle)
    }

    pub fn apply<'a>(&self, listings: &'a [CanonicalListing]) -> Vec<&'a CanonicalListing> {
        listings.iter().filter(|l| self.matches(l)).collect()
    }
}

/// Per-status counts shown above the listing table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusSummary {
    pub total: usize,
    pub active: usize,
    pub pending: usize,
    pub suspended: usize,
}

impl StatusSummary {
    pub fn of(listings: &[CanonicalListing]) -> Self {
        listings.iter().fold(
            Self {
                total: listings.len(),
                ..Default::default()
            },
            |mut acc, l| {
                match l.status {
                    Status::Active => acc.active += 1,
                    Status::Pending => acc.pending += 1,
                    Status::Suspended => acc.suspended += 1,
                    Status::Rejected => {}
                }
                acc
            },
        )
    }
}

/// Actions to offer for a listing.
pub fn allowed_intents(listing: &CanonicalListing, matrix: &CapabilityMatrix) -> Vec<Intent> {
    matrix.allowed_intents(listing.origin, listing.status)
}
