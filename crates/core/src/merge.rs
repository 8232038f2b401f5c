//! Identity-keyed merge of the two listing sources.
//!
//! Precedence: approval-request entries are inserted first and direct
//! listings afterwards, overwriting on identity collision. A canonical lot
//! that has materialized from a request therefore supersedes the
//! provisional request entry, while request-only listings stay visible.
//! Output order is insertion order; an overwritten entry keeps the slot of
//! the entry it replaced.

use indexmap::IndexMap;

use crate::listing::CanonicalListing;
use crate::types::ListingId;

/// Merge request-derived and direct listings into the canonical set.
pub fn merge(
    requests: impl IntoIterator<Item = CanonicalListing>,
    direct: impl IntoIterator<Item = CanonicalListing>,
) -> Vec<CanonicalListing> {
    let mut by_id: IndexMap<ListingId, CanonicalListing> = IndexMap::new();
    for listing in requests.into_iter().chain(direct) {
        by_id.insert(listing.id, listing);
    }
    by_id.into_values().collect()
}
