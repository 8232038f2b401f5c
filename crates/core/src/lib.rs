//! Domain model for the parking listing approval console.
//!
//! Pure types and functions with no I/O: raw backend records, the status
//! classifier, canonical listings, the identity-keyed merge, the capability
//! matrix that maps admin intents onto candidate remote operations, and the
//! catalog helpers used to filter and summarise the canonical set.

pub mod capability;
pub mod catalog;
pub mod error;
pub mod listing;
pub mod merge;
pub mod record;
pub mod status;
pub mod types;
