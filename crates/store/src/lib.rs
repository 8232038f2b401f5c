//! Remote listing store: the backend operations the console consumes.
//!
//! [`ListingStore`] abstracts the two backend collections (parking lots and
//! approval requests); [`HttpListingStore`] implements it over the REST API
//! with [`reqwest`].

pub mod config;
pub mod error;
pub mod http;
pub mod store;

pub use config::StoreConfig;
pub use error::StoreError;
pub use http::HttpListingStore;
pub use store::{FieldPatch, ListingStore};
