use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Backend primary keys (Django auto ids).
pub type DbId = i64;

/// Prefix of synthetic ids given to listings that exist only as an
/// approval request.
pub const REQUEST_ID_PREFIX: &str = "req-";

/// Identity of a listing in the canonical set.
///
/// `Lot` is a canonical parking-lot id. `Request` is the synthetic
/// identity of a listing known only through a pending approval request;
/// it renders as `req-<request id>` and can never collide with a lot id.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ListingId {
    Lot(DbId),
    Request(DbId),
}

impl ListingId {
    pub fn is_synthetic(&self) -> bool {
        matches!(self, Self::Request(_))
    }

    /// The canonical lot id, if this identity refers to a lot.
    pub fn lot_id(&self) -> Option<DbId> {
        match self {
            Self::Lot(id) => Some(*id),
            Self::Request(_) => None,
        }
    }
}

impl fmt::Display for ListingId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Lot(id) => write!(f, "{id}"),
            Self::Request(id) => write!(f, "{REQUEST_ID_PREFIX}{id}"),
        }
    }
}

impl FromStr for ListingId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let (digits, synthetic) = match trimmed.strip_prefix(REQUEST_ID_PREFIX) {
            Some(rest) => (rest, true),
            None => (trimmed, false),
        };
        // Unsigned decimal digits only, and never zero.
        let id = Some(digits)
            .filter(|d| !d.is_empty() && d.bytes().all(|b| b.is_ascii_digit()))
            .and_then(|d| d.parse::<DbId>().ok())
            .filter(|&id| id > 0)
            .ok_or_else(|| CoreError::InvalidId(s.to_string()))?;
        if synthetic {
            Ok(Self::Request(id))
        } else {
            Ok(Self::Lot(id))
        }
    }
}

impl Serialize for ListingId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Lot(id) => serializer.serialize_i64(*id),
            Self::Request(_) => serializer.collect_str(self),
        }
    }
}

impl<'de> Deserialize<'de> for ListingId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(DbId),
            Text(String),
        }

        match Raw::deserialize(deserializer)? {
            Raw::Number(id) if id > 0 => Ok(Self::Lot(id)),
            Raw::Number(id) => Err(serde::de::Error::custom(CoreError::InvalidId(id.to_string()))),
            Raw::Text(text) => text.parse().map_err(serde::de::Error::custom),
        }
    }
}
