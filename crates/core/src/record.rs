//! Raw records as returned by the two backend collections.
//!
//! Shapes vary by origin and by endpoint, so every field except the request
//! id is optional and numeric fields accept numbers or numeric strings.
//! Normalization into [`CanonicalListing`](crate::listing::CanonicalListing)
//! happens in [`crate::listing`].

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};

use crate::error::{CoreError, ValidationError};
use crate::types::DbId;

/// A number that may arrive as a JSON integer, float, or string
/// (Django serializes `DecimalField` as a string). Anything else is kept
/// as `Other` so one bad value never fails the whole record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LooseNumber {
    Int(i64),
    Float(f64),
    Text(String),
    Other(serde_json::Value),
}

impl LooseNumber {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(v) => Some(*v as f64),
            Self::Float(v) if v.is_finite() => Some(*v),
            Self::Text(s) => s.trim().parse::<f64>().ok().filter(|v| v.is_finite()),
            Self::Float(_) | Self::Other(_) => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Self::Int(v) => Some(*v),
            Self::Float(v) if v.is_finite() && v.fract() == 0.0 => Some(*v as i64),
            Self::Text(s) => s.trim().parse::<i64>().ok(),
            Self::Float(_) | Self::Other(_) => None,
        }
    }
}

/// A field that decoded as `T`, or the raw JSON it arrived as.
///
/// Normalization reports `Invalid` values as validation issues and falls
/// back to the field's default.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum Lenient<T> {
    Valid(T),
    Invalid(serde_json::Value),
}

impl<T> Lenient<T> {
    pub fn valid(&self) -> Option<&T> {
        match self {
            Self::Valid(value) => Some(value),
            Self::Invalid(_) => None,
        }
    }
}

/// Owner reference: a bare user id, a username, or an expanded profile.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum OwnerRef {
    Id(DbId),
    Profile(OwnerProfile),
    Name(String),
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OwnerProfile {
    #[serde(default)]
    pub id: Option<LooseNumber>,
    #[serde(default)]
    pub username: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Raw parking-lot record from the "Parking Lots" collection and its
/// narrower pending / approved endpoints.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListingRecord {
    pub id: Option<LooseNumber>,
    #[serde(rename = "nombre", alias = "name")]
    pub name: Option<Lenient<String>>,
    #[serde(rename = "direccion", alias = "address")]
    pub address: Option<Lenient<String>>,
    #[serde(rename = "propietario", alias = "owner")]
    pub owner: Option<Lenient<OwnerRef>>,
    /// Older serializers expose the owner under this key instead.
    pub dueno: Option<Lenient<OwnerRef>>,
    #[serde(rename = "total_plazas", alias = "total_spots")]
    pub total_spots: Option<LooseNumber>,
    #[serde(rename = "plazas_disponibles", alias = "available_spots")]
    pub available_spots: Option<LooseNumber>,
    #[serde(rename = "tarifa_hora", alias = "hourly_rate")]
    pub hourly_rate: Option<LooseNumber>,
    pub status: Option<Lenient<String>>,
    #[serde(rename = "aprobado", alias = "approved")]
    pub approved: Option<Lenient<bool>>,
    #[serde(rename = "activo", alias = "active")]
    pub active: Option<Lenient<bool>>,
    pub servicios: Option<Lenient<Vec<serde_json::Value>>>,
    pub features: Option<Lenient<Vec<serde_json::Value>>>,
    #[serde(rename = "nivel_seguridad", alias = "security_level")]
    pub security_level: Option<serde_json::Value>,
}

impl ListingRecord {
    /// Tag the record with the status implied by the endpoint it came from.
    /// The tag replaces any status string the record carried.
    pub fn with_provisional_status(mut self, status: &str) -> Self {
        self.status = Some(Lenient::Valid(status.to_string()));
        self
    }
}

/// Raw record from the "Approval Requests" collection.
#[derive(Debug, Clone, Deserialize)]
pub struct ApprovalRequestRecord {
    #[serde(deserialize_with = "request_id")]
    pub id: DbId,
    /// Lot produced by this request, once the backend has materialized one.
    #[serde(rename = "estacionamiento_creado", alias = "created_listing")]
    pub created_listing: Option<LooseNumber>,
    #[serde(rename = "nombre", alias = "name")]
    pub name: Option<Lenient<String>>,
    #[serde(rename = "direccion", alias = "address")]
    pub address: Option<Lenient<String>>,
    #[serde(rename = "tarifa_hora", alias = "hourly_rate")]
    pub hourly_rate: Option<LooseNumber>,
    #[serde(rename = "total_plazas", alias = "total_spots")]
    pub total_spots: Option<LooseNumber>,
    #[serde(rename = "plazas_disponibles", alias = "available_spots")]
    pub available_spots: Option<LooseNumber>,
    #[serde(rename = "solicitado_por", alias = "requested_by")]
    pub requested_by: Option<LooseNumber>,
    #[serde(rename = "solicitado_por_nombre", alias = "requested_by_name")]
    pub requested_by_name: Option<Lenient<String>>,
    pub panel_local_id: Option<serde_json::Value>,
}

impl ApprovalRequestRecord {
    /// Minimal request, as the backend reports one that has no fields set.
    pub fn new(id: DbId) -> Self {
        Self {
            id,
            created_listing: None,
            name: None,
            address: None,
            hourly_rate: None,
            total_spots: None,
            available_spots: None,
            requested_by: None,
            requested_by_name: None,
            panel_local_id: None,
        }
    }
}

/// Request ids arrive as numbers or numeric strings. Anything else leaves
/// the request without an identity, so the record is rejected.
fn request_id<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DbId, D::Error> {
    let raw = LooseNumber::deserialize(deserializer)?;
    raw.as_i64()
        .ok_or_else(|| serde::de::Error::custom(format!("invalid request id {raw:?}")))
}

/// Decode a list endpoint payload into records.
///
/// Accepts a bare JSON array or a paginated `{ "results": [...] }` object.
/// Items that fail to decode are skipped and logged; the payload as a whole
/// is rejected only when it is neither shape.
pub fn decode_records<T: DeserializeOwned>(
    payload: serde_json::Value,
    source: &str,
) -> Result<Vec<T>, CoreError> {
    let items = match payload {
        serde_json::Value::Array(items) => items,
        serde_json::Value::Object(mut map) => match map.remove("results") {
            Some(serde_json::Value::Array(items)) => items,
            _ => {
                return Err(CoreError::Validation(format!(
                    "{source}: expected an array or an object with `results`"
                )))
            }
        },
        other => {
            return Err(CoreError::Validation(format!(
                "{source}: expected an array, got {}",
                json_kind(&other)
            )))
        }
    };

    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<T>(item) {
            Ok(record) => records.push(record),
            Err(e) => {
                let issue = ValidationError::new(format!("{source}[{index}]"), "record", e.to_string());
                tracing::warn!(source, index, error = %issue, "Skipping malformed record");
            }
        }
    }
    Ok(records)
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "an array",
        serde_json::Value::Object(_) => "an object",
    }
}
