//! Canonical listings and normalization of raw records into them.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::record::{ApprovalRequestRecord, Lenient, ListingRecord, LooseNumber, OwnerProfile, OwnerRef};
use crate::status::{classify_detailed, Origin, Status, StatusFields};
use crate::types::{DbId, ListingId};

/// Name used when a record carries none.
pub const DEFAULT_NAME: &str = "(unnamed)";

/// Maximum number of features surfaced per listing.
pub const MAX_FEATURES: usize = 3;

/// Owner label when a listing has no owner data at all.
pub const OWNER_UNAVAILABLE: &str = "Owner unavailable";

/// One entry of the canonical set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalListing {
    pub id: ListingId,
    pub name: String,
    pub address: String,
    pub owner: Option<OwnerRef>,
    pub total_spots: u32,
    /// Always within `0..=total_spots`.
    pub available_spots: u32,
    /// Always `>= 0`.
    pub hourly_rate: f64,
    pub status: Status,
    /// Explicit status string outside the known vocabulary, kept for display.
    pub raw_status: Option<String>,
    pub origin: Origin,
    pub approval_request_id: Option<DbId>,
    pub features: Vec<String>,
}

impl CanonicalListing {
    /// Status text to show: the unrecognized backend string if there was
    /// one, the canonical status otherwise.
    pub fn display_status(&self) -> &str {
        self.raw_status.as_deref().unwrap_or(self.status.as_str())
    }

    /// Percentage of occupied spots, rounded. A lot with no spots counts
    /// as a single-spot lot.
    pub fn occupancy_percent(&self) -> u32 {
        let total = self.total_spots.max(1) as f64;
        let occupied = self.total_spots.saturating_sub(self.available_spots) as f64;
        (occupied / total * 100.0).round() as u32
    }

    pub fn owner_display_name(&self) -> String {
        match &self.owner {
            None => OWNER_UNAVAILABLE.to_string(),
            Some(OwnerRef::Id(id)) => format!("User #{id}"),
            Some(OwnerRef::Name(name)) => name.clone(),
            Some(OwnerRef::Profile(profile)) => profile_display_name(profile),
        }
    }
}

fn profile_display_name(profile: &OwnerProfile) -> String {
    let non_empty = |v: &Option<String>| v.as_deref().map(str::trim).filter(|s| !s.is_empty()).map(str::to_string);

    match (non_empty(&profile.first_name), non_empty(&profile.last_name)) {
        (Some(first), Some(last)) => format!("{first} {last}"),
        _ => non_empty(&profile.username)
            .or_else(|| non_empty(&profile.email))
            .unwrap_or_else(|| "Owner".to_string()),
    }
}

/// A normalized listing plus every correction applied on the way.
#[derive(Debug, Clone)]
pub struct Normalized {
    pub listing: CanonicalListing,
    pub issues: Vec<ValidationError>,
}

impl Normalized {
    /// Log the corrections and return the listing.
    pub fn logged(self) -> CanonicalListing {
        for issue in &self.issues {
            tracing::warn!(listing_id = %self.listing.id, error = %issue, "Corrected malformed listing field");
        }
        self.listing
    }
}

/// Normalize a parking-lot record.
///
/// Fails only when the record has no usable `id`, since no identity can be
/// derived for it. Every other malformed field falls back to its default
/// and is reported in [`Normalized::issues`].
pub fn normalize_listing(record: ListingRecord) -> Result<Normalized, ValidationError> {
    let lot_id = match &record.id {
        None => return Err(ValidationError::new("<unknown>", "id", "is missing, record skipped")),
        Some(raw) => raw.as_i64().ok_or_else(|| {
            ValidationError::new("<unknown>", "id", format!("is not an integer ({raw:?}), record skipped"))
        })?,
    };
    let id = ListingId::Lot(lot_id);
    let label = id.to_string();
    let mut issues = Vec::new();

    let status = text(&label, "status", record.status, &mut issues);
    let classification = classify_detailed(StatusFields {
        status: status.as_deref(),
        approved: flag(&label, "aprobado", record.approved.as_ref(), &mut issues),
        active: flag(&label, "activo", record.active.as_ref(), &mut issues),
    });
    let (total_spots, available_spots) = spots(
        &label,
        record.total_spots.as_ref(),
        record.available_spots.as_ref(),
        &mut issues,
    );
    let hourly_rate = rate(&label, record.hourly_rate.as_ref(), &mut issues);
    let features = features(
        &label,
        record.servicios.as_ref(),
        record.features.as_ref(),
        record.security_level.as_ref(),
        &mut issues,
    );
    let owner = owner(&label, "propietario", record.owner, &mut issues)
        .or_else(|| owner(&label, "dueno", record.dueno, &mut issues));

    Ok(Normalized {
        listing: CanonicalListing {
            id,
            name: name_or_default(text(&label, "nombre", record.name, &mut issues)),
            address: text(&label, "direccion", record.address, &mut issues).unwrap_or_default(),
            owner,
            total_spots,
            available_spots,
            hourly_rate,
            status: classification.status,
            raw_status: classification.unrecognized,
            origin: Origin::DirectListing,
            approval_request_id: None,
            features,
        },
        issues,
    })
}

/// Normalize an approval request. Requests are always pending.
///
/// The identity is the lot the request produced when there is one, so the
/// canonical record supersedes it on merge; otherwise it is the synthetic
/// `req-<id>`.
pub fn normalize_request(record: ApprovalRequestRecord) -> Normalized {
    let mut issues = Vec::new();
    let request_label = ListingId::Request(record.id).to_string();
    let created = integer(&request_label, "estacionamiento_creado", record.created_listing.as_ref(), &mut issues);
    let id = match created {
        Some(lot_id) => ListingId::Lot(lot_id),
        None => ListingId::Request(record.id),
    };
    let label = id.to_string();

    let (total_spots, available_spots) = spots(
        &label,
        record.total_spots.as_ref(),
        record.available_spots.as_ref(),
        &mut issues,
    );
    let hourly_rate = rate(&label, record.hourly_rate.as_ref(), &mut issues);
    let requester_name = text(&label, "solicitado_por_nombre", record.requested_by_name, &mut issues);
    let owner = integer(&label, "solicitado_por", record.requested_by.as_ref(), &mut issues).map(|user_id| {
        OwnerRef::Profile(OwnerProfile {
            id: Some(LooseNumber::Int(user_id)),
            username: requester_name,
            ..Default::default()
        })
    });

    Normalized {
        listing: CanonicalListing {
            id,
            name: name_or_default(text(&label, "nombre", record.name, &mut issues)),
            address: text(&label, "direccion", record.address, &mut issues).unwrap_or_default(),
            owner,
            total_spots,
            available_spots,
            hourly_rate,
            status: Status::Pending,
            raw_status: None,
            origin: Origin::ApprovalRequest,
            approval_request_id: Some(record.id),
            features: Vec::new(),
        },
        issues,
    }
}

fn text(
    label: &str,
    field: &'static str,
    value: Option<Lenient<String>>,
    issues: &mut Vec<ValidationError>,
) -> Option<String> {
    match value? {
        Lenient::Valid(s) => Some(s),
        Lenient::Invalid(raw) => {
            issues.push(ValidationError::new(label, field, format!("is not a string ({raw}), ignoring")));
            None
        }
    }
}

/// Booleans sent as `"true"` / `"false"` are read as such.
fn flag(
    label: &str,
    field: &'static str,
    value: Option<&Lenient<bool>>,
    issues: &mut Vec<ValidationError>,
) -> Option<bool> {
    let raw = match value? {
        Lenient::Valid(b) => return Some(*b),
        Lenient::Invalid(raw) => raw,
    };
    let parsed = raw.as_str().and_then(|s| match s.trim().to_ascii_lowercase().as_str() {
        "true" => Some(true),
        "false" => Some(false),
        _ => None,
    });
    let problem = match parsed {
        Some(b) => format!("is a string ({raw}), reading as {b}"),
        None => format!("is not a boolean ({raw}), ignoring"),
    };
    issues.push(ValidationError::new(label, field, problem));
    parsed
}

fn integer(
    label: &str,
    field: &'static str,
    value: Option<&LooseNumber>,
    issues: &mut Vec<ValidationError>,
) -> Option<DbId> {
    let value = value?;
    let parsed = value.as_i64();
    if parsed.is_none() {
        issues.push(ValidationError::new(label, field, format!("is not an integer ({value:?}), ignoring")));
    }
    parsed
}

fn owner(
    label: &str,
    field: &'static str,
    value: Option<Lenient<OwnerRef>>,
    issues: &mut Vec<ValidationError>,
) -> Option<OwnerRef> {
    match value? {
        Lenient::Valid(owner) => Some(owner),
        Lenient::Invalid(raw) => {
            issues.push(ValidationError::new(label, field, format!("is not an owner reference ({raw}), ignoring")));
            None
        }
    }
}

fn name_or_default(name: Option<String>) -> String {
    name.map(|n| n.trim().to_string())
        .filter(|n| !n.is_empty())
        .unwrap_or_else(|| DEFAULT_NAME.to_string())
}

fn count(label: &str, field: &'static str, value: Option<&LooseNumber>, issues: &mut Vec<ValidationError>) -> u32 {
    let Some(value) = value else {
        return 0;
    };
    match value.as_i64() {
        None => {
            issues.push(ValidationError::new(label, field, format!("is not an integer ({value:?}), using 0")));
            0
        }
        Some(n) if n < 0 => {
            issues.push(ValidationError::new(label, field, format!("is negative ({n}), using 0")));
            0
        }
        Some(n) => u32::try_from(n).unwrap_or_else(|_| {
            issues.push(ValidationError::new(label, field, format!("is out of range ({n}), clamping")));
            u32::MAX
        }),
    }
}

fn spots(
    label: &str,
    total: Option<&LooseNumber>,
    available: Option<&LooseNumber>,
    issues: &mut Vec<ValidationError>,
) -> (u32, u32) {
    let total = count(label, "total_plazas", total, issues);
    let available = count(label, "plazas_disponibles", available, issues);
    if available > total {
        issues.push(ValidationError::new(
            label,
            "plazas_disponibles",
            format!("exceeds total ({available} > {total}), clamping"),
        ));
        return (total, total);
    }
    (total, available)
}

fn rate(label: &str, value: Option<&LooseNumber>, issues: &mut Vec<ValidationError>) -> f64 {
    let Some(value) = value else {
        return 0.0;
    };
    match value.as_f64() {
        None => {
            issues.push(ValidationError::new(label, "tarifa_hora", format!("is not a number ({value:?}), using 0")));
            0.0
        }
        Some(r) if r < 0.0 => {
            issues.push(ValidationError::new(label, "tarifa_hora", format!("is negative ({r}), using 0")));
            0.0
        }
        Some(r) => r,
    }
}

fn features(
    label: &str,
    servicios: Option<&Lenient<Vec<serde_json::Value>>>,
    features: Option<&Lenient<Vec<serde_json::Value>>>,
    security_level: Option<&serde_json::Value>,
    issues: &mut Vec<ValidationError>,
) -> Vec<String> {
    let mut list = None;
    for (field, value) in [("servicios", servicios), ("features", features)] {
        match value {
            Some(Lenient::Valid(items)) => {
                list.get_or_insert(items);
            }
            Some(Lenient::Invalid(raw)) => {
                issues.push(ValidationError::new(label, field, format!("is not a list ({raw}), ignoring")));
            }
            None => {}
        }
    }
    if let Some(list) = list {
        return list.iter().take(MAX_FEATURES).map(feature_text).collect();
    }
    match security_level {
        Some(serde_json::Value::Null) | None => Vec::new(),
        Some(level) => vec![format!("Security: {}", feature_text(level))],
    }
}

fn feature_text(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Object(map) => map
            .get("nombre")
            .or_else(|| map.get("name"))
            .and_then(|v| v.as_str())
            .map(str::to_string)
            .unwrap_or_else(|| value.to_string()),
        other => other.to_string(),
    }
}
