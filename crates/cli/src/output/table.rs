use comfy_table::{Cell, Table};

use parkctl_core::catalog::StatusSummary;
use parkctl_core::listing::CanonicalListing;
use parkctl_core::status::Origin;

pub fn listings_table<'a>(listings: impl IntoIterator<Item = &'a CanonicalListing>) -> Table {
    let mut table = Table::new();
    table.set_header(vec![
        "ID", "Name", "Owner", "Status", "Source", "Spots", "Occupancy", "Rate/h", "Features",
    ]);

    for listing in listings {
        table.add_row(vec![
            Cell::new(listing.id),
            Cell::new(&listing.name),
            Cell::new(listing.owner_display_name()),
            Cell::new(listing.display_status()),
            Cell::new(source_label(listing.origin)),
            Cell::new(format!("{}/{}", listing.available_spots, listing.total_spots)),
            Cell::new(format!("{}%", listing.occupancy_percent())),
            Cell::new(format!("{:.2}", listing.hourly_rate)),
            Cell::new(listing.features.join(", ")),
        ]);
    }
    table
}

pub fn summary_table(summary: &StatusSummary) -> Table {
    let mut table = Table::new();
    table.set_header(vec!["Total", "Active", "Pending", "Suspended"]);
    table.add_row(vec![
        summary.total,
        summary.active,
        summary.pending,
        summary.suspended,
    ]);
    table
}

fn source_label(origin: Origin) -> &'static str {
    match origin {
        Origin::DirectListing => "listing",
        Origin::ApprovalRequest => "request",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parkctl_core::listing::normalize_listing;
    use parkctl_core::record::ListingRecord;

    #[test]
    fn listing_row_shows_presentation_fields() {
        let record: ListingRecord = serde_json::from_value(serde_json::json!({
            "id": 3,
            "nombre": "Plaza Norte",
            "total_plazas": 20,
            "plazas_disponibles": 5,
            "tarifa_hora": "2.5",
            "aprobado": true,
            "activo": false,
            "servicios": ["Covered"],
        }))
        .unwrap();
        let listing = normalize_listing(record).unwrap().listing;

        let rendered = listings_table([&listing]).to_string();

        assert!(rendered.contains("Plaza Norte"));
        assert!(rendered.contains("5/20"));
        assert!(rendered.contains("75%"));
        assert!(rendered.contains("2.50"));
        assert!(rendered.contains("Covered"));
        assert!(rendered.contains("Owner unavailable"));
    }

    #[test]
    fn summary_counts_render() {
        let summary = StatusSummary {
            total: 4,
            active: 1,
            pending: 2,
            suspended: 1,
        };
        let rendered = summary_table(&summary).to_string();
        assert!(rendered.contains("Pending"));
        assert!(rendered.contains('2'));
    }
}
