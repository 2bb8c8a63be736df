//! Raw record builders in the backend's field naming

use atelier_site::airtable::RawRecord;
use serde_json::{json, Value};

/// Record from a JSON object literal
pub fn record(id: &str, fields: Value) -> RawRecord {
    match fields {
        Value::Object(map) => RawRecord::new(id, map),
        other => panic!("record fields must be an object, got {}", other),
    }
}

pub fn artist_record(id: &str, name: &str, featured: bool, tags: &[&str]) -> RawRecord {
    let mut fields = json!({
        "Name": name,
        "Speciality": "Painting",
        "Artwork": [{
            "id": format!("att-{}", id),
            "url": format!("https://cdn.example.com/{}.jpg", id),
            "filename": format!("{}.jpg", id)
        }],
        "Tags": tags,
    });
    if featured {
        fields["Featured"] = json!(true);
    }
    record(id, fields)
}

pub fn review_record(id: &str, artist_ids: &[&str], text: &str) -> RawRecord {
    record(
        id,
        json!({
            "Artist": artist_ids,
            "Review Text": text,
            "Client Name": "Client",
            "Date": "2024-06-01",
            "Approved": true
        }),
    )
}

/// Service linked through `relation_field` (canonical or legacy)
pub fn service_record(id: &str, name: &str, relation_field: &str, relation: Value) -> RawRecord {
    let mut fields = json!({
        "Name": name,
        "Price Range": "$500 - $2,000",
    });
    fields[relation_field] = relation;
    record(id, fields)
}

pub fn fact_record(id: &str, artist_id: &str, fact_type: &str, order: Option<i64>) -> RawRecord {
    let mut fields = json!({
        "Artist": [artist_id],
        "Fact Type": fact_type,
        "Fact Value": format!("{} value", fact_type),
    });
    if let Some(order) = order {
        fields["Order"] = json!(order);
    }
    record(id, fields)
}
