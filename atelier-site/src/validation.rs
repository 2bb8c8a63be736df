//! Record validation
//!
//! Converts untyped backend records into domain entities. A record either
//! becomes a fully-typed entity or a [`ValidationError`] listing every field
//! that failed, so one bad cell does not hide the others.

use crate::airtable::RawRecord;
use atelier_common::config::BatchPolicy;
use atelier_common::{Artist, Attachment, QuickFact, Review, Service};
use reqwest::Url;
use serde_json::{Map, Value};
use std::collections::BTreeSet;
use std::fmt;
use thiserror::Error;
use tracing::warn;

/// Canonical service-to-artist relation field
pub const SERVICE_RELATION_FIELD: &str = "Artist ID";

/// Older relation field names, probed in priority order
pub const LEGACY_SERVICE_RELATION_FIELDS: [&str; 3] = ["Artist", "Artist Name", "ArtistID"];

/// Kind of value a field must hold
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpectedKind {
    String,
    Boolean,
    Integer,
    StringArray,
    NonEmptyStringArray,
    AttachmentArray,
    Url,
}

impl fmt::Display for ExpectedKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ExpectedKind::String => "string",
            ExpectedKind::Boolean => "boolean",
            ExpectedKind::Integer => "integer",
            ExpectedKind::StringArray => "array of strings",
            ExpectedKind::NonEmptyStringArray => "non-empty array of strings",
            ExpectedKind::AttachmentArray => "array of attachments",
            ExpectedKind::Url => "absolute URL",
        };
        f.write_str(name)
    }
}

/// One failed field check
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    /// Field path, e.g. `Artwork[1].url`
    pub path: String,
    pub expected: ExpectedKind,
    /// Short description of what was found
    pub received: String,
}

impl fmt::Display for FieldViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: expected {}, got {}", self.path, self.expected, self.received)
    }
}

/// A record that could not be turned into an entity
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{entity} record {record_id} failed validation: {}", describe(.violations))]
pub struct ValidationError {
    pub record_id: String,
    pub entity: &'static str,
    pub violations: Vec<FieldViolation>,
}

fn describe(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Summarize a received value for error reporting
fn summarize(value: Option<&Value>) -> String {
    const MAX_CHARS: usize = 32;

    match value {
        None => "missing".to_string(),
        Some(Value::Null) => "null".to_string(),
        Some(Value::Bool(b)) => format!("boolean {}", b),
        Some(Value::Number(n)) => format!("number {}", n),
        Some(Value::String(s)) if s.chars().count() > MAX_CHARS => {
            let head: String = s.chars().take(MAX_CHARS).collect();
            format!("string \"{}...\"", head)
        }
        Some(Value::String(s)) => format!("string \"{}\"", s),
        Some(Value::Array(items)) => format!("array of {}", items.len()),
        Some(Value::Object(_)) => "object".to_string(),
    }
}

/// Validation switches taken from configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ValidationOptions {
    /// Accept legacy service relation field names
    pub legacy_relation_fields: bool,
}

impl Default for ValidationOptions {
    fn default() -> Self {
        Self {
            legacy_relation_fields: true,
        }
    }
}

/// Conversion between raw backend records and entities
pub trait Validate: Sized {
    /// Entity name used in errors and logs
    const ENTITY: &'static str;

    fn validate_with(record: &RawRecord, options: &ValidationOptions) -> Result<Self, ValidationError>;

    fn validate(record: &RawRecord) -> Result<Self, ValidationError> {
        Self::validate_with(record, &ValidationOptions::default())
    }

    /// Re-serialize into the raw backend shape
    fn to_raw(&self) -> RawRecord;
}

/// Reads typed fields off a record while collecting violations
struct FieldReader<'a> {
    record: &'a RawRecord,
    violations: Vec<FieldViolation>,
}

impl<'a> FieldReader<'a> {
    fn new(record: &'a RawRecord) -> Self {
        Self {
            record,
            violations: Vec::new(),
        }
    }

    /// Present and non-null
    fn present(&self, name: &str) -> Option<&'a Value> {
        self.record.field(name).filter(|v| !v.is_null())
    }

    fn violation(&mut self, path: impl Into<String>, expected: ExpectedKind, value: Option<&Value>) {
        self.violations.push(FieldViolation {
            path: path.into(),
            expected,
            received: summarize(value),
        });
    }

    /// Returns an empty string on failure; the recorded violation keeps it
    /// from ever reaching an entity.
    fn required_string(&mut self, name: &str) -> String {
        match self.present(name) {
            Some(Value::String(s)) => s.clone(),
            other => {
                self.violation(name, ExpectedKind::String, other);
                String::new()
            }
        }
    }

    fn optional_string(&mut self, name: &str) -> Option<String> {
        match self.present(name)? {
            Value::String(s) => Some(s.clone()),
            other => {
                self.violation(name, ExpectedKind::String, Some(other));
                None
            }
        }
    }

    fn optional_bool(&mut self, name: &str) -> Option<bool> {
        match self.present(name)? {
            Value::Bool(b) => Some(*b),
            other => {
                self.violation(name, ExpectedKind::Boolean, Some(other));
                None
            }
        }
    }

    fn optional_integer(&mut self, name: &str) -> Option<i64> {
        let value = self.present(name)?;
        let parsed = value.as_i64().or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        });
        if parsed.is_none() {
            self.violation(name, ExpectedKind::Integer, Some(value));
        }
        parsed
    }

    fn string_array(&mut self, name: &str, expected: ExpectedKind) -> Option<Vec<String>> {
        let value = self.present(name);
        let strings = value.and_then(as_string_array);
        match strings {
            Some(list) if expected == ExpectedKind::NonEmptyStringArray && list.is_empty() => {
                self.violation(name, expected, value);
                None
            }
            Some(list) => Some(list),
            None => {
                self.violation(name, expected, value);
                None
            }
        }
    }

    fn optional_string_array(&mut self, name: &str) -> Option<Vec<String>> {
        self.present(name)?;
        self.string_array(name, ExpectedKind::StringArray)
    }

    fn optional_attachments(&mut self, name: &str) -> Option<Vec<Attachment>> {
        let value = self.present(name)?;
        let Value::Array(items) = value else {
            self.violation(name, ExpectedKind::AttachmentArray, Some(value));
            return None;
        };

        let before = self.violations.len();
        let attachments: Vec<Attachment> = items
            .iter()
            .enumerate()
            .filter_map(|(i, item)| self.attachment(&format!("{}[{}]", name, i), item))
            .collect();

        (self.violations.len() == before).then_some(attachments)
    }

    fn attachment(&mut self, path: &str, item: &Value) -> Option<Attachment> {
        let Value::Object(fields) = item else {
            self.violation(path, ExpectedKind::AttachmentArray, Some(item));
            return None;
        };

        let before = self.violations.len();
        let string_at = |reader: &mut Self, key: &str| match fields.get(key) {
            Some(Value::String(s)) => s.clone(),
            other => {
                reader.violation(format!("{}.{}", path, key), ExpectedKind::String, other);
                String::new()
            }
        };

        let id = string_at(self, "id");
        let url = string_at(self, "url");
        let filename = string_at(self, "filename");

        if self.violations.len() == before && !is_absolute_url(&url) {
            self.violation(format!("{}.url", path), ExpectedKind::Url, fields.get("url"));
        }

        let size = match fields.get("size").filter(|v| !v.is_null()) {
            None => None,
            Some(v) => match v.as_u64() {
                Some(n) => Some(n),
                None => {
                    self.violation(format!("{}.size", path), ExpectedKind::Integer, Some(v));
                    None
                }
            },
        };

        let mime_type = match fields.get("type").filter(|v| !v.is_null()) {
            None => None,
            Some(Value::String(s)) => Some(s.clone()),
            Some(v) => {
                self.violation(format!("{}.type", path), ExpectedKind::String, Some(v));
                None
            }
        };

        (self.violations.len() == before).then(|| Attachment {
            id,
            url,
            filename,
            size,
            mime_type,
        })
    }

    fn finish<T: Validate>(self, entity: T) -> Result<T, ValidationError> {
        if self.violations.is_empty() {
            Ok(entity)
        } else {
            Err(ValidationError {
                record_id: self.record.id.clone(),
                entity: T::ENTITY,
                violations: self.violations,
            })
        }
    }
}

fn as_string_array(value: &Value) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|item| item.as_str().map(str::to_string))
        .collect()
}

fn is_absolute_url(url: &str) -> bool {
    !url.is_empty() && Url::parse(url).is_ok()
}

fn attachments_to_value(attachments: &[Attachment]) -> Value {
    Value::Array(
        attachments
            .iter()
            .map(|a| {
                let mut obj = Map::new();
                obj.insert("id".into(), Value::from(a.id.clone()));
                obj.insert("url".into(), Value::from(a.url.clone()));
                obj.insert("filename".into(), Value::from(a.filename.clone()));
                if let Some(size) = a.size {
                    obj.insert("size".into(), Value::from(size));
                }
                if let Some(mime_type) = &a.mime_type {
                    obj.insert("type".into(), Value::from(mime_type.clone()));
                }
                Value::Object(obj)
            })
            .collect(),
    )
}

/// Insert only the fields that are set
#[derive(Default)]
struct RawBuilder {
    fields: Map<String, Value>,
}

impl RawBuilder {
    fn set(mut self, name: &str, value: impl Into<Value>) -> Self {
        self.fields.insert(name.to_string(), value.into());
        self
    }

    fn set_opt<V: Into<Value>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(v) => self.set(name, v),
            None => self,
        }
    }

    fn build(self, id: &str) -> RawRecord {
        RawRecord::new(id, self.fields)
    }
}

impl Validate for Artist {
    const ENTITY: &'static str = "Artist";

    fn validate_with(record: &RawRecord, _options: &ValidationOptions) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(record);

        let artist = Artist {
            id: record.id.clone(),
            name: r.required_string("Name"),
            speciality: r.optional_string("Speciality"),
            bio: r.optional_string("Bio"),
            profile_images: r.optional_attachments("ProfileImage"),
            artwork_images: r.optional_attachments("Artwork"),
            social_links: r.optional_string("SocialLinks"),
            tags: r.optional_string_array("Tags"),
            featured: r.optional_bool("Featured"),
            banner_images: r.optional_attachments("GeneratedBannerImage"),
            theme_primary_color: r.optional_string("ThemePrimaryColor"),
            theme_background_color: r.optional_string("ThemeBackgroundColor"),
            theme_text_color: r.optional_string("ThemeTextColor"),
            location: r.optional_string("Location"),
        };

        r.finish(artist)
    }

    fn to_raw(&self) -> RawRecord {
        RawBuilder::default()
            .set("Name", self.name.clone())
            .set_opt("Speciality", self.speciality.clone())
            .set_opt("Bio", self.bio.clone())
            .set_opt("ProfileImage", self.profile_images.as_deref().map(attachments_to_value))
            .set_opt("Artwork", self.artwork_images.as_deref().map(attachments_to_value))
            .set_opt("SocialLinks", self.social_links.clone())
            .set_opt("Tags", self.tags.clone())
            .set_opt("Featured", self.featured)
            .set_opt("GeneratedBannerImage", self.banner_images.as_deref().map(attachments_to_value))
            .set_opt("ThemePrimaryColor", self.theme_primary_color.clone())
            .set_opt("ThemeBackgroundColor", self.theme_background_color.clone())
            .set_opt("ThemeTextColor", self.theme_text_color.clone())
            .set_opt("Location", self.location.clone())
            .build(&self.id)
    }
}

impl Validate for Review {
    const ENTITY: &'static str = "Review";

    fn validate_with(record: &RawRecord, _options: &ValidationOptions) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(record);

        let review = Review {
            id: record.id.clone(),
            artist_ids: r
                .string_array("Artist", ExpectedKind::NonEmptyStringArray)
                .unwrap_or_default(),
            review_text: r.required_string("Review Text"),
            client_name: r.optional_string("Client Name"),
            project_type: r.optional_string("Project Type"),
            date: r.required_string("Date"),
            featured: r.optional_bool("Featured"),
            approved: r.optional_bool("Approved"),
        };

        r.finish(review)
    }

    fn to_raw(&self) -> RawRecord {
        RawBuilder::default()
            .set("Artist", self.artist_ids.clone())
            .set("Review Text", self.review_text.clone())
            .set_opt("Client Name", self.client_name.clone())
            .set_opt("Project Type", self.project_type.clone())
            .set("Date", self.date.clone())
            .set_opt("Featured", self.featured)
            .set_opt("Approved", self.approved)
            .build(&self.id)
    }
}

impl Validate for Service {
    const ENTITY: &'static str = "Service";

    fn validate_with(record: &RawRecord, options: &ValidationOptions) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(record);

        let name = r.required_string("Name");
        let artist_ids = service_relation(&mut r, options).unwrap_or_default();

        let service = Service {
            id: record.id.clone(),
            name,
            description: r.optional_string("Description"),
            price_range: r.optional_string("Price Range"),
            category: r.optional_string("Category"),
            artist_ids,
            featured: r.optional_bool("Featured"),
            image_url: r.optional_string("Image URL"),
        };

        r.finish(service)
    }

    fn to_raw(&self) -> RawRecord {
        RawBuilder::default()
            .set("Name", self.name.clone())
            .set_opt("Description", self.description.clone())
            .set_opt("Price Range", self.price_range.clone())
            .set_opt("Category", self.category.clone())
            .set(SERVICE_RELATION_FIELD, self.artist_ids.clone())
            .set_opt("Featured", self.featured)
            .set_opt("Image URL", self.image_url.clone())
            .build(&self.id)
    }
}

/// Service artist ids from `Artist ID`, or a legacy field when allowed
fn service_relation(r: &mut FieldReader<'_>, options: &ValidationOptions) -> Option<Vec<String>> {
    if r.present(SERVICE_RELATION_FIELD).is_some() || !options.legacy_relation_fields {
        return r.string_array(SERVICE_RELATION_FIELD, ExpectedKind::StringArray);
    }

    for legacy in LEGACY_SERVICE_RELATION_FIELDS {
        let Some(value) = r.present(legacy) else {
            continue;
        };

        let ids = match value {
            Value::String(s) => Some(vec![s.clone()]),
            other => as_string_array(other),
        };

        return match ids {
            Some(ids) => {
                warn!(
                    record_id = %r.record.id,
                    field = legacy,
                    "Service uses deprecated relation field; rename it to '{}'",
                    SERVICE_RELATION_FIELD
                );
                Some(ids)
            }
            None => {
                r.violation(legacy, ExpectedKind::StringArray, Some(value));
                None
            }
        };
    }

    r.violation(SERVICE_RELATION_FIELD, ExpectedKind::StringArray, None);
    None
}

impl Validate for QuickFact {
    const ENTITY: &'static str = "QuickFact";

    fn validate_with(record: &RawRecord, _options: &ValidationOptions) -> Result<Self, ValidationError> {
        let mut r = FieldReader::new(record);

        let fact = QuickFact {
            id: record.id.clone(),
            artist_ids: r
                .string_array("Artist", ExpectedKind::StringArray)
                .unwrap_or_default(),
            fact_type: r.optional_string("Fact Type"),
            fact_value: r.optional_string("Fact Value"),
            icon: r.optional_string("Icon"),
            order: r.optional_integer("Order"),
            featured: r.optional_bool("Featured"),
        };

        r.finish(fact)
    }

    fn to_raw(&self) -> RawRecord {
        RawBuilder::default()
            .set("Artist", self.artist_ids.clone())
            .set_opt("Fact Type", self.fact_type.clone())
            .set_opt("Fact Value", self.fact_value.clone())
            .set_opt("Icon", self.icon.clone())
            .set_opt("Order", self.order)
            .set_opt("Featured", self.featured)
            .build(&self.id)
    }
}

/// Result of validating a fetched collection
#[derive(Debug)]
pub struct BatchOutcome<T> {
    pub valid: Vec<T>,
    pub rejected: Vec<ValidationError>,
}

/// Validate a collection under `policy`
///
/// Every rejection is logged. Under [`BatchPolicy::AllOrNothing`] a single
/// rejection empties `valid`.
pub fn validate_batch<T: Validate>(
    records: &[RawRecord],
    policy: BatchPolicy,
    options: &ValidationOptions,
) -> BatchOutcome<T> {
    let mut valid = Vec::with_capacity(records.len());
    let mut rejected = Vec::new();

    for record in records {
        match T::validate_with(record, options) {
            Ok(entity) => valid.push(entity),
            Err(e) => {
                warn!(
                    entity = T::ENTITY,
                    record_id = %e.record_id,
                    violations = e.violations.len(),
                    "Rejected record: {}",
                    e
                );
                rejected.push(e);
            }
        }
    }

    if policy == BatchPolicy::AllOrNothing && !rejected.is_empty() && !valid.is_empty() {
        warn!(
            entity = T::ENTITY,
            discarded = valid.len(),
            rejected = rejected.len(),
            "Discarding whole batch after validation failure"
        );
        valid.clear();
    }

    BatchOutcome { valid, rejected }
}

/// Distinct tags across artist records, sorted ascending
///
/// Works on records fetched with only the `Tags` field, so no other artist
/// field is checked. Malformed tag cells are logged and skipped.
pub fn extract_tags(records: &[RawRecord]) -> Vec<String> {
    let mut tags = BTreeSet::new();

    for record in records {
        let Some(value) = record.field("Tags").filter(|v| !v.is_null()) else {
            continue;
        };
        match as_string_array(value) {
            Some(list) => tags.extend(list),
            None => warn!(
                record_id = %record.id,
                "Ignoring malformed Tags field ({})",
                summarize(Some(value))
            ),
        }
    }

    tags.into_iter().collect()
}
