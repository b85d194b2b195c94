//! Collection schemas.
//!
//! A [`Schema`] declares the semantic [`FieldKind`] of every field path of a
//! collection, so that query parameters (which always arrive as strings) can be
//! converted into typed values before they reach the store.
use bson::{oid::ObjectId, Bson};
use chrono::{DateTime, Utc};
use parse_display::Display;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display)]
pub enum FieldKind {
    ObjectId,
    String,
    Number,
    Boolean,
    Date,
    /// An array of strings, e.g. `careers`.
    /// Filtering matches documents with at least one equal element.
    StringList,
    /// An embedded document, e.g. `location`.
    /// It can be selected, but not filtered or sorted on directly.
    Embedded,
}

impl FieldKind {
    /// Converts the raw query value to a [`Bson`] value of this kind.
    ///
    /// Returns `None` if the value cannot be represented, e.g. `abc` for [`FieldKind::Number`].
    pub fn parse_value(&self, raw: &str) -> Option<Bson> {
        match self {
            FieldKind::ObjectId => ObjectId::parse_str(raw).ok().map(Bson::ObjectId),
            FieldKind::String | FieldKind::StringList => Some(Bson::String(raw.to_string())),
            FieldKind::Number => raw
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|number| number.is_finite())
                .map(Bson::Double),
            FieldKind::Boolean => match raw {
                "true" => Some(Bson::Boolean(true)),
                "false" => Some(Bson::Boolean(false)),
                _ => None,
            },
            FieldKind::Date => raw.parse::<DateTime<Utc>>().ok().map(|datetime| {
                Bson::DateTime(bson::DateTime::from_chrono(datetime))
            }),
            FieldKind::Embedded => None,
        }
    }

    pub fn is_filterable(&self) -> bool {
        !matches!(self, FieldKind::Embedded)
    }
}

/// The declared fields of a single collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Schema {
    pub collection: &'static str,
    pub fields: &'static [(&'static str, FieldKind)],
}

impl Schema {
    pub const fn new(collection: &'static str, fields: &'static [(&'static str, FieldKind)]) -> Self {
        Self { collection, fields }
    }

    /// The kind of a field path, `_id` and `createdAt` are implied for every collection.
    pub fn kind(&self, path: &str) -> Option<FieldKind> {
        match path {
            "_id" => Some(FieldKind::ObjectId),
            "createdAt" => Some(FieldKind::Date),
            _ => self
                .fields
                .iter()
                .find_map(|(field, kind)| (*field == path).then(|| *kind)),
        }
    }

    pub fn contains(&self, path: &str) -> bool {
        self.kind(path).is_some()
    }
}
