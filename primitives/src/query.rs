//! The typed query specification built from the request query parameters.
//!
//! A [`QuerySpec`] is built once per request by [`QueryParams::into_query`]
//! and handed to the store. It owns no persistent state.
use bson::{Bson, Document};
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use self::params::{ParamValue, QueryParams};
use crate::schema::FieldKind;

mod params;

/// The default page when `page` is missing or invalid.
pub const DEFAULT_PAGE: u64 = 1;
/// The default page size when `limit` is missing or invalid.
pub const DEFAULT_LIMIT: u64 = 25;
/// Query parameters which control the query itself and are never used as filters.
pub const RESERVED_PARAMS: [&str; 4] = ["select", "sort", "page", "limit"];
/// The field used for the default sorting, newest documents first.
pub const CREATED_AT: &str = "createdAt";

#[derive(Debug, Error, PartialEq)]
pub enum QueryError {
    #[error("Invalid query string: {0}")]
    Malformed(String),
    #[error("Unknown field `{0}`")]
    UnknownField(String),
    #[error("Field `{0}` cannot be used for filtering")]
    NotFilterable(String),
    #[error("Unknown operator `{operator}` for field `{field}`")]
    UnknownOperator { field: String, operator: String },
    #[error("Invalid value `{value}` for field `{field}`, expected {kind}")]
    InvalidValue {
        field: String,
        kind: FieldKind,
        value: String,
    },
}

/// Comparison operators accepted in the query parameters, e.g. `averageCost[lte]=20000`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, FromStr)]
#[display(style = "lowercase")]
pub enum Operator {
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    Equals(Bson),
    GreaterThan(Bson),
    GreaterOrEqual(Bson),
    LessThan(Bson),
    LessOrEqual(Bson),
    In(Vec<Bson>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct FieldFilter {
    pub field: String,
    pub predicate: Predicate,
}

/// A conjunction of [`FieldFilter`]s, the empty `Filter` matches every document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Filter(pub Vec<FieldFilter>);

impl Filter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, field: impl Into<String>, predicate: Predicate) -> Self {
        self.0.push(FieldFilter {
            field: field.into(),
            predicate,
        });

        self
    }

    /// Shorthand for an [`Predicate::Equals`] filter.
    pub fn eq(field: impl Into<String>, value: impl Into<Bson>) -> Self {
        Self::new().with(field, Predicate::Equals(value.into()))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &FieldFilter> {
        self.0.iter()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Direction {
    Ascending,
    Descending,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub direction: Direction,
}

impl SortKey {
    pub fn ascending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Ascending,
        }
    }

    pub fn descending(field: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            direction: Direction::Descending,
        }
    }
}

/// The requested page, both `page` and `limit` are always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page {
    pub page: u64,
    pub limit: u64,
}

impl Page {
    pub fn new(page: u64, limit: u64) -> Self {
        Self {
            page: page.max(1),
            limit: limit.max(1),
        }
    }

    /// How many documents are skipped before this page starts.
    pub fn skip(&self) -> u64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    /// Builds the [`Pagination`] for this page, given the total count of matching documents.
    pub fn pagination(&self, total: u64) -> Pagination {
        let next = (self.page.saturating_mul(self.limit) < total).then(|| Page {
            page: self.page + 1,
            limit: self.limit,
        });
        let prev = (self.page > 1).then(|| Page {
            page: self.page - 1,
            limit: self.limit,
        });

        Pagination { next, prev }
    }
}

impl Default for Page {
    fn default() -> Self {
        Self::new(DEFAULT_PAGE, DEFAULT_LIMIT)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pagination {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Page>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prev: Option<Page>,
}

/// How the documents of another collection are related to the queried documents.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Relation {
    /// All documents in `collection` whose `foreign_field` references the queried document's `_id`.
    HasMany {
        collection: &'static str,
        foreign_field: &'static str,
    },
    /// The single document in `collection` referenced by the queried document's `local_field`.
    BelongsTo {
        collection: &'static str,
        local_field: &'static str,
    },
}

/// Relation expansion: embeds the related documents under `path`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Populate {
    pub path: &'static str,
    pub relation: Relation,
    /// The fields of the related documents to embed, empty means all of them.
    pub select: Vec<String>,
}

impl Populate {
    pub fn has_many(path: &'static str, collection: &'static str, foreign_field: &'static str) -> Self {
        Self {
            path,
            relation: Relation::HasMany {
                collection,
                foreign_field,
            },
            select: vec![],
        }
    }

    /// The embedded document replaces the reference stored under `local_field`.
    pub fn belongs_to(local_field: &'static str, collection: &'static str) -> Self {
        Self {
            path: local_field,
            relation: Relation::BelongsTo {
                collection,
                local_field,
            },
            select: vec![],
        }
    }

    pub fn select<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.select = fields.into_iter().map(Into::into).collect();
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuerySpec {
    pub filter: Filter,
    /// `None` returns all fields, otherwise `_id` and the listed fields.
    pub select: Option<Vec<String>>,
    pub sort: Vec<SortKey>,
    pub page: Page,
    pub populate: Option<Populate>,
}

impl QuerySpec {
    pub fn with_populate(mut self, populate: Option<Populate>) -> Self {
        self.populate = populate;
        self
    }
}

/// The filtered, sorted and paginated slice of a collection.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultPage {
    pub items: Vec<Document>,
    /// Count of all documents matching the filter, regardless of pagination.
    pub total: u64,
    pub pagination: Pagination,
}
