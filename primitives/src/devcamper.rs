//! The response bodies of the `devcamper` REST API.
use serde::{Deserialize, Serialize};

use crate::query::Pagination;

/// Returned by the routes which have nothing else to report, e.g. a deletion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    pub success: bool,
    /// Always an empty object
    pub data: serde_json::Map<String, serde_json::Value>,
}

impl Default for SuccessResponse {
    fn default() -> Self {
        Self {
            success: true,
            data: Default::default(),
        }
    }
}

/// A single item, created or updated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub success: bool,
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
        }
    }
}

/// All the items of a nested resource, e.g. the courses of a bootcamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListResponse<T> {
    pub success: bool,
    pub count: usize,
    pub data: Vec<T>,
}

impl<T> ListResponse<T> {
    pub fn new(data: Vec<T>) -> Self {
        Self {
            success: true,
            count: data.len(),
            data,
        }
    }
}

/// A single page of a filtered and sorted resource list.
///
/// `count` is the number of items on this page, not the total.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AdvancedResultsResponse<T> {
    pub success: bool,
    pub count: usize,
    pub pagination: Pagination,
    pub data: Vec<T>,
}

impl<T> AdvancedResultsResponse<T> {
    pub fn new(data: Vec<T>, pagination: Pagination) -> Self {
        Self {
            success: true,
            count: data.len(),
            pagination,
            data,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}
