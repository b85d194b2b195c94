//! DevCamper REST API documentation
//!
//! All routes are nested under `/api/v1`.
//!
//! Success bodies are:
//! - `{ "success": true, "data": ... }` for a single created, updated or fetched item
//! - `{ "success": true, "data": {} }` for a deletion
//! - `{ "success": true, "count": ..., "data": [...] }` for the items of a single bootcamp
//! - `{ "success": true, "count": ..., "pagination": {...}, "data": [...] }` for the
//!   [advanced results](crate::advanced_results) of a list route.
//!
//! Errors are `{ "success": false, "error": "..." }`, see [`ResponseError`].
//!
//! # Bootcamps
//!
//! - `GET /bootcamps` - public, every bootcamp with its `courses` populated
//! - `POST /bootcamps` - publisher or admin
//! - `GET /bootcamps/:id` - public
//! - `PUT /bootcamps/:id` - owner or admin
//! - `DELETE /bootcamps/:id` - owner or admin, deletes the courses and reviews too
//!
//! # Courses
//!
//! - `GET /courses` - public, with the `name` and `description` of the `bootcamp`
//! - `GET /bootcamps/:id/courses` - public
//! - `POST /bootcamps/:id/courses` - owner of the bootcamp or admin
//! - `GET /courses/:id` - public
//! - `PUT /courses/:id` - owner or admin
//! - `DELETE /courses/:id` - owner or admin
//!
//! # Reviews
//!
//! - `GET /reviews` - public, with the `name` and `description` of the `bootcamp`
//! - `GET /bootcamps/:id/reviews` - public
//! - `POST /bootcamps/:id/reviews` - user or admin, a single review per bootcamp
//! - `GET /reviews/:id` - public
//! - `PUT /reviews/:id` - owner or admin
//! - `DELETE /reviews/:id` - owner or admin
//!
//! # Users
//!
//! - `GET /users`, `POST /users` - admin
//! - `GET /users/:id`, `PUT /users/:id`, `DELETE /users/:id` - admin
//!
//! # Auth
//!
//! - `GET /auth/me` - the authenticated user
use bson::{oid::ObjectId, Document};

use crate::response::ResponseError;

pub mod auth;
pub mod bootcamp;
pub mod course;
pub mod review;
pub mod routers;
pub mod user;

/// Parses the `:id` of the route.
///
/// A malformed id is reported the same way as a missing document.
pub(crate) fn parse_id(id: &str, resource: &str) -> Result<ObjectId, ResponseError> {
    ObjectId::parse_str(id).map_err(|_| not_found(resource, id))
}

pub(crate) fn not_found(resource: &str, id: impl std::fmt::Display) -> ResponseError {
    ResponseError::NotFound(format!("{} not found with id of {}", resource, id))
}

/// The `$set` changes of an update, an update without any changes is rejected.
pub(crate) fn non_empty(changes: Document) -> Result<Document, ResponseError> {
    if changes.is_empty() {
        Err(ResponseError::BadRequest(
            "Please provide at least one field to update".to_string(),
        ))
    } else {
        Ok(changes)
    }
}
