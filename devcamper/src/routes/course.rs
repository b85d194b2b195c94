//! `/api/v1/courses` and `/api/v1/bootcamps/:id/courses` routes
//!
//! Every change of a course recalculates the `averageCost` of its bootcamp.
use std::sync::Arc;

use axum::{
    extract::{rejection::JsonRejection, Path, RawQuery},
    http::StatusCode,
    Extension, Json,
};
use bson::Document;
use serde_json::Value;

use primitives::{
    bootcamp,
    course::{self, CreateCourse, ModifyCourse},
    devcamper::{AdvancedResultsResponse, DataResponse, ListResponse, SuccessResponse},
    query::{Filter, Populate},
    util::json::document_to_json,
    Course,
};

use crate::{
    advanced_results::list_resource,
    authenticator::Authenticator,
    db::{derived::update_average_cost, fetch_all, fetch_by_id, find_by_id, id_filter, insert_item},
    response::ResponseError,
    Application, Auth,
};

use super::{bootcamp::load_bootcamp, non_empty, not_found, parse_id};

const COURSE: &str = "Course";

/// The bootcamp of every course comes with its `name` and `description`.
fn populate_bootcamp() -> Populate {
    Populate::belongs_to("bootcamp", bootcamp::COLLECTION).select(["name", "description"])
}

async fn load_course<A: Authenticator + 'static>(
    app: &Application<A>,
    id: &str,
) -> Result<Course, ResponseError> {
    let id = parse_id(id, COURSE)?;

    fetch_by_id::<Course>(app.store.as_ref(), course::COLLECTION, id)
        .await?
        .ok_or_else(|| not_found(COURSE, id))
}

/// `GET /api/v1/courses`
pub async fn list_courses<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    RawQuery(query): RawQuery,
) -> Result<Json<AdvancedResultsResponse<Value>>, ResponseError> {
    let response = list_resource(
        app.store.as_ref(),
        &course::SCHEMA,
        query.as_deref(),
        app.config.default_limit,
        Some(populate_bootcamp()),
    )
    .await?;

    Ok(Json(response))
}

/// `GET /api/v1/bootcamps/:id/courses`
///
/// All the courses of the bootcamp, in the order they were added.
pub async fn bootcamp_courses<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Path(bootcamp_id): Path<String>,
) -> Result<Json<ListResponse<Value>>, ResponseError> {
    let bootcamp = load_bootcamp(&app, &bootcamp_id).await?;

    let courses = fetch_all::<Document>(
        app.store.as_ref(),
        course::COLLECTION,
        &Filter::eq("bootcamp", bootcamp.id),
    )
    .await?;

    Ok(Json(ListResponse::new(
        courses.iter().map(document_to_json).collect(),
    )))
}

/// `GET /api/v1/courses/:id`
pub async fn get_course<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Path(id): Path<String>,
) -> Result<Json<DataResponse<Value>>, ResponseError> {
    let id = parse_id(&id, COURSE)?;

    let document = find_by_id(app.store.as_ref(), course::COLLECTION, id)
        .await?
        .ok_or_else(|| not_found(COURSE, id))?;

    Ok(Json(DataResponse::new(document_to_json(&document))))
}

/// `POST /api/v1/bootcamps/:id/courses`
///
/// Only the owner of the bootcamp or an admin can add courses to it.
pub async fn create_course<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Extension(auth): Extension<Auth>,
    Path(bootcamp_id): Path<String>,
    request: Result<Json<CreateCourse>, JsonRejection>,
) -> Result<(StatusCode, Json<DataResponse<Value>>), ResponseError> {
    let bootcamp = load_bootcamp(&app, &bootcamp_id).await?;

    if !auth.can_modify(bootcamp.user) {
        return Err(ResponseError::Forbidden(format!(
            "User {} is not authorized to add a course to bootcamp {}",
            auth.user_id, bootcamp.id
        )));
    }

    let Json(create) = request?;
    let course = create.into_course(bootcamp.id, auth.user_id)?;

    let store = app.store.as_ref();
    let document = insert_item(store, course::COLLECTION, &course).await?;
    update_average_cost(store, bootcamp.id).await?;

    Ok((
        StatusCode::CREATED,
        Json(DataResponse::new(document_to_json(&document))),
    ))
}

/// `PUT /api/v1/courses/:id`
pub async fn update_course<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
    request: Result<Json<ModifyCourse>, JsonRejection>,
) -> Result<Json<DataResponse<Value>>, ResponseError> {
    let course = load_course(&app, &id).await?;

    if !auth.can_modify(course.user) {
        return Err(ResponseError::Forbidden(format!(
            "User {} is not authorized to update course {}",
            auth.user_id, course.id
        )));
    }

    let Json(modify) = request?;
    modify.validate()?;
    let changes = non_empty(modify.into_changes()?)?;

    let store = app.store.as_ref();
    let updated = store
        .update(course::COLLECTION, course.id, changes)
        .await?
        .ok_or_else(|| not_found(COURSE, course.id))?;
    update_average_cost(store, course.bootcamp).await?;

    Ok(Json(DataResponse::new(document_to_json(&updated))))
}

/// `DELETE /api/v1/courses/:id`
pub async fn delete_course<A: Authenticator + 'static>(
    Extension(app): Extension<Arc<Application<A>>>,
    Extension(auth): Extension<Auth>,
    Path(id): Path<String>,
) -> Result<Json<SuccessResponse>, ResponseError> {
    let course = load_course(&app, &id).await?;

    if !auth.can_modify(course.user) {
        return Err(ResponseError::Forbidden(format!(
            "User {} is not authorized to delete course {}",
            auth.user_id, course.id
        )));
    }

    let store = app.store.as_ref();
    store.delete(course::COLLECTION, &id_filter(course.id)).await?;
    update_average_cost(store, course.bootcamp).await?;

    Ok(Json(SuccessResponse::default()))
}
