//! This module contains all the DevCamper REST API routers.
//!
//! # Routers
//!
//! Routers are functions returning the [`Router`] of a route prefix
//! (e.g. `/bootcamps`, `/courses`) and they:
//!
//! - Match against the different HTTP methods
//! - Call the required [`middleware`](`crate::middleware`)s for every route
//!
//! The routers are merged and nested under `/api/v1` by [`Application::routes`](crate::Application::routes).
use axum::{
    middleware,
    routing::{get, post, put},
    Router,
};

use crate::{
    authenticator::Authenticator,
    middleware::auth::{
        admin_only, authentication_required, publisher_or_admin, user_or_admin,
    },
    routes::{
        auth::get_me,
        bootcamp::{
            create_bootcamp, delete_bootcamp, get_bootcamp, list_bootcamps, update_bootcamp,
        },
        course::{
            bootcamp_courses, create_course, delete_course, get_course, list_courses,
            update_course,
        },
        review::{
            bootcamp_reviews, create_review, delete_review, get_review, list_reviews,
            update_review,
        },
        user::{create_user, delete_user, get_user, list_users, update_user},
    },
};

/// `/bootcamps` including the courses and reviews of a single bootcamp.
pub fn bootcamps_router<A: Authenticator + 'static>() -> Router {
    Router::new()
        .route("/", get(list_bootcamps::<A>))
        .route(
            "/",
            post(create_bootcamp::<A>)
                .route_layer(middleware::from_fn(publisher_or_admin))
                .route_layer(middleware::from_fn(authentication_required)),
        )
        .route("/:id", get(get_bootcamp::<A>))
        .route(
            "/:id",
            put(update_bootcamp::<A>)
                .delete(delete_bootcamp::<A>)
                .route_layer(middleware::from_fn(publisher_or_admin))
                .route_layer(middleware::from_fn(authentication_required)),
        )
        .route("/:id/courses", get(bootcamp_courses::<A>))
        .route(
            "/:id/courses",
            post(create_course::<A>)
                .route_layer(middleware::from_fn(publisher_or_admin))
                .route_layer(middleware::from_fn(authentication_required)),
        )
        .route("/:id/reviews", get(bootcamp_reviews::<A>))
        .route(
            "/:id/reviews",
            post(create_review::<A>)
                .route_layer(middleware::from_fn(user_or_admin))
                .route_layer(middleware::from_fn(authentication_required)),
        )
}

pub fn courses_router<A: Authenticator + 'static>() -> Router {
    Router::new()
        .route("/", get(list_courses::<A>))
        .route("/:id", get(get_course::<A>))
        .route(
            "/:id",
            put(update_course::<A>)
                .delete(delete_course::<A>)
                .route_layer(middleware::from_fn(publisher_or_admin))
                .route_layer(middleware::from_fn(authentication_required)),
        )
}

/// Reviews are written by users, so the ownership is the only check for the changes.
pub fn reviews_router<A: Authenticator + 'static>() -> Router {
    Router::new()
        .route("/", get(list_reviews::<A>))
        .route("/:id", get(get_review::<A>))
        .route(
            "/:id",
            put(update_review::<A>)
                .delete(delete_review::<A>)
                .route_layer(middleware::from_fn(user_or_admin))
                .route_layer(middleware::from_fn(authentication_required)),
        )
}

pub fn users_router<A: Authenticator + 'static>() -> Router {
    Router::new()
        .route("/", get(list_users::<A>).post(create_user::<A>))
        .route(
            "/:id",
            get(get_user::<A>)
                .put(update_user::<A>)
                .delete(delete_user::<A>),
        )
        // keeps the order from bottom to top!
        .route_layer(middleware::from_fn(admin_only))
        .route_layer(middleware::from_fn(authentication_required))
}

pub fn auth_router<A: Authenticator + 'static>() -> Router {
    Router::new().route(
        "/me",
        get(get_me::<A>).route_layer(middleware::from_fn(authentication_required)),
    )
}
