#![deny(rust_2018_idioms)]
#![deny(clippy::all)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub use self::{
    bootcamp::Bootcamp,
    config::Config,
    course::Course,
    query::{QueryParams, QuerySpec, ResultPage},
    review::Review,
    schema::{FieldKind, Schema},
    user::{Role, User},
    validation::ValidationError,
};

pub mod bootcamp;
pub mod config;
pub mod course;
/// The response bodies of the REST API
pub mod devcamper;
pub mod query;
pub mod review;
pub mod schema;
pub mod user;
pub mod validation;

pub mod util {
    pub mod json;
    pub mod logging;
    pub mod slug;
}

#[cfg(any(test, feature = "test-util"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub mod test_util;
