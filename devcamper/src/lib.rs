#![deny(clippy::all)]
#![deny(rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::sync::Arc;

use bson::oid::ObjectId;
use slog::Logger;

use primitives::{config::Environment, user::Role, Config};

use authenticator::Authenticator;
use db::DocumentStore;

pub mod advanced_results;
pub mod application;
pub mod authenticator;
pub mod db;
pub mod middleware;
pub mod response;
pub mod routes;

#[cfg(any(test, feature = "test-util"))]
#[cfg_attr(docsrs, doc(cfg(feature = "test-util")))]
pub mod test_util;

/// The state shared by all requests.
#[derive(Debug)]
pub struct Application<A: Authenticator> {
    pub authenticator: A,
    pub logger: Logger,
    pub store: Arc<dyn DocumentStore>,
    pub config: Config,
    pub environment: Environment,
}

impl<A: Authenticator + 'static> Application<A> {
    pub fn new(
        authenticator: A,
        config: Config,
        environment: Environment,
        logger: Logger,
        store: Arc<dyn DocumentStore>,
    ) -> Self {
        Self {
            authenticator,
            logger,
            store,
            config,
            environment,
        }
    }
}

/// The authenticated user of the request, set by the
/// [`authenticate`](crate::middleware::auth::authenticate) middleware.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Auth {
    pub user_id: ObjectId,
    pub role: Role,
}

impl Auth {
    /// Admins can modify everything, everyone else only what they own.
    pub fn can_modify(&self, owner: ObjectId) -> bool {
        self.role.is_admin() || self.user_id == owner
    }
}
