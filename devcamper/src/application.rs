use std::{
    net::{IpAddr, Ipv4Addr, SocketAddr},
    sync::Arc,
};

use axum::{handler::Handler, middleware, Extension, Router};
use serde::Deserialize;
use slog::{error, info};

use primitives::config::Environment;

/// an error used when deserializing a [`EnvConfig`] instance from environment variables
/// see [`EnvConfig::from_env()`]
pub use envy::Error as EnvError;

use crate::{
    authenticator::Authenticator,
    middleware::{auth::authenticate, logging::log_request},
    response::ResponseError,
    routes::routers::{auth_router, bootcamps_router, courses_router, reviews_router, users_router},
    Application,
};

pub const DEFAULT_PORT: u16 = 5000;
pub const DEFAULT_IP_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::new(0, 0, 0, 0));
pub const DEFAULT_MONGODB_URL: &str = "mongodb://127.0.0.1:27017";
pub const DEFAULT_MONGODB_DATABASE: &str = "devcamper";

#[derive(Debug, Deserialize, Clone)]
pub struct EnvConfig {
    /// Defaults to `Development`: [`Environment::default()`]
    #[serde(default)]
    pub env: Environment,
    /// The port on which the DevCamper REST API will be accessible.
    #[serde(default = "default_port")]
    /// Defaults to `5000`: [`DEFAULT_PORT`]
    pub port: u16,
    /// The address on which the DevCamper REST API will be accessible.
    /// `0.0.0.0` can be used for Docker.
    /// `127.0.0.1` can be used for locally running servers.
    #[serde(default = "default_ip_addr")]
    /// Defaults to `0.0.0.0`: [`DEFAULT_IP_ADDR`]
    pub ip_addr: IpAddr,
    #[serde(default = "default_mongodb_url")]
    /// Defaults to locally running MongoDB server: [`DEFAULT_MONGODB_URL`]
    pub mongodb_url: String,
    #[serde(default = "default_mongodb_database")]
    /// Defaults to [`DEFAULT_MONGODB_DATABASE`]
    pub mongodb_database: String,
}

impl EnvConfig {
    /// Deserialize the application [`EnvConfig`] from Environment variables.
    pub fn from_env() -> Result<Self, EnvError> {
        envy::from_env()
    }

    pub fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.ip_addr, self.port)
    }
}

fn default_port() -> u16 {
    DEFAULT_PORT
}
fn default_ip_addr() -> IpAddr {
    DEFAULT_IP_ADDR
}
fn default_mongodb_url() -> String {
    DEFAULT_MONGODB_URL.to_string()
}
fn default_mongodb_database() -> String {
    DEFAULT_MONGODB_DATABASE.to_string()
}

async fn route_not_found() -> ResponseError {
    ResponseError::NotFound("Route not found".to_string())
}

impl<A: Authenticator + 'static> Application<A> {
    /// All the `/api/v1` routes with the authentication and the request logging.
    pub fn routes(self: Arc<Self>) -> Router {
        let api = Router::new()
            .nest("/bootcamps", bootcamps_router::<A>())
            .nest("/courses", courses_router::<A>())
            .nest("/reviews", reviews_router::<A>())
            .nest("/users", users_router::<A>())
            .nest("/auth", auth_router::<A>());

        Router::new()
            .nest("/api/v1", api)
            .fallback(route_not_found.into_service())
            // keeps the order from bottom to top!
            .layer(middleware::from_fn(authenticate::<A, _>))
            .layer(middleware::from_fn(log_request::<A, _>))
            .layer(Extension(self))
    }

    /// Starts the `axum` `Server` and shuts it down on `Ctrl+C`.
    pub async fn run(self, socket_addr: SocketAddr) {
        let logger = self.logger.clone();
        info!(&logger, "Listening on socket address: {}!", socket_addr);

        let router = Arc::new(self).routes();

        let server = axum::Server::bind(&socket_addr)
            .serve(router.into_make_service())
            .with_graceful_shutdown(shutdown_signal(logger.clone()));

        if let Err(e) = server.await {
            error!(&logger, "server error: {}", e; "main" => "run");
        }
    }
}

async fn shutdown_signal(logger: slog::Logger) {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(&logger, "Shutting down the server"),
        Err(err) => error!(&logger, "Failed to listen for the shutdown signal: {}", err; "main" => "run"),
    }
}
