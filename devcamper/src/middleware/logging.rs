use std::{sync::Arc, time::Instant};

use axum::{http::Request, middleware::Next};
use slog::{error, info};

use primitives::config::Environment;

use crate::{authenticator::Authenticator, response::InternalError, Application};

/// Logs every request in development and the cause of every `500` response.
pub async fn log_request<A: Authenticator + 'static, B>(
    request: Request<B>,
    next: Next<B>,
) -> axum::response::Response {
    let app = request
        .extensions()
        .get::<Arc<Application<A>>>()
        .expect("Application should always be present")
        .clone();

    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let started = Instant::now();

    let response = next.run(request).await;

    if let Some(InternalError(cause)) = response.extensions().get::<InternalError>() {
        error!(&app.logger, "{} {}: {}", method, path, cause; "module" => "http");
    }

    if app.environment == Environment::Development {
        info!(
            &app.logger,
            "{} {} {} - {} ms",
            method,
            path,
            response.status().as_u16(),
            started.elapsed().as_millis()
        );
    }

    response
}
