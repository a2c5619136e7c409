//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: store selection and the course services
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs, boundary validation, JSON mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};
use tower::ServiceBuilder;

use crate::config::ApiConfig;
use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

/// Build the full HTTP router (public entrypoint used by `main.rs`).
pub async fn build_app(config: &ApiConfig) -> anyhow::Result<Router> {
    let services = Arc::new(services::build_services(config).await?);
    Ok(router(services))
}

/// Router over already-wired services.
pub fn router(services: Arc<services::AppServices>) -> Router {
    let courses = routes::courses::router();

    Router::new()
        .route("/health", get(routes::system::health))
        .nest("/cursos", courses.clone())
        .nest("/api/v1/cursos", courses)
        .layer(
            ServiceBuilder::new()
                .layer(axum::middleware::from_fn(middleware::request_id_middleware))
                .layer(Extension(services)),
        )
}
