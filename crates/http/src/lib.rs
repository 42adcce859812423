//! HTTP server facade for bookden with Axum, error handling, and OpenAPI support.

use std::sync::Arc;

use anyhow::Context;
use axum::{routing::get, Router};

use bookden_kernel::ModuleRegistry;

pub mod auth;
pub mod envelope;
pub mod error;
pub mod extract;
pub mod router;

use auth::AuthKeys;
use router::RouterBuilder;

/// Start the HTTP server with the given module registry. The JWT keys are
/// shared with every handler through request extensions so the `CurrentUser`
/// extractor and the auth module verify against the same secret.
pub async fn start_server(
    registry: &ModuleRegistry,
    settings: &bookden_kernel::settings::Settings,
    keys: Arc<AuthKeys>,
) -> anyhow::Result<()> {
    tracing::info!(
        "starting HTTP server on {}:{}",
        settings.server.host,
        settings.server.port
    );

    // Build the main router
    let app = build_router(registry, settings, keys).context("failed to build HTTP router")?;

    // Create the server
    let listener =
        tokio::net::TcpListener::bind(format!("{}:{}", settings.server.host, settings.server.port))
            .await
            .context("failed to bind to address")?;

    tracing::info!(
        "HTTP server listening on http://{}:{}",
        settings.server.host,
        settings.server.port
    );

    // Start serving
    axum::serve(listener, app)
        .await
        .context("HTTP server failed")?;

    Ok(())
}

/// Build the main HTTP router with all module routes mounted
fn build_router(
    registry: &ModuleRegistry,
    settings: &bookden_kernel::settings::Settings,
    keys: Arc<AuthKeys>,
) -> anyhow::Result<Router> {
    let mut router_builder = RouterBuilder::new();

    // Add health check route
    router_builder = router_builder.route("/healthz", get(health_check));

    // Mount module routes
    for module in registry.modules() {
        let module_name = module.name();
        let module_router = module.routes();

        tracing::info!(
            module = module_name,
            "mounting module routes under /api/{}",
            module_name
        );
        router_builder = router_builder.mount_module(module_name, module_router);
    }

    // Add OpenAPI documentation
    router_builder = router_builder.with_openapi(registry);

    // Global middlewares wrap everything registered above, so they must be
    // layered after the routes are in place.
    router_builder = router_builder
        .with_tracing()
        .with_cors()
        .with_request_id()
        .with_timeout(settings.server.request_timeout_ms)
        .with_auth(keys);

    Ok(router_builder.build())
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "ok"
}
