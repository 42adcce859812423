//! Bookden Application Library
//!
//! Domain modules (books, reviews, auth) and the bootstrap path that wires
//! them to the store and the HTTP server.

use std::sync::Arc;

use anyhow::Context;
use bookden_http::auth::AuthKeys;
use bookden_kernel::settings::Settings;
use bookden_kernel::{InitCtx, ModuleRegistry};
use bookden_store::MemoryStore;

pub mod modules;
pub mod seed;
pub mod validation;

/// Load settings, wire the modules, and serve until the listener stops.
/// When `seed_demo` is set, demo catalog data is loaded first.
pub async fn run(seed_demo: bool) -> anyhow::Result<()> {
    let settings = Settings::load().with_context(|| "failed to load bookden settings")?;
    bookden_telemetry::init(&settings.telemetry)?;

    tracing::info!(
        env = ?settings.environment,
        review_policy = ?settings.reviews.policy,
        "bookden bootstrap starting"
    );

    let store = Arc::new(MemoryStore::new());
    let keys = Arc::new(AuthKeys::from_settings(&settings.auth));

    if seed_demo {
        seed::load_demo_data(&store).await?;
    }

    let mut registry = ModuleRegistry::new();
    modules::register_all(&mut registry, &store, &settings, &keys);

    let ctx = InitCtx {
        settings: &settings,
        store: &store,
    };
    registry.init_modules(&ctx).await?;
    registry.start_modules(&ctx).await?;

    tracing::info!("bookden bootstrap complete");

    bookden_http::start_server(&registry, &settings, keys).await?;

    registry.stop_modules().await?;
    Ok(())
}
