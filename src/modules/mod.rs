pub mod auth;
pub mod books;
pub mod reviews;

use std::sync::Arc;

use bookden_http::auth::AuthKeys;
use bookden_kernel::settings::Settings;
use bookden_kernel::ModuleRegistry;
use bookden_store::MemoryStore;

/// Register all domain modules with the registry. Each module receives its
/// collaborators here; nothing is resolved from global state.
pub fn register_all(
    registry: &mut ModuleRegistry,
    store: &Arc<MemoryStore>,
    settings: &Settings,
    keys: &Arc<AuthKeys>,
) {
    registry.register(books::create_module(store.clone()));
    registry.register(reviews::create_module(store.clone(), settings.reviews.policy));
    registry.register(auth::create_module(store.clone(), keys.clone()));
}
