pub mod products;

use vitrine_db::DocumentStore;
use vitrine_kernel::{settings::Settings, ModuleRegistry};

/// Register all application modules with the registry
pub fn register_all(registry: &mut ModuleRegistry, store: &DocumentStore, settings: &Settings) {
    registry.register(products::create_module(
        store.clone(),
        settings.products.update_mode,
    ));
}
