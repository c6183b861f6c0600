//! Application state shared by command handlers and the translation pipeline.

pub mod catalog;
pub mod registry;
pub mod store;


pub use catalog::LocaleCatalog;
pub use registry::TranslationRegistry;
pub use store::SettingsStore;

/// Everything a handler may read or mutate. Owned by the gateway loop and
/// passed down by reference; there is no global state.
#[derive(Debug)]
pub struct AppState {
    pub settings: SettingsStore,
    pub registry: TranslationRegistry,
    pub catalog: LocaleCatalog,
}

impl AppState {
    pub fn new(settings: SettingsStore, catalog: LocaleCatalog) -> Self {
        Self {
            settings,
            registry: TranslationRegistry::default(),
            catalog,
        }
    }
}
