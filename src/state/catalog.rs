//! Locale catalog: the provider's supported languages, loaded once at startup.

use parley_core::{error::ParleyError, message::SupportedLocale, traits::Translator};
use std::collections::BTreeMap;
use tracing::info;

/// Language used for locale display names.
pub const DISPLAY_LANGUAGE: &str = "en";

/// Immutable map of locale code → display name, ordered by code.
#[derive(Debug, Clone, Default)]
pub struct LocaleCatalog {
    locales: BTreeMap<String, String>,
}

impl LocaleCatalog {
    /// Fetch the supported-language list from the provider.
    ///
    /// Any provider failure surfaces as [`ParleyError::ProviderUnavailable`]
    /// so startup can abort before serving traffic.
    pub async fn load(translator: &dyn Translator) -> Result<Self, ParleyError> {
        let locales = translator
            .supported_locales(DISPLAY_LANGUAGE)
            .await
            .map_err(|e| match e {
                ParleyError::ProviderUnavailable(_) => e,
                other => ParleyError::ProviderUnavailable(other.to_string()),
            })?;
        let catalog = Self::from_locales(locales);
        info!(
            "loaded {} locales from {}",
            catalog.len(),
            translator.name()
        );
        Ok(catalog)
    }

    pub fn from_locales(locales: impl IntoIterator<Item = SupportedLocale>) -> Self {
        Self {
            locales: locales
                .into_iter()
                .map(|l| (l.code, l.display_name))
                .collect(),
        }
    }

    pub fn has(&self, code: &str) -> bool {
        self.locales.contains_key(code)
    }

    pub fn display_name(&self, code: &str) -> Result<&str, ParleyError> {
        self.locales
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| ParleyError::UnknownLocale(code.to_string()))
    }

    /// Every `(code, display name)` pair, ordered by code.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.locales
            .iter()
            .map(|(code, name)| (code.as_str(), name.as_str()))
    }

    pub fn len(&self) -> usize {
        self.locales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locales.is_empty()
    }
}
