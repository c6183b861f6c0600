//! Active per-member translations. Process lifetime only, never persisted.

use super::catalog::LocaleCatalog;
use parley_core::error::ParleyError;
use std::collections::BTreeMap;

/// Member ID → target locale code.
#[derive(Debug, Default)]
pub struct TranslationRegistry {
    entries: BTreeMap<String, String>,
}

impl TranslationRegistry {
    /// Enable translation for a member, replacing any previous locale.
    ///
    /// The locale is validated against the catalog before insertion, so every
    /// stored code is a catalog key.
    pub fn enable(
        &mut self,
        member_id: &str,
        locale: &str,
        catalog: &LocaleCatalog,
    ) -> Result<(), ParleyError> {
        if !catalog.has(locale) {
            return Err(ParleyError::UnknownLocale(locale.to_string()));
        }
        self.entries
            .insert(member_id.to_string(), locale.to_string());
        Ok(())
    }

    /// Remove a member's entry. Returns `false` when there was none.
    pub fn disable(&mut self, member_id: &str) -> bool {
        self.entries.remove(member_id).is_some()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn get(&self, member_id: &str) -> Option<&str> {
        self.entries.get(member_id).map(String::as_str)
    }

    /// Every `(member ID, locale code)` pair, ordered by member ID.
    ///
    /// Entries may name members who have since left; callers filter.
    pub fn list(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(member, locale)| (member.as_str(), locale.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
