// File: src/facilitator/mod.rs
//! Owners of the dictionary set for one locale.
pub mod group;
pub mod lru_cache;

use crate::core::input::ComposedData;
use crate::core::ngram::NgramContext;
use crate::core::types::Locale;
use crate::dictionary::SessionId;
use crate::suggestions::SuggestedWords;
use std::sync::Arc;
use std::time::Duration;

pub use crate::error::LoadWaitError;

/// Told once the main dictionary for a locale has finished loading, with
/// whether one is available.
pub type DictionaryInitializationListener = Arc<dyn Fn(&Locale, bool) + Send + Sync>;

/// How `reset_dictionaries` should rebuild the dictionary set.
#[derive(Clone, Default)]
pub struct ResetOptions {
    pub use_contacts_dictionary: bool,
    pub use_personalized_dictionaries: bool,
    /// Reload the main dictionary even if it already serves the locale.
    pub force_reload_main_dictionary: bool,
    pub account: Option<String>,
    pub dictionary_name_prefix: String,
    pub listener: Option<DictionaryInitializationListener>,
}

/// Holds and queries the dictionaries (main, contacts, ...) for one locale.
pub trait DictionaryFacilitator: Send + Sync {
    /// Rebuilds the dictionary set for `locale`. The main dictionary may keep
    /// loading after this returns.
    fn reset_dictionaries(&self, locale: &Locale, options: ResetOptions);

    fn is_for_locale(&self, locale: &Locale) -> bool;

    /// Waits up to `timeout` for the main dictionary load started by the
    /// last reset. `Ok(false)` means the wait timed out.
    fn wait_for_loading_main_dictionaries(&self, timeout: Duration) -> Result<bool, LoadWaitError>;

    fn has_at_least_one_initialized_main_dictionary(&self) -> bool;

    fn close_dictionaries(&self);

    fn get_suggestions(
        &self,
        composed: &ComposedData,
        ngram_context: &NgramContext,
        session_id: SessionId,
    ) -> SuggestedWords;

    fn is_valid_word(&self, word: &str) -> bool;

    fn get_frequency(&self, word: &str) -> i32;
}
