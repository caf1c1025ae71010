// File: src/facilitator/lru_cache.rs
use crate::core::types::Locale;
use crate::facilitator::{DictionaryFacilitator, LoadWaitError, ResetOptions};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// How long `get` blocks for the main dictionary after a reset: one wait of
/// `timeout`, repeated only when the wait is interrupted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaitPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
}

impl Default for WaitPolicy {
    fn default() -> Self {
        Self { timeout: Duration::from_millis(1000), max_retries: 5 }
    }
}

struct CacheState {
    /// `None` until the first `get`.
    locale: Option<Locale>,
    use_contacts_dictionary: bool,
}

/// A single facilitator slot rebuilt in place whenever the requested locale or
/// the contacts flag changes.
///
/// Every locale switch and flag change goes through one mutex, so callers
/// asking for different locales at the same time take turns rebuilding the
/// slot.
pub struct DictionaryFacilitatorLruCache<F> {
    facilitator: Arc<F>,
    dictionary_name_prefix: String,
    wait_policy: WaitPolicy,
    state: Mutex<CacheState>,
}

impl<F: DictionaryFacilitator> DictionaryFacilitatorLruCache<F> {
    pub fn new(facilitator: F, dictionary_name_prefix: impl Into<String>) -> Self {
        Self {
            facilitator: Arc::new(facilitator),
            dictionary_name_prefix: dictionary_name_prefix.into(),
            wait_policy: WaitPolicy::default(),
            state: Mutex::new(CacheState { locale: None, use_contacts_dictionary: false }),
        }
    }

    pub fn with_wait_policy(mut self, wait_policy: WaitPolicy) -> Self {
        self.wait_policy = wait_policy;
        self
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        self.wait_policy
    }

    /// A timeout ends the wait; the caller carries on with whatever loaded.
    fn wait_for_loading_main_dictionary(&self) {
        let WaitPolicy { timeout, max_retries } = self.wait_policy;
        for attempt in 1..=max_retries {
            match self.facilitator.wait_for_loading_main_dictionaries(timeout) {
                Ok(true) => return,
                Ok(false) => {
                    info!(?timeout, "timed out waiting for the main dictionary");
                    return;
                }
                Err(LoadWaitError::Interrupted) => {
                    info!(attempt, "interrupted while waiting for the main dictionary")
                }
            }
            if attempt < max_retries {
                debug!(attempt, "retrying");
            }
        }
        warn!(retries = max_retries, "gave up waiting for the main dictionary");
    }

    fn reset_dictionaries_for_locale(&self, state: &CacheState) {
        // Nothing to rebuild before the first get().
        let Some(locale) = &state.locale else { return };
        info!(locale = %locale, use_contacts = state.use_contacts_dictionary, "resetting dictionaries");
        self.facilitator.reset_dictionaries(
            locale,
            ResetOptions {
                use_contacts_dictionary: state.use_contacts_dictionary,
                use_personalized_dictionaries: false,
                force_reload_main_dictionary: false,
                account: None,
                dictionary_name_prefix: self.dictionary_name_prefix.clone(),
                listener: None,
            },
        );
    }

    pub fn set_use_contacts_dictionary(&self, use_contacts_dictionary: bool) {
        let mut state = self.state.lock();
        if state.use_contacts_dictionary == use_contacts_dictionary {
            return;
        }
        state.use_contacts_dictionary = use_contacts_dictionary;
        self.reset_dictionaries_for_locale(&state);
        self.wait_for_loading_main_dictionary();
    }

    /// The facilitator, rebuilt for `locale` if it serves another one.
    pub fn get(&self, locale: &Locale) -> Arc<F> {
        let mut state = self.state.lock();
        if !self.facilitator.is_for_locale(locale) {
            state.locale = Some(locale.clone());
            self.reset_dictionaries_for_locale(&state);
        }
        self.wait_for_loading_main_dictionary();
        Arc::clone(&self.facilitator)
    }

    /// The cache is not meant to be used again afterwards.
    pub fn close_dictionaries(&self) {
        let _state = self.state.lock();
        self.facilitator.close_dictionaries();
    }
}
