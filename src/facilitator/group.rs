// File: src/facilitator/group.rs
use crate::config::EngineConfig;
use crate::core::input::ComposedData;
use crate::core::ngram::NgramContext;
use crate::core::types::{dict_type, Locale, SuggestedWordInfo};
use crate::dictionary::asset::AssetAddress;
use crate::dictionary::collection::DictionaryCollection;
use crate::dictionary::read_only::ReadOnlyBinaryDictionary;
use crate::dictionary::{Dictionary, SessionId, SuggestionQuery, SuggestionSettings};
use crate::facilitator::{
    DictionaryFacilitator, DictionaryInitializationListener, LoadWaitError, ResetOptions,
};
use crate::suggestions::{remove_dups, InputStyle, SuggestedWords};
use parking_lot::{Condvar, Mutex, RwLock};
use std::cmp::Reverse;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

const DICTIONARY_EXTENSION: &str = "dict";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum LoadState {
    Loading,
    Loaded,
    /// The loader went away without finishing.
    Abandoned,
}

/// One-shot completion signal for a main dictionary load.
struct LoadLatch {
    state: Mutex<LoadState>,
    cond: Condvar,
}

impl LoadLatch {
    fn new(state: LoadState) -> Self {
        Self { state: Mutex::new(state), cond: Condvar::new() }
    }

    fn finish(&self, state: LoadState) {
        let mut current = self.state.lock();
        if *current == LoadState::Loading {
            *current = state;
            self.cond.notify_all();
        }
    }

    fn wait(&self, timeout: Duration) -> Result<bool, LoadWaitError> {
        let deadline = Instant::now() + timeout;
        let mut state = self.state.lock();
        loop {
            match *state {
                LoadState::Loaded => return Ok(true),
                LoadState::Abandoned => return Err(LoadWaitError::Interrupted),
                LoadState::Loading => {
                    if self.cond.wait_until(&mut state, deadline).timed_out() {
                        return match *state {
                            LoadState::Loaded => Ok(true),
                            LoadState::Abandoned => Err(LoadWaitError::Interrupted),
                            LoadState::Loading => Ok(false),
                        };
                    }
                }
            }
        }
    }
}

/// Marks the latch abandoned unless the load got to report its outcome.
struct LoadGuard {
    latch: Arc<LoadLatch>,
}

impl Drop for LoadGuard {
    fn drop(&mut self) {
        self.latch.finish(LoadState::Abandoned);
    }
}

/// The dictionaries serving one locale.
struct DictionaryGroup {
    locale: Option<Locale>,
    /// Set once by the loader, or carried over from the previous group.
    main: Mutex<Option<Arc<ReadOnlyBinaryDictionary>>>,
    contacts: Option<Arc<ReadOnlyBinaryDictionary>>,
    merged: DictionaryCollection,
    /// Replaced groups are closed; a late loader closes what it opened.
    closed: Mutex<bool>,
}

impl DictionaryGroup {
    fn new(locale: Option<Locale>) -> Self {
        Self {
            merged: DictionaryCollection::new(dict_type::MERGED, locale.clone()),
            locale,
            main: Mutex::new(None),
            contacts: None,
            closed: Mutex::new(false),
        }
    }

    fn main(&self) -> Option<Arc<ReadOnlyBinaryDictionary>> {
        self.main.lock().clone()
    }

    /// Installs a freshly loaded main dictionary unless the group was
    /// replaced in the meantime. Returns whether it was installed.
    fn install_main(&self, dict: Arc<ReadOnlyBinaryDictionary>) -> bool {
        let closed = self.closed.lock();
        if *closed {
            dict.close();
            return false;
        }
        self.merged.add_dictionary(dict.clone());
        *self.main.lock() = Some(dict);
        true
    }

    /// Closes every member except the ones carried into the next group.
    fn close_except(&self, keep_main: bool, keep_contacts: bool) {
        *self.closed.lock() = true;
        if !keep_main {
            if let Some(main) = self.main() {
                main.close();
            }
        }
        if !keep_contacts {
            if let Some(contacts) = &self.contacts {
                contacts.close();
            }
        }
    }
}

/// Facilitator backed by dictionary files in one directory: a main
/// dictionary per locale, loaded on a background thread, and an optional
/// contacts dictionary.
pub struct DictionaryGroupFacilitator {
    dictionary_dir: PathBuf,
    use_full_edit_distance: bool,
    settings: SuggestionSettings,
    max_suggestions: usize,
    group: RwLock<Arc<DictionaryGroup>>,
    /// Also serializes resets.
    latch: Mutex<Arc<LoadLatch>>,
}

impl DictionaryGroupFacilitator {
    pub fn new(dictionary_dir: impl Into<PathBuf>) -> Self {
        Self {
            dictionary_dir: dictionary_dir.into(),
            use_full_edit_distance: false,
            settings: SuggestionSettings::default(),
            max_suggestions: SuggestionSettings::default().max_results,
            group: RwLock::new(Arc::new(DictionaryGroup::new(None))),
            latch: Mutex::new(Arc::new(LoadLatch::new(LoadState::Loaded))),
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.dictionary_dir.clone())
            .with_full_edit_distance(config.use_full_edit_distance)
            .with_settings(SuggestionSettings {
                block_offensive_words: config.block_offensive_words,
                max_results: config.max_suggestions,
            })
            .with_max_suggestions(config.max_suggestions)
    }

    pub fn with_full_edit_distance(mut self, enabled: bool) -> Self {
        self.use_full_edit_distance = enabled;
        self
    }

    pub fn with_settings(mut self, settings: SuggestionSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_max_suggestions(mut self, max_suggestions: usize) -> Self {
        self.max_suggestions = max_suggestions;
        self
    }

    pub fn dictionary_dir(&self) -> &Path {
        &self.dictionary_dir
    }

    /// `main_<locale>.dict`, or `main_<language>.dict` if there is none.
    pub fn main_dictionary_address(&self, locale: &Locale) -> Option<AssetAddress> {
        let file = |tag: &str| {
            self.dictionary_dir
                .join(format!("{}_{tag}.{DICTIONARY_EXTENSION}", dict_type::MAIN))
        };
        AssetAddress::from_file(file(locale.as_str())).or_else(|| {
            if locale.has_country() {
                AssetAddress::from_file(file(locale.language()))
            } else {
                None
            }
        })
    }

    /// `<prefix>contacts_<locale>.dict`.
    pub fn contacts_dictionary_address(&self, locale: &Locale, prefix: &str) -> Option<AssetAddress> {
        AssetAddress::from_file(self.dictionary_dir.join(format!(
            "{prefix}{}_{locale}.{DICTIONARY_EXTENSION}",
            dict_type::CONTACTS
        )))
    }

    fn current(&self) -> Arc<DictionaryGroup> {
        Arc::clone(&self.group.read())
    }

    fn open_contacts(&self, locale: &Locale, prefix: &str) -> Option<Arc<ReadOnlyBinaryDictionary>> {
        let Some(address) = self.contacts_dictionary_address(locale, prefix) else {
            debug!(locale = %locale, "no contacts dictionary");
            return None;
        };
        let dict = ReadOnlyBinaryDictionary::open(
            &address,
            self.use_full_edit_distance,
            locale.clone(),
            dict_type::CONTACTS,
        );
        dict.is_valid_dictionary().then(|| Arc::new(dict))
    }

    fn spawn_main_loader(
        &self,
        group: Arc<DictionaryGroup>,
        locale: Locale,
        latch: Arc<LoadLatch>,
        listener: Option<DictionaryInitializationListener>,
    ) {
        let address = self.main_dictionary_address(&locale);
        let use_full_edit_distance = self.use_full_edit_distance;
        let guard = LoadGuard { latch: Arc::clone(&latch) };
        let spawned = thread::Builder::new()
            .name(format!("dict-loader-{locale}"))
            .spawn(move || {
                let _guard = guard;
                let available = match address {
                    Some(address) => {
                        let dict = ReadOnlyBinaryDictionary::open(
                            &address,
                            use_full_edit_distance,
                            locale.clone(),
                            dict_type::MAIN,
                        );
                        dict.is_valid_dictionary() && group.install_main(Arc::new(dict))
                    }
                    None => {
                        warn!(locale = %locale, "no main dictionary for locale");
                        false
                    }
                };
                latch.finish(LoadState::Loaded);
                if let Some(listener) = listener {
                    listener(&locale, available);
                }
            });
        // A failed spawn drops the guard, which abandons the latch.
        if let Err(e) = spawned {
            warn!(error = %e, "could not start the dictionary loader");
        }
    }
}

impl DictionaryFacilitator for DictionaryGroupFacilitator {
    fn reset_dictionaries(&self, locale: &Locale, options: ResetOptions) {
        let mut latch = self.latch.lock();
        let old = self.current();
        let same_locale = old.locale.as_ref() == Some(locale);

        let reused_main = old
            .main()
            .filter(|_| same_locale && !options.force_reload_main_dictionary);
        let reused_contacts = old
            .contacts
            .clone()
            .filter(|_| same_locale && options.use_contacts_dictionary);

        let mut group = DictionaryGroup::new(Some(locale.clone()));
        group.contacts = if reused_contacts.is_some() {
            reused_contacts.clone()
        } else if options.use_contacts_dictionary {
            self.open_contacts(locale, &options.dictionary_name_prefix)
        } else {
            None
        };
        if let Some(main) = &reused_main {
            group.merged.add_dictionary(main.clone());
            *group.main.lock() = Some(main.clone());
        }
        if let Some(contacts) = &group.contacts {
            group.merged.add_dictionary(contacts.clone());
        }
        let group = Arc::new(group);
        *self.group.write() = Arc::clone(&group);
        old.close_except(reused_main.is_some(), reused_contacts.is_some());

        info!(
            locale = %locale,
            reload_main = reused_main.is_none(),
            contacts = group.contacts.is_some(),
            "dictionaries reset"
        );

        if reused_main.is_some() {
            *latch = Arc::new(LoadLatch::new(LoadState::Loaded));
            if let Some(listener) = options.listener {
                listener(locale, true);
            }
        } else {
            let next = Arc::new(LoadLatch::new(LoadState::Loading));
            *latch = Arc::clone(&next);
            self.spawn_main_loader(group, locale.clone(), next, options.listener);
        }
    }

    fn is_for_locale(&self, locale: &Locale) -> bool {
        self.group.read().locale.as_ref() == Some(locale)
    }

    fn wait_for_loading_main_dictionaries(&self, timeout: Duration) -> Result<bool, LoadWaitError> {
        let latch = Arc::clone(&self.latch.lock());
        latch.wait(timeout)
    }

    fn has_at_least_one_initialized_main_dictionary(&self) -> bool {
        self.current().main().is_some_and(|d| d.is_valid_dictionary())
    }

    fn close_dictionaries(&self) {
        let _latch = self.latch.lock();
        let old = std::mem::replace(&mut *self.group.write(), Arc::new(DictionaryGroup::new(None)));
        old.close_except(false, false);
        info!(locale = ?old.locale.as_ref().map(Locale::as_str), "dictionaries closed");
    }

    fn get_suggestions(
        &self,
        composed: &ComposedData,
        ngram_context: &NgramContext,
        session_id: SessionId,
    ) -> SuggestedWords {
        let group = self.current();
        let query = SuggestionQuery {
            composed,
            ngram_context,
            settings: &self.settings,
            session_id,
            weight_for_locale: 1.0,
        };
        let mut infos = group.merged.get_suggestions(&query).unwrap_or_default();
        infos.sort_by_key(|info| Reverse(info.score()));

        let typed = composed.query_word();
        if typed.is_empty() || composed.is_batch_mode {
            // No typed entry to put on top; the best match stays first.
            remove_dups("", &mut infos);
            infos.truncate(self.max_suggestions);
            let style = if typed.is_empty() { InputStyle::Prediction } else { InputStyle::TailBatch };
            return SuggestedWords::new(infos, style);
        }
        remove_dups(typed, &mut infos);

        let typed_valid = group.merged.is_valid_word(typed);
        let will_auto_correct =
            !typed_valid && infos.first().is_some_and(|i| i.is_appropriate_for_auto_correction());
        let typed_info = SuggestedWordInfo::typed(typed, ngram_context.extract_prev_words_context());
        infos.insert(0, typed_info.clone());
        infos.truncate(self.max_suggestions.max(1));
        debug!(
            session = session_id.0,
            typed = %typed,
            results = infos.len(),
            will_auto_correct,
            "group suggestions"
        );
        SuggestedWords::new(infos, InputStyle::Typing)
            .with_typed_word(typed_info, typed_valid)
            .with_auto_correct(will_auto_correct)
    }

    fn is_valid_word(&self, word: &str) -> bool {
        self.current().merged.is_valid_word(word)
    }

    fn get_frequency(&self, word: &str) -> i32 {
        self.current().merged.get_frequency(word)
    }
}
