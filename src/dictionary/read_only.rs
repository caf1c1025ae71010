// File: src/dictionary/read_only.rs
use crate::core::types::{Locale, SuggestedWordInfo, NOT_A_PROBABILITY};
use crate::dictionary::asset::AssetAddress;
use crate::dictionary::binary::BinaryDictionary;
use crate::dictionary::{Dictionary, SuggestionQuery};
use parking_lot::RwLock;
use tracing::{info, warn};

/// A [`BinaryDictionary`] shared by many threads.
///
/// Queries never wait: each one tries to take the read side of the lock and,
/// if `close` holds or is waiting for the write side, answers "no data" at
/// once. `close` waits for in-flight queries to drain, then drops the handle;
/// from then on every query keeps answering "no data".
///
/// Concurrent callers must pass distinct session ids.
pub struct ReadOnlyBinaryDictionary {
    dict_type: String,
    locale: Locale,
    handle: RwLock<Option<BinaryDictionary>>,
}

impl ReadOnlyBinaryDictionary {
    /// Opens the payload behind `address`. A payload that cannot be read gives
    /// an invalid dictionary (see [`is_valid_dictionary`](Self::is_valid_dictionary))
    /// rather than an error.
    pub fn open(
        address: &AssetAddress,
        use_full_edit_distance: bool,
        locale: Locale,
        dict_type: impl Into<String>,
    ) -> Self {
        let dict_type = dict_type.into();
        let handle = match BinaryDictionary::open(address, use_full_edit_distance) {
            Ok(dict) => {
                if dict.locale() != &locale {
                    warn!(
                        address = %address,
                        expected = %locale,
                        found = %dict.locale(),
                        "dictionary locale differs from the requested one"
                    );
                }
                Some(dict)
            }
            Err(e) => {
                warn!(address = %address, dict_type = %dict_type, error = %e, "could not open dictionary");
                None
            }
        };
        Self { dict_type, locale, handle: RwLock::new(handle) }
    }

    pub fn from_binary(dict: BinaryDictionary, locale: Locale, dict_type: impl Into<String>) -> Self {
        Self { dict_type: dict_type.into(), locale, handle: RwLock::new(Some(dict)) }
    }

    /// False if the payload could not be loaded or the dictionary was closed.
    /// Blocks only while a close is in progress.
    pub fn is_valid_dictionary(&self) -> bool {
        self.handle.read().is_some()
    }

    /// Runs `f` against the handle if it can be had without waiting.
    fn with_handle<T>(&self, unavailable: T, f: impl FnOnce(&BinaryDictionary) -> T) -> T {
        match self.handle.try_read() {
            Some(guard) => match guard.as_ref() {
                Some(dict) => f(dict),
                None => unavailable,
            },
            None => unavailable,
        }
    }
}

impl Dictionary for ReadOnlyBinaryDictionary {
    fn dict_type(&self) -> &str {
        &self.dict_type
    }

    fn locale(&self) -> Option<&Locale> {
        Some(&self.locale)
    }

    fn get_suggestions(&self, query: &SuggestionQuery<'_>) -> Option<Vec<SuggestedWordInfo>> {
        self.with_handle(None, |d| d.get_suggestions(query))
    }

    fn is_in_dictionary(&self, word: &str) -> bool {
        self.with_handle(false, |d| d.is_in_dictionary(word))
    }

    fn should_auto_commit(&self, candidate: &SuggestedWordInfo) -> bool {
        self.with_handle(false, |d| d.should_auto_commit(candidate))
    }

    fn get_frequency(&self, word: &str) -> i32 {
        self.with_handle(NOT_A_PROBABILITY, |d| d.get_frequency(word))
    }

    fn get_max_frequency_of_exact_matches(&self, word: &str) -> i32 {
        self.with_handle(NOT_A_PROBABILITY, |d| d.get_max_frequency_of_exact_matches(word))
    }

    fn close(&self) {
        let mut guard = self.handle.write();
        if guard.take().is_some() {
            info!(dict_type = %self.dict_type, locale = %self.locale, "closed dictionary");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::input::ComposedData;
    use crate::core::ngram::NgramContext;
    use crate::core::types::WordEntry;
    use crate::dictionary::{SessionId, SuggestionSettings};
    use crate::persistence::{DictionaryHeader, DictionaryPayload};
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    fn dictionary() -> ReadOnlyBinaryDictionary {
        let payload = DictionaryPayload {
            header: DictionaryHeader {
                locale: Locale::new("en"),
                dict_type: "main".into(),
                description: String::new(),
                version: 1,
            },
            words: vec![
                WordEntry { word: "cat".into(), frequency: 40, possibly_offensive: false },
                WordEntry { word: "catalog".into(), frequency: 20, possibly_offensive: false },
            ],
            bigrams: vec![],
        };
        ReadOnlyBinaryDictionary::from_binary(
            BinaryDictionary::from_payload(payload, false),
            Locale::new("en"),
            "main",
        )
    }

    fn suggestions(dict: &ReadOnlyBinaryDictionary, typed: &str) -> Option<Vec<SuggestedWordInfo>> {
        let composed = ComposedData::from_typed(typed);
        let ngram = NgramContext::empty();
        let settings = SuggestionSettings::default();
        dict.get_suggestions(&SuggestionQuery {
            composed: &composed,
            ngram_context: &ngram,
            settings: &settings,
            session_id: SessionId(7),
            weight_for_locale: 1.0,
        })
    }

    #[test]
    fn answers_while_open() {
        let dict = dictionary();
        assert!(dict.is_valid_dictionary());
        assert_eq!(dict.get_frequency("cat"), 40);
        assert!(dict.is_in_dictionary("catalog"));
        assert_eq!(suggestions(&dict, "cat").unwrap().len(), 2);
    }

    #[test]
    fn closed_dictionary_answers_no_data() {
        let dict = dictionary();
        dict.close();
        assert!(!dict.is_valid_dictionary());
        assert_eq!(dict.get_frequency("cat"), NOT_A_PROBABILITY);
        assert_eq!(dict.get_max_frequency_of_exact_matches("cat"), NOT_A_PROBABILITY);
        assert!(!dict.is_in_dictionary("cat"));
        assert!(suggestions(&dict, "cat").is_none());
        // Closing twice is harmless.
        dict.close();
    }

    #[test]
    fn queries_do_not_wait_for_an_exclusive_holder() {
        let dict = dictionary();
        let _exclusive = dict.handle.write();
        let start = Instant::now();
        assert_eq!(dict.get_frequency("cat"), NOT_A_PROBABILITY);
        assert!(!dict.is_in_dictionary("cat"));
        assert!(suggestions(&dict, "cat").is_none());
        assert!(start.elapsed() < Duration::from_secs(1));
    }

    #[test]
    fn close_waits_for_readers_to_drain() {
        let dict = Arc::new(dictionary());
        let reader = dict.handle.read();

        let closer = {
            let dict = Arc::clone(&dict);
            std::thread::spawn(move || dict.close())
        };
        std::thread::sleep(Duration::from_millis(50));
        assert!(!closer.is_finished());
        drop(reader);
        closer.join().unwrap();
        assert_eq!(dict.get_frequency("cat"), NOT_A_PROBABILITY);
    }

    #[test]
    fn unreadable_payload_gives_an_invalid_dictionary() {
        let file = tempfile::NamedTempFile::new().unwrap();
        std::fs::write(file.path(), b"not a dictionary").unwrap();
        let address = AssetAddress::from_file(file.path()).unwrap();
        let dict = ReadOnlyBinaryDictionary::open(&address, false, Locale::new("en"), "main");
        assert!(!dict.is_valid_dictionary());
        assert_eq!(dict.get_frequency("cat"), NOT_A_PROBABILITY);
    }

    #[test]
    fn oversized_range_gives_an_invalid_dictionary() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("all.bundle");
        let payload = DictionaryPayload {
            header: DictionaryHeader {
                locale: Locale::new("en"),
                dict_type: "main".into(),
                description: String::new(),
                version: 1,
            },
            words: vec![WordEntry { word: "cat".into(), frequency: 40, possibly_offensive: false }],
            bigrams: vec![],
        };
        crate::persistence::save_bundle(&path, &[payload]).unwrap();

        let address = AssetAddress::from_file_name_and_offset(path.to_str(), 8, 1 << 60).unwrap();
        let dict = ReadOnlyBinaryDictionary::open(&address, false, Locale::new("en"), "main");
        assert!(!dict.is_valid_dictionary());
        assert_eq!(dict.get_frequency("cat"), NOT_A_PROBABILITY);
        assert!(suggestions(&dict, "cat").is_none());
    }
}
