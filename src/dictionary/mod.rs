// File: src/dictionary/mod.rs
//! The dictionary capability and its implementations.
pub mod asset;
pub mod binary;
pub mod collection;
pub mod read_only;

use crate::core::input::ComposedData;
use crate::core::ngram::NgramContext;
use crate::core::types::{dict_type, Locale, SuggestedWordInfo, NOT_A_PROBABILITY};

/// Opaque per-caller id. Concurrent callers use distinct ids so each gets its
/// own traversal state inside a dictionary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(pub u32);

/// Settings that shape a single query.
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionSettings {
    pub block_offensive_words: bool,
    /// Upper bound on what one dictionary returns for one query.
    pub max_results: usize,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self { block_offensive_words: true, max_results: 18 }
    }
}

/// Everything a dictionary needs to answer `get_suggestions`.
#[derive(Debug, Clone, Copy)]
pub struct SuggestionQuery<'a> {
    pub composed: &'a ComposedData,
    pub ngram_context: &'a NgramContext,
    pub settings: &'a SuggestionSettings,
    pub session_id: SessionId,
    /// Multiplier for this dictionary's locale when typing in several languages.
    pub weight_for_locale: f32,
}

/// A source of suggestions, identified by its type and locale.
///
/// Contract:
/// - `get_suggestions` hands back a list the caller owns outright; a caller may
///   append to it freely.
/// - after `close`, every query must keep answering with the "no data" values
///   (`None`, `false`, [`NOT_A_PROBABILITY`]) and must not panic.
pub trait Dictionary: Send + Sync {
    fn dict_type(&self) -> &str;

    /// `None` for dictionaries not tied to a language.
    fn locale(&self) -> Option<&Locale>;

    /// Candidates for the composed input, or `None` when this source has
    /// nothing to contribute.
    fn get_suggestions(&self, query: &SuggestionQuery<'_>) -> Option<Vec<SuggestedWordInfo>>;

    /// Whether the word is present, valid or not.
    fn is_in_dictionary(&self, word: &str) -> bool;

    /// Whether the word should be treated as valid. Some dictionaries hold
    /// entries that are present but invalid.
    fn is_valid_word(&self, word: &str) -> bool {
        self.is_in_dictionary(word)
    }

    fn get_frequency(&self, _word: &str) -> i32 {
        NOT_A_PROBABILITY
    }

    /// Highest frequency among entries matching `word` exactly, ignoring case.
    fn get_max_frequency_of_exact_matches(&self, _word: &str) -> i32 {
        NOT_A_PROBABILITY
    }

    /// Whether `candidate` is strong enough to commit without waiting for the
    /// rest of the gesture. Unknown means no.
    fn should_auto_commit(&self, _candidate: &SuggestedWordInfo) -> bool {
        false
    }

    /// False while the dictionary is still loading.
    fn is_initialized(&self) -> bool {
        true
    }

    fn is_user_specific(&self) -> bool {
        dict_type::is_user_specific(self.dict_type())
    }

    fn close(&self) {}
}

/// Stand-in origin for suggestions that come from no real dictionary: typed
/// words, hardcoded entries, resumed spans.
#[derive(Debug, Clone)]
pub struct PhonyDictionary {
    dict_type: &'static str,
}

impl PhonyDictionary {
    pub const USER_TYPED: PhonyDictionary = PhonyDictionary { dict_type: dict_type::USER_TYPED };
    pub const USER_SHORTCUT: PhonyDictionary =
        PhonyDictionary { dict_type: dict_type::USER_SHORTCUT };
    pub const APPLICATION_DEFINED: PhonyDictionary =
        PhonyDictionary { dict_type: dict_type::APPLICATION_DEFINED };
    pub const HARDCODED: PhonyDictionary = PhonyDictionary { dict_type: dict_type::HARDCODED };
    pub const RESUMED: PhonyDictionary = PhonyDictionary { dict_type: dict_type::RESUMED };
}

impl Dictionary for PhonyDictionary {
    fn dict_type(&self) -> &str {
        self.dict_type
    }

    fn locale(&self) -> Option<&Locale> {
        None
    }

    fn get_suggestions(&self, _query: &SuggestionQuery<'_>) -> Option<Vec<SuggestedWordInfo>> {
        None
    }

    fn is_in_dictionary(&self, _word: &str) -> bool {
        false
    }
}
