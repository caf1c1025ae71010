// src/core/types.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Index of a unigram inside a loaded dictionary.
pub type WordId = usize;

/// Probability/frequency value meaning "no such word".
pub const NOT_A_PROBABILITY: i32 = -1;

/// Longest word the decoder will store, in code points. Also bounds the gesture
/// trace kept with a committed word.
pub const DICTIONARY_MAX_WORD_LENGTH: usize = 48;

/// Number of previous words carried by an n-gram context.
pub const MAX_PREV_WORD_COUNT_FOR_N_GRAM: usize = 3;

/// Dictionary type names.
pub mod dict_type {
    pub const MAIN: &str = "main";
    pub const CONTACTS: &str = "contacts";
    /// The system-managed user dictionary.
    pub const USER: &str = "user";
    pub const USER_HISTORY: &str = "history";
    pub const USER_TYPED: &str = "user_typed";
    pub const USER_SHORTCUT: &str = "user_shortcut";
    pub const APPLICATION_DEFINED: &str = "application_defined";
    /// Punctuation signs and such.
    pub const HARDCODED: &str = "hardcoded";
    /// Comes from a span that was already in the text field.
    pub const RESUMED: &str = "resumed";
    pub const MERGED: &str = "merged";

    /// Types whose content is derived from data specific to the user.
    pub fn is_user_specific(dict_type: &str) -> bool {
        matches!(dict_type, USER_TYPED | USER | CONTACTS | USER_HISTORY)
    }
}

/// A language tag normalised to `ll` or `ll_CC` form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct Locale(String);

impl Locale {
    pub fn new(tag: &str) -> Self {
        let mut parts = tag.trim().split(['_', '-']).filter(|p| !p.is_empty());
        let language = parts.next().unwrap_or("").to_ascii_lowercase();
        match parts.next() {
            Some(country) => Self(format!("{}_{}", language, country.to_ascii_uppercase())),
            None => Self(language),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn language(&self) -> &str {
        self.0.split('_').next().unwrap_or(&self.0)
    }

    pub fn has_country(&self) -> bool {
        self.0.contains('_')
    }
}

impl From<String> for Locale {
    fn from(s: String) -> Self {
        Self::new(&s)
    }
}

impl From<Locale> for String {
    fn from(l: Locale) -> Self {
        l.0
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a suggestion is, independent of where it came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestionKind {
    /// What the user typed.
    Typed,
    Correction,
    /// A suggestion with appended characters.
    Completion,
    Whitelist,
    Blacklist,
    /// Punctuation and other fixed entries.
    Hardcoded,
    AppDefined,
    Shortcut,
    /// A suggestion made with no input.
    Prediction,
    Resumed,
    OovCorrection,
}

/// Flags carried next to the kind of a suggestion.
pub mod kind_flags {
    pub const POSSIBLY_OFFENSIVE: u32 = 0x8000_0000;
    pub const EXACT_MATCH: u32 = 0x4000_0000;
    pub const EXACT_MATCH_WITH_INTENTIONAL_OMISSION: u32 = 0x2000_0000;
    pub const APPROPRIATE_FOR_AUTO_CORRECTION: u32 = 0x1000_0000;
}

/// One ranked candidate. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuggestedWordInfo {
    word: String,
    prev_words_context: String,
    score: i32,
    kind: SuggestionKind,
    flags: u32,
    /// Type of the dictionary that produced this suggestion.
    source: String,
    /// For a gesture spanning two words, the index in the touch trace where
    /// the second word starts.
    index_of_touch_point_of_second_word: Option<usize>,
    /// How confident we are that the first word can be committed on its own.
    auto_commit_first_word_confidence: Option<i32>,
}

impl SuggestedWordInfo {
    pub const MAX_SCORE: i32 = i32::MAX;

    pub fn new(
        word: impl Into<String>,
        prev_words_context: impl Into<String>,
        score: i32,
        kind: SuggestionKind,
        source: impl Into<String>,
    ) -> Self {
        Self {
            word: word.into(),
            prev_words_context: prev_words_context.into(),
            score,
            kind,
            flags: 0,
            source: source.into(),
            index_of_touch_point_of_second_word: None,
            auto_commit_first_word_confidence: None,
        }
    }

    pub fn with_flags(mut self, flags: u32) -> Self {
        self.flags |= flags;
        self
    }

    pub fn with_auto_commit(mut self, index_of_second_word: usize, confidence: i32) -> Self {
        self.index_of_touch_point_of_second_word = Some(index_of_second_word);
        self.auto_commit_first_word_confidence = Some(confidence);
        self
    }

    /// A fixed entry such as a punctuation key spec.
    pub fn hardcoded(word: impl Into<String>) -> Self {
        Self::new(word, "", Self::MAX_SCORE, SuggestionKind::Hardcoded, dict_type::HARDCODED)
    }

    /// The literal text the user typed.
    pub fn typed(word: impl Into<String>, prev_words_context: impl Into<String>) -> Self {
        Self::new(
            word,
            prev_words_context,
            Self::MAX_SCORE,
            SuggestionKind::Typed,
            dict_type::USER_TYPED,
        )
    }

    pub fn word(&self) -> &str {
        &self.word
    }

    pub fn prev_words_context(&self) -> &str {
        &self.prev_words_context
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn kind(&self) -> SuggestionKind {
        self.kind
    }

    pub fn is_kind_of(&self, kind: SuggestionKind) -> bool {
        self.kind == kind
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn index_of_touch_point_of_second_word(&self) -> Option<usize> {
        self.index_of_touch_point_of_second_word
    }

    pub fn auto_commit_first_word_confidence(&self) -> Option<i32> {
        self.auto_commit_first_word_confidence
    }

    pub fn code_point_count(&self) -> usize {
        self.word.chars().count()
    }

    pub fn is_eligible_for_auto_commit(&self) -> bool {
        self.kind == SuggestionKind::Correction
            && self.index_of_touch_point_of_second_word.is_some()
    }

    pub fn is_possibly_offensive(&self) -> bool {
        self.flags & kind_flags::POSSIBLY_OFFENSIVE != 0
    }

    pub fn is_exact_match(&self) -> bool {
        self.flags & kind_flags::EXACT_MATCH != 0
    }

    pub fn is_exact_match_with_intentional_omission(&self) -> bool {
        self.flags & kind_flags::EXACT_MATCH_WITH_INTENTIONAL_OMISSION != 0
    }

    pub fn is_appropriate_for_auto_correction(&self) -> bool {
        self.flags & kind_flags::APPROPRIATE_FOR_AUTO_CORRECTION != 0
    }
}

impl fmt::Display for SuggestedWordInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.word)
    }
}

/// One unigram as stored in a dictionary file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordEntry {
    pub word: String,
    /// 0..=255, higher is more common.
    pub frequency: i32,
    pub possibly_offensive: bool,
}

/// A (previous word, word) pair with its own frequency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BigramEntry {
    pub prev_word: String,
    pub word: String,
    pub frequency: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn locale_tags_are_normalised() {
        assert_eq!(Locale::new("en-us").as_str(), "en_US");
        assert_eq!(Locale::new("FR").as_str(), "fr");
        assert_eq!(Locale::new("pt_BR").language(), "pt");
        assert!(!Locale::new("de").has_country());
    }

    #[test]
    fn auto_commit_needs_correction_and_second_word_index() {
        let plain = SuggestedWordInfo::new("hello", "", 10, SuggestionKind::Correction, "main");
        assert!(!plain.is_eligible_for_auto_commit());
        assert!(plain.clone().with_auto_commit(4, 10).is_eligible_for_auto_commit());

        let completion = SuggestedWordInfo::new("hello", "", 10, SuggestionKind::Completion, "main")
            .with_auto_commit(4, 10);
        assert!(!completion.is_eligible_for_auto_commit());
    }

    #[test]
    fn flags_accumulate() {
        let info = SuggestedWordInfo::new("x", "", 1, SuggestionKind::Correction, "main")
            .with_flags(kind_flags::EXACT_MATCH)
            .with_flags(kind_flags::POSSIBLY_OFFENSIVE);
        assert!(info.is_exact_match());
        assert!(info.is_possibly_offensive());
        assert!(!info.is_appropriate_for_auto_correction());
    }

    #[test]
    fn user_specific_dictionary_types() {
        assert!(dict_type::is_user_specific(dict_type::CONTACTS));
        assert!(dict_type::is_user_specific(dict_type::USER_HISTORY));
        assert!(!dict_type::is_user_specific(dict_type::MAIN));
        assert!(!dict_type::is_user_specific(dict_type::HARDCODED));
    }
}
