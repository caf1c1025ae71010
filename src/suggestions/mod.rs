// File: src/suggestions/mod.rs
//! Suggestion lists handed to the UI.
pub mod punctuation;

use crate::core::types::{SuggestedWordInfo, SuggestionKind};

/// How the suggestions in a list were produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputStyle {
    #[default]
    None,
    Typing,
    UpdateBatch,
    TailBatch,
    ApplicationSpecified,
    Recorrection,
    Prediction,
    BeginningOfSentencePrediction,
}

/// Read access shared by every kind of suggestion strip.
pub trait SuggestionList {
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text committed when the entry at `index` is picked.
    fn word(&self, index: usize) -> Option<&str>;

    /// Text shown for the entry at `index`.
    fn label(&self, index: usize) -> Option<&str> {
        self.word(index)
    }

    fn info(&self, index: usize) -> Option<&SuggestedWordInfo>;

    /// Punctuation strips are never auto-corrected toward.
    fn is_punctuation_suggestions(&self) -> bool {
        false
    }
}

/// A ranked list of suggestions plus what we know about the typed word.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SuggestedWords {
    infos: Vec<SuggestedWordInfo>,
    typed_word_info: Option<SuggestedWordInfo>,
    typed_word_valid: bool,
    will_auto_correct: bool,
    input_style: InputStyle,
}

impl SuggestedWords {
    pub fn new(infos: Vec<SuggestedWordInfo>, input_style: InputStyle) -> Self {
        Self { infos, input_style, ..Self::default() }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn with_typed_word(mut self, info: SuggestedWordInfo, valid: bool) -> Self {
        self.typed_word_info = Some(info);
        self.typed_word_valid = valid;
        self
    }

    pub fn with_auto_correct(mut self, will_auto_correct: bool) -> Self {
        self.will_auto_correct = will_auto_correct;
        self
    }

    pub fn infos(&self) -> &[SuggestedWordInfo] {
        &self.infos
    }

    pub fn into_infos(self) -> Vec<SuggestedWordInfo> {
        self.infos
    }

    pub fn typed_word_info(&self) -> Option<&SuggestedWordInfo> {
        self.typed_word_info.as_ref()
    }

    pub fn is_typed_word_valid(&self) -> bool {
        self.typed_word_valid
    }

    pub fn will_auto_correct(&self) -> bool {
        self.will_auto_correct
    }

    pub fn input_style(&self) -> InputStyle {
        self.input_style
    }

    pub fn is_prediction(&self) -> bool {
        matches!(
            self.input_style,
            InputStyle::Prediction | InputStyle::BeginningOfSentencePrediction
        )
    }

    pub fn is_batch_mode(&self) -> bool {
        matches!(self.input_style, InputStyle::UpdateBatch | InputStyle::TailBatch)
    }

    /// The first suggestion, if it may be committed before the gesture ends.
    pub fn auto_commit_candidate(&self) -> Option<&SuggestedWordInfo> {
        self.infos.first().filter(|info| info.is_eligible_for_auto_commit())
    }

    /// The first entry when it is the typed word.
    pub fn typed_word_info_or_none(&self) -> Option<&SuggestedWordInfo> {
        self.infos.first().filter(|info| info.is_kind_of(SuggestionKind::Typed))
    }
}

impl SuggestionList for SuggestedWords {
    fn len(&self) -> usize {
        self.infos.len()
    }

    fn word(&self, index: usize) -> Option<&str> {
        self.infos.get(index).map(SuggestedWordInfo::word)
    }

    fn info(&self, index: usize) -> Option<&SuggestedWordInfo> {
        self.infos.get(index)
    }
}

/// Removes every entry spelling `typed_word` and every later repeat of any
/// other word, keeping relative order. Returns the index the typed word first
/// had, if it was present.
pub fn remove_dups(typed_word: &str, candidates: &mut Vec<SuggestedWordInfo>) -> Option<usize> {
    let first_typed = if typed_word.is_empty() {
        None
    } else {
        let first = candidates.iter().position(|c| c.word() == typed_word);
        candidates.retain(|c| c.word() != typed_word);
        first
    };
    let mut seen = std::collections::HashSet::new();
    candidates.retain(|c| seen.insert(c.word().to_string()));
    first_typed
}
