// File: src/core/engine.rs
use crate::config::EngineConfig;
use crate::core::input::{ComposedData, Event, InputPointers};
use crate::core::last_composed::{CapsMode, CommitType, LastComposedWord};
use crate::core::ngram::{NgramContext, PrevWord};
use crate::core::types::{Locale, DICTIONARY_MAX_WORD_LENGTH};
use crate::dictionary::SessionId;
use crate::error::Result;
use crate::facilitator::lru_cache::DictionaryFacilitatorLruCache;
use crate::facilitator::DictionaryFacilitator;
use crate::suggestions::punctuation::PunctuationSuggestions;
use crate::suggestions::{SuggestedWords, SuggestionList};
use std::sync::Arc;
use tracing::debug;

const SENTENCE_TERMINATORS: [char; 3] = ['.', '!', '?'];

/// The word being composed.
#[derive(Debug, Clone)]
struct WordComposer {
    typed: String,
    events: Vec<Event>,
    pointers: InputPointers,
    caps_mode: CapsMode,
    batch: bool,
}

impl WordComposer {
    fn new() -> Self {
        Self {
            typed: String::new(),
            events: Vec::new(),
            pointers: InputPointers::new(DICTIONARY_MAX_WORD_LENGTH),
            caps_mode: CapsMode::Off,
            batch: false,
        }
    }

    fn is_composing(&self) -> bool {
        !self.typed.is_empty()
    }

    fn push_char(&mut self, c: char) {
        if self.typed.is_empty() && c.is_uppercase() {
            self.caps_mode = CapsMode::ManualShifted;
        }
        self.typed.push(c);
    }
}

/// One text field's input loop: composes words, asks the dictionaries for
/// suggestions, commits, and can take back the last auto-correction.
pub struct InputSession<F> {
    cache: Arc<DictionaryFacilitatorLruCache<F>>,
    session_id: SessionId,
    locale: Locale,
    punctuation: PunctuationSuggestions,
    composer: WordComposer,
    ngram_context: NgramContext,
    last_composed: LastComposedWord,
    last_commit_type: Option<CommitType>,
    /// Everything committed so far.
    text: String,
}

impl<F: DictionaryFacilitator> InputSession<F> {
    pub fn new(
        cache: Arc<DictionaryFacilitatorLruCache<F>>,
        config: &EngineConfig,
        session_id: SessionId,
    ) -> Result<Self> {
        let punctuation = PunctuationSuggestions::new(config.punctuation_specs.as_slice())?;
        cache.set_use_contacts_dictionary(config.use_contacts_dictionary);
        Ok(Self {
            cache,
            session_id,
            locale: config.locale.clone(),
            punctuation,
            composer: WordComposer::new(),
            ngram_context: NgramContext::beginning_of_sentence(),
            last_composed: LastComposedWord::not_a_composed_word(),
            last_commit_type: None,
            text: String::new(),
        })
    }

    pub fn locale(&self) -> &Locale {
        &self.locale
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn typed_word(&self) -> &str {
        &self.composer.typed
    }

    pub fn is_composing(&self) -> bool {
        self.composer.is_composing()
    }

    pub fn ngram_context(&self) -> &NgramContext {
        &self.ngram_context
    }

    pub fn last_composed_word(&self) -> &LastComposedWord {
        &self.last_composed
    }

    pub fn last_commit_type(&self) -> Option<CommitType> {
        self.last_commit_type
    }

    pub fn composed_data(&self) -> ComposedData {
        ComposedData::new(self.composer.pointers.clone(), self.composer.batch, self.composer.typed.clone())
    }

    pub fn add_code_point(&mut self, c: char, x: i32, y: i32) {
        self.last_composed.deactivate();
        if self.composer.batch {
            self.composer = WordComposer::new();
        }
        self.composer.push_char(c);
        self.composer.events.push(Event::key(c, x, y));
        self.composer.pointers.add_pointer(x, y, 0, self.composer.events.len() as i32);
    }

    /// Adds a point of a gesture trace passing over `key`. Consecutive points
    /// over the same key spell it once.
    pub fn add_gesture_point(&mut self, key: char, x: i32, y: i32, time: i32) {
        self.last_composed.deactivate();
        if !self.composer.batch {
            self.composer = WordComposer::new();
            self.composer.batch = true;
        }
        if self.composer.typed.chars().next_back() != Some(key) {
            self.composer.push_char(key);
        }
        self.composer.events.push(Event::gesture(x, y));
        // Points past the trace capacity are dropped.
        self.composer.pointers.add_pointer(x, y, 0, time);
    }

    /// Deletes one character of the composing word, or cancels the last
    /// auto-correction, or deletes one committed character.
    pub fn backspace(&mut self) {
        if !self.composer.is_composing() && self.last_composed.can_revert_commit() {
            self.revert_commit();
            return;
        }
        self.last_composed.deactivate();
        if self.composer.batch {
            self.composer = WordComposer::new();
        } else if self.composer.is_composing() {
            self.composer.typed.pop();
            self.composer.events.pop();
            self.composer = rebuild_pointers(std::mem::replace(&mut self.composer, WordComposer::new()));
        } else {
            self.text.pop();
        }
    }

    pub fn suggestions(&self) -> SuggestedWords {
        let facilitator = self.cache.get(&self.locale);
        facilitator.get_suggestions(&self.composed_data(), &self.ngram_context, self.session_id)
    }

    /// Shown instead of word suggestions when nothing is being composed.
    pub fn punctuation_suggestions(&self) -> &PunctuationSuggestions {
        &self.punctuation
    }

    pub fn commit(&mut self, committed: &str, separator: &str, commit_type: CommitType) -> &LastComposedWord {
        let composer = std::mem::replace(&mut self.composer, WordComposer::new());
        self.last_composed = LastComposedWord::new(
            &composer.events,
            Some(&composer.pointers),
            composer.typed.as_str(),
            committed,
            separator,
            Some(self.ngram_context.clone()),
            composer.caps_mode,
        );
        self.last_commit_type = Some(commit_type);
        self.text.push_str(committed);
        self.text.push_str(separator);
        self.ngram_context = next_context(&self.ngram_context, committed, separator);
        debug!(
            typed = %composer.typed,
            committed,
            ?commit_type,
            "word committed"
        );
        &self.last_composed
    }

    pub fn commit_typed_word(&mut self, separator: &str) -> &LastComposedWord {
        let typed = self.composer.typed.clone();
        self.commit(&typed, separator, CommitType::UserTypedWord)
    }

    /// Commits the auto-correction if the dictionaries call for one, the
    /// typed word otherwise.
    pub fn commit_on_separator(&mut self, separator: &str) -> &LastComposedWord {
        let suggestions = self.suggestions();
        let correction = suggestions
            .will_auto_correct()
            .then(|| suggestions.word(1).map(str::to_string))
            .flatten();
        match correction {
            Some(word) => self.commit(&word, separator, CommitType::DecidedWord),
            None => self.commit_typed_word(separator),
        }
    }

    /// Commits the entry at `index` of the current suggestions (or of the
    /// punctuation strip when nothing is being composed and no prediction is
    /// on offer).
    pub fn commit_suggestion(&mut self, index: usize) -> Option<&LastComposedWord> {
        let suggestions = self.suggestions();
        let word = if !self.composer.is_composing() && suggestions.is_empty() {
            self.punctuation.word(index)?.to_string()
        } else {
            suggestions.word(index)?.to_string()
        };
        Some(self.commit(&word, crate::core::last_composed::NOT_A_SEPARATOR, CommitType::ManualPick))
    }

    /// Puts back the typed word in place of the last auto-correction.
    pub fn revert_commit(&mut self) -> bool {
        if !self.last_composed.can_revert_commit() {
            return false;
        }
        let last = std::mem::take(&mut self.last_composed);
        let committed_len = last.committed_word().len() + last.separator().len();
        let Some(kept) = self.text.len().checked_sub(committed_len) else {
            return false;
        };
        if !self.text.is_char_boundary(kept) {
            return false;
        }
        self.text.truncate(kept);
        self.text.push_str(last.typed_word());
        self.text.push_str(last.separator());

        let previous = last.ngram_context().cloned().unwrap_or_else(NgramContext::beginning_of_sentence);
        self.ngram_context = next_context(&previous, last.typed_word(), last.separator());
        self.last_composed = LastComposedWord::new(
            last.events(),
            Some(last.input_pointers()),
            last.typed_word(),
            last.typed_word(),
            last.separator(),
            Some(previous),
            last.capitalized_mode(),
        );
        self.last_commit_type = Some(CommitType::CancelAutoCorrect);
        debug!(committed = last.committed_word(), restored = last.typed_word(), "auto-correction cancelled");
        true
    }

    /// Switches language; blocks while the new main dictionary loads.
    pub fn set_locale(&mut self, locale: Locale) {
        self.cache.get(&locale);
        self.locale = locale;
    }

    pub fn set_use_contacts_dictionary(&self, use_contacts_dictionary: bool) {
        self.cache.set_use_contacts_dictionary(use_contacts_dictionary);
    }
}

/// Tap typing records one pointer per key; replays them after a deletion.
fn rebuild_pointers(mut composer: WordComposer) -> WordComposer {
    composer.pointers.reset();
    for (i, e) in composer.events.iter().enumerate() {
        composer.pointers.add_pointer(e.x, e.y, 0, i as i32 + 1);
    }
    if composer.typed.is_empty() {
        composer.caps_mode = CapsMode::Off;
    }
    composer
}

fn next_context(current: &NgramContext, committed: &str, separator: &str) -> NgramContext {
    if separator.contains(SENTENCE_TERMINATORS) || committed.ends_with(SENTENCE_TERMINATORS) {
        NgramContext::beginning_of_sentence()
    } else if committed.is_empty() {
        current.clone()
    } else {
        current.next(PrevWord::Word(committed.to_string()))
    }
}
