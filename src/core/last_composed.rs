// File: src/core/last_composed.rs
use crate::core::input::{Event, InputPointers};
use crate::core::ngram::NgramContext;
use crate::core::types::DICTIONARY_MAX_WORD_LENGTH;

/// Separator value for a word committed without one.
pub const NOT_A_SEPARATOR: &str = "";

/// How a word came to be committed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitType {
    /// Exactly what was typed, with no hinting (auto-correction off, external event).
    UserTypedWord,
    /// The user picked an entry on the suggestion strip.
    ManualPick,
    /// The engine committed what it decided was best; may equal the typed word.
    DecidedWord,
    /// The typed word put back after cancelling an auto-correction.
    CancelAutoCorrect,
}

/// Capitalization state at the time composition started.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CapsMode {
    #[default]
    Off,
    ManualShifted,
    ManualShiftLocked,
    AutoShifted,
    AutoShiftLocked,
}

impl CapsMode {
    pub fn is_shift_locked(self) -> bool {
        matches!(self, CapsMode::ManualShiftLocked | CapsMode::AutoShiftLocked)
    }
}

/// A word that has been committed, kept so suggestions can be resumed on it and
/// an auto-correction can be cancelled.
///
/// Active on construction; `deactivate` ends that for good.
#[derive(Debug, Clone)]
pub struct LastComposedWord {
    events: Vec<Event>,
    input_pointers: InputPointers,
    typed_word: String,
    committed_word: String,
    separator: String,
    ngram_context: Option<NgramContext>,
    capitalized_mode: CapsMode,
    active: bool,
}

impl LastComposedWord {
    pub fn new(
        events: &[Event],
        input_pointers: Option<&InputPointers>,
        typed_word: impl Into<String>,
        committed_word: impl Into<String>,
        separator: impl Into<String>,
        ngram_context: Option<NgramContext>,
        capitalized_mode: CapsMode,
    ) -> Self {
        let mut pointers = InputPointers::new(DICTIONARY_MAX_WORD_LENGTH);
        if let Some(p) = input_pointers {
            pointers.copy_from(p);
        }
        Self {
            events: events.to_vec(),
            input_pointers: pointers,
            typed_word: typed_word.into(),
            committed_word: committed_word.into(),
            separator: separator.into(),
            ngram_context,
            capitalized_mode,
            active: true,
        }
    }

    /// The "nothing to revert" value.
    pub fn not_a_composed_word() -> Self {
        Self::new(&[], None, "", "", NOT_A_SEPARATOR, None, CapsMode::Off)
    }

    pub fn deactivate(&mut self) {
        self.active = false;
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// True only while active and only if what was committed differs from what
    /// was typed, i.e. an actual correction took place.
    pub fn can_revert_commit(&self) -> bool {
        self.active && !self.committed_word.is_empty() && !self.did_commit_typed_word()
    }

    fn did_commit_typed_word(&self) -> bool {
        self.typed_word == self.committed_word
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn input_pointers(&self) -> &InputPointers {
        &self.input_pointers
    }

    pub fn typed_word(&self) -> &str {
        &self.typed_word
    }

    pub fn committed_word(&self) -> &str {
        &self.committed_word
    }

    pub fn separator(&self) -> &str {
        &self.separator
    }

    pub fn ngram_context(&self) -> Option<&NgramContext> {
        self.ngram_context.as_ref()
    }

    pub fn capitalized_mode(&self) -> CapsMode {
        self.capitalized_mode
    }
}

impl Default for LastComposedWord {
    fn default() -> Self {
        Self::not_a_composed_word()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn committed(typed: &str, committed: &str) -> LastComposedWord {
        LastComposedWord::new(
            &[Event::key('t', 0, 0)],
            None,
            typed,
            committed,
            " ",
            Some(NgramContext::beginning_of_sentence()),
            CapsMode::Off,
        )
    }

    #[test]
    fn corrected_word_can_be_reverted_until_deactivated() {
        let mut word = committed("teh", "the");
        assert!(word.can_revert_commit());
        word.deactivate();
        assert!(!word.can_revert_commit());
        assert!(!word.is_active());
    }

    #[test]
    fn word_committed_as_typed_is_not_revertible() {
        let word = committed("the", "the");
        assert!(word.is_active());
        assert!(!word.can_revert_commit());
    }

    #[test]
    fn sentinel_is_never_revertible() {
        let word = LastComposedWord::not_a_composed_word();
        assert!(!word.can_revert_commit());
        assert!(word.events().is_empty());
        assert!(word.input_pointers().is_empty());
        assert!(word.ngram_context().is_none());
    }

    #[test]
    fn snapshot_does_not_follow_caller_buffers() {
        let mut events = vec![Event::key('a', 1, 1)];
        let mut pointers = InputPointers::new(4);
        pointers.add_pointer(1, 1, 0, 0);

        let word = LastComposedWord::new(
            &events, Some(&pointers), "a", "as", " ", None, CapsMode::AutoShifted,
        );
        events.push(Event::key('b', 2, 2));
        pointers.add_pointer(2, 2, 0, 1);

        assert_eq!(word.events().len(), 1);
        assert_eq!(word.input_pointers().len(), 1);
        assert_eq!(word.input_pointers().capacity(), DICTIONARY_MAX_WORD_LENGTH);
    }

    #[test]
    fn long_gesture_trace_is_bounded() {
        let mut pointers = InputPointers::new(500);
        for i in 0..200 {
            pointers.add_pointer(i, i, 0, i);
        }
        let word = LastComposedWord::new(&[], Some(&pointers), "x", "y", "", None, CapsMode::Off);
        assert_eq!(word.input_pointers().len(), DICTIONARY_MAX_WORD_LENGTH);
    }
}
