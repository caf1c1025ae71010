// File: src/core/ngram.rs
use crate::core::types::MAX_PREV_WORD_COUNT_FOR_N_GRAM;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

pub const BEGINNING_OF_SENTENCE_TAG: &str = "<S>";
pub const CONTEXT_SEPARATOR: &str = " ";

/// One slot of previous-word history.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PrevWord {
    /// Nothing usable is known about this word (e.g. after a comma).
    Unknown,
    BeginningOfSentence,
    Word(String),
}

impl PrevWord {
    pub fn is_valid(&self) -> bool {
        !matches!(self, PrevWord::Unknown)
    }
}

/// The words immediately before the one being composed, most recent first.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct NgramContext {
    max_prev_word_count: usize,
    prev_words: VecDeque<PrevWord>,
}

impl NgramContext {
    pub fn new(max_prev_word_count: usize) -> Self {
        Self {
            max_prev_word_count,
            prev_words: VecDeque::with_capacity(max_prev_word_count),
        }
    }

    /// A context that carries no information at all.
    pub fn empty() -> Self {
        let mut ctx = Self::new(MAX_PREV_WORD_COUNT_FOR_N_GRAM);
        ctx.prev_words.push_back(PrevWord::Unknown);
        ctx
    }

    pub fn beginning_of_sentence() -> Self {
        let mut ctx = Self::new(MAX_PREV_WORD_COUNT_FOR_N_GRAM);
        ctx.prev_words.push_back(PrevWord::BeginningOfSentence);
        ctx
    }

    /// Builds the context that follows this one once `word` is committed.
    /// O(n) in the window size.
    pub fn next(&self, word: PrevWord) -> Self {
        let mut prev_words = self.prev_words.clone();
        prev_words.push_front(word);
        prev_words.truncate(self.max_prev_word_count.max(1));
        Self {
            max_prev_word_count: self.max_prev_word_count,
            prev_words,
        }
    }

    /// The n-th previous word, 1-based, as the decoder counts them.
    pub fn nth_prev_word(&self, n: usize) -> Option<&PrevWord> {
        n.checked_sub(1).and_then(|i| self.prev_words.get(i))
    }

    /// The most recent previous word, if it is an actual word.
    pub fn last_word(&self) -> Option<&str> {
        match self.prev_words.front() {
            Some(PrevWord::Word(w)) if !w.is_empty() => Some(w),
            _ => None,
        }
    }

    pub fn is_beginning_of_sentence(&self) -> bool {
        matches!(self.prev_words.front(), Some(PrevWord::BeginningOfSentence))
    }

    pub fn is_valid(&self) -> bool {
        self.prev_words.front().is_some_and(PrevWord::is_valid)
    }

    pub fn prev_word_count(&self) -> usize {
        self.prev_words.len()
    }

    /// Previous words oldest first, `<S>` for a sentence start.
    pub fn extract_prev_words(&self) -> Vec<String> {
        self.prev_words
            .iter()
            .rev()
            .filter_map(|w| match w {
                PrevWord::Unknown => None,
                PrevWord::BeginningOfSentence => Some(BEGINNING_OF_SENTENCE_TAG.to_string()),
                PrevWord::Word(w) if w.is_empty() => None,
                PrevWord::Word(w) => Some(w.clone()),
            })
            .collect()
    }

    pub fn extract_prev_words_context(&self) -> String {
        self.extract_prev_words().join(CONTEXT_SEPARATOR)
    }
}

impl Default for NgramContext {
    fn default() -> Self {
        Self::empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn word(w: &str) -> PrevWord {
        PrevWord::Word(w.to_string())
    }

    #[test]
    fn window_keeps_most_recent_words() {
        let ctx = NgramContext::beginning_of_sentence()
            .next(word("the"))
            .next(word("quick"))
            .next(word("brown"))
            .next(word("fox"));
        assert_eq!(ctx.prev_word_count(), MAX_PREV_WORD_COUNT_FOR_N_GRAM);
        assert_eq!(ctx.last_word(), Some("fox"));
        assert_eq!(ctx.extract_prev_words_context(), "quick brown fox");
    }

    #[test]
    fn sentence_start_is_tagged() {
        let ctx = NgramContext::beginning_of_sentence().next(word("hello"));
        assert_eq!(ctx.extract_prev_words_context(), "<S> hello");
        assert_eq!(ctx.nth_prev_word(2), Some(&PrevWord::BeginningOfSentence));
        assert!(NgramContext::beginning_of_sentence().is_beginning_of_sentence());
    }

    #[test]
    fn empty_context_is_invalid() {
        let ctx = NgramContext::empty();
        assert!(!ctx.is_valid());
        assert_eq!(ctx.last_word(), None);
        assert_eq!(ctx.extract_prev_words_context(), "");
    }
}
