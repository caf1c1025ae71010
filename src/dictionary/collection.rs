// File: src/dictionary/collection.rs
use crate::core::types::{Locale, SuggestedWordInfo, NOT_A_PROBABILITY};
use crate::dictionary::{Dictionary, SuggestionQuery};
use parking_lot::RwLock;
use std::sync::Arc;
use tracing::warn;

type Members = Arc<Vec<Arc<dyn Dictionary>>>;

/// Several dictionaries answering as one.
///
/// Membership is copy-on-write: a query takes a snapshot of the member list
/// and runs against it without holding any lock, while `add_dictionary` and
/// `remove_dictionary` publish a new list. A query that overlaps a mutation
/// sees either the old or the new membership, never a mix.
pub struct DictionaryCollection {
    dict_type: String,
    locale: Option<Locale>,
    members: RwLock<Members>,
}

impl DictionaryCollection {
    pub fn new(dict_type: impl Into<String>, locale: Option<Locale>) -> Self {
        Self::with_dictionaries(dict_type, locale, Vec::new())
    }

    pub fn with_dictionaries(
        dict_type: impl Into<String>,
        locale: Option<Locale>,
        dictionaries: impl IntoIterator<Item = Arc<dyn Dictionary>>,
    ) -> Self {
        Self {
            dict_type: dict_type.into(),
            locale,
            members: RwLock::new(Arc::new(dictionaries.into_iter().collect())),
        }
    }

    /// The current members, in query order.
    pub fn dictionaries(&self) -> Members {
        Arc::clone(&self.members.read())
    }

    pub fn len(&self) -> usize {
        self.members.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.read().is_empty()
    }

    /// Appends a member. Adding one that is already present is logged and
    /// still done.
    pub fn add_dictionary(&self, dict: Arc<dyn Dictionary>) {
        let mut members = self.members.write();
        if members.iter().any(|d| Arc::ptr_eq(d, &dict)) {
            warn!(
                collection = %self.dict_type,
                dict_type = %dict.dict_type(),
                "collection already contains this dictionary"
            );
        }
        let mut next = Vec::with_capacity(members.len() + 1);
        next.extend(members.iter().cloned());
        next.push(dict);
        *members = Arc::new(next);
    }

    /// Removes the first occurrence of `dict`. Removing an absent member is
    /// logged and otherwise a no-op. The removed member is not closed.
    pub fn remove_dictionary(&self, dict: &Arc<dyn Dictionary>) {
        let mut members = self.members.write();
        match members.iter().position(|d| Arc::ptr_eq(d, dict)) {
            Some(idx) => {
                let mut next: Vec<_> = members.iter().cloned().collect();
                next.remove(idx);
                *members = Arc::new(next);
            }
            None => warn!(
                collection = %self.dict_type,
                dict_type = %dict.dict_type(),
                "collection does not contain this dictionary"
            ),
        }
    }
}

impl Dictionary for DictionaryCollection {
    fn dict_type(&self) -> &str {
        &self.dict_type
    }

    fn locale(&self) -> Option<&Locale> {
        self.locale.as_ref()
    }

    /// Results of every member in member order; the first member's list is
    /// the accumulator. No re-ranking happens here.
    fn get_suggestions(&self, query: &SuggestionQuery<'_>) -> Option<Vec<SuggestedWordInfo>> {
        let members = self.dictionaries();
        let (first, rest) = members.split_first()?;
        let mut suggestions = first.get_suggestions(query).unwrap_or_default();
        for dict in rest {
            if let Some(more) = dict.get_suggestions(query) {
                suggestions.extend(more);
            }
        }
        Some(suggestions)
    }

    fn is_in_dictionary(&self, word: &str) -> bool {
        self.dictionaries().iter().rev().any(|d| d.is_in_dictionary(word))
    }

    fn get_frequency(&self, word: &str) -> i32 {
        self.dictionaries()
            .iter()
            .rev()
            .map(|d| d.get_frequency(word))
            .fold(NOT_A_PROBABILITY, i32::max)
    }

    fn get_max_frequency_of_exact_matches(&self, word: &str) -> i32 {
        self.dictionaries()
            .iter()
            .rev()
            .map(|d| d.get_max_frequency_of_exact_matches(word))
            .fold(NOT_A_PROBABILITY, i32::max)
    }

    /// True once there is at least one member; members are not checked.
    fn is_initialized(&self) -> bool {
        !self.is_empty()
    }

    fn close(&self) {
        for dict in self.dictionaries().iter() {
            dict.close();
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::core::input::ComposedData;
    use crate::core::ngram::NgramContext;
    use crate::core::types::SuggestionKind;
    use crate::dictionary::{SessionId, SuggestionSettings};
    use proptest::prelude::*;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    /// In-memory dictionary that counts how often it is consulted.
    pub(crate) struct FakeDictionary {
        name: String,
        words: HashMap<String, i32>,
        suggest: Option<Vec<&'static str>>,
        pub lookups: AtomicUsize,
        pub closed: AtomicBool,
    }

    impl FakeDictionary {
        pub(crate) fn new(name: &str, words: &[(&str, i32)]) -> Self {
            Self {
                name: name.to_string(),
                words: words.iter().map(|(w, f)| (w.to_string(), *f)).collect(),
                suggest: None,
                lookups: AtomicUsize::new(0),
                closed: AtomicBool::new(false),
            }
        }

        pub(crate) fn suggesting(mut self, words: &[&'static str]) -> Self {
            self.suggest = Some(words.to_vec());
            self
        }
    }

    impl Dictionary for FakeDictionary {
        fn dict_type(&self) -> &str {
            &self.name
        }

        fn locale(&self) -> Option<&Locale> {
            None
        }

        fn get_suggestions(&self, _query: &SuggestionQuery<'_>) -> Option<Vec<SuggestedWordInfo>> {
            self.suggest.as_ref().map(|words| {
                words
                    .iter()
                    .map(|w| SuggestedWordInfo::new(*w, "", 1, SuggestionKind::Completion, self.name.clone()))
                    .collect()
            })
        }

        fn is_in_dictionary(&self, word: &str) -> bool {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.words.contains_key(word)
        }

        fn get_frequency(&self, word: &str) -> i32 {
            self.lookups.fetch_add(1, Ordering::SeqCst);
            self.words.get(word).copied().unwrap_or(NOT_A_PROBABILITY)
        }

        fn get_max_frequency_of_exact_matches(&self, word: &str) -> i32 {
            self.get_frequency(word)
        }

        fn close(&self) {
            self.closed.store(true, Ordering::SeqCst);
        }
    }

    fn arc(d: FakeDictionary) -> Arc<dyn Dictionary> {
        Arc::new(d)
    }

    fn words(collection: &DictionaryCollection) -> Option<Vec<String>> {
        let composed = ComposedData::from_typed("c");
        let ngram = NgramContext::empty();
        let settings = SuggestionSettings::default();
        collection
            .get_suggestions(&SuggestionQuery {
                composed: &composed,
                ngram_context: &ngram,
                settings: &settings,
                session_id: SessionId(0),
                weight_for_locale: 1.0,
            })
            .map(|v| v.into_iter().map(|s| s.word().to_string()).collect())
    }

    #[test]
    fn strongest_frequency_wins() {
        let c = DictionaryCollection::with_dictionaries("merged", None, [
            arc(FakeDictionary::new("a", &[("cat", 40)])),
            arc(FakeDictionary::new("b", &[("cat", 90)])),
        ]);
        assert_eq!(c.get_frequency("cat"), 90);
        assert_eq!(c.get_max_frequency_of_exact_matches("cat"), 90);
        assert_eq!(c.get_frequency("dog"), NOT_A_PROBABILITY);
    }

    #[test]
    fn empty_collection_has_nothing() {
        let c = DictionaryCollection::new("merged", None);
        assert!(words(&c).is_none());
        assert!(!c.is_in_dictionary("cat"));
        assert_eq!(c.get_frequency("cat"), NOT_A_PROBABILITY);
        assert!(!c.is_initialized());
    }

    #[test]
    fn membership_scan_starts_from_the_last_member() {
        let a = Arc::new(FakeDictionary::new("a", &[]));
        let b = Arc::new(FakeDictionary::new("b", &[("cat", 1)]));
        let c = DictionaryCollection::with_dictionaries(
            "merged",
            None,
            [a.clone() as Arc<dyn Dictionary>, b.clone() as Arc<dyn Dictionary>],
        );
        assert!(c.is_in_dictionary("cat"));
        assert_eq!(b.lookups.load(Ordering::SeqCst), 1);
        assert_eq!(a.lookups.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn suggestions_follow_member_order() {
        let c = DictionaryCollection::with_dictionaries("merged", None, [
            arc(FakeDictionary::new("a", &[]).suggesting(&["cab", "cat"])),
            arc(FakeDictionary::new("b", &[])),
            arc(FakeDictionary::new("c", &[]).suggesting(&["car"])),
        ]);
        assert_eq!(words(&c).unwrap(), vec!["cab", "cat", "car"]);
    }

    #[test]
    fn silent_first_member_still_lets_others_contribute() {
        let c = DictionaryCollection::with_dictionaries("merged", None, [
            arc(FakeDictionary::new("a", &[])),
            arc(FakeDictionary::new("b", &[]).suggesting(&["cow"])),
        ]);
        assert_eq!(words(&c).unwrap(), vec!["cow"]);
    }

    #[test]
    fn add_and_remove_tolerate_misuse() {
        let c = DictionaryCollection::new("merged", None);
        let d = arc(FakeDictionary::new("a", &[("cat", 3)]));
        c.add_dictionary(d.clone());
        c.add_dictionary(d.clone());
        assert_eq!(c.len(), 2);

        c.remove_dictionary(&d);
        assert_eq!(c.len(), 1);
        c.remove_dictionary(&d);
        c.remove_dictionary(&d);
        assert!(c.is_empty());
    }

    #[test]
    fn snapshot_survives_mutation() {
        let c = DictionaryCollection::with_dictionaries("merged", None, [
            arc(FakeDictionary::new("a", &[("cat", 3)])),
        ]);
        let before = c.dictionaries();
        c.add_dictionary(arc(FakeDictionary::new("b", &[])));
        assert_eq!(before.len(), 1);
        assert_eq!(c.len(), 2);
    }

    #[test]
    fn close_reaches_every_member() {
        let a = Arc::new(FakeDictionary::new("a", &[]));
        let b = Arc::new(FakeDictionary::new("b", &[]));
        let c = DictionaryCollection::with_dictionaries(
            "merged",
            None,
            [a.clone() as Arc<dyn Dictionary>, b.clone() as Arc<dyn Dictionary>],
        );
        c.close();
        assert!(a.closed.load(Ordering::SeqCst));
        assert!(b.closed.load(Ordering::SeqCst));
    }

    proptest! {
        #[test]
        fn frequency_is_the_member_maximum(freqs in proptest::collection::vec(-1i32..=255, 1..6)) {
            let members: Vec<Arc<dyn Dictionary>> = freqs
                .iter()
                .enumerate()
                .map(|(i, &f)| {
                    let words: Vec<(&str, i32)> = if f >= 0 { vec![("w", f)] } else { vec![] };
                    arc(FakeDictionary::new(&format!("d{i}"), &words))
                })
                .collect();
            let c = DictionaryCollection::with_dictionaries("merged", None, members);
            let expected = freqs.iter().copied().max().unwrap_or(NOT_A_PROBABILITY);
            prop_assert_eq!(c.get_frequency("w"), expected);
            prop_assert_eq!(c.get_frequency("w") == NOT_A_PROBABILITY, freqs.iter().all(|&f| f < 0));
        }
    }
}
