// File: src/dictionary/binary.rs
use crate::core::trie::FrequencyTrie;
use crate::core::types::{
    kind_flags, Locale, SuggestedWordInfo, SuggestionKind, WordEntry, WordId, DICTIONARY_MAX_WORD_LENGTH,
    NOT_A_PROBABILITY,
};
use crate::dictionary::asset::AssetAddress;
use crate::dictionary::{SessionId, SuggestionQuery};
use crate::error::Result;
use crate::fuzzy::symspell::{edit_distance, SymSpell};
use crate::persistence::{self, DictionaryHeader, DictionaryPayload};
use parking_lot::Mutex;
use std::collections::{HashMap, HashSet};
use tracing::{info, trace};

/// Above this, the first word of a gesture is committed before the gesture ends.
pub const CONFIDENCE_TO_AUTO_COMMIT: i32 = 1_000_000;

const FREQUENCY_SCALE: i64 = 1_000;
const EXACT_MATCH_BONUS: i64 = 500_000;
const COMPLETION_PENALTY_PER_CHAR: i64 = 1_000;
const BIGRAM_BOOST_SCALE: f64 = 10_000.0;
/// Corrections below this frequency are never flagged for auto-correction.
const AUTO_CORRECTION_MIN_FREQUENCY: i32 = 100;

/// Per-session traversal state. Repeating the exact same query in a session
/// (common while a gesture is redrawn) is answered from here.
#[derive(Default)]
struct TraverseSession {
    last_key: Option<QueryKey>,
    last_result: Vec<SuggestedWordInfo>,
    queries: u64,
}

#[derive(Clone, PartialEq, Eq)]
struct QueryKey {
    typed: String,
    prev_words: String,
    batch: bool,
    pointer_count: usize,
    block_offensive: bool,
    max_results: usize,
    weight_bits: u32,
}

/// A read-only dictionary loaded from a payload: prefix completions, edit
/// distance corrections and bigram predictions over one word list.
///
/// Queries take `&self`; sessions are kept apart by [`SessionId`].
pub struct BinaryDictionary {
    header: DictionaryHeader,
    words: Vec<WordEntry>,
    by_word: HashMap<String, WordId>,
    trie: FrequencyTrie,
    symspell: SymSpell,
    /// Folded previous word -> (word, frequency), most frequent first.
    bigrams: HashMap<String, Vec<(String, i32)>>,
    sessions: Mutex<HashMap<SessionId, TraverseSession>>,
}

impl BinaryDictionary {
    /// Loads the payload behind `address`.
    pub fn open(address: &AssetAddress, use_full_edit_distance: bool) -> Result<Self> {
        let payload = persistence::load_payload(address)?;
        let dict = Self::from_payload(payload, use_full_edit_distance);
        info!(
            address = %address,
            locale = %dict.header.locale,
            words = dict.words.len(),
            "opened binary dictionary"
        );
        Ok(dict)
    }

    pub fn from_payload(payload: DictionaryPayload, use_full_edit_distance: bool) -> Self {
        let DictionaryPayload { header, words, bigrams: bigram_entries } = payload;
        let mut trie = FrequencyTrie::new();
        let mut symspell = SymSpell::new(if use_full_edit_distance { 2 } else { 1 });
        let mut by_word = HashMap::with_capacity(words.len());
        for (id, entry) in words.iter().enumerate() {
            trie.insert(&entry.word, id, entry.frequency);
            symspell.add_word(&entry.word, id);
            by_word.entry(entry.word.clone()).or_insert(id);
        }

        let mut bigrams: HashMap<String, Vec<(String, i32)>> = HashMap::new();
        for b in bigram_entries {
            bigrams
                .entry(FrequencyTrie::fold_key(&b.prev_word))
                .or_default()
                .push((b.word, b.frequency));
        }
        for next in bigrams.values_mut() {
            next.sort_by(|a, b| b.1.cmp(&a.1));
        }

        Self {
            header,
            words,
            by_word,
            trie,
            symspell,
            bigrams,
            sessions: Mutex::new(HashMap::new()),
        }
    }

    pub fn header(&self) -> &DictionaryHeader {
        &self.header
    }

    pub fn locale(&self) -> &Locale {
        &self.header.locale
    }

    pub fn word_count(&self) -> usize {
        self.words.len()
    }

    pub fn get_frequency(&self, word: &str) -> i32 {
        if word.is_empty() {
            return NOT_A_PROBABILITY;
        }
        self.by_word.get(word).map_or(NOT_A_PROBABILITY, |&id| self.words[id].frequency)
    }

    pub fn get_max_frequency_of_exact_matches(&self, word: &str) -> i32 {
        if word.is_empty() {
            return NOT_A_PROBABILITY;
        }
        self.trie
            .exact(word)
            .iter()
            .map(|&id| self.words[id].frequency)
            .max()
            .unwrap_or(NOT_A_PROBABILITY)
    }

    pub fn is_in_dictionary(&self, word: &str) -> bool {
        self.get_frequency(word) != NOT_A_PROBABILITY
    }

    pub fn should_auto_commit(&self, candidate: &SuggestedWordInfo) -> bool {
        candidate
            .auto_commit_first_word_confidence()
            .is_some_and(|c| c > CONFIDENCE_TO_AUTO_COMMIT)
    }

    /// Frequency of `word` following `prev_word`, if that pair is known.
    pub fn get_ngram_frequency(&self, prev_word: &str, word: &str) -> i32 {
        self.bigrams
            .get(&FrequencyTrie::fold_key(prev_word))
            .and_then(|next| next.iter().find(|(w, _)| w == word))
            .map_or(NOT_A_PROBABILITY, |(_, f)| *f)
    }

    /// `None` when a tapped word is longer than any dictionary word can be.
    pub fn get_suggestions(&self, query: &SuggestionQuery<'_>) -> Option<Vec<SuggestedWordInfo>> {
        if !query.composed.is_batch_mode
            && query.composed.query_word().chars().count() > DICTIONARY_MAX_WORD_LENGTH
        {
            trace!(session = query.session_id.0, "typed word too long to look up");
            return None;
        }
        let key = QueryKey {
            typed: query.composed.query_word().to_string(),
            prev_words: query.ngram_context.extract_prev_words_context(),
            batch: query.composed.is_batch_mode,
            pointer_count: query.composed.input_pointers.len(),
            block_offensive: query.settings.block_offensive_words,
            max_results: query.settings.max_results,
            weight_bits: query.weight_for_locale.to_bits(),
        };

        let mut sessions = self.sessions.lock();
        let session = sessions.entry(query.session_id).or_default();
        session.queries += 1;
        if session.last_key.as_ref() == Some(&key) {
            trace!(session = query.session_id.0, "repeated query served from session");
            return Some(session.last_result.clone());
        }
        drop(sessions);

        let results = if key.typed.is_empty() {
            self.predictions(query, &key.prev_words)
        } else {
            self.matches(query, &key.typed, &key.prev_words)
        };
        trace!(
            session = query.session_id.0,
            typed = %key.typed,
            results = results.len(),
            "binary dictionary query"
        );

        let mut sessions = self.sessions.lock();
        let session = sessions.entry(query.session_id).or_default();
        session.last_key = Some(key);
        session.last_result = results.clone();
        Some(results)
    }

    fn predictions(&self, query: &SuggestionQuery<'_>, prev_words: &str) -> Vec<SuggestedWordInfo> {
        let Some(prev) = query.ngram_context.last_word() else {
            return vec![];
        };
        let Some(next) = self.bigrams.get(&FrequencyTrie::fold_key(prev)) else {
            return vec![];
        };
        next.iter()
            .filter(|(w, _)| !self.is_blocked(w, query))
            .take(query.settings.max_results)
            .map(|(w, f)| {
                let score = self.weighted(i64::from(*f) * FREQUENCY_SCALE, query.weight_for_locale);
                SuggestedWordInfo::new(
                    w.clone(),
                    prev_words,
                    score,
                    SuggestionKind::Prediction,
                    self.header.dict_type.clone(),
                )
            })
            .collect()
    }

    fn matches(&self, query: &SuggestionQuery<'_>, typed: &str, prev_words: &str) -> Vec<SuggestedWordInfo> {
        let max_results = query.settings.max_results;
        let prev = query.ngram_context.last_word();
        let typed_len = typed.chars().count() as i64;
        let folded_typed = FrequencyTrie::fold_key(typed);

        let mut seen: HashSet<WordId> = HashSet::new();
        let mut scored: Vec<(i64, SuggestedWordInfo)> = Vec::new();

        for (id, freq) in self.trie.top_k_with_prefix(typed, max_results) {
            let entry = &self.words[id];
            if query.settings.block_offensive_words && entry.possibly_offensive {
                continue;
            }
            seen.insert(id);
            let exact = FrequencyTrie::fold_key(&entry.word) == folded_typed;
            let mut raw = i64::from(freq) * FREQUENCY_SCALE + self.bigram_boost(prev, &entry.word);
            let (kind, mut flags) = if exact {
                raw += EXACT_MATCH_BONUS;
                (SuggestionKind::Correction, kind_flags::EXACT_MATCH)
            } else {
                let extra = entry.word.chars().count() as i64 - typed_len;
                raw -= extra.max(0) * COMPLETION_PENALTY_PER_CHAR;
                (SuggestionKind::Completion, 0)
            };
            if entry.possibly_offensive {
                flags |= kind_flags::POSSIBLY_OFFENSIVE;
            }
            scored.push((raw, self.info(entry, prev_words, raw, kind, flags, query)));
        }

        for id in self.symspell.lookup(typed) {
            if seen.contains(&id) {
                continue;
            }
            let entry = &self.words[id];
            if query.settings.block_offensive_words && entry.possibly_offensive {
                continue;
            }
            let distance = edit_distance(&entry.word, typed);
            if distance == 0 || distance > self.symspell.max_edit_distance() {
                continue;
            }
            let raw = i64::from(entry.frequency) * FREQUENCY_SCALE / (1 + 3 * distance as i64)
                + self.bigram_boost(prev, &entry.word);
            let mut flags = 0;
            if distance == 1 && entry.frequency >= AUTO_CORRECTION_MIN_FREQUENCY {
                flags |= kind_flags::APPROPRIATE_FOR_AUTO_CORRECTION;
            }
            if entry.possibly_offensive {
                flags |= kind_flags::POSSIBLY_OFFENSIVE;
            }
            scored.push((raw, self.info(entry, prev_words, raw, SuggestionKind::Correction, flags, query)));
        }

        scored.sort_by(|a, b| b.0.cmp(&a.0).then_with(|| a.1.word().cmp(b.1.word())));
        scored.truncate(max_results);

        if query.composed.is_batch_mode && !scored.is_empty() {
            let runner_up = scored.get(1).map_or(0, |s| s.0);
            let top = scored[0].0.max(1);
            let margin = (top - runner_up).max(0) * 1_000 / top;
            let confidence = (margin * 10_000).min(i64::from(i32::MAX)) as i32;
            let index = query.composed.input_pointers.len();
            let first = scored[0].1.clone().with_auto_commit(index, confidence);
            scored[0].1 = first;
        }

        scored.into_iter().map(|(_, info)| info).collect()
    }

    fn info(
        &self,
        entry: &WordEntry,
        prev_words: &str,
        raw: i64,
        kind: SuggestionKind,
        flags: u32,
        query: &SuggestionQuery<'_>,
    ) -> SuggestedWordInfo {
        SuggestedWordInfo::new(
            entry.word.clone(),
            prev_words,
            self.weighted(raw, query.weight_for_locale),
            kind,
            self.header.dict_type.clone(),
        )
        .with_flags(flags)
    }

    fn is_blocked(&self, word: &str, query: &SuggestionQuery<'_>) -> bool {
        query.settings.block_offensive_words
            && self.by_word.get(word).is_some_and(|&id| self.words[id].possibly_offensive)
    }

    /// Bigram bonus, logarithmic in the pair frequency.
    fn bigram_boost(&self, prev: Option<&str>, word: &str) -> i64 {
        let Some(prev) = prev else { return 0 };
        let f = self.get_ngram_frequency(prev, word);
        if f <= 0 {
            return 0;
        }
        ((f64::from(f) + 1.0).log2() * BIGRAM_BOOST_SCALE) as i64
    }

    fn weighted(&self, raw: i64, weight_for_locale: f32) -> i32 {
        let w = (raw as f64 * f64::from(weight_for_locale)).max(0.0);
        w.min(f64::from(SuggestedWordInfo::MAX_SCORE - 1)) as i32
    }
}
