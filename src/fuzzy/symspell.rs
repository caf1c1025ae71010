// File: src/fuzzy/symspell.rs
use crate::core::types::WordId;
use std::collections::{HashMap, HashSet};

/// Symmetric Delete index used for corrections. Every word is stored under all
/// of its delete variants up to `max_edit_distance`, so a lookup only has to
/// generate the deletes of the input, independent of dictionary size.
#[derive(Clone, Debug)]
pub struct SymSpell {
    /// Maps a delete variant (e.g. "helo") to the words it could come from.
    deletes: HashMap<String, HashSet<WordId>>,
    max_edit_distance: usize,
}

impl SymSpell {
    pub fn new(max_edit_distance: usize) -> Self {
        Self { deletes: HashMap::new(), max_edit_distance }
    }

    pub fn max_edit_distance(&self) -> usize {
        self.max_edit_distance
    }

    /// Amortized O(k^d) where k is the word length and d the edit distance.
    pub fn add_word(&mut self, word: &str, word_id: WordId) {
        for edit in self.generate_edits(&word.to_lowercase()) {
            self.deletes.entry(edit).or_default().insert(word_id);
        }
    }

    /// Candidate ids sharing at least one delete variant with `input`. This
    /// over-approximates: callers confirm with `edit_distance`.
    pub fn lookup(&self, input: &str) -> HashSet<WordId> {
        let mut candidates = HashSet::new();
        for edit in self.generate_edits(&input.to_lowercase()) {
            if let Some(word_ids) = self.deletes.get(&edit) {
                candidates.extend(word_ids.iter().copied());
            }
        }
        candidates
    }

    /// All variants within `max_edit_distance` deletions, including the word itself.
    fn generate_edits(&self, word: &str) -> HashSet<String> {
        let mut edits = HashSet::new();
        edits.insert(word.to_string());

        let mut current: Vec<Vec<char>> = vec![word.chars().collect()];
        for _ in 0..self.max_edit_distance {
            let mut next = Vec::new();
            for chars in &current {
                for i in 0..chars.len() {
                    let mut variant = chars.clone();
                    variant.remove(i);
                    if edits.insert(variant.iter().collect()) {
                        next.push(variant);
                    }
                }
            }
            current = next;
        }
        edits
    }
}

/// Optimal-string-alignment distance: insertions, deletions, substitutions and
/// adjacent transpositions each cost one. Case is folded before comparing.
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.to_lowercase().chars().collect();
    let b: Vec<char> = b.to_lowercase().chars().collect();
    let (n, m) = (a.len(), b.len());
    let mut d = vec![vec![0usize; m + 1]; n + 1];
    for (i, row) in d.iter_mut().enumerate() {
        row[0] = i;
    }
    for j in 0..=m {
        d[0][j] = j;
    }
    for i in 1..=n {
        for j in 1..=m {
            let cost = usize::from(a[i - 1] != b[j - 1]);
            let mut best = (d[i - 1][j] + 1).min(d[i][j - 1] + 1).min(d[i - 1][j - 1] + cost);
            if i > 1 && j > 1 && a[i - 1] == b[j - 2] && a[i - 2] == b[j - 1] {
                best = best.min(d[i - 2][j - 2] + 1);
            }
            d[i][j] = best;
        }
    }
    d[n][m]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn finds_single_edit_candidates() {
        let mut s = SymSpell::new(1);
        s.add_word("the", 0);
        s.add_word("then", 1);
        s.add_word("dog", 2);

        let found = s.lookup("teh");
        assert!(found.contains(&0));
        assert!(!found.contains(&2));
    }

    #[test]
    fn handles_non_ascii_words() {
        let mut s = SymSpell::new(1);
        s.add_word("café", 0);
        assert!(s.lookup("caf").contains(&0));
        assert!(s.lookup("cafés").contains(&0));
    }

    #[test]
    fn transposition_counts_once() {
        assert_eq!(edit_distance("teh", "the"), 1);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("Same", "same"), 0);
    }
}
