// --- File: src/core/trie.rs
use crate::core::types::WordId;
use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

#[derive(Clone, Debug)]
struct TrieNode {
    children: HashMap<u8, usize>,
    /// Several words may share a key once case is folded ("us", "US").
    word_ids: Vec<WordId>,
    max_freq_in_subtree: i32,
}

impl TrieNode {
    fn new() -> Self {
        Self { children: HashMap::new(), word_ids: Vec::new(), max_freq_in_subtree: -1 }
    }
}

/// Byte trie over case-folded keys whose nodes carry the best frequency found
/// below them, so a top-k walk can skip whole subtrees.
#[derive(Clone, Debug)]
pub struct FrequencyTrie {
    nodes: Vec<TrieNode>,
    frequencies: Vec<i32>,
}

impl FrequencyTrie {
    pub fn new() -> Self {
        Self { nodes: vec![TrieNode::new()], frequencies: Vec::new() }
    }

    pub fn fold_key(word: &str) -> String {
        word.to_lowercase()
    }

    /// O(k) in the key length.
    pub fn insert(&mut self, word: &str, word_id: WordId, frequency: i32) {
        if self.frequencies.len() <= word_id {
            self.frequencies.resize(word_id + 1, -1);
        }
        self.frequencies[word_id] = frequency;

        let key = Self::fold_key(word);
        let mut node_idx = 0;
        self.bump(node_idx, frequency);
        for &byte in key.as_bytes() {
            let next_idx = if let Some(&id) = self.nodes[node_idx].children.get(&byte) {
                id
            } else {
                let new_node_id = self.nodes.len();
                self.nodes.push(TrieNode::new());
                self.nodes[node_idx].children.insert(byte, new_node_id);
                new_node_id
            };
            node_idx = next_idx;
            self.bump(node_idx, frequency);
        }
        self.nodes[node_idx].word_ids.push(word_id);
    }

    fn bump(&mut self, idx: usize, frequency: i32) {
        let node = &mut self.nodes[idx];
        node.max_freq_in_subtree = node.max_freq_in_subtree.max(frequency);
    }

    fn find(&self, prefix: &str) -> Option<usize> {
        let key = Self::fold_key(prefix);
        let mut node_idx = 0;
        for &byte in key.as_bytes() {
            node_idx = *self.nodes[node_idx].children.get(&byte)?;
        }
        Some(node_idx)
    }

    /// Word ids stored exactly under the folded form of `word`.
    pub fn exact(&self, word: &str) -> &[WordId] {
        match self.find(word) {
            Some(idx) => &self.nodes[idx].word_ids,
            None => &[],
        }
    }

    /// Best `k` words starting with `prefix`, highest frequency first.
    /// O(p + S log k) where S is the number of nodes visited.
    pub fn top_k_with_prefix(&self, prefix: &str, k: usize) -> Vec<(WordId, i32)> {
        if k == 0 {
            return vec![];
        }
        let Some(node_idx) = self.find(prefix) else {
            return vec![];
        };
        let mut heap = BinaryHeap::new();
        self.dfs_search(node_idx, k, &mut heap);

        let mut out: Vec<(WordId, i32)> =
            heap.into_iter().map(|Reverse((freq, id))| (id, freq)).collect();
        out.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
        out
    }

    fn dfs_search(&self, node_idx: usize, k: usize, heap: &mut BinaryHeap<Reverse<(i32, WordId)>>) {
        let node = &self.nodes[node_idx];
        for &id in &node.word_ids {
            let freq = self.frequencies[id];
            if heap.len() < k {
                heap.push(Reverse((freq, id)));
            } else if heap.peek().is_some_and(|Reverse((min, _))| freq > *min) {
                heap.pop();
                heap.push(Reverse((freq, id)));
            }
        }

        for &child_idx in node.children.values() {
            let floor = match heap.peek() {
                Some(Reverse((min, _))) if heap.len() == k => *min,
                _ => i32::MIN,
            };
            if self.nodes[child_idx].max_freq_in_subtree > floor {
                self.dfs_search(child_idx, k, heap);
            }
        }
    }
}

impl Default for FrequencyTrie {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn trie(words: &[(&str, i32)]) -> FrequencyTrie {
        let mut t = FrequencyTrie::new();
        for (id, (w, f)) in words.iter().enumerate() {
            t.insert(w, id, *f);
        }
        t
    }

    #[test]
    fn top_k_is_ordered_by_frequency() {
        let t = trie(&[("cat", 40), ("car", 90), ("cart", 60), ("dog", 200)]);
        let got = t.top_k_with_prefix("ca", 2);
        assert_eq!(got, vec![(1, 90), (2, 60)]);
    }

    #[test]
    fn prefix_lookup_folds_case() {
        let t = trie(&[("Paris", 100), ("park", 80)]);
        let ids: Vec<_> = t.top_k_with_prefix("PAR", 5).into_iter().map(|(id, _)| id).collect();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(t.exact("paris"), &[0]);
    }

    #[test]
    fn missing_prefix_yields_nothing() {
        let t = trie(&[("cat", 1)]);
        assert!(t.top_k_with_prefix("x", 3).is_empty());
        assert!(t.exact("ca").is_empty());
    }
}
