pub mod engine;
pub mod input;
pub mod last_composed;
pub mod ngram;
pub mod trie;
pub mod types;
