// src/lib.rs

pub mod config;
pub mod core;
pub mod dictionary;
pub mod error;
pub mod facilitator;
pub mod fuzzy;
pub mod keyspec;
pub mod persistence;
pub mod suggestions;

pub use crate::config::EngineConfig;
pub use crate::core::engine::InputSession;
pub use crate::core::last_composed::{CommitType, LastComposedWord};
pub use crate::core::types::{Locale, SuggestedWordInfo};
pub use crate::dictionary::asset::AssetAddress;
pub use crate::dictionary::collection::DictionaryCollection;
pub use crate::dictionary::read_only::ReadOnlyBinaryDictionary;
pub use crate::dictionary::{Dictionary, SessionId};
pub use crate::error::{ImeError, Result};
pub use crate::facilitator::group::DictionaryGroupFacilitator;
pub use crate::facilitator::lru_cache::{DictionaryFacilitatorLruCache, WaitPolicy};
pub use crate::facilitator::DictionaryFacilitator;
pub use crate::suggestions::punctuation::PunctuationSuggestions;
pub use crate::suggestions::{SuggestedWords, SuggestionList};
