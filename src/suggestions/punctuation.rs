// File: src/suggestions/punctuation.rs
use crate::core::types::SuggestedWordInfo;
use crate::error::KeySpecError;
use crate::keyspec::{self, CODE_OUTPUT_TEXT};
use crate::suggestions::{InputStyle, SuggestedWords, SuggestionList};

/// Key specs shown on the suggestion strip when nothing is being composed.
pub const DEFAULT_PUNCTUATION_SPECS: &[&str] = &["!", "?", ",", ":", ";", "\"", "(|)", ")|(", "-", "'", "@", "/"];

#[derive(Debug, Clone, PartialEq)]
struct Entry {
    label: String,
    info: SuggestedWordInfo,
}

/// A fixed strip built from punctuation key specs.
///
/// The underlying list holds the raw specs; lookups answer with what each
/// spec types and shows.
#[derive(Debug, Clone, PartialEq)]
pub struct PunctuationSuggestions {
    specs: SuggestedWords,
    entries: Vec<Entry>,
}

impl PunctuationSuggestions {
    pub fn new<S: AsRef<str>>(specs: &[S]) -> Result<Self, KeySpecError> {
        let entries = specs
            .iter()
            .map(|spec| parse_entry(spec.as_ref()))
            .collect::<Result<Vec<_>, _>>()?;
        let infos = specs.iter().map(|s| SuggestedWordInfo::hardcoded(s.as_ref())).collect();
        Ok(Self { specs: SuggestedWords::new(infos, InputStyle::None), entries })
    }

    /// The raw key spec at `index`.
    pub fn key_spec(&self, index: usize) -> Option<&str> {
        self.specs.word(index)
    }
}

fn parse_entry(spec: &str) -> Result<Entry, KeySpecError> {
    let code = keyspec::get_code(spec)?;
    let word = if code == CODE_OUTPUT_TEXT {
        keyspec::get_output_text(spec)?
            .ok_or_else(|| KeySpecError::EmptyOutputText(spec.to_string()))?
    } else {
        u32::try_from(code)
            .ok()
            .and_then(char::from_u32)
            .map(String::from)
            .ok_or_else(|| KeySpecError::UnknownCode(spec.to_string()))?
    };
    let label = keyspec::get_label(spec)?.unwrap_or_else(|| word.clone());
    Ok(Entry { label, info: SuggestedWordInfo::hardcoded(word) })
}

impl SuggestionList for PunctuationSuggestions {
    fn len(&self) -> usize {
        self.entries.len()
    }

    fn word(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.info.word())
    }

    fn label(&self, index: usize) -> Option<&str> {
        self.entries.get(index).map(|e| e.label.as_str())
    }

    fn info(&self, index: usize) -> Option<&SuggestedWordInfo> {
        self.entries.get(index).map(|e| &e.info)
    }

    fn is_punctuation_suggestions(&self) -> bool {
        true
    }
}
