// File: src/config.rs
use crate::core::types::Locale;
use crate::error::Result;
use crate::facilitator::lru_cache::WaitPolicy;
use crate::suggestions::punctuation::DEFAULT_PUNCTUATION_SPECS;
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tempfile::NamedTempFile;
use tracing::info;

/// Engine settings, read from a JSON file. Missing fields take their defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Directory holding `main_<locale>.dict` and friends.
    pub dictionary_dir: PathBuf,
    /// Prefix of per-user dictionary files such as contacts.
    pub dictionary_name_prefix: String,
    pub locale: Locale,
    pub use_contacts_dictionary: bool,
    /// Allow corrections two edits away instead of one.
    pub use_full_edit_distance: bool,
    pub max_suggestions: usize,
    pub block_offensive_words: bool,
    pub punctuation_specs: Vec<String>,
    pub wait_for_main_dictionary_ms: u64,
    pub max_wait_retries: u32,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            dictionary_dir: PathBuf::from("dictionaries"),
            dictionary_name_prefix: String::new(),
            locale: Locale::new("en_US"),
            use_contacts_dictionary: false,
            use_full_edit_distance: false,
            max_suggestions: 18,
            block_offensive_words: true,
            punctuation_specs: DEFAULT_PUNCTUATION_SPECS.iter().map(|s| s.to_string()).collect(),
            wait_for_main_dictionary_ms: 1000,
            max_wait_retries: 5,
        }
    }
}

impl EngineConfig {
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Defaults when the file does not exist; other failures are errors.
    pub fn load_or_default(path: &Path) -> Result<Self> {
        match Self::from_file(path) {
            Err(crate::error::ImeError::Io(e)) if e.kind() == ErrorKind::NotFound => {
                info!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Writes the config so readers never see a partial file.
    pub fn save(&self, path: &Path) -> Result<()> {
        let dir = path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir)?;
        serde_json::to_writer_pretty(&mut tmp, self)?;
        tmp.write_all(b"\n")?;
        tmp.persist(path).map_err(|e| e.error)?;
        Ok(())
    }

    pub fn wait_policy(&self) -> WaitPolicy {
        WaitPolicy {
            timeout: Duration::from_millis(self.wait_for_main_dictionary_ms),
            max_retries: self.max_wait_retries,
        }
    }
}
