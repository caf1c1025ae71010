// File: src/persistence.rs
//! On-disk dictionary format: a bincode envelope carrying a magic number, a
//! format version and the payload. Payloads may live alone in a file or be
//! packed back to back in a bundle and addressed by offset/length.
use crate::core::types::{BigramEntry, Locale, WordEntry};
use crate::dictionary::asset::AssetAddress;
use crate::error::{ImeError, Result};
use serde::{Deserialize, Serialize};
use std::fs::{self, File};
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

pub const DICTIONARY_MAGIC: u32 = 0x9BC1_3AFE;
pub const FORMAT_VERSION: u16 = 1;
/// Leading bytes of a bundle, so no payload in it sits at offset zero.
pub const BUNDLE_MARKER: &[u8; 8] = b"IMEBNDL1";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryHeader {
    pub locale: Locale,
    pub dict_type: String,
    pub description: String,
    pub version: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DictionaryPayload {
    pub header: DictionaryHeader,
    pub words: Vec<WordEntry>,
    pub bigrams: Vec<BigramEntry>,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    magic: u32,
    format_version: u16,
    payload: DictionaryPayload,
}

pub fn encode(payload: &DictionaryPayload) -> Result<Vec<u8>> {
    let envelope = Envelope {
        magic: DICTIONARY_MAGIC,
        format_version: FORMAT_VERSION,
        payload: payload.clone(),
    };
    Ok(bincode::serialize(&envelope)?)
}

fn decode(bytes: &[u8], origin: &str) -> Result<DictionaryPayload> {
    let envelope: Envelope = bincode::deserialize(bytes)?;
    if envelope.magic != DICTIONARY_MAGIC {
        return Err(ImeError::BadHeader {
            path: origin.to_string(),
            reason: format!("bad magic {:#x}", envelope.magic),
        });
    }
    if envelope.format_version != FORMAT_VERSION {
        return Err(ImeError::BadHeader {
            path: origin.to_string(),
            reason: format!("unsupported format version {}", envelope.format_version),
        });
    }
    Ok(envelope.payload)
}

/// Writes a standalone dictionary file. The file appears atomically.
pub fn save_dictionary(path: &Path, payload: &DictionaryPayload) -> Result<()> {
    let bytes = encode(payload)?;
    write_atomically(path, |w| w.write_all(&bytes))
}

/// Packs several payloads into one file and returns the address of each.
pub fn save_bundle(path: &Path, payloads: &[DictionaryPayload]) -> Result<Vec<AssetAddress>> {
    let mut blobs = Vec::with_capacity(payloads.len());
    for payload in payloads {
        blobs.push(encode(payload)?);
    }
    write_atomically(path, |w| {
        w.write_all(BUNDLE_MARKER)?;
        for blob in &blobs {
            w.write_all(blob)?;
        }
        Ok(())
    })?;

    let name = path.to_string_lossy();
    let mut offset = BUNDLE_MARKER.len() as u64;
    let mut addresses = Vec::with_capacity(blobs.len());
    for blob in &blobs {
        let length = blob.len() as u64;
        let address = AssetAddress::from_file_name_and_offset(Some(&name), offset, length)
            .ok_or_else(|| std::io::Error::new(std::io::ErrorKind::NotFound, name.to_string()))?;
        addresses.push(address);
        offset += length;
    }
    Ok(addresses)
}

fn write_atomically<F>(path: &Path, fill: F) -> Result<()>
where
    F: FnOnce(&mut BufWriter<&NamedTempFile>) -> std::io::Result<()>,
{
    let parent_dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent_dir)?;

    let temp_file = NamedTempFile::new_in(parent_dir)?;
    {
        let mut writer = BufWriter::new(&temp_file);
        fill(&mut writer)?;
        writer.flush()?;
    }
    temp_file.persist(path).map_err(|e| e.error)?;
    Ok(())
}

/// Reads the payload an address points at. A zero length with a zero offset
/// means the whole file. A range reaching past the end of the file is an error.
pub fn load_payload(address: &AssetAddress) -> Result<DictionaryPayload> {
    let mut file = File::open(address.filename())?;
    let bytes = if address.offset() == 0 && address.length() == 0 {
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        buf
    } else {
        let file_len = file.metadata()?.len();
        let end = address.offset().checked_add(address.length());
        if end.map_or(true, |end| end > file_len) {
            return Err(ImeError::OutOfBounds {
                path: address.to_string(),
                offset: address.offset(),
                length: address.length(),
                file_len,
            });
        }
        file.seek(SeekFrom::Start(address.offset()))?;
        let mut buf = Vec::with_capacity(address.length() as usize);
        file.take(address.length()).read_to_end(&mut buf)?;
        buf
    };
    debug!(address = %address, bytes = bytes.len(), "read dictionary payload");
    decode(&bytes, &address.to_string())
}

/// Parses a tab separated word list:
///
/// - `word<TAB>frequency[<TAB>offensive]`
/// - `>prev word<TAB>frequency` for a bigram
/// - blank lines and `#` comments are skipped
pub fn parse_word_list(text: &str) -> Result<(Vec<WordEntry>, Vec<BigramEntry>)> {
    let mut words = Vec::new();
    let mut bigrams = Vec::new();

    for (idx, line) in text.lines().enumerate() {
        let line = line.trim_end_matches('\r');
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }
        let bad_line = |what: &str| {
            ImeError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidData,
                format!("line {}: {}", idx + 1, what),
            ))
        };

        let mut fields = line.split('\t');
        let key = fields.next().unwrap_or("").trim();
        let frequency = fields
            .next()
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(|f| f.parse::<i32>().map_err(|_| bad_line("frequency is not a number")))
            .transpose()?
            .unwrap_or(0)
            .clamp(0, 255);

        if let Some(pair) = key.strip_prefix('>') {
            let mut it = pair.split_whitespace();
            let (Some(prev_word), Some(word), None) = (it.next(), it.next(), it.next()) else {
                return Err(bad_line("a bigram needs exactly two words"));
            };
            bigrams.push(BigramEntry {
                prev_word: prev_word.to_string(),
                word: word.to_string(),
                frequency,
            });
            continue;
        }

        if key.is_empty() {
            return Err(bad_line("missing word"));
        }
        let possibly_offensive = fields.next().is_some_and(|f| f.trim() == "offensive");
        words.push(WordEntry { word: key.to_string(), frequency, possibly_offensive });
    }
    Ok((words, bigrams))
}
