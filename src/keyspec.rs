// File: src/keyspec.rs
//! Parsing of key specifications such as `!`, `(|)`, `:-)|:-) ` or `+|0x1F600`.
//!
//! A spec is `label[|output]`. The output is either text or a code
//! (`!code/name`, `0xHEX`). A backslash escapes the next character.
use crate::error::KeySpecError;

/// The key outputs text rather than a single code point.
pub const CODE_OUTPUT_TEXT: i32 = -4;
pub const CODE_UNSPECIFIED: i32 = -20;

const BACKSLASH: char = '\\';
const VERTICAL_BAR: char = '|';
const PREFIX_HEX: &str = "0x";
const PREFIX_CODE: &str = "!code/";
const PREFIX_ICON: &str = "!icon/";

type Result<T> = std::result::Result<T, KeySpecError>;

fn has_icon(spec: &str) -> bool {
    spec.starts_with(PREFIX_ICON)
}

fn has_code(spec: &str, label_end: Option<usize>) -> bool {
    let Some(end) = label_end else { return false };
    if end == 0 || end + 1 >= spec.len() {
        return false;
    }
    let after = &spec[end + 1..];
    after.starts_with(PREFIX_CODE) || after.starts_with(PREFIX_HEX)
}

fn parse_escape(text: &str) -> String {
    if !text.contains(BACKSLASH) {
        return text.to_string();
    }
    let mut out = String::with_capacity(text.len());
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        if c == BACKSLASH {
            if let Some(next) = chars.next() {
                out.push(next);
                continue;
            }
        }
        out.push(c);
    }
    out
}

/// Byte index of the unescaped `|` ending the label.
fn index_of_label_end(spec: &str) -> Result<Option<usize>> {
    if !spec.contains(BACKSLASH) {
        return match spec.find(VERTICAL_BAR) {
            // A sole vertical bar is a label, not a separator.
            Some(0) if spec.len() == 1 => Ok(None),
            Some(0) => Err(KeySpecError::EmptyLabel(spec.to_string())),
            other => Ok(other),
        };
    }
    let mut chars = spec.char_indices().peekable();
    while let Some((pos, c)) = chars.next() {
        if c == BACKSLASH && chars.peek().is_some() {
            chars.next();
        } else if c == VERTICAL_BAR {
            return Ok(Some(pos));
        }
    }
    Ok(None)
}

fn before_label_end(spec: &str, label_end: Option<usize>) -> &str {
    label_end.map_or(spec, |end| &spec[..end])
}

fn after_label_end(spec: &str, label_end: usize) -> &str {
    &spec[label_end + VERTICAL_BAR.len_utf8()..]
}

fn check_double_label_end(spec: &str, label_end: usize) -> Result<()> {
    if index_of_label_end(after_label_end(spec, label_end))?.is_some() {
        return Err(KeySpecError::MultipleLabelEnd(spec.to_string()));
    }
    Ok(())
}

fn single_code_point(text: &str) -> Option<char> {
    let mut chars = text.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Some(c),
        _ => None,
    }
}

/// The text shown on the key; `None` for icon keys.
pub fn get_label(spec: &str) -> Result<Option<String>> {
    if has_icon(spec) {
        return Ok(None);
    }
    let label_end = index_of_label_end(spec)?;
    let label = parse_escape(before_label_end(spec, label_end));
    if label.is_empty() {
        return Err(KeySpecError::EmptyLabel(spec.to_string()));
    }
    Ok(Some(label))
}

fn output_text_internal(spec: &str, label_end: Option<usize>) -> Result<Option<String>> {
    match label_end {
        Some(end) if end > 0 => {
            check_double_label_end(spec, end)?;
            Ok(Some(parse_escape(after_label_end(spec, end))))
        }
        _ => Ok(None),
    }
}

/// The text the key types when that is more than one code point; `None`
/// when the key is described by a code instead.
pub fn get_output_text(spec: &str) -> Result<Option<String>> {
    let label_end = index_of_label_end(spec)?;
    if has_code(spec, label_end) {
        return Ok(None);
    }
    if let Some(output) = output_text_internal(spec, label_end)? {
        if single_code_point(&output).is_some() {
            return Ok(None);
        }
        if output.is_empty() {
            return Err(KeySpecError::EmptyOutputText(spec.to_string()));
        }
        return Ok(Some(output));
    }
    let label = get_label(spec)?.ok_or_else(|| KeySpecError::EmptyLabel(spec.to_string()))?;
    Ok(if single_code_point(&label).is_some() { None } else { Some(label) })
}

/// The code point the key types, or [`CODE_OUTPUT_TEXT`] when it types text.
pub fn get_code(spec: &str) -> Result<i32> {
    let label_end = index_of_label_end(spec)?;
    if let Some(end) = label_end.filter(|_| has_code(spec, label_end)) {
        check_double_label_end(spec, end)?;
        return parse_code(Some(after_label_end(spec, end)), CODE_UNSPECIFIED);
    }
    if let Some(output) = output_text_internal(spec, label_end)? {
        return Ok(single_code_point(&output).map_or(CODE_OUTPUT_TEXT, |c| c as i32));
    }
    let label = get_label(spec)?.ok_or_else(|| KeySpecError::EmptyLabel(spec.to_string()))?;
    Ok(single_code_point(&label).map_or(CODE_OUTPUT_TEXT, |c| c as i32))
}

pub fn parse_code(text: Option<&str>, default_code: i32) -> Result<i32> {
    let Some(text) = text else { return Ok(default_code) };
    if let Some(name) = text.strip_prefix(PREFIX_CODE) {
        return named_code(name).ok_or_else(|| KeySpecError::UnknownCode(name.to_string()));
    }
    if let Some(hex) = text.strip_prefix(PREFIX_HEX) {
        return i32::from_str_radix(hex, 16).map_err(|_| KeySpecError::BadHexCode(text.to_string()));
    }
    Ok(default_code)
}

fn named_code(name: &str) -> Option<i32> {
    Some(match name {
        "key_tab" => 9,
        "key_enter" => 10,
        "key_space" => 32,
        "key_shift" => -1,
        "key_switch_alpha_symbol" => -2,
        "key_output_text" => CODE_OUTPUT_TEXT,
        "key_delete" => -5,
        "key_settings" => -6,
        "key_shortcut" => -7,
        "key_action_next" => -8,
        "key_action_previous" => -9,
        "key_shift_enter" => -11,
        "key_language_switch" => -10,
        "key_unspecified" => CODE_UNSPECIFIED,
        _ => return None,
    })
}
