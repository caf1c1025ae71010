// File: src/core/input.rs
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventKind {
    /// A key press producing a code point.
    Input,
    /// A point on a gesture trace.
    Gesture,
    /// Input synthesised by the engine itself, e.g. a suggestion pick.
    SoftwareGenerated,
}

/// One input event of a composing gesture.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub kind: EventKind,
    pub code_point: Option<char>,
    pub x: i32,
    pub y: i32,
}

impl Event {
    pub fn key(code_point: char, x: i32, y: i32) -> Self {
        Self { kind: EventKind::Input, code_point: Some(code_point), x, y }
    }

    pub fn gesture(x: i32, y: i32) -> Self {
        Self { kind: EventKind::Gesture, code_point: None, x, y }
    }
}

/// A single sampled point of a touch/gesture trace.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPointer {
    pub x: i32,
    pub y: i32,
    pub pointer_id: i32,
    pub time: i32,
}

/// Gesture trace buffer. The capacity is a hard bound: points past it are
/// dropped rather than growing the buffer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputPointers {
    capacity: usize,
    points: Vec<InputPointer>,
}

impl InputPointers {
    pub fn new(capacity: usize) -> Self {
        Self { capacity, points: Vec::with_capacity(capacity) }
    }

    /// Returns false when the buffer is full and the point was dropped.
    pub fn add_pointer(&mut self, x: i32, y: i32, pointer_id: i32, time: i32) -> bool {
        if self.points.len() >= self.capacity {
            return false;
        }
        self.points.push(InputPointer { x, y, pointer_id, time });
        true
    }

    /// Replaces the content with a copy of `other`, truncated to our capacity.
    pub fn copy_from(&mut self, other: &InputPointers) {
        self.points.clear();
        let n = other.points.len().min(self.capacity);
        self.points.extend_from_slice(&other.points[..n]);
    }

    pub fn reset(&mut self) {
        self.points.clear();
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn points(&self) -> &[InputPointer] {
        &self.points
    }
}

/// The in-progress input handed to dictionaries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ComposedData {
    pub input_pointers: InputPointers,
    /// True for gesture (batch) input, false for tap typing.
    pub is_batch_mode: bool,
    pub typed_word: String,
}

impl ComposedData {
    pub fn new(input_pointers: InputPointers, is_batch_mode: bool, typed_word: impl Into<String>) -> Self {
        Self { input_pointers, is_batch_mode, typed_word: typed_word.into() }
    }

    /// Tap-typed input with no trace.
    pub fn from_typed(typed_word: impl Into<String>) -> Self {
        Self::new(
            InputPointers::new(crate::core::types::DICTIONARY_MAX_WORD_LENGTH),
            false,
            typed_word,
        )
    }

    /// The typed word without trailing apostrophes, which dictionaries ignore.
    pub fn query_word(&self) -> &str {
        self.typed_word.trim_end_matches('\'')
    }
}
