// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

// Accumulator and boundary detector
//
// Appends content deltas to an append-only buffer and tracks brace
// balance so the run knows when the outer object *might* be closed.
// The counter is a plain signed count over `{` / `}` — it does not
// understand strings, so braces inside values shift it. That is the
// documented tolerance of this stage; the strict parse attempt is the
// real arbiter of completeness.

use crate::course::CourseDocument;

/// Append-only accumulation of all content deltas in one run, plus the
/// brace-depth boundary detector.
#[derive(Debug, Default)]
pub struct ContentAccumulator {
    buffer: String,
    depth: i64,
    object_started: bool,
}

impl ContentAccumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Absorb one content delta. The buffer is never truncated or
    /// rewritten; the depth counter is updated per character.
    pub fn absorb(&mut self, delta: &str) {
        for ch in delta.chars() {
            match ch {
                '{' => {
                    self.depth += 1;
                    self.object_started = true;
                }
                '}' => self.depth -= 1,
                _ => {}
            }
        }
        self.buffer.push_str(delta);
    }

    /// Whether a `{` has ever been seen.
    pub fn object_started(&self) -> bool {
        self.object_started
    }

    /// Whether the depth counter has returned to zero after the object
    /// started — the candidate-for-full-parse condition.
    pub fn is_balanced(&self) -> bool {
        self.object_started && self.depth == 0
    }

    /// The widest substring from the first `{` to the last `}`.
    /// `None` until both exist.
    pub fn candidate(&self) -> Option<&str> {
        let start = self.buffer.find('{')?;
        let end = self.buffer.rfind('}')?;
        if end < start {
            return None;
        }
        Some(&self.buffer[start..=end])
    }

    /// The open-ended window from the first `{` to the end of the
    /// buffer. This is what the partial extractor mines: early in a run
    /// there may be no `}` yet, but a title can already be visible.
    pub fn partial_window(&self) -> Option<&str> {
        let start = self.buffer.find('{')?;
        Some(&self.buffer[start..])
    }

    /// Attempt the strict full-document parse. Only meaningful when the
    /// buffer is balanced; returns `None` while the object is still
    /// open or the candidate does not parse (the expected case during
    /// most of a run).
    pub fn try_complete(&self) -> Option<CourseDocument> {
        if !self.is_balanced() {
            return None;
        }
        let candidate = self.candidate()?;
        serde_json::from_str(candidate).ok()
    }
}
