// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

// Stream types
//
// Core types for incremental course generation: domain events, the
// emission guard state, progress arithmetic, and transport errors.

use crate::course::{CourseDocument, SentenceRecord};

// ---------------------------------------------------------------------------
// Progress contract
// ---------------------------------------------------------------------------

/// Fixed progress for Thinking events.
pub const THINKING_PROGRESS: u8 = 5;

/// Fixed progress for the single Title event.
pub const TITLE_PROGRESS: u8 = 10;

/// Fixed progress for the single Description event.
pub const DESCRIPTION_PROGRESS: u8 = 20;

/// Progress carried by the Complete event.
pub const COMPLETE_PROGRESS: u8 = 100;

/// Progress for the n-th completed sentence out of `requested`.
///
/// Sentences span the 30..=90 band: `min(90, 30 + running/requested * 60)`.
/// A zero `requested` count degenerates to the 90 cap rather than dividing.
pub fn sentence_progress(running: usize, requested: usize) -> u8 {
    if requested == 0 {
        return 90;
    }
    let scaled = 30.0 + (running as f64 / requested as f64) * 60.0;
    scaled.min(90.0) as u8
}

// ---------------------------------------------------------------------------
// Domain events
// ---------------------------------------------------------------------------

/// One event of a generation run, in the order the caller observes them.
///
/// The tagged union is exhaustive on purpose: consumers match on it
/// instead of branching on a type string.
#[derive(Debug, Clone, PartialEq)]
pub enum CourseEvent {
    /// Cumulative reasoning text seen so far. Re-emitted with growing
    /// text on every non-empty thinking delta — no dedup guard.
    Thinking { text: String, progress: u8 },
    /// Emitted once, the first time a non-empty title is visible.
    Title { text: String, progress: u8 },
    /// Emitted once, the first time a non-empty description is visible.
    Description { text: String, progress: u8 },
    /// One newly completed sentence, in array order.
    Sentence {
        record: SentenceRecord,
        progress: u8,
    },
    /// The full course document parsed from a balanced buffer. Terminal.
    Complete {
        course: CourseDocument,
        progress: u8,
    },
    /// A fatal failure. Exactly one per failed run. Terminal.
    Error { message: String, progress: u8 },
}

impl CourseEvent {
    /// The progress value carried by this event, in [0, 100].
    pub fn progress(&self) -> u8 {
        match self {
            CourseEvent::Thinking { progress, .. }
            | CourseEvent::Title { progress, .. }
            | CourseEvent::Description { progress, .. }
            | CourseEvent::Sentence { progress, .. }
            | CourseEvent::Complete { progress, .. }
            | CourseEvent::Error { progress, .. } => *progress,
        }
    }
}

// ---------------------------------------------------------------------------
// Emission guards
// ---------------------------------------------------------------------------

/// Guards preventing duplicate emission within one run.
///
/// `last_sentence_count` is monotonic non-decreasing; the title and
/// description flags flip once and stay set.
#[derive(Debug, Default)]
pub struct EmissionState {
    pub last_sentence_count: usize,
    pub title_emitted: bool,
    pub description_emitted: bool,
}

// ---------------------------------------------------------------------------
// Errors
// ---------------------------------------------------------------------------

/// Fatal transport-level failures. Each surfaces as exactly one Error
/// event; the run terminates immediately, skipping all parsing.
#[derive(Debug, Clone, thiserror::Error)]
pub enum TransportError {
    #[error("request to model endpoint failed: {0}")]
    RequestFailed(String),

    #[error("model endpoint returned HTTP {status}: {message}")]
    BadStatus { status: u16, message: String },

    #[error("network error while streaming: {0}")]
    Stream(String),
}
