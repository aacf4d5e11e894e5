// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

// Generation run state machine
//
// One run per generation: Idle → Streaming → {Finalized | Failed}.
// The caller drives consumption one event at a time; between events the
// run suspends awaiting the next network chunk. There is no background
// task — dropping the run releases the underlying byte reader on every
// exit path (completion, abandonment, error).

use std::collections::VecDeque;

use bytes::Bytes;
use tokio_stream::{Stream, StreamExt};

use super::accumulator::ContentAccumulator;
use super::emitter::EventEmitter;
use super::envelope::extract_deltas;
use super::framer::LineFramer;
use super::partial::PartialExtractor;
use super::types::{CourseEvent, TransportError};

/// Lifecycle of a run. Finalized and Failed are terminal: no event is
/// ever emitted after either is reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Idle,
    Streaming,
    Finalized,
    Failed,
}

/// A single course-generation run over a transport byte stream.
///
/// All state is owned by the run and created fresh per run; nothing is
/// shared across concurrent runs.
pub struct GenerationRun<S> {
    input: S,
    framer: LineFramer,
    accumulator: ContentAccumulator,
    extractor: PartialExtractor,
    emitter: EventEmitter,
    /// Cumulative thinking text across all thinking deltas.
    thinking: String,
    /// Events produced but not yet pulled by the caller.
    pending: VecDeque<CourseEvent>,
    state: RunState,
}

impl<S> GenerationRun<S>
where
    S: Stream<Item = Result<Bytes, TransportError>> + Unpin,
{
    /// Wrap a transport byte stream. `requested_sentences` feeds the
    /// sentence progress formula.
    pub fn new(input: S, requested_sentences: usize) -> Self {
        Self {
            input,
            framer: LineFramer::new(),
            accumulator: ContentAccumulator::new(),
            extractor: PartialExtractor::new(),
            emitter: EventEmitter::new(requested_sentences),
            thinking: String::new(),
            pending: VecDeque::new(),
            state: RunState::Idle,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    /// Pull the next event, awaiting network chunks as needed.
    ///
    /// Returns `None` once the run has reached a terminal state and all
    /// pending events have been drained.
    pub async fn next_event(&mut self) -> Option<CourseEvent> {
        loop {
            if let Some(event) = self.pending.pop_front() {
                return Some(event);
            }
            if matches!(self.state, RunState::Finalized | RunState::Failed) {
                return None;
            }

            match self.input.next().await {
                Some(Ok(chunk)) => {
                    if self.state == RunState::Idle {
                        self.state = RunState::Streaming;
                        tracing::debug!("generation stream opened");
                    }
                    let frames = self.framer.push_chunk(&chunk);
                    self.process_frames(frames);
                    if self.framer.is_terminated()
                        && !matches!(self.state, RunState::Finalized | RunState::Failed)
                    {
                        self.end_of_input();
                    }
                }
                Some(Err(e)) => self.fail(&e),
                None => {
                    let frames = self.framer.finish();
                    self.process_frames(frames);
                    if !matches!(self.state, RunState::Finalized | RunState::Failed) {
                        self.end_of_input();
                    }
                }
            }
        }
    }

    /// Drain all remaining events into a vector. Test and CLI helper.
    pub async fn collect_events(mut self) -> Vec<CourseEvent> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event().await {
            events.push(event);
        }
        events
    }

    fn process_frames(&mut self, frames: Vec<String>) {
        for payload in frames {
            if matches!(self.state, RunState::Finalized | RunState::Failed) {
                // Terminal: later frames are never processed
                return;
            }
            let Some(deltas) = extract_deltas(&payload) else {
                tracing::debug!(len = payload.len(), "skipping malformed frame");
                continue;
            };

            if let Some(thinking) = deltas.thinking {
                self.thinking.push_str(&thinking);
                let event = self.emitter.thinking(&self.thinking);
                self.pending.push_back(event);
            }

            if let Some(content) = deltas.content {
                self.absorb_content(&content);
            }
        }
    }

    fn absorb_content(&mut self, content: &str) {
        self.accumulator.absorb(content);

        // Partial extraction first so fields that became visible in
        // this delta are emitted before a Complete from the same delta.
        if let Some(window) = self.accumulator.partial_window() {
            if let Some(partial) = self.extractor.extract(window) {
                self.pending.extend(self.emitter.diff(&partial));
            }
        }

        if let Some(course) = self.accumulator.try_complete() {
            tracing::info!(
                sentences = course.sentences.len(),
                "course document balanced and parsed"
            );
            self.pending.extend(self.emitter.complete(course));
            self.state = RunState::Finalized;
        }
    }

    /// Input ended (terminator line or reader exhausted) without a
    /// balanced document. A started-but-never-closed object surfaces as
    /// an explicit Error; a run that never started an object (for
    /// example thinking-only) ends silently.
    fn end_of_input(&mut self) {
        if self.accumulator.object_started() {
            tracing::warn!("stream ended before the course document balanced");
            let event = self
                .emitter
                .error("generation ended before a complete course was produced");
            self.pending.push_back(event);
            self.state = RunState::Failed;
        } else {
            tracing::debug!("generation stream ended without a document");
            self.state = RunState::Finalized;
        }
    }

    /// Transport-level failures skip all parsing. The Error event keeps
    /// the emitter's high-water progress, so a failure before any other
    /// event carries 0 and a mid-stream failure never steps backwards.
    fn fail(&mut self, error: &TransportError) {
        tracing::warn!(error = %error, "generation run failed");
        let event = self.emitter.error(error.to_string());
        self.pending.push_back(event);
        self.state = RunState::Failed;
    }
}
