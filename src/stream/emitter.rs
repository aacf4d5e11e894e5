// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

// Diff tracker and event emitter
//
// Compares the newest partial structure against the emission guards and
// turns newly-visible fields into a deduplicated, ordered event
// sequence. Title and description fire once; sentences fire once each,
// in array order, as the completed count grows; thinking re-fires with
// the cumulative text on every delta.

use crate::course::CourseDocument;

use super::partial::PartialCourse;
use super::types::{
    sentence_progress, CourseEvent, EmissionState, COMPLETE_PROGRESS, DESCRIPTION_PROGRESS,
    THINKING_PROGRESS, TITLE_PROGRESS,
};

/// Per-run event emitter. Created fresh for each generation run.
pub struct EventEmitter {
    state: EmissionState,
    /// Requested sentence count, denominator of the progress formula.
    requested: usize,
    /// Highest progress emitted so far. Terminal Error events carry
    /// this instead of a fixed value so progress never goes backwards.
    high_water: u8,
}

impl EventEmitter {
    pub fn new(requested: usize) -> Self {
        Self {
            state: EmissionState::default(),
            requested,
            high_water: 0,
        }
    }

    /// Highest progress emitted so far in this run.
    pub fn high_water(&self) -> u8 {
        self.high_water
    }

    /// A thinking delta was observed: emit the entire cumulative
    /// thinking text. No dedup guard — growing re-emission is expected.
    pub fn thinking(&mut self, cumulative: &str) -> CourseEvent {
        self.track(CourseEvent::Thinking {
            text: cumulative.to_string(),
            progress: THINKING_PROGRESS,
        })
    }

    /// Diff the newest partial structure against the guards,
    /// producing events for everything newly visible.
    pub fn diff(&mut self, partial: &PartialCourse) -> Vec<CourseEvent> {
        let mut events = Vec::new();

        if !self.state.title_emitted {
            if let Some(title) = partial.title.as_deref().filter(|t| !t.is_empty()) {
                self.state.title_emitted = true;
                events.push(self.track(CourseEvent::Title {
                    text: title.to_string(),
                    progress: TITLE_PROGRESS,
                }));
            }
        }

        if !self.state.description_emitted {
            if let Some(desc) = partial.description.as_deref().filter(|d| !d.is_empty()) {
                self.state.description_emitted = true;
                events.push(self.track(CourseEvent::Description {
                    text: desc.to_string(),
                    progress: DESCRIPTION_PROGRESS,
                }));
            }
        }

        if partial.sentences.len() > self.state.last_sentence_count {
            for (idx, record) in partial
                .sentences
                .iter()
                .enumerate()
                .skip(self.state.last_sentence_count)
            {
                events.push(self.track(CourseEvent::Sentence {
                    record: record.clone(),
                    progress: sentence_progress(idx + 1, self.requested),
                }));
            }
            self.state.last_sentence_count = partial.sentences.len();
        }

        events
    }

    /// The buffer balanced and parsed: flush any fields that became
    /// visible only in the final parse, then emit Complete.
    pub fn complete(&mut self, course: CourseDocument) -> Vec<CourseEvent> {
        let final_view = PartialCourse {
            title: Some(course.title.clone()),
            description: Some(course.description.clone()),
            level: course.level,
            sentences: course.sentences.clone(),
        };
        let mut events = self.diff(&final_view);
        events.push(self.track(CourseEvent::Complete {
            course,
            progress: COMPLETE_PROGRESS,
        }));
        events
    }

    /// A fatal failure: one Error event at the current high-water
    /// progress (0 when nothing was ever emitted).
    pub fn error(&mut self, message: impl Into<String>) -> CourseEvent {
        let progress = self.high_water;
        self.track(CourseEvent::Error {
            message: message.into(),
            progress,
        })
    }

    fn track(&mut self, event: CourseEvent) -> CourseEvent {
        self.high_water = self.high_water.max(event.progress());
        event
    }
}
