// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

// Incremental course-generation stream parser.
//
// Consumes a live, chunk-delimited text stream from a model endpoint
// and progressively reconstructs the course document before the stream
// finishes, emitting typed events as each field becomes knowable.
//
// Pipeline: LineFramer → envelope delta extraction → ContentAccumulator
// → {full parse → Complete; else PartialExtractor → EventEmitter}.

mod accumulator;
mod emitter;
mod envelope;
mod framer;
mod partial;
mod run;
mod types;

pub use accumulator::ContentAccumulator;
pub use emitter::EventEmitter;
pub use envelope::{extract_deltas, FrameDeltas};
pub use framer::LineFramer;
pub use partial::{PartialCourse, PartialExtractor};
pub use run::{GenerationRun, RunState};
pub use types::{
    sentence_progress, CourseEvent, EmissionState, TransportError, COMPLETE_PROGRESS,
    DESCRIPTION_PROGRESS, THINKING_PROGRESS, TITLE_PROGRESS,
};
