// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

// Envelope delta extractor
//
// Parses one frame payload as a small JSON envelope and pulls out at
// most one thinking delta and one content delta. Nothing else in the
// envelope is interpreted. A payload that fails the strict parse is
// skipped by the caller — a single bad frame never aborts a run.

use serde::Deserialize;

/// One decoded frame payload.
///
/// Mirrors the chat-completions chunk shape loosely enough that any
/// valid JSON object parses; fields we do not care about are dropped.
#[derive(Debug, Default, Deserialize)]
pub struct RawEnvelope {
    /// Some endpoints put reasoning text at the top level.
    #[serde(default)]
    thinking: Option<String>,
    #[serde(default)]
    choices: Vec<RawChoice>,
}

#[derive(Debug, Default, Deserialize)]
struct RawChoice {
    #[serde(default)]
    delta: Option<RawDelta>,
    #[serde(default)]
    message: Option<RawMessage>,
}

#[derive(Debug, Default, Deserialize)]
struct RawDelta {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    thinking: Option<String>,
    #[serde(default)]
    reasoning: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct RawMessage {
    #[serde(default, alias = "reasoning_content")]
    reasoning: Option<String>,
}

/// The two deltas one envelope can carry. Both may co-occur.
#[derive(Debug, Default, PartialEq)]
pub struct FrameDeltas {
    pub thinking: Option<String>,
    pub content: Option<String>,
}

impl FrameDeltas {
    pub fn is_empty(&self) -> bool {
        self.thinking.is_none() && self.content.is_none()
    }
}

/// Strictly parse one frame payload and extract its deltas.
///
/// Returns `None` when the payload is not valid JSON for the envelope
/// shape (the malformed-frame case). The thinking delta is resolved
/// through a fixed priority chain — top-level `thinking`, then
/// `delta.thinking`, then `delta.reasoning`, then `message.reasoning` —
/// taking the first non-empty match. The content delta is extracted
/// independently of whether a thinking delta was present.
pub fn extract_deltas(payload: &str) -> Option<FrameDeltas> {
    let envelope: RawEnvelope = serde_json::from_str(payload).ok()?;

    let choice = envelope.choices.first();
    let delta = choice.and_then(|c| c.delta.as_ref());
    let message = choice.and_then(|c| c.message.as_ref());

    let thinking = [
        envelope.thinking.as_deref(),
        delta.and_then(|d| d.thinking.as_deref()),
        delta.and_then(|d| d.reasoning.as_deref()),
        message.and_then(|m| m.reasoning.as_deref()),
    ]
    .into_iter()
    .flatten()
    .find(|t| !t.is_empty())
    .map(str::to_string);

    let content = delta.and_then(|d| d.content.clone());

    Some(FrameDeltas { thinking, content })
}
