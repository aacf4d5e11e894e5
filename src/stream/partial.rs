// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

// Partial field extractor
//
// Best-effort mining of title / description / level / completed
// sentence objects out of a still-incomplete buffer. Extraction is
// order-insensitive and independent per field: whatever is visible is
// returned, everything else stays None. Sentence objects are only
// taken once fully closed with all four required fields — an object
// still mid-stream simply fails its strict parse and is re-attempted
// on the next delta.
//
// This re-scans the window on every delta. Quadratic in stream length,
// tolerated at course sizes; the bench under benches/ tracks it.

use regex::Regex;

use crate::course::{CourseLevel, SentenceRecord};

/// Best current knowledge of the course being generated.
#[derive(Debug, Default, PartialEq)]
pub struct PartialCourse {
    pub title: Option<String>,
    pub description: Option<String>,
    pub level: Option<CourseLevel>,
    /// Completed sentences in array order. Within one run this list
    /// only grows — closed objects never change on later rescans.
    pub sentences: Vec<SentenceRecord>,
}

impl PartialCourse {
    pub fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.description.is_none()
            && self.level.is_none()
            && self.sentences.is_empty()
    }
}

/// Compiled patterns for the scalar fields. Built once per run.
pub struct PartialExtractor {
    title: Regex,
    description: Regex,
    level: Regex,
    sentences_open: Regex,
}

impl PartialExtractor {
    pub fn new() -> Self {
        Self {
            title: quoted_value_pattern("title"),
            description: quoted_value_pattern("description"),
            level: quoted_value_pattern("level"),
            sentences_open: Regex::new(r#""sentences"\s*:\s*\["#)
                .expect("sentences pattern failed to compile"),
        }
    }

    /// Mine the window for whatever is currently visible.
    ///
    /// Returns `None` when nothing at all is extractable yet.
    pub fn extract(&self, window: &str) -> Option<PartialCourse> {
        let partial = PartialCourse {
            title: self.quoted_value(&self.title, window),
            description: self.quoted_value(&self.description, window),
            level: self
                .quoted_value(&self.level, window)
                .and_then(|s| CourseLevel::parse(&s)),
            sentences: self.closed_sentences(window),
        };

        if partial.is_empty() {
            None
        } else {
            Some(partial)
        }
    }

    /// First quoted string value bound to the pattern's key, unescaped.
    fn quoted_value(&self, pattern: &Regex, window: &str) -> Option<String> {
        let raw = pattern.captures(window)?.get(1)?.as_str();
        Some(unescape(raw))
    }

    /// Every fully closed sentence object within the sentences array
    /// body (from the opening bracket to its matching close, or to the
    /// end of the window if not yet closed) that strictly parses with
    /// all four required fields.
    fn closed_sentences(&self, window: &str) -> Vec<SentenceRecord> {
        let Some(open) = self.sentences_open.find(window) else {
            return Vec::new();
        };
        let body = &window[open.end()..];

        let mut sentences = Vec::new();
        for span in closed_object_spans(body) {
            if let Ok(record) = serde_json::from_str::<SentenceRecord>(span) {
                sentences.push(record);
            }
        }
        sentences
    }
}

impl Default for PartialExtractor {
    fn default() -> Self {
        Self::new()
    }
}

/// `"<key>" : "<value>"` with escape-aware value matching.
fn quoted_value_pattern(key: &str) -> Regex {
    Regex::new(&format!(r#""{key}"\s*:\s*"((?:[^"\\]|\\.)*)""#))
        .expect("field pattern failed to compile")
}

/// Decode JSON string escapes in a raw value body. Falls back to the
/// raw text if the body somehow is not a valid string interior.
fn unescape(raw: &str) -> String {
    serde_json::from_str::<String>(&format!("\"{raw}\"")).unwrap_or_else(|_| raw.to_string())
}

/// Top-level `{...}` spans inside an array body, stopping at the
/// array's matching `]` or the end of the body. String-aware so braces
/// and brackets inside values do not skew the depth counts.
fn closed_object_spans(body: &str) -> Vec<&str> {
    let mut spans = Vec::new();
    let mut in_string = false;
    let mut escaped = false;
    let mut brace_depth: i64 = 0;
    let mut object_start = None;

    for (i, ch) in body.char_indices() {
        if in_string {
            if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }
        match ch {
            '"' => in_string = true,
            '{' => {
                if brace_depth == 0 {
                    object_start = Some(i);
                }
                brace_depth += 1;
            }
            '}' => {
                brace_depth -= 1;
                if brace_depth == 0 {
                    if let Some(start) = object_start.take() {
                        spans.push(&body[start..=i]);
                    }
                }
            }
            ']' if brace_depth == 0 => break,
            _ => {}
        }
    }

    spans
}
