// Copyright 2026 The Laoshi Project
// SPDX-License-Identifier: Apache-2.0

// Line framer
//
// Turns raw byte chunks from the network read loop into discrete frame
// payloads. Byte-boundary safe: a multi-byte UTF-8 character split
// across chunks is held back and completed by the next chunk, and an
// incomplete trailing line is held back until its newline arrives.
//
// Filtering rules:
// - blank lines are dropped
// - lines without the `data:` prefix are dropped
// - the literal `data: [DONE]` terminator flips the framer into the
//   terminated state and is never forwarded downstream

/// The event-data prefix every forwarded line must carry.
const DATA_PREFIX: &str = "data:";

/// The literal stream terminator payload.
const TERMINATOR: &str = "[DONE]";

/// Streaming line framer with UTF-8 carry across chunk boundaries.
#[derive(Debug, Default)]
pub struct LineFramer {
    /// Undecoded trailing bytes of an incomplete UTF-8 sequence.
    utf8_carry: Vec<u8>,
    /// Decoded text not yet terminated by a newline.
    line_buffer: String,
    /// Set once `data: [DONE]` is seen; all further input is ignored.
    terminated: bool,
}

impl LineFramer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Whether the terminator line has been seen.
    pub fn is_terminated(&self) -> bool {
        self.terminated
    }

    /// Absorb one raw chunk and return the frame payloads it completed,
    /// with the `data:` prefix already stripped.
    pub fn push_chunk(&mut self, chunk: &[u8]) -> Vec<String> {
        if self.terminated {
            return Vec::new();
        }

        self.decode_into_line_buffer(chunk);
        self.drain_complete_lines()
    }

    /// Flush the held-back trailing line at end of input (a final line
    /// without a newline is still a frame).
    pub fn finish(&mut self) -> Vec<String> {
        if self.terminated || self.line_buffer.is_empty() {
            return Vec::new();
        }
        let line = std::mem::take(&mut self.line_buffer);
        let mut frames = Vec::new();
        self.accept_line(&line, &mut frames);
        frames
    }

    /// Decode `chunk` appended to any carried bytes, retaining an
    /// incomplete trailing sequence for the next chunk. Invalid byte
    /// sequences decode to U+FFFD rather than aborting the run.
    fn decode_into_line_buffer(&mut self, chunk: &[u8]) {
        self.utf8_carry.extend_from_slice(chunk);
        let mut bytes = std::mem::take(&mut self.utf8_carry);

        loop {
            match std::str::from_utf8(&bytes) {
                Ok(text) => {
                    self.line_buffer.push_str(text);
                    return;
                }
                Err(e) => {
                    let valid = e.valid_up_to();
                    // Safe: from_utf8 verified the prefix.
                    self.line_buffer
                        .push_str(std::str::from_utf8(&bytes[..valid]).unwrap_or(""));
                    match e.error_len() {
                        None => {
                            // Incomplete trailing sequence — carry it.
                            self.utf8_carry = bytes.split_off(valid);
                            return;
                        }
                        Some(bad) => {
                            self.line_buffer.push('\u{FFFD}');
                            bytes.drain(..valid + bad);
                        }
                    }
                }
            }
        }
    }

    /// Drain all newline-terminated lines from the buffer, filtering
    /// each one. Stops at the terminator.
    fn drain_complete_lines(&mut self) -> Vec<String> {
        let mut frames = Vec::new();
        while let Some(pos) = self.line_buffer.find('\n') {
            let line: String = self.line_buffer.drain(..=pos).collect();
            self.accept_line(line.trim_end_matches(['\n', '\r']), &mut frames);
            if self.terminated {
                break;
            }
        }
        frames
    }

    fn accept_line(&mut self, line: &str, frames: &mut Vec<String>) {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            return;
        }
        let Some(payload) = trimmed.strip_prefix(DATA_PREFIX) else {
            return;
        };
        let payload = payload.trim_start();
        if payload == TERMINATOR {
            self.terminated = true;
            return;
        }
        frames.push(payload.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn single_line_in_one_chunk() {
        let mut framer = LineFramer::new();
        let frames = framer.push_chunk(b"data: {\"a\":1}\n");
        assert_eq!(frames, vec!["{\"a\":1}"]);
    }

    #[test]
    fn line_split_across_chunks_held_back() {
        let mut framer = LineFramer::new();
        assert!(framer.push_chunk(b"data: {\"a\"").is_empty());
        let frames = framer.push_chunk(b":1}\n");
        assert_eq!(frames, vec!["{\"a\":1}"]);
    }

    #[test]
    fn multibyte_char_split_across_chunks_never_mangled() {
        // "你" is e4 bd a0 — split it mid-sequence
        let bytes = "data: 你好\n".as_bytes();
        let mut framer = LineFramer::new();
        assert!(framer.push_chunk(&bytes[..8]).is_empty());
        let frames = framer.push_chunk(&bytes[8..]);
        assert_eq!(frames, vec!["你好"]);
    }

    #[test]
    fn every_split_point_of_a_multibyte_line_decodes_identically() {
        let full = "data: {\"title\":\"中文课程\"}\n".as_bytes();
        for split in 1..full.len() {
            let mut framer = LineFramer::new();
            let mut frames = framer.push_chunk(&full[..split]);
            frames.extend(framer.push_chunk(&full[split..]));
            assert_eq!(
                frames,
                vec!["{\"title\":\"中文课程\"}"],
                "split at byte {split}"
            );
        }
    }

    #[test]
    fn blank_and_non_data_lines_dropped() {
        let mut framer = LineFramer::new();
        let frames = framer.push_chunk(b"\n: keep-alive comment\nevent: ping\ndata: x\n\n");
        assert_eq!(frames, vec!["x"]);
    }

    #[test]
    fn terminator_recognized_and_not_forwarded() {
        let mut framer = LineFramer::new();
        let frames = framer.push_chunk(b"data: one\ndata: [DONE]\ndata: after\n");
        assert_eq!(frames, vec!["one"]);
        assert!(framer.is_terminated());
        // Everything after termination is ignored
        assert!(framer.push_chunk(b"data: more\n").is_empty());
    }

    #[test]
    fn prefix_without_space_accepted() {
        let mut framer = LineFramer::new();
        let frames = framer.push_chunk(b"data:{\"a\":1}\n");
        assert_eq!(frames, vec!["{\"a\":1}"]);
    }

    #[test]
    fn crlf_lines_handled() {
        let mut framer = LineFramer::new();
        let frames = framer.push_chunk(b"data: a\r\ndata: b\r\n");
        assert_eq!(frames, vec!["a", "b"]);
    }

    #[test]
    fn finish_flushes_trailing_line_without_newline() {
        let mut framer = LineFramer::new();
        assert!(framer.push_chunk(b"data: tail").is_empty());
        assert_eq!(framer.finish(), vec!["tail"]);
        // Second finish is a no-op
        assert!(framer.finish().is_empty());
    }

    #[test]
    fn invalid_utf8_replaced_not_fatal() {
        let mut framer = LineFramer::new();
        let frames = framer.push_chunk(b"data: a\xFFb\n");
        assert_eq!(frames, vec!["a\u{FFFD}b"]);
    }
}
