//
// Copyright 2026 The atmodem Authors. All Rights Reserved.
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//

use crate::consts;
use bytes::{BufMut, BytesMut};
use tracing::{trace, warn};

/// A byte-at-a-time AT command-line parser.
///
/// The parser accumulates one command line at a time and yields the text
/// that follows the (case-insensitive) `AT` prefix once a terminator is
/// seen. It applies the classic normalization rules on the way in:
///
/// - every byte is masked to its low 7 bits before interpretation;
/// - LF is folded to CR, DEL is folded to backspace;
/// - backspace erases the last pending byte;
/// - other control bytes are silently discarded;
/// - `A/` (with nothing else pending) replays the previously completed
///   `AT` line immediately, without waiting for a terminator.
///
/// A line that grows past [`consts::MAX_LINE_LENGTH`] is poisoned: at the
/// next terminator nothing is emitted and both the accumulator and the
/// repeat memory are cleared, so a lost line can never replay stale state.
///
/// The parser performs no echo; reflecting received bytes back to the
/// terminal is the session's business because echo applies to the raw
/// stream, not the normalized one.
#[derive(Debug, Default)]
pub struct LineParser {
    /// Bytes of the line currently being accumulated.
    pending: BytesMut,
    /// The previous complete `AT` line, kept for the `A/` shortcut.
    last_line: Option<String>,
    /// Set when `pending` would have exceeded the size bound.
    overflow: bool,
}

impl LineParser {
    /// Creates a parser with empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Clears the accumulator, the overflow mark, and the repeat memory.
    pub fn reset(&mut self) {
        self.pending.clear();
        self.last_line = None;
        self.overflow = false;
    }

    /// Feeds one raw byte, returning a complete command line if this byte
    /// finished one.
    ///
    /// The returned string is the text following the `AT` prefix, without
    /// the terminator. `None` means the byte was consumed (or dropped)
    /// without completing a line.
    pub fn feed(&mut self, byte: u8) -> Option<String> {
        // Bit 8 is ignored while identifying commands.
        let mut byte = byte & 0x7F;
        if byte == consts::LF {
            byte = consts::CR;
        }
        if byte == consts::DEL {
            byte = consts::BS;
        }

        match byte {
            consts::CR => self.terminate(),
            consts::BS => {
                let len = self.pending.len();
                if len > 0 {
                    self.pending.truncate(len - 1);
                }
                None
            }
            b'/' if self.pending.len() == 1
                && matches!(self.pending[0], b'A' | b'a') =>
            {
                // Repeat shortcut: the pending 'A' is discarded whether or
                // not a previous line exists.
                self.pending.clear();
                self.last_line.clone()
            }
            byte if byte < 0x20 => None,
            byte => {
                if self.pending.len() < consts::MAX_LINE_LENGTH {
                    self.pending.put_u8(byte);
                } else {
                    self.overflow = true;
                }
                None
            }
        }
    }

    fn terminate(&mut self) -> Option<String> {
        if self.overflow {
            warn!(
                limit = consts::MAX_LINE_LENGTH,
                "command line exceeded the size bound, dropping it"
            );
            self.overflow = false;
            self.pending.clear();
            self.last_line = None;
            return None;
        }

        let buffer = self.pending.split();
        let Some(position) = find_at_prefix(&buffer) else {
            trace!("terminated line without AT prefix, ignoring");
            return None;
        };

        // Masked to 7 bits on the way in, so this is valid ASCII.
        let line = String::from_utf8_lossy(&buffer[position + 2..]).into_owned();
        self.last_line = Some(line.clone());
        Some(line)
    }
}

/// Finds the first case-insensitive `AT` in `buffer`, tolerating leading
/// garbage (line noise, spurious modem chatter) before the prefix.
fn find_at_prefix(buffer: &[u8]) -> Option<usize> {
    buffer
        .windows(2)
        .position(|pair| pair[0].eq_ignore_ascii_case(&b'A') && pair[1].eq_ignore_ascii_case(&b'T'))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn feed_all(parser: &mut LineParser, bytes: &[u8]) -> Vec<String> {
        bytes.iter().filter_map(|byte| parser.feed(*byte)).collect()
    }

    #[test]
    fn simple_line() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"ATE1\r"), vec!["E1"]);
    }

    #[test]
    fn lowercase_and_mixed_prefix() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"atE1\r"), vec!["E1"]);
        assert_eq!(feed_all(&mut parser, b"aTq0\r"), vec!["q0"]);
    }

    #[test]
    fn leading_garbage_is_skipped() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"\x01\x02zzAT+CMEE=2\r"), vec!["+CMEE=2"]);
    }

    #[test]
    fn line_feed_is_a_terminator() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"ATI\n"), vec!["I"]);
    }

    #[test]
    fn high_bit_is_masked() {
        let mut parser = LineParser::new();
        let bytes: Vec<u8> = b"ATE1\r".iter().map(|b| b | 0x80).collect();
        assert_eq!(feed_all(&mut parser, &bytes), vec!["E1"]);
    }

    #[test]
    fn backspace_edits_pending_line() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"ATE2\x08 1\r"), vec!["E 1"]);
    }

    #[test]
    fn delete_behaves_like_backspace() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"ATE2\x7F1\r"), vec!["E1"]);
    }

    #[test]
    fn backspace_on_empty_buffer_is_a_noop() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"\x08\x08ATE1\r"), vec!["E1"]);
    }

    #[test]
    fn control_bytes_are_discarded() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"AT\x01\x02E\x031\r"), vec!["E1"]);
    }

    #[test]
    fn line_without_at_is_ignored() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"hello\r"), Vec::<String>::new());
        // Repeat memory is untouched by an ignored line.
        assert_eq!(feed_all(&mut parser, b"ATE1\rjunk\ra/"), vec!["E1", "E1"]);
    }

    #[test]
    fn repeat_without_history_yields_nothing() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"A/"), Vec::<String>::new());
        // The pending 'A' was discarded, so a fresh line still works.
        assert_eq!(feed_all(&mut parser, b"ATE1\r"), vec!["E1"]);
    }

    #[test]
    fn repeat_needs_no_terminator() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"ATE1\r"), vec!["E1"]);
        assert_eq!(parser.feed(b'a'), None);
        assert_eq!(parser.feed(b'/').as_deref(), Some("E1"));
    }

    #[test]
    fn repeat_only_fires_with_single_pending_a() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"ATE1\r"), vec!["E1"]);
        // "BA/" has two pending bytes, so '/' is ordinary data.
        assert_eq!(feed_all(&mut parser, b"BA/"), Vec::<String>::new());
        assert_eq!(feed_all(&mut parser, b"\r"), Vec::<String>::new());
    }

    #[test]
    fn overflow_drops_the_line_and_repeat_memory() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"ATE1\r"), vec!["E1"]);

        for _ in 0..2_000_000 {
            assert_eq!(parser.feed(b'+'), None);
        }
        assert_eq!(parser.feed(consts::CR), None);

        // The repeat memory was poisoned along with the line.
        assert_eq!(feed_all(&mut parser, b"a/"), Vec::<String>::new());
        // A subsequent valid line parses normally.
        assert_eq!(feed_all(&mut parser, b"ATQ0\r"), vec!["Q0"]);
    }

    #[test]
    fn exactly_full_line_is_accepted() {
        let mut parser = LineParser::new();
        let mut bytes = b"AT".to_vec();
        bytes.extend(std::iter::repeat(b'X').take(consts::MAX_LINE_LENGTH - 2));
        bytes.push(consts::CR);
        let lines = feed_all(&mut parser, &bytes);
        assert_eq!(lines.len(), 1);
        assert_eq!(lines[0].len(), consts::MAX_LINE_LENGTH - 2);
    }

    #[test]
    fn reset_clears_everything() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"ATE1\r"), vec!["E1"]);
        parser.reset();
        assert_eq!(feed_all(&mut parser, b"a/"), Vec::<String>::new());
    }

    #[test]
    fn bare_at_yields_empty_line() {
        let mut parser = LineParser::new();
        assert_eq!(feed_all(&mut parser, b"AT\r"), vec![""]);
    }
}
