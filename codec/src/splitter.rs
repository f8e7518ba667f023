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

/// One decomposed element of an AT command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Segment<'a> {
    /// An elementary command, e.g. `E1`, `&F`, `S3?` or `+CMEE=2`.
    Command(&'a str),
    /// The remainder of the line is malformed (for example an unterminated
    /// quoted string). Callers must abandon the rest of the line.
    SyntaxError,
}

/// Lazily splits the text following the `AT` prefix into elementary
/// commands.
///
/// Separators (spaces and `;`) between commands are skipped. Three token
/// shapes get special treatment, matching V.250 syntax:
///
/// - a dial command (`D`/`d`) spans to the end of the line, because dial
///   strings legitimately contain `;`;
/// - an S-parameter consumes `S`, a decimal index, and an optional `=value`
///   or `?` suffix, with spaces tolerated around the digits;
/// - everything that does not parse as a basic `&?letter digits` command is
///   scanned as an extended command up to the next top-level `;`, with text
///   between double quotes treated as opaque.
///
/// Yielding [`Segment::SyntaxError`] ends iteration; [`None`] is returned
/// only at the true end of the line.
#[derive(Debug)]
pub struct Segments<'a> {
    line: &'a str,
    pos: usize,
    done: bool,
}

impl<'a> Segments<'a> {
    /// Creates a splitter over the text following `AT`.
    pub fn new(line: &'a str) -> Self {
        Self {
            line,
            pos: 0,
            done: false,
        }
    }
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        if self.done {
            return None;
        }
        let bytes = self.line.as_bytes();
        let mut pos = self.pos;
        while pos < bytes.len() && matches!(bytes[pos], b' ' | b';') {
            pos += 1;
        }
        if pos >= bytes.len() {
            self.pos = pos;
            self.done = true;
            return None;
        }

        let start = pos;
        let end = match bytes[pos].to_ascii_uppercase() {
            // Dial numbers may contain ';' with dial-specific meaning, so
            // the command swallows the rest of the line.
            b'D' => bytes.len(),
            b'S' => scan_s_parameter(bytes, pos + 1),
            _ => match scan_basic(bytes, pos) {
                Some(end) => end,
                None => match scan_extended(bytes, pos) {
                    Some(end) => end,
                    None => {
                        self.done = true;
                        return Some(Segment::SyntaxError);
                    }
                },
            },
        };

        self.pos = end;
        Some(Segment::Command(&self.line[start..end]))
    }
}

/// Consumes the S-parameter syntax following the `S`: index digits with
/// tolerated spaces, then `=digits`, `?`, or nothing.
fn scan_s_parameter(bytes: &[u8], mut pos: usize) -> usize {
    while pos < bytes.len() && bytes[pos] == b' ' {
        pos += 1;
    }
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }

    // Trailing spaces only belong to the token if an '=' or '?' follows.
    let mark = pos;
    while pos < bytes.len() && bytes[pos] == b' ' {
        pos += 1;
    }
    match bytes.get(pos) {
        Some(b'=') => {
            pos += 1;
            while pos < bytes.len() && bytes[pos] == b' ' {
                pos += 1;
            }
            while pos < bytes.len() && bytes[pos].is_ascii_digit() {
                pos += 1;
            }
            pos
        }
        Some(b'?') => pos + 1,
        _ => mark,
    }
}

/// Consumes a basic command: an optional `&`, one letter, then decimal
/// digits. Returns `None` when the letter is missing.
fn scan_basic(bytes: &[u8], mut pos: usize) -> Option<usize> {
    if bytes[pos] == b'&' {
        pos += 1;
    }
    if pos >= bytes.len() || !bytes[pos].is_ascii_alphabetic() {
        return None;
    }
    pos += 1;
    while pos < bytes.len() && bytes[pos].is_ascii_digit() {
        pos += 1;
    }
    Some(pos)
}

/// Consumes an extended command up to the next top-level `;` or the end of
/// the line. Text between double quotes is opaque; an unterminated quote
/// poisons the whole remainder.
fn scan_extended(bytes: &[u8], mut pos: usize) -> Option<usize> {
    let mut in_quote = false;
    while pos < bytes.len() {
        match bytes[pos] {
            b'"' => in_quote = !in_quote,
            b';' if !in_quote => break,
            _ => {}
        }
        pos += 1;
    }
    if in_quote { None } else { Some(pos) }
}
