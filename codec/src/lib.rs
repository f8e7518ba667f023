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

//! # AT Command Codec
//!
//! This crate provides the character-level front half of a Hayes/3GPP AT
//! command emulator: a byte-at-a-time line parser and a command-line
//! splitter. It is deliberately free of any I/O so that it can sit behind a
//! serial port, a USB CDC-ACM function, a pseudo-terminal, or a plain in-
//! memory test harness.
//!
//! ## Core Components
//!
//! ### [`LineParser`]
//!
//! A stateful parser fed one byte at a time. It applies the normalization a
//! real modem applies while hunting for commands (7-bit masking, LF folded
//! to CR, DEL treated as backspace), performs in-line editing, tolerates
//! leading garbage before the `AT` prefix, and supports the classic `A/`
//! repeat-last-command shortcut. When a terminator arrives it yields the
//! text that followed `AT`, ready for the splitter.
//!
//! ### [`Segments`]
//!
//! An iterator that decomposes one command line into its elementary
//! commands, honoring the three special syntaxes of V.250: the dial command
//! (`D...` runs to the end of the line), S-parameters (`S3?`, `S0=2`), and
//! extended commands (`+CMEE=2`) whose arguments may contain quoted strings
//! and therefore semicolons that are not separators.
//!
//! ## Usage Example
//!
//! ```rust
//! use atmodem_codec::{LineParser, Segment, Segments};
//!
//! let mut parser = LineParser::new();
//! let mut line = None;
//! for byte in b"ATE1;+CMEE=2\r" {
//!     if let Some(complete) = parser.feed(*byte) {
//!         line = Some(complete);
//!     }
//! }
//! let line = line.expect("terminator seen");
//! let commands: Vec<_> = Segments::new(&line).collect();
//! assert_eq!(
//!     commands,
//!     vec![Segment::Command("E1"), Segment::Command("+CMEE=2")]
//! );
//! ```
//!
//! ## Error Handling
//!
//! The parser never fails: malformed input is either normalized or silently
//! dropped, and an over-long line is discarded wholesale (never truncated
//! into a half command). The splitter signals a malformed elementary
//! command with [`Segment::SyntaxError`], which callers must treat as fatal
//! for the remainder of the line.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(
    clippy::option_if_let_else,
    clippy::module_name_repetitions,
    clippy::missing_errors_doc
)]

pub mod consts;
mod parser;
mod splitter;

pub use self::parser::LineParser;
pub use self::splitter::{Segment, Segments};
