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

//! Protocol constants shared by the parser, the splitter, and the session
//! layer built on top of them.

/// Carriage return, the canonical command-line terminator (S3 default).
pub const CR: u8 = 0x0D;

/// Line feed; folded to [`CR`] on input to tolerate terminals that send
/// `\n` instead of `\r`.
pub const LF: u8 = 0x0A;

/// Backspace, erases the last pending byte of the line being edited.
pub const BS: u8 = 0x08;

/// Delete; behaves exactly like [`BS`].
pub const DEL: u8 = 0x7F;

/// Ctrl+Z, terminates free-form text entry (message body style input).
pub const SUB: u8 = 0x1A;

/// Escape, cancels free-form text entry.
pub const ESC: u8 = 0x1B;

/// Maximum accepted command-line length in bytes, measured after the `AT`
/// prefix normalization. A line that grows past this is dropped wholesale
/// at its terminator; no partial command is ever executed.
pub const MAX_LINE_LENGTH: usize = 1024;
