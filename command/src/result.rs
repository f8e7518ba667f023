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

/// The outcome of one elementary AT command.
///
/// The first eight variants are the classic Hayes/V.250 basic result codes
/// with their historical numeric values (note the gap at 5). [`Cme`] and
/// [`Cms`] carry the structured 3GPP error subspaces; how they render
/// depends on the session's error-report mode, which is the formatter's
/// business, not the handler's.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResultCode {
    /// Command executed successfully.
    Ok,
    /// A data connection has been established.
    Connect,
    /// Incoming ring indication.
    Ring,
    /// The connection terminated (also the standard reply after leaving
    /// data mode).
    NoCarrier,
    /// Generic failure; also the collapse target for structured errors
    /// when extended reporting is off.
    Error,
    /// No dial tone detected.
    NoDialtone,
    /// The remote end is busy.
    Busy,
    /// The remote end did not answer.
    NoAnswer,
    /// A mobile-equipment error (3GPP TS 27.007 `+CME ERROR`).
    Cme(u16),
    /// A message-service error (3GPP TS 27.005 `+CMS ERROR`).
    Cms(u16),
}

impl ResultCode {
    /// The bare numeric form printed when verbose mode is off. Structured
    /// errors collapse to the generic `ERROR` value here; their numeric
    /// detail travels in the `+CME ERROR`/`+CMS ERROR` line instead.
    #[must_use]
    pub const fn numeric(self) -> u16 {
        match self {
            ResultCode::Ok => 0,
            ResultCode::Connect => 1,
            ResultCode::Ring => 2,
            ResultCode::NoCarrier => 3,
            ResultCode::Error | ResultCode::Cme(_) | ResultCode::Cms(_) => 4,
            ResultCode::NoDialtone => 6,
            ResultCode::Busy => 7,
            ResultCode::NoAnswer => 8,
        }
    }

    /// The verbose textual form of the basic result set. Structured errors
    /// yield `ERROR`; the formatter substitutes the extended line when the
    /// error-report mode asks for it.
    #[must_use]
    pub const fn text(self) -> &'static str {
        match self {
            ResultCode::Ok => "OK",
            ResultCode::Connect => "CONNECT",
            ResultCode::Ring => "RING",
            ResultCode::NoCarrier => "NO CARRIER",
            ResultCode::Error | ResultCode::Cme(_) | ResultCode::Cms(_) => "ERROR",
            ResultCode::NoDialtone => "NO DIALTONE",
            ResultCode::Busy => "BUSY",
            ResultCode::NoAnswer => "NO ANSWER",
        }
    }

    /// Whether this code allows the rest of the command line to run.
    #[must_use]
    pub const fn is_ok(self) -> bool {
        matches!(self, ResultCode::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numeric_values_match_v250() {
        assert_eq!(ResultCode::Ok.numeric(), 0);
        assert_eq!(ResultCode::Connect.numeric(), 1);
        assert_eq!(ResultCode::Ring.numeric(), 2);
        assert_eq!(ResultCode::NoCarrier.numeric(), 3);
        assert_eq!(ResultCode::Error.numeric(), 4);
        assert_eq!(ResultCode::NoDialtone.numeric(), 6);
        assert_eq!(ResultCode::Busy.numeric(), 7);
        assert_eq!(ResultCode::NoAnswer.numeric(), 8);
    }

    #[test]
    fn structured_errors_collapse_to_generic_error() {
        assert_eq!(ResultCode::Cme(4).numeric(), 4);
        assert_eq!(ResultCode::Cms(500).numeric(), 4);
        assert_eq!(ResultCode::Cme(4).text(), "ERROR");
    }
}
