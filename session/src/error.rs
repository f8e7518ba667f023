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

//! Error types for the emulator session layer.
//!
//! Command failures are *not* errors here: a handler reports those through
//! [`ResultCode`](atmodem_command::ResultCode) and the session keeps
//! running. `EmulatorError` covers the conditions that affect the session
//! itself: I/O failure on a descriptor, misuse of the output path while
//! the data pump owns it, and configuration-time registration problems.

use thiserror::Error;

/// Result type for session operations.
pub type Result<T> = std::result::Result<T, EmulatorError>;

/// Session-level error conditions.
#[derive(Debug, Error)]
pub enum EmulatorError {
    /// I/O error on the DTE descriptor; the reader treats this as an
    /// implicit hang-up.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A text write was attempted while the session is relaying raw bytes
    /// in data mode.
    #[error("session is in data mode")]
    DataMode,

    /// The session has been stopped and can no longer perform I/O.
    #[error("session has been stopped")]
    Stopped,

    /// A plugin failed to register its commands.
    #[error("registration failed: {0}")]
    Registry(#[from] RegistryError),
}

/// Configuration-time errors raised while installing command handlers.
///
/// These are fatal to the registration of the offending plugin, never to
/// the session: a duplicate must abort loading rather than silently
/// override an earlier handler.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// The slot or name is already claimed by an earlier registration.
    #[error("a handler is already registered for {0:?}")]
    Duplicate(String),

    /// `D` and `S` have dedicated grammar and cannot carry alpha handlers.
    #[error("command letter {0:?} is reserved")]
    ReservedLetter(char),

    /// The letter is outside `A`–`Z`.
    #[error("{0:?} is not a valid command letter")]
    InvalidLetter(char),

    /// The S-parameter index exceeds the supported table.
    #[error("S-parameter index {0} is out of range")]
    SParameterRange(u32),

    /// The extended command name is empty, too long, or uses characters
    /// outside the extended-command alphabet.
    #[error("invalid extended command name {0:?}")]
    InvalidName(String),
}
