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

//! # AT Command Session
//!
//! This crate is the back half of a Hayes/3GPP AT command emulator: given
//! any `AsyncRead`/`AsyncWrite` pair toward a terminal, it runs a full
//! modem session over it. Command parsing is delegated to
//! [`atmodem_codec`]; this crate supplies the command registry, the
//! built-in V.250 command set, the session state machine, the result
//! formatter, and the data-mode byte pump with the `+++` escape.
//!
//! ## Core Components
//!
//! ### [`ModemEmulator`] / [`EmulatorHandle`]
//!
//! [`ModemEmulator::start`] spawns the session reader task and returns a
//! handle that can stop the session or emit unsolicited lines (`RING`)
//! from the outside.
//!
//! ### [`CommandBank`] and the handler traits
//!
//! Commands live in a per-session registry, keyed the way V.250 keys
//! them: single letters, `&`-prefixed letters, the dial command,
//! S-registers, and named extended commands. Hosts add commands by
//! implementing [`BasicCommand`], [`DialCommand`], [`SParameter`], or
//! [`ExtendedCommand`] and bundling them into a [`Plugin`].
//!
//! ### [`CommandContext`]
//!
//! Handlers receive a context that exposes the session to them: sending
//! information text, flipping modes, reading free-form message text, and
//! entering data mode over a second stream via
//! [`CommandContext::connect`].
//!
//! ## Usage Example
//!
//! ```rust,no_run
//! use atmodem_session::{EmulatorConfig, ModemEmulator, PluginSet};
//!
//! # async fn demo() -> atmodem_session::Result<()> {
//! let (terminal, modem) = tokio::io::duplex(4096);
//! # let _ = terminal;
//! let (reader, writer) = tokio::io::split(modem);
//! let handle = ModemEmulator::start(
//!     reader,
//!     writer,
//!     PluginSet::new(),
//!     EmulatorConfig::default().with_identity("example modem"),
//!     None,
//! )?;
//! // ... drive the terminal end ...
//! handle.stop().await;
//! # Ok(())
//! # }
//! ```
//!
//! ## Error Handling
//!
//! Command outcomes are [`ResultCode`]s, formatted for the terminal by
//! the session; they are never `Err`. [`EmulatorError`] is reserved for
//! the session's own problems: descriptor I/O, writes attempted during
//! data mode, and handler registration conflicts.

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
    clippy::missing_errors_doc,
    clippy::multiple_crate_versions
)]

mod bank;
mod builtin;
mod config;
mod context;
mod error;
mod handler;
mod output;
mod plugin;
mod pump;
mod session;

pub use self::bank::{CommandBank, MAX_EXTENDED_NAME_LENGTH, MAX_S_PARAMETER};
pub use self::config::EmulatorConfig;
pub use self::context::CommandContext;
pub use self::error::{EmulatorError, RegistryError, Result};
pub use self::handler::{BasicCommand, DialCommand, ExtendedCommand, SParameter};
pub use self::output::OutputChannel;
pub use self::plugin::{Plugin, PluginSet};
pub use self::session::{EmulatorHandle, HangupCallback, ModemEmulator};

pub use atmodem_command::{cme, parse_u32, ResultCode, SettingRequest};
