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

//! Handler traits for the five command categories.
//!
//! Handlers report their outcome as a [`ResultCode`]; returning an `Err`
//! is not part of the contract. A handler that needs to touch the session
//! (send intermediate lines, change modes, enter data mode, read free-form
//! text) does so through the [`CommandContext`] it receives.

use crate::context::CommandContext;
use async_trait::async_trait;
use atmodem_command::ResultCode;

/// A basic command: a single letter (`ATE1`) or an ampersand-prefixed
/// letter (`AT&F`), carrying an optional decimal argument that defaults
/// to zero.
#[async_trait]
pub trait BasicCommand: Send + Sync {
    /// Executes the command with its decoded numeric argument.
    async fn execute(&self, ctx: &mut CommandContext<'_>, value: u32) -> ResultCode;
}

/// The dial command `D`, which consumes the rest of the command line
/// verbatim as its dial string.
#[async_trait]
pub trait DialCommand: Send + Sync {
    /// Dials `number`; a successful data call typically runs
    /// [`CommandContext::connect`] and returns
    /// [`ResultCode::NoCarrier`](atmodem_command::ResultCode::NoCarrier)
    /// once the call ends.
    async fn dial(&self, ctx: &mut CommandContext<'_>, number: &str) -> ResultCode;
}

/// One S-register, addressed as `ATS<index>?` / `ATS<index>=<value>`.
#[async_trait]
pub trait SParameter: Send + Sync {
    /// The current value, or `None` when the register cannot be read.
    async fn get(&self, ctx: &mut CommandContext<'_>) -> Option<u32>;

    /// Stores a new value.
    async fn set(&self, ctx: &mut CommandContext<'_>, value: u32) -> ResultCode;
}

/// An extended command (`AT+NAME...`). The handler receives the entire
/// elementary command text, name included; [`SettingRequest::parse`]
/// classifies the standard get/set/test forms.
///
/// [`SettingRequest::parse`]: atmodem_command::SettingRequest::parse
#[async_trait]
pub trait ExtendedCommand: Send + Sync {
    /// Executes the command given the full request text.
    async fn execute(&self, ctx: &mut CommandContext<'_>, request: &str) -> ResultCode;
}
