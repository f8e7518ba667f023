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

//! The core command set installed into every bank before any plugin.

use crate::bank::CommandBank;
use crate::context::CommandContext;
use crate::error::RegistryError;
use crate::handler::{BasicCommand, ExtendedCommand};
use async_trait::async_trait;
use atmodem_command::{parse_u32, ResultCode, SettingRequest};
use std::sync::Arc;
use tracing::debug;

pub(crate) fn install(bank: &mut CommandBank) -> Result<(), RegistryError> {
    bank.register_alpha('E', Arc::new(Echo))?;
    bank.register_alpha('Q', Arc::new(Quiet))?;
    bank.register_alpha('V', Arc::new(Verbose))?;
    bank.register_alpha('Z', Arc::new(Reset))?;
    bank.register_alpha('H', Arc::new(Hook))?;
    bank.register_alpha('X', Arc::new(Progress))?;
    bank.register_alpha('I', Arc::new(Identify))?;
    bank.register_ampersand('F', Arc::new(Factory))?;
    bank.register_extended("+CMEE", Arc::new(ErrorReport))?;
    bank.register_extended("+ILRR", Arc::new(RateReport))?;
    Ok(())
}

fn as_switch(value: u32) -> Option<bool> {
    match value {
        0 => Some(false),
        1 => Some(true),
        _ => None,
    }
}

/// `ATE`: command echo on/off.
struct Echo;

#[async_trait]
impl BasicCommand for Echo {
    async fn execute(&self, ctx: &mut CommandContext<'_>, value: u32) -> ResultCode {
        match as_switch(value) {
            Some(on) => {
                ctx.set_echo(on);
                ResultCode::Ok
            }
            None => ResultCode::Error,
        }
    }
}

/// `ATQ`: suppress result codes.
struct Quiet;

#[async_trait]
impl BasicCommand for Quiet {
    async fn execute(&self, ctx: &mut CommandContext<'_>, value: u32) -> ResultCode {
        match as_switch(value) {
            Some(on) => {
                ctx.set_quiet(on);
                ResultCode::Ok
            }
            None => ResultCode::Error,
        }
    }
}

/// `ATV`: verbose text results versus numeric results.
struct Verbose;

#[async_trait]
impl BasicCommand for Verbose {
    async fn execute(&self, ctx: &mut CommandContext<'_>, value: u32) -> ResultCode {
        match as_switch(value) {
            Some(on) => {
                ctx.set_verbose(on);
                ResultCode::Ok
            }
            None => ResultCode::Error,
        }
    }
}

/// `ATZ`: full reset. The registry rebuild happens between command lines;
/// the profile argument is accepted and ignored.
struct Reset;

#[async_trait]
impl BasicCommand for Reset {
    async fn execute(&self, ctx: &mut CommandContext<'_>, _value: u32) -> ResultCode {
        ctx.request_reset();
        ResultCode::Ok
    }
}

/// `ATH`: hook control. There is no carrier to drop in command mode, so
/// this simply succeeds; call teardown is the host's business.
struct Hook;

#[async_trait]
impl BasicCommand for Hook {
    async fn execute(&self, _ctx: &mut CommandContext<'_>, value: u32) -> ResultCode {
        if value == 0 {
            ResultCode::Ok
        } else {
            ResultCode::Error
        }
    }
}

/// `ATX`: call-progress result selection. Accepted for compatibility,
/// has no observable effect here.
struct Progress;

#[async_trait]
impl BasicCommand for Progress {
    async fn execute(&self, _ctx: &mut CommandContext<'_>, value: u32) -> ResultCode {
        if value <= 4 {
            ResultCode::Ok
        } else {
            ResultCode::Error
        }
    }
}

/// `ATI`: identification text.
struct Identify;

#[async_trait]
impl BasicCommand for Identify {
    async fn execute(&self, ctx: &mut CommandContext<'_>, _value: u32) -> ResultCode {
        let identity = ctx.config().identity().to_string();
        match ctx.send_intermediate(&identity).await {
            Ok(()) => ResultCode::Ok,
            Err(error) => {
                debug!(%error, "failed to send identity");
                ResultCode::Error
            }
        }
    }
}

/// `AT&F`: restore the mode defaults without rebuilding the registry.
struct Factory;

#[async_trait]
impl BasicCommand for Factory {
    async fn execute(&self, ctx: &mut CommandContext<'_>, value: u32) -> ResultCode {
        if value != 0 {
            return ResultCode::Error;
        }
        ctx.restore_defaults();
        ResultCode::Ok
    }
}

/// `AT+CMEE`: mobile-equipment error report mode (0 = plain `ERROR`,
/// 1 = numeric `+CME ERROR`, 2 = textual `+CME ERROR`).
struct ErrorReport;

#[async_trait]
impl ExtendedCommand for ErrorReport {
    async fn execute(&self, ctx: &mut CommandContext<'_>, request: &str) -> ResultCode {
        match SettingRequest::parse(request, "+CMEE") {
            Some(SettingRequest::Query) => {
                let line = format!("+CMEE: {}", ctx.error_report_mode());
                report(ctx, &line).await
            }
            Some(SettingRequest::Support) => report(ctx, "+CMEE: (0-2)").await,
            Some(SettingRequest::Set(value)) => match parse_u32(value) {
                Some(mode @ 0..=2) => {
                    #[allow(clippy::cast_possible_truncation)]
                    ctx.set_error_report_mode(mode as u8);
                    ResultCode::Ok
                }
                _ => ResultCode::Error,
            },
            _ => ResultCode::Error,
        }
    }
}

/// `AT+ILRR`: local rate report before `CONNECT` on/off.
struct RateReport;

#[async_trait]
impl ExtendedCommand for RateReport {
    async fn execute(&self, ctx: &mut CommandContext<'_>, request: &str) -> ResultCode {
        match SettingRequest::parse(request, "+ILRR") {
            Some(SettingRequest::Query) => {
                let line = format!("+ILRR: {}", u32::from(ctx.rate_report()));
                report(ctx, &line).await
            }
            Some(SettingRequest::Support) => report(ctx, "+ILRR: (0,1)").await,
            Some(SettingRequest::Set(value)) => match parse_u32(value).and_then(as_switch) {
                Some(on) => {
                    ctx.set_rate_report(on);
                    ResultCode::Ok
                }
                None => ResultCode::Error,
            },
            _ => ResultCode::Error,
        }
    }
}

async fn report(ctx: &mut CommandContext<'_>, line: &str) -> ResultCode {
    match ctx.send_intermediate(line).await {
        Ok(()) => ResultCode::Ok,
        Err(error) => {
            debug!(%error, "failed to send information text");
            ResultCode::Error
        }
    }
}
