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

//! The command registry and dispatcher.
//!
//! A bank holds the handlers for the five command categories: basic alpha
//! commands, ampersand commands, the dial command, S-registers, and named
//! extended commands. Registration is first-come-first-served; a
//! duplicate fails loudly and leaves the original handler in place.
//!
//! Dispatch never fails the session. Unknown and malformed commands come
//! back as [`ResultCode::Error`] and are logged at debug level.

use crate::context::CommandContext;
use crate::error::RegistryError;
use crate::handler::{BasicCommand, DialCommand, ExtendedCommand, SParameter};
use atmodem_command::ResultCode;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

/// Highest addressable S-register index.
pub const MAX_S_PARAMETER: u32 = 25;

/// Longest accepted extended command name, prefix character included.
pub const MAX_EXTENDED_NAME_LENGTH: usize = 19;

/// Prefix characters accepted for extended command names. V.250 defines a
/// wider set; these are the ones seen in practice.
const EXTENDED_PREFIXES: &[u8] = b"+*@^#$%";

const ALPHA_SLOTS: usize = 26;

fn letter_slot(letter: char) -> Result<usize, RegistryError> {
    let upper = letter.to_ascii_uppercase();
    if !upper.is_ascii_uppercase() {
        return Err(RegistryError::InvalidLetter(letter));
    }
    Ok((upper as u8 - b'A') as usize)
}

/// Handler registry for one modem session.
pub struct CommandBank {
    alpha: [Option<Arc<dyn BasicCommand>>; ALPHA_SLOTS],
    ampersand: [Option<Arc<dyn BasicCommand>>; ALPHA_SLOTS],
    dial: Option<Arc<dyn DialCommand>>,
    registers: Vec<Option<Arc<dyn SParameter>>>,
    extended: BTreeMap<String, Arc<dyn ExtendedCommand>>,
    prefixes: BTreeMap<String, Arc<dyn ExtendedCommand>>,
}

impl CommandBank {
    /// Creates an empty bank.
    #[must_use]
    pub fn new() -> Self {
        Self {
            alpha: std::array::from_fn(|_| None),
            ampersand: std::array::from_fn(|_| None),
            dial: None,
            registers: (0..=MAX_S_PARAMETER).map(|_| None).collect(),
            extended: BTreeMap::new(),
            prefixes: BTreeMap::new(),
        }
    }

    /// Registers a basic alpha command. `D` and `S` carry dedicated
    /// grammar and are rejected as reserved.
    pub fn register_alpha(
        &mut self,
        letter: char,
        handler: Arc<dyn BasicCommand>,
    ) -> Result<(), RegistryError> {
        let slot = letter_slot(letter)?;
        if matches!(letter.to_ascii_uppercase(), 'D' | 'S') {
            return Err(RegistryError::ReservedLetter(letter));
        }
        if self.alpha[slot].is_some() {
            return Err(RegistryError::Duplicate(
                letter.to_ascii_uppercase().to_string(),
            ));
        }
        self.alpha[slot] = Some(handler);
        Ok(())
    }

    /// Registers an ampersand command (`AT&<letter>`).
    pub fn register_ampersand(
        &mut self,
        letter: char,
        handler: Arc<dyn BasicCommand>,
    ) -> Result<(), RegistryError> {
        let slot = letter_slot(letter)?;
        if self.ampersand[slot].is_some() {
            return Err(RegistryError::Duplicate(format!(
                "&{}",
                letter.to_ascii_uppercase()
            )));
        }
        self.ampersand[slot] = Some(handler);
        Ok(())
    }

    /// Registers the dial command handler.
    pub fn register_dial(&mut self, handler: Arc<dyn DialCommand>) -> Result<(), RegistryError> {
        if self.dial.is_some() {
            return Err(RegistryError::Duplicate(String::from("D")));
        }
        self.dial = Some(handler);
        Ok(())
    }

    /// Registers an S-register at `index`.
    pub fn register_s_parameter(
        &mut self,
        index: u32,
        handler: Arc<dyn SParameter>,
    ) -> Result<(), RegistryError> {
        if index > MAX_S_PARAMETER {
            return Err(RegistryError::SParameterRange(index));
        }
        let slot = &mut self.registers[index as usize];
        if slot.is_some() {
            return Err(RegistryError::Duplicate(format!("S{index}")));
        }
        *slot = Some(handler);
        Ok(())
    }

    /// Registers an extended command under `name` (prefix character
    /// included, e.g. `"+CMEE"`). Matching at dispatch time is
    /// case-insensitive.
    pub fn register_extended(
        &mut self,
        name: &str,
        handler: Arc<dyn ExtendedCommand>,
    ) -> Result<(), RegistryError> {
        if !Self::valid_extended_name(name) {
            return Err(RegistryError::InvalidName(name.to_string()));
        }
        let key = name.to_ascii_uppercase();
        if self.extended.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        self.extended.insert(key, handler);
        Ok(())
    }

    /// Registers a wildcard handler for every extended command starting
    /// with `prefix`, with no word-boundary requirement. Exact names win
    /// over wildcards at dispatch time; among wildcards the longest
    /// matching prefix wins.
    pub fn register_extended_prefix(
        &mut self,
        prefix: &str,
        handler: Arc<dyn ExtendedCommand>,
    ) -> Result<(), RegistryError> {
        if !Self::valid_extended_name(prefix) {
            return Err(RegistryError::InvalidName(prefix.to_string()));
        }
        let key = prefix.to_ascii_uppercase();
        if self.prefixes.contains_key(&key) {
            return Err(RegistryError::Duplicate(key));
        }
        self.prefixes.insert(key, handler);
        Ok(())
    }

    fn valid_extended_name(name: &str) -> bool {
        let bytes = name.as_bytes();
        if bytes.len() < 2 || bytes.len() > MAX_EXTENDED_NAME_LENGTH {
            return false;
        }
        EXTENDED_PREFIXES.contains(&bytes[0])
            && bytes[1..].iter().all(u8::is_ascii_alphanumeric)
    }

    /// Finds the extended handler for a request: the longest registered
    /// name that is a prefix of the request and ends on a word boundary
    /// (the following character, if any, is not alphanumeric). `+CR`
    /// never claims `+CRC=1`.
    fn lookup_extended(&self, request: &str) -> Option<&Arc<dyn ExtendedCommand>> {
        let upper = request.to_ascii_uppercase();
        let mut best: Option<(&str, &Arc<dyn ExtendedCommand>)> = None;
        for (name, handler) in &self.extended {
            if !upper.starts_with(name.as_str()) {
                continue;
            }
            let boundary = upper.as_bytes().get(name.len());
            if boundary.is_some_and(u8::is_ascii_alphanumeric) {
                continue;
            }
            if best.map_or(true, |(previous, _)| name.len() > previous.len()) {
                best = Some((name, handler));
            }
        }
        if best.is_none() {
            // Wildcard prefixes are the fallback; no boundary required.
            for (name, handler) in &self.prefixes {
                if !upper.starts_with(name.as_str()) {
                    continue;
                }
                if best.map_or(true, |(previous, _)| name.len() > previous.len()) {
                    best = Some((name, handler));
                }
            }
        }
        best.map(|(_, handler)| handler)
    }

    /// Dispatches one elementary command, as produced by the splitter.
    pub async fn execute(&self, ctx: &mut CommandContext<'_>, command: &str) -> ResultCode {
        let Some(first) = command.bytes().next() else {
            return ResultCode::Ok;
        };
        match first.to_ascii_uppercase() {
            b'D' => self.execute_dial(ctx, &command[1..]).await,
            b'S' => self.execute_s_parameter(ctx, &command[1..]).await,
            b'&' => self.execute_ampersand(ctx, &command[1..]).await,
            prefix if EXTENDED_PREFIXES.contains(&prefix) => {
                self.execute_extended(ctx, command).await
            }
            letter if letter.is_ascii_alphabetic() => {
                self.execute_alpha(ctx, letter, &command[1..]).await
            }
            _ => {
                debug!(command, "unrecognized command form");
                ResultCode::Error
            }
        }
    }

    async fn execute_dial(&self, ctx: &mut CommandContext<'_>, number: &str) -> ResultCode {
        match &self.dial {
            Some(handler) => handler.dial(ctx, number).await,
            None => {
                debug!("no dial handler registered");
                ResultCode::Error
            }
        }
    }

    async fn execute_alpha(
        &self,
        ctx: &mut CommandContext<'_>,
        letter: u8,
        argument: &str,
    ) -> ResultCode {
        let slot = (letter.to_ascii_uppercase() - b'A') as usize;
        let Some(handler) = &self.alpha[slot] else {
            debug!(letter = %char::from(letter), "unknown command");
            return ResultCode::Error;
        };
        let Some(value) = parse_argument(argument) else {
            return ResultCode::Error;
        };
        handler.execute(ctx, value).await
    }

    async fn execute_ampersand(&self, ctx: &mut CommandContext<'_>, body: &str) -> ResultCode {
        let Some(letter) = body.bytes().next().filter(u8::is_ascii_alphabetic) else {
            debug!(body, "malformed ampersand command");
            return ResultCode::Error;
        };
        let slot = (letter.to_ascii_uppercase() - b'A') as usize;
        let Some(handler) = &self.ampersand[slot] else {
            debug!(letter = %char::from(letter), "unknown ampersand command");
            return ResultCode::Error;
        };
        let Some(value) = parse_argument(&body[1..]) else {
            return ResultCode::Error;
        };
        handler.execute(ctx, value).await
    }

    async fn execute_s_parameter(&self, ctx: &mut CommandContext<'_>, body: &str) -> ResultCode {
        let Some((index, request)) = parse_s_request(body) else {
            debug!(body, "malformed S-parameter command");
            return ResultCode::Error;
        };
        let handler = match self.registers.get(index as usize) {
            Some(Some(handler)) => handler,
            _ => {
                debug!(index, "unknown S-parameter");
                return ResultCode::Error;
            }
        };
        match request {
            SRequest::Get => match handler.get(ctx).await {
                Some(value) => {
                    if let Err(error) = ctx.send_intermediate(&format!("{value:03}")).await {
                        debug!(%error, "failed to report S-parameter value");
                        return ResultCode::Error;
                    }
                    ResultCode::Ok
                }
                None => ResultCode::Error,
            },
            SRequest::Set(value) => handler.set(ctx, value).await,
        }
    }

    async fn execute_extended(&self, ctx: &mut CommandContext<'_>, request: &str) -> ResultCode {
        match self.lookup_extended(request) {
            Some(handler) => handler.execute(ctx, request).await,
            None => {
                debug!(request, "unknown extended command");
                ResultCode::Error
            }
        }
    }
}

impl Default for CommandBank {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for CommandBank {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandBank")
            .field("alpha", &self.alpha.iter().filter(|slot| slot.is_some()).count())
            .field(
                "ampersand",
                &self.ampersand.iter().filter(|slot| slot.is_some()).count(),
            )
            .field("dial", &self.dial.is_some())
            .field(
                "registers",
                &self.registers.iter().filter(|slot| slot.is_some()).count(),
            )
            .field("extended", &self.extended.len())
            .field("prefixes", &self.prefixes.len())
            .finish()
    }
}

/// Decodes the decimal argument of a basic command. An absent argument
/// means zero; anything non-numeric (the splitter should not produce it)
/// or out of `u32` range is malformed.
fn parse_argument(text: &str) -> Option<u32> {
    if text.is_empty() {
        return Some(0);
    }
    atmodem_command::parse_u32(text)
}

enum SRequest {
    Get,
    Set(u32),
}

/// Decodes the body of an S-parameter command (everything after the `S`),
/// tolerating the spaces the splitter preserved: `3?`, ` 12 = 255`.
fn parse_s_request(body: &str) -> Option<(u32, SRequest)> {
    let body = body.trim_start_matches(' ');
    let digits = body.len() - body.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    if digits == 0 {
        return None;
    }
    let index: u32 = body[..digits].parse().ok()?;
    let rest = body[digits..].trim_start_matches(' ');
    if rest == "?" {
        return Some((index, SRequest::Get));
    }
    let value_text = rest.strip_prefix('=')?.trim_start_matches(' ');
    let value = atmodem_command::parse_u32(value_text)?;
    Some((index, SRequest::Set(value)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn s_request_grammar_tolerates_spaces() {
        assert!(matches!(parse_s_request("3?"), Some((3, SRequest::Get))));
        assert!(matches!(
            parse_s_request(" 12 = 255"),
            Some((12, SRequest::Set(255)))
        ));
        assert!(parse_s_request("3").is_none());
        assert!(parse_s_request("?").is_none());
        assert!(parse_s_request("3=").is_none());
    }

    #[test]
    fn extended_names_are_validated() {
        assert!(CommandBank::valid_extended_name("+CMEE"));
        assert!(CommandBank::valid_extended_name("#XYZ1"));
        assert!(!CommandBank::valid_extended_name("+"));
        assert!(!CommandBank::valid_extended_name("CMEE"));
        assert!(!CommandBank::valid_extended_name("+CM EE"));
        assert!(!CommandBank::valid_extended_name(
            "+AAAAAAAAAAAAAAAAAAAAAAAA"
        ));
    }

    #[test]
    fn basic_arguments_default_to_zero() {
        assert_eq!(parse_argument(""), Some(0));
        assert_eq!(parse_argument("1"), Some(1));
        assert_eq!(parse_argument("007"), Some(7));
        assert_eq!(parse_argument("99999999999"), None);
    }
}
