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

/// The standard sub-forms of an extended AT command request.
///
/// Most extended-command handlers implement the same four shapes that
/// V.250 defines for `+NAME`-style commands; this helper classifies one
/// request string into them so every handler does not reinvent the
/// trailing-token parsing:
///
/// - `+NAME?` → [`Query`](SettingRequest::Query)
/// - `+NAME=?` → [`Support`](SettingRequest::Support)
/// - `+NAME=<value>` → [`Set`](SettingRequest::Set)
/// - `+NAME` → [`Execute`](SettingRequest::Execute)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SettingRequest<'a> {
    /// Read the current value (`?`).
    Query,
    /// Report the supported values (`=?`).
    Support,
    /// Assign a value (`=<value>`); the raw value text is untouched so the
    /// handler can parse lists, strings, and ranges itself.
    Set(&'a str),
    /// The bare form, which performs the command's default action.
    Execute,
}

impl<'a> SettingRequest<'a> {
    /// Classifies `request` (the full elementary command as dispatched)
    /// against the registered `name` it matched.
    ///
    /// Returns `None` when the trailing token is none of the four defined
    /// shapes, which callers must surface as a syntax error. The name
    /// comparison is case-insensitive, matching dispatch.
    #[must_use]
    pub fn parse(request: &'a str, name: &str) -> Option<SettingRequest<'a>> {
        if request.len() < name.len()
            || !request[..name.len()].eq_ignore_ascii_case(name)
        {
            return None;
        }
        let rest = &request[name.len()..];
        match rest {
            "" => Some(SettingRequest::Execute),
            "?" => Some(SettingRequest::Query),
            "=?" => Some(SettingRequest::Support),
            _ => rest.strip_prefix('=').map(SettingRequest::Set),
        }
    }
}

/// Parses the strict decimal form used by numeric setting values.
///
/// Sign prefixes, surrounding whitespace, and overlong digit runs are all
/// rejected; numeric settings take bare digit runs only.
#[must_use]
pub fn parse_u32(value: &str) -> Option<u32> {
    if value.is_empty() || !value.bytes().all(|byte| byte.is_ascii_digit()) {
        return None;
    }
    value.parse().ok()
}
