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

//! Mobile-equipment error codes (3GPP TS 27.007 §9.2) and their textual
//! descriptions, used when the error-report mode asks for `+CME ERROR`
//! lines in textual form.

/// Phone failure.
pub const PHONE_FAILURE: u16 = 0;
/// No connection to phone.
pub const NO_CONNECTION: u16 = 1;
/// Operation not allowed.
pub const NOT_ALLOWED: u16 = 3;
/// Operation not supported.
pub const NOT_SUPPORTED: u16 = 4;
/// SIM not inserted.
pub const SIM_NOT_INSERTED: u16 = 10;
/// SIM PIN required.
pub const SIM_PIN_REQUIRED: u16 = 11;
/// SIM busy.
pub const SIM_BUSY: u16 = 14;
/// Incorrect password.
pub const INCORRECT_PASSWORD: u16 = 16;
/// Memory full.
pub const MEMORY_FULL: u16 = 20;
/// Invalid index.
pub const INVALID_INDEX: u16 = 21;
/// Not found.
pub const NOT_FOUND: u16 = 22;
/// Text string too long.
pub const TEXT_TOO_LONG: u16 = 24;
/// Invalid characters in dial string.
pub const INVALID_DIAL_CHARACTERS: u16 = 27;
/// No network service.
pub const NO_NETWORK_SERVICE: u16 = 30;
/// Network timeout.
pub const NETWORK_TIMEOUT: u16 = 31;
/// Unknown error.
pub const UNKNOWN: u16 = 100;

/// Returns the 27.007 description for a CME error code, falling back to
/// `"reserved error code"` for codes without a defined text.
#[must_use]
pub const fn text(code: u16) -> &'static str {
    match code {
        0 => "phone failure",
        1 => "no connection to phone",
        2 => "phone-adaptor link reserved",
        3 => "operation not allowed",
        4 => "operation not supported",
        5 => "PH-SIM PIN required",
        6 => "PH-FSIM PIN required",
        7 => "PH-FSIM PUK required",
        10 => "SIM not inserted",
        11 => "SIM PIN required",
        12 => "SIM PUK required",
        13 => "SIM failure",
        14 => "SIM busy",
        15 => "SIM wrong",
        16 => "incorrect password",
        17 => "SIM PIN2 required",
        18 => "SIM PUK2 required",
        20 => "memory full",
        21 => "invalid index",
        22 => "not found",
        23 => "memory failure",
        24 => "text string too long",
        25 => "invalid characters in text string",
        26 => "dial string too long",
        27 => "invalid characters in dial string",
        30 => "no network service",
        31 => "network timeout",
        32 => "network not allowed - emergency calls only",
        40 => "network personalization PIN required",
        41 => "network personalization PUK required",
        42 => "network subset personalization PIN required",
        43 => "network subset personalization PUK required",
        44 => "service provider personalization PIN required",
        45 => "service provider personalization PUK required",
        46 => "corporate personalization PIN required",
        47 => "corporate personalization PUK required",
        100 => "unknown",
        _ => "reserved error code",
    }
}
