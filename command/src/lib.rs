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

//! # AT Command Vocabulary
//!
//! The shared vocabulary of an AT command emulator: the result codes a
//! handler can return (the classic V.250 basic set plus the structured
//! CME/CMS error subspaces of 3GPP TS 27.007 / 27.005), the textual CME
//! descriptions, and the small [`SettingRequest`] helper that extended
//! command handlers use to implement the standard get/set/test trio.
//!
//! This crate carries no I/O and no async machinery; it is consumed by
//! both the codec layer's tests and the session layer's dispatcher.

#![warn(
    clippy::cargo,
    missing_docs,
    clippy::pedantic,
    future_incompatible,
    rust_2018_idioms
)]
#![allow(clippy::module_name_repetitions, clippy::missing_errors_doc)]

pub mod cme;
mod result;
mod setting;

pub use self::result::ResultCode;
pub use self::setting::{parse_u32, SettingRequest};
