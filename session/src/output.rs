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

//! The shared output path toward the DTE.
//!
//! All text toward the terminal goes through one [`OutputChannel`] so that
//! a complete framed response is always written under a single lock
//! acquisition and can never interleave with another writer, including the
//! background tasks that emit `RING` or other unsolicited lines.
//!
//! The mode bits that affect formatting (`verbose`, `quiet`) and the
//! data-mode gate are mirrored here as atomics, because unsolicited
//! writers do not hold the session state. While the data pump owns the
//! descriptors, every text write is rejected with
//! [`EmulatorError::DataMode`].

use crate::error::{EmulatorError, Result};
use atmodem_command::{cme, ResultCode};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::io::{AsyncWrite, AsyncWriteExt};
use tokio::sync::{Mutex, MutexGuard};
use tracing::warn;

/// The boxed DTE write half guarded by the output lock.
pub(crate) type DteWriter = Box<dyn AsyncWrite + Send + Unpin>;

/// Serialized, mode-aware writer for everything the emulator sends in
/// command mode.
pub struct OutputChannel {
    writer: Mutex<DteWriter>,
    data_mode: AtomicBool,
    verbose: AtomicBool,
    quiet: AtomicBool,
}

impl OutputChannel {
    /// Wraps the DTE write half with the default mode bits (verbose on,
    /// quiet off).
    pub(crate) fn new(writer: DteWriter) -> Arc<Self> {
        Arc::new(Self {
            writer: Mutex::new(writer),
            data_mode: AtomicBool::new(false),
            verbose: AtomicBool::new(true),
            quiet: AtomicBool::new(false),
        })
    }

    /// Whether the session is currently relaying raw bytes in data mode.
    #[must_use]
    pub fn is_data_mode(&self) -> bool {
        self.data_mode.load(Ordering::Acquire)
    }

    pub(crate) fn set_data_mode(&self, on: bool) {
        self.data_mode.store(on, Ordering::Release);
    }

    pub(crate) fn set_verbose(&self, on: bool) {
        self.verbose.store(on, Ordering::Release);
    }

    pub(crate) fn set_quiet(&self, on: bool) {
        self.quiet.store(on, Ordering::Release);
    }

    /// Takes the writer lock for exclusive use; the data pump holds this
    /// for its whole lifetime.
    pub(crate) async fn writer_lock(&self) -> MutexGuard<'_, DteWriter> {
        self.writer.lock().await
    }

    fn guard_command_mode(&self) -> Result<()> {
        if self.is_data_mode() {
            warn!("text write rejected while the session is in data mode");
            return Err(EmulatorError::DataMode);
        }
        Ok(())
    }

    /// One whole frame per lock acquisition.
    async fn write_frame(&self, frame: &[u8]) -> Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(frame).await?;
        writer.flush().await?;
        Ok(())
    }

    /// Reflects raw received bytes back to the terminal (command echo).
    pub(crate) async fn echo(&self, bytes: &[u8]) -> Result<()> {
        self.write_frame(bytes).await
    }

    /// Sends one line of information text (an intermediate response such
    /// as `+ILRR: 115200` or an `ATI` identity line).
    pub(crate) async fn intermediate(&self, text: &str) -> Result<()> {
        self.guard_command_mode()?;
        let frame = if self.verbose.load(Ordering::Acquire) {
            format!("\r\n{text}\r\n")
        } else {
            format!("{text}\r\n")
        };
        self.write_frame(frame.as_bytes()).await
    }

    /// Sends one line of unsolicited information text. Safe to call from
    /// background tasks; fails while the data pump owns the descriptors.
    pub async fn unsolicited(&self, text: &str) -> Result<()> {
        self.intermediate(text).await
    }

    /// Writes pre-formatted bytes with no framing, for handlers that emit
    /// binary or multi-line payloads themselves. Rejected in data mode.
    pub(crate) async fn raw(&self, bytes: &[u8]) -> Result<()> {
        self.guard_command_mode()?;
        self.write_frame(bytes).await
    }

    /// Announces an incoming call. Suppressed by quiet mode, rejected in
    /// data mode.
    pub async fn ring(&self) -> Result<()> {
        self.guard_command_mode()?;
        if self.quiet.load(Ordering::Acquire) {
            return Ok(());
        }
        self.write_frame(self.frame_result(ResultCode::Ring.text(), ResultCode::Ring.numeric()).as_bytes())
            .await
    }

    /// Sends the `+ILRR` rate report that precedes `CONNECT` when rate
    /// reporting is enabled.
    pub(crate) async fn rate_report(&self, rate: u32) -> Result<()> {
        self.intermediate(&format!("+ILRR: {rate}")).await
    }

    /// Sends the final result for one command line, honoring the quiet,
    /// verbose, and error-report modes.
    ///
    /// `error_mode` is the `+CMEE` setting: 0 collapses CME errors to the
    /// basic `ERROR`, 1 reports the numeric code, 2 the textual
    /// description. CMS errors always report numerically.
    pub(crate) async fn final_result(&self, code: ResultCode, error_mode: u8) -> Result<()> {
        self.guard_command_mode()?;
        if self.quiet.load(Ordering::Acquire) {
            return Ok(());
        }
        let frame = match code {
            ResultCode::Cme(errno) if error_mode == 1 => {
                self.frame_extended(&format!("+CME ERROR: {errno}"))
            }
            ResultCode::Cme(errno) if error_mode == 2 => {
                self.frame_extended(&format!("+CME ERROR: {}", cme::text(errno)))
            }
            ResultCode::Cms(errno) => self.frame_extended(&format!("+CMS ERROR: {errno}")),
            code => self.frame_result(code.text(), code.numeric()),
        };
        self.write_frame(frame.as_bytes()).await
    }

    /// Frames a basic result: text form when verbose, numeric index
    /// otherwise.
    fn frame_result(&self, text: &str, numeric: u16) -> String {
        if self.verbose.load(Ordering::Acquire) {
            format!("\r\n{text}\r\n")
        } else {
            format!("{numeric}\r")
        }
    }

    /// Frames an extended error line, which keeps its text in both modes
    /// and only changes the surrounding delimiters.
    fn frame_extended(&self, line: &str) -> String {
        if self.verbose.load(Ordering::Acquire) {
            format!("\r\n{line}\r\n")
        } else {
            format!("{line}\r")
        }
    }
}

impl std::fmt::Debug for OutputChannel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OutputChannel")
            .field("data_mode", &self.is_data_mode())
            .field("verbose", &self.verbose.load(Ordering::Relaxed))
            .field("quiet", &self.quiet.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
