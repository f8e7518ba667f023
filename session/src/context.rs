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

//! The per-dispatch view of the session that handlers operate on.

use crate::bank::CommandBank;
use crate::config::EmulatorConfig;
use crate::error::{EmulatorError, Result};
use crate::output::OutputChannel;
use crate::pump::{self, PumpEnd};
use crate::session::SessionState;
use atmodem_codec::consts;
use atmodem_command::ResultCode;
use bytes::{Buf, BytesMut};
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio_util::sync::CancellationToken;
use tracing::{debug, trace};

/// The boxed DTE read half.
pub(crate) type DteReadHalf = Box<dyn AsyncRead + Send + Unpin>;

/// Buffered byte source over the DTE read half.
///
/// The session consumes one byte at a time in command mode; the buffer
/// keeps descriptor reads chunked. Anything still buffered when a call
/// connects is typed-ahead input that must not leak into the data stream.
pub(crate) struct DteReader {
    reader: DteReadHalf,
    buffer: BytesMut,
    capacity: usize,
}

impl DteReader {
    pub(crate) fn new(reader: DteReadHalf, capacity: usize) -> Self {
        Self {
            reader,
            buffer: BytesMut::with_capacity(capacity),
            capacity,
        }
    }

    /// The next received byte, or `None` on a clean EOF.
    ///
    /// Cancel safe: a byte is either still in the descriptor or in the
    /// buffer, never lost.
    pub(crate) async fn next_byte(&mut self) -> Result<Option<u8>> {
        if self.buffer.is_empty() {
            self.buffer.reserve(self.capacity);
            let read = self.reader.read_buf(&mut self.buffer).await?;
            if read == 0 {
                return Ok(None);
            }
        }
        Ok(Some(self.buffer.get_u8()))
    }

    /// Discards buffered typed-ahead input, returning how much was
    /// dropped.
    pub(crate) fn drain(&mut self) -> usize {
        let dropped = self.buffer.len();
        self.buffer.clear();
        dropped
    }

    pub(crate) fn reader_mut(&mut self) -> &mut DteReadHalf {
        &mut self.reader
    }
}

/// What a command handler sees while it runs.
///
/// The context borrows the session's mutable pieces for the duration of
/// one elementary command; mode changes made here take effect for the
/// remainder of the same command line.
pub struct CommandContext<'a> {
    pub(crate) state: &'a mut SessionState,
    pub(crate) dte: &'a mut DteReader,
    pub(crate) bank: &'a CommandBank,
    pub(crate) output: &'a Arc<OutputChannel>,
    pub(crate) config: &'a EmulatorConfig,
    pub(crate) cancel: &'a CancellationToken,
}

impl CommandContext<'_> {
    /// The session configuration.
    #[must_use]
    pub fn config(&self) -> &EmulatorConfig {
        self.config
    }

    /// A clone of the shared output channel, usable from background tasks
    /// after the handler returns.
    #[must_use]
    pub fn output(&self) -> Arc<OutputChannel> {
        Arc::clone(self.output)
    }

    /// Sends one line of information text ahead of the final result.
    pub async fn send_intermediate(&mut self, text: &str) -> Result<()> {
        self.output.intermediate(text).await
    }

    /// Writes raw bytes to the terminal with no result framing.
    pub async fn send_raw(&mut self, bytes: &[u8]) -> Result<()> {
        self.output.raw(bytes).await
    }

    /// Enables or disables command echo.
    pub fn set_echo(&mut self, on: bool) {
        self.state.echo = on;
    }

    /// Enables or disables quiet mode (result suppression).
    pub fn set_quiet(&mut self, on: bool) {
        self.state.quiet = on;
        self.output.set_quiet(on);
    }

    /// Switches between verbose text results and numeric results.
    pub fn set_verbose(&mut self, on: bool) {
        self.state.verbose = on;
        self.output.set_verbose(on);
    }

    /// Sets the `+CMEE` error-report mode (0, 1, or 2).
    pub fn set_error_report_mode(&mut self, mode: u8) {
        self.state.error_mode = mode;
    }

    /// The current `+CMEE` error-report mode.
    #[must_use]
    pub fn error_report_mode(&self) -> u8 {
        self.state.error_mode
    }

    /// Enables or disables the `+ILRR` rate report before `CONNECT`.
    pub fn set_rate_report(&mut self, on: bool) {
        self.state.rate_report = on;
    }

    /// Whether rate reporting is enabled.
    #[must_use]
    pub fn rate_report(&self) -> bool {
        self.state.rate_report
    }

    /// Restores the mode defaults (echo on, verbose on, quiet off, rate
    /// report off, error-report mode 0) without touching the registry.
    pub fn restore_defaults(&mut self) {
        self.state.restore_defaults();
        self.output.set_verbose(true);
        self.output.set_quiet(false);
    }

    /// Requests a full reset: once the current command line finishes, the
    /// session rebuilds its registry and restores the mode defaults before
    /// reading the next line.
    pub fn request_reset(&mut self) {
        self.state.reset_pending = true;
    }

    /// Requests session termination; the reader exits and fires the
    /// hang-up callback after the current command line finishes.
    pub fn request_hangup(&mut self) {
        self.state.hung_up = true;
    }

    /// Runs another command line through the dispatcher, for handlers
    /// that expand into existing commands. Results are returned, not
    /// printed.
    pub async fn execute_command(&mut self, command: &str) -> ResultCode {
        let bank = self.bank;
        bank.execute(self, command).await
    }

    /// Reads free-form text from the terminal until Ctrl+Z (returns the
    /// accumulated text) or ESC (returns `None`, text discarded), echoing
    /// when echo is enabled. CR and LF are kept verbatim as line breaks.
    ///
    /// A host stop request interrupts the read with
    /// [`EmulatorError::Stopped`].
    pub async fn read_text(&mut self) -> Result<Option<String>> {
        let mut text = Vec::new();
        loop {
            let received = tokio::select! {
                () = self.cancel.cancelled() => {
                    self.state.hung_up = true;
                    return Err(EmulatorError::Stopped);
                }
                received = self.dte.next_byte() => received?,
            };
            let Some(byte) = received else {
                debug!("terminal closed during text entry");
                self.state.hung_up = true;
                return Ok(None);
            };
            if self.state.echo {
                self.output.echo(&[byte]).await?;
            }
            match byte {
                consts::SUB => {
                    return Ok(Some(String::from_utf8_lossy(&text).into_owned()));
                }
                consts::ESC => return Ok(None),
                byte => text.push(byte),
            }
        }
    }

    /// Establishes a data call over `dce` and relays bytes until the call
    /// ends.
    ///
    /// Prints the rate report (when enabled) and `CONNECT`, then hands
    /// both descriptors to the data-mode pump. Returns once the pump ends
    /// via the `+++` escape or either side closing; the handler then
    /// reports the call outcome (normally
    /// [`ResultCode::NoCarrier`](atmodem_command::ResultCode::NoCarrier))
    /// through the ordinary result path.
    pub async fn connect<S>(&mut self, dce: &mut S, mtu: usize) -> Result<()>
    where
        S: AsyncRead + AsyncWrite + Send + Unpin,
    {
        if self.state.data_mode {
            return Err(EmulatorError::DataMode);
        }
        let dropped = self.dte.drain();
        if dropped > 0 {
            trace!(dropped, "discarded typed-ahead input before data mode");
        }
        if self.state.rate_report {
            self.output.rate_report(self.config.line_rate()).await?;
        }
        self.output
            .final_result(ResultCode::Connect, self.state.error_mode)
            .await?;
        self.state.data_mode = true;
        self.output.set_data_mode(true);
        let end = pump::run(self.dte, self.output.as_ref(), dce, mtu, self.cancel).await;
        self.state.data_mode = false;
        self.output.set_data_mode(false);
        debug!(?end, "data mode ended");
        if end == PumpEnd::Cancelled {
            self.state.hung_up = true;
        }
        Ok(())
    }
}
