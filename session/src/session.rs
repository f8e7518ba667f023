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

//! The modem session reader task and its public entry points.

use crate::config::EmulatorConfig;
use crate::context::{CommandContext, DteReader};
use crate::error::Result;
use crate::output::OutputChannel;
use crate::bank::CommandBank;
use crate::plugin::PluginSet;
use atmodem_codec::{LineParser, Segment, Segments};
use atmodem_command::ResultCode;
use std::sync::Arc;
use tokio::io::{AsyncRead, AsyncWrite};
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

/// Called exactly once when the session ends, whichever way it ends.
pub type HangupCallback = Box<dyn FnOnce() + Send>;

/// The mutable mode bits and lifecycle flags of one session.
pub(crate) struct SessionState {
    pub(crate) echo: bool,
    pub(crate) quiet: bool,
    pub(crate) verbose: bool,
    pub(crate) rate_report: bool,
    pub(crate) error_mode: u8,
    pub(crate) data_mode: bool,
    pub(crate) hung_up: bool,
    pub(crate) reset_pending: bool,
}

impl SessionState {
    pub(crate) fn new() -> Self {
        Self {
            echo: true,
            quiet: false,
            verbose: true,
            rate_report: false,
            error_mode: 0,
            data_mode: false,
            hung_up: false,
            reset_pending: false,
        }
    }

    /// Restores the mode defaults; lifecycle flags are untouched.
    pub(crate) fn restore_defaults(&mut self) {
        self.echo = true;
        self.quiet = false;
        self.verbose = true;
        self.rate_report = false;
        self.error_mode = 0;
    }
}

struct ModemSession {
    state: SessionState,
    dte: DteReader,
    parser: LineParser,
    bank: CommandBank,
    plugins: PluginSet,
    output: Arc<OutputChannel>,
    config: EmulatorConfig,
    cancel: CancellationToken,
    hangup: Option<HangupCallback>,
}

impl ModemSession {
    async fn run(mut self) {
        loop {
            if self.state.hung_up {
                break;
            }
            if self.state.reset_pending {
                self.rebuild();
            }
            let byte = tokio::select! {
                () = self.cancel.cancelled() => {
                    debug!("session cancelled");
                    break;
                }
                received = self.dte.next_byte() => match received {
                    Ok(Some(byte)) => byte,
                    Ok(None) => {
                        debug!("terminal closed");
                        break;
                    }
                    Err(error) => {
                        debug!(%error, "terminal read failed");
                        break;
                    }
                }
            };
            if self.state.echo {
                if let Err(error) = self.output.echo(&[byte]).await {
                    debug!(%error, "echo failed");
                    break;
                }
            }
            if let Some(line) = self.parser.feed(byte) {
                self.process_line(&line).await;
            }
        }
        if let Some(hangup) = self.hangup.take() {
            hangup();
        }
    }

    /// Deferred `ATZ` work, done between command lines so the rest of the
    /// reset line never runs against a half-built registry.
    fn rebuild(&mut self) {
        self.state.reset_pending = false;
        match self.plugins.build_bank() {
            Ok(bank) => self.bank = bank,
            Err(error) => warn!(%error, "reset kept the previous registry"),
        }
        self.state.restore_defaults();
        self.output.set_verbose(true);
        self.output.set_quiet(false);
        self.parser.reset();
    }

    /// Splits one command line and dispatches its elementary commands,
    /// stopping at the first failure, then prints the final result.
    async fn process_line(&mut self, line: &str) {
        let mut code = ResultCode::Ok;
        for segment in Segments::new(line) {
            match segment {
                Segment::Command(text) => {
                    let mut ctx = CommandContext {
                        state: &mut self.state,
                        dte: &mut self.dte,
                        bank: &self.bank,
                        output: &self.output,
                        config: &self.config,
                        cancel: &self.cancel,
                    };
                    code = self.bank.execute(&mut ctx, text).await;
                }
                Segment::SyntaxError => {
                    debug!(line, "syntax error in command line");
                    code = ResultCode::Error;
                }
            }
            // A pending reset ends the line here; the remaining segments
            // never run, since they would see the outgoing registry.
            if !code.is_ok() || self.state.hung_up || self.state.reset_pending {
                break;
            }
        }
        if let Err(error) = self.output.final_result(code, self.state.error_mode).await {
            debug!(%error, "failed to write the final result");
            self.state.hung_up = true;
        }
    }
}

/// Factory for modem sessions.
pub struct ModemEmulator;

impl ModemEmulator {
    /// Builds the command registry and spawns the session reader task
    /// over the given DTE halves.
    ///
    /// `hangup` fires exactly once when the session ends, whether by
    /// EOF, I/O failure, [`EmulatorHandle::stop`], or a handler's
    /// hang-up request.
    pub fn start<R, W>(
        reader: R,
        writer: W,
        plugins: PluginSet,
        config: EmulatorConfig,
        hangup: Option<HangupCallback>,
    ) -> Result<EmulatorHandle>
    where
        R: AsyncRead + Send + Unpin + 'static,
        W: AsyncWrite + Send + Unpin + 'static,
    {
        let output = OutputChannel::new(Box::new(writer));
        let bank = plugins.build_bank()?;
        let cancel = CancellationToken::new();
        let session = ModemSession {
            state: SessionState::new(),
            dte: DteReader::new(Box::new(reader), config.read_buffer_size()),
            parser: LineParser::new(),
            bank,
            plugins,
            output: Arc::clone(&output),
            config,
            cancel: cancel.clone(),
            hangup,
        };
        let task = tokio::spawn(session.run());
        Ok(EmulatorHandle {
            cancel,
            task: Mutex::new(Some(task)),
            output,
        })
    }
}

/// Control handle for a running session.
pub struct EmulatorHandle {
    cancel: CancellationToken,
    task: Mutex<Option<JoinHandle<()>>>,
    output: Arc<OutputChannel>,
}

impl EmulatorHandle {
    /// The shared output channel, for unsolicited notifications such as
    /// [`OutputChannel::ring`] from background tasks.
    #[must_use]
    pub fn output(&self) -> Arc<OutputChannel> {
        Arc::clone(&self.output)
    }

    /// Stops the session and waits for the reader task to finish.
    /// Idempotent; later calls return immediately.
    pub async fn stop(&self) {
        self.cancel.cancel();
        if let Some(task) = self.task.lock().await.take() {
            if let Err(error) = task.await {
                warn!(%error, "session task did not exit cleanly");
            }
        }
    }
}

impl std::fmt::Debug for EmulatorHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmulatorHandle")
            .field("cancelled", &self.cancel.is_cancelled())
            .finish_non_exhaustive()
    }
}
