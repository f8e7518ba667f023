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

//! The full-duplex byte relay that runs while a call is up.
//!
//! Each direction reads at most one MTU-sized chunk and writes it
//! completely to the peer before reading again, so neither side can be
//! read faster than the other absorbs it. The pump takes the output lock
//! for its whole lifetime; command-mode writers are turned away at the
//! data-mode gate instead of queueing behind it.

use crate::context::DteReader;
use crate::output::OutputChannel;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// The in-band escape that returns the session to command mode.
pub(crate) const ESCAPE_SEQUENCE: &[u8] = b"+++";

/// Minimum silence on the DTE side before the escape is honored.
pub(crate) const ESCAPE_GUARD_TIME: Duration = Duration::from_secs(1);

/// Why the pump stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum PumpEnd {
    /// The terminal sent a lone `+++` after the guard time.
    Escape,
    /// The terminal side reached EOF.
    DteClosed,
    /// The remote side reached EOF.
    DceClosed,
    /// A read or write failed on either side.
    Io,
    /// The host requested a hard stop of the session.
    Cancelled,
}

/// Relays bytes between the DTE halves and the DCE stream until the call
/// ends. Never fails; an I/O problem is just one more way for a call to
/// end.
pub(crate) async fn run<S>(
    dte: &mut DteReader,
    output: &OutputChannel,
    dce: &mut S,
    mtu: usize,
    cancel: &CancellationToken,
) -> PumpEnd
where
    S: AsyncRead + AsyncWrite + Send + Unpin,
{
    let mut dte_tx = output.writer_lock().await;
    let (mut dce_rx, mut dce_tx) = tokio::io::split(dce);
    let dte_rx = dte.reader_mut();

    let end = {
        let upstream = async {
            let mut chunk = vec![0u8; mtu];
            // Entering data mode counts as a receipt, so the guard time
            // applies before the very first escape as well.
            let mut last_receipt = Instant::now();
            loop {
                let received = match dte_rx.read(&mut chunk).await {
                    Ok(0) => return PumpEnd::DteClosed,
                    Ok(received) => received,
                    Err(error) => {
                        trace!(%error, "terminal read failed in data mode");
                        return PumpEnd::Io;
                    }
                };
                let silence = last_receipt.elapsed();
                last_receipt = Instant::now();
                if &chunk[..received] == ESCAPE_SEQUENCE && silence >= ESCAPE_GUARD_TIME {
                    return PumpEnd::Escape;
                }
                if let Err(error) = dce_tx.write_all(&chunk[..received]).await {
                    trace!(%error, "remote write failed in data mode");
                    return PumpEnd::Io;
                }
            }
        };
        let downstream = async {
            let mut chunk = vec![0u8; mtu];
            loop {
                let received = match dce_rx.read(&mut chunk).await {
                    Ok(0) => return PumpEnd::DceClosed,
                    Ok(received) => received,
                    Err(error) => {
                        trace!(%error, "remote read failed in data mode");
                        return PumpEnd::Io;
                    }
                };
                if let Err(error) = dte_tx.write_all(&chunk[..received]).await {
                    trace!(%error, "terminal write failed in data mode");
                    return PumpEnd::Io;
                }
                if let Err(error) = dte_tx.flush().await {
                    trace!(%error, "terminal flush failed in data mode");
                    return PumpEnd::Io;
                }
            }
        };
        tokio::pin!(upstream, downstream);
        // Both pump reads are descriptor reads, so the host's hard stop
        // is honored here just as at the command-mode read.
        tokio::select! {
            () = cancel.cancelled() => PumpEnd::Cancelled,
            end = &mut upstream => end,
            end = &mut downstream => end,
        }
    };

    let _ = dte_tx.flush().await;
    let _ = dce_tx.flush().await;
    end
}
