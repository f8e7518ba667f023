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

//! End-to-end session tests over in-memory duplex streams.

use async_trait::async_trait;
use atmodem_session::{
    BasicCommand, CommandBank, CommandContext, DialCommand, EmulatorConfig, EmulatorHandle,
    ExtendedCommand, ModemEmulator, Plugin, PluginSet, RegistryError, ResultCode, SParameter,
};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncReadExt, AsyncWriteExt, DuplexStream};
use tokio::time::{sleep, timeout};

/// The terminal end of a session under test.
struct Terminal {
    stream: DuplexStream,
}

impl Terminal {
    async fn send(&mut self, bytes: &[u8]) {
        self.stream.write_all(bytes).await.unwrap();
    }

    /// Collects everything the modem sends until the line goes idle.
    async fn drain(&mut self) -> String {
        let mut collected = Vec::new();
        let mut chunk = [0u8; 1024];
        let mut wait = Duration::from_millis(500);
        loop {
            match timeout(wait, self.stream.read(&mut chunk)).await {
                Ok(Ok(0)) | Ok(Err(_)) | Err(_) => break,
                Ok(Ok(received)) => {
                    collected.extend_from_slice(&chunk[..received]);
                    wait = Duration::from_millis(100);
                }
            }
        }
        String::from_utf8_lossy(&collected).into_owned()
    }

    async fn transact(&mut self, command: &[u8]) -> String {
        self.send(command).await;
        self.drain().await
    }
}

fn start(plugins: PluginSet, config: EmulatorConfig) -> (Terminal, EmulatorHandle) {
    let (terminal, modem) = tokio::io::duplex(4096);
    let (reader, writer) = tokio::io::split(modem);
    let handle = ModemEmulator::start(reader, writer, plugins, config, None).unwrap();
    (Terminal { stream: terminal }, handle)
}

fn start_default() -> (Terminal, EmulatorHandle) {
    start(PluginSet::new(), EmulatorConfig::default())
}

/// Extended handler that records every request it receives.
struct Recorder {
    tag: &'static str,
    log: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ExtendedCommand for Recorder {
    async fn execute(&self, _ctx: &mut CommandContext<'_>, request: &str) -> ResultCode {
        self.log.lock().unwrap().push(format!("{}<-{request}", self.tag));
        ResultCode::Ok
    }
}

/// Registers `+CR` and `+CRC`, two names where one prefixes the other.
struct ProbePlugin {
    log: Arc<Mutex<Vec<String>>>,
}

impl Plugin for ProbePlugin {
    fn name(&self) -> &str {
        "probe"
    }

    fn register(&self, bank: &mut CommandBank) -> Result<(), RegistryError> {
        bank.register_extended(
            "+CR",
            Arc::new(Recorder {
                tag: "+CR",
                log: self.log.clone(),
            }),
        )?;
        bank.register_extended(
            "+CRC",
            Arc::new(Recorder {
                tag: "+CRC",
                log: self.log.clone(),
            }),
        )?;
        bank.register_extended_prefix(
            "+W",
            Arc::new(Recorder {
                tag: "wild",
                log: self.log.clone(),
            }),
        )?;
        Ok(())
    }
}

/// `+FAIL` always reports CME error 4 (operation not supported).
struct FailingCommand;

#[async_trait]
impl ExtendedCommand for FailingCommand {
    async fn execute(&self, _ctx: &mut CommandContext<'_>, _request: &str) -> ResultCode {
        ResultCode::Cme(4)
    }
}

struct FailPlugin;

impl Plugin for FailPlugin {
    fn name(&self) -> &str {
        "fail"
    }

    fn register(&self, bank: &mut CommandBank) -> Result<(), RegistryError> {
        bank.register_extended("+FAIL", Arc::new(FailingCommand))
    }
}

/// A dial handler wired to a pre-arranged remote stream.
struct Dialer {
    line: Arc<tokio::sync::Mutex<Option<DuplexStream>>>,
}

#[async_trait]
impl DialCommand for Dialer {
    async fn dial(&self, ctx: &mut CommandContext<'_>, _number: &str) -> ResultCode {
        let taken = self.line.lock().await.take();
        let Some(mut remote) = taken else {
            return ResultCode::NoDialtone;
        };
        let mtu = ctx.config().data_mtu();
        match ctx.connect(&mut remote, mtu).await {
            Ok(()) => ResultCode::NoCarrier,
            Err(_) => ResultCode::Error,
        }
    }
}

struct DialPlugin {
    line: Arc<tokio::sync::Mutex<Option<DuplexStream>>>,
}

impl Plugin for DialPlugin {
    fn name(&self) -> &str {
        "dial"
    }

    fn register(&self, bank: &mut CommandBank) -> Result<(), RegistryError> {
        bank.register_dial(Arc::new(Dialer {
            line: self.line.clone(),
        }))
    }
}

/// A writable S-register backed by shared storage.
struct Register {
    value: Arc<AtomicU32>,
}

#[async_trait]
impl SParameter for Register {
    async fn get(&self, _ctx: &mut CommandContext<'_>) -> Option<u32> {
        Some(self.value.load(Ordering::SeqCst))
    }

    async fn set(&self, _ctx: &mut CommandContext<'_>, value: u32) -> ResultCode {
        if value > 255 {
            return ResultCode::Error;
        }
        self.value.store(value, Ordering::SeqCst);
        ResultCode::Ok
    }
}

struct RegisterPlugin {
    value: Arc<AtomicU32>,
}

impl Plugin for RegisterPlugin {
    fn name(&self) -> &str {
        "register"
    }

    fn register(&self, bank: &mut CommandBank) -> Result<(), RegistryError> {
        bank.register_s_parameter(3, Arc::new(Register {
            value: self.value.clone(),
        }))
    }
}

/// Counts how many times its registration runs (once per registry build).
struct CountingPlugin {
    builds: Arc<AtomicUsize>,
}

impl Plugin for CountingPlugin {
    fn name(&self) -> &str {
        "counting"
    }

    fn register(&self, _bank: &mut CommandBank) -> Result<(), RegistryError> {
        self.builds.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

struct NopBasic;

#[async_trait]
impl BasicCommand for NopBasic {
    async fn execute(&self, _ctx: &mut CommandContext<'_>, _value: u32) -> ResultCode {
        ResultCode::Ok
    }
}

struct NopDial;

#[async_trait]
impl DialCommand for NopDial {
    async fn dial(&self, _ctx: &mut CommandContext<'_>, _number: &str) -> ResultCode {
        ResultCode::Ok
    }
}

struct NopRegister;

#[async_trait]
impl SParameter for NopRegister {
    async fn get(&self, _ctx: &mut CommandContext<'_>) -> Option<u32> {
        Some(0)
    }

    async fn set(&self, _ctx: &mut CommandContext<'_>, _value: u32) -> ResultCode {
        ResultCode::Ok
    }
}

struct NopExtended;

#[async_trait]
impl ExtendedCommand for NopExtended {
    async fn execute(&self, _ctx: &mut CommandContext<'_>, _request: &str) -> ResultCode {
        ResultCode::Ok
    }
}

#[tokio::test]
async fn bare_at_reports_ok_with_echo() {
    let (mut terminal, handle) = start_default();
    let response = terminal.transact(b"AT\r").await;
    assert_eq!(response, "AT\r\r\nOK\r\n");
    handle.stop().await;
}

#[tokio::test]
async fn echo_can_be_disabled() {
    let (mut terminal, handle) = start_default();
    let response = terminal.transact(b"ATE0\r").await;
    assert_eq!(response, "ATE0\r\r\nOK\r\n");
    let response = terminal.transact(b"AT\r").await;
    assert_eq!(response, "\r\nOK\r\n");
    handle.stop().await;
}

#[tokio::test]
async fn repeat_replays_the_previous_line() {
    let (mut terminal, handle) = start(
        PluginSet::new(),
        EmulatorConfig::default().with_identity("test modem 1.0"),
    );
    terminal.transact(b"ATE0\r").await;
    let first = terminal.transact(b"ATI\r").await;
    assert_eq!(first, "\r\ntest modem 1.0\r\n\r\nOK\r\n");
    // No terminator: A/ fires on the slash itself.
    let again = terminal.transact(b"a/").await;
    assert_eq!(again, "\r\ntest modem 1.0\r\n\r\nOK\r\n");
    handle.stop().await;
}

#[tokio::test]
async fn dispatch_respects_name_boundaries() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(ProbePlugin { log: log.clone() })),
        EmulatorConfig::default(),
    );
    terminal.transact(b"ATE0\r").await;

    let response = terminal.transact(b"AT+CRC=1\r").await;
    assert_eq!(response, "\r\nOK\r\n");
    assert_eq!(log.lock().unwrap().as_slice(), ["+CRC<-+CRC=1"]);

    let response = terminal.transact(b"AT+CR\r").await;
    assert_eq!(response, "\r\nOK\r\n");
    assert_eq!(
        log.lock().unwrap().as_slice(),
        ["+CRC<-+CRC=1", "+CR<-+CR"]
    );

    // +CRX matches neither name: +CR does not end on a word boundary.
    let response = terminal.transact(b"AT+CRX\r").await;
    assert_eq!(response, "\r\nERROR\r\n");
    assert_eq!(log.lock().unwrap().len(), 2);

    // Wildcard prefixes need no boundary and see the whole request.
    let response = terminal.transact(b"AT+WHATEVER=1\r").await;
    assert_eq!(response, "\r\nOK\r\n");
    assert_eq!(log.lock().unwrap().last().unwrap(), "wild<-+WHATEVER=1");
    handle.stop().await;
}

#[test]
fn duplicate_registration_is_rejected_in_every_table() {
    let mut bank = CommandBank::new();

    bank.register_alpha('B', Arc::new(NopBasic)).unwrap();
    assert_eq!(
        bank.register_alpha('b', Arc::new(NopBasic)),
        Err(RegistryError::Duplicate("B".into()))
    );
    assert_eq!(
        bank.register_alpha('D', Arc::new(NopBasic)),
        Err(RegistryError::ReservedLetter('D'))
    );
    assert_eq!(
        bank.register_alpha('S', Arc::new(NopBasic)),
        Err(RegistryError::ReservedLetter('S'))
    );
    assert_eq!(
        bank.register_alpha('1', Arc::new(NopBasic)),
        Err(RegistryError::InvalidLetter('1'))
    );

    bank.register_ampersand('F', Arc::new(NopBasic)).unwrap();
    assert_eq!(
        bank.register_ampersand('f', Arc::new(NopBasic)),
        Err(RegistryError::Duplicate("&F".into()))
    );

    bank.register_dial(Arc::new(NopDial)).unwrap();
    assert_eq!(
        bank.register_dial(Arc::new(NopDial)),
        Err(RegistryError::Duplicate("D".into()))
    );

    bank.register_s_parameter(3, Arc::new(NopRegister)).unwrap();
    assert_eq!(
        bank.register_s_parameter(3, Arc::new(NopRegister)),
        Err(RegistryError::Duplicate("S3".into()))
    );
    assert_eq!(
        bank.register_s_parameter(26, Arc::new(NopRegister)),
        Err(RegistryError::SParameterRange(26))
    );

    bank.register_extended("+TEST", Arc::new(NopExtended)).unwrap();
    assert_eq!(
        bank.register_extended("+test", Arc::new(NopExtended)),
        Err(RegistryError::Duplicate("+TEST".into()))
    );
    assert_eq!(
        bank.register_extended("TEST", Arc::new(NopExtended)),
        Err(RegistryError::InvalidName("TEST".into()))
    );

    bank.register_extended_prefix("+W", Arc::new(NopExtended)).unwrap();
    assert_eq!(
        bank.register_extended_prefix("+w", Arc::new(NopExtended)),
        Err(RegistryError::Duplicate("+W".into()))
    );
}

#[tokio::test]
async fn cme_reporting_follows_the_error_mode() {
    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(FailPlugin)),
        EmulatorConfig::default(),
    );
    terminal.transact(b"ATE0\r").await;

    assert_eq!(terminal.transact(b"AT+FAIL\r").await, "\r\nERROR\r\n");
    assert_eq!(terminal.transact(b"AT+CMEE=1\r").await, "\r\nOK\r\n");
    assert_eq!(
        terminal.transact(b"AT+FAIL\r").await,
        "\r\n+CME ERROR: 4\r\n"
    );
    assert_eq!(terminal.transact(b"AT+CMEE=2\r").await, "\r\nOK\r\n");
    assert_eq!(
        terminal.transact(b"AT+FAIL\r").await,
        "\r\n+CME ERROR: operation not supported\r\n"
    );
    assert_eq!(terminal.transact(b"AT+CMEE?\r").await, "\r\n+CMEE: 2\r\n\r\nOK\r\n");
    assert_eq!(
        terminal.transact(b"AT+CMEE=?\r").await,
        "\r\n+CMEE: (0-2)\r\n\r\nOK\r\n"
    );
    handle.stop().await;
}

#[tokio::test]
async fn quiet_mode_suppresses_final_results() {
    let (mut terminal, handle) = start_default();
    terminal.transact(b"ATE0\r").await;
    // The quiet switch applies to its own command line already.
    assert_eq!(terminal.transact(b"ATQ1\r").await, "");
    assert_eq!(terminal.transact(b"AT\r").await, "");
    assert_eq!(terminal.transact(b"ATQ0\r").await, "\r\nOK\r\n");
    handle.stop().await;
}

#[tokio::test]
async fn verbose_off_switches_to_numeric_results() {
    let (mut terminal, handle) = start_default();
    terminal.transact(b"ATE0\r").await;
    assert_eq!(terminal.transact(b"ATV0\r").await, "0\r");
    assert_eq!(terminal.transact(b"AT+NOPE\r").await, "4\r");
    assert_eq!(terminal.transact(b"ATV1\r").await, "\r\nOK\r\n");
    handle.stop().await;
}

#[tokio::test]
async fn s_registers_set_and_get() {
    let value = Arc::new(AtomicU32::new(0));
    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(RegisterPlugin {
            value: value.clone(),
        })),
        EmulatorConfig::default(),
    );
    terminal.transact(b"ATE0\r").await;

    assert_eq!(terminal.transact(b"ATS3=42\r").await, "\r\nOK\r\n");
    assert_eq!(value.load(Ordering::SeqCst), 42);
    assert_eq!(terminal.transact(b"ATS3?\r").await, "\r\n042\r\n\r\nOK\r\n");
    // Spaces are part of the accepted S-parameter grammar.
    assert_eq!(terminal.transact(b"ATS 3 = 7\r").await, "\r\nOK\r\n");
    assert_eq!(value.load(Ordering::SeqCst), 7);
    // A bare register reference is malformed.
    assert_eq!(terminal.transact(b"ATS3\r").await, "\r\nERROR\r\n");
    handle.stop().await;
}

#[tokio::test]
async fn reset_rebuilds_the_registry_before_the_next_line() {
    let builds = Arc::new(AtomicUsize::new(0));
    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(CountingPlugin {
            builds: builds.clone(),
        })),
        EmulatorConfig::default(),
    );
    assert_eq!(builds.load(Ordering::SeqCst), 1);

    terminal.transact(b"ATE0\r").await;
    assert_eq!(terminal.transact(b"ATZ\r").await, "\r\nOK\r\n");
    // The next line runs against the rebuilt registry with default modes,
    // so echo is back on.
    assert_eq!(terminal.transact(b"AT\r").await, "AT\r\r\nOK\r\n");
    assert_eq!(builds.load(Ordering::SeqCst), 2);
    handle.stop().await;
}

#[tokio::test]
async fn syntax_errors_stop_the_command_line() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(ProbePlugin { log: log.clone() })),
        EmulatorConfig::default(),
    );
    terminal.transact(b"ATE0\r").await;

    // Unterminated quote: nothing after the bad segment runs.
    let response = terminal.transact(b"AT+CRC=\"oops;+CR\r").await;
    assert_eq!(response, "\r\nERROR\r\n");
    assert!(log.lock().unwrap().is_empty());

    // First failing command stops the rest of the line too.
    let response = terminal.transact(b"AT+NOPE;+CRC=1\r").await;
    assert_eq!(response, "\r\nERROR\r\n");
    assert!(log.lock().unwrap().is_empty());
    handle.stop().await;
}

/// `+MSG` reads a free-form message body, SMS style.
struct MessageCommand {
    store: Arc<Mutex<Vec<String>>>,
}

#[async_trait]
impl ExtendedCommand for MessageCommand {
    async fn execute(&self, ctx: &mut CommandContext<'_>, _request: &str) -> ResultCode {
        match ctx.read_text().await {
            Ok(Some(text)) => {
                self.store.lock().unwrap().push(text);
                ResultCode::Ok
            }
            Ok(None) | Err(_) => ResultCode::Error,
        }
    }
}

struct MessagePlugin {
    store: Arc<Mutex<Vec<String>>>,
}

impl Plugin for MessagePlugin {
    fn name(&self) -> &str {
        "message"
    }

    fn register(&self, bank: &mut CommandBank) -> Result<(), RegistryError> {
        bank.register_extended("+MSG", Arc::new(MessageCommand {
            store: self.store.clone(),
        }))
    }
}

#[tokio::test]
async fn free_form_text_entry_ends_on_ctrl_z_or_escape() {
    let store = Arc::new(Mutex::new(Vec::new()));
    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(MessagePlugin {
            store: store.clone(),
        })),
        EmulatorConfig::default(),
    );
    terminal.transact(b"ATE0\r").await;

    terminal.send(b"AT+MSG\r").await;
    terminal.send(b"hello\rworld\x1a").await;
    assert_eq!(terminal.drain().await, "\r\nOK\r\n");
    assert_eq!(store.lock().unwrap().as_slice(), ["hello\rworld"]);

    // ESC abandons the text.
    terminal.send(b"AT+MSG\r").await;
    terminal.send(b"discarded\x1b").await;
    assert_eq!(terminal.drain().await, "\r\nERROR\r\n");
    assert_eq!(store.lock().unwrap().len(), 1);
    handle.stop().await;
}

#[tokio::test]
async fn factory_defaults_restore_modes_mid_line() {
    let (mut terminal, handle) = start_default();
    terminal.transact(b"ATE0\r").await;
    assert_eq!(terminal.transact(b"ATV0\r").await, "0\r");
    // &F flips the modes back during its own line, so its final result is
    // already verbose; echo applies from the next byte on.
    assert_eq!(terminal.transact(b"AT&F\r").await, "\r\nOK\r\n");
    assert_eq!(terminal.transact(b"AT\r").await, "AT\r\r\nOK\r\n");
    handle.stop().await;
}

#[tokio::test]
async fn hook_and_progress_validate_their_arguments() {
    let (mut terminal, handle) = start_default();
    terminal.transact(b"ATE0\r").await;
    assert_eq!(terminal.transact(b"ATH\r").await, "\r\nOK\r\n");
    assert_eq!(terminal.transact(b"ATH0\r").await, "\r\nOK\r\n");
    assert_eq!(terminal.transact(b"ATH1\r").await, "\r\nERROR\r\n");
    assert_eq!(terminal.transact(b"ATX4\r").await, "\r\nOK\r\n");
    assert_eq!(terminal.transact(b"ATX9\r").await, "\r\nERROR\r\n");
    handle.stop().await;
}

#[tokio::test]
async fn unsolicited_ring_reaches_the_terminal() {
    let (mut terminal, handle) = start_default();
    terminal.transact(b"ATE0\r").await;
    handle.output().ring().await.unwrap();
    assert_eq!(terminal.drain().await, "\r\nRING\r\n");
    handle.stop().await;
}

#[tokio::test]
async fn data_mode_relays_both_directions_and_honors_the_escape() {
    let (near, mut remote) = tokio::io::duplex(4096);
    let line = Arc::new(tokio::sync::Mutex::new(Some(near)));
    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(DialPlugin { line })),
        EmulatorConfig::default(),
    );
    terminal.transact(b"ATE0\r").await;

    assert_eq!(terminal.transact(b"ATD5551234\r").await, "\r\nCONNECT\r\n");

    // Upstream relay.
    terminal.send(b"hello").await;
    let mut buffer = [0u8; 5];
    remote.read_exact(&mut buffer).await.unwrap();
    assert_eq!(&buffer, b"hello");

    // Downstream relay, raw bytes with no framing.
    remote.write_all(b"world").await.unwrap();
    assert_eq!(terminal.drain().await, "world");

    // An embedded +++ inside flowing data is payload, not an escape.
    terminal.send(b"ab+++cd").await;
    let mut buffer = [0u8; 7];
    remote.read_exact(&mut buffer).await.unwrap();
    assert_eq!(&buffer, b"ab+++cd");

    // Command-mode writers are rejected while the pump owns the line.
    assert!(handle.output().ring().await.is_err());

    // After the guard time a lone +++ drops back to command mode.
    sleep(Duration::from_millis(1100)).await;
    terminal.send(b"+++").await;
    assert_eq!(terminal.drain().await, "\r\nNO CARRIER\r\n");

    // Back in command mode.
    assert_eq!(terminal.transact(b"AT\r").await, "\r\nOK\r\n");
    handle.stop().await;
}

#[tokio::test]
async fn rate_report_precedes_connect_when_enabled() {
    let (near, remote) = tokio::io::duplex(4096);
    let line = Arc::new(tokio::sync::Mutex::new(Some(near)));
    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(DialPlugin { line })),
        EmulatorConfig::default().with_line_rate(9600),
    );
    terminal.transact(b"ATE0\r").await;
    assert_eq!(terminal.transact(b"AT+ILRR=1\r").await, "\r\nOK\r\n");

    terminal.send(b"ATD1\r").await;
    let response = terminal.drain().await;
    assert_eq!(response, "\r\n+ILRR: 9600\r\n\r\nCONNECT\r\n");

    // End the call from the remote side.
    drop(remote);
    assert_eq!(terminal.drain().await, "\r\nNO CARRIER\r\n");
    handle.stop().await;
}

#[tokio::test]
#[tracing_test::traced_test]
async fn failing_plugin_is_skipped_not_fatal() {
    struct BadPlugin;

    impl Plugin for BadPlugin {
        fn name(&self) -> &str {
            "bad"
        }

        fn register(&self, bank: &mut CommandBank) -> Result<(), RegistryError> {
            // Collides with the built-in echo command.
            bank.register_alpha('E', Arc::new(NopBasic))
        }
    }

    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(BadPlugin)),
        EmulatorConfig::default(),
    );
    // The session still comes up with the built-ins intact.
    assert_eq!(terminal.transact(b"ATE0\r").await, "ATE0\r\r\nOK\r\n");
    assert_eq!(terminal.transact(b"AT\r").await, "\r\nOK\r\n");
    assert!(logs_contain("skipping plugin"));
    handle.stop().await;
}

#[tokio::test]
async fn hangup_callback_fires_once_on_terminal_eof() {
    let (terminal, modem) = tokio::io::duplex(4096);
    let (reader, writer) = tokio::io::split(modem);
    let fired = Arc::new(AtomicUsize::new(0));
    let counter = fired.clone();
    let handle = ModemEmulator::start(
        reader,
        writer,
        PluginSet::new(),
        EmulatorConfig::default(),
        Some(Box::new(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })),
    )
    .unwrap();

    drop(terminal);
    handle.stop().await;
    handle.stop().await;
    assert_eq!(fired.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn stop_interrupts_an_active_data_call() {
    let (near, mut remote) = tokio::io::duplex(4096);
    let line = Arc::new(tokio::sync::Mutex::new(Some(near)));
    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(DialPlugin { line })),
        EmulatorConfig::default(),
    );
    terminal.transact(b"ATE0\r").await;
    assert_eq!(terminal.transact(b"ATD5551234\r").await, "\r\nCONNECT\r\n");

    // The call is up and relaying.
    terminal.send(b"ping").await;
    let mut buffer = [0u8; 4];
    remote.read_exact(&mut buffer).await.unwrap();
    assert_eq!(&buffer, b"ping");

    // A hard stop must tear the call down without waiting for traffic.
    timeout(Duration::from_secs(3), handle.stop())
        .await
        .expect("stop finished during the call");

    // The call still ends through the normal hang-up path before the
    // session goes away.
    assert_eq!(terminal.drain().await, "\r\nNO CARRIER\r\n");
}

#[tokio::test]
async fn stop_interrupts_pending_text_entry() {
    let store = Arc::new(Mutex::new(Vec::new()));
    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(MessagePlugin {
            store: store.clone(),
        })),
        EmulatorConfig::default(),
    );
    terminal.transact(b"ATE0\r").await;

    // The handler is now blocked reading a message body.
    terminal.send(b"AT+MSG\rhalf a mess").await;
    terminal.drain().await;

    timeout(Duration::from_secs(3), handle.stop())
        .await
        .expect("stop finished during text entry");
    assert!(store.lock().unwrap().is_empty());
}

#[tokio::test]
async fn reset_skips_the_rest_of_its_line() {
    let log = Arc::new(Mutex::new(Vec::new()));
    let (mut terminal, handle) = start(
        PluginSet::new().with(Arc::new(ProbePlugin { log: log.clone() })),
        EmulatorConfig::default(),
    );
    terminal.transact(b"ATE0\r").await;

    // Z ends its line: +CRC never runs against the outgoing registry.
    assert_eq!(terminal.transact(b"ATZ;+CRC=1\r").await, "\r\nOK\r\n");
    assert!(log.lock().unwrap().is_empty());

    // The rebuilt registry still carries the plugin, with default modes.
    assert_eq!(
        terminal.transact(b"AT+CRC=1\r").await,
        "AT+CRC=1\r\r\nOK\r\n"
    );
    assert_eq!(log.lock().unwrap().as_slice(), ["+CRC<-+CRC=1"]);
    handle.stop().await;
}

#[tokio::test]
async fn stop_cancels_an_idle_session() {
    let (mut terminal, handle) = start_default();
    terminal.transact(b"ATE0\r").await;
    handle.stop().await;
    // The modem halves are gone; the terminal sees EOF.
    let mut buffer = [0u8; 16];
    let read = terminal.stream.read(&mut buffer).await.unwrap();
    assert_eq!(read, 0);
}
