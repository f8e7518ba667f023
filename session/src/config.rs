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

/// Tuning and identity settings for a modem session.
///
/// `EmulatorConfig::default()` is a usable configuration; builder methods
/// adjust individual settings.
#[derive(Debug, Clone)]
pub struct EmulatorConfig {
    read_buffer_size: usize,
    data_mtu: usize,
    line_rate: u32,
    identity: String,
}

impl EmulatorConfig {
    /// Creates a configuration with the default settings.
    #[must_use]
    pub fn new() -> Self {
        Self {
            read_buffer_size: 4096,
            data_mtu: 1500,
            line_rate: 115_200,
            identity: String::from("atmodem emulator"),
        }
    }

    /// Sets the capacity of the DTE read buffer.
    #[must_use]
    pub fn with_read_buffer_size(mut self, size: usize) -> Self {
        self.read_buffer_size = size;
        self
    }

    /// Sets the per-direction chunk size used by the data-mode pump.
    #[must_use]
    pub fn with_data_mtu(mut self, mtu: usize) -> Self {
        self.data_mtu = mtu;
        self
    }

    /// Sets the line rate reported by `AT+ILRR` rate reports.
    #[must_use]
    pub fn with_line_rate(mut self, rate: u32) -> Self {
        self.line_rate = rate;
        self
    }

    /// Sets the identification text reported by `ATI`.
    #[must_use]
    pub fn with_identity(mut self, identity: impl Into<String>) -> Self {
        self.identity = identity.into();
        self
    }

    /// Capacity of the DTE read buffer.
    #[must_use]
    pub fn read_buffer_size(&self) -> usize {
        self.read_buffer_size
    }

    /// Per-direction chunk size for the data-mode pump.
    #[must_use]
    pub fn data_mtu(&self) -> usize {
        self.data_mtu
    }

    /// The line rate used in rate reports.
    #[must_use]
    pub fn line_rate(&self) -> u32 {
        self.line_rate
    }

    /// The identification text.
    #[must_use]
    pub fn identity(&self) -> &str {
        &self.identity
    }
}

impl Default for EmulatorConfig {
    fn default() -> Self {
        Self::new()
    }
}
