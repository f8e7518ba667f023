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

//! Command plugins and the ordered set a session is built from.

use crate::bank::CommandBank;
use crate::builtin;
use crate::error::RegistryError;
use std::sync::Arc;
use tracing::warn;

/// A named bundle of command handlers.
///
/// Plugins are registered in set order, after the built-in commands, so
/// an earlier plugin wins any name conflict with a later one.
pub trait Plugin: Send + Sync {
    /// A short name used in registration diagnostics.
    fn name(&self) -> &str;

    /// Installs this plugin's handlers into the bank.
    fn register(&self, bank: &mut CommandBank) -> Result<(), RegistryError>;
}

/// The ordered collection of plugins a session builds its registry from,
/// both at start and again on every `ATZ` reset.
#[derive(Clone, Default)]
pub struct PluginSet {
    plugins: Vec<Arc<dyn Plugin>>,
}

impl PluginSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a plugin, builder style.
    #[must_use]
    pub fn with(mut self, plugin: Arc<dyn Plugin>) -> Self {
        self.plugins.push(plugin);
        self
    }

    /// Appends a plugin.
    pub fn push(&mut self, plugin: Arc<dyn Plugin>) {
        self.plugins.push(plugin);
    }

    /// Builds a fresh bank: built-ins first, then every plugin in order.
    ///
    /// A plugin whose registration fails is skipped with a warning; the
    /// session still comes up with the remaining commands.
    pub(crate) fn build_bank(&self) -> Result<CommandBank, RegistryError> {
        let mut bank = CommandBank::new();
        builtin::install(&mut bank)?;
        for plugin in &self.plugins {
            if let Err(error) = plugin.register(&mut bank) {
                warn!(plugin = plugin.name(), %error, "skipping plugin, registration failed");
            }
        }
        Ok(bank)
    }
}

impl std::fmt::Debug for PluginSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.plugins.iter().map(|plugin| plugin.name()))
            .finish()
    }
}
