use crate::config::DepositConfig;
use crate::directive::sort_directives;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::parser::{parse, parse_file, ParsedLedger};
use crate::plugin::{DepositPlugin, Plugin, PluginContext};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use tracing::{debug, info};

use std::collections::HashMap;
use std::path::Path;

/// Builds a plugin from the ledger options and the optional config string of its
/// `plugin` line.
pub type PluginFactory =
    fn(&HashMap<String, String>, Option<&str>) -> Result<Box<dyn Plugin>, LedgerError>;

/// Plugins a ledger may activate with `plugin "name"`.
pub struct PluginRegistry {
    plugins: Vec<(&'static str, PluginFactory)>,
}

fn deposit_plugin(
    options: &HashMap<String, String>,
    config: Option<&str>,
) -> Result<Box<dyn Plugin>, LedgerError> {
    Ok(Box::new(DepositPlugin::new(DepositConfig::from_options(
        options, config,
    )?)))
}

impl PluginRegistry {
    pub fn empty() -> Self {
        Self {
            plugins: Vec::new(),
        }
    }

    /// Registry with every plugin shipped in this crate.
    pub fn builtin() -> Self {
        let mut registry = Self::empty();
        registry.register(DepositPlugin::NAME, deposit_plugin);
        registry
    }

    pub fn register(&mut self, name: &'static str, factory: PluginFactory) {
        self.plugins.push((name, factory));
    }

    pub fn find(&self, name: &str) -> Option<PluginFactory> {
        self.plugins
            .iter()
            .find(|(registered, _)| *registered == name)
            .map(|(_, factory)| *factory)
    }
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

#[derive(Default)]
pub struct LoadOptions {
    /// Date the load happens at; today's local date when unset.
    pub as_of: Option<NaiveDate>,
    pub registry: PluginRegistry,
}

pub fn load_str(input: &str, options: &LoadOptions) -> Result<(Ledger, Vec<LedgerError>)> {
    load_parsed(parse(input, None)?, options)
}

pub fn load_file(path: &Path, options: &LoadOptions) -> Result<(Ledger, Vec<LedgerError>)> {
    load_parsed(parse_file(path, None)?, options)
}

/// Runs the activated plugins over the parsed entries, in declaration order, then books
/// the result.
///
/// Diagnostics from plugins and booking are collected; a plugin that gives up on the
/// whole stream aborts the load.
pub fn load_parsed(
    parsed: ParsedLedger,
    options: &LoadOptions,
) -> Result<(Ledger, Vec<LedgerError>)> {
    let ctx = PluginContext {
        today: options
            .as_of
            .unwrap_or_else(|| Local::now().date_naive()),
    };
    let ParsedLedger {
        options: ledger_options,
        plugins,
        directives: mut entries,
    } = parsed;
    let mut errors = Vec::new();

    sort_directives(&mut entries);

    for decl in &plugins {
        let factory = match options.registry.find(&decl.name) {
            Some(factory) => factory,
            None => {
                errors.push(LedgerError::UnknownPlugin(decl.name.clone()));
                continue;
            }
        };
        let plugin = match factory(&ledger_options, decl.config.as_deref()) {
            Ok(plugin) => plugin,
            Err(err) => {
                errors.push(err);
                continue;
            }
        };

        debug!(plugin = plugin.name(), entries = entries.len(), "running plugin");
        let output = plugin.process(entries, &ctx)?;
        entries = output.entries;
        errors.extend(output.errors);
    }

    sort_directives(&mut entries);

    let mut ledger = Ledger::with_options(ledger_options);
    let count = entries.len();
    errors.extend(ledger.book_all(entries));

    info!(entries = count, errors = errors.len(), "ledger loaded");
    Ok((ledger, errors))
}
