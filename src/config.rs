//! Deposit plugin configuration.
//!
//! Settings come from ledger options (`option "gic_as_of" "2023-01-01"`) and from the
//! plugin line itself (`plugin "GIC" "as_of=2023-01-01 on_invalid=skip"`); the plugin
//! line wins when both are present.

use chrono::NaiveDate;
use std::collections::HashMap;
use std::str::FromStr;

use crate::error::LedgerError;

pub const DEFAULT_MARKER: &str = "GIC";

const OPTION_PREFIX: &str = "gic_";

/// What to do with a declaration that cannot be expanded.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum InvalidPolicy {
    /// Abort the whole load on the first bad declaration.
    #[default]
    Abort,
    /// Drop the declaration, report it, and keep going.
    Skip,
}

impl FromStr for InvalidPolicy {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "abort" => Ok(InvalidPolicy::Abort),
            "skip" => Ok(InvalidPolicy::Skip),
            _ => Err(()),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct DepositConfig {
    /// Custom type that marks a deposit declaration.
    pub marker: String,
    /// Date maturity is checked against; the load date when unset.
    pub as_of: Option<NaiveDate>,
    pub on_invalid: InvalidPolicy,
}

impl Default for DepositConfig {
    fn default() -> Self {
        Self {
            marker: DEFAULT_MARKER.to_string(),
            as_of: None,
            on_invalid: InvalidPolicy::default(),
        }
    }
}

impl DepositConfig {
    pub fn from_options(
        options: &HashMap<String, String>,
        plugin_config: Option<&str>,
    ) -> Result<Self, LedgerError> {
        let mut config = Self::default();

        for (key, value) in options {
            if let Some(key) = key.strip_prefix(OPTION_PREFIX) {
                config.set(key, value)?;
            }
        }

        for pair in plugin_config.unwrap_or_default().split_whitespace() {
            let (key, value) = pair.split_once('=').ok_or(LedgerError::InvalidOption {
                key: pair.to_string(),
                value: String::new(),
            })?;
            config.set(key, value)?;
        }

        Ok(config)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), LedgerError> {
        let invalid = || LedgerError::InvalidOption {
            key: key.to_string(),
            value: value.to_string(),
        };

        match key {
            "marker" if !value.is_empty() => self.marker = value.to_string(),
            "as_of" => {
                self.as_of =
                    Some(NaiveDate::parse_from_str(value, "%Y-%m-%d").map_err(|_| invalid())?)
            }
            "on_invalid" => self.on_invalid = value.parse().map_err(|_| invalid())?,
            _ => return Err(invalid()),
        }
        Ok(())
    }
}
