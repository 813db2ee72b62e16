use chrono::NaiveDate;
use tracing::{info, warn};

use crate::config::{DepositConfig, InvalidPolicy};
use crate::deposit::{expand, DepositDeclaration};
use crate::directive::{sort_directives, Directive};
use crate::error::LedgerError;

/// Load-wide facts handed to every plugin.
#[derive(Clone, Debug, PartialEq)]
pub struct PluginContext {
    /// Date the ledger is loaded at, unless overridden by plugin configuration.
    pub today: NaiveDate,
}

#[derive(Debug, Default, PartialEq)]
pub struct PluginOutput {
    pub entries: Vec<Directive>,
    pub errors: Vec<LedgerError>,
}

/// A transformation over the whole entry stream, run between parsing and booking.
pub trait Plugin {
    fn name(&self) -> &'static str;

    /// Consumes the entries and returns the new stream plus any diagnostics. An `Err`
    /// aborts the whole load.
    fn process(
        &self,
        entries: Vec<Directive>,
        ctx: &PluginContext,
    ) -> Result<PluginOutput, LedgerError>;
}

/// Replaces every deposit declaration with the entries of its lifecycle.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DepositPlugin {
    config: DepositConfig,
}

impl DepositPlugin {
    pub const NAME: &'static str = "GIC";

    pub fn new(config: DepositConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DepositConfig {
        &self.config
    }

    fn is_declaration(&self, entry: &Directive) -> bool {
        entry
            .as_custom()
            .map_or(false, |custom| custom.type_name == self.config.marker)
    }
}

impl Plugin for DepositPlugin {
    fn name(&self) -> &'static str {
        Self::NAME
    }

    fn process(
        &self,
        entries: Vec<Directive>,
        ctx: &PluginContext,
    ) -> Result<PluginOutput, LedgerError> {
        let as_of = self.config.as_of.unwrap_or(ctx.today);
        let (declarations, mut merged): (Vec<Directive>, Vec<Directive>) = entries
            .into_iter()
            .partition(|entry| self.is_declaration(entry));

        let mut errors = Vec::new();
        let mut expanded = Vec::new();
        for entry in &declarations {
            match DepositDeclaration::try_from(entry).and_then(|d| expand(&d, as_of)) {
                Ok(entries) => expanded.extend(entries),
                Err(err) if self.config.on_invalid == InvalidPolicy::Skip => {
                    warn!(date = %entry.date, error = %err, "skipping deposit declaration");
                    errors.push(err.into());
                }
                Err(err) => return Err(err.into()),
            }
        }

        info!(
            declarations = declarations.len(),
            generated = expanded.len(),
            skipped = errors.len(),
            %as_of,
            "expanded deposit declarations"
        );

        merged.extend(expanded);
        sort_directives(&mut merged);

        Ok(PluginOutput {
            entries: merged,
            errors,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::amount::Amount;
    use crate::directive::{CustomValue, DirectiveKind};
    use anyhow::{anyhow, Result};
    use rust_decimal::Decimal;

    fn ymd(y: i32, m: u32, d: u32) -> Result<NaiveDate> {
        NaiveDate::from_ymd_opt(y, m, d).ok_or(anyhow!("invalid date"))
    }

    fn gic(date: NaiveDate, months: i64) -> Result<Directive> {
        Ok(Directive::custom(
            date,
            "GIC",
            vec![
                CustomValue::Account("Assets:GIC:Flexible".parse()?),
                CustomValue::Account("Assets:MainBank:Chequing".parse()?),
                CustomValue::Account("Income:GIC:Interest".parse()?),
                CustomValue::Amount(Amount::new(Decimal::new(5000, 0), "CAD")),
                CustomValue::Number(Decimal::new(455, 2)),
                CustomValue::Number(Decimal::from(months)),
            ],
        ))
    }

    fn stream() -> Result<Vec<Directive>> {
        let date = ymd(2021, 1, 2)?;
        Ok(vec![
            gic(date, 12)?,
            Directive::open(date, &"Assets:MainBank:Chequing".parse()?),
            Directive::open(date, &"Income:GIC:Interest".parse()?),
            Directive::custom(date, "budget", vec![CustomValue::Text("food".to_string())]),
        ])
    }

    fn describe(entries: &[Directive]) -> Vec<String> {
        entries
            .iter()
            .map(|e| match &e.kind {
                DirectiveKind::Open { account, .. } => format!("{} open {}", e.date, account),
                DirectiveKind::Close { account } => format!("{} close {}", e.date, account),
                DirectiveKind::Transaction(txn) => format!("{} txn {}", e.date, txn.postings.len()),
                DirectiveKind::Custom(c) => format!("{} custom {}", e.date, c.type_name),
                _ => format!("{} other", e.date),
            })
            .collect()
    }

    #[test]
    fn merge_matured_declaration() -> Result<()> {
        let ctx = PluginContext {
            today: ymd(2023, 1, 1)?,
        };
        let output = DepositPlugin::default().process(stream()?, &ctx)?;

        assert!(output.errors.is_empty());
        assert_eq!(
            describe(&output.entries),
            vec![
                "2021-01-02 open Assets:MainBank:Chequing",
                "2021-01-02 open Income:GIC:Interest",
                "2021-01-02 open Assets:GIC:Flexible",
                "2021-01-02 custom budget",
                "2021-01-02 txn 2",
                "2022-01-02 txn 3",
                "2022-01-02 close Assets:GIC:Flexible",
            ]
        );
        Ok(())
    }

    #[test]
    fn configured_as_of_overrides_today() -> Result<()> {
        let ctx = PluginContext {
            today: ymd(2023, 1, 1)?,
        };
        let plugin = DepositPlugin::new(DepositConfig {
            as_of: Some(ymd(2021, 6, 1)?),
            ..DepositConfig::default()
        });
        let output = plugin.process(stream()?, &ctx)?;
        assert_eq!(output.entries.len(), 5);
        Ok(())
    }

    #[test]
    fn rerun_is_idempotent() -> Result<()> {
        let ctx = PluginContext {
            today: ymd(2023, 1, 1)?,
        };
        let plugin = DepositPlugin::default();
        let once = plugin.process(stream()?, &ctx)?;
        let twice = plugin.process(once.entries.clone(), &ctx)?;
        assert_eq!(once, twice);
        Ok(())
    }

    #[test]
    fn abort_on_invalid_declaration() -> Result<()> {
        let ctx = PluginContext {
            today: ymd(2023, 1, 1)?,
        };
        let mut entries = stream()?;
        entries.push(gic(ymd(2021, 1, 31)?, 1)?);

        let err = DepositPlugin::default().process(entries, &ctx).unwrap_err();
        assert!(matches!(
            err,
            LedgerError::Deposit(crate::error::DepositError::DateArithmetic { months: 1, .. })
        ));
        Ok(())
    }

    #[test]
    fn skip_invalid_declaration() -> Result<()> {
        let ctx = PluginContext {
            today: ymd(2023, 1, 1)?,
        };
        let mut entries = stream()?;
        entries.push(Directive::custom(ymd(2021, 3, 1)?, "GIC", vec![]));

        let plugin = DepositPlugin::new(DepositConfig {
            on_invalid: InvalidPolicy::Skip,
            ..DepositConfig::default()
        });
        let output = plugin.process(entries, &ctx)?;
        assert_eq!(output.errors.len(), 1);
        assert_eq!(output.entries.len(), 7);
        Ok(())
    }

    #[test]
    fn custom_marker() -> Result<()> {
        let ctx = PluginContext {
            today: ymd(2023, 1, 1)?,
        };
        let plugin = DepositPlugin::new(DepositConfig {
            marker: "TD".to_string(),
            ..DepositConfig::default()
        });
        let output = plugin.process(stream()?, &ctx)?;
        // the "GIC" declaration is no longer recognised and stays as is
        assert_eq!(output.entries.len(), 4);
        assert!(output.entries.iter().any(|e| e
            .as_custom()
            .map_or(false, |c| c.type_name == "GIC")));
        Ok(())
    }
}
