use crate::directive::Directive;
use crate::statement::Statement;
use anyhow::{anyhow, Result};
use pest::iterators::Pair;
use pest::Parser;

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[grammar = "ledger.pest"]
pub struct LedgerParser;

/// A `plugin "name" "config"` line.
#[derive(Clone, Debug, PartialEq)]
pub struct PluginDecl {
    pub name: String,
    pub config: Option<String>,
}

/// Everything read from a ledger source, in input order, before any plugin ran.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ParsedLedger {
    pub options: HashMap<String, String>,
    pub plugins: Vec<PluginDecl>,
    pub directives: Vec<Directive>,
}

impl ParsedLedger {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }
}

pub fn parse_file(path: &Path, carried_ledger: Option<ParsedLedger>) -> Result<ParsedLedger> {
    let fcontent = fs::read_to_string(path)
        .map_err(|e| anyhow!(format!("cannot read `{}': {}", path.display(), e)))?;
    parse_with_base(&fcontent, path.parent(), carried_ledger)
}

/// Parses ledger input as string slice, `include` paths are taken as is.
pub fn parse(input: &str, carried_ledger: Option<ParsedLedger>) -> Result<ParsedLedger> {
    parse_with_base(input, None, carried_ledger)
}

fn parse_with_base(
    input: &str,
    base: Option<&Path>,
    carried_ledger: Option<ParsedLedger>,
) -> Result<ParsedLedger> {
    let statements = LedgerParser::parse(Rule::ledger, input)?;
    let mut ledger = carried_ledger.unwrap_or_default();

    for statement in statements {
        match statement.as_rule() {
            Rule::include => {
                let statement_str = statement.as_str().to_string();
                let target = inner_str(
                    statement
                        .into_inner()
                        .next()
                        .ok_or(anyhow!(format!("unexpected token: {}", statement_str)))?,
                );
                let path = match base {
                    Some(dir) => dir.join(target),
                    None => PathBuf::from(target),
                };
                ledger = parse_file(&path, Some(ledger))?
            }
            Rule::option => {
                let mut option = statement.into_inner();
                let key = inner_str(
                    option
                        .next()
                        .ok_or(anyhow!(format!("invalid next token: {}", option.as_str())))?,
                );
                let val = inner_str(
                    option
                        .next()
                        .ok_or(anyhow!(format!("invalid next token: {}", option.as_str())))?,
                );
                ledger.options.insert(key.to_string(), val.to_string());
            }
            Rule::plugin => {
                let mut plugin = statement.into_inner();
                let name = inner_str(
                    plugin
                        .next()
                        .ok_or(anyhow!(format!("invalid next token: {}", plugin.as_str())))?,
                );
                let config = plugin.next().map(|c| inner_str(c).to_string());
                ledger.plugins.push(PluginDecl {
                    name: name.to_string(),
                    config,
                });
            }
            Rule::statement => {
                let statement: Statement = statement.try_into()?;
                ledger.directives.push(statement.into());
            }
            Rule::EOI => (),
            _ => return Err(anyhow!(format!("unexpected token: {}", statement.as_str()))),
        };
    }

    Ok(ledger)
}

pub fn inner_str(token: Pair<'_, Rule>) -> &str {
    token
        .into_inner()
        .next()
        .map(|inner| inner.as_str())
        .unwrap_or_default()
}
