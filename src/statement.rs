use crate::account::Account;
use crate::amount::{parse_number, Amount};
use crate::directive::{Custom, CustomValue, Directive, DirectiveKind};
use crate::parser::{inner_str, Rule};
use crate::transaction::{ParsedTransaction, Transaction, TxnHeader};
use chrono::NaiveDate;
use pest::iterators::Pair;

use std::convert::TryFrom;

#[derive(Debug, PartialEq)]
pub enum Statement<'s> {
    Custom(NaiveDate, &'s str, Vec<CustomValue>),
    OpenAccount(NaiveDate, Account, Vec<&'s str>),
    CloseAccount(NaiveDate, Account),
    Pad(NaiveDate, Account, Account),
    Balance(NaiveDate, Account, Amount),
    Transaction(NaiveDate, TxnHeader<'s>, ParsedTransaction),
}

impl<'s> TryFrom<Pair<'s, Rule>> for Statement<'s> {
    type Error = anyhow::Error;

    fn try_from(pair: Pair<'s, Rule>) -> Result<Self, Self::Error> {
        let inner = pair.into_inner().next().ok_or(anyhow::Error::msg(
            "invalid next token, expected statements",
        ))?;
        Self::into_statement(inner)
    }
}

macro_rules! parse_next {
    ($parser:ident, $pairs:ident) => {
        $parser::parse($pairs.next().ok_or(anyhow::Error::msg(format!(
            "invalid next token, expected {}",
            stringify!($parser)
        )))?)?
    };
}

fn parse_custom_value(token: Pair<'_, Rule>) -> anyhow::Result<CustomValue> {
    let value = match token.as_rule() {
        Rule::string => CustomValue::Text(inner_str(token).to_string()),
        Rule::date => CustomValue::Date(NaiveDate::parse_from_str(token.as_str(), "%Y-%m-%d")?),
        Rule::bool => CustomValue::Bool(token.as_str() == "TRUE"),
        Rule::account => CustomValue::Account(Account::parse(token)?),
        Rule::amount => CustomValue::Amount(Amount::parse(token)?),
        Rule::number => CustomValue::Number(parse_number(token)?),
        _ => {
            return Err(anyhow::Error::msg(format!(
                "unexpected custom value: '{}'",
                token.as_str()
            )))
        }
    };
    Ok(value)
}

impl<'s> Statement<'s> {
    fn into_statement(statement: Pair<'s, Rule>) -> anyhow::Result<Self> {
        let tag = statement.as_rule();
        let mut pairs = statement.into_inner();
        let datestr = pairs
            .next()
            .ok_or(anyhow::Error::msg("invalid next token, expected date str"))?
            .as_str();
        let date = NaiveDate::parse_from_str(datestr, "%Y-%m-%d")?;

        let stmt = match tag {
            Rule::custom_statement => {
                let type_name = inner_str(pairs.next().ok_or(anyhow::Error::msg(
                    "invalid next token, expected custom type",
                ))?);
                Self::Custom(
                    date,
                    type_name,
                    pairs.map(parse_custom_value).collect::<anyhow::Result<_>>()?,
                )
            }
            Rule::open_statement => Self::OpenAccount(
                date,
                parse_next!(Account, pairs),
                pairs
                    .next()
                    .map(|currencies| currencies.into_inner().map(|c| c.as_str()).collect())
                    .unwrap_or_default(),
            ),
            Rule::close_statement => Self::CloseAccount(date, parse_next!(Account, pairs)),
            Rule::pad_statement => Self::Pad(
                date,
                parse_next!(Account, pairs),
                parse_next!(Account, pairs),
            ),
            Rule::balance_statement => Self::Balance(
                date,
                parse_next!(Account, pairs),
                parse_next!(Amount, pairs),
            ),
            Rule::transaction => {
                let header = parse_next!(TxnHeader, pairs);
                let parsed = match pairs.next() {
                    Some(postings) => ParsedTransaction::parse(postings)?,
                    None => ParsedTransaction {
                        postings: Vec::new(),
                    },
                };
                Self::Transaction(date, header, parsed)
            }
            _ => {
                return Err(anyhow::Error::msg(format!(
                    "unexpected statement: '{}'",
                    datestr
                )))
            }
        };

        Ok(stmt)
    }
}

impl From<Statement<'_>> for Directive {
    fn from(statement: Statement<'_>) -> Self {
        let (date, kind) = match statement {
            Statement::Custom(date, type_name, values) => (
                date,
                DirectiveKind::Custom(Custom {
                    type_name: type_name.to_string(),
                    values,
                }),
            ),
            Statement::OpenAccount(date, account, currencies) => (
                date,
                DirectiveKind::Open {
                    account,
                    currencies: currencies.into_iter().map(|c| c.to_string()).collect(),
                },
            ),
            Statement::CloseAccount(date, account) => (date, DirectiveKind::Close { account }),
            Statement::Pad(date, target, source) => (date, DirectiveKind::Pad { target, source }),
            Statement::Balance(date, account, amount) => {
                (date, DirectiveKind::Balance { account, amount })
            }
            Statement::Transaction(date, header, parsed) => (
                date,
                DirectiveKind::Transaction(Transaction::from_parsed(&header, parsed)),
            ),
        };
        Directive { date, kind }
    }
}
