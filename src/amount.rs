use crate::parser::Rule;
use anyhow::{anyhow, Result};
use indexmap::IndexMap;
use pest::iterators::Pair;
use rust_decimal::Decimal;

use std::fmt;
use std::str::FromStr;

/// A number of units of a single currency.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Amount {
    pub number: Decimal,
    pub currency: String,
}

impl Amount {
    pub fn new(number: Decimal, currency: impl Into<String>) -> Self {
        Self {
            number,
            currency: currency.into(),
        }
    }

    pub fn parse(token: Pair<'_, Rule>) -> Result<Amount> {
        if token.as_rule() != Rule::amount {
            return Err(anyhow!(format!(
                "unexpected token for amount: '{}'",
                token.as_str()
            )));
        }

        let mut amount = token.into_inner();
        Ok(Self {
            number: parse_number(
                amount
                    .next()
                    .ok_or(anyhow!(format!("invalid number: '{}'", amount.as_str())))?,
            )?,
            currency: amount
                .next()
                .ok_or(anyhow!(format!("invalid currency: '{}'", amount.as_str())))?
                .as_str()
                .to_string(),
        })
    }

    pub fn is_zero(&self) -> bool {
        self.number.is_zero()
    }
}

pub(crate) fn parse_number(token: Pair<'_, Rule>) -> Result<Decimal> {
    Decimal::from_str(token.as_str())
        .map_err(|e| anyhow!(format!("invalid number '{}': {}", token.as_str(), e)))
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.number, self.currency)
    }
}

impl std::ops::Neg for &Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        Amount {
            number: -self.number,
            currency: self.currency.clone(),
        }
    }
}

impl std::ops::Neg for Amount {
    type Output = Amount;

    fn neg(self) -> Self::Output {
        -&self
    }
}

/// Running per-currency sum, currencies kept in the order they were first seen.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Residual(IndexMap<String, Decimal>);

impl Residual {
    pub fn new() -> Self {
        Self(IndexMap::new())
    }

    pub fn add(&mut self, amount: &Amount) {
        *self.0.entry(amount.currency.clone()).or_default() += amount.number;
    }

    pub fn units(&self, currency: &str) -> Decimal {
        self.0.get(currency).copied().unwrap_or_default()
    }

    pub fn is_zero(&self) -> bool {
        self.0.values().all(|n| n.is_zero())
    }

    /// Non-zero positions as amounts.
    pub fn amounts(&self) -> impl Iterator<Item = Amount> + '_ {
        self.0
            .iter()
            .filter(|(_, n)| !n.is_zero())
            .map(|(c, n)| Amount::new(*n, c.as_str()))
    }
}

impl<'a> FromIterator<&'a Amount> for Residual {
    fn from_iter<I: IntoIterator<Item = &'a Amount>>(iter: I) -> Self {
        let mut residual = Residual::new();
        for amount in iter {
            residual.add(amount);
        }
        residual
    }
}

impl fmt::Display for Residual {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let amounts: Vec<String> = self.amounts().map(|a| a.to_string()).collect();
        if amounts.is_empty() {
            write!(f, "0")
        } else {
            write!(f, "{}", amounts.join(", "))
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::account::Account;
    use crate::amount::{Amount, Residual};
    use crate::parser::{LedgerParser, Rule};
    use pest::Parser;
    use rust_decimal::Decimal;

    use anyhow::{anyhow, Result};

    #[test]
    fn parse_wrong_token() -> Result<()> {
        let mut tokens = LedgerParser::parse(Rule::account, "Assets:Checking")?;
        let amount = Amount::parse(tokens.next().ok_or(anyhow!("no token"))?);
        assert_eq!(
            format!("{}", amount.unwrap_err()),
            "unexpected token for amount: 'Assets:Checking'"
        );

        let account: Account = "Assets:Checking".parse()?;
        assert_eq!(account.to_string(), "Assets:Checking");
        Ok(())
    }

    #[test]
    fn parse_amount() -> Result<()> {
        let mut tokens = LedgerParser::parse(Rule::amount, "5000.25 CAD")?;

        let amount = Amount::parse(tokens.next().ok_or(anyhow!("no token"))?)?;
        assert_eq!(amount, Amount::new(Decimal::new(500025, 2), "CAD"));
        assert_eq!(amount.to_string(), "5000.25 CAD");

        Ok(())
    }

    #[test]
    fn parse_negative_amount() -> Result<()> {
        let mut tokens = LedgerParser::parse(Rule::amount, "-227.5000\tCAD")?;
        let amount = Amount::parse(tokens.next().ok_or(anyhow!("no token"))?)?;
        assert_eq!(amount.number, Decimal::new(-2275, 1));
        assert_eq!(-&amount, Amount::new(Decimal::new(2275, 1), "CAD"));
        Ok(())
    }

    #[test]
    fn residual_per_currency() {
        let amounts = vec![
            Amount::new(Decimal::new(5000, 0), "CAD"),
            Amount::new(Decimal::new(-1500, 0), "USD"),
            Amount::new(Decimal::new(-5000, 0), "CAD"),
        ];
        let residual: Residual = amounts.iter().collect();

        assert!(!residual.is_zero());
        assert_eq!(residual.units("CAD"), Decimal::ZERO);
        assert_eq!(residual.units("USD"), Decimal::new(-1500, 0));
        assert_eq!(residual.to_string(), "-1500 USD");

        let balanced: Residual = amounts[..1].iter().chain(&amounts[2..]).collect();
        assert!(balanced.is_zero());
        assert_eq!(balanced.to_string(), "0");
    }
}
