mod calc;
mod expand;

pub use calc::{add_months, calc_interest};
pub use expand::expand;

use crate::account::Account;
use crate::amount::Amount;
use crate::directive::{Custom, CustomValue, Directive};
use crate::error::DepositError;

use chrono::NaiveDate;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// One `custom "GIC"` statement with its positional values resolved.
///
/// ```text
/// date custom "GIC" Name Source Income Principal Rate Months [Destination]
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct DepositDeclaration {
    pub date: NaiveDate,
    /// Account created for the deposit itself.
    pub name: Account,
    pub source_account: Account,
    pub income_account: Account,
    pub principal: Amount,
    pub annual_rate_percent: Decimal,
    pub duration_months: Decimal,
    /// Where principal and interest go at maturity, `source_account` unless given.
    pub destination_account: Account,
}

fn account_at(
    date: NaiveDate,
    values: &[CustomValue],
    idx: usize,
    field: &str,
) -> Result<Account, DepositError> {
    match &values[idx] {
        CustomValue::Account(account) => Ok(account.clone()),
        other => Err(DepositError::invalid(
            date,
            format!("{} must be an account, got {} `{}'", field, other.type_name(), other),
        )),
    }
}

fn number_at(
    date: NaiveDate,
    values: &[CustomValue],
    idx: usize,
    field: &str,
) -> Result<Decimal, DepositError> {
    match &values[idx] {
        CustomValue::Number(n) => Ok(*n),
        other => Err(DepositError::invalid(
            date,
            format!("{} must be a number, got {} `{}'", field, other.type_name(), other),
        )),
    }
}

impl DepositDeclaration {
    pub fn from_custom(date: NaiveDate, custom: &Custom) -> Result<Self, DepositError> {
        let values = &custom.values;
        if !(6..=7).contains(&values.len()) {
            return Err(DepositError::invalid(
                date,
                format!("expected 6 or 7 values, got {}", values.len()),
            ));
        }

        let principal = match &values[3] {
            CustomValue::Amount(amount) => amount.clone(),
            other => {
                return Err(DepositError::invalid(
                    date,
                    format!("principal must be an amount, got {} `{}'", other.type_name(), other),
                ))
            }
        };
        if principal.number.is_sign_negative() && !principal.number.is_zero() {
            return Err(DepositError::invalid(
                date,
                format!("principal must not be negative, got {}", principal),
            ));
        }

        let duration_months = number_at(date, values, 5, "duration")?;
        if duration_months <= Decimal::ZERO || !duration_months.fract().is_zero() {
            return Err(DepositError::invalid(
                date,
                format!(
                    "duration must be a positive whole number of months, got {}",
                    duration_months
                ),
            ));
        }

        let source_account = account_at(date, values, 1, "source account")?;
        let destination_account = match values.len() {
            7 => account_at(date, values, 6, "destination account")?,
            _ => source_account.clone(),
        };

        Ok(Self {
            date,
            name: account_at(date, values, 0, "deposit account")?,
            source_account,
            income_account: account_at(date, values, 2, "income account")?,
            principal,
            annual_rate_percent: number_at(date, values, 4, "interest rate")?,
            duration_months,
            destination_account,
        })
    }

    pub(crate) fn months(&self) -> Result<i32, DepositError> {
        self.duration_months.to_i32().ok_or_else(|| {
            DepositError::invalid(
                self.date,
                format!("duration of {} months is out of range", self.duration_months),
            )
        })
    }
}

impl TryFrom<&Directive> for DepositDeclaration {
    type Error = DepositError;

    fn try_from(directive: &Directive) -> Result<Self, Self::Error> {
        let custom = directive
            .as_custom()
            .ok_or_else(|| DepositError::invalid(directive.date, "not a custom directive"))?;
        Self::from_custom(directive.date, custom)
    }
}

/// Maturity facts computed from a declaration.
#[derive(Clone, Debug, PartialEq)]
pub struct DerivedDeposit {
    pub maturity_date: NaiveDate,
    /// Principal plus interest, in the principal's currency.
    pub maturity_amount: Amount,
    /// Interest earned over the whole term.
    pub interest: Amount,
}

impl DerivedDeposit {
    pub fn derive(declaration: &DepositDeclaration) -> Result<Self, DepositError> {
        let maturity_date = add_months(declaration.date, declaration.months()?)?;
        let principal = declaration.principal.number;
        let out_of_range = || {
            DepositError::invalid(
                declaration.date,
                format!(
                    "maturity value of {} at {}% over {} months is out of range",
                    declaration.principal,
                    declaration.annual_rate_percent,
                    declaration.duration_months
                ),
            )
        };

        let maturity = calc_interest(
            declaration.annual_rate_percent,
            declaration.duration_months,
            principal,
        )
        .ok_or_else(out_of_range)?;
        let interest = maturity.checked_sub(principal).ok_or_else(out_of_range)?;
        let currency = declaration.principal.currency.as_str();

        Ok(Self {
            maturity_date,
            maturity_amount: Amount::new(maturity, currency),
            interest: Amount::new(interest, currency),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{anyhow, Result};

    fn values(extra: Vec<CustomValue>) -> Result<Vec<CustomValue>> {
        let mut values = vec![
            CustomValue::Account("Assets:GIC:Flexible".parse()?),
            CustomValue::Account("Assets:MainBank:Chequing".parse()?),
            CustomValue::Account("Income:GIC:Interest".parse()?),
            CustomValue::Amount(Amount::new(Decimal::new(5000, 0), "CAD")),
            CustomValue::Number(Decimal::new(455, 2)),
            CustomValue::Number(Decimal::from(12)),
        ];
        values.extend(extra);
        Ok(values)
    }

    fn declare(values: Vec<CustomValue>) -> Result<DepositDeclaration, DepositError> {
        let date = NaiveDate::from_ymd_opt(2021, 1, 2).unwrap_or_default();
        let directive = Directive::custom(date, "GIC", values);
        DepositDeclaration::try_from(&directive)
    }

    #[test]
    fn destination_defaults_to_source() -> Result<()> {
        let declaration = declare(values(vec![])?)?;
        assert_eq!(declaration.destination_account, declaration.source_account);
        assert_eq!(declaration.name.to_string(), "Assets:GIC:Flexible");
        assert_eq!(declaration.income_account.to_string(), "Income:GIC:Interest");
        assert_eq!(declaration.principal.currency, "CAD");
        assert_eq!(declaration.annual_rate_percent, Decimal::new(455, 2));
        assert_eq!(declaration.duration_months, Decimal::from(12));
        Ok(())
    }

    #[test]
    fn explicit_destination() -> Result<()> {
        let declaration =
            declare(values(vec![CustomValue::Account("Assets:Savings".parse()?)])?)?;
        assert_eq!(declaration.destination_account.to_string(), "Assets:Savings");
        assert_eq!(declaration.source_account.to_string(), "Assets:MainBank:Chequing");
        Ok(())
    }

    #[test]
    fn reject_wrong_arity() -> Result<()> {
        let mut short = values(vec![])?;
        short.pop();
        let err = declare(short).unwrap_err();
        assert_eq!(
            err.to_string(),
            "invalid deposit declaration at 2021-01-02: expected 6 or 7 values, got 5"
        );

        let long = values(vec![
            CustomValue::Account("Assets:Savings".parse()?),
            CustomValue::Bool(true),
        ])?;
        assert!(matches!(
            declare(long),
            Err(DepositError::InvalidDeclaration { .. })
        ));
        Ok(())
    }

    #[test]
    fn reject_wrong_types() -> Result<()> {
        let mut swapped = values(vec![])?;
        swapped.swap(3, 4);
        assert_eq!(
            declare(swapped).unwrap_err().to_string(),
            "invalid deposit declaration at 2021-01-02: principal must be an amount, got number `4.55'"
        );

        let mut text_account = values(vec![])?;
        text_account[2] = CustomValue::Text("Income:GIC:Interest".to_string());
        assert!(declare(text_account).is_err());
        Ok(())
    }

    #[test]
    fn reject_bad_duration_and_principal() -> Result<()> {
        for months in [Decimal::ZERO, Decimal::from(-3), Decimal::new(65, 1)] {
            let mut bad = values(vec![])?;
            bad[5] = CustomValue::Number(months);
            assert!(declare(bad).is_err(), "duration {} accepted", months);
        }

        let mut negative = values(vec![])?;
        negative[3] = CustomValue::Amount(Amount::new(Decimal::from(-1), "CAD"));
        assert!(declare(negative).is_err());

        let mut zero = values(vec![])?;
        zero[3] = CustomValue::Amount(Amount::new(Decimal::ZERO, "CAD"));
        assert!(declare(zero).is_ok());
        Ok(())
    }

    #[test]
    fn reject_non_custom_directive() -> Result<()> {
        let date = NaiveDate::from_ymd_opt(2021, 1, 2).ok_or(anyhow!("invalid date"))?;
        let open = Directive::open(date, &"Assets:GIC:Flexible".parse()?);
        assert!(DepositDeclaration::try_from(&open).is_err());
        Ok(())
    }

    #[test]
    fn derive_maturity() -> Result<()> {
        let declaration = declare(values(vec![])?)?;
        let derived = DerivedDeposit::derive(&declaration)?;
        assert_eq!(
            derived.maturity_date,
            NaiveDate::from_ymd_opt(2022, 1, 2).ok_or(anyhow!("invalid date"))?
        );
        assert_eq!(
            derived.maturity_amount,
            Amount::new(Decimal::new(52275, 1), "CAD")
        );
        assert_eq!(derived.interest, Amount::new(Decimal::new(2275, 1), "CAD"));
        Ok(())
    }

    #[test]
    fn derive_duration_past_calendar() -> Result<()> {
        let mut long = values(vec![])?;
        long[5] = CustomValue::Number(Decimal::from(i32::MAX));
        let date = NaiveDate::from_ymd_opt(2021, 12, 1).ok_or(anyhow!("invalid date"))?;
        let declaration = DepositDeclaration::try_from(&Directive::custom(date, "GIC", long))?;

        assert_eq!(
            DerivedDeposit::derive(&declaration),
            Err(DepositError::DateArithmetic {
                date,
                months: i32::MAX
            })
        );
        Ok(())
    }

    #[test]
    fn derive_maturity_value_out_of_range() -> Result<()> {
        let mut huge = values(vec![])?;
        huge[3] = CustomValue::Amount(Amount::new(
            Decimal::from_i128_with_scale(50_000_000_000_000_000_000_000_000_000, 0),
            "CAD",
        ));
        huge[4] = CustomValue::Number(Decimal::ONE_HUNDRED);
        let declaration = declare(huge)?;

        let err = DerivedDeposit::derive(&declaration).unwrap_err();
        assert!(matches!(err, DepositError::InvalidDeclaration { .. }));
        assert!(err.to_string().ends_with("is out of range"), "{}", err);
        Ok(())
    }
}
