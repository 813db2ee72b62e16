use chrono::NaiveDate;
use thiserror::Error;

use crate::account::Account;
use crate::amount::{Amount, Residual};

/// Failures while turning a deposit declaration into ledger entries.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum DepositError {
    #[error("invalid deposit declaration at {date}: {reason}")]
    InvalidDeclaration { date: NaiveDate, reason: String },

    #[error("{date} plus {months} month(s) does not fall on a calendar date")]
    DateArithmetic { date: NaiveDate, months: i32 },
}

impl DepositError {
    pub(crate) fn invalid(date: NaiveDate, reason: impl Into<String>) -> Self {
        DepositError::InvalidDeclaration {
            date,
            reason: reason.into(),
        }
    }
}

/// Diagnostics reported while loading and booking a ledger.
#[derive(Clone, Debug, Error, PartialEq)]
pub enum LedgerError {
    #[error(transparent)]
    Deposit(#[from] DepositError),

    #[error("unknown plugin `{0}'")]
    UnknownPlugin(String),

    #[error("invalid value `{value}' for option `{key}'")]
    InvalidOption { key: String, value: String },

    #[error("account `{account}' is not opened at {date}")]
    UnopenedAccount { account: Account, date: NaiveDate },

    #[error("account `{account}' is already opened at {date}")]
    DuplicateOpen { account: Account, date: NaiveDate },

    #[error("transaction at {date} does not balance: {residual}")]
    Unbalanced { date: NaiveDate, residual: Residual },

    #[error("transaction at {date}: only 1 posting can has its amount elided")]
    TooManyElided { date: NaiveDate },

    #[error("balance of `{account}' at {date} is {actual}, expected {expected}")]
    BalanceMismatch {
        account: Account,
        date: NaiveDate,
        expected: Amount,
        actual: Amount,
    },
}
