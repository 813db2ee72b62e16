use crate::account::Account;
use crate::amount::Amount;
use crate::transaction::Transaction;

use chrono::NaiveDate;
use rust_decimal::Decimal;

use std::fmt;

/// A typed value attached to a `custom` directive.
#[derive(Clone, Debug, PartialEq)]
pub enum CustomValue {
    Text(String),
    Date(NaiveDate),
    Bool(bool),
    Account(Account),
    Amount(Amount),
    Number(Decimal),
}

impl CustomValue {
    /// Short name of the value type, used in diagnostics.
    pub fn type_name(&self) -> &'static str {
        match self {
            CustomValue::Text(_) => "string",
            CustomValue::Date(_) => "date",
            CustomValue::Bool(_) => "bool",
            CustomValue::Account(_) => "account",
            CustomValue::Amount(_) => "amount",
            CustomValue::Number(_) => "number",
        }
    }
}

impl fmt::Display for CustomValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CustomValue::Text(s) => write!(f, "{:?}", s),
            CustomValue::Date(d) => write!(f, "{}", d),
            CustomValue::Bool(true) => write!(f, "TRUE"),
            CustomValue::Bool(false) => write!(f, "FALSE"),
            CustomValue::Account(a) => write!(f, "{}", a),
            CustomValue::Amount(a) => write!(f, "{}", a),
            CustomValue::Number(n) => write!(f, "{}", n),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Custom {
    pub type_name: String,
    pub values: Vec<CustomValue>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum DirectiveKind {
    Open {
        account: Account,
        currencies: Vec<String>,
    },
    Close {
        account: Account,
    },
    Pad {
        target: Account,
        source: Account,
    },
    Balance {
        account: Account,
        amount: Amount,
    },
    Transaction(Transaction),
    Custom(Custom),
}

/// A dated ledger entry.
#[derive(Clone, Debug, PartialEq)]
pub struct Directive {
    pub date: NaiveDate,
    pub kind: DirectiveKind,
}

impl Directive {
    pub fn open(date: NaiveDate, account: &Account) -> Self {
        Self {
            date,
            kind: DirectiveKind::Open {
                account: account.clone(),
                currencies: Vec::new(),
            },
        }
    }

    pub fn close(date: NaiveDate, account: &Account) -> Self {
        Self {
            date,
            kind: DirectiveKind::Close {
                account: account.clone(),
            },
        }
    }

    pub fn transaction(date: NaiveDate, txn: Transaction) -> Self {
        Self {
            date,
            kind: DirectiveKind::Transaction(txn),
        }
    }

    pub fn custom(date: NaiveDate, type_name: impl Into<String>, values: Vec<CustomValue>) -> Self {
        Self {
            date,
            kind: DirectiveKind::Custom(Custom {
                type_name: type_name.into(),
                values,
            }),
        }
    }

    pub fn as_transaction(&self) -> Option<&Transaction> {
        match &self.kind {
            DirectiveKind::Transaction(txn) => Some(txn),
            _ => None,
        }
    }

    pub fn as_custom(&self) -> Option<&Custom> {
        match &self.kind {
            DirectiveKind::Custom(custom) => Some(custom),
            _ => None,
        }
    }

    /// Same-day ordering: opens first, then balance assertions, everything
    /// else, and closes last.
    pub fn sort_priority(&self) -> i8 {
        match self.kind {
            DirectiveKind::Open { .. } => -2,
            DirectiveKind::Balance { .. } => -1,
            DirectiveKind::Close { .. } => 2,
            _ => 0,
        }
    }

    pub fn sort_key(&self) -> (NaiveDate, i8) {
        (self.date, self.sort_priority())
    }
}

/// Stable sort by [`Directive::sort_key`]; entries sharing a key keep their
/// relative order.
pub fn sort_directives(directives: &mut [Directive]) {
    directives.sort_by_key(Directive::sort_key);
}

impl fmt::Display for Directive {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            DirectiveKind::Open {
                account,
                currencies,
            } => {
                write!(f, "{} open {}", self.date, account)?;
                if !currencies.is_empty() {
                    write!(f, " {}", currencies.join(","))?;
                }
                Ok(())
            }
            DirectiveKind::Close { account } => write!(f, "{} close {}", self.date, account),
            DirectiveKind::Pad { target, source } => {
                write!(f, "{} pad {} {}", self.date, target, source)
            }
            DirectiveKind::Balance { account, amount } => {
                write!(f, "{} balance {} {}", self.date, account, amount)
            }
            DirectiveKind::Transaction(txn) => {
                write!(f, "{} {}", self.date, txn.state)?;
                if let Some(payee) = &txn.payee {
                    write!(f, " {:?}", payee)?;
                }
                write!(f, " {:?}", txn.narration)?;
                for posting in &txn.postings {
                    write!(f, "\n  {}", posting.account)?;
                    if let Some(amount) = &posting.amount {
                        write!(f, "  {}", amount)?;
                    }
                }
                Ok(())
            }
            DirectiveKind::Custom(custom) => {
                write!(f, "{} custom {:?}", self.date, custom.type_name)?;
                for value in &custom.values {
                    write!(f, " {}", value)?;
                }
                Ok(())
            }
        }
    }
}
