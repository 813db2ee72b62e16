use chrono::NaiveDate;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::LedgerError;
use crate::parser::Rule;
use pest::iterators::Pair;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum AccountType {
    Assets,
    Liabilities,
    Equity,
    Income,
    Expenses,
}

impl AccountType {
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Assets => "Assets",
            AccountType::Liabilities => "Liabilities",
            AccountType::Equity => "Equity",
            AccountType::Income => "Income",
            AccountType::Expenses => "Expenses",
        }
    }

    fn from_root(root: &str) -> Option<AccountType> {
        match root {
            "Assets" => Some(AccountType::Assets),
            "Liabilities" => Some(AccountType::Liabilities),
            "Equity" => Some(AccountType::Equity),
            "Income" => Some(AccountType::Income),
            "Expenses" => Some(AccountType::Expenses),
            _ => None,
        }
    }
}

/// A colon delimited account path, e.g. `Assets:GIC:Flexible`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Account {
    kind: AccountType,
    segments: Vec<String>,
}

impl Account {
    pub fn kind(&self) -> AccountType {
        self.kind
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    pub fn parse(token: Pair<'_, Rule>) -> anyhow::Result<Account> {
        token.as_str().parse()
    }
}

impl fmt::Display for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind.as_str(), self.segments.join(":"))
    }
}

impl FromStr for Account {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || anyhow::Error::msg(format!("input `{}' is not a valid token for Account", s));

        let mut parts = s.split(':');
        let kind = parts
            .next()
            .and_then(AccountType::from_root)
            .ok_or_else(invalid)?;
        let segments: Vec<String> = parts.map(|p| p.to_string()).collect();

        if segments.is_empty() || segments.iter().any(|s| s.is_empty()) {
            return Err(invalid());
        }

        Ok(Account { kind, segments })
    }
}

impl TryFrom<&str> for Account {
    type Error = anyhow::Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        s.parse()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct AccountActivities {
    opened_at: NaiveDate,
    closed_at: Option<NaiveDate>,
}

impl AccountActivities {
    fn covers(&self, date: NaiveDate) -> bool {
        self.opened_at <= date && self.closed_at.map_or(true, |closed| date <= closed)
    }
}

/// Tracks when each account is open.
///
/// An account keeps every open/close window it went through, so a closed account
/// may be opened again later on.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct AccountStore {
    accounts: BTreeMap<Account, Vec<AccountActivities>>,
}

impl AccountStore {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn open(&mut self, acc: &Account, at: NaiveDate) -> Result<(), LedgerError> {
        let activities = self.accounts.entry(acc.clone()).or_default();
        if activities.iter().any(|a| a.closed_at.is_none()) {
            return Err(LedgerError::DuplicateOpen {
                account: acc.clone(),
                date: at,
            });
        }

        activities.push(AccountActivities {
            opened_at: at,
            closed_at: None,
        });
        Ok(())
    }

    pub fn close(&mut self, acc: &Account, at: NaiveDate) -> Result<(), LedgerError> {
        self.accounts
            .get_mut(acc)
            .and_then(|activities| activities.iter_mut().find(|a| a.closed_at.is_none()))
            .filter(|activity| activity.opened_at <= at)
            .map(|activity| activity.closed_at = Some(at))
            .ok_or(LedgerError::UnopenedAccount {
                account: acc.clone(),
                date: at,
            })
    }

    pub fn is_open_at(&self, acc: &Account, date: NaiveDate) -> bool {
        self.accounts
            .get(acc)
            .map_or(false, |activities| activities.iter().any(|a| a.covers(date)))
    }

    pub fn ensure_open(&self, acc: &Account, date: NaiveDate) -> Result<(), LedgerError> {
        if self.is_open_at(acc, date) {
            Ok(())
        } else {
            Err(LedgerError::UnopenedAccount {
                account: acc.clone(),
                date,
            })
        }
    }

    pub fn accounts(&self) -> impl Iterator<Item = &Account> {
        self.accounts.keys()
    }
}
