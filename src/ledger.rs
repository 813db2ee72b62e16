use crate::{
    account::{Account, AccountStore},
    amount::{Amount, Residual},
    directive::{Directive, DirectiveKind},
    error::LedgerError,
    transaction::{Posting, Transaction},
};
use chrono::naive::NaiveDate;
use std::collections::{BTreeMap, HashMap};
use tracing::trace;

#[derive(Debug, Default)]
pub struct DayBook {
    entries: Vec<Directive>,
}

impl DayBook {
    pub fn new() -> DayBook {
        DayBook {
            entries: Vec::new(),
        }
    }

    pub fn entries(&self) -> &Vec<Directive> {
        &self.entries
    }

    pub fn transactions(&self) -> impl Iterator<Item = &Transaction> {
        self.entries.iter().filter_map(Directive::as_transaction)
    }
}

/// Booked entries, grouped by day, with running balances per account.
///
/// Entries are expected in ledger order (see
/// [`sort_directives`][crate::directive::sort_directives]); each one is validated against
/// what was booked before it.
#[derive(Debug, Default)]
pub struct Ledger {
    accounts: AccountStore,
    bookings: BTreeMap<NaiveDate, DayBook>,
    options: HashMap<String, String>,
    balances: BTreeMap<Account, Residual>,
    pending_pads: HashMap<Account, (NaiveDate, Account)>,
}

impl Ledger {
    pub fn new() -> Ledger {
        Ledger {
            accounts: AccountStore::new(),
            bookings: BTreeMap::new(),
            options: HashMap::new(),
            balances: BTreeMap::new(),
            pending_pads: HashMap::new(),
        }
    }

    pub fn with_options(options: HashMap<String, String>) -> Ledger {
        Ledger {
            options,
            ..Ledger::new()
        }
    }

    pub fn set_option(&mut self, key: &str, val: &str) {
        self.options.insert(key.to_string(), val.to_string());
    }

    pub fn get_option(&self, key: &str) -> Option<&String> {
        self.options.get(key)
    }

    pub fn get_at(&self, date: &NaiveDate) -> Option<&DayBook> {
        self.bookings.get(date)
    }

    /// All booked entries in ledger order.
    pub fn entries(&self) -> impl Iterator<Item = &Directive> {
        self.bookings.values().flat_map(|book| book.entries.iter())
    }

    pub fn accounts(&self) -> &AccountStore {
        &self.accounts
    }

    /// Current units of `currency` held by `account`.
    pub fn balance(&self, account: &Account, currency: &str) -> Amount {
        let units = self
            .balances
            .get(account)
            .map(|r| r.units(currency))
            .unwrap_or_default();
        Amount::new(units, currency)
    }

    /// Books every entry, collecting diagnostics instead of stopping at the first one.
    /// Entries that fail validation are left out of the ledger.
    pub fn book_all(&mut self, entries: Vec<Directive>) -> Vec<LedgerError> {
        entries
            .into_iter()
            .filter_map(|entry| self.book(entry).err())
            .collect()
    }

    pub fn book(&mut self, entry: Directive) -> Result<(), LedgerError> {
        trace!(date = %entry.date, "booking {}", entry);
        let Directive { date, kind } = entry;
        let kind = match kind {
            DirectiveKind::Transaction(txn) => {
                DirectiveKind::Transaction(self.transaction(date, txn)?)
            }
            other => {
                self.check(date, &other)?;
                other
            }
        };

        self.bookings
            .entry(date)
            .or_default()
            .entries
            .push(Directive { date, kind });
        Ok(())
    }

    fn check(&mut self, date: NaiveDate, kind: &DirectiveKind) -> Result<(), LedgerError> {
        match kind {
            DirectiveKind::Open { account, .. } => self.accounts.open(account, date),
            DirectiveKind::Close { account } => self.accounts.close(account, date),
            DirectiveKind::Pad { target, source } => {
                self.accounts.ensure_open(target, date)?;
                self.accounts.ensure_open(source, date)?;
                self.pending_pads
                    .insert(target.clone(), (date, source.clone()));
                Ok(())
            }
            DirectiveKind::Balance { account, amount } => {
                self.balance_assertion(date, account, amount)
            }
            DirectiveKind::Transaction(_) | DirectiveKind::Custom(_) => Ok(()),
        }
    }

    fn post(&mut self, account: &Account, amount: &Amount) {
        self.balances.entry(account.clone()).or_default().add(amount);
    }

    /// Validates accounts, fills in an elided posting and checks the postings sum to zero.
    fn transaction(
        &mut self,
        date: NaiveDate,
        mut txn: Transaction,
    ) -> Result<Transaction, LedgerError> {
        for posting in &txn.postings {
            self.accounts.ensure_open(&posting.account, date)?;
        }

        if txn.elided_count() > 1 {
            return Err(LedgerError::TooManyElided { date });
        }

        let residual = txn.residual();
        if let Some(idx) = txn.postings.iter().position(|p| p.amount.is_none()) {
            let elided = txn.postings.remove(idx);
            for (offset, amount) in residual.amounts().enumerate() {
                txn.postings.insert(
                    idx + offset,
                    Posting {
                        account: elided.account.clone(),
                        amount: Some(-amount),
                    },
                );
            }
        } else if !residual.is_zero() {
            return Err(LedgerError::Unbalanced { date, residual });
        }

        for posting in &txn.postings {
            if let Some(amount) = &posting.amount {
                self.post(&posting.account, amount);
            }
        }

        Ok(txn)
    }

    fn balance_assertion(
        &mut self,
        date: NaiveDate,
        account: &Account,
        expected: &Amount,
    ) -> Result<(), LedgerError> {
        self.accounts.ensure_open(account, date)?;

        let actual = self.balance(account, &expected.currency);
        let difference = expected.number - actual.number;

        if let Some((pad_date, source)) = self.pending_pads.remove(account) {
            if !difference.is_zero() {
                let padding = Amount::new(difference, expected.currency.as_str());
                let txn = Transaction::new(format!("Padding {} to {}", account, expected))
                    .posting(account, padding.clone())
                    .posting(&source, -padding);
                trace!(date = %pad_date, "padding {}", account);
                let booked = self.transaction(pad_date, txn)?;
                self.bookings
                    .entry(pad_date)
                    .or_default()
                    .entries
                    .push(Directive::transaction(pad_date, booked));
            }
            return Ok(());
        }

        if difference.is_zero() {
            Ok(())
        } else {
            Err(LedgerError::BalanceMismatch {
                account: account.clone(),
                date,
                expected: expected.clone(),
                actual,
            })
        }
    }
}
