//! Roasted GIC - fixed-term deposits for text based double-book ledgers
//! ---
//!
//! A single `custom "GIC"` statement describes a guaranteed investment certificate (or
//! any other fixed-term deposit): where the principal comes from, where the interest is
//! booked, the annual rate and the duration in months.
//!
//! ```text
//! plugin "GIC"
//!
//! 2022-11-29 custom "GIC" Assets:GIC:Flexible Assets:Bank:Chequing Income:GIC:Interest 5000 CAD 4.5 12
//! ```
//!
//! When the ledger is loaded the statement is expanded into the deposit lifecycle: the
//! deposit account is opened, the principal moves in, and once the maturity date has
//! passed the principal plus simple interest is paid out and the account is closed.
//!
//! The crate carries just enough of a ledger to host the expansion: a parser for the
//! subset of syntax involved, a structured [`Directive`][directive::Directive] model that
//! plugins consume and produce, and a booking step that checks every transaction balances.

extern crate pest;
#[macro_use]
extern crate pest_derive;

/// Parse and manage accounts syntaxes, e.g. `Assets:Bank:Jawir`.
///
/// Unlike [Beancount](https://beancount.github.io), accounts may be closed temporarily and
/// reopened at a later date; postings against a closed account are rejected until then.
pub mod account;

pub mod amount;
pub mod config;

/// Fixed-term deposit declarations, maturity arithmetic and expansion.
pub mod deposit;

/// Structured ledger entries as seen by plugins.
pub mod directive;

pub mod error;

/// Ledger representation and booking.
pub mod ledger;

/// Parse, run plugins, book.
pub mod loader;

/// Our main parser entrypoints.
pub mod parser;

/// Entry stream transformations run between parsing and booking.
pub mod plugin;

mod statement;
pub mod transaction;

pub use deposit::{expand, DepositDeclaration};
pub use error::{DepositError, LedgerError};
pub use loader::{load_file, load_str, LoadOptions};
pub use parser::parse;
pub use plugin::{DepositPlugin, Plugin, PluginContext, PluginOutput};
