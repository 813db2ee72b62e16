use chrono::NaiveDate;
use tracing::debug;

use super::{DepositDeclaration, DerivedDeposit};
use crate::directive::Directive;
use crate::error::DepositError;
use crate::transaction::Transaction;

/// Expands one declaration into its lifecycle entries.
///
/// The deposit account is opened and funded on the declaration date. When `as_of`
/// is past the maturity date, the payout and the closing of the deposit account are
/// added as well. Entries come back as open, transfer, [settlement, close]; putting
/// them in ledger order is left to the caller.
pub fn expand(
    declaration: &DepositDeclaration,
    as_of: NaiveDate,
) -> Result<Vec<Directive>, DepositError> {
    let derived = DerivedDeposit::derive(declaration)?;
    let principal = &declaration.principal;

    let mut entries = vec![
        Directive::open(declaration.date, &declaration.name),
        Directive::transaction(
            declaration.date,
            Transaction::new(format!("GIC deposit {}", declaration.name))
                .posting(&declaration.name, principal.clone())
                .posting(&declaration.source_account, -principal),
        ),
    ];

    let matured = as_of > derived.maturity_date;
    if matured {
        entries.push(Directive::transaction(
            derived.maturity_date,
            Transaction::new(format!("GIC maturity {}", declaration.name))
                .posting(
                    &declaration.destination_account,
                    derived.maturity_amount.clone(),
                )
                .posting(&declaration.name, -principal)
                .posting(&declaration.income_account, -&derived.interest),
        ));
        entries.push(Directive::close(derived.maturity_date, &declaration.name));
    }

    debug!(
        account = %declaration.name,
        maturity = %derived.maturity_date,
        payout = %derived.maturity_amount,
        matured,
        "expanded deposit declaration"
    );

    Ok(entries)
}
