use crate::parser::{inner_str, Rule};
use crate::{
    account::Account,
    amount::{Amount, Residual},
};

use pest::iterators::Pair;

use anyhow::{anyhow, Result};

use std::fmt;

#[derive(Debug, PartialEq)]
pub struct TxnHeader<'th> {
    pub(crate) state: TransactionState,
    pub(crate) payee: Option<&'th str>,
    pub(crate) narration: &'th str,
}

impl<'th> TxnHeader<'th> {
    pub fn parse(token: Pair<'th, Rule>) -> Result<TxnHeader<'th>> {
        let mut token = token.into_inner();

        let state = token
            .next()
            .ok_or(anyhow!("invalid next token, transaction state expected",))?;

        let state = match state.as_str() {
            "*" => TransactionState::Settled,
            "!" => TransactionState::Unsettled,
            _ => return Err(anyhow!("invalid transaction state")),
        };

        // with a single string it's the narration, with two the first one is the payee
        let mut narration = token.next().map(inner_str).unwrap_or_default();
        let mut payee = None;
        if let Some(actual_narration) = token.next() {
            payee = Some(narration);
            narration = inner_str(actual_narration);
        }

        Ok(TxnHeader {
            state,
            payee,
            narration,
        })
    }
}

#[derive(Debug, PartialEq)]
pub struct ParsedTransaction {
    pub(crate) postings: Vec<Posting>,
}

impl ParsedTransaction {
    pub fn parse(token: Pair<'_, Rule>) -> Result<ParsedTransaction> {
        let mut postings = Vec::new();

        for pair in token.into_inner() {
            let mut tpairs = pair.into_inner();
            let account = Account::parse(
                tpairs
                    .next()
                    .ok_or(anyhow!("invalid next token, expected posting account"))?,
            )?;
            let amount = tpairs.next().map(Amount::parse).transpose()?;
            postings.push(Posting { account, amount });
        }

        if postings.iter().filter(|p| p.amount.is_none()).count() > 1 {
            return Err(anyhow!("only 1 account can has its amount elided"));
        }

        Ok(ParsedTransaction { postings })
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TransactionState {
    Settled,   // '*'
    Unsettled, // '!'
}

impl fmt::Display for TransactionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransactionState::Settled => write!(f, "*"),
            TransactionState::Unsettled => write!(f, "!"),
        }
    }
}

/// One signed amount against one account. The amount may be elided and is then
/// filled in during booking.
#[derive(Clone, Debug, PartialEq)]
pub struct Posting {
    pub account: Account,
    pub amount: Option<Amount>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Transaction {
    pub state: TransactionState,
    pub payee: Option<String>,
    pub narration: String,
    pub postings: Vec<Posting>,
}

impl Transaction {
    /// Settled transaction without postings, to be filled with [`Transaction::posting`].
    pub fn new(narration: impl Into<String>) -> Self {
        Self {
            state: TransactionState::Settled,
            payee: None,
            narration: narration.into(),
            postings: Vec::new(),
        }
    }

    pub fn from_parsed(header: &TxnHeader, parsed: ParsedTransaction) -> Self {
        Self {
            state: header.state,
            payee: header.payee.map(|p| p.to_string()),
            narration: header.narration.to_string(),
            postings: parsed.postings,
        }
    }

    pub fn posting(mut self, account: &Account, amount: Amount) -> Self {
        self.postings.push(Posting {
            account: account.clone(),
            amount: Some(amount),
        });
        self
    }

    pub fn elided_count(&self) -> usize {
        self.postings.iter().filter(|p| p.amount.is_none()).count()
    }

    /// Sum of all explicit posting amounts.
    pub fn residual(&self) -> Residual {
        self.postings.iter().filter_map(|p| p.amount.as_ref()).collect()
    }

    pub fn is_balanced(&self) -> bool {
        self.elided_count() == 0 && self.residual().is_zero()
    }
}
