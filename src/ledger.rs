//! Account ledger: transaction lines for one account with a running balance.
//!
//! The backend returns one page of journal lines plus the opening balance for
//! the page. Amounts arrive as numbers or numeric strings. Anything
//! unparseable counts as zero, matching how the table has always displayed it.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{lenient_amount, AccountId};

/// Query for `GET accounts/transactions`.
#[derive(Debug, Clone)]
pub struct TransactionQuery {
    pub account_id: AccountId,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub page: u32,
    pub per_page: u32,
}

impl TransactionQuery {
    pub fn new(account_id: AccountId) -> Self {
        Self {
            account_id,
            start_date: None,
            end_date: None,
            page: 1,
            per_page: 10,
        }
    }

    pub fn params(&self) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("account_id", self.account_id.to_string()),
            ("page", self.page.max(1).to_string()),
            ("per_page", self.per_page.max(1).to_string()),
        ];
        if let Some(start) = self.start_date {
            params.push(("start_date", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(end) = self.end_date {
            params.push(("end_date", end.format("%Y-%m-%d").to_string()));
        }
        params
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JournalTransaction {
    pub id: i64,
    #[serde(default)]
    pub number: String,
    #[serde(default)]
    pub sender_notes: Option<String>,
    #[serde(default)]
    pub sent_time: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionItem {
    #[serde(default)]
    pub id: Option<serde_json::Value>,
    #[serde(default)]
    pub transaction: Option<JournalTransaction>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub debit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub credit: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionPage {
    #[serde(default = "Vec::new")]
    pub data: Vec<TransactionItem>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub initial_balance: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub initial_debit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub initial_credit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub page_debit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub page_credit: Option<f64>,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct LedgerLine {
    pub date: Option<String>,
    pub number: Option<String>,
    pub description: String,
    pub notes: String,
    pub debit: f64,
    pub credit: f64,
    pub running_balance: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Ledger {
    pub initial_balance: f64,
    pub initial_debit: f64,
    pub initial_credit: f64,
    pub page_debit: f64,
    pub page_credit: f64,
    pub final_balance: f64,
    pub total: u64,
    pub lines: Vec<LedgerLine>,
}

impl Ledger {
    pub fn from_page(page: &TransactionPage) -> Self {
        let initial_balance = page.initial_balance.unwrap_or(0.0);
        let mut running = initial_balance;

        let lines = page
            .data
            .iter()
            .map(|item| {
                let debit = item.debit.unwrap_or(0.0);
                let credit = item.credit.unwrap_or(0.0);
                running += debit - credit;
                let tx = item.transaction.as_ref();
                LedgerLine {
                    // sent_time is a timestamp; only the date part is shown
                    date: tx
                        .and_then(|t| t.sent_time.as_deref())
                        .map(|s| s.chars().take(10).collect()),
                    number: tx.map(|t| t.number.clone()).filter(|n| !n.is_empty()),
                    description: tx
                        .and_then(|t| t.sender_notes.clone())
                        .unwrap_or_default(),
                    notes: item.notes.clone().unwrap_or_default(),
                    debit,
                    credit,
                    running_balance: running,
                }
            })
            .collect();

        Self {
            initial_balance,
            initial_debit: page.initial_debit.unwrap_or(0.0),
            initial_credit: page.initial_credit.unwrap_or(0.0),
            page_debit: page.page_debit.unwrap_or(0.0),
            page_credit: page.page_credit.unwrap_or(0.0),
            final_balance: running,
            total: page.total.map(|t| t.max(0.0) as u64).unwrap_or(0),
            lines,
        }
    }
}
