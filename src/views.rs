//! serialization support for loans
use alloy_primitives::{Address, U256};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::interest::is_overdue;
use crate::types::{Loan, LoanId, LoanStatus};

/// serializable view of a loan with its terms unpacked
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanView {
    pub id: LoanId,
    pub status: LoanStatus,
    pub parties: PartiesView,
    pub principal: PrincipalView,
    pub terms: TermsView,
    pub is_overdue: bool,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PartiesView {
    pub lender: Address,
    pub borrower: Address,
    pub relayer: Address,
    pub asset: Address,
    pub lender_order_id: U256,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PrincipalView {
    pub outstanding: U256,
    pub original: U256,
    pub repaid: U256,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TermsView {
    pub packed: U256,
    pub interest_rate: Rate,
    pub relayer_fee_rate: Rate,
    pub start_at: Option<DateTime<Utc>>,
    pub due_at: Option<DateTime<Utc>>,
    pub duration_seconds: u64,
    pub gas_price: u32,
    pub salt: String,
}

impl LoanView {
    /// build a view as of `current_time` (unix seconds)
    pub fn from_loan(loan: &Loan, current_time: u64) -> Self {
        let terms = loan.decoded_terms();

        LoanView {
            id: loan.id,
            status: loan.status,
            parties: PartiesView {
                lender: loan.lender,
                borrower: loan.borrower,
                relayer: loan.relayer,
                asset: loan.asset,
                lender_order_id: loan.lender_order_id,
            },
            principal: PrincipalView {
                outstanding: loan.amount,
                original: loan.original_amount,
                repaid: loan.repaid(),
            },
            terms: TermsView {
                packed: loan.terms,
                interest_rate: terms.annual_rate(),
                relayer_fee_rate: terms.relayer_share(),
                start_at: to_datetime(terms.start_at),
                due_at: to_datetime(terms.due_at()),
                duration_seconds: terms.duration,
                gas_price: terms.gas_price,
                salt: format!("{:#x}", terms.salt),
            },
            is_overdue: loan.is_open() && is_overdue(&terms, current_time),
        }
    }

    /// convert to pretty-printed json string
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

fn to_datetime(seconds: u64) -> Option<DateTime<Utc>> {
    i64::try_from(seconds)
        .ok()
        .and_then(|s| DateTime::from_timestamp(s, 0))
}
