use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::terms::LoanTerms;

/// unique identifier for a loan, assigned sequentially from zero
pub type LoanId = U256;

/// loan status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoanStatus {
    /// principal fully outstanding
    Active,
    /// some principal repaid, still open
    PartiallyRepaid,
    /// principal repaid in full; kept for history, no longer indexed
    Closed,
}

impl LoanStatus {
    pub fn is_open(&self) -> bool {
        !matches!(self, LoanStatus::Closed)
    }
}

/// a loan record as held by the store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub id: LoanId,
    /// reference to the lend offer this loan was filled from
    pub lender_order_id: U256,
    pub lender: Address,
    pub borrower: Address,
    pub relayer: Address,
    pub asset: Address,
    /// outstanding principal
    pub amount: U256,
    /// principal at creation
    pub original_amount: U256,
    /// packed terms word, immutable after creation
    pub terms: U256,
    pub status: LoanStatus,
}

impl Loan {
    /// decoded view of the packed terms
    pub fn decoded_terms(&self) -> LoanTerms {
        LoanTerms::decode(self.terms)
    }

    pub fn is_open(&self) -> bool {
        self.status.is_open()
    }

    /// principal repaid so far
    pub fn repaid(&self) -> U256 {
        self.original_amount.saturating_sub(self.amount)
    }
}

/// parameters for opening a loan, as supplied by the authorization layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRequest {
    pub lender_order_id: U256,
    pub lender: Address,
    pub borrower: Address,
    pub relayer: Address,
    pub asset: Address,
    pub amount: U256,
    pub terms: U256,
}

impl LoanRequest {
    pub(crate) fn into_loan(self, id: LoanId) -> Loan {
        Loan {
            id,
            lender_order_id: self.lender_order_id,
            lender: self.lender,
            borrower: self.borrower,
            relayer: self.relayer,
            asset: self.asset,
            amount: self.amount,
            original_amount: self.amount,
            terms: self.terms,
            status: LoanStatus::Active,
        }
    }
}

/// amounts owed on a repayment and where they go
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct RepaymentQuote {
    pub principal: U256,
    pub interest: U256,
    pub relayer_fee: U256,
    /// gas reimbursement in asset units; not priced yet, always zero
    pub gas_cost: U256,
    /// principal + interest - relayer fee
    pub to_lender: U256,
    /// relayer fee + gas cost
    pub to_relayer: U256,
}

impl RepaymentQuote {
    pub fn total(&self) -> U256 {
        self.to_lender.saturating_add(self.to_relayer)
    }
}
