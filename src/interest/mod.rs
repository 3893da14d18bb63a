pub mod accrual;

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::terms::LoanTerms;

pub use accrual::{is_overdue, AccrualEngine, SECONDS_PER_YEAR};

/// interest calculation result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct InterestCalculation {
    pub principal_base: U256,
    /// seconds elapsed since the loan started
    pub time_delta: u64,
    pub total_interest: U256,
    /// relayer's cut of total_interest
    pub relayer_fee: U256,
}

impl InterestCalculation {
    /// interest left for the lender once the relayer is paid, if any
    pub fn lender_interest(&self) -> Option<U256> {
        self.total_interest.checked_sub(self.relayer_fee)
    }
}

/// trait for interest calculations
pub trait InterestCalculator {
    fn calculate_interest(
        &self,
        terms: &LoanTerms,
        principal: U256,
        current_time: u64,
    ) -> Result<InterestCalculation>;

    fn is_overdue(&self, terms: &LoanTerms, current_time: u64) -> bool;
}
