use alloy_primitives::U256;
use tracing::debug;

use crate::decimal::RATE_BASIS;
use crate::errors::{LedgerError, Result};
use crate::interest::{InterestCalculation, InterestCalculator};
use crate::terms::LoanTerms;

/// fixed 365-day year in seconds
pub const SECONDS_PER_YEAR: u64 = 365 * 24 * 60 * 60;

/// engine for simple, time-proportional interest
///
/// All arithmetic is unsigned 256-bit with truncating division. Products are
/// checked so an overflow surfaces as an error rather than wrapping.
#[derive(Debug, Clone, Copy, Default)]
pub struct AccrualEngine;

impl AccrualEngine {
    pub fn new() -> Self {
        Self
    }

    /// seconds elapsed since the loan started
    pub fn time_delta(&self, terms: &LoanTerms, current_time: u64) -> Result<u64> {
        current_time
            .checked_sub(terms.start_at)
            .ok_or(LedgerError::ClockSkew {
                start_at: terms.start_at,
                current_time,
            })
    }

    /// amount * rate * seconds / (basis * seconds per year), truncated
    pub fn calculate_simple_interest(
        &self,
        principal: U256,
        interest_rate: u16,
        time_delta: u64,
    ) -> Result<U256> {
        let numerator = principal
            .checked_mul(U256::from(interest_rate))
            .and_then(|v| v.checked_mul(U256::from(time_delta)))
            .ok_or(LedgerError::ArithmeticOverflow {
                operation: "interest numerator",
            })?;

        let denominator = U256::from(RATE_BASIS) * U256::from(SECONDS_PER_YEAR);
        Ok(numerator / denominator)
    }

    /// interest * fee rate / basis, truncated
    pub fn calculate_relayer_fee(&self, total_interest: U256, relayer_fee_rate: u16) -> Result<U256> {
        let numerator = total_interest
            .checked_mul(U256::from(relayer_fee_rate))
            .ok_or(LedgerError::ArithmeticOverflow {
                operation: "relayer fee",
            })?;

        Ok(numerator / U256::from(RATE_BASIS))
    }
}

impl InterestCalculator for AccrualEngine {
    fn calculate_interest(
        &self,
        terms: &LoanTerms,
        principal: U256,
        current_time: u64,
    ) -> Result<InterestCalculation> {
        let time_delta = self.time_delta(terms, current_time)?;
        let total_interest = self.calculate_simple_interest(principal, terms.interest_rate, time_delta)?;
        let relayer_fee = self.calculate_relayer_fee(total_interest, terms.relayer_fee_rate)?;

        debug!(
            %principal,
            time_delta,
            %total_interest,
            %relayer_fee,
            "interest calculated"
        );

        Ok(InterestCalculation {
            principal_base: principal,
            time_delta,
            total_interest,
            relayer_fee,
        })
    }

    fn is_overdue(&self, terms: &LoanTerms, current_time: u64) -> bool {
        is_overdue(terms, current_time)
    }
}

/// a loan is overdue once start + duration lies strictly in the past
pub fn is_overdue(terms: &LoanTerms, current_time: u64) -> bool {
    terms.due_at() < current_time
}
