use std::collections::BTreeMap;

use alloy_primitives::U256;

use crate::errors::{LedgerError, Result};
use crate::types::{Loan, LoanId, LoanRequest, LoanStatus};

/// canonical loan records keyed by sequential id
///
/// Records are never removed. A fully repaid loan stays here with status
/// `Closed` so historical lookups keep resolving.
#[derive(Debug, Clone, Default)]
pub struct LoanStore {
    loans: BTreeMap<LoanId, Loan>,
    next_id: LoanId,
}

impl LoanStore {
    pub fn new() -> Self {
        Self {
            loans: BTreeMap::new(),
            next_id: U256::ZERO,
        }
    }

    /// store a new loan under the next free id
    pub fn create(&mut self, request: LoanRequest) -> LoanId {
        let id = self.next_id;
        self.loans.insert(id, request.into_loan(id));
        self.next_id = id + U256::from(1u64);
        id
    }

    pub fn get(&self, id: LoanId) -> Option<&Loan> {
        self.loans.get(&id)
    }

    /// look up several ids, preserving input order
    pub fn get_many(&self, ids: &[LoanId]) -> Vec<Option<&Loan>> {
        ids.iter().map(|id| self.loans.get(id)).collect()
    }

    /// subtract from outstanding principal, returning what remains
    pub fn reduce_amount(&mut self, id: LoanId, delta: U256) -> Result<U256> {
        let loan = self.loans.get_mut(&id).ok_or(LedgerError::RecordNotFound { id })?;

        let remaining = loan
            .amount
            .checked_sub(delta)
            .ok_or(LedgerError::InsufficientPrincipal {
                available: loan.amount,
                requested: delta,
            })?;

        loan.amount = remaining;
        loan.status = if remaining.is_zero() {
            LoanStatus::Closed
        } else if remaining < loan.original_amount {
            LoanStatus::PartiallyRepaid
        } else {
            loan.status
        };

        Ok(remaining)
    }

    /// number of loans ever created
    pub fn count(&self) -> LoanId {
        self.next_id
    }

    pub fn iter(&self) -> impl Iterator<Item = &Loan> {
        self.loans.values()
    }

    /// rebuild from records, e.g. when restoring a snapshot
    pub(crate) fn from_records(records: Vec<Loan>, next_id: LoanId) -> Result<Self> {
        let mut loans = BTreeMap::new();
        for loan in records {
            if loan.id >= next_id {
                return Err(LedgerError::InvalidConfiguration {
                    message: format!("loan id {} is not below next id {}", loan.id, next_id),
                });
            }
            if loan.amount > loan.original_amount {
                return Err(LedgerError::InvalidConfiguration {
                    message: format!("loan {} owes more than it was opened with", loan.id),
                });
            }
            let id = loan.id;
            if loans.insert(id, loan).is_some() {
                return Err(LedgerError::InvalidConfiguration {
                    message: format!("duplicate loan id {}", id),
                });
            }
        }
        Ok(Self { loans, next_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;

    fn request(amount: u64) -> LoanRequest {
        LoanRequest {
            lender_order_id: U256::from(77u64),
            lender: Address::repeat_byte(0x11),
            borrower: Address::repeat_byte(0x22),
            relayer: Address::repeat_byte(0x33),
            asset: Address::repeat_byte(0x44),
            amount: U256::from(amount),
            terms: U256::from(12345u64),
        }
    }

    #[test]
    fn test_sequential_ids() {
        let mut store = LoanStore::new();
        assert_eq!(store.create(request(10)), U256::ZERO);
        assert_eq!(store.create(request(20)), U256::from(1u64));
        assert_eq!(store.create(request(30)), U256::from(2u64));
        assert_eq!(store.count(), U256::from(3u64));

        let loan = store.get(U256::from(1u64)).unwrap();
        assert_eq!(loan.amount, U256::from(20u64));
        assert_eq!(loan.original_amount, U256::from(20u64));
        assert_eq!(loan.status, LoanStatus::Active);
        assert_eq!(loan.lender_order_id, U256::from(77u64));
    }

    #[test]
    fn test_get_unknown_is_none() {
        let mut store = LoanStore::new();
        store.create(request(10));
        assert!(store.get(U256::from(5u64)).is_none());
    }

    #[test]
    fn test_get_many_preserves_order() {
        let mut store = LoanStore::new();
        for amount in [10, 20, 30] {
            store.create(request(amount));
        }

        let ids = [U256::from(2u64), U256::from(9u64), U256::ZERO];
        let found = store.get_many(&ids);
        assert_eq!(found.len(), 3);
        assert_eq!(found[0].map(|l| l.amount), Some(U256::from(30u64)));
        assert!(found[1].is_none());
        assert_eq!(found[2].map(|l| l.amount), Some(U256::from(10u64)));
    }

    #[test]
    fn test_reduce_amount_transitions() {
        let mut store = LoanStore::new();
        let id = store.create(request(100));

        assert_eq!(store.reduce_amount(id, U256::ZERO).unwrap(), U256::from(100u64));
        assert_eq!(store.get(id).unwrap().status, LoanStatus::Active);

        assert_eq!(store.reduce_amount(id, U256::from(40u64)).unwrap(), U256::from(60u64));
        assert_eq!(store.get(id).unwrap().status, LoanStatus::PartiallyRepaid);

        assert_eq!(store.reduce_amount(id, U256::from(60u64)).unwrap(), U256::ZERO);
        let loan = store.get(id).unwrap();
        assert_eq!(loan.status, LoanStatus::Closed);
        assert_eq!(loan.repaid(), U256::from(100u64));
    }

    #[test]
    fn test_reduce_amount_rejects_excess() {
        let mut store = LoanStore::new();
        let id = store.create(request(100));

        let result = store.reduce_amount(id, U256::from(101u64));
        assert_eq!(
            result,
            Err(LedgerError::InsufficientPrincipal {
                available: U256::from(100u64),
                requested: U256::from(101u64),
            })
        );
        assert_eq!(store.get(id).unwrap().amount, U256::from(100u64));
        assert_eq!(store.get(id).unwrap().status, LoanStatus::Active);

        let missing = store.reduce_amount(U256::from(3u64), U256::from(1u64));
        assert!(matches!(missing, Err(LedgerError::RecordNotFound { .. })));
    }

    #[test]
    fn test_from_records_validates() {
        let mut store = LoanStore::new();
        store.create(request(100));
        let records: Vec<Loan> = store.iter().cloned().collect();

        assert!(LoanStore::from_records(records.clone(), U256::from(1u64)).is_ok());
        assert!(LoanStore::from_records(records.clone(), U256::ZERO).is_err());

        let mut doubled = records.clone();
        doubled.extend(records);
        assert!(LoanStore::from_records(doubled, U256::from(1u64)).is_err());
    }
}
