use alloy_primitives::Address;
use chrono::{DateTime, Utc};
use hourglass_rs::SafeTimeProvider;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::config::LedgerConfig;
use crate::errors::{LedgerError, Result};
use crate::index::BorrowerIndex;
use crate::ledger::LoanLedger;
use crate::store::LoanStore;
use crate::types::{Loan, LoanId, LoanStatus};

/// one borrower's slice of the index, in index order
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowerEntry {
    pub borrower: Address,
    pub loan_ids: Vec<LoanId>,
}

/// point-in-time copy of a ledger for persistence and audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    pub snapshot_id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub trigger: String,
    pub config: LedgerConfig,
    pub next_id: LoanId,
    pub loans: Vec<Loan>,
    pub borrower_index: Vec<BorrowerEntry>,
}

impl LedgerSnapshot {
    pub fn capture(ledger: &LoanLedger, trigger: String, time_provider: &SafeTimeProvider) -> Self {
        let mut borrower_index: Vec<BorrowerEntry> = ledger
            .index()
            .entries()
            .map(|(borrower, ids)| BorrowerEntry {
                borrower: *borrower,
                loan_ids: ids.to_vec(),
            })
            .collect();
        borrower_index.sort_by(|a, b| a.borrower.cmp(&b.borrower));

        Self {
            snapshot_id: Uuid::new_v4(),
            timestamp: time_provider.now(),
            trigger,
            config: ledger.config.clone(),
            next_id: ledger.store().count(),
            loans: ledger.store().iter().cloned().collect(),
            borrower_index,
        }
    }

    /// rebuild a ledger, checking that index and records agree
    pub fn restore(self) -> Result<LoanLedger> {
        self.config.validate()?;

        for loan in &self.loans {
            let closed = loan.status == LoanStatus::Closed;
            if closed != loan.amount.is_zero() {
                return Err(inconsistent(format!(
                    "loan {} has status {:?} with amount {}",
                    loan.id, loan.status, loan.amount
                )));
            }
        }

        let store = LoanStore::from_records(self.loans, self.next_id)?;

        let mut index = BorrowerIndex::new();
        for entry in self.borrower_index {
            for id in entry.loan_ids {
                let loan = store.get(id).ok_or(LedgerError::RecordNotFound { id })?;
                if loan.borrower != entry.borrower || !loan.is_open() {
                    return Err(inconsistent(format!(
                        "loan {} is not an open loan of {}",
                        id, entry.borrower
                    )));
                }
                if index.contains(entry.borrower, id) {
                    return Err(inconsistent(format!("loan {} indexed twice", id)));
                }
                index.add(entry.borrower, id);
            }
        }

        if let Some(missing) = store.iter().find(|l| l.is_open() && !index.contains(l.borrower, l.id)) {
            return Err(inconsistent(format!("open loan {} is not indexed", missing.id)));
        }

        Ok(LoanLedger::from_parts(self.config, store, index))
    }

    pub fn to_json_pretty(&self) -> std::result::Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json).map_err(|e| LedgerError::InvalidConfiguration {
            message: e.to_string(),
        })
    }
}

fn inconsistent(message: String) -> LedgerError {
    LedgerError::InvalidConfiguration { message }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terms::LoanTerms;
    use crate::types::LoanRequest;
    use alloy_primitives::U256;
    use chrono::TimeZone;
    use hourglass_rs::TimeSource;

    fn ledger_with_loans() -> LoanLedger {
        let mut ledger = LoanLedger::new(LedgerConfig::default()).unwrap();
        let terms = LoanTerms::new(800, 1_000, 86_400, 500).with_salt(9).encode().unwrap();

        for (borrower, amount) in [(0xaa, 100u64), (0xbb, 200), (0xaa, 300)] {
            ledger
                .create_loan(LoanRequest {
                    lender_order_id: U256::from(amount),
                    lender: Address::repeat_byte(0x11),
                    borrower: Address::repeat_byte(borrower),
                    relayer: Address::repeat_byte(0x33),
                    asset: Address::repeat_byte(0x44),
                    amount: U256::from(amount),
                    terms,
                })
                .unwrap();
        }
        ledger.reduce_loan(U256::ZERO, U256::from(100u64)).unwrap();
        ledger.reduce_loan(U256::from(1u64), U256::from(50u64)).unwrap();
        ledger
    }

    fn time() -> SafeTimeProvider {
        SafeTimeProvider::new(TimeSource::Test(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()))
    }

    #[test]
    fn test_capture_and_restore_through_json() {
        let ledger = ledger_with_loans();
        let snapshot = LedgerSnapshot::capture(&ledger, "nightly".to_string(), &time());
        assert_eq!(snapshot.loans.len(), 3);
        assert_eq!(snapshot.next_id, U256::from(3u64));

        let json = snapshot.to_json_pretty().unwrap();
        let restored = LedgerSnapshot::from_json(&json).unwrap().restore().unwrap();

        let alice = Address::repeat_byte(0xaa);
        let bob = Address::repeat_byte(0xbb);
        assert_eq!(restored.index().list(alice), ledger.index().list(alice));
        assert_eq!(restored.index().list(bob), ledger.index().list(bob));
        assert_eq!(restored.get_loan(U256::ZERO).unwrap().status, LoanStatus::Closed);
        assert_eq!(
            restored.get_loan(U256::from(1u64)).unwrap().amount,
            U256::from(150u64)
        );
        assert_eq!(restored.store().count(), U256::from(3u64));
    }

    #[test]
    fn test_restored_ledger_keeps_numbering() {
        let ledger = ledger_with_loans();
        let snapshot = LedgerSnapshot::capture(&ledger, "handover".to_string(), &time());
        let mut restored = snapshot.restore().unwrap();

        let terms = LoanTerms::new(100, 0, 10, 0).encode().unwrap();
        let id = restored
            .create_loan(LoanRequest {
                lender_order_id: U256::ZERO,
                lender: Address::repeat_byte(0x11),
                borrower: Address::repeat_byte(0xcc),
                relayer: Address::repeat_byte(0x33),
                asset: Address::repeat_byte(0x44),
                amount: U256::from(5u64),
                terms,
            })
            .unwrap();
        assert_eq!(id, U256::from(3u64));
    }

    #[test]
    fn test_restore_rejects_inconsistent_index() {
        let ledger = ledger_with_loans();

        let mut unindexed = LedgerSnapshot::capture(&ledger, "broken".to_string(), &time());
        unindexed.borrower_index.clear();
        assert!(matches!(
            unindexed.restore(),
            Err(LedgerError::InvalidConfiguration { .. })
        ));

        let mut closed_indexed = LedgerSnapshot::capture(&ledger, "broken".to_string(), &time());
        closed_indexed.borrower_index.push(BorrowerEntry {
            borrower: Address::repeat_byte(0xaa),
            loan_ids: vec![U256::ZERO],
        });
        assert!(closed_indexed.restore().is_err());

        let mut bad_status = LedgerSnapshot::capture(&ledger, "broken".to_string(), &time());
        bad_status.loans[1].status = LoanStatus::Closed;
        assert!(bad_status.restore().is_err());

        let mut unknown = LedgerSnapshot::capture(&ledger, "broken".to_string(), &time());
        unknown.borrower_index[0].loan_ids.push(U256::from(99u64));
        assert!(matches!(
            unknown.restore(),
            Err(LedgerError::RecordNotFound { .. })
        ));
    }
}
