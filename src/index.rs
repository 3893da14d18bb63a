use std::collections::HashMap;

use alloy_primitives::Address;

use crate::types::LoanId;

/// open loan ids per borrower
///
/// Each borrower's ids live in an unordered vector. Removal swaps the last
/// element into the vacated slot, so iteration order changes after removals.
#[derive(Debug, Clone, Default)]
pub struct BorrowerIndex {
    loans_by_borrower: HashMap<Address, Vec<LoanId>>,
}

impl BorrowerIndex {
    pub fn new() -> Self {
        Self {
            loans_by_borrower: HashMap::new(),
        }
    }

    pub fn add(&mut self, borrower: Address, id: LoanId) {
        self.loans_by_borrower.entry(borrower).or_default().push(id);
    }

    /// swap-remove `id`; returns false when it was not indexed
    pub fn remove(&mut self, borrower: Address, id: LoanId) -> bool {
        let Some(ids) = self.loans_by_borrower.get_mut(&borrower) else {
            return false;
        };

        let Some(position) = ids.iter().position(|candidate| *candidate == id) else {
            return false;
        };

        ids.swap_remove(position);
        if ids.is_empty() {
            self.loans_by_borrower.remove(&borrower);
        }
        true
    }

    pub fn list(&self, borrower: Address) -> &[LoanId] {
        self.loans_by_borrower
            .get(&borrower)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn contains(&self, borrower: Address, id: LoanId) -> bool {
        self.list(borrower).contains(&id)
    }

    /// borrowers with at least one open loan
    pub fn borrowers(&self) -> impl Iterator<Item = &Address> {
        self.loans_by_borrower.keys()
    }

    /// every borrower with their ids in index order
    pub fn entries(&self) -> impl Iterator<Item = (&Address, &[LoanId])> {
        self.loans_by_borrower
            .iter()
            .map(|(borrower, ids)| (borrower, ids.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.loans_by_borrower.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.loans_by_borrower.is_empty()
    }
}
