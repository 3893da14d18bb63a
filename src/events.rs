use alloy_primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::types::LoanId;

/// all events that can be emitted by the ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Event {
    LoanCreated {
        loan_id: LoanId,
        lender_order_id: U256,
        lender: Address,
        borrower: Address,
        relayer: Address,
        asset: Address,
        amount: U256,
        terms: U256,
    },
    LoanRepaid {
        loan_id: LoanId,
        payer: Address,
        principal: U256,
        interest: U256,
        relayer_fee: U256,
        timestamp: u64,
    },
    LoanReduced {
        loan_id: LoanId,
        amount: U256,
        remaining: U256,
    },
    LoanClosed {
        loan_id: LoanId,
        borrower: Address,
    },
}

impl Event {
    pub fn loan_id(&self) -> LoanId {
        match self {
            Event::LoanCreated { loan_id, .. }
            | Event::LoanRepaid { loan_id, .. }
            | Event::LoanReduced { loan_id, .. }
            | Event::LoanClosed { loan_id, .. } => *loan_id,
        }
    }
}

/// observer notified of every event the ledger emits
pub trait EventSink {
    fn notify(&mut self, event: &Event);
}

/// event store for collecting events during operations
#[derive(Debug, Default)]
pub struct EventStore {
    events: Vec<Event>,
}

impl EventStore {
    pub fn new() -> Self {
        Self {
            events: Vec::new(),
        }
    }

    pub fn emit(&mut self, event: Event) {
        self.events.push(event);
    }

    pub fn take_events(&mut self) -> Vec<Event> {
        std::mem::take(&mut self.events)
    }

    pub fn events(&self) -> &[Event] {
        &self.events
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl EventSink for EventStore {
    fn notify(&mut self, event: &Event) {
        self.emit(event.clone());
    }
}
