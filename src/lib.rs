pub mod config;
pub mod decimal;
pub mod errors;
pub mod events;
pub mod index;
pub mod interest;
pub mod ledger;
pub mod state;
pub mod store;
pub mod terms;
pub mod transfer;
pub mod types;
pub mod views;

// re-export key types
pub use config::{FeeRatePolicy, LedgerConfig};
pub use decimal::{Rate, RATE_BASIS};
pub use errors::{LedgerError, Result};
pub use events::{Event, EventSink, EventStore};
pub use index::BorrowerIndex;
pub use interest::{
    is_overdue, AccrualEngine, InterestCalculation, InterestCalculator, SECONDS_PER_YEAR,
};
pub use ledger::{unix_seconds, LoanLedger};
pub use state::{BorrowerEntry, LedgerSnapshot};
pub use store::LoanStore;
pub use terms::LoanTerms;
pub use transfer::{AssetTransfer, InMemoryBalances};
pub use types::{Loan, LoanId, LoanRequest, LoanStatus, RepaymentQuote};
pub use views::LoanView;

// re-export external dependencies that users will need
pub use alloy_primitives::{Address, U256};
pub use chrono;
pub use hourglass_rs::{SafeTimeProvider, TimeSource};
pub use rust_decimal::Decimal;
