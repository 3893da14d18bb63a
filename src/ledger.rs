use alloy_primitives::{Address, U256};
use hourglass_rs::SafeTimeProvider;
use tracing::{info, warn};

use crate::config::LedgerConfig;
use crate::errors::{LedgerError, Result};
use crate::events::{Event, EventSink, EventStore};
use crate::index::BorrowerIndex;
use crate::interest::{AccrualEngine, InterestCalculator};
use crate::store::LoanStore;
use crate::terms::LoanTerms;
use crate::transfer::AssetTransfer;
use crate::types::{Loan, LoanId, LoanRequest, RepaymentQuote};

/// loan ledger: record store, borrower index and the lifecycle rules tying them together
///
/// Every operation finishes its fallible work before touching the store or
/// the index, so a failed call leaves the ledger as it was. Callers running
/// the ledger from several threads must serialize whole operations.
pub struct LoanLedger {
    pub config: LedgerConfig,
    store: LoanStore,
    index: BorrowerIndex,
    engine: AccrualEngine,
    pub events: EventStore,
    observers: Vec<Box<dyn EventSink>>,
}

impl LoanLedger {
    /// create an empty ledger
    pub fn new(config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, LoanStore::new(), BorrowerIndex::new()))
    }

    pub(crate) fn from_parts(config: LedgerConfig, store: LoanStore, index: BorrowerIndex) -> Self {
        Self {
            config,
            store,
            index,
            engine: AccrualEngine::new(),
            events: EventStore::new(),
            observers: Vec::new(),
        }
    }

    /// register an observer for created, repaid, reduced and closed loans
    pub fn subscribe(&mut self, observer: Box<dyn EventSink>) {
        self.observers.push(observer);
    }

    /// open a loan and index it under its borrower
    pub fn create_loan(&mut self, request: LoanRequest) -> Result<LoanId> {
        if request.amount.is_zero() {
            warn!(borrower = %request.borrower, "rejected loan with zero principal");
            return Err(LedgerError::InvalidAmount {
                amount: request.amount,
            });
        }

        let terms = LoanTerms::decode(request.terms);
        if let Err(e) = self.config.check_relayer_fee_rate(terms.relayer_fee_rate) {
            warn!(borrower = %request.borrower, rate = terms.relayer_fee_rate, "rejected relayer fee rate");
            return Err(e);
        }

        let event = Event::LoanCreated {
            loan_id: self.store.count(),
            lender_order_id: request.lender_order_id,
            lender: request.lender,
            borrower: request.borrower,
            relayer: request.relayer,
            asset: request.asset,
            amount: request.amount,
            terms: request.terms,
        };

        let borrower = request.borrower;
        let amount = request.amount;
        let id = self.store.create(request);
        self.index.add(borrower, id);

        info!(loan_id = %id, %borrower, %amount, "loan created");
        self.emit(event);

        Ok(id)
    }

    pub fn get_loan(&self, id: LoanId) -> Result<&Loan> {
        self.store.get(id).ok_or(LedgerError::RecordNotFound { id })
    }

    /// look up several loans in order, failing on the first unknown id
    pub fn get_loans(&self, ids: &[LoanId]) -> Result<Vec<&Loan>> {
        self.store
            .get_many(ids)
            .into_iter()
            .zip(ids)
            .map(|(loan, id)| loan.ok_or(LedgerError::RecordNotFound { id: *id }))
            .collect()
    }

    /// open loans of a borrower, in index order
    pub fn loans_of(&self, borrower: Address) -> Vec<&Loan> {
        self.index
            .list(borrower)
            .iter()
            .filter_map(|id| self.store.get(*id))
            .collect()
    }

    /// what repaying `amount` of principal would cost right now
    pub fn quote_repayment(
        &self,
        id: LoanId,
        amount: U256,
        time_provider: &SafeTimeProvider,
    ) -> Result<RepaymentQuote> {
        let now = unix_seconds(time_provider)?;
        self.quote_at(self.get_loan(id)?, amount, now)
    }

    fn quote_at(&self, loan: &Loan, amount: U256, now: u64) -> Result<RepaymentQuote> {
        if !loan.is_open() && !self.config.allow_repayment_when_closed {
            return Err(LedgerError::LoanClosed { id: loan.id });
        }

        if amount > loan.amount {
            return Err(LedgerError::InsufficientPrincipal {
                available: loan.amount,
                requested: amount,
            });
        }

        let calculation = self
            .engine
            .calculate_interest(&loan.decoded_terms(), amount, now)?;

        let owed = amount
            .checked_add(calculation.total_interest)
            .ok_or(LedgerError::ArithmeticOverflow {
                operation: "principal plus interest",
            })?;

        let to_lender = owed
            .checked_sub(calculation.relayer_fee)
            .ok_or(LedgerError::InsufficientPrincipal {
                available: owed,
                requested: calculation.relayer_fee,
            })?;

        // gas reimbursement is not priced yet
        let gas_cost = U256::ZERO;
        let to_relayer = calculation
            .relayer_fee
            .checked_add(gas_cost)
            .ok_or(LedgerError::ArithmeticOverflow {
                operation: "relayer payout",
            })?;

        Ok(RepaymentQuote {
            principal: amount,
            interest: calculation.total_interest,
            relayer_fee: calculation.relayer_fee,
            gas_cost,
            to_lender,
            to_relayer,
        })
    }

    /// collect a repayment from `payer` for the lender and relayer
    ///
    /// Stored principal is left alone; follow with `reduce_loan`, or use
    /// `settle_loan` to do both.
    pub fn repay_loan<T: AssetTransfer + ?Sized>(
        &mut self,
        id: LoanId,
        payer: Address,
        amount: U256,
        transfers: &mut T,
        time_provider: &SafeTimeProvider,
    ) -> Result<RepaymentQuote> {
        let now = unix_seconds(time_provider)?;
        let loan = self.get_loan(id)?;
        let quote = match self.quote_at(loan, amount, now) {
            Ok(quote) => quote,
            Err(e) => {
                warn!(loan_id = %id, error = %e, "repayment rejected");
                return Err(e);
            }
        };

        let (asset, lender, relayer) = (loan.asset, loan.lender, loan.relayer);
        transfers.transfer_from(asset, payer, lender, quote.to_lender)?;
        transfers.transfer_from(asset, payer, relayer, quote.to_relayer)?;

        info!(
            loan_id = %id,
            %payer,
            principal = %quote.principal,
            interest = %quote.interest,
            relayer_fee = %quote.relayer_fee,
            "loan repaid"
        );

        self.emit(Event::LoanRepaid {
            loan_id: id,
            payer,
            principal: quote.principal,
            interest: quote.interest,
            relayer_fee: quote.relayer_fee,
            timestamp: now,
        });

        Ok(quote)
    }

    /// reduce outstanding principal, closing the loan when it reaches zero
    pub fn reduce_loan(&mut self, id: LoanId, amount: U256) -> Result<U256> {
        let loan = self.get_loan(id)?;
        let (borrower, was_open) = (loan.borrower, loan.is_open());

        let remaining = self.store.reduce_amount(id, amount)?;
        if !was_open {
            return Ok(remaining);
        }

        self.emit(Event::LoanReduced {
            loan_id: id,
            amount,
            remaining,
        });

        if remaining.is_zero() {
            self.index.remove(borrower, id);
            info!(loan_id = %id, %borrower, "loan closed");
            self.emit(Event::LoanClosed {
                loan_id: id,
                borrower,
            });
        }

        Ok(remaining)
    }

    /// repay and reduce in one step
    pub fn settle_loan<T: AssetTransfer + ?Sized>(
        &mut self,
        id: LoanId,
        payer: Address,
        amount: U256,
        transfers: &mut T,
        time_provider: &SafeTimeProvider,
    ) -> Result<RepaymentQuote> {
        // principal is checked by the quote, so the reduction cannot fail afterwards
        let quote = self.repay_loan(id, payer, amount, transfers, time_provider)?;
        self.reduce_loan(id, amount)?;
        Ok(quote)
    }

    /// borrower's open loans that are past due, in index order
    pub fn get_overdue_loans(
        &self,
        borrower: Address,
        time_provider: &SafeTimeProvider,
    ) -> Result<Vec<&Loan>> {
        let now = unix_seconds(time_provider)?;
        Ok(self
            .loans_of(borrower)
            .into_iter()
            .filter(|loan| self.engine.is_overdue(&loan.decoded_terms(), now))
            .collect())
    }

    pub fn store(&self) -> &LoanStore {
        &self.store
    }

    pub fn index(&self) -> &BorrowerIndex {
        &self.index
    }

    /// get events
    pub fn take_events(&mut self) -> Vec<Event> {
        self.events.take_events()
    }

    fn emit(&mut self, event: Event) {
        for observer in self.observers.iter_mut() {
            observer.notify(&event);
        }
        self.events.emit(event);
    }
}

/// current time in unix seconds
pub fn unix_seconds(time_provider: &SafeTimeProvider) -> Result<u64> {
    let now = time_provider.now();
    u64::try_from(now.timestamp()).map_err(|_| LedgerError::InvalidDate {
        message: format!("{} precedes the unix epoch", now),
    })
}
