use alloy_primitives::{Address, U256};
use thiserror::Error;

use crate::types::LoanId;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    #[error("encoding overflow: {field} value {value} does not fit in {bits} bits")]
    EncodingOverflow {
        field: &'static str,
        value: u128,
        bits: u32,
    },

    #[error("arithmetic overflow in {operation}")]
    ArithmeticOverflow {
        operation: &'static str,
    },

    #[error("clock skew: current time {current_time} precedes loan start {start_at}")]
    ClockSkew {
        start_at: u64,
        current_time: u64,
    },

    #[error("insufficient principal: available {available}, requested {requested}")]
    InsufficientPrincipal {
        available: U256,
        requested: U256,
    },

    #[error("loan record not found: {id}")]
    RecordNotFound {
        id: LoanId,
    },

    #[error("transfer of {amount} {asset} from {from} to {to} failed: {reason}")]
    TransferFailed {
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
        reason: String,
    },

    #[error("relayer fee rate {rate} exceeds maximum {max}")]
    FeeRateOutOfRange {
        rate: u16,
        max: u16,
    },

    #[error("invalid loan amount: {amount}")]
    InvalidAmount {
        amount: U256,
    },

    #[error("loan {id} is closed")]
    LoanClosed {
        id: LoanId,
    },

    #[error("invalid date: {message}")]
    InvalidDate {
        message: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration {
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, LedgerError>;
