//! packed loan terms
//!
//! A loan's terms travel as one 256-bit word so the originator can sign and
//! hash them as a single value. Fields are laid out most-significant byte
//! first with no padding:
//!
//! | field            | offset | width |
//! |------------------|--------|-------|
//! | interest_rate    | 0      | 2     |
//! | start_at         | 2      | 5     |
//! | duration         | 7      | 5     |
//! | relayer_fee_rate | 12     | 2     |
//! | gas_price        | 14     | 3     |
//! | salt             | 17     | 15    |
//!
//! Offsets and widths are in bytes. The layout is shared with external
//! producers of the word and must not change.

use alloy_primitives::U256;
use serde::{Deserialize, Serialize};

use crate::decimal::Rate;
use crate::errors::{LedgerError, Result};

const WORD_BYTES: usize = 32;

/// position of one sub-field inside the packed word
#[derive(Debug, Clone, Copy)]
struct Field {
    name: &'static str,
    offset: usize,
    width: usize,
}

impl Field {
    const fn bits(&self) -> u32 {
        (self.width * 8) as u32
    }

    fn read(&self, bytes: &[u8; WORD_BYTES]) -> u128 {
        bytes[self.offset..self.offset + self.width]
            .iter()
            .fold(0u128, |acc, b| (acc << 8) | u128::from(*b))
    }

    fn write(&self, bytes: &mut [u8; WORD_BYTES], value: u128) -> Result<()> {
        if value >> self.bits() != 0 {
            return Err(LedgerError::EncodingOverflow {
                field: self.name,
                value,
                bits: self.bits(),
            });
        }

        let be = value.to_be_bytes();
        bytes[self.offset..self.offset + self.width].copy_from_slice(&be[16 - self.width..]);
        Ok(())
    }
}

const INTEREST_RATE: Field = Field { name: "interest_rate", offset: 0, width: 2 };
const START_AT: Field = Field { name: "start_at", offset: 2, width: 5 };
const DURATION: Field = Field { name: "duration", offset: 7, width: 5 };
const RELAYER_FEE_RATE: Field = Field { name: "relayer_fee_rate", offset: 12, width: 2 };
const GAS_PRICE: Field = Field { name: "gas_price", offset: 14, width: 3 };
const SALT: Field = Field { name: "salt", offset: 17, width: 15 };

/// largest timestamp or duration the packed word can carry (2^40 - 1)
pub const MAX_TIMESTAMP: u64 = (1 << 40) - 1;
/// largest gas price the packed word can carry (2^24 - 1)
pub const MAX_GAS_PRICE: u32 = (1 << 24) - 1;
/// largest salt the packed word can carry (2^120 - 1)
pub const MAX_SALT: u128 = (1 << 120) - 1;

/// decoded loan terms
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LoanTerms {
    /// annual interest rate in basis points of 10_000
    pub interest_rate: u16,
    /// unix seconds at which interest starts accruing
    pub start_at: u64,
    /// seconds until the loan is due
    pub duration: u64,
    /// share of accrued interest owed to the relayer, basis 10_000
    pub relayer_fee_rate: u16,
    /// gas price in billionths of the asset unit
    pub gas_price: u32,
    /// opaque uniqueness value chosen by the originator
    pub salt: u128,
}

impl LoanTerms {
    pub fn new(interest_rate: u16, start_at: u64, duration: u64, relayer_fee_rate: u16) -> Self {
        Self {
            interest_rate,
            start_at,
            duration,
            relayer_fee_rate,
            gas_price: 0,
            salt: 0,
        }
    }

    pub fn with_gas_price(mut self, gas_price: u32) -> Self {
        self.gas_price = gas_price;
        self
    }

    pub fn with_salt(mut self, salt: u128) -> Self {
        self.salt = salt;
        self
    }

    /// unpack a terms word; every 256-bit value decodes
    pub fn decode(word: U256) -> Self {
        let bytes: [u8; WORD_BYTES] = word.to_be_bytes();

        // narrowing casts are lossless: each field is at most its declared width
        Self {
            interest_rate: INTEREST_RATE.read(&bytes) as u16,
            start_at: START_AT.read(&bytes) as u64,
            duration: DURATION.read(&bytes) as u64,
            relayer_fee_rate: RELAYER_FEE_RATE.read(&bytes) as u16,
            gas_price: GAS_PRICE.read(&bytes) as u32,
            salt: SALT.read(&bytes),
        }
    }

    /// pack into a terms word, failing if any field exceeds its width
    pub fn encode(&self) -> Result<U256> {
        let mut bytes = [0u8; WORD_BYTES];
        INTEREST_RATE.write(&mut bytes, u128::from(self.interest_rate))?;
        START_AT.write(&mut bytes, u128::from(self.start_at))?;
        DURATION.write(&mut bytes, u128::from(self.duration))?;
        RELAYER_FEE_RATE.write(&mut bytes, u128::from(self.relayer_fee_rate))?;
        GAS_PRICE.write(&mut bytes, u128::from(self.gas_price))?;
        SALT.write(&mut bytes, self.salt)?;
        Ok(U256::from_be_bytes(bytes))
    }

    /// unix seconds at which the loan falls due
    pub fn due_at(&self) -> u64 {
        self.start_at.saturating_add(self.duration)
    }

    pub fn annual_rate(&self) -> Rate {
        Rate::from_bps(self.interest_rate)
    }

    pub fn relayer_share(&self) -> Rate {
        Rate::from_bps(self.relayer_fee_rate)
    }
}

impl From<U256> for LoanTerms {
    fn from(word: U256) -> Self {
        LoanTerms::decode(word)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> LoanTerms {
        LoanTerms::new(500, 1_000, 86_400, 1_000)
            .with_gas_price(20)
            .with_salt(0xdead_beef)
    }

    #[test]
    fn test_layout_is_big_endian_by_offset() {
        let word = sample().encode().unwrap();
        let bytes: [u8; 32] = word.to_be_bytes();

        // interest_rate = 500 = 0x01f4
        assert_eq!(&bytes[0..2], &[0x01, 0xf4]);
        // start_at = 1000 = 0x03e8 in 5 bytes
        assert_eq!(&bytes[2..7], &[0, 0, 0, 0x03, 0xe8]);
        // duration = 86400 = 0x015180 in 5 bytes
        assert_eq!(&bytes[7..12], &[0, 0, 0x01, 0x51, 0x80]);
        // relayer_fee_rate = 1000
        assert_eq!(&bytes[12..14], &[0x03, 0xe8]);
        // gas_price = 20 in 3 bytes
        assert_eq!(&bytes[14..17], &[0, 0, 20]);
        // salt occupies the low 15 bytes
        assert_eq!(&bytes[28..32], &[0xde, 0xad, 0xbe, 0xef]);
        assert!(bytes[17..28].iter().all(|b| *b == 0));
    }

    #[test]
    fn test_decode_matches_shifted_word() {
        let word = (U256::from(500u64) << 240usize)
            | (U256::from(1_000u64) << 200usize)
            | (U256::from(86_400u64) << 160usize)
            | (U256::from(1_000u64) << 144usize)
            | (U256::from(20u64) << 120usize)
            | U256::from(0xdead_beefu64);

        assert_eq!(LoanTerms::decode(word), sample());
        assert_eq!(sample().encode().unwrap(), word);

        let converted: LoanTerms = word.into();
        assert_eq!(converted, sample());
    }

    #[test]
    fn test_round_trip_at_field_limits() {
        let terms = LoanTerms {
            interest_rate: u16::MAX,
            start_at: MAX_TIMESTAMP,
            duration: MAX_TIMESTAMP,
            relayer_fee_rate: u16::MAX,
            gas_price: MAX_GAS_PRICE,
            salt: MAX_SALT,
        };

        let word = terms.encode().unwrap();
        assert_eq!(word, U256::MAX);
        assert_eq!(LoanTerms::decode(word), terms);
        assert_eq!(LoanTerms::decode(U256::ZERO), LoanTerms::default());
    }

    #[test]
    fn test_encoding_overflow() {
        let too_late = LoanTerms::new(0, MAX_TIMESTAMP + 1, 0, 0);
        assert_eq!(
            too_late.encode(),
            Err(LedgerError::EncodingOverflow {
                field: "start_at",
                value: u128::from(MAX_TIMESTAMP + 1),
                bits: 40,
            })
        );

        let too_long = LoanTerms::new(0, 0, MAX_TIMESTAMP + 1, 0);
        assert!(matches!(
            too_long.encode(),
            Err(LedgerError::EncodingOverflow { field: "duration", .. })
        ));

        let expensive = LoanTerms::new(0, 0, 0, 0).with_gas_price(MAX_GAS_PRICE + 1);
        assert!(matches!(
            expensive.encode(),
            Err(LedgerError::EncodingOverflow { field: "gas_price", bits: 24, .. })
        ));

        let salty = LoanTerms::new(0, 0, 0, 0).with_salt(MAX_SALT + 1);
        assert!(matches!(
            salty.encode(),
            Err(LedgerError::EncodingOverflow { field: "salt", bits: 120, .. })
        ));
    }

    #[test]
    fn test_due_at_and_rates() {
        let terms = sample();
        assert_eq!(terms.due_at(), 87_400);
        assert_eq!(terms.annual_rate(), Rate::from_bps(500));
        assert_eq!(terms.relayer_share().to_string(), "10%");
    }
}
