use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;

/// basis used by every rate packed into loan terms (10_000 = 100%)
pub const RATE_BASIS: u16 = 10_000;

/// rate type for interest and fee rates, stored as a plain ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct Rate(Decimal);

impl Rate {
    pub const ZERO: Rate = Rate(Decimal::ZERO);
    pub const ONE: Rate = Rate(Decimal::ONE);

    /// create from decimal (e.g., 0.05 for 5%)
    pub fn from_decimal(d: Decimal) -> Self {
        Rate(d)
    }

    /// create from basis points (e.g., 500 for 5%)
    pub fn from_bps(bps: u16) -> Self {
        Rate(Decimal::from(bps) / Decimal::from(RATE_BASIS))
    }

    /// get as decimal
    pub fn as_decimal(&self) -> Decimal {
        self.0
    }

    /// get as percentage
    pub fn as_percentage(&self) -> Decimal {
        self.0 * Decimal::from(100)
    }

    /// get as basis points
    pub fn as_bps(&self) -> Decimal {
        self.0 * Decimal::from(RATE_BASIS)
    }

    /// whether the rate is above 100%
    pub fn exceeds_whole(&self) -> bool {
        self.0 > Decimal::ONE
    }
}

impl fmt::Display for Rate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}%", self.as_percentage().normalize())
    }
}

impl From<Decimal> for Rate {
    fn from(d: Decimal) -> Self {
        Rate::from_decimal(d)
    }
}
