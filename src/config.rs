use serde::{Deserialize, Serialize};

use crate::decimal::RATE_BASIS;
use crate::errors::{LedgerError, Result};

/// how loan creation treats relayer fee rates above the cap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeeRatePolicy {
    /// refuse loans whose relayer fee rate exceeds the cap
    Reject,
    /// accept any rate; repayment still refuses to underflow
    Allow,
}

/// ledger configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerConfig {
    pub fee_rate_policy: FeeRatePolicy,
    pub max_relayer_fee_rate: u16,
    pub allow_repayment_when_closed: bool,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::strict()
    }
}

impl LedgerConfig {
    /// relayer fees capped at 100% of interest, closed loans refuse repayment
    pub fn strict() -> Self {
        Self {
            fee_rate_policy: FeeRatePolicy::Reject,
            max_relayer_fee_rate: RATE_BASIS,
            allow_repayment_when_closed: false,
        }
    }

    /// accepts whatever terms the originator packed
    pub fn permissive() -> Self {
        Self {
            fee_rate_policy: FeeRatePolicy::Allow,
            max_relayer_fee_rate: u16::MAX,
            allow_repayment_when_closed: true,
        }
    }

    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json).map_err(|e| LedgerError::InvalidConfiguration {
            message: e.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.fee_rate_policy == FeeRatePolicy::Reject && self.max_relayer_fee_rate == 0 {
            return Err(LedgerError::InvalidConfiguration {
                message: "max_relayer_fee_rate must be positive when rejecting".to_string(),
            });
        }
        Ok(())
    }

    /// check a relayer fee rate against the policy
    pub fn check_relayer_fee_rate(&self, rate: u16) -> Result<()> {
        match self.fee_rate_policy {
            FeeRatePolicy::Reject if rate > self.max_relayer_fee_rate => {
                Err(LedgerError::FeeRateOutOfRange {
                    rate,
                    max: self.max_relayer_fee_rate,
                })
            }
            _ => Ok(()),
        }
    }
}
