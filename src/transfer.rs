use std::collections::HashMap;

use alloy_primitives::{Address, U256};

use crate::errors::{LedgerError, Result};

/// moves fungible assets between accounts on the ledger's behalf
///
/// Implementations must either move the full amount or fail without any
/// effect.
pub trait AssetTransfer {
    fn transfer_from(&mut self, asset: Address, from: Address, to: Address, amount: U256) -> Result<()>;
}

/// in-memory balances for testing and demos
#[derive(Debug, Clone, Default)]
pub struct InMemoryBalances {
    balances: HashMap<(Address, Address), U256>,
}

impl InMemoryBalances {
    pub fn new() -> Self {
        Self {
            balances: HashMap::new(),
        }
    }

    pub fn credit(&mut self, asset: Address, owner: Address, amount: U256) {
        let balance = self.balances.entry((asset, owner)).or_insert(U256::ZERO);
        *balance = balance.saturating_add(amount);
    }

    pub fn balance_of(&self, asset: Address, owner: Address) -> U256 {
        self.balances
            .get(&(asset, owner))
            .copied()
            .unwrap_or(U256::ZERO)
    }
}

impl AssetTransfer for InMemoryBalances {
    fn transfer_from(&mut self, asset: Address, from: Address, to: Address, amount: U256) -> Result<()> {
        let available = self.balance_of(asset, from);
        let remaining = available
            .checked_sub(amount)
            .ok_or_else(|| LedgerError::TransferFailed {
                asset,
                from,
                to,
                amount,
                reason: format!("balance {} is below {}", available, amount),
            })?;

        let received = self
            .balance_of(asset, to)
            .checked_add(amount)
            .ok_or_else(|| LedgerError::TransferFailed {
                asset,
                from,
                to,
                amount,
                reason: "recipient balance overflow".to_string(),
            })?;

        if from == to {
            return Ok(());
        }

        self.balances.insert((asset, from), remaining);
        self.balances.insert((asset, to), received);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transfer_moves_balance() {
        let asset = Address::repeat_byte(0x44);
        let alice = Address::repeat_byte(0xaa);
        let bob = Address::repeat_byte(0xbb);

        let mut balances = InMemoryBalances::new();
        balances.credit(asset, alice, U256::from(100u64));

        balances.transfer_from(asset, alice, bob, U256::from(30u64)).unwrap();
        assert_eq!(balances.balance_of(asset, alice), U256::from(70u64));
        assert_eq!(balances.balance_of(asset, bob), U256::from(30u64));
    }

    #[test]
    fn test_insufficient_balance_has_no_effect() {
        let asset = Address::repeat_byte(0x44);
        let alice = Address::repeat_byte(0xaa);
        let bob = Address::repeat_byte(0xbb);

        let mut balances = InMemoryBalances::new();
        balances.credit(asset, alice, U256::from(10u64));

        let result = balances.transfer_from(asset, alice, bob, U256::from(11u64));
        assert!(matches!(result, Err(LedgerError::TransferFailed { .. })));
        assert_eq!(balances.balance_of(asset, alice), U256::from(10u64));
        assert_eq!(balances.balance_of(asset, bob), U256::ZERO);
    }

    #[test]
    fn test_self_transfer_keeps_balance() {
        let asset = Address::repeat_byte(0x44);
        let alice = Address::repeat_byte(0xaa);

        let mut balances = InMemoryBalances::new();
        balances.credit(asset, alice, U256::from(10u64));
        balances.transfer_from(asset, alice, alice, U256::from(10u64)).unwrap();
        assert_eq!(balances.balance_of(asset, alice), U256::from(10u64));
    }
}
