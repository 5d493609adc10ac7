//! In-memory asset custody book
//!
//! Balances and allowances for token and native assets, keyed by holder and
//! asset address (zero address = native). The ledger is the only state
//! external collaborators can touch: swap targets and bridge routers receive
//! a mutable reference to it and nothing else, so their observable effects
//! roll back with the engine snapshot on failure.

use std::collections::HashMap;

use ethereum_types::{Address, U256};

use crate::errors::EngineError;
use crate::types::is_native;

/// Custody book for balances and allowances.
#[derive(Debug, Clone, Default)]
pub struct AssetLedger {
    /// (holder, asset) -> balance
    balances: HashMap<(Address, Address), U256>,
    /// (owner, spender, asset) -> allowance
    allowances: HashMap<(Address, Address, Address), U256>,
}

impl AssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance of `asset` held by `holder`.
    pub fn balance_of(&self, holder: Address, asset: Address) -> U256 {
        self.balances
            .get(&(holder, asset))
            .copied()
            .unwrap_or_default()
    }

    /// Allowance of `asset` granted by `owner` to `spender`.
    pub fn allowance(&self, owner: Address, spender: Address, asset: Address) -> U256 {
        self.allowances
            .get(&(owner, spender, asset))
            .copied()
            .unwrap_or_default()
    }

    /// Credits `amount` of `asset` to `holder` out of thin air. Host-side
    /// operation used to seed balances and to model assets minted or released
    /// by an external bridge on arrival.
    pub fn credit(&mut self, holder: Address, asset: Address, amount: U256) {
        let entry = self.balances.entry((holder, asset)).or_default();
        *entry = entry.saturating_add(amount);
    }

    /// Sets the allowance of `asset` from `owner` to `spender` to exactly
    /// `amount`, replacing any previous value.
    pub fn approve(&mut self, owner: Address, spender: Address, asset: Address, amount: U256) {
        if amount.is_zero() {
            self.allowances.remove(&(owner, spender, asset));
        } else {
            self.allowances.insert((owner, spender, asset), amount);
        }
    }

    /// Moves `amount` of `asset` from `from` to `to`.
    pub fn transfer(
        &mut self,
        asset: Address,
        from: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), EngineError> {
        if amount.is_zero() {
            return Ok(());
        }
        let available = self.balance_of(from, asset);
        if available < amount {
            return Err(EngineError::InsufficientBalance {
                needed: amount,
                available,
            });
        }
        self.balances.insert((from, asset), available - amount);
        self.credit(to, asset, amount);
        Ok(())
    }

    /// Moves `amount` of `asset` from `owner` to `to` on the authority of
    /// `spender`'s allowance, which is reduced by the amount moved. Native
    /// assets have no allowance concept and always fail here.
    pub fn transfer_from(
        &mut self,
        asset: Address,
        owner: Address,
        spender: Address,
        to: Address,
        amount: U256,
    ) -> Result<(), EngineError> {
        if amount.is_zero() {
            return Ok(());
        }
        if is_native(&asset) {
            return Err(EngineError::InsufficientBalance {
                needed: amount,
                available: U256::zero(),
            });
        }
        let allowed = self.allowance(owner, spender, asset);
        if allowed < amount {
            return Err(EngineError::InsufficientBalance {
                needed: amount,
                available: allowed,
            });
        }
        self.transfer(asset, owner, to, amount)?;
        self.approve(owner, spender, asset, allowed - amount);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn addr(n: u64) -> Address {
        Address::from_low_u64_be(n)
    }

    /// What is tested: transfer debits and credits the expected holders
    /// Why: every custody movement in the engine goes through this path
    #[test]
    fn test_transfer_moves_balance() {
        let mut ledger = AssetLedger::new();
        let (asset, a, b) = (addr(1), addr(2), addr(3));
        ledger.credit(a, asset, U256::from(100));

        ledger.transfer(asset, a, b, U256::from(40)).unwrap();
        assert_eq!(ledger.balance_of(a, asset), U256::from(60));
        assert_eq!(ledger.balance_of(b, asset), U256::from(40));
    }

    /// What is tested: shortfalls surface the needed/available pair
    /// Why: InsufficientBalance diagnostics must reflect actual custody
    #[test]
    fn test_transfer_shortfall() {
        let mut ledger = AssetLedger::new();
        let (asset, a, b) = (addr(1), addr(2), addr(3));
        ledger.credit(a, asset, U256::from(10));

        let err = ledger.transfer(asset, a, b, U256::from(11)).unwrap_err();
        assert_eq!(
            err,
            EngineError::InsufficientBalance {
                needed: U256::from(11),
                available: U256::from(10),
            }
        );
    }

    /// What is tested: transfer_from consumes the allowance it spends
    /// Why: the exact-allowance discipline depends on decrements being real
    #[test]
    fn test_transfer_from_consumes_allowance() {
        let mut ledger = AssetLedger::new();
        let (asset, owner, spender, to) = (addr(1), addr(2), addr(3), addr(4));
        ledger.credit(owner, asset, U256::from(100));
        ledger.approve(owner, spender, asset, U256::from(50));

        ledger
            .transfer_from(asset, owner, spender, to, U256::from(30))
            .unwrap();
        assert_eq!(ledger.allowance(owner, spender, asset), U256::from(20));
        assert_eq!(ledger.balance_of(to, asset), U256::from(30));

        let err = ledger
            .transfer_from(asset, owner, spender, to, U256::from(30))
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientBalance { .. }));
    }

    /// What is tested: native assets cannot be moved via allowance
    /// Why: native value travels with calls, never through approvals
    #[test]
    fn test_native_has_no_allowance() {
        let mut ledger = AssetLedger::new();
        let (owner, spender, to) = (addr(2), addr(3), addr(4));
        ledger.credit(owner, Address::zero(), U256::from(100));

        let err = ledger
            .transfer_from(Address::zero(), owner, spender, to, U256::from(1))
            .unwrap_err();
        assert!(matches!(err, EngineError::InsufficientBalance { .. }));
    }
}
