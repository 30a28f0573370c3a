//! Trustlines: capacity-bounded permission to hold an issued asset.
//!
//! Invariant: `0 <= balance <= limit`. An account cannot receive an issued
//! asset without a trustline whose remaining capacity (`limit - balance`)
//! covers the amount, unless it is the asset's issuer.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::Asset;
use crate::crypto::keys::AccountId;

/// Trustline-level failures.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TrustLineError {
    /// Crediting `requested` would push the balance past the limit, the
    /// trustline is missing, or it is not authorized by the issuer.
    #[error(
        "trustline capacity exceeded: {holder} can receive {available} of {asset}, requested {requested}"
    )]
    CapacityExceeded {
        holder: AccountId,
        asset: Asset,
        requested: u64,
        available: u64,
    },

    /// Debiting more than the trustline holds.
    #[error("insufficient {asset} balance on {holder}: available {available}, requested {requested}")]
    InsufficientBalance {
        holder: AccountId,
        asset: Asset,
        requested: u64,
        available: u64,
    },

    /// A limit change below the current balance.
    #[error("trustline limit {limit} is below the current balance {balance} of {asset}")]
    LimitBelowBalance {
        asset: Asset,
        limit: u64,
        balance: u64,
    },

    /// Removing a trustline that still holds funds.
    #[error("trustline to {asset} still holds {balance}; it must be zero to remove")]
    NonZeroBalance { asset: Asset, balance: u64 },
}

/// A holder's trust relationship to one issued asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrustLine {
    pub holder: AccountId,
    pub asset: Asset,
    pub limit: u64,
    pub balance: u64,
    /// Cleared when the issuer requires authorization and has not granted it.
    pub authorized: bool,
}

impl TrustLine {
    /// A fresh, empty trustline.
    pub fn new(holder: AccountId, asset: Asset, limit: u64, authorized: bool) -> Self {
        Self {
            holder,
            asset,
            limit,
            balance: 0,
            authorized,
        }
    }

    /// How much more this trustline can receive. Zero when unauthorized.
    pub fn available_capacity(&self) -> u64 {
        if !self.authorized {
            return 0;
        }
        self.limit.saturating_sub(self.balance)
    }

    /// Fails with [`TrustLineError::CapacityExceeded`] unless `amount` fits.
    pub fn check_credit(&self, amount: u64) -> Result<(), TrustLineError> {
        let available = self.available_capacity();
        if amount > available {
            return Err(TrustLineError::CapacityExceeded {
                holder: self.holder,
                asset: self.asset.clone(),
                requested: amount,
                available,
            });
        }
        Ok(())
    }

    /// Add `amount` to the balance. Returns the new balance.
    pub fn credit(&mut self, amount: u64) -> Result<u64, TrustLineError> {
        self.check_credit(amount)?;
        self.balance += amount;
        Ok(self.balance)
    }

    /// Subtract `amount` from the balance. Returns the new balance.
    pub fn debit(&mut self, amount: u64) -> Result<u64, TrustLineError> {
        if amount > self.balance {
            return Err(TrustLineError::InsufficientBalance {
                holder: self.holder,
                asset: self.asset.clone(),
                requested: amount,
                available: self.balance,
            });
        }
        self.balance -= amount;
        Ok(self.balance)
    }

    /// Change the limit. A limit below the current balance is rejected.
    pub fn set_limit(&mut self, limit: u64) -> Result<(), TrustLineError> {
        if limit < self.balance {
            return Err(TrustLineError::LimitBelowBalance {
                asset: self.asset.clone(),
                limit,
                balance: self.balance,
            });
        }
        self.limit = limit;
        Ok(())
    }

    /// Removal precondition: the balance must be zero.
    pub fn check_removable(&self) -> Result<(), TrustLineError> {
        if self.balance != 0 {
            return Err(TrustLineError::NonZeroBalance {
                asset: self.asset.clone(),
                balance: self.balance,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::keys::Keypair;

    fn line(limit: u64, balance: u64) -> TrustLine {
        let issuer = Keypair::from_seed(&[21u8; 32]).public_key();
        let holder = Keypair::from_seed(&[22u8; 32]).public_key();
        let mut tl = TrustLine::new(holder, Asset::issued("USD", issuer).unwrap(), limit, true);
        tl.balance = balance;
        tl
    }

    #[test]
    fn capacity_is_limit_minus_balance() {
        let tl = line(1000, 900);
        assert_eq!(tl.available_capacity(), 100);
    }

    #[test]
    fn credit_beyond_capacity_fails() {
        let mut tl = line(1000, 900);
        match tl.credit(150) {
            Err(TrustLineError::CapacityExceeded {
                requested: 150,
                available: 100,
                ..
            }) => {}
            other => panic!("expected CapacityExceeded, got {:?}", other),
        }
        assert_eq!(tl.balance, 900);
    }

    #[test]
    fn credit_to_exact_limit_succeeds() {
        let mut tl = line(1000, 900);
        assert_eq!(tl.credit(100).unwrap(), 1000);
        assert_eq!(tl.available_capacity(), 0);
    }

    #[test]
    fn unauthorized_line_has_no_capacity() {
        let mut tl = line(1000, 0);
        tl.authorized = false;
        assert!(tl.check_credit(1).is_err());
    }

    #[test]
    fn debit_and_limit_rules() {
        let mut tl = line(1000, 300);
        assert!(tl.debit(301).is_err());
        assert_eq!(tl.debit(300).unwrap(), 0);
        assert!(tl.check_removable().is_ok());

        let mut tl = line(1000, 300);
        assert!(tl.set_limit(299).is_err());
        assert!(tl.check_removable().is_err());
        tl.set_limit(300).unwrap();
        assert_eq!(tl.available_capacity(), 0);
    }
}
