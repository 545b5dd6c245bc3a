//! Denomination-keyed asset amounts used for fee accounting.

use borsh::{BorshDeserialize, BorshSerialize};

use crate::{define_error, SdkResult};

define_error!(ERR_COIN_OVERFLOW, 0x40, "coin amount overflow");
define_error!(ERR_INSUFFICIENT_COINS, 0x41, "insufficient coin amount");

/// A single asset amount in a named denomination.
#[derive(Clone, Debug, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: u128,
}

impl Coin {
    pub fn new(denom: impl Into<String>, amount: u128) -> Self {
        Self {
            denom: denom.into(),
            amount,
        }
    }
}

impl core::fmt::Display for Coin {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// An ordered set of coins, at most one entry per denomination.
#[derive(Clone, Debug, Default, PartialEq, Eq, BorshSerialize, BorshDeserialize)]
pub struct Coins(Vec<Coin>);

impl Coins {
    pub fn new() -> Self {
        Self(Vec::new())
    }

    pub fn one(denom: impl Into<String>, amount: u128) -> Self {
        let mut coins = Self::new();
        // A freshly built singleton cannot overflow.
        let _ = coins.add(Coin::new(denom, amount));
        coins
    }

    /// Amount held in `denom`, zero when absent.
    pub fn amount_of(&self, denom: &str) -> u128 {
        self.0
            .iter()
            .find(|c| c.denom == denom)
            .map(|c| c.amount)
            .unwrap_or(0)
    }

    /// Merge a coin in, keeping denominations unique and sorted.
    pub fn add(&mut self, coin: Coin) -> SdkResult<()> {
        if coin.amount == 0 {
            return Ok(());
        }
        match self.0.binary_search_by(|c| c.denom.cmp(&coin.denom)) {
            Ok(i) => {
                self.0[i].amount = self.0[i]
                    .amount
                    .checked_add(coin.amount)
                    .ok_or(ERR_COIN_OVERFLOW)?;
            }
            Err(i) => self.0.insert(i, coin),
        }
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Coin> {
        self.0.iter()
    }

    /// True when `self` covers `other` in every denomination.
    pub fn covers(&self, other: &Coins) -> bool {
        other.iter().all(|c| self.amount_of(&c.denom) >= c.amount)
    }
}

impl From<Vec<Coin>> for Coins {
    fn from(coins: Vec<Coin>) -> Self {
        let mut out = Self::new();
        for coin in coins {
            let denom = coin.denom.clone();
            if out.add(coin).is_err() {
                // Saturate rather than drop the denom entirely.
                if let Some(existing) = out.0.iter_mut().find(|c| c.denom == denom) {
                    existing.amount = u128::MAX;
                }
            }
        }
        out
    }
}

impl core::fmt::Display for Coins {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let mut first = true;
        for coin in &self.0 {
            if !first {
                write!(f, ",")?;
            }
            write!(f, "{coin}")?;
            first = false;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_merges_same_denom() {
        let mut coins = Coins::new();
        coins.add(Coin::new("uhlx", 100)).unwrap();
        coins.add(Coin::new("uhlx", 50)).unwrap();
        assert_eq!(coins.amount_of("uhlx"), 150);
    }

    #[test]
    fn add_keeps_denoms_sorted_and_unique() {
        let mut coins = Coins::new();
        coins.add(Coin::new("zeta", 1)).unwrap();
        coins.add(Coin::new("alpha", 2)).unwrap();
        let denoms: Vec<_> = coins.iter().map(|c| c.denom.as_str()).collect();
        assert_eq!(denoms, vec!["alpha", "zeta"]);
    }

    #[test]
    fn zero_amounts_are_dropped() {
        let mut coins = Coins::new();
        coins.add(Coin::new("uhlx", 0)).unwrap();
        assert!(coins.is_empty());
    }

    #[test]
    fn add_detects_overflow() {
        let mut coins = Coins::one("uhlx", u128::MAX);
        let err = coins.add(Coin::new("uhlx", 1)).unwrap_err();
        assert_eq!(err, ERR_COIN_OVERFLOW);
    }

    #[test]
    fn covers_compares_per_denom() {
        let have = Coins::one("uhlx", 100);
        let need_ok = Coins::one("uhlx", 100);
        let need_too_much = Coins::one("uhlx", 101);
        let need_other = Coins::one("uatom", 1);
        assert!(have.covers(&need_ok));
        assert!(!have.covers(&need_too_much));
        assert!(!have.covers(&need_other));
    }
}
