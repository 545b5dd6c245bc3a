//! Gas metering for a single validation or execution pass.

use crate::{define_error, SdkResult};

define_error!(ERR_OUT_OF_GAS, 0x4F, "out of gas");

/// Represents how gas is tracked and consumed.
///
/// - **Infinite** mode: No gas limit applies.
/// - **Finite** mode: Tracks gas usage against a specified limit.
#[derive(Debug, Clone)]
pub enum GasCounter {
    /// Infinite gas mode, no tracking or limit.
    Infinite,
    /// Finite gas mode, tracking gas usage against a `gas_limit`.
    Finite { gas_limit: u64, gas_used: u64 },
}

impl GasCounter {
    /// Creates a new [`GasCounter`] in infinite gas mode.
    ///
    /// In this mode, any gas-consuming operations will succeed and
    /// [`gas_used`](GasCounter::gas_used) always returns 0.
    pub fn infinite() -> Self {
        GasCounter::Infinite
    }

    /// Creates a new [`GasCounter`] in finite gas mode with the given limit.
    pub fn finite(gas_limit: u64) -> Self {
        GasCounter::Finite {
            gas_limit,
            gas_used: 0,
        }
    }

    /// Consumes the specified `gas` amount if in finite mode.
    ///
    /// # Errors
    ///
    /// Returns [`ERR_OUT_OF_GAS`] if `gas_used` would exceed `gas_limit` in
    /// finite mode. Gas usage is left unchanged on failure.
    pub fn consume_gas(&mut self, gas: u64) -> SdkResult<()> {
        match self {
            GasCounter::Infinite => Ok(()),
            GasCounter::Finite {
                gas_limit,
                gas_used,
            } => {
                let new_gas_used = gas_used.saturating_add(gas);
                if new_gas_used > *gas_limit {
                    return Err(ERR_OUT_OF_GAS);
                }
                *gas_used = new_gas_used;
                Ok(())
            }
        }
    }

    /// Consumes gas proportional to a byte size at a per-byte cost.
    pub fn consume_bytes_gas(&mut self, cost_per_byte: u64, size: usize) -> SdkResult<()> {
        let gas = cost_per_byte.saturating_mul(size as u64);
        self.consume_gas(gas)
    }

    /// Returns the total gas used so far. Always `0` in infinite mode.
    pub fn gas_used(&self) -> u64 {
        match self {
            GasCounter::Infinite => 0,
            GasCounter::Finite { gas_used, .. } => *gas_used,
        }
    }

    /// Returns the gas limit, or `None` in infinite mode.
    pub fn gas_limit(&self) -> Option<u64> {
        match self {
            GasCounter::Infinite => None,
            GasCounter::Finite { gas_limit, .. } => Some(*gas_limit),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const MAX_OPS: usize = 64;
    const DEFAULT_CASES: u32 = 128;
    const CI_CASES: u32 = 32;

    fn proptest_cases() -> u32 {
        if let Ok(value) = std::env::var("HELIX_PROPTEST_CASES") {
            if let Ok(parsed) = value.parse::<u32>() {
                if parsed > 0 {
                    return parsed;
                }
            }
        }

        if std::env::var("CI").is_ok() {
            return CI_CASES;
        }

        DEFAULT_CASES
    }

    fn proptest_config() -> proptest::test_runner::Config {
        proptest::test_runner::Config {
            cases: proptest_cases(),
            ..Default::default()
        }
    }

    #[test]
    fn test_infinite_mode() {
        let mut gc = GasCounter::infinite();
        assert!(gc.consume_gas(1000).is_ok());
        assert!(gc.consume_bytes_gas(10, 1 << 20).is_ok());
        assert_eq!(gc.gas_used(), 0);
        assert_eq!(gc.gas_limit(), None);
    }

    #[test]
    fn test_finite_mode_within_limit() {
        let mut gc = GasCounter::finite(100);
        assert_eq!(gc.gas_used(), 0);

        gc.consume_gas(50).unwrap();
        assert_eq!(gc.gas_used(), 50);

        gc.consume_gas(50).unwrap();
        assert_eq!(gc.gas_used(), 100);

        // Exactly at limit is okay, but going beyond should fail.
        let res = gc.consume_gas(1);
        assert_eq!(res.unwrap_err(), ERR_OUT_OF_GAS);
        assert_eq!(gc.gas_used(), 100);
    }

    #[test]
    fn test_bytes_gas_charges_per_byte() {
        let mut gc = GasCounter::finite(1000);
        gc.consume_bytes_gas(10, 25).unwrap();
        assert_eq!(gc.gas_used(), 250);
    }

    #[test]
    fn test_saturating_add_prevents_overflow() {
        let mut gc = GasCounter::finite(1000);
        gc.consume_gas(990).unwrap();

        let result = gc.consume_gas(u64::MAX);
        assert_eq!(result.unwrap_err(), ERR_OUT_OF_GAS);
        assert_eq!(gc.gas_used(), 990);
    }

    proptest! {
        #![proptest_config(proptest_config())]

        #[test]
        fn prop_gas_counter_model(
            gas_limit in 0u64..=2_000,
            ops in proptest::collection::vec(any::<u64>(), 0..=MAX_OPS),
        ) {
            let mut gc = GasCounter::finite(gas_limit);
            let mut expected_used = 0u64;

            for gas in ops {
                let expected_next = expected_used.saturating_add(gas);
                let result = gc.consume_gas(gas);
                if expected_next > gas_limit {
                    prop_assert_eq!(result.unwrap_err(), ERR_OUT_OF_GAS);
                    prop_assert_eq!(gc.gas_used(), expected_used);
                } else {
                    result.unwrap();
                    expected_used = expected_next;
                    prop_assert_eq!(gc.gas_used(), expected_used);
                }
            }
        }
    }
}
