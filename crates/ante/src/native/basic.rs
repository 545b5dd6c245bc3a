//! Structural checks: transaction shape, timeout, memo, size gas.

use helix_core::{ensure, Context, SdkResult};
use helix_tx::Tx;

use crate::errors::{ERR_MEMO_TOO_LARGE, ERR_TX_TIMED_OUT};
use crate::keepers::Keepers;
use crate::native::Decorator;

/// Runs the transaction's own structural validation. Skipped on re-check:
/// shape cannot have changed since the initial admission pass.
pub struct ValidateBasic;

impl Decorator for ValidateBasic {
    fn name(&self) -> &'static str {
        "validate_basic"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        _keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        if ctx.is_recheck() {
            return Ok(());
        }
        tx.validate_basic()
    }
}

/// Rejects transactions past their declared timeout height.
pub struct TimeoutHeight;

impl Decorator for TimeoutHeight {
    fn name(&self) -> &'static str {
        "timeout_height"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        _keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        ensure!(
            tx.timeout_height == 0 || ctx.block().height <= tx.timeout_height,
            ERR_TX_TIMED_OUT
        );
        Ok(())
    }
}

/// Bounds the memo length by the auth-module parameter.
pub struct ValidateMemo;

impl Decorator for ValidateMemo {
    fn name(&self) -> &'static str {
        "validate_memo"
    }

    fn ante(
        &self,
        _ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        let max = keepers.accounts.params().max_memo_characters;
        ensure!(
            tx.memo.chars().count() as u64 <= max,
            ERR_MEMO_TOO_LARGE
        );
        Ok(())
    }
}

/// Charges gas proportional to the transaction's wire size.
pub struct ConsumeTxSizeGas;

impl Decorator for ConsumeTxSizeGas {
    fn name(&self) -> &'static str {
        "consume_tx_size_gas"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        let cost_per_byte = keepers.accounts.params().tx_size_cost_per_byte;
        ctx.gas_meter()
            .consume_bytes_gas(cost_per_byte, tx.size_bytes())
    }
}
