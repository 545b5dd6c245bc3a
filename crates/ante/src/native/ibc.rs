//! Redundant cross-chain relay filtering.

use helix_core::{ensure, Context, SdkResult};
use helix_tx::{Msg, Tx};

use crate::errors::ERR_REDUNDANT_RELAY;
use crate::keepers::Keepers;
use crate::native::Decorator;

/// Drops relay messages for packets this chain already processed.
///
/// Only applies on admission checks: a relayer resubmitting an
/// already-received packet wastes mempool space, but a packet that was
/// unprocessed at admission time and processed by the time of delivery is
/// handled by the module itself.
pub struct RedundantRelay;

impl Decorator for RedundantRelay {
    fn name(&self) -> &'static str {
        "redundant_relay"
    }

    fn ante(
        &self,
        ctx: &mut Context,
        keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        if !ctx.is_check() {
            return Ok(());
        }
        for msg in &tx.msgs {
            if let Msg::IbcRecvPacket(packet) = msg {
                ensure!(
                    !keepers
                        .ibc
                        .has_receipt(&packet.port, &packet.channel, packet.sequence),
                    ERR_REDUNDANT_RELAY
                );
            }
        }
        Ok(())
    }
}
