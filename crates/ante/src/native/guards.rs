//! Message-shape guards that run before any stateful unit.

use helix_core::{ensure, Context, SdkResult};
use helix_tx::{ExtensionOption, Msg, Tx};

use crate::errors::{
    ERR_AUTHZ_FORBIDDEN_MSG, ERR_AUTHZ_NESTING, ERR_ETH_MSG_IN_NATIVE_TX, ERR_MODULE_DISABLED,
    ERR_UNSUPPORTED_EXTENSION,
};
use crate::keepers::Keepers;
use crate::native::Decorator;

/// Rejects EVM message wrappers that arrive without the Ethereum extension
/// option. Defense in depth: the dispatcher already routes tagged
/// transactions to the EVM pipeline, so any Ethereum message seen here is
/// smuggled.
pub struct RejectEthMsgs;

impl Decorator for RejectEthMsgs {
    fn name(&self) -> &'static str {
        "reject_eth_msgs"
    }

    fn ante(
        &self,
        _ctx: &mut Context,
        _keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        for msg in &tx.msgs {
            ensure!(
                !matches!(msg, Msg::Ethereum(_)),
                ERR_ETH_MSG_IN_NATIVE_TX
            );
        }
        Ok(())
    }
}

/// Restricts what may run inside a delegated-authority execution wrapper.
///
/// EVM messages are forbidden at any nesting depth (they would bypass the
/// EVM pipeline's fee and signature checks), and wrappers may not nest
/// deeper than [`AuthzLimiter::max_depth`].
pub struct AuthzLimiter {
    max_depth: usize,
}

impl Default for AuthzLimiter {
    fn default() -> Self {
        Self { max_depth: 2 }
    }
}

impl AuthzLimiter {
    fn check_msgs(&self, msgs: &[Msg], depth: usize) -> SdkResult<()> {
        for msg in msgs {
            match msg {
                Msg::Exec(exec) => {
                    ensure!(depth < self.max_depth, ERR_AUTHZ_NESTING);
                    self.check_msgs(&exec.msgs, depth + 1)?;
                }
                Msg::Ethereum(_) if depth > 0 => {
                    return Err(ERR_AUTHZ_FORBIDDEN_MSG);
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl Decorator for AuthzLimiter {
    fn name(&self) -> &'static str {
        "authz_limiter"
    }

    fn ante(
        &self,
        _ctx: &mut Context,
        _keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        self.check_msgs(&tx.msgs, 0)
    }
}

/// Validates extension options on a native transaction.
///
/// The dynamic-fee option is the only one the native chain honors; an
/// Ethereum tag here means the dispatcher was bypassed, and unknown tags are
/// rejected outright.
pub struct ExtensionOptionsCheck;

impl Decorator for ExtensionOptionsCheck {
    fn name(&self) -> &'static str {
        "extension_options"
    }

    fn ante(
        &self,
        _ctx: &mut Context,
        _keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        for option in &tx.extension_options {
            match option {
                ExtensionOption::DynamicFeeTx { .. } => {}
                ExtensionOption::EthereumTx | ExtensionOption::Unknown { .. } => {
                    return Err(ERR_UNSUPPORTED_EXTENSION);
                }
            }
        }
        Ok(())
    }
}

/// Operational safety valve: rejects top-level messages whose type URL falls
/// under a disabled module prefix.
pub struct DisabledModules {
    prefixes: Vec<String>,
}

impl DisabledModules {
    pub fn new(prefixes: Vec<String>) -> Self {
        Self { prefixes }
    }

    /// The module prefixes disabled by default.
    pub fn default_prefixes() -> Vec<String> {
        vec!["/cosmos.evidence".to_string(), "/cosmos.slashing".to_string()]
    }
}

impl Decorator for DisabledModules {
    fn name(&self) -> &'static str {
        "disabled_modules"
    }

    fn ante(
        &self,
        _ctx: &mut Context,
        _keepers: &mut Keepers,
        tx: &Tx,
        _simulate: bool,
    ) -> SdkResult<()> {
        for msg in &tx.msgs {
            let url = msg.type_url();
            ensure!(
                !self.prefixes.iter().any(|p| url.starts_with(p.as_str())),
                ERR_MODULE_DISABLED
            );
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloy_primitives::Address;
    use helix_tx::{EthMsg, MsgExec, OtherMsg};

    #[test]
    fn authz_limiter_rejects_nested_eth_msg() {
        let limiter = AuthzLimiter::default();
        let msgs = vec![Msg::Exec(MsgExec {
            grantee: Address::repeat_byte(1),
            msgs: vec![Msg::Ethereum(EthMsg::new(vec![0xc0], Address::ZERO))],
        })];
        assert_eq!(
            limiter.check_msgs(&msgs, 0).unwrap_err(),
            ERR_AUTHZ_FORBIDDEN_MSG
        );
    }

    #[test]
    fn authz_limiter_rejects_deep_nesting() {
        let limiter = AuthzLimiter::default();
        let inner = Msg::Exec(MsgExec {
            grantee: Address::repeat_byte(1),
            msgs: vec![Msg::Other(OtherMsg {
                type_url: "/cosmos.bank.v1beta1.MsgSend".to_string(),
                value: vec![],
            })],
        });
        let nested = Msg::Exec(MsgExec {
            grantee: Address::repeat_byte(2),
            msgs: vec![Msg::Exec(MsgExec {
                grantee: Address::repeat_byte(3),
                msgs: vec![inner],
            })],
        });
        assert_eq!(
            limiter.check_msgs(&[nested], 0).unwrap_err(),
            ERR_AUTHZ_NESTING
        );
    }

    #[test]
    fn authz_limiter_allows_plain_wrapped_msgs() {
        let limiter = AuthzLimiter::default();
        let msgs = vec![Msg::Exec(MsgExec {
            grantee: Address::repeat_byte(1),
            msgs: vec![Msg::Other(OtherMsg {
                type_url: "/cosmos.bank.v1beta1.MsgSend".to_string(),
                value: vec![],
            })],
        })];
        assert!(limiter.check_msgs(&msgs, 0).is_ok());
    }
}
