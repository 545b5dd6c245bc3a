//! Native transaction messages and extension options.

use alloy_primitives::Address;
use helix_core::SdkResult;

use crate::eth::EthTxEnvelope;

/// Type URLs for the message kinds the admission pipeline dispatches on.
pub mod type_url {
    pub const ETHEREUM_TX: &str = "/helix.evm.v1.MsgEthereumTx";
    pub const EXEC: &str = "/cosmos.authz.v1beta1.MsgExec";
    pub const IBC_RECV_PACKET: &str = "/ibc.core.channel.v1.MsgRecvPacket";
}

/// Extension-option type URLs recognized on the wire.
pub mod extension_url {
    pub const ETHEREUM_TX: &str = "/helix.evm.v1.ExtensionOptionsEthereumTx";
    pub const DYNAMIC_FEE_TX: &str = "/helix.types.v1.ExtensionOptionDynamicFeeTx";
}

/// A typed payload attached to a transaction that signals an alternate
/// interpretation.
///
/// This is a closed enumeration: the wire tag is resolved into a variant at
/// decode time, and tags nobody recognizes land in [`Unknown`] so the
/// dispatcher can reject them explicitly instead of mishandling them in a
/// default branch.
///
/// [`Unknown`]: ExtensionOption::Unknown
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ExtensionOption {
    /// The transaction embeds Ethereum messages and must take the EVM
    /// pipeline.
    EthereumTx,
    /// A native transaction whose fee follows the dynamic fee market.
    /// `max_priority_price` caps the tip the payer is willing to pay.
    DynamicFeeTx { max_priority_price: u128 },
    /// A tag this node does not recognize.
    Unknown { type_url: String },
}

impl ExtensionOption {
    /// Resolve a wire type URL into an extension option.
    pub fn from_type_url(url: &str) -> Self {
        match url {
            extension_url::ETHEREUM_TX => ExtensionOption::EthereumTx,
            extension_url::DYNAMIC_FEE_TX => ExtensionOption::DynamicFeeTx {
                max_priority_price: 0,
            },
            other => ExtensionOption::Unknown {
                type_url: other.to_string(),
            },
        }
    }

    pub fn type_url(&self) -> &str {
        match self {
            ExtensionOption::EthereumTx => extension_url::ETHEREUM_TX,
            ExtensionOption::DynamicFeeTx { .. } => extension_url::DYNAMIC_FEE_TX,
            ExtensionOption::Unknown { type_url } => type_url,
        }
    }
}

/// An Ethereum transaction embedded as a native message.
///
/// Carries the raw wire bytes plus the sender the submitter claims; the
/// claim is only trusted after signature verification replaces it with the
/// recovered address.
#[derive(Clone, Debug)]
pub struct EthMsg {
    /// Raw EIP-2718 wire encoding of the inner transaction.
    pub raw: Vec<u8>,
    /// Sender address as declared by the submitter (unverified).
    pub claimed_sender: Address,
}

impl EthMsg {
    pub fn new(raw: Vec<u8>, claimed_sender: Address) -> Self {
        Self {
            raw,
            claimed_sender,
        }
    }

    /// Decode the embedded transaction.
    pub fn decode(&self) -> SdkResult<EthTxEnvelope> {
        EthTxEnvelope::decode(&self.raw)
    }
}

/// Delegated-authority execution wrapper: `grantee` executes `msgs` on
/// behalf of the granter.
#[derive(Clone, Debug)]
pub struct MsgExec {
    pub grantee: Address,
    pub msgs: Vec<Msg>,
}

/// An inbound IBC packet relay message, identified by its packet key.
#[derive(Clone, Debug)]
pub struct IbcPacketMsg {
    pub port: String,
    pub channel: String,
    pub sequence: u64,
}

/// Any other module message, carried opaquely; the pipeline only needs its
/// type URL.
#[derive(Clone, Debug)]
pub struct OtherMsg {
    pub type_url: String,
    pub value: Vec<u8>,
}

/// A single intended state change inside a transaction.
#[derive(Clone, Debug)]
pub enum Msg {
    /// EVM message wrapper; only legal inside EVM-pipeline transactions.
    Ethereum(EthMsg),
    /// Delegated-authority execution wrapper.
    Exec(MsgExec),
    /// Inbound cross-chain packet relay.
    IbcRecvPacket(IbcPacketMsg),
    /// Opaque module message.
    Other(OtherMsg),
}

impl Msg {
    pub fn type_url(&self) -> &str {
        match self {
            Msg::Ethereum(_) => type_url::ETHEREUM_TX,
            Msg::Exec(_) => type_url::EXEC,
            Msg::IbcRecvPacket(_) => type_url::IBC_RECV_PACKET,
            Msg::Other(msg) => &msg.type_url,
        }
    }

    /// Approximate wire size in bytes, used for size-proportional gas.
    pub fn size_bytes(&self) -> usize {
        match self {
            Msg::Ethereum(msg) => msg.raw.len() + Address::len_bytes(),
            Msg::Exec(msg) => {
                Address::len_bytes() + msg.msgs.iter().map(Msg::size_bytes).sum::<usize>()
            }
            Msg::IbcRecvPacket(msg) => msg.port.len() + msg.channel.len() + 8,
            Msg::Other(msg) => msg.type_url.len() + msg.value.len(),
        }
    }
}
