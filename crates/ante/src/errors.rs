//! Admission-pipeline error codes.
//!
//! Grouped by local-id range as documented in `helix_core::error`: policy
//! errors are safe to resubmit with corrected parameters, authentication
//! errors signal the caller must resync, economic errors reject before any
//! transfer commits, and invariant errors indicate a consistency bug between
//! stores and should halt the pass loudly.

use helix_core::define_error;

// Policy errors (0x10-0x2F range)
define_error!(
    ERR_UNSUPPORTED_EXTENSION,
    0x10,
    "unsupported extension option"
);
define_error!(
    ERR_INSUFFICIENT_MEMPOOL_FEE,
    0x12,
    "fee below local mempool minimum"
);
define_error!(
    ERR_INSUFFICIENT_GLOBAL_FEE,
    0x13,
    "fee below protocol minimum"
);
define_error!(ERR_INVALID_MSG, 0x14, "invalid message");
define_error!(ERR_MEMO_TOO_LARGE, 0x15, "memo exceeds maximum length");
define_error!(ERR_TX_TIMED_OUT, 0x16, "transaction timeout height exceeded");
define_error!(
    ERR_TOO_MANY_SIGNATURES,
    0x17,
    "signer count exceeds maximum"
);
define_error!(ERR_MODULE_DISABLED, 0x18, "message type is disabled");
define_error!(
    ERR_AUTHZ_NESTING,
    0x19,
    "delegated execution nested too deeply"
);
define_error!(
    ERR_AUTHZ_FORBIDDEN_MSG,
    0x1A,
    "message type not allowed inside delegated execution"
);
define_error!(
    ERR_ETH_MSG_IN_NATIVE_TX,
    0x1B,
    "ethereum message in native transaction"
);
define_error!(ERR_REDUNDANT_RELAY, 0x1C, "packet already relayed");
define_error!(
    ERR_GAS_WANTED_EXCEEDED,
    0x1D,
    "gas wanted exceeds block gas limit"
);
define_error!(
    ERR_BLOCK_GAS_EXCEEDED,
    0x1E,
    "cumulative gas exceeds block gas limit"
);
define_error!(
    ERR_EXTENSION_COUNT,
    0x1F,
    "unexpected extension option count"
);
define_error!(
    ERR_FEE_MISMATCH,
    0x20,
    "declared fee inconsistent with message totals"
);
define_error!(
    ERR_UNPROTECTED_TX,
    0x21,
    "unprotected transactions not allowed"
);
define_error!(
    ERR_TX_TYPE_NOT_ENABLED,
    0x22,
    "transaction type {arg} not enabled"
);
define_error!(ERR_SENDER_NOT_EOA, 0x23, "sender is not an externally owned account");

// Authentication errors (0x32-0x3F range; 0x30/0x31 live in helix_tx)
define_error!(ERR_SIGNATURE_INVALID, 0x32, "signature verification failed");
define_error!(ERR_NONCE_MISMATCH, 0x33, "account sequence mismatch");
define_error!(
    ERR_PUBKEY_MISMATCH,
    0x34,
    "public key does not match signer address"
);

// Economic errors (0x42-0x4E range; 0x40/0x41 live in helix_core)
define_error!(ERR_INSUFFICIENT_BALANCE, 0x42, "insufficient balance");
define_error!(ERR_TRANSFER_REJECTED, 0x43, "transfer pre-check rejected");

// Invariant violations (0x70-0x7F range), fatal for the pass
define_error!(
    ERR_UNKNOWN_ADDRESS,
    0x70,
    "verified sender missing from account store"
);
