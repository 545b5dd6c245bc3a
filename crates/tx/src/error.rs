//! Transaction-specific error types.

use helix_core::define_error;

// Structural errors (0x00-0x0F range)
define_error!(ERR_TX_DECODE, 0x00, "failed to decode transaction");
define_error!(ERR_EMPTY_INPUT, 0x01, "empty transaction input");
define_error!(ERR_TRAILING_BYTES, 0x02, "trailing bytes after transaction");
define_error!(
    ERR_UNSUPPORTED_TX_TYPE,
    0x03,
    "unsupported transaction type {arg}"
);
define_error!(ERR_EMPTY_MESSAGES, 0x04, "transaction carries no messages");
define_error!(
    ERR_SIG_COUNT_MISMATCH,
    0x05,
    "signature count does not match signer count"
);
define_error!(ERR_NO_SIGNERS, 0x06, "transaction declares no signers");
define_error!(ERR_ZERO_GAS_LIMIT, 0x07, "declared gas limit is zero");

// Authentication errors (0x30-0x3F range)
define_error!(
    ERR_SIGNATURE_RECOVERY,
    0x30,
    "failed to recover signer from signature"
);
define_error!(ERR_INVALID_CHAIN_ID, 0x31, "chain ID mismatch");
