//! Transaction admission-control pipeline.
//!
//! Every transaction a node sees runs through one [`AnteHandler`] pass
//! before it may enter the mempool or execute in a block. The handler
//! dispatches on the transaction's first extension option: native
//! transactions take a fixed twenty-unit decorator chain, EVM transactions
//! take a per-message validation pipeline, and unknown extensions are
//! rejected before any state is touched.
//!
//! The pipeline behaves identically across the three pass modes (mempool
//! check, re-check, block delivery) and never mutates persistent state on a
//! rejected transaction beyond what the host's checkpoint/rollback discipline
//! discards.

pub mod dispatcher;
pub mod errors;
pub mod evm;
pub mod keepers;
pub mod native;

pub use dispatcher::{AnteHandler, ConfigError, HandlerOptions};
pub use evm::{EvmPipeline, ValidationAccumulator};
pub use keepers::{Keepers, SandboxConfig};
pub use native::{default_chain, Decorator, DecoratorChain};
