//! Universal Router calldata construction.
//!
//! Pipeline: [`encoder`] (command bytes and per-command input tuples) → [`sequence`] (ordered
//! router program for a swap intent) → [`calldata`] (`execute` payload). [`decoder`] goes the
//! other way for inspection.

pub mod abi;
pub mod calldata;
pub mod chains;
pub mod decoder;
pub mod encoder;
pub mod errors;
pub mod parse;
pub mod sequence;
pub mod types;


pub use calldata::{build_calldata, build_transaction, deadline_after, finalize};
pub use encoder::encode_commands;
pub use errors::{DecodeError, EncodingError, FormatError, SwapError, ValidationError};
pub use sequence::build_sequence;
pub use types::{
    Calldata, CommandSequence, EncodedCommand, RawSwapIntent, RouteKind, SwapConfig, SwapIntent,
    SwapTransaction, TokenRef, DEFAULT_MIN_AMOUNT_OUT,
};
