//! Per-chain address rendering for derived keys.

mod address;
mod token;

pub use address::{
    btc_addresses, evm_address, ChainAddress, LEGACY, NATIVE_SEGWIT, NESTED_SEGWIT, TAPROOT,
};
pub use token::Token;
