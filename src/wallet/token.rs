//! Token registry mapping custody token symbols to address encoders.

use super::{address, ChainAddress};
use crate::{
    ckd::ExtendedKey,
    errors::{Error, Result},
};
use bitcoin::Network;

/// Tokens the standalone derive command can render addresses for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Token {
    /// Bitcoin mainnet.
    Btc,
    /// Bitcoin testnet.
    Xtn,
    /// Ether.
    Eth,
    /// Ether on Sepolia.
    Seth,
    /// Mantle.
    Mnt,
    /// Mantle on Sepolia.
    SmntMnt,
}

impl Token {
    /// Look up a token by its custody symbol.
    pub fn from_name(name: &str) -> Result<Self> {
        match name {
            "BTC" => Ok(Token::Btc),
            "XTN" => Ok(Token::Xtn),
            "ETH" => Ok(Token::Eth),
            "SETH" => Ok(Token::Seth),
            "MNT" => Ok(Token::Mnt),
            "SMNT_MNT" => Ok(Token::SmntMnt),
            other => Err(Error::BadInput(format!("token {other} not supported"))),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Token::Btc => "BTC",
            Token::Xtn => "XTN",
            Token::Eth => "ETH",
            Token::Seth => "SETH",
            Token::Mnt => "MNT",
            Token::SmntMnt => "SMNT_MNT",
        }
    }

    /// Render the token's addresses for a derived key.
    pub fn generate_addresses(&self, key: &ExtendedKey) -> Result<Vec<ChainAddress>> {
        match self {
            Token::Btc => address::btc_addresses(key, Network::Bitcoin),
            Token::Xtn => address::btc_addresses(key, Network::Testnet),
            Token::Eth | Token::Seth | Token::Mnt | Token::SmntMnt => address::evm_address(key),
        }
    }
}

impl std::fmt::Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}
