//! Bitcoin and EVM address encoders.

use crate::{
    ckd::ExtendedKey,
    curve::{CurveKind, PointOps},
    errors::{Error, Result},
};
use bitcoin::{
    key::TweakedPublicKey, Address, CompressedPublicKey, Network, NetworkKind, PublicKey,
    XOnlyPublicKey,
};
use sha3::{Digest, Keccak256};

pub const LEGACY: &str = "Legacy";
pub const NESTED_SEGWIT: &str = "Nested SegWit (P2SH)";
pub const NATIVE_SEGWIT: &str = "Native SegWit (Bech32)";
pub const TAPROOT: &str = "Taproot";

/// A rendered blockchain address with its script kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainAddress {
    pub kind: &'static str,
    pub address: String,
}

fn secp256k1_pubkey_bytes(key: &ExtendedKey) -> Result<Vec<u8>> {
    if key.curve_kind() != CurveKind::Secp256k1 {
        return Err(Error::Address(
            "address generation requires a secp256k1 key".into(),
        ));
    }
    Ok(key.public_key().key_bytes())
}

/// Render the four Bitcoin address flavours for a derived key.
pub fn btc_addresses(key: &ExtendedKey, network: Network) -> Result<Vec<ChainAddress>> {
    let pub_bytes = secp256k1_pubkey_bytes(key)?;
    let pubkey = PublicKey::from_slice(&pub_bytes).map_err(|e| Error::Address(e.to_string()))?;
    let compressed =
        CompressedPublicKey::from_slice(&pub_bytes).map_err(|e| Error::Address(e.to_string()))?;
    let network_kind: NetworkKind = network.into();

    let mut addresses = Vec::with_capacity(4);

    let p2pkh = Address::p2pkh(pubkey, network);
    addresses.push(ChainAddress {
        kind: LEGACY,
        address: p2pkh.to_string(),
    });

    let p2wpkh = Address::p2wpkh(&compressed, network);
    addresses.push(ChainAddress {
        kind: NATIVE_SEGWIT,
        address: p2wpkh.to_string(),
    });

    let p2sh = Address::p2shwpkh(&compressed, network_kind);
    addresses.push(ChainAddress {
        kind: NESTED_SEGWIT,
        address: p2sh.to_string(),
    });

    // The x-only public key is used as the taproot output key directly,
    // without the usual tweak.
    let xonly =
        XOnlyPublicKey::from_slice(&pub_bytes[1..]).map_err(|e| Error::Address(e.to_string()))?;
    let p2tr = Address::p2tr_tweaked(TweakedPublicKey::dangerous_assume_tweaked(xonly), network);
    addresses.push(ChainAddress {
        kind: TAPROOT,
        address: p2tr.to_string(),
    });

    Ok(addresses)
}

/// Render the EIP-55 checksummed EVM address for a derived key.
pub fn evm_address(key: &ExtendedKey) -> Result<Vec<ChainAddress>> {
    let pub_bytes = secp256k1_pubkey_bytes(key)?;
    let point = crate::secp256k1::K256Point::from_bytes(&pub_bytes)?;
    let uncompressed = {
        use k256::elliptic_curve::sec1::ToEncodedPoint;
        point.0.to_affine().to_encoded_point(false)
    };

    let digest = Keccak256::digest(&uncompressed.as_bytes()[1..]);
    let addr_bytes = &digest[12..];
    Ok(vec![ChainAddress {
        kind: "",
        address: eip55_checksum(addr_bytes),
    }])
}

fn eip55_checksum(addr: &[u8]) -> String {
    let lower = hex::encode(addr);
    let digest = Keccak256::digest(lower.as_bytes());
    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (digest[i / 2] >> (4 * (1 - i % 2))) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn found(addresses: &[ChainAddress], address: &str, kind: &str) -> bool {
        addresses
            .iter()
            .any(|a| a.address == address && a.kind == kind)
    }

    #[test]
    fn testnet_addresses_from_child_xpubs() {
        let cases = [
            (
                "xpub6Fu7txWcpENRtHzK5uzyTeNsD15Zqf56A52WWmNjSJc3fqLyzHRjx9V8twNEsE1G6HCXxRMtbbQwn1KM42Eve8dapWiqhkH7cZ5j1GqbVnj",
                "tb1prs8ekfunf4yfq6epnz8q4zw39zykhkgz9hrprpgml4s3w04egzwsnhud60",
                TAPROOT,
            ),
            (
                "xpub6Fu7txWcpENRqfaVLYCHo4FnoFvxkG9UQ52xMxsi5XQuXFhqp36izQrPZqDWqr3P5rGbECP3Bzoc7j9HK1ZWFJe3FBsPZZ14NaDJKfyYGa5",
                "tb1q0px4kneptpwer2qqypd6hsvwgmg9r40tz5qws0",
                NATIVE_SEGWIT,
            ),
            (
                "xpub6Fu7txWcpENRnAtev4TYMcAwAZcNxMjr4hxGPZMu8eXgaC1HjS3dDqhaPkY6EHvzisyNa21aLnHYYZ8YQ1y3qTZSTfAvPHoh53T9ebe4CBa",
                "2MxgpWvNHAsXPRvZfxmRT2CXWAVzEuS2rtV",
                NESTED_SEGWIT,
            ),
            (
                "xpub6Fu7txWcpENRkFuTNw1dqziPS2vH6KK9K1k6WkVVq65fZYBhRLAh5j4kVKPtXQAYCgnoLtkkLYSmYWTuGi1Fx53GumKRyDGqtpR3CM69eNf",
                "ms95B9JosWfupRmNREmMZ112DsYCBC2Xu5",
                LEGACY,
            ),
        ];
        for (xpub, address, kind) in cases {
            let key = ExtendedKey::b58_deserialize(xpub).unwrap();
            let addresses = btc_addresses(&key, Network::Testnet).unwrap();
            assert_eq!(addresses.len(), 4);
            assert!(found(&addresses, address, kind), "missing {address}");
        }
    }

    #[test]
    fn mainnet_addresses_from_child_xpubs() {
        let cases = [
            (
                "xpub6Gp6PCF54nmH4gWS4spcdsVSibgjBGrkuyBXVG8hCjn1Cq99uk222YPhJouQm7Gmw2bKFpEk5MGrZBD9PQTDZsBcB9qXztKUcUoXUMCBSgD",
                "16EwA2beT2AgiipxJBc81527KP2kSogAMw",
                LEGACY,
            ),
            (
                "xpub6Gp6PCF54nmH2aS9w2CspDXe1KdfoQxWDJnQktWammDhjVdVSQtzvfD7pBJP7HAmQkYrjYgC4wh5z3cREYo3zUgSSCu3VeFNSJZPTs8jC8z",
                "36iDRpHScA9SLTYGkqmr2BThoDjp5w4r7x",
                NESTED_SEGWIT,
            ),
            (
                "xpub6Gp6PCF54nmGyHJ4x3FhkwRnVGXFZkErWjYSgXHYpBKSERiTnmteAqHKDWq3VGDgE789RZ8x2fVArp9W6dQNw9HwNVHVGZYrbabSixYoAP4",
                "bc1qgkal4qh29fklm7rw07f6rw6mpxr8thjxvuc7hk",
                NATIVE_SEGWIT,
            ),
            (
                "xpub6Gp6PCF54nmGwSdya4hyLwzaC3fLpApXCWdAuuragPRG6cxnnkJj6A9ic3sMeEzhtCyXGuLvYD4wEbnvvaiYbGk3ZsYWjE5Xcqn2KcYfZx3",
                "bc1peh6fpx7un7jfypedtnpylftl5uv92kdchqzu0ty9s354lccn8vxsfpp4jn",
                TAPROOT,
            ),
        ];
        for (xpub, address, kind) in cases {
            let key = ExtendedKey::b58_deserialize(xpub).unwrap();
            let addresses = btc_addresses(&key, Network::Bitcoin).unwrap();
            assert_eq!(addresses.len(), 4);
            assert!(found(&addresses, address, kind), "missing {address}");
        }
    }

    #[test]
    fn evm_address_is_eip55_checksummed() {
        let key = ExtendedKey::b58_deserialize(
            "xpub6FXwXZ4feQjGX7ZXUdTB9cRuJuUJkzsWAQHejUBozkPgN9wwu7P7wNtuyRqiey52ES8PuZwmtgHHcVSFGH75RBthn8djN2fkdcbggtpRQQ2",
        )
        .unwrap();
        let addresses = evm_address(&key).unwrap();
        assert_eq!(addresses.len(), 1);
        assert_eq!(
            addresses[0].address,
            "0xBe7f55D105BBacc2A963aef535d0d791D8911fB2"
        );
    }

    #[test]
    fn ed25519_keys_have_no_chain_address() {
        let key = ExtendedKey::b58_deserialize(
            "cpubGCmTMqXYTnzkbj4boYV9RcocrSYG1bSr8QuiRnEdhspzhvURRoBwV4iU7TnBKRRbmgHSAymckcRckZoNSR8SRK13n5ztB3pneN4xJSePBvG",
        )
        .unwrap();
        assert!(btc_addresses(&key, Network::Bitcoin).is_err());
        assert!(evm_address(&key).is_err());
    }
}
