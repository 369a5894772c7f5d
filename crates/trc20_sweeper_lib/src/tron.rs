use crate::utils::ConversionError;
use secp256k1::{PublicKey, SecretKey};
use serde::de::Error as SerdeError;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use sha3::Digest;
use sha3::Keccak256;
use std::fmt::Display;
use std::str::FromStr;
use web3::types::H160;

/// Prefix byte distinguishing TRON addresses from plain 20-byte account ids
pub const TRON_ADDRESS_PREFIX: u8 = 0x41;

/// TRON account address: 0x41 followed by the 20-byte account id.
/// Text form is base58check, wire form (HTTP API) is plain hex.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TronAddress([u8; 21]);

impl TronAddress {
    pub fn from_bytes(bytes: [u8; 21]) -> Result<Self, ConversionError> {
        if bytes[0] != TRON_ADDRESS_PREFIX {
            return Err(ConversionError::from(format!(
                "Invalid address prefix: 0x{:02x}",
                bytes[0]
            )));
        }
        Ok(TronAddress(bytes))
    }

    /// Address matching the given signing key, same account id derivation
    /// as on Ethereum (Keccak-256 of the uncompressed public key)
    pub fn from_secret(secret_key: &SecretKey) -> Self {
        let account_id: [u8; 20] = Keccak256::digest(
            &PublicKey::from_secret_key(&secp256k1::Secp256k1::new(), secret_key)
                .serialize_uncompressed()[1..65],
        )
        .as_slice()[12..]
            .try_into()
            .unwrap();
        let mut bytes = [0u8; 21];
        bytes[0] = TRON_ADDRESS_PREFIX;
        bytes[1..].copy_from_slice(&account_id);
        TronAddress(bytes)
    }

    /// Hex form used by the TRON HTTP API, e.g. "41a614f803..."
    pub fn to_hex(&self) -> String {
        hex::encode(self.0)
    }

    /// The 20-byte account id as an ethabi address, for TRC20 parameter encoding
    pub fn to_eth(&self) -> H160 {
        H160::from_slice(&self.0[1..])
    }

    pub fn as_bytes(&self) -> &[u8; 21] {
        &self.0
    }
}

impl Display for TronAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", bs58::encode(self.0).with_check().into_string())
    }
}

impl FromStr for TronAddress {
    type Err = ConversionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let bytes = if s.len() == 42 && s.starts_with("41") {
            hex::decode(s)
                .map_err(|err| ConversionError::from(format!("Invalid hex address: {err}")))?
        } else {
            bs58::decode(s)
                .with_check(None)
                .into_vec()
                .map_err(|err| ConversionError::from(format!("Invalid base58 address: {err}")))?
        };
        let bytes: [u8; 21] = bytes
            .try_into()
            .map_err(|_| ConversionError::from(format!("Invalid address length: {s}")))?;
        TronAddress::from_bytes(bytes)
    }
}

impl Serialize for TronAddress {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for TronAddress {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        TronAddress::from_str(&s).map_err(|err| D::Error::custom(err.msg))
    }
}
