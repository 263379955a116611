//! Common value types shared by both event families

use std::fmt;
use std::str::FromStr;

use alloy::primitives::{I256, U256};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

// ============================================================================
// Amount
// ============================================================================

/// Token amount carried by deposit-style events.
///
/// Signed so that a negative value arriving on the wire is representable and
/// can be rejected by validation instead of failing to decode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Amount(pub I256);

impl Amount {
    pub const ZERO: Amount = Amount(I256::ZERO);

    /// Strictly greater than zero
    pub fn is_positive(&self) -> bool {
        self.0.is_positive()
    }

    /// Minimal big-endian bytes of the absolute value (empty for zero)
    pub fn magnitude_be_bytes(&self) -> Vec<u8> {
        let bytes = self.0.unsigned_abs().to_be_bytes::<32>();
        let first = bytes.iter().position(|&b| b != 0).unwrap_or(bytes.len());
        bytes[first..].to_vec()
    }
}

impl From<u64> for Amount {
    fn from(value: u64) -> Self {
        Amount(I256::from_raw(U256::from(value)))
    }
}

impl From<u128> for Amount {
    fn from(value: u128) -> Self {
        Amount(I256::from_raw(U256::from(value)))
    }
}

impl From<i64> for Amount {
    fn from(value: i64) -> Self {
        let magnitude = I256::from_raw(U256::from(value.unsigned_abs()));
        if value < 0 {
            Amount(-magnitude)
        } else {
            Amount(magnitude)
        }
    }
}

impl FromStr for Amount {
    type Err = alloy::primitives::ParseSignedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        I256::from_dec_str(s.trim()).map(Amount)
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Amounts travel as decimal strings; plain JSON integers are also accepted.
impl Serialize for Amount {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Amount {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct AmountVisitor;

        impl Visitor<'_> for AmountVisitor {
            type Value = Amount;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a decimal integer string or an integer")
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<Amount, E> {
                v.parse().map_err(|e| E::custom(format!("invalid amount {v:?}: {e}")))
            }

            fn visit_u64<E: de::Error>(self, v: u64) -> Result<Amount, E> {
                Ok(Amount::from(v))
            }

            fn visit_i64<E: de::Error>(self, v: i64) -> Result<Amount, E> {
                Ok(Amount::from(v))
            }
        }

        deserializer.deserialize_any(AmountVisitor)
    }
}

// ============================================================================
// Event Hash
// ============================================================================

/// Canonical 32-byte event digest, the cross-validator matching key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EventHash(pub [u8; 32]);

impl EventHash {
    /// Get the raw bytes
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Convert to hex string with 0x prefix
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Create from hex string (with or without 0x prefix)
    pub fn from_hex(hex: &str) -> Result<Self, hex::FromHexError> {
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        let mut result = [0u8; 32];
        hex::decode_to_slice(hex, &mut result)?;
        Ok(EventHash(result))
    }
}

impl fmt::Display for EventHash {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_hex())
    }
}

impl Serialize for EventHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for EventHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        EventHash::from_hex(&s).map_err(de::Error::custom)
    }
}
