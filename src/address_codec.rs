//! Address and denomination codecs
//!
//! Syntax checks and raw-byte decoding for the two address spaces an event
//! can mention:
//!
//! - **EVM addresses** on the external chain: `0x` followed by 40 hex chars,
//!   decoded to 20 raw bytes.
//! - **Native accounts** on the bridge ledger: bech32 strings whose payload is
//!   a 20-byte account or a 32-byte module/contract address.
//!
//! Also validates native coin denominations and derives module account
//! addresses.

use std::sync::OnceLock;

use bech32::{self, FromBase32, ToBase32, Variant};
use regex::Regex;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::hash::keccak256;

/// Length of a raw EVM address
pub const EVM_ADDRESS_LEN: usize = 20;

/// Upper bound on a native address payload, in bytes
pub const MAX_NATIVE_ADDRESS_LEN: usize = 32;

/// Errors produced while parsing or encoding addresses and denominations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AddressError {
    #[error("missing 0x prefix")]
    MissingPrefix,

    #[error("expected 40 hex chars, got {0}")]
    InvalidLength(usize),

    #[error("invalid hex: {0}")]
    InvalidHex(String),

    #[error("invalid bech32 address: {0}")]
    InvalidBech32(String),

    #[error("expected a 20 or 32 byte payload, got {0} bytes")]
    InvalidPayloadLength(usize),

    #[error("expected prefix '{expected}', got '{got}'")]
    PrefixMismatch { expected: String, got: String },

    #[error("invalid denom: {0}")]
    InvalidDenom(String),
}

// ============================================================================
// EVM Addresses
// ============================================================================

/// Parse a `0x`-prefixed hex EVM address to 20 bytes.
///
/// Mixed case is accepted; the EIP-55 checksum is not enforced.
pub fn parse_evm_address(addr: &str) -> Result<[u8; 20], AddressError> {
    let hex_str = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .ok_or(AddressError::MissingPrefix)?;

    if hex_str.len() != EVM_ADDRESS_LEN * 2 {
        return Err(AddressError::InvalidLength(hex_str.len()));
    }

    let mut result = [0u8; 20];
    hex::decode_to_slice(hex_str, &mut result)
        .map_err(|e| AddressError::InvalidHex(e.to_string()))?;
    Ok(result)
}

/// Encode 20 bytes to an EIP-55 checksummed hex string
pub fn to_checksum_address(bytes: &[u8; 20]) -> String {
    let lower = hex::encode(bytes);
    let digest = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(42);
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = if i % 2 == 0 {
            digest[i / 2] >> 4
        } else {
            digest[i / 2] & 0x0f
        };
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

// ============================================================================
// Native (bech32) Addresses
// ============================================================================

/// Decode a bech32 native address to its raw payload.
///
/// Returns (raw_bytes, hrp). Wallet accounts carry 20 bytes, module and
/// contract accounts 32. Only the original Bech32 checksum is accepted.
pub fn decode_native_address(addr: &str) -> Result<(Vec<u8>, String), AddressError> {
    let (hrp, data, variant) =
        bech32::decode(addr).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;

    if variant != Variant::Bech32 {
        return Err(AddressError::InvalidBech32(
            "bech32m checksum is not valid for an account address".to_string(),
        ));
    }

    let bytes =
        Vec::<u8>::from_base32(&data).map_err(|e| AddressError::InvalidBech32(e.to_string()))?;

    if bytes.len() != EVM_ADDRESS_LEN && bytes.len() != MAX_NATIVE_ADDRESS_LEN {
        return Err(AddressError::InvalidPayloadLength(bytes.len()));
    }

    Ok((bytes, hrp))
}

/// Validate a native address carrying the given human-readable prefix
pub fn validate_native_address(addr: &str, prefix: &str) -> Result<(), AddressError> {
    let (_, hrp) = decode_native_address(addr)?;
    if hrp != prefix {
        return Err(AddressError::PrefixMismatch {
            expected: prefix.to_string(),
            got: hrp,
        });
    }
    Ok(())
}

/// Encode raw bytes to a bech32 native address with the given prefix
pub fn encode_native_address(bytes: &[u8], hrp: &str) -> Result<String, AddressError> {
    bech32::encode(hrp, bytes.to_base32(), Variant::Bech32)
        .map_err(|e| AddressError::InvalidBech32(e.to_string()))
}

/// Derive the 20-byte account address owned by a ledger module.
///
/// `sha256(module_name)[..20]`, matching how the native ledger addresses its
/// module accounts (e.g. the distribution module that holds the community
/// pool).
pub fn module_address(module_name: &str) -> [u8; 20] {
    let digest = Sha256::digest(module_name.as_bytes());
    let mut result = [0u8; 20];
    result.copy_from_slice(&digest[..20]);
    result
}

// ============================================================================
// Denominations
// ============================================================================

fn denom_regex() -> &'static Regex {
    static DENOM: OnceLock<Regex> = OnceLock::new();
    DENOM.get_or_init(|| Regex::new(r"^[a-zA-Z][a-zA-Z0-9/:._-]{2,127}$").expect("invalid regex"))
}

/// Validate a native coin denomination
pub fn validate_denom(denom: &str) -> Result<(), AddressError> {
    if denom_regex().is_match(denom) {
        Ok(())
    } else {
        Err(AddressError::InvalidDenom(denom.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TERRA_ADDR: &str = "terra1x46rqay4d3cssq8gxxvqz8xt6nwlz4td20k38v";

    #[test]
    fn test_parse_evm_address() {
        let raw = parse_evm_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266").unwrap();
        assert_eq!(raw[0], 0xf3);
        assert_eq!(raw[19], 0x66);
    }

    #[test]
    fn test_parse_evm_address_requires_prefix() {
        let result = parse_evm_address("f39Fd6e51aad88F6F4ce6aB8827279cffFb92266");
        assert_eq!(result, Err(AddressError::MissingPrefix));
    }

    #[test]
    fn test_parse_evm_address_wrong_length() {
        assert_eq!(
            parse_evm_address("0xdead"),
            Err(AddressError::InvalidLength(4))
        );
        // 21 bytes
        let long = format!("0x{}", "ab".repeat(21));
        assert!(parse_evm_address(&long).is_err());
    }

    #[test]
    fn test_parse_evm_address_bad_hex() {
        let bad = format!("0x{}", "zz".repeat(20));
        assert!(matches!(
            parse_evm_address(&bad),
            Err(AddressError::InvalidHex(_))
        ));
    }

    #[test]
    fn test_checksum_address() {
        // EIP-55 reference vector
        let raw = parse_evm_address("0x5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(
            to_checksum_address(&raw),
            "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed"
        );
    }

    #[test]
    fn test_decode_native_address() {
        let (raw, hrp) = decode_native_address(TERRA_ADDR).unwrap();
        assert_eq!(hrp, "terra");
        assert_eq!(raw.len(), 20);

        let encoded = encode_native_address(&raw, "terra").unwrap();
        assert_eq!(encoded, TERRA_ADDR);
    }

    #[test]
    fn test_native_address_prefix_pinning() {
        assert!(validate_native_address(TERRA_ADDR, "terra").is_ok());
        assert!(matches!(
            validate_native_address(TERRA_ADDR, "cosmos"),
            Err(AddressError::PrefixMismatch { .. })
        ));

        // Re-encoding the payload under another prefix does not make it valid
        let (raw, _) = decode_native_address(TERRA_ADDR).unwrap();
        let cosmos = encode_native_address(&raw, "cosmos").unwrap();
        assert!(validate_native_address(&cosmos, "terra").is_err());
        assert!(validate_native_address(&cosmos, "cosmos").is_ok());
    }

    #[test]
    fn test_invalid_native_address() {
        assert!(decode_native_address("terra1invalid").is_err());
        assert!(decode_native_address("").is_err());

        let short = encode_native_address(&[1u8; 8], "terra").unwrap();
        assert_eq!(
            decode_native_address(&short),
            Err(AddressError::InvalidPayloadLength(8))
        );
    }

    #[test]
    fn test_bech32m_rejected() {
        let (raw, _) = decode_native_address(TERRA_ADDR).unwrap();
        let bech32m = bech32::encode("terra", raw.to_base32(), Variant::Bech32m).unwrap();
        assert!(matches!(
            decode_native_address(&bech32m),
            Err(AddressError::InvalidBech32(_))
        ));
        assert!(validate_native_address(&bech32m, "terra").is_err());
    }

    #[test]
    fn test_module_address_is_stable() {
        let a = module_address("distribution");
        let b = module_address("distribution");
        assert_eq!(a, b);
        assert_ne!(a, module_address("gravity"));
    }

    #[test]
    fn test_validate_denom() {
        assert!(validate_denom("uatom").is_ok());
        assert!(validate_denom("ibc/27394FB092D2ECCD56123C74F36E4C1F926001CEADA9CA97EA622B25F41E5EB2").is_ok());
        assert!(validate_denom("gravity0xdead000000000000000000000000000000000000").is_ok());
        assert!(validate_denom("ab").is_err());
        assert!(validate_denom("1atom").is_err());
        assert!(validate_denom("").is_err());
        assert!(validate_denom("u atom").is_err());
    }
}
