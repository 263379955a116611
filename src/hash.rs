//! Canonical event hashing
//!
//! Every event variant feeds its fields, in a fixed declared order, into a
//! [`HashInput`] and takes a single SHA-256 of the concatenation. The byte
//! layout is part of the cross-validator protocol:
//!
//! - `u64` fields (nonces, heights, decimals): 8 bytes big-endian
//! - EVM addresses: 20 raw bytes (never the hex text)
//! - native addresses: raw bech32 payload
//! - amounts: minimal big-endian magnitude (empty for zero)
//! - strings and byte strings: raw bytes, no length prefix
//!
//! Chain ids are never part of the input; they scope a digest, they do not
//! change it.

use sha2::{Digest, Sha256};
use tiny_keccak::{Hasher, Keccak};

use crate::address_codec::{decode_native_address, parse_evm_address};
use crate::types::{Amount, EventHash};

/// Compute sha256 hash of data
pub fn sha256(data: &[u8]) -> [u8; 32] {
    Sha256::digest(data).into()
}

/// Compute keccak256 hash of data
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    hasher.update(data);
    let mut output = [0u8; 32];
    hasher.finalize(&mut output);
    output
}

/// Accumulates the canonical byte string of one event.
#[derive(Debug, Default, Clone)]
pub struct HashInput {
    buf: Vec<u8>,
}

impl HashInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// 8-byte big-endian integer
    pub fn u64(mut self, value: u64) -> Self {
        self.buf.extend_from_slice(&value.to_be_bytes());
        self
    }

    /// Raw bytes, appended as-is
    pub fn bytes(mut self, value: &[u8]) -> Self {
        self.buf.extend_from_slice(value);
        self
    }

    /// UTF-8 bytes of a string field
    pub fn str(self, value: &str) -> Self {
        self.bytes(value.as_bytes())
    }

    /// EVM address decoded to its 20 raw bytes.
    ///
    /// An address that does not parse contributes its text bytes instead, so
    /// hashing stays total for events that will fail validation anyway.
    pub fn evm_address(self, addr: &str) -> Self {
        match parse_evm_address(addr) {
            Ok(raw) => self.bytes(&raw),
            Err(_) => self.str(addr),
        }
    }

    /// Native bech32 address decoded to its raw payload (text fallback as above)
    pub fn native_address(self, addr: &str) -> Self {
        match decode_native_address(addr) {
            Ok((raw, _)) => self.bytes(&raw),
            Err(_) => self.str(addr),
        }
    }

    /// Unsigned big-endian magnitude of an amount
    pub fn amount(self, amount: &Amount) -> Self {
        self.bytes(&amount.magnitude_be_bytes())
    }

    /// Bytes accumulated so far
    pub fn as_bytes(&self) -> &[u8] {
        &self.buf
    }

    /// Single SHA-256 over the accumulated bytes
    pub fn finish(self) -> EventHash {
        EventHash(sha256(&self.buf))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keccak256() {
        let result = keccak256(b"hello");
        assert_eq!(
            hex::encode(result),
            "1c8aff950685c2ed4bc3174f3472287b56d9517b9c948127319a09a7a36deac8"
        );
    }

    #[test]
    fn test_sha256() {
        let result = sha256(b"hello");
        assert_eq!(
            hex::encode(result),
            "2cf24dba5fb0a30e26e83b2ac5b9e29e1b161e5c1fa7425e73043362938b9824"
        );
    }

    #[test]
    fn test_u64_is_big_endian() {
        let input = HashInput::new().u64(1);
        assert_eq!(input.as_bytes(), &[0, 0, 0, 0, 0, 0, 0, 1]);
    }

    #[test]
    fn test_evm_address_is_raw_bytes() {
        let input = HashInput::new().evm_address("0xdead000000000000000000000000000000000000");
        assert_eq!(input.as_bytes().len(), 20);
        assert_eq!(&input.as_bytes()[..2], &[0xde, 0xad]);
    }

    #[test]
    fn test_evm_address_case_insensitive() {
        let lower = HashInput::new()
            .evm_address("0xf39fd6e51aad88f6f4ce6ab8827279cfffb92266")
            .finish();
        let mixed = HashInput::new()
            .evm_address("0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266")
            .finish();
        assert_eq!(lower, mixed);
    }

    #[test]
    fn test_invalid_address_falls_back_to_text() {
        let input = HashInput::new().evm_address("not-an-address");
        assert_eq!(input.as_bytes(), b"not-an-address");
    }

    #[test]
    fn test_amount_encoding() {
        let input = HashInput::new().amount(&Amount::from(256u64));
        assert_eq!(input.as_bytes(), &[0x01, 0x00]);

        let zero = HashInput::new().amount(&Amount::from(0u64));
        assert!(zero.as_bytes().is_empty());
    }

    #[test]
    fn test_finish_matches_sha256() {
        let input = HashInput::new().u64(7).str("uatom");
        let expected = sha256(input.as_bytes());
        assert_eq!(input.finish().0, expected);
    }
}
