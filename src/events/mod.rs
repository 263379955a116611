//! Bridge Event Families
//!
//! Two closed families of events:
//!
//! - [`inbound`] - occurrences observed on the external chain and claimed into
//!   the native chain (deposits, batch withdrawals, token deployments, logic
//!   calls)
//! - [`outbound`] - the external chain's execution of native-originated
//!   instructions, attested back with an event nonce and EVM height
//!
//! Each family is an enum with one payload struct per variant. Validation and
//! hashing are pure functions of the event's own fields.

pub mod inbound;
pub mod outbound;

use serde::{Deserialize, Serialize};

use crate::address_codec::{parse_evm_address, validate_denom, validate_native_address};
use crate::error::{DecodeError, ValidationError};
use crate::types::{Amount, EventHash};

pub use inbound::InboundEvent;
pub use outbound::{OutboundEvent, SignerSetMember};

/// Bech32 prefix of native accounts when a deployment does not configure one
pub const DEFAULT_ACCOUNT_PREFIX: &str = "terra";

/// Deployment-specific admission rules layered on top of the structural checks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdmissionPolicy {
    /// Bech32 prefix every native receiver must carry. The hash drops the
    /// prefix, so admission pins it.
    #[serde(default = "default_account_prefix")]
    pub account_prefix: String,
}

fn default_account_prefix() -> String {
    DEFAULT_ACCOUNT_PREFIX.to_string()
}

impl Default for AdmissionPolicy {
    fn default() -> Self {
        Self {
            account_prefix: default_account_prefix(),
        }
    }
}

impl AdmissionPolicy {
    pub fn with_account_prefix(prefix: impl Into<String>) -> Self {
        Self {
            account_prefix: prefix.into(),
        }
    }
}

/// Stateless validation plus canonical hashing
pub trait Attestable {
    /// Structural checks under the given policy. Never mutates the event.
    fn validate_with(&self, policy: &AdmissionPolicy) -> Result<(), ValidationError>;

    /// Canonical digest of the event's fields
    fn hash(&self) -> EventHash;

    /// Structural checks under the default policy
    fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with(&AdmissionPolicy::default())
    }
}

/// A closed event family that can travel inside a vote record as a tagged
/// payload.
pub trait EventFamily: Attestable + Sized {
    /// Wire tag of the concrete variant
    fn kind(&self) -> &'static str;

    /// External chain the event is scoped to, when the family carries one
    fn chain_id(&self) -> Option<u32>;

    /// Event nonce, when the family carries one
    fn event_nonce(&self) -> Option<u64>;

    /// Resolve a tagged payload to its concrete variant
    fn from_tagged(type_tag: &str, payload: serde_json::Value) -> Result<Self, DecodeError>;

    /// Payload of the concrete variant, without the tag
    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error>;
}

/// Decode `payload` as `T`, mapping failure to `UnknownEventType`
pub(crate) fn decode_payload<T>(type_tag: &str, payload: serde_json::Value) -> Result<T, DecodeError>
where
    T: serde::de::DeserializeOwned,
{
    serde_json::from_value(payload).map_err(|e| DecodeError::UnknownEventType {
        type_tag: type_tag.to_string(),
        reason: e.to_string(),
    })
}

// ============================================================================
// Field Checks
// ============================================================================

pub(crate) fn check_evm_address(field: &'static str, addr: &str) -> Result<(), ValidationError> {
    parse_evm_address(addr)
        .map(|_| ())
        .map_err(|source| ValidationError::InvalidEvmAddress { field, source })
}

pub(crate) fn check_native_address(
    field: &'static str,
    addr: &str,
    policy: &AdmissionPolicy,
) -> Result<(), ValidationError> {
    validate_native_address(addr, &policy.account_prefix)
        .map_err(|source| ValidationError::InvalidNativeAddress { field, source })
}

pub(crate) fn check_amount(field: &'static str, amount: &Amount) -> Result<(), ValidationError> {
    if amount.is_positive() {
        Ok(())
    } else {
        Err(ValidationError::InvalidAmount {
            field,
            amount: amount.to_string(),
        })
    }
}

pub(crate) fn check_denom(field: &'static str, denom: &str) -> Result<(), ValidationError> {
    validate_denom(denom).map_err(|source| ValidationError::InvalidDenom { field, source })
}

pub(crate) fn check_not_blank(field: &'static str, value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        Err(ValidationError::Blank { field })
    } else {
        Ok(())
    }
}

pub(crate) fn check_nonce(field: &'static str, nonce: u64) -> Result<(), ValidationError> {
    if nonce == 0 {
        Err(ValidationError::ZeroNonce { field })
    } else {
        Ok(())
    }
}

pub(crate) fn check_not_empty(field: &'static str, value: &[u8]) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::Empty { field })
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_codec::AddressError;

    #[test]
    fn test_check_amount() {
        assert!(check_amount("amount", &Amount::from(1u64)).is_ok());
        assert!(matches!(
            check_amount("amount", &Amount::ZERO),
            Err(ValidationError::InvalidAmount { .. })
        ));
    }

    #[test]
    fn test_check_not_blank() {
        assert!(check_not_blank("name", "Token").is_ok());
        assert_eq!(
            check_not_blank("name", " \t\n"),
            Err(ValidationError::Blank { field: "name" })
        );
    }

    #[test]
    fn test_check_nonce() {
        assert!(check_nonce("event_nonce", 1).is_ok());
        assert_eq!(
            check_nonce("event_nonce", 0).unwrap_err().field(),
            "event_nonce"
        );
    }

    #[test]
    fn test_policy_serde_default() {
        let policy: AdmissionPolicy = serde_json::from_str("{}").unwrap();
        assert_eq!(policy, AdmissionPolicy::default());
        assert_eq!(policy.account_prefix, "terra");
    }

    #[test]
    fn test_check_native_address_pins_prefix() {
        // Same 20-byte payload under two prefixes
        let terra = "terra1x46rqay4d3cssq8gxxvqz8xt6nwlz4td20k38v";
        let cosmos = "cosmos1x46rqay4d3cssq8gxxvqz8xt6nwlz4tdvtv39v";
        let policy = AdmissionPolicy::default();

        assert!(check_native_address("native_receiver", terra, &policy).is_ok());
        assert!(matches!(
            check_native_address("native_receiver", cosmos, &policy),
            Err(ValidationError::InvalidNativeAddress {
                field: "native_receiver",
                source: AddressError::PrefixMismatch { .. },
            })
        ));

        let cosmos_policy = AdmissionPolicy::with_account_prefix("cosmos");
        assert!(check_native_address("native_receiver", cosmos, &cosmos_policy).is_ok());
        assert!(check_native_address("native_receiver", terra, &cosmos_policy).is_err());
    }
}
