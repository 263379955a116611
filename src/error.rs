//! Error types for event admission, vote-record decoding and treasury spends

use cosmwasm_std::Decimal256;
use thiserror::Error;

use crate::address_codec::AddressError;

/// Structural admission failure. The claim is rejected; nothing is retried.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{field}: invalid EVM address: {source}")]
    InvalidEvmAddress {
        field: &'static str,
        source: AddressError,
    },

    #[error("{field}: invalid native address: {source}")]
    InvalidNativeAddress {
        field: &'static str,
        source: AddressError,
    },

    #[error("{field}: invalid amount {amount}, must be positive")]
    InvalidAmount { field: &'static str, amount: String },

    #[error("{field}: {source}")]
    InvalidDenom {
        field: &'static str,
        source: AddressError,
    },

    #[error("{field} cannot be blank")]
    Blank { field: &'static str },

    #[error("{field} cannot be 0")]
    ZeroNonce { field: &'static str },

    #[error("{field} cannot be empty")]
    Empty { field: &'static str },

    #[error("members cannot be nil")]
    MissingMembers,

    #[error("EVM signer {index} error: {source}")]
    InvalidMember {
        index: usize,
        source: Box<ValidationError>,
    },

    #[error("{field}: expected denom {expected}, got {got}")]
    DenomMismatch {
        field: &'static str,
        expected: String,
        got: String,
    },

    #[error("{field} mismatch: record has {record}, event has {event}")]
    RecordMismatch {
        field: &'static str,
        record: u64,
        event: u64,
    },
}

impl ValidationError {
    /// Name of the field that failed validation
    pub fn field(&self) -> &'static str {
        match self {
            ValidationError::InvalidEvmAddress { field, .. }
            | ValidationError::InvalidNativeAddress { field, .. }
            | ValidationError::InvalidAmount { field, .. }
            | ValidationError::InvalidDenom { field, .. }
            | ValidationError::Blank { field }
            | ValidationError::ZeroNonce { field }
            | ValidationError::Empty { field }
            | ValidationError::DenomMismatch { field, .. }
            | ValidationError::RecordMismatch { field, .. } => *field,
            ValidationError::MissingMembers | ValidationError::InvalidMember { .. } => "members",
        }
    }
}

/// A vote record that could not be resolved to a concrete event
#[derive(Error, Debug)]
pub enum DecodeError {
    /// Unrecognized type tag, or a payload that does not decode as the tagged
    /// variant. The record is discarded before validation or hashing.
    #[error("unknown event type '{type_tag}': {reason}")]
    UnknownEventType { type_tag: String, reason: String },

    #[error("malformed vote record: {0}")]
    MalformedRecord(#[from] serde_json::Error),
}

/// Failure reported by the transfer-issuance collaborator
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{reason}")]
pub struct IssuanceError {
    pub reason: String,
}

impl IssuanceError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Community-pool spend failures. None of them leave a partial mutation.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SpendError {
    #[error("insufficient community pool funds for {denom}: requested {requested}, available {available}")]
    InsufficientPoolFunds {
        denom: String,
        requested: Decimal256,
        available: Decimal256,
    },

    #[error("outbound transfer issuance failed: {0}")]
    IssuanceFailure(#[from] IssuanceError),

    #[error("invalid spend proposal: {0}")]
    InvalidProposal(#[from] ValidationError),
}
