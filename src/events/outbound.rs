//! Outbound events
//!
//! Executions on the external chain of instructions that originated on the
//! native chain, attested back for bookkeeping. Every variant carries the
//! external `chain_id` it is scoped to, a per-chain `event_nonce` (never 0)
//! and the `evm_height` it was observed at. The height only feeds timeout
//! projection; ordering comes from the nonce.

use serde::{Deserialize, Serialize};

use super::{
    check_amount, check_denom, check_evm_address, check_native_address, check_nonce,
    check_not_blank, check_not_empty, decode_payload, AdmissionPolicy, Attestable, EventFamily,
};
use crate::error::{DecodeError, ValidationError};
use crate::hash::{sha256, HashInput};
use crate::types::{Amount, EventHash};

pub const SEND_TO_NATIVE_KIND: &str = "send_to_native";
pub const BATCH_EXECUTED_KIND: &str = "batch_executed";
pub const CONTRACT_CALL_EXECUTED_KIND: &str = "contract_call_executed";
pub const TOKEN_DEPLOYED_KIND: &str = "token_deployed";
pub const SIGNER_SET_EXECUTED_KIND: &str = "signer_set_executed";

/// Native-bound transfer executed on the external chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SendToNativeEvent {
    pub chain_id: u32,
    pub event_nonce: u64,
    pub token_contract: String,
    pub amount: Amount,
    pub external_sender: String,
    pub native_receiver: String,
    pub evm_height: u64,
}

impl Attestable for SendToNativeEvent {
    fn validate_with(&self, policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        check_nonce("event_nonce", self.event_nonce)?;
        check_evm_address("token_contract", &self.token_contract)?;
        check_amount("amount", &self.amount)?;
        check_evm_address("external_sender", &self.external_sender)?;
        check_native_address("native_receiver", &self.native_receiver, policy)
    }

    fn hash(&self) -> EventHash {
        HashInput::new()
            .u64(self.event_nonce)
            .evm_address(&self.token_contract)
            .amount(&self.amount)
            .evm_address(&self.external_sender)
            .native_address(&self.native_receiver)
            .u64(self.evm_height)
            .finish()
    }
}

/// An outbound batch was executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchExecutedEvent {
    pub chain_id: u32,
    pub event_nonce: u64,
    pub token_contract: String,
    pub batch_nonce: u64,
    pub evm_height: u64,
}

impl Attestable for BatchExecutedEvent {
    fn validate_with(&self, _policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        check_nonce("event_nonce", self.event_nonce)?;
        check_evm_address("token_contract", &self.token_contract)?;
        check_nonce("batch_nonce", self.batch_nonce)
    }

    fn hash(&self) -> EventHash {
        HashInput::new()
            .u64(self.event_nonce)
            .evm_address(&self.token_contract)
            .u64(self.batch_nonce)
            .u64(self.evm_height)
            .finish()
    }
}

/// An arbitrary contract call was executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContractCallExecutedEvent {
    pub chain_id: u32,
    pub event_nonce: u64,
    #[serde(with = "hex::serde")]
    pub invalidation_scope: Vec<u8>,
    pub invalidation_nonce: u64,
    pub evm_height: u64,
}

impl Attestable for ContractCallExecutedEvent {
    fn validate_with(&self, _policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        check_nonce("event_nonce", self.event_nonce)?;
        check_not_empty("invalidation_scope", &self.invalidation_scope)?;
        check_nonce("invalidation_nonce", self.invalidation_nonce)
    }

    fn hash(&self) -> EventHash {
        HashInput::new()
            .u64(self.event_nonce)
            .bytes(&self.invalidation_scope)
            .u64(self.invalidation_nonce)
            .u64(self.evm_height)
            .finish()
    }
}

/// A mirror of a native token was deployed on the external chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDeployedEvent {
    pub chain_id: u32,
    pub event_nonce: u64,
    pub native_denom: String,
    pub token_contract: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u64,
    pub evm_height: u64,
}

impl Attestable for TokenDeployedEvent {
    fn validate_with(&self, _policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        check_nonce("event_nonce", self.event_nonce)?;
        check_evm_address("token_contract", &self.token_contract)?;
        check_denom("native_denom", &self.native_denom)?;
        check_not_blank("name", &self.name)?;
        check_not_blank("symbol", &self.symbol)
    }

    fn hash(&self) -> EventHash {
        HashInput::new()
            .u64(self.event_nonce)
            .str(&self.native_denom)
            .evm_address(&self.token_contract)
            .str(&self.name)
            .str(&self.symbol)
            .u64(self.decimals)
            .u64(self.evm_height)
            .finish()
    }
}

/// One validator in a signer set
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSetMember {
    pub evm_address: String,
    pub power: u64,
}

impl SignerSetMember {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_evm_address("evm_address", &self.evm_address)
    }
}

/// Digest of an ordered member list: `sha256(address_i || power_i ...)`.
///
/// Order-sensitive. Callers supply members in the agreed signer-set order.
pub fn members_hash(members: &[SignerSetMember]) -> [u8; 32] {
    let input = members.iter().fold(HashInput::new(), |input, member| {
        input.evm_address(&member.evm_address).u64(member.power)
    });
    sha256(input.as_bytes())
}

/// A validator signer-set rotation was executed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerSetExecutedEvent {
    pub chain_id: u32,
    pub event_nonce: u64,
    pub signer_set_nonce: u64,
    pub evm_height: u64,
    /// `None` is the unset list and fails validation; an empty list is allowed
    #[serde(default)]
    pub members: Option<Vec<SignerSetMember>>,
}

impl Attestable for SignerSetExecutedEvent {
    fn validate_with(&self, _policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        check_nonce("event_nonce", self.event_nonce)?;
        check_nonce("signer_set_nonce", self.signer_set_nonce)?;
        let members = self
            .members
            .as_ref()
            .ok_or(ValidationError::MissingMembers)?;
        for (index, member) in members.iter().enumerate() {
            member
                .validate()
                .map_err(|e| ValidationError::InvalidMember {
                    index,
                    source: Box::new(e),
                })?;
        }
        Ok(())
    }

    fn hash(&self) -> EventHash {
        let members = self.members.as_deref().unwrap_or_default();
        HashInput::new()
            .u64(self.event_nonce)
            .u64(self.signer_set_nonce)
            .u64(self.evm_height)
            .bytes(&members_hash(members))
            .finish()
    }
}

/// Closed set of outbound events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundEvent {
    SendToNative(SendToNativeEvent),
    BatchExecuted(BatchExecutedEvent),
    ContractCallExecuted(ContractCallExecutedEvent),
    TokenDeployed(TokenDeployedEvent),
    SignerSetExecuted(SignerSetExecutedEvent),
}

impl OutboundEvent {
    /// External chain the event is scoped to
    pub fn chain_id(&self) -> u32 {
        match self {
            OutboundEvent::SendToNative(e) => e.chain_id,
            OutboundEvent::BatchExecuted(e) => e.chain_id,
            OutboundEvent::ContractCallExecuted(e) => e.chain_id,
            OutboundEvent::TokenDeployed(e) => e.chain_id,
            OutboundEvent::SignerSetExecuted(e) => e.chain_id,
        }
    }

    pub fn event_nonce(&self) -> u64 {
        match self {
            OutboundEvent::SendToNative(e) => e.event_nonce,
            OutboundEvent::BatchExecuted(e) => e.event_nonce,
            OutboundEvent::ContractCallExecuted(e) => e.event_nonce,
            OutboundEvent::TokenDeployed(e) => e.event_nonce,
            OutboundEvent::SignerSetExecuted(e) => e.event_nonce,
        }
    }

    pub fn evm_height(&self) -> u64 {
        match self {
            OutboundEvent::SendToNative(e) => e.evm_height,
            OutboundEvent::BatchExecuted(e) => e.evm_height,
            OutboundEvent::ContractCallExecuted(e) => e.evm_height,
            OutboundEvent::TokenDeployed(e) => e.evm_height,
            OutboundEvent::SignerSetExecuted(e) => e.evm_height,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            OutboundEvent::SendToNative(_) => SEND_TO_NATIVE_KIND,
            OutboundEvent::BatchExecuted(_) => BATCH_EXECUTED_KIND,
            OutboundEvent::ContractCallExecuted(_) => CONTRACT_CALL_EXECUTED_KIND,
            OutboundEvent::TokenDeployed(_) => TOKEN_DEPLOYED_KIND,
            OutboundEvent::SignerSetExecuted(_) => SIGNER_SET_EXECUTED_KIND,
        }
    }
}

impl Attestable for OutboundEvent {
    fn validate_with(&self, policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        match self {
            OutboundEvent::SendToNative(e) => e.validate_with(policy),
            OutboundEvent::BatchExecuted(e) => e.validate_with(policy),
            OutboundEvent::ContractCallExecuted(e) => e.validate_with(policy),
            OutboundEvent::TokenDeployed(e) => e.validate_with(policy),
            OutboundEvent::SignerSetExecuted(e) => e.validate_with(policy),
        }
    }

    fn hash(&self) -> EventHash {
        match self {
            OutboundEvent::SendToNative(e) => e.hash(),
            OutboundEvent::BatchExecuted(e) => e.hash(),
            OutboundEvent::ContractCallExecuted(e) => e.hash(),
            OutboundEvent::TokenDeployed(e) => e.hash(),
            OutboundEvent::SignerSetExecuted(e) => e.hash(),
        }
    }
}

impl EventFamily for OutboundEvent {
    fn kind(&self) -> &'static str {
        OutboundEvent::kind(self)
    }

    fn chain_id(&self) -> Option<u32> {
        Some(OutboundEvent::chain_id(self))
    }

    fn event_nonce(&self) -> Option<u64> {
        Some(OutboundEvent::event_nonce(self))
    }

    fn from_tagged(type_tag: &str, payload: serde_json::Value) -> Result<Self, DecodeError> {
        match type_tag {
            SEND_TO_NATIVE_KIND => {
                decode_payload(type_tag, payload).map(OutboundEvent::SendToNative)
            }
            BATCH_EXECUTED_KIND => {
                decode_payload(type_tag, payload).map(OutboundEvent::BatchExecuted)
            }
            CONTRACT_CALL_EXECUTED_KIND => {
                decode_payload(type_tag, payload).map(OutboundEvent::ContractCallExecuted)
            }
            TOKEN_DEPLOYED_KIND => {
                decode_payload(type_tag, payload).map(OutboundEvent::TokenDeployed)
            }
            SIGNER_SET_EXECUTED_KIND => {
                decode_payload(type_tag, payload).map(OutboundEvent::SignerSetExecuted)
            }
            other => Err(DecodeError::UnknownEventType {
                type_tag: other.to_string(),
                reason: "not an outbound event type".to_string(),
            }),
        }
    }

    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            OutboundEvent::SendToNative(e) => serde_json::to_value(e),
            OutboundEvent::BatchExecuted(e) => serde_json::to_value(e),
            OutboundEvent::ContractCallExecuted(e) => serde_json::to_value(e),
            OutboundEvent::TokenDeployed(e) => serde_json::to_value(e),
            OutboundEvent::SignerSetExecuted(e) => serde_json::to_value(e),
        }
    }
}

impl From<SendToNativeEvent> for OutboundEvent {
    fn from(e: SendToNativeEvent) -> Self {
        OutboundEvent::SendToNative(e)
    }
}

impl From<BatchExecutedEvent> for OutboundEvent {
    fn from(e: BatchExecutedEvent) -> Self {
        OutboundEvent::BatchExecuted(e)
    }
}

impl From<ContractCallExecutedEvent> for OutboundEvent {
    fn from(e: ContractCallExecutedEvent) -> Self {
        OutboundEvent::ContractCallExecuted(e)
    }
}

impl From<TokenDeployedEvent> for OutboundEvent {
    fn from(e: TokenDeployedEvent) -> Self {
        OutboundEvent::TokenDeployed(e)
    }
}

impl From<SignerSetExecutedEvent> for OutboundEvent {
    fn from(e: SignerSetExecutedEvent) -> Self {
        OutboundEvent::SignerSetExecuted(e)
    }
}
