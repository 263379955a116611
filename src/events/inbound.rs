//! Inbound events
//!
//! Occurrences observed on the external chain and claimed into the native
//! chain. `kind()` gives the coarse routing key the tally subsystem uses next
//! to the hash.

use serde::{Deserialize, Serialize};

use super::{
    check_amount, check_denom, check_evm_address, check_native_address, check_nonce,
    check_not_blank, check_not_empty, decode_payload, AdmissionPolicy, Attestable, EventFamily,
};
use crate::error::{DecodeError, ValidationError};
use crate::hash::HashInput;
use crate::types::{Amount, EventHash};

pub const DEPOSIT_KIND: &str = "deposit";
pub const WITHDRAW_KIND: &str = "withdraw";
pub const TOKEN_DEPLOYED_KIND: &str = "cosmos_erc20_deployed";
pub const LOGIC_CALL_EXECUTED_KIND: &str = "logic_call_executed";

/// External token moved into the bridge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DepositEvent {
    pub token_contract: String,
    pub amount: Amount,
    pub external_sender: String,
    pub native_receiver: String,
}

impl Attestable for DepositEvent {
    fn validate_with(&self, policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        check_evm_address("token_contract", &self.token_contract)?;
        check_amount("amount", &self.amount)?;
        check_evm_address("external_sender", &self.external_sender)?;
        check_native_address("native_receiver", &self.native_receiver, policy)
    }

    fn hash(&self) -> EventHash {
        HashInput::new()
            .evm_address(&self.token_contract)
            .amount(&self.amount)
            .evm_address(&self.external_sender)
            .native_address(&self.native_receiver)
            .finish()
    }
}

/// An outbound batch executed on the external chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WithdrawEvent {
    pub token_contract: String,
    pub batch_nonce: u64,
}

impl Attestable for WithdrawEvent {
    fn validate_with(&self, _policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        check_nonce("batch_nonce", self.batch_nonce)?;
        check_evm_address("token_contract", &self.token_contract)
    }

    fn hash(&self) -> EventHash {
        HashInput::new()
            .evm_address(&self.token_contract)
            .u64(self.batch_nonce)
            .finish()
    }
}

/// An external mirror of a native token was deployed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDeployedEvent {
    pub token_contract: String,
    pub native_denom: String,
    pub name: String,
    pub symbol: String,
    pub decimals: u64,
}

impl Attestable for TokenDeployedEvent {
    fn validate_with(&self, _policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        check_evm_address("token_contract", &self.token_contract)?;
        check_denom("native_denom", &self.native_denom)?;
        check_not_blank("name", &self.name)?;
        check_not_blank("symbol", &self.symbol)
    }

    fn hash(&self) -> EventHash {
        HashInput::new()
            .evm_address(&self.token_contract)
            .str(&self.native_denom)
            .str(&self.name)
            .str(&self.symbol)
            .u64(self.decimals)
            .finish()
    }
}

/// An arbitrary external contract call completed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogicCallExecutedEvent {
    #[serde(with = "hex::serde")]
    pub invalidation_id: Vec<u8>,
    pub invalidation_nonce: u64,
}

impl Attestable for LogicCallExecutedEvent {
    fn validate_with(&self, _policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        check_not_empty("invalidation_id", &self.invalidation_id)?;
        check_nonce("invalidation_nonce", self.invalidation_nonce)
    }

    fn hash(&self) -> EventHash {
        HashInput::new()
            .bytes(&self.invalidation_id)
            .u64(self.invalidation_nonce)
            .finish()
    }
}

/// Closed set of inbound events
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    Deposit(DepositEvent),
    Withdraw(WithdrawEvent),
    TokenDeployed(TokenDeployedEvent),
    LogicCallExecuted(LogicCallExecutedEvent),
}

impl InboundEvent {
    /// Routing key of the variant
    pub fn kind(&self) -> &'static str {
        match self {
            InboundEvent::Deposit(_) => DEPOSIT_KIND,
            InboundEvent::Withdraw(_) => WITHDRAW_KIND,
            InboundEvent::TokenDeployed(_) => TOKEN_DEPLOYED_KIND,
            InboundEvent::LogicCallExecuted(_) => LOGIC_CALL_EXECUTED_KIND,
        }
    }
}

impl Attestable for InboundEvent {
    fn validate_with(&self, policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        match self {
            InboundEvent::Deposit(e) => e.validate_with(policy),
            InboundEvent::Withdraw(e) => e.validate_with(policy),
            InboundEvent::TokenDeployed(e) => e.validate_with(policy),
            InboundEvent::LogicCallExecuted(e) => e.validate_with(policy),
        }
    }

    fn hash(&self) -> EventHash {
        match self {
            InboundEvent::Deposit(e) => e.hash(),
            InboundEvent::Withdraw(e) => e.hash(),
            InboundEvent::TokenDeployed(e) => e.hash(),
            InboundEvent::LogicCallExecuted(e) => e.hash(),
        }
    }
}

impl EventFamily for InboundEvent {
    fn kind(&self) -> &'static str {
        InboundEvent::kind(self)
    }

    fn chain_id(&self) -> Option<u32> {
        None
    }

    fn event_nonce(&self) -> Option<u64> {
        None
    }

    fn from_tagged(type_tag: &str, payload: serde_json::Value) -> Result<Self, DecodeError> {
        match type_tag {
            DEPOSIT_KIND => decode_payload(type_tag, payload).map(InboundEvent::Deposit),
            WITHDRAW_KIND => decode_payload(type_tag, payload).map(InboundEvent::Withdraw),
            TOKEN_DEPLOYED_KIND => {
                decode_payload(type_tag, payload).map(InboundEvent::TokenDeployed)
            }
            LOGIC_CALL_EXECUTED_KIND => {
                decode_payload(type_tag, payload).map(InboundEvent::LogicCallExecuted)
            }
            other => Err(DecodeError::UnknownEventType {
                type_tag: other.to_string(),
                reason: "not an inbound event type".to_string(),
            }),
        }
    }

    fn to_payload(&self) -> Result<serde_json::Value, serde_json::Error> {
        match self {
            InboundEvent::Deposit(e) => serde_json::to_value(e),
            InboundEvent::Withdraw(e) => serde_json::to_value(e),
            InboundEvent::TokenDeployed(e) => serde_json::to_value(e),
            InboundEvent::LogicCallExecuted(e) => serde_json::to_value(e),
        }
    }
}

impl From<DepositEvent> for InboundEvent {
    fn from(e: DepositEvent) -> Self {
        InboundEvent::Deposit(e)
    }
}

impl From<WithdrawEvent> for InboundEvent {
    fn from(e: WithdrawEvent) -> Self {
        InboundEvent::Withdraw(e)
    }
}

impl From<TokenDeployedEvent> for InboundEvent {
    fn from(e: TokenDeployedEvent) -> Self {
        InboundEvent::TokenDeployed(e)
    }
}

impl From<LogicCallExecutedEvent> for InboundEvent {
    fn from(e: LogicCallExecutedEvent) -> Self {
        InboundEvent::LogicCallExecuted(e)
    }
}
