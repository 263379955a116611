//! Vote Records
//!
//! A vote record wraps exactly one event of one family together with the
//! tally bookkeeping the storage collaborator keeps for it. On the wire the
//! event travels as a tagged payload:
//!
//! ```json
//! {
//!   "chain_id": 1,
//!   "nonce": 42,
//!   "event": { "@type": "batch_executed", "value": { ... } },
//!   "votes": ["validator1..."],
//!   "accepted": false
//! }
//! ```
//!
//! The tag is resolved to a concrete variant once, in [`VoteRecord::decode`].
//! An unknown tag, or a payload that does not decode as its tagged variant,
//! discards the record with [`DecodeError::UnknownEventType`] before anything
//! validates or hashes it.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DecodeError, ValidationError};
use crate::events::{AdmissionPolicy, EventFamily, InboundEvent, OutboundEvent};
use crate::types::EventHash;

pub type OutboundVoteRecord = VoteRecord<OutboundEvent>;
pub type InboundVoteRecord = VoteRecord<InboundEvent>;

/// Tally bucket key. Identical events on different chains are distinct entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct VoteRecordKey {
    pub chain_id: u32,
    pub hash: EventHash,
}

/// One validator's claim, as handed to the tally subsystem
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub chain_id: u32,
    pub nonce: u64,
    pub hash: EventHash,
    pub event_type: String,
    pub voting_power: u64,
}

impl Claim {
    pub fn key(&self) -> VoteRecordKey {
        VoteRecordKey {
            chain_id: self.chain_id,
            hash: self.hash,
        }
    }
}

/// Decoded vote record. The event variant is fixed at construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoteRecord<E> {
    pub chain_id: u32,
    pub nonce: u64,
    event: E,
    pub votes: Vec<String>,
    pub accepted: bool,
}

/// Wire form of the tagged event payload
#[derive(Debug, Serialize, Deserialize)]
struct TaggedEvent {
    #[serde(rename = "@type")]
    type_tag: String,
    #[serde(default)]
    value: serde_json::Value,
}

/// Wire form of a vote record
#[derive(Debug, Serialize, Deserialize)]
struct RawVoteRecord {
    chain_id: u32,
    nonce: u64,
    event: TaggedEvent,
    #[serde(default)]
    votes: Vec<String>,
    #[serde(default)]
    accepted: bool,
}

impl<E: EventFamily> VoteRecord<E> {
    /// Wrap a freshly observed event
    pub fn new(chain_id: u32, nonce: u64, event: E) -> Self {
        Self {
            chain_id,
            nonce,
            event,
            votes: Vec::new(),
            accepted: false,
        }
    }

    /// The wrapped event
    pub fn event(&self) -> &E {
        &self.event
    }

    /// Type tag of the wrapped event
    pub fn event_type(&self) -> &'static str {
        self.event.kind()
    }

    /// Canonical hash of the wrapped event
    pub fn hash(&self) -> EventHash {
        self.event.hash()
    }

    /// Tally bucket this record belongs to
    pub fn key(&self) -> VoteRecordKey {
        VoteRecordKey {
            chain_id: self.chain_id,
            hash: self.hash(),
        }
    }

    /// Record a validator's vote. Returns false if it had already voted.
    pub fn add_vote(&mut self, validator: impl Into<String>) -> bool {
        let validator = validator.into();
        if self.votes.contains(&validator) {
            return false;
        }
        self.votes.push(validator);
        true
    }

    /// Build the claim tuple for one validator
    pub fn claim(&self, voting_power: u64) -> Claim {
        Claim {
            chain_id: self.chain_id,
            nonce: self.nonce,
            hash: self.hash(),
            event_type: self.event_type().to_string(),
            voting_power,
        }
    }

    /// Validate under the default admission policy
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.validate_with(&AdmissionPolicy::default())
    }

    /// Validate the event, then check it agrees with the record's chain id and
    /// nonce where the event carries them.
    pub fn validate_with(&self, policy: &AdmissionPolicy) -> Result<(), ValidationError> {
        if self.nonce == 0 {
            return Err(ValidationError::ZeroNonce { field: "nonce" });
        }

        self.event.validate_with(policy)?;

        if let Some(event_chain) = self.event.chain_id() {
            if event_chain != self.chain_id {
                return Err(ValidationError::RecordMismatch {
                    field: "chain_id",
                    record: u64::from(self.chain_id),
                    event: u64::from(event_chain),
                });
            }
        }

        if let Some(event_nonce) = self.event.event_nonce() {
            if event_nonce != self.nonce {
                return Err(ValidationError::RecordMismatch {
                    field: "nonce",
                    record: self.nonce,
                    event: event_nonce,
                });
            }
        }

        debug!(
            chain_id = self.chain_id,
            nonce = self.nonce,
            event_type = self.event_type(),
            "Vote record passed validation"
        );
        Ok(())
    }

    /// Decode a record, resolving the tagged payload to a concrete event
    pub fn decode(bytes: &[u8]) -> Result<Self, DecodeError> {
        let raw: RawVoteRecord = serde_json::from_slice(bytes)?;

        let event = E::from_tagged(&raw.event.type_tag, raw.event.value).map_err(|e| {
            warn!(
                chain_id = raw.chain_id,
                nonce = raw.nonce,
                type_tag = %raw.event.type_tag,
                error = %e,
                "Discarding vote record with unresolvable event payload"
            );
            e
        })?;

        Ok(Self {
            chain_id: raw.chain_id,
            nonce: raw.nonce,
            event,
            votes: raw.votes,
            accepted: raw.accepted,
        })
    }

    /// Encode to the wire form accepted by [`VoteRecord::decode`]
    pub fn encode(&self) -> Result<Vec<u8>, serde_json::Error> {
        let raw = RawVoteRecord {
            chain_id: self.chain_id,
            nonce: self.nonce,
            event: TaggedEvent {
                type_tag: self.event.kind().to_string(),
                value: self.event.to_payload()?,
            },
            votes: self.votes.clone(),
            accepted: self.accepted,
        };
        serde_json::to_vec(&raw)
    }
}

impl VoteRecord<OutboundEvent> {
    /// Wrap an outbound event, taking chain id and nonce from the event itself
    pub fn from_event(event: OutboundEvent) -> Self {
        Self::new(event.chain_id(), event.event_nonce(), event)
    }
}
