//! Bridge Attestation: canonical event model for the cross-chain bridge
//!
//! Validators observing the external chain independently build the same
//! event, hash it to the same digest and submit it as a claim. This crate
//! owns that shared identity:
//!
//! - **Address Codec** - EVM and native address syntax, denom syntax, module addresses
//! - **Events** - inbound and outbound event families with admission validation
//! - **Hash** - the canonical per-variant byte layout and its SHA-256 digest
//! - **Vote Records** - tagged event payloads as stored and tallied per `(chain_id, hash)`
//! - **Treasury** - governance community-pool spends issued as outbound transfers
//! - **Config** - env/.env driven admission, treasury and logging settings
//!
//! Tallying, storage, batching and transport are collaborators outside this
//! crate.

pub mod address_codec;
pub mod config;
pub mod error;
pub mod events;
pub mod hash;
pub mod treasury;
pub mod types;
pub mod vote_record;

// Re-export commonly used items at the crate root
pub use address_codec::{
    decode_native_address, encode_native_address, module_address, parse_evm_address,
    to_checksum_address, validate_denom, AddressError,
};
pub use config::Config;
pub use error::{DecodeError, IssuanceError, SpendError, ValidationError};
pub use events::{
    AdmissionPolicy, Attestable, EventFamily, InboundEvent, OutboundEvent, DEFAULT_ACCOUNT_PREFIX,
};
pub use hash::{keccak256, sha256, HashInput};
pub use treasury::{
    execute_community_pool_spend, Coin, CommunityPoolSpendProposal, CommunityPoolSpender,
    DecCoins, OutboundTransfer, TransferId, TransferIssuer, TreasuryLedger,
};
pub use types::{Amount, EventHash};
pub use vote_record::{Claim, InboundVoteRecord, OutboundVoteRecord, VoteRecord, VoteRecordKey};
