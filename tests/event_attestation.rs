//! Integration tests for event admission and canonical hashing
//!
//! Run with: cargo test --test event_attestation

use bridge_attestation::events::inbound::{DepositEvent, TokenDeployedEvent as InboundTokenDeployed};
use bridge_attestation::events::outbound::{
    BatchExecutedEvent, SendToNativeEvent, TokenDeployedEvent,
};
use bridge_attestation::{
    sha256, AdmissionPolicy, Amount, Attestable, DecodeError, InboundEvent, OutboundEvent,
    OutboundVoteRecord, ValidationError, VoteRecord,
};

mod fixtures {
    use super::*;

    pub const TOKEN: &str = "0xdead000000000000000000000000000000000000";
    pub const SENDER: &str = "0xf39Fd6e51aad88F6F4ce6aB8827279cffFb92266";
    pub const RECEIVER: &str = "terra1x46rqay4d3cssq8gxxvqz8xt6nwlz4td20k38v";

    pub fn send_to_native(chain_id: u32, amount: Amount) -> SendToNativeEvent {
        SendToNativeEvent {
            chain_id,
            event_nonce: 7,
            token_contract: TOKEN.to_string(),
            amount,
            external_sender: SENDER.to_string(),
            native_receiver: RECEIVER.to_string(),
            evm_height: 1_000,
        }
    }

    pub fn batch(event_nonce: u64) -> BatchExecutedEvent {
        BatchExecutedEvent {
            chain_id: 1,
            event_nonce,
            token_contract: TOKEN.to_string(),
            batch_nonce: 3,
            evm_height: 500,
        }
    }
}

use fixtures::*;

#[test]
fn test_independent_observers_agree_on_hash() {
    // Two validators build the event from their own observations
    let observed_a = OutboundEvent::from(send_to_native(1, Amount::from(1_000u64)));
    let observed_b = OutboundEvent::from(send_to_native(1, "1000".parse().unwrap()));
    assert_eq!(observed_a.hash(), observed_b.hash());
}

#[test]
fn test_every_hashed_field_changes_digest() {
    let base = send_to_native(1, Amount::from(1_000u64));
    let base_hash = base.hash();

    let mut changed = base.clone();
    changed.event_nonce += 1;
    assert_ne!(changed.hash(), base_hash);

    let mut changed = base.clone();
    changed.amount = Amount::from(1_001u64);
    assert_ne!(changed.hash(), base_hash);

    let mut changed = base.clone();
    changed.evm_height += 1;
    assert_ne!(changed.hash(), base_hash);

    let mut changed = base.clone();
    changed.external_sender = TOKEN.to_string();
    assert_ne!(changed.hash(), base_hash);
}

#[test]
fn test_send_to_native_hash_layout() {
    let event = send_to_native(1, Amount::from(256u64));
    let (receiver, _) = bridge_attestation::decode_native_address(RECEIVER).unwrap();

    let mut expected = Vec::new();
    expected.extend_from_slice(&7u64.to_be_bytes());
    expected.extend_from_slice(&hex::decode(&TOKEN[2..]).unwrap());
    expected.extend_from_slice(&[0x01, 0x00]);
    expected.extend_from_slice(&hex::decode(&SENDER[2..]).unwrap());
    expected.extend_from_slice(&receiver);
    expected.extend_from_slice(&1_000u64.to_be_bytes());

    assert_eq!(event.hash().0, sha256(&expected));
}

#[test]
fn test_chain_scoping() {
    let on_eth = VoteRecord::from_event(OutboundEvent::from(send_to_native(1, Amount::from(5u64))));
    let on_bsc = VoteRecord::from_event(OutboundEvent::from(send_to_native(56, Amount::from(5u64))));

    // Same content, same digest, separate tally buckets
    assert_eq!(on_eth.hash(), on_bsc.hash());
    assert_ne!(on_eth.key(), on_bsc.key());
}

#[test]
fn test_nonce_floor() {
    assert!(matches!(
        batch(0).validate(),
        Err(ValidationError::ZeroNonce { field: "event_nonce" })
    ));
    assert!(batch(1).validate().is_ok());
}

#[test]
fn test_amount_must_be_positive() {
    for amount in [Amount::ZERO, Amount::from(-1i64)] {
        let err = send_to_native(1, amount).validate().unwrap_err();
        assert_eq!(err.field(), "amount");
    }

    let deposit = DepositEvent {
        token_contract: TOKEN.to_string(),
        amount: Amount::ZERO,
        external_sender: SENDER.to_string(),
        native_receiver: RECEIVER.to_string(),
    };
    assert_eq!(deposit.validate().unwrap_err().field(), "amount");
}

#[test]
fn test_address_syntax() {
    let mut event = send_to_native(1, Amount::from(5u64));
    event.token_contract = "dead000000000000000000000000000000000000".to_string();
    assert_eq!(event.validate().unwrap_err().field(), "token_contract");

    let mut event = send_to_native(1, Amount::from(5u64));
    event.native_receiver = SENDER.to_string();
    assert_eq!(event.validate().unwrap_err().field(), "native_receiver");

    // Invalid events still hash deterministically
    assert_eq!(event.hash(), event.clone().hash());
}

#[test]
fn test_receiver_prefix_policy() {
    let event = send_to_native(1, Amount::from(5u64));
    assert!(event.validate_with(&AdmissionPolicy::with_account_prefix("terra")).is_ok());

    let err = event
        .validate_with(&AdmissionPolicy::with_account_prefix("cosmos"))
        .unwrap_err();
    assert_eq!(err.field(), "native_receiver");
}

#[test]
fn test_foreign_prefix_receiver_is_rejected() {
    // Same payload under another prefix hashes the same; admission tells them apart
    let home = send_to_native(1, Amount::from(5u64));
    let (raw, _) = bridge_attestation::decode_native_address(RECEIVER).unwrap();
    let mut foreign = home.clone();
    foreign.native_receiver = bridge_attestation::encode_native_address(&raw, "cosmos").unwrap();

    assert_eq!(home.hash(), foreign.hash());
    assert!(home.validate().is_ok());
    assert_eq!(foreign.validate().unwrap_err().field(), "native_receiver");
}

#[test]
fn test_blank_token_name() {
    let outbound = TokenDeployedEvent {
        chain_id: 1,
        event_nonce: 2,
        native_denom: "uluna".to_string(),
        token_contract: TOKEN.to_string(),
        name: "   ".to_string(),
        symbol: "LUNA".to_string(),
        decimals: 6,
        evm_height: 10,
    };
    assert_eq!(
        outbound.validate(),
        Err(ValidationError::Blank { field: "name" })
    );

    let inbound = InboundEvent::from(InboundTokenDeployed {
        token_contract: TOKEN.to_string(),
        native_denom: "uluna".to_string(),
        name: "Luna".to_string(),
        symbol: String::new(),
        decimals: 6,
    });
    assert_eq!(
        inbound.validate(),
        Err(ValidationError::Blank { field: "symbol" })
    );
}

#[test]
fn test_unknown_variant_is_discarded() {
    let json = serde_json::json!({
        "chain_id": 1,
        "nonce": 1,
        "event": { "@type": "valset_updated_v2", "value": {} },
        "votes": [],
        "accepted": false
    });
    let err = OutboundVoteRecord::decode(json.to_string().as_bytes()).unwrap_err();
    assert!(matches!(err, DecodeError::UnknownEventType { .. }));
}

#[test]
fn test_wire_record_decodes_and_validates() {
    let json = serde_json::json!({
        "chain_id": 1,
        "nonce": 7,
        "event": {
            "@type": "send_to_native",
            "value": {
                "chain_id": 1,
                "event_nonce": 7,
                "token_contract": TOKEN,
                "amount": "1000",
                "external_sender": SENDER,
                "native_receiver": RECEIVER,
                "evm_height": 1000
            }
        },
        "votes": ["terravaloper1abc"],
        "accepted": false
    });

    let record = OutboundVoteRecord::decode(json.to_string().as_bytes()).unwrap();
    assert_eq!(record.event_type(), "send_to_native");
    assert_eq!(record.votes.len(), 1);
    assert!(record.validate().is_ok());
    assert_eq!(
        record.hash(),
        OutboundEvent::from(send_to_native(1, Amount::from(1_000u64))).hash()
    );
}

#[test]
fn test_negative_wire_amount_is_rejected() {
    let json = serde_json::json!({
        "chain_id": 1,
        "nonce": 7,
        "event": {
            "@type": "send_to_native",
            "value": {
                "chain_id": 1,
                "event_nonce": 7,
                "token_contract": TOKEN,
                "amount": "-5",
                "external_sender": SENDER,
                "native_receiver": RECEIVER,
                "evm_height": 1000
            }
        }
    });

    let record = OutboundVoteRecord::decode(json.to_string().as_bytes()).unwrap();
    assert_eq!(record.validate().unwrap_err().field(), "amount");
}
