//! Community-pool spends to the external chain
//!
//! A governance proposal can pay community-pool funds to an address on an
//! external chain. The debit of the pool and the enqueue of the outbound
//! transfer form one unit: the reduced pool is staged, the transfer is issued,
//! and only then is the pool committed. If issuance fails the staged pool is
//! dropped and the ledger is never written.
//!
//! The ledger and the issuer are collaborators behind traits. The caller is
//! expected to run one spend at a time per pool (the `&mut` borrows enforce
//! that within a process).

use std::collections::BTreeMap;
use std::fmt;

use cosmwasm_std::{Decimal256, Uint256};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::address_codec::{module_address, parse_evm_address, to_checksum_address};
use crate::error::{IssuanceError, SpendError, ValidationError};
use crate::events::{check_denom, check_evm_address, check_not_blank};

/// Module whose account holds the community pool
pub const DISTRIBUTION_MODULE: &str = "distribution";

/// Opaque identifier of an issued outbound transfer
pub type TransferId = u64;

// ============================================================================
// Coins
// ============================================================================

/// Integer coin amount
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Coin {
    pub denom: String,
    pub amount: Uint256,
}

impl Coin {
    pub fn new(amount: impl Into<Uint256>, denom: impl Into<String>) -> Self {
        Self {
            denom: denom.into(),
            amount: amount.into(),
        }
    }
}

impl fmt::Display for Coin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", self.amount, self.denom)
    }
}

/// Decimal coin balances keyed by denom. Zero balances are never stored.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DecCoins(BTreeMap<String, Decimal256>);

impl DecCoins {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from integer coins, summing repeated denoms.
    ///
    /// Returns `None` if a total exceeds the decimal range.
    pub fn from_coins<'a>(coins: impl IntoIterator<Item = &'a Coin>) -> Option<Self> {
        coins.into_iter().try_fold(DecCoins::new(), |acc, coin| {
            let amount = Decimal256::from_atomics(coin.amount, 0).ok()?;
            acc.checked_add(&coin.denom, amount)
        })
    }

    /// Balance of one denom (zero if absent)
    pub fn amount_of(&self, denom: &str) -> Decimal256 {
        self.0.get(denom).copied().unwrap_or_else(Decimal256::zero)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Decimal256)> {
        self.0.iter().map(|(denom, amount)| (denom.as_str(), amount))
    }

    /// Add to one denom, `None` on overflow
    pub fn checked_add(mut self, denom: &str, amount: Decimal256) -> Option<Self> {
        let total = self.amount_of(denom).checked_add(amount).ok()?;
        if !total.is_zero() {
            self.0.insert(denom.to_string(), total);
        }
        Some(self)
    }

    /// Subtract every denom of `other`. Fails on the first denom that would go
    /// negative, leaving `self` untouched.
    pub fn checked_sub(&self, other: &DecCoins) -> Result<DecCoins, SpendError> {
        let mut result = self.clone();
        for (denom, requested) in other.iter() {
            let available = self.amount_of(denom);
            let remaining = available.checked_sub(*requested).map_err(|_| {
                SpendError::InsufficientPoolFunds {
                    denom: denom.to_string(),
                    requested: *requested,
                    available,
                }
            })?;
            if remaining.is_zero() {
                result.0.remove(denom);
            } else {
                result.0.insert(denom.to_string(), remaining);
            }
        }
        Ok(result)
    }
}

impl fmt::Display for DecCoins {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .iter()
            .map(|(denom, amount)| format!("{amount}{denom}"))
            .collect();
        write!(f, "{}", parts.join(","))
    }
}

// ============================================================================
// Collaborators
// ============================================================================

/// Storage of the community-pool balance
pub trait TreasuryLedger {
    fn community_pool(&self) -> DecCoins;
    fn set_community_pool(&mut self, pool: DecCoins);
}

/// One outbound transfer instruction
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutboundTransfer {
    pub chain_id: u32,
    /// Raw native address paying for the transfer
    pub sender: Vec<u8>,
    /// EVM recipient on the external chain
    pub recipient: String,
    pub amount: Coin,
    /// Paid to whoever relays the batch carrying this transfer
    pub bridge_fee: Coin,
}

/// Enqueues outbound transfers for batching
pub trait TransferIssuer {
    fn issue_transfer(&mut self, transfer: &OutboundTransfer) -> Result<TransferId, IssuanceError>;
}

/// A pool balance computed but not yet written.
///
/// Dropping it without [`StagedPool::commit`] leaves the ledger untouched.
#[must_use = "a staged pool is discarded unless committed"]
pub struct StagedPool<'a, L: TreasuryLedger> {
    ledger: &'a mut L,
    pending: DecCoins,
}

impl<'a, L: TreasuryLedger> StagedPool<'a, L> {
    pub fn new(ledger: &'a mut L, pending: DecCoins) -> Self {
        Self { ledger, pending }
    }

    pub fn commit(self) {
        self.ledger.set_community_pool(self.pending);
    }
}

// ============================================================================
// Proposal
// ============================================================================

/// Governance proposal paying community-pool funds to an external address
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommunityPoolSpendProposal {
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub chain_id: u32,
    pub recipient: String,
    pub amount: Coin,
    pub bridge_fee: Coin,
}

impl CommunityPoolSpendProposal {
    pub fn validate(&self) -> Result<(), ValidationError> {
        check_not_blank("title", &self.title)?;
        check_evm_address("recipient", &self.recipient)?;
        check_denom("amount", &self.amount.denom)?;
        if self.amount.amount.is_zero() {
            return Err(ValidationError::InvalidAmount {
                field: "amount",
                amount: self.amount.to_string(),
            });
        }
        if self.bridge_fee.denom != self.amount.denom {
            return Err(ValidationError::DenomMismatch {
                field: "bridge_fee",
                expected: self.amount.denom.clone(),
                got: self.bridge_fee.denom.clone(),
            });
        }
        Ok(())
    }
}

// ============================================================================
// Orchestrator
// ============================================================================

/// Executes community-pool spends on behalf of one treasury module
#[derive(Debug, Clone)]
pub struct CommunityPoolSpender {
    module_name: String,
    sender: [u8; 20],
}

impl Default for CommunityPoolSpender {
    fn default() -> Self {
        Self::new(DISTRIBUTION_MODULE)
    }
}

impl CommunityPoolSpender {
    pub fn new(module_name: impl Into<String>) -> Self {
        let module_name = module_name.into();
        let sender = module_address(&module_name);
        Self {
            module_name,
            sender,
        }
    }

    pub fn module_name(&self) -> &str {
        &self.module_name
    }

    /// Module-derived address that sends every spend
    pub fn sender(&self) -> &[u8; 20] {
        &self.sender
    }

    /// Validate a proposal, then spend it
    pub fn execute<L, I>(
        &self,
        ledger: &mut L,
        issuer: &mut I,
        proposal: &CommunityPoolSpendProposal,
    ) -> Result<TransferId, SpendError>
    where
        L: TreasuryLedger,
        I: TransferIssuer,
    {
        proposal.validate()?;
        self.spend(
            ledger,
            issuer,
            proposal.chain_id,
            &proposal.amount,
            &proposal.bridge_fee,
            &proposal.recipient,
        )
    }

    /// Debit `amount + bridge_fee` from the pool and issue one outbound
    /// transfer, all or nothing.
    pub fn spend<L, I>(
        &self,
        ledger: &mut L,
        issuer: &mut I,
        chain_id: u32,
        amount: &Coin,
        bridge_fee: &Coin,
        recipient: &str,
    ) -> Result<TransferId, SpendError>
    where
        L: TreasuryLedger,
        I: TransferIssuer,
    {
        let pool = ledger.community_pool();

        let total = DecCoins::from_coins([amount, bridge_fee]).ok_or_else(|| {
            SpendError::InsufficientPoolFunds {
                denom: amount.denom.clone(),
                requested: Decimal256::MAX,
                available: pool.amount_of(&amount.denom),
            }
        })?;
        let remaining = pool.checked_sub(&total).map_err(|e| {
            debug!(error = %e, pool = %pool, "Community pool spend rejected");
            e
        })?;

        let staged = StagedPool::new(ledger, remaining);

        let transfer = OutboundTransfer {
            chain_id,
            sender: self.sender.to_vec(),
            recipient: recipient.to_string(),
            amount: amount.clone(),
            bridge_fee: bridge_fee.clone(),
        };
        let transfer_id = issuer.issue_transfer(&transfer)?;

        staged.commit();

        let recipient = parse_evm_address(recipient)
            .map(|raw| to_checksum_address(&raw))
            .unwrap_or_else(|_| recipient.to_string());
        info!(
            transfer_id,
            amount = %amount,
            bridge_fee = %bridge_fee,
            recipient = %recipient,
            chain_id,
            module = %self.module_name,
            "Community pool spend created as unbatched outbound transfer"
        );

        Ok(transfer_id)
    }
}

/// Spend from the community pool using the distribution module as sender
pub fn execute_community_pool_spend<L, I>(
    ledger: &mut L,
    issuer: &mut I,
    chain_id: u32,
    amount: &Coin,
    bridge_fee: &Coin,
    recipient: &str,
) -> Result<TransferId, SpendError>
where
    L: TreasuryLedger,
    I: TransferIssuer,
{
    CommunityPoolSpender::default().spend(ledger, issuer, chain_id, amount, bridge_fee, recipient)
}
