//! Transfer records and the audit trail.

use {
    crate::{
        chain::Chain,
        error::{Error, Result},
    },
    alloy_primitives::{B256, FixedBytes, TxHash, U256},
    async_trait::async_trait,
    serde::{Deserialize, Serialize},
    std::{
        collections::HashMap,
        fmt::Display,
        sync::{PoisonError, RwLock},
    },
    tracing::debug,
};

/// Lifecycle of a burn. Variants are ordered; a record only moves forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BurnStatus {
    PendingAttestation,
    Attested,
    Completed,
}

impl Display for BurnStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            BurnStatus::PendingAttestation => "pending_attestation",
            BurnStatus::Attested => "attested",
            BurnStatus::Completed => "completed",
        })
    }
}

/// A submitted `depositForBurn`, keyed by its transaction hash.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BurnRecord {
    pub burn_tx_hash: TxHash,
    pub source_chain: Chain,
    pub source_domain: u32,
    pub destination_chain: Chain,
    pub destination_domain: u32,
    pub mint_recipient: FixedBytes<32>,
    /// Atomic units
    pub amount: U256,
    /// Block of the mined burn. `None` when the confirmation wait timed out.
    pub block_number: Option<u64>,
    /// keccak256 of the `MessageSent` payload, when the receipt carried it.
    pub message_hash: Option<B256>,
    pub status: BurnStatus,
}

/// Persistence for burn records.
#[async_trait]
pub trait TransferStore: Send + Sync {
    /// Stores a new record. Fails with [`Error::DuplicateTransfer`] if the
    /// hash is already known.
    async fn insert(&self, record: BurnRecord) -> Result<()>;

    async fn get(&self, burn_tx_hash: TxHash) -> Result<Option<BurnRecord>>;

    /// Moves a record forward. Advancing to the current status is a no-op,
    /// moving backwards is [`Error::StatusRegression`].
    async fn advance(&self, burn_tx_hash: TxHash, status: BurnStatus) -> Result<BurnRecord>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditKind {
    Burn,
    Mint,
    Payout,
}

/// One line of the audit trail.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEvent {
    pub kind: AuditKind,
    pub source_chain: Chain,
    pub destination_chain: Chain,
    pub amount: U256,
    pub tx_hash: TxHash,
    pub status: String,
}

#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, event: AuditEvent) -> Result<()>;
}

fn poisoned<T>(_: PoisonError<T>) -> Error {
    Error::Store("lock poisoned".to_string())
}

/// Process-local [`TransferStore`] and [`AuditLog`].
#[derive(Debug, Default)]
pub struct InMemoryStore {
    records: RwLock<HashMap<TxHash, BurnRecord>>,
    events: RwLock<Vec<AuditEvent>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the audit trail in insertion order.
    pub fn events(&self) -> Result<Vec<AuditEvent>> {
        Ok(self.events.read().map_err(poisoned)?.clone())
    }
}

#[async_trait]
impl TransferStore for InMemoryStore {
    async fn insert(&self, record: BurnRecord) -> Result<()> {
        let mut records = self.records.write().map_err(poisoned)?;
        if records.contains_key(&record.burn_tx_hash) {
            return Err(Error::DuplicateTransfer(record.burn_tx_hash));
        }
        debug!(burn_tx_hash = %record.burn_tx_hash, status = %record.status, "storing transfer");
        records.insert(record.burn_tx_hash, record);
        Ok(())
    }

    async fn get(&self, burn_tx_hash: TxHash) -> Result<Option<BurnRecord>> {
        Ok(self
            .records
            .read()
            .map_err(poisoned)?
            .get(&burn_tx_hash)
            .cloned())
    }

    async fn advance(&self, burn_tx_hash: TxHash, status: BurnStatus) -> Result<BurnRecord> {
        let mut records = self.records.write().map_err(poisoned)?;
        let record = records
            .get_mut(&burn_tx_hash)
            .ok_or_else(|| Error::Store(format!("unknown transfer {burn_tx_hash}")))?;
        if status < record.status {
            return Err(Error::StatusRegression {
                burn_tx_hash,
                from: record.status,
                to: status,
            });
        }
        if status != record.status {
            debug!(%burn_tx_hash, from = %record.status, to = %status, "advancing transfer");
            record.status = status;
        }
        Ok(record.clone())
    }
}

#[async_trait]
impl AuditLog for InMemoryStore {
    async fn record(&self, event: AuditEvent) -> Result<()> {
        self.events.write().map_err(poisoned)?.push(event);
        Ok(())
    }
}
