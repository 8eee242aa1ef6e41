use {
    crate::{
        Address,
        Attestation,
        AttestationClient,
        AuditEvent,
        AuditLog,
        BurnStatus,
        CctpChain,
        Chain,
        ChainFamily,
        ContractCaller,
        DEFAULT_MAX_FEE,
        FAST_FINALITY_THRESHOLD,
        InMemoryStore,
        Token,
        TransferStore,
        error::{Error, Result},
    },
    alloy_primitives::{Address as EvmAddress, TxHash, U256},
    rust_decimal::Decimal,
    serde::{Deserialize, Serialize},
    std::{
        collections::HashMap,
        fmt::{Debug, Display},
        sync::Arc,
    },
    tracing::{Level, debug, instrument, warn},
};

mod batch;
mod burn;
mod fee;
mod recv;

pub use {batch::*, fee::*, recv::*};

/// A request to move tokens from the source chain to another CCTP domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferRequest {
    pub amount: Decimal,
    pub from_wallet: String,
    #[serde(alias = "to_address")]
    pub destination_address: String,
    pub destination_chain: Chain,
    pub token: Token,
}

/// Knobs for the burn and payout calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BridgeSettings {
    /// Upper bound, in atomic units, on the fee the burn may pay for fast
    /// finality.
    pub max_fee: U256,
    pub min_finality_threshold: u32,
    /// Settlement contract for same-chain batch payouts.
    pub payout_router: Option<EvmAddress>,
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            max_fee: U256::from(DEFAULT_MAX_FEE),
            min_finality_threshold: FAST_FINALITY_THRESHOLD,
            payout_router: None,
        }
    }
}

/// Signer and `MessageTransmitterV2` of a chain that can receive mints.
#[derive(Clone)]
pub struct Destination {
    pub caller: Arc<dyn ContractCaller>,
    pub message_transmitter: EvmAddress,
}

impl Debug for Destination {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Destination[{} via {}]",
            self.message_transmitter,
            self.caller.address()
        )
    }
}

/// Status reported to API callers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransferStatus {
    Pending,
    Attested,
    Completed,
}

impl Display for TransferStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            TransferStatus::Pending => "pending",
            TransferStatus::Attested => "attested",
            TransferStatus::Completed => "completed",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferStatusReport {
    pub status: TransferStatus,
    pub attestation: Option<Attestation>,
}

/// CCTP V2 client rooted at one source chain.
///
/// Burns are signed by the source [`ContractCaller`]; mints by the caller of
/// the destination chain. Records go to the [`TransferStore`] and every
/// burn, mint and payout is appended to the [`AuditLog`].
#[derive(Clone)]
pub struct Cctp {
    source_chain: Chain,
    source: Arc<dyn ContractCaller>,
    destinations: HashMap<Chain, Destination>,
    attestation: AttestationClient,
    store: Arc<dyn TransferStore>,
    audit: Arc<dyn AuditLog>,
    settings: BridgeSettings,
}

impl Debug for Cctp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let src_domain = self.source_chain.cctp_domain_id().unwrap_or(u32::MAX);
        let mut destinations: Vec<_> = self.destinations.keys().collect();
        destinations.sort();
        write!(
            f,
            "CCTP[{}({})->{:?}]",
            self.source_chain, src_domain, destinations
        )
    }
}

impl Cctp {
    /// Client burning on ARC testnet with an in-memory store.
    pub fn new(source: Arc<dyn ContractCaller>, attestation: AttestationClient) -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self {
            source_chain: Chain::ArcTestnet,
            source,
            destinations: HashMap::new(),
            attestation,
            store: store.clone(),
            audit: store,
            settings: BridgeSettings::default(),
        }
    }

    /// Registers the signer used to mint on `chain`, with the chain's
    /// canonical `MessageTransmitterV2`.
    pub fn with_destination(self, chain: Chain, caller: Arc<dyn ContractCaller>) -> Result<Self> {
        let message_transmitter = chain.message_transmitter_address()?;
        let message_transmitter = match chain.family() {
            ChainFamily::Evm => EvmAddress::try_from(message_transmitter)?,
            ChainFamily::Solana => return Err(Error::ChainNotConfigured { chain }),
        };
        Ok(self.with_destination_transmitter(chain, caller, message_transmitter))
    }

    /// Like [`with_destination`](Self::with_destination) with an explicit
    /// transmitter contract.
    pub fn with_destination_transmitter(
        mut self,
        chain: Chain,
        caller: Arc<dyn ContractCaller>,
        message_transmitter: EvmAddress,
    ) -> Self {
        self.destinations.insert(
            chain,
            Destination {
                caller,
                message_transmitter,
            },
        );
        self
    }

    pub fn with_store(mut self, store: Arc<dyn TransferStore>, audit: Arc<dyn AuditLog>) -> Self {
        self.store = store;
        self.audit = audit;
        self
    }

    pub fn with_settings(mut self, settings: BridgeSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn source_chain(&self) -> Chain {
        self.source_chain
    }

    /// Address of the wallet that signs burns and payouts.
    pub fn signer(&self) -> EvmAddress {
        self.source.address()
    }

    pub fn settings(&self) -> &BridgeSettings {
        &self.settings
    }

    pub fn attestation_client(&self) -> &AttestationClient {
        &self.attestation
    }

    pub fn destination(&self, chain: Chain) -> Result<&Destination> {
        self.destinations
            .get(&chain)
            .ok_or(Error::ChainNotConfigured { chain })
    }

    /// Fetches the attestation for a burn from this client's source domain.
    /// Read only; `None` means not ready yet.
    pub async fn get_attestation(&self, burn_tx_hash: TxHash) -> Result<Option<Attestation>> {
        let source_domain = self.source_chain.cctp_domain_id()?;
        self.attestation.fetch(source_domain, burn_tx_hash).await
    }

    /// `completed` only once this client minted the transfer, otherwise
    /// `attested` or `pending` depending on the attestation service.
    #[instrument(skip(self), level = Level::DEBUG)]
    pub async fn get_transfer_status(&self, burn_tx_hash: TxHash) -> Result<TransferStatusReport> {
        let record = self.store.get(burn_tx_hash).await?;
        if record
            .as_ref()
            .is_some_and(|r| r.status == BurnStatus::Completed)
        {
            return Ok(TransferStatusReport {
                status: TransferStatus::Completed,
                attestation: None,
            });
        }

        let Some(attestation) = self.get_attestation(burn_tx_hash).await? else {
            return Ok(TransferStatusReport {
                status: TransferStatus::Pending,
                attestation: None,
            });
        };
        if record.is_some() {
            self.store
                .advance(burn_tx_hash, BurnStatus::Attested)
                .await?;
        }
        Ok(TransferStatusReport {
            status: TransferStatus::Attested,
            attestation: Some(attestation),
        })
    }

    /// Fails unless `wallet` is the configured source signer.
    pub(crate) fn check_signer(&self, wallet: &str) -> Result<()> {
        let requested: EvmAddress = Address::parse_for_chain(wallet, self.source_chain)?.try_into()?;
        let signer = self.signer();
        if requested != signer {
            return Err(Error::SignerMismatch {
                requested: wallet.to_string(),
                signer: signer.to_string(),
            });
        }
        Ok(())
    }

    /// Advances a stored record. Transfers initiated elsewhere have no
    /// record and are skipped.
    pub(crate) async fn mark(&self, burn_tx_hash: TxHash, status: BurnStatus) -> Result<()> {
        if self.store.get(burn_tx_hash).await?.is_none() {
            debug!(%burn_tx_hash, "no stored record for transfer");
            return Ok(());
        }
        self.store.advance(burn_tx_hash, status).await?;
        Ok(())
    }

    /// Audit failures are logged, never propagated.
    pub(crate) async fn audit(&self, event: AuditEvent) {
        if let Err(err) = self.audit.record(event).await {
            warn!(error = %err, "failed to write audit event");
        }
    }
}
