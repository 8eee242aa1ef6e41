//! Contract call submission.
//!
//! Every chain read and write in this crate goes through [`ContractCaller`].
//! [`ProviderCaller`] is the alloy implementation; it owns the signing wallet
//! and serializes writes so two transfers never race for the same nonce.

use {
    alloy_json_rpc::RpcError,
    alloy_network::{Ethereum, ReceiptResponse as _, TransactionBuilder},
    alloy_primitives::{Address, Bytes, Log, TxHash},
    alloy_provider::{PendingTransactionBuilder, PendingTransactionError, Provider, WalletProvider},
    alloy_rpc_types::TransactionRequest,
    alloy_transport::TransportErrorKind,
    async_trait::async_trait,
    std::time::Duration,
    tokio::sync::Mutex,
    tracing::{Level, debug, info, instrument, warn},
};

/// Default time to wait for a submitted transaction to be mined.
pub const DEFAULT_CONFIRMATION_TIMEOUT: Duration = Duration::from_secs(90);

/// Outcome of a write that reached the chain.
///
/// Together with `Err(ContractCallError)` this is the tri-state result of a
/// chain write: confirmed, submitted but not yet mined, or failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Submission {
    Confirmed {
        tx_hash: TxHash,
        block_number: Option<u64>,
        logs: Vec<Log>,
    },
    /// Broadcast, but no receipt before the confirmation timeout. The
    /// transaction may still be mined.
    TimedOut { tx_hash: TxHash },
}

impl Submission {
    pub fn tx_hash(&self) -> TxHash {
        match self {
            Submission::Confirmed { tx_hash, .. } | Submission::TimedOut { tx_hash } => *tx_hash,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self, Submission::Confirmed { .. })
    }
}

/// Errors that can occur when submitting a contract call.
#[derive(Debug, thiserror::Error)]
pub enum ContractCallError {
    /// The chain rejected the call, either during gas estimation (no hash
    /// yet) or in the mined receipt.
    #[error("transaction reverted: {}", reason.as_deref().unwrap_or("no reason"))]
    Reverted {
        tx_hash: Option<TxHash>,
        reason: Option<String>,
    },
    #[error("transport error: {0}")]
    Transport(String),
    #[error("ABI decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),
}

impl From<RpcError<TransportErrorKind>> for ContractCallError {
    fn from(err: RpcError<TransportErrorKind>) -> Self {
        match err.as_error_resp() {
            Some(payload) => {
                let reason = payload
                    .as_revert_data()
                    .and_then(|data| alloy_sol_types::decode_revert_reason(&data))
                    .unwrap_or_else(|| payload.message.to_string());
                ContractCallError::Reverted {
                    tx_hash: None,
                    reason: Some(reason),
                }
            }
            None => ContractCallError::Transport(err.to_string()),
        }
    }
}

/// Abstraction for reading from and submitting calls to one EVM chain.
///
/// Implementations handle signing and submission. Consumers build calldata
/// and pass it in without knowing how the transaction is signed.
#[async_trait]
pub trait ContractCaller: Send + Sync {
    /// Address of the signing wallet.
    fn address(&self) -> Address;

    /// Executes a read-only `eth_call` and returns the raw return data.
    async fn view(&self, contract: Address, calldata: Bytes) -> Result<Bytes, ContractCallError>;

    /// Submits a contract call and waits (bounded) for its receipt.
    ///
    /// - `contract` -- target contract address
    /// - `calldata` -- ABI-encoded function call
    /// - `note` -- human-readable operation description used for logging
    async fn call_contract(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<Submission, ContractCallError>;
}

/// Receipt data of a mined, successful write.
#[derive(Debug, Clone, Default)]
struct Confirmation {
    block_number: Option<u64>,
    logs: Vec<Log>,
}

/// Serializes the writes of one wallet and bounds each receipt wait.
///
/// The lock is held from broadcast until the receipt arrives or the timeout
/// fires.
#[derive(Debug)]
struct WriteGate {
    lock: Mutex<()>,
    confirmation_timeout: Duration,
}

impl WriteGate {
    fn new(confirmation_timeout: Duration) -> Self {
        Self {
            lock: Mutex::new(()),
            confirmation_timeout,
        }
    }

    async fn submit<T, S, W, WF>(
        &self,
        note: &str,
        send: S,
        wait: W,
    ) -> Result<Submission, ContractCallError>
    where
        S: Future<Output = Result<(TxHash, T), ContractCallError>>,
        W: FnOnce(T) -> WF,
        WF: Future<Output = Result<Confirmation, ContractCallError>>,
    {
        let _guard = self.lock.lock().await;
        let (tx_hash, pending) = send.await?;
        info!(%tx_hash, note, "submitted transaction");

        match tokio::time::timeout(self.confirmation_timeout, wait(pending)).await {
            Ok(Ok(Confirmation { block_number, logs })) => {
                debug!(%tx_hash, block = ?block_number, "transaction confirmed");
                Ok(Submission::Confirmed {
                    tx_hash,
                    block_number,
                    logs,
                })
            }
            Ok(Err(err)) => Err(err),
            Err(_) => {
                warn!(
                    %tx_hash,
                    timeout = ?self.confirmation_timeout,
                    note,
                    "transaction not confirmed before timeout"
                );
                Ok(Submission::TimedOut { tx_hash })
            }
        }
    }
}

/// [`ContractCaller`] backed by an alloy provider with a wallet filler.
pub struct ProviderCaller<P> {
    provider: P,
    required_confirmations: u64,
    gate: WriteGate,
}

impl<P> ProviderCaller<P>
where
    P: Provider<Ethereum> + WalletProvider<Ethereum> + Clone,
{
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            required_confirmations: 1,
            gate: WriteGate::new(DEFAULT_CONFIRMATION_TIMEOUT),
        }
    }

    pub fn with_required_confirmations(mut self, confirmations: u64) -> Self {
        self.required_confirmations = confirmations.max(1);
        self
    }

    pub fn with_confirmation_timeout(mut self, timeout: Duration) -> Self {
        self.gate.confirmation_timeout = timeout;
        self
    }
}

#[async_trait]
impl<P> ContractCaller for ProviderCaller<P>
where
    P: Provider<Ethereum> + WalletProvider<Ethereum> + Clone + Send + Sync,
{
    fn address(&self) -> Address {
        self.provider.default_signer_address()
    }

    async fn view(&self, contract: Address, calldata: Bytes) -> Result<Bytes, ContractCallError> {
        let tx = TransactionRequest::default()
            .with_to(contract)
            .with_input(calldata);
        Ok(self.provider.call(tx).await?)
    }

    #[instrument(skip(self, calldata), fields(signer = %self.address()), level = Level::DEBUG)]
    async fn call_contract(
        &self,
        contract: Address,
        calldata: Bytes,
        note: &str,
    ) -> Result<Submission, ContractCallError> {
        let tx = TransactionRequest::default()
            .with_from(self.address())
            .with_to(contract)
            .with_input(calldata);
        let required_confirmations = self.required_confirmations;

        let send = async {
            let pending = self.provider.send_transaction(tx).await?;
            Ok::<_, ContractCallError>((*pending.tx_hash(), pending))
        };
        let wait = move |pending: PendingTransactionBuilder<Ethereum>| async move {
            let tx_hash = *pending.tx_hash();
            let receipt = pending
                .with_required_confirmations(required_confirmations)
                .get_receipt()
                .await
                .map_err(|err| match err {
                    PendingTransactionError::TransportError(err) => err.into(),
                    err => ContractCallError::Transport(err.to_string()),
                })?;
            if !receipt.status() {
                return Err(ContractCallError::Reverted {
                    tx_hash: Some(tx_hash),
                    reason: None,
                });
            }
            Ok::<_, ContractCallError>(Confirmation {
                block_number: receipt.block_number,
                logs: receipt
                    .inner
                    .logs()
                    .iter()
                    .map(|log| log.inner.clone())
                    .collect(),
            })
        };
        self.gate.submit(note, send, wait).await
    }
}
