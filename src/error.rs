use {
    crate::{BurnStatus, Chain, ContractCallError},
    alloy_primitives::{TxHash, ruint::aliases::U256},
    thiserror::Error,
};

#[derive(Error, Debug)]
pub enum Error {
    #[error("Invalid address {address} for {chain}: expected {expected}")]
    InvalidAddressFormat {
        address: String,
        chain: Chain,
        expected: &'static str,
    },

    #[error("Chain not supported: {chain}")]
    UnsupportedChain { chain: String },

    #[error("Token not supported for bridging: {token}")]
    UnsupportedToken { token: String },

    #[error("Invalid amount {amount}: {reason}")]
    InvalidAmount { amount: String, reason: &'static str },

    #[error("Wallet {requested} is not the configured signer {signer}")]
    SignerMismatch { requested: String, signer: String },

    #[error("Insufficient balance have {0} need {1}")]
    InsufficientBalance(U256, U256),

    #[error("Chain execution failed: {reason}")]
    ChainExecution {
        tx_hash: Option<TxHash>,
        reason: String,
    },

    #[error("Transaction {tx_hash} was not confirmed before the timeout")]
    ConfirmationTimeout { tx_hash: TxHash },

    #[error("Attestation not ready for {burn_tx_hash}")]
    AttestationNotReady { burn_tx_hash: TxHash },

    #[error("Attestation failed: {reason}")]
    AttestationFailed { reason: String },

    #[error("Timeout waiting for attestation after {attempts} attempts")]
    AttestationTimeout { attempts: usize },

    #[error("Attestation service returned HTTP {status}")]
    AttestationService { status: u16 },

    #[error("Chain not configured: {chain}")]
    ChainNotConfigured { chain: Chain },

    #[error("Malformed CCTP message: {0}")]
    MalformedMessage(String),

    #[error("Transfer {burn_tx_hash} cannot move from {from} back to {to}")]
    StatusRegression {
        burn_tx_hash: TxHash,
        from: BurnStatus,
        to: BurnStatus,
    },

    #[error("Transfer {0} is already recorded")]
    DuplicateTransfer(TxHash),

    #[error("RPC transport error: {0}")]
    Transport(String),

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Hex conversion error: {0}")]
    Hex(#[from] alloy_primitives::hex::FromHexError),

    #[error("ABI encoding/decoding error: {0}")]
    Abi(#[from] alloy_sol_types::Error),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Transfer store error: {0}")]
    Store(String),

    #[error("Batch aborted after sending {} transaction(s): {source}", broadcast.len())]
    BatchAborted {
        broadcast: Vec<TxHash>,
        source: Box<Error>,
    },
}

impl From<ContractCallError> for Error {
    fn from(err: ContractCallError) -> Self {
        match err {
            ContractCallError::Reverted { tx_hash, reason } => Self::ChainExecution {
                tx_hash,
                reason: reason.unwrap_or_else(|| "execution reverted".to_string()),
            },
            ContractCallError::Transport(msg) => Self::Transport(msg),
            ContractCallError::Abi(e) => Self::Abi(e),
        }
    }
}

impl Error {
    /// Errors caused by the request itself; nothing was sent on chain.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidAddressFormat { .. }
                | Self::UnsupportedChain { .. }
                | Self::UnsupportedToken { .. }
                | Self::InvalidAmount { .. }
                | Self::SignerMismatch { .. }
        )
    }

    /// The caller should try again later with the same input.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::AttestationNotReady { .. }
                | Self::AttestationTimeout { .. }
                | Self::ConfirmationTimeout { .. }
        )
    }

    /// Faults that abort a whole batch instead of failing a single leg.
    pub fn is_infrastructure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Store(_) | Self::BatchAborted { .. }
        )
    }

    /// Stable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::InvalidAddressFormat { .. } => "invalid_address_format",
            Self::UnsupportedChain { .. } => "unsupported_chain",
            Self::UnsupportedToken { .. } => "unsupported_token",
            Self::InvalidAmount { .. } => "invalid_amount",
            Self::SignerMismatch { .. } => "signer_mismatch",
            Self::InsufficientBalance(..) | Self::ChainExecution { .. } => {
                "chain_execution_error"
            }
            Self::ConfirmationTimeout { .. } => "confirmation_timeout",
            Self::AttestationNotReady { .. } => "attestation_not_ready",
            Self::AttestationFailed { .. } => "attestation_failed",
            Self::AttestationTimeout { .. } => "attestation_timeout",
            Self::AttestationService { .. } | Self::Network(_) => "attestation_service_error",
            Self::ChainNotConfigured { .. } => "chain_not_configured",
            Self::MalformedMessage(_) => "malformed_message",
            Self::StatusRegression { .. } | Self::DuplicateTransfer(_) | Self::Store(_) => {
                "store_error"
            }
            Self::Transport(_) => "transport_error",
            Self::Json(_) | Self::Hex(_) | Self::Abi(_) => "decode_error",
            Self::Config(_) => "config_error",
            Self::BatchAborted { .. } => "batch_aborted",
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
