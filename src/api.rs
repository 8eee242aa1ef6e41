//! JSON bodies returned to HTTP callers.
//!
//! Route handlers live outside this crate; these types fix the wire shape
//! of `POST /cctp/transfer`, `GET /cctp/status/:hash` and
//! `POST /cctp/complete`.

use {
    crate::{
        Attestation,
        BurnRecord,
        Chain,
        Error,
        MintResult,
        TransferStatus,
        TransferStatusReport,
    },
    alloy_primitives::{B256, Bytes, TxHash},
    serde::{Deserialize, Serialize},
};

/// Shown to users while the attestation is outstanding.
pub const ESTIMATED_TRANSFER_TIME: &str = "10-30 minutes";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferResponse {
    pub burn_tx_hash: TxHash,
    pub message_hash: Option<B256>,
    pub destination_chain: Chain,
    pub estimated_time: String,
    pub status: TransferStatus,
}

impl From<&BurnRecord> for TransferResponse {
    fn from(record: &BurnRecord) -> Self {
        Self {
            burn_tx_hash: record.burn_tx_hash,
            message_hash: record.message_hash,
            destination_chain: record.destination_chain,
            estimated_time: ESTIMATED_TRANSFER_TIME.to_string(),
            status: TransferStatus::Pending,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttestationBody {
    pub message: Bytes,
    pub attestation: Bytes,
}

impl From<Attestation> for AttestationBody {
    fn from(attestation: Attestation) -> Self {
        Self {
            message: attestation.message.into(),
            attestation: attestation.attestation.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusResponse {
    pub status: TransferStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub attestation: Option<AttestationBody>,
}

impl From<TransferStatusReport> for StatusResponse {
    fn from(report: TransferStatusReport) -> Self {
        Self {
            status: report.status,
            attestation: report.attestation.map(Into::into),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mint_tx_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl From<MintResult> for CompleteResponse {
    fn from(result: MintResult) -> Self {
        match result {
            MintResult::Minted { tx_hash } => Self {
                success: true,
                mint_tx_hash: Some(tx_hash),
                error: None,
            },
            MintResult::Submitted { tx_hash } => Self {
                success: true,
                mint_tx_hash: Some(tx_hash),
                error: Some("mint submitted, confirmation pending".to_string()),
            },
            // benign race with another relayer
            MintResult::AlreadyCompleted { reason } => Self {
                success: true,
                mint_tx_hash: None,
                error: Some(format!("already processed: {reason}")),
            },
        }
    }
}

impl From<&Error> for CompleteResponse {
    fn from(err: &Error) -> Self {
        Self {
            success: false,
            mint_tx_hash: None,
            error: Some(err.to_string()),
        }
    }
}

/// Body for any failed request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    pub retryable: bool,
}

impl From<&Error> for ErrorResponse {
    fn from(err: &Error) -> Self {
        Self {
            code: err.code().to_string(),
            message: err.to_string(),
            retryable: err.is_recoverable(),
        }
    }
}
