use {
    crate::{
        chain::{CctpChain, Chain},
        error::{Error, Result},
    },
    alloy_primitives::{TxHash, hex},
    backon::{ExponentialBuilder, Retryable},
    reqwest::{Client, StatusCode},
    serde::{Deserialize, Serialize},
    std::{fmt::Display, time::Duration},
    tracing::{Level, debug, info, instrument, trace},
};

/// Circle Iris API environment URLs
///
/// See <https://developers.circle.com/stablecoins/cctp-apis>
pub const IRIS_API: &str = "https://iris-api.circle.com";
pub const IRIS_API_SANDBOX: &str = "https://iris-api-sandbox.circle.com";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AttestationStatus {
    Complete,
    Pending,
    PendingConfirmations,
    Failed,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttestationMessage {
    pub status: AttestationStatus,
    pub attestation: Option<String>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AttestationResponse {
    #[serde(default)]
    pub messages: Vec<AttestationMessage>,
}

/// Signed proof from Circle that a burn is final, ready for
/// `receiveMessage` on the destination chain.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attestation {
    pub burn_tx_hash: TxHash,
    pub message: Vec<u8>,
    pub attestation: Vec<u8>,
}

impl Display for Attestation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "burn {} message {} attestation {}",
            self.burn_tx_hash,
            hex::encode_prefixed(&self.message),
            hex::encode_prefixed(&self.attestation)
        )
    }
}

/// Backoff for [`AttestationClient::wait_for_attestation`].
#[derive(Debug, Clone, Copy)]
pub struct PollPolicy {
    pub min_delay: Duration,
    pub max_delay: Duration,
    pub max_attempts: usize,
}

impl Default for PollPolicy {
    /// Attestations take 10-30 minutes on the standard path, so start at a
    /// minute and cap at ten.
    fn default() -> Self {
        Self {
            min_delay: Duration::from_secs(60),
            max_delay: Duration::from_secs(600),
            max_attempts: 8,
        }
    }
}

/// Client for the Iris attestation API.
#[derive(Debug, Clone)]
pub struct AttestationClient {
    base_url: String,
    client: Client,
}

impl Default for AttestationClient {
    fn default() -> Self {
        Self::for_chain(Chain::ArcTestnet)
    }
}

impl AttestationClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self::with_client(base_url, Client::new())
    }

    /// Production or sandbox Iris depending on the network of `chain`.
    pub fn for_chain(chain: Chain) -> Self {
        Self::new(if chain.sandbox() {
            IRIS_API_SANDBOX
        } else {
            IRIS_API
        })
    }

    pub fn with_client(base_url: impl Into<String>, client: Client) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub(crate) fn http(&self) -> &Client {
        &self.client
    }

    /// `GET {base}/v2/messages/{domain}?transactionHash={hash}`
    pub fn messages_url(&self, source_domain: u32, burn_tx_hash: TxHash) -> String {
        format!(
            "{}/v2/messages/{}?transactionHash={}",
            self.base_url,
            source_domain,
            hex::encode_prefixed(burn_tx_hash)
        )
    }

    /// Fetches the attestation for a burn once.
    ///
    /// `Ok(None)` means "not ready yet": a 404, an empty message list, or a
    /// message that is not `complete`. Transport failures and other non-2xx
    /// responses are errors.
    #[instrument(skip(self), level = Level::DEBUG)]
    pub async fn fetch(
        &self,
        source_domain: u32,
        burn_tx_hash: TxHash,
    ) -> Result<Option<Attestation>> {
        let url = self.messages_url(source_domain, burn_tx_hash);
        trace!(url = ?url, "Getting attestation ...");
        let response = self.client.get(&url).send().await?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!("Attestation not found (404)");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Error::AttestationService {
                status: response.status().as_u16(),
            });
        }

        let body: AttestationResponse = response.json().await?;
        let Some(message) = body.messages.into_iter().next() else {
            debug!("Attestation response has no messages yet");
            return Ok(None);
        };

        match message.status {
            AttestationStatus::Complete => {
                let attestation = message
                    .attestation
                    .ok_or_else(|| Error::AttestationFailed {
                        reason: "Attestation missing".to_string(),
                    })?;
                let payload = message.message.ok_or_else(|| Error::AttestationFailed {
                    reason: "Attestation message missing".to_string(),
                })?;
                debug!("Attestation received successfully");
                Ok(Some(Attestation {
                    burn_tx_hash,
                    message: hex::decode(payload)?,
                    attestation: hex::decode(attestation)?,
                }))
            }
            AttestationStatus::Failed => Err(Error::AttestationFailed {
                reason: format!("attestation service reported failure for {burn_tx_hash}"),
            }),
            status => {
                debug!(?status, "Attestation pending");
                Ok(None)
            }
        }
    }

    /// Polls [`fetch`](Self::fetch) with exponential backoff until the
    /// attestation is complete.
    #[instrument(skip(self, policy), level = Level::INFO)]
    pub async fn wait_for_attestation(
        &self,
        source_domain: u32,
        burn_tx_hash: TxHash,
        policy: PollPolicy,
    ) -> Result<Attestation> {
        info!("Polling for attestation ...");
        let backoff = ExponentialBuilder::default()
            .with_min_delay(policy.min_delay)
            .with_max_delay(policy.max_delay)
            .with_max_times(policy.max_attempts);

        let fetch = || async {
            self.fetch(source_domain, burn_tx_hash)
                .await?
                .ok_or(Error::AttestationNotReady { burn_tx_hash })
        };

        fetch
            .retry(backoff)
            .when(|err| matches!(err, Error::AttestationNotReady { .. }))
            .notify(|_, dur| debug!(?dur, "Attestation not ready, waiting before retrying"))
            .await
            .map_err(|err| match err {
                Error::AttestationNotReady { .. } => Error::AttestationTimeout {
                    attempts: policy.max_attempts + 1,
                },
                err => err,
            })
    }
}
