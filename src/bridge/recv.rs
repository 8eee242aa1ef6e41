use {
    super::Cctp,
    crate::{
        AuditEvent,
        AuditKind,
        BurnStatus,
        Chain,
        ContractCallError,
        MessageTransmitterV2,
        NONCE_ALREADY_USED,
        Submission,
        error::{Error, Result},
        is_already_processed,
        message_nonce,
        receive_message_calldata,
        used_nonces_calldata,
    },
    alloy_primitives::{TxHash, U256},
    alloy_sol_types::SolCall,
    serde::Serialize,
    std::fmt::Display,
    tracing::{Level, info, instrument, warn},
};

/// Outcome of [`Cctp::complete_transfer`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "result", rename_all = "snake_case")]
pub enum MintResult {
    /// `receiveMessage` mined on the destination chain.
    Minted { tx_hash: TxHash },
    /// Broadcast but not mined before the confirmation timeout. Query the
    /// status again later.
    Submitted { tx_hash: TxHash },
    /// Another submitter already delivered this message. Funds went to the
    /// recipient encoded in the burn either way.
    AlreadyCompleted { reason: String },
}

impl MintResult {
    pub fn tx_hash(&self) -> Option<TxHash> {
        match self {
            MintResult::Minted { tx_hash } | MintResult::Submitted { tx_hash } => Some(*tx_hash),
            MintResult::AlreadyCompleted { .. } => None,
        }
    }
}

impl Display for MintResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MintResult::Minted { tx_hash } => write!(f, "Minted: {tx_hash}"),
            MintResult::Submitted { tx_hash } => write!(f, "Submitted (unconfirmed): {tx_hash}"),
            MintResult::AlreadyCompleted { reason } => write!(f, "Already completed: {reason}"),
        }
    }
}

impl Cctp {
    /// Delivers the attested message for `burn_tx_hash` to `destination`.
    ///
    /// `receiveMessage` is permissionless: the destination signer only pays
    /// gas, the minted funds go to the recipient inside the message.
    #[instrument(skip(self), level = Level::INFO)]
    pub async fn complete_transfer(
        &self,
        burn_tx_hash: TxHash,
        destination: Chain,
    ) -> Result<MintResult> {
        let attestation = self
            .get_attestation(burn_tx_hash)
            .await?
            .ok_or(Error::AttestationNotReady { burn_tx_hash })?;
        let target = self.destination(destination)?;

        let nonce = message_nonce(&attestation.message)?;
        let used = target
            .caller
            .view(target.message_transmitter, used_nonces_calldata(nonce))
            .await?;
        if !MessageTransmitterV2::usedNoncesCall::abi_decode_returns(&used)?.is_zero() {
            info!(%nonce, "message already received on {destination}");
            self.mark(burn_tx_hash, BurnStatus::Completed).await?;
            return Ok(MintResult::AlreadyCompleted {
                reason: NONCE_ALREADY_USED.to_string(),
            });
        }

        info!("receiving on chain {destination}");
        let submission = target
            .caller
            .call_contract(
                target.message_transmitter,
                receive_message_calldata(&attestation.message, &attestation.attestation),
                "receiveMessage",
            )
            .await;

        match submission {
            Ok(Submission::Confirmed { tx_hash, .. }) => {
                self.mark(burn_tx_hash, BurnStatus::Completed).await?;
                self.audit_mint(burn_tx_hash, destination, tx_hash, "completed")
                    .await?;
                info!(mint_tx_hash = %tx_hash, "transfer completed");
                Ok(MintResult::Minted { tx_hash })
            }
            Ok(Submission::TimedOut { tx_hash }) => {
                self.mark(burn_tx_hash, BurnStatus::Attested).await?;
                self.audit_mint(burn_tx_hash, destination, tx_hash, "submitted")
                    .await?;
                Ok(MintResult::Submitted { tx_hash })
            }
            Err(ContractCallError::Reverted {
                reason: Some(reason),
                ..
            }) if is_already_processed(&reason) => {
                warn!(%reason, "message already received by another submitter");
                self.mark(burn_tx_hash, BurnStatus::Completed).await?;
                Ok(MintResult::AlreadyCompleted { reason })
            }
            Err(err) => Err(err.into()),
        }
    }

    async fn audit_mint(
        &self,
        burn_tx_hash: TxHash,
        destination: Chain,
        mint_tx_hash: TxHash,
        status: &str,
    ) -> Result<()> {
        let amount = self
            .store
            .get(burn_tx_hash)
            .await?
            .map(|record| record.amount)
            .unwrap_or(U256::ZERO);
        self.audit(AuditEvent {
            kind: AuditKind::Mint,
            source_chain: self.source_chain,
            destination_chain: destination,
            amount,
            tx_hash: mint_tx_hash,
            status: status.to_string(),
        })
        .await;
        Ok(())
    }
}
