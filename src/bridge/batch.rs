use {
    super::{Cctp, TransferRequest},
    crate::{
        Address,
        AuditEvent,
        AuditKind,
        Chain,
        Submission,
        Token,
        batch_payout_calldata,
        error::{Error, Result},
        to_atomic_units,
    },
    alloy_primitives::{Address as EvmAddress, TxHash, U256},
    rust_decimal::Decimal,
    serde::{Deserialize, Serialize},
    std::collections::BTreeMap,
    tracing::{Level, debug, info, instrument, warn},
};

/// One payee of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoutRecipient {
    pub address: String,
    pub amount: Decimal,
    pub chain: Chain,
    pub token: Token,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Same-chain payout mined.
    Finalized,
    /// Broadcast but not confirmed before the timeout.
    Submitted,
    /// Burn mined, waiting for the attestation and mint.
    PendingAttestation,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PayoutEntry {
    pub recipient: String,
    pub destination_chain: Chain,
    pub amount: Decimal,
    pub token: Token,
    pub status: EntryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tx_hash: Option<TxHash>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BatchStatus {
    Completed,
    Partial,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BatchPayoutResult {
    pub entries: Vec<PayoutEntry>,
    pub succeeded: usize,
    pub failed: usize,
    pub status: BatchStatus,
}

impl BatchPayoutResult {
    fn from_entries(entries: Vec<PayoutEntry>) -> Self {
        let failed = entries
            .iter()
            .filter(|e| e.status == EntryStatus::Failed)
            .count();
        let succeeded = entries.len() - failed;
        let status = if failed == 0 {
            BatchStatus::Completed
        } else {
            BatchStatus::Partial
        };
        Self {
            entries,
            succeeded,
            failed,
            status,
        }
    }
}

/// The error for a batch stopped by `err`, naming the transactions already
/// sent for earlier items. Returns `err` unchanged when nothing was sent.
fn aborted(entries: &[Option<PayoutEntry>], err: Error) -> Error {
    let mut broadcast: Vec<TxHash> = Vec::new();
    for tx_hash in entries.iter().flatten().filter_map(|entry| entry.tx_hash) {
        if !broadcast.contains(&tx_hash) {
            broadcast.push(tx_hash);
        }
    }
    if broadcast.is_empty() {
        return err;
    }
    warn!(?broadcast, error = %err, "batch aborted after broadcasting");
    Error::BatchAborted {
        broadcast,
        source: Box::new(err),
    }
}

/// A validated same-chain leg.
struct Leg {
    index: usize,
    recipient: EvmAddress,
    amount: U256,
}

impl PayoutEntry {
    fn new(item: &PayoutRecipient, status: EntryStatus) -> Self {
        Self {
            recipient: item.address.clone(),
            destination_chain: item.chain,
            amount: item.amount,
            token: item.token,
            status,
            tx_hash: None,
            error: None,
        }
    }

    fn failed(item: &PayoutRecipient, err: &Error) -> Self {
        Self {
            error: Some(err.to_string()),
            ..Self::new(item, EntryStatus::Failed)
        }
    }

    fn with_tx(item: &PayoutRecipient, status: EntryStatus, tx_hash: TxHash) -> Self {
        Self {
            tx_hash: Some(tx_hash),
            ..Self::new(item, status)
        }
    }
}

impl Cctp {
    /// Pays every item from `funding_wallet`.
    ///
    /// Items on the source chain are grouped per token into one
    /// `batchPayout` call each. Other items are burned one at a time. The
    /// result has one entry per item in input order; only infrastructure
    /// faults abort the batch.
    #[instrument(skip(self, items), fields(items = items.len()), level = Level::INFO)]
    pub async fn execute_batch(
        &self,
        funding_wallet: &str,
        items: &[PayoutRecipient],
    ) -> Result<BatchPayoutResult> {
        self.check_signer(funding_wallet)?;

        let mut entries: Vec<Option<PayoutEntry>> = vec![None; items.len()];
        let mut groups: BTreeMap<Token, Vec<Leg>> = BTreeMap::new();
        let mut cross_chain = Vec::new();

        for (index, item) in items.iter().enumerate() {
            if item.chain != self.source_chain {
                cross_chain.push(index);
                continue;
            }
            match self.validate_leg(item) {
                Ok((recipient, amount)) => groups.entry(item.token).or_default().push(Leg {
                    index,
                    recipient,
                    amount,
                }),
                Err(err) => entries[index] = Some(PayoutEntry::failed(item, &err)),
            }
        }

        for (token, legs) in groups {
            match self.pay_same_chain(token, &legs).await {
                Ok(submission) => {
                    let status = match submission {
                        Submission::Confirmed { .. } => EntryStatus::Finalized,
                        Submission::TimedOut { .. } => EntryStatus::Submitted,
                    };
                    for leg in &legs {
                        entries[leg.index] = Some(PayoutEntry::with_tx(
                            &items[leg.index],
                            status,
                            submission.tx_hash(),
                        ));
                    }
                }
                Err(err) if err.is_infrastructure() => return Err(aborted(&entries, err)),
                Err(err) => {
                    warn!(%token, error = %err, "same-chain payout failed");
                    for leg in &legs {
                        entries[leg.index] = Some(PayoutEntry::failed(&items[leg.index], &err));
                    }
                }
            }
        }

        for index in cross_chain {
            let item = &items[index];
            if !item.token.is_bridgeable() {
                let err = Error::UnsupportedToken {
                    token: item.token.to_string(),
                };
                entries[index] = Some(PayoutEntry::failed(item, &err));
                continue;
            }
            let request = TransferRequest {
                amount: item.amount,
                from_wallet: funding_wallet.to_string(),
                destination_address: item.address.clone(),
                destination_chain: item.chain,
                token: item.token,
            };
            let entry = match self.initiate_transfer(&request).await {
                Ok(record) => {
                    let status = match record.block_number {
                        Some(_) => EntryStatus::PendingAttestation,
                        None => EntryStatus::Submitted,
                    };
                    PayoutEntry::with_tx(item, status, record.burn_tx_hash)
                }
                Err(err) if err.is_infrastructure() => return Err(aborted(&entries, err)),
                Err(err) => {
                    warn!(chain = %item.chain, error = %err, "bridge leg failed");
                    PayoutEntry::failed(item, &err)
                }
            };
            entries[index] = Some(entry);
        }

        let entries: Vec<PayoutEntry> = entries.into_iter().flatten().collect();
        let result = BatchPayoutResult::from_entries(entries);
        info!(
            succeeded = result.succeeded,
            failed = result.failed,
            status = ?result.status,
            "batch payout finished"
        );
        Ok(result)
    }

    fn validate_leg(&self, item: &PayoutRecipient) -> Result<(EvmAddress, U256)> {
        let recipient: EvmAddress =
            Address::parse_for_chain(&item.address, item.chain)?.try_into()?;
        let amount = to_atomic_units(item.amount)?;
        item.token.address_on(self.source_chain)?;
        Ok((recipient, amount))
    }

    async fn pay_same_chain(&self, token: Token, legs: &[Leg]) -> Result<Submission> {
        let router = self.settings.payout_router.ok_or(Error::ChainNotConfigured {
            chain: self.source_chain,
        })?;
        let token_address = token.address_on(self.source_chain)?;
        let total = legs.iter().fold(U256::ZERO, |acc, leg| acc + leg.amount);
        debug!(%token, %total, legs = legs.len(), "paying same-chain group");

        self.approve_if_needed(token_address, router, total).await?;
        let calldata = batch_payout_calldata(
            token_address,
            legs.iter().map(|leg| leg.recipient).collect(),
            legs.iter().map(|leg| leg.amount).collect(),
        );
        let submission = self
            .source
            .call_contract(router, calldata, "batchPayout")
            .await?;

        self.audit(AuditEvent {
            kind: AuditKind::Payout,
            source_chain: self.source_chain,
            destination_chain: self.source_chain,
            amount: total,
            tx_hash: submission.tx_hash(),
            status: if submission.is_confirmed() {
                "finalized"
            } else {
                "submitted"
            }
            .to_string(),
        })
        .await;
        Ok(submission)
    }
}
