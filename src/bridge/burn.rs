use {
    super::{Cctp, TransferRequest},
    crate::{
        Address,
        AuditEvent,
        AuditKind,
        BurnRecord,
        BurnStatus,
        CctpChain,
        DepositForBurn,
        ERC20,
        Submission,
        Token,
        allowance_calldata,
        approve_calldata,
        balance_of_calldata,
        error::{Error, Result},
        find_message_sent,
        to_atomic_units,
    },
    alloy_primitives::{Address as EvmAddress, FixedBytes, TxHash, U256},
    alloy_sol_types::SolCall,
    tracing::{Level, debug, info, instrument, warn},
};

impl Cctp {
    /// Burns USDC on the source chain for minting on
    /// `request.destination_chain`.
    ///
    /// Every check on the request runs before the first chain call. The
    /// returned record is `pending_attestation` and already stored.
    #[instrument(
        skip(self, request),
        fields(
            destination = %request.destination_chain,
            amount = %request.amount,
            token = %request.token,
        ),
        level = Level::INFO
    )]
    pub async fn initiate_transfer(&self, request: &TransferRequest) -> Result<BurnRecord> {
        let destination_chain = request.destination_chain;
        let recipient =
            Address::parse_for_chain(&request.destination_address, destination_chain)?;
        if destination_chain == self.source_chain {
            return Err(Error::UnsupportedChain {
                chain: destination_chain.to_string(),
            });
        }
        let destination_domain = destination_chain.cctp_domain_id()?;
        if !request.token.is_bridgeable() {
            return Err(Error::UnsupportedToken {
                token: request.token.to_string(),
            });
        }
        let amount = to_atomic_units(request.amount)?;
        if amount <= self.settings.max_fee {
            return Err(Error::InvalidAmount {
                amount: request.amount.to_string(),
                reason: "must exceed the max fee",
            });
        }
        self.check_signer(&request.from_wallet)?;

        let mint_recipient = recipient.to_bytes32();
        let usdc = Token::Usdc.address_on(self.source_chain)?;
        let token_messenger: EvmAddress = self.source_chain.token_messenger_address()?.try_into()?;

        self.ensure_balance(usdc, amount).await?;
        self.approve_if_needed(usdc, token_messenger, amount).await?;

        let burn = DepositForBurn {
            amount,
            destination_domain,
            mint_recipient,
            burn_token: usdc,
            destination_caller: FixedBytes::ZERO,
            max_fee: self.settings.max_fee,
            min_finality_threshold: self.settings.min_finality_threshold,
        };
        info!(%recipient, %amount, destination_domain, "burning");
        let submission = self
            .source
            .call_contract(token_messenger, burn.calldata(), "depositForBurn")
            .await?;

        let (block_number, message_hash) = match &submission {
            Submission::Confirmed {
                block_number, logs, ..
            } => (*block_number, find_message_sent(logs).map(|(_, hash)| hash)),
            Submission::TimedOut { tx_hash } => {
                warn!(%tx_hash, "burn broadcast but not yet mined");
                (None, None)
            }
        };

        let record = BurnRecord {
            burn_tx_hash: submission.tx_hash(),
            source_chain: self.source_chain,
            source_domain: self.source_chain.cctp_domain_id()?,
            destination_chain,
            destination_domain,
            mint_recipient,
            amount,
            block_number,
            message_hash,
            status: BurnStatus::PendingAttestation,
        };
        self.store.insert(record.clone()).await?;
        self.audit(AuditEvent {
            kind: AuditKind::Burn,
            source_chain: self.source_chain,
            destination_chain,
            amount,
            tx_hash: record.burn_tx_hash,
            status: "pending".to_string(),
        })
        .await;
        info!(
            burn_tx_hash = %record.burn_tx_hash,
            source = %self.source_chain,
            destination = %destination_chain,
            %amount,
            status = "pending",
            "transfer initiated"
        );
        Ok(record)
    }

    async fn ensure_balance(&self, token: EvmAddress, amount: U256) -> Result<()> {
        let raw = self
            .source
            .view(token, balance_of_calldata(self.signer()))
            .await?;
        let balance = ERC20::balanceOfCall::abi_decode_returns(&raw)?;
        debug!("balance {balance}");
        if balance < amount {
            return Err(Error::InsufficientBalance(balance, amount));
        }
        Ok(())
    }

    /// Approves `spender` for `amount` of `token` unless the allowance
    /// already covers it. The approval must be mined before returning.
    pub(crate) async fn approve_if_needed(
        &self,
        token: EvmAddress,
        spender: EvmAddress,
        amount: U256,
    ) -> Result<Option<TxHash>> {
        let raw = self
            .source
            .view(token, allowance_calldata(self.signer(), spender))
            .await?;
        let allowance = ERC20::allowanceCall::abi_decode_returns(&raw)?;
        if allowance >= amount {
            debug!(%allowance, "allowance sufficient, skipping approval");
            return Ok(None);
        }

        debug!("Approving allowance");
        match self
            .source
            .call_contract(token, approve_calldata(spender, amount), "approve")
            .await?
        {
            Submission::Confirmed { tx_hash, .. } => {
                info!(%tx_hash, %spender, "Approved token spending");
                Ok(Some(tx_hash))
            }
            Submission::TimedOut { tx_hash } => Err(Error::ConfirmationTimeout { tx_hash }),
        }
    }
}
