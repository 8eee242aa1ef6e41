use {
    alloy_primitives::{Address as EvmAddress, B256, Bytes, FixedBytes, U256, address, hex},
    alloy_sol_types::SolCall,
    anyhow::Result,
    arc_cctp::{
        ARC_TESTNET_MESSAGE_TRANSMITTER_ADDRESS,
        ARC_TESTNET_TOKEN_MESSENGER_ADDRESS,
        ARC_TESTNET_USDC_CONTRACT,
        AttestationClient,
        AuditKind,
        BASE_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS,
        BatchStatus,
        BridgeSettings,
        BurnStatus,
        Cctp,
        Chain,
        DepositForBurn,
        ERC20,
        EntryStatus,
        Error,
        FAST_FINALITY_THRESHOLD,
        InMemoryStore,
        MessageTransmitterV2,
        MintResult,
        PayoutRecipient,
        SOLANA_DOMAIN_ID,
        Token,
        TransferRequest,
        TransferStatus,
        TransferStore,
        test_utils::{MockCaller, WriteOutcome},
    },
    httpmock::prelude::*,
    rust_decimal::Decimal,
    std::{str::FromStr, sync::Arc, sync::Once},
    tracing_subscriber::EnvFilter,
};

static INIT: Once = Once::new();

fn setup() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_target(false)
            .with_test_writer()
            .with_env_filter(EnvFilter::from_default_env())
            .init();
    });
}

const SIGNER: EvmAddress = address!("0x00000000000000000000000000000000000a11ce");
const RELAYER: EvmAddress = address!("0x00000000000000000000000000000000000b0b00");
const ROUTER: EvmAddress = address!("0x0000000000000000000000000000000000000fee");
const EVM_RECIPIENT: &str = "0x742d35Cc6634C0532925a3b844Bc454e4438f44e";
const SOLANA_RECIPIENT: &str = "G4JQXYJX2SPokkZMXiCXy5ZMxUxbyByTebmm5K3FFKNg";

struct Harness {
    source: Arc<MockCaller>,
    destination: Arc<MockCaller>,
    store: Arc<InMemoryStore>,
    server: MockServer,
    cctp: Cctp,
}

fn harness() -> Result<Harness> {
    setup();
    let source = Arc::new(MockCaller::new(SIGNER));
    source.set_view_uint(ERC20::balanceOfCall::SELECTOR, U256::from(1_000_000_000_000u64));
    let destination = Arc::new(MockCaller::new(RELAYER));
    let store = Arc::new(InMemoryStore::new());
    let server = MockServer::start();
    let cctp = Cctp::new(source.clone(), AttestationClient::new(server.base_url()))
        .with_store(store.clone(), store.clone())
        .with_settings(BridgeSettings {
            payout_router: Some(ROUTER),
            ..BridgeSettings::default()
        })
        .with_destination(Chain::BaseSepolia, destination.clone())?;
    Ok(Harness {
        source,
        destination,
        store,
        server,
        cctp,
    })
}

fn request(to: &str, chain: Chain) -> TransferRequest {
    TransferRequest {
        amount: Decimal::from(100),
        from_wallet: SIGNER.to_string(),
        destination_address: to.to_string(),
        destination_chain: chain,
        token: Token::Usdc,
    }
}

/// V2 message header with `nonce` at bytes 12..44.
fn attested_message(nonce: u8) -> Vec<u8> {
    let mut message = vec![0u8; 12];
    message.extend_from_slice(&[nonce; 32]);
    message.extend_from_slice(b"burn message body");
    message
}

fn mock_attestation(server: &MockServer, burn_tx_hash: B256, message: &[u8]) {
    server.mock(|when, then| {
        when.method(GET)
            .path("/v2/messages/26")
            .query_param("transactionHash", hex::encode_prefixed(burn_tx_hash));
        then.status(200).json_body(serde_json::json!({
            "messages": [{
                "status": "complete",
                "attestation": hex::encode_prefixed([0xaa; 65]),
                "message": hex::encode_prefixed(message),
            }]
        }));
    });
}

#[tokio::test]
async fn test_initiate_transfer_to_solana() -> Result<()> {
    let h = harness()?;

    let record = h
        .cctp
        .initiate_transfer(&request(SOLANA_RECIPIENT, Chain::SolanaDevnet))
        .await?;

    assert_eq!(record.status, BurnStatus::PendingAttestation);
    assert_eq!(record.destination_domain, SOLANA_DOMAIN_ID);
    assert_eq!(record.amount, U256::from(100_000_000u64));
    let pubkey = solana_pubkey::Pubkey::from_str(SOLANA_RECIPIENT)?;
    assert_eq!(record.mint_recipient.as_slice(), pubkey.to_bytes().as_slice());

    // allowance was zero: approve then burn
    let writes = h.source.writes();
    assert_eq!(writes.len(), 2);
    assert_eq!(writes[0].contract, ARC_TESTNET_USDC_CONTRACT);
    assert_eq!(writes[0].selector(), ERC20::approveCall::SELECTOR);
    assert_eq!(writes[1].contract, ARC_TESTNET_TOKEN_MESSENGER_ADDRESS);

    let burn = DepositForBurn::decode(&writes[1].calldata)?;
    assert_eq!(burn.destination_caller, FixedBytes::ZERO);
    assert_eq!(burn.min_finality_threshold, FAST_FINALITY_THRESHOLD);
    assert_eq!(burn.burn_token, ARC_TESTNET_USDC_CONTRACT);
    assert_eq!(burn.mint_recipient, record.mint_recipient);

    assert_eq!(h.store.get(record.burn_tx_hash).await?, Some(record.clone()));
    let events = h.store.events()?;
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, AuditKind::Burn);
    assert_eq!(events[0].status, "pending");
    assert_eq!(events[0].tx_hash, record.burn_tx_hash);
    Ok(())
}

#[tokio::test]
async fn test_evm_address_for_solana_fails_before_chain_calls() -> Result<()> {
    let h = harness()?;

    let result = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::SolanaDevnet))
        .await;

    assert!(matches!(result, Err(Error::InvalidAddressFormat { .. })));
    assert!(h.source.calls().is_empty());
    assert!(h.store.events()?.is_empty());
    Ok(())
}

#[tokio::test]
async fn test_invalid_requests_make_no_chain_calls() -> Result<()> {
    let h = harness()?;

    let mut eurc = request(EVM_RECIPIENT, Chain::BaseSepolia);
    eurc.token = Token::Eurc;
    let mut zero = request(EVM_RECIPIENT, Chain::BaseSepolia);
    zero.amount = Decimal::ZERO;
    let mut other_wallet = request(EVM_RECIPIENT, Chain::BaseSepolia);
    other_wallet.from_wallet = RELAYER.to_string();

    assert!(matches!(
        h.cctp.initiate_transfer(&eurc).await,
        Err(Error::UnsupportedToken { .. })
    ));
    assert!(matches!(
        h.cctp.initiate_transfer(&zero).await,
        Err(Error::InvalidAmount { .. })
    ));
    assert!(matches!(
        h.cctp.initiate_transfer(&other_wallet).await,
        Err(Error::SignerMismatch { .. })
    ));
    assert!(matches!(
        h.cctp
            .initiate_transfer(&request(EVM_RECIPIENT, Chain::ArcTestnet))
            .await,
        Err(Error::UnsupportedChain { .. })
    ));
    assert!(h.source.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_amount_not_above_max_fee_spends_no_gas() -> Result<()> {
    let h = harness()?;
    let mut dust = request(EVM_RECIPIENT, Chain::BaseSepolia);
    // 100 atomic units against the default max fee of 500
    dust.amount = Decimal::from_str("0.0001")?;

    assert!(matches!(
        h.cctp.initiate_transfer(&dust).await,
        Err(Error::InvalidAmount { .. })
    ));
    // Exactly the max fee is still rejected by the token messenger.
    dust.amount = Decimal::from_str("0.0005")?;
    assert!(matches!(
        h.cctp.initiate_transfer(&dust).await,
        Err(Error::InvalidAmount { .. })
    ));
    assert!(h.source.calls().is_empty());

    dust.amount = Decimal::from_str("0.000501")?;
    h.cctp.initiate_transfer(&dust).await?;
    assert!(!h.source.writes().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_sufficient_allowance_skips_approval() -> Result<()> {
    let h = harness()?;
    h.source
        .set_view_uint(ERC20::allowanceCall::SELECTOR, U256::from(u64::MAX));

    h.cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await?;

    let writes = h.source.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].contract, ARC_TESTNET_TOKEN_MESSENGER_ADDRESS);
    Ok(())
}

#[tokio::test]
async fn test_insufficient_balance_spends_no_gas() -> Result<()> {
    let h = harness()?;
    h.source
        .set_view_uint(ERC20::balanceOfCall::SELECTOR, U256::from(1u64));

    let result = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await;

    assert!(matches!(result, Err(Error::InsufficientBalance(..))));
    assert!(h.source.writes().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_approval_timeout_aborts_burn() -> Result<()> {
    let h = harness()?;
    h.source.push_write(WriteOutcome::TimeOut);

    let result = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await;

    assert!(matches!(result, Err(Error::ConfirmationTimeout { .. })));
    assert_eq!(h.source.writes().len(), 1);
    Ok(())
}

#[tokio::test]
async fn test_burn_timeout_still_records_transfer() -> Result<()> {
    let h = harness()?;
    h.source.push_write(WriteOutcome::Confirm);
    h.source.push_write(WriteOutcome::TimeOut);

    let record = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await?;

    assert_eq!(record.block_number, None);
    assert_eq!(record.status, BurnStatus::PendingAttestation);
    assert!(h.store.get(record.burn_tx_hash).await?.is_some());
    Ok(())
}

#[tokio::test]
async fn test_burn_records_message_hash() -> Result<()> {
    let h = harness()?;
    let message = Bytes::from(attested_message(1));
    h.source.push_write(WriteOutcome::Confirm);
    h.source
        .push_write(WriteOutcome::ConfirmWithMessage(message.clone()));

    let record = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await?;

    assert_eq!(
        record.message_hash,
        Some(alloy_primitives::keccak256(&message))
    );
    Ok(())
}

#[tokio::test]
async fn test_status_is_pending_right_after_initiation() -> Result<()> {
    let h = harness()?;
    h.server.mock(|when, then| {
        when.method(GET).path("/v2/messages/26");
        then.status(404);
    });

    let record = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await?;
    let report = h.cctp.get_transfer_status(record.burn_tx_hash).await?;

    assert_eq!(report.status, TransferStatus::Pending);
    assert!(report.attestation.is_none());
    Ok(())
}

#[tokio::test]
async fn test_attestation_query_is_stable_and_side_effect_free() -> Result<()> {
    let h = harness()?;
    let record = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await?;
    mock_attestation(&h.server, record.burn_tx_hash, &attested_message(3));
    let calls_before = h.source.calls().len();
    let events_before = h.store.events()?.len();

    let first = h.cctp.get_attestation(record.burn_tx_hash).await?;
    let second = h.cctp.get_attestation(record.burn_tx_hash).await?;

    assert!(first.is_some());
    assert_eq!(first, second);
    assert_eq!(h.source.calls().len(), calls_before);
    assert!(h.destination.calls().is_empty());
    assert_eq!(h.store.events()?.len(), events_before);
    assert_eq!(
        h.store.get(record.burn_tx_hash).await?.map(|r| r.status),
        Some(BurnStatus::PendingAttestation)
    );
    Ok(())
}

#[tokio::test]
async fn test_complete_transfer_mints_and_advances() -> Result<()> {
    let h = harness()?;
    let record = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await?;
    let message = attested_message(4);
    mock_attestation(&h.server, record.burn_tx_hash, &message);

    let status = h.cctp.get_transfer_status(record.burn_tx_hash).await?;
    assert_eq!(status.status, TransferStatus::Attested);
    assert_eq!(
        h.store.get(record.burn_tx_hash).await?.map(|r| r.status),
        Some(BurnStatus::Attested)
    );

    let result = h
        .cctp
        .complete_transfer(record.burn_tx_hash, Chain::BaseSepolia)
        .await?;
    assert!(matches!(result, MintResult::Minted { .. }));

    let writes = h.destination.writes();
    assert_eq!(writes.len(), 1);
    assert_eq!(writes[0].contract, BASE_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS);
    let call = MessageTransmitterV2::receiveMessageCall::abi_decode(&writes[0].calldata)?;
    assert_eq!(call.message.as_ref(), message.as_slice());

    let status = h.cctp.get_transfer_status(record.burn_tx_hash).await?;
    assert_eq!(status.status, TransferStatus::Completed);
    let events = h.store.events()?;
    assert_eq!(events.last().map(|e| e.kind), Some(AuditKind::Mint));
    Ok(())
}

#[tokio::test]
async fn test_complete_twice_reports_already_processed() -> Result<()> {
    let h = harness()?;
    let record = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await?;
    mock_attestation(&h.server, record.burn_tx_hash, &attested_message(5));
    h.destination.push_write(WriteOutcome::Confirm);
    h.destination.push_write(WriteOutcome::Revert(
        "execution reverted: Nonce already used".to_string(),
    ));

    let first = h
        .cctp
        .complete_transfer(record.burn_tx_hash, Chain::BaseSepolia)
        .await?;
    let second = h
        .cctp
        .complete_transfer(record.burn_tx_hash, Chain::BaseSepolia)
        .await?;

    assert!(matches!(first, MintResult::Minted { .. }));
    match second {
        MintResult::AlreadyCompleted { reason } => {
            assert_eq!(reason, "execution reverted: Nonce already used")
        }
        other => panic!("unexpected {other}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_used_nonce_short_circuits_mint() -> Result<()> {
    let h = harness()?;
    let record = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await?;
    mock_attestation(&h.server, record.burn_tx_hash, &attested_message(6));
    h.destination
        .set_view_uint(MessageTransmitterV2::usedNoncesCall::SELECTOR, U256::from(1));

    let result = h
        .cctp
        .complete_transfer(record.burn_tx_hash, Chain::BaseSepolia)
        .await?;

    assert!(matches!(result, MintResult::AlreadyCompleted { .. }));
    assert!(h.destination.writes().is_empty());
    assert_eq!(
        h.store.get(record.burn_tx_hash).await?.map(|r| r.status),
        Some(BurnStatus::Completed)
    );
    Ok(())
}

#[tokio::test]
async fn test_other_revert_surfaces_verbatim() -> Result<()> {
    let h = harness()?;
    let record = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await?;
    mock_attestation(&h.server, record.burn_tx_hash, &attested_message(7));
    h.destination
        .push_write(WriteOutcome::Revert("Invalid attestation length".to_string()));

    let result = h
        .cctp
        .complete_transfer(record.burn_tx_hash, Chain::BaseSepolia)
        .await;

    assert!(matches!(
        result,
        Err(Error::ChainExecution { reason, .. }) if reason == "Invalid attestation length"
    ));
    Ok(())
}

#[tokio::test]
async fn test_mint_timeout_is_submitted() -> Result<()> {
    let h = harness()?;
    let record = h
        .cctp
        .initiate_transfer(&request(EVM_RECIPIENT, Chain::BaseSepolia))
        .await?;
    mock_attestation(&h.server, record.burn_tx_hash, &attested_message(8));
    h.destination.push_write(WriteOutcome::TimeOut);

    let result = h
        .cctp
        .complete_transfer(record.burn_tx_hash, Chain::BaseSepolia)
        .await?;

    assert!(matches!(result, MintResult::Submitted { .. }));
    assert_eq!(
        h.store.get(record.burn_tx_hash).await?.map(|r| r.status),
        Some(BurnStatus::Attested)
    );
    Ok(())
}

#[tokio::test]
async fn test_complete_without_attestation_is_recoverable() -> Result<()> {
    let h = harness()?;
    h.server.mock(|when, then| {
        when.method(GET).path("/v2/messages/26");
        then.status(200)
            .json_body(serde_json::json!({ "messages": [{ "status": "pending" }] }));
    });

    let err = h
        .cctp
        .complete_transfer(B256::repeat_byte(9), Chain::BaseSepolia)
        .await
        .unwrap_err();

    assert!(matches!(err, Error::AttestationNotReady { .. }));
    assert!(err.is_recoverable());
    assert!(h.destination.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_unconfigured_destination() -> Result<()> {
    let h = harness()?;
    let burn = B256::repeat_byte(10);
    mock_attestation(&h.server, burn, &attested_message(10));

    for chain in [Chain::EthereumSepolia, Chain::SolanaDevnet] {
        assert!(matches!(
            h.cctp.complete_transfer(burn, chain).await,
            Err(Error::ChainNotConfigured { chain: c }) if c == chain
        ));
    }
    assert!(matches!(
        h.cctp
            .clone()
            .with_destination(Chain::SolanaDevnet, h.destination.clone()),
        Err(Error::ChainNotConfigured { .. })
    ));
    Ok(())
}

#[tokio::test]
async fn test_batch_mixed_items() -> Result<()> {
    let h = harness()?;
    let item = |address: &str, chain, token| PayoutRecipient {
        address: address.to_string(),
        amount: Decimal::from(5),
        chain,
        token,
    };
    let items = vec![
        item(EVM_RECIPIENT, Chain::ArcTestnet, Token::Usdc),
        item(EVM_RECIPIENT, Chain::BaseSepolia, Token::Eurc),
        item(SOLANA_RECIPIENT, Chain::SolanaDevnet, Token::Usdc),
        item(EVM_RECIPIENT, Chain::ArcTestnet, Token::Eurc),
        item("0xnot-an-address", Chain::ArcTestnet, Token::Usdc),
        item(EVM_RECIPIENT, Chain::EthereumSepolia, Token::Eurc),
        item(EVM_RECIPIENT, Chain::ArcTestnet, Token::Usdc),
    ];

    let result = h
        .cctp
        .execute_batch(&SIGNER.to_string(), &items)
        .await?;

    assert_eq!(result.entries.len(), items.len());
    assert_eq!(result.succeeded + result.failed, items.len());
    assert_eq!(result.failed, 3);
    assert_eq!(result.status, BatchStatus::Partial);
    for (entry, item) in result.entries.iter().zip(&items) {
        assert_eq!(entry.recipient, item.address);
        assert_eq!(entry.destination_chain, item.chain);
    }

    let statuses: Vec<_> = result.entries.iter().map(|e| e.status).collect();
    assert_eq!(
        statuses,
        vec![
            EntryStatus::Finalized,
            EntryStatus::Failed,
            EntryStatus::PendingAttestation,
            EntryStatus::Finalized,
            EntryStatus::Failed,
            EntryStatus::Failed,
            EntryStatus::Finalized,
        ]
    );
    // both USDC legs share one router call
    assert_eq!(result.entries[0].tx_hash, result.entries[6].tx_hash);
    assert_ne!(result.entries[0].tx_hash, result.entries[3].tx_hash);

    let payouts: Vec<_> = h
        .source
        .writes()
        .into_iter()
        .filter(|call| call.contract == ROUTER)
        .collect();
    assert_eq!(payouts.len(), 2);
    Ok(())
}

#[tokio::test]
async fn test_batch_unsupported_tokens_fail_without_chain_calls() -> Result<()> {
    let h = harness()?;
    let items: Vec<_> = [Chain::BaseSepolia, Chain::PolygonAmoy, Chain::AvalancheFuji]
        .into_iter()
        .map(|chain| PayoutRecipient {
            address: EVM_RECIPIENT.to_string(),
            amount: Decimal::ONE,
            chain,
            token: Token::Eurc,
        })
        .collect();

    let result = h
        .cctp
        .execute_batch(&SIGNER.to_string(), &items)
        .await?;

    assert_eq!(result.failed, 3);
    assert!(result.entries.iter().all(|e| e.error.is_some()));
    assert!(h.source.calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn test_batch_without_router_fails_same_chain_legs() -> Result<()> {
    let h = harness()?;
    let cctp = h.cctp.clone().with_settings(BridgeSettings::default());
    let items = vec![PayoutRecipient {
        address: EVM_RECIPIENT.to_string(),
        amount: Decimal::ONE,
        chain: Chain::ArcTestnet,
        token: Token::Usdc,
    }];

    let result = cctp.execute_batch(&SIGNER.to_string(), &items).await?;

    assert_eq!(result.failed, 1);
    assert!(
        result.entries[0]
            .error
            .as_deref()
            .is_some_and(|e| e.contains("not configured"))
    );
    Ok(())
}

#[tokio::test]
async fn test_batch_aborts_on_transport_failure() -> Result<()> {
    let h = harness()?;
    h.source
        .push_write(WriteOutcome::TransportFailure("connection refused".to_string()));
    let items = vec![PayoutRecipient {
        address: EVM_RECIPIENT.to_string(),
        amount: Decimal::ONE,
        chain: Chain::BaseSepolia,
        token: Token::Usdc,
    }];

    let result = h.cctp.execute_batch(&SIGNER.to_string(), &items).await;

    assert!(matches!(result, Err(Error::Transport(_))));
    Ok(())
}

#[tokio::test]
async fn test_batch_abort_reports_payouts_already_sent() -> Result<()> {
    let h = harness()?;
    h.source
        .set_view_uint(ERC20::allowanceCall::SELECTOR, U256::from(u64::MAX));
    // batchPayout confirms, then the burn for the second item cannot reach the node
    h.source.push_write(WriteOutcome::Confirm);
    h.source
        .push_write(WriteOutcome::TransportFailure("connection reset".to_string()));
    let items = vec![
        PayoutRecipient {
            address: EVM_RECIPIENT.to_string(),
            amount: Decimal::ONE,
            chain: Chain::ArcTestnet,
            token: Token::Usdc,
        },
        PayoutRecipient {
            address: EVM_RECIPIENT.to_string(),
            amount: Decimal::ONE,
            chain: Chain::BaseSepolia,
            token: Token::Usdc,
        },
    ];

    let result = h.cctp.execute_batch(&SIGNER.to_string(), &items).await;

    match result {
        Err(Error::BatchAborted { broadcast, source }) => {
            assert_eq!(broadcast, vec![h.source.tx_hash(1)]);
            assert!(matches!(*source, Error::Transport(_)));
        }
        other => panic!("unexpected {other:?}"),
    }
    Ok(())
}

#[tokio::test]
async fn test_batch_rejects_foreign_funding_wallet() -> Result<()> {
    let h = harness()?;
    let result = h.cctp.execute_batch(&RELAYER.to_string(), &[]).await;
    assert!(matches!(result, Err(Error::SignerMismatch { .. })));
    Ok(())
}

#[test]
fn test_message_transmitter_is_shared_testnet_address() {
    assert_eq!(
        ARC_TESTNET_MESSAGE_TRANSMITTER_ADDRESS,
        BASE_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS
    );
}
