use {
    alloy_primitives::TxHash,
    anyhow::Context,
    arc_cctp::{
        CctpChain,
        Chain,
        PayoutRecipient,
        PollPolicy,
        Token,
        TransferRequest,
        api::{CompleteResponse, ErrorResponse, StatusResponse, TransferResponse},
        config::{Config, Env, LogLevel, setup_tracing},
    },
    clap::{Parser, Subcommand},
    rust_decimal::Decimal,
    serde::Serialize,
    std::path::PathBuf,
    tracing::info,
};

#[derive(Parser, Debug)]
#[command(version, about = "CCTP V2 transfers from the ARC test network")]
struct Cli {
    #[clap(flatten)]
    env: Env,
    /// Overrides `log_level` from the config file
    #[clap(long, value_enum)]
    log_level: Option<LogLevel>,
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Burn USDC on ARC for minting on another chain
    Transfer {
        #[clap(long)]
        amount: Decimal,
        #[clap(long)]
        to: String,
        #[clap(long)]
        chain: Chain,
        #[clap(long, default_value = "USDC")]
        token: Token,
        /// Wait for the attestation and mint on the destination
        #[clap(long)]
        complete: bool,
    },
    /// Attestation status of a burn
    Status { burn_tx_hash: TxHash },
    /// Submit the attested message to the destination chain
    Complete {
        burn_tx_hash: TxHash,
        #[clap(long)]
        chain: Chain,
    },
    /// Pay recipients listed in a JSON file (array of
    /// `{address, amount, chain, token}`)
    Batch { file: PathBuf },
    /// Fee quotes for burning to a chain
    Fees {
        #[clap(long)]
        chain: Chain,
    },
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if dotenvy::dotenv().is_err() {
        eprintln!("no .env file");
    }
    let cli = Cli::parse();
    let config = Config::load_file(&cli.env.config)
        .with_context(|| format!("loading {}", cli.env.config.display()))?;
    setup_tracing(cli.log_level.unwrap_or(config.log_level));

    let cctp = config.build(cli.env.signer()?).await?;
    info!(signer = %cctp.signer(), "{cctp:?}");

    match cli.command {
        Command::Transfer {
            amount,
            to,
            chain,
            token,
            complete,
        } => {
            let request = TransferRequest {
                amount,
                from_wallet: cctp.signer().to_string(),
                destination_address: to,
                destination_chain: chain,
                token,
            };
            let record = match cctp.initiate_transfer(&request).await {
                Ok(record) => record,
                Err(err) => return print_json(&ErrorResponse::from(&err)),
            };
            print_json(&TransferResponse::from(&record))?;
            if complete {
                let attestation = cctp
                    .attestation_client()
                    .wait_for_attestation(
                        cctp.source_chain().cctp_domain_id()?,
                        record.burn_tx_hash,
                        PollPolicy::default(),
                    )
                    .await?;
                info!(%attestation, "attested");
                let response = match cctp.complete_transfer(record.burn_tx_hash, chain).await {
                    Ok(result) => CompleteResponse::from(result),
                    Err(err) => CompleteResponse::from(&err),
                };
                print_json(&response)?;
            }
        }
        Command::Status { burn_tx_hash } => match cctp.get_transfer_status(burn_tx_hash).await {
            Ok(report) => print_json(&StatusResponse::from(report))?,
            Err(err) => print_json(&ErrorResponse::from(&err))?,
        },
        Command::Complete {
            burn_tx_hash,
            chain,
        } => {
            let response = match cctp.complete_transfer(burn_tx_hash, chain).await {
                Ok(result) => CompleteResponse::from(result),
                Err(err) => CompleteResponse::from(&err),
            };
            print_json(&response)?;
        }
        Command::Batch { file } => {
            let items: Vec<PayoutRecipient> = serde_json::from_str(
                &std::fs::read_to_string(&file)
                    .with_context(|| format!("reading {}", file.display()))?,
            )?;
            let result = cctp
                .execute_batch(&cctp.signer().to_string(), &items)
                .await?;
            print_json(&result)?;
        }
        Command::Fees { chain } => {
            let fees = cctp.get_fees(chain).await?;
            println!("{fees}");
            if let Some(fast) = fees.fast() {
                println!(
                    "fast burn of 1 USDC costs at least {} atomic units (max_fee {})",
                    fast.fee_for(alloy_primitives::U256::from(1_000_000u64)),
                    cctp.settings().max_fee
                );
            }
        }
    }
    Ok(())
}
