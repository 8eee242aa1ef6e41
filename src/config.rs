use {
    crate::{
        AttestationClient,
        BridgeSettings,
        Cctp,
        CctpChain,
        Chain,
        ChainFamily,
        ContractCaller,
        DEFAULT_CONFIRMATION_TIMEOUT,
        DEFAULT_MAX_FEE,
        FAST_FINALITY_THRESHOLD,
        IRIS_API_SANDBOX,
        ProviderCaller,
    },
    alloy_primitives::{Address, U256},
    alloy_provider::{Provider, ProviderBuilder},
    alloy_signer_local::PrivateKeySigner,
    clap::Parser,
    serde::Deserialize,
    std::{
        collections::BTreeMap,
        path::{Path, PathBuf},
        sync::Arc,
        time::Duration,
    },
    tracing::{Level, info},
};

#[derive(Parser, Debug, Clone)]
pub struct Env {
    /// Path to TOML configuration file
    #[clap(long, env = "ARC_CCTP_CONFIG", default_value = "arc-cctp.toml")]
    pub config: PathBuf,
    /// Hex private key of the wallet that signs burns, mints and payouts
    #[clap(long, env = "EVM_PRIVATE_KEY", hide_env_values = true)]
    pub private_key: String,
}

impl Env {
    pub fn signer(&self) -> Result<PrivateKeySigner, ConfigError> {
        self.private_key
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidPrivateKey)
    }
}

#[derive(Debug, Clone, Copy, Default, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Level {
    fn from(log_level: LogLevel) -> Self {
        match log_level {
            LogLevel::Trace => Self::TRACE,
            LogLevel::Debug => Self::DEBUG,
            LogLevel::Info => Self::INFO,
            LogLevel::Warn => Self::WARN,
            LogLevel::Error => Self::ERROR,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct RpcConfig {
    pub rpc_url: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DestinationConfig {
    pub rpc_url: String,
    /// Overrides the canonical `MessageTransmitterV2` of the chain.
    pub message_transmitter: Option<Address>,
}

/// Settings deserialized from the TOML config file.
#[derive(Debug, Clone, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub log_level: LogLevel,
    #[serde(default = "default_attestation_api")]
    pub attestation_api: String,
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
    #[serde(default = "default_required_confirmations")]
    pub required_confirmations: u64,
    /// Atomic units
    pub max_fee: Option<u64>,
    pub min_finality_threshold: Option<u32>,
    pub payout_router: Option<Address>,
    pub source: RpcConfig,
    #[serde(default)]
    pub destinations: BTreeMap<Chain, DestinationConfig>,
}

fn default_attestation_api() -> String {
    IRIS_API_SANDBOX.to_string()
}

fn default_confirmation_timeout_secs() -> u64 {
    DEFAULT_CONFIRMATION_TIMEOUT.as_secs()
}

fn default_required_confirmations() -> u64 {
    1
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read config file")]
    Io(#[from] std::io::Error),
    #[error("failed to parse TOML")]
    Toml(#[from] toml::de::Error),
    #[error("EVM_PRIVATE_KEY is not a valid hex private key")]
    InvalidPrivateKey,
    #[error("{chain} cannot be a mint destination for an EVM signer")]
    UnsupportedDestination { chain: Chain },
    #[error("invalid RPC url {url}")]
    InvalidRpcUrl { url: String },
    #[error("RPC for {chain} reports chain id {actual}, expected {expected}")]
    ChainIdMismatch {
        chain: Chain,
        expected: u64,
        actual: u64,
    },
    #[error("RPC error for {chain}: {reason}")]
    Rpc { chain: Chain, reason: String },
    #[error(transparent)]
    Bridge(#[from] crate::Error),
}

impl Config {
    pub fn load_file(path: &Path) -> Result<Self, ConfigError> {
        let config_str = std::fs::read_to_string(path)?;
        Self::from_toml(&config_str)
    }

    pub fn from_toml(config_toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(config_toml)?;
        if let Some(chain) = config
            .destinations
            .keys()
            .find(|chain| chain.family() != ChainFamily::Evm)
        {
            return Err(ConfigError::UnsupportedDestination { chain: *chain });
        }
        Ok(config)
    }

    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    /// The configured timeout, raised to the chain's average time for the
    /// required confirmations on slow chains.
    pub fn confirmation_timeout_for(&self, chain: Chain) -> Result<Duration, ConfigError> {
        let average = chain.confirmation_average_time_seconds()? * self.required_confirmations;
        Ok(self.confirmation_timeout().max(Duration::from_secs(average)))
    }

    pub fn settings(&self) -> BridgeSettings {
        BridgeSettings {
            max_fee: U256::from(self.max_fee.unwrap_or(DEFAULT_MAX_FEE)),
            min_finality_threshold: self
                .min_finality_threshold
                .unwrap_or(FAST_FINALITY_THRESHOLD),
            payout_router: self.payout_router,
        }
    }

    /// Connects a signing caller for `chain`, checking the RPC serves the
    /// expected chain id.
    pub async fn connect(
        &self,
        chain: Chain,
        rpc_url: &str,
        signer: PrivateKeySigner,
    ) -> Result<Arc<dyn ContractCaller>, ConfigError> {
        let expected = chain
            .evm_chain()
            .ok_or(ConfigError::UnsupportedDestination { chain })?
            .id();
        let url = rpc_url.parse().map_err(|_| ConfigError::InvalidRpcUrl {
            url: rpc_url.to_string(),
        })?;
        let provider = ProviderBuilder::new().wallet(signer).connect_http(url);
        let actual = provider
            .get_chain_id()
            .await
            .map_err(|err| ConfigError::Rpc {
                chain,
                reason: err.to_string(),
            })?;
        if actual != expected {
            return Err(ConfigError::ChainIdMismatch {
                chain,
                expected,
                actual,
            });
        }
        info!(%chain, chain_id = actual, "connected");
        Ok(Arc::new(
            ProviderCaller::new(provider)
                .with_required_confirmations(self.required_confirmations)
                .with_confirmation_timeout(self.confirmation_timeout_for(chain)?),
        ))
    }

    /// Connects every configured chain and assembles the client.
    pub async fn build(&self, signer: PrivateKeySigner) -> Result<Cctp, ConfigError> {
        let source = self
            .connect(Chain::ArcTestnet, &self.source.rpc_url, signer.clone())
            .await?;
        let mut cctp = Cctp::new(source, AttestationClient::new(&self.attestation_api))
            .with_settings(self.settings());
        for (chain, destination) in &self.destinations {
            let caller = self
                .connect(*chain, &destination.rpc_url, signer.clone())
                .await?;
            cctp = match destination.message_transmitter {
                Some(transmitter) => cctp.with_destination_transmitter(*chain, caller, transmitter),
                None => cctp.with_destination(*chain, caller)?,
            };
        }
        Ok(cctp)
    }
}

pub fn setup_tracing(log_level: LogLevel) {
    let level: Level = log_level.into();
    let default_filter = format!("arc_cctp={level}");

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}
