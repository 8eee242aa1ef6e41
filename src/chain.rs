use {
    crate::{
        ARBITRUM_DOMAIN_ID,
        ARC_DOMAIN_ID,
        AVALANCHE_DOMAIN_ID,
        BASE_DOMAIN_ID,
        ETHEREUM_DOMAIN_ID,
        OPTIMISM_DOMAIN_ID,
        POLYGON_DOMAIN_ID,
        SOLANA_DEVNET_USDC_TOKEN,
        SOLANA_DOMAIN_ID,
        SOLANA_MESSAGE_TRANSMITTER_V2,
        SOLANA_TOKEN_MESSENGER_MINTER_V2,
        UNICHAIN_DOMAIN_ID,
        address::Address,
        error::{Error, Result},
        message_transmitter::*,
        token_messenger::*,
    },
    serde::{Deserialize, Serialize},
    std::{fmt::Display, str::FromStr},
};

/// EVM chain id of the ARC public testnet.
pub const ARC_TESTNET_CHAIN_ID: u64 = 5_042_002;

/// Address encoding family of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChainFamily {
    Evm,
    Solana,
}

/// The fixed set of chains this client bridges between. ARC is always the
/// source; every other variant is a CCTP destination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Chain {
    ArcTestnet,
    EthereumSepolia,
    AvalancheFuji,
    OptimismSepolia,
    ArbitrumSepolia,
    SolanaDevnet,
    BaseSepolia,
    PolygonAmoy,
    UnichainSepolia,
}

impl Chain {
    pub const ALL: [Chain; 9] = [
        Chain::ArcTestnet,
        Chain::EthereumSepolia,
        Chain::AvalancheFuji,
        Chain::OptimismSepolia,
        Chain::ArbitrumSepolia,
        Chain::SolanaDevnet,
        Chain::BaseSepolia,
        Chain::PolygonAmoy,
        Chain::UnichainSepolia,
    ];

    pub const fn family(&self) -> ChainFamily {
        match self {
            Chain::SolanaDevnet => ChainFamily::Solana,
            _ => ChainFamily::Evm,
        }
    }

    pub const fn as_str(&self) -> &'static str {
        match self {
            Chain::ArcTestnet => "arc_testnet",
            Chain::EthereumSepolia => "ethereum_sepolia",
            Chain::AvalancheFuji => "avalanche_fuji",
            Chain::OptimismSepolia => "optimism_sepolia",
            Chain::ArbitrumSepolia => "arbitrum_sepolia",
            Chain::SolanaDevnet => "solana_devnet",
            Chain::BaseSepolia => "base_sepolia",
            Chain::PolygonAmoy => "polygon_amoy",
            Chain::UnichainSepolia => "unichain_sepolia",
        }
    }

    /// The EVM chain, `None` for non-EVM chains.
    pub fn evm_chain(&self) -> Option<alloy_chains::Chain> {
        let id = match self {
            Chain::ArcTestnet => ARC_TESTNET_CHAIN_ID,
            Chain::EthereumSepolia => 11_155_111,
            Chain::AvalancheFuji => 43_113,
            Chain::OptimismSepolia => 11_155_420,
            Chain::ArbitrumSepolia => 421_614,
            Chain::BaseSepolia => 84_532,
            Chain::PolygonAmoy => 80_002,
            Chain::UnichainSepolia => 1_301,
            Chain::SolanaDevnet => return None,
        };
        Some(alloy_chains::Chain::from_id(id))
    }
}

impl Display for Chain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Chain {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_ascii_lowercase().replace('-', "_");
        let chain = match normalized.as_str() {
            "arc" | "arc_testnet" => Chain::ArcTestnet,
            "ethereum" | "ethereum_sepolia" | "sepolia" => Chain::EthereumSepolia,
            "avalanche" | "avalanche_fuji" | "fuji" => Chain::AvalancheFuji,
            "optimism" | "optimism_sepolia" => Chain::OptimismSepolia,
            "arbitrum" | "arbitrum_sepolia" => Chain::ArbitrumSepolia,
            "solana" | "solana_devnet" => Chain::SolanaDevnet,
            "base" | "base_sepolia" => Chain::BaseSepolia,
            "polygon" | "polygon_amoy" => Chain::PolygonAmoy,
            "unichain" | "unichain_sepolia" => Chain::UnichainSepolia,
            _ => {
                return Err(Error::UnsupportedChain {
                    chain: s.to_string(),
                });
            }
        };
        Ok(chain)
    }
}

/// Static CCTP facts about a chain
pub trait CctpChain {
    /// The average time to confirmation of the chain, according to the CCTP docs: <https://developers.circle.com/stablecoins/required-block-confirmations>
    fn confirmation_average_time_seconds(&self) -> Result<u64>;
    /// The domain ID of the chain - used to identify the chain when bridging: <https://developers.circle.com/cctp/supported-domains>
    fn cctp_domain_id(&self) -> Result<u32>;
    /// The address of the `TokenMessengerV2` contract on the chain
    fn token_messenger_address(&self) -> Result<Address>;
    /// The address of the `MessageTransmitterV2` contract on the chain
    fn message_transmitter_address(&self) -> Result<Address>;

    fn usdc_token_address(&self) -> Result<Address>;

    fn sandbox(&self) -> bool;
}

impl CctpChain for Chain {
    fn confirmation_average_time_seconds(&self) -> Result<u64> {
        use Chain::*;

        match self {
            ArcTestnet => Ok(1),
            SolanaDevnet => Ok(4),
            EthereumSepolia => Ok(60),
            AvalancheFuji | OptimismSepolia | ArbitrumSepolia | BaseSepolia | PolygonAmoy
            | UnichainSepolia => Ok(20),
        }
    }

    fn cctp_domain_id(&self) -> Result<u32> {
        use Chain::*;

        match self {
            ArcTestnet => Ok(ARC_DOMAIN_ID),
            EthereumSepolia => Ok(ETHEREUM_DOMAIN_ID),
            AvalancheFuji => Ok(AVALANCHE_DOMAIN_ID),
            OptimismSepolia => Ok(OPTIMISM_DOMAIN_ID),
            ArbitrumSepolia => Ok(ARBITRUM_DOMAIN_ID),
            SolanaDevnet => Ok(SOLANA_DOMAIN_ID),
            BaseSepolia => Ok(BASE_DOMAIN_ID),
            PolygonAmoy => Ok(POLYGON_DOMAIN_ID),
            UnichainSepolia => Ok(UNICHAIN_DOMAIN_ID),
        }
    }

    fn token_messenger_address(&self) -> Result<Address> {
        use Chain::*;

        let address = match self {
            ArcTestnet => ARC_TESTNET_TOKEN_MESSENGER_ADDRESS,
            EthereumSepolia => ETHEREUM_SEPOLIA_TOKEN_MESSENGER_ADDRESS,
            AvalancheFuji => AVALANCHE_FUJI_TOKEN_MESSENGER_ADDRESS,
            OptimismSepolia => OPTIMISM_SEPOLIA_TOKEN_MESSENGER_ADDRESS,
            ArbitrumSepolia => ARBITRUM_SEPOLIA_TOKEN_MESSENGER_ADDRESS,
            BaseSepolia => BASE_SEPOLIA_TOKEN_MESSENGER_ADDRESS,
            PolygonAmoy => POLYGON_AMOY_TOKEN_MESSENGER_ADDRESS,
            UnichainSepolia => UNICHAIN_SEPOLIA_TOKEN_MESSENGER_ADDRESS,
            SolanaDevnet => return Ok(SOLANA_TOKEN_MESSENGER_MINTER_V2.into()),
        };
        Ok(address.into())
    }

    fn message_transmitter_address(&self) -> Result<Address> {
        use Chain::*;

        let address = match self {
            ArcTestnet => ARC_TESTNET_MESSAGE_TRANSMITTER_ADDRESS,
            EthereumSepolia => ETHEREUM_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS,
            AvalancheFuji => AVALANCHE_FUJI_MESSAGE_TRANSMITTER_ADDRESS,
            OptimismSepolia => OPTIMISM_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS,
            ArbitrumSepolia => ARBITRUM_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS,
            BaseSepolia => BASE_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS,
            PolygonAmoy => POLYGON_AMOY_MESSAGE_TRANSMITTER_ADDRESS,
            UnichainSepolia => UNICHAIN_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS,
            SolanaDevnet => return Ok(SOLANA_MESSAGE_TRANSMITTER_V2.into()),
        };
        Ok(address.into())
    }

    fn usdc_token_address(&self) -> Result<Address> {
        use Chain::*;

        let address = match self {
            ArcTestnet => ARC_TESTNET_USDC_CONTRACT,
            EthereumSepolia => ETHEREUM_SEPOLIA_USDC_CONTRACT,
            AvalancheFuji => AVALANCHE_FUJI_USDC_CONTRACT,
            OptimismSepolia => OPTIMISM_SEPOLIA_USDC_CONTRACT,
            ArbitrumSepolia => ARBITRUM_SEPOLIA_USDC_CONTRACT,
            BaseSepolia => BASE_SEPOLIA_USDC_CONTRACT,
            PolygonAmoy => POLYGON_AMOY_USDC_CONTRACT,
            UnichainSepolia => UNICHAIN_SEPOLIA_USDC_CONTRACT,
            SolanaDevnet => return Ok(SOLANA_DEVNET_USDC_TOKEN.into()),
        };
        Ok(address.into())
    }

    fn sandbox(&self) -> bool {
        // every supported chain is a testnet
        true
    }
}
