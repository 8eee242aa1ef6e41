use {
    alloy_primitives::{Address, Bytes, FixedBytes, U256, address},
    alloy_sol_types::{SolCall, sol},
};

// https://developers.circle.com/cctp/evm-smart-contracts
pub const TOKEN_MESSENGER_V2_TESTNET: Address =
    address!("0x8FE6B999Dc680CcFDD5Bf7EB0974218be2542DAA");
pub const ARC_TESTNET_TOKEN_MESSENGER_ADDRESS: Address = TOKEN_MESSENGER_V2_TESTNET;
pub const ARBITRUM_SEPOLIA_TOKEN_MESSENGER_ADDRESS: Address = TOKEN_MESSENGER_V2_TESTNET;
pub const AVALANCHE_FUJI_TOKEN_MESSENGER_ADDRESS: Address = TOKEN_MESSENGER_V2_TESTNET;
pub const BASE_SEPOLIA_TOKEN_MESSENGER_ADDRESS: Address = TOKEN_MESSENGER_V2_TESTNET;
pub const ETHEREUM_SEPOLIA_TOKEN_MESSENGER_ADDRESS: Address = TOKEN_MESSENGER_V2_TESTNET;
pub const OPTIMISM_SEPOLIA_TOKEN_MESSENGER_ADDRESS: Address = TOKEN_MESSENGER_V2_TESTNET;
pub const POLYGON_AMOY_TOKEN_MESSENGER_ADDRESS: Address = TOKEN_MESSENGER_V2_TESTNET;
pub const UNICHAIN_SEPOLIA_TOKEN_MESSENGER_ADDRESS: Address = TOKEN_MESSENGER_V2_TESTNET;

/// USDC is the native gas token on ARC and is exposed through this ERC-20
/// interface with 6 decimals.
pub const ARC_TESTNET_USDC_CONTRACT: Address =
    address!("0x3600000000000000000000000000000000000000");
pub const ARC_TESTNET_EURC_CONTRACT: Address =
    address!("0x89B50855Aa3bE2F677cD6303Cec089B5F319D72a");
pub const ARBITRUM_SEPOLIA_USDC_CONTRACT: Address =
    address!("0x75faf114eafb1BDbe2F0316DF893fd58CE46AA4d");
pub const AVALANCHE_FUJI_USDC_CONTRACT: Address =
    address!("0x5425890298aed601595a70AB815c96711a31Bc65");
pub const BASE_SEPOLIA_USDC_CONTRACT: Address =
    address!("0x036CbD53842c5426634e7929541eC2318f3dCF7e");
pub const ETHEREUM_SEPOLIA_USDC_CONTRACT: Address =
    address!("0x1c7D4B196Cb0C7B01d743Fbc6116a902379C7238");
pub const OPTIMISM_SEPOLIA_USDC_CONTRACT: Address =
    address!("0x5fd84259d66Cd46123540766Be93DFE6D43130D7");
pub const POLYGON_AMOY_USDC_CONTRACT: Address =
    address!("0x41E94Eb019C0762f9Bfcf9Fb1E58725BfB0e7582");
pub const UNICHAIN_SEPOLIA_USDC_CONTRACT: Address =
    address!("0x31d0220469e10c4E71834a79b1f276d740d3768F");

/// `minFinalityThreshold` at or below which Circle attests a burn on soft
/// finality (fast transfer).
pub const FAST_FINALITY_THRESHOLD: u32 = 1000;
/// `minFinalityThreshold` for a standard, hard-finality transfer.
pub const STANDARD_FINALITY_THRESHOLD: u32 = 2000;
/// Default `maxFee` in atomic USDC units paid to the relayer on a fast burn.
pub const DEFAULT_MAX_FEE: u64 = 500;

sol! {
    #[allow(missing_docs)]
    interface TokenMessengerV2 {
        function depositForBurn(
            uint256 amount,
            uint32 destinationDomain,
            bytes32 mintRecipient,
            address burnToken,
            bytes32 destinationCaller,
            uint256 maxFee,
            uint32 minFinalityThreshold
        ) external;
    }
}

/// Parameters of a single `depositForBurn` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DepositForBurn {
    pub amount: U256,
    pub destination_domain: u32,
    pub mint_recipient: FixedBytes<32>,
    pub burn_token: Address,
    /// `bytes32(0)` lets any address call `receiveMessage` on the destination
    pub destination_caller: FixedBytes<32>,
    pub max_fee: U256,
    pub min_finality_threshold: u32,
}

impl DepositForBurn {
    /// ABI-encoded calldata for `TokenMessengerV2.depositForBurn`.
    pub fn calldata(&self) -> Bytes {
        TokenMessengerV2::depositForBurnCall {
            amount: self.amount,
            destinationDomain: self.destination_domain,
            mintRecipient: self.mint_recipient,
            burnToken: self.burn_token,
            destinationCaller: self.destination_caller,
            maxFee: self.max_fee,
            minFinalityThreshold: self.min_finality_threshold,
        }
        .abi_encode()
        .into()
    }

    pub fn decode(calldata: &[u8]) -> Result<Self, alloy_sol_types::Error> {
        let call = TokenMessengerV2::depositForBurnCall::abi_decode(calldata)?;
        Ok(Self {
            amount: call.amount,
            destination_domain: call.destinationDomain,
            mint_recipient: call.mintRecipient,
            burn_token: call.burnToken,
            destination_caller: call.destinationCaller,
            max_fee: call.maxFee,
            min_finality_threshold: call.minFinalityThreshold,
        })
    }
}
