// https://developers.circle.com/cctp/supported-domains
pub const ETHEREUM_DOMAIN_ID: u32 = 0;
pub const AVALANCHE_DOMAIN_ID: u32 = 1;
pub const OPTIMISM_DOMAIN_ID: u32 = 2;
pub const ARBITRUM_DOMAIN_ID: u32 = 3;
pub const SOLANA_DOMAIN_ID: u32 = 5;
pub const BASE_DOMAIN_ID: u32 = 6;
pub const POLYGON_DOMAIN_ID: u32 = 7;
pub const UNICHAIN_DOMAIN_ID: u32 = 10;
pub const ARC_DOMAIN_ID: u32 = 26;
