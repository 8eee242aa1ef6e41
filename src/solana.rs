use solana_pubkey::{Pubkey, pubkey};

pub const SOLANA_DEVNET_USDC_TOKEN: Pubkey =
    pubkey!("4zMMC9srt5Ri5X14GAgXhaHii3GnPAEERYPJgZJDncDU");

/// CCTP V2 `TokenMessengerMinter` program
pub const SOLANA_TOKEN_MESSENGER_MINTER_V2: Pubkey =
    pubkey!("CCTPV2vPZJS2u2BBsUoscuikbYjnpFmbFsvVuJdgUMQe");
/// CCTP V2 `MessageTransmitter` program
pub const SOLANA_MESSAGE_TRANSMITTER_V2: Pubkey =
    pubkey!("CCTPV2Sm4AdWt5296sk4P66VBZ7bEhcARwFaaS9YPbeC");
