use {
    crate::error::{Error, Result},
    alloy_primitives::{Address, Bytes, FixedBytes, Log, address, keccak256},
    alloy_sol_types::{SolCall, SolEvent, sol},
};

// https://developers.circle.com/cctp/evm-smart-contracts
pub const MESSAGE_TRANSMITTER_V2_TESTNET: Address =
    address!("0xE737e5cEBEEBa77EFE34D4aa090756590b1CE275");
pub const ARC_TESTNET_MESSAGE_TRANSMITTER_ADDRESS: Address = MESSAGE_TRANSMITTER_V2_TESTNET;
pub const ARBITRUM_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS: Address = MESSAGE_TRANSMITTER_V2_TESTNET;
pub const AVALANCHE_FUJI_MESSAGE_TRANSMITTER_ADDRESS: Address = MESSAGE_TRANSMITTER_V2_TESTNET;
pub const BASE_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS: Address = MESSAGE_TRANSMITTER_V2_TESTNET;
pub const ETHEREUM_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS: Address = MESSAGE_TRANSMITTER_V2_TESTNET;
pub const OPTIMISM_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS: Address = MESSAGE_TRANSMITTER_V2_TESTNET;
pub const POLYGON_AMOY_MESSAGE_TRANSMITTER_ADDRESS: Address = MESSAGE_TRANSMITTER_V2_TESTNET;
pub const UNICHAIN_SEPOLIA_MESSAGE_TRANSMITTER_ADDRESS: Address = MESSAGE_TRANSMITTER_V2_TESTNET;

/// Revert string of `MessageTransmitterV2.receiveMessage` for a message whose
/// nonce was already consumed.
pub const NONCE_ALREADY_USED: &str = "Nonce already used";

/// Byte offset of the 32-byte nonce in a V2 message header
/// (version: 4, sourceDomain: 4, destinationDomain: 4, nonce: 32, ...).
const NONCE_INDEX: usize = 12;
const NONCE_END: usize = NONCE_INDEX + 32;

sol! {
    #[allow(missing_docs)]
    interface MessageTransmitterV2 {
        event MessageSent(bytes message);

        function receiveMessage(bytes message, bytes attestation) external returns (bool success);

        function usedNonces(bytes32 nonce) external view returns (uint256);
    }
}

pub use MessageTransmitterV2::MessageSent;

/// Calldata for `receiveMessage(message, attestation)`.
pub fn receive_message_calldata(message: &[u8], attestation: &[u8]) -> Bytes {
    MessageTransmitterV2::receiveMessageCall {
        message: Bytes::copy_from_slice(message),
        attestation: Bytes::copy_from_slice(attestation),
    }
    .abi_encode()
    .into()
}

/// Calldata for the `usedNonces(nonce)` view.
pub fn used_nonces_calldata(nonce: FixedBytes<32>) -> Bytes {
    MessageTransmitterV2::usedNoncesCall { nonce }
        .abi_encode()
        .into()
}

/// Extracts the nonce Circle assigned to an attested message.
pub fn message_nonce(message: &[u8]) -> Result<FixedBytes<32>> {
    message
        .get(NONCE_INDEX..NONCE_END)
        .map(FixedBytes::<32>::from_slice)
        .ok_or_else(|| {
            Error::MalformedMessage(format!(
                "message is {} bytes, need at least {NONCE_END}",
                message.len()
            ))
        })
}

/// Finds the `MessageSent` event in a burn receipt and returns the message
/// bytes with their keccak hash.
pub fn find_message_sent(logs: &[Log]) -> Option<(Bytes, FixedBytes<32>)> {
    logs.iter().find_map(|log| {
        let decoded = MessageSent::decode_log(log).ok()?;
        let message = decoded.data.message;
        let hash = keccak256(&message);
        Some((message, hash))
    })
}

/// True when a revert reason reports the message as already received.
pub fn is_already_processed(reason: &str) -> bool {
    reason.contains(NONCE_ALREADY_USED)
}
