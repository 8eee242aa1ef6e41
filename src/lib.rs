//! Circle CCTP V2 bridging client for the ARC test network.
//!
//! A transfer is a burn on ARC, an attestation signed by Circle's Iris
//! service, and a permissionless `receiveMessage` on the destination chain.
//! [`Cctp`] drives all three steps plus multi-recipient payouts; chain writes
//! go through a [`ContractCaller`] and transfer state lives behind
//! [`TransferStore`].
mod address;
pub mod api;
mod attestation;
mod bridge;
mod caller;
mod chain;
pub mod config;
mod domain_id;
mod erc;
mod error;
mod message_transmitter;
mod solana;
mod store;
mod token;
mod token_messenger;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use {
    address::*,
    attestation::*,
    bridge::*,
    caller::*,
    chain::*,
    domain_id::*,
    erc::*,
    error::*,
    message_transmitter::*,
    solana::*,
    store::*,
    token::*,
    token_messenger::*,
};
