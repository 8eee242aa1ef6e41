use {
    crate::{
        chain::{Chain, ChainFamily},
        error::Error,
    },
    alloy_primitives::{FixedBytes, hex},
    std::{fmt::Display, str::FromStr},
};

const EVM_ADDRESS_FORMAT: &str = "0x-prefixed 40 hex characters";
const SOLANA_ADDRESS_FORMAT: &str = "base58 string decoding to 32 bytes";

/// A chain-native address, either a 20 byte EVM address or a 32 byte Solana
/// public key. The second field is the number of significant bytes.
#[derive(Debug, Clone, Default, Copy, PartialEq, Eq, Hash)]
pub struct Address(pub FixedBytes<64>, pub usize);

/// Checks that `address` is well formed for the address family of `chain`.
///
/// EVM chains need `0x` followed by exactly 40 hex digits. Solana needs a
/// base58 string that decodes to exactly 32 bytes.
pub fn is_valid_address_for_chain(address: &str, chain: Chain) -> bool {
    match chain.family() {
        ChainFamily::Evm => is_evm_address(address),
        ChainFamily::Solana => solana_pubkey::Pubkey::from_str(address).is_ok(),
    }
}

fn is_evm_address(address: &str) -> bool {
    address
        .strip_prefix("0x")
        .is_some_and(|digits| digits.len() == 40 && digits.bytes().all(|b| b.is_ascii_hexdigit()))
}

impl Address {
    /// Parses `value` as an address of `chain`'s family.
    pub fn parse_for_chain(value: &str, chain: Chain) -> Result<Self, Error> {
        let invalid = |expected| Error::InvalidAddressFormat {
            address: value.to_string(),
            chain,
            expected,
        };
        match chain.family() {
            ChainFamily::Evm => {
                if !is_evm_address(value) {
                    return Err(invalid(EVM_ADDRESS_FORMAT));
                }
                value
                    .parse::<alloy_primitives::Address>()
                    .map(Self::from)
                    .map_err(|_| invalid(EVM_ADDRESS_FORMAT))
            }
            ChainFamily::Solana => solana_pubkey::Pubkey::from_str(value)
                .map(Self::from)
                .map_err(|_| invalid(SOLANA_ADDRESS_FORMAT)),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0[..self.1]
    }

    /// The `bytes32` form used as `mintRecipient`: EVM addresses are left
    /// padded with zeros, Solana keys are already 32 bytes.
    pub fn to_bytes32(&self) -> FixedBytes<32> {
        FixedBytes::<32>::left_padding_from(self.as_bytes())
    }
}

impl Display for Address {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self.1 {
            20 => {
                let addr = alloy_primitives::Address::from_slice(&self.0[..20]);
                write!(f, "{:#x}", addr)
            }
            solana_pubkey::PUBKEY_BYTES => {
                let mut bytes = [0u8; 32];
                bytes.copy_from_slice(&self.0[..32]);
                let pubkey = solana_pubkey::Pubkey::new_from_array(bytes);
                write!(f, "{}", pubkey)
            }
            _ => write!(f, "{}", hex::encode_prefixed(self.as_bytes())),
        }
    }
}

impl TryFrom<Address> for alloy_primitives::Address {
    type Error = Error;

    fn try_from(addr: Address) -> Result<Self, Self::Error> {
        Self::try_from(&addr)
    }
}

impl TryFrom<&Address> for alloy_primitives::Address {
    type Error = Error;

    fn try_from(addr: &Address) -> Result<Self, Self::Error> {
        if addr.1 == 20 {
            Ok(alloy_primitives::Address::from_slice(&addr.0[..20]))
        } else {
            Err(Error::Config(format!(
                "Invalid length for EVM address: expected 20, got {} ({addr})",
                addr.1
            )))
        }
    }
}

impl TryFrom<Address> for solana_pubkey::Pubkey {
    type Error = Error;

    fn try_from(addr: Address) -> Result<Self, Self::Error> {
        Self::try_from(&addr)
    }
}

impl TryFrom<&Address> for solana_pubkey::Pubkey {
    type Error = Error;

    fn try_from(addr: &Address) -> Result<Self, Self::Error> {
        if addr.1 == solana_pubkey::PUBKEY_BYTES {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&addr.0[..32]);
            Ok(solana_pubkey::Pubkey::new_from_array(bytes))
        } else {
            Err(Error::Config(format!(
                "Invalid length for Solana address: expected {}, got {} ({addr})",
                solana_pubkey::PUBKEY_BYTES,
                addr.1
            )))
        }
    }
}

impl From<alloy_primitives::Address> for Address {
    fn from(addr: alloy_primitives::Address) -> Self {
        let mut bytes = FixedBytes::<64>::ZERO;
        bytes[..20].copy_from_slice(addr.0.as_slice());
        Self(bytes, 20)
    }
}

impl From<solana_pubkey::Pubkey> for Address {
    fn from(pubkey: solana_pubkey::Pubkey) -> Self {
        let mut bytes = FixedBytes::<64>::ZERO;
        bytes[..solana_pubkey::PUBKEY_BYTES].copy_from_slice(&pubkey.to_bytes());
        Self(bytes, solana_pubkey::PUBKEY_BYTES)
    }
}
