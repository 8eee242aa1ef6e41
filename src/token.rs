use {
    crate::{
        ARC_TESTNET_EURC_CONTRACT,
        chain::{CctpChain, Chain},
        error::{Error, Result},
    },
    alloy_primitives::{Address as EvmAddress, U256},
    rust_decimal::{Decimal, prelude::ToPrimitive},
    serde::{Deserialize, Serialize},
    std::{fmt::Display, str::FromStr},
};

/// Both supported stablecoins use 6 decimals.
pub const TOKEN_DECIMALS: u32 = 6;

/// Stablecoins the payout API accepts. Only USDC can be bridged with CCTP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Token {
    #[serde(rename = "USDC", alias = "usdc")]
    Usdc,
    #[serde(rename = "EURC", alias = "eurc")]
    Eurc,
}

impl Token {
    pub const fn symbol(&self) -> &'static str {
        match self {
            Token::Usdc => "USDC",
            Token::Eurc => "EURC",
        }
    }

    /// Whether CCTP can burn and mint this token.
    pub const fn is_bridgeable(&self) -> bool {
        matches!(self, Token::Usdc)
    }

    /// ERC-20 contract of the token on an EVM chain.
    pub fn address_on(&self, chain: Chain) -> Result<EvmAddress> {
        match (self, chain) {
            (Token::Usdc, _) => chain.usdc_token_address()?.try_into(),
            (Token::Eurc, Chain::ArcTestnet) => Ok(ARC_TESTNET_EURC_CONTRACT),
            (Token::Eurc, _) => Err(Error::UnsupportedToken {
                token: format!("{self} on {chain}"),
            }),
        }
    }
}

impl Display for Token {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for Token {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_uppercase().as_str() {
            "USDC" => Ok(Token::Usdc),
            "EURC" => Ok(Token::Eurc),
            _ => Err(Error::UnsupportedToken {
                token: s.to_string(),
            }),
        }
    }
}

/// Converts a human readable amount to the token's atomic units.
///
/// Rejects zero, negative and over-precise amounts instead of rounding.
pub fn to_atomic_units(amount: Decimal) -> Result<U256> {
    let invalid = |reason| Error::InvalidAmount {
        amount: amount.to_string(),
        reason,
    };
    if amount <= Decimal::ZERO {
        return Err(invalid("must be greater than zero"));
    }
    let scaled = amount
        .checked_mul(Decimal::from(10u64.pow(TOKEN_DECIMALS)))
        .ok_or_else(|| invalid("too large"))?;
    if !scaled.fract().is_zero() {
        return Err(invalid("more than 6 decimal places"));
    }
    scaled
        .to_u128()
        .map(U256::from)
        .ok_or_else(|| invalid("too large"))
}
