use {
    super::Cctp,
    crate::{
        AttestationClient,
        CctpChain,
        Chain,
        FAST_FINALITY_THRESHOLD,
        STANDARD_FINALITY_THRESHOLD,
        error::Result,
    },
    alloy_primitives::U256,
    rust_decimal::{Decimal, prelude::ToPrimitive},
    serde::Deserialize,
    std::fmt::{Display, Formatter},
    tracing::debug,
};

const BPS_DENOMINATOR: u64 = 10_000;

/// Get USDC transfer fees
/// <https://developers.circle.com/api-reference/cctp/all/get-burn-usdc-fees>
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BurnFee {
    /// The finality threshold, such as block confirmations, used to determine
    /// whether the transfer qualifies as a Fast or Standard Transfer.
    pub finality_threshold: u32,

    /// Minimum fees for the transfer, expressed in basis points (bps). For
    /// example, 1 = 0.01%.
    pub minimum_fee: Decimal,
}

impl BurnFee {
    /// Fee in atomic units for burning `amount`, rounded up.
    pub fn fee_for(&self, amount: U256) -> U256 {
        let amount = u128::try_from(amount).ok().map(Decimal::from);
        amount
            .and_then(|amount| amount.checked_mul(self.minimum_fee))
            .map(|fee| (fee / Decimal::from(BPS_DENOMINATOR)).ceil())
            .and_then(|fee| fee.to_u128())
            .map(U256::from)
            .unwrap_or(U256::MAX)
    }
}

impl Display for BurnFee {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "finality threshold {} minimum fee {} bps",
            self.finality_threshold, self.minimum_fee
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Fees(pub Vec<BurnFee>);

impl Fees {
    /// Quote for a fast (soft finality) burn.
    pub fn fast(&self) -> Option<&BurnFee> {
        self.0
            .iter()
            .filter(|fee| fee.finality_threshold <= FAST_FINALITY_THRESHOLD)
            .min_by_key(|fee| fee.finality_threshold)
    }

    /// Quote for a standard (hard finality) burn.
    pub fn standard(&self) -> Option<&BurnFee> {
        self.0
            .iter()
            .filter(|fee| fee.finality_threshold >= STANDARD_FINALITY_THRESHOLD)
            .min_by_key(|fee| fee.finality_threshold)
    }
}

impl Display for Fees {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match (self.fast(), self.standard()) {
            (None, None) => write!(f, "no fees available"),
            (fast, standard) => {
                let show = |fee: Option<&BurnFee>| fee.map_or("None".to_string(), |fee| fee.to_string());
                write!(f, "fast: {}  standard: {}", show(fast), show(standard))
            }
        }
    }
}

impl AttestationClient {
    /// `GET {base}/v2/burn/USDC/fees/{source}/{destination}`
    pub async fn burn_fees(&self, source_domain: u32, destination_domain: u32) -> Result<Fees> {
        let url = format!(
            "{}/v2/burn/USDC/fees/{source_domain}/{destination_domain}",
            self.base_url()
        );
        debug!("getting fees from {url}");
        let response: Vec<BurnFee> = self
            .http()
            .get(url)
            .send()
            .await?
            .error_for_status()?
            .json()
            .await?;
        Ok(Fees(response))
    }
}

impl Cctp {
    /// Current fee quotes for burning from the source chain to `destination`.
    pub async fn get_fees(&self, destination: Chain) -> Result<Fees> {
        self.attestation_client()
            .burn_fees(
                self.source_chain().cctp_domain_id()?,
                destination.cctp_domain_id()?,
            )
            .await
    }
}

#[cfg(test)]
mod tests {
    use {super::*, httpmock::prelude::*, std::str::FromStr};

    fn fee(threshold: u32, bps: &str) -> BurnFee {
        BurnFee {
            finality_threshold: threshold,
            minimum_fee: Decimal::from_str(bps).unwrap(),
        }
    }

    #[test]
    fn test_fee_for_rounds_up() {
        // 1 bps of 1 USDC is 100 atomic units
        assert_eq!(fee(1000, "1").fee_for(U256::from(1_000_000u64)), U256::from(100));
        assert_eq!(fee(1000, "1.3").fee_for(U256::from(1_000_001u64)), U256::from(131));
        assert_eq!(fee(2000, "0").fee_for(U256::from(1_000_000u64)), U256::ZERO);
    }

    #[test]
    fn test_fast_and_standard() {
        let fees = Fees(vec![fee(2000, "0"), fee(1000, "1")]);
        assert_eq!(fees.fast().map(|f| f.finality_threshold), Some(1000));
        assert_eq!(fees.standard().map(|f| f.finality_threshold), Some(2000));
        assert!(Fees(vec![]).fast().is_none());
        // Between soft and hard finality is neither.
        assert!(Fees(vec![fee(1500, "0.5")]).standard().is_none());
    }

    #[tokio::test]
    async fn test_burn_fees_from_api() -> anyhow::Result<()> {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/v2/burn/USDC/fees/26/6");
            then.status(200).json_body(serde_json::json!([
                { "finalityThreshold": 1000, "minimumFee": 1 },
                { "finalityThreshold": 2000, "minimumFee": 0 }
            ]));
        });
        let client = AttestationClient::new(server.base_url());

        let fees = client.burn_fees(26, 6).await?;
        mock.assert();
        assert_eq!(fees.fast(), Some(&fee(1000, "1")));
        assert_eq!(fees.standard(), Some(&fee(2000, "0")));
        Ok(())
    }
}
