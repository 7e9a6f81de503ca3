use std::time::Duration;

use rust_decimal::Decimal;

use crate::client::gas::GasPrice;

pub const DEFAULT_CHAIN_ENDPOINT: &str = "https://orlando-api.glitterprotocol.tech";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Bounded re-read of the account after this client's own broadcast.
///
/// When the client has broadcast sequence `s` for its signer, the next
/// account load polls every `interval` until the chain reports a sequence
/// above `s`, giving up after `timeout` and keeping the last value read.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SettlePolicy {
    pub timeout: Duration,
    pub interval: Duration,
}

impl SettlePolicy {
    pub fn new(timeout: Duration, interval: Duration) -> Self {
        Self { timeout, interval }
    }
}

impl Default for SettlePolicy {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(6),
            interval: Duration::from_millis(500),
        }
    }
}

/// Connection and fee settings for an [`LcdClient`](crate::client::LcdClient)
#[derive(Debug, Clone, PartialEq)]
pub struct ClientOptions {
    pub endpoint: String,
    pub timeout: Duration,
    pub gas_price: GasPrice,
    pub gas_adjustment: Decimal,
    pub settle: Option<SettlePolicy>,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_CHAIN_ENDPOINT.to_string(),
            timeout: DEFAULT_TIMEOUT,
            gas_price: GasPrice::new(Decimal::ONE, "agli"),
            gas_adjustment: Decimal::new(25, 1),
            settle: None,
        }
    }
}

impl ClientOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_chain_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_gas_fee_config(mut self, gas_price: GasPrice, gas_adjustment: Decimal) -> Self {
        self.gas_price = gas_price;
        self.gas_adjustment = gas_adjustment;
        self
    }

    pub fn with_settle_policy(mut self, policy: SettlePolicy) -> Self {
        self.settle = Some(policy);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let opts = ClientOptions::default();
        assert_eq!(opts.endpoint, DEFAULT_CHAIN_ENDPOINT);
        assert_eq!(opts.timeout, Duration::from_secs(10));
        assert_eq!(opts.gas_price.to_string(), "1agli");
        assert_eq!(opts.gas_adjustment.to_string(), "2.5");
        assert!(opts.settle.is_none());
    }

    #[test]
    fn test_builder_overrides() {
        let price: GasPrice = "0.5agli".parse().unwrap();
        let opts = ClientOptions::default()
            .with_timeout(Duration::from_secs(3))
            .with_chain_endpoint("http://localhost:1317")
            .with_gas_fee_config(price.clone(), Decimal::new(15, 1))
            .with_settle_policy(SettlePolicy::default());
        assert_eq!(opts.timeout, Duration::from_secs(3));
        assert_eq!(opts.endpoint, "http://localhost:1317");
        assert_eq!(opts.gas_price, price);
        assert_eq!(opts.gas_adjustment, Decimal::new(15, 1));
        assert_eq!(opts.settle, Some(SettlePolicy::default()));
    }
}
