use anyhow::{anyhow, Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::chain::wallet::{hd_path, KeyAlgorithm, Wallet};
use crate::client::{ClientOptions, GasPrice, SettlePolicy, DEFAULT_CHAIN_ENDPOINT};
use crate::gateway::{GatewayOptions, DEFAULT_GATEWAY_ADDRS};
use crate::node::{GrpcConfig, NodeConfig, RemoteConfig, RpcConfig};

pub const MNEMONIC_ENV: &str = "GLITTER_MNEMONIC";
pub const GATEWAY_KEY_ENV: &str = "GLITTER_GATEWAY_KEY";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub chain: ChainConfig,
    #[serde(default)]
    pub key: KeyConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChainConfig {
    pub chain_id: String,
    pub lcd_endpoint: String,
    /// Tendermint RPC; empty disables node access
    #[serde(default)]
    pub rpc_address: String,
    #[serde(default)]
    pub grpc_address: String,
    pub gas_price_denom: String,
    pub gas_price_amount: Decimal,
    pub gas_adjustment: Decimal,
    pub http_timeout_secs: u64,
    #[serde(default = "default_rpc_max_connections")]
    pub rpc_max_connections: usize,
    /// Both zero leaves the post-broadcast account poll off
    #[serde(default)]
    pub settle_timeout_ms: u64,
    #[serde(default)]
    pub settle_interval_ms: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct KeyConfig {
    // Note: the mnemonic is read from GLITTER_MNEMONIC only, never from this file
    #[serde(default)]
    pub algorithm: KeyAlgorithm,
    #[serde(default)]
    pub hd_account: u32,
    #[serde(default)]
    pub hd_index: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    pub addrs: Vec<String>,
    #[serde(default)]
    pub access_token: String,
    pub timeout_secs: u64,
}

fn default_rpc_max_connections() -> usize {
    crate::node::DEFAULT_RPC_MAX_CONNECTIONS
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            addrs: DEFAULT_GATEWAY_ADDRS.iter().map(|a| a.to_string()).collect(),
            access_token: String::new(),
            timeout_secs: 10,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            chain: ChainConfig {
                chain_id: "glitter_12000-2".to_string(),
                lcd_endpoint: DEFAULT_CHAIN_ENDPOINT.to_string(),
                rpc_address: "http://127.0.0.1:26657".to_string(),
                grpc_address: "http://127.0.0.1:9090".to_string(),
                gas_price_denom: "agli".to_string(),
                gas_price_amount: Decimal::ONE,
                gas_adjustment: Decimal::new(25, 1),
                http_timeout_secs: 10,
                rpc_max_connections: default_rpc_max_connections(),
                settle_timeout_ms: 0,
                settle_interval_ms: 0,
            },
            key: KeyConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

impl Config {
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config {}", path.display()))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn client_options(&self) -> ClientOptions {
        let chain = &self.chain;
        let mut options = ClientOptions::default()
            .with_chain_endpoint(chain.lcd_endpoint.clone())
            .with_timeout(Duration::from_secs(chain.http_timeout_secs))
            .with_gas_fee_config(
                GasPrice::new(chain.gas_price_amount, chain.gas_price_denom.clone()),
                chain.gas_adjustment,
            );
        if chain.settle_timeout_ms > 0 && chain.settle_interval_ms > 0 {
            options = options.with_settle_policy(SettlePolicy::new(
                Duration::from_millis(chain.settle_timeout_ms),
                Duration::from_millis(chain.settle_interval_ms),
            ));
        }
        options
    }

    pub fn node_config(&self) -> NodeConfig {
        let chain = &self.chain;
        if chain.rpc_address.is_empty() || chain.grpc_address.is_empty() {
            return NodeConfig::None;
        }
        let timeout = Duration::from_secs(chain.http_timeout_secs);
        NodeConfig::Remote(RemoteConfig {
            rpc: RpcConfig {
                address: chain.rpc_address.clone(),
                max_connections: chain.rpc_max_connections,
                timeout,
            },
            grpc: GrpcConfig {
                address: chain.grpc_address.clone(),
                timeout,
            },
        })
    }

    /// The admin key comes from GLITTER_GATEWAY_KEY when set
    pub fn gateway_options(&self) -> GatewayOptions {
        let mut options = GatewayOptions::default()
            .with_addrs(self.gateway.addrs.iter().cloned())
            .with_access_token(self.gateway.access_token.clone())
            .with_timeout(Duration::from_secs(self.gateway.timeout_secs));
        if let Ok(key) = std::env::var(GATEWAY_KEY_ENV) {
            options = options.with_private_key(key);
        }
        options
    }

    pub fn hd_path(&self) -> String {
        hd_path(self.key.hd_account, self.key.hd_index)
    }

    /// Build the signing wallet from the mnemonic in GLITTER_MNEMONIC
    pub fn wallet(&self) -> Result<Wallet> {
        let mnemonic = std::env::var(MNEMONIC_ENV)
            .map_err(|_| anyhow!("{} is not set", MNEMONIC_ENV))?;
        let wallet = Wallet::from_mnemonic_with(mnemonic.trim(), "", &self.hd_path(), self.key.algorithm)?;
        Ok(wallet)
    }
}
