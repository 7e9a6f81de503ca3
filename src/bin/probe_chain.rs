/// Probe a Glitter node: RPC status, genesis, validators, staking and the
/// index module, printing what each answers.
/// Run with: cargo run --bin probe_chain -- [config.toml]

use anyhow::Result;
use glitter_sdk::chain::ModuleRegistry;
use glitter_sdk::config::Config;
use glitter_sdk::node::{build_node, NodeConfig};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    env_logger::init();

    println!("=== Glitter Chain Probe ===\n");

    let config = match std::env::args().nth(1) {
        Some(path) => Config::load(path)?,
        None => Config::default(),
    };

    let node_config = config.node_config();
    if let NodeConfig::Remote(remote) = &node_config {
        println!("RPC:  {}", remote.rpc.address);
        println!("gRPC: {}", remote.grpc.address);
    }
    let node = build_node(&node_config, ModuleRegistry::standard())?;

    println!("=== Status ===");
    match node.status().await {
        Ok(status) => {
            println!("✅ chain id: {}", status.node_info.network);
            println!("  latest height: {}", status.sync_info.latest_block_height);
            println!("  catching up: {}", status.sync_info.catching_up);
        }
        Err(e) => println!("❌ status failed: {}", e),
    }

    println!("\n=== Genesis ===");
    match node.genesis().await {
        Ok(genesis) => {
            println!("✅ genesis time: {}", genesis.genesis_time);
            println!("  initial height: {}", genesis.initial_height);
        }
        Err(e) => println!("❌ genesis failed: {}", e),
    }

    println!("\n=== Validators ===");
    match node.validators(0).await {
        Ok(set) => {
            println!("✅ {} validators at height {}", set.total, set.block_height);
            for v in set.validators.iter().take(5) {
                println!("  {} power {}", v.address, v.voting_power);
            }
        }
        Err(e) => println!("❌ validators failed: {}", e),
    }

    println!("\n=== Staking ===");
    match node.staking_pool().await {
        Ok(pool) => println!("✅ bonded {} / not bonded {}", pool.bonded_tokens, pool.not_bonded_tokens),
        Err(e) => println!("❌ pool failed: {}", e),
    }
    match node.token_supply(&config.chain.gas_price_denom).await {
        Ok(supply) => println!("✅ supply {}{}", supply, config.chain.gas_price_denom),
        Err(e) => println!("❌ supply failed: {}", e),
    }

    println!("\n=== Index module ===");
    match node.query_datasets(None).await {
        Ok(response) => {
            println!("✅ {} datasets", response.datasets.len());
            for dataset in response.datasets.iter().take(5) {
                println!("  {} by {}", dataset.dataset_name, dataset.creator);
            }
        }
        Err(e) => println!("❌ datasets failed: {}", e),
    }

    if node.is_remote() {
        node.stop()?;
    }
    println!("\nDone.");
    Ok(())
}
