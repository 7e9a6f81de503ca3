use anyhow::{bail, Result};
use clap::{Parser, Subcommand};
use std::path::Path;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use glitter_sdk::chain::ModuleRegistry;
use glitter_sdk::client::{ListTablesFilter, LcdClient};
use glitter_sdk::config::Config;
use glitter_sdk::node::{build_node, Node};

/// Upper bound for `subscribe-blocks --count`
const MAX_BLOCKS: usize = 10_000;

#[derive(Parser)]
#[command(name = "glitter")]
#[command(about = "Command line client for the Glitter chain", version)]
struct Cli {
    /// Configuration file path
    #[arg(short, long, global = true, default_value = "glitter.toml", env = "GLITTER_CONFIG")]
    config: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a default configuration file
    Init {
        /// Output path for config file
        #[arg(short, long, default_value = "glitter.toml")]
        output: String,
    },

    /// Print the address of the configured key (mnemonic from GLITTER_MNEMONIC)
    Address,

    /// Node status
    Status,

    /// Genesis document, fetched in chunks when the node asks for it
    Genesis,

    /// Validator set at a height (0 = latest)
    Validators {
        #[arg(long, default_value = "0")]
        height: i64,
    },

    /// Account number and sequence
    Account { address: String },

    /// Transaction by hash
    Tx { hash: String },

    /// Run a read-only SQL statement
    Query { sql: String },

    /// Execute a SQL statement in a transaction
    Exec { sql: String },

    ListTables {
        #[arg(long, default_value = "")]
        keyword: String,
        #[arg(long, default_value = "")]
        database: String,
        #[arg(long)]
        page: Option<u32>,
        #[arg(long)]
        page_size: Option<u32>,
    },

    ListDatabases {
        /// Only databases created by this address
        #[arg(long, default_value = "")]
        creator: String,
    },

    /// Print new blocks as they are committed
    SubscribeBlocks {
        #[arg(short = 'n', long, default_value = "10")]
        count: usize,
    },
}

fn load_config(path: &str) -> Result<Config> {
    if Path::new(path).exists() {
        Config::load(path)
    } else {
        warn!("{} not found, using defaults", path);
        Ok(Config::default())
    }
}

fn lcd_client(config: &Config) -> Result<LcdClient> {
    let wallet = config.wallet()?;
    Ok(LcdClient::new(
        config.chain.chain_id.clone(),
        wallet,
        config.client_options(),
    )?)
}

fn node(config: &Config) -> Result<Node> {
    let node = build_node(&config.node_config(), ModuleRegistry::standard())?;
    if !node.is_remote() {
        bail!("rpc_address and grpc_address must be set in [chain] for node commands");
    }
    Ok(node)
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glitter_sdk=info,glitter=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    if let Commands::Init { output } = &cli.command {
        let config = Config::default();
        config.save(output)?;
        info!("Configuration file created at: {}", output);
        return Ok(());
    }

    let config = load_config(&cli.config)?;

    match cli.command {
        Commands::Init { .. } => {}
        Commands::Address => {
            let wallet = config.wallet()?;
            println!("{}", wallet.address);
            println!("{}", wallet.evm_address()?);
        }
        Commands::Status => {
            let node = node(&config)?;
            print_json(&node.status().await?)?;
            node.stop()?;
        }
        Commands::Genesis => {
            let node = node(&config)?;
            print_json(&node.genesis().await?)?;
            node.stop()?;
        }
        Commands::Validators { height } => {
            let node = node(&config)?;
            print_json(&node.validators(height).await?)?;
            node.stop()?;
        }
        Commands::Account { address } => {
            let node = node(&config)?;
            let account = node.account(&address).await?;
            println!("address:        {}", account.address);
            println!("account_number: {}", account.account_number);
            println!("sequence:       {}", account.sequence);
            node.stop()?;
        }
        Commands::Tx { hash } => {
            let node = node(&config)?;
            let tx = node.tx(&hash).await?;
            println!("hash:   {}", tx.hash);
            println!("height: {}", tx.height);
            println!("code:   {}", tx.response.code);
            for message in &tx.messages {
                println!("msg:    {:?}", message);
            }
            node.stop()?;
        }
        Commands::Query { sql } => {
            let client = lcd_client(&config)?;
            print_json(&client.query(&sql, &[]).await?)?;
        }
        Commands::Exec { sql } => {
            let client = lcd_client(&config)?;
            let response = client.sql_exec(&sql, Vec::new()).await?;
            info!("Transaction {} accepted at height {}", response.txhash, response.height);
            println!("{}", response.txhash);
        }
        Commands::ListTables { keyword, database, page, page_size } => {
            let client = lcd_client(&config)?;
            let filter = ListTablesFilter {
                keyword,
                database,
                page,
                page_size,
                ..Default::default()
            };
            print_json(&client.list_tables(&filter).await?)?;
        }
        Commands::ListDatabases { creator } => {
            let client = lcd_client(&config)?;
            print_json(&client.list_databases(&creator).await?)?;
        }
        Commands::SubscribeBlocks { count } => {
            if count == 0 || count > MAX_BLOCKS {
                bail!("Block count must be between 1 and {}", MAX_BLOCKS);
            }
            let node = node(&config)?;
            let (mut events, handle) = node.subscribe_new_blocks().await?;
            info!("Waiting for {} blocks", count);
            for _ in 0..count {
                let Some(event) = events.recv().await else {
                    warn!("Subscription closed by the node");
                    break;
                };
                let height = &event.data["value"]["block"]["header"]["height"];
                println!("block {}", height);
            }
            handle.cancel();
            node.stop()?;
        }
    }

    Ok(())
}
