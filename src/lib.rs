//! Client SDK for the Glitter chain.
//!
//! [`client::LcdClient`] builds, simulates, signs and broadcasts
//! transactions and fronts the SQL index; [`node::Node`] reads the chain over
//! JSON-RPC and gRPC; [`gateway::GatewayClient`] talks to the document
//! gateway.

pub mod chain;
pub mod client;
pub mod config;
pub mod error;
pub mod gateway;
pub mod node;
pub mod utils;

pub use chain::{KeyAlgorithm, ModuleRegistry, Wallet};
pub use client::{ClientOptions, CreateTxOptions, LcdClient};
pub use error::{Error, Result, ScanError};
pub use gateway::GatewayClient;
pub use node::{build_node, Node, NodeConfig};
