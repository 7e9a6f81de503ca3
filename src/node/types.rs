//! Tendermint JSON-RPC result shapes.
//!
//! Only the fields the client reads are typed; nested structures that are
//! passed through untouched stay as `serde_json::Value`.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::chain::proto::{cosmos::base::abci::v1beta1::TxResponse as AbciTxResponse, Tx};
use crate::chain::registry::DecodedMsg;
use crate::utils::num::{i64_from_any, u32_from_any, u64_from_any};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeInfo {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub listen_addr: String,
    /// Chain id
    #[serde(default)]
    pub network: String,
    #[serde(default)]
    pub version: String,
    #[serde(default)]
    pub moniker: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SyncInfo {
    #[serde(default)]
    pub latest_block_hash: String,
    #[serde(default)]
    pub latest_app_hash: String,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub latest_block_height: i64,
    #[serde(default)]
    pub latest_block_time: String,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub earliest_block_height: i64,
    #[serde(default)]
    pub catching_up: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatorInfo {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub pub_key: Value,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub voting_power: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Status {
    #[serde(default)]
    pub node_info: NodeInfo,
    #[serde(default)]
    pub sync_info: SyncInfo,
    #[serde(default)]
    pub validator_info: ValidatorInfo,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GenesisDoc {
    #[serde(default)]
    pub genesis_time: String,
    #[serde(default)]
    pub chain_id: String,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub initial_height: i64,
    #[serde(default)]
    pub consensus_params: Value,
    #[serde(default)]
    pub validators: Value,
    #[serde(default)]
    pub app_hash: String,
    #[serde(default)]
    pub app_state: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct GenesisResult {
    pub genesis: GenesisDoc,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct GenesisChunk {
    #[serde(default, deserialize_with = "u32_from_any")]
    pub chunk: u32,
    #[serde(default, deserialize_with = "u32_from_any")]
    pub total: u32,
    /// base64 slice of the genesis JSON
    #[serde(default)]
    pub data: String,
}

/// Summary of the current consensus round
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RoundStateSimple {
    #[serde(rename = "height/round/step", default)]
    pub height_round_step: String,
    #[serde(default)]
    pub start_time: String,
    #[serde(default)]
    pub proposal_block_hash: String,
    #[serde(default)]
    pub locked_block_hash: String,
    #[serde(default)]
    pub valid_block_hash: String,
    #[serde(default)]
    pub height_vote_set: Value,
    #[serde(default)]
    pub proposer: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ConsensusStateResult {
    pub round_state: RoundStateSimple,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TmValidator {
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub pub_key: Value,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub voting_power: i64,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub proposer_priority: i64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Validators {
    #[serde(default, deserialize_with = "i64_from_any")]
    pub block_height: i64,
    #[serde(default)]
    pub validators: Vec<TmValidator>,
    #[serde(default, deserialize_with = "u64_from_any")]
    pub count: u64,
    #[serde(default, deserialize_with = "u64_from_any")]
    pub total: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockHeader {
    #[serde(default)]
    pub chain_id: String,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub height: i64,
    #[serde(default)]
    pub time: String,
    #[serde(default)]
    pub proposer_address: String,
    #[serde(default)]
    pub app_hash: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockData {
    /// base64 raw transactions
    #[serde(default, deserialize_with = "null_as_empty")]
    pub txs: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Block {
    #[serde(default)]
    pub header: BlockHeader,
    #[serde(default)]
    pub data: BlockData,
    #[serde(default)]
    pub evidence: Value,
    #[serde(default)]
    pub last_commit: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockResult {
    #[serde(default)]
    pub block_id: Value,
    #[serde(default)]
    pub block: Block,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockResults {
    #[serde(default, deserialize_with = "i64_from_any")]
    pub height: i64,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub txs_results: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub begin_block_events: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub end_block_events: Vec<Value>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub validator_updates: Vec<Value>,
    #[serde(default)]
    pub consensus_param_updates: Value,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxSearchItem {
    #[serde(default)]
    pub hash: String,
    #[serde(default, deserialize_with = "i64_from_any")]
    pub height: i64,
    #[serde(default, deserialize_with = "u32_from_any")]
    pub index: u32,
    #[serde(default)]
    pub tx_result: Value,
    #[serde(default)]
    pub tx: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TxSearch {
    #[serde(default)]
    pub txs: Vec<TxSearchItem>,
    #[serde(default, deserialize_with = "u64_from_any")]
    pub total_count: u64,
}

/// One event pushed over a websocket subscription
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResultEvent {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub data: Value,
    #[serde(default)]
    pub events: HashMap<String, Vec<String>>,
}

/// A transaction fetched over gRPC with its messages unpacked
#[derive(Debug)]
pub struct ChainTx {
    pub hash: String,
    pub height: i64,
    pub tx: Tx,
    pub response: AbciTxResponse,
    pub messages: Vec<DecodedMsg>,
}

fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}
