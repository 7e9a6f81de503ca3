//! In-memory `TxEndpoint` for unit tests.

use std::sync::Mutex;

use async_trait::async_trait;

use super::endpoint::{GasInfo, TxEndpoint, TxResponse};
use crate::chain::account_types::AccountInfo;
use crate::error::{Error, Result};

#[derive(Debug, Default)]
pub(crate) struct Calls {
    pub loads: usize,
    pub simulations: usize,
    pub broadcasts: Vec<Vec<u8>>,
    pub simulated: Vec<Vec<u8>>,
}

#[derive(Debug)]
struct State {
    account: AccountInfo,
    /// loads left before a broadcast's sequence bump becomes visible
    pending_bump: Option<usize>,
    calls: Calls,
}

pub(crate) struct MockEndpoint {
    state: Mutex<State>,
    gas_used: u64,
    simulate_status: Option<u16>,
    broadcast_code: u32,
    /// `None` keeps broadcasts invisible to later account loads
    bump_lag: Option<usize>,
}

impl MockEndpoint {
    pub fn new(account_number: u64, sequence: u64) -> Self {
        Self {
            state: Mutex::new(State {
                account: AccountInfo {
                    address: String::new(),
                    account_number,
                    sequence,
                },
                pending_bump: None,
                calls: Calls::default(),
            }),
            gas_used: 100_000,
            simulate_status: None,
            broadcast_code: 0,
            bump_lag: None,
        }
    }

    pub fn gas_used(mut self, gas_used: u64) -> Self {
        self.gas_used = gas_used;
        self
    }

    pub fn failing_simulation(mut self, status: u16) -> Self {
        self.simulate_status = Some(status);
        self
    }

    pub fn broadcast_code(mut self, code: u32) -> Self {
        self.broadcast_code = code;
        self
    }

    pub fn bump_after_loads(mut self, lag: usize) -> Self {
        self.bump_lag = Some(lag);
        self
    }

    pub fn with_calls<R>(&self, f: impl FnOnce(&Calls) -> R) -> R {
        let state = self.state.lock().unwrap();
        f(&state.calls)
    }
}

#[async_trait]
impl TxEndpoint for MockEndpoint {
    async fn load_account(&self, address: &str) -> Result<AccountInfo> {
        let mut state = self.state.lock().unwrap();
        state.calls.loads += 1;
        match state.pending_bump {
            Some(0) => {
                state.account.sequence += 1;
                state.pending_bump = None;
            }
            Some(n) => state.pending_bump = Some(n - 1),
            None => {}
        }
        let mut info = state.account.clone();
        info.address = address.to_string();
        Ok(info)
    }

    async fn simulate(&self, tx_bytes: Vec<u8>) -> Result<GasInfo> {
        let mut state = self.state.lock().unwrap();
        state.calls.simulations += 1;
        state.calls.simulated.push(tx_bytes);
        if let Some(status) = self.simulate_status {
            return Err(Error::Simulation { status, body: "simulation failed".into() });
        }
        Ok(GasInfo { gas_wanted: 0, gas_used: self.gas_used })
    }

    async fn broadcast(&self, tx_bytes: Vec<u8>) -> Result<TxResponse> {
        let mut state = self.state.lock().unwrap();
        let count = state.calls.broadcasts.len();
        state.calls.broadcasts.push(tx_bytes);
        if self.broadcast_code == 0 {
            state.pending_bump = self.bump_lag;
        }
        Ok(TxResponse {
            txhash: format!("{:064X}", count),
            code: self.broadcast_code,
            codespace: if self.broadcast_code == 0 { String::new() } else { "sdk".into() },
            raw_log: if self.broadcast_code == 0 { "[]".into() } else { "account sequence mismatch".into() },
            ..TxResponse::default()
        })
    }
}
