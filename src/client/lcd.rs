//! Transaction pipeline: build, fill in account data and gas, sign, broadcast.

use std::sync::Mutex;

use rust_decimal::Decimal;
use tokio::time::{sleep, Instant};

use super::endpoint::{RestEndpoint, TxEndpoint, TxResponse};
use super::gas::{adjusted_gas_limit, coins_are_zero, GasPrice};
use super::options::{ClientOptions, SettlePolicy};
use crate::chain::account_types::AccountInfo;
use crate::chain::proto::{Any, Coin};
use crate::chain::tx_builder::{SignMode, SignedTx, SignerData, TxDraft};
use crate::chain::wallet::Wallet;
use crate::error::{Error, Result};

/// Per-transaction inputs. Zero / empty fields are filled in by the client:
/// account number or sequence ⇒ account load, gas limit ⇒ simulation,
/// fee ⇒ gas price × gas limit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CreateTxOptions {
    pub msgs: Vec<Any>,
    pub memo: String,
    pub account_number: u64,
    pub sequence: u64,
    pub gas_limit: u64,
    pub fee_amount: Vec<Coin>,
    pub sign_mode: SignMode,
    pub fee_granter: String,
    pub timeout_height: u64,
}

impl CreateTxOptions {
    pub fn new(msgs: Vec<Any>) -> Self {
        Self {
            msgs,
            ..Self::default()
        }
    }
}

/// Signs and submits transactions for one wallet on one chain
pub struct LcdClient<E = RestEndpoint> {
    endpoint: E,
    chain_id: String,
    wallet: Wallet,
    gas_price: GasPrice,
    gas_adjustment: Decimal,
    settle: Option<SettlePolicy>,
    last_broadcast_sequence: Mutex<Option<u64>>,
}

impl LcdClient<RestEndpoint> {
    pub fn new(chain_id: impl Into<String>, wallet: Wallet, options: ClientOptions) -> Result<Self> {
        let endpoint = RestEndpoint::new(options.endpoint.clone(), options.timeout)?;
        log::info!("LCD client for {} at {}", wallet.address, endpoint.base_url());
        Ok(Self::with_endpoint(endpoint, chain_id, wallet, &options))
    }
}

impl<E: TxEndpoint> LcdClient<E> {
    pub fn with_endpoint(endpoint: E, chain_id: impl Into<String>, wallet: Wallet, options: &ClientOptions) -> Self {
        Self {
            endpoint,
            chain_id: chain_id.into(),
            wallet,
            gas_price: options.gas_price.clone(),
            gas_adjustment: options.gas_adjustment,
            settle: options.settle,
            last_broadcast_sequence: Mutex::new(None),
        }
    }

    /// Bech32 address of the signer
    pub fn address(&self) -> &str {
        &self.wallet.address
    }

    pub fn chain_id(&self) -> &str {
        &self.chain_id
    }

    pub fn endpoint(&self) -> &E {
        &self.endpoint
    }

    pub fn gas_price(&self) -> &GasPrice {
        &self.gas_price
    }

    pub fn gas_adjustment(&self) -> Decimal {
        self.gas_adjustment
    }

    pub async fn create_and_sign_tx(&self, options: CreateTxOptions) -> Result<SignedTx> {
        let mut draft = TxDraft::new();
        draft.set_fee_granter(options.fee_granter);
        draft.set_gas_limit(options.gas_limit);
        draft.set_memo(options.memo);
        draft.set_timeout_height(options.timeout_height);
        draft.set_msgs(options.msgs)?;

        let sign_mode = options.sign_mode.resolve();

        let (account_number, sequence) = if options.account_number == 0 || options.sequence == 0 {
            let account = self.load_account().await.map_err(Error::account_load)?;
            (account.account_number, account.sequence)
        } else {
            (options.account_number, options.sequence)
        };

        let gas_limit = if options.gas_limit == 0 {
            let tx_bytes = draft.simulation_bytes(sequence, sign_mode)?;
            let gas_info = self.endpoint.simulate(tx_bytes).await.map_err(Error::gas_estimation)?;
            let limit = adjusted_gas_limit(gas_info.gas_used, self.gas_adjustment).map_err(Error::gas_estimation)?;
            log::debug!("simulated gas_used={} gas_limit={}", gas_info.gas_used, limit);
            draft.set_gas_limit(limit);
            limit
        } else {
            options.gas_limit
        };

        if coins_are_zero(&options.fee_amount) {
            draft.set_fee_amount(vec![self.gas_price.fee_for(gas_limit)?]);
        } else {
            draft.set_fee_amount(options.fee_amount);
        }

        let signer = SignerData {
            account_number,
            chain_id: self.chain_id.clone(),
            sequence,
        };
        draft.sign(&self.wallet, &signer, sign_mode).map_err(Error::signing)
    }

    /// Submit a signed transaction; a non-zero result code is an error
    pub async fn broadcast(&self, signed: &SignedTx) -> Result<TxResponse> {
        let response = self.endpoint.broadcast(signed.to_bytes()).await?;
        if !response.is_success() {
            log::warn!(
                "tx {} rejected: code={} codespace={} log={}",
                response.txhash,
                response.code,
                response.codespace,
                response.raw_log
            );
            return Err(Error::Broadcast {
                code: response.code,
                codespace: response.codespace,
                raw_log: response.raw_log,
                txhash: response.txhash,
            });
        }

        if let Ok(mut last) = self.last_broadcast_sequence.lock() {
            *last = Some(signed.sequence());
        }
        log::info!("broadcast tx {} (sequence {})", response.txhash, signed.sequence());
        Ok(response)
    }

    pub async fn sign_and_broadcast_tx(&self, options: CreateTxOptions) -> Result<TxResponse> {
        let signed = self.create_and_sign_tx(options).await?;
        self.broadcast(&signed).await
    }

    /// Read the signer's account, waiting out our own last broadcast when a
    /// settle policy is configured
    pub async fn load_account(&self) -> Result<AccountInfo> {
        let mut account = self.endpoint.load_account(self.address()).await?;

        let Some(policy) = self.settle else {
            return Ok(account);
        };
        let Some(broadcast_sequence) = self.last_broadcast_sequence.lock().ok().and_then(|s| *s) else {
            return Ok(account);
        };

        let deadline = Instant::now() + policy.timeout;
        while account.sequence <= broadcast_sequence {
            if Instant::now() >= deadline {
                log::warn!(
                    "account {} still at sequence {} after {:?}, broadcast used {}",
                    self.address(),
                    account.sequence,
                    policy.timeout,
                    broadcast_sequence
                );
                break;
            }
            sleep(policy.interval).await;
            account = self.endpoint.load_account(self.address()).await?;
        }
        Ok(account)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use prost::Message;

    use super::*;
    use crate::chain::messages::{SqlExecRequest, TxMessage};
    use crate::chain::proto::{AuthInfo, TxRaw};
    use crate::client::mock::MockEndpoint;

    const MNEMONIC: &str = "abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon abandon about";

    fn client(endpoint: MockEndpoint, options: ClientOptions) -> LcdClient<MockEndpoint> {
        let wallet = Wallet::from_mnemonic_no_passphrase(MNEMONIC).unwrap();
        LcdClient::with_endpoint(endpoint, "glitter_12000-2", wallet, &options)
    }

    fn exec_msg() -> Any {
        SqlExecRequest { uid: "glitter1u".into(), sql: "INSERT INTO db.t (a) VALUES (?)".into(), arguments: vec![] }.to_any()
    }

    #[tokio::test]
    async fn test_explicit_values_skip_load_and_simulation() {
        let lcd = client(MockEndpoint::new(9, 9), ClientOptions::default());
        let options = CreateTxOptions {
            account_number: 4,
            sequence: 11,
            gas_limit: 150_000,
            ..CreateTxOptions::new(vec![exec_msg()])
        };
        let signed = lcd.create_and_sign_tx(options).await.unwrap();

        lcd.endpoint().with_calls(|c| {
            assert_eq!(c.loads, 0);
            assert_eq!(c.simulations, 0);
        });
        assert_eq!(signed.sequence(), 11);
        let fee = signed.auth_info().unwrap().fee.unwrap();
        assert_eq!(fee.gas_limit, 150_000);
        assert_eq!(fee.amount[0].amount, "150000");
    }

    #[tokio::test]
    async fn test_auto_fill_loads_and_simulates_once() {
        let lcd = client(MockEndpoint::new(12, 5).gas_used(80_001), ClientOptions::default());
        let signed = lcd.create_and_sign_tx(CreateTxOptions::new(vec![exec_msg()])).await.unwrap();

        lcd.endpoint().with_calls(|c| {
            assert_eq!(c.loads, 1);
            assert_eq!(c.simulations, 1);
            let raw = TxRaw::decode(&c.simulated[0][..]).unwrap();
            let auth = AuthInfo::decode(&raw.auth_info_bytes[..]).unwrap();
            assert_eq!(auth.signer_infos[0].sequence, 5);
        });
        assert_eq!(signed.sequence(), 5);
        let fee = signed.auth_info().unwrap().fee.unwrap();
        // ceil(80001 * 2.5)
        assert_eq!(fee.gas_limit, 200_003);
        assert_eq!(fee.amount[0].amount, "200003");
        assert_eq!(fee.amount[0].denom, "agli");
    }

    #[tokio::test]
    async fn test_zero_sequence_alone_triggers_load() {
        let lcd = client(MockEndpoint::new(12, 5), ClientOptions::default());
        let options = CreateTxOptions { account_number: 3, gas_limit: 1, ..CreateTxOptions::new(vec![exec_msg()]) };
        let signed = lcd.create_and_sign_tx(options).await.unwrap();
        lcd.endpoint().with_calls(|c| assert_eq!(c.loads, 1));
        assert_eq!(signed.sequence(), 5);
    }

    #[tokio::test]
    async fn test_caller_fee_is_kept() {
        let lcd = client(MockEndpoint::new(1, 1), ClientOptions::default());
        let fee = vec![Coin { denom: "agli".into(), amount: "42".into() }];
        let options = CreateTxOptions { fee_amount: fee.clone(), ..CreateTxOptions::new(vec![exec_msg()]) };
        let signed = lcd.create_and_sign_tx(options).await.unwrap();
        assert_eq!(signed.auth_info().unwrap().fee.unwrap().amount, fee);
    }

    #[tokio::test]
    async fn test_simulation_failure_stops_the_pipeline() {
        let lcd = client(MockEndpoint::new(1, 1).failing_simulation(500), ClientOptions::default());
        let err = lcd.sign_and_broadcast_tx(CreateTxOptions::new(vec![exec_msg()])).await.unwrap_err();
        assert!(matches!(err, Error::GasEstimation { .. }));
        lcd.endpoint().with_calls(|c| assert!(c.broadcasts.is_empty()));
    }

    #[tokio::test]
    async fn test_empty_messages_are_rejected_before_any_call() {
        let lcd = client(MockEndpoint::new(1, 1), ClientOptions::default());
        let err = lcd.create_and_sign_tx(CreateTxOptions::default()).await.unwrap_err();
        assert!(matches!(err, Error::InvalidArgument(_)));
        lcd.endpoint().with_calls(|c| assert_eq!(c.loads, 0));
    }

    #[tokio::test]
    async fn test_rejected_broadcast_surfaces_code() {
        let lcd = client(MockEndpoint::new(1, 1).broadcast_code(32), ClientOptions::default());
        let err = lcd.sign_and_broadcast_tx(CreateTxOptions::new(vec![exec_msg()])).await.unwrap_err();
        match err {
            Error::Broadcast { code, codespace, .. } => {
                assert_eq!(code, 32);
                assert_eq!(codespace, "sdk");
            }
            other => panic!("unexpected error {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_without_settle_policy_sequence_is_reused() {
        let lcd = client(MockEndpoint::new(1, 7), ClientOptions::default());
        let first = lcd.create_and_sign_tx(CreateTxOptions::new(vec![exec_msg()])).await.unwrap();
        lcd.broadcast(&first).await.unwrap();
        let second = lcd.create_and_sign_tx(CreateTxOptions::new(vec![exec_msg()])).await.unwrap();
        assert_eq!(first.sequence(), 7);
        assert_eq!(second.sequence(), 7);
    }

    #[tokio::test]
    async fn test_settle_policy_waits_for_increment() {
        let settle = SettlePolicy::new(Duration::from_secs(2), Duration::from_millis(5));
        let lcd = client(
            MockEndpoint::new(1, 7).bump_after_loads(2),
            ClientOptions::default().with_settle_policy(settle),
        );
        let first = lcd.create_and_sign_tx(CreateTxOptions::new(vec![exec_msg()])).await.unwrap();
        lcd.broadcast(&first).await.unwrap();
        let second = lcd.create_and_sign_tx(CreateTxOptions::new(vec![exec_msg()])).await.unwrap();

        assert_eq!(second.sequence(), 8);
        // one load for the first tx, three polls for the second
        lcd.endpoint().with_calls(|c| assert_eq!(c.loads, 4));
    }

    #[tokio::test]
    async fn test_settle_policy_gives_up_after_timeout() {
        let settle = SettlePolicy::new(Duration::from_millis(30), Duration::from_millis(5));
        let lcd = client(MockEndpoint::new(1, 7), ClientOptions::default().with_settle_policy(settle));
        let first = lcd.create_and_sign_tx(CreateTxOptions::new(vec![exec_msg()])).await.unwrap();
        lcd.broadcast(&first).await.unwrap();
        let second = lcd.create_and_sign_tx(CreateTxOptions::new(vec![exec_msg()])).await.unwrap();

        assert_eq!(second.sequence(), 7);
        lcd.endpoint().with_calls(|c| assert!(c.loads > 2));
    }
}
