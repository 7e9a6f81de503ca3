/// Polymorphic account handling for the auth module.
///
/// Accounts arrive wrapped, either as a protobuf `Any` from gRPC or as an
/// `"@type"`-tagged JSON object from the REST gateway. Both shapes resolve to
/// an [`AccountInfo`] holding the number and sequence needed for signing.

use prost::Message;
use serde_json::Value;

use crate::chain::proto::{
    cosmos::vesting::v1beta1::{
        BaseVestingAccount, ContinuousVestingAccount, DelayedVestingAccount,
        PeriodicVestingAccount, PermanentLockedAccount,
    },
    ethermint::types::v1::EthAccount,
    BaseAccount, ETH_ACCOUNT_TYPE_URL,
};
use crate::error::{Error, Result};

/// Every account type the chain can hand back from an auth query
#[derive(Debug, Clone)]
pub enum Account {
    Base(BaseAccount),

    BaseVesting(BaseVestingAccount),
    ContinuousVesting(ContinuousVestingAccount),
    DelayedVesting(DelayedVestingAccount),
    PeriodicVesting(PeriodicVestingAccount),
    PermanentLocked(PermanentLockedAccount),

    // ethermint
    Eth(EthAccount),

    Unsupported {
        type_url: String,
        raw_value: Vec<u8>,
    },
}

/// Signing-relevant fields shared by all account types
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountInfo {
    pub address: String,
    pub account_number: u64,
    pub sequence: u64,
}

impl From<&BaseAccount> for AccountInfo {
    fn from(base: &BaseAccount) -> Self {
        Self {
            address: base.address.clone(),
            account_number: base.account_number,
            sequence: base.sequence,
        }
    }
}

fn decode<M: Message + Default>(name: &str, value: &[u8]) -> Result<M> {
    M::decode(value).map_err(|e| Error::Encoding(format!("failed to decode {name}: {e}")))
}

impl Account {
    /// Decode a `google.protobuf.Any` account by its type url
    pub fn decode_any(type_url: &str, value: &[u8]) -> Result<Self> {
        let account = match type_url {
            "/cosmos.auth.v1beta1.BaseAccount" => Account::Base(decode("BaseAccount", value)?),
            "/cosmos.vesting.v1beta1.BaseVestingAccount" => {
                Account::BaseVesting(decode("BaseVestingAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.ContinuousVestingAccount" => {
                Account::ContinuousVesting(decode("ContinuousVestingAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.DelayedVestingAccount" => {
                Account::DelayedVesting(decode("DelayedVestingAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.PeriodicVestingAccount" => {
                Account::PeriodicVesting(decode("PeriodicVestingAccount", value)?)
            }
            "/cosmos.vesting.v1beta1.PermanentLockedAccount" => {
                Account::PermanentLocked(decode("PermanentLockedAccount", value)?)
            }
            ETH_ACCOUNT_TYPE_URL => Account::Eth(decode("EthAccount", value)?),
            unsupported_type => {
                log::warn!("Encountered unsupported account type: {}", unsupported_type);
                Account::Unsupported {
                    type_url: unsupported_type.to_string(),
                    raw_value: value.to_vec(),
                }
            }
        };

        Ok(account)
    }

    /// Extract the common fields, `None` when the account carries no base account
    pub fn get_account_info(&self) -> Option<AccountInfo> {
        fn through_vesting(bva: &Option<BaseVestingAccount>) -> Option<AccountInfo> {
            bva.as_ref()
                .and_then(|bva| bva.base_account.as_ref())
                .map(AccountInfo::from)
        }

        match self {
            Account::Base(acc) => Some(AccountInfo::from(acc)),
            Account::Eth(acc) => acc.base_account.as_ref().map(AccountInfo::from),
            Account::BaseVesting(acc) => acc.base_account.as_ref().map(AccountInfo::from),
            Account::ContinuousVesting(acc) => through_vesting(&acc.base_vesting_account),
            Account::DelayedVesting(acc) => through_vesting(&acc.base_vesting_account),
            Account::PeriodicVesting(acc) => through_vesting(&acc.base_vesting_account),
            Account::PermanentLocked(acc) => through_vesting(&acc.base_vesting_account),
            Account::Unsupported { .. } => None,
        }
    }

    pub fn account_type(&self) -> &'static str {
        match self {
            Account::Base(_) => "BaseAccount",
            Account::BaseVesting(_) => "BaseVestingAccount",
            Account::ContinuousVesting(_) => "ContinuousVestingAccount",
            Account::DelayedVesting(_) => "DelayedVestingAccount",
            Account::PeriodicVesting(_) => "PeriodicVestingAccount",
            Account::PermanentLocked(_) => "PermanentLockedAccount",
            Account::Eth(_) => "EthAccount",
            Account::Unsupported { .. } => "UnsupportedAccount",
        }
    }

    pub fn is_supported(&self) -> bool {
        !matches!(self, Account::Unsupported { .. })
    }
}

/// Read an account from the REST form `{"account": {"@type": ..., ...}}`.
///
/// The base account may sit at the top level, under `base_account`, or under
/// `base_vesting_account.base_account`; all of these are accepted.
pub fn account_info_from_json(body: &Value) -> Result<(String, AccountInfo)> {
    let account = body
        .get("account")
        .ok_or_else(|| Error::Encoding("response has no account field".into()))?;
    let type_url = account
        .get("@type")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    let base = find_base_account(account).ok_or_else(|| {
        Error::Encoding(format!("account of type {type_url:?} has no base account"))
    })?;

    let info = AccountInfo {
        address: base
            .get("address")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        account_number: json_u64(base.get("account_number"))?,
        sequence: json_u64(base.get("sequence"))?,
    };
    Ok((type_url, info))
}

fn find_base_account(value: &Value) -> Option<&Value> {
    if value.get("account_number").is_some() {
        return Some(value);
    }
    value
        .get("base_account")
        .and_then(find_base_account)
        .or_else(|| value.get("base_vesting_account").and_then(find_base_account))
}

/// Cosmos JSON renders uint64 as a string; a missing field means zero.
fn json_u64(value: Option<&Value>) -> Result<u64> {
    match value {
        None | Some(Value::Null) => Ok(0),
        Some(Value::Number(n)) => n
            .as_u64()
            .ok_or_else(|| Error::Encoding(format!("expected unsigned integer, got {n}"))),
        Some(Value::String(s)) => s
            .parse()
            .map_err(|_| Error::Encoding(format!("expected unsigned integer, got {s:?}"))),
        Some(other) => Err(Error::Encoding(format!("expected unsigned integer, got {other}"))),
    }
}
