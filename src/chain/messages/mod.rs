mod dataset;
mod pledge;
mod sql;

pub use dataset::{
    CreateDatasetRequest, EditDatasetRequest, EditTableRequest, RenewalDatasetRequest,
    ServiceStatus,
};
pub use pledge::{PledgeRequest, ReleasePledgeRequest};
pub use sql::{Argument, ArgumentType, SqlExecRequest, SqlGrantRequest, SqlValue};

use prost::Message;

use crate::chain::proto::{cosmos, Any};

/// A message that can be placed in a transaction body
pub trait TxMessage: Message + Sized {
    /// Fully qualified type url, e.g. `/cosmos.bank.v1beta1.MsgSend`
    const TYPE_URL: &'static str;

    fn to_any(&self) -> Any {
        Any {
            type_url: Self::TYPE_URL.to_string(),
            value: self.encode_to_vec(),
        }
    }
}

macro_rules! impl_tx_message {
    ($($ty:ty => $url:literal),* $(,)?) => {
        $(impl TxMessage for $ty {
            const TYPE_URL: &'static str = $url;
        })*
    };
}

impl_tx_message! {
    cosmos::bank::v1beta1::MsgSend => "/cosmos.bank.v1beta1.MsgSend",
    cosmos::bank::v1beta1::MsgMultiSend => "/cosmos.bank.v1beta1.MsgMultiSend",
    cosmos::staking::v1beta1::MsgDelegate => "/cosmos.staking.v1beta1.MsgDelegate",
    cosmos::staking::v1beta1::MsgUndelegate => "/cosmos.staking.v1beta1.MsgUndelegate",
    cosmos::staking::v1beta1::MsgBeginRedelegate => "/cosmos.staking.v1beta1.MsgBeginRedelegate",
    cosmos::staking::v1beta1::MsgCreateValidator => "/cosmos.staking.v1beta1.MsgCreateValidator",
    cosmos::staking::v1beta1::MsgEditValidator => "/cosmos.staking.v1beta1.MsgEditValidator",
    cosmos::distribution::v1beta1::MsgWithdrawDelegatorReward => "/cosmos.distribution.v1beta1.MsgWithdrawDelegatorReward",
    cosmos::distribution::v1beta1::MsgWithdrawValidatorCommission => "/cosmos.distribution.v1beta1.MsgWithdrawValidatorCommission",
    cosmos::distribution::v1beta1::MsgSetWithdrawAddress => "/cosmos.distribution.v1beta1.MsgSetWithdrawAddress",
    cosmos::gov::v1beta1::MsgVote => "/cosmos.gov.v1beta1.MsgVote",
    cosmos::gov::v1beta1::MsgDeposit => "/cosmos.gov.v1beta1.MsgDeposit",
    cosmos::slashing::v1beta1::MsgUnjail => "/cosmos.slashing.v1beta1.MsgUnjail",
    cosmos::feegrant::v1beta1::MsgGrantAllowance => "/cosmos.feegrant.v1beta1.MsgGrantAllowance",
    cosmos::feegrant::v1beta1::MsgRevokeAllowance => "/cosmos.feegrant.v1beta1.MsgRevokeAllowance",
}
