use super::TxMessage;

/// Lock `amount` of the staking denom behind a dataset to obtain query capacity
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct PledgeRequest {
    #[prost(string, tag = "1")]
    pub from: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub dataset_name: ::prost::alloc::string::String,
    /// Integer amount rendered in base-10
    #[prost(string, tag = "3")]
    pub amount: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReleasePledgeRequest {
    #[prost(string, tag = "1")]
    pub from: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub dataset_name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub amount: ::prost::alloc::string::String,
}

impl TxMessage for PledgeRequest {
    const TYPE_URL: &'static str = "/glitterchain.consumer.PledgeRequest";
}

impl TxMessage for ReleasePledgeRequest {
    const TYPE_URL: &'static str = "/glitterchain.consumer.ReleasePledgeRequest";
}
