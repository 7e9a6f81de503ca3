/// Request/response types of the Glitter `index` and `consumer` query services.
///
/// The chain serves these over gRPC next to the Cosmos modules. They are
/// invoked through a generic unary call (see `node::remote`), so only the
/// message types and method paths live here.

use crate::chain::proto::{PageRequest, PageResponse};

pub const QUERY_DATASET: &str = "/glitterchain.index.Query/QueryDateset";
pub const QUERY_DATASETS: &str = "/glitterchain.index.Query/QueryDatesets";
pub const QUERY_DATASET_EXPIRATIONS: &str = "/glitterchain.index.Query/QueryDatasetExpirations";
pub const QUERY_CPDT: &str = "/glitterchain.index.Query/QueryCPDT";
pub const QUERY_CPDTS: &str = "/glitterchain.index.Query/QueryCPDTs";
pub const QUERY_CONSUMER: &str = "/glitterchain.consumer.Query/QueryConsumer";
pub const QUERY_CONSUMERS: &str = "/glitterchain.consumer.Query/QueryConsumers";
pub const QUERY_RELEASING_CPDT: &str = "/glitterchain.consumer.Query/QueryReleasingCPDT";
pub const QUERY_RELEASING_CPDTS: &str = "/glitterchain.consumer.Query/QueryReleasingCPDTs";

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Dataset {
    #[prost(string, tag = "1")]
    pub dataset_name: ::prost::alloc::string::String,
    #[prost(enumeration = "crate::chain::messages::ServiceStatus", tag = "2")]
    pub work_status: i32,
    #[prost(string, tag = "3")]
    pub hosts: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub manage_addresses: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub description: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub creator: ::prost::alloc::string::String,
    /// Unix seconds
    #[prost(int64, tag = "7")]
    pub expired_at: i64,
    #[prost(string, tag = "8")]
    pub pledge_amount: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct DatasetExpiration {
    #[prost(string, tag = "1")]
    pub dataset_name: ::prost::alloc::string::String,
    #[prost(int64, tag = "2")]
    pub expired_at: i64,
}

/// Compute-power data token balance of an address
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Cpdt {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub amount: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct Consumer {
    #[prost(string, tag = "1")]
    pub dataset_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub address: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub amount: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct ReleasingCpdt {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub dataset_name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub amount: ::prost::alloc::string::String,
    #[prost(int64, tag = "4")]
    pub release_at: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryDatesetRequest {
    #[prost(string, tag = "1")]
    pub dataset_name: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryDatesetResponse {
    #[prost(message, optional, tag = "1")]
    pub dataset: ::core::option::Option<Dataset>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryDatesetsRequest {
    #[prost(message, optional, tag = "1")]
    pub pagination: ::core::option::Option<PageRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryDatesetsResponse {
    #[prost(message, repeated, tag = "1")]
    pub datasets: ::prost::alloc::vec::Vec<Dataset>,
    #[prost(message, optional, tag = "2")]
    pub pagination: ::core::option::Option<PageResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryDatasetExpirationsRequest {
    #[prost(message, optional, tag = "1")]
    pub pagination: ::core::option::Option<PageRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryDatasetExpirationsResponse {
    #[prost(message, repeated, tag = "1")]
    pub expirations: ::prost::alloc::vec::Vec<DatasetExpiration>,
    #[prost(message, optional, tag = "2")]
    pub pagination: ::core::option::Option<PageResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryCpdtRequest {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryCpdtResponse {
    #[prost(message, optional, tag = "1")]
    pub cpdt: ::core::option::Option<Cpdt>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryCpdtsRequest {
    #[prost(message, optional, tag = "1")]
    pub pagination: ::core::option::Option<PageRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryCpdtsResponse {
    #[prost(message, repeated, tag = "1")]
    pub cpdts: ::prost::alloc::vec::Vec<Cpdt>,
    #[prost(message, optional, tag = "2")]
    pub pagination: ::core::option::Option<PageResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryConsumerRequest {
    #[prost(string, tag = "1")]
    pub dataset_name: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub address: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryConsumerResponse {
    #[prost(message, optional, tag = "1")]
    pub consumer: ::core::option::Option<Consumer>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryConsumersRequest {
    #[prost(string, tag = "1")]
    pub dataset_name: ::prost::alloc::string::String,
    #[prost(message, optional, tag = "2")]
    pub pagination: ::core::option::Option<PageRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryConsumersResponse {
    #[prost(message, repeated, tag = "1")]
    pub consumers: ::prost::alloc::vec::Vec<Consumer>,
    #[prost(message, optional, tag = "2")]
    pub pagination: ::core::option::Option<PageResponse>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryReleasingCpdtRequest {
    #[prost(string, tag = "1")]
    pub address: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryReleasingCpdtResponse {
    #[prost(message, repeated, tag = "1")]
    pub releasing: ::prost::alloc::vec::Vec<ReleasingCpdt>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryReleasingCpdtsRequest {
    #[prost(message, optional, tag = "1")]
    pub pagination: ::core::option::Option<PageRequest>,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct QueryReleasingCpdtsResponse {
    #[prost(message, repeated, tag = "1")]
    pub releasing: ::prost::alloc::vec::Vec<ReleasingCpdt>,
    #[prost(message, optional, tag = "2")]
    pub pagination: ::core::option::Option<PageResponse>,
}
