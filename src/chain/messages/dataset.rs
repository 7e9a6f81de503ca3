use super::TxMessage;

/// Serving state of a dataset's hosts
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ServiceStatus {
    Unspecified = 0,
    Offline = 1,
    Online = 2,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct CreateDatasetRequest {
    #[prost(string, tag = "1")]
    pub from: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub dataset_name: ::prost::alloc::string::String,
    #[prost(enumeration = "ServiceStatus", tag = "3")]
    pub work_status: i32,
    #[prost(string, tag = "4")]
    pub hosts: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub manage_addresses: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub description: ::prost::alloc::string::String,
    /// Lease length in seconds
    #[prost(int64, tag = "7")]
    pub duration: i64,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EditDatasetRequest {
    #[prost(string, tag = "1")]
    pub from: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub dataset_name: ::prost::alloc::string::String,
    #[prost(enumeration = "ServiceStatus", tag = "3")]
    pub work_status: i32,
    #[prost(string, tag = "4")]
    pub hosts: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub manage_addresses: ::prost::alloc::string::String,
    #[prost(string, tag = "6")]
    pub description: ::prost::alloc::string::String,
}

/// Replace the JSON description attached to one table of a dataset
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct EditTableRequest {
    #[prost(string, tag = "1")]
    pub from: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub dataset_name: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub table_name: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub description: ::prost::alloc::string::String,
}

#[derive(Clone, PartialEq, ::prost::Message)]
pub struct RenewalDatasetRequest {
    #[prost(string, tag = "1")]
    pub from: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub dataset_name: ::prost::alloc::string::String,
    #[prost(int64, tag = "3")]
    pub duration: i64,
}

impl TxMessage for CreateDatasetRequest {
    const TYPE_URL: &'static str = "/glitterchain.index.CreateDatasetRequest";
}

impl TxMessage for EditDatasetRequest {
    const TYPE_URL: &'static str = "/glitterchain.index.EditDatasetRequest";
}

impl TxMessage for EditTableRequest {
    const TYPE_URL: &'static str = "/glitterchain.index.EditTableRequest";
}

impl TxMessage for RenewalDatasetRequest {
    const TYPE_URL: &'static str = "/glitterchain.index.RenewalDatasetRequest";
}
