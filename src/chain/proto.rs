/// Proto definitions used by the Glitter chain client.
///
/// Cosmos SDK types come from `cosmos-sdk-proto`. Ethermint types the chain
/// adds on top are declared here with prost derives since no published crate
/// ships them at a compatible prost version.

pub use cosmos_sdk_proto::cosmos;
pub use prost_types::Any;

pub use cosmos::auth::v1beta1::{
    query_client::QueryClient as AuthQueryClient, BaseAccount, QueryAccountRequest,
};
pub use cosmos::bank::v1beta1::{
    query_client::QueryClient as BankQueryClient, QueryBalanceRequest, QuerySupplyOfRequest,
};
pub use cosmos::base::query::v1beta1::{PageRequest, PageResponse};
pub use cosmos::base::v1beta1::Coin;
pub use cosmos::slashing::v1beta1::{
    query_client::QueryClient as SlashingQueryClient, QuerySigningInfosRequest,
    ValidatorSigningInfo,
};
pub use cosmos::staking::v1beta1::{
    query_client::QueryClient as StakingQueryClient, Pool, QueryPoolRequest,
    QueryValidatorsRequest, Validator,
};
pub use cosmos::tx::signing::v1beta1::SignMode as ProtoSignMode;
pub use cosmos::tx::v1beta1::{
    mode_info, service_client::ServiceClient, AuthInfo, Fee, GetTxRequest, ModeInfo, SignDoc,
    SignerInfo, Tx, TxBody, TxRaw,
};

pub mod ethermint {
    pub mod types {
        pub mod v1 {
            use super::super::super::BaseAccount;

            /// Account type used by ethermint chains, a base account plus the
            /// hash of any contract code stored at the address.
            #[derive(Clone, PartialEq, ::prost::Message)]
            pub struct EthAccount {
                #[prost(message, optional, tag = "1")]
                pub base_account: ::core::option::Option<BaseAccount>,
                #[prost(string, tag = "2")]
                pub code_hash: ::prost::alloc::string::String,
            }
        }
    }

    pub mod crypto {
        pub mod v1 {
            pub mod ethsecp256k1 {
                /// Compressed secp256k1 public key (33 bytes).
                #[derive(Clone, PartialEq, ::prost::Message)]
                pub struct PubKey {
                    #[prost(bytes = "vec", tag = "1")]
                    pub key: ::prost::alloc::vec::Vec<u8>,
                }
            }
        }
    }
}

pub const ETH_ACCOUNT_TYPE_URL: &str = "/ethermint.types.v1.EthAccount";
pub const ETH_PUBKEY_TYPE_URL: &str = "/ethermint.crypto.v1.ethsecp256k1.PubKey";
pub const SECP256K1_PUBKEY_TYPE_URL: &str = "/cosmos.crypto.secp256k1.PubKey";
