pub mod address;
mod keys;
mod signer;

pub use address::{bech32_to_evm, evm_to_bech32, ACCOUNT_PREFIX};
pub use keys::{create_mnemonic, derive_private_key, hd_path, KeyAlgorithm, Wallet, DEFAULT_HD_PATH};
pub use signer::TransactionSigner;
