use bip32::{DerivationPath, XPrv};
use bip39::Mnemonic;
use prost::Message;
use rand::RngCore;
use ripemd::Ripemd160;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::address;
use super::signer::{keccak256, TransactionSigner};
use crate::chain::proto::{
    cosmos::crypto::secp256k1::PubKey as CosmosPubKey,
    ethermint::crypto::v1::ethsecp256k1::PubKey as EthPubKey, Any, ETH_PUBKEY_TYPE_URL,
    SECP256K1_PUBKEY_TYPE_URL,
};
use crate::error::{Error, Result};

/// Ethereum coin type, shared with ethermint chains
pub const ETH_COIN_TYPE: u32 = 60;

pub const DEFAULT_HD_PATH: &str = "m/44'/60'/0'/0/0";

/// Key flavour. Determines address derivation, signature layout and the
/// public key type url placed in the signer info.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAlgorithm {
    #[default]
    EthSecp256k1,
    Secp256k1,
}

/// Generate a fresh 24-word mnemonic from 256 bits of OS entropy
pub fn create_mnemonic() -> Result<String> {
    let mut entropy = [0u8; 32];
    rand::rngs::OsRng.fill_bytes(&mut entropy);
    let mnemonic = Mnemonic::from_entropy(&entropy)
        .map_err(|e| Error::Key(format!("failed to build mnemonic: {e}")));
    entropy.zeroize();
    Ok(mnemonic?.to_string())
}

/// BIP44 path `m/44'/60'/{account}'/0/{index}`
pub fn hd_path(account: u32, index: u32) -> String {
    format!("m/44'/{ETH_COIN_TYPE}'/{account}'/0/{index}")
}

/// Derive raw private key bytes for `path` from a mnemonic
pub fn derive_private_key(mnemonic: &str, passphrase: &str, path: &str) -> Result<[u8; 32]> {
    let mnemonic =
        Mnemonic::parse(mnemonic).map_err(|e| Error::Key(format!("invalid mnemonic: {e}")))?;
    let mut seed = mnemonic.to_seed(passphrase);

    let path: DerivationPath = path
        .parse()
        .map_err(|e| Error::Key(format!("invalid hd path {path:?}: {e}")))?;
    let derived = XPrv::derive_from_path(seed, &path)
        .map_err(|e| Error::Key(format!("failed to derive key: {e}")));
    seed.zeroize();

    Ok(derived?.to_bytes())
}

/// Signing key plus derived address
#[derive(Debug, Zeroize, ZeroizeOnDrop)]
pub struct Wallet {
    #[zeroize(skip)]
    pub address: String,
    #[zeroize(skip)]
    algorithm: KeyAlgorithm,

    private_key_bytes: [u8; 32],
    public_key_bytes: [u8; 65],
}

impl Wallet {
    /// ethsecp256k1 wallet at the default path
    pub fn from_mnemonic(mnemonic: &str, passphrase: &str) -> Result<Self> {
        Self::from_mnemonic_with(mnemonic, passphrase, DEFAULT_HD_PATH, KeyAlgorithm::EthSecp256k1)
    }

    pub fn from_mnemonic_no_passphrase(mnemonic: &str) -> Result<Self> {
        Self::from_mnemonic(mnemonic, "")
    }

    pub fn from_mnemonic_with(
        mnemonic: &str,
        passphrase: &str,
        path: &str,
        algorithm: KeyAlgorithm,
    ) -> Result<Self> {
        let mut private_key = derive_private_key(mnemonic, passphrase, path)?;
        let wallet = Self::from_private_key(&private_key, algorithm);
        private_key.zeroize();
        wallet
    }

    pub fn from_private_key_hex(hex_key: &str, algorithm: KeyAlgorithm) -> Result<Self> {
        let mut bytes = hex::decode(hex_key.trim_start_matches("0x"))
            .map_err(|e| Error::Key(format!("invalid private key hex: {e}")))?;
        let wallet = Self::from_private_key(&bytes, algorithm);
        bytes.zeroize();
        wallet
    }

    pub fn from_private_key(private_key: &[u8], algorithm: KeyAlgorithm) -> Result<Self> {
        let secp = Secp256k1::new();
        let secret_key = SecretKey::from_slice(private_key)
            .map_err(|e| Error::Key(format!("invalid private key: {e}")))?;
        let public_key = PublicKey::from_secret_key(&secp, &secret_key);

        let address = address::encode_bech32(&address_bytes(&public_key, algorithm))?;

        let mut private_key_bytes = [0u8; 32];
        private_key_bytes.copy_from_slice(&secret_key.secret_bytes());

        Ok(Self {
            address,
            algorithm,
            private_key_bytes,
            public_key_bytes: public_key.serialize_uncompressed(),
        })
    }

    pub fn algorithm(&self) -> KeyAlgorithm {
        self.algorithm
    }

    pub fn private_key(&self) -> Result<SecretKey> {
        SecretKey::from_slice(&self.private_key_bytes)
            .map_err(|e| Error::Key(format!("invalid private key: {e}")))
    }

    pub fn public_key(&self) -> Result<PublicKey> {
        PublicKey::from_slice(&self.public_key_bytes)
            .map_err(|e| Error::Key(format!("invalid public key: {e}")))
    }

    /// Uncompressed public key (65 bytes with 0x04 prefix)
    pub fn public_key_bytes(&self) -> [u8; 65] {
        self.public_key_bytes
    }

    pub fn public_key_compressed(&self) -> Result<[u8; 33]> {
        Ok(self.public_key()?.serialize())
    }

    /// 20-byte account address
    pub fn address_bytes(&self) -> Result<[u8; 20]> {
        Ok(address_bytes(&self.public_key()?, self.algorithm))
    }

    /// EIP-55 hex form of the account address
    pub fn evm_address(&self) -> Result<String> {
        Ok(address::to_checksum_hex(&self.address_bytes()?))
    }

    /// Public key packed for a `SignerInfo`
    pub fn public_key_any(&self) -> Result<Any> {
        let key = self.public_key_compressed()?.to_vec();
        let any = match self.algorithm {
            KeyAlgorithm::EthSecp256k1 => Any {
                type_url: ETH_PUBKEY_TYPE_URL.to_string(),
                value: EthPubKey { key }.encode_to_vec(),
            },
            KeyAlgorithm::Secp256k1 => Any {
                type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
                value: CosmosPubKey { key }.encode_to_vec(),
            },
        };
        Ok(any)
    }

    /// Sign canonical sign-doc bytes with this key's scheme
    pub fn sign(&self, sign_bytes: &[u8]) -> Result<Vec<u8>> {
        let signer = TransactionSigner::new();
        let private_key = self.private_key()?;
        match self.algorithm {
            KeyAlgorithm::EthSecp256k1 => signer.sign_eth(sign_bytes, &private_key),
            KeyAlgorithm::Secp256k1 => signer.sign_cosmos(sign_bytes, &private_key),
        }
    }
}

fn address_bytes(public_key: &PublicKey, algorithm: KeyAlgorithm) -> [u8; 20] {
    let mut out = [0u8; 20];
    match algorithm {
        KeyAlgorithm::EthSecp256k1 => {
            // skip the 0x04 prefix
            let hash = keccak256(&public_key.serialize_uncompressed()[1..]);
            out.copy_from_slice(&hash[12..32]);
        }
        KeyAlgorithm::Secp256k1 => {
            let sha = Sha256::digest(public_key.serialize());
            out.copy_from_slice(&Ripemd160::digest(sha));
        }
    }
    out
}
