use secp256k1::{Message, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};
use tiny_keccak::{Hasher, Keccak};

use crate::error::{Error, Result};

/// Signs canonical sign bytes for either key flavour the chain accepts
pub struct TransactionSigner {
    secp: Secp256k1<secp256k1::All>,
}

pub(crate) fn keccak256(data: &[u8]) -> [u8; 32] {
    let mut hasher = Keccak::v256();
    let mut hash = [0u8; 32];
    hasher.update(data);
    hasher.finalize(&mut hash);
    hash
}

impl TransactionSigner {
    pub fn new() -> Self {
        Self {
            secp: Secp256k1::new(),
        }
    }

    /// ethsecp256k1 signature: Keccak256 of the sign bytes, recoverable,
    /// laid out as R || S || V with V the raw parity (0 or 1).
    pub fn sign_eth(&self, sign_bytes: &[u8], private_key: &SecretKey) -> Result<Vec<u8>> {
        let hash = keccak256(sign_bytes);
        let message = Message::from_digest_slice(&hash).map_err(Error::signing)?;

        let recoverable_sig = self.secp.sign_ecdsa_recoverable(&message, private_key);
        let (recovery_id, signature) = recoverable_sig.serialize_compact();

        let mut sig_bytes = Vec::with_capacity(65);
        sig_bytes.extend_from_slice(&signature);
        sig_bytes.push((recovery_id.to_i32() % 2) as u8);

        Ok(sig_bytes)
    }

    /// Plain Cosmos secp256k1 signature: SHA-256 of the sign bytes, 64-byte compact R || S.
    pub fn sign_cosmos(&self, sign_bytes: &[u8], private_key: &SecretKey) -> Result<Vec<u8>> {
        let hash: [u8; 32] = Sha256::digest(sign_bytes).into();
        let message = Message::from_digest_slice(&hash).map_err(Error::signing)?;

        let signature = self.secp.sign_ecdsa(&message, private_key);
        Ok(signature.serialize_compact().to_vec())
    }
}

impl Default for TransactionSigner {
    fn default() -> Self {
        Self::new()
    }
}
