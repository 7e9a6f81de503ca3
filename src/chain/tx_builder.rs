/// Transaction draft assembly and SIGN_MODE_DIRECT signing.
///
/// A [`TxDraft`] is filled field by field, can be serialised with a
/// placeholder signer for simulation, and is consumed by [`TxDraft::sign`]
/// which freezes it into a [`SignedTx`].

use prost::Message;
use sha2::{Digest, Sha256};

use crate::chain::proto::{
    cosmos::crypto::secp256k1::PubKey as CosmosPubKey, mode_info, Any, AuthInfo, Coin, Fee,
    ModeInfo, ProtoSignMode, SignDoc, SignerInfo, TxBody, TxRaw, SECP256K1_PUBKEY_TYPE_URL,
};
use crate::chain::wallet::Wallet;
use crate::error::{Error, Result};

/// Signing mode requested for a transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SignMode {
    #[default]
    Unspecified,
    Direct,
    LegacyAminoJson,
}

impl SignMode {
    /// Unspecified falls back to direct
    pub fn resolve(self) -> SignMode {
        match self {
            SignMode::Unspecified => SignMode::Direct,
            other => other,
        }
    }

    fn proto(self) -> ProtoSignMode {
        match self.resolve() {
            SignMode::LegacyAminoJson => ProtoSignMode::LegacyAminoJson,
            _ => ProtoSignMode::Direct,
        }
    }
}

/// Chain-side values the signature commits to
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignerData {
    pub account_number: u64,
    pub chain_id: String,
    pub sequence: u64,
}

/// Unsigned transaction under construction
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TxDraft {
    messages: Vec<Any>,
    memo: String,
    fee_amount: Vec<Coin>,
    fee_granter: String,
    gas_limit: u64,
    timeout_height: u64,
}

impl TxDraft {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_msgs(&mut self, messages: Vec<Any>) -> Result<()> {
        if messages.is_empty() {
            return Err(Error::InvalidArgument("transaction has no messages".into()));
        }
        if let Some(pos) = messages.iter().position(|m| m.type_url.is_empty()) {
            return Err(Error::Encoding(format!("message {pos} has no type url")));
        }
        self.messages = messages;
        Ok(())
    }

    pub fn set_memo(&mut self, memo: impl Into<String>) {
        self.memo = memo.into();
    }

    pub fn set_fee_amount(&mut self, fee_amount: Vec<Coin>) {
        self.fee_amount = fee_amount;
    }

    pub fn set_fee_granter(&mut self, granter: impl Into<String>) {
        self.fee_granter = granter.into();
    }

    pub fn set_gas_limit(&mut self, gas_limit: u64) {
        self.gas_limit = gas_limit;
    }

    pub fn set_timeout_height(&mut self, height: u64) {
        self.timeout_height = height;
    }

    pub fn messages(&self) -> &[Any] {
        &self.messages
    }

    pub fn memo(&self) -> &str {
        &self.memo
    }

    pub fn fee_amount(&self) -> &[Coin] {
        &self.fee_amount
    }

    pub fn gas_limit(&self) -> u64 {
        self.gas_limit
    }

    pub fn timeout_height(&self) -> u64 {
        self.timeout_height
    }

    fn body(&self) -> TxBody {
        TxBody {
            messages: self.messages.clone(),
            memo: self.memo.clone(),
            timeout_height: self.timeout_height,
            extension_options: vec![],
            non_critical_extension_options: vec![],
        }
    }

    #[allow(deprecated)]
    fn auth_info(&self, signer_info: SignerInfo) -> AuthInfo {
        AuthInfo {
            signer_infos: vec![signer_info],
            fee: Some(Fee {
                amount: self.fee_amount.clone(),
                gas_limit: self.gas_limit,
                payer: String::new(),
                granter: self.fee_granter.clone(),
            }),
            tip: None,
        }
    }

    /// Serialise the draft for a simulate call.
    ///
    /// The signer slot carries an empty secp256k1 key and an empty signature;
    /// the node's ante handler substitutes its own sentinel key.
    pub fn simulation_bytes(&self, sequence: u64, sign_mode: SignMode) -> Result<Vec<u8>> {
        let placeholder = Any {
            type_url: SECP256K1_PUBKEY_TYPE_URL.to_string(),
            value: CosmosPubKey { key: vec![] }.encode_to_vec(),
        };
        let auth_info = self.auth_info(signer_info(placeholder, sign_mode, sequence));

        let tx_raw = TxRaw {
            body_bytes: self.body().encode_to_vec(),
            auth_info_bytes: auth_info.encode_to_vec(),
            signatures: vec![vec![]],
        };
        Ok(tx_raw.encode_to_vec())
    }

    /// Sign the draft, freezing gas limit and fee into the signed bytes
    pub fn sign(self, wallet: &Wallet, signer: &SignerData, sign_mode: SignMode) -> Result<SignedTx> {
        let sign_mode = sign_mode.resolve();
        if sign_mode != SignMode::Direct {
            return Err(Error::signing(format!("sign mode {sign_mode:?} is not supported")));
        }

        // 1. SignerInfo carrying the real public key
        let public_key = wallet.public_key_any()?;
        let auth_info = self.auth_info(signer_info(public_key, sign_mode, signer.sequence));

        // 2. Canonical bytes
        let body_bytes = self.body().encode_to_vec();
        let auth_info_bytes = auth_info.encode_to_vec();
        let sign_doc = SignDoc {
            body_bytes: body_bytes.clone(),
            auth_info_bytes: auth_info_bytes.clone(),
            chain_id: signer.chain_id.clone(),
            account_number: signer.account_number,
        };

        // 3. Sign with the wallet's scheme
        let signature = wallet.sign(&sign_doc.encode_to_vec()).map_err(Error::signing)?;

        log::debug!(
            "signed tx: account_number={} sequence={} gas_limit={}",
            signer.account_number,
            signer.sequence,
            self.gas_limit
        );

        Ok(SignedTx {
            body_bytes,
            auth_info_bytes,
            signature,
            sign_doc_bytes: sign_doc.encode_to_vec(),
            sequence: signer.sequence,
        })
    }
}

fn signer_info(public_key: Any, sign_mode: SignMode, sequence: u64) -> SignerInfo {
    SignerInfo {
        public_key: Some(public_key),
        mode_info: Some(ModeInfo {
            sum: Some(mode_info::Sum::Single(mode_info::Single {
                mode: sign_mode.proto() as i32,
            })),
        }),
        sequence,
    }
}

/// Immutable signed transaction, ready for broadcast
#[derive(Debug, Clone, PartialEq)]
pub struct SignedTx {
    body_bytes: Vec<u8>,
    auth_info_bytes: Vec<u8>,
    signature: Vec<u8>,
    sign_doc_bytes: Vec<u8>,
    sequence: u64,
}

impl SignedTx {
    /// `TxRaw` encoding as submitted to the chain
    pub fn to_bytes(&self) -> Vec<u8> {
        TxRaw {
            body_bytes: self.body_bytes.clone(),
            auth_info_bytes: self.auth_info_bytes.clone(),
            signatures: vec![self.signature.clone()],
        }
        .encode_to_vec()
    }

    /// Upper-case hex SHA-256 of the raw bytes, the hash the chain indexes
    pub fn hash(&self) -> String {
        hex::encode_upper(Sha256::digest(self.to_bytes()))
    }

    /// Signer sequence the signature commits to
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    pub fn signature(&self) -> &[u8] {
        &self.signature
    }

    /// Exact bytes the signature was computed over
    pub fn sign_doc_bytes(&self) -> &[u8] {
        &self.sign_doc_bytes
    }

    pub fn body(&self) -> Result<TxBody> {
        Ok(TxBody::decode(&self.body_bytes[..])?)
    }

    pub fn auth_info(&self) -> Result<AuthInfo> {
        Ok(AuthInfo::decode(&self.auth_info_bytes[..])?)
    }
}
