use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use ed25519_dalek::{Signer, SigningKey};
use serde::Serialize;
use zeroize::Zeroize;

use super::GatewayClient;
use crate::error::{Error, Result};
use crate::node::Validators;

const URL_UPDATE_VALIDATOR: &str = "/v1/admin/update_validator";
const URL_CHAIN_VALIDATORS: &str = "/v1/chain/validators";

/// The part of an update request the admin key signs, in wire field order
#[derive(Serialize)]
struct ValidatorSignContent<'a> {
    validator_pub_key: &'a str,
    validator_power: i64,
    seq: i64,
}

#[derive(Debug, Serialize)]
pub(crate) struct UpdateValidatorRequest {
    pub validator_pub_key: String,
    pub validator_power: i64,
    pub seq: i64,
    /// base64 ed25519 signature
    pub signature: String,
}

/// Accepts either a 64-byte keypair or a 32-byte seed, base64 encoded
pub(crate) fn signing_key_from_base64(encoded: &str) -> Result<SigningKey> {
    let mut raw = BASE64
        .decode(encoded.trim())
        .map_err(|e| Error::Key(format!("invalid private key: {e}")))?;
    let key = match raw.len() {
        64 => {
            let mut bytes = [0u8; 64];
            bytes.copy_from_slice(&raw);
            let key = SigningKey::from_keypair_bytes(&bytes)
                .map_err(|e| Error::Key(format!("invalid private key: {e}")));
            bytes.zeroize();
            key
        }
        32 => {
            let mut bytes = [0u8; 32];
            bytes.copy_from_slice(&raw);
            let key = SigningKey::from_bytes(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        n => Err(Error::Key(format!(
            "invalid private key: expected 32 or 64 bytes, got {n}"
        ))),
    };
    raw.zeroize();
    key
}

pub(crate) fn signed_update(
    key: &SigningKey,
    validator_pub_key: &str,
    validator_power: i64,
    seq: i64,
) -> Result<UpdateValidatorRequest> {
    let content = serde_json::to_vec(&ValidatorSignContent {
        validator_pub_key,
        validator_power,
        seq,
    })?;
    let signature = key.sign(&content);
    Ok(UpdateValidatorRequest {
        validator_pub_key: validator_pub_key.to_string(),
        validator_power,
        seq,
        signature: BASE64.encode(signature.to_bytes()),
    })
}

/// Validator administration
pub struct Cluster<'a> {
    client: &'a GatewayClient,
}

impl<'a> Cluster<'a> {
    pub(crate) fn new(client: &'a GatewayClient) -> Self {
        Self { client }
    }

    pub async fn update_validator(&self, validator_pub_key: &str, power: i64) -> Result<()> {
        if power <= 0 {
            return Err(Error::Validation("power must > 0".to_string()));
        }
        self.send_update(validator_pub_key, power).await
    }

    pub async fn remove_validator(&self, validator_pub_key: &str) -> Result<()> {
        self.send_update(validator_pub_key, 0).await
    }

    async fn send_update(&self, validator_pub_key: &str, power: i64) -> Result<()> {
        let encoded = self
            .client
            .options()
            .private_key
            .as_deref()
            .ok_or_else(|| Error::Key("validator updates need an admin private key".to_string()))?;
        let key = signing_key_from_base64(encoded)?;
        let seq = chrono::Utc::now().timestamp_millis();
        let request = signed_update(&key, validator_pub_key, power, seq)?;

        log::info!(
            "updating validator {} to power {} (seq {})",
            validator_pub_key,
            power,
            seq
        );
        self.client.post(URL_UPDATE_VALIDATOR, &request).await?;
        Ok(())
    }

    pub async fn list_validators(
        &self,
        height: Option<i64>,
        page: Option<u32>,
        per_page: Option<u32>,
    ) -> Result<Validators> {
        let mut params = Vec::new();
        if let Some(page) = page {
            params.push(("page", page.to_string()));
        }
        if let Some(per_page) = per_page {
            params.push(("per_page", per_page.to_string()));
        }
        if let Some(height) = height {
            params.push(("height", height.to_string()));
        }
        self.client.get_chain(URL_CHAIN_VALIDATORS, &params).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gateway::tests::{client_for, serve};
    use crate::gateway::{GatewayClient, GatewayOptions};
    use ed25519_dalek::{Signature, Verifier};

    fn admin_key() -> SigningKey {
        SigningKey::from_bytes(&[7u8; 32])
    }

    fn admin_client(addr: &str) -> GatewayClient {
        GatewayClient::new(
            GatewayOptions::default()
                .with_addrs([addr])
                .with_private_key(BASE64.encode(admin_key().to_keypair_bytes())),
        )
        .unwrap()
    }

    #[test]
    fn test_key_formats() {
        let key = admin_key();
        let from_pair = signing_key_from_base64(&BASE64.encode(key.to_keypair_bytes())).unwrap();
        let from_seed = signing_key_from_base64(&BASE64.encode(key.to_bytes())).unwrap();
        assert_eq!(from_pair.verifying_key(), key.verifying_key());
        assert_eq!(from_seed.verifying_key(), key.verifying_key());
        assert!(matches!(signing_key_from_base64("AAAA"), Err(Error::Key(_))));
        assert!(matches!(signing_key_from_base64("***"), Err(Error::Key(_))));
    }

    #[test]
    fn test_signature_covers_sign_content() {
        let key = admin_key();
        let request = signed_update(&key, "pubkey==", 10, 1_700_000_000_000).unwrap();

        let signed = br#"{"validator_pub_key":"pubkey==","validator_power":10,"seq":1700000000000}"#;
        let raw = BASE64.decode(&request.signature).unwrap();
        let signature = Signature::from_slice(&raw).unwrap();
        key.verifying_key().verify(signed, &signature).unwrap();
    }

    #[tokio::test]
    async fn test_non_positive_power_is_rejected() {
        let client = admin_client("http://127.0.0.1:1");
        for power in [0, -5] {
            let err = client.cluster().update_validator("pk", power).await.unwrap_err();
            assert!(matches!(err, Error::Validation(ref m) if m == "power must > 0"));
        }
    }

    #[tokio::test]
    async fn test_remove_sends_power_zero() {
        let (addr, mut requests) = serve(r#"{"code":0,"message":"ok"}"#).await;
        let client = admin_client(&addr);

        client.cluster().remove_validator("pk").await.unwrap();
        let removed = requests.recv().await.unwrap().json();

        client.cluster().update_validator("pk", 3).await.unwrap();
        let updated = requests.recv().await.unwrap().json();

        assert_eq!(removed["validator_pub_key"], "pk");
        assert_eq!(removed["validator_power"], 0);
        assert_eq!(updated["validator_power"], 3);
        assert!(removed["seq"].as_i64().unwrap() > 0);
        assert!(!removed["signature"].as_str().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_update_without_key() {
        let client = client_for("http://127.0.0.1:1");
        let err = client.cluster().remove_validator("pk").await.unwrap_err();
        assert!(matches!(err, Error::Key(_)));
    }
}
