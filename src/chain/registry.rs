use std::collections::HashMap;
use std::fmt;

use prost::Message;

use crate::chain::messages::{self, TxMessage};
use crate::chain::proto::{cosmos, Any};
use crate::error::{Error, Result};

/// A message decoded from an `Any`, kept opaque beyond `Debug`
pub type DecodedMsg = Box<dyn fmt::Debug + Send + Sync>;

type DecodeFn = fn(&[u8]) -> Result<DecodedMsg>;

struct Entry {
    module: &'static str,
    decode: DecodeFn,
}

/// Maps message type urls to the module that owns them and a decoder.
///
/// Built explicitly by the caller and handed to whatever needs to unpack
/// transaction bodies; there is no process-wide instance.
#[derive(Default)]
pub struct ModuleRegistry {
    entries: HashMap<&'static str, Entry>,
}

fn decode_as<M>(bytes: &[u8]) -> Result<DecodedMsg>
where
    M: Message + Default + fmt::Debug + Send + Sync + 'static,
{
    Ok(Box::new(M::decode(bytes)?))
}

impl ModuleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cosmos modules the chain runs plus the Glitter index and consumer modules
    pub fn standard() -> Self {
        let mut registry = Self::new();
        registry
            .register::<cosmos::bank::v1beta1::MsgSend>("bank")
            .register::<cosmos::bank::v1beta1::MsgMultiSend>("bank")
            .register::<cosmos::staking::v1beta1::MsgDelegate>("staking")
            .register::<cosmos::staking::v1beta1::MsgUndelegate>("staking")
            .register::<cosmos::staking::v1beta1::MsgBeginRedelegate>("staking")
            .register::<cosmos::staking::v1beta1::MsgCreateValidator>("staking")
            .register::<cosmos::staking::v1beta1::MsgEditValidator>("staking")
            .register::<cosmos::distribution::v1beta1::MsgWithdrawDelegatorReward>("distribution")
            .register::<cosmos::distribution::v1beta1::MsgWithdrawValidatorCommission>("distribution")
            .register::<cosmos::distribution::v1beta1::MsgSetWithdrawAddress>("distribution")
            .register::<cosmos::gov::v1beta1::MsgVote>("gov")
            .register::<cosmos::gov::v1beta1::MsgDeposit>("gov")
            .register::<cosmos::slashing::v1beta1::MsgUnjail>("slashing")
            .register::<cosmos::feegrant::v1beta1::MsgGrantAllowance>("feegrant")
            .register::<cosmos::feegrant::v1beta1::MsgRevokeAllowance>("feegrant")
            .register::<messages::SqlExecRequest>("index")
            .register::<messages::SqlGrantRequest>("index")
            .register::<messages::CreateDatasetRequest>("index")
            .register::<messages::EditDatasetRequest>("index")
            .register::<messages::EditTableRequest>("index")
            .register::<messages::RenewalDatasetRequest>("index")
            .register::<messages::PledgeRequest>("consumer")
            .register::<messages::ReleasePledgeRequest>("consumer");
        registry
    }

    pub fn register<M>(&mut self, module: &'static str) -> &mut Self
    where
        M: TxMessage + Default + fmt::Debug + Send + Sync + 'static,
    {
        self.register_raw(M::TYPE_URL, module, decode_as::<M>)
    }

    /// Register a decoder for a type url with no `TxMessage` impl
    pub fn register_raw(&mut self, type_url: &'static str, module: &'static str, decode: DecodeFn) -> &mut Self {
        self.entries.insert(type_url, Entry { module, decode });
        self
    }

    pub fn module_of(&self, type_url: &str) -> Option<&'static str> {
        self.entries.get(type_url).map(|e| e.module)
    }

    pub fn contains(&self, type_url: &str) -> bool {
        self.entries.contains_key(type_url)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn unpack(&self, any: &Any) -> Result<DecodedMsg> {
        let entry = self.entries.get(any.type_url.as_str()).ok_or_else(|| {
            Error::Encoding(format!("error while unpacking message: unregistered type {}", any.type_url))
        })?;
        (entry.decode)(&any.value)
            .map_err(|e| Error::Encoding(format!("error while unpacking message {}: {e}", any.type_url)))
    }
}

impl fmt::Debug for ModuleRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut urls: Vec<_> = self.entries.keys().collect();
        urls.sort();
        f.debug_struct("ModuleRegistry").field("type_urls", &urls).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_registry_unpacks_sql_exec() {
        let registry = ModuleRegistry::standard();
        let msg = messages::SqlExecRequest {
            uid: "glitter1abc".into(),
            sql: "SELECT 1".into(),
            arguments: vec![],
        };
        let decoded = registry.unpack(&msg.to_any()).unwrap();
        assert!(format!("{decoded:?}").contains("SELECT 1"));
        assert_eq!(registry.module_of(messages::SqlExecRequest::TYPE_URL), Some("index"));
    }

    #[test]
    fn test_unregistered_type_is_an_error() {
        let registry = ModuleRegistry::new();
        assert!(registry.is_empty());
        let any = Any { type_url: "/x.y.Msg".into(), value: vec![] };
        assert!(matches!(registry.unpack(&any), Err(Error::Encoding(_))));
    }

    #[test]
    fn test_garbage_bytes_fail_decode() {
        let registry = ModuleRegistry::standard();
        let any = Any {
            type_url: messages::SqlExecRequest::TYPE_URL.into(),
            value: vec![0xff, 0xff, 0xff],
        };
        assert!(registry.unpack(&any).is_err());
    }
}
