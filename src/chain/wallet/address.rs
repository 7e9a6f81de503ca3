use bech32::{Bech32, Hrp};

use super::signer::keccak256;
use crate::error::{Error, Result};

/// Bech32 human readable part of account addresses
pub const ACCOUNT_PREFIX: &str = "glitter";

pub fn encode_bech32(bytes: &[u8]) -> Result<String> {
    let hrp = Hrp::parse(ACCOUNT_PREFIX).map_err(|e| Error::Key(e.to_string()))?;
    bech32::encode::<Bech32>(hrp, bytes).map_err(|e| Error::Key(format!("bech32 encode: {e}")))
}

/// Decode an account address, rejecting other prefixes
pub fn decode_bech32(address: &str) -> Result<Vec<u8>> {
    let (hrp, data) = bech32::decode(address)
        .map_err(|e| Error::InvalidArgument(format!("invalid bech32 address {address:?}: {e}")))?;
    if hrp.as_str() != ACCOUNT_PREFIX {
        return Err(Error::InvalidArgument(format!(
            "address {address:?} has prefix {:?}, expected {ACCOUNT_PREFIX:?}",
            hrp.as_str()
        )));
    }
    Ok(data)
}

/// `0x…` hex address to its `glitter1…` form
pub fn evm_to_bech32(evm_address: &str) -> Result<String> {
    let raw = evm_address
        .strip_prefix("0x")
        .or_else(|| evm_address.strip_prefix("0X"))
        .unwrap_or(evm_address);
    let bytes = hex::decode(raw)
        .map_err(|e| Error::InvalidArgument(format!("invalid hex address {evm_address:?}: {e}")))?;
    if bytes.len() != 20 {
        return Err(Error::InvalidArgument(format!(
            "hex address must be 20 bytes, got {}",
            bytes.len()
        )));
    }
    encode_bech32(&bytes)
}

/// `glitter1…` address to its EIP-55 checksummed hex form
pub fn bech32_to_evm(address: &str) -> Result<String> {
    let bytes = decode_bech32(address)?;
    if bytes.len() != 20 {
        return Err(Error::InvalidArgument(format!(
            "account address must be 20 bytes, got {}",
            bytes.len()
        )));
    }
    Ok(to_checksum_hex(&bytes))
}

/// EIP-55 mixed-case encoding
pub fn to_checksum_hex(bytes: &[u8]) -> String {
    let lower = hex::encode(bytes);
    let hash = keccak256(lower.as_bytes());

    let mut out = String::with_capacity(2 + lower.len());
    out.push_str("0x");
    for (i, c) in lower.chars().enumerate() {
        let nibble = (hash[i / 2] >> (if i % 2 == 0 { 4 } else { 0 })) & 0x0f;
        if c.is_ascii_alphabetic() && nibble >= 8 {
            out.push(c.to_ascii_uppercase());
        } else {
            out.push(c);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_eip55_reference_vector() {
        let bytes = hex::decode("5aaeb6053f3e94c9b9a09f33669435e7ef1beaed").unwrap();
        assert_eq!(to_checksum_hex(&bytes), "0x5aAeb6053F3E94C9b9A09f33669435E7Ef1BeAed");
    }

    #[test]
    fn test_glitter_evm_conversion() {
        let glitter = "glitter1q5t6prazp4wlzegvaz5sls25phyvvmq6aqpxf7";
        let evm = "0x0517a08fa20d5Df1650ce8a90fc1540dc8c66c1a";

        assert!(bech32_to_evm(glitter).unwrap().eq_ignore_ascii_case(evm));
        assert_eq!(evm_to_bech32(evm).unwrap(), glitter);
        assert_eq!(evm_to_bech32(&evm.to_lowercase()).unwrap(), glitter);
    }

    #[test]
    fn test_rejects_foreign_prefix_and_bad_length() {
        // valid checksum, so only the prefix is wrong
        let cosmos = bech32::encode::<Bech32>(Hrp::parse("cosmos").unwrap(), &[1u8; 20]).unwrap();
        assert!(bech32::decode(&cosmos).is_ok());
        match decode_bech32(&cosmos) {
            Err(Error::InvalidArgument(msg)) => assert!(msg.contains("has prefix \"cosmos\"")),
            other => panic!("unexpected {other:?}"),
        }
        assert!(bech32_to_evm(&cosmos).is_err());
        assert!(matches!(evm_to_bech32("0x1234"), Err(Error::InvalidArgument(_))));
    }
}
