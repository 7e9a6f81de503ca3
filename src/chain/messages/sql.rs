use std::fmt;

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::{Deserialize, Serialize};

use super::TxMessage;

/// Wire type of a SQL statement parameter
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, ::prost::Enumeration)]
#[repr(i32)]
pub enum ArgumentType {
    Int = 0,
    Uint = 1,
    Float = 2,
    String = 3,
    Bool = 4,
    Bytes = 5,
}

impl ArgumentType {
    pub fn as_str_name(&self) -> &'static str {
        match self {
            ArgumentType::Int => "INT",
            ArgumentType::Uint => "UINT",
            ArgumentType::Float => "FLOAT",
            ArgumentType::String => "STRING",
            ArgumentType::Bool => "BOOL",
            ArgumentType::Bytes => "BYTES",
        }
    }

    pub fn from_str_name(name: &str) -> Option<Self> {
        match name {
            "INT" => Some(ArgumentType::Int),
            "UINT" => Some(ArgumentType::Uint),
            "FLOAT" => Some(ArgumentType::Float),
            "STRING" => Some(ArgumentType::String),
            "BOOL" => Some(ArgumentType::Bool),
            "BYTES" => Some(ArgumentType::Bytes),
            _ => None,
        }
    }
}

/// Typed statement parameter, the value always carried as text.
/// Bytes are base64 encoded.
#[derive(Clone, PartialEq, Eq, ::prost::Message, Serialize, Deserialize)]
pub struct Argument {
    #[prost(enumeration = "ArgumentType", tag = "1")]
    #[serde(rename = "type", with = "argument_type_name")]
    pub r#type: i32,
    #[prost(string, tag = "2")]
    pub value: ::prost::alloc::string::String,
}

impl Argument {
    pub fn new(kind: ArgumentType, value: impl Into<String>) -> Self {
        Self {
            r#type: kind as i32,
            value: value.into(),
        }
    }

    pub fn string(value: impl Into<String>) -> Self {
        Self::new(ArgumentType::String, value)
    }
}

mod argument_type_name {
    use super::ArgumentType;
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &i32, serializer: S) -> Result<S::Ok, S::Error> {
        match ArgumentType::try_from(*value) {
            Ok(kind) => serializer.serialize_str(kind.as_str_name()),
            Err(_) => serializer.serialize_i32(*value),
        }
    }

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum NameOrNumber {
        Name(String),
        Number(i32),
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i32, D::Error> {
        match NameOrNumber::deserialize(deserializer)? {
            NameOrNumber::Number(n) => Ok(n),
            NameOrNumber::Name(name) => ArgumentType::from_str_name(&name)
                .map(|kind| kind as i32)
                .ok_or_else(|| de::Error::custom(format!("unknown argument type {name:?}"))),
        }
    }
}

/// A Rust value that can be bound to a `?` placeholder
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Uint(u64),
    Float(f64),
    String(String),
    Bool(bool),
    Bytes(Vec<u8>),
}

impl SqlValue {
    pub fn to_argument(&self) -> Argument {
        match self {
            SqlValue::Int(v) => Argument::new(ArgumentType::Int, v.to_string()),
            SqlValue::Uint(v) => Argument::new(ArgumentType::Uint, v.to_string()),
            SqlValue::Float(v) => Argument::new(ArgumentType::Float, v.to_string()),
            SqlValue::String(v) => Argument::new(ArgumentType::String, v.clone()),
            SqlValue::Bool(v) => Argument::new(ArgumentType::Bool, v.to_string()),
            SqlValue::Bytes(v) => Argument::new(ArgumentType::Bytes, BASE64.encode(v)),
        }
    }
}

macro_rules! sql_value_from {
    ($variant:ident: $($ty:ty),*) => {
        $(impl From<$ty> for SqlValue {
            fn from(v: $ty) -> Self {
                SqlValue::$variant(v.into())
            }
        })*
    };
}

sql_value_from!(Int: i8, i16, i32, i64);
sql_value_from!(Uint: u8, u16, u32, u64);
sql_value_from!(Bool: bool);
sql_value_from!(String: String, &str);
sql_value_from!(Bytes: Vec<u8>, &[u8]);

impl From<f64> for SqlValue {
    fn from(v: f64) -> Self {
        SqlValue::Float(v)
    }
}

impl From<f32> for SqlValue {
    fn from(v: f32) -> Self {
        // keep the shortest f32 text, `v as f64` would print 2.3299999237060547 for 2.33
        SqlValue::Float(v.to_string().parse().unwrap_or(v as f64))
    }
}

impl fmt::Display for SqlValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_argument().value)
    }
}

/// Execute one SQL statement on behalf of `uid`
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SqlExecRequest {
    #[prost(string, tag = "1")]
    pub uid: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub sql: ::prost::alloc::string::String,
    #[prost(message, repeated, tag = "3")]
    pub arguments: ::prost::alloc::vec::Vec<Argument>,
}

impl TxMessage for SqlExecRequest {
    const TYPE_URL: &'static str = "/blockved.glitterchain.index.SQLExecRequest";
}

/// Grant a role on a database, or on one table when `on_table` is set
#[derive(Clone, PartialEq, ::prost::Message)]
pub struct SqlGrantRequest {
    #[prost(string, tag = "1")]
    pub from: ::prost::alloc::string::String,
    #[prost(string, tag = "2")]
    pub to_uid: ::prost::alloc::string::String,
    #[prost(string, tag = "3")]
    pub role: ::prost::alloc::string::String,
    #[prost(string, tag = "4")]
    pub on_database: ::prost::alloc::string::String,
    #[prost(string, tag = "5")]
    pub on_table: ::prost::alloc::string::String,
}

impl TxMessage for SqlGrantRequest {
    const TYPE_URL: &'static str = "/blockved.glitterchain.index.SQLGrantRequest";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_argument_json_uses_type_names() {
        let arg = SqlValue::from("hello").to_argument();
        assert_eq!(serde_json::to_value(&arg).unwrap(), json!({"type": "STRING", "value": "hello"}));

        let parsed: Argument = serde_json::from_value(json!({"type": "UINT", "value": "3"})).unwrap();
        assert_eq!(parsed, Argument::new(ArgumentType::Uint, "3"));

        let numeric: Argument = serde_json::from_value(json!({"type": 4, "value": "true"})).unwrap();
        assert_eq!(numeric.r#type, ArgumentType::Bool as i32);
    }

    #[test]
    fn test_value_conversions() {
        assert_eq!(SqlValue::from(-5i32).to_argument(), Argument::new(ArgumentType::Int, "-5"));
        assert_eq!(SqlValue::from(7u8).to_argument(), Argument::new(ArgumentType::Uint, "7"));
        assert_eq!(SqlValue::from(2.33f32).to_argument().value, "2.33");
        assert_eq!(SqlValue::from(true).to_argument().value, "true");
        assert_eq!(
            SqlValue::from(&b"hi"[..]).to_argument(),
            Argument::new(ArgumentType::Bytes, "aGk=")
        );
    }
}
