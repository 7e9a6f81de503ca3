use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("non-200 response code {status}: {body}")]
    Http { status: u16, body: String },

    #[error("encoding error: {0}")]
    Encoding(String),

    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    #[error("account {0} not found")]
    AccountNotFound(String),

    #[error("failed to load account: {source}")]
    AccountLoad {
        #[source]
        source: BoxError,
    },

    #[error("simulation rejected with status {status}: {body}")]
    Simulation { status: u16, body: String },

    #[error("failed to simulate: {source}")]
    GasEstimation {
        #[source]
        source: BoxError,
    },

    #[error("failed to sign tx: {source}")]
    Signing {
        #[source]
        source: BoxError,
    },

    #[error("broadcast rejected (code {code}, codespace {codespace:?}, tx {txhash}): {raw_log}")]
    Broadcast {
        code: u32,
        codespace: String,
        raw_log: String,
        txhash: String,
    },

    #[error("query failed: {0}")]
    Query(String),

    #[error("rpc error {code}: {message} {data}")]
    Rpc { code: i64, message: String, data: String },

    #[error("grpc error: {0}")]
    Grpc(#[from] tonic::Status),

    #[error("grpc transport error: {0}")]
    GrpcTransport(#[from] tonic::transport::Error),

    #[error("websocket error: {0}")]
    WebSocket(#[from] tokio_tungstenite::tungstenite::Error),

    #[error("validation failed: {0}")]
    Validation(String),

    #[error("node unavailable: {0}")]
    Unavailable(String),

    #[error("scan failed: {0}")]
    Scan(#[from] ScanError),

    #[error("key error: {0}")]
    Key(String),
}

/// Failures while binding SQL result rows to typed records.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ScanError {
    #[error("query returned no result set")]
    NoResultSet,

    #[error("column {0} has no binding on the target type")]
    UnmappedColumn(String),

    #[error("column {column} expected {expected}, got {value:?}")]
    TypeMismatch {
        column: String,
        expected: &'static str,
        value: String,
    },

    #[error("row {row} has {got} values for {want} columns")]
    RowWidth { row: usize, got: usize, want: usize },
}

impl Error {
    pub(crate) fn account_load(source: impl Into<BoxError>) -> Self {
        Error::AccountLoad { source: source.into() }
    }

    pub(crate) fn gas_estimation(source: impl Into<BoxError>) -> Self {
        Error::GasEstimation { source: source.into() }
    }

    /// Wraps `source` unless it already is a signing error
    pub(crate) fn signing(source: impl Into<BoxError>) -> Self {
        let source = source.into();
        match source.downcast::<Error>() {
            Ok(inner) if matches!(*inner, Error::Signing { .. }) => *inner,
            Ok(inner) => Error::Signing { source: inner },
            Err(source) => Error::Signing { source },
        }
    }

    /// True when the error came from the node reporting a large genesis that
    /// must be fetched through `genesis_chunked`.
    pub fn wants_chunked_genesis(&self) -> bool {
        match self {
            Error::Rpc { message, data, .. } => {
                message.contains("genesis_chunked") || data.contains("genesis_chunked")
            }
            Error::Query(msg) => msg.contains("genesis_chunked"),
            _ => false,
        }
    }
}

impl From<prost::DecodeError> for Error {
    fn from(e: prost::DecodeError) -> Self {
        Error::Encoding(format!("protobuf decode: {e}"))
    }
}

impl From<prost::EncodeError> for Error {
    fn from(e: prost::EncodeError) -> Self {
        Error::Encoding(format!("protobuf encode: {e}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Encoding(format!("json: {e}"))
    }
}

impl From<base64::DecodeError> for Error {
    fn from(e: base64::DecodeError) -> Self {
        Error::Encoding(format!("base64: {e}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunked_genesis_hint_is_detected() {
        let err = Error::Rpc {
            code: -32603,
            message: "Internal error".into(),
            data: "genesis response is large, please use the genesis_chunked API instead".into(),
        };
        assert!(err.wants_chunked_genesis());
        assert!(!Error::Query("boom".into()).wants_chunked_genesis());
    }

    #[test]
    fn stage_errors_keep_their_cause() {
        let err = Error::gas_estimation(Error::Simulation { status: 500, body: "oops".into() });
        let source = std::error::Error::source(&err).map(|s| s.to_string());
        assert_eq!(source.as_deref(), Some("simulation rejected with status 500: oops"));
    }

    #[test]
    fn signing_errors_keep_their_cause() {
        let cause = secp256k1::Message::from_digest_slice(&[1u8; 7]).unwrap_err();
        let err = Error::signing(cause);
        let source = std::error::Error::source(&err).unwrap();
        assert!(source.downcast_ref::<secp256k1::Error>().is_some());

        // no double wrapping
        let again = Error::signing(err);
        let source = std::error::Error::source(&again).unwrap();
        assert!(source.downcast_ref::<secp256k1::Error>().is_some());
    }
}
