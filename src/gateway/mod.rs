//! HTTP client for the Glitter gateway service: document storage and search,
//! validator administration and a read-only window onto the chain.

pub mod chain;
pub mod cluster;
pub mod database;

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

pub use chain::{BlockSearch, Chain};
pub use cluster::Cluster;
pub use database::{Database, Filter, GetDocsResult, SearchCond, SearchResult};

pub const DEFAULT_GATEWAY_ADDRS: [&str; 5] = [
    "http://sg1.testnet.glitter.link:26659",
    "http://sg2.testnet.glitter.link:26659",
    "http://sg3.testnet.glitter.link:26659",
    "http://sg4.testnet.glitter.link:26659",
    "http://sg5.testnet.glitter.link:26659",
];

pub const DEFAULT_GATEWAY_TIMEOUT: Duration = Duration::from_secs(10);

const TM_PREFIX: &str = "/v1/chain";

#[derive(Debug, Clone)]
pub struct GatewayOptions {
    pub addrs: Vec<String>,
    pub access_token: String,
    /// base64 ed25519 key, needed only for validator updates
    pub private_key: Option<String>,
    pub timeout: Duration,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            addrs: DEFAULT_GATEWAY_ADDRS.iter().map(|a| a.to_string()).collect(),
            access_token: String::new(),
            private_key: None,
            timeout: DEFAULT_GATEWAY_TIMEOUT,
        }
    }
}

impl GatewayOptions {
    pub fn with_addrs<I, S>(mut self, addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.addrs = addrs
            .into_iter()
            .map(|a| a.into().trim_end_matches('/').to_string())
            .collect();
        self
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.access_token = token.into();
        self
    }

    pub fn with_private_key(mut self, key: impl Into<String>) -> Self {
        self.private_key = Some(key.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// `{code, message, tx, data}`, the envelope of every non-chain path
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GatewayResponse {
    #[serde(default)]
    pub code: i64,
    #[serde(default)]
    pub message: String,
    /// hex transaction hash for writes
    #[serde(default)]
    pub tx: Option<String>,
    #[serde(default)]
    pub data: Value,
}

#[derive(Debug, Deserialize)]
struct TmError {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    message: String,
    #[serde(default)]
    data: String,
}

#[derive(Debug, Deserialize)]
struct TmResponse {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<TmError>,
}

pub(crate) fn decode_tm<T: DeserializeOwned>(body: &[u8]) -> Result<T> {
    let envelope: TmResponse = serde_json::from_slice(body)?;
    if let Some(error) = envelope.error {
        return Err(Error::Rpc {
            code: error.code,
            message: error.message,
            data: error.data,
        });
    }
    Ok(serde_json::from_value(envelope.result.unwrap_or(Value::Null))?)
}

pub(crate) fn decode_gateway(body: &[u8]) -> Result<GatewayResponse> {
    let envelope: GatewayResponse = serde_json::from_slice(body)?;
    if envelope.code != 0 {
        return Err(Error::Query(format!(
            "gateway error {}: {}",
            envelope.code, envelope.message
        )));
    }
    Ok(envelope)
}

/// Client over one or more gateway addresses, picked round robin per request
#[derive(Debug)]
pub struct GatewayClient {
    http: Client,
    options: GatewayOptions,
    next_addr: AtomicU32,
}

impl GatewayClient {
    pub fn new(options: GatewayOptions) -> Result<Self> {
        if options.addrs.is_empty() {
            return Err(Error::Validation("gateway needs at least one address".to_string()));
        }
        let http = Client::builder().timeout(options.timeout).build()?;
        Ok(Self {
            http,
            options,
            next_addr: AtomicU32::new(0),
        })
    }

    pub fn database(&self) -> Database<'_> {
        Database::new(self)
    }

    pub fn cluster(&self) -> Cluster<'_> {
        Cluster::new(self)
    }

    pub fn chain(&self) -> Chain<'_> {
        Chain::new(self)
    }

    pub fn options(&self) -> &GatewayOptions {
        &self.options
    }

    fn select_addr(&self) -> &str {
        let addrs = &self.options.addrs;
        if addrs.len() == 1 {
            return &addrs[0];
        }
        let i = self.next_addr.fetch_add(1, Ordering::Relaxed).wrapping_add(1) as usize;
        &addrs[i % addrs.len()]
    }

    fn join_url(&self, path: &str) -> String {
        format!("{}{}", self.select_addr(), path)
    }

    async fn read_body(path: &str, response: Response) -> Result<Vec<u8>> {
        let status = response.status();
        let body = response.bytes().await?.to_vec();
        if !status.is_success() {
            // an error envelope says more than the status line
            let envelope_error = if path.starts_with(TM_PREFIX) {
                decode_tm::<Value>(&body).err()
            } else {
                decode_gateway(&body).err()
            };
            return Err(match envelope_error {
                Some(e @ (Error::Rpc { .. } | Error::Query(_))) => e,
                _ => Error::Http {
                    status: status.as_u16(),
                    body: String::from_utf8_lossy(&body).into_owned(),
                },
            });
        }
        log::debug!("gateway {} answered {}", path, status);
        Ok(body)
    }

    pub(crate) async fn post_raw<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<Vec<u8>> {
        let response = self
            .http
            .post(self.join_url(path))
            .header("access_token", &self.options.access_token)
            .json(body)
            .send()
            .await?;
        Self::read_body(path, response).await
    }

    pub(crate) async fn get_raw(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<u8>> {
        let response = self
            .http
            .get(self.join_url(path))
            .header("access_token", &self.options.access_token)
            .query(params)
            .send()
            .await?;
        Self::read_body(path, response).await
    }

    pub(crate) async fn post<B: Serialize + ?Sized>(&self, path: &str, body: &B) -> Result<GatewayResponse> {
        debug_assert!(!path.starts_with(TM_PREFIX));
        decode_gateway(&self.post_raw(path, body).await?)
    }

    pub(crate) async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<GatewayResponse> {
        debug_assert!(!path.starts_with(TM_PREFIX));
        decode_gateway(&self.get_raw(path, params).await?)
    }

    pub(crate) async fn get_chain<T: DeserializeOwned>(
        &self,
        path: &str,
        params: &[(&str, String)],
    ) -> Result<T> {
        debug_assert!(path.starts_with(TM_PREFIX));
        decode_tm(&self.get_raw(path, params).await?)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;
    use tokio::sync::mpsc;

    /// One HTTP request as the test server saw it
    #[derive(Debug)]
    pub(crate) struct Captured {
        pub head: String,
        pub body: Vec<u8>,
    }

    impl Captured {
        pub fn json(&self) -> Value {
            serde_json::from_slice(&self.body).unwrap()
        }

        pub fn request_line(&self) -> &str {
            self.head.lines().next().unwrap_or_default()
        }
    }

    fn content_length(head: &str) -> usize {
        head.lines()
            .filter_map(|line| line.split_once(':'))
            .find(|(name, _)| name.trim().eq_ignore_ascii_case("content-length"))
            .and_then(|(_, value)| value.trim().parse().ok())
            .unwrap_or(0)
    }

    /// Serves `reply` to every request and forwards what it received
    pub(crate) async fn serve(reply: &'static str) -> (String, mpsc::UnboundedReceiver<Captured>) {
        serve_status("200 OK", reply).await
    }

    /// Like `serve`, answering with the given status line
    pub(crate) async fn serve_status(
        status: &'static str,
        reply: &'static str,
    ) -> (String, mpsc::UnboundedReceiver<Captured>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            while let Ok((mut stream, _)) = listener.accept().await {
                let tx = tx.clone();
                tokio::spawn(async move {
                    let mut buf = Vec::new();
                    let mut chunk = [0u8; 4096];
                    let split = loop {
                        let n = stream.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            return;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
                            break pos + 4;
                        }
                    };
                    let head = String::from_utf8_lossy(&buf[..split]).into_owned();
                    let want = content_length(&head);
                    while buf.len() < split + want {
                        let n = stream.read(&mut chunk).await.unwrap();
                        if n == 0 {
                            break;
                        }
                        buf.extend_from_slice(&chunk[..n]);
                    }
                    let body = buf[split..].to_vec();
                    let _ = tx.send(Captured { head, body });

                    let response = format!(
                        "HTTP/1.1 {}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{}",
                        status,
                        reply.len(),
                        reply
                    );
                    let _ = stream.write_all(response.as_bytes()).await;
                    let _ = stream.shutdown().await;
                });
            }
        });
        (format!("http://{addr}"), rx)
    }

    pub(crate) fn client_for(addr: &str) -> GatewayClient {
        GatewayClient::new(
            GatewayOptions::default()
                .with_addrs([addr])
                .with_access_token("token-1"),
        )
        .unwrap()
    }

    #[test]
    fn test_round_robin() {
        let client = GatewayClient::new(
            GatewayOptions::default().with_addrs(["http://a/", "http://b", "http://c"]),
        )
        .unwrap();
        let picked: Vec<String> = (0..6).map(|_| client.select_addr().to_string()).collect();
        assert_eq!(
            picked,
            ["http://b", "http://c", "http://a", "http://b", "http://c", "http://a"]
        );
    }

    #[test]
    fn test_no_addrs_is_rejected() {
        let options = GatewayOptions::default().with_addrs(Vec::<String>::new());
        assert!(matches!(GatewayClient::new(options), Err(Error::Validation(_))));
    }

    #[test]
    fn test_gateway_envelope() {
        let ok = decode_gateway(br#"{"code":0,"message":"ok","tx":"AB12","data":{"x":1}}"#).unwrap();
        assert_eq!(ok.tx.as_deref(), Some("AB12"));
        assert_eq!(ok.data["x"], 1);

        let err = decode_gateway(br#"{"code":3,"message":"schema not found"}"#).unwrap_err();
        assert!(err.to_string().contains("schema not found"));
    }

    #[test]
    fn test_tm_envelope() {
        let height: crate::node::Validators =
            decode_tm(br#"{"jsonrpc":"2.0","result":{"block_height":"9","count":"0","total":"0"}}"#).unwrap();
        assert_eq!(height.block_height, 9);

        let err = decode_tm::<Value>(br#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error","data":"height too high"}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::Rpc { code: -32603, .. }));
    }

    #[tokio::test]
    async fn test_access_token_header_is_sent() {
        let (addr, mut requests) = serve(r#"{"code":0,"message":"","data":"[]"}"#).await;
        let client = client_for(&addr);
        client.get("/v1/list_schema", &[]).await.unwrap();

        let captured = requests.recv().await.unwrap();
        assert!(captured.request_line().starts_with("GET /v1/list_schema"));
        assert!(captured.head.to_ascii_lowercase().contains("access_token: token-1"));
    }

    #[tokio::test]
    async fn test_failed_status_with_ok_envelope_is_an_error() {
        let (addr, _requests) = serve_status("502 Bad Gateway", r#"{"code":0,"message":"","data":{}}"#).await;
        let client = client_for(&addr);
        let err = client.get("/v1/list_schema", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Http { status: 502, .. }));
    }

    #[tokio::test]
    async fn test_failed_status_keeps_envelope_error() {
        let (addr, _requests) = serve_status("400 Bad Request", r#"{"code":3,"message":"schema not found"}"#).await;
        let err = client_for(&addr).get("/v1/get_schema", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Query(ref msg) if msg.contains("schema not found")));

        let (addr, _requests) = serve_status(
            "500 Internal Server Error",
            r#"{"jsonrpc":"2.0","error":{"code":-32603,"message":"Internal error","data":"height too high"}}"#,
        )
        .await;
        let err = client_for(&addr).get_chain::<Value>("/v1/chain/block", &[]).await.unwrap_err();
        assert!(matches!(err, Error::Rpc { code: -32603, .. }));
    }
}
