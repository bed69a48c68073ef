//! HTTP client for a single Loki endpoint

use http_body_util::BodyExt;
use tracing::debug;

use crate::error::{Error, Result};

/// How requests reach Loki
#[derive(Clone)]
pub enum Transport {
    /// Plain HTTP(S) to an absolute URL
    Direct(reqwest::Client),

    /// Through the Kubernetes API server; the client's base path is relative
    /// to the cluster URL and authentication comes from the kubeconfig
    Cluster(kube::Client),
}

impl std::fmt::Debug for Transport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Direct(_) => f.write_str("Direct"),
            Self::Cluster(_) => f.write_str("Cluster"),
        }
    }
}

/// Loki client bound to one base URL
#[derive(Clone, Debug)]
pub struct LokiClient {
    base: String,
    transport: Transport,
}

impl LokiClient {
    /// Create a client for an absolute URL using a default HTTP client
    pub fn new(url: &str) -> Self {
        Self::with_transport(url, Transport::Direct(reqwest::Client::new()))
    }

    /// Create a client that sends requests over the given transport
    pub fn with_transport(base: &str, transport: Transport) -> Self {
        Self {
            base: base.trim_end_matches('/').to_string(),
            transport,
        }
    }

    /// Base URL (or API-server relative path for cluster transport)
    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn transport(&self) -> &Transport {
        &self.transport
    }

    /// GET `path` with url-encoded `params` and return the body of a 2xx reply
    pub(crate) async fn get(&self, path: &str, params: &[(&str, String)]) -> Result<Vec<u8>> {
        let mut uri = format!("{}{}", self.base, path);
        if !params.is_empty() {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .extend_pairs(params)
                .finish();
            uri.push('?');
            uri.push_str(&query);
        }

        debug!(%uri, transport = ?self.transport, "GET");

        match &self.transport {
            Transport::Direct(client) => {
                let resp = client.get(&uri).send().await?;
                let status = resp.status();
                if !status.is_success() {
                    let body = resp
                        .text()
                        .await
                        .unwrap_or_else(|_| format!("error {status}"));
                    return Err(Error::Backend {
                        status: status.as_u16(),
                        body,
                    });
                }
                Ok(resp.bytes().await?.to_vec())
            }
            Transport::Cluster(client) => {
                let request = http::Request::get(uri.as_str())
                    .body(kube::client::Body::from(Vec::<u8>::new()))
                    .map_err(|e| Error::Transport(e.into()))?;
                let resp = client.send(request).await?;
                let status = resp.status();
                let body = resp.into_body().collect().await.map(|b| b.to_bytes());

                if !status.is_success() {
                    let body = body
                        .map(|b| String::from_utf8_lossy(&b).into_owned())
                        .unwrap_or_else(|_| format!("error {status}"));
                    return Err(Error::Backend {
                        status: status.as_u16(),
                        body,
                    });
                }

                let bytes = body.map_err(|e| Error::Transport(e.into()))?;
                Ok(bytes.to_vec())
            }
        }
    }
}
