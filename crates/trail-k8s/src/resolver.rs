//! Loki endpoint resolution

use std::path::PathBuf;
use std::str::FromStr;

use kube::config::{KubeConfigOptions, Kubeconfig};
use tracing::{debug, info};
use url::Url;

use trail_loki::{Error, LokiClient, Result, Transport};

use crate::discovery::{discover_loki, ServiceRef, LOKI_PORT};

/// Where to find Loki, parsed once from the `--url` value
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum BackendTarget {
    /// Absolute http(s) URL, queried without the cluster
    Direct(Url),
    /// Known service, reached through the API server proxy
    Service(ServiceRef),
    /// Find the service by label, then proxy to it
    Discover,
}

impl FromStr for BackendTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Ok(Self::Discover);
        }

        if let Ok(url) = Url::parse(s) {
            if matches!(url.scheme(), "http" | "https") {
                return Ok(Self::Direct(url));
            }
        }

        match s.split('/').collect::<Vec<_>>().as_slice() {
            [namespace, name] if !namespace.is_empty() && !name.is_empty() => {
                Ok(Self::Service(ServiceRef::new(*namespace, *name)))
            }
            _ => Err(Error::Discovery(format!(
                "invalid backend target {s:?}: expected an http(s) URL or namespace/service"
            ))),
        }
    }
}

/// Where to read cluster credentials from
#[derive(Clone, Debug, Default)]
pub struct KubeOptions {
    /// Kubeconfig path; `$KUBECONFIG` or `~/.kube/config` when unset
    pub kubeconfig: Option<PathBuf>,
    /// Context to use instead of the kubeconfig's current context
    pub context: Option<String>,
}

/// API-server path proxying to port 3100 of `service`
pub fn proxy_path(service: &ServiceRef) -> String {
    format!(
        "/api/v1/namespaces/{}/services/{}:{}/proxy",
        service.namespace, service.name, LOKI_PORT
    )
}

/// Resolve the `--url` value into a client bound to a Loki endpoint
pub async fn resolve_client(explicit: &str, options: &KubeOptions) -> Result<LokiClient> {
    explicit.parse::<BackendTarget>()?.connect(options).await
}

impl BackendTarget {
    /// Build a client for this target, discovering the service if needed
    pub async fn connect(&self, options: &KubeOptions) -> Result<LokiClient> {
        if let Self::Direct(url) = self {
            debug!(%url, "using explicit Loki URL");
            return Ok(LokiClient::new(url.as_str()));
        }

        let config = load_config(options).await?;
        let cluster_url = config.cluster_url.to_string();
        let client = kube::Client::try_from(config)
            .map_err(|e| Error::Credentials(format!("failed to create client: {e}")))?;

        let service = match self {
            Self::Service(service) => service.clone(),
            _ => discover_loki(&client, None).await?,
        };

        let path = proxy_path(&service);
        info!(
            %service,
            endpoint = %format!("{}{}", cluster_url.trim_end_matches('/'), path),
            "proxying to Loki through the API server"
        );

        Ok(LokiClient::with_transport(&path, Transport::Cluster(client)))
    }
}

async fn load_config(options: &KubeOptions) -> Result<kube::Config> {
    let kubeconfig = match &options.kubeconfig {
        Some(path) => Kubeconfig::read_from(path),
        None => Kubeconfig::read(),
    }
    .map_err(|e| Error::Credentials(format!("failed to read kubeconfig: {e}")))?;

    kube::Config::from_custom_kubeconfig(
        kubeconfig,
        &KubeConfigOptions {
            context: options.context.clone(),
            ..Default::default()
        },
    )
    .await
    .map_err(|e| Error::Credentials(format!("failed to load kubeconfig: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_direct_url() {
        let target: BackendTarget = "http://loki.local:3100".parse().unwrap();
        assert!(matches!(target, BackendTarget::Direct(url) if url.port() == Some(3100)));
    }

    #[test]
    fn test_parse_service() {
        let target: BackendTarget = "monitoring/loki".parse().unwrap();
        assert_eq!(
            target,
            BackendTarget::Service(ServiceRef::new("monitoring", "loki"))
        );
    }

    #[test]
    fn test_parse_empty_discovers() {
        assert_eq!("".parse::<BackendTarget>().unwrap(), BackendTarget::Discover);
    }

    #[test]
    fn test_parse_invalid_shapes() {
        for input in ["loki", "a/b/c", "/loki", "monitoring/", "localhost:3100"] {
            assert!(
                matches!(input.parse::<BackendTarget>(), Err(Error::Discovery(_))),
                "{input} should be rejected"
            );
        }
    }

    #[test]
    fn test_proxy_path() {
        assert_eq!(
            proxy_path(&ServiceRef::new("monitoring", "loki")),
            "/api/v1/namespaces/monitoring/services/loki:3100/proxy"
        );
    }

    #[tokio::test]
    async fn test_direct_target_needs_no_cluster() {
        let options = KubeOptions {
            kubeconfig: Some(PathBuf::from("/nonexistent/kubeconfig")),
            context: None,
        };
        let client = resolve_client("https://loki.example.com/", &options)
            .await
            .unwrap();
        assert_eq!(client.base(), "https://loki.example.com");
        assert!(matches!(client.transport(), Transport::Direct(_)));
    }

    #[tokio::test]
    async fn test_missing_kubeconfig_is_credentials_error() {
        let options = KubeOptions {
            kubeconfig: Some(PathBuf::from("/nonexistent/kubeconfig")),
            context: None,
        };
        let err = resolve_client("monitoring/loki", &options).await.unwrap_err();
        assert!(matches!(err, Error::Credentials(_)));
    }
}
