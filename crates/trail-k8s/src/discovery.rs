use k8s_openapi::api::core::v1::Service;
use kube::Api;
use kube::api::ListParams;
use tracing::{debug, warn};

use trail_loki::{Error, Result};

/// Port Loki serves its HTTP API on
pub const LOKI_PORT: i32 = 3100;

/// Label selector matching services of a Loki installation
pub const LOKI_SERVICE_SELECTOR: &str = "app.kubernetes.io/name=loki";

/// A service located by namespace and name
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceRef {
    pub namespace: String,
    pub name: String,
}

impl ServiceRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl std::fmt::Display for ServiceRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

/// Find the Loki service in `namespace`, or in all namespaces when `None`
pub async fn discover_loki(client: &kube::Client, namespace: Option<&str>) -> Result<ServiceRef> {
    let services: Api<Service> = match namespace {
        Some(ns) => Api::namespaced(client.clone(), ns),
        None => Api::all(client.clone()),
    };

    let list = services
        .list(&ListParams::default().labels(LOKI_SERVICE_SELECTOR))
        .await?;

    debug!(candidates = list.items.len(), "listed Loki services");

    select_service(&list.items).ok_or_else(|| {
        Error::Discovery(format!(
            "no service labelled {LOKI_SERVICE_SELECTOR} exposes port {LOKI_PORT}"
        ))
    })
}

/// Pick the service to proxy to.
///
/// A headless service on the Loki port wins; otherwise the first service on
/// that port is used.
pub fn select_service(services: &[Service]) -> Option<ServiceRef> {
    if let Some(service) = services
        .iter()
        .find(|s| is_headless(s) && exposes_loki_port(s))
    {
        return Some(service_ref(service));
    }

    let service = services.iter().find(|s| exposes_loki_port(s))?;
    warn!(
        service = %service_ref(service),
        "no headless Loki service found, using first service on port {LOKI_PORT}"
    );
    Some(service_ref(service))
}

fn is_headless(service: &Service) -> bool {
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.cluster_ip.as_deref())
        == Some("None")
}

fn exposes_loki_port(service: &Service) -> bool {
    service
        .spec
        .as_ref()
        .and_then(|spec| spec.ports.as_ref())
        .is_some_and(|ports| ports.iter().any(|p| p.port == LOKI_PORT))
}

fn service_ref(service: &Service) -> ServiceRef {
    ServiceRef::new(
        service.metadata.namespace.clone().unwrap_or_default(),
        service.metadata.name.clone().unwrap_or_default(),
    )
}
