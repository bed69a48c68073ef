//! Kubernetes integration for kubectl-trail
//!
//! This crate resolves which Loki endpoint to query: an explicit URL, a
//! `namespace/service` pair, or a service discovered in the cluster. Cluster
//! targets are reached through the API server's service proxy.

mod discovery;
mod resolver;

pub use discovery::{discover_loki, select_service, ServiceRef, LOKI_PORT, LOKI_SERVICE_SELECTOR};
pub use resolver::{proxy_path, resolve_client, BackendTarget, KubeOptions};
