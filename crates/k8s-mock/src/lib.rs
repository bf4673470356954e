//! Mock Kubernetes API server for testing.
//!
//! Serves list endpoints for a fixed set of resources over HTTP, so it can be
//! used with ordinary kubeconfig-based connections. Individual resources can be
//! made to fail or to respond slowly.

pub mod discovery;
pub mod http;

pub use discovery::{MockApiResource, MockDiscovery};
pub use http::{HttpMockK8sServer, RunningHttpMockK8sServer};
