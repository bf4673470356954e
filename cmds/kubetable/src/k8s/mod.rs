//! Kubernetes API access.
//!
//! Connections are built with kube-rs from kubeconfig or in-cluster
//! credentials; workloads are listed with the typed k8s-openapi resources.

pub mod client;
pub mod collect;
