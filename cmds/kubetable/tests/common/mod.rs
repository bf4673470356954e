#![allow(dead_code)]

use k8s_mock::RunningHttpMockK8sServer;
use kubetable::k8s::client::ClusterConnection;
use serde_json::{json, Value};

pub fn manifest(api_version: &str, kind: &str, namespace: &str, name: &str) -> Value {
	json!({
		"apiVersion": api_version,
		"kind": kind,
		"metadata": { "name": name, "namespace": namespace }
	})
}

pub fn deployment(namespace: &str, name: &str) -> Value {
	manifest("apps/v1", "Deployment", namespace, name)
}

pub fn stateful_set(namespace: &str, name: &str) -> Value {
	manifest("apps/v1", "StatefulSet", namespace, name)
}

pub fn daemon_set(namespace: &str, name: &str) -> Value {
	manifest("apps/v1", "DaemonSet", namespace, name)
}

pub fn job(namespace: &str, name: &str) -> Value {
	manifest("batch/v1", "Job", namespace, name)
}

pub async fn connect(server: &RunningHttpMockK8sServer) -> ClusterConnection {
	ClusterConnection::from_kubeconfig(server.kubeconfig(), None)
		.await
		.unwrap()
}
