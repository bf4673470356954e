mod common;

use std::path::Path;

use assert_matches::assert_matches;
use k8s_mock::{HttpMockK8sServer, RunningHttpMockK8sServer};
use kubetable::k8s::{
	client::{ClusterConnection, ConnectOptions, ConnectionError},
	collect::Collector,
};

/// Kubeconfig files are YAML, which accepts JSON as written by serde_json.
fn write_kubeconfig(server: &RunningHttpMockK8sServer, context: &str, path: &Path) {
	let kubeconfig = server.kubeconfig_with_context(context);
	std::fs::write(path, serde_json::to_string_pretty(&kubeconfig).unwrap()).unwrap();
}

#[tokio::test]
async fn test_connect_with_kubeconfig_file() {
	let server = HttpMockK8sServer::builder()
		.resources(vec![common::deployment("default", "nginx")])
		.build()
		.start()
		.await;
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("config");
	write_kubeconfig(&server, "staging", &path);

	let connection = ClusterConnection::connect(&ConnectOptions {
		kubeconfig: Some(path),
		context: None,
	})
	.await
	.unwrap();

	assert!(connection.cluster_identifier().contains(&server.uri()));
	assert!(connection.cluster_identifier().contains("context:staging"));

	let collection = Collector::new(connection.client().clone()).collect().await;
	assert_eq!(collection.workloads.len(), 1);
}

#[tokio::test]
async fn test_connect_with_explicit_context() {
	let server = HttpMockK8sServer::builder().build().start().await;
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("config");
	write_kubeconfig(&server, "production", &path);

	let connection = ClusterConnection::connect(&ConnectOptions {
		kubeconfig: Some(path),
		context: Some("production".to_string()),
	})
	.await
	.unwrap();

	assert!(connection.cluster_identifier().contains("context:production"));
}

#[tokio::test]
async fn test_connect_with_unknown_context() {
	let server = HttpMockK8sServer::builder().build().start().await;
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("config");
	write_kubeconfig(&server, "production", &path);

	let result = ClusterConnection::connect(&ConnectOptions {
		kubeconfig: Some(path),
		context: Some("staging".to_string()),
	})
	.await;

	assert_matches!(result, Err(ConnectionError::ContextNotFound(name)) if name == "staging");
}

#[tokio::test]
async fn test_connect_with_malformed_kubeconfig() {
	let dir = tempfile::tempdir().unwrap();
	let path = dir.path().join("config");
	std::fs::write(&path, "clusters: [this is not: a kubeconfig").unwrap();

	let result = ClusterConnection::connect(&ConnectOptions {
		kubeconfig: Some(path.clone()),
		context: None,
	})
	.await;

	assert_matches!(result, Err(ConnectionError::ReadKubeconfig { path: p, .. }) if p == path);
}
