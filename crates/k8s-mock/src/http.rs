//! HTTP-based mock Kubernetes server using wiremock.
//!
//! This provides a real HTTP server that can be used with actual kubeconfig-based
//! connections. Only list endpoints are served; anything else returns 404.

use std::{collections::HashMap, sync::Arc, time::Duration};

use bon::Builder;
use kube::config::{
	AuthInfo, Cluster, Context, Kubeconfig, NamedAuthInfo, NamedCluster, NamedContext,
};
use tracing::{debug, trace};
use wiremock::{
	matchers::{method, path_regex},
	Mock, MockServer, Request, ResponseTemplate,
};

use super::discovery::{MockApiResource, MockDiscovery};

/// A mock Kubernetes server exposed over HTTP.
#[derive(Builder)]
pub struct HttpMockK8sServer {
	/// Resources to serve as raw manifests. The server derives list paths from
	/// apiVersion/kind using the discovery data.
	#[builder(default)]
	resources: Vec<serde_json::Value>,
	/// Plural resource names (e.g. `jobs`) whose list calls are rejected
	/// with `403 Forbidden`.
	#[builder(default)]
	forbidden: Vec<String>,
	/// Plural resource names whose continue tokens are rejected with
	/// `410 Gone`, so only the first page of a paged list succeeds.
	#[builder(default)]
	expired_continue: Vec<String>,
	/// Artificial response latency per plural resource name.
	#[builder(default)]
	delays: HashMap<String, Duration>,
}

/// A running HTTP mock server instance.
pub struct RunningHttpMockK8sServer {
	server: MockServer,
}

/// A manifest registered under the resource it belongs to.
struct StoredObject {
	resource: usize,
	namespace: Option<String>,
	manifest: serde_json::Value,
}

struct State {
	discovery: MockDiscovery,
	objects: Vec<StoredObject>,
	forbidden: Vec<String>,
	expired_continue: Vec<String>,
	delays: HashMap<String, Duration>,
}

impl HttpMockK8sServer {
	/// Start the mock server with all configured resources.
	pub async fn start(self) -> RunningHttpMockK8sServer {
		let server = MockServer::start().await;
		let discovery = MockDiscovery::default();

		debug!(uri = %server.uri(), "Started mock K8s server");

		let mut objects = Vec::new();
		for manifest in self.resources {
			let Some((resource, namespace)) = resource_for_manifest(&manifest, &discovery) else {
				debug!(manifest = %manifest, "Skipping manifest of unknown kind");
				continue;
			};
			trace!(
				resource = %discovery.resources[resource].name,
				namespace = ?namespace,
				"Registered resource"
			);
			objects.push(StoredObject {
				resource,
				namespace,
				manifest,
			});
		}

		let state = Arc::new(State {
			discovery,
			objects,
			forbidden: self.forbidden,
			expired_continue: self.expired_continue,
			delays: self.delays,
		});

		mount_lists(&server, state).await;

		RunningHttpMockK8sServer { server }
	}
}

/// Find the resource a manifest belongs to, and its namespace.
fn resource_for_manifest(
	manifest: &serde_json::Value,
	discovery: &MockDiscovery,
) -> Option<(usize, Option<String>)> {
	let api_version = manifest.get("apiVersion")?.as_str()?;
	let kind = manifest.get("kind")?.as_str()?;
	let resource = discovery
		.resources
		.iter()
		.position(|r| r.api_version == api_version && r.kind == kind)?;

	let namespace = discovery.resources[resource].namespaced.then(|| {
		manifest
			.pointer("/metadata/namespace")
			.and_then(|n| n.as_str())
			.unwrap_or("default")
			.to_string()
	});

	Some((resource, namespace))
}

impl RunningHttpMockK8sServer {
	/// Get the server's URI (e.g., "http://127.0.0.1:12345").
	pub fn uri(&self) -> String {
		self.server.uri()
	}

	/// Create a Kubeconfig pointing to this mock server.
	pub fn kubeconfig(&self) -> Kubeconfig {
		self.kubeconfig_with_context("mock-context")
	}

	/// Create a Kubeconfig pointing to this mock server with a custom context name.
	pub fn kubeconfig_with_context(&self, context_name: &str) -> Kubeconfig {
		let cluster_name = "mock-cluster";
		let user_name = "mock-user";

		Kubeconfig {
			clusters: vec![NamedCluster {
				name: cluster_name.to_string(),
				cluster: Some(Cluster {
					server: Some(self.uri()),
					insecure_skip_tls_verify: Some(true),
					..Default::default()
				}),
			}],
			contexts: vec![NamedContext {
				name: context_name.to_string(),
				context: Some(Context {
					cluster: cluster_name.to_string(),
					user: Some(user_name.to_string()),
					namespace: Some("default".to_string()),
					..Default::default()
				}),
			}],
			auth_infos: vec![NamedAuthInfo {
				name: user_name.to_string(),
				auth_info: Some(AuthInfo::default()),
			}],
			current_context: Some(context_name.to_string()),
			..Default::default()
		}
	}
}

async fn mount_lists(server: &MockServer, state: Arc<State>) {
	Mock::given(method("GET"))
		.and(path_regex(r"^/api(s)?/.*"))
		.respond_with(move |req: &Request| respond_to_list(&state, req))
		.mount(server)
		.await;
}

fn respond_to_list(state: &State, req: &Request) -> ResponseTemplate {
	let path_str = req.url.path();

	let matched = state
		.discovery
		.resources
		.iter()
		.enumerate()
		.find_map(|(index, resource)| {
			let namespace = resource.match_list_path(path_str)?;
			Some((index, resource, namespace))
		});
	let Some((index, resource, namespace)) = matched else {
		return status_response(
			404,
			"NotFound",
			"the server could not find the requested resource",
		);
	};

	let delay = state.delays.get(&resource.name).copied();
	let with_delay = |template: ResponseTemplate| match delay {
		Some(delay) => template.set_delay(delay),
		None => template,
	};

	if state.forbidden.contains(&resource.name) {
		trace!(resource = %resource.name, "Rejecting list call");
		return with_delay(status_response(
			403,
			"Forbidden",
			&format!(
				"{} is forbidden: User \"mock-user\" cannot list resource \"{}\"",
				resource.name, resource.name
			),
		));
	}

	let continues = req.url.query_pairs().any(|(key, _)| key == "continue");
	if continues && state.expired_continue.contains(&resource.name) {
		trace!(resource = %resource.name, "Rejecting continue token");
		return with_delay(status_response(
			410,
			"Expired",
			"The provided continue parameter is too old to display a consistent list result.",
		));
	}

	let items: Vec<&serde_json::Value> = state
		.objects
		.iter()
		.filter(|o| o.resource == index)
		.filter(|o| namespace.is_none() || o.namespace.as_deref() == namespace)
		.map(|o| &o.manifest)
		.collect();

	with_delay(ResponseTemplate::new(200).set_body_json(list_page(resource, &items, req)))
}

/// Build one page of a list response, honouring `limit` and `continue`.
///
/// Continue tokens are plain offsets into the item list.
fn list_page(
	resource: &MockApiResource,
	items: &[&serde_json::Value],
	req: &Request,
) -> serde_json::Value {
	let mut limit = None;
	let mut offset = 0;
	for (key, value) in req.url.query_pairs() {
		match key.as_ref() {
			"limit" => limit = value.parse::<usize>().ok().filter(|l| *l > 0),
			"continue" => offset = value.parse::<usize>().unwrap_or(0),
			_ => {}
		}
	}

	let offset = offset.min(items.len());
	let end = limit.map_or(items.len(), |l| (offset + l).min(items.len()));

	let mut metadata = serde_json::json!({ "resourceVersion": "1" });
	if end < items.len() {
		metadata["continue"] = serde_json::Value::String(end.to_string());
	}

	serde_json::json!({
		"kind": format!("{}List", resource.kind),
		"apiVersion": resource.api_version,
		"metadata": metadata,
		"items": &items[offset..end],
	})
}

fn status_response(code: u16, reason: &str, message: &str) -> ResponseTemplate {
	ResponseTemplate::new(code).set_body_json(serde_json::json!({
		"kind": "Status",
		"apiVersion": "v1",
		"metadata": {},
		"status": "Failure",
		"message": message,
		"reason": reason,
		"code": code
	}))
}

#[cfg(test)]
mod tests {
	use k8s_openapi::api::apps::v1::Deployment;
	use kube::{api::ListParams, config::KubeConfigOptions, Api};

	use super::*;

	fn deployment(namespace: &str, name: &str) -> serde_json::Value {
		serde_json::json!({
			"apiVersion": "apps/v1",
			"kind": "Deployment",
			"metadata": { "name": name, "namespace": namespace }
		})
	}

	#[test]
	fn test_resource_for_manifest() {
		let discovery = MockDiscovery::default();

		let (index, namespace) =
			resource_for_manifest(&deployment("web", "nginx"), &discovery).unwrap();
		assert_eq!(discovery.resources[index].name, "deployments");
		assert_eq!(namespace.as_deref(), Some("web"));

		let unknown = serde_json::json!({
			"apiVersion": "example.com/v1",
			"kind": "Widget",
			"metadata": { "name": "w" }
		});
		assert!(resource_for_manifest(&unknown, &discovery).is_none());
	}

	#[test]
	fn test_namespace_defaults_for_namespaced_resources() {
		let discovery = MockDiscovery::default();
		let manifest = serde_json::json!({
			"apiVersion": "batch/v1",
			"kind": "Job",
			"metadata": { "name": "backup" }
		});

		let (_, namespace) = resource_for_manifest(&manifest, &discovery).unwrap();
		assert_eq!(namespace.as_deref(), Some("default"));
	}

	async fn client(server: &RunningHttpMockK8sServer) -> kube::Client {
		let config =
			kube::Config::from_custom_kubeconfig(server.kubeconfig(), &KubeConfigOptions::default())
				.await
				.unwrap();
		kube::Client::try_from(config).unwrap()
	}

	#[tokio::test]
	async fn test_list_all_namespaces_and_paging() {
		let server = HttpMockK8sServer::builder()
			.resources(vec![
				deployment("a", "one"),
				deployment("b", "two"),
				deployment("b", "three"),
			])
			.build()
			.start()
			.await;
		let api: Api<Deployment> = Api::all(client(&server).await);

		let all = api.list(&ListParams::default()).await.unwrap();
		assert_eq!(all.items.len(), 3);
		assert_eq!(all.metadata.continue_, None);

		let first = api.list(&ListParams::default().limit(2)).await.unwrap();
		assert_eq!(first.items.len(), 2);
		assert_eq!(first.metadata.continue_.as_deref(), Some("2"));

		let second = api
			.list(&ListParams::default().limit(2).continue_token("2"))
			.await
			.unwrap();
		assert_eq!(second.items.len(), 1);
		assert_eq!(second.items[0].metadata.name.as_deref(), Some("three"));
	}

	#[tokio::test]
	async fn test_namespaced_list() {
		let server = HttpMockK8sServer::builder()
			.resources(vec![deployment("a", "one"), deployment("b", "two")])
			.build()
			.start()
			.await;
		let api: Api<Deployment> = Api::namespaced(client(&server).await, "b");

		let list = api.list(&ListParams::default()).await.unwrap();
		assert_eq!(list.items.len(), 1);
		assert_eq!(list.items[0].metadata.name.as_deref(), Some("two"));
	}

	#[tokio::test]
	async fn test_expired_continue_token() {
		let server = HttpMockK8sServer::builder()
			.resources(vec![deployment("a", "one"), deployment("a", "two")])
			.expired_continue(vec!["deployments".to_string()])
			.build()
			.start()
			.await;
		let api: Api<Deployment> = Api::all(client(&server).await);

		let first = api.list(&ListParams::default().limit(1)).await.unwrap();
		assert_eq!(first.items.len(), 1);
		assert_eq!(first.metadata.continue_.as_deref(), Some("1"));

		assert!(api
			.list(&ListParams::default().limit(1).continue_token("1"))
			.await
			.is_err());
	}

	#[tokio::test]
	async fn test_forbidden_resource() {
		let server = HttpMockK8sServer::builder()
			.resources(vec![deployment("a", "one")])
			.forbidden(vec!["deployments".to_string()])
			.build()
			.start()
			.await;
		let api: Api<Deployment> = Api::all(client(&server).await);

		assert!(api.list(&ListParams::default()).await.is_err());
	}
}
