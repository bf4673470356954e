//! Kubernetes cluster connection management.

use std::path::PathBuf;

use kube::{
	config::{InferConfigError, KubeConfigOptions, Kubeconfig, KubeconfigError},
	Client, Config,
};
use thiserror::Error;
use tracing::instrument;

/// Errors that can occur when connecting to a Kubernetes cluster.
#[derive(Debug, Error)]
pub enum ConnectionError {
	#[error("failed to read kubeconfig {}", path.display())]
	ReadKubeconfig {
		path: PathBuf,
		#[source]
		source: KubeconfigError,
	},

	#[error("no context named `{0}` was found. Please check your kubeconfig")]
	ContextNotFound(String),

	#[error(transparent)]
	Kubeconfig(#[from] KubeconfigError),

	#[error("failed to discover cluster credentials")]
	Infer(#[from] InferConfigError),

	#[error(transparent)]
	Kube(#[from] kube::Error),
}

/// Where to find cluster credentials.
///
/// With neither field set, credentials are discovered the usual way:
/// `$KUBECONFIG`, then `~/.kube/config`, then the in-cluster service account.
#[derive(Debug, Clone, Default)]
pub struct ConnectOptions {
	/// Explicit kubeconfig file.
	pub kubeconfig: Option<PathBuf>,
	/// Context to use instead of the kubeconfig's current context.
	pub context: Option<String>,
}

/// Represents a connection to a Kubernetes cluster.
#[derive(Clone)]
pub struct ClusterConnection {
	client: Client,
	/// Human-readable identifier for the cluster (context name or API server URL).
	cluster_identifier: String,
}

impl std::fmt::Debug for ClusterConnection {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ClusterConnection")
			.field("cluster_identifier", &self.cluster_identifier)
			.finish_non_exhaustive()
	}
}

impl ClusterConnection {
	/// Connect using the given options.
	///
	/// No request is sent to the API server here; an unreachable cluster only
	/// shows up once workloads are listed.
	#[instrument(skip_all)]
	pub async fn connect(opts: &ConnectOptions) -> Result<Self, ConnectionError> {
		match (&opts.kubeconfig, &opts.context) {
			(Some(path), context) => {
				let kubeconfig =
					Kubeconfig::read_from(path).map_err(|source| ConnectionError::ReadKubeconfig {
						path: path.clone(),
						source,
					})?;
				Self::from_kubeconfig(kubeconfig, context.as_deref()).await
			}
			(None, Some(context)) => {
				let kubeconfig = Kubeconfig::read()?;
				Self::from_kubeconfig(kubeconfig, Some(context)).await
			}
			(None, None) => {
				let config = Config::infer().await?;
				let cluster_identifier = config.cluster_url.to_string();
				Self::from_config(config, cluster_identifier)
			}
		}
	}

	/// Connect using an already loaded kubeconfig.
	///
	/// `context` selects a context by name; `None` uses the current context.
	#[instrument(skip(kubeconfig))]
	pub async fn from_kubeconfig(
		kubeconfig: Kubeconfig,
		context: Option<&str>,
	) -> Result<Self, ConnectionError> {
		let context_name = match context {
			Some(name) => {
				if !kubeconfig.contexts.iter().any(|c| c.name == name) {
					return Err(ConnectionError::ContextNotFound(name.to_string()));
				}
				Some(name.to_string())
			}
			None => kubeconfig.current_context.clone(),
		};

		let config = Config::from_custom_kubeconfig(
			kubeconfig,
			&KubeConfigOptions {
				context: context_name.clone(),
				..Default::default()
			},
		)
		.await?;

		let cluster_identifier = match context_name {
			Some(name) => format!("{}  (context:{})", config.cluster_url, name),
			None => config.cluster_url.to_string(),
		};
		Self::from_config(config, cluster_identifier)
	}

	fn from_config(config: Config, cluster_identifier: String) -> Result<Self, ConnectionError> {
		let client = Client::try_from(config)?;
		tracing::debug!(cluster = %cluster_identifier, "created cluster client");

		Ok(Self {
			client,
			cluster_identifier,
		})
	}

	/// Get a reference to the underlying kube client.
	pub fn client(&self) -> &Client {
		&self.client
	}

	/// Get the cluster identifier (API server URL and context name).
	pub fn cluster_identifier(&self) -> &str {
		&self.cluster_identifier
	}
}

#[cfg(test)]
mod tests {
	use assert_matches::assert_matches;

	use super::*;

	#[tokio::test]
	async fn test_unknown_context_errors() {
		let result = ClusterConnection::from_kubeconfig(Kubeconfig::default(), Some("nonexistent")).await;
		assert_matches!(
			result,
			Err(ConnectionError::ContextNotFound(name)) if name == "nonexistent"
		);
	}

	#[tokio::test]
	async fn test_missing_kubeconfig_file_errors() {
		let dir = tempfile::tempdir().unwrap();
		let path = dir.path().join("missing-kubeconfig");

		let result = ClusterConnection::connect(&ConnectOptions {
			kubeconfig: Some(path.clone()),
			context: None,
		})
		.await;

		assert_matches!(
			result,
			Err(ConnectionError::ReadKubeconfig { path: p, .. }) if p == path
		);
	}

	#[tokio::test]
	async fn test_empty_kubeconfig_without_context_errors() {
		let result = ClusterConnection::from_kubeconfig(Kubeconfig::default(), None).await;
		assert_matches!(result, Err(ConnectionError::Kubeconfig(_)));
	}
}
