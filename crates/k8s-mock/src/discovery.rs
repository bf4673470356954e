//! Mock Kubernetes API resource registry.

/// Resources known to the mock server.
pub struct MockDiscovery {
	pub resources: Vec<MockApiResource>,
}

impl Default for MockDiscovery {
	fn default() -> Self {
		Self {
			resources: vec![
				MockApiResource::namespaced("v1", "configmaps", "ConfigMap"),
				MockApiResource::namespaced("v1", "pods", "Pod"),
				MockApiResource::cluster_scoped("v1", "namespaces", "Namespace"),
				MockApiResource::namespaced("apps/v1", "deployments", "Deployment"),
				MockApiResource::namespaced("apps/v1", "statefulsets", "StatefulSet"),
				MockApiResource::namespaced("apps/v1", "daemonsets", "DaemonSet"),
				MockApiResource::namespaced("batch/v1", "jobs", "Job"),
				MockApiResource::namespaced("batch/v1", "cronjobs", "CronJob"),
			],
		}
	}
}

impl MockDiscovery {
	/// Find a resource by apiVersion and kind.
	pub fn by_kind(&self, api_version: &str, kind: &str) -> Option<&MockApiResource> {
		self.resources
			.iter()
			.find(|r| r.api_version == api_version && r.kind == kind)
	}
}

/// A mock API resource definition.
pub struct MockApiResource {
	/// `v1` for the core group, `group/version` otherwise.
	pub api_version: String,
	/// Plural resource name used in URLs.
	pub name: String,
	pub kind: String,
	pub namespaced: bool,
}

impl MockApiResource {
	pub fn namespaced(api_version: &str, name: &str, kind: &str) -> Self {
		Self {
			api_version: api_version.to_string(),
			name: name.to_string(),
			kind: kind.to_string(),
			namespaced: true,
		}
	}

	pub fn cluster_scoped(api_version: &str, name: &str, kind: &str) -> Self {
		Self {
			namespaced: false,
			..Self::namespaced(api_version, name, kind)
		}
	}

	/// URL prefix of the resource's group version, e.g. `/apis/apps/v1`.
	pub fn group_prefix(&self) -> String {
		if self.api_version.contains('/') {
			format!("/apis/{}", self.api_version)
		} else {
			format!("/api/{}", self.api_version)
		}
	}

	/// Path listing the resource across all namespaces.
	pub fn list_path(&self) -> String {
		format!("{}/{}", self.group_prefix(), self.name)
	}

	/// Match a request path against this resource's list endpoints.
	///
	/// Returns `Some(None)` for the all-namespaces list and `Some(Some(ns))`
	/// for a namespaced list.
	pub fn match_list_path<'p>(&self, path: &'p str) -> Option<Option<&'p str>> {
		let path = path.trim_end_matches('/');
		let prefix = self.group_prefix();
		let rest = path.strip_prefix(prefix.as_str())?;

		if rest.strip_prefix('/') == Some(self.name.as_str()) {
			return Some(None);
		}
		if !self.namespaced {
			return None;
		}

		let rest = rest.strip_prefix("/namespaces/")?;
		let (namespace, plural) = rest.split_once('/')?;
		(plural == self.name && !namespace.is_empty()).then_some(Some(namespace))
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_list_paths() {
		let discovery = MockDiscovery::default();
		let deployments = discovery.by_kind("apps/v1", "Deployment").unwrap();
		let pods = discovery.by_kind("v1", "Pod").unwrap();

		assert_eq!(deployments.list_path(), "/apis/apps/v1/deployments");
		assert_eq!(pods.list_path(), "/api/v1/pods");
	}

	#[test]
	fn test_match_list_path() {
		let discovery = MockDiscovery::default();
		let jobs = discovery.by_kind("batch/v1", "Job").unwrap();
		let namespaces = discovery.by_kind("v1", "Namespace").unwrap();

		assert_eq!(jobs.match_list_path("/apis/batch/v1/jobs"), Some(None));
		assert_eq!(
			jobs.match_list_path("/apis/batch/v1/namespaces/default/jobs"),
			Some(Some("default"))
		);
		assert_eq!(jobs.match_list_path("/apis/batch/v1/cronjobs"), None);
		assert_eq!(jobs.match_list_path("/apis/batch/v1/jobs/nightly"), None);
		assert_eq!(namespaces.match_list_path("/api/v1/namespaces"), Some(None));
		assert_eq!(namespaces.match_list_path("/api/v1/namespaces/default"), None);
	}
}
