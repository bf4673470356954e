//! Workload records and their per-namespace aggregation.

use std::{
	collections::{btree_map, BTreeMap},
	fmt,
};

/// The workload kinds shown in the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum WorkloadKind {
	Deployment,
	StatefulSet,
	DaemonSet,
	Job,
}

impl WorkloadKind {
	/// Every kind, in legend order.
	pub const ALL: [WorkloadKind; 4] = [
		WorkloadKind::Deployment,
		WorkloadKind::StatefulSet,
		WorkloadKind::DaemonSet,
		WorkloadKind::Job,
	];

	/// Name of the diagram style class for this kind.
	pub fn class_name(self) -> &'static str {
		match self {
			WorkloadKind::Deployment => "Deployment",
			WorkloadKind::StatefulSet => "StatefulSet",
			WorkloadKind::DaemonSet => "DaemonSet",
			WorkloadKind::Job => "Job",
		}
	}

	/// Fill color of the kind's cells and legend entry.
	pub fn color(self) -> &'static str {
		match self {
			WorkloadKind::Deployment => "#ACDDDE",
			WorkloadKind::StatefulSet => "#E1F8DC",
			WorkloadKind::DaemonSet => "#FEF8DD",
			WorkloadKind::Job => "#F7D8BA",
		}
	}
}

impl fmt::Display for WorkloadKind {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.class_name())
	}
}

/// A single namespaced workload, as reported by the cluster.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Workload {
	name: String,
	kind: WorkloadKind,
	namespace: String,
}

impl Workload {
	pub fn new(name: impl Into<String>, kind: WorkloadKind, namespace: impl Into<String>) -> Self {
		Self {
			name: name.into(),
			kind,
			namespace: namespace.into(),
		}
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn kind(&self) -> WorkloadKind {
		self.kind
	}

	pub fn namespace(&self) -> &str {
		&self.namespace
	}
}

/// Workloads grouped by namespace.
///
/// Each namespace's workloads are sorted by name (byte order, ties broken by
/// kind), so the diagram does not depend on the order the API or the
/// listing tasks produced them in.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Aggregation {
	namespaces: BTreeMap<String, Vec<Workload>>,
}

impl Aggregation {
	pub fn from_workloads(workloads: impl IntoIterator<Item = Workload>) -> Self {
		let mut namespaces: BTreeMap<String, Vec<Workload>> = BTreeMap::new();
		for workload in workloads {
			namespaces
				.entry(workload.namespace.clone())
				.or_default()
				.push(workload);
		}

		let mut aggregation = Self { namespaces };
		aggregation.sort();
		aggregation
	}

	fn sort(&mut self) {
		for workloads in self.namespaces.values_mut() {
			workloads.sort_by(|a, b| a.name.cmp(&b.name).then(a.kind.cmp(&b.kind)));
		}
	}

	pub fn namespace_count(&self) -> usize {
		self.namespaces.len()
	}

	pub fn workload_count(&self) -> usize {
		self.namespaces.values().map(Vec::len).sum()
	}

	pub fn is_empty(&self) -> bool {
		self.namespaces.is_empty()
	}

	/// Sorted workloads of one namespace.
	pub fn get(&self, namespace: &str) -> Option<&[Workload]> {
		self.namespaces.get(namespace).map(Vec::as_slice)
	}

	pub fn iter(&self) -> Iter<'_> {
		Iter {
			inner: self.namespaces.iter(),
		}
	}
}

/// Iterator over `(namespace, workloads)` pairs of an [`Aggregation`].
pub struct Iter<'a> {
	inner: btree_map::Iter<'a, String, Vec<Workload>>,
}

impl<'a> Iterator for Iter<'a> {
	type Item = (&'a str, &'a [Workload]);

	fn next(&mut self) -> Option<Self::Item> {
		self.inner
			.next()
			.map(|(namespace, workloads)| (namespace.as_str(), workloads.as_slice()))
	}
}

impl<'a> IntoIterator for &'a Aggregation {
	type Item = (&'a str, &'a [Workload]);
	type IntoIter = Iter<'a>;

	fn into_iter(self) -> Self::IntoIter {
		self.iter()
	}
}
