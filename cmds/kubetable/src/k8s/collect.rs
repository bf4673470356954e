//! Concurrent listing of workloads across all namespaces.
//!
//! One task per [`WorkloadKind`] lists its resources and, once the listing is
//! complete, sends them into a shared channel. The channel is drained while
//! the tasks run, so the buffer size only bounds memory, never progress. The
//! channel closes once every task has dropped its sender, which is the point
//! where collection is complete.

use std::{fmt::Debug, time::Duration};

use k8s_openapi::{
	api::{
		apps::v1::{DaemonSet, Deployment, StatefulSet},
		batch::v1::Job,
	},
	NamespaceResourceScope,
};
use kube::{api::ListParams, Api, Client, Resource, ResourceExt};
use serde::de::DeserializeOwned;
use thiserror::Error;
use tokio::{
	sync::mpsc,
	task::JoinSet,
	time::{timeout_at, Instant},
};
use tracing::{debug, instrument, warn};

use crate::workload::{Aggregation, Workload, WorkloadKind};

/// Default deadline for the whole collection.
pub const DEFAULT_DEADLINE: Duration = Duration::from_secs(15);

/// Default number of objects requested per list page.
pub const DEFAULT_PAGE_SIZE: u32 = 500;

/// Capacity of the channel between the listing tasks and the collector.
const CHANNEL_CAPACITY: usize = 50;

/// A list call for one kind failed.
#[derive(Debug, Error)]
#[error("failed to list {kind} objects")]
pub struct ListError {
	pub kind: WorkloadKind,
	#[source]
	pub source: kube::Error,
}

/// Result of one collection run.
#[derive(Debug, Default)]
pub struct Collection {
	/// Every workload received before the channel closed or the deadline hit.
	pub workloads: Vec<Workload>,
	/// Kinds whose listing failed; they contributed no workloads.
	pub failures: Vec<ListError>,
	/// The deadline expired and unfinished listings were cancelled.
	pub timed_out: bool,
}

impl Collection {
	pub fn failed_kinds(&self) -> Vec<WorkloadKind> {
		self.failures.iter().map(|f| f.kind).collect()
	}

	pub fn into_aggregation(self) -> Aggregation {
		Aggregation::from_workloads(self.workloads)
	}
}

/// Lists all workload kinds concurrently.
#[derive(Clone)]
pub struct Collector {
	client: Client,
	deadline: Duration,
	page_size: u32,
}

impl Collector {
	pub fn new(client: Client) -> Self {
		Self {
			client,
			deadline: DEFAULT_DEADLINE,
			page_size: DEFAULT_PAGE_SIZE,
		}
	}

	/// Bound the whole collection to `deadline`.
	#[must_use]
	pub fn deadline(mut self, deadline: Duration) -> Self {
		self.deadline = deadline;
		self
	}

	/// Number of objects requested per list page.
	#[must_use]
	pub fn page_size(mut self, page_size: u32) -> Self {
		self.page_size = page_size.max(1);
		self
	}

	/// List every kind across all namespaces.
	///
	/// Failures of individual kinds are logged and reported in the result;
	/// they never abort the other kinds. When the deadline expires, in-flight
	/// requests are cancelled and whatever was already received is returned.
	#[instrument(skip(self), fields(deadline = ?self.deadline))]
	pub async fn collect(&self) -> Collection {
		let deadline = Instant::now() + self.deadline;
		let (tx, mut rx) = mpsc::channel(CHANNEL_CAPACITY);

		let mut join_set = JoinSet::new();
		for kind in WorkloadKind::ALL {
			let client = self.client.clone();
			let tx = tx.clone();
			let page_size = self.page_size;
			join_set.spawn(async move { (kind, list_kind(client, kind, page_size, tx).await) });
		}
		// Only the tasks hold senders now; the channel closes when the last one finishes.
		drop(tx);

		let mut collection = Collection::default();
		loop {
			match timeout_at(deadline, rx.recv()).await {
				Ok(Some(workload)) => collection.workloads.push(workload),
				Ok(None) => break,
				Err(_) => {
					warn!(
						received = collection.workloads.len(),
						"deadline exceeded, cancelling unfinished listings"
					);
					collection.timed_out = true;
					join_set.abort_all();
					rx.close();
					while let Ok(workload) = rx.try_recv() {
						collection.workloads.push(workload);
					}
					break;
				}
			}
		}

		while let Some(joined) = join_set.join_next().await {
			match joined {
				Ok((kind, Ok(count))) => debug!(%kind, count, "listed workloads"),
				Ok((kind, Err(source))) => {
					warn!(%kind, error = %source, "failed to list workloads");
					collection.failures.push(ListError { kind, source });
				}
				Err(e) if e.is_cancelled() => {}
				Err(e) => warn!(error = %e, "listing task panicked"),
			}
		}

		debug!(
			workloads = collection.workloads.len(),
			failures = collection.failures.len(),
			timed_out = collection.timed_out,
			"collection finished"
		);
		collection
	}
}

async fn list_kind(
	client: Client,
	kind: WorkloadKind,
	page_size: u32,
	tx: mpsc::Sender<Workload>,
) -> Result<usize, kube::Error> {
	match kind {
		WorkloadKind::Deployment => list_all::<Deployment>(client, kind, page_size, tx).await,
		WorkloadKind::StatefulSet => list_all::<StatefulSet>(client, kind, page_size, tx).await,
		WorkloadKind::DaemonSet => list_all::<DaemonSet>(client, kind, page_size, tx).await,
		WorkloadKind::Job => list_all::<Job>(client, kind, page_size, tx).await,
	}
}

/// List one resource type across all namespaces, page by page.
///
/// Workloads are only handed to the collector once the last page arrived, so
/// a kind whose listing fails midway contributes nothing. Returns the number
/// of workloads sent.
async fn list_all<K>(
	client: Client,
	kind: WorkloadKind,
	page_size: u32,
	tx: mpsc::Sender<Workload>,
) -> Result<usize, kube::Error>
where
	K: Resource<Scope = NamespaceResourceScope> + Clone + DeserializeOwned + Debug,
	K::DynamicType: Default,
{
	let api: Api<K> = Api::all(client);
	let mut params = ListParams::default().limit(page_size);
	let mut workloads = Vec::new();

	loop {
		let page = api.list(&params).await?;
		debug!(%kind, items = page.items.len(), "received list page");

		for item in &page.items {
			let Some(namespace) = item.namespace() else {
				debug!(%kind, name = %item.name_any(), "skipping object without namespace");
				continue;
			};
			workloads.push(Workload::new(item.name_any(), kind, namespace));
		}

		match page.metadata.continue_ {
			Some(token) if !token.is_empty() => params = params.continue_token(&token),
			_ => break,
		}
	}

	let mut sent = 0;
	for workload in workloads {
		if tx.send(workload).await.is_err() {
			// Collector stopped listening (deadline)
			break;
		}
		sent += 1;
	}
	Ok(sent)
}
