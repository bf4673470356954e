//! The `kubetable` command: collect workloads, render them, write the file.

use std::{
	path::{Path, PathBuf},
	time::Duration,
};

use anyhow::{Context, Result};
use clap::Args;
use tracing::{info, instrument, warn};

use crate::{
	diagram,
	k8s::{
		client::{ClusterConnection, ConnectOptions},
		collect::{Collector, DEFAULT_DEADLINE, DEFAULT_PAGE_SIZE},
	},
	workload::WorkloadKind,
};

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
	/// Path to a kubeconfig file [default: $KUBECONFIG, ~/.kube/config, or in-cluster]
	#[arg(long)]
	pub kubeconfig: Option<PathBuf>,

	/// Kubeconfig context to use instead of the current one
	#[arg(long)]
	pub context: Option<String>,

	/// Where to write the D2 diagram
	#[arg(short, long, default_value = "output.d2")]
	pub output: PathBuf,

	/// Seconds to wait for the cluster before rendering what was received
	#[arg(long, default_value_t = 15)]
	pub timeout: u64,

	/// Log level (overrides RUST_LOG)
	#[arg(long)]
	pub log_level: Option<tracing::Level>,
}

/// Options of a single generation run.
#[derive(Debug, Clone)]
pub struct GenerateOpts {
	pub output: PathBuf,
	pub deadline: Duration,
	pub page_size: u32,
}

impl GenerateOpts {
	pub fn new(output: impl Into<PathBuf>) -> Self {
		Self {
			output: output.into(),
			deadline: DEFAULT_DEADLINE,
			page_size: DEFAULT_PAGE_SIZE,
		}
	}
}

impl From<&GenerateArgs> for GenerateOpts {
	fn from(args: &GenerateArgs) -> Self {
		Self {
			deadline: Duration::from_secs(args.timeout),
			..Self::new(&args.output)
		}
	}
}

/// What a run produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
	pub namespaces: usize,
	pub workloads: usize,
	pub failed_kinds: Vec<WorkloadKind>,
	pub timed_out: bool,
	pub output: PathBuf,
}

/// Run the command to completion on a fresh runtime.
pub fn run(args: GenerateArgs) -> Result<Summary> {
	let runtime = tokio::runtime::Builder::new_multi_thread()
		.enable_all()
		.build()
		.context("creating tokio runtime")?;

	runtime.block_on(async {
		let connection = ClusterConnection::connect(&ConnectOptions {
			kubeconfig: args.kubeconfig.clone(),
			context: args.context.clone(),
		})
		.await
		.context("connecting to cluster")?;

		generate(Some(connection), &GenerateOpts::from(&args)).await
	})
}

/// Collect workloads from the cluster and write the diagram.
///
/// Without a connection, credentials are discovered from the environment.
#[instrument(skip_all, fields(output = %opts.output.display()))]
pub async fn generate(connection: Option<ClusterConnection>, opts: &GenerateOpts) -> Result<Summary> {
	let connection = match connection {
		Some(connection) => connection,
		None => ClusterConnection::connect(&ConnectOptions::default())
			.await
			.context("connecting to cluster")?,
	};
	info!(cluster = %connection.cluster_identifier(), "collecting workloads");

	let collection = Collector::new(connection.client().clone())
		.deadline(opts.deadline)
		.page_size(opts.page_size)
		.collect()
		.await;

	let failed_kinds = collection.failed_kinds();
	let timed_out = collection.timed_out;
	if timed_out {
		warn!(deadline = ?opts.deadline, "cluster did not answer in time, the diagram may be incomplete");
	}

	let aggregation = collection.into_aggregation();
	info!(
		namespace_count = aggregation.namespace_count(),
		workload_count = aggregation.workload_count(),
		"aggregated workloads"
	);

	let text = diagram::render(&aggregation).context("rendering diagram")?;
	write_output(&opts.output, &text)?;

	Ok(Summary {
		namespaces: aggregation.namespace_count(),
		workloads: aggregation.workload_count(),
		failed_kinds,
		timed_out,
		output: opts.output.clone(),
	})
}

fn write_output(path: &Path, text: &str) -> Result<()> {
	diagram::write_diagram(path, text)?;
	info!(path = %path.display(), "wrote diagram");
	Ok(())
}
