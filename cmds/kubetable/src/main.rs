use anyhow::Result;
use clap::Parser;
use kubetable::{app, telemetry};

#[cfg(all(
	target_os = "linux",
	feature = "mimalloc",
	not(feature = "system-alloc")
))]
#[global_allocator]
static GLOBAL: mimallocator::Mimalloc = mimallocator::Mimalloc;

#[derive(Parser)]
#[command(name = "kubetable")]
#[command(about = "Render cluster workloads as a periodic table in D2", long_about = None)]
#[command(version = env!("KUBETABLE_VERSION"))]
struct Cli {
	#[command(flatten)]
	args: app::GenerateArgs,
}

fn main() -> Result<()> {
	let cli = Cli::parse();
	let _telemetry = telemetry::init(cli.args.log_level)?;

	let summary = app::run(cli.args)
		.inspect_err(|e| tracing::error!(error = format!("{e:#}"), "generation failed"))?;
	tracing::info!(
		namespaces = summary.namespaces,
		workloads = summary.workloads,
		failed_kinds = ?summary.failed_kinds,
		timed_out = summary.timed_out,
		output = %summary.output.display(),
		"done"
	);
	Ok(())
}
