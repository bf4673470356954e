//! Log output and optional trace export.

use std::io::IsTerminal;

use anyhow::Result;
use opentelemetry::trace::TracerProvider as _;
use opentelemetry_sdk::{trace::SdkTracerProvider, Resource};
use tracing::Level;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

const SERVICE_NAME: &str = "kubetable";

/// Not re-exported by `opentelemetry_sdk`.
const OTEL_SERVICE_NAME: &str = "OTEL_SERVICE_NAME";

/// Flushes exported spans when dropped; keep it alive until exit.
pub struct TelemetryGuard {
	_otel: Option<OtelGuard>,
}

struct OtelGuard {
	tracer_provider: SdkTracerProvider,
}

impl Drop for OtelGuard {
	fn drop(&mut self) {
		if let Err(e) = self.tracer_provider.shutdown() {
			eprintln!("failed to shut down tracer provider: {e}");
		}
	}
}

fn otel_export_enabled() -> bool {
	[
		opentelemetry_otlp::OTEL_EXPORTER_OTLP_ENDPOINT,
		opentelemetry_otlp::OTEL_EXPORTER_OTLP_TRACES_ENDPOINT,
	]
	.into_iter()
	.any(|var| std::env::var_os(var).is_some())
}

/// Build the log filter: explicit level, then `RUST_LOG`, then `info`.
fn env_filter(log_level: Option<Level>) -> EnvFilter {
	match log_level {
		Some(level) => EnvFilter::new(level.as_str()),
		None => EnvFilter::builder()
			.with_default_directive(Level::INFO.into())
			.from_env_lossy(),
	}
}

/// Install the global subscriber.
///
/// Logs go to stderr, pretty-printed on a terminal and as JSON lines
/// otherwise. Spans are additionally exported over OTLP when
/// `OTEL_EXPORTER_OTLP_ENDPOINT` or `OTEL_EXPORTER_OTLP_TRACES_ENDPOINT` is
/// set; the exporter honours the other standard `OTEL_*` variables.
pub fn init(log_level: Option<Level>) -> Result<TelemetryGuard> {
	let filter = env_filter(log_level);

	let fmt_layer = if std::io::stderr().is_terminal() {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.pretty()
			.boxed()
	} else {
		tracing_subscriber::fmt::layer()
			.with_writer(std::io::stderr)
			.json()
			.boxed()
	};

	let registry = tracing_subscriber::registry().with(filter).with(fmt_layer);

	if !otel_export_enabled() {
		registry.init();
		return Ok(TelemetryGuard { _otel: None });
	}

	let (otel_layer, guard) = otel_layer()?;
	registry.with(otel_layer).init();
	Ok(TelemetryGuard { _otel: Some(guard) })
}

fn otel_layer<S>() -> Result<(impl Layer<S>, OtelGuard)>
where
	S: tracing::Subscriber + for<'span> tracing_subscriber::registry::LookupSpan<'span>,
{
	// The builder picks up OTEL_SERVICE_NAME and OTEL_RESOURCE_ATTRIBUTES itself
	let mut resource = Resource::builder();
	if std::env::var_os(OTEL_SERVICE_NAME).is_none() {
		resource = resource.with_service_name(SERVICE_NAME);
	}

	let protocol = std::env::var(opentelemetry_otlp::OTEL_EXPORTER_OTLP_PROTOCOL);
	let exporter = match protocol
		.as_deref()
		.unwrap_or(opentelemetry_otlp::OTEL_EXPORTER_OTLP_PROTOCOL_DEFAULT)
	{
		"grpc" => opentelemetry_otlp::SpanExporter::builder()
			.with_tonic()
			.build()?,
		_ => opentelemetry_otlp::SpanExporter::builder()
			.with_http()
			.build()?,
	};

	let tracer_provider = SdkTracerProvider::builder()
		.with_resource(resource.build())
		.with_batch_exporter(exporter)
		.build();
	opentelemetry::global::set_tracer_provider(tracer_provider.clone());

	let layer = tracing_opentelemetry::layer()
		.with_error_records_to_exceptions(true)
		.with_tracer(tracer_provider.tracer(SERVICE_NAME));

	Ok((layer, OtelGuard { tracer_provider }))
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn test_explicit_level_wins() {
		assert_eq!(env_filter(Some(Level::DEBUG)).to_string(), "debug");
		assert_eq!(env_filter(Some(Level::WARN)).to_string(), "warn");
	}
}
