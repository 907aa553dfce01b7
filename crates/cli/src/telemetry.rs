//! Tracing initialisation for the `pr-decorator` binary.
//!
//! Installs one global subscriber made of:
//!
//! - an `EnvFilter` honouring `RUST_LOG`, falling back to the `--log-level`
//!   value;
//! - a human-readable or JSON `fmt` layer writing to stderr;
//! - an OpenTelemetry layer exporting spans over OTLP/gRPC, present only when
//!   `OTEL_EXPORTER_OTLP_ENDPOINT` is set.

use anyhow::{Context, Result};
use opentelemetry::trace::TracerProvider as _;
use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::trace::{Tracer, TracerProvider};
use opentelemetry_sdk::{runtime, Resource};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter};

/// Environment variable naming the OTLP collector endpoint.
pub const OTLP_ENDPOINT_ENV: &str = "OTEL_EXPORTER_OTLP_ENDPOINT";

const SERVICE_NAME: &str = "pr-decorator";

/// Keeps the exporter alive until [`Telemetry::shutdown`].
#[derive(Debug, Default)]
pub struct Telemetry {
    provider: Option<TracerProvider>,
}

impl Telemetry {
    /// Flushes buffered spans. Call once before the process exits.
    pub fn shutdown(self) {
        if let Some(provider) = self.provider {
            if let Err(error) = provider.shutdown() {
                eprintln!("failed to flush OpenTelemetry spans: {error}");
            }
        }
    }
}

/// Initialise the global tracing subscriber.
///
/// Only the first call in a process installs a subscriber; later calls still
/// return a [`Telemetry`] handle.
///
/// # Errors
///
/// Fails if the OTLP exporter cannot be built for the configured endpoint.
pub fn init(json: bool, default_level: &str) -> Result<Telemetry> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let otlp = match std::env::var(OTLP_ENDPOINT_ENV) {
        Ok(endpoint) if !endpoint.trim().is_empty() => Some(otlp_tracer(endpoint.trim())?),
        _ => None,
    };
    let tracer = otlp.as_ref().map(|(_, tracer)| tracer.clone());

    if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracer.map(|t| tracing_opentelemetry::layer().with_tracer(t)))
            .with(fmt::layer().with_writer(std::io::stderr).json())
            .try_init()
            .ok();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracer.map(|t| tracing_opentelemetry::layer().with_tracer(t)))
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .ok();
    }

    Ok(Telemetry {
        provider: otlp.map(|(provider, _)| provider),
    })
}

fn otlp_tracer(endpoint: &str) -> Result<(TracerProvider, Tracer)> {
    let exporter = opentelemetry_otlp::SpanExporter::builder()
        .with_tonic()
        .with_endpoint(endpoint)
        .build()
        .with_context(|| format!("failed to build OTLP exporter for {endpoint}"))?;

    let provider = TracerProvider::builder()
        .with_batch_exporter(exporter, runtime::Tokio)
        .with_resource(Resource::new(vec![KeyValue::new(
            "service.name",
            SERVICE_NAME,
        )]))
        .build();
    let tracer = provider.tracer(SERVICE_NAME);
    opentelemetry::global::set_tracer_provider(provider.clone());

    Ok((provider, tracer))
}
