//! Log output and optional OTLP trace export.
//!
//! Logs always go to stdout through `tracing-subscriber`. Spans are also
//! exported over OTLP/gRPC when `OTEL_EXPORTER_OTLP_ENDPOINT` is set;
//! `OTEL_EXPORTER_OTLP_HEADERS` (`key=value,...`) is sent as request metadata.

use anyhow::{anyhow, Context, Result};
use opentelemetry::{global, trace::TracerProvider as _, KeyValue};
use opentelemetry_otlp::{WithExportConfig, WithTonicConfig};
use opentelemetry_sdk::{
    propagation::TraceContextPropagator,
    runtime::Tokio,
    trace::{Tracer, TracerProvider},
    Resource,
};
use std::{env, sync::OnceLock, time::Duration};
use tonic::{
    metadata::{Ascii, MetadataKey, MetadataMap, MetadataValue},
    transport::ClientTlsConfig,
};
use tracing::{debug, Level};
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Registry};
use ulid::Ulid;
use url::Url;

const EXPORT_TIMEOUT: Duration = Duration::from_secs(3);

static PROVIDER: OnceLock<TracerProvider> = OnceLock::new();

/// Exporter settings read from the standard `OTEL_*` variables.
#[derive(Debug)]
struct OtlpSettings {
    endpoint: Url,
    metadata: MetadataMap,
    instance_id: String,
}

impl OtlpSettings {
    /// `None` when no endpoint is configured.
    fn from_env() -> Result<Option<Self>> {
        let Ok(raw) = env::var("OTEL_EXPORTER_OTLP_ENDPOINT") else {
            return Ok(None);
        };

        let endpoint = endpoint_url(&raw)?;
        let metadata = match env::var("OTEL_EXPORTER_OTLP_HEADERS") {
            Ok(headers) => metadata_from_headers(&headers)?,
            Err(_) => MetadataMap::new(),
        };
        let instance_id =
            env::var("OTEL_SERVICE_INSTANCE_ID").unwrap_or_else(|_| Ulid::new().to_string());

        Ok(Some(Self {
            endpoint,
            metadata,
            instance_id,
        }))
    }

    fn tracer(self) -> Result<Tracer> {
        let mut exporter = opentelemetry_otlp::SpanExporter::builder()
            .with_tonic()
            .with_endpoint(self.endpoint.as_str())
            .with_timeout(EXPORT_TIMEOUT)
            .with_metadata(self.metadata);

        if self.endpoint.scheme() == "https" {
            if let Some(host) = self.endpoint.host_str() {
                exporter = exporter.with_tls_config(
                    ClientTlsConfig::new()
                        .domain_name(host.to_string())
                        .with_native_roots(),
                );
            }
        }

        let provider = TracerProvider::builder()
            .with_batch_exporter(exporter.build()?, Tokio)
            .with_resource(Resource::new(vec![
                KeyValue::new("service.name", env!("CARGO_PKG_NAME")),
                KeyValue::new("service.version", env!("CARGO_PKG_VERSION")),
                KeyValue::new("service.instance.id", self.instance_id),
            ]))
            .build();

        global::set_text_map_propagator(TraceContextPropagator::new());
        global::set_tracer_provider(provider.clone());
        let tracer = provider.tracer(env!("CARGO_PKG_NAME"));
        let _ = PROVIDER.set(provider);

        Ok(tracer)
    }
}

/// Accept `host:port` as well as full URLs; a bare address means TLS.
fn endpoint_url(raw: &str) -> Result<Url> {
    let raw = raw.trim().trim_end_matches('/');
    let candidate = if raw.contains("://") {
        raw.to_string()
    } else {
        format!("https://{raw}")
    };
    Url::parse(&candidate).with_context(|| format!("invalid OTLP endpoint: {raw}"))
}

/// Parse `key=value` pairs; entries without `=` are skipped.
fn metadata_from_headers(headers: &str) -> Result<MetadataMap> {
    let mut metadata = MetadataMap::new();

    for (key, value) in headers
        .split(',')
        .filter_map(|pair| pair.split_once('='))
        .map(|(key, value)| (key.trim().to_ascii_lowercase(), value.trim()))
    {
        let name = MetadataKey::<Ascii>::from_bytes(key.as_bytes())
            .map_err(|e| anyhow!("invalid OTLP header name {key}: {e}"))?;
        let value = MetadataValue::try_from(value)
            .map_err(|e| anyhow!("invalid OTLP header value for {key}: {e}"))?;
        metadata.insert(name, value);
    }

    Ok(metadata)
}

/// Install the global subscriber.
///
/// # Errors
///
/// Returns an error if the OTLP settings are invalid or a subscriber is
/// already installed.
pub fn init(level: Level) -> Result<()> {
    // RUST_LOG overrides the CLI level
    let filter = EnvFilter::builder()
        .with_default_directive(level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("sqlx=warn".parse()?)
        .add_directive("opentelemetry_sdk=warn".parse()?);

    let fmt_layer = fmt::layer()
        .with_file(true)
        .with_line_number(true)
        .with_thread_ids(true)
        .with_target(false);

    let otel_layer = OtlpSettings::from_env()?
        .map(OtlpSettings::tracer)
        .transpose()?
        .map(|tracer| tracing_opentelemetry::layer().with_tracer(tracer));

    let subscriber = Registry::default()
        .with(fmt_layer)
        .with(otel_layer)
        .with(filter);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}

/// Flush pending spans. A no-op when export is disabled.
pub fn shutdown_tracer() {
    if let Some(provider) = PROVIDER.get() {
        debug!("flushing trace exporter");
        let _ = provider.shutdown();
    }
}
