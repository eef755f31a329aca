use opentelemetry::KeyValue;
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::{trace as sdktrace, Resource};
use opentelemetry_semantic_conventions::resource;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{LogFormat, TelemetryConfig};

#[derive(Debug, thiserror::Error)]
pub enum TelemetryError {
    #[error("invalid log filter: {0}")]
    Filter(#[from] tracing_subscriber::filter::ParseError),
    #[error("failed to install OpenTelemetry tracer: {0}")]
    Tracer(#[from] opentelemetry::trace::TraceError),
    #[error("a global subscriber is already installed: {0}")]
    AlreadyInstalled(#[from] tracing_subscriber::util::TryInitError),
}

fn otlp_tracer(
    service_name: &str,
    endpoint: &str,
) -> Result<sdktrace::Tracer, opentelemetry::trace::TraceError> {
    let resource = Resource::new(vec![KeyValue::new(
        resource::SERVICE_NAME,
        service_name.to_string(),
    )]);

    opentelemetry_otlp::new_pipeline()
        .tracing()
        .with_exporter(
            opentelemetry_otlp::new_exporter()
                .tonic()
                .with_endpoint(endpoint),
        )
        .with_trace_config(
            sdktrace::config()
                .with_resource(resource)
                .with_sampler(sdktrace::Sampler::AlwaysOn),
        )
        .install_batch(opentelemetry_sdk::runtime::Tokio)
}

/// Installs the global subscriber: env filter, text or JSON output and,
/// when an endpoint is configured, OTLP span export.
pub fn init_telemetry(service_name: &str, config: &TelemetryConfig) -> Result<(), TelemetryError> {
    let env_filter = EnvFilter::try_new(&config.filter)?;
    let registry = tracing_subscriber::registry().with(env_filter);

    let otel_layer = match config.otlp_endpoint.as_deref() {
        Some(endpoint) => {
            let tracer = otlp_tracer(service_name, endpoint)?;
            Some(tracing_opentelemetry::layer().with_tracer(tracer))
        }
        None => None,
    };

    match config.log_format {
        LogFormat::Json => {
            let fmt_layer = tracing_subscriber::fmt::layer()
                .json()
                .flatten_event(true)
                .without_time();
            registry.with(otel_layer).with(fmt_layer).try_init()?;
        }
        LogFormat::Text => {
            registry
                .with(otel_layer)
                .with(tracing_subscriber::fmt::layer())
                .try_init()?;
        }
    }

    tracing::info!(
        service = service_name,
        format = ?config.log_format,
        otlp = config.otlp_endpoint.is_some(),
        "telemetry initialized"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn installs_once() {
        let config = TelemetryConfig::default();
        init_telemetry("menu-review-test", &config).unwrap();

        let err = init_telemetry("menu-review-test", &config).unwrap_err();
        assert!(matches!(err, TelemetryError::AlreadyInstalled(_)));
    }
}
