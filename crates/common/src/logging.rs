//! Logging setup for the faucet: a compact stdout layer plus an optional OpenTelemetry exporter.
use std::env;

use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_otlp::WithExportConfig;
use opentelemetry_sdk::Resource;
use tracing::*;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter, Layer};

/// Environment variable holding the OTLP collector endpoint.
pub const OTLP_URL_ENVVAR: &str = "DRIP_OTLP_URL";

/// Environment variable holding a label that is appended to the service name, useful when several
/// faucet instances report to the same collector.
pub const SVC_LABEL_ENVVAR: &str = "DRIP_SVC_LABEL";

/// Name of the tracer registered with the OpenTelemetry provider.
const TRACER_NAME: &str = "drip-faucet";

/// Configuration for the logger.
#[derive(Debug, Clone)]
pub struct LoggerConfig {
    /// Name the service reports itself as.
    service_name: String,

    /// Endpoint of the OTLP collector, if traces should be exported.
    otlp_url: Option<String>,
}

impl LoggerConfig {
    /// Creates a config that only logs to stdout.
    pub const fn new(service_name: String) -> Self {
        Self {
            service_name,
            otlp_url: None,
        }
    }

    /// Creates a config from a base service name, picking up the service label and the OTLP
    /// endpoint from the environment.
    pub fn from_env(base: &str) -> Self {
        let mut config = Self::new(service_name(base));
        if let Some(url) = env::var(OTLP_URL_ENVVAR).ok().filter(|url| !url.is_empty()) {
            config.set_otlp_url(url);
        }

        config
    }

    /// Sets the OTLP collector endpoint.
    pub fn set_otlp_url(&mut self, url: String) {
        self.otlp_url = Some(url);
    }

    /// Returns the name the service reports itself as.
    pub fn service_name(&self) -> &str {
        &self.service_name
    }
}

impl Default for LoggerConfig {
    fn default() -> Self {
        Self::from_env("drip-faucet")
    }
}

/// Initializes the global subscriber.
///
/// Returns `false` if a global subscriber was already installed, which happens when several tests
/// in the same binary initialize logging.
///
/// # Panics
///
/// If an OTLP endpoint is configured but the exporter cannot be built.
pub fn init(config: LoggerConfig) -> bool {
    let log_file = env::var("LOG_FILE").is_ok_and(|v| v == "1");
    let log_line_num = env::var("LOG_LINE_NUM").is_ok_and(|v| v == "1");

    let stdout_layer = tracing_subscriber::fmt::layer()
        .compact()
        .event_format(
            tracing_subscriber::fmt::format()
                .with_file(log_file)
                .with_line_number(log_line_num),
        )
        .with_filter(EnvFilter::from_default_env());

    let installed = match &config.otlp_url {
        Some(otlp_url) => {
            let resource = Resource::builder()
                .with_attribute(KeyValue::new("service.name", config.service_name.clone()))
                .build();

            let exporter = opentelemetry_otlp::SpanExporter::builder()
                .with_tonic()
                .with_endpoint(otlp_url)
                .build()
                .expect("must be able to initialize otlp exporter");

            let provider = opentelemetry_sdk::trace::SdkTracerProvider::builder()
                .with_resource(resource)
                .with_batch_exporter(exporter)
                .build();

            let otel_layer =
                tracing_opentelemetry::layer().with_tracer(provider.tracer(TRACER_NAME));

            tracing_subscriber::registry()
                .with(stdout_layer)
                .with(otel_layer)
                .try_init()
                .is_ok()
        }
        None => tracing_subscriber::registry()
            .with(stdout_layer)
            .try_init()
            .is_ok(),
    };

    if installed {
        info!(service = %config.service_name, otlp = config.otlp_url.is_some(), "logging started");
    }

    installed
}

/// Appends the label from [`SVC_LABEL_ENVVAR`] to `base`, if one is set.
pub fn service_name(base: &str) -> String {
    match env::var(SVC_LABEL_ENVVAR) {
        Ok(label) if !label.is_empty() => format!("{base}%{label}"),
        _ => base.to_owned(),
    }
}
