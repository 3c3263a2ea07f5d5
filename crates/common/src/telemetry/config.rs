use opentelemetry_sdk::{logs::LoggerProvider, trace::TracerProvider as SdkTracerProvider};

/// Logging and OpenTelemetry export settings
#[derive(Clone, Debug)]
pub struct TelemetryConfig {
    pub service_name: String,
    pub otel_endpoint: String,
    pub otel_enabled: bool,
    /// Default `EnvFilter` directive, overridden by `RUST_LOG`
    pub log_level: String,
}

impl TelemetryConfig {
    pub fn new(service_name: impl Into<String>) -> Self {
        Self {
            service_name: service_name.into(),
            ..Default::default()
        }
    }
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            service_name: "morgana".to_string(),
            otel_endpoint: "http://localhost:4317".to_string(),
            otel_enabled: false,
            log_level: "info".to_string(),
        }
    }
}

/// Held by the binary until shutdown so pending spans and logs get flushed
pub struct TelemetryProviders {
    pub tracer_provider: SdkTracerProvider,
    pub logger_provider: LoggerProvider,
}
