use anyhow::Result;
use opentelemetry::{trace::TracerProvider, KeyValue};
use opentelemetry_appender_tracing::layer::OpenTelemetryTracingBridge;
use opentelemetry_otlp::{LogExporter, SpanExporter, WithExportConfig};
use opentelemetry_sdk::{
    logs::{BatchLogProcessor, LoggerProvider},
    propagation::TraceContextPropagator,
    runtime,
    trace::{RandomIdGenerator, Sampler, TracerProvider as SdkTracerProvider},
    Resource,
};
use tracing::Subscriber;
use tracing_subscriber::{
    layer::SubscriberExt, registry::LookupSpan, util::SubscriberInitExt, EnvFilter, Layer,
};

use super::{TelemetryConfig, TelemetryProviders};

/// Install the global tracing subscriber.
///
/// JSON lines on stdout always. With OTel enabled, spans and log events are
/// also exported over OTLP/gRPC and W3C trace context propagation is set up,
/// so `traceparent` headers on incoming requests join the caller's trace.
pub fn init_telemetry(config: &TelemetryConfig) -> Result<Option<TelemetryProviders>> {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    if !config.otel_enabled {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(json_layer())
            .init();
        return Ok(None);
    }

    opentelemetry::global::set_text_map_propagator(TraceContextPropagator::new());
    let providers = build_providers(config)?;

    let tracer = providers.tracer_provider.tracer("morgana");
    // Span layer before the log bridge so events see the OTel span context
    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_opentelemetry::layer().with_tracer(tracer))
        .with(OpenTelemetryTracingBridge::new(&providers.logger_provider))
        .with(json_layer())
        .init();

    Ok(Some(providers))
}

/// JSON stdout layer, built per subscriber stack it sits on
fn json_layer<S>() -> impl Layer<S> + Send + Sync
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    tracing_subscriber::fmt::layer()
        .json()
        .with_span_list(true)
        .with_current_span(true)
}

fn build_providers(config: &TelemetryConfig) -> Result<TelemetryProviders> {
    let resource = Resource::new(vec![KeyValue::new(
        opentelemetry_semantic_conventions::resource::SERVICE_NAME,
        config.service_name.clone(),
    )]);

    let span_exporter = SpanExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otel_endpoint)
        .build()?;
    let tracer_provider = SdkTracerProvider::builder()
        .with_batch_exporter(span_exporter, runtime::Tokio)
        .with_sampler(Sampler::AlwaysOn)
        .with_id_generator(RandomIdGenerator::default())
        .with_resource(resource.clone())
        .build();

    let log_exporter = LogExporter::builder()
        .with_tonic()
        .with_endpoint(&config.otel_endpoint)
        .build()?;
    let logger_provider = LoggerProvider::builder()
        .with_log_processor(BatchLogProcessor::builder(log_exporter, runtime::Tokio).build())
        .with_resource(resource)
        .build();

    Ok(TelemetryProviders {
        tracer_provider,
        logger_provider,
    })
}

/// Flush and stop the exporters, if any were started
pub fn shutdown_telemetry(providers: Option<TelemetryProviders>) {
    let Some(providers) = providers else {
        return;
    };
    if let Err(e) = providers.tracer_provider.shutdown() {
        eprintln!("Error shutting down tracer provider: {:?}", e);
    }
    if let Err(e) = providers.logger_provider.shutdown() {
        eprintln!("Error shutting down logger provider: {:?}", e);
    }
}
