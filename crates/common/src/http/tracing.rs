use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};

use http::{Request, Response};
use opentelemetry::{global, propagation::Extractor, trace::TraceContextExt as _};
use tower::{Layer, Service};
use tracing::{field, info_span, Instrument, Span};
use tracing_opentelemetry::OpenTelemetrySpanExt;

/// Opens a server span per request, joined to any W3C `traceparent` the
/// caller sent. Span fields follow the OpenTelemetry HTTP conventions.
#[derive(Clone, Default)]
pub struct HttpTracingLayer;

impl HttpTracingLayer {
    pub fn new() -> Self {
        Self
    }
}

impl<S> Layer<S> for HttpTracingLayer {
    type Service = HttpTracingService<S>;

    fn layer(&self, service: S) -> Self::Service {
        HttpTracingService { inner: service }
    }
}

#[derive(Clone)]
pub struct HttpTracingService<S> {
    inner: S,
}

struct HeaderExtractor<'a>(&'a http::HeaderMap);

impl Extractor for HeaderExtractor<'_> {
    fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(|v| v.to_str().ok())
    }

    fn keys(&self) -> Vec<&str> {
        self.0.keys().map(|k| k.as_str()).collect()
    }
}

/// Collapse id-like path segments so span names stay low-cardinality,
/// e.g. `/api/admin/events/cq2v5k8u0000/registrations` -> `/api/admin/events/{id}/registrations`
fn route_template(path: &str) -> String {
    path.split('/')
        .map(|segment| {
            let looks_like_id = segment.len() >= 12
                && segment.chars().all(|c| c.is_ascii_alphanumeric())
                && segment.chars().any(|c| c.is_ascii_digit());
            if looks_like_id {
                "{id}"
            } else {
                segment
            }
        })
        .collect::<Vec<_>>()
        .join("/")
}

impl<S, ReqBody, ResBody> Service<Request<ReqBody>> for HttpTracingService<S>
where
    S: Service<Request<ReqBody>, Response = Response<ResBody>> + Clone + Send + 'static,
    S::Error: std::fmt::Display,
    S::Future: Send + 'static,
    ReqBody: Send + 'static,
    ResBody: Send + 'static,
{
    type Response = S::Response;
    type Error = S::Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>> + Send>>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: Request<ReqBody>) -> Self::Future {
        let parent_context = global::get_text_map_propagator(|propagator| {
            propagator.extract(&HeaderExtractor(req.headers()))
        });

        let method = req.method().to_string();
        let route = route_template(req.uri().path());
        let span = info_span!(
            target: "http",
            "http_request",
            otel.name = %format!("{} {}", method, route),
            otel.kind = "server",
            http.request.method = %method,
            http.route = %route,
            http.response.status_code = field::Empty,
            otel.status_code = field::Empty,
            trace_id = field::Empty,
        );
        span.set_parent(parent_context);

        // Use the clone that was polled ready
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);

        Box::pin(
            async move {
                let current_span = Span::current();
                let otel_context = current_span.context();
                let span_context = otel_context.span().span_context().clone();
                if span_context.is_valid() {
                    current_span.record("trace_id", span_context.trace_id().to_string());
                }

                let result = inner.call(req).await;
                match &result {
                    Ok(response) => {
                        let status = response.status().as_u16();
                        current_span.record("http.response.status_code", status);
                        if status >= 500 {
                            current_span.record("otel.status_code", "ERROR");
                        }
                    }
                    Err(_) => {
                        current_span.record("otel.status_code", "ERROR");
                    }
                }
                result
            }
            .instrument(span),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_template_replaces_ids() {
        assert_eq!(
            route_template("/api/admin/events/cq2v5k8u0abc123def45/registrations"),
            "/api/admin/events/{id}/registrations"
        );
        assert_eq!(route_template("/api/representatives"), "/api/representatives");
        assert_eq!(route_template("/health"), "/health");
    }
}
