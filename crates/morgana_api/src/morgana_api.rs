use common::http::{run_http_server, HttpServerConfig};
use morgana_runner::ProcessFuture;
use tokio_util::sync::CancellationToken;
use tracing::debug;

use crate::http::{build_router, AppState};

/// HTTP API of the Morgana network site, runnable as a runner process
pub struct MorganaApi {
    state: AppState,
    config: HttpServerConfig,
}

impl MorganaApi {
    pub fn new(state: AppState, config: HttpServerConfig) -> Self {
        debug!("Initializing Morgana API module");
        Self { state, config }
    }

    pub fn into_runner_process(self) -> impl FnOnce(CancellationToken) -> ProcessFuture {
        move |ctx| {
            Box::pin(async move {
                run_http_server(self.config, build_router(self.state), ctx).await
            })
        }
    }
}
