//! Runs the long-lived processes of the service and shuts them down together.
//!
//! Every process receives the same [`CancellationToken`]. The token is
//! cancelled on SIGINT/SIGTERM, when any process fails, or when any process
//! returns on its own. Closers then run concurrently under a single timeout.
//!
//! ```no_run
//! use morgana_runner::Runner;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! Runner::new()
//!     .with_named_process("ticker", |ctx| {
//!         Box::pin(async move {
//!             ctx.cancelled().await;
//!             Ok::<(), anyhow::Error>(())
//!         })
//!     })
//!     .with_closer(|| async { Ok(()) })
//!     .with_closer_timeout(Duration::from_secs(5))
//!     .run()
//!     .await
//! # }
//! ```

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub type ProcessFuture = Pin<Box<dyn Future<Output = anyhow::Result<()>> + Send>>;

/// A process started with the shared shutdown token.
pub type AppProcess = Box<dyn FnOnce(CancellationToken) -> ProcessFuture + Send>;

/// Cleanup run once every process has stopped.
pub type Closer = Box<dyn FnOnce() -> ProcessFuture + Send>;

pub struct Runner {
    processes: Vec<(String, AppProcess)>,
    closers: Vec<Closer>,
    closer_timeout: Duration,
    cancellation_token: CancellationToken,
    handle_signals: bool,
}

impl Default for Runner {
    fn default() -> Self {
        Self::new()
    }
}

impl Runner {
    /// Closer timeout defaults to 10 seconds.
    pub fn new() -> Self {
        Self {
            processes: Vec::new(),
            closers: Vec::new(),
            closer_timeout: Duration::from_secs(10),
            cancellation_token: CancellationToken::new(),
            handle_signals: true,
        }
    }

    pub fn with_named_process<F>(mut self, name: impl Into<String>, process: F) -> Self
    where
        F: FnOnce(CancellationToken) -> ProcessFuture + Send + 'static,
    {
        self.processes.push((name.into(), Box::new(process)));
        self
    }

    /// Closers run even when a process failed; one failing closer does not stop the others.
    pub fn with_closer<F, Fut>(mut self, closer: F) -> Self
    where
        F: FnOnce() -> Fut + Send + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        self.closers.push(Box::new(move || Box::pin(closer())));
        self
    }

    pub fn with_closer_timeout(mut self, timeout: Duration) -> Self {
        self.closer_timeout = timeout;
        self
    }

    /// Share an externally owned token, e.g. to stop the runner from a test.
    pub fn with_cancellation_token(mut self, token: CancellationToken) -> Self {
        self.cancellation_token = token;
        self
    }

    /// Skip installing SIGINT/SIGTERM handlers.
    pub fn without_signal_handlers(mut self) -> Self {
        self.handle_signals = false;
        self
    }

    /// Run until shutdown, then run the closers.
    ///
    /// Returns the first process error, if any.
    pub async fn run(self) -> anyhow::Result<()> {
        let token = self.cancellation_token;
        let mut join_set = JoinSet::new();

        for (name, process) in self.processes {
            let process_token = token.clone();
            info!(process = %name, "starting process");
            join_set.spawn(async move { (name, process(process_token).await) });
        }

        if self.handle_signals {
            spawn_signal_handlers(token.clone());
        }

        let mut first_error = None;
        while let Some(joined) = join_set.join_next().await {
            match joined {
                Ok((name, Ok(()))) => {
                    debug!(process = %name, "process stopped");
                }
                Ok((name, Err(err))) => {
                    if token.is_cancelled() {
                        debug!(process = %name, error = %err, "process failed during shutdown");
                    } else {
                        error!(process = %name, "process failed: {:#}", err);
                        first_error = Some(err.context(format!("process {} failed", name)));
                    }
                }
                Err(err) => {
                    error!("process panicked: {}", err);
                    if first_error.is_none() {
                        first_error = Some(anyhow::anyhow!("process panicked: {}", err));
                    }
                }
            }
            token.cancel();
        }

        if !self.closers.is_empty() {
            info!(timeout = ?self.closer_timeout, "running closers");
            match tokio::time::timeout(self.closer_timeout, run_closers(self.closers)).await {
                Ok(()) => info!("all closers completed"),
                Err(_) => error!(timeout = ?self.closer_timeout, "closers timed out"),
            }
        }

        match first_error {
            Some(err) => Err(err),
            None => {
                info!("shutdown complete");
                Ok(())
            }
        }
    }
}

fn spawn_signal_handlers(token: CancellationToken) {
    let ctrl_c_token = token.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                info!("received SIGINT");
                ctrl_c_token.cancel();
            }
            Err(err) => error!("failed to listen for SIGINT: {}", err),
        }
    });

    #[cfg(unix)]
    tokio::spawn(async move {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
                info!("received SIGTERM");
                token.cancel();
            }
            Err(err) => error!("failed to listen for SIGTERM: {}", err),
        }
    });
}

async fn run_closers(closers: Vec<Closer>) {
    let mut closer_set = JoinSet::new();
    for closer in closers {
        closer_set.spawn(closer());
    }

    while let Some(result) = closer_set.join_next().await {
        match result {
            Ok(Ok(())) => debug!("closer completed"),
            Ok(Err(err)) => error!("closer failed: {:#}", err),
            Err(err) => error!("closer panicked: {}", err),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Arc;

    fn waits_for_cancel(
        flag: Arc<AtomicBool>,
    ) -> impl FnOnce(CancellationToken) -> ProcessFuture + Send + 'static {
        move |ctx| {
            Box::pin(async move {
                ctx.cancelled().await;
                flag.store(true, Ordering::SeqCst);
                Ok::<(), anyhow::Error>(())
            })
        }
    }

    #[tokio::test]
    async fn test_external_cancel_stops_processes_and_runs_closers() {
        let stopped = Arc::new(AtomicBool::new(false));
        let closed = Arc::new(AtomicBool::new(false));
        let token = CancellationToken::new();

        let closed_flag = closed.clone();
        let runner = Runner::new()
            .without_signal_handlers()
            .with_cancellation_token(token.clone())
            .with_named_process("server", waits_for_cancel(stopped.clone()))
            .with_closer(move || async move {
                closed_flag.store(true, Ordering::SeqCst);
                Ok(())
            });

        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(50)).await;
            token.cancel();
        });

        assert!(runner.run().await.is_ok());
        assert!(stopped.load(Ordering::SeqCst));
        assert!(closed.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_failing_process_cancels_the_others() {
        let stopped = Arc::new(AtomicBool::new(false));

        let result = Runner::new()
            .without_signal_handlers()
            .with_named_process("server", waits_for_cancel(stopped.clone()))
            .with_named_process("broken", |_| {
                Box::pin(async { Err::<(), _>(anyhow::anyhow!("bind failed")) })
            })
            .run()
            .await;

        let err = result.unwrap_err();
        assert!(format!("{:#}", err).contains("broken"));
        assert!(format!("{:#}", err).contains("bind failed"));
        assert!(stopped.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn test_every_closer_runs_even_if_one_fails() {
        let count = Arc::new(AtomicUsize::new(0));
        let first = count.clone();
        let second = count.clone();

        let result = Runner::new()
            .without_signal_handlers()
            .with_named_process("oneshot", |_| Box::pin(async { Ok::<(), anyhow::Error>(()) }))
            .with_closer(move || async move {
                first.fetch_add(1, Ordering::SeqCst);
                Err(anyhow::anyhow!("flush failed"))
            })
            .with_closer(move || async move {
                second.fetch_add(1, Ordering::SeqCst);
                Ok(())
            })
            .run()
            .await;

        assert!(result.is_ok());
        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_slow_closers_are_abandoned_after_timeout() {
        let started = std::time::Instant::now();
        let result = Runner::new()
            .without_signal_handlers()
            .with_named_process("oneshot", |_| Box::pin(async { Ok::<(), anyhow::Error>(()) }))
            .with_closer(|| async {
                tokio::time::sleep(Duration::from_secs(30)).await;
                Ok(())
            })
            .with_closer_timeout(Duration::from_millis(50))
            .run()
            .await;

        assert!(result.is_ok());
        assert!(started.elapsed() < Duration::from_secs(5));
    }
}
