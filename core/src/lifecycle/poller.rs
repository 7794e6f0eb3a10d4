use crate::api::AnalysisStatus;
use crate::client::ApiClient;
use crate::display;
use crate::lifecycle::cancel::CancelToken;
use crate::prelude::{ClientError, ClientResult};
use crate::telemetry::MetricsRecorder;
use log::{debug, info};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Terminal outcome of a polling run. Exactly one is produced per run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Completion {
    Done,
    Failed(String),
    Cancelled,
}

/// Job lifecycle controller.
///
/// `run` opens a session, starts the analysis, then samples `/status` at a
/// fixed interval until the job finishes, fails, or the token cancels.
/// Failures — transport and backend alike — fold into
/// [`Completion::Failed`] with user-facing text, so callers report them the
/// same way. A second concurrent run is refused.
pub struct Poller {
    client: ApiClient,
    interval: Duration,
    metrics: Arc<MetricsRecorder>,
    running: AtomicBool,
}

impl Poller {
    pub fn new(client: ApiClient, interval: Duration, metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            client,
            interval,
            metrics,
            running: AtomicBool::new(false),
        }
    }

    pub async fn run(&self, token: CancelToken) -> ClientResult<Completion> {
        self.run_with(token, |_| {}).await
    }

    /// Like [`Poller::run`], with an observer invoked on every status
    /// sample.
    pub async fn run_with<F>(
        &self,
        mut token: CancelToken,
        mut observer: F,
    ) -> ClientResult<Completion>
    where
        F: FnMut(&AnalysisStatus),
    {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(ClientError::Busy);
        }
        let _guard = RunningGuard(&self.running);

        if token.is_cancelled() {
            return Ok(Completion::Cancelled);
        }
        if let Err(err) = self.start_job().await {
            self.metrics.record_error();
            return Ok(Completion::Failed(display::start_failure_text(&err)));
        }
        info!("analysis started, polling every {:?}", self.interval);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    info!("polling cancelled");
                    return Ok(Completion::Cancelled);
                }
                _ = tokio::time::sleep(self.interval) => {}
            }

            let status = match self.client.fetch_status().await {
                Ok(status) => status,
                Err(err) => {
                    self.metrics.record_error();
                    return Ok(Completion::Failed(err.user_message()));
                }
            };
            self.metrics.record_poll();
            debug!("status: running={} done={}", status.running, status.done);
            observer(&status);

            if let Some(message) = status.error {
                self.metrics.record_error();
                return Ok(Completion::Failed(message));
            }
            if status.done {
                return Ok(Completion::Done);
            }
        }
    }

    async fn start_job(&self) -> ClientResult<()> {
        self.client.open_session().await?;
        self.client.start_analysis().await?;
        Ok(())
    }
}

struct RunningGuard<'a>(&'a AtomicBool);

impl Drop for RunningGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lifecycle::cancel::cancel_pair;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use warp::Filter;

    const TICK: Duration = Duration::from_millis(10);

    fn stub_poller(base: &str) -> Poller {
        let client = ApiClient::new(base).unwrap();
        Poller::new(client, TICK, Arc::new(MetricsRecorder::new()))
    }

    fn session_routes() -> impl Filter<Extract = impl warp::Reply, Error = warp::Rejection> + Clone
    {
        let root = warp::path::end().map(|| "ok");
        let start = warp::path("run-analysis")
            .and(warp::post())
            .map(|| warp::reply::json(&json!({"status": "started"})));
        root.or(start)
    }

    #[tokio::test]
    async fn run_completes_once_when_done() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let status = warp::path("status").and(warp::get()).map(move || {
            if counter.fetch_add(1, Ordering::SeqCst) < 2 {
                warp::reply::json(&json!({"running": true, "done": false}))
            } else {
                warp::reply::json(&json!({"running": false, "done": true}))
            }
        });
        let (addr, server) =
            warp::serve(session_routes().or(status)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let poller = stub_poller(&format!("http://{addr}"));
        let (_handle, token) = cancel_pair();
        let mut samples = 0;
        let completion = poller.run_with(token, |_| samples += 1).await.unwrap();

        assert_eq!(completion, Completion::Done);
        assert_eq!(samples, 3);
        assert_eq!(poller.metrics.snapshot().polls, 3);
    }

    #[tokio::test]
    async fn backend_error_is_surfaced_verbatim() {
        let status = warp::path("status").and(warp::get()).map(|| {
            warp::reply::json(&json!({
                "running": false,
                "done": false,
                "error": "Файл данных не найден: data/combined_data.h5"
            }))
        });
        let (addr, server) =
            warp::serve(session_routes().or(status)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let poller = stub_poller(&format!("http://{addr}"));
        let (_handle, token) = cancel_pair();
        let completion = poller.run(token).await.unwrap();

        assert_eq!(
            completion,
            Completion::Failed("Файл данных не найден: data/combined_data.h5".into())
        );
    }

    #[tokio::test]
    async fn start_rejection_reports_launch_failure() {
        let root = warp::path::end().map(|| "ok");
        let start = warp::path("run-analysis").and(warp::post()).map(|| {
            warp::reply::with_status(
                warp::reply::json(&json!({"error": "Анализ уже запущен"})),
                warp::http::StatusCode::BAD_REQUEST,
            )
        });
        let (addr, server) = warp::serve(root.or(start)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let poller = stub_poller(&format!("http://{addr}"));
        let (_handle, token) = cancel_pair();
        match poller.run(token).await.unwrap() {
            Completion::Failed(message) => {
                assert!(message.contains("Не удалось запустить анализ"), "{message}");
                assert!(message.contains("Анализ уже запущен"), "{message}");
            }
            other => panic!("expected failure, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancel_stops_an_endless_poll() {
        let status = warp::path("status")
            .and(warp::get())
            .map(|| warp::reply::json(&json!({"running": true, "done": false})));
        let (addr, server) =
            warp::serve(session_routes().or(status)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let poller = Arc::new(stub_poller(&format!("http://{addr}")));
        let (handle, token) = cancel_pair();
        let task = {
            let poller = poller.clone();
            tokio::spawn(async move { poller.run(token).await })
        };
        tokio::time::sleep(TICK * 5).await;
        handle.cancel();

        let completion = task.await.unwrap().unwrap();
        assert_eq!(completion, Completion::Cancelled);
    }

    #[tokio::test]
    async fn second_concurrent_run_is_refused() {
        let status = warp::path("status")
            .and(warp::get())
            .map(|| warp::reply::json(&json!({"running": true, "done": false})));
        let (addr, server) =
            warp::serve(session_routes().or(status)).bind_ephemeral(([127, 0, 0, 1], 0));
        tokio::spawn(server);

        let poller = Arc::new(stub_poller(&format!("http://{addr}")));
        let (first_handle, first_token) = cancel_pair();
        let first = {
            let poller = poller.clone();
            tokio::spawn(async move { poller.run(first_token).await })
        };
        tokio::time::sleep(TICK * 3).await;

        let (_handle, token) = cancel_pair();
        assert!(matches!(poller.run(token).await, Err(ClientError::Busy)));

        first_handle.cancel();
        first.await.unwrap().unwrap();
    }
}
