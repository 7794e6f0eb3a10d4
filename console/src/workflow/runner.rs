use crate::workflow::config::ConsoleConfig;
use anyhow::{bail, Context};
use log::{info, warn};
use std::sync::Arc;
use trafficcore::api::Artifact;
use trafficcore::display;
use trafficcore::download::{DownloadManager, DownloadOutcome};
use trafficcore::lifecycle::{CancelToken, Completion, Poller};
use trafficcore::telemetry::MetricsRecorder;
use trafficcore::ApiClient;

/// Options that shape a single run but do not belong in the config file.
#[derive(Debug, Clone, Copy, Default)]
pub struct RunOptions {
    pub skip_downloads: bool,
    pub raw_stats: bool,
}

pub struct Workflow {
    config: ConsoleConfig,
    client: ApiClient,
    metrics: Arc<MetricsRecorder>,
}

impl Workflow {
    pub fn new(config: ConsoleConfig) -> anyhow::Result<Self> {
        let client = ApiClient::new(&config.base_url)
            .with_context(|| format!("building client for {}", config.base_url))?;
        Ok(Self {
            config,
            client,
            metrics: Arc::new(MetricsRecorder::new()),
        })
    }

    pub async fn execute(&self, token: CancelToken, options: RunOptions) -> anyhow::Result<()> {
        let poller = Poller::new(
            self.client.clone(),
            self.config.poll_interval(),
            self.metrics.clone(),
        );
        info!("starting analysis against {}", self.config.base_url);

        let completion = poller
            .run_with(token, |status| {
                info!("status: running={} done={}", status.running, status.done)
            })
            .await
            .context("starting polling run")?;

        match completion {
            Completion::Done => info!("analysis finished"),
            Completion::Failed(message) => bail!("{message}"),
            Completion::Cancelled => {
                warn!("run cancelled");
                return Ok(());
            }
        }

        let report = match self.client.fetch_report().await {
            Ok(report) => report,
            Err(err) => {
                warn!("report fetch failed: {err}");
                display::REPORT_PLACEHOLDER.to_string()
            }
        };
        println!("{report}\n");

        match self.client.fetch_stats().await {
            Ok(stats) => {
                if options.raw_stats {
                    let encoded =
                        serde_json::to_string_pretty(&stats).context("encoding statistics")?;
                    println!("{encoded}");
                } else {
                    println!("{}", display::render_stats(&stats));
                }
            }
            Err(err) => warn!("statistics fetch failed: {}", err.user_message()),
        }

        if !options.skip_downloads {
            let downloads = DownloadManager::new(
                self.client.clone(),
                &self.config.output_dir,
                self.metrics.clone(),
            );
            for artifact in Artifact::ALL {
                match downloads.download(artifact).await {
                    DownloadOutcome::Saved { path } => {
                        println!("Сохранено: {}", path.display());
                    }
                    DownloadOutcome::Fallback {
                        url,
                        filename,
                        reason,
                    } => {
                        println!("Не удалось скачать {filename}: {reason}");
                        println!("Скачайте вручную: {url}");
                    }
                }
            }
        }

        let snapshot = self.metrics.snapshot();
        info!(
            "run metrics: polls={} downloads={} errors={}",
            snapshot.polls, snapshot.downloads, snapshot.errors
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn workflow_rejects_invalid_base_url() {
        let config = ConsoleConfig::from_args("not a url".into(), 1, PathBuf::from("out"));
        assert!(Workflow::new(config).is_err());
    }
}
