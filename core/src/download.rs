use crate::api::Artifact;
use crate::client::ApiClient;
use crate::prelude::{ClientError, ClientResult};
use crate::telemetry::MetricsRecorder;
use log::{info, warn};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tempfile::NamedTempFile;

/// Outcome of a download attempt. `Fallback` carries everything a UI needs
/// to offer a manual download of the same artifact.
#[derive(Debug, Clone)]
pub enum DownloadOutcome {
    Saved {
        path: PathBuf,
    },
    Fallback {
        url: String,
        filename: String,
        reason: String,
    },
}

/// Fetches result artifacts and persists them under a destination
/// directory.
///
/// Bytes land in a named temp file first; persisting renames it into place,
/// and any failure along the way drops the temp file with it.
#[derive(Debug, Clone)]
pub struct DownloadManager {
    client: ApiClient,
    dest: PathBuf,
    metrics: Arc<MetricsRecorder>,
}

impl DownloadManager {
    pub fn new(client: ApiClient, dest: impl Into<PathBuf>, metrics: Arc<MetricsRecorder>) -> Self {
        Self {
            client,
            dest: dest.into(),
            metrics,
        }
    }

    pub fn destination(&self) -> &Path {
        &self.dest
    }

    pub async fn download(&self, artifact: Artifact) -> DownloadOutcome {
        match self.try_save(artifact).await {
            Ok(path) => {
                self.metrics.record_download();
                info!("saved {} to {}", artifact.filename(), path.display());
                DownloadOutcome::Saved { path }
            }
            Err(err) => {
                self.metrics.record_error();
                warn!("download of {} failed: {err}", artifact.filename());
                DownloadOutcome::Fallback {
                    url: self.client.artifact_url(artifact),
                    filename: artifact.filename().to_string(),
                    reason: err.user_message(),
                }
            }
        }
    }

    async fn try_save(&self, artifact: Artifact) -> ClientResult<PathBuf> {
        let bytes = self.client.fetch_artifact(artifact).await?;
        std::fs::create_dir_all(&self.dest)?;
        let mut temp = NamedTempFile::new_in(&self.dest)?;
        temp.write_all(&bytes)?;
        let path = self.dest.join(artifact.filename());
        temp.persist(&path).map_err(|err| ClientError::Io(err.error))?;
        Ok(path)
    }
}
