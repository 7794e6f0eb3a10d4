use serde::{Deserialize, Serialize};

/// Job state reported by `GET /status`.
///
/// The job is terminal once `done` is set or `error` is present; `running`
/// only distinguishes "queued by someone" from "idle".
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct AnalysisStatus {
    #[serde(default)]
    pub running: bool,
    #[serde(default)]
    pub done: bool,
    #[serde(default)]
    pub error: Option<String>,
}

impl AnalysisStatus {
    pub fn is_terminal(&self) -> bool {
        self.done || self.error.is_some()
    }
}

/// Acknowledgement returned by `POST /run-analysis` on success.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StartResponse {
    pub status: String,
}

/// Body the backend attaches to 400-level responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_terminal_on_done_or_error() {
        let running = AnalysisStatus {
            running: true,
            done: false,
            error: None,
        };
        assert!(!running.is_terminal());

        let done = AnalysisStatus {
            done: true,
            ..Default::default()
        };
        assert!(done.is_terminal());

        let failed = AnalysisStatus {
            error: Some("Ошибка анализа".into()),
            ..Default::default()
        };
        assert!(failed.is_terminal());
    }

    #[test]
    fn status_tolerates_missing_fields() {
        let status: AnalysisStatus = serde_json::from_str("{\"done\": true}").unwrap();
        assert!(status.done);
        assert!(status.error.is_none());
    }
}
