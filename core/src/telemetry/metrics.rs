use std::sync::Mutex;

/// Counters surfaced at the end of a console run and in tests.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub polls: usize,
    pub downloads: usize,
    pub errors: usize,
}

#[derive(Debug)]
pub struct MetricsRecorder {
    inner: Mutex<MetricsSnapshot>,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self {
            inner: Mutex::new(MetricsSnapshot::default()),
        }
    }

    pub fn record_poll(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.polls += 1;
        }
    }

    pub fn record_download(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.downloads += 1;
        }
    }

    pub fn record_error(&self) {
        if let Ok(mut metrics) = self.inner.lock() {
            metrics.errors += 1;
        }
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        self.inner.lock().map(|metrics| *metrics).unwrap_or_default()
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}
