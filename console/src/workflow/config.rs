use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Settings for a headless dashboard run.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ConsoleConfig {
    pub base_url: String,
    pub interval_secs: u64,
    pub output_dir: PathBuf,
}

impl ConsoleConfig {
    pub fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path_ref = path.as_ref();
        let contents = fs::read_to_string(path_ref)
            .with_context(|| format!("reading console config {}", path_ref.display()))?;
        let config: ConsoleConfig = serde_yaml::from_str(&contents)
            .with_context(|| format!("parsing console config {}", path_ref.display()))?;
        Ok(config)
    }

    pub fn from_args(base_url: String, interval_secs: u64, output_dir: PathBuf) -> Self {
        Self {
            base_url,
            interval_secs,
            output_dir,
        }
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn config_from_args_clamps_interval() {
        let cfg = ConsoleConfig::from_args("http://127.0.0.1:3015".into(), 0, "out".into());
        assert_eq!(cfg.poll_interval(), Duration::from_secs(1));
    }

    #[test]
    fn config_load_reads_yaml() {
        let mut temp = NamedTempFile::new().unwrap();
        temp.write_all(
            b"base_url: http://127.0.0.1:3015\ninterval_secs: 3\noutput_dir: results\n",
        )
        .unwrap();
        let path = temp.into_temp_path();
        let cfg = ConsoleConfig::load(&path).unwrap();
        assert_eq!(cfg.interval_secs, 3);
        assert_eq!(cfg.output_dir, PathBuf::from("results"));
    }
}
