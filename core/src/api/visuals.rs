use crate::prelude::{ClientError, ClientResult};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// The four result panels. At most one is visible in the dashboard at a
/// time; each is fetched on demand from its own endpoint.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visualization {
    Heatmap,
    Infographic,
    SpeedDistribution,
    Stats,
}

impl Visualization {
    pub const ALL: [Visualization; 4] = [
        Visualization::Heatmap,
        Visualization::Infographic,
        Visualization::SpeedDistribution,
        Visualization::Stats,
    ];

    pub fn path(&self) -> &'static str {
        match self {
            Visualization::Heatmap => "visualizations/heatmap",
            Visualization::Infographic => "visualizations/infographic",
            Visualization::SpeedDistribution => "visualizations/speed-distribution",
            Visualization::Stats => "visualizations/stats",
        }
    }

    /// Panel label shown on the switcher buttons.
    pub fn title(&self) -> &'static str {
        match self {
            Visualization::Heatmap => "Тепловая карта",
            Visualization::Infographic => "Инфографика",
            Visualization::SpeedDistribution => "Распределение скоростей",
            Visualization::Stats => "Подробная статистика",
        }
    }
}

/// Envelope returned by `GET /visualizations/heatmap`; `image` carries a
/// `data:image/png;base64,...` URI.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

/// Decodes a base64 data URI (or a bare base64 string) into raw bytes.
pub fn decode_data_uri(uri: &str) -> ClientResult<Vec<u8>> {
    let payload = match uri.split_once("base64,") {
        Some((_, tail)) => tail,
        None => uri,
    };
    BASE64
        .decode(payload.trim())
        .map_err(|err| ClientError::Decode(format!("base64: {err}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_uri_prefix_is_stripped() {
        let decoded = decode_data_uri("data:image/png;base64,aGVsbG8=").unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn bare_base64_is_accepted() {
        let decoded = decode_data_uri("aGVsbG8=").unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn garbage_is_a_decode_error() {
        assert!(matches!(
            decode_data_uri("data:image/png;base64,???"),
            Err(ClientError::Decode(_))
        ));
    }
}
