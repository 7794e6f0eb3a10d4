use serde::{Deserialize, Serialize};

/// Aggregated traffic statistics produced by a finished analysis run.
///
/// Field names follow the backend's `tracks.json` statistics block. The
/// payload is consumed read-only for display; every field defaults so a
/// partial payload still renders.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct StatisticsPayload {
    pub total_vehicles: u64,
    pub avg_speed_kmh: f64,
    pub congestion_vehicles: u64,
    pub congestion_percent: f64,
    pub peak_hour: String,
    pub traffic_intensity: f64,
    pub vehicle_types: VehicleTypes,
    pub processing_time: f64,
}

/// Vehicle-class breakdown.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct VehicleTypes {
    pub light: u64,
    pub heavy: u64,
}

/// Envelope returned by `GET /visualizations/stats`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsResponse {
    #[serde(default)]
    pub success: bool,
    #[serde(default)]
    pub data: Option<StatisticsPayload>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_payload_fills_defaults() {
        let payload: StatisticsPayload =
            serde_json::from_str("{\"total_vehicles\": 7, \"avg_speed_kmh\": 48.3}").unwrap();
        assert_eq!(payload.total_vehicles, 7);
        assert_eq!(payload.vehicle_types.light, 0);
        assert_eq!(payload.peak_hour, "");
    }

    #[test]
    fn stats_envelope_decodes_error_shape() {
        let response: StatsResponse =
            serde_json::from_str("{\"success\": false, \"error\": \"Failed to get statistics\"}")
                .unwrap();
        assert!(!response.success);
        assert!(response.data.is_none());
        assert_eq!(response.error.as_deref(), Some("Failed to get statistics"));
    }
}
