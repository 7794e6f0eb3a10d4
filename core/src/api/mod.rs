pub mod artifact;
pub mod stats;
pub mod status;
pub mod visuals;

pub use artifact::Artifact;
pub use stats::{StatisticsPayload, StatsResponse, VehicleTypes};
pub use status::{AnalysisStatus, ErrorBody, StartResponse};
pub use visuals::{decode_data_uri, ImageResponse, Visualization};
