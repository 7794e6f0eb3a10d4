//! Typed client core for the traffic-analysis dashboard.
//!
//! The modules cover the backend's HTTP contract, the job lifecycle
//! (start + fixed-interval polling with explicit cancellation), artifact
//! downloads with a manual-download fallback, and the user-facing
//! formatting shared by the console driver and the GUI.

pub mod api;
pub mod client;
pub mod display;
pub mod download;
pub mod lifecycle;
pub mod prelude;
pub mod telemetry;

pub use client::ApiClient;
pub use prelude::{ClientError, ClientResult};
