pub mod models;
pub mod probe;
pub mod service;

pub use models::{CheckOutcome, ProbeResult, Status};
pub use probe::{is_healthy_response, HttpProber, ServiceProbe};
pub use service::{CheckError, HealthCheckService};
