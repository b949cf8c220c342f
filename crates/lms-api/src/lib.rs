pub mod auth;
pub mod config;
pub mod course;
pub mod entity;
pub mod error;
pub mod lang;
pub mod metrics;
pub mod middleware;
pub mod progress;
pub mod router;
pub mod simulation;
pub mod state;
pub mod storage;
pub mod tracing;
pub mod upload;
pub mod validation;

pub use config::ApiConfig;
pub use state::{ApiState, AuthConfig};
