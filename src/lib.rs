pub mod batch;
pub mod config;
pub mod error;
pub mod models;
pub mod service;

pub use config::AppConfig;
pub use error::{MatchError, Result};
pub use service::{match_volumes, VolumeMatcher};
