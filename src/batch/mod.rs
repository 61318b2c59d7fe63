pub mod export;
pub mod jobs;

pub use export::{export_to_csv, export_to_json, write_csv, write_json};
pub use jobs::{load_jobs, read_jobs, run_jobs, JobOutcome, MatchJob};
