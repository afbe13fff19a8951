pub mod connection;
pub mod data_source;
pub mod fixtures;
pub mod migrations;
pub mod repositories;

pub use connection::{connect_with_config, connect_with_settings, DbPool};
pub use data_source::SqlReportDataSource;
pub use fixtures::{DemoDataset, SeedResult, VerificationResult};
