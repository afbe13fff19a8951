use axum::Router;
use cartlens_charts::SvgChartRenderer;
use cartlens_core::config::{AppConfig, ConfigError, LoadOptions};
use cartlens_core::ReportGenerator;
use cartlens_db::{connect_with_config, migrations, DbPool, SqlReportDataSource};
use tera::Tera;
use thiserror::Error;
use tracing::info;

use crate::{health, ui};

pub struct Application {
    pub config: AppConfig,
    pub db_pool: DbPool,
    pub templates: Tera,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("database connection failed: {0}")]
    DatabaseConnect(#[source] sqlx::Error),
    #[error("database migration failed: {0}")]
    Migration(#[source] sqlx::migrate::MigrateError),
    #[error("template loading failed: {0}")]
    Templates(#[source] tera::Error),
}

pub async fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config).await
}

pub async fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    info!(
        event_name = "system.bootstrap.start",
        correlation_id = "bootstrap",
        "starting application bootstrap"
    );

    let db_pool =
        connect_with_config(&config.database).await.map_err(BootstrapError::DatabaseConnect)?;
    info!(
        event_name = "system.bootstrap.database_connected",
        correlation_id = "bootstrap",
        "database connection established"
    );

    migrations::run_pending(&db_pool).await.map_err(BootstrapError::Migration)?;
    info!(
        event_name = "system.bootstrap.migrations_applied",
        correlation_id = "bootstrap",
        "database migrations applied"
    );

    let templates = ui::init_templates().map_err(BootstrapError::Templates)?;

    Ok(Application { config, db_pool, templates })
}

impl Application {
    /// Report window plus health routes sharing one pool.
    pub fn router(self) -> Router {
        let generator = ReportGenerator::new(
            SqlReportDataSource::new(self.db_pool.clone()),
            SvgChartRenderer::new(),
            self.config.report.chart_settings(),
        );

        ui::router(ui::UiState::new(generator, self.templates)).merge(health::router(self.db_pool))
    }
}
