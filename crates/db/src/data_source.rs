//! [`ReportDataSource`] over the SQLite catalog tables.

use async_trait::async_trait;
use tracing::debug;

use cartlens_core::catalog::{
    referenced_category_ids, referenced_service_ids, Catalog, ReportDataSource, ReportSnapshot,
};
use cartlens_core::errors::DataSourceError;

use crate::repositories::category::fetch_categories_by_ids;
use crate::repositories::order_line::list_order_lines;
use crate::repositories::service::fetch_services_by_ids;
use crate::repositories::RepositoryError;
use crate::DbPool;

/// Reads one snapshot per call on a single pooled connection inside one read transaction.
#[derive(Clone)]
pub struct SqlReportDataSource {
    pool: DbPool,
}

impl SqlReportDataSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &DbPool {
        &self.pool
    }

    async fn read_snapshot(&self) -> Result<ReportSnapshot, RepositoryError> {
        let mut tx = self.pool.begin().await?;

        let orders = list_order_lines(&mut tx).await?;
        let service_ids = referenced_service_ids(&orders);
        let services = fetch_services_by_ids(&mut tx, &service_ids).await?;
        let category_ids = referenced_category_ids(&services);
        let categories = fetch_categories_by_ids(&mut tx, &category_ids).await?;

        tx.commit().await?;

        debug!(
            event_name = "report.snapshot.loaded",
            order_lines = orders.len(),
            services = services.len(),
            categories = categories.len(),
            "loaded report snapshot"
        );

        Ok(ReportSnapshot::new(orders, Catalog::new(services, categories)))
    }
}

#[async_trait]
impl ReportDataSource for SqlReportDataSource {
    async fn load_snapshot(&self) -> Result<ReportSnapshot, DataSourceError> {
        self.read_snapshot().await.map_err(DataSourceError::from)
    }
}
