pub mod aggregation;
pub mod catalog;
pub mod chart;
pub mod config;
pub mod domain;
pub mod errors;
pub mod reports;
pub mod shell;

pub use aggregation::{aggregate_by_service, aggregate_by_week, service_label, week_start};
pub use catalog::{Catalog, CategoryLookup, ReportDataSource, ReportSnapshot, ServiceLookup};
pub use chart::{ChartKind, ChartSettings, ChartSink, ChartSpec, RenderedChart};
pub use domain::order::{OrderLine, OrderLineId};
pub use domain::service::{Category, CategoryId, Service, ServiceId};
pub use domain::summary::{ServiceSummary, Totals, WeeklySummary};
pub use errors::{
    ApplicationError, DataSourceError, DomainError, InterfaceError, RenderError,
};
pub use reports::{ReportGenerator, ReportKind};
pub use shell::{ErrorDialog, ReportShell, ShellState};
