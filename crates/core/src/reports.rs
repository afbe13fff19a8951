use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::info;

use crate::aggregation::{aggregate_by_service, aggregate_by_week};
use crate::catalog::{ReportDataSource, ReportSnapshot};
use crate::chart::{
    service_chart_spec, weekly_chart_spec, ChartSettings, ChartSink, ChartSpec, RenderedChart,
};
use crate::errors::{ApplicationError, DomainError};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportKind {
    Services,
    Weekly,
}

impl ReportKind {
    pub const ALL: [ReportKind; 2] = [ReportKind::Services, ReportKind::Weekly];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Services => "services",
            Self::Weekly => "weekly",
        }
    }

    pub fn button_label(self) -> &'static str {
        match self {
            Self::Services => "Build service chart",
            Self::Weekly => "Build weekly chart",
        }
    }
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReportKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "services" | "service" => Ok(Self::Services),
            "weekly" | "week" => Ok(Self::Weekly),
            other => Err(format!("unsupported report `{other}` (expected services|weekly)")),
        }
    }
}

/// Builds the chart specification for `kind` from an already loaded snapshot.
pub fn build_chart_spec(
    kind: ReportKind,
    snapshot: &ReportSnapshot,
    settings: &ChartSettings,
) -> Result<ChartSpec, ApplicationError> {
    let catalog = &snapshot.catalog;
    let spec = match kind {
        ReportKind::Services => {
            let summary = aggregate_by_service(&snapshot.orders, catalog, catalog)?;
            service_chart_spec(&summary, settings)?
        }
        ReportKind::Weekly => {
            let summary = aggregate_by_week(&snapshot.orders, catalog)?;
            weekly_chart_spec(&summary, settings)?
        }
    };
    Ok(spec)
}

/// One report pipeline: data source, aggregation, chart sink.
pub struct ReportGenerator<D, R> {
    source: D,
    sink: R,
    settings: ChartSettings,
}

impl<D, R> ReportGenerator<D, R>
where
    D: ReportDataSource,
    R: ChartSink,
{
    pub fn new(source: D, sink: R, settings: ChartSettings) -> Self {
        Self { source, sink, settings }
    }

    pub fn settings(&self) -> &ChartSettings {
        &self.settings
    }

    pub async fn generate(&self, kind: ReportKind) -> Result<RenderedChart, ApplicationError> {
        let snapshot = self.source.load_snapshot().await?;
        if snapshot.orders.is_empty() {
            return Err(DomainError::EmptyInput.into());
        }

        let spec = build_chart_spec(kind, &snapshot, &self.settings)?;
        let rendered = self.sink.render(&spec)?;

        info!(
            event_name = "report.generated",
            report_kind = %kind,
            order_lines = snapshot.orders.len(),
            groups = spec.len(),
            bytes = rendered.body.len(),
            "report chart rendered"
        );

        Ok(rendered)
    }
}
