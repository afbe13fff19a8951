use chrono::{Datelike, Days, NaiveDate};
use tracing::debug;

use crate::catalog::{CategoryLookup, ServiceLookup};
use crate::domain::order::OrderLine;
use crate::domain::service::Service;
use crate::domain::summary::{ServiceSummary, WeeklySummary};
use crate::errors::DomainError;

pub const LABEL_SEPARATOR: &str = " | ";

/// Monday on or before `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    let offset = u64::from(date.weekday().num_days_from_monday());
    date.checked_sub_days(Days::new(offset)).unwrap_or(date)
}

/// Group key for a service: `"{service} | {category}"`, or the bare service name.
pub fn service_label<C: CategoryLookup>(service: &Service, categories: &C) -> String {
    match service.category_id.and_then(|id| categories.category(id)) {
        Some(category) => {
            format!("{}{LABEL_SEPARATOR}{}", service.service_name, category.category_name)
        }
        None => service.service_name.clone(),
    }
}

/// Totals per service/category label.
///
/// Lines whose product does not resolve to a service are skipped.
pub fn aggregate_by_service<S, C>(
    orders: &[OrderLine],
    services: &S,
    categories: &C,
) -> Result<ServiceSummary, DomainError>
where
    S: ServiceLookup,
    C: CategoryLookup,
{
    if orders.is_empty() {
        return Err(DomainError::EmptyInput);
    }

    let mut summary = ServiceSummary::new();
    let mut skipped = 0usize;

    for line in orders {
        let Some(service) = services.service(line.product_id) else {
            skipped += 1;
            continue;
        };
        let label = service_label(service, categories);
        summary.add_line(&label, line.quantity, service.price)?;
    }

    debug!(
        event_name = "report.aggregate.by_service",
        lines = orders.len(),
        skipped,
        groups = summary.len(),
        "aggregated order lines by service"
    );

    Ok(summary)
}

/// Totals per week, keyed by the Monday that starts the week.
///
/// Lines whose product does not resolve to a service are skipped.
pub fn aggregate_by_week<S>(
    orders: &[OrderLine],
    services: &S,
) -> Result<WeeklySummary, DomainError>
where
    S: ServiceLookup,
{
    if orders.is_empty() {
        return Err(DomainError::EmptyInput);
    }

    let mut summary = WeeklySummary::new();
    let mut skipped = 0usize;

    for line in orders {
        let week = week_start(line.created_on());
        let Some(service) = services.service(line.product_id) else {
            skipped += 1;
            continue;
        };
        summary.add_line(week, line.quantity, service.price)?;
    }

    debug!(
        event_name = "report.aggregate.by_week",
        lines = orders.len(),
        skipped,
        weeks = summary.len(),
        "aggregated order lines by week"
    );

    Ok(summary)
}
