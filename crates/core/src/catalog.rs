//! Lookup seams between the aggregator and whatever holds services and categories.
//!
//! Reports load a [`ReportSnapshot`] once per request: every order line plus the
//! services and categories those lines reference. The [`Catalog`] then answers
//! lookups from memory, so aggregation never goes back to the database per row.

use std::collections::{BTreeSet, HashMap};

use async_trait::async_trait;

use crate::domain::order::OrderLine;
use crate::domain::service::{Category, CategoryId, Service, ServiceId};
use crate::errors::DataSourceError;

pub trait ServiceLookup {
    fn service(&self, id: ServiceId) -> Option<&Service>;
}

pub trait CategoryLookup {
    fn category(&self, id: CategoryId) -> Option<&Category>;
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Catalog {
    services: HashMap<ServiceId, Service>,
    categories: HashMap<CategoryId, Category>,
}

impl Catalog {
    pub fn new(
        services: impl IntoIterator<Item = Service>,
        categories: impl IntoIterator<Item = Category>,
    ) -> Self {
        Self {
            services: services.into_iter().map(|service| (service.id, service)).collect(),
            categories: categories.into_iter().map(|category| (category.id, category)).collect(),
        }
    }

    pub fn service_count(&self) -> usize {
        self.services.len()
    }

    pub fn category_count(&self) -> usize {
        self.categories.len()
    }
}

impl ServiceLookup for Catalog {
    fn service(&self, id: ServiceId) -> Option<&Service> {
        self.services.get(&id)
    }
}

impl CategoryLookup for Catalog {
    fn category(&self, id: CategoryId) -> Option<&Category> {
        self.categories.get(&id)
    }
}

impl<T: ServiceLookup + ?Sized> ServiceLookup for &T {
    fn service(&self, id: ServiceId) -> Option<&Service> {
        (**self).service(id)
    }
}

impl<T: CategoryLookup + ?Sized> CategoryLookup for &T {
    fn category(&self, id: CategoryId) -> Option<&Category> {
        (**self).category(id)
    }
}

/// Distinct service ids referenced by `orders`, ascending.
pub fn referenced_service_ids(orders: &[OrderLine]) -> Vec<ServiceId> {
    orders.iter().map(|line| line.product_id).collect::<BTreeSet<_>>().into_iter().collect()
}

/// Distinct category ids referenced by `services`, ascending.
pub fn referenced_category_ids<'a>(
    services: impl IntoIterator<Item = &'a Service>,
) -> Vec<CategoryId> {
    services
        .into_iter()
        .filter_map(|service| service.category_id)
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ReportSnapshot {
    pub orders: Vec<OrderLine>,
    pub catalog: Catalog,
}

impl ReportSnapshot {
    pub fn new(orders: Vec<OrderLine>, catalog: Catalog) -> Self {
        Self { orders, catalog }
    }
}

#[async_trait]
pub trait ReportDataSource: Send + Sync {
    /// Reads all order lines and the catalog rows they reference.
    async fn load_snapshot(&self) -> Result<ReportSnapshot, DataSourceError>;
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    use super::{referenced_category_ids, referenced_service_ids, Catalog, ServiceLookup};
    use crate::domain::order::{OrderLine, OrderLineId};
    use crate::domain::service::{CategoryId, Service, ServiceId};

    fn line(id: i64, product: i64) -> OrderLine {
        OrderLine {
            id: OrderLineId(id),
            product_id: ServiceId(product),
            quantity: 1,
            created_at: NaiveDate::from_ymd_opt(2024, 1, 2)
                .and_then(|date| date.and_hms_opt(9, 0, 0))
                .expect("timestamp"),
        }
    }

    fn service(id: i64, category: Option<i64>) -> Service {
        Service {
            id: ServiceId(id),
            service_name: format!("service-{id}"),
            price: Decimal::ONE,
            category_id: category.map(CategoryId),
        }
    }

    #[test]
    fn referenced_service_ids_are_distinct_and_sorted() {
        let orders = vec![line(1, 7), line(2, 3), line(3, 7)];
        assert_eq!(referenced_service_ids(&orders), vec![ServiceId(3), ServiceId(7)]);
    }

    #[test]
    fn referenced_category_ids_skip_uncategorised_services() {
        let services = [service(1, Some(4)), service(2, None), service(3, Some(4))];
        assert_eq!(referenced_category_ids(&services), vec![CategoryId(4)]);
    }

    #[test]
    fn catalog_returns_none_for_unknown_service() {
        let catalog = Catalog::new([service(1, None)], []);
        assert!(catalog.service(ServiceId(1)).is_some());
        assert!(catalog.service(ServiceId(2)).is_none());
    }
}
