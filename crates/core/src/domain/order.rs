use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::domain::service::ServiceId;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct OrderLineId(pub i64);

/// One cart entry. `product_id` points at a [`Service`](crate::domain::service::Service).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: OrderLineId,
    pub product_id: ServiceId,
    pub quantity: i64,
    pub created_at: NaiveDateTime,
}

impl OrderLine {
    pub fn created_on(&self) -> NaiveDate {
        self.created_at.date()
    }
}
