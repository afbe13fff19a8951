use std::collections::{BTreeMap, HashMap};

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::errors::DomainError;

/// Running quantity and revenue for one group of order lines.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Totals {
    pub total_quantity: i64,
    pub total_price: Decimal,
}

impl Totals {
    pub fn new(total_quantity: i64, total_price: Decimal) -> Self {
        Self { total_quantity, total_price }
    }

    /// These totals plus one order line; fails instead of wrapping.
    pub fn with_line(&self, quantity: i64, unit_price: Decimal) -> Result<Self, DomainError> {
        let total_quantity =
            self.total_quantity.checked_add(quantity).ok_or(DomainError::TotalsOverflow)?;
        let total_price = unit_price
            .checked_mul(Decimal::from(quantity))
            .and_then(|line_price| self.total_price.checked_add(line_price))
            .ok_or(DomainError::TotalsOverflow)?;
        Ok(Self { total_quantity, total_price })
    }
}

/// Totals keyed by `"{service} | {category}"` label.
///
/// Entries iterate in the order their label was first observed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ServiceSummary {
    entries: Vec<(String, Totals)>,
    index: HashMap<String, usize>,
    overall: Totals,
}

impl ServiceSummary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Leaves the summary untouched when either the group or the overall total would overflow.
    pub fn add_line(
        &mut self,
        label: &str,
        quantity: i64,
        unit_price: Decimal,
    ) -> Result<(), DomainError> {
        let slot = self.index.get(label).copied();
        let current = slot.map(|slot| self.entries[slot].1).unwrap_or_default();
        let group = current.with_line(quantity, unit_price)?;
        let overall = self.overall.with_line(quantity, unit_price)?;

        match slot {
            Some(slot) => self.entries[slot].1 = group,
            None => {
                self.index.insert(label.to_string(), self.entries.len());
                self.entries.push((label.to_string(), group));
            }
        }
        self.overall = overall;
        Ok(())
    }

    pub fn get(&self, label: &str) -> Option<&Totals> {
        self.index.get(label).map(|slot| &self.entries[*slot].1)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Totals)> {
        self.entries.iter().map(|(label, totals)| (label.as_str(), totals))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.entries.iter().map(|(label, _)| label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn grand_total(&self) -> Totals {
        self.overall
    }
}

/// Totals keyed by the Monday that starts each week, in ascending date order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct WeeklySummary {
    weeks: BTreeMap<NaiveDate, Totals>,
    overall: Totals,
}

impl WeeklySummary {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add_line(
        &mut self,
        week_start: NaiveDate,
        quantity: i64,
        unit_price: Decimal,
    ) -> Result<(), DomainError> {
        let current = self.weeks.get(&week_start).copied().unwrap_or_default();
        let week = current.with_line(quantity, unit_price)?;
        let overall = self.overall.with_line(quantity, unit_price)?;

        self.weeks.insert(week_start, week);
        self.overall = overall;
        Ok(())
    }

    pub fn get(&self, week_start: &NaiveDate) -> Option<&Totals> {
        self.weeks.get(week_start)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&NaiveDate, &Totals)> {
        self.weeks.iter()
    }

    pub fn weeks(&self) -> Vec<NaiveDate> {
        self.weeks.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.weeks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.weeks.is_empty()
    }

    pub fn grand_total(&self) -> Totals {
        self.overall
    }
}
