//! Renderer-neutral chart descriptions built from report summaries.
//!
//! Everything a sink needs to draw (labels, series, annotations and footer text) is
//! resolved here, including money formatting, so sinks stay dumb.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

use crate::domain::summary::{ServiceSummary, WeeklySummary};
use crate::errors::RenderError;

pub const SVG_MEDIA_TYPE: &str = "image/svg+xml";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChartKind {
    Bar,
    DualAxisBarLine,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Rgb(pub u8, pub u8, pub u8);

pub const SKY_BLUE: Rgb = Rgb(135, 206, 235);
pub const TAB_BLUE: Rgb = Rgb(31, 119, 180);
pub const TAB_RED: Rgb = Rgb(214, 39, 40);

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Series {
    pub name: String,
    pub axis_title: String,
    pub values: Vec<f64>,
    pub color: Rgb,
    pub opacity: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ChartSpec {
    pub kind: ChartKind,
    pub title: String,
    pub x_axis_title: String,
    pub categories: Vec<String>,
    pub rotate_category_labels: bool,
    pub bars: Series,
    pub line: Option<Series>,
    /// One entry per category; each entry is drawn as stacked lines above its bar.
    pub annotations: Vec<Vec<String>>,
    pub footer: Vec<String>,
    pub footer_alignment: FooterAlignment,
    pub width: u32,
    pub height: u32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FooterAlignment {
    Right,
    Center,
}

impl ChartSpec {
    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    fn ensure_drawable(self) -> Result<Self, RenderError> {
        if self.categories.is_empty() {
            return Err(RenderError::EmptySeries);
        }
        let expected = self.categories.len();
        let line_len = self.line.as_ref().map(|line| line.values.len()).unwrap_or(expected);
        for values in [self.bars.values.len(), line_len, self.annotations.len()] {
            if values != expected {
                return Err(RenderError::MisalignedSeries { labels: expected, values });
            }
        }
        Ok(self)
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct RenderedChart {
    pub title: String,
    pub media_type: &'static str,
    pub body: String,
}

/// Anything that can turn a [`ChartSpec`] into a displayable document.
pub trait ChartSink: Send + Sync {
    fn render(&self, spec: &ChartSpec) -> Result<RenderedChart, RenderError>;
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartSettings {
    pub currency_suffix: String,
    pub width: u32,
    pub height: u32,
}

impl Default for ChartSettings {
    fn default() -> Self {
        Self { currency_suffix: "RUB".to_string(), width: 1800, height: 800 }
    }
}

impl ChartSettings {
    pub fn money(&self, amount: Decimal) -> String {
        format!("{} {}", format_amount(amount), self.currency_suffix)
    }
}

/// Two decimal places, half to even.
pub fn format_amount(amount: Decimal) -> String {
    let rounded = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointNearestEven);
    format!("{rounded:.2}")
}

fn to_plot_value(amount: Decimal) -> f64 {
    amount.to_f64().unwrap_or_default()
}

pub fn service_chart_spec(
    summary: &ServiceSummary,
    settings: &ChartSettings,
) -> Result<ChartSpec, RenderError> {
    let mut categories = Vec::with_capacity(summary.len());
    let mut quantities = Vec::with_capacity(summary.len());
    let mut annotations = Vec::with_capacity(summary.len());

    for (label, totals) in summary.iter() {
        categories.push(label.to_string());
        quantities.push(totals.total_quantity as f64);
        annotations.push(vec![
            totals.total_quantity.to_string(),
            settings.money(totals.total_price),
        ]);
    }

    let overall = summary.grand_total();
    let footer = vec![format!(
        "Total orders: {}, total amount: {}",
        overall.total_quantity,
        settings.money(overall.total_price)
    )];

    ChartSpec {
        kind: ChartKind::Bar,
        title: "Orders by service".to_string(),
        x_axis_title: "Services".to_string(),
        categories,
        rotate_category_labels: true,
        bars: Series {
            name: "quantity".to_string(),
            axis_title: "Order count".to_string(),
            values: quantities,
            color: SKY_BLUE,
            opacity: 1.0,
        },
        line: None,
        annotations,
        footer,
        footer_alignment: FooterAlignment::Right,
        width: settings.width,
        height: settings.height,
    }
    .ensure_drawable()
}

pub fn weekly_chart_spec(
    summary: &WeeklySummary,
    settings: &ChartSettings,
) -> Result<ChartSpec, RenderError> {
    let mut categories = Vec::with_capacity(summary.len());
    let mut quantities = Vec::with_capacity(summary.len());
    let mut prices = Vec::with_capacity(summary.len());
    let mut annotations = Vec::with_capacity(summary.len());
    let mut footer = Vec::with_capacity(summary.len());

    for (week, totals) in summary.iter() {
        let week_label = week.format("%Y-%m-%d").to_string();
        let money = settings.money(totals.total_price);
        quantities.push(totals.total_quantity as f64);
        prices.push(to_plot_value(totals.total_price));
        annotations.push(vec![format!("{} pcs.", totals.total_quantity), money.clone()]);
        footer.push(format!("{week_label}: {} orders, {money}", totals.total_quantity));
        categories.push(week_label);
    }

    ChartSpec {
        kind: ChartKind::DualAxisBarLine,
        title: "Orders and revenue by week".to_string(),
        x_axis_title: "Week".to_string(),
        categories,
        rotate_category_labels: false,
        bars: Series {
            name: "quantity".to_string(),
            axis_title: "Order count".to_string(),
            values: quantities,
            color: TAB_BLUE,
            opacity: 0.6,
        },
        line: Some(Series {
            name: "revenue".to_string(),
            axis_title: "Total amount".to_string(),
            values: prices,
            color: TAB_RED,
            opacity: 1.0,
        }),
        annotations,
        footer,
        footer_alignment: FooterAlignment::Center,
        width: settings.width,
        height: settings.height,
    }
    .ensure_drawable()
}
