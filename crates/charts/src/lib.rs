pub mod svg;

pub use svg::SvgChartRenderer;
