//! SVG rendering of [`ChartSpec`] documents with the plotters SVG backend.

use std::fmt::Display;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use tracing::debug;

use cartlens_core::chart::{
    ChartSink, ChartSpec, FooterAlignment, RenderedChart, Series, SVG_MEDIA_TYPE,
};
use cartlens_core::errors::RenderError;

type Area<'a> = DrawingArea<SVGBackend<'a>, Shift>;

const FONT: &str = "sans-serif";
const BAR_WIDTH: f64 = 0.7;
const HEADROOM: f64 = 1.25;
const ANNOTATION_LINE_HEIGHT: i32 = 16;
const FOOTER_LINE_HEIGHT: i32 = 22;
const FOOTER_PADDING: i32 = 12;

#[derive(Clone, Copy, Debug, Default)]
pub struct SvgChartRenderer;

impl SvgChartRenderer {
    pub fn new() -> Self {
        Self
    }
}

impl ChartSink for SvgChartRenderer {
    fn render(&self, spec: &ChartSpec) -> Result<RenderedChart, RenderError> {
        check_alignment(spec)?;

        // The plot keeps the configured size; the footer grows the canvas below it.
        let canvas_height = spec.height + footer_height(spec);
        let mut body = String::new();
        {
            let root = SVGBackend::with_string(&mut body, (spec.width, canvas_height))
                .into_drawing_area();
            root.fill(&WHITE).map_err(drawing_error)?;

            let (plot_area, footer_area) = root.split_vertically(spec.height as i32);

            draw_plot(&plot_area, spec)?;
            draw_footer(&footer_area, spec)?;
            root.present().map_err(drawing_error)?;
        }

        debug!(
            event_name = "chart.rendered",
            title = %spec.title,
            categories = spec.len(),
            height = canvas_height,
            bytes = body.len(),
            "rendered chart as svg"
        );

        Ok(RenderedChart { title: spec.title.clone(), media_type: SVG_MEDIA_TYPE, body })
    }
}

fn check_alignment(spec: &ChartSpec) -> Result<(), RenderError> {
    if spec.is_empty() {
        return Err(RenderError::EmptySeries);
    }
    let labels = spec.len();
    let series_lengths = std::iter::once(spec.bars.values.len())
        .chain(spec.line.as_ref().map(|line| line.values.len()));
    for values in series_lengths {
        if values != labels {
            return Err(RenderError::MisalignedSeries { labels, values });
        }
    }
    Ok(())
}

fn draw_plot(area: &Area<'_>, spec: &ChartSpec) -> Result<(), RenderError> {
    let slots = spec.len() as f64;
    let (low, high) = value_range(&spec.bars.values);

    let mut chart = ChartBuilder::on(area)
        .caption(spec.title.as_str(), (FONT, 30))
        .margin(20)
        .x_label_area_size(category_label_area(spec))
        .y_label_area_size(70)
        .right_y_label_area_size(if spec.line.is_some() { 90 } else { 0 })
        .build_cartesian_2d(0f64..slots, low..high)
        .map_err(drawing_error)?;

    // Category names are drawn by hand below; the mesh only provides ticks.
    let no_label = |_: &f64| String::new();
    let whole = |value: &f64| format!("{value:.0}");
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&no_label)
        .y_label_formatter(&whole)
        .x_desc(spec.x_axis_title.as_str())
        .y_desc(spec.bars.axis_title.as_str())
        .axis_desc_style((FONT, 18))
        .draw()
        .map_err(drawing_error)?;

    let bar_color = color_of(&spec.bars);
    chart
        .draw_series(spec.bars.values.iter().enumerate().map(|(slot, value)| {
            let left = slot as f64 + (1.0 - BAR_WIDTH) / 2.0;
            Rectangle::new([(left, 0.0), (left + BAR_WIDTH, *value)], bar_color.filled())
        }))
        .map_err(drawing_error)?;

    let label_anchors: Vec<(i32, i32)> = (0..spec.len())
        .map(|slot| chart.backend_coord(&(slot as f64 + 0.5, low)))
        .collect();
    let annotation_anchors: Vec<(i32, i32)> = spec
        .bars
        .values
        .iter()
        .enumerate()
        .map(|(slot, value)| chart.backend_coord(&(slot as f64 + 0.5, value.max(0.0))))
        .collect();

    if let Some(line) = &spec.line {
        let (line_low, line_high) = value_range(&line.values);
        let mut dual = chart.set_secondary_coord(0f64..slots, line_low..line_high);
        dual.configure_secondary_axes()
            .y_desc(line.axis_title.as_str())
            .y_label_formatter(&whole)
            .draw()
            .map_err(drawing_error)?;

        let line_color = color_of(line);
        let points: Vec<(f64, f64)> = line
            .values
            .iter()
            .enumerate()
            .map(|(slot, value)| (slot as f64 + 0.5, *value))
            .collect();
        dual.draw_secondary_series(LineSeries::new(points.clone(), line_color.stroke_width(2)))
            .map_err(drawing_error)?;
        dual.draw_secondary_series(
            points.into_iter().map(|point| Circle::new(point, 5, line_color.filled())),
        )
        .map_err(drawing_error)?;
    }

    draw_category_labels(area, spec, &label_anchors)?;
    draw_annotations(area, spec, &annotation_anchors)
}

fn draw_category_labels(
    area: &Area<'_>,
    spec: &ChartSpec,
    anchors: &[(i32, i32)],
) -> Result<(), RenderError> {
    let style = if spec.rotate_category_labels {
        TextStyle::from((FONT, 14).into_font().transform(FontTransform::Rotate90))
            .pos(Pos::new(HPos::Left, VPos::Center))
    } else {
        TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Top))
    };

    for (label, (x, y)) in spec.categories.iter().zip(anchors) {
        area.draw_text(label, &style, (*x, *y + 8)).map_err(drawing_error)?;
    }
    Ok(())
}

fn draw_annotations(
    area: &Area<'_>,
    spec: &ChartSpec,
    anchors: &[(i32, i32)],
) -> Result<(), RenderError> {
    let style = TextStyle::from((FONT, 14).into_font()).pos(Pos::new(HPos::Center, VPos::Bottom));

    for (lines, (x, y)) in spec.annotations.iter().zip(anchors) {
        // Last line sits right above the bar.
        for (row, text) in lines.iter().rev().enumerate() {
            let offset = 6 + row as i32 * ANNOTATION_LINE_HEIGHT;
            area.draw_text(text, &style, (*x, *y - offset)).map_err(drawing_error)?;
        }
    }
    Ok(())
}

fn draw_footer(area: &Area<'_>, spec: &ChartSpec) -> Result<(), RenderError> {
    let (width, _) = area.dim_in_pixel();
    let (x, hpos) = match spec.footer_alignment {
        FooterAlignment::Right => (width as i32 - 30, HPos::Right),
        FooterAlignment::Center => (width as i32 / 2, HPos::Center),
    };
    let style = TextStyle::from((FONT, 16).into_font()).pos(Pos::new(hpos, VPos::Top));

    for (row, line) in spec.footer.iter().enumerate() {
        let y = FOOTER_PADDING / 2 + row as i32 * FOOTER_LINE_HEIGHT;
        area.draw_text(line, &style, (x, y)).map_err(drawing_error)?;
    }
    Ok(())
}

fn footer_height(spec: &ChartSpec) -> u32 {
    (spec.footer.len() as i32 * FOOTER_LINE_HEIGHT + FOOTER_PADDING) as u32
}

fn category_label_area(spec: &ChartSpec) -> u32 {
    if !spec.rotate_category_labels {
        return 60;
    }
    let longest = spec.categories.iter().map(|label| label.chars().count()).max().unwrap_or(0);
    let wanted = longest as u32 * 8 + 40;
    wanted.clamp(60, (spec.height / 3).max(60))
}

/// Axis range covering every value plus room for annotations; always includes zero.
fn value_range(values: &[f64]) -> (f64, f64) {
    let max = values.iter().copied().fold(0.0_f64, f64::max);
    let min = values.iter().copied().fold(0.0_f64, f64::min);
    let high = if max > 0.0 { max * HEADROOM } else { 1.0 };
    let low = if min < 0.0 { min * HEADROOM } else { 0.0 };
    (low, high)
}

fn color_of(series: &Series) -> RGBAColor {
    let rgb = series.color;
    RGBColor(rgb.0, rgb.1, rgb.2).mix(series.opacity)
}

fn drawing_error<E: Display>(error: E) -> RenderError {
    RenderError::Drawing(error.to_string())
}
