//! Chart rendering: one PNG per input file, two y-axes over a shared time axis.
//!
//! Drawing is split from output so the chart can be drawn onto any plotters
//! backend. `render_chart` pairs it with the bitmap backend.

pub mod layout;
pub mod time_axis;

pub use layout::ChartLayout;

use crate::config::ChartConfig;
use crate::detector::TIMESTAMP_FORMAT;
use crate::metric::PatternSpec;
use crate::series::ExtractionResult;
use chrono::NaiveDateTime;
use layout::{AxisLayout, PlotSeries};
use plotters::coord::types::RangedCoordi64;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use std::path::{Path, PathBuf};
use time_axis::{tick_marks, TimeAxis, MAJOR_STEP_MINUTES};

const MARGIN: u32 = 20;
/// Space under the plot for the rotated timestamp labels.
const TIME_LABEL_AREA: u32 = 140;
const VALUE_LABEL_AREA: u32 = 70;
const LEGEND_SWATCH: i32 = 20;
const TICK_SIZE: i32 = 5;
const LABEL_GAP: i32 = 3;

type TimeValueChart<'a, DB> = ChartContext<'a, DB, Cartesian2d<TimeAxis, RangedCoordi64>>;

/// Drawing failure reported by the bitmap backend.
pub type BitmapError =
    DrawingAreaErrorKind<<BitMapBackend<'static> as DrawingBackend>::ErrorType>;

/// Errors that can occur while producing a chart image.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("failed to draw chart {}: {source}", path.display())]
    Draw { path: PathBuf, source: BitmapError },
    #[error("failed to write chart {}: {source}", path.display())]
    Write { path: PathBuf, source: BitmapError },
}

/// Image path for an input log: extension stripped, `suffix` appended,
/// same directory. `/var/logs/cluster.log` becomes
/// `/var/logs/cluster_rate_analysis.png` with the default suffix.
pub fn output_path(input: &Path, suffix: &str) -> PathBuf {
    let mut name = input.with_extension("").into_os_string();
    name.push(suffix);
    PathBuf::from(name)
}

/// Sort, lay out, and write the chart for one extraction result as a PNG.
///
/// A partially written file is left in place if writing fails.
pub fn render_chart(
    result: &ExtractionResult,
    spec: &PatternSpec,
    output: &Path,
    config: &ChartConfig,
) -> Result<(), RenderError> {
    let layout = ChartLayout::prepare(result, spec);
    if layout.is_empty() {
        tracing::warn!(output = %output.display(), "no samples matched, chart will be empty");
    }

    let root = BitMapBackend::new(output, (config.width, config.height)).into_drawing_area();
    draw_chart(&root, &layout, config).map_err(|e| RenderError::Draw {
        path: output.to_path_buf(),
        source: e,
    })?;
    root.present().map_err(|e| RenderError::Write {
        path: output.to_path_buf(),
        source: e,
    })?;

    tracing::info!(output = %output.display(), "wrote chart");
    Ok(())
}

/// Draw `layout` onto `root`.
///
/// Left-axis series are plotted against the primary y-scale and listed in
/// an upper-left legend. Right-axis series are plotted on a second chart
/// context laid over the same plot area, so they get their own scale and
/// their own upper-right legend. Each series is a line plus a marker per
/// sample.
pub fn draw_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    layout: &ChartLayout,
    config: &ChartConfig,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    root.fill(&WHITE)?;

    // The secondary coordinate only carries the right-hand axis.
    let mut chart = frame(root)
        .build_cartesian_2d(layout.time, layout.left.range.clone())?
        .set_secondary_coord(layout.time, layout.right.range.clone());

    chart
        .configure_mesh()
        .x_labels(config.max_time_labels)
        .disable_x_axis()
        .x_desc("Time")
        .y_desc(axis_description(&layout.left))
        .axis_desc_style(("sans-serif", 14))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_desc(axis_description(&layout.right))
        .axis_desc_style(("sans-serif", 14))
        .draw()?;

    draw_time_axis(root, &*chart, layout, config)?;

    for series in &layout.left.series {
        draw_plot_series(&mut *chart, series, config)?;
    }
    let mut right = frame(root).build_cartesian_2d(layout.time, layout.right.range.clone())?;
    for series in &layout.right.series {
        draw_plot_series(&mut right, series, config)?;
    }

    if !layout.left.series.is_empty() {
        chart
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperLeft)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    if !layout.right.series.is_empty() {
        right
            .configure_series_labels()
            .position(SeriesLabelPosition::UpperRight)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }

    Ok(())
}

/// Chart geometry shared by both contexts so their plot areas coincide.
fn frame<'a, 'b, DB: DrawingBackend>(
    root: &'a DrawingArea<DB, Shift>,
) -> ChartBuilder<'a, 'b, DB> {
    let mut builder = ChartBuilder::on(root);
    builder
        .margin(MARGIN)
        .x_label_area_size(TIME_LABEL_AREA)
        .y_label_area_size(VALUE_LABEL_AREA)
        .right_y_label_area_size(VALUE_LABEL_AREA);
    builder
}

/// One series as a line plus a filled circle per sample, with a legend entry.
fn draw_plot_series<'a, DB: DrawingBackend + 'a>(
    chart: &mut TimeValueChart<'a, DB>,
    series: &PlotSeries,
    config: &ChartConfig,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let color = series.color;
    chart
        .draw_series(LineSeries::new(
            series.points(),
            color.stroke_width(config.line_width),
        ))?
        .label(series.label.as_str())
        .legend(move |(x, y)| {
            PathElement::new(vec![(x, y), (x + LEGEND_SWATCH, y)], color.stroke_width(2))
        });
    chart.draw_series(
        series
            .points()
            .map(|p| Circle::new(p, config.point_radius, color.filled())),
    )?;
    Ok(())
}

/// Bottom axis line with a tick and a timestamp label per hourly mark.
///
/// Mesh labels are always anchored on their centre, which leaves a rotated
/// label straddling the axis. These hang down from their tick instead.
fn draw_time_axis<'a, DB: DrawingBackend + 'a>(
    root: &DrawingArea<DB, Shift>,
    chart: &TimeValueChart<'a, DB>,
    layout: &ChartLayout,
    config: &ChartConfig,
) -> Result<(), DrawingAreaErrorKind<DB::ErrorType>> {
    let (base_x, base_y) = root.get_base_pixel();
    let (x_pixels, y_pixels) = chart.plotting_area().get_pixel_range();
    let baseline = y_pixels.end - 1 - base_y;
    root.draw(&PathElement::new(
        vec![
            (x_pixels.start - base_x, baseline),
            (x_pixels.end - 1 - base_x, baseline),
        ],
        BLACK.stroke_width(1),
    ))?;

    let label_style = TextStyle::from(("sans-serif", 12).into_font())
        .transform(FontTransform::Rotate90)
        .pos(Pos::new(HPos::Left, VPos::Center));
    let span = layout.time.range();
    for mark in tick_marks(span.start, span.end, MAJOR_STEP_MINUTES, config.max_time_labels) {
        let (x, _) = chart.backend_coord(&(mark, layout.left.range.start));
        let x = x - base_x;
        root.draw(&PathElement::new(
            vec![(x, baseline), (x, baseline + TICK_SIZE)],
            BLACK.stroke_width(1),
        ))?;
        root.draw_text(
            &format_time(&mark),
            &label_style,
            (x, baseline + TICK_SIZE + LABEL_GAP),
        )?;
    }
    Ok(())
}

fn format_time(t: &NaiveDateTime) -> String {
    t.format(TIMESTAMP_FORMAT).to_string()
}

fn axis_description(axis: &AxisLayout) -> String {
    axis.labels().join(", ")
}
