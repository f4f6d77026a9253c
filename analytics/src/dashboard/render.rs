//! Plotters rendering of the 2×2 dashboard.
//!
//! Category panels use a segmented integer axis: category `i` occupies the
//! segment between `Exact(i)` and `Exact(i + 1)`, and its tick label is
//! drawn at `CenterOf(i)`.

use plotters::coord::ranged1d::SegmentValue;
use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::{FontDesc, FontFamily, FontStyle, FontTransform};
use std::path::Path;

use super::{title_lines, AdmissionBilling, AgeGroupBilling, DashboardData, ParetoEntry};
use crate::error::RenderResult;
use crate::report::format::format_grouped;
use crate::stats::finite_range;

/// Bitmap size in pixels (a 16×10 inch figure at 300 dpi).
pub const FIGURE_SIZE: (u32, u32) = (4800, 3000);

const FONT: &str = "sans-serif";
const TITLE_SIZE: u32 = 96;
const SUBTITLE_SIZE: u32 = 64;
const CAPTION_SIZE: u32 = 60;
const LABEL_SIZE: u32 = 38;
const AXIS_DESC_SIZE: u32 = 46;

const BAR_COLOR: RGBColor = RGBColor(31, 119, 180);
const LINE_COLOR: RGBColor = RGBColor(214, 39, 40);
const BOX_COLOR: RGBColor = RGBColor(44, 160, 44);
const AGE_COLOR: RGBColor = RGBColor(148, 103, 189);

/// Draw the full figure and write it to `path`.
pub fn render_dashboard(data: &DashboardData, path: &Path) -> RenderResult<()> {
    let root = BitMapBackend::new(path, FIGURE_SIZE).into_drawing_area();
    draw_dashboard(&root, data)?;
    root.present()?;
    Ok(())
}

/// Draw the figure on any backend.
pub fn draw_dashboard<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    data: &DashboardData,
) -> RenderResult<()> {
    root.fill(&WHITE)?;

    let (title, subtitle) = title_lines(&data.kpis);
    let body = root.titled(&title, (FONT, TITLE_SIZE))?;
    let body = body.titled(&subtitle, (FONT, SUBTITLE_SIZE))?;

    let panels = body.split_evenly((2, 2));
    draw_billing_vs_stay(&panels[0], data)?;
    draw_pareto(&panels[1], &data.pareto)?;
    draw_admission_boxes(&panels[2], &data.admission_billing)?;
    draw_age_bars(&panels[3], &data.age_billing)?;
    Ok(())
}

// =============================================================================
// Helpers
// =============================================================================

/// Finite range widened by 5% on each side; never empty.
fn padded_range(values: &[f64]) -> (f64, f64) {
    match finite_range(values) {
        Some((lo, hi)) if hi > lo => {
            let pad = (hi - lo) * 0.05;
            (lo - pad, hi + pad)
        }
        Some((v, _)) => (v - 1.0, v + 1.0),
        None => (0.0, 1.0),
    }
}

/// `0..max * 1.1` for bar charts.
fn bar_range(values: &[f64]) -> f64 {
    match finite_range(values) {
        Some((_, hi)) if hi > 0.0 => hi * 1.1,
        _ => 1.0,
    }
}

fn category_label(value: &SegmentValue<i32>, labels: &[String]) -> String {
    match value {
        SegmentValue::CenterOf(i) => labels.get(*i as usize).cloned().unwrap_or_default(),
        _ => String::new(),
    }
}

/// Vertical tick labels so long condition names do not overlap.
fn rotated_label_font() -> FontDesc<'static> {
    FontDesc::new(FontFamily::SansSerif, LABEL_SIZE as f64, FontStyle::Normal)
        .transform(FontTransform::Rotate90)
}

fn money_label(value: &f64) -> String {
    format_grouped(*value, 0)
}

// =============================================================================
// Panels
// =============================================================================

fn draw_billing_vs_stay<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    data: &DashboardData,
) -> RenderResult<()> {
    let points: Vec<(f64, f64)> = data
        .records
        .iter()
        .map(|r| (r.length_of_stay, r.billing_amount))
        .filter(|(x, y)| x.is_finite() && y.is_finite())
        .collect();
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (x_lo, x_hi) = padded_range(&xs);
    let (y_lo, y_hi) = padded_range(&ys);

    let mut chart = ChartBuilder::on(area)
        .caption("Billing vs Length of Stay", (FONT, CAPTION_SIZE))
        .margin(40)
        .x_label_area_size(130)
        .y_label_area_size(220)
        .build_cartesian_2d(x_lo..x_hi, y_lo..y_hi)?;

    chart
        .configure_mesh()
        .x_desc("Length of Stay (Days)")
        .y_desc("Billing Amount")
        .y_label_formatter(&money_label)
        .label_style((FONT, LABEL_SIZE))
        .axis_desc_style((FONT, AXIS_DESC_SIZE))
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&p| Circle::new(p, 10, BAR_COLOR.mix(0.3).filled())),
    )?;

    if let (Some(fit), Some((lo, hi))) = (data.trend, finite_range(&xs)) {
        chart.draw_series(LineSeries::new(
            vec![(lo, fit.at(lo)), (hi, fit.at(hi))],
            LINE_COLOR.stroke_width(6),
        ))?;
    }
    Ok(())
}

fn draw_pareto<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    pareto: &[ParetoEntry],
) -> RenderResult<()> {
    let labels: Vec<String> = pareto.iter().map(|e| e.condition.clone()).collect();
    let totals: Vec<f64> = pareto.iter().map(|e| e.total_billing).collect();
    let n = pareto.len().max(1) as i32;

    let mut chart = ChartBuilder::on(area)
        .caption("Total Billing by Condition", (FONT, CAPTION_SIZE))
        .margin(40)
        .x_label_area_size(380)
        .y_label_area_size(240)
        .right_y_label_area_size(180)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..bar_range(&totals))?
        .set_secondary_coord((0..n).into_segmented(), 0f64..110f64);

    let label_fmt = |v: &SegmentValue<i32>| category_label(v, &labels);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len() + 1)
        .x_label_formatter(&label_fmt)
        .y_label_formatter(&money_label)
        .y_desc("Total Billing")
        .label_style((FONT, LABEL_SIZE))
        .x_label_style(rotated_label_font())
        .axis_desc_style((FONT, AXIS_DESC_SIZE))
        .draw()?;

    chart
        .configure_secondary_axes()
        .y_desc("Cumulative %")
        .label_style((FONT, LABEL_SIZE))
        .axis_desc_style((FONT, AXIS_DESC_SIZE))
        .draw()?;

    chart.draw_series(pareto.iter().enumerate().map(|(i, e)| {
        let i = i as i32;
        let mut bar = Rectangle::new(
            [
                (SegmentValue::Exact(i), 0.0),
                (SegmentValue::Exact(i + 1), e.total_billing),
            ],
            BAR_COLOR.filled(),
        );
        bar.set_margin(0, 0, 30, 30);
        bar
    }))?;

    let cumulative: Vec<(SegmentValue<i32>, f64)> = pareto
        .iter()
        .enumerate()
        .filter(|(_, e)| e.cumulative_pct.is_finite())
        .map(|(i, e)| (SegmentValue::CenterOf(i as i32), e.cumulative_pct))
        .collect();
    chart.draw_secondary_series(LineSeries::new(
        cumulative.clone(),
        LINE_COLOR.stroke_width(6),
    ))?;
    chart.draw_secondary_series(
        cumulative
            .into_iter()
            .map(|p| Circle::new(p, 14, LINE_COLOR.filled())),
    )?;
    Ok(())
}

fn draw_admission_boxes<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    groups: &[AdmissionBilling],
) -> RenderResult<()> {
    let labels: Vec<String> = groups
        .iter()
        .map(|g| g.admission_type.as_str().to_string())
        .collect();
    let extremes: Vec<f64> = groups
        .iter()
        .filter_map(|g| g.stats)
        .flat_map(|s| [s.whisker_low, s.whisker_high])
        .collect();
    let (y_lo, y_hi) = padded_range(&extremes);
    let n = groups.len().max(1) as i32;

    let mut chart = ChartBuilder::on(area)
        .caption("Billing Distribution by Admission Type", (FONT, CAPTION_SIZE))
        .margin(40)
        .x_label_area_size(130)
        .y_label_area_size(220)
        .build_cartesian_2d((0..n).into_segmented(), y_lo..y_hi)?;

    let label_fmt = |v: &SegmentValue<i32>| category_label(v, &labels);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len() + 1)
        .x_label_formatter(&label_fmt)
        .y_label_formatter(&money_label)
        .x_desc("Admission Type")
        .y_desc("Billing Amount")
        .label_style((FONT, LABEL_SIZE))
        .axis_desc_style((FONT, AXIS_DESC_SIZE))
        .draw()?;

    let stroke = BOX_COLOR.stroke_width(5);
    for (i, stats) in groups.iter().enumerate().filter_map(|(i, g)| g.stats.map(|s| (i as i32, s))) {
        let left = SegmentValue::Exact(i);
        let right = SegmentValue::Exact(i + 1);
        let center = SegmentValue::CenterOf(i);

        // box, then median and whisker caps as flat rectangles
        let spans = [
            (stats.q1, stats.q3, 60),
            (stats.median, stats.median, 60),
            (stats.whisker_low, stats.whisker_low, 120),
            (stats.whisker_high, stats.whisker_high, 120),
        ];
        chart.draw_series(spans.iter().map(|&(lo, hi, inset)| {
            let mut rect = Rectangle::new([(left.clone(), lo), (right.clone(), hi)], stroke);
            rect.set_margin(0, 0, inset, inset);
            rect
        }))?;

        chart.draw_series([
            PathElement::new(vec![(center.clone(), stats.whisker_low), (center.clone(), stats.q1)], stroke),
            PathElement::new(vec![(center.clone(), stats.q3), (center.clone(), stats.whisker_high)], stroke),
        ])?;
    }
    Ok(())
}

fn draw_age_bars<DB: DrawingBackend>(
    area: &DrawingArea<DB, Shift>,
    groups: &[AgeGroupBilling],
) -> RenderResult<()> {
    let labels: Vec<String> = groups.iter().map(|g| g.group.label().to_string()).collect();
    let means: Vec<f64> = groups.iter().filter_map(|g| g.mean_billing).collect();
    let n = groups.len().max(1) as i32;

    let mut chart = ChartBuilder::on(area)
        .caption("Average Billing by Age Group", (FONT, CAPTION_SIZE))
        .margin(40)
        .x_label_area_size(130)
        .y_label_area_size(220)
        .build_cartesian_2d((0..n).into_segmented(), 0f64..bar_range(&means))?;

    let label_fmt = |v: &SegmentValue<i32>| category_label(v, &labels);
    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_labels(labels.len() + 1)
        .x_label_formatter(&label_fmt)
        .y_label_formatter(&money_label)
        .x_desc("Age Group")
        .y_desc("Avg Billing")
        .label_style((FONT, LABEL_SIZE))
        .axis_desc_style((FONT, AXIS_DESC_SIZE))
        .draw()?;

    chart.draw_series(groups.iter().enumerate().filter_map(|(i, g)| {
        let i = i as i32;
        g.mean_billing.map(|mean| {
            let mut bar = Rectangle::new(
                [(SegmentValue::Exact(i), 0.0), (SegmentValue::Exact(i + 1), mean)],
                AGE_COLOR.filled(),
            );
            bar.set_margin(0, 0, 30, 30);
            bar
        })
    }))?;
    Ok(())
}
