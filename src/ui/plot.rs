use eframe::egui::{Color32, RichText, Ui};
use egui_plot::{Bar, BarChart, Legend, Line, Plot, PlotPoints};

use tijuca_visitors::data::model::{Cell, Field};
use tijuca_visitors::state::SessionView;

use crate::color::generate_palette;

const CHART_HEIGHT: f32 = 280.0;
const HISTOGRAM_COLOR: Color32 = Color32::from_rgb(0x00, 0xff, 0xff);

// ---------------------------------------------------------------------------
// Summary metrics
// ---------------------------------------------------------------------------

/// Record count, mean and sum of `Total` for the filtered records.
pub fn metrics(ui: &mut Ui, view: &SessionView) {
    ui.heading("Charts");

    let Some(summary) = &view.summary else {
        if !view.filtered.columns.contains(&Field::Total) {
            ui.label("Select the Total column to see its summary.");
        }
        return;
    };

    ui.label(format!("Records: {}", summary.count));
    match summary.mean {
        Some(mean) => ui.label(format!("Mean Total: {mean:.2}")),
        None => ui.label("Mean Total: n/a"),
    };
    ui.label(format!("Sum Total: {}", summary.sum));
}

// ---------------------------------------------------------------------------
// Monthly line chart
// ---------------------------------------------------------------------------

/// One line per filtered record across the twelve months.
pub fn monthly_chart(ui: &mut Ui, view: &SessionView) {
    let series = &view.series;
    if !series.has_months() {
        ui.label("Select month columns to see the monthly chart.");
        return;
    }

    let colors = generate_palette(series.records);
    let names: Vec<String> = (0..series.records)
        .map(|i| record_name(view, i))
        .collect();

    ui.label(RichText::new("Visitors per month").strong());
    Plot::new("monthly_chart")
        .legend(Legend::default())
        .height(CHART_HEIGHT)
        .x_axis_label("Month (1–12)")
        .y_axis_label("Visitors")
        .allow_boxed_zoom(true)
        .allow_drag(true)
        .allow_scroll(true)
        .allow_zoom(true)
        .show(ui, |plot_ui| {
            for (idx, (color, name)) in colors.iter().zip(&names).enumerate() {
                let points: PlotPoints = series.record_line(idx).into_iter().collect();
                let line = Line::new(points).name(name).color(*color).width(1.5);
                plot_ui.line(line);
            }
        });
}

/// Legend label: the first text cell of the record, or its position.
fn record_name(view: &SessionView, idx: usize) -> String {
    view.filtered
        .rows
        .get(idx)
        .and_then(|row| row.iter().find(|cell| matches!(cell, Cell::Text(_))))
        .map(|cell| format!("{idx}: {cell}"))
        .unwrap_or_else(|| format!("record {idx}"))
}

// ---------------------------------------------------------------------------
// Histogram of Total
// ---------------------------------------------------------------------------

pub fn total_histogram(ui: &mut Ui, view: &SessionView) {
    let hist = &view.histogram;
    if hist.is_empty() {
        return;
    }

    let width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .bars()
        .map(|(center, count)| Bar::new(center, count as f64).width(width))
        .collect();

    ui.label(RichText::new("Histogram of Total").strong());
    Plot::new("total_histogram")
        .height(CHART_HEIGHT)
        .x_axis_label("Total")
        .y_axis_label("Frequency")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(HISTOGRAM_COLOR).name("Total"));
        });
}
