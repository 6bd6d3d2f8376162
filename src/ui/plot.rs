use eframe::egui::{Color32, Ui};
use egui_plot::{Bar, BarChart, Plot};

use crate::color::{generate_palette, ACCENT};
use crate::data::group::GroupTotal;
use crate::data::summary::Histogram;

const PLOT_HEIGHT: f32 = 240.0;

// ---------------------------------------------------------------------------
// Metric histogram
// ---------------------------------------------------------------------------

pub fn histogram_plot(ui: &mut Ui, metric: &str, hist: &Histogram) {
    let width = hist.bin_width();
    let bars: Vec<Bar> = hist
        .bars()
        .map(|(centre, count)| Bar::new(centre, count as f64).width(width))
        .collect();
    let [r, g, b] = ACCENT;
    let chart = BarChart::new(bars)
        .name(format!("Distribution of {metric}"))
        .color(Color32::from_rgb(r, g, b));

    Plot::new("metric_histogram")
        .height(PLOT_HEIGHT)
        .x_axis_label(metric)
        .y_axis_label("Count")
        .allow_drag(false)
        .allow_scroll(false)
        .show(ui, |plot_ui| plot_ui.bar_chart(chart));
}

// ---------------------------------------------------------------------------
// Metric by platform
// ---------------------------------------------------------------------------

/// One bar per platform, in descending order of the metric.
pub fn platform_plot(ui: &mut Ui, metric: &str, totals: &[GroupTotal]) {
    let colors = generate_palette(totals.len());
    let labels: Vec<String> = totals.iter().map(|g| g.key.clone()).collect();

    Plot::new("platform_totals")
        .height(PLOT_HEIGHT)
        .y_axis_label(metric)
        .allow_drag(false)
        .allow_scroll(false)
        .x_axis_formatter(move |mark, _range| {
            let idx = mark.value.round();
            if (mark.value - idx).abs() > f64::EPSILON || idx < 0.0 {
                return String::new();
            }
            labels.get(idx as usize).cloned().unwrap_or_default()
        })
        .show(ui, |plot_ui| {
            for (i, (group, color)) in totals.iter().zip(colors).enumerate() {
                let bar = Bar::new(i as f64, group.total).width(0.7).name(&group.key);
                plot_ui.bar_chart(BarChart::new(vec![bar]).name(&group.key).color(color));
            }
        });
}
