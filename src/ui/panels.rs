use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::model::Table;
use crate::data::summary::SummaryError;
use crate::export::{report_file_name, CSV_FILE_NAME};
use crate::report::{format_count, format_metric, NO_DATA};
use crate::state::{AppState, Status};
use crate::ui::plot;

const SAMPLE_ROWS: usize = 10;

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu / toolbar.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open…").clicked() {
                open_file_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            let has_table = state.table.is_some();
            if ui
                .add_enabled(has_table, egui::Button::new("Export CSV…"))
                .clicked()
            {
                save_csv_dialog(state);
                ui.close_menu();
            }
            if ui
                .add_enabled(state.metric.is_some(), egui::Button::new("Export Report…"))
                .clicked()
            {
                save_report_dialog(state);
                ui.close_menu();
            }
        });

        ui.separator();

        if let (Some(name), Some(table)) = (&state.source_name, &state.table) {
            ui.label(format!(
                "{name}: {} rows × {} columns",
                table.row_count(),
                table.column_count()
            ));
            ui.separator();
        }

        match &state.status {
            Some(Status::Error(msg)) => {
                ui.label(RichText::new(msg).color(Color32::RED));
            }
            Some(Status::Info(msg)) => {
                ui.label(msg);
            }
            None => {}
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – overview and metric selection
// ---------------------------------------------------------------------------

pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Overview");
    ui.separator();

    let Some(table) = &state.table else {
        ui.label("No file loaded.");
        return;
    };

    egui::Grid::new("overview_grid")
        .num_columns(2)
        .show(ui, |ui: &mut Ui| {
            ui.label("Rows");
            ui.label(format_count(table.row_count()));
            ui.end_row();
            ui.label("Columns");
            ui.label(format_count(table.column_count()));
            ui.end_row();
            ui.label("Numeric columns");
            ui.label(table.numeric_columns().len().to_string());
            ui.end_row();
        });
    ui.separator();

    let numeric: Vec<String> = table
        .numeric_columns()
        .into_iter()
        .map(str::to_string)
        .collect();
    let columns: Vec<String> = table
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect();

    ui.strong("Metric");
    if numeric.is_empty() {
        ui.label("No numeric columns.");
    } else {
        let current = state.metric.clone().unwrap_or_default();
        let mut picked = None;
        egui::ComboBox::from_id_salt("metric")
            .selected_text(&current)
            .show_ui(ui, |ui: &mut Ui| {
                for col in &numeric {
                    if ui.selectable_label(current == *col, col).clicked() {
                        picked = Some(col.clone());
                    }
                }
            });
        if let Some(col) = picked {
            state.select_metric(&col);
        }
    }
    ui.separator();

    egui::CollapsingHeader::new(RichText::new(format!("Columns ({})", columns.len())).strong())
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            ScrollArea::vertical()
                .auto_shrink([false, true])
                .show(ui, |ui: &mut Ui| {
                    for col in &columns {
                        if numeric.contains(col) {
                            ui.label(format!("{col}  (numeric)"));
                        } else {
                            ui.label(col);
                        }
                    }
                });
        });
}

// ---------------------------------------------------------------------------
// Central panel – dashboard
// ---------------------------------------------------------------------------

pub fn dashboard(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = &state.table else {
        empty_state(ui);
        return;
    };

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| {
            if let Some(metric) = &state.metric {
                ui.heading(format!("{metric} overview"));
                kpi_row(ui, state, table.row_count());
                ui.add_space(8.0);

                if let Some(hist) = &state.histogram {
                    ui.strong(format!("Distribution of {metric}"));
                    plot::histogram_plot(ui, metric, hist);
                }
                if let Some(totals) = &state.platform_totals {
                    ui.strong(format!("{metric} by Platform"));
                    plot::platform_plot(ui, metric, totals);
                }
            } else {
                ui.label("The file has no numeric columns to summarize.");
            }

            ui.add_space(8.0);
            ui.strong(format!("Data sample (first {SAMPLE_ROWS} rows)"));
            ui.push_id("data_sample", |ui: &mut Ui| data_sample(ui, table));
        });
}

fn kpi_row(ui: &mut Ui, state: &AppState, rows: usize) {
    let metric = state.metric.as_deref().unwrap_or_default();
    let (total, mean, max) = match &state.summary {
        Some(Ok(s)) => (format_metric(s.total), format_metric(s.mean), format_metric(s.max)),
        _ => (NO_DATA.to_string(), NO_DATA.to_string(), NO_DATA.to_string()),
    };

    ui.horizontal(|ui: &mut Ui| {
        kpi_box(ui, &format!("Total {metric}"), &total);
        kpi_box(ui, &format!("Average {metric}"), &mean);
        kpi_box(ui, &format!("Max {metric}"), &max);
        kpi_box(ui, "Total Rows", &format_count(rows));
    });

    if let Some(Err(e)) = &state.summary {
        let text = match e {
            SummaryError::NoValues(_) => format!("No values: every {metric} cell is empty."),
            other => other.to_string(),
        };
        ui.label(RichText::new(text).color(Color32::YELLOW));
    }
}

fn kpi_box(ui: &mut Ui, label: &str, value: &str) {
    egui::Frame::group(ui.style()).show(ui, |ui: &mut Ui| {
        ui.set_min_width(140.0);
        ui.vertical(|ui: &mut Ui| {
            ui.label(label);
            ui.label(RichText::new(value).size(20.0).strong());
        });
    });
}

fn data_sample(ui: &mut Ui, table: &Table) {
    let names = table.column_names();
    let rows = table.head(SAMPLE_ROWS);
    let headers: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let cells: Vec<Vec<String>> = rows
        .into_iter()
        .map(|row| row.into_iter().map(|v| v.to_string()).collect())
        .collect();
    text_table(ui, &headers, &cells);
}

/// Striped, scrollable grid of plain text.
fn text_table(ui: &mut Ui, headers: &[String], rows: &[Vec<String>]) {
    ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .vscroll(false)
            .columns(Column::auto().at_least(80.0).resizable(true), headers.len())
            .header(20.0, |mut header| {
                for h in headers {
                    header.col(|ui: &mut Ui| {
                        ui.strong(h);
                    });
                }
            })
            .body(|mut body| {
                for row in rows {
                    body.row(18.0, |mut table_row| {
                        for cell in row {
                            table_row.col(|ui: &mut Ui| {
                                ui.label(cell);
                            });
                        }
                    });
                }
            });
    });
}

// ---------------------------------------------------------------------------
// Bottom panel – insight assistant
// ---------------------------------------------------------------------------

pub fn assistant_section(ui: &mut Ui, state: &mut AppState) {
    ui.heading("Ask about your data");

    if let Some(reason) = state.assistant.unavailable_reason() {
        ui.label(RichText::new(reason.to_string()).color(Color32::YELLOW));
        return;
    }

    ui.add(
        egui::TextEdit::multiline(&mut state.question)
            .hint_text("e.g. Which platform has the lowest cost per click?")
            .desired_rows(2)
            .desired_width(f32::INFINITY),
    );
    if ui
        .add_enabled(state.table.is_some(), egui::Button::new("Get insights"))
        .clicked()
    {
        state.ask();
    }

    match &state.answer {
        Some(Ok(answer)) => {
            ScrollArea::vertical()
                .id_salt("answer")
                .auto_shrink([false, true])
                .show(ui, |ui: &mut Ui| {
                    ui.label(answer);
                });
        }
        Some(Err(e)) => {
            ui.label(RichText::new(e.to_string()).color(Color32::RED));
        }
        None => {}
    }
}

/// Shown before any file is loaded: what the tool expects.
fn empty_state(ui: &mut Ui) {
    ui.vertical_centered(|ui: &mut Ui| {
        ui.add_space(24.0);
        ui.heading("Open a paid media spreadsheet to begin  (File → Open…)");
    });
    ui.add_space(12.0);
    ui.label(
        "Expected format: one row per day, campaign or ad, with a header row. \
         Optional Date, Platform and Campaign columns unlock the date range, \
         platform breakdown and top campaign views. Any numeric column can be \
         chosen as the metric.",
    );
    ui.add_space(8.0);
    ui.strong("Example");

    let headers: Vec<String> = ["Campaign", "Impressions", "Clicks", "Cost"]
        .iter()
        .map(|s| s.to_string())
        .collect();
    let rows: Vec<Vec<String>> = [
        ["Spring Sale", "120,000", "3,400", "1,250"],
        ["Brand Search", "45,000", "2,900", "980"],
        ["Retargeting", "80,000", "1,700", "640"],
    ]
    .iter()
    .map(|r| r.iter().map(|s| s.to_string()).collect())
    .collect();
    ui.push_id("empty_state_sample", |ui: &mut Ui| text_table(ui, &headers, &rows));
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_file_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open paid media data")
        .add_filter("Supported files", &["xlsx", "xlsm", "xlsb", "xls", "ods", "csv", "parquet", "pq"])
        .add_filter("Excel", &["xlsx", "xlsm", "xlsb", "xls"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.load_path(&path);
    }
}

fn save_csv_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Export processed data")
        .set_file_name(CSV_FILE_NAME)
        .add_filter("CSV", &["csv"])
        .save_file();

    if let Some(path) = file {
        state.save_csv(&path);
    }
}

fn save_report_dialog(state: &mut AppState) {
    let Some(metric) = &state.metric else {
        return;
    };
    let file = rfd::FileDialog::new()
        .set_title("Export report")
        .set_file_name(report_file_name(metric))
        .add_filter("PowerPoint", &["pptx"])
        .save_file();

    if let Some(path) = file {
        state.save_report(&path);
    }
}
