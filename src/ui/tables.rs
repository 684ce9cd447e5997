use eframe::egui::{self, Ui};
use egui_extras::{Column, TableBuilder};

use crate::data::aggregate::{StatsTable, ZoneSummary};
use crate::data::model::Frame;
use crate::state::AppState;

const ROW_HEIGHT: f32 = 18.0;

// ---------------------------------------------------------------------------
// Data Overview (central panel)
// ---------------------------------------------------------------------------

pub fn overview(ui: &mut Ui, state: &AppState) {
    if state.sales.is_none() {
        ui.centered_and_justified(|ui: &mut Ui| {
            ui.heading("Open a sales file to explore  (File → Open sales…)");
        });
        return;
    }
    let overview = &state.overview;

    ui.heading("Data Overview");
    ui.label(format!(
        "{} rows × {} columns",
        overview.table.num_rows(),
        overview.table.num_columns()
    ));
    ui.push_id("overview_table", |ui: &mut Ui| frame_table(ui, &overview.table, 400.0));
    ui.separator();

    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].heading("Zipcode Analysis");
        cols[0].push_id("zipcode_table", |ui: &mut Ui| zone_table(ui, &overview.zones));
        cols[1].heading("Filtered Analysis");
        cols[1].push_id("stats_table", |ui: &mut Ui| stats_table(ui, &overview.stats));
    });
}

fn frame_table(ui: &mut Ui, frame: &Frame, height: f32) {
    let header: Vec<&str> = frame.column_names();
    egui::ScrollArea::horizontal().show(ui, |ui: &mut Ui| {
        TableBuilder::new(ui)
            .striped(true)
            .max_scroll_height(height)
            .columns(Column::auto().at_least(60.0), frame.num_columns())
            .header(ROW_HEIGHT + 2.0, |mut row| {
                for name in &header {
                    row.col(|ui: &mut Ui| {
                        ui.strong(*name);
                    });
                }
            })
            .body(|body| {
                body.rows(ROW_HEIGHT, frame.num_rows(), |mut row| {
                    let i = row.index();
                    for col in &frame.columns {
                        row.col(|ui: &mut Ui| {
                            ui.label(col.values[i].to_string());
                        });
                    }
                });
            });
    });
}

/// Missing merge cells render blank.
fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(v) => fmt_num(v),
        None => String::new(),
    }
}

fn fmt_num(v: f64) -> String {
    if v.is_nan() {
        "NaN".to_string()
    } else {
        format!("{v:.2}")
    }
}

fn zone_table(ui: &mut Ui, zones: &[ZoneSummary]) {
    const HEADER: [&str; 5] = ["zipcode", "id", "price", "lot_m2", "price_m2"];
    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(394.0)
        .columns(Column::auto().at_least(60.0), HEADER.len())
        .header(ROW_HEIGHT + 2.0, |mut row| {
            for name in HEADER {
                row.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, zones.len(), |mut row| {
                let zone = &zones[row.index()];
                let cells = [
                    zone.zipcode.clone(),
                    zone.count.map(|c| c.to_string()).unwrap_or_default(),
                    fmt_opt(zone.price),
                    fmt_opt(zone.lot_m2),
                    fmt_opt(zone.price_m2),
                ];
                for cell in cells {
                    row.col(|ui: &mut Ui| {
                        ui.label(cell);
                    });
                }
            });
        });
}

fn stats_table(ui: &mut Ui, stats: &StatsTable) {
    TableBuilder::new(ui)
        .striped(true)
        .max_scroll_height(400.0)
        .columns(Column::auto().at_least(60.0), 1 + stats.headers().len())
        .header(ROW_HEIGHT + 2.0, |mut row| {
            row.col(|_ui: &mut Ui| {});
            for name in stats.headers() {
                row.col(|ui: &mut Ui| {
                    ui.strong(name);
                });
            }
        })
        .body(|body| {
            body.rows(ROW_HEIGHT, stats.rows.len(), |mut row| {
                let column = &stats.rows[row.index()];
                row.col(|ui: &mut Ui| {
                    ui.strong(column.column.as_str());
                });
                for value in column.values() {
                    row.col(|ui: &mut Ui| {
                        ui.label(fmt_num(value));
                    });
                }
            });
        });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn formats_missing_and_nan() {
        assert_eq!(fmt_opt(None), "");
        assert_eq!(fmt_opt(Some(2.5)), "2.50");
        assert_eq!(fmt_num(f64::NAN), "NaN");
        assert_eq!(fmt_num(f64::INFINITY), "inf");
    }
}
