use eframe::egui::{self, Color32, RichText, ScrollArea, Ui};

use crate::data::density::MIN_SAMPLE;
use crate::data::distribution::{distinct_desc, HistAttribute};
use crate::state::{AppState, View};

// ---------------------------------------------------------------------------
// Top bar
// ---------------------------------------------------------------------------

/// Render the top menu, view tabs and status line.
pub fn top_bar(ui: &mut Ui, state: &mut AppState) {
    egui::menu::bar(ui, |ui: &mut Ui| {
        ui.menu_button("File", |ui: &mut Ui| {
            if ui.button("Open sales…").clicked() {
                open_sales_dialog(state);
                ui.close_menu();
            }
            if ui.button("Open boundaries…").clicked() {
                open_boundaries_dialog(state);
                ui.close_menu();
            }
            ui.separator();
            if ui.button("Reload").clicked() {
                state.reload();
                ui.close_menu();
            }
        });

        ui.separator();

        for view in View::ALL {
            ui.selectable_value(&mut state.view, view, view.title());
        }

        ui.separator();

        if let Some(table) = &state.sales {
            ui.label(format!(
                "{} sales, {} zip codes, {} boundaries",
                table.len(),
                table.zipcodes.len(),
                state.boundaries.as_ref().map_or(0, |b| b.len())
            ));
        }

        if let Some(msg) = &state.status_message {
            ui.label(RichText::new(msg).color(Color32::RED));
        }
    });
}

// ---------------------------------------------------------------------------
// Left side panel – filter widgets for the active view
// ---------------------------------------------------------------------------

pub fn side_panel(ui: &mut Ui, state: &mut AppState) {
    ui.heading(state.view.title());
    ui.separator();

    if state.sales.is_none() {
        ui.label("No dataset loaded.");
        return;
    }

    ScrollArea::vertical()
        .auto_shrink([false, false])
        .show(ui, |ui: &mut Ui| match state.view {
            View::Overview => overview_filters(ui, state),
            View::Region => region_filters(ui, state),
            View::Attributes => attribute_filters(ui, state),
            View::Distribution => distribution_filters(ui, state),
        });
}

fn overview_filters(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.sales.clone() else { return };
    let columns = table.column_names();

    let mut toggled_attribute = None;
    let mut toggled_zipcode = None;

    let header = format!("Attributes  ({}/{})", state.selection.attributes.len(), columns.len());
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("attributes_filter")
        .default_open(true)
        .show(ui, |ui: &mut Ui| {
            for col in &columns {
                let mut checked = state.selection.attributes.contains(col);
                if ui.checkbox(&mut checked, col.as_str()).changed() {
                    toggled_attribute = Some(col.clone());
                }
            }
        });

    let header = format!(
        "Zip codes  ({}/{})",
        state.selection.zipcodes.len(),
        table.zipcodes.len()
    );
    egui::CollapsingHeader::new(RichText::new(header).strong())
        .id_salt("zipcode_filter")
        .default_open(false)
        .show(ui, |ui: &mut Ui| {
            for zipcode in &table.zipcodes {
                let mut checked = state.selection.zipcodes.contains(zipcode);
                if ui.checkbox(&mut checked, zipcode.as_str()).changed() {
                    toggled_zipcode = Some(zipcode.clone());
                }
            }
        });

    ui.separator();
    if ui.button("Clear filters").clicked() {
        state.clear_selection();
    }

    if let Some(col) = toggled_attribute {
        state.toggle_attribute(&col);
    }
    if let Some(zipcode) = toggled_zipcode {
        state.toggle_zipcode(&zipcode);
    }
}

fn region_filters(ui: &mut Ui, state: &mut AppState) {
    let rows = state.sales.as_ref().map_or(0, |t| t.len());

    ui.strong("Number of samples");
    if rows > MIN_SAMPLE {
        let slider = egui::Slider::new(&mut state.sample_size, MIN_SAMPLE..=rows);
        if ui.add(slider).changed() {
            state.resample();
        }
    } else {
        ui.label(format!("All {rows} sales are shown."));
    }
    if ui.button("Resample").clicked() {
        state.resample();
    }
    ui.label(RichText::new("*Sampling used to decrease processing time").italics());

    if let Some((lat, long)) = state.density.center {
        ui.separator();
        ui.label(format!("Centre: {lat:.4}, {long:.4}"));
    }
}

fn attribute_filters(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.sales.clone() else { return };
    let mut changed = false;

    if let (Some((min, max)), Some((lo, hi))) =
        (crate::data::trends::year_bounds(&table), state.year_range.as_mut())
    {
        ui.strong("Construction year interval");
        changed |= ui.add(egui::Slider::new(lo, min..=max).text("from")).changed();
        changed |= ui.add(egui::Slider::new(hi, min..=max).text("to")).changed();
        if *lo > *hi {
            std::mem::swap(lo, hi);
        }
        ui.separator();
    }

    if let Some((from, to)) = state.date_range.as_mut() {
        ui.strong("Sale date interval");
        ui.horizontal(|ui: &mut Ui| {
            ui.label("from");
            changed |= ui
                .add(egui_extras::DatePickerButton::new(from).id_salt("sale_date_from"))
                .changed();
        });
        ui.horizontal(|ui: &mut Ui| {
            ui.label("to");
            changed |= ui
                .add(egui_extras::DatePickerButton::new(to).id_salt("sale_date_to"))
                .changed();
        });
        if *from > *to {
            std::mem::swap(from, to);
        }
    }

    if changed {
        state.refresh_trends();
    }
}

fn distribution_filters(ui: &mut Ui, state: &mut AppState) {
    let Some(table) = state.sales.clone() else { return };
    let mut changed = false;

    if let (Some((min, max)), Some((lo, hi))) =
        (crate::data::distribution::price_bounds(&table), state.price_range.as_mut())
    {
        ui.strong("Price interval");
        changed |= ui
            .add(egui::Slider::new(lo, min..=max).step_by(10_000.0).text("from"))
            .changed();
        changed |= ui
            .add(egui::Slider::new(hi, min..=max).step_by(10_000.0).text("to"))
            .changed();
        if *lo > *hi {
            std::mem::swap(lo, hi);
        }
        ui.separator();
    }

    if let Some(filter) = state.attribute_filter.as_mut() {
        ui.strong("Histogram filters");
        for attr in HistAttribute::ALL {
            let current = filter.max_for_mut(attr);
            egui::ComboBox::from_id_salt(attr.label())
                .selected_text(format!("Max {}: {current}", attr.label().to_lowercase()))
                .show_ui(ui, |ui: &mut Ui| {
                    for value in distinct_desc(&table, attr) {
                        changed |= ui
                            .selectable_value(current, value, value.to_string())
                            .changed();
                    }
                });
        }
        changed |= ui
            .checkbox(&mut filter.waterfront_only, "Only houses with water view")
            .changed();
    }

    if changed {
        state.refresh_distribution();
    }
}

// ---------------------------------------------------------------------------
// File dialogs
// ---------------------------------------------------------------------------

pub fn open_sales_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open sales data")
        .add_filter("Supported files", &["csv", "parquet", "pq"])
        .add_filter("CSV", &["csv"])
        .add_filter("Parquet", &["parquet", "pq"])
        .pick_file();

    if let Some(path) = file {
        state.open_sales(&path);
    }
}

pub fn open_boundaries_dialog(state: &mut AppState) {
    let file = rfd::FileDialog::new()
        .set_title("Open zone boundaries")
        .add_filter("GeoJSON", &["geojson", "json"])
        .pick_file();

    if let Some(path) = file {
        state.open_boundaries(&path.to_string_lossy());
    }
}
