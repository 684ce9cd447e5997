use std::collections::BTreeMap;
use std::ops::RangeInclusive;

use chrono::{Datelike, NaiveDate};
use eframe::egui::{Color32, RichText, Stroke, Ui};
use egui_plot::{Bar, BarChart, GridMark, Line, Plot, PlotPoints, Points, Polygon};

use crate::color::ColorRamp;
use crate::data::distribution::{histogram, HistAttribute, PRICE_BINS};
use crate::state::AppState;

const CHART_HEIGHT: f32 = 320.0;

fn placeholder(ui: &mut Ui) {
    ui.centered_and_justified(|ui: &mut Ui| {
        ui.heading("Open a sales file to explore  (File → Open sales…)");
    });
}

// ---------------------------------------------------------------------------
// Region Overview: sampled sales and price choropleth
// ---------------------------------------------------------------------------

pub fn region(ui: &mut Ui, state: &AppState) {
    if state.sales.is_none() {
        placeholder(ui);
        return;
    }
    let density = &state.density;

    ui.heading("Region Overview");
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].heading("Real Estate Density");
        let points: PlotPoints = density.sample.iter().map(|s| [s.long, s.lat]).collect();
        Plot::new("density_map")
            .data_aspect(1.0)
            .height(CHART_HEIGHT * 1.5)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .label_formatter(|_, p| format!("{:.4}, {:.4}", p.y, p.x))
            .show(&mut cols[0], |plot_ui| {
                plot_ui.points(Points::new(points).radius(2.0).color(Color32::LIGHT_BLUE));
            });

        cols[1].heading("Price Density");
        let Some((lo, hi)) = density.price_range() else {
            cols[1].label("No sales sampled.");
            return;
        };
        if density.boundaries.is_empty() {
            cols[1].label("No zone boundaries loaded for the sampled zip codes.");
        }
        let ramp = ColorRamp::new(lo, hi);
        let prices: BTreeMap<&str, f64> = density
            .zone_prices
            .iter()
            .map(|z| (z.zone_code.as_str(), z.avg_price))
            .collect();

        Plot::new("price_map")
            .data_aspect(1.0)
            .height(CHART_HEIGHT * 1.5)
            .x_axis_label("Longitude")
            .y_axis_label("Latitude")
            .show(&mut cols[1], |plot_ui| {
                for zone in &density.boundaries.zones {
                    let Some(price) = prices.get(zone.zone_code.as_str()) else {
                        continue;
                    };
                    let fill = ramp.color_for(*price, 180);
                    for ring in zone.geometry.exterior_rings() {
                        plot_ui.polygon(
                            Polygon::new(PlotPoints::new(ring.clone()))
                                .fill_color(fill)
                                .stroke(Stroke::new(0.5, Color32::from_gray(60))),
                        );
                    }
                }
            });

        cols[1].horizontal_wrapped(|ui: &mut Ui| {
            ui.label("Avg price:");
            for (value, color) in ramp.legend_entries() {
                ui.label(RichText::new("■").color(color));
                ui.label(format!("{}k", (value / 1000.0).round()));
            }
        });
    });
}

// ---------------------------------------------------------------------------
// Real Estate Attributes: price trends
// ---------------------------------------------------------------------------

fn date_to_x(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn x_to_date_label(mark: GridMark, _range: &RangeInclusive<f64>) -> String {
    NaiveDate::from_num_days_from_ce_opt(mark.value.round() as i32)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn trends(ui: &mut Ui, state: &AppState) {
    if state.sales.is_none() {
        placeholder(ui);
        return;
    }

    ui.heading("Real Estate Attributes");
    ui.columns(2, |cols: &mut [Ui]| {
        cols[0].heading("Average Price Per Year Built");
        let points: PlotPoints = state
            .year_trend
            .iter()
            .map(|&(year, price)| [year as f64, price])
            .collect();
        Plot::new("year_trend")
            .height(CHART_HEIGHT)
            .x_axis_label("yr_built")
            .y_axis_label("price")
            .show(&mut cols[0], |plot_ui| {
                plot_ui.line(Line::new(points).name("price").width(1.5));
            });

        cols[1].heading("Average Price Per Day");
        let points: PlotPoints = state
            .date_trend
            .iter()
            .map(|&(date, price)| [date_to_x(date), price])
            .collect();
        Plot::new("date_trend")
            .height(CHART_HEIGHT)
            .x_axis_label("date")
            .y_axis_label("price")
            .x_axis_formatter(x_to_date_label)
            .show(&mut cols[1], |plot_ui| {
                plot_ui.line(Line::new(points).name("price").width(1.5));
            });
    });
}

// ---------------------------------------------------------------------------
// Price Distribution: histograms
// ---------------------------------------------------------------------------

fn histogram_plot(ui: &mut Ui, id: &str, label: &str, values: Vec<f64>, nbins: usize) {
    let bars: Vec<Bar> = histogram(values, nbins)
        .iter()
        .map(|bin| {
            let width = if bin.width() > 0.0 { bin.width() } else { 0.5 };
            Bar::new(bin.center(), bin.count as f64).width(width)
        })
        .collect();
    Plot::new(id)
        .height(CHART_HEIGHT)
        .x_axis_label(label)
        .y_axis_label("count")
        .show(ui, |plot_ui| {
            plot_ui.bar_chart(BarChart::new(bars).color(Color32::LIGHT_BLUE).name(label));
        });
}

pub fn distribution(ui: &mut Ui, state: &AppState) {
    if state.sales.is_none() {
        placeholder(ui);
        return;
    }

    ui.heading("Price Distribution");
    histogram_plot(
        ui,
        "price_hist",
        "price",
        state.price_rows.iter().map(|s| s.price).collect(),
        PRICE_BINS,
    );
    ui.separator();

    ui.columns(HistAttribute::ALL.len(), |cols: &mut [Ui]| {
        for (col, attr) in cols.iter_mut().zip(HistAttribute::ALL) {
            col.heading(attr.label());
            let values = state
                .attribute_rows
                .get(attr)
                .iter()
                .map(|s| attr.value(s))
                .collect();
            histogram_plot(col, attr.label(), &attr.label().to_lowercase(), values, attr.bins());
        }
    });
}
