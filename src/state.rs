use std::path::Path;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::config::Config;
use crate::data::error::DataSourceError;
use crate::data::aggregate::{describe, zone_summary, StatsTable, ZoneSummary};
use crate::data::cache::SourceCache;
use crate::data::density::{clamp_sample_size, sample_and_summarize, DensityView};
use crate::data::distribution::{
    attribute_subsets, price_bounds, price_subset, AttributeFilter, AttributeSubsets,
};
use crate::data::filter::{select, Selection};
use crate::data::geo::BoundaryCollection;
use crate::data::model::{Frame, Sale, SalesTable};
use crate::data::trends::{date_bounds, sale_date_trend, year_bounds, year_built_trend};

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Dashboard tab.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Overview,
    Region,
    Attributes,
    Distribution,
}

impl View {
    pub const ALL: [View; 4] = [View::Overview, View::Region, View::Attributes, View::Distribution];

    pub fn title(self) -> &'static str {
        match self {
            View::Overview => "Data Overview",
            View::Region => "Region Overview",
            View::Attributes => "Real Estate Attributes",
            View::Distribution => "Price Distribution",
        }
    }
}

/// Outputs of the Data Overview tab.
#[derive(Debug, Clone, Default)]
pub struct Overview {
    pub table: Frame,
    pub zones: Vec<ZoneSummary>,
    pub stats: StatsTable,
}

/// The full UI state, independent of rendering.
pub struct AppState {
    pub config: Config,
    pub cache: SourceCache,

    /// Derived sales (None until a source loads).
    pub sales: Option<Arc<SalesTable>>,
    pub boundaries: Option<Arc<BoundaryCollection>>,

    pub view: View,

    // -- Data Overview --
    pub selection: Selection,
    pub overview: Overview,

    // -- Region Overview --
    pub sample_size: usize,
    pub density: DensityView,

    // -- Real Estate Attributes --
    pub year_range: Option<(i64, i64)>,
    pub date_range: Option<(NaiveDate, NaiveDate)>,
    pub year_trend: Vec<(i64, f64)>,
    pub date_trend: Vec<(NaiveDate, f64)>,

    // -- Price Distribution --
    pub price_range: Option<(f64, f64)>,
    pub price_rows: Vec<Sale>,
    pub attribute_filter: Option<AttributeFilter>,
    pub attribute_rows: AttributeSubsets,

    /// Status / error message shown in the UI.
    pub status_message: Option<String>,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        Self {
            cache: SourceCache::new(config.http_timeout),
            sample_size: config.default_sample,
            config,
            sales: None,
            boundaries: None,
            view: View::Overview,
            selection: Selection::default(),
            overview: Overview::default(),
            density: DensityView::default(),
            year_range: None,
            date_range: None,
            year_trend: Vec::new(),
            date_trend: Vec::new(),
            price_range: None,
            price_rows: Vec::new(),
            attribute_filter: None,
            attribute_rows: AttributeSubsets::default(),
            status_message: None,
        }
    }

    /// Build the state with both configured sources loaded. Either source
    /// failing aborts startup; nothing is partially loaded.
    pub fn startup(config: Config) -> Result<Self, DataSourceError> {
        let mut state = AppState::new(config);
        let sales = state.cache.sales(&state.config.sales_path)?;
        let boundaries = state.cache.boundaries(&state.config.geo_source)?;
        log::info!(
            "Using {} sales across {} zip codes, {} zone boundaries",
            sales.len(),
            sales.zipcodes.len(),
            boundaries.len()
        );
        state.boundaries = Some(boundaries);
        state.set_sales(sales);
        Ok(state)
    }

    /// Load the configured sources again after startup. Failures go to the
    /// status line and keep the tables already in use.
    pub fn load_sources(&mut self) {
        let sales_path = self.config.sales_path.clone();
        let geo_source = self.config.geo_source.clone();
        self.open_sales(&sales_path);
        self.open_boundaries(&geo_source);
    }

    pub fn open_sales(&mut self, path: &Path) {
        match self.cache.sales(path) {
            Ok(table) => {
                log::info!(
                    "Using {} sales across {} zip codes",
                    table.len(),
                    table.zipcodes.len()
                );
                self.config.sales_path = path.to_path_buf();
                self.set_sales(table);
            }
            Err(e) => self.report(&format!("Failed to load sales from {}", path.display()), &e),
        }
    }

    pub fn open_boundaries(&mut self, source: &str) {
        match self.cache.boundaries(source) {
            Ok(boundaries) => {
                self.config.geo_source = source.to_string();
                self.boundaries = Some(boundaries);
                self.resample();
            }
            Err(e) => self.report(&format!("Failed to load boundaries from {source}"), &e),
        }
    }

    /// Drop cached sources and load them again.
    pub fn reload(&mut self) {
        self.cache.invalidate();
        self.status_message = None;
        self.load_sources();
    }

    fn report(&mut self, what: &str, e: &dyn std::error::Error) {
        let mut message = format!("{what}: {e}");
        let mut source = e.source();
        while let Some(cause) = source {
            message.push_str(&format!(": {cause}"));
            source = cause.source();
        }
        log::error!("{message}");
        self.status_message = Some(message);
    }

    /// Ingest a newly loaded table, reset filters and recompute every view.
    pub fn set_sales(&mut self, table: Arc<SalesTable>) {
        self.selection = Selection::default();
        self.year_range = year_bounds(&table);
        self.date_range = date_bounds(&table);
        self.price_range = price_bounds(&table);
        self.attribute_filter = Some(AttributeFilter::unbounded(&table));
        self.sample_size = clamp_sample_size(self.config.default_sample, table.len());

        self.sales = Some(table);
        self.status_message = None;

        self.refresh_overview();
        self.resample();
        self.refresh_trends();
        self.refresh_distribution();
    }

    /// Recompute the overview after a filter change.
    pub fn refresh_overview(&mut self) {
        let Some(table) = &self.sales else { return };
        let view = select(table, &self.selection);
        self.overview = Overview {
            stats: describe(&view, &self.selection),
            zones: zone_summary(table, &self.selection.zipcodes),
            table: view,
        };
    }

    /// Draw a new map sample.
    pub fn resample(&mut self) {
        let Some(table) = &self.sales else { return };
        let empty = BoundaryCollection::default();
        let boundaries = self.boundaries.as_deref().unwrap_or(&empty);
        self.sample_size = clamp_sample_size(self.sample_size, table.len());
        self.density =
            sample_and_summarize(table, boundaries, self.sample_size, &mut rand::thread_rng());
    }

    pub fn refresh_trends(&mut self) {
        let Some(table) = &self.sales else { return };
        self.year_trend = match self.year_range {
            Some((lo, hi)) => year_built_trend(table, lo..=hi),
            None => Vec::new(),
        };
        self.date_trend = match self.date_range {
            Some((lo, hi)) => sale_date_trend(table, lo..=hi),
            None => Vec::new(),
        };
    }

    pub fn refresh_distribution(&mut self) {
        let Some(table) = &self.sales else { return };
        self.price_rows = match self.price_range {
            Some((lo, hi)) => price_subset(table, lo..=hi),
            None => Vec::new(),
        };
        self.attribute_rows = match &self.attribute_filter {
            Some(filter) => attribute_subsets(table, filter),
            None => AttributeSubsets::default(),
        };
    }

    pub fn toggle_attribute(&mut self, name: &str) {
        self.selection.toggle_attribute(name);
        self.refresh_overview();
    }

    pub fn toggle_zipcode(&mut self, zipcode: &str) {
        self.selection.toggle_zipcode(zipcode);
        self.refresh_overview();
    }

    /// Clear both overview filters.
    pub fn clear_selection(&mut self) {
        self.selection = Selection::default();
        self.refresh_overview();
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::data::model::tests::sale;

    fn state_with(sales: Vec<Sale>) -> AppState {
        let config = Config {
            sales_path: "unused.csv".into(),
            geo_source: "unused.geojson".into(),
            default_sample: 100,
            http_timeout: Duration::from_secs(1),
        };
        let mut state = AppState::new(config);
        state.set_sales(Arc::new(SalesTable::from_sales(sales)));
        state
    }

    #[test]
    fn new_table_fills_every_view() {
        let state = state_with((0..120).map(|i| sale(i, if i % 2 == 0 { "A" } else { "B" }, 10.0)).collect());

        assert_eq!(state.overview.table.num_rows(), 120);
        assert_eq!(state.overview.zones.len(), 2);
        assert!(!state.overview.stats.is_empty());
        assert_eq!(state.density.sample.len(), 100);
        assert_eq!(state.year_trend.len(), 120);
        assert_eq!(state.date_trend.len(), 120);
        assert_eq!(state.price_rows.len(), 120);
        assert_eq!(state.attribute_rows.bedrooms.len(), 120);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn toggling_filters_recomputes_overview() {
        let mut state = state_with(vec![sale(1, "A", 100.0), sale(2, "A", 200.0), sale(3, "B", 300.0)]);
        assert_eq!(state.sample_size, 3);

        state.toggle_zipcode("B");
        assert_eq!(state.overview.table.num_rows(), 1);
        assert_eq!(state.overview.zones.len(), 1);

        state.toggle_attribute("date");
        assert_eq!(state.overview.table.column_names(), vec!["date"]);
        assert!(state.overview.stats.is_empty());

        state.clear_selection();
        assert_eq!(state.overview.table.num_rows(), 3);
    }

    const CSV: &str = "id,date,price,bedrooms,bathrooms,sqft_lot,sqft_living,floors,waterfront,zipcode,lat,long,yr_built\n\
        1,20141013T000000,221900,3,1,5650,1180,1,0,98178,47.5112,-122.257,1955\n";
    const GEOJSON: &str = r#"{"type":"FeatureCollection","features":[
        {"type":"Feature","properties":{"ZIP":"98178"},
         "geometry":{"type":"Polygon","coordinates":[[[-122.3,47.4],[-122.2,47.4],[-122.2,47.6],[-122.3,47.4]]]}}
    ]}"#;

    fn config_for(sales_path: std::path::PathBuf, geo_source: String) -> Config {
        Config {
            sales_path,
            geo_source,
            default_sample: 100,
            http_timeout: Duration::from_secs(1),
        }
    }

    #[test]
    fn startup_loads_both_sources() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sales.csv");
        let geo = dir.path().join("zips.geojson");
        std::fs::write(&csv, CSV).unwrap();
        std::fs::write(&geo, GEOJSON).unwrap();

        let state = AppState::startup(config_for(csv, geo.to_string_lossy().into_owned())).unwrap();
        assert_eq!(state.sales.as_ref().map(|t| t.len()), Some(1));
        assert_eq!(state.boundaries.as_ref().map(|b| b.len()), Some(1));
        assert_eq!(state.density.zone_prices.len(), 1);
        assert!(state.status_message.is_none());
    }

    #[test]
    fn startup_fails_when_either_source_fails() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sales.csv");
        let geo = dir.path().join("zips.geojson");
        std::fs::write(&csv, CSV).unwrap();
        std::fs::write(&geo, GEOJSON).unwrap();
        let geo = geo.to_string_lossy().into_owned();

        let missing_sales = AppState::startup(config_for(dir.path().join("missing.csv"), geo));
        assert!(matches!(missing_sales, Err(DataSourceError::Csv { .. })));

        let missing_geo = dir.path().join("missing.geojson").to_string_lossy().into_owned();
        assert!(AppState::startup(config_for(csv, missing_geo)).is_err());
    }

    #[test]
    fn reload_failure_after_startup_keeps_current_table() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with(vec![sale(1, "A", 100.0)]);
        state.open_sales(&dir.path().join("missing.csv"));
        assert!(state.status_message.as_deref().unwrap_or("").contains("missing.csv"));
        assert_eq!(state.sales.as_ref().map(|t| t.len()), Some(1));
    }
}
