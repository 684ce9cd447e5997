use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use super::derive::derive_features;
use super::error::DataSourceError;
use super::geo::{load_boundaries, BoundaryCollection};
use super::loader::load_sales;
use super::model::SalesTable;

/// Load-once store for the derived sales tables and boundary collections,
/// keyed by source. Owned by the application state and passed where needed.
/// Failed loads are not remembered, so a later request retries.
#[derive(Debug)]
pub struct SourceCache {
    sales: HashMap<PathBuf, Arc<SalesTable>>,
    boundaries: HashMap<String, Arc<BoundaryCollection>>,
    http_timeout: Duration,
}

impl SourceCache {
    pub fn new(http_timeout: Duration) -> Self {
        Self {
            sales: HashMap::new(),
            boundaries: HashMap::new(),
            http_timeout,
        }
    }

    /// Derived sales table for `path`, loading it on first use.
    pub fn sales(&mut self, path: &Path) -> Result<Arc<SalesTable>, DataSourceError> {
        if let Some(table) = self.sales.get(path) {
            log::debug!("Sales cache hit for {}", path.display());
            return Ok(Arc::clone(table));
        }
        let table = Arc::new(derive_features(load_sales(path)?));
        self.sales.insert(path.to_path_buf(), Arc::clone(&table));
        Ok(table)
    }

    /// Boundary collection for `source` (path or URI), loading it on first use.
    pub fn boundaries(&mut self, source: &str) -> Result<Arc<BoundaryCollection>, DataSourceError> {
        if let Some(boundaries) = self.boundaries.get(source) {
            log::debug!("Boundary cache hit for {source}");
            return Ok(Arc::clone(boundaries));
        }
        let boundaries = Arc::new(load_boundaries(source, self.http_timeout)?);
        self.boundaries.insert(source.to_string(), Arc::clone(&boundaries));
        Ok(boundaries)
    }

    /// Forget every loaded source.
    pub fn invalidate(&mut self) {
        log::info!(
            "Dropping {} cached sales tables and {} boundary collections",
            self.sales.len(),
            self.boundaries.len()
        );
        self.sales.clear();
        self.boundaries.clear();
    }

    pub fn len(&self) -> usize {
        self.sales.len() + self.boundaries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CSV: &str = "id,date,price,bedrooms,bathrooms,sqft_lot,sqft_living,floors,waterfront,zipcode,lat,long,yr_built\n\
                       1,20140502T000000,100000,3,1,1000,800,1,0,98001,47.3,-122.2,1960\n";

    const GEOJSON: &str = r#"{"type": "FeatureCollection", "features": [
        {"type": "Feature", "properties": {"ZIP": "98001"},
         "geometry": {"type": "Polygon", "coordinates": [[[0, 0], [1, 0], [1, 1], [0, 0]]]}}
    ]}"#;

    #[test]
    fn loads_each_source_once() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("sales.csv");
        let geo = dir.path().join("zones.geojson");
        std::fs::write(&csv, CSV).unwrap();
        std::fs::write(&geo, GEOJSON).unwrap();
        let geo = geo.to_str().unwrap();

        let mut cache = SourceCache::new(Duration::from_secs(1));
        let first = cache.sales(&csv).unwrap();
        assert!((first.sales[0].lot_m2 - 92.903).abs() < 1e-9);

        // Changing the file on disk is not observed until invalidation.
        std::fs::write(&csv, CSV.replace("100000", "200000")).unwrap();
        let second = cache.sales(&csv).unwrap();
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(second.sales[0].price, 100_000.0);

        let zones = cache.boundaries(geo).unwrap();
        assert!(Arc::ptr_eq(&zones, &cache.boundaries(geo).unwrap()));
        assert_eq!(cache.len(), 2);

        cache.invalidate();
        assert!(cache.is_empty());
        assert_eq!(cache.sales(&csv).unwrap().sales[0].price, 200_000.0);
    }

    #[test]
    fn failed_loads_are_not_cached() {
        let dir = tempfile::tempdir().unwrap();
        let csv = dir.path().join("late.csv");

        let mut cache = SourceCache::new(Duration::from_secs(1));
        assert!(cache.sales(&csv).is_err());
        assert!(cache.is_empty());

        std::fs::write(&csv, CSV).unwrap();
        assert_eq!(cache.sales(&csv).unwrap().len(), 1);
    }
}
