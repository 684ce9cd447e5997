use std::env;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};

pub const DEFAULT_SALES_PATH: &str = "./datasets/kc_house_data.csv";
pub const DEFAULT_GEO_SOURCE: &str =
    "https://opendata.arcgis.com/datasets/83fc2e72903343aabff6de8cb445b81c_2.geojson";

#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Tabular sales source (.csv or .parquet).
    pub sales_path: PathBuf,
    /// Zone boundary GeoJSON, local path or http(s) URL.
    pub geo_source: String,
    /// Initial value of the map sample slider.
    pub default_sample: usize,
    pub http_timeout: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // Load .env file if present
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(var: impl Fn(&str) -> Option<String>) -> Result<Self> {
        Ok(Config {
            sales_path: var("REALTY_SALES_PATH")
                .unwrap_or_else(|| DEFAULT_SALES_PATH.to_string())
                .into(),

            geo_source: var("REALTY_GEO_SOURCE").unwrap_or_else(|| DEFAULT_GEO_SOURCE.to_string()),

            default_sample: var("REALTY_DEFAULT_SAMPLE")
                .unwrap_or_else(|| "100".to_string())
                .parse()
                .context("REALTY_DEFAULT_SAMPLE must be a whole number")?,

            http_timeout: Duration::from_secs(
                var("REALTY_HTTP_TIMEOUT_SECS")
                    .unwrap_or_else(|| "30".to_string())
                    .parse()
                    .context("REALTY_HTTP_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
        })
    }

    /// Positional overrides: `[SALES_PATH [GEO_SOURCE]]`.
    pub fn with_args(mut self, mut args: impl Iterator<Item = String>) -> Self {
        if let Some(path) = args.next() {
            self.sales_path = path.into();
        }
        if let Some(source) = args.next() {
            self.geo_source = source;
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_without_environment() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config.sales_path, PathBuf::from(DEFAULT_SALES_PATH));
        assert_eq!(config.geo_source, DEFAULT_GEO_SOURCE);
        assert_eq!(config.default_sample, 100);
        assert_eq!(config.http_timeout, Duration::from_secs(30));
    }

    #[test]
    fn environment_overrides_defaults() {
        let config = Config::from_lookup(lookup(&[
            ("REALTY_SALES_PATH", "/data/sales.parquet"),
            ("REALTY_GEO_SOURCE", "zones.geojson"),
            ("REALTY_DEFAULT_SAMPLE", "250"),
            ("REALTY_HTTP_TIMEOUT_SECS", "5"),
        ]))
        .unwrap();
        assert_eq!(config.sales_path, PathBuf::from("/data/sales.parquet"));
        assert_eq!(config.geo_source, "zones.geojson");
        assert_eq!(config.default_sample, 250);
        assert_eq!(config.http_timeout, Duration::from_secs(5));
    }

    #[test]
    fn bad_numbers_are_rejected() {
        assert!(Config::from_lookup(lookup(&[("REALTY_DEFAULT_SAMPLE", "lots")])).is_err());
        assert!(Config::from_lookup(lookup(&[("REALTY_HTTP_TIMEOUT_SECS", "-1")])).is_err());
    }

    #[test]
    fn positional_args_override_sources() {
        let config = Config::from_lookup(lookup(&[])).unwrap();
        let config = config.with_args(["a.csv".to_string(), "b.geojson".to_string()].into_iter());
        assert_eq!(config.sales_path, PathBuf::from("a.csv"));
        assert_eq!(config.geo_source, "b.geojson");

        let only_sales = Config::from_lookup(lookup(&[])).unwrap().with_args(["c.csv".to_string()].into_iter());
        assert_eq!(only_sales.geo_source, DEFAULT_GEO_SOURCE);
    }
}
