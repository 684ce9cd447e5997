use std::collections::BTreeSet;

use rand::Rng;

use super::aggregate::grouped_means;
use super::geo::BoundaryCollection;
use super::model::{Sale, SalesTable};

/// Smallest sample the map slider allows.
pub const MIN_SAMPLE: usize = 100;

/// Average sale price of one zone within the sample.
#[derive(Debug, Clone, PartialEq)]
pub struct ZonePrice {
    pub zone_code: String,
    pub avg_price: f64,
}

/// Everything the region maps need, detached from the source table.
#[derive(Debug, Clone, Default)]
pub struct DensityView {
    pub sample: Vec<Sale>,
    /// Ascending by zone code.
    pub zone_prices: Vec<ZonePrice>,
    /// Only the zones present in `zone_prices`.
    pub boundaries: BoundaryCollection,
    /// Mean `(lat, long)` of the whole table.
    pub center: Option<(f64, f64)>,
}

impl DensityView {
    /// Lowest and highest zone average, for the choropleth legend.
    pub fn price_range(&self) -> Option<(f64, f64)> {
        self.zone_prices.iter().map(|z| z.avg_price).fold(None, |acc, p| match acc {
            None => Some((p, p)),
            Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
        })
    }
}

/// Keep a requested sample size within `[MIN_SAMPLE, rows]`.
/// Tables smaller than [`MIN_SAMPLE`] are used whole.
pub fn clamp_sample_size(requested: usize, rows: usize) -> usize {
    requested.max(MIN_SAMPLE).min(rows)
}

/// Draw a uniform sample without replacement, average its prices per zone
/// and keep the boundaries of the sampled zones only.
pub fn sample_and_summarize<R: Rng + ?Sized>(
    table: &SalesTable,
    boundaries: &BoundaryCollection,
    sample_size: usize,
    rng: &mut R,
) -> DensityView {
    let amount = clamp_sample_size(sample_size, table.len());
    let sample: Vec<Sale> = rand::seq::index::sample(rng, table.len(), amount)
        .into_iter()
        .map(|i| table.sales[i].clone())
        .collect();

    let zone_prices: Vec<ZonePrice> =
        grouped_means(sample.iter().map(|s| (s.zipcode.as_str(), [s.price])))
            .into_iter()
            .map(|(zone, [avg_price])| ZonePrice {
                zone_code: zone.to_string(),
                avg_price,
            })
            .collect();

    let sampled: BTreeSet<&str> = zone_prices.iter().map(|z| z.zone_code.as_str()).collect();
    let boundaries = boundaries.restricted_to(&sampled);
    log::debug!(
        "Sampled {} of {} sales across {} zones ({} with boundaries)",
        sample.len(),
        table.len(),
        zone_prices.len(),
        boundaries.len()
    );

    DensityView {
        sample,
        zone_prices,
        boundaries,
        center: center_of(&table.sales),
    }
}

fn center_of(sales: &[Sale]) -> Option<(f64, f64)> {
    if sales.is_empty() {
        return None;
    }
    let n = sales.len() as f64;
    let lat = sales.iter().map(|s| s.lat).sum::<f64>() / n;
    let long = sales.iter().map(|s| s.long).sum::<f64>() / n;
    Some((lat, long))
}
