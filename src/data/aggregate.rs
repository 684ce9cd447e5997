use std::collections::{BTreeMap, BTreeSet};

use super::filter::{select_rows, Selection};
use super::model::{Frame, SalesTable};

/// Column headers of a descriptive statistics table.
pub const STAT_HEADERS: [&str; 8] = ["count", "mean", "std", "min", "25%", "50%", "75%", "max"];

// ---------------------------------------------------------------------------
// Grouped means
// ---------------------------------------------------------------------------

/// Running sums for the arithmetic mean of several fields.
#[derive(Debug, Clone)]
struct MeanAcc<const N: usize> {
    sums: [f64; N],
    n: usize,
}

impl<const N: usize> MeanAcc<N> {
    fn push(&mut self, values: [f64; N]) {
        for (sum, v) in self.sums.iter_mut().zip(values) {
            *sum += v;
        }
        self.n += 1;
    }

    fn means(&self) -> [f64; N] {
        self.sums.map(|s| s / self.n as f64)
    }
}

/// Mean of `N` fields per key, ascending by key.
pub(crate) fn grouped_means<K: Ord, const N: usize>(
    rows: impl IntoIterator<Item = (K, [f64; N])>,
) -> Vec<(K, [f64; N])> {
    let mut groups: BTreeMap<K, MeanAcc<N>> = BTreeMap::new();
    for (key, values) in rows {
        groups
            .entry(key)
            .or_insert_with(|| MeanAcc {
                sums: [0.0; N],
                n: 0,
            })
            .push(values);
    }
    groups.into_iter().map(|(k, acc)| (k, acc.means())).collect()
}

// ---------------------------------------------------------------------------
// Zipcode summary
// ---------------------------------------------------------------------------

/// One row of the zipcode analysis table. Fields are optional because the
/// two groupings are outer-merged.
#[derive(Debug, Clone, PartialEq)]
pub struct ZoneSummary {
    pub zipcode: String,
    pub count: Option<usize>,
    pub price: Option<f64>,
    pub lot_m2: Option<f64>,
    pub price_m2: Option<f64>,
}

/// Per-zipcode sale count and mean price / lot area / price per m².
///
/// Both groupings are taken over the same rows: the selected zip codes, or
/// the whole table when none are selected.
pub fn zone_summary(table: &SalesTable, zipcodes: &BTreeSet<String>) -> Vec<ZoneSummary> {
    let rows = select_rows(&table.sales, zipcodes);

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for sale in &rows {
        *counts.entry(sale.zipcode.as_str()).or_default() += 1;
    }
    let means: BTreeMap<&str, [f64; 3]> = grouped_means(
        rows.iter()
            .map(|s| (s.zipcode.as_str(), [s.price, s.lot_m2, s.price_m2])),
    )
    .into_iter()
    .collect();

    let keys: BTreeSet<&str> = counts.keys().chain(means.keys()).copied().collect();
    keys.into_iter()
        .map(|zipcode| {
            let m = means.get(zipcode);
            ZoneSummary {
                zipcode: zipcode.to_string(),
                count: counts.get(zipcode).copied(),
                price: m.map(|m| m[0]),
                lot_m2: m.map(|m| m[1]),
                price_m2: m.map(|m| m[2]),
            }
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Descriptive statistics
// ---------------------------------------------------------------------------

/// Descriptive statistics of one numeric column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnStats {
    pub column: String,
    pub count: usize,
    pub mean: f64,
    pub std: f64,
    pub min: f64,
    pub q25: f64,
    pub q50: f64,
    pub q75: f64,
    pub max: f64,
}

impl ColumnStats {
    /// Values in [`STAT_HEADERS`] order.
    pub fn values(&self) -> [f64; 8] {
        [
            self.count as f64,
            self.mean,
            self.std,
            self.min,
            self.q25,
            self.q50,
            self.q75,
            self.max,
        ]
    }

    /// NaN cells are treated as missing and do not count.
    fn of(column: &str, values: impl IntoIterator<Item = f64>) -> Self {
        let mut sorted: Vec<f64> = values.into_iter().filter(|v| !v.is_nan()).collect();
        sorted.sort_by(f64::total_cmp);
        let n = sorted.len();
        if n == 0 {
            return ColumnStats {
                column: column.to_string(),
                count: 0,
                mean: f64::NAN,
                std: f64::NAN,
                min: f64::NAN,
                q25: f64::NAN,
                q50: f64::NAN,
                q75: f64::NAN,
                max: f64::NAN,
            };
        }

        let mean = sorted.iter().sum::<f64>() / n as f64;
        let std = if n < 2 {
            f64::NAN
        } else {
            let ss: f64 = sorted.iter().map(|v| (v - mean).powi(2)).sum();
            (ss / (n - 1) as f64).sqrt()
        };
        ColumnStats {
            column: column.to_string(),
            count: n,
            mean,
            std,
            min: sorted[0],
            q25: quantile(&sorted, 0.25),
            q50: quantile(&sorted, 0.50),
            q75: quantile(&sorted, 0.75),
            max: sorted[n - 1],
        }
    }
}

/// Linear-interpolated quantile of a sorted, non-empty slice.
fn quantile(sorted: &[f64], q: f64) -> f64 {
    let pos = q * (sorted.len() - 1) as f64;
    let lo = pos.floor() as usize;
    let hi = pos.ceil() as usize;
    if lo == hi {
        return sorted[lo];
    }
    sorted[lo] + (sorted[hi] - sorted[lo]) * (pos - lo as f64)
}

/// Transposed descriptive statistics: one row per numeric column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StatsTable {
    pub rows: Vec<ColumnStats>,
}

impl StatsTable {
    pub fn headers(&self) -> [&'static str; 8] {
        STAT_HEADERS
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

/// Statistics over the numeric columns of `view`.
///
/// Picking only `date` gives an empty table rather than an error, as does a
/// view with no numeric columns.
pub fn describe(view: &Frame, selection: &Selection) -> StatsTable {
    if selection.is_date_only() {
        return StatsTable::default();
    }
    let rows = view
        .numeric()
        .columns
        .iter()
        .map(|col| ColumnStats::of(&col.name, col.values.iter().filter_map(|c| c.as_f64())))
        .collect();
    StatsTable { rows }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::filter::select;
    use crate::data::model::tests::sale;

    fn abb() -> SalesTable {
        SalesTable::from_sales(vec![sale(1, "A", 100.0), sale(2, "A", 200.0), sale(3, "B", 300.0)])
    }

    fn zips(codes: &[&str]) -> BTreeSet<String> {
        codes.iter().map(|c| c.to_string()).collect()
    }

    #[test]
    fn summarizes_every_zone_without_filter() {
        let summary = zone_summary(&abb(), &BTreeSet::new());
        assert_eq!(summary.len(), 2);

        assert_eq!(summary[0].zipcode, "A");
        assert_eq!(summary[0].count, Some(2));
        assert_eq!(summary[0].price, Some(150.0));
        assert_eq!(summary[0].lot_m2, Some(500.0));
        assert!((summary[0].price_m2.unwrap() - 0.3).abs() < 1e-12);

        assert_eq!(summary[1].zipcode, "B");
        assert_eq!(summary[1].count, Some(1));
        assert_eq!(summary[1].price, Some(300.0));
    }

    #[test]
    fn filtered_summary_uses_same_rows_for_count_and_means() {
        let summary = zone_summary(&abb(), &zips(&["B", "Z"]));
        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].zipcode, "B");
        assert_eq!(summary[0].count, Some(1));
        assert_eq!(summary[0].price, Some(300.0));
    }

    #[test]
    fn summary_zones_match_input_zones() {
        let table = abb();
        for filter in [zips(&[]), zips(&["A"]), zips(&["A", "B"]), zips(&["Q"])] {
            let expected: BTreeSet<String> = select_rows(&table.sales, &filter)
                .iter()
                .map(|s| s.zipcode.clone())
                .collect();
            let got: BTreeSet<String> = zone_summary(&table, &filter)
                .into_iter()
                .map(|z| z.zipcode)
                .collect();
            assert_eq!(got, expected);
        }
    }

    #[test]
    fn summary_carries_non_finite_means() {
        let mut free_lot = sale(4, "C", 10.0);
        free_lot.lot_m2 = 0.0;
        free_lot.price_m2 = f64::INFINITY;
        let table = SalesTable::from_sales(vec![free_lot, sale(5, "C", 20.0)]);
        let summary = zone_summary(&table, &BTreeSet::new());
        assert_eq!(summary[0].count, Some(2));
        assert_eq!(summary[0].price_m2, Some(f64::INFINITY));
    }

    #[test]
    fn date_only_selection_gives_empty_stats() {
        let table = abb();
        let selection = Selection {
            attributes: vec!["date".to_string()],
            zipcodes: BTreeSet::new(),
        };
        let stats = describe(&select(&table, &selection), &selection);
        assert!(stats.is_empty());
        assert_eq!(
            stats.headers(),
            ["count", "mean", "std", "min", "25%", "50%", "75%", "max"]
        );
    }

    #[test]
    fn describes_numeric_columns_only() {
        let table = abb();
        let selection = Selection::default();
        let stats = describe(&select(&table, &selection), &selection);
        let names: Vec<&str> = stats.rows.iter().map(|r| r.column.as_str()).collect();
        assert!(!names.contains(&"date"));
        assert!(!names.contains(&"zipcode"));
        assert_eq!(names[0], "id");

        let price = stats.rows.iter().find(|r| r.column == "price").unwrap();
        assert_eq!(price.count, 3);
        assert_eq!(price.mean, 200.0);
        assert_eq!(price.std, 100.0);
        assert_eq!(price.min, 100.0);
        assert_eq!(price.q25, 150.0);
        assert_eq!(price.q50, 200.0);
        assert_eq!(price.q75, 250.0);
        assert_eq!(price.max, 300.0);
    }

    #[test]
    fn non_numeric_selection_gives_empty_stats() {
        let table = abb();
        let selection = Selection {
            attributes: vec!["zipcode".to_string(), "date".to_string()],
            zipcodes: BTreeSet::new(),
        };
        assert!(describe(&select(&table, &selection), &selection).is_empty());
    }

    #[test]
    fn empty_view_keeps_one_row_per_numeric_column() {
        let table = abb();
        let selection = Selection {
            attributes: vec!["price".to_string()],
            zipcodes: zips(&["nowhere"]),
        };
        let stats = describe(&select(&table, &selection), &selection);
        assert_eq!(stats.rows.len(), 1);
        assert_eq!(stats.rows[0].count, 0);
        assert!(stats.rows[0].mean.is_nan());
    }

    #[test]
    fn infinite_values_flow_into_stats() {
        let stats = ColumnStats::of("price_m2", [1.0, f64::INFINITY, f64::NAN]);
        assert_eq!(stats.count, 2);
        assert_eq!(stats.max, f64::INFINITY);
        assert!(stats.mean.is_infinite());
        assert_eq!(stats.min, 1.0);

        let single = ColumnStats::of("x", [4.0]);
        assert!(single.std.is_nan());
        assert_eq!(single.q75, 4.0);
    }
}
