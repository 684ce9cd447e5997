use std::ops::RangeInclusive;

use super::model::{Sale, SalesTable};

/// Attributes with a "max value" selector in the distribution view.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HistAttribute {
    Bedrooms,
    Bathrooms,
    Floors,
}

impl HistAttribute {
    pub const ALL: [HistAttribute; 3] = [
        HistAttribute::Bedrooms,
        HistAttribute::Bathrooms,
        HistAttribute::Floors,
    ];

    pub fn value(self, sale: &Sale) -> f64 {
        match self {
            HistAttribute::Bedrooms => sale.bedrooms as f64,
            HistAttribute::Bathrooms => sale.bathrooms,
            HistAttribute::Floors => sale.floors,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            HistAttribute::Bedrooms => "Bedrooms",
            HistAttribute::Bathrooms => "Bathrooms",
            HistAttribute::Floors => "Floors",
        }
    }

    /// Histogram bin count used when plotting this attribute.
    pub fn bins(self) -> usize {
        match self {
            HistAttribute::Bedrooms => 19,
            HistAttribute::Bathrooms | HistAttribute::Floors => 8,
        }
    }
}

/// Bins for the price histogram.
pub const PRICE_BINS: usize = 50;

/// Whole-unit price range covering every sale.
pub fn price_bounds(table: &SalesTable) -> Option<(f64, f64)> {
    let prices = table.sales.iter().map(|s| s.price).filter(|p| p.is_finite());
    let (lo, hi) = prices.fold(None, |acc: Option<(f64, f64)>, p| match acc {
        None => Some((p, p)),
        Some((lo, hi)) => Some((lo.min(p), hi.max(p))),
    })?;
    Some((lo.floor(), hi.ceil()))
}

/// Sales priced within `range` (inclusive).
pub fn price_subset(table: &SalesTable, range: RangeInclusive<f64>) -> Vec<Sale> {
    table
        .sales
        .iter()
        .filter(|s| range.contains(&s.price))
        .cloned()
        .collect()
}

/// Distinct values of `attribute`, highest first.
pub fn distinct_desc(table: &SalesTable, attribute: HistAttribute) -> Vec<f64> {
    let mut values: Vec<f64> = table.sales.iter().map(|s| attribute.value(s)).collect();
    values.sort_by(|a, b| b.total_cmp(a));
    values.dedup();
    values
}

/// Upper bounds chosen in the histogram filters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttributeFilter {
    pub max_bedrooms: f64,
    pub max_bathrooms: f64,
    pub max_floors: f64,
    pub waterfront_only: bool,
}

impl AttributeFilter {
    /// Every maximum at the table's highest value: nothing filtered out.
    pub fn unbounded(table: &SalesTable) -> Self {
        let top = |attr| distinct_desc(table, attr).first().copied().unwrap_or(0.0);
        AttributeFilter {
            max_bedrooms: top(HistAttribute::Bedrooms),
            max_bathrooms: top(HistAttribute::Bathrooms),
            max_floors: top(HistAttribute::Floors),
            waterfront_only: false,
        }
    }

    pub fn max_for(&self, attribute: HistAttribute) -> f64 {
        match attribute {
            HistAttribute::Bedrooms => self.max_bedrooms,
            HistAttribute::Bathrooms => self.max_bathrooms,
            HistAttribute::Floors => self.max_floors,
        }
    }

    pub fn max_for_mut(&mut self, attribute: HistAttribute) -> &mut f64 {
        match attribute {
            HistAttribute::Bedrooms => &mut self.max_bedrooms,
            HistAttribute::Bathrooms => &mut self.max_bathrooms,
            HistAttribute::Floors => &mut self.max_floors,
        }
    }
}

/// One independent row subset per histogram attribute.
#[derive(Debug, Clone, Default)]
pub struct AttributeSubsets {
    pub bedrooms: Vec<Sale>,
    pub bathrooms: Vec<Sale>,
    pub floors: Vec<Sale>,
}

impl AttributeSubsets {
    pub fn get(&self, attribute: HistAttribute) -> &[Sale] {
        match attribute {
            HistAttribute::Bedrooms => &self.bedrooms,
            HistAttribute::Bathrooms => &self.bathrooms,
            HistAttribute::Floors => &self.floors,
        }
    }
}

/// Restrict to waterfront sales if asked, then cap each attribute on its own.
pub fn attribute_subsets(table: &SalesTable, filter: &AttributeFilter) -> AttributeSubsets {
    let base: Vec<&Sale> = table
        .sales
        .iter()
        .filter(|s| !filter.waterfront_only || s.waterfront)
        .collect();
    let capped = |attr: HistAttribute| -> Vec<Sale> {
        let max = filter.max_for(attr);
        base.iter()
            .filter(|s| attr.value(s) <= max)
            .map(|s| (*s).clone())
            .collect()
    };
    AttributeSubsets {
        bedrooms: capped(HistAttribute::Bedrooms),
        bathrooms: capped(HistAttribute::Bathrooms),
        floors: capped(HistAttribute::Floors),
    }
}

// ---------------------------------------------------------------------------
// Histogram
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

impl Bin {
    pub fn center(&self) -> f64 {
        (self.start + self.end) / 2.0
    }

    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Equal-width bins spanning the finite values. The maximum lands in the
/// last bin; identical values share one zero-width bin.
pub fn histogram(values: impl IntoIterator<Item = f64>, nbins: usize) -> Vec<Bin> {
    let values: Vec<f64> = values.into_iter().filter(|v| v.is_finite()).collect();
    let Some(min) = values.iter().copied().reduce(f64::min) else {
        return Vec::new();
    };
    let max = values.iter().copied().fold(min, f64::max);
    if nbins == 0 {
        return Vec::new();
    }
    if min == max {
        return vec![Bin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }

    let width = (max - min) / nbins as f64;
    let mut bins: Vec<Bin> = (0..nbins)
        .map(|i| Bin {
            start: min + width * i as f64,
            end: if i + 1 == nbins { max } else { min + width * (i + 1) as f64 },
            count: 0,
        })
        .collect();
    for v in values {
        let idx = (((v - min) / width) as usize).min(nbins - 1);
        bins[idx].count += 1;
    }
    bins
}
