use std::ops::RangeInclusive;

use chrono::NaiveDate;

use super::aggregate::grouped_means;
use super::model::SalesTable;

/// Construction year range covered by the table.
pub fn year_bounds(table: &SalesTable) -> Option<(i64, i64)> {
    let min = table.sales.iter().map(|s| s.yr_built).min()?;
    let max = table.sales.iter().map(|s| s.yr_built).max()?;
    Some((min, max))
}

/// Sale date range covered by the table.
pub fn date_bounds(table: &SalesTable) -> Option<(NaiveDate, NaiveDate)> {
    let min = table.sales.iter().map(|s| s.date).min()?;
    let max = table.sales.iter().map(|s| s.date).max()?;
    Some((min, max))
}

/// Mean price per construction year, for years inside `years`.
pub fn year_built_trend(table: &SalesTable, years: RangeInclusive<i64>) -> Vec<(i64, f64)> {
    grouped_means(
        table
            .sales
            .iter()
            .filter(|s| years.contains(&s.yr_built))
            .map(|s| (s.yr_built, [s.price])),
    )
    .into_iter()
    .map(|(year, [price])| (year, price))
    .collect()
}

/// Mean price per sale date, for dates inside `dates`.
pub fn sale_date_trend(table: &SalesTable, dates: RangeInclusive<NaiveDate>) -> Vec<(NaiveDate, f64)> {
    grouped_means(
        table
            .sales
            .iter()
            .filter(|s| dates.contains(&s.date))
            .map(|s| (s.date, [s.price])),
    )
    .into_iter()
    .map(|(date, [price])| (date, price))
    .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::model::tests::sale;

    fn table() -> SalesTable {
        // sale(id) is built in 1950 + id and sold on 2014-05-02 + id days
        let mut sales = vec![sale(0, "A", 100.0), sale(1, "A", 200.0), sale(2, "B", 300.0)];
        let mut twin = sale(3, "B", 500.0);
        twin.yr_built = 1951;
        twin.date = sales[1].date;
        sales.push(twin);
        SalesTable::from_sales(sales)
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2014, 5, d).unwrap()
    }

    #[test]
    fn bounds_cover_the_table() {
        let table = table();
        assert_eq!(year_bounds(&table), Some((1950, 1952)));
        assert_eq!(date_bounds(&table), Some((day(2), day(4))));
        assert_eq!(year_bounds(&SalesTable::from_sales(vec![])), None);
        assert_eq!(date_bounds(&SalesTable::from_sales(vec![])), None);
    }

    #[test]
    fn averages_price_per_year_with_inclusive_range() {
        let table = table();
        assert_eq!(
            year_built_trend(&table, 1950..=1952),
            vec![(1950, 100.0), (1951, 350.0), (1952, 300.0)]
        );
        assert_eq!(year_built_trend(&table, 1951..=1951), vec![(1951, 350.0)]);
        assert!(year_built_trend(&table, 1800..=1900).is_empty());
    }

    #[test]
    fn averages_price_per_day_with_inclusive_range() {
        let table = table();
        assert_eq!(
            sale_date_trend(&table, day(3)..=day(4)),
            vec![(day(3), 350.0), (day(4), 300.0)]
        );
        assert_eq!(sale_date_trend(&table, day(2)..=day(2)), vec![(day(2), 100.0)]);
    }
}
