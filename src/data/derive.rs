use super::model::{RawSale, Sale, SalesTable, SQFT_TO_M2};

/// Replace the raw square-foot areas with metric areas and add `price_m2`.
///
/// Zero lot areas are not filtered: their `price_m2` is non-finite and is
/// carried into every downstream aggregate as-is.
pub fn derive_features(raw: Vec<RawSale>) -> SalesTable {
    let sales = raw.into_iter().map(derive_sale).collect();
    SalesTable::from_sales(sales)
}

fn derive_sale(raw: RawSale) -> Sale {
    let lot_m2 = raw.sqft_lot * SQFT_TO_M2;
    let living_m2 = raw.sqft_living * SQFT_TO_M2;
    Sale {
        id: raw.id,
        date: raw.date,
        price: raw.price,
        bedrooms: raw.bedrooms,
        bathrooms: raw.bathrooms,
        floors: raw.floors,
        waterfront: raw.waterfront,
        zipcode: raw.zipcode,
        lat: raw.lat,
        long: raw.long,
        yr_built: raw.yr_built,
        lot_m2,
        living_m2,
        price_m2: raw.price / lot_m2,
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn raw(id: i64, sqft_lot: f64, price: f64) -> RawSale {
        RawSale {
            id,
            date: NaiveDate::from_ymd_opt(2015, 1, 1).unwrap(),
            price,
            bedrooms: 2,
            bathrooms: 1.0,
            sqft_lot,
            sqft_living: 1180.0,
            floors: 1.0,
            waterfront: false,
            zipcode: "98178".to_string(),
            lat: 47.5,
            long: -122.2,
            yr_built: 1955,
        }
    }

    #[test]
    fn converts_areas_to_square_metres() {
        let lots = [5650.0, 7242.0, 1.0, 1_651_359.0];
        let table = derive_features(
            lots.iter()
                .enumerate()
                .map(|(i, &lot)| raw(i as i64, lot, 221_900.0))
                .collect(),
        );

        for (sale, lot) in table.sales.iter().zip(lots) {
            assert!((sale.lot_m2 - lot * 0.092903).abs() < 1e-9);
            assert!((sale.living_m2 - 1180.0 * 0.092903).abs() < 1e-9);
            assert!((sale.price_m2 - 221_900.0 / sale.lot_m2).abs() < 1e-9);
        }
    }

    #[test]
    fn zero_lot_area_passes_through_as_non_finite() {
        let table = derive_features(vec![raw(1, 0.0, 100.0), raw(2, 0.0, 0.0)]);
        assert_eq!(table.len(), 2);
        assert!(table.sales[0].price_m2.is_infinite());
        assert!(table.sales[1].price_m2.is_nan());
    }

    #[test]
    fn is_pure() {
        let input = vec![raw(1, 5000.0, 300_000.0)];
        let a = derive_features(input.clone());
        let b = derive_features(input);
        assert_eq!(a.sales, b.sales);
        assert_eq!(a.zipcodes, vec!["98178"]);
    }
}
