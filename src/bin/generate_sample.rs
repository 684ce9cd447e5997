use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use arrow::array::{Date32Array, Float64Array, Int64Array, StringArray};
use arrow::datatypes::{DataType, Field, Schema};
use arrow::record_batch::RecordBatch;
use chrono::{Days, NaiveDate};
use parquet::arrow::ArrowWriter;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::Serialize;
use serde_json::json;

const ROWS: usize = 2_000;
const GRID_ROWS: usize = 4;
const GRID_COLS: usize = 5;
const CELL_LAT: f64 = 0.1;
const CELL_LONG: f64 = 0.12;
const ORIGIN: (f64, f64) = (47.2, -122.45);

/// One generated sale, serialised with the column names of the King County export.
#[derive(Debug, Serialize)]
struct SaleRow {
    id: i64,
    date: String,
    price: f64,
    bedrooms: i64,
    bathrooms: f64,
    sqft_lot: f64,
    sqft_living: f64,
    floors: f64,
    waterfront: i64,
    zipcode: String,
    lat: f64,
    long: f64,
    yr_built: i64,
    #[serde(skip)]
    sale_date: NaiveDate,
}

fn zip_for(cell: usize) -> String {
    format!("{}", 98001 + cell)
}

/// South-west corner `(lat, long)` of a grid cell.
fn corner(cell: usize) -> (f64, f64) {
    let (row, col) = (cell / GRID_COLS, cell % GRID_COLS);
    (ORIGIN.0 + row as f64 * CELL_LAT, ORIGIN.1 + col as f64 * CELL_LONG)
}

fn generate_rows(rng: &mut StdRng) -> Vec<SaleRow> {
    let first_day = NaiveDate::from_ymd_opt(2014, 5, 2).unwrap_or_default();
    let cells = GRID_ROWS * GRID_COLS;
    let zone_levels: Vec<f64> = (0..cells).map(|_| rng.gen_range(250_000.0..900_000.0)).collect();

    (0..ROWS)
        .map(|i| {
            let cell = rng.gen_range(0..cells);
            let (lat0, long0) = corner(cell);
            let bedrooms = rng.gen_range(1..=6);
            let sqft_living = rng.gen_range(600.0..4_500.0_f64).round();
            // a few lots have no recorded area
            let sqft_lot = if rng.gen_bool(0.002) {
                0.0
            } else {
                rng.gen_range(1_000.0..40_000.0_f64).round()
            };
            let waterfront = rng.gen_bool(0.01);
            let price = (zone_levels[cell] * (sqft_living / 2_000.0) * rng.gen_range(0.7..1.3)
                + if waterfront { 400_000.0 } else { 0.0 })
            .round();
            let sale_date = first_day + Days::new(rng.gen_range(0..390));

            SaleRow {
                id: 1_000_000_000 + i as i64 * 7_919,
                date: sale_date.format("%Y%m%dT000000").to_string(),
                price,
                bedrooms,
                bathrooms: rng.gen_range(2..=12) as f64 * 0.25,
                sqft_lot,
                sqft_living,
                floors: [1.0, 1.5, 2.0, 2.5, 3.0][rng.gen_range(0..5)],
                waterfront: i64::from(waterfront),
                zipcode: zip_for(cell),
                lat: lat0 + rng.gen_range(0.0..CELL_LAT),
                long: long0 + rng.gen_range(0.0..CELL_LONG),
                yr_built: rng.gen_range(1900..=2015),
                sale_date,
            }
        })
        .collect()
}

fn write_csv(path: &Path, rows: &[SaleRow]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path).context("creating CSV")?;
    for row in rows {
        writer.serialize(row).context("writing CSV row")?;
    }
    writer.flush().context("flushing CSV")?;
    Ok(())
}

fn write_parquet(path: &Path, rows: &[SaleRow]) -> Result<()> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default();
    let floats = |f: fn(&SaleRow) -> f64| Float64Array::from(rows.iter().map(f).collect::<Vec<_>>());
    let ints = |f: fn(&SaleRow) -> i64| Int64Array::from(rows.iter().map(f).collect::<Vec<_>>());

    let schema = Arc::new(Schema::new(vec![
        Field::new("id", DataType::Int64, false),
        Field::new("date", DataType::Date32, false),
        Field::new("price", DataType::Float64, false),
        Field::new("bedrooms", DataType::Int64, false),
        Field::new("bathrooms", DataType::Float64, false),
        Field::new("sqft_lot", DataType::Float64, false),
        Field::new("sqft_living", DataType::Float64, false),
        Field::new("floors", DataType::Float64, false),
        Field::new("waterfront", DataType::Int64, false),
        Field::new("zipcode", DataType::Utf8, false),
        Field::new("lat", DataType::Float64, false),
        Field::new("long", DataType::Float64, false),
        Field::new("yr_built", DataType::Int64, false),
    ]));

    let dates = Date32Array::from(
        rows.iter()
            .map(|r| (r.sale_date - epoch).num_days() as i32)
            .collect::<Vec<_>>(),
    );
    let zipcodes = StringArray::from(rows.iter().map(|r| r.zipcode.as_str()).collect::<Vec<_>>());

    let batch = RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(ints(|r| r.id)),
            Arc::new(dates),
            Arc::new(floats(|r| r.price)),
            Arc::new(ints(|r| r.bedrooms)),
            Arc::new(floats(|r| r.bathrooms)),
            Arc::new(floats(|r| r.sqft_lot)),
            Arc::new(floats(|r| r.sqft_living)),
            Arc::new(floats(|r| r.floors)),
            Arc::new(ints(|r| r.waterfront)),
            Arc::new(zipcodes),
            Arc::new(floats(|r| r.lat)),
            Arc::new(floats(|r| r.long)),
            Arc::new(ints(|r| r.yr_built)),
        ],
    )
    .context("building record batch")?;

    let file = std::fs::File::create(path).context("creating Parquet file")?;
    let mut writer = ArrowWriter::try_new(file, schema, None).context("creating Parquet writer")?;
    writer.write(&batch).context("writing record batch")?;
    writer.close().context("closing Parquet writer")?;
    Ok(())
}

/// One square polygon per grid cell, with the zip code in the `ZIP` property.
fn write_geojson(path: &Path) -> Result<()> {
    let features: Vec<_> = (0..GRID_ROWS * GRID_COLS)
        .map(|cell| {
            let (lat, long) = corner(cell);
            json!({
                "type": "Feature",
                "properties": { "ZIP": zip_for(cell) },
                "geometry": {
                    "type": "Polygon",
                    "coordinates": [[
                        [long, lat],
                        [long + CELL_LONG, lat],
                        [long + CELL_LONG, lat + CELL_LAT],
                        [long, lat + CELL_LAT],
                        [long, lat],
                    ]],
                },
            })
        })
        .collect();
    let collection = json!({ "type": "FeatureCollection", "features": features });
    let text = serde_json::to_string_pretty(&collection).context("serialising GeoJSON")?;
    std::fs::write(path, text).context("writing GeoJSON")?;
    Ok(())
}

fn main() -> Result<()> {
    let out_dir = PathBuf::from(std::env::args().nth(1).unwrap_or_else(|| "datasets".to_string()));
    std::fs::create_dir_all(&out_dir)
        .with_context(|| format!("creating {}", out_dir.display()))?;

    let mut rng = StdRng::seed_from_u64(42);
    let rows = generate_rows(&mut rng);

    let csv_path = out_dir.join("kc_house_data.csv");
    let parquet_path = out_dir.join("kc_house_data.parquet");
    let geojson_path = out_dir.join("zip_codes.geojson");
    write_csv(&csv_path, &rows)?;
    write_parquet(&parquet_path, &rows)?;
    write_geojson(&geojson_path)?;

    println!(
        "Wrote {} sales to {} and {}, {} zones to {}",
        rows.len(),
        csv_path.display(),
        parquet_path.display(),
        GRID_ROWS * GRID_COLS,
        geojson_path.display()
    );
    Ok(())
}
