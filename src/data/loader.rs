use std::path::Path;

use arrow::array::{Array, ArrayRef, AsArray, Float64Array, Int64Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type, Int64Type};
use arrow::record_batch::RecordBatch;
use chrono::NaiveDate;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde::Deserialize;

use super::error::DataSourceError;
use super::model::RawSale;

/// Columns read from the tabular source. Anything else is ignored.
pub const REQUIRED_COLUMNS: [&str; 13] = [
    "id",
    "date",
    "price",
    "bedrooms",
    "bathrooms",
    "sqft_lot",
    "sqft_living",
    "floors",
    "waterfront",
    "zipcode",
    "lat",
    "long",
    "yr_built",
];

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load raw sale records from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row naming (at least) the [`REQUIRED_COLUMNS`]
/// * `.parquet` – same column names; any Arrow type castable to the target
pub fn load_sales(path: &Path) -> Result<Vec<RawSale>, DataSourceError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let sales = match ext.as_str() {
        "csv" => load_csv(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataSourceError::UnsupportedFormat(other.to_string())),
    };
    log::info!("Loaded {} sale records from {}", sales.len(), path.display());
    Ok(sales)
}

/// Parse the date forms found in sales exports: `2014-10-13`,
/// `20141013`, `20141013T000000` and full ISO datetimes. Anything else
/// after the day is rejected.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    let (day, rest, format) = if s.as_bytes().get(4) == Some(&b'-') {
        (s.get(..10)?, s.get(10..)?, "%Y-%m-%d")
    } else {
        (s.get(..8)?, s.get(8..)?, "%Y%m%d")
    };
    // only a time part may follow the day
    if !rest.is_empty() && !rest.starts_with(|c: char| c == 'T' || c == ' ') {
        return None;
    }
    NaiveDate::parse_from_str(day, format).ok()
}

/// Zone codes are compared as text. Numeric codes lose any `.0` suffix so
/// that `98103`, `98103.0` and `"98103"` all name the same zone.
pub fn normalize_zone_code(raw: &str) -> String {
    let raw = raw.trim();
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => format!("{}", v as i64),
        _ => raw.to_string(),
    }
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct CsvRow {
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
}

fn load_csv(path: &Path) -> Result<Vec<RawSale>, DataSourceError> {
    let display = path.display().to_string();
    let csv_err = |source| DataSourceError::Csv {
        path: display.clone(),
        source,
    };

    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::Headers)
        .from_path(path)
        .map_err(csv_err)?;
    let headers = reader.headers().map_err(csv_err)?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(DataSourceError::MissingColumn {
                path: display.clone(),
                column,
            });
        }
    }

    let mut sales = Vec::new();
    for (row_no, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row = result.map_err(csv_err)?;
        let date = parse_date(&row.date).ok_or_else(|| DataSourceError::MalformedDate {
            path: display.clone(),
            row: row_no,
            value: row.date.clone(),
        })?;
        sales.push(RawSale {
            id: row.id,
            date,
            price: row.price,
            bedrooms: row.bedrooms,
            bathrooms: row.bathrooms,
            sqft_lot: row.sqft_lot,
            sqft_living: row.sqft_living,
            floors: row.floors,
            waterfront: row.waterfront != 0,
            zipcode: normalize_zone_code(&row.zipcode),
            lat: row.lat,
            long: row.long,
            yr_built: row.yr_built,
        });
    }
    Ok(sales)
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// Load sale records from a Parquet file.
///
/// Works with files written by both **Pandas** (`df.to_parquet()`) and
/// **Polars** (`df.write_parquet()`): every required column is cast to its
/// target type, so `Int32` ids, `Float64` bedrooms, integer zip codes and
/// `Date32`/timestamp dates are all accepted.
fn load_parquet(path: &Path) -> Result<Vec<RawSale>, DataSourceError> {
    let display = path.display().to_string();
    let parquet_err = |source| DataSourceError::Parquet {
        path: display.clone(),
        source,
    };

    let file = std::fs::File::open(path).map_err(|source| DataSourceError::Io {
        path: display.clone(),
        source,
    })?;
    let reader = ParquetRecordBatchReaderBuilder::try_new(file)
        .map_err(parquet_err)?
        .build()
        .map_err(parquet_err)?;

    let mut sales = Vec::new();
    for batch_result in reader {
        let batch = batch_result.map_err(|source| DataSourceError::Arrow {
            column: "<batch>".to_string(),
            source,
        })?;
        let first_row = sales.len();
        let cols = BatchColumns::new(&batch, &display)?;

        for row in 0..batch.num_rows() {
            let at = Cursor {
                path: &display,
                row,
                row_no: first_row + row,
            };
            let date_text = at.text(&cols.date, "date")?;
            let date = parse_date(&date_text).ok_or_else(|| DataSourceError::MalformedDate {
                path: display.clone(),
                row: at.row_no,
                value: date_text.clone(),
            })?;

            sales.push(RawSale {
                id: at.int(&cols.id, "id")?,
                date,
                price: at.float(&cols.price, "price")?,
                bedrooms: at.int(&cols.bedrooms, "bedrooms")?,
                bathrooms: at.float(&cols.bathrooms, "bathrooms")?,
                sqft_lot: at.float(&cols.sqft_lot, "sqft_lot")?,
                sqft_living: at.float(&cols.sqft_living, "sqft_living")?,
                floors: at.float(&cols.floors, "floors")?,
                waterfront: at.int(&cols.waterfront, "waterfront")? != 0,
                zipcode: normalize_zone_code(&at.text(&cols.zipcode, "zipcode")?),
                lat: at.float(&cols.lat, "lat")?,
                long: at.float(&cols.long, "long")?,
                yr_built: at.int(&cols.yr_built, "yr_built")?,
            });
        }
    }
    Ok(sales)
}

// -- Parquet / Arrow helpers --

/// The required columns of one record batch, already cast.
struct BatchColumns {
    id: Int64Array,
    date: StringArray,
    price: Float64Array,
    bedrooms: Int64Array,
    bathrooms: Float64Array,
    sqft_lot: Float64Array,
    sqft_living: Float64Array,
    floors: Float64Array,
    waterfront: Int64Array,
    zipcode: StringArray,
    lat: Float64Array,
    long: Float64Array,
    yr_built: Int64Array,
}

impl BatchColumns {
    fn new(batch: &RecordBatch, path: &str) -> Result<Self, DataSourceError> {
        let ints = |name: &'static str| -> Result<Int64Array, DataSourceError> {
            let arr = cast_column(batch, name, &DataType::Int64, path)?;
            Ok(arr.as_primitive::<Int64Type>().clone())
        };
        let floats = |name: &'static str| -> Result<Float64Array, DataSourceError> {
            let arr = cast_column(batch, name, &DataType::Float64, path)?;
            Ok(arr.as_primitive::<Float64Type>().clone())
        };
        let texts = |name: &'static str| -> Result<StringArray, DataSourceError> {
            let arr = cast_column(batch, name, &DataType::Utf8, path)?;
            Ok(arr.as_string::<i32>().clone())
        };

        Ok(BatchColumns {
            id: ints("id")?,
            date: texts("date")?,
            price: floats("price")?,
            bedrooms: ints("bedrooms")?,
            bathrooms: floats("bathrooms")?,
            sqft_lot: floats("sqft_lot")?,
            sqft_living: floats("sqft_living")?,
            floors: floats("floors")?,
            waterfront: ints("waterfront")?,
            zipcode: texts("zipcode")?,
            lat: floats("lat")?,
            long: floats("long")?,
            yr_built: ints("yr_built")?,
        })
    }
}

fn cast_column(
    batch: &RecordBatch,
    name: &'static str,
    to: &DataType,
    path: &str,
) -> Result<ArrayRef, DataSourceError> {
    let col = batch
        .column_by_name(name)
        .ok_or_else(|| DataSourceError::MissingColumn {
            path: path.to_string(),
            column: name,
        })?;
    cast(col, to).map_err(|source| DataSourceError::Arrow {
        column: name.to_string(),
        source,
    })
}

/// Position of the value being read, for error messages.
struct Cursor<'a> {
    path: &'a str,
    row: usize,
    row_no: usize,
}

impl Cursor<'_> {
    fn null_error(&self, column: &'static str) -> DataSourceError {
        DataSourceError::MalformedValue {
            path: self.path.to_string(),
            row: self.row_no,
            column,
            value: "null".to_string(),
        }
    }

    fn int(&self, arr: &Int64Array, column: &'static str) -> Result<i64, DataSourceError> {
        if arr.is_null(self.row) {
            return Err(self.null_error(column));
        }
        Ok(arr.value(self.row))
    }

    fn float(&self, arr: &Float64Array, column: &'static str) -> Result<f64, DataSourceError> {
        if arr.is_null(self.row) {
            return Err(self.null_error(column));
        }
        Ok(arr.value(self.row))
    }

    fn text(&self, arr: &StringArray, column: &'static str) -> Result<String, DataSourceError> {
        if arr.is_null(self.row) {
            return Err(self.null_error(column));
        }
        Ok(arr.value(self.row).to_string())
    }
}
