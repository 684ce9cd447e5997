use thiserror::Error;

/// Failure to load one of the data sources. A load either fully succeeds or
/// returns one of these; there are no partial tables.
#[derive(Debug, Error)]
pub enum DataSourceError {
    #[error("reading {path}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("fetching {uri}")]
    Http {
        uri: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("parsing CSV {path}")]
    Csv {
        path: String,
        #[source]
        source: csv::Error,
    },

    #[error("reading Parquet {path}")]
    Parquet {
        path: String,
        #[source]
        source: parquet::errors::ParquetError,
    },

    #[error("decoding column `{column}`")]
    Arrow {
        column: String,
        #[source]
        source: arrow::error::ArrowError,
    },

    #[error("parsing GeoJSON from {origin}")]
    Json {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("{path}: missing required column `{column}`")]
    MissingColumn { path: String, column: &'static str },

    #[error("{path}, row {row}: column `{column}` has malformed value `{value}`")]
    MalformedValue {
        path: String,
        row: usize,
        column: &'static str,
        value: String,
    },

    #[error("{path}, row {row}: malformed date `{value}`")]
    MalformedDate {
        path: String,
        row: usize,
        value: String,
    },

    #[error("unsupported tabular format `.{0}` (expected .csv or .parquet)")]
    UnsupportedFormat(String),
}
