/// Data layer: loading, feature derivation and the query functions behind
/// each dashboard view.
///
/// Architecture:
/// ```text
///  .csv / .parquet            .geojson (path or URL)
///        │                          │
///        ▼                          ▼
///   ┌──────────┐              ┌──────────┐
///   │  loader   │ RawSale      │   geo    │ BoundaryCollection
///   └──────────┘              └──────────┘
///        │                          │
///        ▼                          │
///   ┌──────────┐                    │
///   │  derive   │ SalesTable         │
///   └──────────┘                    │
///        │     (both held by cache)  │
///        ▼                          ▼
///   filter + aggregate   density   trends   distribution
/// ```

pub mod aggregate;
pub mod cache;
pub mod density;
pub mod derive;
pub mod distribution;
pub mod error;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod model;
pub mod trends;
