use std::collections::BTreeSet;
use std::fmt;

use chrono::NaiveDate;

/// Square feet to square metres.
pub const SQFT_TO_M2: f64 = 0.092903;

// ---------------------------------------------------------------------------
// Cell – a single value in a displayed column
// ---------------------------------------------------------------------------

/// A dynamically-typed cell mirroring the dtypes of the sales table.
/// Used in `BTreeSet`s downstream, so `Cell` must be `Ord`.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Integer(i64),
    Float(f64),
    Date(NaiveDate),
    Text(String),
}

// -- Manual Eq/Ord so we can put Cell in BTreeSet --

impl Eq for Cell {}

impl PartialOrd for Cell {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Cell {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        use Cell::*;
        fn discriminant(v: &Cell) -> u8 {
            match v {
                Integer(_) => 0,
                Float(_) => 1,
                Date(_) => 2,
                Text(_) => 3,
            }
        }
        let da = discriminant(self);
        let db = discriminant(other);
        if da != db {
            return da.cmp(&db);
        }
        match (self, other) {
            (Integer(a), Integer(b)) => a.cmp(b),
            (Float(a), Float(b)) => a.total_cmp(b),
            (Date(a), Date(b)) => a.cmp(b),
            (Text(a), Text(b)) => a.cmp(b),
            _ => std::cmp::Ordering::Equal,
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Integer(i) => write!(f, "{i}"),
            Cell::Float(v) => write!(f, "{v}"),
            Cell::Date(d) => write!(f, "{}", d.format("%Y-%m-%d")),
            Cell::Text(s) => write!(f, "{s}"),
        }
    }
}

impl Cell {
    /// Numeric view of the cell; `None` for dates and text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Float(v) => Some(*v),
            Cell::Integer(i) => Some(*i as f64),
            _ => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Sale records
// ---------------------------------------------------------------------------

/// One row of the tabular source, before feature derivation.
#[derive(Debug, Clone, PartialEq)]
pub struct RawSale {
    pub id: i64,
    pub date: NaiveDate,
    pub price: f64,
    pub bedrooms: i64,
    pub bathrooms: f64,
    pub sqft_lot: f64,
    pub sqft_living: f64,
    pub floors: f64,
    pub waterfront: bool,
    pub zipcode: String,
    pub lat: f64,
    pub long: f64,
    pub yr_built: i64,
}

/// A sale with its raw area fields replaced by metric-unit fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Sale {
    pub id: i64,
    pub date: NaiveDate,
    pub price: f64,
    pub bedrooms: i64,
    pub bathrooms: f64,
    pub floors: f64,
    pub waterfront: bool,
    pub zipcode: String,
    pub lat: f64,
    pub long: f64,
    pub yr_built: i64,
    pub lot_m2: f64,
    pub living_m2: f64,
    /// Not guarded: a zero lot area gives a non-finite value.
    pub price_m2: f64,
}

/// Kind of a displayed column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Integer,
    Float,
    Date,
    Text,
}

impl ColumnKind {
    pub fn is_numeric(self) -> bool {
        matches!(self, ColumnKind::Integer | ColumnKind::Float)
    }
}

/// Column layout of the derived sales table, in display order.
pub const SALE_COLUMNS: [(&str, ColumnKind); 14] = [
    ("id", ColumnKind::Integer),
    ("date", ColumnKind::Date),
    ("price", ColumnKind::Float),
    ("bedrooms", ColumnKind::Integer),
    ("bathrooms", ColumnKind::Float),
    ("floors", ColumnKind::Float),
    ("waterfront", ColumnKind::Integer),
    ("zipcode", ColumnKind::Text),
    ("lat", ColumnKind::Float),
    ("long", ColumnKind::Float),
    ("yr_built", ColumnKind::Integer),
    ("lot_m2", ColumnKind::Float),
    ("living_m2", ColumnKind::Float),
    ("price_m2", ColumnKind::Float),
];

impl Sale {
    /// One cell per column of [`SALE_COLUMNS`], in the same order.
    fn cells(&self) -> [Cell; SALE_COLUMNS.len()] {
        [
            Cell::Integer(self.id),
            Cell::Date(self.date),
            Cell::Float(self.price),
            Cell::Integer(self.bedrooms),
            Cell::Float(self.bathrooms),
            Cell::Float(self.floors),
            Cell::Integer(i64::from(self.waterfront)),
            Cell::Text(self.zipcode.clone()),
            Cell::Float(self.lat),
            Cell::Float(self.long),
            Cell::Integer(self.yr_built),
            Cell::Float(self.lot_m2),
            Cell::Float(self.living_m2),
            Cell::Float(self.price_m2),
        ]
    }
}

// ---------------------------------------------------------------------------
// SalesTable – the derived dataset
// ---------------------------------------------------------------------------

/// The derived dataset with its pre-computed zipcode index.
#[derive(Debug, Clone)]
pub struct SalesTable {
    /// All sales (rows).
    pub sales: Vec<Sale>,
    /// Sorted distinct zip codes.
    pub zipcodes: Vec<String>,
}

impl SalesTable {
    /// Build the zipcode index from the derived sales.
    pub fn from_sales(sales: Vec<Sale>) -> Self {
        let zipcodes: BTreeSet<String> = sales.iter().map(|s| s.zipcode.clone()).collect();
        SalesTable {
            sales,
            zipcodes: zipcodes.into_iter().collect(),
        }
    }

    /// Column names offered by the attribute filter.
    pub fn column_names(&self) -> Vec<String> {
        SALE_COLUMNS.iter().map(|(name, _)| name.to_string()).collect()
    }

    pub fn len(&self) -> usize {
        self.sales.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sales.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Frame – columnar copy used for display and projection
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub kind: ColumnKind,
    pub values: Vec<Cell>,
}

/// An owned, column-oriented table. Never aliases the source sales.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub columns: Vec<Column>,
}

impl Frame {
    /// Copy the given sales into a frame with every column of [`SALE_COLUMNS`].
    pub fn from_sales<'a>(sales: impl IntoIterator<Item = &'a Sale>) -> Self {
        let mut columns: Vec<Column> = SALE_COLUMNS
            .iter()
            .map(|(name, kind)| Column {
                name: name.to_string(),
                kind: *kind,
                values: Vec::new(),
            })
            .collect();
        for sale in sales {
            for (col, cell) in columns.iter_mut().zip(sale.cells()) {
                col.values.push(cell);
            }
        }
        Frame { columns }
    }

    /// Keep only `names`, in the given order. Unknown names are ignored;
    /// an empty list keeps every column.
    pub fn project(mut self, names: &[String]) -> Self {
        if names.is_empty() {
            return self;
        }
        let mut projected = Vec::with_capacity(names.len());
        for name in names {
            if let Some(pos) = self.columns.iter().position(|c| &c.name == name) {
                projected.push(self.columns.swap_remove(pos));
            }
        }
        Frame { columns: projected }
    }

    /// Only the Integer / Float columns.
    pub fn numeric(&self) -> Frame {
        Frame {
            columns: self
                .columns
                .iter()
                .filter(|c| c.kind.is_numeric())
                .cloned()
                .collect(),
        }
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn num_rows(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn num_columns(&self) -> usize {
        self.columns.len()
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub(crate) fn sale(id: i64, zipcode: &str, price: f64) -> Sale {
        Sale {
            id,
            date: NaiveDate::from_ymd_opt(2014, 5, 2).unwrap() + chrono::Days::new(id as u64),
            price,
            bedrooms: 3,
            bathrooms: 1.5,
            floors: 1.0,
            waterfront: false,
            zipcode: zipcode.to_string(),
            lat: 47.5,
            long: -122.2,
            yr_built: 1950 + id,
            lot_m2: 500.0,
            living_m2: 120.0,
            price_m2: price / 500.0,
        }
    }

    #[test]
    fn frame_keeps_column_order_and_kinds() {
        let sales = vec![sale(1, "98001", 100.0), sale(2, "98002", 200.0)];
        let frame = Frame::from_sales(&sales);
        assert_eq!(frame.num_rows(), 2);
        assert_eq!(frame.num_columns(), SALE_COLUMNS.len());
        assert_eq!(frame.column_names()[7], "zipcode");
        assert_eq!(frame.column("zipcode").unwrap().kind, ColumnKind::Text);
        assert_eq!(
            frame.column("price").unwrap().values,
            vec![Cell::Float(100.0), Cell::Float(200.0)]
        );
    }

    #[test]
    fn project_follows_requested_order_and_skips_unknown() {
        let frame = Frame::from_sales(&[sale(1, "98001", 100.0)]);
        let names = vec!["price".to_string(), "nope".to_string(), "id".to_string()];
        let projected = frame.project(&names);
        assert_eq!(projected.column_names(), vec!["price", "id"]);
    }

    #[test]
    fn numeric_excludes_dates_and_codes() {
        let frame = Frame::from_sales(&[sale(1, "98001", 100.0)]);
        let numeric = frame.numeric();
        assert!(numeric.column("date").is_none());
        assert!(numeric.column("zipcode").is_none());
        assert!(numeric.column("waterfront").is_some());
        assert_eq!(numeric.num_columns(), SALE_COLUMNS.len() - 2);
    }

    #[test]
    fn table_indexes_sorted_distinct_zipcodes() {
        let table = SalesTable::from_sales(vec![
            sale(1, "98103", 1.0),
            sale(2, "98001", 2.0),
            sale(3, "98103", 3.0),
        ]);
        assert_eq!(table.zipcodes, vec!["98001", "98103"]);
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn cells_order_across_kinds() {
        let mut cells = vec![Cell::Text("a".into()), Cell::Float(1.0), Cell::Integer(3)];
        cells.sort();
        assert_eq!(cells[0], Cell::Integer(3));
        assert_eq!(cells[2], Cell::Text("a".into()));
    }

    #[test]
    fn floats_display_without_rounding() {
        assert_eq!(Cell::Float(47.5112).to_string(), "47.5112");
        assert_eq!(Cell::Float(-122.257).to_string(), "-122.257");
        assert_eq!(Cell::Float(2.5).to_string(), "2.5");
    }

    #[test]
    fn every_column_gets_a_typed_cell() {
        let s = sale(4, "98001", 100.0);
        let cells = s.cells();
        for ((name, kind), cell) in SALE_COLUMNS.iter().zip(&cells) {
            let matches = match cell {
                Cell::Integer(_) => *kind == ColumnKind::Integer,
                Cell::Float(_) => *kind == ColumnKind::Float,
                Cell::Date(_) => *kind == ColumnKind::Date,
                Cell::Text(_) => *kind == ColumnKind::Text,
            };
            assert!(matches, "{name} has the wrong cell kind");
        }
        assert_eq!(cells[8], Cell::Float(47.5));
    }
}
