use std::collections::BTreeSet;

use super::model::{Frame, Sale, SalesTable};

// ---------------------------------------------------------------------------
// Selection: which attributes and zip codes the overview is restricted to
// ---------------------------------------------------------------------------

/// Attribute and zipcode filters. An empty set means "no filter" (show all).
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Selection {
    /// Column names in the order they were picked, without duplicates.
    pub attributes: Vec<String>,
    pub zipcodes: BTreeSet<String>,
}

impl Selection {
    /// Add or remove an attribute, keeping pick order.
    pub fn toggle_attribute(&mut self, name: &str) {
        if let Some(pos) = self.attributes.iter().position(|a| a == name) {
            self.attributes.remove(pos);
        } else {
            self.attributes.push(name.to_string());
        }
    }

    pub fn toggle_zipcode(&mut self, zipcode: &str) {
        if !self.zipcodes.remove(zipcode) {
            self.zipcodes.insert(zipcode.to_string());
        }
    }

    /// Only `date` is picked: there is nothing numeric to describe.
    pub fn is_date_only(&self) -> bool {
        self.attributes.len() == 1 && self.attributes[0] == "date"
    }
}

/// Sales whose zipcode is in `zipcodes`; every sale when the set is empty.
/// Unknown zip codes simply match nothing.
pub fn select_rows<'a>(sales: &'a [Sale], zipcodes: &BTreeSet<String>) -> Vec<&'a Sale> {
    if zipcodes.is_empty() {
        return sales.iter().collect();
    }
    sales
        .iter()
        .filter(|s| zipcodes.contains(&s.zipcode))
        .collect()
}

/// The filtered overview table.
///
/// Rows are selected on the full-column table first, then the result is
/// projected onto the picked attributes. Both steps are the identity when
/// their filter is empty, so all four filter combinations go through the
/// same path. The returned frame is an independent copy.
pub fn select(table: &SalesTable, selection: &Selection) -> Frame {
    let rows = select_rows(&table.sales, &selection.zipcodes);
    Frame::from_sales(rows).project(&selection.attributes)
}
