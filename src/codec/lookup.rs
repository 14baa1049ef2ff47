//! Projection of reference tables into key→value lookups.

use crate::models::{LookupMap, Table};

/// Project a table into a [`LookupMap`].
///
/// Rows with two or more fields map their first field's value to their
/// second; further fields are dropped. Single-field rows append their value
/// to the ordered value list. Empty rows are skipped. Row order is kept so
/// option lists render in the order the procedure returned them.
pub fn as_key_value(table: &Table) -> LookupMap {
    let mut map = LookupMap::new();

    for row in table {
        let mut values = row.values();
        match (values.next(), values.next()) {
            (Some(key), Some(value)) => map.insert(key.clone(), value.clone()),
            (Some(only), None) => map.push(only.clone()),
            _ => {}
        }
    }

    map
}
