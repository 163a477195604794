//! Generic typed row reader.
//!
//! Builds dynamic projections over a dataset's declared columns. Table and
//! column names come from stored catalog metadata, not caller input, but they
//! still pass through [`ensure_safe_identifier`] before touching query text:
//! a failure there means the catalog is corrupted and the read aborts. Slug
//! lookups bind the slug as a parameter, never by interpolation.

use anyhow::Result;
use itertools::Itertools;

use crate::catalog::DatasetMeta;
use crate::identifier::ensure_safe_identifier;
use crate::store::{Store, StoredRow};

/// A generic dataset row: column key to loosely typed value, plus `slug`
/// when the dataset carries one.
pub type DatasetRow = StoredRow;

fn projection(dataset: &DatasetMeta) -> Result<Option<(String, String)>> {
    if dataset.columns.is_empty() {
        return Ok(None);
    }
    let table = ensure_safe_identifier(&dataset.table_name)?;
    let mut select_columns = Vec::with_capacity(dataset.columns.len() + 1);
    if dataset.has_slug {
        select_columns.push("slug");
    }
    for column in &dataset.columns {
        select_columns.push(ensure_safe_identifier(&column.key)?);
    }
    let select_list = select_columns
        .iter()
        .map(|column| format!("\"{column}\""))
        .join(", ");
    Ok(Some((select_list, format!("\"{table}\""))))
}

/// Fetches every row of the dataset in insertion order. A dataset declaring
/// zero columns yields an empty list without issuing a query.
pub fn list_rows(store: &Store, dataset: &DatasetMeta) -> Result<Vec<DatasetRow>> {
    let Some((select_list, table)) = projection(dataset)? else {
        return Ok(Vec::new());
    };
    let sql = format!("SELECT {select_list} FROM {table} ORDER BY row_order ASC");
    store.query_all(&sql, &[])
}

/// Fetches at most one row by exact slug match.
pub fn row_by_slug(store: &Store, dataset: &DatasetMeta, slug: &str) -> Result<Option<DatasetRow>> {
    let Some((select_list, table)) = projection(dataset)? else {
        return Ok(None);
    };
    let sql = format!("SELECT {select_list} FROM {table} WHERE slug = ?1 LIMIT 1");
    store.query_first(&sql, &[&slug])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DatasetColumn;
    use crate::error::UnsafeIdentifierError;

    fn meta(table: &str, keys: &[&str]) -> DatasetMeta {
        DatasetMeta {
            key: "test".into(),
            label: "Test".into(),
            table_name: table.into(),
            columns: keys
                .iter()
                .map(|key| DatasetColumn {
                    key: (*key).into(),
                    label: key.to_uppercase(),
                })
                .collect(),
            row_count: 0,
            sort_order: 1,
            primary_column: None,
            price_column: None,
            has_slug: true,
        }
    }

    #[test]
    fn zero_columns_short_circuits_without_a_query() {
        let store = Store::open_in_memory().unwrap();
        // No table exists; a real query would fail.
        let rows = list_rows(&store, &meta("missing_table", &[])).unwrap();
        assert!(rows.is_empty());
        let row = row_by_slug(&store, &meta("missing_table", &[]), "x").unwrap();
        assert!(row.is_none());
    }

    #[test]
    fn corrupted_table_name_aborts_the_read() {
        let store = Store::open_in_memory().unwrap();
        let err = list_rows(&store, &meta("t; DROP TABLE x", &["name"])).unwrap_err();
        assert!(err.downcast_ref::<UnsafeIdentifierError>().is_some());
    }

    #[test]
    fn corrupted_column_key_aborts_the_read() {
        let store = Store::open_in_memory().unwrap();
        let err = list_rows(&store, &meta("safe_table", &["name\" --"])).unwrap_err();
        assert!(err.downcast_ref::<UnsafeIdentifierError>().is_some());
    }
}
