//! Dataset catalog reader.
//!
//! The `dataset_meta` table describes every dataset the importer produced:
//! display label, physical table, ordered column list, and access hints
//! (identity column, price column, slug presence). Reading the catalog never
//! fails because of one bad row — a malformed `columns_json` is logged and
//! replaced with an empty column list so the rest of the catalog stays
//! usable.

use anyhow::Result;
use log::warn;
use serde::{Deserialize, Serialize};

use crate::store::{Store, StoredRow};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetColumn {
    pub key: String,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DatasetMeta {
    pub key: String,
    pub label: String,
    pub table_name: String,
    pub columns: Vec<DatasetColumn>,
    pub row_count: i64,
    pub sort_order: i64,
    pub primary_column: Option<String>,
    pub price_column: Option<String>,
    pub has_slug: bool,
}

/// Decodes a stored column list, tolerating malformed encodings: anything
/// that does not parse as a `[{key,label}]` array becomes an empty list, and
/// entries with an empty key or label are dropped.
pub fn parse_columns(dataset_key: &str, raw: &str) -> Vec<DatasetColumn> {
    match serde_json::from_str::<Vec<DatasetColumn>>(raw) {
        Ok(columns) => columns
            .into_iter()
            .filter(|column| !column.key.is_empty() && !column.label.is_empty())
            .collect(),
        Err(err) => {
            warn!("Ignoring malformed columns_json for dataset '{dataset_key}': {err}");
            Vec::new()
        }
    }
}

fn meta_from_row(row: &StoredRow) -> DatasetMeta {
    let text = |key: &str| row.get(key).map(|f| f.as_text()).unwrap_or_default();
    let integer = |key: &str| {
        row.get(key)
            .and_then(|f| f.as_number())
            .map(|n| n as i64)
            .unwrap_or(0)
    };
    let optional = |key: &str| {
        let value = text(key);
        (!value.is_empty()).then_some(value)
    };

    let dataset_key = text("key");
    let columns = parse_columns(&dataset_key, &text("columns_json"));
    DatasetMeta {
        label: text("label"),
        table_name: text("table_name"),
        columns,
        row_count: integer("row_count"),
        sort_order: integer("sort_order"),
        primary_column: optional("primary_column"),
        price_column: optional("price_column"),
        has_slug: integer("has_slug") != 0,
        key: dataset_key,
    }
}

/// Lists every dataset in display order.
pub fn list_datasets(store: &Store) -> Result<Vec<DatasetMeta>> {
    let rows = store.query_all(
        "SELECT key, label, table_name, columns_json, row_count, sort_order, \
         primary_column, price_column, has_slug \
         FROM dataset_meta ORDER BY sort_order ASC",
        &[],
    )?;
    Ok(rows.iter().map(meta_from_row).collect())
}

/// Looks up one dataset by catalog key.
pub fn find_dataset(store: &Store, key: &str) -> Result<Option<DatasetMeta>> {
    let row = store.query_first(
        "SELECT key, label, table_name, columns_json, row_count, sort_order, \
         primary_column, price_column, has_slug \
         FROM dataset_meta WHERE key = ?1 LIMIT 1",
        &[&key],
    )?;
    Ok(row.as_ref().map(meta_from_row))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_columns_round_trips_valid_encodings() {
        let raw = r#"[{"key":"name","label":"Name"},{"key":"price","label":"Price"}]"#;
        let columns = parse_columns("iem", raw);
        assert_eq!(columns.len(), 2);
        assert_eq!(columns[0].key, "name");
        assert_eq!(columns[1].label, "Price");
    }

    #[test]
    fn parse_columns_substitutes_empty_list_for_garbage() {
        assert!(parse_columns("iem", "not json").is_empty());
        assert!(parse_columns("iem", "{\"key\":\"a\"}").is_empty());
        assert!(parse_columns("iem", "").is_empty());
    }

    #[test]
    fn parse_columns_drops_blank_keys_and_labels() {
        let raw = r#"[{"key":"","label":"Name"},{"key":"ok","label":""},{"key":"kept","label":"Kept"}]"#;
        let columns = parse_columns("iem", raw);
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].key, "kept");
    }
}
