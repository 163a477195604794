//! Thin prepared-statement wrapper around the SQLite store.
//!
//! Readers talk to the database exclusively through [`Store`]: prepare a
//! statement, bind values as parameters, fetch all rows or the first one.
//! Identifiers are never bound here; call sites validate them with
//! [`crate::identifier::ensure_safe_identifier`] before they reach query
//! text. Backend errors propagate unchanged to the caller.

use std::collections::BTreeMap;
use std::path::Path;

use anyhow::{Context, Result};
use rusqlite::types::ValueRef;
use rusqlite::Connection;

use crate::coerce;

/// One stored cell, as loosely typed as SQLite itself.
#[derive(Debug, Clone, PartialEq)]
pub enum Field {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Field {
    /// Text view, empty string for NULL.
    pub fn as_text(&self) -> String {
        match self {
            Field::Null => String::new(),
            Field::Integer(i) => i.to_string(),
            Field::Real(n) => coerce::format_number(*n),
            Field::Text(s) => s.clone(),
        }
    }

    /// Numeric view, `None` for NULL or unparseable text.
    pub fn as_number(&self) -> Option<f64> {
        match self {
            Field::Null => None,
            Field::Integer(i) => Some(*i as f64),
            Field::Real(n) => n.is_finite().then_some(*n),
            Field::Text(s) => coerce::parse_number(s),
        }
    }
}

impl From<ValueRef<'_>> for Field {
    fn from(value: ValueRef<'_>) -> Self {
        match value {
            ValueRef::Null => Field::Null,
            ValueRef::Integer(i) => Field::Integer(i),
            ValueRef::Real(n) => Field::Real(n),
            ValueRef::Text(t) => Field::Text(String::from_utf8_lossy(t).into_owned()),
            ValueRef::Blob(b) => Field::Text(String::from_utf8_lossy(b).into_owned()),
        }
    }
}

/// A fetched row keyed by column name.
pub type StoredRow = BTreeMap<String, Field>;

pub struct Store {
    conn: Connection,
}

impl Store {
    pub fn open(path: &Path) -> Result<Self> {
        let conn =
            Connection::open(path).with_context(|| format!("Opening database {path:?}"))?;
        Ok(Self { conn })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().context("Opening in-memory database")?;
        Ok(Self { conn })
    }

    /// Runs a multi-statement script (schema or seed artifact).
    pub fn execute_batch(&self, script: &str) -> Result<()> {
        self.conn
            .execute_batch(script)
            .context("Executing SQL script")
    }

    /// Prepares `sql`, binds `params`, and collects every row.
    pub fn query_all(&self, sql: &str, params: &[&dyn rusqlite::ToSql]) -> Result<Vec<StoredRow>> {
        let mut statement = self
            .conn
            .prepare(sql)
            .with_context(|| format!("Preparing query: {sql}"))?;
        let column_names: Vec<String> = statement
            .column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();

        let mut rows = statement.query(params)?;
        let mut collected = Vec::new();
        while let Some(row) = rows.next()? {
            let mut stored = StoredRow::new();
            for (idx, name) in column_names.iter().enumerate() {
                stored.insert(name.clone(), Field::from(row.get_ref(idx)?));
            }
            collected.push(stored);
        }
        Ok(collected)
    }

    /// Like [`Store::query_all`] but stops at the first row.
    pub fn query_first(
        &self,
        sql: &str,
        params: &[&dyn rusqlite::ToSql],
    ) -> Result<Option<StoredRow>> {
        Ok(self.query_all(sql, params)?.into_iter().next())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_all_captures_dynamic_columns() {
        let store = Store::open_in_memory().unwrap();
        store
            .execute_batch(
                "CREATE TABLE t (a TEXT, b REAL, c INTEGER);
                 INSERT INTO t VALUES ('x', 1.5, NULL);",
            )
            .unwrap();

        let rows = store.query_all("SELECT a, b, c FROM t", &[]).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0]["a"], Field::Text("x".into()));
        assert_eq!(rows[0]["b"], Field::Real(1.5));
        assert_eq!(rows[0]["c"], Field::Null);
    }

    #[test]
    fn query_first_binds_parameters() {
        let store = Store::open_in_memory().unwrap();
        store
            .execute_batch(
                "CREATE TABLE t (slug TEXT);
                 INSERT INTO t VALUES ('alpha'), ('beta');",
            )
            .unwrap();

        let hit = store
            .query_first("SELECT slug FROM t WHERE slug = ?1", &[&"beta"])
            .unwrap();
        assert_eq!(hit.unwrap()["slug"], Field::Text("beta".into()));

        let miss = store
            .query_first("SELECT slug FROM t WHERE slug = ?1", &[&"gamma"])
            .unwrap();
        assert!(miss.is_none());
    }

    #[test]
    fn field_views_coerce_like_the_model() {
        assert_eq!(Field::Real(125_000.0).as_text(), "125000");
        assert_eq!(Field::Text("Rp 50.000".into()).as_number(), Some(50000.0));
        assert_eq!(Field::Null.as_text(), "");
        assert_eq!(Field::Null.as_number(), None);
    }
}
