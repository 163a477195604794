//! Source workbook loading.
//!
//! Wraps calamine so the generator only ever sees [`Sheet`] values: a sheet
//! name, the first row as headers, and data rows padded to the header width.
//! Blank rows are skipped. Any read or parse failure is a
//! [`SourceReadError`]; the caller emits nothing in that case.

use std::path::Path;

use anyhow::Result;
use calamine::{open_workbook_auto, Data, Reader};

use crate::error::SourceReadError;

/// A single spreadsheet cell, reduced to the shapes the pipeline cares about.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
}

impl Cell {
    pub fn is_empty(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.is_empty(),
            _ => false,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Sheet {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
}

impl Sheet {
    /// Position of a header by exact label, first occurrence wins.
    pub fn header_index(&self, label: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == label)
    }

    /// Cell under the given header label, or [`Cell::Empty`] when the header
    /// or the cell is absent.
    pub fn cell<'a>(&self, row: &'a [Cell], label: &str) -> &'a Cell {
        self.header_index(label)
            .and_then(|idx| row.get(idx))
            .unwrap_or(&Cell::Empty)
    }
}

fn convert(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Number(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(e.to_string()),
    }
}

/// Reads every sheet of the workbook in workbook order.
pub fn read_workbook(path: &Path) -> Result<Vec<Sheet>, SourceReadError> {
    let mut workbook = open_workbook_auto(path)
        .map_err(|err| SourceReadError::new(path, err.to_string()))?;
    let names = workbook.sheet_names().to_owned();

    let mut sheets = Vec::with_capacity(names.len());
    for name in names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|err| SourceReadError::new(path, format!("sheet {name:?}: {err}")))?;
        sheets.push(sheet_from_rows(&name, range.rows()));
    }
    Ok(sheets)
}

fn sheet_from_rows<'a>(name: &str, mut rows: impl Iterator<Item = &'a [Data]>) -> Sheet {
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .map(|cell| match convert(cell) {
                Cell::Text(s) => s,
                Cell::Empty => String::new(),
                Cell::Number(n) => crate::coerce::format_number(n),
                Cell::Bool(b) => b.to_string(),
            })
            .collect(),
        None => Vec::new(),
    };

    let width = headers.len();
    let data_rows = rows
        .map(|row| {
            let mut cells: Vec<Cell> = row.iter().take(width).map(convert).collect();
            cells.resize(width, Cell::Empty);
            cells
        })
        .filter(|cells| cells.iter().any(|cell| !cell.is_empty()))
        .collect();

    Sheet {
        name: name.to_string(),
        headers,
        rows: data_rows,
    }
}
