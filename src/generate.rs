//! Schema/seed generation: workbook sheets in, SQL scripts out.
//!
//! Walks every sheet of the source workbook and produces two artifacts: a
//! rebuild script (DROP/CREATE for the catalog table and one table per
//! dataset, plus indexes on the primary dataset) and a populate script
//! (full DELETE then INSERT per table, one catalog row per dataset). The
//! primary sheet gets the hand-declared column map from [`crate::product`];
//! every other sheet derives its columns generically from the header row,
//! all TEXT, with numeric parsing deferred to read time.
//!
//! The whole pass is deterministic: the same workbook always yields
//! byte-for-byte identical scripts. Slug and key deduplication counters are
//! threaded through one invocation, never shared across runs.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use itertools::Itertools;
use log::{debug, info};

use crate::catalog::DatasetColumn;
use crate::cli::GenerateArgs;
use crate::coerce;
use crate::identifier::{to_identifier, to_slug, KeyCounter};
use crate::product::{
    column_is_numeric, MappedColumn, PRIMARY_KEY, PRIMARY_NAME_COLUMN, PRIMARY_PRICE_COLUMN,
    PRIMARY_SHEET, PRIMARY_TABLE, PRODUCT_COLUMN_MAP, PRODUCT_TABLE_COLUMNS,
};
use crate::workbook::{read_workbook, Cell, Sheet};

pub const META_TABLE: &str = "dataset_meta";

/// Header-name hints for picking a generic dataset's identity column, in
/// priority order. These are the workbook's own sheet-name conventions.
const PRIMARY_COLUMN_HINTS: &[&str] = &[
    "tws",
    "iem",
    "headphone_video_review",
    "headphone",
    "dac",
    "speaker",
    "microphone",
    "soundcard",
    "cable",
    "kabel",
    "eartips",
    "dap",
    "headphone_amp",
    "soundbar",
];

/// The two generated artifacts, fully assembled in memory before anything is
/// written so a failed run leaves no partial output behind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scripts {
    pub schema: String,
    pub seed: String,
}

struct DatasetPlan {
    key: String,
    label: String,
    table_name: String,
    columns: Vec<DatasetColumn>,
    row_count: usize,
    sort_order: usize,
    primary_column: Option<String>,
    price_column: Option<String>,
}

pub fn quote_identifier(value: &str) -> String {
    format!("\"{}\"", value.replace('"', "\"\""))
}

fn text_literal(value: &str) -> String {
    let flattened = value.replace("\r\n", " ").replace('\n', " ");
    format!("'{}'", flattened.replace('\'', "''"))
}

/// SQL literal for a workbook cell: empty text and empty cells are NULL,
/// numbers keep the deterministic integral formatting, booleans become 0/1.
pub fn sql_literal(cell: &Cell) -> String {
    match cell {
        Cell::Empty => "NULL".to_string(),
        Cell::Text(s) if s.is_empty() => "NULL".to_string(),
        Cell::Text(s) => text_literal(s),
        Cell::Number(n) if n.is_finite() => coerce::format_number(*n),
        Cell::Number(_) => "NULL".to_string(),
        Cell::Bool(true) => "1".to_string(),
        Cell::Bool(false) => "0".to_string(),
    }
}

fn optional_literal(value: Option<&str>) -> String {
    match value {
        Some(v) => text_literal(v),
        None => "NULL".to_string(),
    }
}

fn table_name_for(sheet: &Sheet) -> String {
    if sheet.name == PRIMARY_SHEET {
        PRIMARY_TABLE.to_string()
    } else {
        to_identifier(&sheet.name)
    }
}

fn pick_primary_column(columns: &[DatasetColumn]) -> Option<String> {
    for hint in PRIMARY_COLUMN_HINTS {
        if let Some(column) = columns.iter().find(|column| column.key == *hint) {
            return Some(column.key.clone());
        }
    }
    columns.first().map(|column| column.key.clone())
}

fn pick_price_column(columns: &[DatasetColumn]) -> Option<String> {
    columns
        .iter()
        .find(|column| column.key.contains("price"))
        .map(|column| column.key.clone())
}

fn meta_table_ddl() -> String {
    format!(
        "CREATE TABLE IF NOT EXISTS {META_TABLE} (\n\
         \x20 key TEXT PRIMARY KEY,\n\
         \x20 label TEXT NOT NULL,\n\
         \x20 table_name TEXT NOT NULL,\n\
         \x20 columns_json TEXT NOT NULL,\n\
         \x20 row_count INTEGER NOT NULL,\n\
         \x20 sort_order INTEGER NOT NULL,\n\
         \x20 primary_column TEXT,\n\
         \x20 price_column TEXT,\n\
         \x20 has_slug INTEGER NOT NULL DEFAULT 0\n\
         );"
    )
}

fn primary_table_ddl() -> String {
    let mut lines = vec![
        "id INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
        "row_order INTEGER NOT NULL".to_string(),
        "slug TEXT".to_string(),
        "name TEXT NOT NULL".to_string(),
        "highlights TEXT".to_string(),
    ];
    for column in PRODUCT_TABLE_COLUMNS {
        if matches!(*column, "slug" | "name" | "highlights") {
            continue;
        }
        let affinity = if column_is_numeric(column) { "REAL" } else { "TEXT" };
        lines.push(format!("{column} {affinity}"));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n);",
        quote_identifier(PRIMARY_TABLE),
        lines.join(",\n  ")
    )
}

fn generic_table_ddl(table_name: &str, columns: &[DatasetColumn]) -> String {
    let mut lines = vec![
        "id INTEGER PRIMARY KEY AUTOINCREMENT".to_string(),
        "row_order INTEGER NOT NULL".to_string(),
        "slug TEXT".to_string(),
    ];
    for column in columns {
        lines.push(format!("{} TEXT", quote_identifier(&column.key)));
    }
    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n  {}\n);",
        quote_identifier(table_name),
        lines.join(",\n  ")
    )
}

fn meta_insert(plan: &DatasetPlan) -> String {
    let columns_json =
        serde_json::to_string(&plan.columns).expect("dataset columns serialize to JSON");
    format!(
        "INSERT OR REPLACE INTO {META_TABLE} (key, label, table_name, columns_json, \
         row_count, sort_order, primary_column, price_column, has_slug) \
         VALUES ({}, {}, {}, {}, {}, {}, {}, {}, 1);",
        text_literal(&plan.key),
        text_literal(&plan.label),
        text_literal(&plan.table_name),
        text_literal(&columns_json),
        plan.row_count,
        plan.sort_order,
        optional_literal(plan.primary_column.as_deref()),
        optional_literal(plan.price_column.as_deref()),
    )
}

fn slug_for(base_value: &str, fallback: String, counter: &mut KeyCounter) -> String {
    let base = to_slug(base_value);
    if base.is_empty() {
        counter.next(&fallback)
    } else {
        counter.next(&base)
    }
}

fn mapped_column(key: &str) -> &'static MappedColumn {
    PRODUCT_COLUMN_MAP
        .iter()
        .find(|column| column.key == key)
        .expect("column map covers the table layout")
}

fn emit_primary(
    sheet: &Sheet,
    sort_order: usize,
    schema: &mut Vec<String>,
    meta_inserts: &mut Vec<String>,
    seed: &mut Vec<String>,
) {
    schema.push(primary_table_ddl());
    schema.push(format!(
        "CREATE INDEX IF NOT EXISTS idx_{PRIMARY_TABLE}_tier ON {} (tier);",
        quote_identifier(PRIMARY_TABLE)
    ));
    schema.push(format!(
        "CREATE INDEX IF NOT EXISTS idx_{PRIMARY_TABLE}_score ON {} (overall_sound_score);",
        quote_identifier(PRIMARY_TABLE)
    ));

    let columns = PRODUCT_COLUMN_MAP
        .iter()
        .map(|column| DatasetColumn {
            key: column.key.to_string(),
            label: column.label.to_string(),
        })
        .collect();
    meta_inserts.push(meta_insert(&DatasetPlan {
        key: PRIMARY_KEY.to_string(),
        label: sheet.name.clone(),
        table_name: PRIMARY_TABLE.to_string(),
        columns,
        row_count: sheet.rows.len(),
        sort_order,
        primary_column: Some(PRIMARY_NAME_COLUMN.to_string()),
        price_column: Some(PRIMARY_PRICE_COLUMN.to_string()),
    }));

    seed.push(format!("DELETE FROM {};", quote_identifier(PRIMARY_TABLE)));

    let insert_columns = PRODUCT_TABLE_COLUMNS
        .iter()
        .map(|column| quote_identifier(column))
        .join(", ");
    let mut slugs = KeyCounter::for_slugs();
    for (row_index, row) in sheet.rows.iter().enumerate() {
        let row_order = row_index + 1;
        let name = coerce::to_text(sheet.cell(row, PRIMARY_SHEET));
        let slug = slug_for(&name, format!("{PRIMARY_KEY}-{row_order}"), &mut slugs);

        let values = PRODUCT_TABLE_COLUMNS
            .iter()
            .map(|column| match *column {
                "slug" => text_literal(&slug),
                "name" => sql_literal(&Cell::Text(name.clone())),
                "highlights" => "NULL".to_string(),
                key => {
                    let mapped = mapped_column(key);
                    let cell = sheet.cell(row, mapped.source);
                    if mapped.numeric {
                        match coerce::to_number(cell) {
                            Some(n) => coerce::format_number(n),
                            None => "NULL".to_string(),
                        }
                    } else {
                        sql_literal(cell)
                    }
                }
            })
            .join(", ");
        seed.push(format!(
            "INSERT OR REPLACE INTO {} (row_order, {insert_columns}) VALUES ({row_order}, {values});",
            quote_identifier(PRIMARY_TABLE)
        ));
    }
}

fn emit_generic(
    sheet: &Sheet,
    sort_order: usize,
    schema: &mut Vec<String>,
    meta_inserts: &mut Vec<String>,
    seed: &mut Vec<String>,
) {
    let table_name = table_name_for(sheet);

    let mut keys = KeyCounter::for_keys();
    let columns: Vec<DatasetColumn> = sheet
        .headers
        .iter()
        .map(|header| DatasetColumn {
            key: keys.next(&to_identifier(header)),
            label: header.clone(),
        })
        .collect();
    let primary_column = pick_primary_column(&columns);
    let price_column = pick_price_column(&columns);
    debug!(
        "Sheet '{}': table {table_name}, {} column(s), primary {:?}, price {:?}",
        sheet.name,
        columns.len(),
        primary_column,
        price_column
    );

    schema.push(generic_table_ddl(&table_name, &columns));
    meta_inserts.push(meta_insert(&DatasetPlan {
        key: table_name.clone(),
        label: sheet.name.clone(),
        table_name: table_name.clone(),
        columns: columns.clone(),
        row_count: sheet.rows.len(),
        sort_order,
        primary_column: primary_column.clone(),
        price_column,
    }));

    seed.push(format!("DELETE FROM {};", quote_identifier(&table_name)));

    let primary_index = primary_column
        .as_ref()
        .and_then(|key| columns.iter().position(|column| &column.key == key));
    let insert_columns = columns
        .iter()
        .map(|column| quote_identifier(&column.key))
        .join(", ");
    let mut slugs = KeyCounter::for_slugs();
    for (row_index, row) in sheet.rows.iter().enumerate() {
        let row_order = row_index + 1;
        let primary_value = primary_index
            .and_then(|idx| row.get(idx))
            .map(coerce::to_text)
            .unwrap_or_default();
        let slug = slug_for(
            &primary_value,
            format!("{table_name}-{row_order}"),
            &mut slugs,
        );

        let values = row.iter().map(sql_literal).join(", ");
        seed.push(format!(
            "INSERT INTO {} (row_order, slug, {insert_columns}) VALUES ({row_order}, {}, {values});",
            quote_identifier(&table_name),
            text_literal(&slug)
        ));
    }
}

/// Transforms the source sheets into the rebuild and populate scripts.
pub fn build_scripts(sheets: &[Sheet]) -> Scripts {
    let mut schema = Vec::new();
    let mut meta_inserts = Vec::new();
    let mut table_seed = Vec::new();

    schema.push(format!("DROP TABLE IF EXISTS {META_TABLE};"));
    for sheet in sheets {
        schema.push(format!(
            "DROP TABLE IF EXISTS {};",
            quote_identifier(&table_name_for(sheet))
        ));
    }
    schema.push(meta_table_ddl());

    for (index, sheet) in sheets.iter().enumerate() {
        let sort_order = index + 1;
        if sheet.name == PRIMARY_SHEET {
            emit_primary(sheet, sort_order, &mut schema, &mut meta_inserts, &mut table_seed);
        } else {
            emit_generic(sheet, sort_order, &mut schema, &mut meta_inserts, &mut table_seed);
        }
    }

    let mut seed = Vec::with_capacity(1 + meta_inserts.len() + table_seed.len());
    seed.push(format!("DELETE FROM {META_TABLE};"));
    seed.extend(meta_inserts);
    seed.extend(table_seed);

    Scripts {
        schema: join_statements(&schema),
        seed: join_statements(&seed),
    }
}

fn join_statements(statements: &[String]) -> String {
    let mut script = statements.join("\n");
    script.push('\n');
    script
}

/// CLI entry: read the workbook, build both scripts, then write them. The
/// scripts are assembled before the first write so an unreadable source
/// emits nothing.
pub fn execute(args: &GenerateArgs) -> Result<()> {
    let sheets = read_workbook(&args.input)
        .with_context(|| format!("Reading workbook {:?}", args.input))?;
    info!(
        "Read {} sheet(s) from '{}'",
        sheets.len(),
        args.input.display()
    );

    let scripts = build_scripts(&sheets);

    for path in [&args.schema, &args.seed] {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)
                    .with_context(|| format!("Creating output directory {parent:?}"))?;
            }
        }
    }
    write_script(&args.schema, &scripts.schema)?;
    write_script(&args.seed, &scripts.seed)?;
    info!(
        "Wrote schema to {:?} and seed to {:?}",
        args.schema, args.seed
    );
    Ok(())
}

fn write_script(path: &Path, contents: &str) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("Writing script {path:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sql_literal_quotes_and_nulls() {
        assert_eq!(sql_literal(&Cell::Empty), "NULL");
        assert_eq!(sql_literal(&Cell::Text("".into())), "NULL");
        assert_eq!(sql_literal(&Cell::Text("it's".into())), "'it''s'");
        assert_eq!(sql_literal(&Cell::Text("a\r\nb".into())), "'a b'");
        assert_eq!(sql_literal(&Cell::Number(550_000.0)), "550000");
        assert_eq!(sql_literal(&Cell::Number(8.5)), "8.5");
        assert_eq!(sql_literal(&Cell::Bool(true)), "1");
    }

    #[test]
    fn quote_identifier_doubles_embedded_quotes() {
        assert_eq!(quote_identifier("iem"), "\"iem\"");
        assert_eq!(quote_identifier("we\"ird"), "\"we\"\"ird\"");
    }

    #[test]
    fn primary_column_prefers_hints_over_first_column() {
        let columns = vec![
            DatasetColumn {
                key: "price".into(),
                label: "Price".into(),
            },
            DatasetColumn {
                key: "iem".into(),
                label: "IEM".into(),
            },
        ];
        assert_eq!(pick_primary_column(&columns), Some("iem".into()));
        assert_eq!(pick_price_column(&columns), Some("price".into()));

        let no_hints = vec![DatasetColumn {
            key: "model".into(),
            label: "Model".into(),
        }];
        assert_eq!(pick_primary_column(&no_hints), Some("model".into()));
        assert_eq!(pick_price_column(&no_hints), None);
        assert_eq!(pick_primary_column(&[]), None);
    }

    #[test]
    fn primary_table_ddl_types_numeric_columns_as_real() {
        let ddl = primary_table_ddl();
        assert!(ddl.contains("price_idr REAL"));
        assert!(ddl.contains("overall_sound_score REAL"));
        assert!(ddl.contains("tier TEXT"));
        assert!(ddl.contains("name TEXT NOT NULL"));
        assert!(ddl.starts_with("CREATE TABLE IF NOT EXISTS \"tws_products\""));
    }
}
