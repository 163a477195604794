//! Best-effort conversion of raw cell values into the model's two semantic
//! types: numbers and text. Tier labels, boolean-ish fields, and everything
//! else categorical stay as text and are interpreted by presentation code.

use crate::workbook::Cell;

/// Parses a raw string as a number the way review spreadsheets write them:
/// thousands separators stripped, stray currency symbols and units dropped.
/// `""` and `"-"` are explicit missing-value markers.
///
/// Prices appear both western-style (`1,234.5`) and Indonesian-style
/// (`Rp 50.000`): commas are always thousands separators, and dots are too
/// when they delimit exact groups of three digits with no comma in sight.
pub fn parse_number(raw: &str) -> Option<f64> {
    if raw.is_empty() || raw == "-" {
        return None;
    }
    let stripped: String = raw
        .replace(',', "")
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if stripped.is_empty() {
        return None;
    }
    let normalized = if dot_grouped(&stripped) {
        stripped.replace('.', "")
    } else {
        stripped
    };
    normalized.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// True for `50.000`, `1.234.567`, `-2.500`; false for `8.5` and `1234.5`.
fn dot_grouped(value: &str) -> bool {
    let digits = value.strip_prefix('-').unwrap_or(value);
    let mut groups = digits.split('.');
    let Some(head) = groups.next() else {
        return false;
    };
    if head.is_empty() || head.len() > 3 || !head.bytes().all(|b| b.is_ascii_digit()) {
        return false;
    }
    let mut saw_group = false;
    for group in groups {
        if group.len() != 3 || !group.bytes().all(|b| b.is_ascii_digit()) {
            return false;
        }
        saw_group = true;
    }
    saw_group
}

/// Numeric view of a workbook cell, `None` when absent or unparseable.
pub fn to_number(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(n) => n.is_finite().then_some(*n),
        Cell::Text(s) => parse_number(s),
        // Strip-then-parse leaves nothing for booleans.
        Cell::Bool(_) => None,
    }
}

/// Text view of a workbook cell; absent values become the empty string.
pub fn to_text(cell: &Cell) -> String {
    match cell {
        Cell::Empty => String::new(),
        Cell::Text(s) => s.clone(),
        Cell::Number(n) => format_number(*n),
        Cell::Bool(b) => b.to_string(),
    }
}

/// Renders a float without a trailing `.0` when it is integral, so seed
/// output and display text stay stable across runs.
pub fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < (i64::MAX as f64) {
        (n as i64).to_string()
    } else {
        n.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_number_strips_separators_and_units() {
        assert_eq!(parse_number("1,234.5"), Some(1234.5));
        assert_eq!(parse_number("Rp 50.000"), Some(50000.0));
        assert_eq!(parse_number("Rp 1.250.000"), Some(1_250_000.0));
        assert_eq!(parse_number("Rp 50,000"), Some(50000.0));
        assert_eq!(parse_number("8.5"), Some(8.5));
        assert_eq!(parse_number("-3"), Some(-3.0));
    }

    #[test]
    fn parse_number_rejects_missing_markers() {
        assert_eq!(parse_number(""), None);
        assert_eq!(parse_number("-"), None);
        assert_eq!(parse_number("N/A"), None);
        assert_eq!(parse_number("TBD"), None);
    }

    #[test]
    fn to_number_passes_finite_floats_through() {
        assert_eq!(to_number(&Cell::Number(42.5)), Some(42.5));
        assert_eq!(to_number(&Cell::Number(f64::NAN)), None);
        assert_eq!(to_number(&Cell::Empty), None);
        assert_eq!(to_number(&Cell::Bool(true)), None);
    }

    #[test]
    fn to_text_renders_integral_floats_without_fraction() {
        assert_eq!(to_text(&Cell::Number(550_000.0)), "550000");
        assert_eq!(to_text(&Cell::Number(8.5)), "8.5");
        assert_eq!(to_text(&Cell::Empty), "");
        assert_eq!(to_text(&Cell::Text("LDAC".into())), "LDAC");
    }
}
