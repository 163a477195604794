//! Free-text label sanitization for column keys, table names, and slugs.
//!
//! Every identifier that can end up inside dynamically built SQL goes through
//! this module: [`to_identifier`] / [`to_slug`] at generation time, and
//! [`ensure_safe_identifier`] as the mandatory gate at query-construction
//! time. Deduplication is handled by [`KeyCounter`] instances scoped to a
//! single generator run, never by process-wide state.

use std::collections::BTreeMap;
use std::sync::OnceLock;

use regex::Regex;

use crate::error::UnsafeIdentifierError;

/// Fallback token when a label sanitizes down to nothing.
const EMPTY_IDENTIFIER: &str = "column";

fn safe_identifier_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new("^[A-Za-z0-9_]+$").expect("valid identifier pattern"))
}

fn squash(label: &str, separator: char) -> String {
    let mut result = String::with_capacity(label.len());
    let mut pending_separator = false;
    for ch in label.to_lowercase().chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_separator && !result.is_empty() {
                result.push(separator);
            }
            pending_separator = false;
            result.push(ch);
        } else {
            pending_separator = true;
        }
    }
    result
}

/// Normalizes a display label into a safe snake_case identifier.
///
/// Lower-cases, collapses every run of non-alphanumeric characters into a
/// single underscore, and strips leading/trailing underscores. An empty
/// result becomes `column`; a leading digit gains a `c_` prefix so the value
/// is always usable as a column or table name.
pub fn to_identifier(label: &str) -> String {
    let base = squash(label, '_');
    if base.is_empty() {
        return EMPTY_IDENTIFIER.to_string();
    }
    if base.starts_with(|c: char| c.is_ascii_digit()) {
        format!("c_{base}")
    } else {
        base
    }
}

/// Normalizes a display value into a URL-safe slug fragment.
///
/// Same algorithm as [`to_identifier`] but hyphen-separated, with no
/// digit-prefix rule and no fallback token: callers are expected to supply a
/// `{table}-{row}` base when nothing survives.
pub fn to_slug(value: &str) -> String {
    squash(value, '-')
}

/// Gate for identifiers read back from stored metadata before they are
/// interpolated into query text. Values (as opposed to identifiers) must go
/// through parameter binding instead and never hit this path.
pub fn ensure_safe_identifier(value: &str) -> Result<&str, UnsafeIdentifierError> {
    if safe_identifier_pattern().is_match(value) {
        Ok(value)
    } else {
        Err(UnsafeIdentifierError(value.to_string()))
    }
}

/// Per-base occurrence counters for deduplicating slugs and column keys.
///
/// The first occurrence of a base is returned unchanged; the Nth repeat gets
/// suffix `N-1` (`abc`, `abc-1`, `abc-2`, ...). Callers must feed bases in a
/// stable order (sheet then row order) so identical input reproduces
/// identical output.
#[derive(Debug, Default)]
pub struct KeyCounter {
    separator: char,
    counts: BTreeMap<String, usize>,
}

impl KeyCounter {
    /// Counter for row slugs (`base-N` suffixes).
    pub fn for_slugs() -> Self {
        Self {
            separator: '-',
            counts: BTreeMap::new(),
        }
    }

    /// Counter for column keys (`base_N` suffixes).
    pub fn for_keys() -> Self {
        Self {
            separator: '_',
            counts: BTreeMap::new(),
        }
    }

    pub fn next(&mut self, base: &str) -> String {
        let seen = self.counts.entry(base.to_string()).or_insert(0);
        let occurrence = *seen;
        *seen += 1;
        if occurrence == 0 {
            base.to_string()
        } else {
            format!("{base}{}{occurrence}", self.separator)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn to_identifier_collapses_runs_and_trims() {
        assert_eq!(to_identifier("Battery Life (No ANC)"), "battery_life_no_anc");
        assert_eq!(to_identifier("  Clarity & Resolution  "), "clarity_resolution");
        assert_eq!(to_identifier("Price"), "price");
    }

    #[test]
    fn to_identifier_handles_empty_and_digit_leading_labels() {
        assert_eq!(to_identifier("!!!"), "column");
        assert_eq!(to_identifier(""), "column");
        assert_eq!(to_identifier("3.5mm Jack"), "c_3_5mm_jack");
    }

    #[test]
    fn to_identifier_is_idempotent() {
        for label in ["Battery Life (No ANC)", "3.5mm Jack", "&&&", "Tier"] {
            let once = to_identifier(label);
            assert_eq!(to_identifier(&once), once);
        }
    }

    #[test]
    fn to_slug_uses_hyphens_without_digit_prefix() {
        assert_eq!(to_slug("Moondrop Space Travel"), "moondrop-space-travel");
        assert_eq!(to_slug("7Hz Timeless"), "7hz-timeless");
        assert_eq!(to_slug("---"), "");
    }

    #[test]
    fn ensure_safe_identifier_rejects_injection_shapes() {
        assert!(ensure_safe_identifier("tws_products").is_ok());
        assert!(ensure_safe_identifier("overall_sound_score").is_ok());
        assert_eq!(
            ensure_safe_identifier("tws\"; DROP TABLE dataset_meta; --"),
            Err(UnsafeIdentifierError(
                "tws\"; DROP TABLE dataset_meta; --".to_string()
            ))
        );
        assert!(ensure_safe_identifier("").is_err());
        assert!(ensure_safe_identifier("a b").is_err());
    }

    #[test]
    fn key_counter_suffixes_repeats_from_one() {
        let mut slugs = KeyCounter::for_slugs();
        assert_eq!(slugs.next("abc"), "abc");
        assert_eq!(slugs.next("abc"), "abc-1");
        assert_eq!(slugs.next("abc"), "abc-2");
        assert_eq!(slugs.next("xyz"), "xyz");

        let mut keys = KeyCounter::for_keys();
        assert_eq!(keys.next("name"), "name");
        assert_eq!(keys.next("name"), "name_1");
    }
}
