#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::{tempdir, TempDir};

use gear_catalog::generate;
use gear_catalog::store::Store;
use gear_catalog::workbook::{Cell, Sheet};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn join(&self, name: &str) -> PathBuf {
        self.temp_dir.path().join(name)
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents.as_bytes())
            .expect("write temp file contents");
        path
    }
}

fn text(value: &str) -> Cell {
    Cell::Text(value.to_string())
}

/// Header labels of the primary sheet, matching the hand-declared column map.
pub fn primary_headers() -> Vec<String> {
    [
        "Tier",
        "Value for Money",
        "TWS",
        "Price",
        "Microphone Test",
        "Review Notes",
        "Bluetooth Codec",
        "Battery Life (No ANC)",
        "ANC Performance (dB)",
        "Transparency Mode",
        "Equalizer",
        "Overall Sound Quality",
        "Bass",
        "Lo Mid",
        "Hi Mid",
        "Treble",
        "Vocal",
        "Soundstage",
        "Separation",
        "Imaging",
        "Timbre",
        "Punch",
        "Clarity & Resolution",
        "Gaming Mode Low Latency",
        "Sound Tuning",
        "IP Rating",
        "Multipoint Connection",
        "Recommended Eartips",
    ]
    .iter()
    .map(|h| h.to_string())
    .collect()
}

fn primary_row(
    tier: &str,
    name: &str,
    price: Cell,
    overall: Cell,
    tuning: &str,
) -> Vec<Cell> {
    vec![
        text(tier),
        text("Good"),
        text(name),
        price,
        text("Clear"),
        text("Solid all-rounder"),
        text("LDAC"),
        text("8h"),
        text("30"),
        text("Natural"),
        text("App EQ"),
        overall,
        Cell::Number(8.5),
        Cell::Number(8.0),
        Cell::Number(8.0),
        Cell::Number(7.5),
        Cell::Number(8.0),
        Cell::Number(7.0),
        Cell::Number(7.5),
        Cell::Number(7.0),
        Cell::Number(8.0),
        Cell::Number(8.0),
        Cell::Number(8.0),
        text("Yes"),
        text(tuning),
        text("IPX4"),
        text("Yes"),
        text("Stock M"),
    ]
}

/// Two-sheet fixture: the primary TWS sheet (with a duplicated product name
/// to exercise slug dedup) and a generic IEM sheet (with an empty primary
/// value to exercise the slug fallback).
pub fn sample_sheets() -> Vec<Sheet> {
    let tws = Sheet {
        name: "TWS".to_string(),
        headers: primary_headers(),
        rows: vec![
            primary_row(
                "S",
                "Alpha Buds",
                Cell::Number(550_000.0),
                Cell::Number(8.8),
                "Warm V-shaped",
            ),
            primary_row(
                "A+",
                "Beta Pods",
                text("Rp 1.250.000"),
                Cell::Number(8.2),
                "Neutral bright",
            ),
            primary_row("B", "Alpha Buds", Cell::Empty, Cell::Empty, "Bassy"),
        ],
    };

    let iem = Sheet {
        name: "IEM".to_string(),
        headers: vec!["IEM".to_string(), "Price".to_string(), "Sound".to_string()],
        rows: vec![
            vec![text("Moon Drop"), text("Rp 50.000"), text("Neutral")],
            vec![Cell::Empty, Cell::Number(150_000.0), text("Bright")],
        ],
    };

    vec![tws, iem]
}

/// In-memory store rebuilt and populated from [`sample_sheets`].
pub fn seeded_store() -> Store {
    let scripts = generate::build_scripts(&sample_sheets());
    let store = Store::open_in_memory().expect("in-memory store");
    store.execute_batch(&scripts.schema).expect("apply schema");
    store.execute_batch(&scripts.seed).expect("apply seed");
    store
}
