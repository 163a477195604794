//! Typed projection of the primary dataset.
//!
//! The review workbook's main sheet has a shape we know in advance, so it
//! gets a dedicated [`Product`] struct on top of the generic row table. The
//! column map below is the single source of truth for that shape: the
//! generator builds the table and catalog entry from it, and
//! [`Product::from_stored_row`] coerces fetched rows through it.

use anyhow::Result;
use itertools::Itertools;

use crate::store::{Store, StoredRow};

/// Sheet name the primary dataset originates from.
pub const PRIMARY_SHEET: &str = "TWS";
/// Override table name for the primary dataset.
pub const PRIMARY_TABLE: &str = "tws_products";
/// Catalog key of the primary dataset.
pub const PRIMARY_KEY: &str = "tws";
/// Identity column of the primary dataset.
pub const PRIMARY_NAME_COLUMN: &str = "name";
/// Numeric price column of the primary dataset.
pub const PRIMARY_PRICE_COLUMN: &str = "price_idr";

/// One hand-mapped column: internal key, display label, source header in the
/// workbook, and whether the stored column is REAL rather than TEXT.
#[derive(Debug, Clone, Copy)]
pub struct MappedColumn {
    pub key: &'static str,
    pub label: &'static str,
    pub source: &'static str,
    pub numeric: bool,
}

const fn text(key: &'static str, label: &'static str, source: &'static str) -> MappedColumn {
    MappedColumn {
        key,
        label,
        source,
        numeric: false,
    }
}

const fn real(key: &'static str, label: &'static str, source: &'static str) -> MappedColumn {
    MappedColumn {
        key,
        label,
        source,
        numeric: true,
    }
}

/// Fixed column map for the primary sheet, in catalog display order.
pub const PRODUCT_COLUMN_MAP: &[MappedColumn] = &[
    text("tier", "Tier", "Tier"),
    text("price_performance", "Value for Money", "Value for Money"),
    text("name", "TWS", "TWS"),
    real("price_idr", "Price", "Price"),
    text("microphone_performance", "Microphone Test", "Microphone Test"),
    text("review_summary", "Review Notes", "Review Notes"),
    text("bluetooth_codec", "Bluetooth Codec", "Bluetooth Codec"),
    text("battery_life", "Battery Life (No ANC)", "Battery Life (No ANC)"),
    text("anc_level", "ANC Performance (dB)", "ANC Performance (dB)"),
    text("transparency_mode", "Transparency Mode", "Transparency Mode"),
    text("equalizer_type", "Equalizer", "Equalizer"),
    real("overall_sound_score", "Overall Sound Quality", "Overall Sound Quality"),
    real("bass_score", "Bass", "Bass"),
    real("low_mid_score", "Lo Mid", "Lo Mid"),
    real("high_mid_score", "Hi Mid", "Hi Mid"),
    real("treble_score", "Treble", "Treble"),
    real("vocal_score", "Vocal", "Vocal"),
    real("soundstage_score", "Soundstage", "Soundstage"),
    real("separation_score", "Separation", "Separation"),
    real("imaging_score", "Imaging", "Imaging"),
    real("timbre_score", "Timbre", "Timbre"),
    real("punch_score", "Punch", "Punch"),
    real("clarity_score", "Clarity & Resolution", "Clarity & Resolution"),
    text("gaming_mode", "Gaming Mode Low Latency", "Gaming Mode Low Latency"),
    text("sound_tuning", "Sound Tuning", "Sound Tuning"),
    text("ip_rating", "IP Rating", "IP Rating"),
    text("multipoint", "Multipoint Connection", "Multipoint Connection"),
    text("recommended_eartips", "Recommended Eartips", "Recommended Eartips"),
];

/// Physical column order of the primary table (after `id` and `row_order`).
pub const PRODUCT_TABLE_COLUMNS: &[&str] = &[
    "slug",
    "name",
    "highlights",
    "tier",
    "price_performance",
    "price_idr",
    "microphone_performance",
    "review_summary",
    "bluetooth_codec",
    "battery_life",
    "anc_level",
    "transparency_mode",
    "equalizer_type",
    "overall_sound_score",
    "bass_score",
    "low_mid_score",
    "high_mid_score",
    "treble_score",
    "vocal_score",
    "soundstage_score",
    "separation_score",
    "imaging_score",
    "timbre_score",
    "punch_score",
    "clarity_score",
    "gaming_mode",
    "sound_tuning",
    "ip_rating",
    "multipoint",
    "recommended_eartips",
];

/// Whether a primary-table column is stored as REAL.
pub fn column_is_numeric(key: &str) -> bool {
    PRODUCT_COLUMN_MAP
        .iter()
        .any(|column| column.key == key && column.numeric)
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Product {
    pub slug: String,
    pub name: String,
    pub highlights: String,
    pub tier: String,
    pub price_performance: String,
    pub price_idr: Option<f64>,
    pub microphone_performance: String,
    pub review_summary: String,
    pub bluetooth_codec: String,
    pub battery_life: String,
    pub anc_level: String,
    pub transparency_mode: String,
    pub equalizer_type: String,
    pub overall_sound_score: Option<f64>,
    pub bass_score: Option<f64>,
    pub low_mid_score: Option<f64>,
    pub high_mid_score: Option<f64>,
    pub treble_score: Option<f64>,
    pub vocal_score: Option<f64>,
    pub soundstage_score: Option<f64>,
    pub separation_score: Option<f64>,
    pub imaging_score: Option<f64>,
    pub timbre_score: Option<f64>,
    pub punch_score: Option<f64>,
    pub clarity_score: Option<f64>,
    pub gaming_mode: String,
    pub sound_tuning: String,
    pub ip_rating: String,
    pub multipoint: String,
    pub recommended_eartips: String,
}

impl Product {
    /// Maps a fetched row into the typed shape. Numeric fields go through the
    /// coercion layer; absent columns yield the type's zero value.
    pub fn from_stored_row(row: &StoredRow) -> Self {
        let text = |key: &str| row.get(key).map(|f| f.as_text()).unwrap_or_default();
        let number = |key: &str| row.get(key).and_then(|f| f.as_number());
        Self {
            slug: text("slug"),
            name: text("name"),
            highlights: text("highlights"),
            tier: text("tier"),
            price_performance: text("price_performance"),
            price_idr: number("price_idr"),
            microphone_performance: text("microphone_performance"),
            review_summary: text("review_summary"),
            bluetooth_codec: text("bluetooth_codec"),
            battery_life: text("battery_life"),
            anc_level: text("anc_level"),
            transparency_mode: text("transparency_mode"),
            equalizer_type: text("equalizer_type"),
            overall_sound_score: number("overall_sound_score"),
            bass_score: number("bass_score"),
            low_mid_score: number("low_mid_score"),
            high_mid_score: number("high_mid_score"),
            treble_score: number("treble_score"),
            vocal_score: number("vocal_score"),
            soundstage_score: number("soundstage_score"),
            separation_score: number("separation_score"),
            imaging_score: number("imaging_score"),
            timbre_score: number("timbre_score"),
            punch_score: number("punch_score"),
            clarity_score: number("clarity_score"),
            gaming_mode: text("gaming_mode"),
            sound_tuning: text("sound_tuning"),
            ip_rating: text("ip_rating"),
            multipoint: text("multipoint"),
            recommended_eartips: text("recommended_eartips"),
        }
    }

    /// Every text field, for the engine's all-columns substring search.
    pub fn text_fields(&self) -> impl Iterator<Item = &str> {
        [
            self.slug.as_str(),
            self.name.as_str(),
            self.highlights.as_str(),
            self.tier.as_str(),
            self.price_performance.as_str(),
            self.microphone_performance.as_str(),
            self.review_summary.as_str(),
            self.bluetooth_codec.as_str(),
            self.battery_life.as_str(),
            self.anc_level.as_str(),
            self.transparency_mode.as_str(),
            self.equalizer_type.as_str(),
            self.gaming_mode.as_str(),
            self.sound_tuning.as_str(),
            self.ip_rating.as_str(),
            self.multipoint.as_str(),
            self.recommended_eartips.as_str(),
        ]
        .into_iter()
    }
}

fn select_clause() -> String {
    PRODUCT_TABLE_COLUMNS
        .iter()
        .map(|column| format!("\"{column}\""))
        .join(", ")
}

/// Fetches every product in insertion order.
pub fn list_products(store: &Store) -> Result<Vec<Product>> {
    let sql = format!(
        "SELECT {} FROM \"{PRIMARY_TABLE}\" ORDER BY row_order ASC",
        select_clause()
    );
    let rows = store.query_all(&sql, &[])?;
    Ok(rows.iter().map(Product::from_stored_row).collect())
}

/// Fetches a single product by its slug.
pub fn product_by_slug(store: &Store, slug: &str) -> Result<Option<Product>> {
    let sql = format!(
        "SELECT {} FROM \"{PRIMARY_TABLE}\" WHERE slug = ?1 LIMIT 1",
        select_clause()
    );
    let row = store.query_first(&sql, &[&slug])?;
    Ok(row.as_ref().map(Product::from_stored_row))
}
