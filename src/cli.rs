use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::engine::SortKey;

#[derive(Debug, Parser)]
#[command(
    author,
    version,
    about = "Normalize audio-gear review spreadsheets into a SQLite dataset catalog",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate rebuild (DDL) and populate (DML) scripts from a source workbook
    Generate(GenerateArgs),
    /// Apply generated schema and seed scripts to a SQLite database
    Load(LoadArgs),
    /// List the datasets recorded in the catalog
    Datasets(DatasetsArgs),
    /// Print a dataset's rows, or a single row by slug
    Rows(RowsArgs),
    /// Search, filter, and sort the primary product dataset
    Products(ProductsArgs),
    /// Interactively search products with debounced input from stdin
    Browse(BrowseArgs),
}

#[derive(Debug, Args)]
pub struct GenerateArgs {
    /// Source workbook (.xlsx)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// Destination for the rebuild (DROP/CREATE) script
    #[arg(long, default_value = "db/schema.sql")]
    pub schema: PathBuf,
    /// Destination for the populate (DELETE/INSERT) script
    #[arg(long, default_value = "db/seed.sql")]
    pub seed: PathBuf,
}

#[derive(Debug, Args)]
pub struct LoadArgs {
    /// SQLite database file to rebuild
    #[arg(short = 'd', long = "database")]
    pub database: PathBuf,
    /// Rebuild script produced by `generate`
    #[arg(long, default_value = "db/schema.sql")]
    pub schema: PathBuf,
    /// Populate script produced by `generate`
    #[arg(long, default_value = "db/seed.sql")]
    pub seed: PathBuf,
}

#[derive(Debug, Args)]
pub struct DatasetsArgs {
    /// SQLite database file holding the catalog
    #[arg(short = 'd', long = "database")]
    pub database: PathBuf,
}

#[derive(Debug, Args)]
pub struct RowsArgs {
    /// SQLite database file holding the catalog
    #[arg(short = 'd', long = "database")]
    pub database: PathBuf,
    /// Catalog key of the dataset to read
    #[arg(short = 'k', long = "dataset")]
    pub dataset: String,
    /// Print only the row with this slug
    #[arg(long)]
    pub slug: Option<String>,
    /// Limit the number of rows printed (0 = all)
    #[arg(long, default_value_t = 0)]
    pub limit: usize,
}

#[derive(Debug, Args)]
pub struct ProductsArgs {
    /// SQLite database file holding the catalog
    #[arg(short = 'd', long = "database")]
    pub database: PathBuf,
    /// Case-insensitive substring searched across every text column
    #[arg(short = 's', long)]
    pub search: Option<String>,
    /// Tier prefix filter ("A" also matches A+, A-, A++); "all" disables
    #[arg(long, default_value = "all")]
    pub tier: String,
    /// Sort order
    #[arg(long, value_enum, default_value_t = SortKey::Score)]
    pub sort: SortKey,
    /// List the tiers present in the dataset instead of products
    #[arg(long)]
    pub tiers: bool,
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    /// SQLite database file holding the catalog
    #[arg(short = 'd', long = "database")]
    pub database: PathBuf,
    /// Tier prefix filter applied to every evaluation
    #[arg(long, default_value = "all")]
    pub tier: String,
    /// Sort order applied to every evaluation
    #[arg(long, value_enum, default_value_t = SortKey::Score)]
    pub sort: SortKey,
    /// Quiet window in milliseconds before a query is evaluated
    #[arg(long = "debounce-ms", default_value_t = 300)]
    pub debounce_ms: u64,
}
