pub mod browse;
pub mod catalog;
pub mod cli;
pub mod coerce;
pub mod debounce;
pub mod engine;
pub mod error;
pub mod generate;
pub mod identifier;
pub mod product;
pub mod rows;
pub mod store;
pub mod table;
pub mod workbook;

use std::{env, fs, sync::OnceLock};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{info, LevelFilter};

use crate::cli::{Cli, Commands, DatasetsArgs, LoadArgs, ProductsArgs, RowsArgs};
use crate::engine::FilterOptions;
use crate::store::Store;

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging() {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if env::var("RUST_LOG").is_err() {
            builder.filter_module("gear_catalog", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    init_logging();
    let cli = Cli::parse();
    match cli.command {
        Commands::Generate(args) => generate::execute(&args),
        Commands::Load(args) => handle_load(&args),
        Commands::Datasets(args) => handle_datasets(&args),
        Commands::Rows(args) => handle_rows(&args),
        Commands::Products(args) => handle_products(&args),
        Commands::Browse(args) => browse::execute(&args),
    }
}

fn handle_load(args: &LoadArgs) -> Result<()> {
    let schema = fs::read_to_string(&args.schema)
        .with_context(|| format!("Reading schema script {:?}", args.schema))?;
    let seed = fs::read_to_string(&args.seed)
        .with_context(|| format!("Reading seed script {:?}", args.seed))?;

    let store = Store::open(&args.database)?;
    store.execute_batch(&schema).context("Applying schema script")?;
    store.execute_batch(&seed).context("Applying seed script")?;
    info!(
        "Rebuilt '{}' from {:?} and {:?}",
        args.database.display(),
        args.schema,
        args.seed
    );
    Ok(())
}

fn handle_datasets(args: &DatasetsArgs) -> Result<()> {
    let store = Store::open(&args.database)?;
    let datasets = catalog::list_datasets(&store)?;

    let headers: Vec<String> = ["key", "label", "table", "columns", "rows", "primary", "price"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = datasets
        .iter()
        .map(|dataset| {
            vec![
                dataset.key.clone(),
                dataset.label.clone(),
                dataset.table_name.clone(),
                dataset.columns.len().to_string(),
                dataset.row_count.to_string(),
                dataset.primary_column.clone().unwrap_or_default(),
                dataset.price_column.clone().unwrap_or_default(),
            ]
        })
        .collect();
    table::print_table(&headers, &rows);
    info!("{} dataset(s) in catalog", datasets.len());
    Ok(())
}

fn handle_rows(args: &RowsArgs) -> Result<()> {
    let store = Store::open(&args.database)?;
    let Some(dataset) = catalog::find_dataset(&store, &args.dataset)? else {
        bail!("Dataset '{}' not found in catalog", args.dataset);
    };

    let fetched = match &args.slug {
        Some(slug) => match rows::row_by_slug(&store, &dataset, slug)? {
            Some(row) => vec![row],
            None => {
                info!("No row with slug '{slug}' in dataset '{}'", dataset.key);
                return Ok(());
            }
        },
        None => rows::list_rows(&store, &dataset)?,
    };

    let mut headers = Vec::new();
    if dataset.has_slug {
        headers.push("slug".to_string());
    }
    headers.extend(dataset.columns.iter().map(|column| column.label.clone()));

    let limit = if args.limit == 0 { fetched.len() } else { args.limit };
    let rendered: Vec<Vec<String>> = fetched
        .iter()
        .take(limit)
        .map(|row| {
            let mut cells = Vec::with_capacity(headers.len());
            if dataset.has_slug {
                cells.push(row.get("slug").map(|f| f.as_text()).unwrap_or_default());
            }
            for column in &dataset.columns {
                cells.push(row.get(&column.key).map(|f| f.as_text()).unwrap_or_default());
            }
            cells
        })
        .collect();
    table::print_table(&headers, &rendered);
    info!("{} row(s) in dataset '{}'", fetched.len(), dataset.key);
    Ok(())
}

fn handle_products(args: &ProductsArgs) -> Result<()> {
    let store = Store::open(&args.database)?;
    let products = product::list_products(&store)?;

    if args.tiers {
        for tier in engine::available_tiers(&products) {
            println!("{tier}");
        }
        return Ok(());
    }

    let options = FilterOptions::new(
        args.search.clone().unwrap_or_default(),
        args.tier.clone(),
        args.sort,
    );
    let filtered = engine::apply(&products, &options);

    let headers: Vec<String> = ["slug", "name", "tier", "price", "score", "tuning"]
        .iter()
        .map(|h| h.to_string())
        .collect();
    let rows: Vec<Vec<String>> = filtered
        .iter()
        .map(|product| {
            vec![
                product.slug.clone(),
                product.name.clone(),
                product.tier.clone(),
                product
                    .price_idr
                    .map(coerce::format_number)
                    .unwrap_or_default(),
                product
                    .overall_sound_score
                    .map(coerce::format_number)
                    .unwrap_or_default(),
                product.sound_tuning.clone(),
            ]
        })
        .collect();
    table::print_table(&headers, &rows);
    info!("{} of {} product(s) shown", filtered.len(), products.len());
    Ok(())
}
