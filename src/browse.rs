//! Interactive debounced product search.
//!
//! Reads query edits line by line from stdin and coalesces them through a
//! [`Debouncer`]: each line schedules a re-evaluation after the quiet
//! window, and a newer line supersedes the pending one. The evaluation
//! itself is the pure engine function, so repeated runs share no state.

use std::io::{self, BufRead};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

use anyhow::Result;
use log::info;

use crate::cli::BrowseArgs;
use crate::debounce::Debouncer;
use crate::engine::{self, FilterOptions};
use crate::product::{self, Product};
use crate::table;

pub fn execute(args: &BrowseArgs) -> Result<()> {
    let store = crate::store::Store::open(&args.database)?;
    let products = product::list_products(&store)?;
    info!(
        "Loaded {} product(s); one query per line, blank line shows all, EOF exits",
        products.len()
    );

    let (sender, receiver) = mpsc::channel::<String>();
    thread::spawn(move || {
        for line in io::stdin().lock().lines() {
            let Ok(line) = line else { break };
            if sender.send(line).is_err() {
                break;
            }
        }
    });

    render(&products, &options_for(args, ""));

    let mut debouncer: Debouncer<String> = Debouncer::new(Duration::from_millis(args.debounce_ms));
    loop {
        let received = match debouncer.deadline() {
            Some(deadline) => {
                let timeout = deadline.saturating_duration_since(Instant::now());
                match receiver.recv_timeout(timeout) {
                    Ok(line) => Some(line),
                    Err(RecvTimeoutError::Timeout) => None,
                    Err(RecvTimeoutError::Disconnected) => {
                        // Input is gone; evaluate whatever is still pending.
                        if let Some(query) = debouncer.take_due(deadline) {
                            render(&products, &options_for(args, &query));
                        }
                        break;
                    }
                }
            }
            None => match receiver.recv() {
                Ok(line) => Some(line),
                Err(_) => break,
            },
        };

        if let Some(line) = received {
            debouncer.submit(line.trim().to_string(), Instant::now());
        }
        if let Some(query) = debouncer.take_due(Instant::now()) {
            render(&products, &options_for(args, &query));
        }
    }
    Ok(())
}

fn options_for(args: &BrowseArgs, query: &str) -> FilterOptions {
    FilterOptions::new(query, args.tier.clone(), args.sort)
}

fn render(products: &[Product], options: &FilterOptions) {
    let filtered = engine::apply(products, options);
    println!(
        "{} result(s) for query {:?}",
        filtered.len(),
        options.query
    );
    let headers: Vec<String> = ["slug", "name", "tier", "price", "score"]
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
                    .map(crate::coerce::format_number)
                    .unwrap_or_default(),
                product
                    .overall_sound_score
                    .map(crate::coerce::format_number)
                    .unwrap_or_default(),
            ]
        })
        .collect();
    table::print_table(&headers, &rows);
}
