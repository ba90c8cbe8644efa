//! # Checkout Runner
//!
//! Runs one checkout against a database file.
//!
//! ## Usage
//! ```bash
//! # Two of product 101, one of product 202
//! cargo run -p till-db --bin checkout -- 101:2 202:1
//!
//! # Print the recorded sale as JSON instead of the total
//! cargo run -p till-db --bin checkout -- --json 101:2 202:1
//!
//! # Specify database path (otherwise TILL_DB_PATH, then ./till.db)
//! cargo run -p till-db --bin checkout -- --db ./data/till.db 7:3
//! ```
//!
//! ## Exit Codes
//! - `0` - Sale recorded
//! - `1` - Checkout rejected or database error
//! - `2` - Bad command line

use std::env;
use std::path::PathBuf;
use std::process::ExitCode;

use till_core::{Cart, CheckoutEngine, ProductId};
use till_db::logging::init_tracing;
use till_db::{Database, DbConfig};

#[tokio::main]
async fn main() -> ExitCode {
    init_tracing();

    let args: Vec<String> = env::args().skip(1).collect();

    let options = match parse_args(&args) {
        Ok(options) => options,
        Err(reason) => {
            eprintln!("✗ {}", reason);
            eprintln!("  Run with --help for usage.");
            return ExitCode::from(2);
        }
    };

    if options.help {
        print_help();
        return ExitCode::SUCCESS;
    }

    if options.cart.is_empty() {
        eprintln!("✗ No items given. Pass items as ID:QTY, e.g. 101:2");
        return ExitCode::from(2);
    }

    let mut config = DbConfig::from_env();
    if let Some(path) = options.database_path {
        config.database_path = path;
    }
    let json = options.json;
    let cart = options.cart;

    let db = match Database::new(config).await {
        Ok(db) => db,
        Err(e) => {
            eprintln!("✗ Could not open database: {}", e);
            return ExitCode::FAILURE;
        }
    };

    let engine = CheckoutEngine::new(db.checkout_store());
    let outcome = engine.checkout_sale(&cart).await;
    db.close().await;

    match outcome {
        Ok(sale) => {
            if json {
                match serde_json::to_string_pretty(&sale) {
                    Ok(body) => println!("{}", body),
                    Err(e) => {
                        eprintln!("✗ Could not serialise sale: {}", e);
                        return ExitCode::FAILURE;
                    }
                }
            } else {
                for line in &sale.lines {
                    println!(
                        "  #{:<6} {:>4} × {:>10} = {:>10}",
                        line.product_id.get(),
                        line.quantity,
                        line.unit_price().to_string(),
                        line.line_total().to_string()
                    );
                }
                println!("  Total: {}", sale.total());
                println!("✓ Sale {} recorded", sale.id);
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("✗ Checkout rejected ({:?}): {}", e.kind(), e);
            ExitCode::FAILURE
        }
    }
}

fn print_help() {
    println!("Till Checkout Runner");
    println!();
    println!("Usage: checkout [OPTIONS] ID:QTY [ID:QTY ...]");
    println!();
    println!("Options:");
    println!("  -d, --db <PATH>    Database file path (default: $TILL_DB_PATH or ./till.db)");
    println!("  -j, --json         Print the recorded sale as JSON");
    println!("  -h, --help         Show this help message");
}

/// Parsed command line.
#[derive(Debug, Default)]
struct Options {
    database_path: Option<PathBuf>,
    json: bool,
    help: bool,
    cart: Cart,
}

fn parse_args(args: &[String]) -> Result<Options, String> {
    let mut options = Options::default();

    let mut args = args.iter();
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--db" | "-d" => {
                let path = args
                    .next()
                    .ok_or_else(|| format!("{} needs a database path", arg))?;
                options.database_path = Some(path.into());
            }
            "--json" | "-j" => options.json = true,
            "--help" | "-h" => options.help = true,
            item => {
                let (product_id, quantity) = parse_line_item(item)?;
                options.cart.add(product_id, quantity);
            }
        }
    }

    Ok(options)
}

/// Parses `ID:QTY`.
///
/// Quantity is not range-checked here: zero or negative quantities reach
/// the engine, which rejects the whole cart.
fn parse_line_item(raw: &str) -> Result<(ProductId, i64), String> {
    let (id, qty) = raw
        .split_once(':')
        .ok_or_else(|| format!("'{}' is not ID:QTY", raw))?;

    let id: i64 = id
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a product id", id))?;
    let product_id = ProductId::new(id).map_err(|e| format!("{}: {}", raw, e))?;

    let quantity: i64 = qty
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a quantity", qty))?;

    Ok((product_id, quantity))
}
