//! # Seed Data Generator
//!
//! Populates the database with demo products for development.
//!
//! ## Usage
//! ```bash
//! # Generate 500 products (default)
//! cargo run -p till-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p till-db --bin seed -- --count 2000
//!
//! # Specify database path (otherwise TILL_DB_PATH, then ./till.db)
//! cargo run -p till-db --bin seed -- --db ./data/till.db
//! ```
//!
//! ## Generated Products
//! Product ids run 1..=N, so carts on the command line are easy to write:
//! - Name: `{Product} {Size}`
//! - Price: $1.99 - $9.99 plus a size add-on
//! - Stock: 0 - 100

use std::env;

use till_core::{Money, ProductId};
use till_db::logging::init_tracing;
use till_db::{Database, DbConfig};

/// Product names for realistic test data
const PRODUCTS: &[&str] = &[
    "Coca-Cola",
    "Sprite",
    "Orange Juice",
    "Iced Tea",
    "Sparkling Water",
    "Potato Chips",
    "Pretzels",
    "Chocolate Bar",
    "Gummy Bears",
    "Oat Cookies",
    "Whole Milk",
    "Greek Yogurt",
    "Cheddar Cheese",
    "Butter",
    "Eggs Dozen",
    "White Bread",
    "Spaghetti",
    "Rice",
    "Peanut Butter",
    "Honey",
];

/// Size variants and their price add-on in cents
const SIZES: &[(&str, i64)] = &[
    ("Small", 0),
    ("Medium", 100),
    ("Large", 200),
    ("6-Pack", 300),
    ("12-Pack", 500),
];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 500;
    let mut config = DbConfig::from_env();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(500);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                let path = args
                    .get(i + 1)
                    .ok_or_else(|| format!("{} needs a database path", args[i]))?;
                config.database_path = path.into();
                i += 1;
            }
            "--help" | "-h" => {
                println!("Till Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 500)");
                println!("  -d, --db <PATH>    Database file path (default: $TILL_DB_PATH or ./till.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Till Seed Data Generator");
    println!("===========================");
    println!("Database: {}", config.database_path.display());
    println!("Products: {}", count);
    println!();

    let db = Database::new(config).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid overwriting stock levels.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let (id, name, price, stock) = generate_product(seed)?;

        if let Err(e) = db.products().upsert(id, &name, price, stock).await {
            eprintln!("Failed to insert {} ({}): {}", id, name, e);
            continue;
        }

        generated += 1;

        if generated % 100 == 0 {
            println!("  Generated {} products...", generated);
        }
    }

    let elapsed = start.elapsed();
    println!();
    println!("✓ Generated {} products in {:?}", generated, elapsed);
    println!(
        "  Rate: {:.0} products/second",
        generated as f64 / elapsed.as_secs_f64()
    );

    let sample = db.products().list_active(3).await?;
    println!();
    for product in &sample {
        println!(
            "  #{:<4} {:<28} {:>8}  stock {}",
            product.id.get(),
            product.name,
            product.price().to_string(),
            product.current_stock
        );
    }

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single product with deterministic demo data.
fn generate_product(
    seed: usize,
) -> Result<(ProductId, String, Money, i64), Box<dyn std::error::Error>> {
    let id = ProductId::new(i64::try_from(seed + 1)?)?;

    let name = PRODUCTS[seed % PRODUCTS.len()];
    let (size, price_addon) = SIZES[(seed / PRODUCTS.len()) % SIZES.len()];
    let batch = seed / (PRODUCTS.len() * SIZES.len());
    let full_name = if batch == 0 {
        format!("{} {}", name, size)
    } else {
        format!("{} {} #{}", name, size, batch + 1)
    };

    // Base $1.99-$9.99 + size addon
    let base_price = 199 + ((seed * 17) % 800) as i64;
    let price = Money::from_cents(base_price + price_addon);

    let stock = (seed % 101) as i64;

    Ok((id, full_name, price, stock))
}
