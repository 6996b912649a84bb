//! # Seed Data Generator
//!
//! Populates the database with manufacturers and sample products for
//! development.
//!
//! ## Usage
//! ```bash
//! # Generate 60 products (default)
//! cargo run -p storefront-db --bin seed
//!
//! # Generate custom amount
//! cargo run -p storefront-db --bin seed -- --count 500
//!
//! # Specify database path
//! cargo run -p storefront-db --bin seed -- --db ./data/storefront.db
//! ```
//!
//! ## Generated Products
//! - One product per (garment, manufacturer) pair, round-robin
//! - Cost between $20.00 and $119.99, prices derived by the pricing engine
//! - Every third product sold by color/size variation, the rest plain
//! - Every fourth product on offer

use std::env;

use storefront_core::{
    DecimalInput, Manufacturer, PricingTable, ProductInput, VariationInput,
};
use storefront_db::{Database, DbConfig};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Manufacturers, keyed so that every built-in markup rule is exercised.
const MANUFACTURERS: &[(&str, &str)] = &[
    ("13", "Textil Norte"),
    ("16", "Hilados del Sur"),
    ("17", "Confecciones Centro"),
    ("28", "Tejidos Oeste"),
    ("29", "Modas Este"),
    ("31", "Importados Varios"),
];

const GARMENTS: &[&str] = &[
    "Remera lisa",
    "Remera estampada",
    "Buzo canguro",
    "Campera rompeviento",
    "Pantalon cargo",
    "Jogger frisa",
    "Camisa manga larga",
    "Musculosa",
    "Short deportivo",
    "Chomba pique",
];

const COLORS: &[&str] = &["Negro", "Blanco", "Azul"];
const SIZES: &[&str] = &["S", "M", "L", "XL"];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,storefront=debug,sqlx=warn")),
        )
        .init();

    let args: Vec<String> = env::args().collect();

    let mut count: usize = 60;
    let mut db_path = String::from("./storefront.db");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--count" | "-c" => {
                if i + 1 < args.len() {
                    count = args[i + 1].parse().unwrap_or(60);
                    i += 1;
                }
            }
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Storefront Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -c, --count <N>    Number of products to generate (default: 60)");
                println!("  -d, --db <PATH>    Database file path (default: ./storefront.db)");
                println!("  -h, --help         Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    info!(db = %db_path, count, "Seeding storefront database");

    let db = Database::new(DbConfig::new(&db_path)).await?;

    for (id, name) in MANUFACTURERS {
        if db.manufacturers().get_by_id(id).await?.is_none() {
            db.manufacturers()
                .insert(&Manufacturer {
                    id: id.to_string(),
                    name: name.to_string(),
                })
                .await?;
        }
    }
    info!(count = MANUFACTURERS.len(), "Manufacturers ready");

    let existing = db.products().count().await?;
    if existing > 0 {
        warn!(existing, "Database already has products, skipping to avoid duplicates");
        return Ok(());
    }

    let pricing = PricingTable::builtin();
    let start = std::time::Instant::now();
    let mut generated = 0;

    for seed in 0..count {
        let input = sample_product(seed);
        let label = input.description.clone();

        let draft = match input.into_draft(&pricing) {
            Ok(draft) => draft,
            Err(e) => {
                warn!(product = %label, error = %e, "Skipping product");
                continue;
            }
        };

        if let Err(e) = db.products().create(&draft).await {
            warn!(product = %label, error = %e, "Failed to insert product");
            continue;
        }

        generated += 1;
    }

    info!(generated, elapsed = ?start.elapsed(), "Seed complete");
    Ok(())
}

/// Builds one deterministic sample product.
fn sample_product(seed: usize) -> ProductInput {
    let (manufacturer_id, _) = MANUFACTURERS[seed % MANUFACTURERS.len()];
    let garment = GARMENTS[seed % GARMENTS.len()];

    // $20.00 - $119.99, written the way an admin types it
    let cost_cents = 2000 + (seed * 7919) % 10000;
    let cost = format!("{}.{:02}", cost_cents / 100, cost_cents % 100);

    let variations = if seed % 3 == 0 {
        COLORS
            .iter()
            .flat_map(|color| SIZES.iter().map(move |size| (*color, *size)))
            .enumerate()
            .map(|(k, (color, size))| VariationInput {
                color: color.to_string(),
                size: size.to_string(),
                stock: ((seed + k) % 7) as i64,
            })
            .collect()
    } else {
        Vec::new()
    };

    ProductInput {
        article_code: Some(format!("ART-{:05}", seed)),
        description: format!("{} #{}", garment, seed + 1),
        manufacturer_id: manufacturer_id.to_string(),
        cost: DecimalInput::Text(cost),
        is_on_offer: seed % 4 == 0,
        category: Some(garment.split_whitespace().next().unwrap_or(garment).to_string()),
        image: None,
        stock: Some((seed % 25) as i64),
        variations,
    }
}
