//! # Seed Data Generator
//!
//! Populates a database with a demo cosmetics catalog and an admin account.
//!
//! ## Usage
//! ```bash
//! # Default catalog into ./simply_dev.db
//! cargo run -p simply-db --bin seed
//!
//! # Specify database path and admin credentials
//! cargo run -p simply-db --bin seed -- --db ./data/simply.db \
//!     --admin-email dona@simply.com --admin-password segredo123
//! ```
//!
//! ## Generated Products
//! Every line of the catalog in each of its shades/sizes:
//! - Lábios (batons, gloss)
//! - Olhos (máscara, delineador, sombra)
//! - Pele (base, pó, corretivo)
//! - Cuidados (hidratante, sérum, protetor)
//! - Perfumaria (colônias, body splash)
//!
//! Each product has a 13-digit barcode `789{seed:010}`, a price between
//! R$ 19,90 and R$ 88,90, cost at 40-60% of price and stock 0-40.

use std::env;

use simply_core::{NewProduct, Role};
use simply_db::{AuthProvider, Database, DbConfig, ProductStore};

/// (category id, products)
const CATALOG: &[(&str, &[&str])] = &[
    ("labios", &["Batom Matte", "Batom Cremoso", "Gloss Labial", "Lápis de Boca"]),
    ("olhos", &["Máscara de Cílios", "Delineador Líquido", "Paleta de Sombras", "Lápis de Olho"]),
    ("pele", &["Base Líquida", "Pó Compacto", "Corretivo", "Blush", "Iluminador"]),
    ("cuidados", &["Hidratante Facial", "Sérum Vitamina C", "Protetor Solar FPS 50", "Água Micelar"]),
    ("perfumaria", &["Colônia Floral", "Body Splash", "Desodorante Colônia"]),
];

/// Variant name and price addon in cents.
const VARIANTS: &[(&str, i64)] = &[("Nude", 0), ("Rosé", 500), ("Vermelho", 500), ("Marrom", 1000)];

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args: Vec<String> = env::args().collect();

    let mut db_path = String::from("./simply_dev.db");
    let mut admin_email = String::from("admin@simply.com");
    let mut admin_password = String::from("simply123");

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--db" | "-d" => {
                if i + 1 < args.len() {
                    db_path = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-email" => {
                if i + 1 < args.len() {
                    admin_email = args[i + 1].clone();
                    i += 1;
                }
            }
            "--admin-password" => {
                if i + 1 < args.len() {
                    admin_password = args[i + 1].clone();
                    i += 1;
                }
            }
            "--help" | "-h" => {
                println!("Simply POS Seed Data Generator");
                println!();
                println!("Usage: seed [OPTIONS]");
                println!();
                println!("Options:");
                println!("  -d, --db <PATH>              Database file path (default: ./simply_dev.db)");
                println!("      --admin-email <EMAIL>    Admin account (default: admin@simply.com)");
                println!("      --admin-password <PASS>  Admin password (default: simply123)");
                println!("  -h, --help                   Show this help message");
                return Ok(());
            }
            _ => {}
        }
        i += 1;
    }

    println!("🌱 Simply POS Seed Data Generator");
    println!("=================================");
    println!("Database: {}", db_path);
    println!();

    let db = Database::new(DbConfig::new(&db_path)).await?;

    println!("✓ Connected to database");
    println!("✓ Migrations applied");

    let existing = db.products().count_active().await?;
    if existing > 0 {
        println!("⚠ Database already has {} products", existing);
        println!("  Skipping seed to avoid duplicates.");
        println!("  Delete the database file to regenerate.");
        return Ok(());
    }

    println!();
    println!("Generating products...");

    let mut generated = 0;
    let start = std::time::Instant::now();

    for (category_idx, (category, products)) in CATALOG.iter().enumerate() {
        for (product_idx, name) in products.iter().enumerate() {
            for (variant_idx, (variant, price_addon)) in VARIANTS.iter().enumerate() {
                let seed = category_idx * 1000 + product_idx * 20 + variant_idx;
                let product = generate_product(category, name, variant, *price_addon, seed);

                if let Err(e) = db.products().create(&product).await {
                    eprintln!("Failed to insert {}: {}", product.name, e);
                    continue;
                }
                generated += 1;
            }
        }
    }

    println!("✓ Generated {} products in {:?}", generated, start.elapsed());

    match db
        .auth()
        .sign_up(&admin_email, &admin_password, Some("Administrador"), Role::Admin)
        .await
    {
        Ok(user) => println!("✓ Admin account: {}", user.email),
        Err(e) => eprintln!("Failed to create admin {}: {}", admin_email, e),
    }

    let low = db.products().count_low_stock().await?;
    println!("  Low stock: {} products", low);

    println!();
    println!("✓ Seed complete!");

    db.close().await;
    Ok(())
}

/// Generates a single product with plausible data.
fn generate_product(
    category: &str,
    name: &str,
    variant: &str,
    price_addon: i64,
    seed: usize,
) -> NewProduct {
    // Barcode (EAN-13 shape, checksum not computed)
    let barcode = Some(format!("789{:010}", seed));

    // R$ 19,90 - R$ 78,90 plus the variant addon
    let price_cents = 1990 + ((seed * 17) % 60) as i64 * 100 + price_addon;

    // 40-60% of price
    let cost_pct = 40 + (seed % 21) as i64;
    let cost_cents = price_cents * cost_pct / 100;

    let stock_quantity = (seed % 41) as i64;

    NewProduct {
        name: format!("{} {}", name, variant),
        description: None,
        price_cents,
        cost_cents,
        stock_quantity,
        min_stock_level: 5,
        barcode,
        image_url: None,
        category_id: Some(category.to_string()),
        active: Some(true),
    }
}
