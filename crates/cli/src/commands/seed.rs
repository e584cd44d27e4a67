//! Seed the catalog with demo products.

use rust_decimal::Decimal;

use driftwood_commerce::db::ProductRepository;
use driftwood_commerce::models::NewProduct;

use super::CommandError;

/// Demo catalog: (name, price, promo price, on sale, stock).
const DEMO_PRODUCTS: &[(&str, i64, Option<i64>, bool, i32)] = &[
    ("Walnut Serving Tray", 100, None, false, 5),
    ("Brass Coat Hook", 18, None, false, 40),
    ("Linen Table Runner", 45, Some(36), true, 12),
    ("Stoneware Mug Set", 62, None, false, 20),
    ("Cedar Storage Chest", 240, Some(199), true, 3),
    ("Woven Seagrass Basket", 28, None, false, 25),
];

/// Insert the demo products.
///
/// # Errors
///
/// Returns `CommandError` if the database is unreachable or an insert
/// fails.
pub async fn run() -> Result<(), CommandError> {
    let url = super::database_url()?;
    let pool = driftwood_commerce::db::create_pool(&url).await?;
    let repo = ProductRepository::new(&pool);

    for &(name, price, promo, on_sale, stock) in DEMO_PRODUCTS {
        let product = repo
            .create(&NewProduct {
                name: name.to_string(),
                price: Decimal::from(price),
                promo_price: promo.map(Decimal::from),
                on_sale,
                sellable: true,
                stock,
            })
            .await?;
        tracing::info!(id = %product.id, name = %product.name, stock = product.stock, "seeded");
    }

    tracing::info!("Seeded {} products", DEMO_PRODUCTS.len());
    Ok(())
}
