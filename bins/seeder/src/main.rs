//! Database seeder for Stockledger development.
//!
//! Applies migrations, then seeds a small catalog (three products, one
//! customer, one supplier) and one movement per family so every screen and
//! report has data to show.
//!
//! Usage: cargo run --bin seeder

use chrono::Utc;
use rust_decimal_macros::dec;
use sea_orm_migration::MigratorTrait;
use stockledger_core::movement::{CreateMovementInput, Family, LineInput, MovementStatus};
use stockledger_db::migration::Migrator;
use stockledger_db::repositories::{
    CatalogError, CatalogRepository, CreateCounterpartyInput, CreateProductInput,
    MovementRepository, RecordPaymentInput,
};
use stockledger_db::connect_with;
use stockledger_shared::AppConfig;
use stockledger_shared::config::LoggingConfig;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

const PRODUCTS: [(&str, &str, i32, i32); 3] = [
    ("Arabica Beans 1kg", "BEAN-ARA-1KG", 0, 10),
    ("Robusta Beans 1kg", "BEAN-ROB-1KG", 0, 10),
    ("Paper Filters x100", "FLT-100", 40, 15),
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let config = AppConfig::load()?;
    init_tracing(&config.logging);

    let db = connect_with(&config.database).await?;
    info!("Connected to database");

    Migrator::up(&db, None).await?;
    info!("Migrations applied");

    let catalog = CatalogRepository::new(db.clone());
    let Some(products) = seed_products(&catalog).await? else {
        info!("Catalog already seeded, skipping");
        return Ok(());
    };

    let customer = catalog
        .create_customer(CreateCounterpartyInput {
            name: "Corner Cafe".to_string(),
            email: Some("orders@cornercafe.test".to_string()),
            phone: None,
        })
        .await?;
    let supplier = catalog
        .create_supplier(CreateCounterpartyInput {
            name: "Highland Roasters".to_string(),
            email: Some("sales@highland.test".to_string()),
            phone: None,
        })
        .await?;

    let movements = MovementRepository::from_config(db, &config.ledger);
    let today = Utc::now().date_naive();

    let stock_in = movements
        .create_movement(CreateMovementInput {
            family: Family::StockIn,
            reference_no: None,
            status: MovementStatus::Completed,
            transaction_date: today,
            note: Some("Opening delivery".to_string()),
            counterparty_id: Some(supplier.id),
            lines: vec![
                LineInput::new(products[0], 24, dec!(9.50)),
                LineInput::new(products[1], 12, dec!(7.25)),
            ],
        })
        .await?;
    info!(reference = %stock_in.movement.reference_no, "Seeded stock-in");

    let sale = movements
        .create_movement(CreateMovementInput {
            family: Family::Sale,
            reference_no: None,
            status: MovementStatus::Draft,
            transaction_date: today,
            note: None,
            counterparty_id: Some(customer.id),
            lines: vec![
                LineInput::new(products[0], 3, dec!(18.00))
                    .with_tax(dec!(5.40))
                    .with_discount(dec!(2.00)),
                LineInput::new(products[2], 2, dec!(4.50)),
            ],
        })
        .await?;
    movements
        .record_payment(
            sale.movement.id,
            RecordPaymentInput {
                amount: dec!(30.00),
                payment_method: "cash".to_string(),
                reference: None,
                note: Some("Deposit".to_string()),
            },
        )
        .await?;
    info!(
        reference = %sale.movement.reference_no,
        total = %sale.movement.total,
        "Seeded sale with a partial payment"
    );

    let reject = movements
        .create_movement(CreateMovementInput {
            family: Family::Reject,
            reference_no: None,
            status: MovementStatus::Draft,
            transaction_date: today,
            note: Some("Torn bag".to_string()),
            counterparty_id: None,
            lines: vec![LineInput::new(products[1], 1, dec!(7.25))],
        })
        .await?;
    info!(reference = %reject.movement.reference_no, "Seeded reject");

    info!("Seeding complete");
    Ok(())
}

/// Creates the demo products, or returns `None` if they already exist.
async fn seed_products(catalog: &CatalogRepository) -> anyhow::Result<Option<Vec<Uuid>>> {
    let mut ids = Vec::with_capacity(PRODUCTS.len());

    for (name, sku, opening_stock, reorder_level) in PRODUCTS {
        let created = catalog
            .create_product(CreateProductInput {
                name: name.to_string(),
                sku: sku.to_string(),
                opening_stock,
                reorder_level,
            })
            .await;

        match created {
            Ok(product) => {
                info!(sku, stock = product.stock, "Created product");
                ids.push(product.id);
            }
            Err(CatalogError::DuplicateSku(_)) if ids.is_empty() => return Ok(None),
            Err(e) => return Err(e.into()),
        }
    }

    Ok(Some(ids))
}

fn init_tracing(logging: &LoggingConfig) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&logging.filter));

    tracing_subscriber::registry()
        .with(filter)
        .with(logging.json.then(|| fmt::layer().json()))
        .with((!logging.json).then(fmt::layer))
        .init();
}
