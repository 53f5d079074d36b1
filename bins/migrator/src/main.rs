//! Database migration runner for Stockledger.
//!
//! Usage:
//!   migrator up      - Apply the ledger schema
//!   migrator down    - Drop the ledger schema
//!   migrator status  - Show migration status
//!   migrator fresh   - Drop everything and re-apply

use sea_orm_migration::prelude::*;
use stockledger_db::migration::Migrator;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Reads DATABASE_URL and sets up its own tracing
    cli::run_cli(Migrator).await;
}
