//! Repository abstractions for data access.
//!
//! Repositories provide a clean interface for database operations,
//! hiding the `SeaORM` implementation details from the rest of the application.
//! The stock register, aggregate recomputation and rollups are shared
//! building blocks of the movement repository.

pub mod aggregate;
pub mod catalog;
pub mod movement;
pub mod rollup;
pub mod stock;
pub mod summary;

pub use catalog::{CatalogError, CatalogRepository, CreateCounterpartyInput, CreateProductInput};
pub use movement::{
    MovementFilter, MovementRepository, MovementWithItems, PaymentReceipt, RecordPaymentInput,
};
pub use stock::StockRegister;
pub use summary::SummaryRepository;
