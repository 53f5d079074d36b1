//! `SeaORM` entity definitions.

#![allow(missing_docs)]

pub mod prelude;

pub mod customers;
pub mod movement_items;
pub mod movements;
pub mod products;
pub mod sale_payments;
pub mod sea_orm_active_enums;
pub mod suppliers;
