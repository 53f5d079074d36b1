//! Core business logic for Stockledger.
//!
//! This crate contains pure business logic with ZERO web or database dependencies.
//! All domain types, validation rules, and calculations live here.
//!
//! # Modules
//!
//! - `movement` - Stock movements: families, stock deltas, totals, status workflow

pub mod movement;
