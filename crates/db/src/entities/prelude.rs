pub use super::customers::Entity as Customers;
pub use super::movement_items::Entity as MovementItems;
pub use super::movements::Entity as Movements;
pub use super::products::Entity as Products;
pub use super::sale_payments::Entity as SalePayments;
pub use super::suppliers::Entity as Suppliers;
