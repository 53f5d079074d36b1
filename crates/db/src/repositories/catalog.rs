//! Catalog repository: products, customers and suppliers.
//!
//! Products are created with an opening stock; after that their stock only
//! moves through the movement engine.

use chrono::Utc;
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, DbErr, EntityTrait, JoinType,
    PaginatorTrait, QueryFilter, QueryOrder, QuerySelect, RelationTrait, Set, TransactionTrait,
};
use stockledger_core::movement::{ProductActivity, SummaryService};
use stockledger_shared::AppError;
use uuid::Uuid;

use crate::entities::{
    customers, movement_items, movements, products, sea_orm_active_enums::MovementFamily,
    suppliers,
};

/// Error types for catalog operations.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// Product not found or deleted.
    #[error("Product not found: {0}")]
    ProductNotFound(Uuid),

    /// Customer not found or deleted.
    #[error("Customer not found: {0}")]
    CustomerNotFound(Uuid),

    /// Supplier not found or deleted.
    #[error("Supplier not found: {0}")]
    SupplierNotFound(Uuid),

    /// Product still referenced by live line items.
    #[error("Product {product_id} is used by {items} live line items")]
    ProductInUse {
        /// The product that was to be deleted.
        product_id: Uuid,
        /// Live items on live movements that reference it.
        items: u64,
    },

    /// SKU already used by a live product.
    #[error("SKU '{0}' already exists")]
    DuplicateSku(String),

    /// Opening stock or reorder level below zero.
    #[error("{0} cannot be negative")]
    NegativeQuantity(&'static str),

    /// Database error.
    #[error("Database error: {0}")]
    Database(#[from] DbErr),
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        let message = err.to_string();
        match err {
            CatalogError::ProductNotFound(_)
            | CatalogError::CustomerNotFound(_)
            | CatalogError::SupplierNotFound(_) => Self::NotFound(message),
            CatalogError::DuplicateSku(_) | CatalogError::ProductInUse { .. } => {
                Self::Conflict(message)
            }
            CatalogError::NegativeQuantity(_) => Self::Validation(message),
            CatalogError::Database(_) => Self::Database(message),
        }
    }
}

/// Input for creating a product.
#[derive(Debug, Clone)]
pub struct CreateProductInput {
    /// Display name, copied onto line items.
    pub name: String,
    /// Stock keeping unit, unique among live products.
    pub sku: String,
    /// Stock on hand at creation.
    pub opening_stock: i32,
    /// Low-stock threshold.
    pub reorder_level: i32,
}

/// Input for creating a customer or supplier.
#[derive(Debug, Clone)]
pub struct CreateCounterpartyInput {
    /// Name.
    pub name: String,
    /// Email.
    pub email: Option<String>,
    /// Phone.
    pub phone: Option<String>,
}

/// Catalog repository.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    db: DatabaseConnection,
}

impl CatalogRepository {
    /// Creates a new catalog repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Creates a product.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Opening stock or reorder level is negative
    /// - The SKU is used by a live product
    /// - Database operation fails
    pub async fn create_product(
        &self,
        input: CreateProductInput,
    ) -> Result<products::Model, CatalogError> {
        if input.opening_stock < 0 {
            return Err(CatalogError::NegativeQuantity("opening_stock"));
        }
        if input.reorder_level < 0 {
            return Err(CatalogError::NegativeQuantity("reorder_level"));
        }

        let existing = products::Entity::find()
            .filter(products::Column::Sku.eq(&input.sku))
            .filter(products::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?;
        if existing.is_some() {
            return Err(CatalogError::DuplicateSku(input.sku));
        }

        let now = Utc::now().into();
        let product = products::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            sku: Set(input.sku),
            stock: Set(input.opening_stock),
            reorder_level: Set(input.reorder_level),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(product.insert(&self.db).await?)
    }

    /// Gets a live product.
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if missing or deleted.
    pub async fn get_product(&self, id: Uuid) -> Result<products::Model, CatalogError> {
        products::Entity::find_by_id(id)
            .filter(products::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))
    }

    /// Soft-deletes a product that no live line item references.
    ///
    /// The product row is locked first, so a concurrent movement either
    /// commits its item before the count or finds the product gone.
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if missing or already deleted, and
    /// `ProductInUse` while a live movement still holds a live item for it.
    pub async fn delete_product(&self, id: Uuid) -> Result<(), CatalogError> {
        let txn = self.db.begin().await?;

        let product = products::Entity::find_by_id(id)
            .filter(products::Column::DeletedAt.is_null())
            .lock_exclusive()
            .one(&txn)
            .await?
            .ok_or(CatalogError::ProductNotFound(id))?;

        let items = movement_items::Entity::find()
            .join(JoinType::InnerJoin, movement_items::Relation::Movements.def())
            .filter(movement_items::Column::ProductId.eq(id))
            .filter(movement_items::Column::DeletedAt.is_null())
            .filter(movements::Column::DeletedAt.is_null())
            .count(&txn)
            .await?;
        if items > 0 {
            return Err(CatalogError::ProductInUse {
                product_id: id,
                items,
            });
        }

        let now = Utc::now().into();
        let mut active: products::ActiveModel = product.into();
        active.deleted_at = Set(Some(now));
        active.updated_at = Set(now);
        active.update(&txn).await?;

        txn.commit().await?;
        Ok(())
    }

    /// Lists live products at or below their reorder level, lowest stock
    /// first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn low_stock(&self) -> Result<Vec<products::Model>, CatalogError> {
        let products = products::Entity::find()
            .filter(products::Column::DeletedAt.is_null())
            .filter(
                Expr::col(products::Column::Stock).lte(Expr::col(products::Column::ReorderLevel)),
            )
            .order_by_asc(products::Column::Stock)
            .order_by_asc(products::Column::Name)
            .all(&self.db)
            .await?;

        Ok(products)
    }

    /// Sums surviving quantities moved per family for a product.
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if the product never existed.
    pub async fn product_activity(&self, product_id: Uuid) -> Result<ProductActivity, CatalogError> {
        let exists = products::Entity::find_by_id(product_id)
            .one(&self.db)
            .await?
            .is_some();
        if !exists {
            return Err(CatalogError::ProductNotFound(product_id));
        }

        let rows: Vec<(MovementFamily, Option<i64>)> = movement_items::Entity::find()
            .select_only()
            .column(movements::Column::Family)
            .column_as(movement_items::Column::Quantity.sum(), "quantity")
            .join(JoinType::InnerJoin, movement_items::Relation::Movements.def())
            .filter(movement_items::Column::ProductId.eq(product_id))
            .filter(movement_items::Column::DeletedAt.is_null())
            .filter(movements::Column::DeletedAt.is_null())
            .group_by(movements::Column::Family)
            .into_tuple()
            .all(&self.db)
            .await?;

        Ok(SummaryService::product_activity(
            product_id,
            rows.into_iter()
                .map(|(family, quantity)| (family.into(), quantity.unwrap_or(0))),
        ))
    }

    /// Creates a customer.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_customer(
        &self,
        input: CreateCounterpartyInput,
    ) -> Result<customers::Model, CatalogError> {
        let now = Utc::now().into();
        let customer = customers::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            total_orders: Set(0),
            total_spent: Set(rust_decimal::Decimal::ZERO),
            last_order_at: Set(None),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(customer.insert(&self.db).await?)
    }

    /// Gets a live customer.
    ///
    /// # Errors
    ///
    /// Returns `CustomerNotFound` if missing or deleted.
    pub async fn get_customer(&self, id: Uuid) -> Result<customers::Model, CatalogError> {
        customers::Entity::find_by_id(id)
            .filter(customers::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(CatalogError::CustomerNotFound(id))
    }

    /// Creates a supplier.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub async fn create_supplier(
        &self,
        input: CreateCounterpartyInput,
    ) -> Result<suppliers::Model, CatalogError> {
        let now = Utc::now().into();
        let supplier = suppliers::ActiveModel {
            id: Set(Uuid::new_v4()),
            name: Set(input.name),
            email: Set(input.email),
            phone: Set(input.phone),
            total_purchases: Set(0),
            total_spent: Set(rust_decimal::Decimal::ZERO),
            last_order_at: Set(None),
            deleted_at: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        };

        Ok(supplier.insert(&self.db).await?)
    }

    /// Gets a live supplier.
    ///
    /// # Errors
    ///
    /// Returns `SupplierNotFound` if missing or deleted.
    pub async fn get_supplier(&self, id: Uuid) -> Result<suppliers::Model, CatalogError> {
        suppliers::Entity::find_by_id(id)
            .filter(suppliers::Column::DeletedAt.is_null())
            .one(&self.db)
            .await?
            .ok_or(CatalogError::SupplierNotFound(id))
    }
}
