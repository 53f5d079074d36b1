//! Initial database migration.
//!
//! Creates the movement enums, the catalog tables, movements with their
//! line items, and sale payments.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();

        // ============================================================
        // PART 1: ENUMS
        // ============================================================
        db.execute_unprepared(ENUMS_SQL).await?;

        // ============================================================
        // PART 2: CATALOG
        // ============================================================
        db.execute_unprepared(PRODUCTS_SQL).await?;
        db.execute_unprepared(CUSTOMERS_SQL).await?;
        db.execute_unprepared(SUPPLIERS_SQL).await?;

        // ============================================================
        // PART 3: MOVEMENTS
        // ============================================================
        db.execute_unprepared(MOVEMENTS_SQL).await?;
        db.execute_unprepared(MOVEMENT_ITEMS_SQL).await?;
        db.execute_unprepared(SALE_PAYMENTS_SQL).await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let db = manager.get_connection();
        db.execute_unprepared(DROP_ALL_SQL).await?;
        Ok(())
    }
}

// ============================================================
// SQL CONSTANTS
// ============================================================

const ENUMS_SQL: &str = r"
CREATE TYPE movement_family AS ENUM ('stock_in', 'sale', 'reject');

CREATE TYPE movement_status AS ENUM ('draft', 'completed', 'cancelled');
";

const PRODUCTS_SQL: &str = r"
CREATE TABLE products (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    sku VARCHAR(100) NOT NULL,
    stock INTEGER NOT NULL DEFAULT 0,
    reorder_level INTEGER NOT NULL DEFAULT 0 CHECK (reorder_level >= 0),
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE UNIQUE INDEX idx_products_sku ON products(sku) WHERE deleted_at IS NULL;
CREATE INDEX idx_products_low_stock ON products(stock, reorder_level) WHERE deleted_at IS NULL;
";

const CUSTOMERS_SQL: &str = r"
CREATE TABLE customers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50),
    total_orders INTEGER NOT NULL DEFAULT 0,
    total_spent NUMERIC(19, 4) NOT NULL DEFAULT 0,
    last_order_at TIMESTAMPTZ,
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const SUPPLIERS_SQL: &str = r"
CREATE TABLE suppliers (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    name VARCHAR(255) NOT NULL,
    email VARCHAR(255),
    phone VARCHAR(50),
    total_purchases INTEGER NOT NULL DEFAULT 0,
    total_spent NUMERIC(19, 4) NOT NULL DEFAULT 0,
    last_order_at TIMESTAMPTZ,
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);
";

const MOVEMENTS_SQL: &str = r"
CREATE TABLE movements (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    family movement_family NOT NULL,
    reference_no VARCHAR(100) NOT NULL,
    status movement_status NOT NULL DEFAULT 'draft',
    transaction_date DATE NOT NULL,
    note TEXT,
    total NUMERIC(19, 4) NOT NULL DEFAULT 0,
    paid NUMERIC(19, 4) NOT NULL DEFAULT 0,
    balance NUMERIC(19, 4) NOT NULL DEFAULT 0,
    customer_id UUID REFERENCES customers(id),
    supplier_id UUID REFERENCES suppliers(id),
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    UNIQUE (family, reference_no),
    CONSTRAINT chk_movement_counterparty CHECK (
        (customer_id IS NULL OR family = 'sale')
        AND (supplier_id IS NULL OR family = 'stock_in')
    ),
    CONSTRAINT chk_movement_paid CHECK (paid >= 0)
);

CREATE INDEX idx_movements_family_date ON movements(family, transaction_date) WHERE deleted_at IS NULL;
CREATE INDEX idx_movements_customer ON movements(customer_id) WHERE customer_id IS NOT NULL;
CREATE INDEX idx_movements_supplier ON movements(supplier_id) WHERE supplier_id IS NOT NULL;
";

const MOVEMENT_ITEMS_SQL: &str = r"
CREATE TABLE movement_items (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    movement_id UUID NOT NULL REFERENCES movements(id),
    product_id UUID NOT NULL REFERENCES products(id),
    product_name VARCHAR(255) NOT NULL,
    quantity INTEGER NOT NULL CHECK (quantity > 0),
    unit_value NUMERIC(19, 4) NOT NULL CHECK (unit_value >= 0),
    tax NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (tax >= 0),
    discount NUMERIC(19, 4) NOT NULL DEFAULT 0 CHECK (discount >= 0),
    subtotal NUMERIC(19, 4) NOT NULL CHECK (subtotal >= 0),
    deleted_at TIMESTAMPTZ,
    created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    updated_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_movement_items_movement ON movement_items(movement_id) WHERE deleted_at IS NULL;
CREATE INDEX idx_movement_items_product ON movement_items(product_id) WHERE deleted_at IS NULL;
";

const SALE_PAYMENTS_SQL: &str = r"
CREATE TABLE sale_payments (
    id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
    movement_id UUID NOT NULL REFERENCES movements(id),
    amount NUMERIC(19, 4) NOT NULL CHECK (amount > 0),
    payment_method VARCHAR(50) NOT NULL,
    reference VARCHAR(100),
    note TEXT,
    paid_at TIMESTAMPTZ NOT NULL DEFAULT now(),
    created_at TIMESTAMPTZ NOT NULL DEFAULT now()
);

CREATE INDEX idx_sale_payments_movement ON sale_payments(movement_id);
";

const DROP_ALL_SQL: &str = r"
-- Drop tables (reverse order of creation)
DROP TABLE IF EXISTS sale_payments CASCADE;
DROP TABLE IF EXISTS movement_items CASCADE;
DROP TABLE IF EXISTS movements CASCADE;
DROP TABLE IF EXISTS suppliers CASCADE;
DROP TABLE IF EXISTS customers CASCADE;
DROP TABLE IF EXISTS products CASCADE;

-- Drop enums
DROP TYPE IF EXISTS movement_status CASCADE;
DROP TYPE IF EXISTS movement_family CASCADE;
";
