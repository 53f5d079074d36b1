//! Postgres enums and their mapping to the core movement types.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use stockledger_core::movement::{Family, MovementStatus as CoreStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_family")]
pub enum MovementFamily {
    #[sea_orm(string_value = "stock_in")]
    StockIn,
    #[sea_orm(string_value = "sale")]
    Sale,
    #[sea_orm(string_value = "reject")]
    Reject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "Enum", enum_name = "movement_status")]
pub enum MovementStatus {
    #[sea_orm(string_value = "draft")]
    Draft,
    #[sea_orm(string_value = "completed")]
    Completed,
    #[sea_orm(string_value = "cancelled")]
    Cancelled,
}

impl From<Family> for MovementFamily {
    fn from(family: Family) -> Self {
        match family {
            Family::StockIn => Self::StockIn,
            Family::Sale => Self::Sale,
            Family::Reject => Self::Reject,
        }
    }
}

impl From<MovementFamily> for Family {
    fn from(family: MovementFamily) -> Self {
        match family {
            MovementFamily::StockIn => Self::StockIn,
            MovementFamily::Sale => Self::Sale,
            MovementFamily::Reject => Self::Reject,
        }
    }
}

impl From<CoreStatus> for MovementStatus {
    fn from(status: CoreStatus) -> Self {
        match status {
            CoreStatus::Draft => Self::Draft,
            CoreStatus::Completed => Self::Completed,
            CoreStatus::Cancelled => Self::Cancelled,
        }
    }
}

impl From<MovementStatus> for CoreStatus {
    fn from(status: MovementStatus) -> Self {
        match status {
            MovementStatus::Draft => Self::Draft,
            MovementStatus::Completed => Self::Completed,
            MovementStatus::Cancelled => Self::Cancelled,
        }
    }
}
