//! Monthly per-category spending limits.
//!
//! `spent_minor` is a cached value derived from the ledger; it is rewritten by
//! budget reconciliation and never edited directly.

use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Budget {
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub amount_minor: i64,
    pub spent_minor: i64,
    pub month: u32,
    pub year: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Budget {
    /// Limit minus spending. Negative when the budget is overspent.
    pub fn remaining_minor(&self) -> i64 {
        self.amount_minor - self.spent_minor
    }

    /// Spending as a percentage of the limit, `0.0` for a zero limit.
    pub fn percentage_used(&self) -> f64 {
        if self.amount_minor > 0 {
            self.spent_minor as f64 / self.amount_minor as f64 * 100.0
        } else {
            0.0
        }
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "budgets")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub category: String,
    pub amount_minor: i64,
    pub spent_minor: i64,
    pub month: i32,
    pub year: i32,
    pub created_at: DateTimeUtc,
    pub updated_at: DateTimeUtc,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    #[sea_orm(
        belongs_to = "super::users::Entity",
        from = "Column::UserId",
        to = "super::users::Column::Id",
        on_update = "NoAction",
        on_delete = "Cascade"
    )]
    User,
}

impl Related<super::users::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::User.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}

impl From<Model> for Budget {
    fn from(model: Model) -> Self {
        Self {
            id: model.id,
            user_id: model.user_id,
            category: model.category,
            amount_minor: model.amount_minor,
            spent_minor: model.spent_minor,
            month: u32::try_from(model.month).unwrap_or_default(),
            year: model.year,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}
