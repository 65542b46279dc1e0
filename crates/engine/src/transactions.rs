//! Ledger primitives.
//!
//! A `Transaction` is a single income or expense owned by exactly one user.
//! The ledger is the source of truth every derived value (budget spending,
//! analytics) is computed from.

use chrono::{DateTime, Datelike, Utc};
use sea_orm::{ActiveValue, entity::prelude::*};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{EngineError, ResultEngine};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

impl TryFrom<&str> for TransactionKind {
    type Error = EngineError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            other => {
                let mut errors = crate::FieldErrors::new();
                errors.add("kind", format!("invalid transaction kind: {other}"));
                Err(EngineError::Validation(errors))
            }
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    pub category: String,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    /// The budget window this transaction falls into, as `(month, year)`.
    pub fn window(&self) -> (u32, i32) {
        (self.occurred_at.month(), self.occurred_at.year())
    }
}

#[derive(Clone, Debug, PartialEq, DeriveEntityModel)]
#[sea_orm(table_name = "transactions")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub user_id: Uuid,
    pub amount_minor: i64,
    pub description: String,
    pub category: String,
    pub kind: String,
    pub occurred_at: DateTimeUtc,
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

impl From<&Transaction> for ActiveModel {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: ActiveValue::Set(tx.id),
            user_id: ActiveValue::Set(tx.user_id),
            amount_minor: ActiveValue::Set(tx.amount_minor),
            description: ActiveValue::Set(tx.description.clone()),
            category: ActiveValue::Set(tx.category.clone()),
            kind: ActiveValue::Set(tx.kind.as_str().to_string()),
            occurred_at: ActiveValue::Set(tx.occurred_at),
            created_at: ActiveValue::Set(tx.created_at),
            updated_at: ActiveValue::Set(tx.updated_at),
        }
    }
}

impl TryFrom<Model> for Transaction {
    type Error = EngineError;

    fn try_from(model: Model) -> ResultEngine<Self> {
        Ok(Self {
            id: model.id,
            user_id: model.user_id,
            amount_minor: model.amount_minor,
            description: model.description,
            category: model.category,
            kind: TransactionKind::try_from(model.kind.as_str())?,
            occurred_at: model.occurred_at,
            created_at: model.created_at,
            updated_at: model.updated_at,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    #[test]
    fn kind_round_trips_through_storage_string() {
        for kind in [TransactionKind::Income, TransactionKind::Expense] {
            assert_eq!(TransactionKind::try_from(kind.as_str()).ok(), Some(kind));
        }
        assert!(TransactionKind::try_from("transfer").is_err());
    }

    #[test]
    fn window_uses_utc_calendar_month() {
        let now = Utc::now();
        let tx = Transaction {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            amount_minor: 100,
            description: "Rent".to_string(),
            category: "Housing".to_string(),
            kind: TransactionKind::Expense,
            occurred_at: Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap(),
            created_at: now,
            updated_at: now,
        };
        assert_eq!(tx.window(), (2, 2024));
    }
}
