use sea_orm::{
    ActiveValue, ConnectionTrait, DbErr, QueryFilter, Statement, TransactionTrait, Value,
    prelude::*,
};
use uuid::Uuid;

use crate::{ResultEngine, TransactionKind, budgets, util::month_window};

use super::{Engine, with_tx};

/// Sum of `kind` amounts for one owner in `[start, end)`, optionally narrowed
/// to a single category. Empty sets sum to `0`.
pub(super) async fn sum_between<C: ConnectionTrait>(
    db: &C,
    user_id: Uuid,
    kind: TransactionKind,
    category: Option<&str>,
    start: DateTimeUtc,
    end: DateTimeUtc,
) -> ResultEngine<i64> {
    let mut sql = String::from(
        "SELECT COALESCE(SUM(amount_minor), 0) AS sum \
         FROM transactions \
         WHERE user_id = ? \
           AND kind = ? \
           AND occurred_at >= ? \
           AND occurred_at < ?",
    );
    let mut values: Vec<Value> = vec![
        user_id.into(),
        kind.as_str().into(),
        start.into(),
        end.into(),
    ];
    if let Some(category) = category {
        sql.push_str(" AND category = ?");
        values.push(category.into());
    }

    let stmt = Statement::from_sql_and_values(db.get_database_backend(), sql, values);
    let row = db.query_one(stmt).await?;
    match row {
        Some(row) => Ok(row.try_get::<i64>("", "sum")?),
        None => Ok(0),
    }
}

impl Engine {
    /// Re-derives `spent_minor` for the budget of `(category, month, year)`.
    ///
    /// A missing budget is a no-op. The new value is written even when it did
    /// not change, so the call is safe to repeat.
    pub(super) async fn reconcile_in<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
        category: &str,
        month: u32,
        year: i32,
    ) -> ResultEngine<()> {
        let (start, end) = month_window(month, year)?;
        let Some(model) = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::Category.eq(category))
            .filter(budgets::Column::Month.eq(month as i32))
            .filter(budgets::Column::Year.eq(year))
            .one(db)
            .await?
        else {
            return Ok(());
        };

        let spent = sum_between(
            db,
            user_id,
            TransactionKind::Expense,
            Some(category),
            start,
            end,
        )
        .await?;

        let active = budgets::ActiveModel {
            id: ActiveValue::Set(model.id),
            spent_minor: ActiveValue::Set(spent),
            updated_at: ActiveValue::Set(chrono::Utc::now()),
            ..Default::default()
        };
        match active.update(db).await {
            Ok(_) => {
                tracing::debug!(budget = %model.id, %category, month, year, spent, "budget reconciled");
                Ok(())
            }
            Err(DbErr::RecordNotUpdated) => {
                tracing::debug!(budget = %model.id, "budget vanished before reconciliation");
                Ok(())
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Recomputes the cached spending of one budget from the ledger.
    pub async fn reconcile_budget(
        &self,
        user_id: Uuid,
        category: &str,
        month: u32,
        year: i32,
    ) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.reconcile_in(&db_tx, user_id, category, month, year)
                .await
        })
    }
}
