use chrono::{DateTime, Datelike, Utc};
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{Budget, BudgetCmd, ResultEngine, budgets, util::validate_budget};

use super::{Engine, with_tx};

impl Engine {
    /// Creates the budget for `(category, month, year)` or changes the limit of
    /// the existing one. The returned budget is already reconciled.
    pub async fn upsert_budget(&self, user_id: Uuid, cmd: BudgetCmd) -> ResultEngine<Budget> {
        let cmd = validate_budget(cmd)?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let existing = budgets::Entity::find()
                .filter(budgets::Column::UserId.eq(user_id))
                .filter(budgets::Column::Category.eq(cmd.category.as_str()))
                .filter(budgets::Column::Month.eq(cmd.month as i32))
                .filter(budgets::Column::Year.eq(cmd.year))
                .one(&db_tx)
                .await?;

            let now = Utc::now();
            let id = match existing {
                Some(model) => {
                    let active = budgets::ActiveModel {
                        id: ActiveValue::Set(model.id),
                        amount_minor: ActiveValue::Set(cmd.amount_minor),
                        updated_at: ActiveValue::Set(now),
                        ..Default::default()
                    };
                    active.update(&db_tx).await?;
                    model.id
                }
                None => {
                    let id = Uuid::new_v4();
                    budgets::ActiveModel {
                        id: ActiveValue::Set(id),
                        user_id: ActiveValue::Set(user_id),
                        category: ActiveValue::Set(cmd.category.clone()),
                        amount_minor: ActiveValue::Set(cmd.amount_minor),
                        spent_minor: ActiveValue::Set(0),
                        month: ActiveValue::Set(cmd.month as i32),
                        year: ActiveValue::Set(cmd.year),
                        created_at: ActiveValue::Set(now),
                        updated_at: ActiveValue::Set(now),
                    }
                    .insert(&db_tx)
                    .await?;
                    tracing::info!(budget = %id, category = %cmd.category, "budget created");
                    id
                }
            };

            self.reconcile_in(&db_tx, user_id, &cmd.category, cmd.month, cmd.year)
                .await?;
            self.require_budget_owned(&db_tx, user_id, id)
                .await
                .map(Budget::from)
        })
    }

    /// Rewrites a budget by id, including its category and window.
    ///
    /// Unlike [`Engine::upsert_budget`] this does not look for another budget
    /// with the same key; the unique index rejects a collision as a database
    /// error.
    pub async fn update_budget(
        &self,
        user_id: Uuid,
        id: Uuid,
        cmd: BudgetCmd,
    ) -> ResultEngine<Budget> {
        let cmd = validate_budget(cmd)?;
        with_tx!(self, |db_tx| {
            let model = self.require_budget_owned(&db_tx, user_id, id).await?;
            let active = budgets::ActiveModel {
                id: ActiveValue::Set(model.id),
                category: ActiveValue::Set(cmd.category.clone()),
                amount_minor: ActiveValue::Set(cmd.amount_minor),
                month: ActiveValue::Set(cmd.month as i32),
                year: ActiveValue::Set(cmd.year),
                updated_at: ActiveValue::Set(Utc::now()),
                ..Default::default()
            };
            active.update(&db_tx).await?;

            self.reconcile_in(&db_tx, user_id, &cmd.category, cmd.month, cmd.year)
                .await?;
            tracing::info!(budget = %id, "budget updated");
            self.require_budget_owned(&db_tx, user_id, id)
                .await
                .map(Budget::from)
        })
    }

    /// Deletes a budget. The ledger is untouched.
    pub async fn delete_budget(&self, user_id: Uuid, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_budget_owned(&db_tx, user_id, id).await?;
            budgets::Entity::delete_by_id(id).exec(&db_tx).await?;
            tracing::info!(budget = %id, "budget deleted");
            Ok(())
        })
    }

    /// One budget of `user_id`; a foreign id reads as missing.
    pub async fn budget(&self, user_id: Uuid, id: Uuid) -> ResultEngine<Budget> {
        self.require_budget_owned(&self.database, user_id, id)
            .await
            .map(Budget::from)
    }

    /// Every budget of `user_id`, most recent window first.
    pub async fn list_budgets(&self, user_id: Uuid) -> ResultEngine<Vec<Budget>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .order_by_desc(budgets::Column::Year)
            .order_by_desc(budgets::Column::Month)
            .order_by_asc(budgets::Column::Category)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Budget::from).collect())
    }

    /// Budgets of `user_id` for one month, by category.
    pub async fn list_budgets_for_month(
        &self,
        user_id: Uuid,
        month: u32,
        year: i32,
    ) -> ResultEngine<Vec<Budget>> {
        let models = budgets::Entity::find()
            .filter(budgets::Column::UserId.eq(user_id))
            .filter(budgets::Column::Month.eq(month as i32))
            .filter(budgets::Column::Year.eq(year))
            .order_by_asc(budgets::Column::Category)
            .all(&self.database)
            .await?;
        Ok(models.into_iter().map(Budget::from).collect())
    }

    /// Budgets of the calendar month containing `now` (UTC).
    pub async fn current_budgets(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<Vec<Budget>> {
        self.list_budgets_for_month(user_id, now.month(), now.year())
            .await
    }
}
