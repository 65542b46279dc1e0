use chrono::{DateTime, Utc};
use sea_orm::{QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    EngineError, ResultEngine, Transaction, TransactionCmd, TransactionKind, transactions,
    util::validate_transaction,
};

use super::{Engine, with_tx};

impl Engine {
    /// Records a new transaction and refreshes the budget it lands in.
    pub async fn create_transaction(
        &self,
        user_id: Uuid,
        cmd: TransactionCmd,
    ) -> ResultEngine<Transaction> {
        let cmd = validate_transaction(cmd)?;
        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;

            let now = Utc::now();
            let tx = Transaction {
                id: Uuid::new_v4(),
                user_id,
                amount_minor: cmd.amount_minor,
                description: cmd.description,
                category: cmd.category,
                kind: cmd.kind,
                occurred_at: cmd.occurred_at,
                created_at: now,
                updated_at: now,
            };
            transactions::ActiveModel::from(&tx).insert(&db_tx).await?;

            if tx.kind == TransactionKind::Expense {
                let (month, year) = tx.window();
                self.reconcile_in(&db_tx, user_id, &tx.category, month, year)
                    .await?;
            }
            tracing::info!(transaction = %tx.id, kind = tx.kind.as_str(), "transaction created");
            Ok(tx)
        })
    }

    /// Returns one transaction of `user_id`.
    pub async fn transaction(&self, user_id: Uuid, id: Uuid) -> ResultEngine<Transaction> {
        let model = self
            .require_transaction_owned(&self.database, user_id, id)
            .await?;
        Transaction::try_from(model)
    }

    /// Lists every transaction of `user_id`, newest first.
    pub async fn list_transactions(&self, user_id: Uuid) -> ResultEngine<Vec<Transaction>> {
        transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Lists transactions with `start <= occurred_at <= end`, newest first.
    pub async fn list_transactions_between(
        &self,
        user_id: Uuid,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> ResultEngine<Vec<Transaction>> {
        if start > end {
            let mut errors = crate::FieldErrors::new();
            errors.add("from", "start must not be after end");
            return Err(EngineError::Validation(errors));
        }
        transactions::Entity::find()
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::OccurredAt.gte(start))
            .filter(transactions::Column::OccurredAt.lte(end))
            .order_by_desc(transactions::Column::OccurredAt)
            .order_by_desc(transactions::Column::Id)
            .all(&self.database)
            .await?
            .into_iter()
            .map(Transaction::try_from)
            .collect()
    }

    /// Replaces every editable field of a transaction.
    ///
    /// Both the window the transaction left and the one it entered are
    /// reconciled, even when they are the same.
    pub async fn update_transaction(
        &self,
        user_id: Uuid,
        id: Uuid,
        cmd: TransactionCmd,
    ) -> ResultEngine<Transaction> {
        let cmd = validate_transaction(cmd)?;
        with_tx!(self, |db_tx| {
            let model = self.require_transaction_owned(&db_tx, user_id, id).await?;
            let old = Transaction::try_from(model)?;
            let (old_month, old_year) = old.window();

            let updated = Transaction {
                amount_minor: cmd.amount_minor,
                description: cmd.description,
                category: cmd.category,
                kind: cmd.kind,
                occurred_at: cmd.occurred_at,
                updated_at: Utc::now(),
                ..old.clone()
            };
            transactions::ActiveModel::from(&updated)
                .update(&db_tx)
                .await?;

            if old.kind == TransactionKind::Expense {
                self.reconcile_in(&db_tx, user_id, &old.category, old_month, old_year)
                    .await?;
            }
            if updated.kind == TransactionKind::Expense {
                let (month, year) = updated.window();
                self.reconcile_in(&db_tx, user_id, &updated.category, month, year)
                    .await?;
            }
            tracing::info!(transaction = %id, "transaction updated");
            Ok(updated)
        })
    }

    /// Deletes a transaction and refreshes the budget it counted towards.
    pub async fn delete_transaction(&self, user_id: Uuid, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            let model = self.require_transaction_owned(&db_tx, user_id, id).await?;
            let tx = Transaction::try_from(model)?;
            transactions::Entity::delete_by_id(id).exec(&db_tx).await?;

            if tx.kind == TransactionKind::Expense {
                let (month, year) = tx.window();
                self.reconcile_in(&db_tx, user_id, &tx.category, month, year)
                    .await?;
            }
            tracing::info!(transaction = %id, "transaction deleted");
            Ok(())
        })
    }
}
