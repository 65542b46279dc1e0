use std::collections::BTreeMap;

use chrono::{DateTime, Datelike, NaiveDate, TimeDelta, Utc};
use sea_orm::{ConnectionTrait, DbErr, QueryFilter, QuerySelect, Statement, prelude::*};
use uuid::Uuid;

use crate::{
    BudgetComparison, CategoryAmount, DashboardStats, MonthlyAmount, ResultEngine,
    TransactionKind, analytics::with_percentages, transactions, util::month_window,
};

use super::{Engine, reconcile::sum_between};

/// Number of months returned by [`Engine::monthly_series`].
const MONTHLY_SERIES_LEN: usize = 12;

/// Lower bound of the all-time totals.
fn epoch() -> DateTime<Utc> {
    NaiveDate::from_ymd_opt(2000, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

impl Engine {
    /// All-time totals up to and including `now`, plus totals for the month
    /// containing `now`.
    pub async fn dashboard_stats(
        &self,
        user_id: Uuid,
        now: DateTime<Utc>,
    ) -> ResultEngine<DashboardStats> {
        let db = &self.database;
        let through_now = now + TimeDelta::nanoseconds(1);
        let (month_start, month_end) = month_window(now.month(), now.year())?;

        let total_income_minor = sum_between(
            db,
            user_id,
            TransactionKind::Income,
            None,
            epoch(),
            through_now,
        )
        .await?;
        let total_expenses_minor = sum_between(
            db,
            user_id,
            TransactionKind::Expense,
            None,
            epoch(),
            through_now,
        )
        .await?;
        let monthly_income_minor = sum_between(
            db,
            user_id,
            TransactionKind::Income,
            None,
            month_start,
            month_end,
        )
        .await?;
        let monthly_expenses_minor = sum_between(
            db,
            user_id,
            TransactionKind::Expense,
            None,
            month_start,
            month_end,
        )
        .await?;

        Ok(DashboardStats {
            total_income_minor,
            total_expenses_minor,
            balance_minor: total_income_minor.saturating_sub(total_expenses_minor),
            monthly_income_minor,
            monthly_expenses_minor,
        })
    }

    /// Per-category totals of `kind` for one month, largest first.
    pub async fn category_breakdown(
        &self,
        user_id: Uuid,
        kind: TransactionKind,
        month: u32,
        year: i32,
    ) -> ResultEngine<Vec<CategoryAmount>> {
        let (start, end) = month_window(month, year)?;
        let db = &self.database;
        let stmt = Statement::from_sql_and_values(
            db.get_database_backend(),
            "SELECT category, COALESCE(SUM(amount_minor), 0) AS total, COUNT(*) AS count \
             FROM transactions \
             WHERE user_id = ? \
               AND kind = ? \
               AND occurred_at >= ? \
               AND occurred_at < ? \
             GROUP BY category \
             ORDER BY total DESC, category ASC",
            vec![
                user_id.into(),
                kind.as_str().into(),
                start.into(),
                end.into(),
            ],
        );

        let rows = db
            .query_all(stmt)
            .await?
            .into_iter()
            .map(|row| -> Result<(String, i64, i64), DbErr> {
                Ok((
                    row.try_get::<String>("", "category")?,
                    row.try_get::<i64>("", "total")?,
                    row.try_get::<i64>("", "count")?,
                ))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(with_percentages(rows))
    }

    /// Monthly totals of `kind`, labelled `YYYY-MM`, most recent twelve months
    /// with activity first.
    pub async fn monthly_series(
        &self,
        user_id: Uuid,
        kind: TransactionKind,
    ) -> ResultEngine<Vec<MonthlyAmount>> {
        let rows: Vec<(DateTimeUtc, i64)> = transactions::Entity::find()
            .select_only()
            .column(transactions::Column::OccurredAt)
            .column(transactions::Column::AmountMinor)
            .filter(transactions::Column::UserId.eq(user_id))
            .filter(transactions::Column::Kind.eq(kind.as_str()))
            .into_tuple()
            .all(&self.database)
            .await?;

        let mut by_month: BTreeMap<String, i64> = BTreeMap::new();
        for (occurred_at, amount_minor) in rows {
            let total = by_month
                .entry(occurred_at.format("%Y-%m").to_string())
                .or_default();
            *total = total.saturating_add(amount_minor);
        }

        Ok(by_month
            .into_iter()
            .rev()
            .take(MONTHLY_SERIES_LEN)
            .map(|(month, amount_minor)| MonthlyAmount {
                month,
                amount_minor,
            })
            .collect())
    }

    /// Limit against cached spending for every budget of one month.
    pub async fn budget_comparison(
        &self,
        user_id: Uuid,
        month: u32,
        year: i32,
    ) -> ResultEngine<Vec<BudgetComparison>> {
        month_window(month, year)?;
        let budgets = self.list_budgets_for_month(user_id, month, year).await?;
        Ok(budgets
            .into_iter()
            .map(|b| BudgetComparison {
                category: b.category,
                budget_minor: b.amount_minor,
                spent_minor: b.spent_minor,
            })
            .collect())
    }
}
