//! Read-only aggregations over the ledger.

use serde::{Deserialize, Serialize};

/// Headline totals for the dashboard.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardStats {
    pub total_income_minor: i64,
    pub total_expenses_minor: i64,
    pub balance_minor: i64,
    pub monthly_income_minor: i64,
    pub monthly_expenses_minor: i64,
}

/// One category's share of a month's spending (or income).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CategoryAmount {
    pub category: String,
    pub amount_minor: i64,
    pub count: i64,
    pub percentage: f64,
}

/// Total for one calendar month, labelled `YYYY-MM`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyAmount {
    pub month: String,
    pub amount_minor: i64,
}

/// Limit against spending for one budget.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct BudgetComparison {
    pub category: String,
    pub budget_minor: i64,
    pub spent_minor: i64,
}

/// Attaches percentage-of-total to grouped `(category, amount, count)` rows.
pub(crate) fn with_percentages(rows: Vec<(String, i64, i64)>) -> Vec<CategoryAmount> {
    let total: i128 = rows.iter().map(|(_, amount, _)| i128::from(*amount)).sum();
    rows.into_iter()
        .map(|(category, amount_minor, count)| CategoryAmount {
            category,
            amount_minor,
            count,
            percentage: if total > 0 {
                amount_minor as f64 / total as f64 * 100.0
            } else {
                0.0
            },
        })
        .collect()
}
