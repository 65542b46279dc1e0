//! JSON request and response bodies of the HTTP API.
//!
//! Money travels as integer minor units (`*_minor`, e.g. cents).

use chrono::{DateTime, FixedOffset, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

pub mod auth {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct RegisterRequest {
        pub username: String,
        pub email: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct LoginRequest {
        pub username: String,
        pub password: String,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct UserView {
        pub id: Uuid,
        pub username: String,
        pub email: String,
        pub created_at: DateTime<Utc>,
    }

    /// Returned by register and login.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct AuthResponse {
        pub token: String,
        /// Always `Bearer`.
        pub token_type: String,
        pub expires_at: DateTime<Utc>,
        pub user: UserView,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MessageResponse {
        pub message: String,
    }
}

pub mod transaction {
    use super::*;

    /// Body of create and update. Update replaces every field.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionNew {
        pub amount_minor: i64,
        #[serde(default)]
        pub description: String,
        pub category: String,
        pub kind: TransactionKind,
        /// RFC 3339, any offset. Stored in UTC.
        pub occurred_at: DateTime<FixedOffset>,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct TransactionView {
        pub id: Uuid,
        pub amount_minor: i64,
        pub description: String,
        pub category: String,
        pub kind: TransactionKind,
        pub occurred_at: DateTime<Utc>,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }

    /// Optional inclusive range for listing. Give both bounds or neither.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct TransactionRange {
        pub from: Option<DateTime<FixedOffset>>,
        pub to: Option<DateTime<FixedOffset>>,
    }
}

pub mod budget {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetNew {
        pub category: String,
        pub amount_minor: i64,
        pub month: u32,
        pub year: i32,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetView {
        pub id: Uuid,
        pub category: String,
        pub amount_minor: i64,
        pub spent_minor: i64,
        /// Negative when overspent.
        pub remaining_minor: i64,
        pub percentage_used: f64,
        pub month: u32,
        pub year: i32,
        pub created_at: DateTime<Utc>,
        pub updated_at: DateTime<Utc>,
    }
}

pub mod analytics {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct DashboardStats {
        pub total_income_minor: i64,
        pub total_expenses_minor: i64,
        pub balance_minor: i64,
        pub monthly_income_minor: i64,
        pub monthly_expenses_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryAmount {
        pub category: String,
        pub amount_minor: i64,
        pub count: i64,
        pub percentage: f64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct MonthlyAmount {
        /// `YYYY-MM`.
        pub month: String,
        pub amount_minor: i64,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct BudgetComparison {
        pub category: String,
        pub budget_minor: i64,
        pub spent_minor: i64,
    }

    /// `?type=income|expense`, expense when absent.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct KindQuery {
        #[serde(rename = "type")]
        pub kind: Option<TransactionKind>,
    }

    /// `?month=&year=`, current month when absent.
    #[derive(Debug, Default, Serialize, Deserialize)]
    pub struct MonthQuery {
        pub month: Option<u32>,
        pub year: Option<i32>,
    }
}

pub mod category {
    use super::*;

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryNew {
        pub name: String,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
    }

    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryView {
        pub id: Uuid,
        pub name: String,
        #[serde(rename = "type")]
        pub kind: TransactionKind,
        pub created_at: DateTime<Utc>,
    }

    /// Defaults plus custom names per kind, and the custom entries with ids.
    #[derive(Debug, Serialize, Deserialize)]
    pub struct CategoryList {
        pub income: Vec<String>,
        pub expense: Vec<String>,
        pub custom: Vec<CategoryView>,
    }
}
