//! Command structs for engine write operations.
//!
//! These types group parameters for create/update operations, keeping call
//! sites readable and avoiding long argument lists. The owner id is never part
//! of a command: it is passed explicitly next to it.

use chrono::{DateTime, Utc};

use crate::TransactionKind;

/// Full state of a transaction, used for both create and update.
#[derive(Clone, Debug)]
pub struct TransactionCmd {
    pub amount_minor: i64,
    pub description: String,
    pub category: String,
    pub kind: TransactionKind,
    pub occurred_at: DateTime<Utc>,
}

impl TransactionCmd {
    #[must_use]
    pub fn new(
        kind: TransactionKind,
        amount_minor: i64,
        category: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self {
            amount_minor,
            description: String::new(),
            category: category.into(),
            kind,
            occurred_at,
        }
    }

    #[must_use]
    pub fn expense(
        amount_minor: i64,
        category: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self::new(TransactionKind::Expense, amount_minor, category, occurred_at)
    }

    #[must_use]
    pub fn income(
        amount_minor: i64,
        category: impl Into<String>,
        occurred_at: DateTime<Utc>,
    ) -> Self {
        Self::new(TransactionKind::Income, amount_minor, category, occurred_at)
    }

    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    #[must_use]
    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = category.into();
        self
    }

    #[must_use]
    pub fn kind(mut self, kind: TransactionKind) -> Self {
        self.kind = kind;
        self
    }

    #[must_use]
    pub fn amount_minor(mut self, amount_minor: i64) -> Self {
        self.amount_minor = amount_minor;
        self
    }

    #[must_use]
    pub fn occurred_at(mut self, occurred_at: DateTime<Utc>) -> Self {
        self.occurred_at = occurred_at;
        self
    }
}

/// Budget limit for one category in one calendar month.
#[derive(Clone, Debug)]
pub struct BudgetCmd {
    pub category: String,
    pub amount_minor: i64,
    pub month: u32,
    pub year: i32,
}

impl BudgetCmd {
    #[must_use]
    pub fn new(category: impl Into<String>, amount_minor: i64, month: u32, year: i32) -> Self {
        Self {
            category: category.into(),
            amount_minor,
            month,
            year,
        }
    }
}

/// Registration data. The password is hashed before it is stored.
#[derive(Clone, Debug)]
pub struct RegisterCmd {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterCmd {
    #[must_use]
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            username: username.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}
