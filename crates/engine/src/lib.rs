//! Business core of the finance tracker.
//!
//! The [`Engine`] owns a database connection and exposes owner-scoped
//! operations over users, the transaction ledger, monthly budgets, custom
//! categories and read-only analytics. Every operation takes the owner id as
//! an explicit argument; anything owned by a different user is reported as
//! [`EngineError::KeyNotFound`].

pub use analytics::{BudgetComparison, CategoryAmount, DashboardStats, MonthlyAmount};
pub use budgets::Budget;
pub use commands::{BudgetCmd, RegisterCmd, TransactionCmd};
pub use custom_categories::{CategorySet, CustomCategory};
pub use error::{EngineError, FieldErrors};
pub use ops::{Engine, EngineBuilder};
pub use transactions::{Transaction, TransactionKind};
pub use users::User;
pub use util::month_window;

mod analytics;
mod budgets;
mod commands;
mod custom_categories;
mod error;
mod ops;
mod transactions;
mod users;
mod util;

type ResultEngine<T> = Result<T, EngineError>;
