use chrono::{DateTime, TimeZone, Utc};
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Statement};

use engine::{Budget, BudgetCmd, Engine, EngineError, RegisterCmd, TransactionCmd};
use migration::MigratorTrait;
use uuid::Uuid;

async fn engine_with_db() -> (Engine, DatabaseConnection) {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .password_cost(4)
        .build()
        .await
        .unwrap();
    (engine, db)
}

async fn register(engine: &Engine, username: &str) -> Uuid {
    engine
        .register(RegisterCmd::new(
            username,
            format!("{username}@example.com"),
            "password123",
        ))
        .await
        .unwrap()
        .id
}

fn at(year: i32, month: u32, day: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(year, month, day, 10, 30, 0).unwrap()
}

fn food(amount_minor: i64, when: DateTime<Utc>) -> TransactionCmd {
    TransactionCmd::expense(amount_minor, "Food", when).description("Groceries")
}

async fn reload(engine: &Engine, user: Uuid, budget: &Budget) -> Budget {
    engine.budget(user, budget.id).await.unwrap()
}

#[tokio::test]
async fn expense_updates_budget_spending() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 20_000, 3, 2024))
        .await
        .unwrap();
    assert_eq!(budget.spent_minor, 0);

    let tx = engine
        .create_transaction(alice, food(5_000, at(2024, 3, 15)))
        .await
        .unwrap();

    let budget = reload(&engine, alice, &budget).await;
    assert_eq!(budget.spent_minor, 5_000);
    assert_eq!(budget.remaining_minor(), 15_000);
    assert_eq!(budget.percentage_used(), 25.0);

    engine.delete_transaction(alice, tx.id).await.unwrap();
    assert_eq!(reload(&engine, alice, &budget).await.spent_minor, 0);
}

#[tokio::test]
async fn window_includes_first_and_last_instant_of_month() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 10_000, 2, 2024))
        .await
        .unwrap();

    let first = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
    let last = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
    let next = Utc.with_ymd_and_hms(2024, 3, 1, 0, 0, 0).unwrap();
    let before = Utc.with_ymd_and_hms(2024, 1, 31, 23, 59, 59).unwrap();
    for (amount, when) in [(100, first), (200, last), (400, next), (800, before)] {
        engine
            .create_transaction(alice, food(amount, when))
            .await
            .unwrap();
    }

    assert_eq!(reload(&engine, alice, &budget).await.spent_minor, 300);
}

#[tokio::test]
async fn upsert_created_later_picks_up_existing_ledger() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    for day in [2, 9] {
        engine
            .create_transaction(alice, food(1_500, at(2024, 5, day)))
            .await
            .unwrap();
    }

    let budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 10_000, 5, 2024))
        .await
        .unwrap();
    assert_eq!(budget.spent_minor, 3_000);
}

#[tokio::test]
async fn upsert_on_existing_key_changes_only_the_limit() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let first = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 10_000, 3, 2024))
        .await
        .unwrap();
    engine
        .create_transaction(alice, food(2_000, at(2024, 3, 4)))
        .await
        .unwrap();
    let second = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 25_000, 3, 2024))
        .await
        .unwrap();

    assert_eq!(second.id, first.id);
    assert_eq!(second.amount_minor, 25_000);
    assert_eq!(second.spent_minor, 2_000);
    assert_eq!(engine.list_budgets(alice).await.unwrap().len(), 1);
}

#[tokio::test]
async fn overspending_is_reported_not_blocked() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 1_000, 3, 2024))
        .await
        .unwrap();
    engine
        .create_transaction(alice, food(1_500, at(2024, 3, 4)))
        .await
        .unwrap();

    let budget = reload(&engine, alice, &budget).await;
    assert_eq!(budget.remaining_minor(), -500);
    assert_eq!(budget.percentage_used(), 150.0);
}

#[tokio::test]
async fn moving_category_reconciles_both_budgets() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let food_budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 20_000, 3, 2024))
        .await
        .unwrap();
    let transport_budget = engine
        .upsert_budget(alice, BudgetCmd::new("Transport", 8_000, 3, 2024))
        .await
        .unwrap();
    engine
        .create_transaction(
            alice,
            TransactionCmd::expense(1_000, "Transport", at(2024, 3, 1)).description("Bus"),
        )
        .await
        .unwrap();
    let tx = engine
        .create_transaction(alice, food(5_000, at(2024, 3, 15)))
        .await
        .unwrap();

    engine
        .update_transaction(alice, tx.id, food(5_000, at(2024, 3, 15)).category("Transport"))
        .await
        .unwrap();

    assert_eq!(reload(&engine, alice, &food_budget).await.spent_minor, 0);
    assert_eq!(
        reload(&engine, alice, &transport_budget).await.spent_minor,
        6_000
    );
}

#[tokio::test]
async fn moving_month_reconciles_both_windows() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let march = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 20_000, 3, 2024))
        .await
        .unwrap();
    let april = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 20_000, 4, 2024))
        .await
        .unwrap();
    engine
        .create_transaction(alice, food(700, at(2024, 3, 2)))
        .await
        .unwrap();
    let tx = engine
        .create_transaction(alice, food(5_000, at(2024, 3, 15)))
        .await
        .unwrap();

    engine
        .update_transaction(alice, tx.id, food(5_000, at(2024, 4, 1)))
        .await
        .unwrap();

    assert_eq!(reload(&engine, alice, &march).await.spent_minor, 700);
    assert_eq!(reload(&engine, alice, &april).await.spent_minor, 5_000);
}

#[tokio::test]
async fn switching_kind_to_income_releases_budget() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 20_000, 3, 2024))
        .await
        .unwrap();
    let tx = engine
        .create_transaction(alice, food(5_000, at(2024, 3, 15)))
        .await
        .unwrap();
    engine
        .update_transaction(
            alice,
            tx.id,
            TransactionCmd::income(5_000, "Food", at(2024, 3, 15)).description("Refund"),
        )
        .await
        .unwrap();

    assert_eq!(reload(&engine, alice, &budget).await.spent_minor, 0);
}

#[tokio::test]
async fn reconciliation_is_idempotent_and_heals_drift() {
    let (engine, db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 20_000, 3, 2024))
        .await
        .unwrap();
    engine
        .create_transaction(alice, food(4_200, at(2024, 3, 15)))
        .await
        .unwrap();

    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE budgets SET spent_minor = ? WHERE id = ?",
        vec![999_999_i64.into(), budget.id.into()],
    ))
    .await
    .unwrap();

    engine
        .reconcile_budget(alice, "Food", 3, 2024)
        .await
        .unwrap();
    let once = reload(&engine, alice, &budget).await.spent_minor;
    engine
        .reconcile_budget(alice, "Food", 3, 2024)
        .await
        .unwrap();
    let twice = reload(&engine, alice, &budget).await.spent_minor;

    assert_eq!(once, 4_200);
    assert_eq!(twice, once);
}

#[tokio::test]
async fn unreadable_sum_fails_reconciliation_and_keeps_spending() {
    let (engine, db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 20_000, 3, 2024))
        .await
        .unwrap();
    engine
        .create_transaction(alice, food(4_200, at(2024, 3, 15)))
        .await
        .unwrap();

    // A fractional amount turns the SQL sum into a REAL that cannot decode as i64.
    db.execute(Statement::from_sql_and_values(
        db.get_database_backend(),
        "UPDATE transactions SET amount_minor = ? WHERE user_id = ?",
        vec![0.5_f64.into(), alice.into()],
    ))
    .await
    .unwrap();

    let err = engine
        .reconcile_budget(alice, "Food", 3, 2024)
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));
    assert_eq!(reload(&engine, alice, &budget).await.spent_minor, 4_200);
}

#[tokio::test]
async fn reconciling_without_budget_is_noop() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    engine
        .reconcile_budget(alice, "Nothing", 3, 2024)
        .await
        .unwrap();
    engine
        .create_transaction(alice, food(100, at(2024, 3, 1)))
        .await
        .unwrap();
    assert!(engine.list_budgets(alice).await.unwrap().is_empty());
}

#[tokio::test]
async fn spending_is_scoped_per_owner() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    let alice_budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 20_000, 3, 2024))
        .await
        .unwrap();
    let bob_budget = engine
        .upsert_budget(bob, BudgetCmd::new("Food", 20_000, 3, 2024))
        .await
        .unwrap();
    engine
        .create_transaction(bob, food(3_300, at(2024, 3, 3)))
        .await
        .unwrap();

    assert_eq!(reload(&engine, alice, &alice_budget).await.spent_minor, 0);
    assert_eq!(reload(&engine, bob, &bob_budget).await.spent_minor, 3_300);
}

#[tokio::test]
async fn other_owners_budgets_are_not_found() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;
    let bob = register(&engine, "bob").await;

    let budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 20_000, 3, 2024))
        .await
        .unwrap();

    let not_found = EngineError::KeyNotFound("budget not exists".to_string());
    assert_eq!(engine.budget(bob, budget.id).await.unwrap_err(), not_found);
    assert_eq!(
        engine
            .update_budget(bob, budget.id, BudgetCmd::new("Food", 1, 3, 2024))
            .await
            .unwrap_err(),
        not_found
    );
    assert_eq!(
        engine.delete_budget(bob, budget.id).await.unwrap_err(),
        not_found
    );
    assert_eq!(
        engine.budget(alice, budget.id).await.unwrap().amount_minor,
        20_000
    );
}

#[tokio::test]
async fn update_by_id_moves_window_and_reconciles() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    engine
        .create_transaction(alice, food(800, at(2024, 6, 10)))
        .await
        .unwrap();
    let budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 5_000, 5, 2024))
        .await
        .unwrap();
    assert_eq!(budget.spent_minor, 0);

    let moved = engine
        .update_budget(alice, budget.id, BudgetCmd::new("Food", 6_000, 6, 2024))
        .await
        .unwrap();
    assert_eq!(moved.id, budget.id);
    assert_eq!((moved.month, moved.year), (6, 2024));
    assert_eq!(moved.amount_minor, 6_000);
    assert_eq!(moved.spent_minor, 800);
}

#[tokio::test]
async fn update_by_id_onto_taken_key_is_a_database_error() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    engine
        .upsert_budget(alice, BudgetCmd::new("Food", 5_000, 5, 2024))
        .await
        .unwrap();
    let other = engine
        .upsert_budget(alice, BudgetCmd::new("Travel", 5_000, 5, 2024))
        .await
        .unwrap();

    let err = engine
        .update_budget(alice, other.id, BudgetCmd::new("Food", 5_000, 5, 2024))
        .await
        .unwrap_err();
    assert!(matches!(err, EngineError::Database(_)));
    assert_eq!(
        engine.budget(alice, other.id).await.unwrap().category,
        "Travel"
    );
}

#[tokio::test]
async fn delete_budget_leaves_ledger_alone() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let budget = engine
        .upsert_budget(alice, BudgetCmd::new("Food", 5_000, 5, 2024))
        .await
        .unwrap();
    engine
        .create_transaction(alice, food(800, at(2024, 5, 10)))
        .await
        .unwrap();
    engine.delete_budget(alice, budget.id).await.unwrap();

    assert!(engine.list_budgets(alice).await.unwrap().is_empty());
    assert_eq!(engine.list_transactions(alice).await.unwrap().len(), 1);
}

#[tokio::test]
async fn budgets_are_listed_by_month() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    for (category, month) in [("Rent", 3), ("Food", 3), ("Food", 4)] {
        engine
            .upsert_budget(alice, BudgetCmd::new(category, 1_000, month, 2024))
            .await
            .unwrap();
    }

    let march: Vec<_> = engine
        .list_budgets_for_month(alice, 3, 2024)
        .await
        .unwrap()
        .into_iter()
        .map(|b| b.category)
        .collect();
    assert_eq!(march, vec!["Food", "Rent"]);

    let current = engine
        .current_budgets(alice, at(2024, 4, 20))
        .await
        .unwrap();
    assert_eq!(current.len(), 1);
    assert_eq!(current[0].month, 4);
}

#[tokio::test]
async fn invalid_budget_is_rejected() {
    let (engine, _db) = engine_with_db().await;
    let alice = register(&engine, "alice").await;

    let err = engine
        .upsert_budget(alice, BudgetCmd::new("", 0, 13, 1999))
        .await
        .unwrap_err();
    let EngineError::Validation(fields) = err else {
        panic!("expected validation error, got {err:?}");
    };
    for field in ["category", "amount_minor", "month", "year"] {
        assert!(fields.get(field).is_some(), "missing {field}");
    }
}
