use sea_orm::{ConnectionTrait, QueryFilter, prelude::*};
use uuid::Uuid;

use crate::{EngineError, ResultEngine, budgets, custom_categories, transactions, users};

use super::Engine;

/// Generates a `require_*_owned` lookup for an owner-scoped entity.
///
/// A row that exists but belongs to another user is reported exactly like a
/// missing row, so callers cannot probe for foreign ids.
macro_rules! impl_require_owned {
    ($require_fn:ident, $entity:path, $model:path, $owner_col:expr, $err_msg:literal) => {
        pub(super) async fn $require_fn<C: ConnectionTrait>(
            &self,
            db: &C,
            user_id: Uuid,
            id: Uuid,
        ) -> ResultEngine<$model> {
            <$entity>::find_by_id(id)
                .filter($owner_col.eq(user_id))
                .one(db)
                .await?
                .ok_or_else(|| EngineError::KeyNotFound($err_msg.to_string()))
        }
    };
}

impl Engine {
    impl_require_owned!(
        require_transaction_owned,
        transactions::Entity,
        transactions::Model,
        transactions::Column::UserId,
        "transaction not exists"
    );

    impl_require_owned!(
        require_budget_owned,
        budgets::Entity,
        budgets::Model,
        budgets::Column::UserId,
        "budget not exists"
    );

    impl_require_owned!(
        require_category_owned,
        custom_categories::Entity,
        custom_categories::Model,
        custom_categories::Column::UserId,
        "category not exists"
    );

    pub(super) async fn require_user_exists<C: ConnectionTrait>(
        &self,
        db: &C,
        user_id: Uuid,
    ) -> ResultEngine<users::Model> {
        users::Entity::find_by_id(user_id)
            .one(db)
            .await?
            .ok_or_else(|| EngineError::KeyNotFound("user not exists".to_string()))
    }
}
