use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, QueryOrder, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{
    CategorySet, CustomCategory, EngineError, FieldErrors, ResultEngine, TransactionKind,
    custom_categories,
    util::{MAX_CATEGORY_LEN, required_text},
};

use super::{Engine, with_tx};

const DEFAULT_INCOME_CATEGORIES: [&str; 4] = [
    "Salary",
    "Business Income",
    "Investment Returns",
    "Other Income",
];

const DEFAULT_EXPENSE_CATEGORIES: [&str; 5] = [
    "Food & Dining",
    "Rent & Housing",
    "Transportation",
    "Utilities",
    "Other Expenses",
];

fn defaults_for(kind: TransactionKind) -> &'static [&'static str] {
    match kind {
        TransactionKind::Income => &DEFAULT_INCOME_CATEGORIES,
        TransactionKind::Expense => &DEFAULT_EXPENSE_CATEGORIES,
    }
}

/// Defaults first, then custom names not already present.
fn merge_names(kind: TransactionKind, custom: &[CustomCategory]) -> Vec<String> {
    let defaults = defaults_for(kind);
    let mut names: Vec<String> = defaults.iter().map(|s| (*s).to_owned()).collect();
    names.extend(
        custom
            .iter()
            .filter(|c| c.kind == kind && !defaults.contains(&c.name.as_str()))
            .map(|c| c.name.clone()),
    );
    names
}

impl Engine {
    /// Category names offered to `user_id`, grouped by kind.
    pub async fn list_categories(&self, user_id: Uuid) -> ResultEngine<CategorySet> {
        let custom = self.list_custom_categories(user_id).await?;
        Ok(CategorySet {
            income: merge_names(TransactionKind::Income, &custom),
            expense: merge_names(TransactionKind::Expense, &custom),
        })
    }

    /// The categories `user_id` created, sorted by name.
    pub async fn list_custom_categories(
        &self,
        user_id: Uuid,
    ) -> ResultEngine<Vec<CustomCategory>> {
        custom_categories::Entity::find()
            .filter(custom_categories::Column::UserId.eq(user_id))
            .order_by_asc(custom_categories::Column::Name)
            .all(&self.database)
            .await?
            .into_iter()
            .map(CustomCategory::try_from)
            .collect()
    }

    pub async fn create_category(
        &self,
        user_id: Uuid,
        name: &str,
        kind: TransactionKind,
    ) -> ResultEngine<CustomCategory> {
        let mut errors = FieldErrors::new();
        let name = required_text(&mut errors, "name", name, MAX_CATEGORY_LEN);
        errors.into_result()?;
        if defaults_for(kind).contains(&name.as_str()) {
            return Err(EngineError::ExistingKey(name));
        }

        with_tx!(self, |db_tx| {
            self.require_user_exists(&db_tx, user_id).await?;
            let duplicate = custom_categories::Entity::find()
                .filter(custom_categories::Column::UserId.eq(user_id))
                .filter(custom_categories::Column::Name.eq(name.as_str()))
                .filter(custom_categories::Column::Kind.eq(kind.as_str()))
                .one(&db_tx)
                .await?;
            if duplicate.is_some() {
                return Err(EngineError::ExistingKey(name));
            }

            let model = custom_categories::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                user_id: ActiveValue::Set(user_id),
                name: ActiveValue::Set(name),
                kind: ActiveValue::Set(kind.as_str().to_string()),
                created_at: ActiveValue::Set(Utc::now()),
            }
            .insert(&db_tx)
            .await?;
            CustomCategory::try_from(model)
        })
    }

    /// Deletes a custom category. Transactions keep their labels.
    pub async fn delete_category(&self, user_id: Uuid, id: Uuid) -> ResultEngine<()> {
        with_tx!(self, |db_tx| {
            self.require_category_owned(&db_tx, user_id, id).await?;
            custom_categories::Entity::delete_by_id(id)
                .exec(&db_tx)
                .await?;
            Ok(())
        })
    }
}
