use chrono::Utc;
use sea_orm::{ActiveValue, QueryFilter, TransactionTrait, prelude::*};
use uuid::Uuid;

use crate::{EngineError, FieldErrors, RegisterCmd, ResultEngine, User, users};

use super::{Engine, with_tx};

const MIN_USERNAME_LEN: usize = 3;
const MAX_USERNAME_LEN: usize = 50;
const MAX_EMAIL_LEN: usize = 100;
const MIN_PASSWORD_LEN: usize = 8;

fn validate_register(cmd: RegisterCmd) -> ResultEngine<RegisterCmd> {
    let mut errors = FieldErrors::new();
    let username = cmd.username.trim().to_string();
    let username_len = username.chars().count();
    if !(MIN_USERNAME_LEN..=MAX_USERNAME_LEN).contains(&username_len) {
        errors.add(
            "username",
            format!("username must be between {MIN_USERNAME_LEN} and {MAX_USERNAME_LEN} characters"),
        );
    }

    let email = cmd.email.trim().to_string();
    if email.is_empty() {
        errors.add("email", "email is required");
    } else if !email.contains('@') {
        errors.add("email", "email must be valid");
    } else if email.chars().count() > MAX_EMAIL_LEN {
        errors.add("email", format!("email must be at most {MAX_EMAIL_LEN} characters"));
    }

    if cmd.password.chars().count() < MIN_PASSWORD_LEN {
        errors.add(
            "password",
            format!("password must be at least {MIN_PASSWORD_LEN} characters"),
        );
    }
    errors.into_result()?;

    Ok(RegisterCmd {
        username,
        email,
        password: cmd.password,
    })
}

impl Engine {
    /// Creates a user with a bcrypt-hashed password.
    pub async fn register(&self, cmd: RegisterCmd) -> ResultEngine<User> {
        let cmd = validate_register(cmd)?;
        let password_hash = bcrypt::hash(&cmd.password, self.password_cost)?;

        with_tx!(self, |db_tx| {
            let taken_username = users::Entity::find()
                .filter(users::Column::Username.eq(cmd.username.as_str()))
                .one(&db_tx)
                .await?;
            if taken_username.is_some() {
                return Err(EngineError::ExistingKey(cmd.username));
            }
            let taken_email = users::Entity::find()
                .filter(users::Column::Email.eq(cmd.email.as_str()))
                .one(&db_tx)
                .await?;
            if taken_email.is_some() {
                return Err(EngineError::ExistingKey(cmd.email));
            }

            let now = Utc::now();
            let model = users::ActiveModel {
                id: ActiveValue::Set(Uuid::new_v4()),
                username: ActiveValue::Set(cmd.username),
                email: ActiveValue::Set(cmd.email),
                password_hash: ActiveValue::Set(password_hash),
                created_at: ActiveValue::Set(now),
                updated_at: ActiveValue::Set(now),
            }
            .insert(&db_tx)
            .await?;
            tracing::info!(user = %model.id, username = %model.username, "user registered");
            Ok(User::from(model))
        })
    }

    /// Checks a username/password pair.
    ///
    /// An unknown user and a wrong password both yield
    /// [`EngineError::InvalidCredentials`].
    pub async fn verify_credentials(&self, username: &str, password: &str) -> ResultEngine<User> {
        let model = users::Entity::find()
            .filter(users::Column::Username.eq(username.trim()))
            .one(&self.database)
            .await?
            .ok_or(EngineError::InvalidCredentials)?;

        if !bcrypt::verify(password, &model.password_hash)? {
            tracing::debug!(user = %model.id, "password mismatch");
            return Err(EngineError::InvalidCredentials);
        }
        Ok(User::from(model))
    }

    pub async fn user_profile(&self, user_id: Uuid) -> ResultEngine<User> {
        self.require_user_exists(&self.database, user_id)
            .await
            .map(User::from)
    }
}
