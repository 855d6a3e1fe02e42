//! Репозиторий пользователей для PostgreSQL

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    AppError, AppResult,
    models::{NewUser, User},
    storage::{PgStorage, UsersRepository},
};

#[async_trait]
impl UsersRepository for PgStorage {
    /// Создает нового пользователя в базе данных
    ///
    /// # Ошибки
    ///
    /// * `AppError::EntryAlreadyExists` - пользователь с таким Telegram id уже есть
    #[instrument(name = "create user", skip_all, fields(telegram_id = new_user.telegram_id))]
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let created = sqlx::query_as::<_, User>(
            r#"
			INSERT INTO users (telegram_id, username, name, phone_number, language)
			VALUES ($1, $2, $3, $4, $5)
			RETURNING *;
			"#,
        )
        .bind(new_user.telegram_id)
        .bind(&new_user.username)
        .bind(&new_user.name)
        .bind(&new_user.phone_number)
        .bind(&new_user.language)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| match e {
            sqlx::Error::Database(ref db_err) if db_err.is_unique_violation() => {
                AppError::EntryAlreadyExists
            }
            e => AppError::DatabaseInternalError(e),
        })?;
        Ok(created)
    }

    /// Получает пользователя по идентификатору Telegram
    #[instrument(name = "get user by telegram id", skip(self))]
    async fn get_by_telegram_id(&self, telegram_id: i64) -> AppResult<User> {
        let user = sqlx::query_as::<_, User>(
            r#"
			SELECT * FROM users WHERE telegram_id = $1;
			"#,
        )
        .bind(telegram_id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::EntryNotFound)?;
        Ok(user)
    }
}
