use std::sync::Arc;

use tracing::instrument;

use crate::{
    AppError, AppResult,
    models::{NewUser, User},
    storage::UsersRepository,
};

/// Сервис для работы с пользователями бота
///
/// Регистрирует покупателей и находит их по идентификатору Telegram.
#[derive(Clone)]
pub struct UsersService {
    pub storage: Arc<dyn UsersRepository>,
}
impl UsersService {
    pub fn new(storage: Arc<dyn UsersRepository>) -> Self {
        Self { storage }
    }
    /// Находит пользователя по идентификатору Telegram
    ///
    /// # Возвращает
    ///
    /// * `Ok(Some(User))` - пользователь уже зарегистрирован
    /// * `Ok(None)` - пользователь еще не проходил регистрацию
    #[instrument(name = "find user by telegram id", skip(self))]
    pub async fn find_by_telegram_id(&self, telegram_id: u64) -> AppResult<Option<User>> {
        let Ok(telegram_id) = i64::try_from(telegram_id) else {
            return Ok(None);
        };
        match self.storage.get_by_telegram_id(telegram_id).await {
            Ok(user) => Ok(Some(user)),
            Err(AppError::EntryNotFound) => Ok(None),
            Err(e) => Err(e),
        }
    }
    /// Регистрирует нового пользователя
    ///
    /// # Ошибки
    ///
    /// * `AppError::ValidationErrors` - пустое имя или номер без цифр
    /// * `AppError::EntryAlreadyExists` - пользователь уже зарегистрирован
    #[instrument(name = "register user", skip(self, username, name, phone_number))]
    pub async fn register(
        &self,
        telegram_id: u64,
        username: Option<String>,
        name: &str,
        phone_number: &str,
        language: &str,
    ) -> AppResult<User> {
        let new_user = NewUser::try_new(telegram_id, username, name, phone_number, language)?;
        let user = self.storage.create(new_user).await?;
        tracing::info!("registered user {}", user.id);
        Ok(user)
    }
}
