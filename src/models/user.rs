//! Модуль для работы с пользователями бота
//!
//! Пользователь создается один раз по завершении регистрации
//! и в рамках этой системы больше не изменяется.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::{Validate, ValidationError};

use crate::{AppError, AppResult};

/// Шаблон номера телефона: необязательный `+`, код страны `998`,
/// затем группы из 2-3-2-2 цифр, между которыми допускаются пробелы.
pub const PHONE_NUMBER_PATTERN: &str = r"^\+?998\s*\d{2}\s*\d{3}\s*\d{2}\s*\d{2}$";

static PHONE_NUMBER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(PHONE_NUMBER_PATTERN).expect("phone number pattern is valid"));

/// Возвращает совпавший номер телефона без изменений,
/// если текст целиком соответствует [`PHONE_NUMBER_PATTERN`].
pub fn match_phone_number(text: &str) -> Option<&str> {
    PHONE_NUMBER_RE.find(text).map(|m| m.as_str())
}

/// Зарегистрированный пользователь бота
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct User {
    /// Внутренний идентификатор
    pub id: i32,

    /// Идентификатор пользователя в Telegram
    pub telegram_id: i64,

    /// Имя пользователя в Telegram (@handle), если задано
    pub username: Option<String>,

    /// Имя, введенное при регистрации
    pub name: String,

    /// Номер телефона в том виде, в каком его прислал пользователь
    pub phone_number: String,

    /// Язык интерфейса
    pub language: String,

    /// Дата и время регистрации
    pub created: chrono::NaiveDateTime,
}

/// Данные для регистрации нового пользователя
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Validate)]
pub struct NewUser {
    pub telegram_id: i64,
    pub username: Option<String>,

    #[validate(length(min = 1, message = "Имя не может быть пустым"))]
    pub name: String,

    #[validate(custom(function = "validate_phone_number"))]
    pub phone_number: String,

    #[validate(length(min = 2, max = 8))]
    pub language: String,
}

impl NewUser {
    /// Создает `NewUser` с валидацией входных данных
    ///
    /// Идентификатор Telegram приходит как `u64`, а хранится как `BIGINT`,
    /// поэтому слишком большие значения отклоняются.
    ///
    /// # Ошибки
    ///
    /// * `AppError::InvalidInput` - идентификатор не помещается в `i64`
    /// * `AppError::ValidationErrors` - пустое имя, неверный телефон или язык
    #[instrument(name = "try new user", skip(username, name))]
    pub fn try_new(
        telegram_id: u64,
        username: Option<String>,
        name: &str,
        phone_number: &str,
        language: &str,
    ) -> AppResult<Self> {
        let telegram_id = i64::try_from(telegram_id)
            .map_err(|e| AppError::InvalidInput(format!("telegram id {telegram_id}: {e}")))?;
        let res = Self {
            telegram_id,
            username,
            name: name.to_string(),
            phone_number: phone_number.to_string(),
            language: language.to_string(),
        };
        res.validate()?;
        Ok(res)
    }
}

fn validate_phone_number(phone_number: &str) -> Result<(), ValidationError> {
    // номер из контакта Telegram приходит в произвольном формате
    if phone_number.chars().any(|c| c.is_ascii_digit()) {
        Ok(())
    } else {
        let mut error = ValidationError::new("phone_number");
        error.message = Some("Номер телефона должен содержать цифры".into());
        Err(error)
    }
}
