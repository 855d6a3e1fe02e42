//! Диалог регистрации покупателя
//!
//! Состояние диалога хранится в хранилище диспетчера для каждого чата,
//! а переходы вычисляет чистая функция [`advance`].

use std::sync::Arc;

use anyhow::Result;
use teloxide::{prelude::*, types::ParseMode};

use crate::{
    AppError,
    models::{User, match_phone_number},
    resources::{
        REGISTRATION_PHONE_NUMBER, REGISTRATION_SUCCESSFUL, REGISTRATION_WELCOME, get_string,
        normalize_locale,
    },
    services::UsersService,
};

use super::{DefaultLocale, RegistrationDialogue, keyboards, main_menu::send_main_menu};

const START_COMMAND: &str = "/start";

/// Состояние регистрации в чате
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum RegistrationState {
    /// Регистрация не начата
    #[default]
    AwaitingStart,
    AwaitingName {
        locale: String,
    },
    AwaitingPhone {
        locale: String,
        name: String,
    },
}

impl RegistrationState {
    pub fn is_in_progress(&self) -> bool {
        !matches!(self, Self::AwaitingStart)
    }

    pub fn locale(&self) -> Option<&str> {
        match self {
            Self::AwaitingStart => None,
            Self::AwaitingName { locale } | Self::AwaitingPhone { locale, .. } => Some(locale),
        }
    }
}

/// Содержимое входящего сообщения, важное для регистрации
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RegistrationInput {
    pub text: Option<String>,
    /// Номер из присланного контакта
    pub contact_phone: Option<String>,
}

impl RegistrationInput {
    pub fn text(text: &str) -> Self {
        Self {
            text: Some(text.to_string()),
            contact_phone: None,
        }
    }

    pub fn contact(phone_number: &str) -> Self {
        Self {
            text: None,
            contact_phone: Some(phone_number.to_string()),
        }
    }

    fn from_message(msg: &Message) -> Self {
        Self {
            text: msg.text().map(str::to_string),
            contact_phone: msg.contact().map(|c| c.phone_number.clone()),
        }
    }

    fn is_start_command(&self) -> bool {
        self.text.as_deref().map(str::trim) == Some(START_COMMAND)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Prompt {
    Welcome,
    PhoneNumber,
}

/// Данные завершенной регистрации
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Registration {
    pub locale: String,
    pub name: String,
    pub phone_number: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// Сообщение не относится к регистрации
    Ignore,
    /// Начать регистрацию заново, с проверкой существующего аккаунта
    Restart,
    /// Повторить подсказку, состояние не меняется
    Stay(Prompt),
    Next(RegistrationState, Prompt),
    Complete(Registration),
}

/// Первое состояние регистрации и подсказка к нему
pub fn begin(locale: &str) -> (RegistrationState, Prompt) {
    let state = RegistrationState::AwaitingName {
        locale: locale.to_string(),
    };
    (state, Prompt::Welcome)
}

/// Куда попадает пользователь после `/start`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    /// Аккаунт уже есть, регистрация не нужна
    MainMenu { locale: String },
    Begin(RegistrationState, Prompt),
}

/// Выбирает начало диалога по найденному аккаунту
///
/// `locale` используется только для новой регистрации, главное меню
/// показывается на языке, сохраненном при регистрации.
pub fn entry(existing: Option<&User>, locale: &str) -> Entry {
    match existing {
        Some(user) => Entry::MainMenu {
            locale: user.language.clone(),
        },
        None => {
            let (state, prompt) = begin(locale);
            Entry::Begin(state, prompt)
        }
    }
}

/// Вычисляет переход диалога по входящему сообщению
pub fn advance(state: &RegistrationState, input: &RegistrationInput) -> Transition {
    match state {
        RegistrationState::AwaitingStart if input.is_start_command() => Transition::Restart,
        RegistrationState::AwaitingStart => Transition::Ignore,
        RegistrationState::AwaitingName { locale } => {
            if input.is_start_command() {
                return Transition::Restart;
            }
            match input.text.as_deref().map(str::trim) {
                Some(name) if !name.is_empty() => Transition::Next(
                    RegistrationState::AwaitingPhone {
                        locale: locale.clone(),
                        name: name.to_string(),
                    },
                    Prompt::PhoneNumber,
                ),
                _ => Transition::Stay(Prompt::Welcome),
            }
        }
        RegistrationState::AwaitingPhone { locale, name } => {
            let complete = |phone_number: &str| {
                Transition::Complete(Registration {
                    locale: locale.clone(),
                    name: name.clone(),
                    phone_number: phone_number.to_string(),
                })
            };
            if let Some(phone_number) = &input.contact_phone {
                return complete(phone_number);
            }
            if input.is_start_command() {
                return Transition::Restart;
            }
            match input.text.as_deref().and_then(match_phone_number) {
                Some(phone_number) => complete(phone_number),
                None => Transition::Stay(Prompt::PhoneNumber),
            }
        }
    }
}

/// Обработчик `/start` в личном чате
///
/// Зарегистрированный пользователь сразу попадает в главное меню,
/// остальные начинают регистрацию.
pub(super) async fn start_handler(
    bot: Bot,
    dialogue: RegistrationDialogue,
    msg: Message,
    users_service: Arc<UsersService>,
    default_locale: DefaultLocale,
) -> Result<()> {
    let Some(user) = &msg.from else {
        return Ok(());
    };
    let existing = users_service.find_by_telegram_id(user.id.0).await?;
    let locale = user
        .language_code
        .as_deref()
        .map(normalize_locale)
        .unwrap_or(default_locale.as_str());
    match entry(existing.as_ref(), locale) {
        Entry::MainMenu { locale } => {
            dialogue.exit().await?;
            send_main_menu(&bot, msg.chat.id, &locale, None).await?;
        }
        Entry::Begin(state, prompt) => {
            tracing::debug!("chat {} starts registration", msg.chat.id.0);
            send_prompt(&bot, msg.chat.id, prompt, locale).await?;
            dialogue.update(state).await?;
        }
    }
    Ok(())
}

/// Обработчик сообщений чата, в котором идет регистрация
pub(super) async fn registration_handler(
    bot: Bot,
    dialogue: RegistrationDialogue,
    msg: Message,
    state: RegistrationState,
    users_service: Arc<UsersService>,
    default_locale: DefaultLocale,
) -> Result<()> {
    let input = RegistrationInput::from_message(&msg);
    match advance(&state, &input) {
        Transition::Ignore => {}
        Transition::Restart => {
            dialogue.exit().await?;
            start_handler(bot, dialogue, msg, users_service, default_locale).await?;
        }
        Transition::Stay(prompt) => {
            let locale = state.locale().unwrap_or(default_locale.as_str());
            send_prompt(&bot, msg.chat.id, prompt, locale).await?;
        }
        Transition::Next(next, prompt) => {
            let locale = next.locale().unwrap_or(default_locale.as_str());
            send_prompt(&bot, msg.chat.id, prompt, locale).await?;
            dialogue.update(next).await?;
        }
        Transition::Complete(registration) => {
            let Some(user) = &msg.from else {
                return Ok(());
            };
            let result = users_service
                .register(
                    user.id.0,
                    user.username.clone(),
                    &registration.name,
                    &registration.phone_number,
                    &registration.locale,
                )
                .await;
            match result {
                Ok(_) => {}
                Err(AppError::EntryAlreadyExists) => {
                    tracing::warn!("user {} is already registered", user.id.0)
                }
                Err(e) => return Err(e.into()),
            }
            dialogue.exit().await?;
            send_main_menu(
                &bot,
                msg.chat.id,
                &registration.locale,
                Some(REGISTRATION_SUCCESSFUL),
            )
            .await?;
        }
    }
    Ok(())
}

async fn send_prompt(bot: &Bot, chat_id: ChatId, prompt: Prompt, locale: &str) -> Result<()> {
    match prompt {
        Prompt::Welcome => {
            bot.send_message(chat_id, get_string(REGISTRATION_WELCOME, locale))
                .reply_markup(keyboards::remove())
                .await?;
        }
        Prompt::PhoneNumber => {
            bot.send_message(chat_id, get_string(REGISTRATION_PHONE_NUMBER, locale))
                .parse_mode(ParseMode::Html)
                .reply_markup(keyboards::phone_number_keyboard(locale, false))
                .await?;
        }
    }
    Ok(())
}
