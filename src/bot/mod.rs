//! Telegram-бот: регистрация покупателей и просмотр меню

use std::sync::Arc;

use teloxide::{
    dispatching::{
        UpdateFilterExt, UpdateHandler,
        dialogue::{self, InMemStorage},
    },
    prelude::*,
};

use crate::{
    resources::normalize_locale,
    services::{CatalogService, UsersService},
};

mod commands;
mod keyboards;
mod main_menu;
pub mod registration;

pub use keyboards::{get_keyboard, phone_number_keyboard};
pub use registration::{RegistrationState, Transition, advance};

pub(crate) type RegistrationDialogue =
    Dialogue<RegistrationState, InMemStorage<RegistrationState>>;

/// Язык по умолчанию для пользователей без известного языка
#[derive(Debug, Clone)]
pub struct DefaultLocale(&'static str);

impl DefaultLocale {
    pub fn new(locale: &str) -> Self {
        Self(normalize_locale(locale))
    }

    pub fn as_str(&self) -> &'static str {
        self.0
    }
}

/// Маршруты бота
///
/// Сообщения чата с незавершенной регистрацией обрабатывает диалог,
/// затем проверяются команды, остальное уходит в главное меню.
pub fn router() -> UpdateHandler<anyhow::Error> {
    dialogue::enter::<Update, InMemStorage<RegistrationState>, RegistrationState, _>().branch(
        Update::filter_message()
            .branch(
                dptree::filter(|state: RegistrationState| state.is_in_progress())
                    .endpoint(registration::registration_handler),
            )
            .branch(commands::commands_handler())
            .branch(dptree::endpoint(main_menu::messages_handler)),
    )
}

/// Запускает диспетчер и ждет его остановки по Ctrl+C
pub async fn run(
    bot: Bot,
    users_service: Arc<UsersService>,
    catalog_service: Arc<CatalogService>,
    default_locale: DefaultLocale,
) {
    tracing::info!("Starting bot...");
    Dispatcher::builder(bot, router())
        .dependencies(dptree::deps![
            users_service,
            catalog_service,
            default_locale,
            InMemStorage::<RegistrationState>::new()
        ])
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;
}
