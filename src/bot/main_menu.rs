use std::sync::Arc;

use anyhow::Result;
use teloxide::prelude::*;

use crate::{
    AppError,
    models::Dish,
    resources::{
        CATALOG_CATEGORY_EMPTY, CATALOG_CHOOSE_CATEGORY, CATALOG_EMPTY, CURRENCY_SUM, GO_BACK,
        MAIN_MENU, MAIN_MENU_CATALOG, SUPPORTED_LOCALES, get_string,
    },
    services::{CatalogService, UsersService},
};

use super::keyboards::{categories_keyboard, main_menu_keyboard};

/// Отправляет главное меню; `header` заменяет стандартный заголовок
pub(crate) async fn send_main_menu(
    bot: &Bot,
    chat_id: ChatId,
    locale: &str,
    header: Option<&str>,
) -> Result<()> {
    let text = get_string(header.unwrap_or(MAIN_MENU), locale);
    bot.send_message(chat_id, text)
        .reply_markup(main_menu_keyboard(locale))
        .await?;
    Ok(())
}

fn is_button(text: &str, key: &str) -> bool {
    SUPPORTED_LOCALES
        .iter()
        .any(|locale| get_string(key, locale) == text)
}

/// Сообщения зарегистрированных пользователей вне диалога регистрации
pub(super) async fn messages_handler(
    bot: Bot,
    msg: Message,
    users_service: Arc<UsersService>,
    catalog_service: Arc<CatalogService>,
) -> Result<()> {
    let (Some(user), Some(text)) = (&msg.from, msg.text()) else {
        return Ok(());
    };
    let Some(account) = users_service.find_by_telegram_id(user.id.0).await? else {
        tracing::debug!("message from unregistered user {}", user.id.0);
        return Ok(());
    };
    let locale = account.language.as_str();

    if is_button(text, GO_BACK) {
        return send_main_menu(&bot, msg.chat.id, locale, None).await;
    }
    if is_button(text, MAIN_MENU_CATALOG) {
        let categories = catalog_service.list_top_level_categories(true).await?;
        let text = if categories.is_empty() {
            CATALOG_EMPTY
        } else {
            CATALOG_CHOOSE_CATEGORY
        };
        bot.send_message(msg.chat.id, get_string(text, locale))
            .reply_markup(categories_keyboard(&categories, locale))
            .await?;
        return Ok(());
    }

    match catalog_service
        .get_dishes_by_category_name(text, locale, true, false)
        .await
    {
        Ok(dishes) if dishes.is_empty() => {
            bot.send_message(msg.chat.id, get_string(CATALOG_CATEGORY_EMPTY, locale))
                .await?;
        }
        Ok(dishes) => {
            bot.send_message(msg.chat.id, dishes_text(&dishes, locale))
                .await?;
        }
        Err(AppError::CategoryNotFound(_)) => {
            send_main_menu(&bot, msg.chat.id, locale, None).await?;
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}

fn format_price(price: f64) -> String {
    if price.fract() == 0.0 {
        format!("{}", price as i64)
    } else {
        format!("{price:.2}")
    }
}

fn dishes_text(dishes: &[Dish], locale: &str) -> String {
    let currency = get_string(CURRENCY_SUM, locale);
    dishes
        .iter()
        .map(|d| format!("{}: {} {currency}", d.name, format_price(d.price)))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dish(name: &str, price: f64) -> Dish {
        Dish {
            id: 1,
            name: name.to_string(),
            description: String::new(),
            price,
            quantity: 0,
            category_id: 1,
            is_hidden: false,
            number: 0,
            image_path: None,
            image_id: None,
            show_usd: false,
        }
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(25000.0), "25000");
        assert_eq!(format_price(12.5), "12.50");
    }

    #[test]
    fn test_dishes_text() {
        let text = dishes_text(&[dish("Plov", 25000.0), dish("Tea", 3000.0)], "uz");
        assert_eq!(text, "Plov: 25000 so'm\nTea: 3000 so'm");
    }

    #[test]
    fn test_is_button_any_locale() {
        assert!(is_button("🍽 Меню", MAIN_MENU_CATALOG));
        assert!(is_button("🍽 Menyu", MAIN_MENU_CATALOG));
        assert!(!is_button("Soups", MAIN_MENU_CATALOG));
    }
}
