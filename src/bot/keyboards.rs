use teloxide::types::{ButtonRequest, KeyboardButton, KeyboardMarkup, KeyboardRemove};

use crate::{
    models::DishCategory,
    resources::{GO_BACK, MAIN_MENU, MAIN_MENU_CATALOG, SEND_PHONE_NUMBER, get_string},
};

pub(crate) fn remove() -> KeyboardRemove {
    KeyboardRemove::new()
}

pub(crate) fn main_menu_keyboard(locale: &str) -> KeyboardMarkup {
    let catalog_button = KeyboardButton::new(get_string(MAIN_MENU_CATALOG, locale));
    KeyboardMarkup::default()
        .append_row(vec![catalog_button])
        .resize_keyboard()
        .persistent()
}

fn go_back_keyboard(locale: &str) -> KeyboardMarkup {
    let back_button = KeyboardButton::new(get_string(GO_BACK, locale));
    KeyboardMarkup::default()
        .append_row(vec![back_button])
        .resize_keyboard()
}

/// Клавиатура по ключу ресурса: `main_menu` или `go_back`
pub fn get_keyboard(name: &str, locale: &str) -> Option<KeyboardMarkup> {
    match name {
        MAIN_MENU => Some(main_menu_keyboard(locale)),
        GO_BACK => Some(go_back_keyboard(locale)),
        _ => None,
    }
}

/// Кнопка отправки контакта и, при `go_back`, кнопка возврата
pub fn phone_number_keyboard(locale: &str, go_back: bool) -> KeyboardMarkup {
    let phone_button =
        KeyboardButton::new(get_string(SEND_PHONE_NUMBER, locale)).request(ButtonRequest::Contact);
    let mut keyboard = KeyboardMarkup::default().append_row(vec![phone_button]);
    if go_back {
        keyboard = keyboard.append_row(vec![KeyboardButton::new(get_string(GO_BACK, locale))]);
    }
    keyboard.resize_keyboard()
}

/// Категории по две в ряд и кнопка возврата в главное меню
pub(crate) fn categories_keyboard(categories: &[DishCategory], locale: &str) -> KeyboardMarkup {
    let mut keyboard = KeyboardMarkup::default();
    for pair in categories.chunks(2) {
        let row = pair
            .iter()
            .map(|c| KeyboardButton::new(c.name.clone()))
            .collect::<Vec<_>>();
        keyboard = keyboard.append_row(row);
    }
    keyboard
        .append_row(vec![KeyboardButton::new(get_string(GO_BACK, locale))])
        .resize_keyboard()
}
