//! Локализованные строки бота
//!
//! Ключи совпадают с ключами панели администратора. Неизвестный язык
//! заменяется языком по умолчанию, неизвестный ключ возвращается как есть.

pub const DEFAULT_LOCALE: &str = "ru";
pub const SUPPORTED_LOCALES: &[&str] = &["ru", "uz"];

pub const REGISTRATION_WELCOME: &str = "registration.request.welcome";
pub const REGISTRATION_PHONE_NUMBER: &str = "registration.request.phone_number";
pub const REGISTRATION_SUCCESSFUL: &str = "welcome.registration_successfully";
pub const MAIN_MENU: &str = "main_menu";
pub const MAIN_MENU_CATALOG: &str = "main_menu.catalog";
pub const CATALOG_CHOOSE_CATEGORY: &str = "catalog.choose_category";
pub const CATALOG_EMPTY: &str = "catalog.empty";
pub const CATALOG_CATEGORY_EMPTY: &str = "catalog.category_empty";
pub const SEND_PHONE_NUMBER: &str = "send_phone_number";
pub const GO_BACK: &str = "go_back";
pub const CURRENCY_SUM: &str = "currency.sum";

const RU: &[(&str, &str)] = &[
    (
        REGISTRATION_WELCOME,
        "Здравствуйте! Давайте познакомимся. Как вас зовут?",
    ),
    (
        REGISTRATION_PHONE_NUMBER,
        "Отправьте свой номер телефона кнопкой ниже или введите его в формате <b>+998 XX XXX XX XX</b>",
    ),
    (
        REGISTRATION_SUCCESSFUL,
        "Регистрация прошла успешно! Добро пожаловать 🎉",
    ),
    (MAIN_MENU, "Главное меню"),
    (MAIN_MENU_CATALOG, "🍽 Меню"),
    (CATALOG_CHOOSE_CATEGORY, "Выберите категорию"),
    (CATALOG_EMPTY, "Меню пока пустое"),
    (CATALOG_CATEGORY_EMPTY, "В этой категории пока нет блюд"),
    (SEND_PHONE_NUMBER, "📱 Отправить номер"),
    (GO_BACK, "⬅️ Назад"),
    (CURRENCY_SUM, "сум"),
];

const UZ: &[(&str, &str)] = &[
    (
        REGISTRATION_WELCOME,
        "Assalomu alaykum! Keling, tanishib olamiz. Ismingiz nima?",
    ),
    (
        REGISTRATION_PHONE_NUMBER,
        "Telefon raqamingizni quyidagi tugma orqali yuboring yoki <b>+998 XX XXX XX XX</b> formatida kiriting",
    ),
    (
        REGISTRATION_SUCCESSFUL,
        "Ro'yxatdan muvaffaqiyatli o'tdingiz! Xush kelibsiz 🎉",
    ),
    (MAIN_MENU, "Asosiy menyu"),
    (MAIN_MENU_CATALOG, "🍽 Menyu"),
    (CATALOG_CHOOSE_CATEGORY, "Kategoriyani tanlang"),
    (CATALOG_EMPTY, "Menyu hozircha bo'sh"),
    (CATALOG_CATEGORY_EMPTY, "Bu kategoriyada hozircha taomlar yo'q"),
    (SEND_PHONE_NUMBER, "📱 Raqamni yuborish"),
    (GO_BACK, "⬅️ Orqaga"),
    (CURRENCY_SUM, "so'm"),
];

/// Приводит произвольный тег языка к поддерживаемому
pub fn normalize_locale(locale: &str) -> &'static str {
    let primary = locale.split(['-', '_']).next().unwrap_or_default();
    SUPPORTED_LOCALES
        .iter()
        .find(|l| l.eq_ignore_ascii_case(primary))
        .copied()
        .unwrap_or(DEFAULT_LOCALE)
}

/// Возвращает строку по ключу для указанного языка
pub fn get_string<'a>(key: &'a str, locale: &str) -> &'a str {
    let table = match normalize_locale(locale) {
        "uz" => UZ,
        _ => RU,
    };
    table
        .iter()
        .find(|(k, _)| *k == key)
        .map(|(_, v)| *v)
        .unwrap_or(key)
}
