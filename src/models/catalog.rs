//! Модели каталога: категории блюд, блюда и позиции корзины

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Категория блюд
///
/// Категории образуют дерево через `parent_id`; на практике глубина
/// не превышает четырех уровней.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct DishCategory {
    pub id: i32,
    pub name: String,
    pub parent_id: Option<i32>,
    pub image_path: Option<String>,
    /// Идентификатор изображения, уже загруженного в Telegram
    pub image_id: Option<String>,
    /// Ключ ручной сортировки
    pub number: i32,
}

/// Блюдо
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, sqlx::FromRow)]
pub struct Dish {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: f64,
    /// `0` означает "количество не указано"
    pub quantity: i32,
    pub category_id: i32,
    pub is_hidden: bool,
    pub number: i32,
    pub image_path: Option<String>,
    pub image_id: Option<String>,
    pub show_usd: bool,
}

/// Позиция корзины, ссылающаяся на блюдо
///
/// Корзина и заказы живут за пределами каталога, здесь позиции
/// нужны только для каскадного удаления вместе с блюдом.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, sqlx::FromRow)]
pub struct CartItem {
    pub id: i32,
    pub cart_id: i32,
    pub dish_id: i32,
    pub count: i32,
}

/// Новая категория для сохранения в хранилище
#[derive(Debug, Clone, PartialEq)]
pub struct NewCategory {
    pub name: String,
    pub parent_id: Option<i32>,
    pub image_path: Option<String>,
}

/// Поля блюда, которые задает администратор или импорт
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Validate)]
pub struct DishForm {
    #[validate(length(min = 1, message = "Название блюда не может быть пустым"))]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[validate(range(min = 0.0), custom(function = "validate_price"))]
    pub price: f64,
    /// Пустое значение сохраняется как `0`
    #[serde(default)]
    pub quantity: Option<i32>,
    pub category_id: i32,
    #[serde(default)]
    pub show_usd: bool,
}

impl DishForm {
    pub fn quantity_or_default(&self) -> i32 {
        self.quantity.unwrap_or(0)
    }
}

fn validate_price(price: f64) -> Result<(), ValidationError> {
    // range пропускает NaN и бесконечность
    if price.is_finite() {
        Ok(())
    } else {
        let mut error = ValidationError::new("price");
        error.message = Some("Цена должна быть конечным числом".into());
        Err(error)
    }
}

/// Новое блюдо для сохранения в хранилище
#[derive(Debug, Clone, PartialEq)]
pub struct NewDish {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub quantity: i32,
    pub category_id: i32,
    pub image_path: Option<String>,
    pub show_usd: bool,
}

/// Источник изображения для блюда или категории
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImageSource {
    /// Файл уже лежит в каталоге загрузок, известно только его имя
    AlreadyStored(String),
    /// Свежая загрузка, которую нужно записать на диск
    FreshUpload { filename: String, bytes: Bytes },
}

impl ImageSource {
    pub fn filename(&self) -> &str {
        match self {
            Self::AlreadyStored(filename) => filename,
            Self::FreshUpload { filename, .. } => filename,
        }
    }

    /// Пустое имя файла означает, что изображение не передано
    pub fn is_empty(&self) -> bool {
        self.filename().trim().is_empty()
    }
}

/// Нормализует ссылку на родительскую категорию: `0` означает "нет родителя"
pub fn parent_from_sentinel(parent_id: Option<i32>) -> Option<i32> {
    parent_id.filter(|id| *id != 0)
}
