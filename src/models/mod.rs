//! Модуль моделей данных
//!
//! Этот модуль содержит структуры пользователей и каталога

mod catalog;
mod user;
pub use catalog::{
    CartItem, Dish, DishCategory, DishForm, ImageSource, NewCategory, NewDish,
    parent_from_sentinel,
};
pub use user::{NewUser, PHONE_NUMBER_PATTERN, User, match_phone_number};
