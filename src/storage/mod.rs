//! Модуль для работы с базами данных
//!
//! Этот модуль содержит трейты репозиториев и их реализацию для PostgreSQL
mod catalog;
pub use catalog::{
    CartItemsRepository, CatalogRepository, CategoriesRepository, CategoryOrder, DishOrder,
    DishesFilter, DishesFilterBuilder, DishesFilterBuilderError, DishesRepository, NameMatch,
};
mod users;
pub use users::UsersRepository;
mod pg_storage;
pub use pg_storage::PgStorage;
#[cfg(test)]
pub(crate) mod test_storage;
