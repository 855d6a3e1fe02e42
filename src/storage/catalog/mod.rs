mod pg_catalog_repository;
use async_trait::async_trait;
use derive_builder::Builder;
use serde::{Deserialize, Serialize};

use crate::{
    AppResult,
    models::{CartItem, Dish, DishCategory, NewCategory, NewDish},
};

/// Порядок выдачи категорий
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum CategoryOrder {
    /// Порядок хранения (по идентификатору)
    #[default]
    Storage,
    /// По ключу ручной сортировки
    Number,
    /// По названию
    Name,
}

/// Порядок выдачи блюд
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum DishOrder {
    #[default]
    Storage,
    Number,
    Description,
}

/// Способ сравнения названия блюда при поиске
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NameMatch {
    /// Название совпадает целиком
    Exact,
    /// Искомая строка является началом названия
    Prefix,
}

/// Фильтр для выборки блюд
#[derive(Debug, Clone, Default, PartialEq, Builder, Serialize, Deserialize)]
#[builder(default)]
pub struct DishesFilter {
    #[builder(setter(strip_option))]
    category_id: Option<i32>,
    include_hidden: bool,
    order: DishOrder,
}

impl DishesFilter {
    pub fn builder() -> DishesFilterBuilder {
        DishesFilterBuilder::default()
    }
    pub fn category_id(&self) -> Option<i32> {
        self.category_id
    }
    pub fn include_hidden(&self) -> bool {
        self.include_hidden
    }
    pub fn order(&self) -> DishOrder {
        self.order
    }
}

#[async_trait]
pub trait CategoriesRepository: Send + Sync {
    async fn create_category(&self, category: NewCategory) -> AppResult<DishCategory>;
    async fn get_category(&self, id: i32) -> AppResult<DishCategory>;
    async fn list_categories(
        &self,
        top_level_only: bool,
        order: CategoryOrder,
    ) -> AppResult<Vec<DishCategory>>;
    /// `parent_id = None` ищет по всем уровням дерева
    async fn find_category_by_name(
        &self,
        name: &str,
        parent_id: Option<i32>,
    ) -> AppResult<Option<DishCategory>>;
    async fn update_category(&self, category: DishCategory) -> AppResult<DishCategory>;
    async fn delete_category(&self, id: i32) -> AppResult<DishCategory>;
}

#[async_trait]
pub trait DishesRepository: Send + Sync {
    async fn create_dish(&self, dish: NewDish) -> AppResult<Dish>;
    async fn get_dish(&self, id: i32) -> AppResult<Dish>;
    async fn list_dishes(&self, filter: DishesFilter) -> AppResult<Vec<Dish>>;
    /// Возвращает первое подходящее блюдо по возрастанию идентификатора
    async fn find_dish_by_name(
        &self,
        name: &str,
        matching: NameMatch,
        category_id: Option<i32>,
    ) -> AppResult<Option<Dish>>;
    async fn update_dish(&self, dish: Dish) -> AppResult<Dish>;
    /// Удаляет блюдо вместе со всеми позициями корзины, которые на него ссылаются
    async fn delete_dish(&self, id: i32) -> AppResult<Dish>;
}

#[async_trait]
pub trait CartItemsRepository: Send + Sync {
    async fn list_cart_items_by_dish(&self, dish_id: i32) -> AppResult<Vec<CartItem>>;
}

/// Все репозитории, нужные каталогу
pub trait CatalogRepository: CategoriesRepository + DishesRepository + CartItemsRepository {}

impl<T> CatalogRepository for T where T: CategoriesRepository + DishesRepository + CartItemsRepository
{}
