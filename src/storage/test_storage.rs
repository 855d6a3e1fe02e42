//! Тестовое хранилище в памяти
//!
//! Используется для изоляции тестов сервисов и бота от реальной базы данных.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use crate::{
    AppError, AppResult,
    models::{CartItem, Dish, DishCategory, NewCategory, NewDish, NewUser, User},
    storage::{
        CartItemsRepository, CategoriesRepository, CategoryOrder, DishOrder, DishesFilter,
        DishesRepository, NameMatch, UsersRepository,
    },
};

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    categories: Vec<DishCategory>,
    dishes: Vec<Dish>,
    cart_items: Vec<CartItem>,
    next_id: i32,
}

impl Tables {
    fn next_id(&mut self) -> i32 {
        self.next_id += 1;
        self.next_id
    }

    /// Повторяет внешний ключ на `dish_categories`
    fn ensure_category(&self, id: i32) -> AppResult<()> {
        if self.categories.iter().any(|c| c.id == id) {
            Ok(())
        } else {
            Err(AppError::InvalidInput(format!("category {id} does not exist")))
        }
    }

    fn remove_category_tree(&mut self, id: i32) {
        let children: Vec<i32> = self
            .categories
            .iter()
            .filter(|c| c.parent_id == Some(id))
            .map(|c| c.id)
            .collect();
        for child in children {
            self.remove_category_tree(child);
        }
        let dish_ids: Vec<i32> = self
            .dishes
            .iter()
            .filter(|d| d.category_id == id)
            .map(|d| d.id)
            .collect();
        self.cart_items.retain(|i| !dish_ids.contains(&i.dish_id));
        self.dishes.retain(|d| d.category_id != id);
        self.categories.retain(|c| c.id != id);
    }
}

#[derive(Clone, Default)]
pub(crate) struct TestStorage {
    tables: Arc<Mutex<Tables>>,
}

impl TestStorage {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn add_cart_item(&self, cart_id: i32, dish_id: i32, count: i32) -> CartItem {
        let mut tables = self.tables.lock().unwrap();
        let item = CartItem {
            id: tables.next_id(),
            cart_id,
            dish_id,
            count,
        };
        tables.cart_items.push(item.clone());
        item
    }

    pub(crate) fn categories(&self) -> Vec<DishCategory> {
        self.tables.lock().unwrap().categories.clone()
    }

    pub(crate) fn dishes(&self) -> Vec<Dish> {
        self.tables.lock().unwrap().dishes.clone()
    }

    pub(crate) fn users(&self) -> Vec<User> {
        self.tables.lock().unwrap().users.clone()
    }
}

#[async_trait]
impl UsersRepository for TestStorage {
    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut tables = self.tables.lock().unwrap();
        if tables
            .users
            .iter()
            .any(|u| u.telegram_id == new_user.telegram_id)
        {
            return Err(AppError::EntryAlreadyExists);
        }
        let user = User {
            id: tables.next_id(),
            telegram_id: new_user.telegram_id,
            username: new_user.username,
            name: new_user.name,
            phone_number: new_user.phone_number,
            language: new_user.language,
            created: chrono::Utc::now().naive_utc(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn get_by_telegram_id(&self, telegram_id: i64) -> AppResult<User> {
        self.tables
            .lock()
            .unwrap()
            .users
            .iter()
            .find(|u| u.telegram_id == telegram_id)
            .cloned()
            .ok_or(AppError::EntryNotFound)
    }
}

#[async_trait]
impl CategoriesRepository for TestStorage {
    async fn create_category(&self, category: NewCategory) -> AppResult<DishCategory> {
        let mut tables = self.tables.lock().unwrap();
        if let Some(parent_id) = category.parent_id {
            tables.ensure_category(parent_id)?;
        }
        let created = DishCategory {
            id: tables.next_id(),
            name: category.name,
            parent_id: category.parent_id,
            image_path: category.image_path,
            image_id: None,
            number: 0,
        };
        tables.categories.push(created.clone());
        Ok(created)
    }

    async fn get_category(&self, id: i32) -> AppResult<DishCategory> {
        self.tables
            .lock()
            .unwrap()
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(AppError::EntryNotFound)
    }

    async fn list_categories(
        &self,
        top_level_only: bool,
        order: CategoryOrder,
    ) -> AppResult<Vec<DishCategory>> {
        let mut categories: Vec<_> = self
            .tables
            .lock()
            .unwrap()
            .categories
            .iter()
            .filter(|c| !top_level_only || c.parent_id.is_none())
            .cloned()
            .collect();
        match order {
            CategoryOrder::Storage => categories.sort_by_key(|c| c.id),
            CategoryOrder::Number => categories.sort_by_key(|c| (c.number, c.id)),
            CategoryOrder::Name => categories.sort_by(|a, b| a.name.cmp(&b.name)),
        }
        Ok(categories)
    }

    async fn find_category_by_name(
        &self,
        name: &str,
        parent_id: Option<i32>,
    ) -> AppResult<Option<DishCategory>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .categories
            .iter()
            .find(|c| c.name == name && (parent_id.is_none() || c.parent_id == parent_id))
            .cloned())
    }

    async fn update_category(&self, category: DishCategory) -> AppResult<DishCategory> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.categories.iter().any(|c| c.id == category.id) {
            return Err(AppError::EntryNotFound);
        }
        if let Some(parent_id) = category.parent_id {
            tables.ensure_category(parent_id)?;
        }
        let existing = tables
            .categories
            .iter_mut()
            .find(|c| c.id == category.id)
            .ok_or(AppError::EntryNotFound)?;
        *existing = category.clone();
        Ok(category)
    }

    async fn delete_category(&self, id: i32) -> AppResult<DishCategory> {
        let mut tables = self.tables.lock().unwrap();
        let deleted = tables
            .categories
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(AppError::EntryNotFound)?;
        tables.remove_category_tree(id);
        Ok(deleted)
    }
}

#[async_trait]
impl DishesRepository for TestStorage {
    async fn create_dish(&self, dish: NewDish) -> AppResult<Dish> {
        let mut tables = self.tables.lock().unwrap();
        tables.ensure_category(dish.category_id)?;
        let created = Dish {
            id: tables.next_id(),
            name: dish.name,
            description: dish.description,
            price: dish.price,
            quantity: dish.quantity,
            category_id: dish.category_id,
            is_hidden: false,
            number: 0,
            image_path: dish.image_path,
            image_id: None,
            show_usd: dish.show_usd,
        };
        tables.dishes.push(created.clone());
        Ok(created)
    }

    async fn get_dish(&self, id: i32) -> AppResult<Dish> {
        self.tables
            .lock()
            .unwrap()
            .dishes
            .iter()
            .find(|d| d.id == id)
            .cloned()
            .ok_or(AppError::EntryNotFound)
    }

    async fn list_dishes(&self, filter: DishesFilter) -> AppResult<Vec<Dish>> {
        let mut dishes: Vec<_> = self
            .tables
            .lock()
            .unwrap()
            .dishes
            .iter()
            .filter(|d| filter.category_id().is_none_or(|id| d.category_id == id))
            .filter(|d| filter.include_hidden() || !d.is_hidden)
            .cloned()
            .collect();
        match filter.order() {
            DishOrder::Storage => dishes.sort_by_key(|d| d.id),
            DishOrder::Number => dishes.sort_by_key(|d| (d.number, d.id)),
            DishOrder::Description => dishes.sort_by(|a, b| a.description.cmp(&b.description)),
        }
        Ok(dishes)
    }

    async fn find_dish_by_name(
        &self,
        name: &str,
        matching: NameMatch,
        category_id: Option<i32>,
    ) -> AppResult<Option<Dish>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .dishes
            .iter()
            .filter(|d| category_id.is_none_or(|id| d.category_id == id))
            .find(|d| match matching {
                NameMatch::Exact => d.name == name,
                NameMatch::Prefix => d.name.starts_with(name),
            })
            .cloned())
    }

    async fn update_dish(&self, dish: Dish) -> AppResult<Dish> {
        let mut tables = self.tables.lock().unwrap();
        if !tables.dishes.iter().any(|d| d.id == dish.id) {
            return Err(AppError::EntryNotFound);
        }
        tables.ensure_category(dish.category_id)?;
        let existing = tables
            .dishes
            .iter_mut()
            .find(|d| d.id == dish.id)
            .ok_or(AppError::EntryNotFound)?;
        *existing = dish.clone();
        Ok(dish)
    }

    async fn delete_dish(&self, id: i32) -> AppResult<Dish> {
        let mut tables = self.tables.lock().unwrap();
        let pos = tables
            .dishes
            .iter()
            .position(|d| d.id == id)
            .ok_or(AppError::EntryNotFound)?;
        tables.cart_items.retain(|i| i.dish_id != id);
        Ok(tables.dishes.remove(pos))
    }
}

#[async_trait]
impl CartItemsRepository for TestStorage {
    async fn list_cart_items_by_dish(&self, dish_id: i32) -> AppResult<Vec<CartItem>> {
        Ok(self
            .tables
            .lock()
            .unwrap()
            .cart_items
            .iter()
            .filter(|i| i.dish_id == dish_id)
            .cloned()
            .collect())
    }
}
