//! Репозиторий каталога для PostgreSQL
//!
//! Категории, блюда и позиции корзины живут в одной базе,
//! поэтому все три трейта реализованы для `PgStorage`.

use async_trait::async_trait;
use tracing::instrument;

use crate::{
    AppError, AppResult,
    models::{CartItem, Dish, DishCategory, NewCategory, NewDish},
    storage::{
        CartItemsRepository, CategoriesRepository, CategoryOrder, DishOrder, DishesFilter,
        DishesRepository, NameMatch, PgStorage,
    },
};

/// Нарушение внешнего ключа на `dish_categories` означает неизвестную категорию
fn map_category_error(e: sqlx::Error, category_id: Option<i32>) -> AppError {
    match e {
        sqlx::Error::Database(ref db_err) if db_err.is_foreign_key_violation() => {
            let id = category_id.map_or_else(|| "?".to_string(), |id| id.to_string());
            AppError::InvalidInput(format!("category {id} does not exist"))
        }
        e => AppError::DatabaseInternalError(e),
    }
}

impl CategoryOrder {
    fn as_sql(self) -> &'static str {
        match self {
            CategoryOrder::Storage => "id ASC",
            CategoryOrder::Number => "number ASC, id ASC",
            CategoryOrder::Name => "name ASC, id ASC",
        }
    }
}

impl DishOrder {
    fn as_sql(self) -> &'static str {
        match self {
            DishOrder::Storage => "id ASC",
            DishOrder::Number => "number ASC, id ASC",
            DishOrder::Description => "description ASC, id ASC",
        }
    }
}

#[async_trait]
impl CategoriesRepository for PgStorage {
    #[instrument(name = "create category", skip(self))]
    async fn create_category(&self, category: NewCategory) -> AppResult<DishCategory> {
        let created = sqlx::query_as::<_, DishCategory>(
            r#"
			INSERT INTO dish_categories (name, parent_id, image_path)
			VALUES ($1, $2, $3)
			RETURNING *;
			"#,
        )
        .bind(&category.name)
        .bind(category.parent_id)
        .bind(&category.image_path)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_category_error(e, category.parent_id))?;
        Ok(created)
    }

    #[instrument(name = "get category by id", skip(self))]
    async fn get_category(&self, id: i32) -> AppResult<DishCategory> {
        let category =
            sqlx::query_as::<_, DishCategory>("SELECT * FROM dish_categories WHERE id = $1;")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or(AppError::EntryNotFound)?;
        Ok(category)
    }

    #[instrument(name = "list categories", skip(self))]
    async fn list_categories(
        &self,
        top_level_only: bool,
        order: CategoryOrder,
    ) -> AppResult<Vec<DishCategory>> {
        let query = format!(
            "SELECT * FROM dish_categories WHERE ($1 = FALSE OR parent_id IS NULL) ORDER BY {};",
            order.as_sql()
        );
        let categories = sqlx::query_as::<_, DishCategory>(&query)
            .bind(top_level_only)
            .fetch_all(&self.pool)
            .await?;
        Ok(categories)
    }

    #[instrument(name = "find category by name", skip(self))]
    async fn find_category_by_name(
        &self,
        name: &str,
        parent_id: Option<i32>,
    ) -> AppResult<Option<DishCategory>> {
        let category = sqlx::query_as::<_, DishCategory>(
            r#"
			SELECT * FROM dish_categories
			WHERE name = $1 AND ($2::INTEGER IS NULL OR parent_id = $2)
			ORDER BY id ASC
			LIMIT 1;
			"#,
        )
        .bind(name)
        .bind(parent_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(category)
    }

    #[instrument(name = "update category", skip(self))]
    async fn update_category(&self, category: DishCategory) -> AppResult<DishCategory> {
        let updated = sqlx::query_as::<_, DishCategory>(
            r#"
			UPDATE dish_categories
			SET
				name = $2,
				parent_id = $3,
				image_path = $4,
				image_id = $5,
				number = $6
			WHERE id = $1
			RETURNING *;
			"#,
        )
        .bind(category.id)
        .bind(&category.name)
        .bind(category.parent_id)
        .bind(&category.image_path)
        .bind(&category.image_id)
        .bind(category.number)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_category_error(e, category.parent_id))?
        .ok_or(AppError::EntryNotFound)?;
        Ok(updated)
    }

    #[instrument(name = "delete category", skip(self))]
    async fn delete_category(&self, id: i32) -> AppResult<DishCategory> {
        let deleted = sqlx::query_as::<_, DishCategory>(
            "DELETE FROM dish_categories WHERE id = $1 RETURNING *;",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or(AppError::EntryNotFound)?;
        Ok(deleted)
    }
}

#[async_trait]
impl DishesRepository for PgStorage {
    #[instrument(name = "create dish", skip(self))]
    async fn create_dish(&self, dish: NewDish) -> AppResult<Dish> {
        let created = sqlx::query_as::<_, Dish>(
            r#"
			INSERT INTO dishes (name, description, price, quantity, category_id, image_path, show_usd)
			VALUES ($1, $2, $3, $4, $5, $6, $7)
			RETURNING *;
			"#,
        )
        .bind(&dish.name)
        .bind(&dish.description)
        .bind(dish.price)
        .bind(dish.quantity)
        .bind(dish.category_id)
        .bind(&dish.image_path)
        .bind(dish.show_usd)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_category_error(e, Some(dish.category_id)))?;
        Ok(created)
    }

    #[instrument(name = "get dish by id", skip(self))]
    async fn get_dish(&self, id: i32) -> AppResult<Dish> {
        let dish = sqlx::query_as::<_, Dish>("SELECT * FROM dishes WHERE id = $1;")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(AppError::EntryNotFound)?;
        Ok(dish)
    }

    #[instrument(name = "list dishes", skip(self))]
    async fn list_dishes(&self, filter: DishesFilter) -> AppResult<Vec<Dish>> {
        let query = format!(
            r#"
			SELECT * FROM dishes
			WHERE ($1::INTEGER IS NULL OR category_id = $1)
			AND ($2 = TRUE OR is_hidden = FALSE)
			ORDER BY {};
			"#,
            filter.order().as_sql()
        );
        let dishes = sqlx::query_as::<_, Dish>(&query)
            .bind(filter.category_id())
            .bind(filter.include_hidden())
            .fetch_all(&self.pool)
            .await?;
        Ok(dishes)
    }

    #[instrument(name = "find dish by name", skip(self))]
    async fn find_dish_by_name(
        &self,
        name: &str,
        matching: NameMatch,
        category_id: Option<i32>,
    ) -> AppResult<Option<Dish>> {
        // LEFT() вместо LIKE, чтобы '%' и '_' в названии не работали как шаблон
        let name_condition = match matching {
            NameMatch::Exact => "name = $1",
            NameMatch::Prefix => "LEFT(name, CHAR_LENGTH($1)) = $1",
        };
        let query = format!(
            r#"
			SELECT * FROM dishes
			WHERE {name_condition} AND ($2::INTEGER IS NULL OR category_id = $2)
			ORDER BY id ASC
			LIMIT 1;
			"#
        );
        let dish = sqlx::query_as::<_, Dish>(&query)
            .bind(name)
            .bind(category_id)
            .fetch_optional(&self.pool)
            .await?;
        Ok(dish)
    }

    #[instrument(name = "update dish", skip(self))]
    async fn update_dish(&self, dish: Dish) -> AppResult<Dish> {
        let updated = sqlx::query_as::<_, Dish>(
            r#"
			UPDATE dishes
			SET
				name = $2,
				description = $3,
				price = $4,
				quantity = $5,
				category_id = $6,
				is_hidden = $7,
				number = $8,
				image_path = $9,
				image_id = $10,
				show_usd = $11
			WHERE id = $1
			RETURNING *;
			"#,
        )
        .bind(dish.id)
        .bind(&dish.name)
        .bind(&dish.description)
        .bind(dish.price)
        .bind(dish.quantity)
        .bind(dish.category_id)
        .bind(dish.is_hidden)
        .bind(dish.number)
        .bind(&dish.image_path)
        .bind(&dish.image_id)
        .bind(dish.show_usd)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_category_error(e, Some(dish.category_id)))?
        .ok_or(AppError::EntryNotFound)?;
        Ok(updated)
    }

    #[instrument(name = "delete dish", skip(self))]
    async fn delete_dish(&self, id: i32) -> AppResult<Dish> {
        let mut tx = self.pool.begin().await?;
        let removed_items = sqlx::query("DELETE FROM cart_items WHERE dish_id = $1;")
            .bind(id)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        let deleted = sqlx::query_as::<_, Dish>("DELETE FROM dishes WHERE id = $1 RETURNING *;")
            .bind(id)
            .fetch_optional(&mut *tx)
            .await?
            .ok_or(AppError::EntryNotFound)?;
        tx.commit().await?;
        tracing::debug!("removed {removed_items} cart items with dish {id}");
        Ok(deleted)
    }
}

#[async_trait]
impl CartItemsRepository for PgStorage {
    #[instrument(name = "list cart items by dish", skip(self))]
    async fn list_cart_items_by_dish(&self, dish_id: i32) -> AppResult<Vec<CartItem>> {
        let items = sqlx::query_as::<_, CartItem>(
            "SELECT * FROM cart_items WHERE dish_id = $1 ORDER BY id ASC;",
        )
        .bind(dish_id)
        .fetch_all(&self.pool)
        .await?;
        Ok(items)
    }
}
