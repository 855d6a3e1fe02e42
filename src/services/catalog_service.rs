use std::sync::Arc;

use tracing::instrument;
use validator::Validate;

use crate::{
    AppError, AppResult,
    files::FileStorage,
    models::{
        CartItem, Dish, DishCategory, DishForm, ImageSource, NewCategory, NewDish,
        parent_from_sentinel,
    },
    storage::{CatalogRepository, CategoryOrder, DishOrder, DishesFilter, NameMatch},
};

/// Сервис каталога блюд и категорий
///
/// Используется ботом для показа меню, панелью администратора для
/// редактирования каталога и импортом из таблиц.
///
/// Параметр `locale` в поисковых методах зарезервирован под локализованные
/// названия; сейчас названия хранятся на одном языке.
#[derive(Clone)]
pub struct CatalogService {
    pub storage: Arc<dyn CatalogRepository>,
    files: FileStorage,
}

impl CatalogService {
    pub fn new(storage: Arc<dyn CatalogRepository>, files: FileStorage) -> Self {
        Self { storage, files }
    }

    /// Все категории; при `sort_by_number` упорядочены по ключу сортировки
    #[instrument(name = "list categories", skip(self))]
    pub async fn list_categories(&self, sort_by_number: bool) -> AppResult<Vec<DishCategory>> {
        let order = if sort_by_number {
            CategoryOrder::Number
        } else {
            CategoryOrder::Storage
        };
        self.storage.list_categories(false, order).await
    }

    /// Категории верхнего уровня: по ключу сортировки или по названию
    #[instrument(name = "list top level categories", skip(self))]
    pub async fn list_top_level_categories(
        &self,
        sort_by_number: bool,
    ) -> AppResult<Vec<DishCategory>> {
        let order = if sort_by_number {
            CategoryOrder::Number
        } else {
            CategoryOrder::Name
        };
        self.storage.list_categories(true, order).await
    }

    pub async fn get_category(&self, id: i32) -> AppResult<DishCategory> {
        self.storage.get_category(id).await
    }

    /// Создает категорию
    ///
    /// `parent_id` равный `0` или `None` означает категорию верхнего уровня.
    /// Новое изображение записывается на диск с пересозданием файла.
    #[instrument(name = "create category", skip(self, image))]
    pub async fn create_category(
        &self,
        name: &str,
        parent_id: Option<i32>,
        image: Option<ImageSource>,
    ) -> AppResult<DishCategory> {
        let name = non_blank(name, "category name")?;
        let image_path = match image.filter(|i| !i.is_empty()) {
            Some(image) => Some(self.store_image(&image, true).await?),
            None => None,
        };
        let category = NewCategory {
            name: name.to_string(),
            parent_id: parent_from_sentinel(parent_id),
            image_path,
        };
        self.storage.create_category(category).await
    }

    /// Обновляет категорию
    ///
    /// Новое изображение заменяет старый файл, а идентификатор изображения
    /// в Telegram сбрасывается.
    #[instrument(name = "update category", skip(self, image))]
    pub async fn update_category(
        &self,
        id: i32,
        name: &str,
        parent_id: Option<i32>,
        image: Option<ImageSource>,
    ) -> AppResult<DishCategory> {
        let name = non_blank(name, "category name")?;
        let mut category = self.storage.get_category(id).await?;
        category.name = name.to_string();
        category.parent_id = parent_from_sentinel(parent_id);
        if let Some(image) = image.filter(|i| !i.is_empty()) {
            let path = self.replace_image(category.image_path.take(), &image).await?;
            category.image_path = Some(path);
            category.image_id = None;
        }
        self.storage.update_category(category).await
    }

    /// Удаляет категорию вместе с подкатегориями и их блюдами
    #[instrument(name = "remove category", skip(self))]
    pub async fn remove_category(&self, id: i32) -> AppResult<DishCategory> {
        self.storage.delete_category(id).await
    }

    /// Создает блюдо
    ///
    /// Пустое количество сохраняется как `0`. Изображение `AlreadyStored`
    /// только записывается как путь, `FreshUpload` сохраняется на диск.
    #[instrument(name = "create dish", skip(self, form, image), fields(name = %form.name))]
    pub async fn create_dish(&self, form: DishForm, image: Option<ImageSource>) -> AppResult<Dish> {
        form.validate()?;
        let image_path = match image.filter(|i| !i.is_empty()) {
            Some(image) => Some(self.store_image(&image, true).await?),
            None => None,
        };
        let dish = NewDish {
            quantity: form.quantity_or_default(),
            name: form.name,
            description: form.description,
            price: form.price,
            category_id: form.category_id,
            image_path,
            show_usd: form.show_usd,
        };
        self.storage.create_dish(dish).await
    }

    /// Обновляет блюдо
    ///
    /// `delete_image` имеет приоритет: файл удаляется, путь и идентификатор
    /// изображения очищаются, даже если передано новое изображение.
    #[instrument(name = "update dish", skip(self, form, image))]
    pub async fn update_dish(
        &self,
        id: i32,
        form: DishForm,
        image: Option<ImageSource>,
        delete_image: bool,
    ) -> AppResult<Dish> {
        form.validate()?;
        let mut dish = self.storage.get_dish(id).await?;
        dish.quantity = form.quantity_or_default();
        dish.name = form.name;
        dish.description = form.description;
        dish.price = form.price;
        dish.category_id = form.category_id;
        dish.show_usd = form.show_usd;
        if delete_image {
            if let Some(old) = dish.image_path.take() {
                self.files.remove(&old).await?;
            }
            dish.image_id = None;
        } else if let Some(image) = image.filter(|i| !i.is_empty()) {
            let path = self.replace_image(dish.image_path.take(), &image).await?;
            dish.image_path = Some(path);
            dish.image_id = None;
        }
        self.storage.update_dish(dish).await
    }

    /// Удаляет блюдо и все позиции корзин, которые на него ссылаются
    #[instrument(name = "remove dish", skip(self))]
    pub async fn remove_dish(&self, id: i32) -> AppResult<Dish> {
        self.storage.delete_dish(id).await
    }

    /// Переключает видимость блюда и возвращает новое значение флага
    #[instrument(name = "toggle hidden dish", skip(self))]
    pub async fn toggle_hidden(&self, id: i32) -> AppResult<bool> {
        let mut dish = self.storage.get_dish(id).await?;
        dish.is_hidden = !dish.is_hidden;
        let dish = self.storage.update_dish(dish).await?;
        Ok(dish.is_hidden)
    }

    pub async fn set_dish_number(&self, id: i32, number: i32) -> AppResult<Dish> {
        let mut dish = self.storage.get_dish(id).await?;
        dish.number = number;
        self.storage.update_dish(dish).await
    }

    pub async fn set_category_number(&self, id: i32, number: i32) -> AppResult<DishCategory> {
        let mut category = self.storage.get_category(id).await?;
        category.number = number;
        self.storage.update_category(category).await
    }

    pub async fn get_dish(&self, id: i32) -> AppResult<Dish> {
        self.storage.get_dish(id).await
    }

    /// Категория с точно таким названием, при наличии `parent` только среди его детей
    #[instrument(name = "get category by name", skip(self, parent))]
    pub async fn get_category_by_name(
        &self,
        name: &str,
        locale: &str,
        parent: Option<&DishCategory>,
    ) -> AppResult<Option<DishCategory>> {
        self.storage
            .find_category_by_name(name, parent.map(|p| p.id))
            .await
    }

    /// Блюда категории с указанным названием
    ///
    /// # Ошибки
    ///
    /// * `AppError::CategoryNotFound` - категории с таким названием нет
    #[instrument(name = "get dishes by category name", skip(self))]
    pub async fn get_dishes_by_category_name(
        &self,
        name: &str,
        locale: &str,
        sort_by_number: bool,
        include_hidden: bool,
    ) -> AppResult<Vec<Dish>> {
        let category = self
            .storage
            .find_category_by_name(name, None)
            .await?
            .ok_or_else(|| AppError::CategoryNotFound(name.to_string()))?;
        self.get_dishes_from_category(&category, sort_by_number, include_hidden)
            .await
    }

    #[instrument(name = "get dishes from category", skip(self, category), fields(category_id = category.id))]
    pub async fn get_dishes_from_category(
        &self,
        category: &DishCategory,
        sort_by_number: bool,
        include_hidden: bool,
    ) -> AppResult<Vec<Dish>> {
        let order = if sort_by_number {
            DishOrder::Number
        } else {
            DishOrder::Storage
        };
        let filter = DishesFilter::builder()
            .category_id(category.id)
            .include_hidden(include_hidden)
            .order(order)
            .build()?;
        self.storage.list_dishes(filter).await
    }

    /// Первое блюдо, название которого начинается с `name`
    #[instrument(name = "get dish by name", skip(self, category))]
    pub async fn get_dish_by_name(
        &self,
        name: &str,
        locale: &str,
        category: Option<&DishCategory>,
    ) -> AppResult<Option<Dish>> {
        self.storage
            .find_dish_by_name(name, NameMatch::Prefix, category.map(|c| c.id))
            .await
    }

    /// Блюдо с точно таким названием в любой категории
    #[instrument(name = "get dish by exact name", skip(self))]
    pub async fn get_dish_by_exact_name(&self, name: &str, locale: &str) -> AppResult<Option<Dish>> {
        self.storage
            .find_dish_by_name(name, NameMatch::Exact, None)
            .await
    }

    /// Все блюда, включая скрытые, упорядоченные по описанию
    pub async fn list_dishes_by_description(&self) -> AppResult<Vec<Dish>> {
        let filter = DishesFilter::builder()
            .include_hidden(true)
            .order(DishOrder::Description)
            .build()?;
        self.storage.list_dishes(filter).await
    }

    pub async fn list_cart_items_for_dish(&self, dish_id: i32) -> AppResult<Vec<CartItem>> {
        self.storage.list_cart_items_by_dish(dish_id).await
    }

    /// Запоминает идентификатор изображения, загруженного в Telegram
    #[instrument(name = "set dish image id", skip(self))]
    pub async fn set_dish_image_id(&self, id: i32, image_id: &str) -> AppResult<Dish> {
        let mut dish = self.storage.get_dish(id).await?;
        dish.image_id = Some(image_id.to_string());
        self.storage.update_dish(dish).await
    }

    #[instrument(name = "set category image id", skip(self))]
    pub async fn set_category_image_id(&self, id: i32, image_id: &str) -> AppResult<DishCategory> {
        let mut category = self.storage.get_category(id).await?;
        category.image_id = Some(image_id.to_string());
        self.storage.update_category(category).await
    }

    async fn store_image(&self, image: &ImageSource, recreate: bool) -> AppResult<String> {
        match image {
            ImageSource::AlreadyStored(filename) => self.files.path_for(filename),
            ImageSource::FreshUpload { filename, bytes } => {
                self.files.save(filename, bytes, recreate).await
            }
        }
    }

    async fn replace_image(&self, old: Option<String>, image: &ImageSource) -> AppResult<String> {
        let new_path = self.files.path_for(image.filename())?;
        if let Some(old) = old.filter(|old| *old != new_path) {
            self.files.remove(&old).await?;
        }
        self.store_image(image, false).await
    }
}

fn non_blank<'a>(value: &'a str, field: &str) -> AppResult<&'a str> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(AppError::InvalidInput(format!("{field} must not be empty")));
    }
    Ok(trimmed)
}
