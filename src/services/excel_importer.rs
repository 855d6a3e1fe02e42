//! Импорт каталога из таблицы
//!
//! Колонки первого листа: родительская категория, название, категории
//! 1-3, описание, цена, изображение, количество, категория 4. Первая строка
//! считается заголовком.

use std::{io::Cursor, path::Path, sync::Arc};

use bytes::Bytes;
use calamine::{Data, Reader, open_workbook_auto_from_rs};
use serde::Serialize;
use tracing::instrument;

use validator::Validate;

use crate::{
    AppError, AppResult,
    files::is_plain_filename,
    models::{DishCategory, DishForm, ImageSource},
    resources::DEFAULT_LOCALE,
    services::CatalogService,
};

const COLUMNS: usize = 10;

/// Одна строка таблицы каталога, все ячейки приведены к строкам
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogRow {
    pub parent: String,
    pub name: String,
    /// Категории 1-4 от верхней к нижней
    pub categories: [String; 4],
    pub description: String,
    pub price: String,
    pub image: String,
    pub quantity: String,
}

impl CatalogRow {
    pub fn from_cells(cells: &[Data]) -> Self {
        let mut values: Vec<String> = cells.iter().take(COLUMNS).map(cell_to_string).collect();
        values.resize(COLUMNS, String::new());
        let mut values = values.into_iter();
        let mut next = || values.next().unwrap_or_default();
        let parent = next();
        let name = next();
        let (first, second, third) = (next(), next(), next());
        let description = next();
        let price = next();
        let image = next();
        let quantity = next();
        let fourth = next();
        Self {
            parent,
            name,
            categories: [first, second, third, fourth],
            description,
            price,
            image,
            quantity,
        }
    }

    fn parse_price(&self) -> AppResult<f64> {
        let price = self.price.trim();
        if price.is_empty() {
            return Ok(0.0);
        }
        price
            .parse::<f64>()
            .ok()
            .filter(|p| p.is_finite())
            .ok_or_else(|| {
                AppError::InvalidInput(format!("invalid price '{price}' for '{}'", self.name))
            })
    }

    fn parse_quantity(&self) -> AppResult<i32> {
        let quantity = self.quantity.trim();
        if quantity.is_empty() {
            return Ok(0);
        }
        quantity
            .parse::<f64>()
            .ok()
            .filter(|q| q.is_finite())
            .map(|q| q.trunc() as i32)
            .ok_or_else(|| {
                AppError::InvalidInput(format!(
                    "invalid quantity '{quantity}' for '{}'",
                    self.name
                ))
            })
    }
}

/// Ячейка в виде строки; целые числа без дробной части
fn cell_to_string(cell: &Data) -> String {
    match cell {
        Data::Empty => String::new(),
        Data::String(s) => s.trim().to_string(),
        Data::Int(i) => i.to_string(),
        Data::Float(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
            (*f as i64).to_string()
        }
        Data::Float(f) => f.to_string(),
        other => other.to_string(),
    }
}

/// Итоги импорта
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    /// Строки данных без заголовка
    pub rows_read: usize,
    pub dishes_created: usize,
    /// Блюдо с таким названием уже было в каталоге
    pub dishes_existing: usize,
    /// Строки без названия блюда
    pub rows_skipped: usize,
    pub rows_failed: usize,
}

enum RowOutcome {
    Created,
    Existing,
    Skipped,
}

#[derive(Clone)]
pub struct ExcelImporter {
    catalog: Arc<CatalogService>,
}

impl ExcelImporter {
    pub fn new(catalog: Arc<CatalogService>) -> Self {
        Self { catalog }
    }

    /// Импортирует первый лист книги `.xlsx`, `.xls` или `.ods` с диска
    #[instrument(name = "import catalog file", skip(self, path), fields(path = %path.as_ref().display()))]
    pub async fn import_file(&self, path: impl AsRef<Path>) -> AppResult<ImportReport> {
        let bytes = tokio::fs::read(path.as_ref()).await?;
        self.import_bytes(Bytes::from(bytes)).await
    }

    /// Импортирует первый лист книги, переданной целиком в памяти
    #[instrument(name = "import catalog bytes", skip(self, bytes), fields(size = bytes.len()))]
    pub async fn import_bytes(&self, bytes: Bytes) -> AppResult<ImportReport> {
        // calamine читает книгу синхронно
        let rows = tokio::task::spawn_blocking(move || read_rows(bytes)).await??;
        self.import_rows(rows).await
    }

    /// Импортирует уже прочитанные строки данных
    ///
    /// Ошибки разбора отдельной строки записываются в лог и учитываются
    /// в `rows_failed`, импорт продолжается. Ошибки хранилища прерывают импорт.
    pub async fn import_rows(
        &self,
        rows: impl IntoIterator<Item = CatalogRow>,
    ) -> AppResult<ImportReport> {
        let mut report = ImportReport::default();
        for (index, row) in rows.into_iter().enumerate() {
            report.rows_read += 1;
            match self.import_row(&row).await {
                Ok(RowOutcome::Created) => report.dishes_created += 1,
                Ok(RowOutcome::Existing) => report.dishes_existing += 1,
                Ok(RowOutcome::Skipped) => report.rows_skipped += 1,
                Err(e @ (AppError::InvalidInput(_) | AppError::ValidationErrors(_))) => {
                    // строка 1 это заголовок
                    tracing::warn!("row {} is not imported: {e}", index + 2);
                    report.rows_failed += 1;
                }
                Err(e) => return Err(e),
            }
        }
        tracing::info!(
            "imported {} rows: {} created, {} existing, {} skipped, {} failed",
            report.rows_read,
            report.dishes_created,
            report.dishes_existing,
            report.rows_skipped,
            report.rows_failed
        );
        Ok(report)
    }

    async fn import_row(&self, row: &CatalogRow) -> AppResult<RowOutcome> {
        let name = row.name.trim();
        if name.is_empty() {
            return Ok(RowOutcome::Skipped);
        }
        // все проверки строки до создания категорий
        let mut form = DishForm {
            name: name.to_string(),
            description: row.description.clone(),
            price: row.parse_price()?,
            quantity: Some(row.parse_quantity()?),
            category_id: 0,
            show_usd: false,
        };
        form.validate()?;
        let image = row_image(row);

        let mut category: Option<DishCategory> = None;
        let levels = std::iter::once(&row.parent).chain(row.categories.iter());
        for level in levels.map(|l| l.trim()).filter(|l| !l.is_empty()) {
            category = Some(self.resolve_category(level, category.as_ref()).await?);
        }
        let Some(category) = category else {
            return Err(AppError::InvalidInput(format!(
                "'{name}' has no category"
            )));
        };

        if self
            .catalog
            .get_dish_by_exact_name(name, DEFAULT_LOCALE)
            .await?
            .is_some()
        {
            return Ok(RowOutcome::Existing);
        }

        form.category_id = category.id;
        let dish = self.catalog.create_dish(form, image).await?;
        tracing::debug!("created dish {} '{}' in '{}'", dish.id, dish.name, category.name);
        Ok(RowOutcome::Created)
    }

    /// Находит категорию по названию или создает ее
    ///
    /// Категория верхнего уровня ищется по всему каталогу, остальные только
    /// среди детей `parent`.
    async fn resolve_category(
        &self,
        name: &str,
        parent: Option<&DishCategory>,
    ) -> AppResult<DishCategory> {
        if let Some(found) = self
            .catalog
            .get_category_by_name(name, DEFAULT_LOCALE, parent)
            .await?
        {
            return Ok(found);
        }
        self.catalog
            .create_category(name, parent.map(|p| p.id), None)
            .await
    }
}

/// Имя файла изображения из строки
///
/// Ссылка, которая не является именем файла в каталоге загрузок (URL,
/// относительный путь), пропускается, а блюдо импортируется без изображения.
fn row_image(row: &CatalogRow) -> Option<ImageSource> {
    let image = row.image.trim();
    if image.is_empty() {
        return None;
    }
    if !is_plain_filename(image) {
        tracing::warn!("image '{image}' of '{}' is not a file name, skipped", row.name.trim());
        return None;
    }
    Some(ImageSource::AlreadyStored(image.to_string()))
}

fn read_rows(bytes: Bytes) -> AppResult<Vec<CatalogRow>> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))?;
    let range = workbook
        .worksheet_range_at(0)
        .ok_or_else(|| AppError::InvalidInput("workbook has no sheets".to_string()))??;
    Ok(range
        .rows()
        .skip(1)
        .map(CatalogRow::from_cells)
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{files::FileStorage, storage::test_storage::TestStorage};

    fn importer() -> (ExcelImporter, TestStorage, tempfile::TempDir) {
        let storage = TestStorage::new();
        let dir = tempfile::tempdir().unwrap();
        let catalog = CatalogService::new(Arc::new(storage.clone()), FileStorage::new(dir.path()));
        (ExcelImporter::new(Arc::new(catalog)), storage, dir)
    }

    fn row(cells: [&str; 10]) -> CatalogRow {
        let cells: Vec<Data> = cells
            .iter()
            .map(|c| {
                if c.is_empty() {
                    Data::Empty
                } else {
                    Data::String(c.to_string())
                }
            })
            .collect();
        CatalogRow::from_cells(&cells)
    }

    fn pilaf() -> CatalogRow {
        row(["Food", "Pilaf", "Hot", "", "", "", "25000", "pilaf.jpg", "", ""])
    }

    #[test]
    fn test_cell_to_string() {
        assert_eq!(cell_to_string(&Data::Float(25000.0)), "25000");
        assert_eq!(cell_to_string(&Data::Float(12.5)), "12.5");
        assert_eq!(cell_to_string(&Data::Int(3)), "3");
        assert_eq!(cell_to_string(&Data::String(" Plov ".to_string())), "Plov");
        assert_eq!(cell_to_string(&Data::Empty), "");
    }

    #[test]
    fn test_row_from_short_cells() {
        let row = CatalogRow::from_cells(&[
            Data::String("Food".to_string()),
            Data::String("Pilaf".to_string()),
        ]);
        assert_eq!(row.parent, "Food");
        assert_eq!(row.name, "Pilaf");
        assert!(row.categories.iter().all(String::is_empty));
        assert_eq!(row.parse_price().unwrap(), 0.0);
        assert_eq!(row.parse_quantity().unwrap(), 0);
    }

    #[test]
    fn test_row_category_four_is_last_column() {
        let row = row(["P", "N", "1", "2", "3", "d", "1", "i", "7.9", "4"]);
        assert_eq!(row.categories, ["1", "2", "3", "4"].map(String::from));
        assert_eq!(row.parse_quantity().unwrap(), 7);
    }

    #[tokio::test]
    async fn test_import_pilaf() {
        let (importer, storage, dir) = importer();
        let report = importer.import_rows([pilaf()]).await.unwrap();
        assert_eq!(report.rows_read, 1);
        assert_eq!(report.dishes_created, 1);

        let categories = storage.categories();
        assert_eq!(categories.len(), 2);
        let food = categories.iter().find(|c| c.name == "Food").unwrap();
        let hot = categories.iter().find(|c| c.name == "Hot").unwrap();
        assert_eq!(food.parent_id, None);
        assert_eq!(hot.parent_id, Some(food.id));

        let dishes = storage.dishes();
        assert_eq!(dishes.len(), 1);
        let dish = &dishes[0];
        assert_eq!(dish.name, "Pilaf");
        assert_eq!(dish.category_id, hot.id);
        assert_eq!(dish.price, 25000.0);
        assert_eq!(dish.quantity, 0);
        assert_eq!(
            Path::new(dish.image_path.as_deref().unwrap()),
            dir.path().join("pilaf.jpg")
        );
    }

    #[tokio::test]
    async fn test_import_twice_is_idempotent() {
        let (importer, storage, _dir) = importer();
        importer.import_rows([pilaf()]).await.unwrap();
        let report = importer.import_rows([pilaf()]).await.unwrap();
        assert_eq!(report.dishes_created, 0);
        assert_eq!(report.dishes_existing, 1);
        assert_eq!(storage.categories().len(), 2);
        assert_eq!(storage.dishes().len(), 1);
    }

    #[tokio::test]
    async fn test_repeat_name_with_other_details_is_ignored() {
        let (importer, storage, _dir) = importer();
        let other = row(["Drinks", "Pilaf", "", "", "", "", "1", "", "", ""]);
        importer.import_rows([pilaf(), other]).await.unwrap();
        let dishes = storage.dishes();
        assert_eq!(dishes.len(), 1);
        assert_eq!(dishes[0].price, 25000.0);
    }

    #[tokio::test]
    async fn test_blank_name_is_skipped() {
        let (importer, storage, _dir) = importer();
        let blank = row(["Food", " ", "Hot", "", "", "", "100", "", "", ""]);
        let report = importer.import_rows([blank]).await.unwrap();
        assert_eq!(report.rows_skipped, 1);
        assert!(storage.categories().is_empty());
        assert!(storage.dishes().is_empty());
    }

    #[tokio::test]
    async fn test_blank_levels_nest_under_last_ancestor() {
        let (importer, storage, _dir) = importer();
        let deep = row(["Food", "Somsa", "", "Baked", "", "", "8000", "", "2", "Beef"]);
        importer.import_rows([deep]).await.unwrap();

        let categories = storage.categories();
        let find = |name: &str| categories.iter().find(|c| c.name == name).unwrap();
        assert_eq!(categories.len(), 3);
        assert_eq!(find("Baked").parent_id, Some(find("Food").id));
        assert_eq!(find("Beef").parent_id, Some(find("Baked").id));

        let dish = &storage.dishes()[0];
        assert_eq!(dish.category_id, find("Beef").id);
        assert_eq!(dish.quantity, 2);
        assert_eq!(dish.image_path, None);
    }

    #[tokio::test]
    async fn test_bad_price_fails_row_and_continues() {
        let (importer, storage, _dir) = importer();
        let bad = row(["Food", "Tea", "", "", "", "", "cheap", "", "", ""]);
        let report = importer.import_rows([bad, pilaf()]).await.unwrap();
        assert_eq!(report.rows_failed, 1);
        assert_eq!(report.dishes_created, 1);
        assert_eq!(storage.dishes().len(), 1);
    }

    #[tokio::test]
    async fn test_image_path_is_dropped_but_dish_imported() {
        let (importer, storage, _dir) = importer();
        let mut with_path = pilaf();
        with_path.image = "images/pilaf.jpg".to_string();
        let mut with_url = row(["Food", "Tea", "", "", "", "", "3000", "", "", ""]);
        with_url.image = "https://cdn.example.com/tea.png".to_string();

        let report = importer.import_rows([with_path, with_url]).await.unwrap();
        assert_eq!(report.dishes_created, 2);
        assert_eq!(report.rows_failed, 0);
        assert_eq!(storage.categories().len(), 2);
        assert!(storage.dishes().iter().all(|d| d.image_path.is_none()));
    }

    #[tokio::test]
    async fn test_negative_price_creates_no_categories() {
        let (importer, storage, _dir) = importer();
        let negative = row(["Food", "Pilaf", "Hot", "", "", "", "-5", "", "", ""]);
        let report = importer.import_rows([negative]).await.unwrap();
        assert_eq!(report.rows_failed, 1);
        assert!(storage.categories().is_empty());
        assert!(storage.dishes().is_empty());
    }

    #[tokio::test]
    async fn test_non_finite_numbers_fail_row() {
        let (importer, storage, _dir) = importer();
        let nan = row(["Food", "Tea", "", "", "", "", "NaN", "", "", ""]);
        let inf = row(["Food", "Coffee", "", "", "", "", "inf", "", "", ""]);
        let endless = row(["Food", "Juice", "", "", "", "", "1", "", "-infinity", ""]);
        let report = importer.import_rows([nan, inf, endless]).await.unwrap();
        assert_eq!(report.rows_failed, 3);
        assert!(storage.categories().is_empty());
        assert!(storage.dishes().is_empty());
    }

    #[tokio::test]
    async fn test_import_bytes_rejects_garbage() {
        let (importer, _, _dir) = importer();
        let result = importer
            .import_bytes(Bytes::from_static(b"not a workbook"))
            .await;
        assert!(matches!(result, Err(AppError::SpreadsheetError(_))));
    }

    #[tokio::test]
    async fn test_import_missing_file() {
        let (importer, _, dir) = importer();
        let result = importer.import_file(dir.path().join("missing.xlsx")).await;
        assert!(matches!(result, Err(AppError::IOError(_))));
    }
}
