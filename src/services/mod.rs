mod catalog_service;
mod excel_importer;
mod users_service;

pub use catalog_service::CatalogService;
pub use excel_importer::{CatalogRow, ExcelImporter, ImportReport};
pub use users_service::UsersService;
