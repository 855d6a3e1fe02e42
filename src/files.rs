//! Хранилище загруженных изображений на диске
//!
//! Все пути имеют вид `upload_directory/filename`. Запись файла не атомарна
//! относительно записи в базу данных.

use std::path::{Path, PathBuf};

use tracing::instrument;

use crate::{AppError, AppResult};

#[derive(Debug, Clone)]
pub struct FileStorage {
    upload_directory: PathBuf,
}

impl FileStorage {
    pub fn new(upload_directory: impl Into<PathBuf>) -> Self {
        Self {
            upload_directory: upload_directory.into(),
        }
    }

    /// Путь, под которым файл с данным именем хранится в каталоге загрузок
    ///
    /// # Ошибки
    ///
    /// * `AppError::InvalidInput` - имя пустое или содержит компоненты пути
    pub fn path_for(&self, filename: &str) -> AppResult<String> {
        let name = Path::new(filename.trim());
        if !is_plain_filename(filename) {
            return Err(AppError::InvalidInput(format!(
                "invalid image file name '{filename}'"
            )));
        }
        Ok(self.upload_directory.join(name).to_string_lossy().into_owned())
    }

    /// Сохраняет файл в каталог загрузок и возвращает его путь
    ///
    /// При `recreate = true` существующий файл с тем же именем удаляется
    /// перед записью, иначе перезаписывается на месте.
    #[instrument(name = "save file", skip(self, bytes), fields(size = bytes.len()))]
    pub async fn save(&self, filename: &str, bytes: &[u8], recreate: bool) -> AppResult<String> {
        let path = self.path_for(filename)?;
        tokio::fs::create_dir_all(&self.upload_directory).await?;
        if recreate && tokio::fs::try_exists(&path).await? {
            tokio::fs::remove_file(&path).await?;
        }
        tokio::fs::write(&path, bytes).await?;
        tracing::debug!("saved image to '{path}'");
        Ok(path)
    }

    /// Удаляет файл; отсутствие файла не считается ошибкой
    #[instrument(name = "remove file", skip(self))]
    pub async fn remove(&self, path: &str) -> AppResult<()> {
        match tokio::fs::remove_file(path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!("image '{path}' is already gone");
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Имя файла без каталогов и других компонентов пути
pub fn is_plain_filename(filename: &str) -> bool {
    let name = Path::new(filename.trim());
    name.file_name().is_some_and(|n| n == name.as_os_str())
}
