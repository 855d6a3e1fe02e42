use crate::AppResult;
use sqlx::{Connection, Pool, Postgres};
use tracing::instrument;

/// Хранилище данных на основе PostgreSQL
///
/// Обеспечивает подключение и работу с базой данных PostgreSQL через пул соединений.
/// Реализует все репозитории бота: пользователей, категорий, блюд и позиций корзины.
#[derive(Clone)]
pub struct PgStorage {
    /// Пул соединений с базой данных PostgreSQL
    pub(crate) pool: sqlx::PgPool,
}

impl PgStorage {
    /// Инициализирует хранилище PostgreSQL
    ///
    /// Проверяет подключение к базе данных через ping и применяет
    /// встроенные миграции из каталога `migrations`.
    ///
    /// # Ошибки
    ///
    /// * `AppError::DatabaseInternalError` - если не удалось установить соединение
    /// * `AppError::DatabaseMigrationError` - если миграции не применились
    #[instrument(name = "initializing pg repository", skip(pool))]
    pub async fn init(pool: Pool<Postgres>) -> AppResult<Self> {
        let mut conn = pool.acquire().await?;
        conn.ping().await?;
        tracing::debug!("Ping to db successfully");
        conn.close().await?;
        sqlx::migrate!().run(&pool).await?;
        Ok(Self { pool })
    }
    /// Закрывает пул соединений с базой данных
    ///
    /// Ожидает завершения всех активных операций и освобождает ресурсы.
    #[instrument(name = "closing pg pool", skip(self))]
    pub async fn close(&self) {
        self.pool.close().await;
    }
    #[cfg(test)]
    pub(crate) fn with_pool(pool: sqlx::PgPool) -> Self {
        Self { pool }
    }
}
