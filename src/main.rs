use std::sync::Arc;
use std::time::Duration;

use foodbot::{
    AppResult, AppState, Server,
    bot::{self, DefaultLocale},
    files::FileStorage,
    services::{CatalogService, ExcelImporter, UsersService},
    storage::PgStorage,
};
use teloxide::Bot;

#[tokio::main]
async fn main() -> AppResult<()> {
    foodbot::logger::init(foodbot::logger::level_from_env());
    tracing::info!("Hello from foodbot!");
    let settings = foodbot::settings::init("settings.toml")?;
    let db_url = settings.database_settings.db_url();
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(settings.database_settings.max_connections.unwrap_or(8))
        .idle_timeout(Duration::from_secs(
            settings.database_settings.idle_timeout.unwrap_or(30),
        ))
        .connect(db_url.as_ref())
        .await?;
    let pg_storage = Arc::new(PgStorage::init(pool).await?);

    let files = FileStorage::new(settings.storage_settings.upload_directory.clone());
    let users_service = Arc::new(UsersService::new(pg_storage.clone()));
    let catalog_service = Arc::new(CatalogService::new(pg_storage.clone(), files));
    let importer = Arc::new(ExcelImporter::new(catalog_service.clone()));

    let state = Arc::new(AppState::new(catalog_service.clone(), importer));
    let server = Server::new(settings.server_settings, state);

    let bot = Bot::new(settings.bot_settings.token.clone());
    let default_locale = DefaultLocale::new(&settings.bot_settings.default_locale);
    let dispatcher = bot::run(bot, users_service, catalog_service, default_locale);

    // оба завершаются по Ctrl+C
    let (server_result, ()) = tokio::join!(server.start(), dispatcher);
    pg_storage.close().await;
    server_result
}
