mod pg_users_repository;
use crate::{
    AppResult,
    models::{NewUser, User},
};
use async_trait::async_trait;

#[async_trait]
pub trait UsersRepository: Send + Sync {
    async fn create(&self, new_user: NewUser) -> AppResult<User>;
    async fn get_by_telegram_id(&self, telegram_id: i64) -> AppResult<User>;
}
