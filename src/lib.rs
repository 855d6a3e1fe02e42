mod error;
pub use error::{AppError, AppResult};
pub mod bot;
pub mod files;
pub mod logger;
pub mod models;
pub mod resources;
pub mod server;
pub mod services;
pub mod settings;
pub mod storage;
pub use server::{AppState, Server};
