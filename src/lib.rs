pub mod app;
pub mod auth;
pub mod client;
pub mod db;
pub mod errors;
pub mod handlers;
pub mod models;
pub mod retry;
pub mod state;
pub mod stats;
pub mod ui;

pub use app::router;
pub use db::{resolve_db_path, Db};
pub use state::AppState;
