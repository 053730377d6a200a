// Library crate for railbar
// Railway API client and the application state a menu-bar shell drives

pub mod api;
pub mod config;
pub mod error;
pub mod models;
pub mod refresh;
pub mod state;

pub use api::{InMemoryApi, RailwayApi, RailwayClient};
pub use config::{Config, RefreshInterval};
pub use error::{ApiError, AppError, AppResult};
pub use state::{AppState, StoreSnapshot};
