pub mod config;
pub mod handlers;
pub mod page;
pub mod routes;
pub mod server;

pub use config::{Config, LogFormat};
pub use handlers::AppState;
pub use routes::create_router;
