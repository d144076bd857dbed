pub mod app_config;
pub mod backend;

pub use app_config::Config;
pub use backend::BackendClient;
