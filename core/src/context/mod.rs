mod app_config;

pub use app_config::{AppConfig, default_log_path};
