pub mod api;
pub mod app_config;
pub mod auth;
pub mod session_file;
