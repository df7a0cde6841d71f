pub mod app_config;
pub mod canary_config;

pub use app_config::{MimirConfig, load_config};
