pub mod config;
pub mod logging;
pub mod resolve;

pub use config::Settings;
