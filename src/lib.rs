pub mod aggregator;
pub mod app;
pub mod client;
pub mod config;
pub mod errors;
pub mod handlers;
pub mod lastfm;
pub mod models;
pub mod spans;
pub mod state;
pub mod timeframe;

pub use app::router;
pub use client::ChartsClient;
pub use config::{load_config, resolve_config_path};
pub use state::AppState;
