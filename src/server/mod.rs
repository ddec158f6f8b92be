pub mod config;
mod dto;
mod http_layers;
pub mod metrics;
mod playlist_routes;
pub mod server;
pub mod state;
mod track_routes;

pub use config::ServerConfig;
pub use http_layers::*;
pub use server::{make_app, run_server};
