pub mod config;
mod http_layers;
mod search;
pub mod server;
pub mod state;
mod status_codes;

pub use config::ServerConfig;
pub use http_layers::*;
pub(self) use search::make_search_routes;
pub use server::run_server;
pub use status_codes::StatusCodeScheme;
