//! Mode routing
//!
//! - Server mode (HTTP server, default)
//! - Migrate mode (apply schema migrations and exit)
//! - Generate-config mode (print a sample configuration)

pub mod generate_config;
pub mod migrate;
pub mod server;

pub use generate_config::run_generate_config;
pub use migrate::run_migrate;
pub use server::run_server;
