pub mod config;
pub mod logging;
pub mod proto;
pub mod router;
pub mod server;
pub mod services;
pub mod upstream;
