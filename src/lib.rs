pub mod cli;
pub mod config;
pub mod core;
pub mod presets;
pub mod server;
