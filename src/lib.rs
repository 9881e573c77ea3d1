pub mod commands;
pub mod config;
pub mod engine;
pub mod models;
pub mod notify;
pub mod probe;
pub mod state;
