pub mod config;
pub mod markers;
pub mod types;
