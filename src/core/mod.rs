pub mod config;
pub mod message;
pub mod panel;
pub mod render;
