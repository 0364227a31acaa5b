pub mod config;
pub mod xml;
