pub mod disk_cache;
pub mod error;
pub mod loader;
