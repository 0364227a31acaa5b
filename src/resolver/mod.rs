pub mod error;
pub mod resolve;
