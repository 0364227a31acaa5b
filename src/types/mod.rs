pub mod reading;
pub mod reservoir;
pub mod status;
