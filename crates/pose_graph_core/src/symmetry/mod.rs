mod config;
pub mod serial;

pub use config::*;
