mod animation_error;

pub use animation_error::*;
