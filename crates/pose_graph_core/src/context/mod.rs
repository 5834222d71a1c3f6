mod evaluation_state;
mod interpolation_context;

pub use evaluation_state::*;
pub use interpolation_context::*;
