mod easing;
mod time_span;
mod transition;

pub use easing::*;
pub use time_span::*;
pub use transition::*;
