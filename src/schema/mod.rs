//! Schema module - Configuration, search space and population types.

mod evolution;
mod space;

pub use evolution::*;
pub use space::*;
