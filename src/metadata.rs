mod builder;
mod marker;
mod members;
mod registry;

pub use builder::*;
pub use marker::*;
pub use members::*;
pub use registry::*;

pub(crate) use members::Held;
