//! Error types

mod catalog;
mod driver;
mod rule;

pub use catalog::*;
pub use driver::*;
pub use rule::*;
