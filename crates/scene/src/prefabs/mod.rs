pub mod globe;

pub use globe::*;
