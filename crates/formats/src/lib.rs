pub mod document;
pub mod loader;
pub mod sample;
pub mod source;

pub use document::*;
pub use loader::*;
pub use sample::*;
pub use source::*;
