pub mod backend;
pub mod camera;
pub mod config;
pub mod visualization;

pub use backend::*;
pub use camera::*;
pub use config::*;
pub use visualization::*;
