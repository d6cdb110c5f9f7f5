pub mod drawable3d;
pub mod tag;
pub mod transform;
pub mod vector_geometry;

pub use drawable3d::*;
pub use tag::*;
pub use transform::*;
pub use vector_geometry::*;
