pub mod curve;
pub mod precision;
pub mod sphere;
pub mod vec;

pub use curve::*;
pub use precision::*;
pub use sphere::*;
pub use vec::*;
