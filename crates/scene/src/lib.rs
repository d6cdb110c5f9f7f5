pub mod components;
pub mod entity;
pub mod factory;
pub mod network;
pub mod network_scene;
pub mod picking;
pub mod prefabs;
pub mod projection;
pub mod rotation;
pub mod visibility;
pub mod world;

pub use network::*;
pub use network_scene::*;
pub use world::*;
