use crate::World;
use crate::components::{Drawable3D, SceneTag, Transform};
use crate::entity::EntityId;
use crate::network::Color;

pub const GLOBE_COLOR: Color = Color::rgb(0x0b, 0x1e, 0x3f);

/// Spawn the sphere every other scene object is placed on.
pub fn spawn_globe(world: &mut World, radius: f64) -> EntityId {
    let entity = world.spawn();
    world.set_transform(entity, Transform::identity());
    world.set_drawable_3d(entity, Drawable3D::sphere(radius, GLOBE_COLOR));
    world.set_tag(entity, SceneTag::Globe);
    entity
}

#[cfg(test)]
mod tests {
    use super::spawn_globe;
    use crate::World;
    use crate::components::{Drawable3D, SceneTag, Shape3D};

    #[test]
    fn spawns_globe_drawable() {
        let mut world = World::new();
        let entity = spawn_globe(&mut world, 100.0);

        let drawables = world.drawables_3d();
        assert_eq!(drawables.len(), 1);
        assert_eq!(drawables[0].0, entity);
        assert_eq!(world.tag(entity), Some(SceneTag::Globe));

        let Drawable3D { shape, .. } = drawables[0].2;
        assert!(matches!(shape, Shape3D::Sphere { radius } if radius == 100.0));
    }
}
