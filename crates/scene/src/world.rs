use crate::components::{
    ComponentVectorGeometry, Drawable3D, SceneTag, Transform, VectorGeometry, VectorGeometryId,
};
use crate::entity::EntityId;
use foundation::handles::Handle;

/// Component storage for one scene graph.
///
/// Entities are dense indices; a rebuild starts from a fresh `World` rather
/// than despawning, so generations stay at zero.
#[derive(Debug, Default)]
pub struct World {
    next_index: u32,
    transforms: Vec<Option<Transform>>,
    tags: Vec<Option<SceneTag>>,
    drawables_3d: Vec<Option<Drawable3D>>,
    vector_geometry: Vec<Option<ComponentVectorGeometry>>,
    vector_geometries: Vec<VectorGeometry>,
}

impl World {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self) -> EntityId {
        let id = EntityId(Handle::new(self.next_index, 0));
        self.next_index += 1;
        let idx = id.index() as usize;
        self.ensure_capacity(idx);
        id
    }

    pub fn entity_count(&self) -> usize {
        self.next_index as usize
    }

    pub fn set_transform(&mut self, entity: EntityId, transform: Transform) {
        self.ensure_capacity(entity.index() as usize);
        self.transforms[entity.index() as usize] = Some(transform);
    }

    pub fn transform(&self, entity: EntityId) -> Option<Transform> {
        self.transforms
            .get(entity.index() as usize)
            .and_then(|t| *t)
    }

    pub fn set_tag(&mut self, entity: EntityId, tag: SceneTag) {
        self.ensure_capacity(entity.index() as usize);
        self.tags[entity.index() as usize] = Some(tag);
    }

    pub fn tag(&self, entity: EntityId) -> Option<SceneTag> {
        self.tags.get(entity.index() as usize).and_then(|t| *t)
    }

    pub fn set_drawable_3d(&mut self, entity: EntityId, drawable: Drawable3D) {
        self.ensure_capacity(entity.index() as usize);
        self.drawables_3d[entity.index() as usize] = Some(drawable);
    }

    pub fn drawable_3d(&self, entity: EntityId) -> Option<Drawable3D> {
        self.drawables_3d
            .get(entity.index() as usize)
            .and_then(|d| *d)
    }

    pub fn add_vector_geometry(&mut self, geometry: VectorGeometry) -> VectorGeometryId {
        let id = VectorGeometryId(self.vector_geometries.len() as u32);
        self.vector_geometries.push(geometry);
        id
    }

    /// Swap the vertices behind `id`. Returns `false` for unknown ids.
    pub fn replace_vector_geometry(&mut self, id: VectorGeometryId, geometry: VectorGeometry) -> bool {
        match self.vector_geometries.get_mut(id.0 as usize) {
            Some(slot) => {
                *slot = geometry;
                true
            }
            None => false,
        }
    }

    pub fn set_vector_geometry(&mut self, entity: EntityId, component: ComponentVectorGeometry) {
        self.ensure_capacity(entity.index() as usize);
        self.vector_geometry[entity.index() as usize] = Some(component);
    }

    pub fn vector_geometry_component(&self, entity: EntityId) -> Option<ComponentVectorGeometry> {
        self.vector_geometry
            .get(entity.index() as usize)
            .and_then(|v| *v)
    }

    pub fn vector_geometry(&self, id: VectorGeometryId) -> Option<&VectorGeometry> {
        self.vector_geometries.get(id.0 as usize)
    }

    pub fn vector_geometries_by_entity(
        &self,
    ) -> Vec<(EntityId, Transform, ComponentVectorGeometry)> {
        self.collect(&self.vector_geometry)
    }

    pub fn drawables_3d(&self) -> Vec<(EntityId, Transform, Drawable3D)> {
        self.collect(&self.drawables_3d)
    }

    fn collect<T: Copy>(&self, components: &[Option<T>]) -> Vec<(EntityId, Transform, T)> {
        let mut out = Vec::new();
        for (idx, component) in components.iter().enumerate() {
            let Some(component) = component else { continue };
            let Some(transform) = self.transforms.get(idx).and_then(|t| *t) else {
                continue;
            };
            out.push((EntityId(Handle::new(idx as u32, 0)), transform, *component));
        }
        out
    }

    fn ensure_capacity(&mut self, idx: usize) {
        if self.transforms.len() <= idx {
            let new_len = idx + 1;
            self.transforms.resize(new_len, None);
            self.tags.resize(new_len, None);
            self.drawables_3d.resize(new_len, None);
            self.vector_geometry.resize(new_len, None);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::World;
    use crate::components::{
        ComponentVectorGeometry, Drawable3D, MarkerShape, SceneTag, Transform, VectorGeometry,
        VectorGeometryKind,
    };
    use crate::network::{Color, LinkType};
    use foundation::math::Vec3;

    #[test]
    fn spawn_and_collect_drawables() {
        let mut world = World::new();
        let entity = world.spawn();
        world.set_transform(entity, Transform::identity());
        world.set_drawable_3d(
            entity,
            Drawable3D::marker(MarkerShape::Cube, 1.0, Color::rgb(0, 0, 0)),
        );
        world.set_tag(entity, SceneTag::Element(4));

        let drawables = world.drawables_3d();
        assert_eq!(drawables.len(), 1);
        assert_eq!(drawables[0].0, entity);
        assert_eq!(world.tag(entity), Some(SceneTag::Element(4)));
        assert_eq!(world.entity_count(), 1);
    }

    #[test]
    fn entities_without_transform_are_skipped() {
        let mut world = World::new();
        let entity = world.spawn();
        world.set_drawable_3d(entity, Drawable3D::sphere(1.0, Color::rgb(0, 0, 0)));
        assert!(world.drawables_3d().is_empty());
    }

    #[test]
    fn replace_vector_geometry_swaps_vertices() {
        let mut world = World::new();
        let entity = world.spawn();
        world.set_transform(entity, Transform::identity());
        let id = world.add_vector_geometry(VectorGeometry::Polyline {
            vertices: vec![Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0)],
        });
        world.set_vector_geometry(
            entity,
            ComponentVectorGeometry::new(
                id,
                VectorGeometryKind::LinkArc(LinkType::Fiber),
                Color::rgb(9, 9, 9),
                1.0,
            ),
        );

        assert!(world.replace_vector_geometry(
            id,
            VectorGeometry::Polyline {
                vertices: vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)],
            }
        ));
        let verts = world.vector_geometry(id).map(|g| g.vertices().to_vec());
        assert_eq!(verts, Some(vec![Vec3::ZERO, Vec3::new(0.0, 2.0, 0.0)]));
        assert_eq!(world.vector_geometries_by_entity().len(), 1);
    }
}
