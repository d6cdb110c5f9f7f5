//! The live scene graph for one topology.
//!
//! Two kinds of mutation touch it: `rebuild` (new data or a filter change)
//! starts from an empty `World` and spawns only what is visible, and `sync`
//! (every rotating frame) moves what already exists without spawning.

use std::collections::BTreeMap;

use foundation::math::Vec3;
use serde::Serialize;
use tracing::{debug, info};

use crate::World;
use crate::components::{
    ComponentVectorGeometry, Drawable3D, SceneTag, Transform, VectorGeometry, VectorGeometryId,
};
use crate::entity::EntityId;
use crate::factory::{self, VisualObject};
use crate::network::{
    CableRoute, ElementType, GeoPoint, NetworkClass, NetworkElement, Topology,
};
use crate::picking::{PickOptions, Ray, pick_ray};
use crate::prefabs::spawn_globe;
use crate::projection::ProjectionConfig;
use crate::rotation::{Rotator, element_position};
use crate::visibility::{ViewFilterState, VisibleSet, compute_visible_set, visible_cables};

/// Hover/click details for one element.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ElementInfo {
    pub id: String,
    pub name: String,
    pub element_type: ElementType,
    pub network_class: NetworkClass,
    pub position: GeoPoint,
    pub description: String,
    pub specifications: BTreeMap<String, String>,
    pub proposed_by: Option<String>,
}

impl From<&NetworkElement> for ElementInfo {
    fn from(element: &NetworkElement) -> Self {
        Self {
            id: element.id.clone(),
            name: element.name.clone(),
            element_type: element.element_type,
            network_class: element.network_class,
            position: element.position,
            description: element.description.clone(),
            specifications: element.specifications.clone(),
            proposed_by: element.proposer.as_ref().map(|p| p.wallet.clone()),
        }
    }
}

/// What the last rebuild spawned.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildSummary {
    pub elements: usize,
    pub links: usize,
    pub cables: usize,
    pub entities: usize,
}

#[derive(Debug, Copy, Clone)]
struct LinkEntity {
    entity: EntityId,
    link: usize,
    from: usize,
    to: usize,
    geometry: VectorGeometryId,
}

#[derive(Debug)]
pub struct NetworkScene {
    config: ProjectionConfig,
    world: World,
    globe: EntityId,
    topology: Topology,
    cables: Vec<CableRoute>,
    visible: VisibleSet,
    visible_cables: Vec<usize>,
    element_entities: Vec<(EntityId, usize)>,
    link_entities: Vec<LinkEntity>,
    cable_entities: Vec<EntityId>,
    /// Current position per element index; `None` for hidden elements.
    positions: Vec<Option<Vec3>>,
}

impl NetworkScene {
    /// Empty scene holding only the globe.
    pub fn new(config: ProjectionConfig) -> Self {
        let mut world = World::new();
        let globe = spawn_globe(&mut world, config.base_radius);
        Self {
            config,
            world,
            globe,
            topology: Topology::default(),
            cables: Vec::new(),
            visible: VisibleSet::default(),
            visible_cables: Vec::new(),
            element_entities: Vec::new(),
            link_entities: Vec::new(),
            cable_entities: Vec::new(),
            positions: Vec::new(),
        }
    }

    pub fn config(&self) -> &ProjectionConfig {
        &self.config
    }

    pub fn world(&self) -> &World {
        &self.world
    }

    pub fn globe(&self) -> EntityId {
        self.globe
    }

    pub fn topology(&self) -> &Topology {
        &self.topology
    }

    pub fn cables(&self) -> &[CableRoute] {
        &self.cables
    }

    pub fn visible(&self) -> &VisibleSet {
        &self.visible
    }

    /// Replace the canonical data. Takes effect on the next [`Self::rebuild`].
    pub fn set_data(&mut self, topology: Topology, cables: Vec<CableRoute>) {
        self.topology = topology;
        self.cables = cables;
    }

    pub fn rebuild(&mut self, filter: &ViewFilterState, rotator: &Rotator) -> RebuildSummary {
        let elements = self.topology.elements();
        let visible = compute_visible_set(elements, self.topology.links(), filter);
        let visible_cable_indices = visible_cables(&self.cables, filter);

        let mut world = World::new();
        let globe = spawn_globe(&mut world, self.config.base_radius);
        let mut positions = vec![None; elements.len()];

        let mut element_entities = Vec::with_capacity(visible.elements.len());
        for &idx in &visible.elements {
            let element = &elements[idx];
            let VisualObject::Marker(marker) = factory::build_element(element, &self.config)
            else {
                continue;
            };
            let position = element_position(element, rotator, &self.config);
            positions[idx] = Some(position);

            let entity = world.spawn();
            world.set_transform(entity, Transform::translate(position));
            world.set_drawable_3d(
                entity,
                Drawable3D::marker(marker.shape, marker.size, marker.color),
            );
            world.set_tag(entity, SceneTag::Element(idx));
            element_entities.push((entity, idx));
        }

        let mut link_entities = Vec::with_capacity(visible.links.len());
        for &idx in &visible.links {
            let link = &self.topology.links()[idx];
            let (Some(from), Some(to)) = (
                self.topology.element_index(&link.from),
                self.topology.element_index(&link.to),
            ) else {
                continue;
            };
            let (Some(a), Some(b)) = (positions[from], positions[to]) else {
                continue;
            };
            let VisualObject::Curve(curve) = factory::build_link(link, (a, b), &self.config) else {
                continue;
            };

            let geometry = world.add_vector_geometry(VectorGeometry::Polyline {
                vertices: curve.vertices,
            });
            let entity = world.spawn();
            world.set_transform(entity, Transform::identity());
            world.set_vector_geometry(
                entity,
                ComponentVectorGeometry::new(geometry, curve.kind, curve.color, curve.width),
            );
            world.set_tag(entity, SceneTag::Link(idx));
            link_entities.push(LinkEntity {
                entity,
                link: idx,
                from,
                to,
                geometry,
            });
        }

        let mut cable_entities = Vec::with_capacity(visible_cable_indices.len());
        for &idx in &visible_cable_indices {
            let VisualObject::Curve(curve) = factory::build_cable(&self.cables[idx], &self.config)
            else {
                continue;
            };
            let geometry = world.add_vector_geometry(VectorGeometry::Polyline {
                vertices: curve.vertices,
            });
            let entity = world.spawn();
            world.set_transform(entity, Transform::spin(rotator.angle()));
            world.set_vector_geometry(
                entity,
                ComponentVectorGeometry::new(geometry, curve.kind, curve.color, curve.width),
            );
            world.set_tag(entity, SceneTag::Cable(idx));
            cable_entities.push(entity);
        }

        let summary = RebuildSummary {
            elements: element_entities.len(),
            links: link_entities.len(),
            cables: cable_entities.len(),
            entities: world.entity_count(),
        };

        self.world = world;
        self.globe = globe;
        self.visible = visible;
        self.visible_cables = visible_cable_indices;
        self.element_entities = element_entities;
        self.link_entities = link_entities;
        self.cable_entities = cable_entities;
        self.positions = positions;

        info!(
            elements = summary.elements,
            links = summary.links,
            cables = summary.cables,
            "scene rebuilt"
        );
        summary
    }

    /// Move every spawned object to where the rotator says it is now.
    pub fn sync(&mut self, rotator: &Rotator) {
        let elements = self.topology.elements();
        for &(entity, idx) in &self.element_entities {
            let position = element_position(&elements[idx], rotator, &self.config);
            self.positions[idx] = Some(position);
            self.world.set_transform(entity, Transform::translate(position));
        }

        for link in &self.link_entities {
            let (Some(a), Some(b)) = (self.positions[link.from], self.positions[link.to]) else {
                continue;
            };
            let link_type = self.topology.links()[link.link].link_type;
            let vertices = factory::arc_vertices(link_type, a, b, self.config.base_radius);
            if !self
                .world
                .replace_vector_geometry(link.geometry, VectorGeometry::Polyline { vertices })
            {
                debug!(entity = %link.entity, "link geometry missing during sync");
            }
        }

        let spin = Transform::spin(rotator.angle());
        for &entity in &self.cable_entities {
            self.world.set_transform(entity, spin);
        }
    }

    pub fn pick(&self, ray: Ray) -> Option<ElementInfo> {
        let hit = pick_ray(&self.world, ray, PickOptions::default())?;
        match hit.tag {
            SceneTag::Element(idx) => self.topology.elements().get(idx).map(ElementInfo::from),
            _ => None,
        }
    }

    /// Current scene position of a visible element.
    pub fn element_position(&self, id: &str) -> Option<Vec3> {
        let idx = self.topology.element_index(id)?;
        self.positions.get(idx).copied().flatten()
    }

    /// World-space vertices of the visible link at `link` (topology index).
    pub fn link_vertices(&self, link: usize) -> Option<&[Vec3]> {
        let entry = self.link_entities.iter().find(|l| l.link == link)?;
        self.world.vector_geometry(entry.geometry).map(|g| g.vertices())
    }

    pub fn visible_cable_indices(&self) -> &[usize] {
        &self.visible_cables
    }

    pub fn element_count(&self) -> usize {
        self.element_entities.len()
    }

    pub fn link_count(&self) -> usize {
        self.link_entities.len()
    }

    pub fn cable_count(&self) -> usize {
        self.cable_entities.len()
    }
}

#[cfg(test)]
mod tests {
    use super::NetworkScene;
    use crate::components::SceneTag;
    use crate::network::{
        CableRoute, CableType, Color, ElementType, GeoPoint, LinkType, NetworkClass,
        NetworkElement, NetworkLink, Proposer, Topology,
    };
    use crate::picking::Ray;
    use crate::projection::ProjectionConfig;
    use crate::rotation::{MAX_FRAME_DT, Rotator};
    use crate::visibility::{FilterPatch, ViewFilterState};
    use foundation::math::{Vec3, snap_to_surface};
    use pretty_assertions::assert_eq;

    fn fixture() -> (Topology, Vec<CableRoute>) {
        let mut london = NetworkElement::new(
            "lon",
            "London",
            ElementType::Router,
            NetworkClass::Existing,
            GeoPoint::surface(51.5, -0.1).unwrap(),
        );
        london.description = "LINX".to_string();
        let mut sat = NetworkElement::new(
            "sat",
            "Relay",
            ElementType::Satellite,
            NetworkClass::Proposed,
            GeoPoint::new(10.0, 0.0, 550.0).unwrap(),
        );
        sat.proposer = Some(Proposer {
            wallet: "0xabc".to_string(),
            submitted_at: None,
        });
        let nyc = NetworkElement::new(
            "nyc",
            "New York",
            ElementType::GroundStation,
            NetworkClass::Existing,
            GeoPoint::surface(40.7, -74.0).unwrap(),
        );
        let topology = Topology::new(
            vec![london, sat, nyc],
            vec![
                NetworkLink::new("lon", "nyc", LinkType::Submarine, NetworkClass::Existing),
                NetworkLink::new("lon", "sat", LinkType::SatelliteLink, NetworkClass::Existing),
            ],
        );
        let cables = vec![
            CableRoute::new(
                "tat",
                "TAT-14",
                CableType::Submarine,
                Color::rgb(0, 0, 255),
                vec![
                    GeoPoint::surface(40.0, -73.0).unwrap(),
                    GeoPoint::surface(50.0, -5.0).unwrap(),
                ],
            )
            .unwrap(),
        ];
        (topology, cables)
    }

    fn loaded_scene() -> NetworkScene {
        let (topology, cables) = fixture();
        let mut scene = NetworkScene::new(ProjectionConfig::default());
        scene.set_data(topology, cables);
        scene
    }

    #[test]
    fn new_scene_holds_only_the_globe() {
        let scene = NetworkScene::new(ProjectionConfig::default());
        assert_eq!(scene.world().entity_count(), 1);
        assert_eq!(scene.world().tag(scene.globe()), Some(SceneTag::Globe));
    }

    #[test]
    fn rebuild_spawns_visible_objects_only() {
        let mut scene = loaded_scene();
        let rotator = Rotator::default();
        let summary = scene.rebuild(&ViewFilterState::default(), &rotator);
        assert_eq!((summary.elements, summary.links, summary.cables), (3, 2, 1));
        assert_eq!(summary.entities, 1 + 3 + 2 + 1);

        let mut filter = ViewFilterState::default();
        filter.apply(&FilterPatch::network(true, false));
        let summary = scene.rebuild(&filter, &rotator);
        assert_eq!((summary.elements, summary.links, summary.cables), (2, 1, 1));
        assert!(scene.element_position("sat").is_none());
        assert!(scene.link_vertices(1).is_none());
    }

    #[test]
    fn sync_keeps_ground_glued_and_links_attached() {
        let mut scene = loaded_scene();
        let mut rotator = Rotator::new(30f64.to_radians() / MAX_FRAME_DT);
        scene.rebuild(&ViewFilterState::default(), &rotator);
        let before = scene.link_vertices(0).map(|v| v.to_vec()).unwrap();

        rotator.tick(MAX_FRAME_DT);
        scene.sync(&rotator);

        let cfg = ProjectionConfig::default();
        let expected = snap_to_surface(cfg.project_raw(51.5, 29.9, 0.0), cfg.base_radius);
        let got = scene.element_position("lon").unwrap();
        assert!(got.distance(expected) < 1e-9);

        let after = scene.link_vertices(0).unwrap();
        assert_ne!(before, after.to_vec());
        assert_eq!(after.first().copied(), Some(got));
        assert_eq!(after.last().copied(), scene.element_position("nyc"));
    }

    #[test]
    fn cables_carry_the_global_spin() {
        let mut scene = loaded_scene();
        let mut rotator = Rotator::new(1.0);
        scene.rebuild(&ViewFilterState::default(), &rotator);
        rotator.tick(0.05);
        scene.sync(&rotator);

        let spins: Vec<f64> = scene
            .world()
            .vector_geometries_by_entity()
            .into_iter()
            .filter(|(e, _, _)| matches!(scene.world().tag(*e), Some(SceneTag::Cable(_))))
            .map(|(_, t, _)| t.rotation_y)
            .collect();
        assert_eq!(spins.len(), 1);
        assert!((spins[0] - rotator.angle()).abs() < 1e-12);
    }

    #[test]
    fn pick_returns_element_info() {
        let mut scene = loaded_scene();
        scene.rebuild(&ViewFilterState::default(), &Rotator::default());
        let target = scene.element_position("lon").unwrap();
        let origin = target.scale(3.0);
        let info = scene
            .pick(Ray::new(origin, target - origin))
            .expect("london is in front");
        assert_eq!(info.name, "London");
        assert_eq!(info.description, "LINX");
        assert_eq!(info.proposed_by, None);

        let miss = scene.pick(Ray::new(origin, Vec3::new(0.0, 1.0, 0.0)));
        assert!(miss.is_none());
    }
}
