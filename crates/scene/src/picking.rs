use foundation::math::Vec3;
use foundation::math::precision::stable_total_cmp_f64;

use crate::World;
use crate::components::{SceneTag, Shape3D};
use crate::entity::EntityId;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub dir: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    pub fn at(&self, t: f64) -> Vec3 {
        self.origin + self.dir.scale(t)
    }
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickHit {
    pub entity: EntityId,
    pub tag: SceneTag,
    pub distance: f64,
    pub point: Vec3,
}

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PickOptions {
    pub max_distance: f64,
    /// Markers behind the globe are not pickable.
    pub occlude_with_globe: bool,
}

impl Default for PickOptions {
    fn default() -> Self {
        Self {
            max_distance: 1.0e30,
            occlude_with_globe: true,
        }
    }
}

/// Deterministic ray picking for element markers.
///
/// Ordering contract:
/// - The closest hit along the (normalized) ray wins.
/// - If multiple markers are hit at the same distance, the lower
///   `EntityId::index()` wins.
///
/// Markers are tested as spheres of `Drawable3D::pick_radius()` around their
/// transform position. Curves are not pickable.
pub fn pick_ray(world: &World, ray: Ray, opts: PickOptions) -> Option<PickHit> {
    let dir = ray.dir.normalize()?;
    let ray = Ray::new(ray.origin, dir);

    let drawables = world.drawables_3d();

    let mut max_t = opts.max_distance;
    if opts.occlude_with_globe {
        for (entity, transform, drawable) in &drawables {
            if world.tag(*entity) != Some(SceneTag::Globe) {
                continue;
            }
            if let Shape3D::Sphere { radius } = drawable.shape
                && let Some(t) = ray_sphere_hit_t(&ray, transform.position, radius)
            {
                max_t = max_t.min(t);
            }
        }
    }

    let mut best: Option<(f64, EntityId, SceneTag)> = None;
    for (entity, transform, drawable) in &drawables {
        let Some(tag @ SceneTag::Element(_)) = world.tag(*entity) else {
            continue;
        };
        let Some(t) = ray_sphere_hit_t(&ray, transform.position, drawable.pick_radius()) else {
            continue;
        };
        if t > max_t {
            continue;
        }

        best = match best {
            None => Some((t, *entity, tag)),
            Some((bt, be, btag)) => {
                let ord =
                    stable_total_cmp_f64(t, bt).then_with(|| entity.index().cmp(&be.index()));
                if ord.is_lt() {
                    Some((t, *entity, tag))
                } else {
                    Some((bt, be, btag))
                }
            }
        };
    }

    let (t, entity, tag) = best?;
    Some(PickHit {
        entity,
        tag,
        distance: t,
        point: ray.at(t),
    })
}

/// Screen picking wrapper.
///
/// The caller supplies a deterministic screen->ray mapping via `make_ray`.
pub fn pick_screen<F>(
    world: &World,
    x_px: f64,
    y_px: f64,
    mut make_ray: F,
    opts: PickOptions,
) -> Option<PickHit>
where
    F: FnMut(f64, f64) -> Option<Ray>,
{
    let ray = make_ray(x_px, y_px)?;
    pick_ray(world, ray, opts)
}

/// Entry distance of a unit-direction ray into a sphere; `0` when the origin
/// is already inside.
fn ray_sphere_hit_t(ray: &Ray, center: Vec3, radius: f64) -> Option<f64> {
    let oc = ray.origin - center;
    let b = oc.dot(ray.dir);
    let c = oc.dot(oc) - radius * radius;
    let disc = b * b - c;
    if disc < 0.0 {
        return None;
    }
    let sq = disc.sqrt();
    let t_far = -b + sq;
    if t_far < 0.0 {
        return None;
    }
    Some((-b - sq).max(0.0))
}

#[cfg(test)]
mod tests {
    use super::{PickOptions, Ray, pick_ray, pick_screen};
    use crate::World;
    use crate::components::{Drawable3D, MarkerShape, SceneTag, Transform};
    use crate::network::Color;
    use crate::prefabs::spawn_globe;
    use foundation::math::Vec3;

    fn marker(world: &mut World, at: Vec3, element: usize) -> crate::entity::EntityId {
        let e = world.spawn();
        world.set_transform(e, Transform::translate(at));
        world.set_drawable_3d(e, Drawable3D::marker(MarkerShape::Cube, 2.0, Color::rgb(1, 1, 1)));
        world.set_tag(e, SceneTag::Element(element));
        e
    }

    #[test]
    fn ray_picks_nearest_hit() {
        let mut world = World::new();
        let a = marker(&mut world, Vec3::new(5.0, 0.0, 0.0), 0);
        let _b = marker(&mut world, Vec3::new(10.0, 0.0, 0.0), 1);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(2.0, 0.0, 0.0));
        let hit = pick_ray(&world, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.entity, a);
        assert_eq!(hit.tag, SceneTag::Element(0));
        assert!((hit.distance - 4.0).abs() < 1e-12);
    }

    #[test]
    fn tie_breaks_by_entity_index() {
        let mut world = World::new();
        let first = marker(&mut world, Vec3::new(5.0, 0.0, 0.0), 7);
        let _second = marker(&mut world, Vec3::new(5.0, 0.0, 0.0), 3);

        let ray = Ray::new(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0));
        let hit = pick_ray(&world, ray, PickOptions::default()).expect("hit");
        assert_eq!(hit.entity, first);
    }

    #[test]
    fn globe_hides_markers_on_far_side() {
        let mut world = World::new();
        spawn_globe(&mut world, 100.0);
        let far = marker(&mut world, Vec3::new(-100.0, 0.0, 0.0), 0);

        let ray = Ray::new(Vec3::new(300.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        assert!(pick_ray(&world, ray, PickOptions::default()).is_none());

        let see_through = PickOptions {
            occlude_with_globe: false,
            ..PickOptions::default()
        };
        let hit = pick_ray(&world, ray, see_through).expect("hit");
        assert_eq!(hit.entity, far);
    }

    #[test]
    fn globe_itself_is_not_a_pick_target() {
        let mut world = World::new();
        spawn_globe(&mut world, 100.0);
        let ray = Ray::new(Vec3::new(300.0, 0.0, 0.0), Vec3::new(-1.0, 0.0, 0.0));
        assert!(pick_ray(&world, ray, PickOptions::default()).is_none());
        assert!(
            pick_screen(&world, 0.0, 0.0, |_, _| Some(ray), PickOptions::default()).is_none()
        );
    }

    #[test]
    fn degenerate_ray_misses() {
        let mut world = World::new();
        marker(&mut world, Vec3::new(5.0, 0.0, 0.0), 0);
        let ray = Ray::new(Vec3::ZERO, Vec3::ZERO);
        assert!(pick_ray(&world, ray, PickOptions::default()).is_none());
    }
}
