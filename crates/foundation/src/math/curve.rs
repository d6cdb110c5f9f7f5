//! Smooth curve sampling for arcs and polylines.

use super::Vec3;

/// Sample a quadratic Bézier `p0 -> p2` with control point `p1`.
///
/// Returns `samples` points (at least 2), including both endpoints.
pub fn sample_quadratic_bezier(p0: Vec3, p1: Vec3, p2: Vec3, samples: usize) -> Vec<Vec3> {
    let samples = samples.max(2);
    let last = (samples - 1) as f64;
    (0..samples)
        .map(|i| {
            let t = i as f64 / last;
            let u = 1.0 - t;
            p0.scale(u * u) + p1.scale(2.0 * u * t) + p2.scale(t * t)
        })
        .collect()
}

/// Sample a uniform Catmull-Rom spline passing through every control point.
///
/// `per_segment` points are emitted for each span between consecutive control
/// points (the final control point is appended once). End spans duplicate the
/// first/last point as phantom neighbours. Fewer than 2 control points are
/// returned unchanged.
pub fn sample_catmull_rom(points: &[Vec3], per_segment: usize) -> Vec<Vec3> {
    if points.len() < 2 {
        return points.to_vec();
    }
    let per_segment = per_segment.max(1);
    let n = points.len();
    let mut out = Vec::with_capacity((n - 1) * per_segment + 1);

    for i in 0..n - 1 {
        let p0 = points[i.saturating_sub(1)];
        let p1 = points[i];
        let p2 = points[i + 1];
        let p3 = points[(i + 2).min(n - 1)];

        for s in 0..per_segment {
            let t = s as f64 / per_segment as f64;
            out.push(catmull_rom_point(p0, p1, p2, p3, t));
        }
    }
    out.push(points[n - 1]);
    out
}

fn catmull_rom_point(p0: Vec3, p1: Vec3, p2: Vec3, p3: Vec3, t: f64) -> Vec3 {
    let t2 = t * t;
    let t3 = t2 * t;
    // 0.5 * (2p1 + (-p0 + p2)t + (2p0 - 5p1 + 4p2 - p3)t^2 + (-p0 + 3p1 - 3p2 + p3)t^3)
    let a = p1.scale(2.0);
    let b = (p2 - p0).scale(t);
    let c = (p0.scale(2.0) - p1.scale(5.0) + p2.scale(4.0) - p3).scale(t2);
    let d = (p1.scale(3.0) - p0 - p2.scale(3.0) + p3).scale(t3);
    (a + b + c + d).scale(0.5)
}
