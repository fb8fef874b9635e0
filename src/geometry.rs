//! Closest-point and ray helpers used by the narrow phase and by ray picking.
//!
//! Everything here is a pure function of its inputs. Degenerate input
//! (zero-length segments, rays parallel to a slab) is handled with explicit
//! epsilon guards instead of failing.

use nalgebra::{Matrix3, Vector3};

// ComplexField provides sqrt()/abs() for f32 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

/// Squared lengths at or below this are treated as zero.
pub const EPSILON: f32 = 1e-6;

// ---------------------------------------------------------------------------
// Oriented boxes
// ---------------------------------------------------------------------------

/// An oriented bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Obb {
    pub center: Vector3<f32>,
    /// The box's local X, Y and Z axes expressed in world space (unit length).
    pub axes: [Vector3<f32>; 3],
    pub half_extents: Vector3<f32>,
}

impl Obb {
    /// Build an OBB from a rotation matrix whose columns are the local axes.
    pub fn new(center: Vector3<f32>, rotation: &Matrix3<f32>, half_extents: Vector3<f32>) -> Self {
        Self {
            center,
            axes: [
                rotation.column(0).into_owned(),
                rotation.column(1).into_owned(),
                rotation.column(2).into_owned(),
            ],
            half_extents,
        }
    }

    /// An OBB aligned with the world axes.
    pub fn axis_aligned(center: Vector3<f32>, half_extents: Vector3<f32>) -> Self {
        Self::new(center, &Matrix3::identity(), half_extents)
    }

    /// Express a world-space point in the box's local frame.
    #[inline]
    pub fn to_local(&self, point: &Vector3<f32>) -> Vector3<f32> {
        let d = point - self.center;
        Vector3::new(d.dot(&self.axes[0]), d.dot(&self.axes[1]), d.dot(&self.axes[2]))
    }

    /// Map a local-frame point back to world space.
    #[inline]
    pub fn to_world(&self, local: &Vector3<f32>) -> Vector3<f32> {
        self.center + self.axes[0] * local.x + self.axes[1] * local.y + self.axes[2] * local.z
    }

    /// Project the box onto `axis`, returning the `(min, max)` interval.
    ///
    /// The projected radius is `Σ hᵢ·|axis·uᵢ|` over the three local axes.
    pub fn project(&self, axis: &Vector3<f32>) -> (f32, f32) {
        let h = &self.half_extents;
        let r = h.x * axis.dot(&self.axes[0]).abs()
            + h.y * axis.dot(&self.axes[1]).abs()
            + h.z * axis.dot(&self.axes[2]).abs();
        let c = axis.dot(&self.center);
        (c - r, c + r)
    }

    /// Closest point on (or inside) the box to `point`.
    ///
    /// Points inside the box map to themselves.
    pub fn closest_point(&self, point: &Vector3<f32>) -> Vector3<f32> {
        let d = point - self.center;
        let mut closest = self.center;
        for (axis, half) in self.axes.iter().zip(self.half_extents.iter()) {
            let dist = d.dot(axis).clamp(-half, *half);
            closest += axis * dist;
        }
        closest
    }
}

// ---------------------------------------------------------------------------
// Segments
// ---------------------------------------------------------------------------

/// Closest point on segment `a`-`b` to `point`.
///
/// A segment shorter than [`EPSILON`] collapses to its start point `a`.
pub fn closest_point_on_segment(
    point: &Vector3<f32>,
    a: &Vector3<f32>,
    b: &Vector3<f32>,
) -> Vector3<f32> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < EPSILON {
        return *a;
    }
    let t = ((point - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Result of [`closest_points_segment_segment`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SegmentClosest {
    pub distance_sq: f32,
    /// Closest point on the first segment.
    pub on_first: Vector3<f32>,
    /// Closest point on the second segment.
    pub on_second: Vector3<f32>,
}

/// Closest points between segments `p1`-`q1` and `p2`-`q2`.
///
/// Handles either or both segments degenerating to points. For parallel
/// segments the first segment's parameter is pinned to 0 before the
/// alternating clamp, which picks the pair nearest `p1`.
pub fn closest_points_segment_segment(
    p1: &Vector3<f32>,
    q1: &Vector3<f32>,
    p2: &Vector3<f32>,
    q2: &Vector3<f32>,
) -> SegmentClosest {
    let d1 = q1 - p1;
    let d2 = q2 - p2;
    let r = p1 - p2;
    let a = d1.norm_squared();
    let e = d2.norm_squared();
    let f = d2.dot(&r);

    let (s, t) = if a <= EPSILON && e <= EPSILON {
        (0.0, 0.0)
    } else if a <= EPSILON {
        (0.0, (f / e).clamp(0.0, 1.0))
    } else {
        let c = d1.dot(&r);
        if e <= EPSILON {
            ((-c / a).clamp(0.0, 1.0), 0.0)
        } else {
            let b = d1.dot(&d2);
            let denom = a * e - b * b;
            let s = if denom != 0.0 {
                ((b * f - c * e) / denom).clamp(0.0, 1.0)
            } else {
                0.0
            };
            let t = ((b * s + f) / e).clamp(0.0, 1.0);
            let s = ((b * t - c) / a).clamp(0.0, 1.0);
            (s, t)
        }
    };

    let on_first = p1 + d1 * s;
    let on_second = p2 + d2 * t;
    SegmentClosest {
        distance_sq: (on_first - on_second).norm_squared(),
        on_first,
        on_second,
    }
}

// ---------------------------------------------------------------------------
// Rays
// ---------------------------------------------------------------------------

/// Slab test of a ray against an axis-aligned box.
///
/// Returns the entry distance along `dir` (0 when the origin is inside the
/// box), or `None` on a miss. `dir` need not be normalized; the distance is
/// in units of `dir`.
pub fn ray_aabb(
    origin: &Vector3<f32>,
    dir: &Vector3<f32>,
    min: &Vector3<f32>,
    max: &Vector3<f32>,
) -> Option<f32> {
    let mut t_min = 0.0_f32;
    let mut t_max = f32::MAX;

    for i in 0..3 {
        if dir[i].abs() < EPSILON {
            if origin[i] < min[i] || origin[i] > max[i] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / dir[i];
        let mut t1 = (min[i] - origin[i]) * inv;
        let mut t2 = (max[i] - origin[i]) * inv;
        if t1 > t2 {
            core::mem::swap(&mut t1, &mut t2);
        }
        t_min = t_min.max(t1);
        t_max = t_max.min(t2);
        if t_min > t_max {
            return None;
        }
    }

    Some(t_min)
}

/// Slab test of a ray against an oriented box.
///
/// The ray is moved into the box frame and run through [`ray_aabb`] there.
/// `dir` is normalized first, so the returned distance is in world units.
/// Intersections behind the origin, including a ray that starts inside the
/// box, count as misses.
pub fn ray_obb(origin: &Vector3<f32>, dir: &Vector3<f32>, obb: &Obb) -> Option<f32> {
    let len = dir.norm();
    if len < EPSILON {
        return None;
    }
    let local_origin = obb.to_local(origin);
    let half = obb.half_extents;
    if (0..3).all(|i| local_origin[i].abs() < half[i]) {
        return None;
    }

    let world_dir = dir / len;
    let local_dir = Vector3::new(
        world_dir.dot(&obb.axes[0]),
        world_dir.dot(&obb.axes[1]),
        world_dir.dot(&obb.axes[2]),
    );
    ray_aabb(&local_origin, &local_dir, &-half, &half)
}
