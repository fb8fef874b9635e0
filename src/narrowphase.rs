//! Narrow-phase collision tests.
//!
//! Every routine answers "do these two shapes overlap, and if so how far must
//! they be pushed apart?". The answer is a push vector oriented from the first
//! operand toward the second: resolving the contact moves the first shape by
//! `-push` and the second by `+push`. Its length is the penetration depth.
//!
//! [`check_collision`] dispatches on both shapes. Ten routines cover the
//! distinct unordered pairs; the mirrored orderings reuse them with the
//! operands swapped and the push negated.

use nalgebra::Vector3;

// ComplexField provides sqrt() for f32 in no_std via libm
#[allow(unused_imports)]
use nalgebra::ComplexField;

use crate::collider::{BoxCollider, CapsuleCollider, Collider, CylinderCollider, SphereCollider};
use crate::geometry::{closest_point_on_segment, closest_points_segment_segment, EPSILON};

/// Test two colliders for overlap.
///
/// Returns the push vector oriented from `a` toward `b`, or `None` when the
/// shapes are apart.
pub fn check_collision(a: &Collider, b: &Collider) -> Option<Vector3<f32>> {
    use Collider::*;

    match (a, b) {
        (Box(a), Box(b)) => box_box(a, b),
        (Capsule(cap), Box(bx)) => capsule_box(cap, bx),
        (Box(bx), Capsule(cap)) => capsule_box(cap, bx).map(|push| -push),
        (Capsule(a), Capsule(b)) => capsule_capsule(a, b),
        (Cylinder(cyl), Box(bx)) => cylinder_box(cyl, bx),
        (Box(bx), Cylinder(cyl)) => cylinder_box(cyl, bx).map(|push| -push),
        (Cylinder(cyl), Capsule(cap)) => cylinder_capsule(cyl, cap),
        (Capsule(cap), Cylinder(cyl)) => cylinder_capsule(cyl, cap).map(|push| -push),
        (Cylinder(a), Cylinder(b)) => cylinder_cylinder(a, b),
        (Sphere(s), Box(bx)) => sphere_box(s, bx),
        (Box(bx), Sphere(s)) => sphere_box(s, bx).map(|push| -push),
        (Sphere(s), Capsule(cap)) => sphere_capsule(s, cap),
        (Capsule(cap), Sphere(s)) => sphere_capsule(s, cap).map(|push| -push),
        (Sphere(s), Cylinder(cyl)) => sphere_cylinder(s, cyl),
        (Cylinder(cyl), Sphere(s)) => sphere_cylinder(s, cyl).map(|push| -push),
        (Sphere(a), Sphere(b)) => sphere_sphere(a, b),
    }
}

/// Push along `delta` (pointing from the second feature to the first) so the
/// separation becomes `target`; flips to point first→second.
#[inline]
fn push_apart(delta: Vector3<f32>, dist: f32, target: f32) -> Vector3<f32> {
    -delta * ((target - dist) / dist)
}

// ---------------------------------------------------------------------------
// Box pairs
// ---------------------------------------------------------------------------

/// OBB vs OBB by the separating axis theorem.
///
/// Candidate axes are the three face normals of each box and the normalized
/// cross products of every pair of edges, skipping near-parallel pairs. The
/// push lies along the axis of least overlap.
pub fn box_box(a: &BoxCollider, b: &BoxCollider) -> Option<Vector3<f32>> {
    let obb_a = a.obb();
    let obb_b = b.obb();

    let mut axes = [Vector3::zeros(); 15];
    axes[..3].copy_from_slice(&obb_a.axes);
    axes[3..6].copy_from_slice(&obb_b.axes);
    let mut count = 6;
    for axis_a in obb_a.axes.iter() {
        for axis_b in obb_b.axes.iter() {
            let cross = axis_a.cross(axis_b);
            let len_sq = cross.norm_squared();
            if len_sq > EPSILON {
                axes[count] = cross / len_sq.sqrt();
                count += 1;
            }
        }
    }

    let mut min_overlap = f32::MAX;
    let mut best_axis = Vector3::zeros();
    for axis in axes[..count].iter() {
        let (min_a, max_a) = obb_a.project(axis);
        let (min_b, max_b) = obb_b.project(axis);
        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0.0 {
            return None;
        }
        if overlap < min_overlap {
            min_overlap = overlap;
            best_axis = *axis;
        }
    }

    if (obb_b.center - obb_a.center).dot(&best_axis) < 0.0 {
        best_axis = -best_axis;
    }
    Some(best_axis * min_overlap)
}

/// Capsule vs OBB.
///
/// The box point nearest the capsule center is matched against the nearest
/// point of the capsule's segment.
pub fn capsule_box(cap: &CapsuleCollider, bx: &BoxCollider) -> Option<Vector3<f32>> {
    let closest_box = bx.obb().closest_point(&cap.position());
    let closest_cap = closest_point_on_segment(&closest_box, &cap.top(), &cap.bottom());

    let delta = closest_cap - closest_box;
    let dist_sq = delta.norm_squared();
    let radius = cap.radius();
    if dist_sq >= radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist > EPSILON {
        Some(push_apart(delta, dist, radius))
    } else {
        Some(Vector3::new(0.0, radius, 0.0))
    }
}

/// Upright cylinder vs OBB.
///
/// The cylinder's circular cross-section is tested against the box point
/// nearest its center in the XZ plane. Height only acts as a hard reject.
/// When the center sits over the box footprint the pair is separated along
/// the box's vertical axis instead.
pub fn cylinder_box(cyl: &CylinderCollider, bx: &BoxCollider) -> Option<Vector3<f32>> {
    let obb = bx.obb();
    let center = cyl.position();
    let radius = cyl.scaled_radius();
    let half_height = cyl.scaled_height() * 0.5;
    let half = obb.half_extents;

    let local = obb.to_local(&center);
    let reach_y = half.y + half_height;
    if local.y > reach_y || local.y < -reach_y {
        return None;
    }

    let closest_local = Vector3::new(
        local.x.clamp(-half.x, half.x),
        local.y,
        local.z.clamp(-half.z, half.z),
    );
    let closest = obb.to_world(&closest_local);

    let mut delta = center - closest;
    delta.y = 0.0;
    let dist_sq = delta.norm_squared();
    if dist_sq >= radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist > EPSILON {
        return Some(push_apart(delta, dist, radius));
    }

    let overlap = reach_y - local.y.abs();
    let up = obb.axes[1];
    if local.y >= 0.0 {
        Some(-up * overlap)
    } else {
        Some(up * overlap)
    }
}

// ---------------------------------------------------------------------------
// Segment-based pairs
// ---------------------------------------------------------------------------

/// Capsule vs capsule via the closest points of their segments.
pub fn capsule_capsule(a: &CapsuleCollider, b: &CapsuleCollider) -> Option<Vector3<f32>> {
    let closest = closest_points_segment_segment(&a.bottom(), &a.top(), &b.bottom(), &b.top());
    let radius_sum = a.radius() + b.radius();
    if closest.distance_sq >= radius_sum * radius_sum {
        return None;
    }

    let dir = closest.on_second - closest.on_first;
    let len = dir.norm();
    if len > EPSILON {
        Some(dir * ((radius_sum - len) / len))
    } else {
        Some(Vector3::new(0.0, radius_sum, 0.0))
    }
}

/// Upright cylinder vs capsule, treating the cylinder as a swept segment.
pub fn cylinder_capsule(cyl: &CylinderCollider, cap: &CapsuleCollider) -> Option<Vector3<f32>> {
    let center = cyl.position();
    let half = Vector3::new(0.0, cyl.scaled_height() * 0.5, 0.0);
    let closest =
        closest_points_segment_segment(&(center - half), &(center + half), &cap.bottom(), &cap.top());

    let radius_sum = cyl.scaled_radius() + cap.radius();
    if closest.distance_sq >= radius_sum * radius_sum {
        return None;
    }

    let dist = closest.distance_sq.sqrt();
    let dir = if dist > EPSILON {
        (closest.on_second - closest.on_first) / dist
    } else {
        Vector3::new(1.0, 0.0, 0.0)
    };
    Some(dir * (radius_sum - dist))
}

/// Upright cylinder vs upright cylinder, compared in the XZ plane only.
///
/// Heights are ignored: two cylinders stacked on the same axis always collide.
pub fn cylinder_cylinder(a: &CylinderCollider, b: &CylinderCollider) -> Option<Vector3<f32>> {
    let d = b.position() - a.position();
    let delta = Vector3::new(d.x, 0.0, d.z);
    let dist = delta.norm();
    let radius_sum = a.scaled_radius() + b.scaled_radius();
    if dist >= radius_sum {
        return None;
    }

    if dist > EPSILON {
        Some(delta * ((radius_sum - dist) / dist))
    } else {
        Some(Vector3::new(radius_sum, 0.0, 0.0))
    }
}

// ---------------------------------------------------------------------------
// Sphere pairs
// ---------------------------------------------------------------------------

pub fn sphere_sphere(a: &SphereCollider, b: &SphereCollider) -> Option<Vector3<f32>> {
    let delta = a.position() - b.position();
    let dist_sq = delta.norm_squared();
    let radius_sum = a.scaled_radius() + b.scaled_radius();
    if dist_sq >= radius_sum * radius_sum {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist > EPSILON {
        Some(push_apart(delta, dist, radius_sum))
    } else {
        Some(Vector3::new(radius_sum, 0.0, 0.0))
    }
}

/// Sphere vs OBB via the box point nearest the sphere center.
pub fn sphere_box(sphere: &SphereCollider, bx: &BoxCollider) -> Option<Vector3<f32>> {
    let center = sphere.position();
    let closest = bx.obb().closest_point(&center);

    let delta = center - closest;
    let dist_sq = delta.norm_squared();
    let radius = sphere.scaled_radius();
    if dist_sq >= radius * radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist > EPSILON {
        Some(push_apart(delta, dist, radius))
    } else {
        // center buried inside the box
        Some(Vector3::new(0.0, radius, 0.0))
    }
}

pub fn sphere_capsule(sphere: &SphereCollider, cap: &CapsuleCollider) -> Option<Vector3<f32>> {
    let center = sphere.position();
    let closest = closest_point_on_segment(&center, &cap.top(), &cap.bottom());

    let delta = center - closest;
    let dist_sq = delta.norm_squared();
    let radius_sum = sphere.scaled_radius() + cap.radius();
    if dist_sq >= radius_sum * radius_sum {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist > EPSILON {
        Some(push_apart(delta, dist, radius_sum))
    } else {
        Some(Vector3::new(0.0, radius_sum, 0.0))
    }
}

/// Sphere vs upright cylinder.
///
/// Alongside the cylinder the test is radial in the XZ plane. Above or below
/// it the sphere is matched against the nearest point of the cap.
pub fn sphere_cylinder(sphere: &SphereCollider, cyl: &CylinderCollider) -> Option<Vector3<f32>> {
    let s = sphere.position();
    let c = cyl.position();
    let half_height = cyl.scaled_height() * 0.5;
    let sphere_radius = sphere.scaled_radius();
    let cyl_radius = cyl.scaled_radius();

    let radial = Vector3::new(s.x - c.x, 0.0, s.z - c.z);
    let radial_dist = radial.norm();
    let dy = s.y - c.y;

    if dy.abs() <= half_height {
        let radius_sum = sphere_radius + cyl_radius;
        if radial_dist >= radius_sum {
            return None;
        }
        return if radial_dist > EPSILON {
            Some(push_apart(radial, radial_dist, radius_sum))
        } else {
            Some(Vector3::new(radius_sum, 0.0, 0.0))
        };
    }

    let rim = if radial_dist > cyl_radius {
        radial * (cyl_radius / radial_dist)
    } else {
        radial
    };
    let closest = c + rim + Vector3::new(0.0, dy.clamp(-half_height, half_height), 0.0);

    let delta = s - closest;
    let dist_sq = delta.norm_squared();
    if dist_sq >= sphere_radius * sphere_radius {
        return None;
    }

    let dist = dist_sq.sqrt();
    if dist > EPSILON {
        Some(push_apart(delta, dist, sphere_radius))
    } else {
        Some(Vector3::new(0.0, sphere_radius, 0.0))
    }
}
