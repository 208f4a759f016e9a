//! # Narrow Phase
//!
//! Exact overlap tests between convex primitives.
//!
//! Every primitive is described by its support function. GJK decides
//! whether the Minkowski difference `A - B` contains the origin; if it
//! does, EPA expands the final simplex to find the penetration normal,
//! depth and a pair of witness points. Two spheres skip both and use the
//! closed form.
//!
//! ```text
//!   support(A, d) - support(B, -d)
//!            │
//!     GJK ───┴──> simplex around origin ──> EPA ──> normal, depth, witnesses
//! ```

use glam::{Quat, Vec3};

use crate::config::PhysicsConfig;
use crate::object::{Manifold, ManifoldPoint};
use crate::shape::ShapeKind;

const EPSILON: f32 = 1.0e-10;

/// Furthest point of a convex set in a direction.
pub(crate) trait SupportMap {
    /// Point of the shape with the largest projection onto `direction`.
    fn support(&self, direction: Vec3) -> Vec3;

    /// Any interior point.
    fn center(&self) -> Vec3;
}

impl SupportMap for Vec3 {
    fn support(&self, _direction: Vec3) -> Vec3 {
        *self
    }

    fn center(&self) -> Vec3 {
        *self
    }
}

/// A primitive placed in world space. Never a compound.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Convex<'s> {
    pub kind: &'s ShapeKind,
    pub position: Vec3,
    pub rotation: Quat,
}

impl Convex<'_> {
    /// Calls `f` with every corner of a box or point of a hull.
    fn for_each_vertex(&self, mut f: impl FnMut(Vec3)) {
        match self.kind {
            ShapeKind::Box { half_extents } => {
                for corner in 0..8u8 {
                    let sign = Vec3::new(
                        if corner & 1 == 0 { -1.0 } else { 1.0 },
                        if corner & 2 == 0 { -1.0 } else { 1.0 },
                        if corner & 4 == 0 { -1.0 } else { 1.0 },
                    );
                    f(self.position + self.rotation * (*half_extents * sign));
                }
            }
            ShapeKind::Hull { points } => {
                for &point in points {
                    f(self.position + self.rotation * point);
                }
            }
            _ => {}
        }
    }
}

impl SupportMap for Convex<'_> {
    fn support(&self, direction: Vec3) -> Vec3 {
        let local = self.rotation.inverse() * direction;
        self.position + self.rotation * local_support(self.kind, local)
    }

    fn center(&self) -> Vec3 {
        self.position
    }
}

/// Support point of a primitive in its own frame.
fn local_support(kind: &ShapeKind, direction: Vec3) -> Vec3 {
    match kind {
        ShapeKind::Sphere { radius } => ball(direction, *radius),
        ShapeKind::Capsule {
            radius,
            length,
            orientation,
        } => {
            let axis = orientation.unit();
            let cap = axis * (0.5 * length).copysign(direction.dot(axis));
            cap + ball(direction, *radius)
        }
        ShapeKind::Cone {
            radius,
            length,
            orientation,
        } => {
            let axis = orientation.unit();
            let half = 0.5 * length;
            let apex = axis * half;
            let rim = -axis * half + disc(direction, axis, *radius);
            if apex.dot(direction) >= rim.dot(direction) {
                apex
            } else {
                rim
            }
        }
        ShapeKind::Cylinder {
            radius,
            half_height,
            orientation,
        } => {
            let axis = orientation.unit();
            axis * half_height.copysign(direction.dot(axis)) + disc(direction, axis, *radius)
        }
        ShapeKind::Box { half_extents } => Vec3::new(
            half_extents.x.copysign(direction.x),
            half_extents.y.copysign(direction.y),
            half_extents.z.copysign(direction.z),
        ),
        ShapeKind::Hull { points } => points
            .iter()
            .copied()
            .max_by(|a, b| a.dot(direction).total_cmp(&b.dot(direction)))
            .unwrap_or(Vec3::ZERO),
        // Compounds are flattened into their children before testing
        ShapeKind::Compound { .. } => Vec3::ZERO,
    }
}

fn ball(direction: Vec3, radius: f32) -> Vec3 {
    direction.try_normalize().unwrap_or(Vec3::X) * radius
}

/// Furthest point of a disc of `radius` perpendicular to `axis`.
fn disc(direction: Vec3, axis: Vec3, radius: f32) -> Vec3 {
    let radial = direction - axis * direction.dot(axis);
    radial.try_normalize().map_or(Vec3::ZERO, |r| r * radius)
}

// ============================================================================
// GJK
// ============================================================================

/// A vertex of the Minkowski difference with the points that produced it.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct SupportPoint {
    pub v: Vec3,
    pub a: Vec3,
    pub b: Vec3,
}

fn minkowski<A, B>(a: &A, b: &B, direction: Vec3) -> SupportPoint
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let pa = a.support(direction);
    let pb = b.support(-direction);
    SupportPoint {
        v: pa - pb,
        a: pa,
        b: pb,
    }
}

/// Up to four support points, newest first.
#[derive(Clone, Copy, Debug, Default)]
pub(crate) struct Simplex {
    points: [SupportPoint; 4],
    len: usize,
}

impl Simplex {
    fn push_front(&mut self, point: SupportPoint) {
        let len = self.len.min(3);
        self.points.copy_within(0..len, 1);
        self.points[0] = point;
        self.len = len + 1;
    }

    fn set(&mut self, points: &[SupportPoint]) {
        self.points[..points.len()].copy_from_slice(points);
        self.len = points.len();
    }
}

fn same_direction(a: Vec3, b: Vec3) -> bool {
    a.dot(b) > 0.0
}

/// Direction perpendicular to `edge`, towards the origin.
fn towards_origin(edge: Vec3, ao: Vec3) -> Vec3 {
    let direction = edge.cross(ao).cross(edge);
    if direction.length_squared() > EPSILON {
        direction
    } else {
        // Origin lies on the edge line; any perpendicular will do
        edge.any_orthogonal_vector()
    }
}

fn line(simplex: &mut Simplex, direction: &mut Vec3) -> bool {
    let (a, b) = (simplex.points[0], simplex.points[1]);
    let ab = b.v - a.v;
    let ao = -a.v;

    if same_direction(ab, ao) {
        *direction = towards_origin(ab, ao);
    } else {
        simplex.set(&[a]);
        *direction = ao;
    }
    false
}

fn triangle(simplex: &mut Simplex, direction: &mut Vec3) -> bool {
    let (a, b, c) = (simplex.points[0], simplex.points[1], simplex.points[2]);
    let ab = b.v - a.v;
    let ac = c.v - a.v;
    let ao = -a.v;
    let abc = ab.cross(ac);

    if abc.length_squared() < EPSILON {
        simplex.set(&[a, b]);
        return line(simplex, direction);
    }

    if same_direction(abc.cross(ac), ao) {
        if same_direction(ac, ao) {
            simplex.set(&[a, c]);
            *direction = towards_origin(ac, ao);
        } else {
            simplex.set(&[a, b]);
            return line(simplex, direction);
        }
    } else if same_direction(ab.cross(abc), ao) {
        simplex.set(&[a, b]);
        return line(simplex, direction);
    } else if same_direction(abc, ao) {
        *direction = abc;
    } else {
        simplex.set(&[a, c, b]);
        *direction = -abc;
    }
    false
}

fn tetrahedron(simplex: &mut Simplex, direction: &mut Vec3) -> bool {
    let (a, b, c, d) = (
        simplex.points[0],
        simplex.points[1],
        simplex.points[2],
        simplex.points[3],
    );
    let ab = b.v - a.v;
    let ac = c.v - a.v;
    let ad = d.v - a.v;
    let ao = -a.v;

    if same_direction(ab.cross(ac), ao) {
        simplex.set(&[a, b, c]);
        return triangle(simplex, direction);
    }
    if same_direction(ac.cross(ad), ao) {
        simplex.set(&[a, c, d]);
        return triangle(simplex, direction);
    }
    if same_direction(ad.cross(ab), ao) {
        simplex.set(&[a, d, b]);
        return triangle(simplex, direction);
    }
    true
}

fn next_simplex(simplex: &mut Simplex, direction: &mut Vec3) -> bool {
    match simplex.len {
        2 => line(simplex, direction),
        3 => triangle(simplex, direction),
        4 => tetrahedron(simplex, direction),
        _ => false,
    }
}

/// Returns a tetrahedron enclosing the origin if `a` and `b` overlap.
///
/// Shapes that merely touch are reported as separate.
pub(crate) fn gjk<A, B>(a: &A, b: &B, max_iterations: u32) -> Option<Simplex>
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let mut direction = a.center() - b.center();
    if direction.length_squared() < EPSILON {
        direction = Vec3::X;
    }

    let first = minkowski(a, b, direction);
    let mut simplex = Simplex::default();
    simplex.push_front(first);
    direction = -first.v;

    for _ in 0..max_iterations {
        if direction.length_squared() < EPSILON {
            return None;
        }
        let point = minkowski(a, b, direction);
        if point.v.dot(direction) <= 0.0 {
            return None;
        }
        simplex.push_front(point);
        if next_simplex(&mut simplex, &mut direction) {
            return Some(simplex);
        }
    }

    tracing::trace!(max_iterations, "gjk did not converge");
    None
}

// ============================================================================
// EPA
// ============================================================================

/// Result of EPA: how far and in which direction `A` sinks into `B`.
#[derive(Clone, Copy, Debug)]
pub(crate) struct Penetration {
    /// Unit normal pointing from `A` towards `B`.
    pub normal: Vec3,
    /// Penetration depth, non-negative.
    pub depth: f32,
    /// Deepest point of `A` inside `B`.
    pub point_a: Vec3,
    /// Matching point on the surface of `B`.
    pub point_b: Vec3,
}

#[derive(Clone, Copy, Debug)]
struct Face {
    indices: [usize; 3],
    normal: Vec3,
    distance: f32,
}

impl Face {
    /// Builds a face whose normal points away from `interior`.
    fn new(vertices: &[SupportPoint], mut indices: [usize; 3], interior: Vec3) -> Self {
        let [i, j, k] = indices;
        let a = vertices[i].v;
        let Some(mut normal) = (vertices[j].v - a).cross(vertices[k].v - a).try_normalize() else {
            return Self {
                indices,
                normal: Vec3::ZERO,
                distance: f32::INFINITY,
            };
        };
        if normal.dot(a - interior) < 0.0 {
            normal = -normal;
            indices.swap(1, 2);
        }
        Self {
            indices,
            normal,
            distance: normal.dot(a).max(0.0),
        }
    }

    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.indices;
        [(a, b), (b, c), (c, a)]
    }
}

fn closest_face(faces: &[Face]) -> Option<Face> {
    faces
        .iter()
        .copied()
        .filter(|face| face.distance.is_finite())
        .min_by(|x, y| x.distance.total_cmp(&y.distance))
}

/// Expands a GJK simplex into the penetration of `a` into `b`.
pub(crate) fn epa<A, B>(a: &A, b: &B, simplex: &Simplex, config: &PhysicsConfig) -> Option<Penetration>
where
    A: SupportMap + ?Sized,
    B: SupportMap + ?Sized,
{
    let mut vertices: Vec<SupportPoint> = simplex.points[..simplex.len].to_vec();
    if vertices.len() < 4 {
        return None;
    }
    let interior = vertices.iter().map(|p| p.v).sum::<Vec3>() / 4.0;

    let mut faces: Vec<Face> = [[0, 1, 2], [0, 3, 1], [0, 2, 3], [1, 3, 2]]
        .into_iter()
        .map(|indices| Face::new(&vertices, indices, interior))
        .collect();
    let mut horizon: Vec<(usize, usize)> = Vec::new();

    for _ in 0..config.epa_max_iterations {
        let closest = closest_face(&faces)?;
        let point = minkowski(a, b, closest.normal);
        if point.v.dot(closest.normal) - closest.distance < config.epa_tolerance {
            return Some(penetration(&closest, &vertices));
        }

        horizon.clear();
        faces.retain(|face| {
            let visible = face.distance.is_finite()
                && same_direction(face.normal, point.v - vertices[face.indices[0]].v);
            if visible {
                for (from, to) in face.edges() {
                    if let Some(shared) = horizon.iter().position(|&edge| edge == (to, from)) {
                        horizon.swap_remove(shared);
                    } else {
                        horizon.push((from, to));
                    }
                }
            }
            !visible
        });

        let apex = vertices.len();
        vertices.push(point);
        faces.extend(
            horizon
                .iter()
                .map(|&(from, to)| Face::new(&vertices, [from, to, apex], interior)),
        );
    }

    tracing::trace!(iterations = config.epa_max_iterations, "epa stopped before converging");
    closest_face(&faces).map(|face| penetration(&face, &vertices))
}

fn penetration(face: &Face, vertices: &[SupportPoint]) -> Penetration {
    let [i, j, k] = face.indices;
    let (p0, p1, p2) = (vertices[i], vertices[j], vertices[k]);
    let (u, v, w) = barycentric(face.normal * face.distance, p0.v, p1.v, p2.v);
    Penetration {
        normal: face.normal,
        depth: face.distance,
        point_a: p0.a * u + p1.a * v + p2.a * w,
        point_b: p0.b * u + p1.b * v + p2.b * w,
    }
}

fn barycentric(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> (f32, f32, f32) {
    let v0 = b - a;
    let v1 = c - a;
    let v2 = p - a;
    let d00 = v0.dot(v0);
    let d01 = v0.dot(v1);
    let d11 = v1.dot(v1);
    let d20 = v2.dot(v0);
    let d21 = v2.dot(v1);
    let denom = d00 * d11 - d01 * d01;
    if denom.abs() < EPSILON {
        return (1.0, 0.0, 0.0);
    }
    let v = (d11 * d20 - d01 * d21) / denom;
    let w = (d00 * d21 - d01 * d20) / denom;
    (1.0 - v - w, v, w)
}

// ============================================================================
// CONTACTS
// ============================================================================

/// Contact manifold between two primitives, from `a`'s point of view.
///
/// `None` if they do not overlap.
pub(crate) fn contact(a: &Convex<'_>, b: &Convex<'_>, config: &PhysicsConfig) -> Option<Manifold> {
    if let (ShapeKind::Sphere { radius: ra }, ShapeKind::Sphere { radius: rb }) = (a.kind, b.kind) {
        return sphere_contact(a.position, *ra, b.position, *rb);
    }

    let simplex = gjk(a, b, config.gjk_max_iterations)?;
    let hit = epa(a, b, &simplex, config)?;

    let mut manifold = Manifold::new(hit.normal);
    manifold.push(ManifoldPoint {
        world_point_a: hit.point_a,
        world_point_b: hit.point_b,
        distance: -hit.depth,
    });

    // Corners of one shape buried in the other
    a.for_each_vertex(|vertex| {
        if gjk(b, &vertex, config.gjk_max_iterations).is_some() {
            let depth = (vertex - hit.point_b).dot(hit.normal).max(0.0);
            manifold.insert_deepest(
                ManifoldPoint {
                    world_point_a: vertex,
                    world_point_b: vertex - hit.normal * depth,
                    distance: -depth,
                },
                config.contact_merge_distance,
            );
        }
    });
    b.for_each_vertex(|vertex| {
        if gjk(a, &vertex, config.gjk_max_iterations).is_some() {
            let depth = (hit.point_a - vertex).dot(hit.normal).max(0.0);
            manifold.insert_deepest(
                ManifoldPoint {
                    world_point_a: vertex + hit.normal * depth,
                    world_point_b: vertex,
                    distance: -depth,
                },
                config.contact_merge_distance,
            );
        }
    });

    manifold.sort_deepest_first();
    Some(manifold)
}

fn sphere_contact(ca: Vec3, ra: f32, cb: Vec3, rb: f32) -> Option<Manifold> {
    let delta = cb - ca;
    let distance = delta.length();
    let reach = ra + rb;
    if distance >= reach {
        return None;
    }

    let normal = if distance > f32::EPSILON {
        delta / distance
    } else {
        Vec3::X
    };
    let mut manifold = Manifold::new(normal);
    manifold.push(ManifoldPoint {
        world_point_a: ca + normal * ra,
        world_point_b: cb - normal * rb,
        distance: distance - reach,
    });
    Some(manifold)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::Axis;

    fn placed(kind: &ShapeKind, position: Vec3) -> Convex<'_> {
        Convex {
            kind,
            position,
            rotation: Quat::IDENTITY,
        }
    }

    #[test]
    fn test_box_support() {
        let kind = ShapeKind::Box {
            half_extents: Vec3::new(1.0, 2.0, 3.0),
        };
        let shape = placed(&kind, Vec3::new(10.0, 0.0, 0.0));
        assert_eq!(shape.support(Vec3::new(1.0, -1.0, 1.0)), Vec3::new(11.0, -2.0, 3.0));
    }

    #[test]
    fn test_capsule_support_follows_axis() {
        let kind = ShapeKind::Capsule {
            radius: 0.5,
            length: 2.0,
            orientation: Axis::Z,
        };
        let shape = placed(&kind, Vec3::ZERO);
        assert!((shape.support(Vec3::Z) - Vec3::new(0.0, 0.0, 1.5)).length() < 1e-5);
        assert!((shape.support(Vec3::X) - Vec3::new(0.5, 0.0, 1.0)).length() < 1e-5);
    }

    #[test]
    fn test_gjk_boxes() {
        let kind = ShapeKind::Box {
            half_extents: Vec3::ONE,
        };
        let a = placed(&kind, Vec3::ZERO);
        let near = placed(&kind, Vec3::new(1.5, 0.2, -0.3));
        let far = placed(&kind, Vec3::new(2.5, 0.0, 0.0));

        assert!(gjk(&a, &near, 64).is_some());
        assert!(gjk(&a, &far, 64).is_none());
    }

    #[test]
    fn test_gjk_coincident_centres() {
        let sphere = ShapeKind::Sphere { radius: 1.0 };
        let cube = ShapeKind::Box {
            half_extents: Vec3::splat(0.5),
        };
        assert!(gjk(&placed(&sphere, Vec3::ZERO), &placed(&cube, Vec3::ZERO), 64).is_some());
    }

    #[test]
    fn test_point_containment() {
        let kind = ShapeKind::Box {
            half_extents: Vec3::ONE,
        };
        let cube = placed(&kind, Vec3::ZERO);
        assert!(gjk(&cube, &Vec3::new(0.5, 0.5, 0.5), 64).is_some());
        assert!(gjk(&cube, &Vec3::new(1.5, 0.0, 0.0), 64).is_none());
    }

    #[test]
    fn test_epa_box_depth_and_normal() {
        let kind = ShapeKind::Box {
            half_extents: Vec3::ONE,
        };
        let a = placed(&kind, Vec3::ZERO);
        let b = placed(&kind, Vec3::new(1.5, 0.0, 0.0));
        let config = PhysicsConfig::default();

        let simplex = gjk(&a, &b, 64).unwrap();
        let hit = epa(&a, &b, &simplex, &config).unwrap();
        assert!((hit.depth - 0.5).abs() < 1e-3);
        assert!(hit.normal.dot(Vec3::X) > 0.99);
    }

    #[test]
    fn test_sphere_contact_closed_form() {
        let manifold = sphere_contact(Vec3::ZERO, 1.0, Vec3::new(1.5, 0.0, 0.0), 1.0).unwrap();
        assert_eq!(manifold.normal, Vec3::X);
        let point = manifold.points()[0];
        assert_eq!(point.world_point_a, Vec3::X);
        assert_eq!(point.world_point_b, Vec3::new(0.5, 0.0, 0.0));
        assert!((point.distance + 0.5).abs() < 1e-6);

        assert!(sphere_contact(Vec3::ZERO, 1.0, Vec3::new(2.0, 0.0, 0.0), 1.0).is_none());
    }

    #[test]
    fn test_box_face_contact_has_several_points() {
        let kind = ShapeKind::Box {
            half_extents: Vec3::ONE,
        };
        let small = ShapeKind::Box {
            half_extents: Vec3::splat(0.25),
        };
        // Small cube sunk into the top face of the big one
        let a = placed(&kind, Vec3::ZERO);
        let b = placed(&small, Vec3::new(0.0, 1.1, 0.0));

        let manifold = contact(&a, &b, &PhysicsConfig::default()).unwrap();
        assert!(manifold.normal.dot(Vec3::Y) > 0.99);
        assert!(manifold.point_count() > 1);
        assert!(manifold.point_count() <= 4);
        assert!(manifold.points().iter().all(|p| p.distance <= 0.0));
    }
}
