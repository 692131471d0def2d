//! Ray casting against the scene graph.
//!
//! Picking works in two phases per drawable node: a slab test against the
//! node's world-space bounding box, then Möller–Trumbore against every
//! triangle in the node's local space. Triangles are double-sided.

use glam::{Affine3A, Vec2, Vec3};

use crate::resources::BoundingBox;
use crate::scene::{Camera, NodeHandle, Scene};

const TRIANGLE_EPSILON: f32 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit length.
    pub direction: Vec3,
}

impl Ray {
    #[must_use]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or(Vec3::NEG_Z),
        }
    }

    #[must_use]
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// The same ray expressed in the space `matrix` maps into. The direction
    /// is left unnormalized so `t` values stay comparable to world distances
    /// after mapping the hit point back.
    #[must_use]
    fn transformed(&self, matrix: &Affine3A) -> (Vec3, Vec3) {
        (
            matrix.transform_point3(self.origin),
            matrix.transform_vector3(self.direction),
        )
    }
}

/// Maps a pointer position in viewport pixels to normalized device
/// coordinates: x right, y up, both in [-1, 1].
#[must_use]
pub fn pointer_to_ndc(position: Vec2, viewport: Vec2) -> Option<Vec2> {
    if viewport.x <= 0.0 || viewport.y <= 0.0 {
        return None;
    }
    Some(Vec2::new(
        (position.x / viewport.x) * 2.0 - 1.0,
        1.0 - (position.y / viewport.y) * 2.0,
    ))
}

/// Slab test. Returns the entry distance (0 when the origin is inside).
#[must_use]
pub fn ray_aabb_intersection(origin: Vec3, dir: Vec3, bounds: &BoundingBox) -> Option<f32> {
    if bounds.is_empty() {
        return None;
    }

    let mut t_min: f32 = 0.0;
    let mut t_max: f32 = f32::INFINITY;
    for axis in 0..3 {
        let o = origin[axis];
        let d = dir[axis];
        let (lo, hi) = (bounds.min[axis], bounds.max[axis]);
        if d.abs() < 1e-6 {
            if o < lo || o > hi {
                return None;
            }
        } else {
            let inv_d = 1.0 / d;
            let mut t1 = (lo - o) * inv_d;
            let mut t2 = (hi - o) * inv_d;
            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }
            t_min = t_min.max(t1);
            t_max = t_max.min(t2);
            if t_min > t_max {
                return None;
            }
        }
    }
    Some(t_min)
}

/// Möller–Trumbore, double-sided. Returns the ray parameter of the hit.
#[must_use]
pub fn ray_triangle_intersect(origin: Vec3, dir: Vec3, v0: Vec3, v1: Vec3, v2: Vec3) -> Option<f32> {
    let edge1 = v1 - v0;
    let edge2 = v2 - v0;
    let h = dir.cross(edge2);
    let a = edge1.dot(h);

    // Parallel to the triangle plane.
    if a.abs() < TRIANGLE_EPSILON {
        return None;
    }

    let f = 1.0 / a;
    let s = origin - v0;
    let u = f * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }

    let q = s.cross(edge1);
    let v = f * dir.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }

    let t = f * edge2.dot(q);
    (t > TRIANGLE_EPSILON).then_some(t)
}

/// One ray/part hit.
#[derive(Debug, Clone, PartialEq)]
pub struct Intersection {
    pub node: NodeHandle,
    pub name: String,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub point: Vec3,
}

#[derive(Debug, Clone)]
pub struct Raycaster {
    pub ray: Ray,
    pub near: f32,
    pub far: f32,
}

impl Default for Raycaster {
    fn default() -> Self {
        Self {
            ray: Ray::new(Vec3::ZERO, Vec3::NEG_Z),
            near: 0.0,
            far: f32::INFINITY,
        }
    }
}

impl Raycaster {
    #[must_use]
    pub fn new(ray: Ray) -> Self {
        Self { ray, ..Self::default() }
    }

    /// Aims the ray from `camera` through `ndc`.
    pub fn set_from_camera(&mut self, ndc: Vec2, camera: &Camera) {
        self.ray = camera.ray_from_ndc(ndc);
    }

    /// Intersects every drawable node in the subtree of `root` (root included),
    /// nearest first. Nodes hit at equal distance keep traversal order.
    ///
    /// World matrices must be current.
    #[must_use]
    pub fn intersect_subtree(&self, scene: &Scene, root: NodeHandle) -> Vec<Intersection> {
        let mut hits: Vec<Intersection> = scene
            .subtree(root)
            .into_iter()
            .filter_map(|handle| self.intersect_node(scene, handle))
            .collect();

        hits.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        hits
    }

    /// Nearest hit in the subtree of `root`.
    #[must_use]
    pub fn intersect_nearest(&self, scene: &Scene, root: NodeHandle) -> Option<Intersection> {
        self.intersect_subtree(scene, root).into_iter().next()
    }

    fn intersect_node(&self, scene: &Scene, handle: NodeHandle) -> Option<Intersection> {
        let node = scene.get_node(handle)?;
        if !node.visible {
            return None;
        }
        let mesh = scene.meshes.get(node.mesh?)?;
        let world = *node.world_matrix();

        let world_bounds = mesh.bounds.transform(&world);
        let entry = ray_aabb_intersection(self.ray.origin, self.ray.direction, &world_bounds)?;
        if entry > self.far {
            return None;
        }

        let inverse = world.inverse();
        let (local_origin, local_dir) = self.ray.transformed(&inverse);

        let mut nearest: Option<(f32, Vec3)> = None;
        for i in 0..mesh.triangle_count() {
            let Some([a, b, c]) = mesh.triangle(i) else {
                continue;
            };
            let Some(t) = ray_triangle_intersect(local_origin, local_dir, a, b, c) else {
                continue;
            };
            let point = world.transform_point3(local_origin + local_dir * t);
            let distance = (point - self.ray.origin).length();
            if distance < self.near || distance > self.far {
                continue;
            }
            if nearest.is_none_or(|(d, _)| distance < d) {
                nearest = Some((distance, point));
            }
        }

        nearest.map(|(distance, point)| Intersection {
            node: handle,
            name: node.name.clone(),
            distance,
            point,
        })
    }
}
