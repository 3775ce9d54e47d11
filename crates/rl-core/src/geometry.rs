//! World-space geometry shared by the editor and the scene collaborators:
//! pick rays, ray hits, and axis-aligned bounding boxes.

use glam::{Mat4, Vec3};

/// A world-space ray produced from a pointer position and camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Map the ray into another space. The parameter `t` is preserved by
    /// affine maps, so hits found in local space stay comparable.
    pub fn transformed(&self, matrix: &Mat4) -> Ray {
        Ray {
            origin: matrix.transform_point3(self.origin),
            direction: matrix.transform_vector3(self.direction),
        }
    }
}

/// A single ray intersection reported by the scene collaborator.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayHit<H> {
    /// The drawable sub-node that was hit (may be deep inside an item's subtree).
    pub node: H,
    /// World-space distance from the ray origin.
    pub distance: f32,
    pub point: Vec3,
}

/// Axis-aligned bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(a: Vec3, b: Vec3) -> Self {
        Self {
            min: a.min(b),
            max: a.max(b),
        }
    }

    /// Box of the given full extents centered on the origin.
    pub fn centered(size: Vec3) -> Self {
        let half = size.abs() * 0.5;
        Self {
            min: -half,
            max: half,
        }
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn max_dimension(&self) -> f32 {
        self.size().max_element()
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn corners(&self) -> [Vec3; 8] {
        let (lo, hi) = (self.min, self.max);
        [
            Vec3::new(lo.x, lo.y, lo.z),
            Vec3::new(hi.x, lo.y, lo.z),
            Vec3::new(lo.x, hi.y, lo.z),
            Vec3::new(hi.x, hi.y, lo.z),
            Vec3::new(lo.x, lo.y, hi.z),
            Vec3::new(hi.x, lo.y, hi.z),
            Vec3::new(lo.x, hi.y, hi.z),
            Vec3::new(hi.x, hi.y, hi.z),
        ]
    }

    /// Bounding box of this box after an affine transform.
    pub fn transformed(&self, matrix: &Mat4) -> Aabb {
        let mut corners = self.corners().into_iter().map(|c| matrix.transform_point3(c));
        // corners() is never empty
        let first = corners.next().unwrap_or(Vec3::ZERO);
        corners.fold(Aabb::new(first, first), |acc, p| Aabb {
            min: acc.min.min(p),
            max: acc.max.max(p),
        })
    }

    pub fn contains(&self, p: Vec3) -> bool {
        p.cmpge(self.min).all() && p.cmple(self.max).all()
    }

    /// Slab test. Returns the smallest `t >= 0` at which the ray is inside
    /// the box, or `None` if it misses (or the box is entirely behind it).
    /// Rays with non-finite components never hit.
    pub fn intersect_ray(&self, ray: &Ray) -> Option<f32> {
        if !ray.origin.is_finite() || !ray.direction.is_finite() {
            return None;
        }
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.direction[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);

            if d.abs() < f32::EPSILON {
                if o < lo || o > hi {
                    return None;
                }
                continue;
            }

            let inv = 1.0 / d;
            let mut t0 = (lo - o) * inv;
            let mut t1 = (hi - o) * inv;
            if t0 > t1 {
                std::mem::swap(&mut t0, &mut t1);
            }
            t_min = t_min.max(t0);
            t_max = t_max.min(t1);
            if t_min > t_max {
                return None;
            }
        }

        Some(t_min)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ray_hits_box_in_front() {
        let b = Aabb::centered(Vec3::splat(2.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::NEG_Z);
        let t = b.intersect_ray(&ray).unwrap();
        assert!((t - 9.0).abs() < 1e-5);
        assert!((ray.at(t).z - 1.0).abs() < 1e-5);
    }

    #[test]
    fn non_finite_ray_never_hits() {
        let b = Aabb::centered(Vec3::splat(2.0));
        let nan_dir = Ray::new(Vec3::splat(100.0), Vec3::new(f32::NAN, -1.0, 0.0));
        let inf_origin = Ray::new(Vec3::new(0.0, f32::INFINITY, 0.0), Vec3::NEG_Y);
        assert_eq!(b.intersect_ray(&nan_dir), None);
        assert_eq!(b.intersect_ray(&inf_origin), None);
    }

    #[test]
    fn ray_misses_box_behind_origin() {
        let b = Aabb::centered(Vec3::splat(2.0));
        let ray = Ray::new(Vec3::new(0.0, 0.0, 10.0), Vec3::Z);
        assert_eq!(b.intersect_ray(&ray), None);
    }

    #[test]
    fn ray_parallel_to_slab_outside_misses() {
        let b = Aabb::centered(Vec3::splat(2.0));
        let ray = Ray::new(Vec3::new(0.0, 5.0, 10.0), Vec3::NEG_Z);
        assert_eq!(b.intersect_ray(&ray), None);
    }

    #[test]
    fn ray_starting_inside_hits_at_zero() {
        let b = Aabb::centered(Vec3::splat(2.0));
        let ray = Ray::new(Vec3::ZERO, Vec3::X);
        assert_eq!(b.intersect_ray(&ray), Some(0.0));
    }

    #[test]
    fn transformed_box_covers_rotated_corners() {
        let b = Aabb::centered(Vec3::new(2.0, 0.0, 0.0));
        let rot = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        let t = b.transformed(&rot);
        assert!((t.size().z - 2.0).abs() < 1e-5);
        assert!(t.size().x.abs() < 1e-5);
    }

    #[test]
    fn union_and_max_dimension() {
        let a = Aabb::new(Vec3::ZERO, Vec3::ONE);
        let b = Aabb::new(Vec3::new(2.0, 0.0, 0.0), Vec3::new(3.0, 0.5, 0.5));
        let u = a.union(&b);
        assert_eq!(u.size(), Vec3::new(3.0, 1.0, 1.0));
        assert_eq!(u.max_dimension(), 3.0);
        assert!(u.contains(Vec3::new(2.5, 0.2, 0.2)));
    }
}
