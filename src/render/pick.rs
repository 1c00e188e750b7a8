//! Pointer picking over the part set.
//!
//! A part's world-space bounding box rejects rays early. Parts that carry
//! triangles are then hit-tested against them, so a part nested inside
//! another's box is still reachable. Parts without triangles use the box
//! itself; a box the ray starts inside counts as hit at distance zero.

use crate::parts::{Part, PartId, PartRegistry};
use crate::render::camera::Ray;
use glam::{Mat4, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PickHit {
    pub part: PartId,
    pub distance: f32,
}

pub fn pick(ray: &Ray, parts: &PartRegistry, model_transform: &Mat4) -> Option<PickHit> {
    parts
        .iter()
        .filter_map(|part| {
            pick_part(ray, part, model_transform).map(|distance| PickHit {
                part: part.id,
                distance,
            })
        })
        .min_by(|a, b| a.distance.total_cmp(&b.distance))
}

fn pick_part(ray: &Ray, part: &Part, model_transform: &Mat4) -> Option<f32> {
    let bounds = part.bounds.transformed(model_transform);
    let box_distance = ray_box_distance(ray, bounds.min, bounds.max)?;
    if part.triangles.is_empty() {
        return Some(box_distance);
    }
    part.triangles
        .iter()
        .filter_map(|triangle| {
            let [a, b, c] = (*triangle).map(|v| model_transform.transform_point3(v));
            ray_triangle_distance(ray, a, b, c)
        })
        .min_by(f32::total_cmp)
}

/// Slab test. Returns the entry distance along the ray, if any.
fn ray_box_distance(ray: &Ray, min: Vec3, max: Vec3) -> Option<f32> {
    let mut t_min = 0.0f32;
    let mut t_max = f32::INFINITY;
    for axis in 0..3 {
        let origin = ray.origin[axis];
        let direction = ray.direction[axis];
        if direction.abs() < 1e-8 {
            if origin < min[axis] || origin > max[axis] {
                return None;
            }
            continue;
        }
        let inv = 1.0 / direction;
        let mut t0 = (min[axis] - origin) * inv;
        let mut t1 = (max[axis] - origin) * inv;
        if t0 > t1 {
            std::mem::swap(&mut t0, &mut t1);
        }
        t_min = t_min.max(t0);
        t_max = t_max.min(t1);
        if t_max < t_min {
            return None;
        }
    }
    Some(t_min)
}

/// Möller-Trumbore, both faces.
fn ray_triangle_distance(ray: &Ray, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    const EPSILON: f32 = 1e-7;
    let edge1 = b - a;
    let edge2 = c - a;
    let h = ray.direction.cross(edge2);
    let det = edge1.dot(h);
    if det.abs() < EPSILON {
        return None;
    }
    let inv_det = 1.0 / det;
    let s = ray.origin - a;
    let u = inv_det * s.dot(h);
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(edge1);
    let v = inv_det * ray.direction.dot(q);
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = inv_det * edge2.dot(q);
    (t > EPSILON).then_some(t)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::MaterialCapabilities;
    use crate::parts::Bounds;

    fn ray(origin: Vec3, direction: Vec3) -> Ray {
        Ray {
            origin,
            direction: direction.normalize(),
        }
    }

    fn two_boxes() -> (PartRegistry, PartId, PartId) {
        let mut parts = PartRegistry::new();
        let near = parts.register(
            Some("near"),
            Bounds::new(Vec3::new(-1.0, -1.0, 1.0), Vec3::new(1.0, 1.0, 2.0)),
            MaterialCapabilities::default(),
        );
        let far = parts.register(
            Some("far"),
            Bounds::new(Vec3::new(-1.0, -1.0, -2.0), Vec3::new(1.0, 1.0, -1.0)),
            MaterialCapabilities::default(),
        );
        (parts, near, far)
    }

    #[test]
    fn nearest_part_wins() {
        let (parts, near, _) = two_boxes();
        let hit = pick(&ray(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z), &parts, &Mat4::IDENTITY).unwrap();
        assert_eq!(hit.part, near);
        assert!((hit.distance - 8.0).abs() < 1e-5);
    }

    #[test]
    fn miss_returns_none() {
        let (parts, _, _) = two_boxes();
        let hit = pick(&ray(Vec3::new(5.0, 0.0, 10.0), -Vec3::Z), &parts, &Mat4::IDENTITY);
        assert!(hit.is_none());
    }

    #[test]
    fn boxes_behind_the_ray_are_ignored() {
        let (parts, _, far) = two_boxes();
        let hit = pick(&ray(Vec3::new(0.0, 0.0, 0.0), -Vec3::Z), &parts, &Mat4::IDENTITY).unwrap();
        assert_eq!(hit.part, far);
    }

    /// Two triangles covering the square `[-h, h]²` at depth `z`.
    fn quad(h: f32, z: f32) -> Vec<[Vec3; 3]> {
        let (a, b) = (Vec3::new(-h, -h, z), Vec3::new(h, -h, z));
        let (c, d) = (Vec3::new(h, h, z), Vec3::new(-h, h, z));
        vec![[a, b, c], [a, c, d]]
    }

    /// An open shell: side walls and a floor, nothing over the front.
    fn upper_with_laces() -> (PartRegistry, PartId, PartId) {
        let mut parts = PartRegistry::new();
        let (lo, hi) = (Vec3::splat(-1.0), Vec3::splat(1.0));
        let mut walls = Vec::new();
        for x in [-1.0f32, 1.0] {
            walls.push([Vec3::new(x, -1.0, -1.0), Vec3::new(x, 1.0, -1.0), Vec3::new(x, 1.0, 1.0)]);
            walls.push([Vec3::new(x, -1.0, -1.0), Vec3::new(x, 1.0, 1.0), Vec3::new(x, -1.0, 1.0)]);
        }
        walls.push([Vec3::new(-1.0, -1.0, -1.0), Vec3::new(1.0, -1.0, -1.0), Vec3::new(1.0, -1.0, 1.0)]);
        let upper = parts.register_mesh(
            Some("upper"),
            Bounds::new(lo, hi),
            walls,
            MaterialCapabilities::default(),
        );
        let laces = parts.register_mesh(
            Some("laces"),
            Bounds::new(Vec3::new(-0.2, -0.2, 0.5), Vec3::new(0.2, 0.2, 0.9)),
            quad(0.2, 0.9),
            MaterialCapabilities::default(),
        );
        (parts, upper, laces)
    }

    #[test]
    fn part_nested_inside_another_box_is_pickable() {
        let (parts, _, laces) = upper_with_laces();
        let mut hits = 0;
        for i in -10..=10 {
            for j in -10..=10 {
                let origin = Vec3::new(i as f32 * 0.019, j as f32 * 0.019, 10.0);
                let hit = pick(&ray(origin, -Vec3::Z), &parts, &Mat4::IDENTITY);
                if hit.map(|hit| hit.part) == Some(laces) {
                    hits += 1;
                }
            }
        }
        assert_eq!(hits, 21 * 21);
    }

    #[test]
    fn empty_space_inside_a_box_misses_its_mesh() {
        let (parts, upper, _) = upper_with_laces();
        let hit = pick(&ray(Vec3::new(0.5, 0.5, 10.0), -Vec3::Z), &parts, &Mat4::IDENTITY);
        assert!(hit.is_none());
        let side = pick(&ray(Vec3::new(10.0, 0.3, -0.2), -Vec3::X), &parts, &Mat4::IDENTITY).unwrap();
        assert_eq!(side.part, upper);
        assert!((side.distance - 9.0).abs() < 1e-5);
    }

    #[test]
    fn triangle_hits_respect_model_transform() {
        let (parts, _, laces) = upper_with_laces();
        let shifted = Mat4::from_translation(Vec3::new(3.0, 0.0, 0.0));
        let hit = pick(&ray(Vec3::new(3.0, 0.0, 10.0), -Vec3::Z), &parts, &shifted).unwrap();
        assert_eq!(hit.part, laces);
        assert!((hit.distance - 9.1).abs() < 1e-4);
    }

    #[test]
    fn model_rotation_is_respected() {
        let (parts, _, far) = two_boxes();
        // Half a turn swaps which box faces +Z.
        let rotation = Mat4::from_rotation_y(std::f32::consts::PI);
        let hit = pick(&ray(Vec3::new(0.0, 0.0, 10.0), -Vec3::Z), &parts, &rotation).unwrap();
        assert_eq!(hit.part, far);
    }
}
