use crate::material::{MaterialCapabilities, MaterialDescriptor};
use glam::{Mat4, Vec3};

/// Stable handle into a [`PartRegistry`]. Selection state stores these rather
/// than references so a torn-down registry can't leave a dangling highlight.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PartId(usize);

impl PartId {
    pub fn index(self) -> usize {
        self.0
    }
}

/// Axis-aligned bounds in model space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Vec3,
    pub max: Vec3,
}

impl Bounds {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn extent(&self) -> Vec3 {
        (self.max - self.min) * 0.5
    }

    pub fn union(&self, other: &Bounds) -> Bounds {
        Bounds {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Bounds of the eight corners after `transform`.
    pub fn transformed(&self, transform: &Mat4) -> Bounds {
        let corners = [
            Vec3::new(self.min.x, self.min.y, self.min.z),
            Vec3::new(self.max.x, self.min.y, self.min.z),
            Vec3::new(self.min.x, self.max.y, self.min.z),
            Vec3::new(self.max.x, self.max.y, self.min.z),
            Vec3::new(self.min.x, self.min.y, self.max.z),
            Vec3::new(self.max.x, self.min.y, self.max.z),
            Vec3::new(self.min.x, self.max.y, self.max.z),
            Vec3::new(self.max.x, self.max.y, self.max.z),
        ];
        let mut min = Vec3::splat(f32::INFINITY);
        let mut max = Vec3::splat(f32::NEG_INFINITY);
        for corner in corners {
            let p = transform.transform_point3(corner);
            min = min.min(p);
            max = max.max(p);
        }
        Bounds { min, max }
    }
}

#[derive(Debug, Clone)]
pub struct Part {
    pub id: PartId,
    pub name: String,
    pub bounds: Bounds,
    /// Model-space triangles used for picking. Empty means the bounds are the
    /// pick shape.
    pub triangles: Vec<[Vec3; 3]>,
    pub descriptor: MaterialDescriptor,
    default_descriptor: MaterialDescriptor,
}

impl Part {
    pub fn default_descriptor(&self) -> &MaterialDescriptor {
        &self.default_descriptor
    }

    pub fn reset_descriptor(&mut self) {
        self.descriptor = self.default_descriptor.clone();
    }
}

/// The fixed set of pickable parts of the loaded model. Parts are registered
/// once at load time and never removed individually.
#[derive(Debug, Default)]
pub struct PartRegistry {
    parts: Vec<Part>,
}

impl PartRegistry {
    pub fn new() -> Self {
        Self { parts: Vec::new() }
    }

    pub fn register(
        &mut self,
        name: Option<&str>,
        bounds: Bounds,
        capabilities: MaterialCapabilities,
    ) -> PartId {
        self.register_mesh(name, bounds, Vec::new(), capabilities)
    }

    pub fn register_mesh(
        &mut self,
        name: Option<&str>,
        bounds: Bounds,
        triangles: Vec<[Vec3; 3]>,
        capabilities: MaterialCapabilities,
    ) -> PartId {
        let id = PartId(self.parts.len());
        let base = match name.map(str::trim) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => format!("Part {}", id.0),
        };
        let name = self.unique_name(base);
        let descriptor = MaterialDescriptor::new(capabilities);
        log::debug!("Registered part {:?} '{}'", id, name);
        self.parts.push(Part {
            id,
            name,
            bounds,
            triangles,
            descriptor: descriptor.clone(),
            default_descriptor: descriptor,
        });
        id
    }

    fn unique_name(&self, base: String) -> String {
        if self.find(&base).is_none() {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base} ({n})");
            if self.find(&candidate).is_none() {
                return candidate;
            }
            n += 1;
        }
    }

    pub fn get(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id.0)
    }

    pub fn get_mut(&mut self, id: PartId) -> Option<&mut Part> {
        self.parts.get_mut(id.0)
    }

    pub fn find(&self, name: &str) -> Option<PartId> {
        self.parts
            .iter()
            .find(|part| part.name == name)
            .map(|part| part.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Part> {
        self.parts.iter()
    }

    pub fn ids(&self) -> impl Iterator<Item = PartId> + '_ {
        self.parts.iter().map(|part| part.id)
    }

    pub fn names(&self) -> Vec<&str> {
        self.parts.iter().map(|part| part.name.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Bounds enclosing every part, if any.
    pub fn bounds(&self) -> Option<Bounds> {
        self.parts
            .iter()
            .map(|part| part.bounds)
            .reduce(|acc, bounds| acc.union(&bounds))
    }

    pub fn reset_descriptors(&mut self) {
        for part in &mut self.parts {
            part.reset_descriptor();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn unit() -> Bounds {
        Bounds::new(Vec3::ZERO, Vec3::ONE)
    }

    #[test]
    fn missing_names_fall_back_to_position() {
        let mut registry = PartRegistry::new();
        registry.register(Some("sole"), unit(), MaterialCapabilities::default());
        let unnamed = registry.register(None, unit(), MaterialCapabilities::default());
        let blank = registry.register(Some("  "), unit(), MaterialCapabilities::default());
        assert_eq!(registry.get(unnamed).unwrap().name, "Part 1");
        assert_eq!(registry.get(blank).unwrap().name, "Part 2");
    }

    #[test]
    fn duplicate_names_are_suffixed() {
        let mut registry = PartRegistry::new();
        registry.register(Some("lace"), unit(), MaterialCapabilities::default());
        let second = registry.register(Some("lace"), unit(), MaterialCapabilities::default());
        assert_eq!(registry.get(second).unwrap().name, "lace (2)");
        assert_eq!(registry.find("lace (2)"), Some(second));
    }

    #[test]
    fn transformed_bounds_follow_rotation() {
        let bounds = Bounds::new(Vec3::new(0.0, 0.0, 0.0), Vec3::new(2.0, 1.0, 1.0));
        let rotated = bounds.transformed(&Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2));
        assert!((rotated.max.x - 1.0).abs() < 1e-5);
        assert!((rotated.min.z + 2.0).abs() < 1e-5);
    }

    #[test]
    fn registry_bounds_cover_all_parts() {
        let mut registry = PartRegistry::new();
        registry.register(None, unit(), MaterialCapabilities::default());
        registry.register(
            None,
            Bounds::new(Vec3::splat(-1.0), Vec3::ZERO),
            MaterialCapabilities::default(),
        );
        let all = registry.bounds().unwrap();
        assert_eq!(all.min, Vec3::splat(-1.0));
        assert_eq!(all.max, Vec3::ONE);
    }
}
