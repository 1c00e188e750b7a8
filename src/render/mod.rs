pub mod camera;
pub mod pick;

pub use camera::{OrbitCamera, Ray};
pub use pick::{pick, PickHit};

use crate::assets::EnvironmentMap;
use crate::material::{MaterialParams, TextureKey};
use crate::textures::TextureResource;
use crate::parts::{Part, PartId};
use glam::Mat4;
use std::collections::HashMap;

/// The rendering engine as seen by the configurator. Implementations turn
/// descriptors into engine-native materials and re-upload them on the next frame.
pub trait RenderBackend {
    /// Called once per preset at startup, before any material names the key.
    fn upload_texture(&mut self, key: TextureKey, texture: &TextureResource);
    /// Roughness map bound whenever a material's `roughness_map` names `key`.
    fn upload_roughness(&mut self, key: TextureKey, texture: &TextureResource);
    fn apply_material(&mut self, part: &Part, params: &MaterialParams);
    fn set_model_transform(&mut self, transform: Mat4);
    fn set_light_intensity(&mut self, intensity: f32);
    fn set_camera(&mut self, camera: &OrbitCamera);
    fn set_environment(&mut self, environment: &EnvironmentMap);
    /// Draws the tessellated panels over the scene.
    fn paint_ui(&mut self, primitives: &[egui::ClippedPrimitive], textures: &egui::TexturesDelta);
    fn render_frame(&mut self) {}
}

/// Backend that keeps the last state it was given. Used when no GPU is around.
#[derive(Debug, Default)]
pub struct HeadlessBackend {
    materials: HashMap<PartId, MaterialParams>,
    textures: HashMap<TextureKey, (u32, u32)>,
    roughness: HashMap<TextureKey, (u32, u32)>,
    model_transform: Option<Mat4>,
    light_intensity: Option<f32>,
    camera: Option<OrbitCamera>,
    environment_face_size: Option<(u32, u32)>,
    material_uploads: usize,
    ui_primitives: usize,
    ui_texture_updates: usize,
    frames: u64,
}

impl HeadlessBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn material(&self, part: PartId) -> Option<&MaterialParams> {
        self.materials.get(&part)
    }

    pub fn texture_size(&self, key: TextureKey) -> Option<(u32, u32)> {
        self.textures.get(&key).copied()
    }

    pub fn roughness_size(&self, key: TextureKey) -> Option<(u32, u32)> {
        self.roughness.get(&key).copied()
    }

    pub fn model_transform(&self) -> Option<Mat4> {
        self.model_transform
    }

    pub fn light_intensity(&self) -> Option<f32> {
        self.light_intensity
    }

    pub fn camera(&self) -> Option<&OrbitCamera> {
        self.camera.as_ref()
    }

    pub fn environment_face_size(&self) -> Option<(u32, u32)> {
        self.environment_face_size
    }

    pub fn material_uploads(&self) -> usize {
        self.material_uploads
    }

    /// Primitive count of the last painted UI frame.
    pub fn ui_primitives(&self) -> usize {
        self.ui_primitives
    }

    pub fn ui_texture_updates(&self) -> usize {
        self.ui_texture_updates
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl RenderBackend for HeadlessBackend {
    fn upload_texture(&mut self, key: TextureKey, texture: &TextureResource) {
        log::debug!("texture '{}' {}x{}", key.as_str(), texture.width(), texture.height());
        self.textures.insert(key, (texture.width(), texture.height()));
    }

    fn upload_roughness(&mut self, key: TextureKey, texture: &TextureResource) {
        log::debug!("roughness '{}' {}x{}", key.as_str(), texture.width(), texture.height());
        self.roughness.insert(key, (texture.width(), texture.height()));
    }

    fn apply_material(&mut self, part: &Part, params: &MaterialParams) {
        log::debug!(
            "material '{}': color {:?} emissive {:?} surface {}",
            part.name,
            params.base_color_rgba,
            params.emissive_rgb,
            params.surface
        );
        self.materials.insert(part.id, params.clone());
        self.material_uploads += 1;
    }

    fn set_model_transform(&mut self, transform: Mat4) {
        self.model_transform = Some(transform);
    }

    fn set_light_intensity(&mut self, intensity: f32) {
        log::debug!("light intensity {:.2}", intensity);
        self.light_intensity = Some(intensity);
    }

    fn set_camera(&mut self, camera: &OrbitCamera) {
        self.camera = Some(*camera);
    }

    fn set_environment(&mut self, environment: &EnvironmentMap) {
        self.environment_face_size = Some(environment.face_size());
    }

    fn paint_ui(&mut self, primitives: &[egui::ClippedPrimitive], textures: &egui::TexturesDelta) {
        self.ui_primitives = primitives.len();
        self.ui_texture_updates += textures.set.len();
    }

    fn render_frame(&mut self) {
        self.frames += 1;
    }
}
