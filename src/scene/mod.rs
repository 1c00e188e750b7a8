pub mod serialization;

use crate::material::{Rgb, SurfaceMap};
use crate::parts::PartRegistry;
use crate::textures::TextureSources;
use glam::Mat4;
use std::path::PathBuf;

pub const LIGHT_INTENSITY_RANGE: (f32, f32) = (0.0, 5.0);
pub const MODEL_ROTATION_RANGE: (f32, f32) = (-180.0, 180.0);
pub const CAMERA_ZOOM_RANGE: (f32, f32) = (0.25, 4.0);

/// Environment cube-map faces, relative to the session directory.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct EnvironmentData {
    pub faces: [PathBuf; 6],
}

/// Values behind the settings panel.
#[derive(Debug, Clone, Copy, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SceneSettings {
    pub light_intensity: f32,
    pub model_rotation_deg: f32,
    pub camera_zoom: f32,
}

impl Default for SceneSettings {
    fn default() -> Self {
        Self {
            light_intensity: 1.0,
            model_rotation_deg: 0.0,
            camera_zoom: 1.0,
        }
    }
}

impl SceneSettings {
    pub fn set_light_intensity(&mut self, value: f32) -> bool {
        let value = clamp_finite(value, LIGHT_INTENSITY_RANGE, self.light_intensity);
        replace_if_changed(&mut self.light_intensity, value)
    }

    pub fn set_model_rotation(&mut self, degrees: f32) -> bool {
        let value = clamp_finite(degrees, MODEL_ROTATION_RANGE, self.model_rotation_deg);
        replace_if_changed(&mut self.model_rotation_deg, value)
    }

    pub fn set_camera_zoom(&mut self, zoom: f32) -> bool {
        let value = clamp_finite(zoom, CAMERA_ZOOM_RANGE, self.camera_zoom);
        replace_if_changed(&mut self.camera_zoom, value)
    }

    /// Model rotation about the vertical axis.
    pub fn model_transform(&self) -> Mat4 {
        Mat4::from_rotation_y(self.model_rotation_deg.to_radians())
    }

    /// Clamps values that came from a file.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();
        self.light_intensity =
            clamp_finite(self.light_intensity, LIGHT_INTENSITY_RANGE, defaults.light_intensity);
        self.model_rotation_deg =
            clamp_finite(self.model_rotation_deg, MODEL_ROTATION_RANGE, defaults.model_rotation_deg);
        self.camera_zoom = clamp_finite(self.camera_zoom, CAMERA_ZOOM_RANGE, defaults.camera_zoom);
        self
    }
}

fn clamp_finite(value: f32, (min, max): (f32, f32), fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

fn replace_if_changed(slot: &mut f32, value: f32) -> bool {
    if (*slot - value).abs() > f32::EPSILON {
        *slot = value;
        true
    } else {
        false
    }
}

/// Everything needed to start a configuration session.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SessionConfig {
    pub model: PathBuf,
    #[serde(default)]
    pub textures: TextureSources,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub environment: Option<EnvironmentData>,
    #[serde(default)]
    pub settings: SceneSettings,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order_output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderedPart {
    pub name: String,
    pub color: Rgb,
    pub surface: String,
}

/// What gets recorded when the user places an order. Built from committed
/// descriptors only, so highlight overlays never end up in it.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct OrderSummary {
    pub placed_at_unix: u64,
    pub model: String,
    pub parts: Vec<OrderedPart>,
}

impl OrderSummary {
    pub fn from_parts(model: &str, parts: &PartRegistry, placed_at_unix: u64) -> Self {
        let parts = parts
            .iter()
            .map(|part| {
                let committed = part.descriptor.committed();
                let surface = match &committed.surface {
                    SurfaceMap::None => "none".to_string(),
                    SurfaceMap::Preset(key) => key.as_str().to_string(),
                    SurfaceMap::Uploaded(texture) => {
                        format!("custom image ({})", texture.label)
                    }
                };
                OrderedPart {
                    name: part.name.clone(),
                    color: committed.base_color,
                    surface,
                }
            })
            .collect();
        Self {
            placed_at_unix,
            model: model.to_string(),
            parts,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Highlight, MaterialCapabilities, TextureKey};
    use crate::parts::Bounds;
    use glam::Vec3;

    #[test]
    fn settings_clamp_to_panel_ranges() {
        let mut settings = SceneSettings::default();
        assert!(settings.set_light_intensity(9.0));
        assert_eq!(settings.light_intensity, 5.0);
        assert!(settings.set_camera_zoom(0.0));
        assert_eq!(settings.camera_zoom, 0.25);
        assert!(!settings.set_camera_zoom(f32::NAN));
        assert!(settings.set_model_rotation(-720.0));
        assert_eq!(settings.model_rotation_deg, -180.0);
    }

    #[test]
    fn unchanged_setting_reports_false() {
        let mut settings = SceneSettings::default();
        assert!(!settings.set_light_intensity(1.0));
    }

    #[test]
    fn model_transform_rotates_about_y() {
        let mut settings = SceneSettings::default();
        settings.set_model_rotation(90.0);
        let p = settings.model_transform().transform_point3(Vec3::X);
        assert!((p - Vec3::new(0.0, 0.0, -1.0)).length() < 1e-5);
    }

    #[test]
    fn order_ignores_highlight_overlay() {
        let mut parts = PartRegistry::new();
        let id = parts.register(
            Some("tongue"),
            Bounds::new(Vec3::ZERO, Vec3::ONE),
            MaterialCapabilities::default(),
        );
        let part = parts.get_mut(id).unwrap();
        part.descriptor.base_color = Rgb::from_hex(0xaa0000);
        part.descriptor.surface = SurfaceMap::Preset(TextureKey::Denim);
        part.descriptor.set_highlight(Highlight::Selected);

        let order = OrderSummary::from_parts("shoe.gltf", &parts, 7);
        assert_eq!(order.parts.len(), 1);
        assert_eq!(order.parts[0].color, Rgb::from_hex(0xaa0000));
        assert_eq!(order.parts[0].surface, "denim");
        assert_eq!(order.placed_at_unix, 7);
    }
}
