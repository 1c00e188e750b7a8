use crate::material::{Rgb, TextureSelection};
use glam::Vec2;
use std::path::PathBuf;

/// Events coming from the windowing/UI layer. Session scripts list these in
/// JSON, e.g. `{ "type": "pointer_move", "x": 640, "y": 360 }`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InputEvent {
    PointerMove { x: f32, y: f32 },
    PointerLeave,
    Click,
    ColorInput { color: Rgb },
    TextureSelect { texture: TextureSelection },
    ImageChosen { path: PathBuf },
    PartChosen { name: String },
    PlaceOrder,
    CloseDialog,
    LightIntensity { value: f32 },
    ModelRotation { degrees: f32 },
    CameraZoom { zoom: f32 },
    Orbit { yaw: f32, pitch: f32 },
    Resize { width: u32, height: u32 },
    Wait { millis: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerState {
    pub position: Option<Vec2>,
    pub viewport: Vec2,
}

impl Default for PointerState {
    fn default() -> Self {
        Self {
            position: None,
            viewport: Vec2::new(1280.0, 720.0),
        }
    }
}

impl PointerState {
    pub fn handle(&mut self, event: &InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => self.position = Some(Vec2::new(*x, *y)),
            InputEvent::PointerLeave => self.position = None,
            InputEvent::Resize { width, height } => {
                self.viewport = Vec2::new((*width).max(1) as f32, (*height).max(1) as f32);
            }
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::TextureKey;

    #[test]
    fn script_events_parse() {
        let json = r##"[
            { "type": "pointer_move", "x": 10, "y": 20.5 },
            { "type": "click" },
            { "type": "color_input", "color": "#ff0000" },
            { "type": "texture_select", "texture": "leather" },
            { "type": "texture_select", "texture": "none" },
            { "type": "camera_zoom", "zoom": 1.5 }
        ]"##;
        let events: Vec<InputEvent> = serde_json::from_str(json).unwrap();
        assert_eq!(events[0], InputEvent::PointerMove { x: 10.0, y: 20.5 });
        assert_eq!(events[1], InputEvent::Click);
        assert_eq!(
            events[2],
            InputEvent::ColorInput {
                color: Rgb::from_hex(0xff0000)
            }
        );
        assert_eq!(
            events[3],
            InputEvent::TextureSelect {
                texture: TextureSelection::Preset(TextureKey::Leather)
            }
        );
        assert_eq!(
            events[4],
            InputEvent::TextureSelect {
                texture: TextureSelection::None
            }
        );
    }

    #[test]
    fn unknown_texture_is_rejected() {
        let json = r#"{ "type": "texture_select", "texture": "velvet" }"#;
        assert!(serde_json::from_str::<InputEvent>(json).is_err());
    }

    #[test]
    fn pointer_state_tracks_moves_and_resizes() {
        let mut pointer = PointerState::default();
        pointer.handle(&InputEvent::PointerMove { x: 1.0, y: 2.0 });
        pointer.handle(&InputEvent::Resize {
            width: 0,
            height: 600,
        });
        assert_eq!(pointer.position, Some(Vec2::new(1.0, 2.0)));
        assert_eq!(pointer.viewport, Vec2::new(1.0, 600.0));
        pointer.handle(&InputEvent::PointerLeave);
        assert_eq!(pointer.position, None);
    }
}
