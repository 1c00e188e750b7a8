use crate::scene::{OrderSummary, SessionConfig};
use serde::de::DeserializeOwned;
use std::path::Path;

#[derive(Debug, thiserror::Error)]
pub enum SerializationError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, SerializationError>;

pub fn load_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let json = std::fs::read_to_string(path)?;
    let value = serde_json::from_str(&json)?;
    Ok(value)
}

pub fn load_session_config(path: &Path) -> Result<SessionConfig> {
    let mut config: SessionConfig = load_json(path)?;
    config.settings = config.settings.sanitized();
    Ok(config)
}

pub fn save_order_to_file(order: &OrderSummary, path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(order)?;
    std::fs::write(path, json)?;
    Ok(())
}

pub fn load_order_from_file(path: &Path) -> Result<OrderSummary> {
    load_json(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{Rgb, TextureKey};
    use crate::scene::{OrderedPart, SceneSettings};
    use std::path::PathBuf;

    fn scratch_path(name: &str) -> PathBuf {
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        std::env::temp_dir().join(format!("configurator-{nonce}-{name}"))
    }

    #[test]
    fn test_minimal_session_config_uses_defaults() {
        let json = r#"{ "model": "shoes/shoe.gltf" }"#;
        let config: SessionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.model, PathBuf::from("shoes/shoe.gltf"));
        assert!(config.textures.is_empty());
        assert_eq!(config.settings, SceneSettings::default());
        assert!(config.environment.is_none());
    }

    #[test]
    fn test_session_config_with_textures_and_environment() {
        let json = r#"{
            "model": "shoes/shoe.gltf",
            "textures": {
                "leather": { "color": "leather/textures/leather.png" },
                "rubber": { "color": "rubber/textures/rubber.jpg", "roughness": "rubber/textures/rough.jpg" }
            },
            "environment": { "faces": ["px.png", "nx.png", "py.png", "ny.png", "pz.png", "nz.png"] },
            "settings": { "light_intensity": 2.5 }
        }"#;
        let config: SessionConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.textures.len(), 2);
        assert!(config.textures[&TextureKey::Rubber].roughness.is_some());
        assert_eq!(config.settings.light_intensity, 2.5);
        assert_eq!(config.settings.camera_zoom, 1.0);
        assert_eq!(config.environment.unwrap().faces[5], PathBuf::from("nz.png"));
    }

    #[test]
    fn test_loaded_settings_are_clamped() {
        let path = scratch_path("session.json");
        std::fs::write(
            &path,
            r#"{ "model": "m.gltf", "settings": { "camera_zoom": 50.0 } }"#,
        )
        .unwrap();
        let config = load_session_config(&path).unwrap();
        assert_eq!(config.settings.camera_zoom, 4.0);
        let _ = std::fs::remove_file(path);
    }

    #[test]
    fn test_order_save_load_via_file() {
        let order = OrderSummary {
            placed_at_unix: 1_700_000_000,
            model: "shoe.gltf".to_string(),
            parts: vec![OrderedPart {
                name: "sole".to_string(),
                color: Rgb::from_hex(0xff0000),
                surface: "rubber".to_string(),
            }],
        };
        let path = scratch_path("orders/order.json");
        save_order_to_file(&order, &path).unwrap();
        let json = std::fs::read_to_string(&path).unwrap();
        assert!(json.contains("\"#ff0000\""));
        let loaded = load_order_from_file(&path).unwrap();
        assert_eq!(loaded, order);
        if let Some(parent) = path.parent() {
            let _ = std::fs::remove_dir_all(parent);
        }
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = load_session_config(Path::new("no/such/session.json")).unwrap_err();
        assert!(matches!(err, SerializationError::Io(_)));
    }
}
