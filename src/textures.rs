use crate::assets::AssetError;
use crate::error::ConfigError;
use crate::material::TextureKey;
use image::RgbaImage;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Decoded RGBA8 texture ready for upload by the rendering layer.
pub struct TextureResource {
    pub label: String,
    pub image: RgbaImage,
}

impl TextureResource {
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    pub fn height(&self) -> u32 {
        self.image.height()
    }
}

impl fmt::Debug for TextureResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TextureResource")
            .field("label", &self.label)
            .field("width", &self.image.width())
            .field("height", &self.image.height())
            .finish()
    }
}

pub fn decode_image(label: &str, bytes: &[u8]) -> Result<TextureResource, ConfigError> {
    let decoded = image::load_from_memory(bytes).map_err(|err| ConfigError::ImageDecode {
        label: label.to_string(),
        reason: err.to_string(),
    })?;
    let image = decoded.to_rgba8();
    if image.width() == 0 || image.height() == 0 {
        return Err(ConfigError::ImageDecode {
            label: label.to_string(),
            reason: "image has no pixels".to_string(),
        });
    }
    Ok(TextureResource {
        label: label.to_string(),
        image,
    })
}

/// File locations for one preset texture.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TextureSource {
    pub color: PathBuf,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roughness: Option<PathBuf>,
}

pub type TextureSources = BTreeMap<TextureKey, TextureSource>;

struct TextureEntry {
    color: Arc<TextureResource>,
    roughness: Option<Arc<TextureResource>>,
}

/// Fixed `TextureKey -> resource` table, filled once at startup.
#[derive(Default)]
pub struct TextureTable {
    entries: BTreeMap<TextureKey, TextureEntry>,
}

impl TextureTable {
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// Loads every configured texture. A texture that fails stays unbound and
    /// its error is returned alongside the table.
    pub fn load(base_dir: &Path, sources: &TextureSources) -> (Self, Vec<AssetError>) {
        let mut table = Self::new();
        let mut errors = Vec::new();
        for (key, source) in sources {
            let color = match load_texture_file(&base_dir.join(&source.color)) {
                Ok(texture) => texture,
                Err(err) => {
                    log::warn!("Texture '{}' unavailable: {}", key.as_str(), err);
                    errors.push(err);
                    continue;
                }
            };
            let roughness = match &source.roughness {
                Some(path) => match load_texture_file(&base_dir.join(path)) {
                    Ok(texture) => Some(texture),
                    Err(err) => {
                        log::warn!("Roughness map for '{}' unavailable: {}", key.as_str(), err);
                        errors.push(err);
                        None
                    }
                },
                None => None,
            };
            table.insert(*key, color, roughness);
        }
        log::info!("Loaded {} preset textures", table.entries.len());
        (table, errors)
    }

    pub fn insert(
        &mut self,
        key: TextureKey,
        color: TextureResource,
        roughness: Option<TextureResource>,
    ) {
        self.entries.insert(
            key,
            TextureEntry {
                color: Arc::new(color),
                roughness: roughness.map(Arc::new),
            },
        );
    }

    pub fn contains(&self, key: TextureKey) -> bool {
        self.entries.contains_key(&key)
    }

    pub fn color(&self, key: TextureKey) -> Option<&Arc<TextureResource>> {
        self.entries.get(&key).map(|entry| &entry.color)
    }

    pub fn roughness(&self, key: TextureKey) -> Option<&Arc<TextureResource>> {
        self.entries.get(&key).and_then(|entry| entry.roughness.as_ref())
    }

    pub fn has_roughness(&self, key: TextureKey) -> bool {
        self.entries
            .get(&key)
            .is_some_and(|entry| entry.roughness.is_some())
    }

    pub fn keys(&self) -> impl Iterator<Item = TextureKey> + '_ {
        self.entries.keys().copied()
    }
}

fn load_texture_file(path: &Path) -> Result<TextureResource, AssetError> {
    let bytes = std::fs::read(path).map_err(|source| AssetError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let label = path
        .file_name()
        .and_then(|value| value.to_str())
        .unwrap_or("texture");
    decode_image(label, &bytes).map_err(|err| AssetError::Texture {
        path: path.display().to_string(),
        reason: err.to_string(),
    })
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::io::Cursor;

    pub(crate) fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let image = RgbaImage::from_pixel(width, height, image::Rgba([200, 40, 40, 255]));
        let mut bytes = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image)
            .write_to(&mut bytes, image::ImageFormat::Png)
            .unwrap();
        bytes.into_inner()
    }

    pub(crate) fn solid_texture(label: &str) -> TextureResource {
        TextureResource {
            label: label.to_string(),
            image: RgbaImage::from_pixel(1, 1, image::Rgba([255, 255, 255, 255])),
        }
    }

    fn scratch_dir(tag: &str) -> PathBuf {
        let nonce = std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos();
        let dir = std::env::temp_dir().join(format!("configurator-{tag}-{nonce}"));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    #[test]
    fn decode_accepts_png() {
        let texture = decode_image("upload.png", &png_bytes(3, 2)).unwrap();
        assert_eq!((texture.width(), texture.height()), (3, 2));
        assert_eq!(texture.label, "upload.png");
    }

    #[test]
    fn decode_rejects_garbage() {
        let err = decode_image("notes.txt", b"definitely not an image").unwrap_err();
        assert!(matches!(err, ConfigError::ImageDecode { .. }));
    }

    #[test]
    fn missing_texture_file_leaves_key_unbound() {
        let dir = scratch_dir("textures");
        std::fs::write(dir.join("leather.png"), png_bytes(2, 2)).unwrap();
        std::fs::write(dir.join("leather_rough.png"), png_bytes(2, 2)).unwrap();

        let mut sources = TextureSources::new();
        sources.insert(
            TextureKey::Leather,
            TextureSource {
                color: PathBuf::from("leather.png"),
                roughness: Some(PathBuf::from("leather_rough.png")),
            },
        );
        sources.insert(
            TextureKey::Denim,
            TextureSource {
                color: PathBuf::from("denim.jpg"),
                roughness: None,
            },
        );

        let (table, errors) = TextureTable::load(&dir, &sources);
        assert!(table.contains(TextureKey::Leather));
        assert!(table.has_roughness(TextureKey::Leather));
        assert!(!table.contains(TextureKey::Denim));
        assert_eq!(errors.len(), 1);
        assert!(matches!(errors[0], AssetError::Read { .. }));

        let _ = std::fs::remove_dir_all(dir);
    }
}
