use crate::textures::TextureResource;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// 8-bit sRGB color as produced by a color input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const WHITE: Self = Self::new(0xff, 0xff, 0xff);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    pub const fn from_hex(hex: u32) -> Self {
        Self::new((hex >> 16) as u8, (hex >> 8) as u8, hex as u8)
    }

    pub fn to_array(self) -> [u8; 3] {
        [self.r, self.g, self.b]
    }

    pub fn to_linear_rgba(self) -> [f32; 4] {
        [
            srgb_to_linear(self.r),
            srgb_to_linear(self.g),
            srgb_to_linear(self.b),
            1.0,
        ]
    }
}

impl Default for Rgb {
    fn default() -> Self {
        Self::WHITE
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid color '{0}', expected #rrggbb")]
pub struct ParseColorError(String);

impl FromStr for Rgb {
    type Err = ParseColorError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let hex = value.trim().trim_start_matches('#');
        if hex.len() != 6 || !hex.chars().all(|ch| ch.is_ascii_hexdigit()) {
            return Err(ParseColorError(value.to_string()));
        }
        let packed = u32::from_str_radix(hex, 16).map_err(|_| ParseColorError(value.to_string()))?;
        Ok(Self::from_hex(packed))
    }
}

impl TryFrom<String> for Rgb {
    type Error = ParseColorError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Rgb> for String {
    fn from(value: Rgb) -> Self {
        value.to_string()
    }
}

fn srgb_to_linear(channel: u8) -> f32 {
    let c = channel as f32 / 255.0;
    if c <= 0.04045 {
        c / 12.92
    } else {
        ((c + 0.055) / 1.055).powf(2.4)
    }
}

/// Preset surface textures offered by the texture picker.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum TextureKey {
    Leather,
    Rubber,
    Denim,
}

impl TextureKey {
    pub const ALL: [Self; 3] = [Self::Leather, Self::Rubber, Self::Denim];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Leather => "leather",
            Self::Rubber => "rubber",
            Self::Denim => "denim",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Leather => "Leather",
            Self::Rubber => "Rubber",
            Self::Denim => "Denim",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown texture '{0}'")]
pub struct ParseTextureError(String);

impl FromStr for TextureKey {
    type Err = ParseTextureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|key| key.as_str().eq_ignore_ascii_case(value.trim()))
            .ok_or_else(|| ParseTextureError(value.to_string()))
    }
}

/// Value of the texture picker: a preset key or the "none" sentinel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TextureSelection {
    #[default]
    None,
    Preset(TextureKey),
}

impl FromStr for TextureSelection {
    type Err = ParseTextureError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("none") {
            return Ok(Self::None);
        }
        value.parse().map(Self::Preset)
    }
}

impl TryFrom<String> for TextureSelection {
    type Error = ParseTextureError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TextureSelection> for String {
    fn from(value: TextureSelection) -> Self {
        match value {
            TextureSelection::None => "none".to_string(),
            TextureSelection::Preset(key) => key.as_str().to_string(),
        }
    }
}

/// The single active surface map slot of a part.
#[derive(Debug, Clone, Default)]
pub enum SurfaceMap {
    #[default]
    None,
    Preset(TextureKey),
    Uploaded(Arc<TextureResource>),
}

impl SurfaceMap {
    pub fn preset(&self) -> Option<TextureKey> {
        match self {
            Self::Preset(key) => Some(*key),
            _ => None,
        }
    }

    pub fn uploaded(&self) -> Option<&Arc<TextureResource>> {
        match self {
            Self::Uploaded(texture) => Some(texture),
            _ => None,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Self::None)
    }

    pub fn label(&self) -> String {
        match self {
            Self::None => "none".to_string(),
            Self::Preset(key) => key.as_str().to_string(),
            Self::Uploaded(texture) => format!("upload:{}", texture.label),
        }
    }
}

impl PartialEq for SurfaceMap {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::None, Self::None) => true,
            (Self::Preset(a), Self::Preset(b)) => a == b,
            (Self::Uploaded(a), Self::Uploaded(b)) => Arc::ptr_eq(a, b),
            _ => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Highlight {
    #[default]
    None,
    Hovered,
    Selected,
}

impl Highlight {
    pub fn emissive_rgb(self) -> [f32; 3] {
        let grey = match self {
            Self::None => 0x00,
            Self::Hovered => 0x55,
            Self::Selected => 0x99,
        };
        let v = grey as f32 / 255.0;
        [v, v, v]
    }
}

/// What a part's source material can express, read once at registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MaterialCapabilities {
    pub emissive: bool,
}

impl Default for MaterialCapabilities {
    fn default() -> Self {
        Self { emissive: true }
    }
}

/// Customizable visual state of a part. `highlight` is an overlay and never
/// part of the committed appearance.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialDescriptor {
    pub base_color: Rgb,
    pub surface: SurfaceMap,
    pub roughness_map: Option<TextureKey>,
    pub highlight: Highlight,
    pub capabilities: MaterialCapabilities,
}

impl MaterialDescriptor {
    pub fn new(capabilities: MaterialCapabilities) -> Self {
        Self {
            capabilities,
            ..Self::default()
        }
    }

    /// Writes the overlay if the material has a channel for it. Returns whether
    /// anything changed.
    pub fn set_highlight(&mut self, highlight: Highlight) -> bool {
        if !self.capabilities.emissive || self.highlight == highlight {
            return false;
        }
        self.highlight = highlight;
        true
    }

    pub fn committed(&self) -> Self {
        Self {
            highlight: Highlight::None,
            ..self.clone()
        }
    }

    pub fn to_params(&self) -> MaterialParams {
        MaterialParams {
            base_color_rgba: self.base_color.to_linear_rgba(),
            emissive_rgb: self.highlight.emissive_rgb(),
            surface: self.surface.label(),
            roughness_map: self.roughness_map,
        }
    }
}

/// Engine-facing view of a descriptor.
#[derive(Debug, Clone, PartialEq)]
pub struct MaterialParams {
    pub base_color_rgba: [f32; 4],
    pub emissive_rgb: [f32; 3],
    pub surface: String,
    pub roughness_map: Option<TextureKey>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn color_parses_hex_with_and_without_hash() {
        assert_eq!("#ff0000".parse::<Rgb>().unwrap(), Rgb::new(255, 0, 0));
        assert_eq!("00FF7f".parse::<Rgb>().unwrap(), Rgb::new(0, 255, 127));
        assert!("#ff00".parse::<Rgb>().is_err());
        assert!("#gg0000".parse::<Rgb>().is_err());
        assert_eq!(Rgb::from_hex(0x123456).to_string(), "#123456");
    }

    #[test]
    fn texture_selection_accepts_none_sentinel() {
        assert_eq!(
            "none".parse::<TextureSelection>().unwrap(),
            TextureSelection::None
        );
        assert_eq!(
            "Leather".parse::<TextureSelection>().unwrap(),
            TextureSelection::Preset(TextureKey::Leather)
        );
        assert!("velvet".parse::<TextureSelection>().is_err());
    }

    #[test]
    fn highlight_is_skipped_without_emissive_channel() {
        let mut descriptor = MaterialDescriptor::new(MaterialCapabilities { emissive: false });
        assert!(!descriptor.set_highlight(Highlight::Hovered));
        assert_eq!(descriptor.highlight, Highlight::None);
    }

    #[test]
    fn committed_view_drops_overlay() {
        let mut descriptor = MaterialDescriptor::default();
        descriptor.base_color = Rgb::new(1, 2, 3);
        descriptor.set_highlight(Highlight::Selected);
        let committed = descriptor.committed();
        assert_eq!(committed.highlight, Highlight::None);
        assert_eq!(committed.base_color, Rgb::new(1, 2, 3));
    }

    #[test]
    fn selected_glow_is_brighter_than_hover() {
        let hover = Highlight::Hovered.emissive_rgb()[0];
        let selected = Highlight::Selected.emissive_rgb()[0];
        assert!(selected > hover);
        assert_eq!(Highlight::None.emissive_rgb(), [0.0; 3]);
    }
}
