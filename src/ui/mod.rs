pub mod panels;

use crate::controller::UiEffect;
use crate::material::{Rgb, TextureSelection};

pub const ORDER_CONFIRMATION: &str = "Your custom shoe has been successfully ordered!";
pub const NO_FILE_CHOSEN: &str = "No file chosen";

/// Everything the page would show: panel visibility, label texts and the
/// current value of each control.
#[derive(Debug, Clone, PartialEq)]
pub struct UiState {
    show_customization: bool,
    show_image_upload: bool,
    selected_part_name: String,
    color: Rgb,
    texture: TextureSelection,
    image_file: Option<String>,
    warning: Option<String>,
    order_dialog: Option<String>,
    status: String,
}

impl Default for UiState {
    fn default() -> Self {
        Self::new()
    }
}

impl UiState {
    pub fn new() -> Self {
        Self {
            show_customization: false,
            show_image_upload: false,
            selected_part_name: String::new(),
            color: Rgb::WHITE,
            texture: TextureSelection::None,
            image_file: None,
            warning: None,
            order_dialog: None,
            status: String::new(),
        }
    }

    pub fn apply(&mut self, effect: UiEffect) {
        match effect {
            UiEffect::ResetTexturePicker => self.texture = TextureSelection::None,
            UiEffect::ResetImagePicker => self.image_file = None,
            UiEffect::ShowSelectedPart(name) => self.selected_part_name = name,
            UiEffect::ShowCustomization(visible) => {
                self.show_customization = visible;
                self.show_image_upload = visible;
            }
            UiEffect::Warning(message) => self.warning = Some(message),
            UiEffect::ResetControls => {
                self.selected_part_name.clear();
                self.color = Rgb::WHITE;
                self.texture = TextureSelection::None;
                self.image_file = None;
                self.warning = None;
            }
        }
    }

    pub fn show_customization(&self) -> bool {
        self.show_customization
    }

    pub fn show_image_upload(&self) -> bool {
        self.show_image_upload
    }

    pub fn selected_part_name(&self) -> &str {
        &self.selected_part_name
    }

    pub fn color(&self) -> Rgb {
        self.color
    }

    pub fn set_color(&mut self, color: Rgb) {
        self.color = color;
    }

    pub fn texture(&self) -> TextureSelection {
        self.texture
    }

    pub fn set_texture(&mut self, texture: TextureSelection) {
        self.texture = texture;
    }

    pub fn image_file_label(&self) -> &str {
        self.image_file.as_deref().unwrap_or(NO_FILE_CHOSEN)
    }

    pub fn set_image_file(&mut self, name: String) {
        self.image_file = Some(name);
    }

    pub fn warning(&self) -> Option<&str> {
        self.warning.as_deref()
    }

    pub fn dismiss_warning(&mut self) {
        self.warning = None;
    }

    pub fn order_dialog(&self) -> Option<&str> {
        self.order_dialog.as_deref()
    }

    pub fn open_order_dialog(&mut self) {
        self.order_dialog = Some(ORDER_CONFIRMATION.to_string());
    }

    pub fn close_order_dialog(&mut self) -> bool {
        self.order_dialog.take().is_some()
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    pub fn set_status(&mut self, status: String) {
        self.status = status;
    }
}
