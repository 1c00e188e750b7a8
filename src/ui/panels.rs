//! egui rendition of the configurator page: part list, customization panel,
//! settings panel and the order confirmation dialog.
//!
//! Widgets never touch the controller. Every user action comes back as an
//! [`InputEvent`] for the app to dispatch like any other event.

use crate::app::input::InputEvent;
use crate::material::{Rgb, TextureKey, TextureSelection};
use crate::scene::{SceneSettings, CAMERA_ZOOM_RANGE, LIGHT_INTENSITY_RANGE, MODEL_ROTATION_RANGE};
use crate::ui::UiState;

pub struct PanelInput<'a> {
    pub part_names: &'a [&'a str],
    pub textures: &'a [TextureKey],
    pub settings: SceneSettings,
}

pub fn show(ctx: &egui::Context, ui_state: &mut UiState, input: &PanelInput<'_>) -> Vec<InputEvent> {
    let mut events = Vec::new();

    egui::SidePanel::left("parts")
        .resizable(false)
        .show(ctx, |ui| {
            ui.heading("Parts");
            for name in input.part_names {
                let selected = ui_state.selected_part_name() == *name;
                if ui.selectable_label(selected, *name).clicked() {
                    events.push(InputEvent::PartChosen {
                        name: (*name).to_string(),
                    });
                }
            }
            ui.separator();
            if ui.button("Place order").clicked() {
                events.push(InputEvent::PlaceOrder);
            }
        });

    egui::SidePanel::right("customize")
        .resizable(false)
        .show(ctx, |ui| {
            if ui_state.show_customization() {
                customization_panel(ui, ui_state, input.textures, &mut events);
            } else {
                ui.label("Click a part of the shoe to customize it.");
            }
            ui.separator();
            settings_panel(ui, input.settings, &mut events);
            if let Some(warning) = ui_state.warning().map(str::to_string) {
                ui.separator();
                ui.colored_label(egui::Color32::from_rgb(230, 160, 40), warning);
                if ui.small_button("Dismiss").clicked() {
                    ui_state.dismiss_warning();
                }
            }
            if !ui_state.status().is_empty() {
                ui.label(ui_state.status().to_string());
            }
        });

    if let Some(message) = ui_state.order_dialog().map(str::to_string) {
        egui::Window::new("Order placed")
            .collapsible(false)
            .resizable(false)
            .anchor(egui::Align2::CENTER_CENTER, egui::Vec2::ZERO)
            .show(ctx, |ui| {
                ui.label(message);
                if ui.button("Close").clicked() {
                    events.push(InputEvent::CloseDialog);
                }
            });
    }

    events
}

fn customization_panel(
    ui: &mut egui::Ui,
    ui_state: &mut UiState,
    textures: &[TextureKey],
    events: &mut Vec<InputEvent>,
) {
    ui.heading(ui_state.selected_part_name().to_string());

    let mut color = ui_state.color().to_array();
    ui.horizontal(|ui| {
        ui.label("Color");
        if ui.color_edit_button_srgb(&mut color).changed() {
            let color = Rgb::new(color[0], color[1], color[2]);
            ui_state.set_color(color);
            events.push(InputEvent::ColorInput { color });
        }
    });

    let mut texture = ui_state.texture();
    egui::ComboBox::from_label("Texture")
        .selected_text(texture_label(texture))
        .show_ui(ui, |ui| {
            ui.selectable_value(&mut texture, TextureSelection::None, "None");
            for key in textures {
                ui.selectable_value(&mut texture, TextureSelection::Preset(*key), key.label());
            }
        });
    if texture != ui_state.texture() {
        ui_state.set_texture(texture);
        events.push(InputEvent::TextureSelect { texture });
    }

    if ui_state.show_image_upload() {
        ui.horizontal(|ui| {
            if ui.button("Upload image…").clicked() {
                if let Some(event) = pick_image_file() {
                    events.push(event);
                }
            }
            ui.label(ui_state.image_file_label().to_string());
        });
    }
}

fn settings_panel(ui: &mut egui::Ui, settings: SceneSettings, events: &mut Vec<InputEvent>) {
    ui.heading("Settings");
    let mut light = settings.light_intensity;
    if ui
        .add(egui::Slider::new(&mut light, LIGHT_INTENSITY_RANGE.0..=LIGHT_INTENSITY_RANGE.1).text("Light"))
        .changed()
    {
        events.push(InputEvent::LightIntensity { value: light });
    }
    let mut rotation = settings.model_rotation_deg;
    if ui
        .add(
            egui::Slider::new(&mut rotation, MODEL_ROTATION_RANGE.0..=MODEL_ROTATION_RANGE.1)
                .text("Rotation")
                .suffix("°"),
        )
        .changed()
    {
        events.push(InputEvent::ModelRotation { degrees: rotation });
    }
    let mut zoom = settings.camera_zoom;
    if ui
        .add(egui::Slider::new(&mut zoom, CAMERA_ZOOM_RANGE.0..=CAMERA_ZOOM_RANGE.1).text("Zoom"))
        .changed()
    {
        events.push(InputEvent::CameraZoom { zoom });
    }
}

fn texture_label(texture: TextureSelection) -> &'static str {
    match texture {
        TextureSelection::None => "None",
        TextureSelection::Preset(key) => key.label(),
    }
}

#[cfg(feature = "file-dialog")]
fn pick_image_file() -> Option<InputEvent> {
    let path = rfd::FileDialog::new()
        .add_filter("Image", &["png", "jpg", "jpeg"])
        .pick_file()?;
    Some(InputEvent::ImageChosen { path })
}

#[cfg(not(feature = "file-dialog"))]
fn pick_image_file() -> Option<InputEvent> {
    log::warn!("Image upload needs the `file-dialog` feature");
    None
}
