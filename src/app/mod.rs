pub mod input;

use crate::assets::{load_environment, load_model, EnvironmentMap};
use crate::controller::{SelectionAndMaterialController, UiEffect};
use crate::material::TextureKey;
use crate::parts::{PartId, PartRegistry};
use crate::render::{pick, HeadlessBackend, OrbitCamera, RenderBackend};
use crate::scene::serialization::{self, SerializationError};
use crate::scene::{OrderSummary, SceneSettings, SessionConfig};
use crate::textures::TextureTable;
use crate::ui::panels::{self, PanelInput};
use crate::ui::UiState;
use input::{InputEvent, PointerState};

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

#[derive(Debug, thiserror::Error)]
pub enum RunError {
    #[error("usage: configurator <session.json>")]
    Usage,
    #[error("failed to load session {path}: {source}")]
    Session {
        path: String,
        #[source]
        source: SerializationError,
    },
}

/// Event list stored next to the `SessionConfig` fields of a session file.
#[derive(Debug, Default, serde::Deserialize)]
struct SessionScript {
    #[serde(default)]
    events: Vec<InputEvent>,
}

pub struct App<B: RenderBackend> {
    controller: SelectionAndMaterialController,
    ui: UiState,
    egui_ctx: egui::Context,
    settings: SceneSettings,
    camera: OrbitCamera,
    pointer: PointerState,
    backend: B,
    model_name: String,
    base_dir: PathBuf,
    order_output: Option<PathBuf>,
    last_order: Option<OrderSummary>,
    view_dirty: bool,
    ui_primitives: Vec<egui::ClippedPrimitive>,
    ui_textures: egui::TexturesDelta,
}

impl<B: RenderBackend> App<B> {
    pub fn new(
        model_name: String,
        parts: PartRegistry,
        textures: TextureTable,
        settings: SceneSettings,
        backend: B,
    ) -> Self {
        let bounds = parts.bounds();
        let mut camera = OrbitCamera::from_bounds(
            bounds.map_or(glam::Vec3::ZERO, |b| b.center()),
            bounds.map_or(glam::Vec3::ZERO, |b| b.extent()),
        );
        camera.set_zoom(settings.camera_zoom);
        let mut app = Self {
            controller: SelectionAndMaterialController::new(parts, textures),
            ui: UiState::new(),
            egui_ctx: egui::Context::default(),
            settings,
            camera,
            pointer: PointerState::default(),
            backend,
            model_name,
            base_dir: PathBuf::from("."),
            order_output: None,
            last_order: None,
            view_dirty: true,
            ui_primitives: Vec::new(),
            ui_textures: egui::TexturesDelta::default(),
        };
        app.upload_textures();
        app.upload_all_materials();
        app
    }

    pub fn with_base_dir(mut self, base_dir: PathBuf) -> Self {
        self.base_dir = base_dir;
        self
    }

    pub fn with_order_output(mut self, path: Option<PathBuf>) -> Self {
        self.order_output = path;
        self
    }

    pub fn set_environment(&mut self, environment: &EnvironmentMap) {
        self.backend.set_environment(environment);
    }

    pub fn controller(&self) -> &SelectionAndMaterialController {
        &self.controller
    }

    pub fn ui(&self) -> &UiState {
        &self.ui
    }

    pub fn settings(&self) -> SceneSettings {
        self.settings
    }

    pub fn camera(&self) -> &OrbitCamera {
        &self.camera
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn last_order(&self) -> Option<&OrderSummary> {
        self.last_order.as_ref()
    }

    pub fn handle_event(&mut self, event: InputEvent) {
        self.pointer.handle(&event);
        match event {
            InputEvent::PointerMove { .. } | InputEvent::PointerLeave => {
                let ui_event = match self.pointer.position {
                    Some(pos) => egui::Event::PointerMoved(egui::pos2(pos.x, pos.y)),
                    None => egui::Event::PointerGone,
                };
                self.ui_frame(vec![ui_event]);
                // Panels cover the model; nothing underneath them is hovered.
                let picked = if self.egui_ctx.wants_pointer_input() {
                    None
                } else {
                    self.pick_at_pointer()
                };
                self.controller.on_pointer_move(picked);
            }
            InputEvent::Click => {
                if self.egui_ctx.wants_pointer_input() {
                    self.click_ui();
                } else {
                    self.controller.on_pointer_select();
                }
            }
            InputEvent::ColorInput { color } => {
                self.ui.set_color(color);
                self.controller.apply_color(color);
            }
            InputEvent::TextureSelect { texture } => {
                self.ui.set_texture(texture);
                self.controller.apply_texture(texture);
            }
            InputEvent::ImageChosen { path } => self.choose_image(&path),
            InputEvent::PartChosen { name } => match self.controller.parts().find(&name) {
                Some(id) => {
                    self.controller.select_part(id);
                }
                None => log::warn!("No part named '{}'", name),
            },
            InputEvent::PlaceOrder => self.place_order(),
            InputEvent::CloseDialog => {
                if self.ui.close_order_dialog() {
                    self.controller.reset_all();
                }
            }
            InputEvent::LightIntensity { value } => {
                self.view_dirty |= self.settings.set_light_intensity(value);
            }
            InputEvent::ModelRotation { degrees } => {
                if self.settings.set_model_rotation(degrees) {
                    self.view_dirty = true;
                    // The part under a still pointer may have changed.
                    let picked = self.pick_at_pointer();
                    self.controller.on_pointer_move(picked);
                }
            }
            InputEvent::CameraZoom { zoom } => {
                if self.settings.set_camera_zoom(zoom) {
                    self.camera.set_zoom(self.settings.camera_zoom);
                    self.view_dirty = true;
                }
            }
            InputEvent::Orbit { yaw, pitch } => {
                self.camera.orbit(yaw, pitch);
                self.view_dirty = true;
            }
            InputEvent::Resize { .. } => self.view_dirty = true,
            InputEvent::Wait { millis } => std::thread::sleep(Duration::from_millis(millis)),
        }
        self.fold_effects();
    }

    /// One frame: finished decodes, panel layout, then everything that changed
    /// goes to the backend.
    pub fn tick(&mut self) {
        self.controller.poll_decodes();
        self.fold_effects();
        self.ui_frame(Vec::new());
        self.sync_backend();
    }

    /// Waits for outstanding uploads and renders the result.
    pub fn finish(&mut self) {
        let applied = self.controller.flush_decodes();
        if applied > 0 {
            log::debug!("{} pending uploads applied", applied);
        }
        self.fold_effects();
        self.sync_backend();
    }

    fn pick_at_pointer(&self) -> Option<PartId> {
        let position = self.pointer.position?;
        let ray = self.camera.screen_ray(position, self.pointer.viewport)?;
        pick(&ray, self.controller.parts(), &self.settings.model_transform()).map(|hit| hit.part)
    }

    fn choose_image(&mut self, path: &Path) {
        let path = self.base_dir.join(path);
        let label = path
            .file_name()
            .and_then(|name| name.to_str())
            .unwrap_or("image")
            .to_string();
        let bytes = match std::fs::read(&path) {
            Ok(bytes) => bytes,
            Err(err) => {
                log::warn!("Failed to read {}: {}", path.display(), err);
                self.ui
                    .apply(UiEffect::Warning(format!("Could not open {}.", label)));
                return;
            }
        };
        match self.controller.apply_uploaded_image(&label, bytes) {
            Ok(ticket) => {
                log::debug!("Decoding '{}' as {:?}", label, ticket);
                self.ui.set_image_file(label);
            }
            Err(err) => log::debug!("Upload of '{}' refused: {}", label, err),
        }
    }

    fn place_order(&mut self) {
        let placed_at = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |elapsed| elapsed.as_secs());
        let order = OrderSummary::from_parts(&self.model_name, self.controller.parts(), placed_at);
        if let Some(path) = &self.order_output {
            match serialization::save_order_to_file(&order, path) {
                Ok(()) => log::info!("Order written to {}", path.display()),
                Err(err) => log::warn!("Failed to write order to {}: {}", path.display(), err),
            }
        }
        self.ui.open_order_dialog();
        self.ui.set_status(format!("Ordered {} parts", order.parts.len()));
        log::info!("Order placed for '{}'", order.model);
        self.last_order = Some(order);
    }

    fn fold_effects(&mut self) {
        for effect in self.controller.drain_effects() {
            self.ui.apply(effect);
        }
    }

    /// Press and release in consecutive frames, the way a real click arrives.
    fn click_ui(&mut self) {
        let Some(pos) = self.pointer.position else {
            return;
        };
        for pressed in [true, false] {
            self.ui_frame(vec![egui::Event::PointerButton {
                pos: egui::pos2(pos.x, pos.y),
                button: egui::PointerButton::Primary,
                pressed,
                modifiers: egui::Modifiers::NONE,
            }]);
        }
    }

    /// Runs one egui frame over `events` and dispatches whatever the panels report.
    fn ui_frame(&mut self, events: Vec<egui::Event>) {
        for event in self.run_panels(events) {
            self.handle_event(event);
        }
    }

    fn run_panels(&mut self, events: Vec<egui::Event>) -> Vec<InputEvent> {
        let names = self.controller.parts().names();
        let textures: Vec<TextureKey> = self.controller.textures().keys().collect();
        let input = PanelInput {
            part_names: &names,
            textures: &textures,
            settings: self.settings,
        };
        let viewport = self.pointer.viewport;
        let raw_input = egui::RawInput {
            screen_rect: Some(egui::Rect::from_min_size(
                egui::Pos2::ZERO,
                egui::vec2(viewport.x, viewport.y),
            )),
            events,
            ..Default::default()
        };
        let ui = &mut self.ui;
        let mut emitted = Vec::new();
        let full_output = self.egui_ctx.run(raw_input, |ctx| {
            emitted = panels::show(ctx, ui, &input);
        });
        let pixels_per_point = self.egui_ctx.pixels_per_point();
        self.ui_primitives = self
            .egui_ctx
            .tessellate(full_output.shapes, pixels_per_point);
        self.ui_textures.append(full_output.textures_delta);
        emitted
    }

    fn upload_textures(&mut self) {
        let textures = self.controller.textures();
        for key in textures.keys() {
            if let Some(texture) = textures.color(key) {
                self.backend.upload_texture(key, texture);
            }
            if let Some(roughness) = textures.roughness(key) {
                self.backend.upload_roughness(key, roughness);
            }
        }
    }

    fn upload_all_materials(&mut self) {
        for part in self.controller.parts().iter() {
            self.backend.apply_material(part, &part.descriptor.to_params());
        }
    }

    fn sync_backend(&mut self) {
        for id in self.controller.drain_dirty() {
            if let Some(part) = self.controller.part(id) {
                self.backend.apply_material(part, &part.descriptor.to_params());
            }
        }
        if self.view_dirty {
            self.backend.set_model_transform(self.settings.model_transform());
            self.backend.set_light_intensity(self.settings.light_intensity);
            self.backend.set_camera(&self.camera);
            self.view_dirty = false;
        }
        let ui_textures = std::mem::take(&mut self.ui_textures);
        self.backend.paint_ui(&self.ui_primitives, &ui_textures);
        self.backend.render_frame();
    }
}

/// Loads a session file, replays its events and reports the final state.
pub fn run(args: &[String]) -> Result<(), RunError> {
    let session_path = args.get(1).map(PathBuf::from).ok_or(RunError::Usage)?;
    let session_error = |source| RunError::Session {
        path: session_path.display().to_string(),
        source,
    };
    let config: SessionConfig =
        serialization::load_session_config(&session_path).map_err(session_error)?;
    let script: SessionScript = serialization::load_json(&session_path).map_err(session_error)?;
    let base_dir = session_path
        .parent()
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf);

    let mut app = build_app(&config, &base_dir);
    app.tick();
    log::info!("Replaying {} events", script.events.len());
    for event in script.events {
        log::debug!("event {:?}", event);
        app.handle_event(event);
        app.tick();
    }
    app.finish();

    for part in app.controller().parts().iter() {
        let committed = part.descriptor.committed();
        log::info!(
            "{:<16} {:?} color {} surface {}",
            part.name,
            app.controller().part_state(part.id),
            committed.base_color,
            committed.surface.label()
        );
    }
    if let Some(warning) = app.ui().warning() {
        log::info!("Last warning: {}", warning);
    }
    log::info!(
        "Session finished after {} frames, {} material uploads",
        app.backend().frames(),
        app.backend().material_uploads()
    );
    Ok(())
}

fn build_app(config: &SessionConfig, base_dir: &Path) -> App<HeadlessBackend> {
    let model_path = base_dir.join(&config.model);
    // A model that fails to load leaves an empty scene. Nothing can be picked,
    // so customization never activates.
    let (model_name, parts) = match load_model(&model_path) {
        Ok(model) => (model.name, model.parts),
        Err(err) => {
            log::error!("Failed to load model: {}", err);
            (config.model.display().to_string(), PartRegistry::new())
        }
    };
    let (textures, errors) = TextureTable::load(base_dir, &config.textures);
    if !errors.is_empty() {
        log::warn!("{} texture files failed to load", errors.len());
    }

    let mut app = App::new(model_name, parts, textures, config.settings, HeadlessBackend::new())
        .with_base_dir(base_dir.to_path_buf())
        .with_order_output(config.order_output.as_ref().map(|path| base_dir.join(path)));
    if let Some(environment) = &config.environment {
        match load_environment(base_dir, &environment.faces) {
            Ok(map) => app.set_environment(&map),
            Err(err) => log::warn!("Environment unavailable: {}", err),
        }
    }
    app
}
