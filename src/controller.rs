//! Hover/selection state machine and the mapping from customization inputs to
//! each part's material descriptor.
//!
//! Every handler takes `&mut self`; callers dispatch events one at a time, so
//! the selection state and descriptors have a single writer at any moment.
//! The controller never talks to the UI or the renderer directly. It queues
//! [`UiEffect`]s and dirty part ids for the caller to drain.

use crate::decode::{CompletedDecode, DecodeQueue, DecodeTicket};
use crate::error::ConfigError;
use crate::material::{Highlight, Rgb, SurfaceMap, TextureSelection};
use crate::parts::{Part, PartId, PartRegistry};
use crate::textures::TextureTable;
use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

/// Derived per-part view of the selection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PartState {
    Unselected,
    Hovered,
    Selected,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SelectionState {
    pub hovered: Option<PartId>,
    pub selected: Option<PartId>,
}

/// UI writes requested by the controller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEffect {
    ResetTexturePicker,
    ResetImagePicker,
    ShowSelectedPart(String),
    ShowCustomization(bool),
    Warning(String),
    ResetControls,
}

pub struct SelectionAndMaterialController {
    parts: PartRegistry,
    textures: TextureTable,
    selection: SelectionState,
    decodes: DecodeQueue,
    /// Most recent upload per part. Only that one may land.
    latest_upload: BTreeMap<PartId, DecodeTicket>,
    effects: Vec<UiEffect>,
    dirty: BTreeSet<PartId>,
}

impl SelectionAndMaterialController {
    pub fn new(parts: PartRegistry, textures: TextureTable) -> Self {
        log::info!("Configurator ready with {} parts", parts.len());
        Self {
            parts,
            textures,
            selection: SelectionState::default(),
            decodes: DecodeQueue::new(),
            latest_upload: BTreeMap::new(),
            effects: Vec::new(),
            dirty: BTreeSet::new(),
        }
    }

    pub fn parts(&self) -> &PartRegistry {
        &self.parts
    }

    pub fn part(&self, id: PartId) -> Option<&Part> {
        self.parts.get(id)
    }

    pub fn textures(&self) -> &TextureTable {
        &self.textures
    }

    pub fn selection(&self) -> SelectionState {
        self.selection
    }

    pub fn hovered(&self) -> Option<PartId> {
        self.selection.hovered
    }

    pub fn selected(&self) -> Option<PartId> {
        self.selection.selected
    }

    pub fn part_state(&self, id: PartId) -> PartState {
        if self.selection.selected == Some(id) {
            PartState::Selected
        } else if self.selection.hovered == Some(id) {
            PartState::Hovered
        } else {
            PartState::Unselected
        }
    }

    pub fn drain_effects(&mut self) -> Vec<UiEffect> {
        std::mem::take(&mut self.effects)
    }

    pub fn drain_dirty(&mut self) -> Vec<PartId> {
        std::mem::take(&mut self.dirty).into_iter().collect()
    }

    pub fn pending_decodes(&self) -> usize {
        self.decodes.pending_len()
    }

    fn set_highlight(&mut self, id: PartId, highlight: Highlight) {
        let Some(part) = self.parts.get_mut(id) else {
            return;
        };
        if part.descriptor.set_highlight(highlight) {
            self.dirty.insert(id);
        }
    }

    pub fn on_pointer_move(&mut self, picked: Option<PartId>) {
        let picked = picked.filter(|id| self.parts.get(*id).is_some());
        let selected = self.selection.selected;
        match picked {
            Some(id) if self.selection.hovered != Some(id) => {
                if let Some(previous) = self.selection.hovered {
                    if Some(previous) != selected {
                        self.set_highlight(previous, Highlight::None);
                    }
                }
                self.selection.hovered = Some(id);
                if Some(id) != selected {
                    self.set_highlight(id, Highlight::Hovered);
                }
                self.effects.push(UiEffect::ResetTexturePicker);
                log::debug!("Hovering part {:?}", id);
            }
            Some(_) => {}
            None => {
                if let Some(previous) = self.selection.hovered {
                    if Some(previous) != selected {
                        self.set_highlight(previous, Highlight::None);
                        self.selection.hovered = None;
                        log::debug!("Hover cleared");
                    }
                }
            }
        }
    }

    pub fn on_pointer_select(&mut self) {
        let Some(hovered) = self.selection.hovered else {
            return;
        };
        self.select(hovered);
    }

    /// Selects a part directly, as the fixed part list does.
    pub fn select_part(&mut self, id: PartId) -> bool {
        if self.parts.get(id).is_none() {
            return false;
        }
        self.select(id);
        true
    }

    fn select(&mut self, id: PartId) {
        if let Some(previous) = self.selection.selected {
            // A part still under the pointer falls back to its hover glow.
            let fallback = if previous != id && self.selection.hovered == Some(previous) {
                Highlight::Hovered
            } else {
                Highlight::None
            };
            self.set_highlight(previous, fallback);
        }
        self.selection.selected = Some(id);
        self.set_highlight(id, Highlight::Selected);

        let name = self
            .parts
            .get(id)
            .map(|part| part.name.clone())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| "Unnamed part".to_string());
        log::info!("Selected part '{}'", name);
        self.effects.push(UiEffect::ResetTexturePicker);
        self.effects.push(UiEffect::ResetImagePicker);
        self.effects.push(UiEffect::ShowSelectedPart(name));
        self.effects.push(UiEffect::ShowCustomization(true));
    }

    /// Sets the base color of the selected part. An active uploaded image is
    /// replaced, since color and uploaded image are mutually exclusive.
    pub fn apply_color(&mut self, color: Rgb) -> bool {
        let Some(id) = self.selection.selected else {
            log::debug!("Color {} ignored: no part selected", color);
            return false;
        };
        self.supersede_upload(id);
        let Some(part) = self.parts.get_mut(id) else {
            return false;
        };
        let descriptor = &mut part.descriptor;
        let mut changed = false;
        if descriptor.base_color != color {
            descriptor.base_color = color;
            changed = true;
        }
        if descriptor.surface.uploaded().is_some() {
            descriptor.surface = SurfaceMap::None;
            changed = true;
        }
        changed |= descriptor.set_highlight(Highlight::None);
        if changed {
            log::debug!("Part '{}' color {}", part.name, color);
            self.dirty.insert(id);
        }
        changed
    }

    pub fn apply_texture(&mut self, selection: TextureSelection) -> bool {
        let Some(id) = self.selection.selected else {
            log::debug!("Texture ignored: no part selected");
            return false;
        };
        let (surface, roughness_map) = match selection {
            TextureSelection::None => (SurfaceMap::None, None),
            TextureSelection::Preset(key) => {
                if !self.textures.contains(key) {
                    log::warn!("Texture '{}' is not loaded", key.as_str());
                    return false;
                }
                let roughness = self.textures.has_roughness(key).then_some(key);
                (SurfaceMap::Preset(key), roughness)
            }
        };
        self.supersede_upload(id);
        let Some(part) = self.parts.get_mut(id) else {
            return false;
        };
        part.descriptor.surface = surface;
        part.descriptor.roughness_map = roughness_map;
        log::debug!("Part '{}' surface {}", part.name, part.descriptor.surface.label());
        self.dirty.insert(id);
        true
    }

    /// Starts decoding an uploaded image for the part selected right now. The
    /// result lands on that part even if the selection changes meanwhile,
    /// unless a newer upload, color or texture for the same part comes first.
    pub fn apply_uploaded_image(
        &mut self,
        label: &str,
        bytes: Vec<u8>,
    ) -> Result<DecodeTicket, ConfigError> {
        let Some(id) = self.selection.selected else {
            let err = ConfigError::SELECT_PART_FIRST;
            log::warn!("Upload of '{}' refused: {}", label, err);
            self.effects.push(UiEffect::Warning(err.user_message()));
            return Err(err);
        };
        self.supersede_upload(id);
        let ticket = self.decodes.submit(id, label.to_string(), bytes);
        self.latest_upload.insert(id, ticket);
        Ok(ticket)
    }

    pub fn cancel_upload(&mut self, ticket: DecodeTicket) -> bool {
        self.latest_upload.retain(|_, latest| *latest != ticket);
        self.decodes.cancel(ticket)
    }

    /// Drops the pending upload of `id`, if any. Called whenever a newer edit
    /// of that part's surface or color arrives.
    fn supersede_upload(&mut self, id: PartId) {
        if let Some(stale) = self.latest_upload.remove(&id) {
            if self.decodes.cancel(stale) {
                log::debug!("Upload {:?} for part {:?} superseded", stale, id);
            }
        }
    }

    /// Applies every decode that has finished. Never blocks.
    pub fn poll_decodes(&mut self) -> usize {
        let completed = self.decodes.poll();
        self.finish_decodes(completed)
    }

    /// Blocks until outstanding decodes finish, then applies them.
    pub fn flush_decodes(&mut self) -> usize {
        let completed = self.decodes.wait_all();
        self.finish_decodes(completed)
    }

    fn finish_decodes(&mut self, completed: Vec<CompletedDecode>) -> usize {
        let mut applied = 0;
        for done in completed {
            if self.latest_upload.get(&done.part) != Some(&done.ticket) {
                log::debug!("Stale upload {:?} for part {:?} dropped", done.ticket, done.part);
                continue;
            }
            self.latest_upload.remove(&done.part);
            match done.result {
                Ok(texture) => {
                    let Some(part) = self.parts.get_mut(done.part) else {
                        log::warn!("Decoded image for unknown part {:?} dropped", done.part);
                        continue;
                    };
                    let descriptor = &mut part.descriptor;
                    descriptor.surface = SurfaceMap::Uploaded(Arc::new(texture));
                    descriptor.base_color = Rgb::WHITE;
                    descriptor.roughness_map = None;
                    log::info!("Uploaded image applied to '{}'", part.name);
                    self.dirty.insert(done.part);
                    applied += 1;
                }
                Err(err) => {
                    log::warn!("Image upload failed: {}", err);
                    self.effects.push(UiEffect::Warning(err.user_message()));
                }
            }
        }
        applied
    }

    /// Returns every part to its load-time look and clears the session.
    pub fn reset_all(&mut self) {
        self.decodes.cancel_all();
        self.latest_upload.clear();
        for id in self.parts.ids().collect::<Vec<_>>() {
            if let Some(part) = self.parts.get_mut(id) {
                if part.descriptor != *part.default_descriptor() {
                    self.dirty.insert(id);
                }
            }
        }
        self.parts.reset_descriptors();
        self.selection = SelectionState::default();
        self.effects.push(UiEffect::ShowCustomization(false));
        self.effects.push(UiEffect::ResetControls);
        log::info!("Configuration reset");
    }
}
