//! Part selection and material customization for a 3D shoe configurator.
//!
//! The [`controller`] owns hover/selection state and every part's material
//! descriptor. [`app`] wires it to pointer picking, the egui panels and a
//! [`render::RenderBackend`].

pub mod app;
pub mod assets;
pub mod controller;
pub mod decode;
pub mod error;
pub mod material;
pub mod parts;
pub mod render;
pub mod scene;
pub mod textures;
pub mod ui;

pub use controller::SelectionAndMaterialController;
pub use error::ConfigError;
