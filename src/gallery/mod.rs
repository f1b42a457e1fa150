//! Gallery orchestration.
//!
//! - `GalleryController` - owns layout state and the media nodes
//! - `GalleryConfig` - columns, max width and layout constants
//! - `RenderSurface` - drawing capability the controller renders onto

pub mod config;
pub mod controller;
pub mod resize;
pub mod surface;

pub use config::GalleryConfig;
pub use controller::GalleryController;
pub use surface::{GalleryInput, LabelDraw, LabelStyle, NodeDraw, RenderSurface};
