//! Responsive canvas gallery: layout engine, media lifecycle and a GTK4 host.

pub mod error;
pub mod gallery;
pub mod image_loader;
pub mod layout;
pub mod manifest;
pub mod media;
pub mod models;
pub mod ui;

pub use error::MediaError;
pub use gallery::{GalleryConfig, GalleryController};
pub use models::{GalleryItem, MediaKind};
