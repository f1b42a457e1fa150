// GTK host for the gallery controller

pub mod media_backend;
pub mod surface;
pub mod window;

pub use media_backend::{BackendMessage, GtkMediaBackend, PaintableStore};
pub use surface::GtkSurface;
pub use window::GalleryWindow;
