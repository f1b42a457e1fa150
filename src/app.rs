use std::path::Path;

use anyhow::Result;
use gtk4::prelude::*;
use gtk4::Application;
use tracing::{error, info};

use gallery_canvas::manifest::{load_manifest, scan_directory, ScanOptions};
use gallery_canvas::ui::GalleryWindow;
use gallery_canvas::{GalleryConfig, GalleryItem};

const APP_ID: &str = "io.github.gallery_canvas";
const MANIFEST_ENV: &str = "GALLERY_MANIFEST";

pub struct GalleryApp {
    app: Application,
}

impl GalleryApp {
    pub fn new() -> Self {
        let app = Application::builder()
            .application_id(APP_ID)
            .flags(gio::ApplicationFlags::HANDLES_OPEN)
            .build();

        app.connect_activate(Self::on_activate);
        app.connect_open(Self::on_open);

        Self { app }
    }

    pub fn run(&self) -> i32 {
        self.app.run().into()
    }

    fn on_activate(app: &Application) {
        let items = match std::env::var_os(MANIFEST_ENV) {
            Some(path) => load_items(Path::new(&path)),
            None => std::env::current_dir()
                .map_err(anyhow::Error::from)
                .and_then(|dir| load_items(&dir)),
        };
        Self::show(app, items);
    }

    fn on_open(app: &Application, files: &[gio::File], _hint: &str) {
        let items = match files.first().and_then(|f| f.path()) {
            Some(path) => load_items(&path),
            None => Ok(Vec::new()),
        };
        Self::show(app, items);
    }

    fn show(app: &Application, items: Result<Vec<GalleryItem>>) {
        let items = items.unwrap_or_else(|err| {
            error!(error = ?err, "Failed to load gallery items");
            Vec::new()
        });
        let window = GalleryWindow::new(app, items, GalleryConfig::from_env());
        window.present();
    }
}

impl Default for GalleryApp {
    fn default() -> Self {
        Self::new()
    }
}

/// A directory is scanned; anything else is read as a JSON manifest.
fn load_items(path: &Path) -> Result<Vec<GalleryItem>> {
    if path.is_dir() {
        info!("Scanning {:?}", path);
        let recursive = std::env::var("GALLERY_RECURSIVE").is_ok_and(|v| v == "1");
        scan_directory(
            path,
            &ScanOptions {
                recursive,
                ..ScanOptions::default()
            },
        )
    } else {
        load_manifest(path)
    }
}
