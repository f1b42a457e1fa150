mod app;

use app::GalleryApp;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("gallery_canvas=info".parse().unwrap()),
        )
        .init();

    let app = GalleryApp::new();
    std::process::exit(app.run());
}
