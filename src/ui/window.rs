// Gallery window: a scrolled GtkFixed stage driven by GalleryController.

use gdk4::Display;
use gtk4::prelude::*;
use gtk4::{
    Application, ApplicationWindow, CssProvider, Fixed, PolicyType, ScrolledWindow,
    STYLE_PROVIDER_PRIORITY_APPLICATION,
};
use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::rc::{Rc, Weak};
use tracing::info;

use super::media_backend::{BackendMessage, GtkMediaBackend, PaintableStore};
use super::surface::GtkSurface;
use crate::gallery::{GalleryConfig, GalleryController, GalleryInput};
use crate::models::GalleryItem;

const APP_CSS: &str = r#"
window {
    background-color: #0a0a0a;
    color: #e0e0e0;
}

.media-node {
    background-color: #121212;
}

.media-node.placeholder {
    border: 1px dashed #333333;
}

.tap-to-play {
    background-color: rgba(0, 0, 0, 0.7);
    color: #00ff88;
    padding: 6px 10px;
    font-weight: bold;
}

.node-label {
    background-color: rgba(0, 0, 0, 0.7);
    color: #00ff88;
    padding: 2px 6px;
}
"#;

fn load_css() {
    let provider = CssProvider::new();
    provider.load_from_string(APP_CSS);
    if let Some(display) = Display::default() {
        gtk4::style_context_add_provider_for_display(
            &display,
            &provider,
            STYLE_PROVIDER_PRIORITY_APPLICATION,
        );
    }
}

pub struct GalleryWindow {
    self_weak: RefCell<Weak<GalleryWindow>>,
    window: ApplicationWindow,
    scrolled: ScrolledWindow,
    controller: RefCell<GalleryController<GtkMediaBackend>>,
    surface: RefCell<GtkSurface>,
    relayout_pending: Cell<bool>,
}

impl GalleryWindow {
    pub fn new(app: &Application, items: Vec<GalleryItem>, config: GalleryConfig) -> Rc<Self> {
        load_css();

        let window = ApplicationWindow::builder()
            .application(app)
            .title("gallery-canvas")
            .default_width(config.initial_width.round() as i32)
            .default_height(config.initial_height.round() as i32)
            .build();

        let fixed = Fixed::new();
        let scrolled = ScrolledWindow::builder()
            .hscrollbar_policy(PolicyType::Never)
            .vscrollbar_policy(PolicyType::Automatic)
            .child(&fixed)
            .build();
        window.set_child(Some(&scrolled));

        let paintables: PaintableStore = Rc::new(RefCell::new(HashMap::new()));
        let (event_tx, event_rx) = async_channel::unbounded::<BackendMessage>();
        let (input_tx, input_rx) = async_channel::unbounded::<GalleryInput>();

        let backend = GtkMediaBackend::new(event_tx, Rc::clone(&paintables));
        let surface = GtkSurface::new(fixed, paintables, input_tx);
        let mut controller = GalleryController::new(config, backend);
        controller.set_items(items);

        let this = Rc::new(Self {
            self_weak: RefCell::new(Weak::new()),
            window,
            scrolled,
            controller: RefCell::new(controller),
            surface: RefCell::new(surface),
            relayout_pending: Cell::new(false),
        });
        *this.self_weak.borrow_mut() = Rc::downgrade(&this);

        this.spawn_event_pump(event_rx);
        this.spawn_input_pump(input_rx);
        this.install_tick_callback();
        this.connect_close();
        this.render();

        info!(items = this.controller.borrow().items().len(), "Gallery window ready");
        this
    }

    pub fn present(&self) {
        self.window.present();
    }

    fn render(&self) {
        let mut surface = self.surface.borrow_mut();
        self.controller.borrow_mut().render(&mut *surface);
    }

    fn schedule_relayout(&self) {
        if self.relayout_pending.replace(true) {
            return;
        }
        let delay = self.controller.borrow().config().relayout_delay;
        let weak_self = self.self_weak.borrow().clone();
        glib::timeout_add_local(delay, move || {
            if let Some(window) = weak_self.upgrade() {
                window.relayout_pending.set(false);
                window.render();
            }
            glib::ControlFlow::Break
        });
    }

    fn spawn_event_pump(&self, event_rx: async_channel::Receiver<BackendMessage>) {
        let weak_self = self.self_weak.borrow().clone();
        glib::spawn_future_local(async move {
            while let Ok(message) = event_rx.recv().await {
                let Some(window) = weak_self.upgrade() else {
                    break;
                };
                window.controller.borrow_mut().handle_media_event(
                    &message.key,
                    message.token,
                    message.event,
                );
                // Visual state may have changed even without a new size.
                window.schedule_relayout();
            }
        });
    }

    fn spawn_input_pump(&self, input_rx: async_channel::Receiver<GalleryInput>) {
        let weak_self = self.self_weak.borrow().clone();
        glib::spawn_future_local(async move {
            while let Ok(input) = input_rx.recv().await {
                let Some(window) = weak_self.upgrade() else {
                    break;
                };
                let changed = window.controller.borrow_mut().apply_input(input);
                if changed {
                    window.render();
                }
            }
        });
    }

    fn install_tick_callback(&self) {
        let weak_self = self.self_weak.borrow().clone();
        self.scrolled.add_tick_callback(move |scrolled, _clock| {
            let Some(window) = weak_self.upgrade() else {
                return glib::ControlFlow::Break;
            };
            let width = scrolled.width();
            let measured = (width > 0).then_some(width as f32);
            if window.controller.borrow_mut().observe_width(measured) {
                window.schedule_relayout();
            }
            let mut surface = window.surface.borrow_mut();
            window.controller.borrow().frame(&mut *surface);
            glib::ControlFlow::Continue
        });
    }

    fn connect_close(self: &Rc<Self>) {
        // Holding a strong reference keeps the window state alive until close.
        let this = Rc::clone(self);
        self.window.connect_close_request(move |_| {
            this.controller.borrow_mut().unmount();
            info!("Gallery closed");
            glib::Propagation::Proceed
        });
    }
}
