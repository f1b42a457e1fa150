// Retained-mode render surface over a GtkFixed stage.
// One overlay per item key; the hover label is a single shared widget.

use gtk4::pango;
use gtk4::prelude::*;
use gtk4::{
    Align, ContentFit, EventControllerMotion, Fixed, GestureClick, GestureDrag, Label, Overlay,
    Picture,
};
use std::cell::Cell;
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use tracing::trace;

use super::media_backend::PaintableStore;
use crate::gallery::{GalleryInput, LabelDraw, NodeDraw, RenderSurface};
use crate::media::NodeVisual;
use crate::models::{ItemKey, MediaKind};

struct NodeWidgets {
    overlay: Overlay,
    picture: Picture,
    badge: Label,
    has_paintable: bool,
}

pub struct GtkSurface {
    fixed: Fixed,
    nodes: HashMap<ItemKey, NodeWidgets>,
    drawn: HashSet<ItemKey>,
    label: Label,
    label_drawn: bool,
    paintables: PaintableStore,
    input_tx: async_channel::Sender<GalleryInput>,
}

impl GtkSurface {
    pub fn new(
        fixed: Fixed,
        paintables: PaintableStore,
        input_tx: async_channel::Sender<GalleryInput>,
    ) -> Self {
        let label = Label::new(None);
        label.add_css_class("node-label");
        label.set_can_target(false);
        label.set_visible(false);
        fixed.put(&label, 0.0, 0.0);

        Self {
            fixed,
            nodes: HashMap::new(),
            drawn: HashSet::new(),
            label,
            label_drawn: false,
            paintables,
            input_tx,
        }
    }

    pub fn widget(&self) -> &Fixed {
        &self.fixed
    }

    fn create_node(&self, key: &ItemKey, kind: MediaKind) -> NodeWidgets {
        let picture = Picture::new();
        picture.set_can_shrink(true);
        picture.set_content_fit(ContentFit::Fill);
        picture.add_css_class("media-node");

        let overlay = Overlay::new();
        overlay.set_child(Some(&picture));
        overlay.add_css_class("media-node");
        if kind == MediaKind::Video {
            overlay.add_css_class("video");
        }

        let badge = Label::new(Some("[ tap to play ]"));
        badge.set_halign(Align::Center);
        badge.set_valign(Align::Center);
        badge.add_css_class("tap-to-play");
        badge.set_can_target(false);
        badge.set_visible(false);
        overlay.add_overlay(&badge);

        let motion = EventControllerMotion::new();
        let tx = self.input_tx.clone();
        let enter_key = key.clone();
        motion.connect_enter(move |_, _x, _y| {
            let _ = tx.try_send(GalleryInput::PointerEnter(enter_key.clone()));
        });
        let tx = self.input_tx.clone();
        let leave_key = key.clone();
        motion.connect_leave(move |_| {
            let _ = tx.try_send(GalleryInput::PointerLeave(leave_key.clone()));
        });
        overlay.add_controller(motion);

        let click = GestureClick::new();
        click.set_button(1);
        let tx = self.input_tx.clone();
        let click_key = key.clone();
        click.connect_released(move |_, _n, _x, _y| {
            let _ = tx.try_send(GalleryInput::Click(click_key.clone()));
        });
        overlay.add_controller(click);

        // GestureDrag reports offsets from the drag start; forward deltas.
        let drag = GestureDrag::new();
        let last = Rc::new(Cell::new((0.0_f64, 0.0_f64)));
        let begin_last = Rc::clone(&last);
        drag.connect_drag_begin(move |_, _x, _y| begin_last.set((0.0, 0.0)));
        let tx = self.input_tx.clone();
        let drag_key = key.clone();
        drag.connect_drag_update(move |_, ox, oy| {
            let (lx, ly) = last.replace((ox, oy));
            let (dx, dy) = ((ox - lx) as f32, (oy - ly) as f32);
            if dx != 0.0 || dy != 0.0 {
                let _ = tx.try_send(GalleryInput::Drag {
                    key: drag_key.clone(),
                    dx,
                    dy,
                });
            }
        });
        overlay.add_controller(drag);

        self.fixed.put(&overlay, 0.0, 0.0);
        trace!(%key, "Created node widget");

        NodeWidgets {
            overlay,
            picture,
            badge,
            has_paintable: false,
        }
    }
}

impl RenderSurface for GtkSurface {
    fn begin_pass(&mut self) {
        self.drawn.clear();
        self.label_drawn = false;
    }

    fn resize_stage(&mut self, width: f32, height: f32) {
        self.fixed
            .set_size_request(width.round() as i32, height.ceil() as i32);
    }

    fn draw_node(&mut self, node: &NodeDraw<'_>) {
        if !self.nodes.contains_key(node.key) {
            let widgets = self.create_node(node.key, node.kind);
            self.nodes.insert(node.key.clone(), widgets);
        }
        let Some(widgets) = self.nodes.get_mut(node.key) else {
            return;
        };

        let paintable = self.paintables.borrow().get(node.key).cloned();
        if paintable.is_some() || widgets.has_paintable {
            widgets.picture.set_paintable(paintable.as_ref());
            widgets.has_paintable = paintable.is_some();
        }

        let placeholder = node.visual == NodeVisual::Placeholder;
        if placeholder {
            widgets.overlay.add_css_class("placeholder");
        } else {
            widgets.overlay.remove_css_class("placeholder");
        }
        widgets.badge.set_visible(node.visual == NodeVisual::TapToPlay);

        widgets
            .overlay
            .set_size_request(node.width.round() as i32, node.height.round() as i32);
        widgets.overlay.set_visible(node.width > 0.0 && node.height > 0.0);
        self.fixed
            .move_(&widgets.overlay, node.x as f64, node.y as f64);
        self.drawn.insert(node.key.clone());
    }

    fn draw_label(&mut self, label: &LabelDraw<'_>) {
        let attrs = pango::AttrList::new();
        attrs.insert(pango::AttrSize::new_size_absolute(
            (label.style.font_px * pango::SCALE as f32).round() as i32,
        ));
        self.label.set_attributes(Some(&attrs));
        self.label.set_label(label.text);
        self.label.set_visible(true);
        self.fixed
            .move_(&self.label, label.x as f64, label.y as f64);
        self.label_drawn = true;
    }

    fn end_pass(&mut self) {
        let stale: Vec<ItemKey> = self
            .nodes
            .keys()
            .filter(|key| !self.drawn.contains(*key))
            .cloned()
            .collect();
        for key in stale {
            if let Some(widgets) = self.nodes.remove(&key) {
                widgets.picture.set_paintable(None::<&gdk4::Paintable>);
                self.fixed.remove(&widgets.overlay);
                trace!(%key, "Removed node widget");
            }
        }
        if self.label_drawn {
            // Last child paints on top.
            self.label.insert_before(&self.fixed, None::<&gtk4::Widget>);
        } else {
            self.label.set_visible(false);
        }
    }

    fn request_redraw(&mut self) {
        self.fixed.queue_draw();
    }
}
