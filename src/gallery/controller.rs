use std::collections::{HashMap, HashSet};

use tracing::{debug, trace, warn};
use xxhash_rust::xxh3::xxh3_64;

use crate::layout::{
    compute_layout, global_scale, layout_fingerprint, resolve_item_scale, LayoutPass,
};
use crate::media::{ClickOutcome, LoadToken, MediaBackend, MediaEvent, MediaNode, RedrawDriver};
use crate::models::{GalleryItem, ItemKey, NaturalSizeRegistry, PreparedItem};

use super::config::GalleryConfig;
use super::resize::ResizeCoalescer;
use super::surface::{GalleryInput, LabelDraw, LabelStyle, NodeDraw, RenderSurface};

/// Base font size for hover labels before global scaling.
const LABEL_FONT_PX: f32 = 14.0;

/// Smallest label font after scaling.
const LABEL_MIN_FONT_PX: f32 = 10.0;

/// Fast hash of an item list in order. Any change to any field or to the
/// order produces a different value.
pub fn list_fingerprint(items: &[GalleryItem]) -> u64 {
    let mut hasher_input = Vec::with_capacity(items.len() * 96);
    for item in items {
        if let Ok(bytes) = serde_json::to_vec(item) {
            hasher_input.extend_from_slice(&bytes);
        }
        hasher_input.push(0);
    }
    xxh3_64(&hasher_input)
}

/// Owns the gallery's layout state and one media node per item.
///
/// The controller is driven from a single event loop: the host feeds it item
/// lists, width measurements, media events and pointer input, then calls
/// [`flush`](Self::flush) / [`render`](Self::render) from a coalescing timer
/// and [`frame`](Self::frame) once per animation frame.
pub struct GalleryController<B: MediaBackend> {
    config: GalleryConfig,
    backend: B,
    items: Vec<PreparedItem>,
    list_hash: Option<u64>,
    registry: NaturalSizeRegistry,
    nodes: HashMap<ItemKey, MediaNode>,
    redraw: RedrawDriver,
    resize: ResizeCoalescer,
    layout: Option<LayoutPass>,
    layout_fingerprint: Option<u64>,
    dirty: bool,
    next_token: u64,
}

impl<B: MediaBackend> GalleryController<B> {
    pub fn new(config: GalleryConfig, backend: B) -> Self {
        let resize = ResizeCoalescer::new(config.initial_width, config.resize_threshold);
        Self {
            config,
            backend,
            items: Vec::new(),
            list_hash: None,
            registry: NaturalSizeRegistry::new(),
            nodes: HashMap::new(),
            redraw: RedrawDriver::new(),
            resize,
            layout: None,
            layout_fingerprint: None,
            dirty: true,
            next_token: 1,
        }
    }

    pub fn config(&self) -> &GalleryConfig {
        &self.config
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn items(&self) -> &[PreparedItem] {
        &self.items
    }

    pub fn registry(&self) -> &NaturalSizeRegistry {
        &self.registry
    }

    pub fn node(&self, key: &ItemKey) -> Option<&MediaNode> {
        self.nodes.get(key)
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Replaces the item list.
    ///
    /// An identical list is a no-op. Otherwise nodes whose key survives are
    /// kept as they are (no reload) unless their kind, url or playback options
    /// changed, in which case they are remounted. Nodes for removed keys are
    /// unmounted and their registry entries dropped, and new keys are
    /// mounted. Returns whether anything changed.
    pub fn set_items(&mut self, items: Vec<GalleryItem>) -> bool {
        let hash = list_fingerprint(&items);
        if self.list_hash == Some(hash) {
            trace!("Item list unchanged");
            return false;
        }

        let prepared: Vec<PreparedItem> = items.into_iter().map(PreparedItem::new).collect();
        let keys: HashSet<ItemKey> = prepared.iter().map(|p| p.key.clone()).collect();
        if keys.len() != prepared.len() {
            warn!(
                items = prepared.len(),
                unique = keys.len(),
                "Duplicate item identities; their natural sizes will be shared"
            );
        }

        let removed: Vec<ItemKey> = self
            .nodes
            .keys()
            .filter(|key| !keys.contains(*key))
            .cloned()
            .collect();
        for key in &removed {
            if let Some(mut node) = self.nodes.remove(key) {
                node.unmount(&mut self.backend, &mut self.redraw);
            }
        }
        let pruned = self.registry.retain_keys(&keys);

        let mut mounted = 0usize;
        for item in &prepared {
            let stale = self
                .nodes
                .get(&item.key)
                .is_some_and(|node| node.is_outdated_by(item));
            if stale {
                if let Some(mut node) = self.nodes.remove(&item.key) {
                    node.unmount(&mut self.backend, &mut self.redraw);
                }
            }
            if !self.nodes.contains_key(&item.key) {
                let token = self.issue_token();
                let mut node = MediaNode::new(item);
                node.mount(token, &mut self.backend);
                self.nodes.insert(item.key.clone(), node);
                mounted += 1;
            }
        }

        debug!(
            items = prepared.len(),
            mounted,
            removed = removed.len(),
            pruned,
            "Item list replaced"
        );

        self.items = prepared;
        self.list_hash = Some(hash);
        self.dirty = true;
        true
    }

    /// Feeds a container width measurement; `None` means the container is not
    /// measurable yet. Returns true when a relayout is now pending.
    pub fn observe_width(&mut self, width: Option<f32>) -> bool {
        let changed = self.resize.observe(width);
        if changed {
            trace!(?width, "Container width change pending");
        }
        changed
    }

    /// Routes a media event to its node. A newly known natural size marks the
    /// layout dirty; the recompute itself waits for the next flush so bursts
    /// of loads settle in one pass.
    pub fn handle_media_event(&mut self, key: &ItemKey, token: LoadToken, event: MediaEvent) -> bool {
        let Some(node) = self.nodes.get_mut(key) else {
            trace!(%key, "Media event for unknown item");
            return false;
        };
        let Some(size) = node.handle_event(token, event, &mut self.backend, &mut self.redraw) else {
            return false;
        };
        if self.registry.record(key, size) {
            debug!(%key, w = size.w, h = size.h, "Natural size recorded");
            self.dirty = true;
            return true;
        }
        false
    }

    pub fn pointer_enter(&mut self, key: &ItemKey) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) if !node.is_hovered() => {
                node.pointer_enter();
                true
            }
            _ => false,
        }
    }

    pub fn pointer_leave(&mut self, key: &ItemKey) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) if node.is_hovered() => {
                node.pointer_leave();
                true
            }
            _ => false,
        }
    }

    pub fn click(&mut self, key: &ItemKey) -> ClickOutcome {
        match self.nodes.get_mut(key) {
            Some(node) => node.click(&mut self.backend, &mut self.redraw),
            None => ClickOutcome::Ignored,
        }
    }

    pub fn drag_by(&mut self, key: &ItemKey, dx: f32, dy: f32) -> bool {
        match self.nodes.get_mut(key) {
            Some(node) => {
                node.drag_by(dx, dy);
                true
            }
            None => false,
        }
    }

    /// Dispatches renderer input. Returns true when the surface should be
    /// redrawn.
    pub fn apply_input(&mut self, input: GalleryInput) -> bool {
        match input {
            GalleryInput::PointerEnter(key) => self.pointer_enter(&key),
            GalleryInput::PointerLeave(key) => self.pointer_leave(&key),
            GalleryInput::Click(key) => self.click(&key) != ClickOutcome::Ignored,
            GalleryInput::Drag { key, dx, dy } => self.drag_by(&key, dx, dy),
        }
    }

    pub fn needs_flush(&self) -> bool {
        self.dirty || self.resize.has_pending()
    }

    /// Applies pending width changes and recomputes the layout if any input
    /// changed since the last pass. Returns true when a new pass was produced.
    pub fn flush(&mut self) -> bool {
        if self.resize.take_pending().is_some() {
            self.dirty = true;
        }
        if !self.dirty {
            return false;
        }
        self.dirty = false;

        let fingerprint = layout_fingerprint(
            self.list_hash.unwrap_or(0),
            self.container_width(),
            self.registry.generation(),
            self.config.cols,
            self.config.max_w,
        );
        if self.layout.is_some() && self.layout_fingerprint == Some(fingerprint) {
            trace!("Layout inputs unchanged, keeping previous pass");
            return false;
        }

        let pass = compute_layout(
            &self.items,
            &self.registry,
            self.container_width(),
            self.config.cols,
            self.config.max_w,
            &self.config.layout,
        );
        debug!(
            width = self.container_width(),
            scale = pass.global_scale,
            strategy = ?pass.strategy,
            nodes = pass.nodes.len(),
            canvas_height = pass.canvas_height,
            "Layout pass"
        );
        self.layout = Some(pass);
        self.layout_fingerprint = Some(fingerprint);
        true
    }

    pub fn layout(&self) -> Option<&LayoutPass> {
        self.layout.as_ref()
    }

    /// Width the current layout is computed for.
    pub fn container_width(&self) -> f32 {
        self.resize.applied()
    }

    pub fn global_scale(&self) -> f32 {
        global_scale(self.container_width(), &self.config.layout)
    }

    pub fn canvas_height(&self) -> f32 {
        self.layout
            .as_ref()
            .map(|pass| pass.canvas_height)
            .unwrap_or(self.config.initial_height)
    }

    /// Current rendered height of an item from the registry and width, without
    /// waiting for a flush. Zero until the item's natural size is known.
    pub fn rendered_height(&self, key: &ItemKey) -> f32 {
        let Some(item) = self.items.iter().find(|item| &item.key == key) else {
            return 0.0;
        };
        resolve_item_scale(
            item.item.declared_size(),
            self.config.max_w,
            self.global_scale(),
            self.registry.get(key),
        )
        .rendered_h
    }

    /// Flushes, then draws one full pass onto `surface`.
    pub fn render(&mut self, surface: &mut dyn RenderSurface) {
        self.flush();

        surface.begin_pass();
        surface.resize_stage(self.container_width(), self.canvas_height());

        if let Some(pass) = self.layout.as_ref() {
            let font_px = (LABEL_FONT_PX * pass.global_scale).max(LABEL_MIN_FONT_PX);
            for (layout, item) in pass.nodes.iter().zip(&self.items) {
                let Some(node) = self.nodes.get(&layout.key) else {
                    continue;
                };
                let (dx, dy) = node.drag_offset();
                let x = layout.placement.x() + dx;
                let y = layout.placement.y() + dy;

                surface.draw_node(&NodeDraw {
                    key: &layout.key,
                    url: &item.item.url,
                    kind: item.kind,
                    x,
                    y,
                    scale_x: layout.scale.scale,
                    scale_y: layout.scale.scale,
                    width: layout.scale.rendered_w,
                    height: layout.scale.rendered_h,
                    draggable: true,
                    visual: node.visual(),
                });

                if node.is_hovered() {
                    surface.draw_label(&LabelDraw {
                        key: &layout.key,
                        text: item.title(),
                        x,
                        y: y + layout.scale.rendered_h + self.config.label_offset,
                        style: LabelStyle { font_px },
                    });
                }
            }
        }

        surface.end_pass();
    }

    /// One animation frame: requests a single repaint while any video is
    /// playing. Returns whether a repaint was requested.
    pub fn frame(&self, surface: &mut dyn RenderSurface) -> bool {
        if self.redraw.is_active() {
            trace!(active = self.redraw.active_count(), "Continuous redraw");
            surface.request_redraw();
            true
        } else {
            false
        }
    }

    pub fn needs_continuous_redraw(&self) -> bool {
        self.redraw.is_active()
    }

    /// Tears down every node: pending loads are cancelled, playback stops and
    /// redraw subscriptions are dropped.
    pub fn unmount(&mut self) {
        if self.nodes.is_empty() && self.items.is_empty() {
            return;
        }
        for (_, mut node) in self.nodes.drain() {
            node.unmount(&mut self.backend, &mut self.redraw);
        }
        self.redraw.clear();
        self.items.clear();
        self.registry.clear();
        self.list_hash = None;
        self.layout = None;
        self.layout_fingerprint = None;
        self.dirty = true;
        debug!("Gallery unmounted");
    }

    fn issue_token(&mut self) -> LoadToken {
        let token = LoadToken(self.next_token);
        self.next_token += 1;
        token
    }
}

impl<B: MediaBackend> Drop for GalleryController<B> {
    fn drop(&mut self) {
        self.unmount();
    }
}
