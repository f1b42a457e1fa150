use crate::media::NodeVisual;
use crate::models::{ItemKey, MediaKind};

/// One positioned media node for the renderer.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraw<'a> {
    pub key: &'a ItemKey,
    pub url: &'a str,
    pub kind: MediaKind,
    pub x: f32,
    pub y: f32,
    pub scale_x: f32,
    pub scale_y: f32,
    /// Size after scaling; zero until the natural size is known.
    pub width: f32,
    pub height: f32,
    pub draggable: bool,
    pub visual: NodeVisual,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelStyle {
    pub font_px: f32,
}

/// Title text drawn under a hovered node. Labels never take pointer input.
#[derive(Debug, Clone, PartialEq)]
pub struct LabelDraw<'a> {
    pub key: &'a ItemKey,
    pub text: &'a str,
    pub x: f32,
    pub y: f32,
    pub style: LabelStyle,
}

/// Pointer input the renderer delivers back to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum GalleryInput {
    PointerEnter(ItemKey),
    PointerLeave(ItemKey),
    Click(ItemKey),
    Drag { key: ItemKey, dx: f32, dy: f32 },
}

/// Drawing capability of the presentation surface.
///
/// A pass is `begin_pass`, `resize_stage`, any number of `draw_node` /
/// `draw_label`, then `end_pass`. Retained-mode surfaces use the pass
/// boundaries to drop visuals that were not drawn.
pub trait RenderSurface {
    fn begin_pass(&mut self) {}

    fn resize_stage(&mut self, width: f32, height: f32);

    fn draw_node(&mut self, node: &NodeDraw<'_>);

    fn draw_label(&mut self, label: &LabelDraw<'_>);

    fn end_pass(&mut self) {}

    /// Asks for a repaint on the next frame.
    fn request_redraw(&mut self);
}
