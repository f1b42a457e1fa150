use crate::models::{DeclaredSize, NaturalSize};

use super::LayoutConfig;

/// Global scale derived from the container width, clamped to the configured
/// range. Unusable widths count as zero.
pub fn global_scale(container_width: f32, config: &LayoutConfig) -> f32 {
    let width = if container_width.is_finite() {
        container_width.max(0.0)
    } else {
        0.0
    };
    let base = config.base_width.max(1.0);
    (width / base).clamp(config.min_scale, config.max_scale)
}

/// Per-item scale and the size it renders at.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ItemScale {
    pub scale: f32,
    pub rendered_w: f32,
    pub rendered_h: f32,
}

impl ItemScale {
    /// Scale for an item whose media has not reported a size yet: drawn at
    /// 1:1 and contributing nothing to layout.
    pub const UNKNOWN: ItemScale = ItemScale {
        scale: 1.0,
        rendered_w: 0.0,
        rendered_h: 0.0,
    };
}

/// Combines the global scale with the item's declared size or the max-width
/// ceiling.
pub fn resolve_item_scale(
    declared: DeclaredSize,
    max_w: f32,
    global: f32,
    natural: Option<NaturalSize>,
) -> ItemScale {
    let Some(natural) = natural.filter(|n| !n.is_empty()) else {
        return ItemScale::UNKNOWN;
    };
    let nat_w = natural.w as f32;
    let nat_h = natural.h as f32;

    let scale = match declared {
        DeclaredSize::Width(w) => (w * global) / nat_w,
        DeclaredSize::Height(h) => (h * global) / nat_h,
        DeclaredSize::Natural => ((max_w * global) / nat_w).min(1.0),
    };

    ItemScale {
        scale,
        rendered_w: nat_w * scale,
        rendered_h: nat_h * scale,
    }
}
