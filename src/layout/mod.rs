pub mod canvas;
pub mod planner;
pub mod scale;

pub use canvas::{canvas_height, LayoutStrategy};
pub use planner::{plan_positions, GridMetrics};
pub use scale::{global_scale, resolve_item_scale, ItemScale};

use xxhash_rust::xxh3::xxh3_64;

use crate::models::{ItemKey, NaturalSizeRegistry, Placement, PreparedItem};

/// Vertical offset between grid rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RowPitch {
    /// Row `r` sits at `padding + r * gap`; true row heights only feed canvas
    /// sizing, so uneven rows may overlap.
    #[default]
    Uniform,
    /// Each row starts below the measured height of the rows above it.
    Cumulative,
}

impl RowPitch {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "uniform" => Some(Self::Uniform),
            "cumulative" => Some(Self::Cumulative),
            _ => None,
        }
    }
}

/// Layout constants in unscaled base units.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutConfig {
    /// Container width at which the global scale is 1.0 (default: 2560)
    pub base_width: f32,
    /// Lower clamp for the global scale (default: 0.35)
    pub min_scale: f32,
    /// Upper clamp for the global scale (default: 1.1)
    pub max_scale: f32,
    /// Narrowest grid column before scaling (default: 240)
    pub min_column_width: f32,
    /// Horizontal and vertical grid gap before scaling (default: 40)
    pub gap: f32,
    /// Canvas padding before scaling (default: 20)
    pub padding: f32,
    /// Space reserved under each item for its title label (default: 24)
    pub label_pad: f32,
    /// Canvas never gets shorter than this (default: 500)
    pub min_canvas_height: f32,
    pub row_pitch: RowPitch,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            base_width: 2560.0,
            min_scale: 0.35,
            max_scale: 1.1,
            min_column_width: 240.0,
            gap: 40.0,
            padding: 20.0,
            label_pad: 24.0,
            min_canvas_height: 500.0,
            row_pitch: RowPitch::Uniform,
        }
    }
}

/// Where and how large one node is drawn.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeLayout {
    pub key: ItemKey,
    pub placement: Placement,
    pub scale: ItemScale,
}

/// Result of one layout pass over the whole item list.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutPass {
    pub container_width: f32,
    pub global_scale: f32,
    pub strategy: LayoutStrategy,
    pub nodes: Vec<NodeLayout>,
    pub canvas_height: f32,
}

impl LayoutPass {
    pub fn node(&self, key: &ItemKey) -> Option<&NodeLayout> {
        self.nodes.iter().find(|node| &node.key == key)
    }
}

/// Runs scale resolution, placement and canvas sizing for `items`.
///
/// Pure: the same items, registry contents and width always give the same
/// pass.
pub fn compute_layout(
    items: &[PreparedItem],
    registry: &NaturalSizeRegistry,
    container_width: f32,
    cols: usize,
    max_w: f32,
    config: &LayoutConfig,
) -> LayoutPass {
    let global = global_scale(container_width, config);
    let metrics = GridMetrics::new(config, cols, container_width.max(0.0), global);
    let strategy = LayoutStrategy::select(items);

    let scales: Vec<ItemScale> = items
        .iter()
        .map(|prepared| {
            resolve_item_scale(
                prepared.item.declared_size(),
                max_w,
                global,
                registry.get(&prepared.key),
            )
        })
        .collect();
    let heights: Vec<f32> = scales.iter().map(|s| s.rendered_h).collect();

    let placements = plan_positions(items, &heights, &metrics, global, config.row_pitch);
    let canvas_height = canvas_height(strategy, &placements, &heights, &metrics, config);

    let nodes = items
        .iter()
        .zip(placements)
        .zip(scales)
        .map(|((prepared, placement), scale)| NodeLayout {
            key: prepared.key.clone(),
            placement,
            scale,
        })
        .collect();

    LayoutPass {
        container_width,
        global_scale: global,
        strategy,
        nodes,
        canvas_height,
    }
}

/// Fingerprint of every input to [`compute_layout`] besides the config
/// constants, used to skip passes whose inputs have not changed.
pub fn layout_fingerprint(
    list_hash: u64,
    container_width: f32,
    registry_generation: u64,
    cols: usize,
    max_w: f32,
) -> u64 {
    let mut input = Vec::with_capacity(32);
    input.extend_from_slice(&list_hash.to_le_bytes());
    input.extend_from_slice(&container_width.to_bits().to_le_bytes());
    input.extend_from_slice(&registry_generation.to_le_bytes());
    input.extend_from_slice(&(cols as u64).to_le_bytes());
    input.extend_from_slice(&max_w.to_bits().to_le_bytes());
    xxh3_64(&input)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{GalleryItem, NaturalSize};

    fn items(count: usize) -> Vec<PreparedItem> {
        (0..count)
            .map(|i| PreparedItem::new(GalleryItem::new(format!("{}", i), format!("{}.jpg", i))))
            .collect()
    }

    #[test]
    fn test_empty_layout() {
        let pass = compute_layout(
            &[],
            &NaturalSizeRegistry::new(),
            1280.0,
            3,
            480.0,
            &LayoutConfig::default(),
        );
        assert!(pass.nodes.is_empty());
        assert_eq!(pass.canvas_height, 500.0);
    }

    #[test]
    fn test_rendered_height_follows_registry() {
        let config = LayoutConfig::default();
        let list = vec![PreparedItem::new(GalleryItem::new("a", "a.png").with_width(200.0))];
        let mut registry = NaturalSizeRegistry::new();

        let before = compute_layout(&list, &registry, 1280.0, 3, 480.0, &config);
        assert_eq!(before.nodes[0].scale.rendered_h, 0.0);

        registry.record(&list[0].key, NaturalSize::new(1000, 500));
        let after = compute_layout(&list, &registry, 1280.0, 3, 480.0, &config);
        let expected_scale = 200.0 * after.global_scale / 1000.0;
        assert!((after.nodes[0].scale.scale - expected_scale).abs() < 1e-6);
        assert!((after.nodes[0].scale.rendered_h - 500.0 * expected_scale).abs() < 1e-4);
    }

    #[test]
    fn test_layout_is_idempotent() {
        let config = LayoutConfig::default();
        let list = items(7);
        let mut registry = NaturalSizeRegistry::new();
        for (i, item) in list.iter().enumerate() {
            registry.record(&item.key, NaturalSize::new(400 + i as u32 * 37, 300 + i as u32 * 11));
        }
        let a = compute_layout(&list, &registry, 1733.0, 3, 480.0, &config);
        let b = compute_layout(&list, &registry, 1733.0, 3, 480.0, &config);
        assert_eq!(a, b);
    }

    #[test]
    fn test_canvas_never_below_minimum() {
        let config = LayoutConfig::default();
        for width in [0.0, 120.0, 800.0, 2560.0, 6000.0] {
            for count in [0, 1, 4, 9] {
                let pass =
                    compute_layout(&items(count), &NaturalSizeRegistry::new(), width, 3, 480.0, &config);
                assert!(pass.canvas_height >= 500.0);
                assert!((0.35..=1.1).contains(&pass.global_scale));
            }
        }
    }

    #[test]
    fn test_cumulative_rows_end_at_canvas_height() {
        let config = LayoutConfig {
            row_pitch: RowPitch::Cumulative,
            ..LayoutConfig::default()
        };
        let list = items(4);
        let mut registry = NaturalSizeRegistry::new();
        for (item, h) in list.iter().zip([300, 500, 200, 400]) {
            registry.record(&item.key, NaturalSize::new(400, h));
        }

        // Width 2560 gives g = 1 and natural widths under max_w keep scale 1.
        let pass = compute_layout(&list, &registry, 2560.0, 2, 480.0, &config);
        assert_eq!(pass.strategy, LayoutStrategy::Grid);
        assert_eq!(pass.nodes[0].placement.y(), 20.0);
        assert_eq!(pass.nodes[2].placement.y(), 20.0 + 500.0 + 24.0 + 40.0);

        let last = &pass.nodes[3];
        let last_row_height = 400.0;
        let bottom = last.placement.y() + last_row_height + config.label_pad + config.padding;
        assert_eq!(bottom, 1028.0);
        assert_eq!(pass.canvas_height, bottom);
    }

    #[test]
    fn test_mixed_list_uses_free_sizing_for_every_item() {
        let config = LayoutConfig::default();
        let list = vec![
            PreparedItem::new(GalleryItem::new("free", "free.jpg").with_position(100.0, 600.0)),
            PreparedItem::new(GalleryItem::new("grid", "grid.jpg")),
        ];
        let mut registry = NaturalSizeRegistry::new();
        registry.record(&list[0].key, NaturalSize::new(400, 300));
        registry.record(&list[1].key, NaturalSize::new(400, 200));

        let pass = compute_layout(&list, &registry, 2560.0, 3, 480.0, &config);
        assert_eq!(pass.strategy, LayoutStrategy::Free);
        assert_eq!(pass.nodes[0].placement, Placement::Free { x: 100.0, y: 600.0 });
        assert_eq!(pass.nodes[1].placement.row(), Some(0));
        assert_eq!(pass.nodes[1].placement.y(), 20.0);
        // Free item bottom: 600 + 300 + 24, plus padding.
        assert_eq!(pass.canvas_height, 944.0);

        // A tall grid item now sets the extent from its own placement.
        registry.record(&list[1].key, NaturalSize::new(400, 1200));
        let pass = compute_layout(&list, &registry, 2560.0, 3, 480.0, &config);
        assert_eq!(pass.strategy, LayoutStrategy::Free);
        assert_eq!(pass.canvas_height, 20.0 + 1200.0 + 24.0 + 20.0);
    }

    #[test]
    fn test_fingerprint_tracks_inputs() {
        let base = layout_fingerprint(1, 800.0, 0, 3, 480.0);
        assert_eq!(base, layout_fingerprint(1, 800.0, 0, 3, 480.0));
        assert_ne!(base, layout_fingerprint(2, 800.0, 0, 3, 480.0));
        assert_ne!(base, layout_fingerprint(1, 801.0, 0, 3, 480.0));
        assert_ne!(base, layout_fingerprint(1, 800.0, 1, 3, 480.0));
        assert_ne!(base, layout_fingerprint(1, 800.0, 0, 4, 480.0));
    }

    #[test]
    fn test_row_pitch_parse() {
        assert_eq!(RowPitch::parse(" Cumulative "), Some(RowPitch::Cumulative));
        assert_eq!(RowPitch::parse("uniform"), Some(RowPitch::Uniform));
        assert_eq!(RowPitch::parse("stacked"), None);
    }
}
