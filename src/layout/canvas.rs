use crate::models::{Placement, PlacementMode, PreparedItem};

use super::planner::{row_heights, GridMetrics};
use super::LayoutConfig;

/// Sizing algorithm for a whole pass. A single free item switches the entire
/// list to free sizing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LayoutStrategy {
    Free,
    Grid,
}

impl LayoutStrategy {
    pub fn select(items: &[PreparedItem]) -> Self {
        if items.iter().any(|item| item.mode == PlacementMode::Free) {
            Self::Free
        } else {
            Self::Grid
        }
    }
}

/// Canvas height needed to show every item, never below the configured
/// minimum.
pub fn canvas_height(
    strategy: LayoutStrategy,
    placements: &[Placement],
    rendered_heights: &[f32],
    metrics: &GridMetrics,
    config: &LayoutConfig,
) -> f32 {
    if placements.is_empty() {
        return config.min_canvas_height;
    }

    let content = match strategy {
        LayoutStrategy::Free => free_extent(placements, rendered_heights, metrics),
        LayoutStrategy::Grid => grid_extent(placements.len(), rendered_heights, metrics),
    };

    config.min_canvas_height.max(content.ceil())
}

fn free_extent(placements: &[Placement], rendered_heights: &[f32], metrics: &GridMetrics) -> f32 {
    let max_bottom = placements
        .iter()
        .zip(rendered_heights)
        .map(|(placement, height)| placement.y() + height + metrics.label_pad)
        .fold(0.0f32, f32::max);
    max_bottom + metrics.padding
}

fn grid_extent(item_count: usize, rendered_heights: &[f32], metrics: &GridMetrics) -> f32 {
    let rows = row_heights(item_count, rendered_heights, metrics);
    let row_count = rows.len() as f32;
    let content: f32 = rows.iter().sum();
    content
        + (row_count - 1.0).max(0.0) * metrics.gap
        + row_count * metrics.label_pad
        + 2.0 * metrics.padding
}
