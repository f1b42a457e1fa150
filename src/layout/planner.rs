use crate::models::{Placement, PlacementMode, PreparedItem};

use super::{LayoutConfig, RowPitch};

/// Scaled grid constants for one layout pass.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridMetrics {
    pub cols: usize,
    pub gap: f32,
    pub padding: f32,
    pub col_width: f32,
    pub label_pad: f32,
}

impl GridMetrics {
    pub fn new(config: &LayoutConfig, cols: usize, container_width: f32, global: f32) -> Self {
        let cols = cols.max(1);
        let gap = config.gap * global;
        let padding = config.padding * global;
        let col_width =
            (config.min_column_width * global).max(container_width / cols as f32 - gap);
        Self {
            cols,
            gap,
            padding,
            col_width,
            label_pad: config.label_pad,
        }
    }

    pub fn column_of(&self, index: usize) -> usize {
        index % self.cols
    }

    pub fn row_of(&self, index: usize) -> usize {
        index / self.cols
    }

    pub fn row_count(&self, item_count: usize) -> usize {
        item_count.div_ceil(self.cols)
    }
}

/// Computes a placement for every item.
///
/// `rendered_heights` is indexed like `items` and only consulted for
/// [`RowPitch::Cumulative`]; the uniform pitch places row `r` at
/// `padding + r * gap` regardless of content.
pub fn plan_positions(
    items: &[PreparedItem],
    rendered_heights: &[f32],
    metrics: &GridMetrics,
    global: f32,
    pitch: RowPitch,
) -> Vec<Placement> {
    let row_offsets = match pitch {
        RowPitch::Uniform => None,
        RowPitch::Cumulative => Some(cumulative_row_offsets(items.len(), rendered_heights, metrics)),
    };

    items
        .iter()
        .enumerate()
        .map(|(index, prepared)| match prepared.mode {
            PlacementMode::Free => Placement::Free {
                x: (prepared.item.x.unwrap_or(0.0) * global).round(),
                y: (prepared.item.y.unwrap_or(0.0) * global).round(),
            },
            PlacementMode::Grid => {
                let col = metrics.column_of(index);
                let row = metrics.row_of(index);
                let x = metrics.padding + col as f32 * (metrics.col_width + metrics.gap);
                let y = match &row_offsets {
                    Some(offsets) => offsets[row],
                    None => metrics.padding + row as f32 * metrics.gap,
                };
                Placement::Grid {
                    x: x.round(),
                    y: y.round(),
                    row,
                }
            }
        })
        .collect()
}

/// Tallest rendered height per grid row.
pub fn row_heights(item_count: usize, rendered_heights: &[f32], metrics: &GridMetrics) -> Vec<f32> {
    let mut rows = vec![0.0f32; metrics.row_count(item_count)];
    for (index, height) in rendered_heights.iter().take(item_count).enumerate() {
        let row = metrics.row_of(index);
        rows[row] = rows[row].max(*height);
    }
    rows
}

fn cumulative_row_offsets(
    item_count: usize,
    rendered_heights: &[f32],
    metrics: &GridMetrics,
) -> Vec<f32> {
    let mut offsets = Vec::with_capacity(metrics.row_count(item_count));
    let mut y = metrics.padding;
    for height in row_heights(item_count, rendered_heights, metrics) {
        offsets.push(y);
        y += height + metrics.label_pad + metrics.gap;
    }
    offsets
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::GalleryItem;

    fn grid_items(count: usize) -> Vec<PreparedItem> {
        (0..count)
            .map(|i| PreparedItem::new(GalleryItem::new(format!("{}", i), format!("{}.jpg", i))))
            .collect()
    }

    #[test]
    fn test_grid_rows_and_columns() {
        let config = LayoutConfig::default();
        let metrics = GridMetrics::new(&config, 3, 1280.0, 0.5);
        let items = grid_items(6);
        let placements = plan_positions(&items, &[0.0; 6], &metrics, 0.5, RowPitch::Uniform);

        let rows: Vec<usize> = placements.iter().filter_map(|p| p.row()).collect();
        assert_eq!(rows, vec![0, 0, 0, 1, 1, 1]);
        let cols: Vec<usize> = (0..6).map(|i| metrics.column_of(i)).collect();
        assert_eq!(cols, vec![0, 1, 2, 0, 1, 2]);

        // Same column shares x, same row shares y.
        assert_eq!(placements[0].x(), placements[3].x());
        assert_eq!(placements[0].y(), placements[2].y());
        assert!(placements[1].x() > placements[0].x());
    }

    #[test]
    fn test_grid_uniform_pitch_values() {
        let config = LayoutConfig::default();
        // g = 0.5: gap 20, padding 10, colW = max(120, 1280/3 - 20)
        let metrics = GridMetrics::new(&config, 3, 1280.0, 0.5);
        let col_w = 1280.0 / 3.0 - 20.0;
        assert!((metrics.col_width - col_w).abs() < 1e-3);

        let items = grid_items(4);
        let placements = plan_positions(&items, &[300.0; 4], &metrics, 0.5, RowPitch::Uniform);
        assert_eq!(placements[0], Placement::Grid { x: 10.0, y: 10.0, row: 0 });
        assert_eq!(placements[1].x(), (10.0 + col_w + 20.0).round());
        assert_eq!(placements[3], Placement::Grid { x: 10.0, y: 30.0, row: 1 });
    }

    #[test]
    fn test_min_column_width_floor() {
        let config = LayoutConfig::default();
        let metrics = GridMetrics::new(&config, 3, 200.0, 0.35);
        assert!((metrics.col_width - 240.0 * 0.35).abs() < 1e-3);
    }

    #[test]
    fn test_free_placement_scaled_and_rounded() {
        let config = LayoutConfig::default();
        let metrics = GridMetrics::new(&config, 3, 1280.0, 0.5);
        let items = vec![PreparedItem::new(
            GalleryItem::new("a", "a.png").with_position(100.0, 50.0),
        )];
        let placements = plan_positions(&items, &[0.0], &metrics, 0.5, RowPitch::Uniform);
        assert_eq!(placements[0], Placement::Free { x: 50.0, y: 25.0 });
        assert_eq!(placements[0].mode(), PlacementMode::Free);

        let mut only_x = GalleryItem::new("b", "b.png");
        only_x.x = Some(33.0);
        let items = vec![PreparedItem::new(only_x)];
        let placements = plan_positions(&items, &[0.0], &metrics, 0.5, RowPitch::Uniform);
        assert_eq!(placements[0], Placement::Free { x: 17.0, y: 0.0 });
    }

    #[test]
    fn test_cumulative_pitch_stacks_rows() {
        let config = LayoutConfig::default();
        let metrics = GridMetrics::new(&config, 2, 2560.0, 1.0);
        let items = grid_items(5);
        let heights = [100.0, 250.0, 40.0, 60.0, 10.0];
        let placements = plan_positions(&items, &heights, &metrics, 1.0, RowPitch::Cumulative);

        assert_eq!(placements[0].y(), 20.0);
        // row 0 height 250 + label 24 + gap 40
        assert_eq!(placements[2].y(), 20.0 + 250.0 + 24.0 + 40.0);
        assert_eq!(placements[4].y(), 20.0 + 314.0 + 60.0 + 24.0 + 40.0);
    }

    #[test]
    fn test_cols_clamped_to_one() {
        let config = LayoutConfig::default();
        let metrics = GridMetrics::new(&config, 0, 800.0, 1.0);
        assert_eq!(metrics.cols, 1);
        assert_eq!(metrics.row_count(3), 3);
    }
}
