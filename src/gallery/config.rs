use std::time::Duration;

use tracing::warn;

use crate::layout::{LayoutConfig, RowPitch};

/// Default number of grid columns.
const DEFAULT_COLS: usize = 3;

/// Default max rendered width (before global scaling) for items without a
/// declared size.
const DEFAULT_MAX_W: f32 = 480.0;

/// Configuration for one gallery instance.
#[derive(Debug, Clone, PartialEq)]
pub struct GalleryConfig {
    /// Grid column count (default: 3)
    pub cols: usize,
    /// Max-width ceiling for undeclared items (default: 480)
    pub max_w: f32,
    pub layout: LayoutConfig,
    /// Container width assumed until the first measurement (default: 800)
    pub initial_width: f32,
    /// Canvas height reported before the first layout pass (default: 600)
    pub initial_height: f32,
    /// Width changes smaller than this are ignored (default: 1px)
    pub resize_threshold: f32,
    /// Coalescing window for relayouts after loads or resizes (default: 40ms)
    pub relayout_delay: Duration,
    /// Gap between rendered content and its hover label (default: 4)
    pub label_offset: f32,
}

impl Default for GalleryConfig {
    fn default() -> Self {
        Self {
            cols: DEFAULT_COLS,
            max_w: DEFAULT_MAX_W,
            layout: LayoutConfig::default(),
            initial_width: 800.0,
            initial_height: 600.0,
            resize_threshold: 1.0,
            relayout_delay: Duration::from_millis(40),
            label_offset: 4.0,
        }
    }
}

impl GalleryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_cols(mut self, cols: usize) -> Self {
        self.cols = cols.max(1);
        self
    }

    pub fn with_max_w(mut self, max_w: f32) -> Self {
        self.max_w = max_w;
        self
    }

    pub fn with_row_pitch(mut self, pitch: RowPitch) -> Self {
        self.layout.row_pitch = pitch;
        self
    }

    pub fn with_relayout_delay(mut self, delay: Duration) -> Self {
        self.relayout_delay = delay;
        self
    }

    /// Defaults plus `GALLERY_COLS`, `GALLERY_MAX_W` and `GALLERY_ROW_PITCH`
    /// from the environment.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|name| std::env::var(name).ok())
    }

    /// Applies overrides from `lookup`. Unparseable values are logged and
    /// skipped.
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(raw) = lookup("GALLERY_COLS") {
            match raw.trim().parse::<usize>() {
                Ok(cols) if cols > 0 => self.cols = cols,
                _ => warn!(value = %raw, "Ignoring invalid GALLERY_COLS"),
            }
        }
        if let Some(raw) = lookup("GALLERY_MAX_W") {
            match raw.trim().parse::<f32>() {
                Ok(max_w) if max_w.is_finite() && max_w > 0.0 => self.max_w = max_w,
                _ => warn!(value = %raw, "Ignoring invalid GALLERY_MAX_W"),
            }
        }
        if let Some(raw) = lookup("GALLERY_ROW_PITCH") {
            match RowPitch::parse(&raw) {
                Some(pitch) => self.layout.row_pitch = pitch,
                None => warn!(value = %raw, "Ignoring invalid GALLERY_ROW_PITCH"),
            }
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_defaults() {
        let config = GalleryConfig::default();
        assert_eq!(config.cols, 3);
        assert_eq!(config.max_w, 480.0);
        assert_eq!(config.initial_width, 800.0);
        assert_eq!(config.initial_height, 600.0);
        assert_eq!(config.layout.row_pitch, RowPitch::Uniform);
    }

    #[test]
    fn test_overrides() {
        let env: HashMap<&str, &str> = [
            ("GALLERY_COLS", "4"),
            ("GALLERY_MAX_W", "320.5"),
            ("GALLERY_ROW_PITCH", "cumulative"),
        ]
        .into_iter()
        .collect();
        let config = GalleryConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config.cols, 4);
        assert_eq!(config.max_w, 320.5);
        assert_eq!(config.layout.row_pitch, RowPitch::Cumulative);
    }

    #[test]
    fn test_invalid_overrides_ignored() {
        let env: HashMap<&str, &str> = [
            ("GALLERY_COLS", "0"),
            ("GALLERY_MAX_W", "wide"),
            ("GALLERY_ROW_PITCH", "zigzag"),
        ]
        .into_iter()
        .collect();
        let config = GalleryConfig::default().with_overrides(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(config, GalleryConfig::default());
    }

    #[test]
    fn test_builder_clamps_cols() {
        assert_eq!(GalleryConfig::new().with_cols(0).cols, 1);
    }
}
