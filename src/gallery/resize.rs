use tracing::trace;

use crate::error::MediaError;

/// Coalesces container width observations.
///
/// Sub-threshold jitter is dropped and only the latest accepted width is kept
/// until the controller takes it on its next flush.
#[derive(Debug, Clone)]
pub struct ResizeCoalescer {
    applied: f32,
    pending: Option<f32>,
    threshold: f32,
}

impl ResizeCoalescer {
    pub fn new(initial_width: f32, threshold: f32) -> Self {
        Self {
            applied: initial_width,
            pending: None,
            threshold: threshold.max(0.0),
        }
    }

    /// Feeds one measurement. `None`, zero and non-finite widths mean the
    /// container is not measurable yet; they are deferred, not applied, and
    /// layout keeps the last applied width rather than collapsing to 0.
    pub fn observe(&mut self, width: Option<f32>) -> bool {
        let width = match width {
            Some(w) if w.is_finite() && w > 0.0 => w,
            _ => {
                trace!(error = %MediaError::MeasurementUnavailable, "Deferring layout width");
                return false;
            }
        };

        let target = self.pending.unwrap_or(self.applied);
        if (width - target).abs() < self.threshold {
            return false;
        }
        if (width - self.applied).abs() < self.threshold {
            // Bounced back to what is already laid out.
            self.pending = None;
            return false;
        }
        self.pending = Some(width);
        true
    }

    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn take_pending(&mut self) -> Option<f32> {
        let width = self.pending.take()?;
        self.applied = width;
        Some(width)
    }

    pub fn applied(&self) -> f32 {
        self.applied
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subpixel_changes_ignored() {
        let mut resize = ResizeCoalescer::new(800.0, 1.0);
        assert!(!resize.observe(Some(800.4)));
        assert!(!resize.has_pending());
        assert!(resize.observe(Some(1024.0)));
        assert_eq!(resize.take_pending(), Some(1024.0));
        assert_eq!(resize.applied(), 1024.0);
    }

    #[test]
    fn test_latest_width_wins() {
        let mut resize = ResizeCoalescer::new(800.0, 1.0);
        resize.observe(Some(900.0));
        resize.observe(Some(950.0));
        resize.observe(Some(1000.0));
        assert_eq!(resize.take_pending(), Some(1000.0));
        assert_eq!(resize.take_pending(), None);
    }

    #[test]
    fn test_bounce_back_cancels_pending() {
        let mut resize = ResizeCoalescer::new(800.0, 1.0);
        assert!(resize.observe(Some(900.0)));
        assert!(!resize.observe(Some(800.0)));
        assert!(!resize.has_pending());
    }

    #[test]
    fn test_unmeasurable_width_deferred() {
        let mut resize = ResizeCoalescer::new(800.0, 1.0);
        assert!(!resize.observe(None));
        assert!(!resize.observe(Some(0.0)));
        assert!(!resize.observe(Some(f32::NAN)));
        assert_eq!(resize.applied(), 800.0);
        assert!(!resize.has_pending());
    }
}
