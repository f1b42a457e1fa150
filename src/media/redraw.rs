use std::collections::BTreeSet;

use tracing::trace;

use crate::models::ItemKey;

/// Aggregates "needs continuous refresh" subscriptions from playing videos
/// into a single per-frame redraw decision.
#[derive(Debug, Default)]
pub struct RedrawDriver {
    subscribers: BTreeSet<ItemKey>,
}

impl RedrawDriver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, key: &ItemKey) -> bool {
        let added = self.subscribers.insert(key.clone());
        if added {
            trace!(%key, active = self.subscribers.len(), "Redraw subscription added");
        }
        added
    }

    pub fn unsubscribe(&mut self, key: &ItemKey) -> bool {
        let removed = self.subscribers.remove(key);
        if removed {
            trace!(%key, active = self.subscribers.len(), "Redraw subscription dropped");
        }
        removed
    }

    /// True while at least one node needs a repaint every frame.
    pub fn is_active(&self) -> bool {
        !self.subscribers.is_empty()
    }

    pub fn active_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn clear(&mut self) {
        self.subscribers.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subscriptions_aggregate() {
        let mut driver = RedrawDriver::new();
        let a = ItemKey::from("a.mp4");
        let b = ItemKey::from("b.mp4");
        assert!(!driver.is_active());

        assert!(driver.subscribe(&a));
        assert!(!driver.subscribe(&a));
        driver.subscribe(&b);
        assert_eq!(driver.active_count(), 2);

        driver.unsubscribe(&a);
        assert!(driver.is_active());
        driver.unsubscribe(&b);
        assert!(!driver.is_active());
    }
}
