use std::cell::Cell;
use std::rc::Rc;

use super::viewport::Viewport;

/// Latest viewport posted by the host, consumed at the start of the next tick.
///
/// Clones share the same slot; posting overwrites any size not yet taken.
#[derive(Debug, Clone, Default)]
pub struct PendingResize {
    slot: Rc<Cell<Option<Viewport>>>,
}

impl PendingResize {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn post(&self, viewport: Viewport) {
        self.slot.set(Some(viewport));
    }

    pub fn take(&self) -> Option<Viewport> {
        self.slot.take()
    }

    pub fn is_pending(&self) -> bool {
        self.slot.get().is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn latest_post_wins() {
        let pending = PendingResize::new();
        let host_side = pending.clone();
        host_side.post(Viewport::new(800, 600));
        host_side.post(Viewport::new(1024, 768));

        assert!(pending.is_pending());
        assert_eq!(pending.take(), Some(Viewport::new(1024, 768)));
        assert_eq!(pending.take(), None);
    }
}
