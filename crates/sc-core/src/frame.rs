//! Per-frame write coalescing.
//!
//! High-rate pointer input (manual rotation, live drags) must not write
//! state on every event. A `FrameCoalescer` holds at most one pending value
//! behind a token: scheduling a newer value invalidates the previous token
//! and replaces the value, so at most one write lands per frame.

/// Identifies one scheduled write. A token is stale once a newer value
/// has been scheduled or the pending value was taken or cancelled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameToken(u64);

#[derive(Debug)]
pub struct FrameCoalescer<T> {
    pending: Option<(FrameToken, T)>,
    next: u64,
}

impl<T> Default for FrameCoalescer<T> {
    fn default() -> Self {
        Self {
            pending: None,
            next: 0,
        }
    }
}

impl<T> FrameCoalescer<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace any pending value with `value`. Returns the new token; the
    /// host registers it with its frame callback.
    pub fn schedule(&mut self, value: T) -> FrameToken {
        let token = FrameToken(self.next);
        self.next += 1;
        self.pending = Some((token, value));
        token
    }

    /// Frame callback: yields the value only if `token` is still current.
    pub fn take_for_frame(&mut self, token: FrameToken) -> Option<T> {
        if self.current_token() != Some(token) {
            return None;
        }
        self.flush()
    }

    /// Yield whatever is pending, regardless of token (pointer-up).
    pub fn flush(&mut self) -> Option<T> {
        self.pending.take().map(|(_, v)| v)
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    pub fn current_token(&self) -> Option<FrameToken> {
        self.pending.as_ref().map(|(t, _)| *t)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn newer_schedule_invalidates_older_token() {
        let mut c = FrameCoalescer::new();
        let old = c.schedule(1);
        let new = c.schedule(2);
        assert_eq!(c.take_for_frame(old), None);
        assert_eq!(c.take_for_frame(new), Some(2));
        assert_eq!(c.take_for_frame(new), None);
    }

    #[test]
    fn flush_returns_latest() {
        let mut c = FrameCoalescer::new();
        c.schedule("a");
        c.schedule("b");
        assert_eq!(c.flush(), Some("b"));
        assert!(!c.is_pending());
    }

    #[test]
    fn cancel_drops_pending() {
        let mut c = FrameCoalescer::new();
        let t = c.schedule(5);
        c.cancel();
        assert_eq!(c.take_for_frame(t), None);
    }
}
