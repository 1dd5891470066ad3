/// Loading progress for one scene session.
///
/// The total is known up front; each asset ends as either loaded or
/// failed. Failed assets still count toward completion so a missing
/// texture never holds the loading screen open.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadProgress {
    total: usize,
    loaded: usize,
    failed: usize,
    last_item: Option<String>,
}

impl LoadProgress {
    /// Start a new session expecting `total` assets.
    pub fn begin(&mut self, total: usize) {
        *self = Self {
            total,
            ..Self::default()
        };
    }

    /// Record a successfully loaded asset.
    pub fn record_loaded(&mut self, item: &str) {
        self.loaded += 1;
        self.last_item = Some(item.to_owned());
    }

    /// Record an asset that failed to load.
    pub fn record_failed(&mut self, item: &str) {
        self.failed += 1;
        self.last_item = Some(item.to_owned());
    }

    /// Assets expected this session.
    pub fn total(&self) -> usize {
        self.total
    }

    /// Assets loaded so far.
    pub fn loaded(&self) -> usize {
        self.loaded
    }

    /// Assets that failed so far.
    pub fn failed(&self) -> usize {
        self.failed
    }

    /// Most recently finished asset.
    pub fn last_item(&self) -> Option<&str> {
        self.last_item.as_deref()
    }

    /// Completion in `[0, 100]`. An empty session is complete.
    pub fn percent(&self) -> f32 {
        if self.total == 0 {
            return 100.0;
        }
        let done = (self.loaded + self.failed).min(self.total);
        done as f32 / self.total as f32 * 100.0
    }

    /// Whether assets are still outstanding.
    pub fn active(&self) -> bool {
        self.loaded + self.failed < self.total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aggregates_loaded_and_failed() {
        let mut p = LoadProgress::default();
        p.begin(4);
        assert!(p.active());
        assert_eq!(p.percent(), 0.0);
        p.record_loaded("room.glb");
        p.record_failed("desk.jpg");
        assert_eq!(p.percent(), 50.0);
        assert_eq!(p.last_item(), Some("desk.jpg"));
        p.record_loaded("a");
        p.record_loaded("b");
        assert!(!p.active());
        assert_eq!(p.percent(), 100.0);
    }

    #[test]
    fn begin_resets_counts() {
        let mut p = LoadProgress::default();
        p.begin(1);
        p.record_loaded("x");
        p.begin(3);
        assert_eq!(p.loaded(), 0);
        assert!(p.last_item().is_none());
        assert_eq!(p.total(), 3);
    }

    #[test]
    fn empty_session_is_complete() {
        let p = LoadProgress::default();
        assert!(!p.active());
        assert_eq!(p.percent(), 100.0);
    }
}
