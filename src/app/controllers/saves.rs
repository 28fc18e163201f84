//! Serializes note saves. The server applies whole-note updates, so at
//! most one request may be in flight; a save issued while one is running
//! is coalesced into a single re-send once the running one completes.

#[derive(Debug, Default)]
pub struct SaveGuard {
    in_flight: bool,
    queued: bool,
}

impl SaveGuard {
    /// Ask to start a save. Returns true when the caller should dispatch
    /// the request now; otherwise it is queued behind the running one.
    pub fn begin(&mut self) -> bool {
        if self.in_flight {
            self.queued = true;
            false
        } else {
            self.in_flight = true;
            true
        }
    }

    /// The in-flight save completed. Returns true when a queued save
    /// should be dispatched next.
    pub fn finish(&mut self) -> bool {
        self.in_flight = false;
        std::mem::take(&mut self.queued)
    }

    /// The in-flight save failed. The queued re-send is dropped so the
    /// user decides whether to retry against the reported error.
    pub fn fail(&mut self) {
        self.in_flight = false;
        self.queued = false;
    }

    /// Forget everything, e.g. on logout.
    pub fn reset(&mut self) {
        self.in_flight = false;
        self.queued = false;
    }

    pub fn in_flight(&self) -> bool {
        self.in_flight
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_second_save_queues_behind_the_first() {
        let mut guard = SaveGuard::default();
        assert!(guard.begin());
        assert!(!guard.begin());
        assert!(!guard.begin());
        assert!(guard.in_flight());
    }

    #[test]
    fn test_queued_save_redispatches_exactly_once() {
        let mut guard = SaveGuard::default();
        assert!(guard.begin());
        assert!(!guard.begin());
        assert!(guard.finish());
        // the re-dispatched save starts a fresh cycle
        assert!(guard.begin());
        assert!(!guard.finish());
    }

    #[test]
    fn test_finish_without_queue_stays_idle() {
        let mut guard = SaveGuard::default();
        assert!(guard.begin());
        assert!(!guard.finish());
        assert!(!guard.in_flight());
        assert!(guard.begin());
    }

    #[test]
    fn test_unrelated_failures_do_not_release_the_guard() {
        // A failed fetch elsewhere must not let a retry start a second
        // concurrent save; only the save's own completion releases it.
        let mut guard = SaveGuard::default();
        assert!(guard.begin());
        assert!(!guard.begin());
        assert!(guard.in_flight());
        assert!(guard.finish());
    }

    #[test]
    fn test_failed_save_releases_and_drops_the_queue() {
        let mut guard = SaveGuard::default();
        assert!(guard.begin());
        assert!(!guard.begin());
        guard.fail();
        assert!(!guard.in_flight());
        assert!(guard.begin());
        assert!(!guard.finish());
    }
}
