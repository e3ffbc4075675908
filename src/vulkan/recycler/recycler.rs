use super::{PollFence, RecycleBin, Recycler};

impl<F: PollFence, T> Recycler<F, T> {
    pub fn new() -> Self {
        Self {
            dumpster: Vec::new(),
            bins: std::collections::VecDeque::new(),
        }
    }

    /// Register an entry for deferred destruction. The entry stays pending
    /// until [Self::empty_dumpster] attaches a fence to it.
    pub fn trash(&mut self, entry: T) {
        self.dumpster.push(entry);
    }

    /// Take the entire pending list as one batch and queue it behind the
    /// given fence.
    ///
    /// Call this right after submitting work with `fence`: at that moment the
    /// fence is known to signal only after every command buffer which could
    /// reference the pending entries has completed. An empty pending list
    /// registers no batch and the fence is simply dropped.
    pub fn empty_dumpster(&mut self, fence: F) {
        if self.dumpster.is_empty() {
            return;
        }
        let batch = std::mem::take(&mut self.dumpster);
        self.bins.push_back(RecycleBin { fence, batch });
    }

    /// Return every entry whose fence has signaled, in submission order.
    ///
    /// Only the front of the fenced queue is ever inspected: consecutive
    /// signaled batches are drained, and the first unsignaled fence stops the
    /// scan. A later fence signaling before an earlier one is not a case this
    /// design recognizes -- submission order and fence signal order agree on
    /// a single queue -- so skipping ahead would only ever destroy something
    /// early.
    ///
    /// Polling errors are returned as-is and leave the queue untouched;
    /// callers should treat them as fatal and fall back to a full teardown
    /// drain.
    pub fn recycle(&mut self) -> Result<Vec<T>, F::Error> {
        let mut matured = Vec::new();
        loop {
            let front_signaled = match self.bins.front() {
                Some(bin) => bin.fence.is_signaled()?,
                None => break,
            };
            if !front_signaled {
                break;
            }
            if let Some(bin) = self.bins.pop_front() {
                matured.extend(bin.batch);
            }
        }
        Ok(matured)
    }

    /// Take every entry -- pending and fenced alike -- regardless of fence
    /// status, in registration order.
    ///
    /// This is the shutdown special case: the only time destruction is
    /// allowed without a fence check, because the caller has already waited
    /// for the device to go fully idle.
    pub fn drain(&mut self) -> Vec<T> {
        let mut remaining = Vec::new();
        for bin in self.bins.drain(..) {
            remaining.extend(bin.batch);
        }
        remaining.append(&mut self.dumpster);
        remaining
    }

    /// The number of entries with no fence attached yet.
    pub fn pending_count(&self) -> usize {
        self.dumpster.len()
    }

    /// The number of fenced batches awaiting their fence.
    pub fn fenced_batch_count(&self) -> usize {
        self.bins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dumpster.is_empty() && self.bins.is_empty()
    }
}

impl<F: PollFence, T> Default for Recycler<F, T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod test {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    #[derive(Debug, PartialEq, Eq)]
    struct PollError;

    /// A fence double whose status is toggled by hand.
    #[derive(Clone, Default)]
    struct TestFence(Rc<TestFenceState>);

    #[derive(Default)]
    struct TestFenceState {
        signaled: Cell<bool>,
        poll_fails: Cell<bool>,
    }

    impl TestFence {
        fn signal(&self) {
            self.0.signaled.set(true);
        }

        fn fail_polls(&self) {
            self.0.poll_fails.set(true);
        }
    }

    impl PollFence for TestFence {
        type Error = PollError;

        fn is_signaled(&self) -> Result<bool, PollError> {
            if self.0.poll_fails.get() {
                return Err(PollError);
            }
            Ok(self.0.signaled.get())
        }
    }

    #[test]
    fn pending_entries_survive_until_a_fence_is_attached() {
        let mut recycler: Recycler<TestFence, &str> = Recycler::new();
        recycler.trash("a");
        recycler.trash("b");
        assert_eq!(recycler.pending_count(), 2);
        assert_eq!(recycler.recycle().unwrap(), Vec::<&str>::new());
        assert_eq!(recycler.pending_count(), 2);
    }

    #[test]
    fn empty_dumpster_with_no_pending_entries_registers_nothing() {
        let mut recycler: Recycler<TestFence, &str> = Recycler::new();
        recycler.empty_dumpster(TestFence::default());
        assert_eq!(recycler.fenced_batch_count(), 0);
    }

    #[test]
    fn a_signaled_later_batch_never_jumps_an_unsignaled_earlier_batch() {
        let mut recycler = Recycler::new();
        let f1 = TestFence::default();
        let f2 = TestFence::default();

        recycler.trash("b1");
        recycler.empty_dumpster(f1.clone());
        recycler.trash("b2");
        recycler.empty_dumpster(f2.clone());

        // the later fence signals first
        f2.signal();
        assert_eq!(recycler.recycle().unwrap(), Vec::<&str>::new());
        assert_eq!(recycler.fenced_batch_count(), 2);

        f1.signal();
        assert_eq!(recycler.recycle().unwrap(), vec!["b1", "b2"]);
        assert!(recycler.is_empty());
    }

    #[test]
    fn recycle_is_idempotent() {
        let mut recycler = Recycler::new();
        let fence = TestFence::default();
        recycler.trash("a");
        recycler.empty_dumpster(fence.clone());
        fence.signal();

        assert_eq!(recycler.recycle().unwrap(), vec!["a"]);
        assert_eq!(recycler.recycle().unwrap(), Vec::<&str>::new());
        assert_eq!(recycler.recycle().unwrap(), Vec::<&str>::new());
    }

    #[test]
    fn batches_sharing_one_fence_drain_in_order() {
        let mut recycler = Recycler::new();
        let fence = TestFence::default();

        recycler.trash("first");
        recycler.empty_dumpster(fence.clone());
        recycler.trash("second");
        recycler.empty_dumpster(fence.clone());

        fence.signal();
        assert_eq!(recycler.recycle().unwrap(), vec!["first", "second"]);
    }

    #[test]
    fn drain_returns_pending_and_fenced_entries_exactly_once() {
        let mut recycler = Recycler::new();
        let unsignaled = TestFence::default();
        recycler.trash("fenced");
        recycler.empty_dumpster(unsignaled);
        recycler.trash("pending");

        assert_eq!(recycler.drain(), vec!["fenced", "pending"]);
        assert!(recycler.is_empty());
        assert_eq!(recycler.drain(), Vec::<&str>::new());
    }

    #[test]
    fn poll_errors_propagate_and_leave_the_queue_intact() {
        let mut recycler = Recycler::new();
        let fence = TestFence::default();
        recycler.trash("a");
        recycler.empty_dumpster(fence.clone());

        fence.fail_polls();
        assert_eq!(recycler.recycle(), Err(PollError));
        assert_eq!(recycler.fenced_batch_count(), 1);

        // teardown can still reclaim everything
        assert_eq!(recycler.drain(), vec!["a"]);
    }
}
