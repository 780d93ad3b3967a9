//! Logical-clock timer queue.
//!
//! Deferred work is recorded with a due time in milliseconds and handed back
//! by [`Scheduler::take_due`] once the caller's clock reaches it. Nothing
//! fires on its own, so tests advance time by passing larger timestamps.

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

#[derive(Debug)]
struct Pending<T> {
    id: TimerId,
    due_ms: f64,
    task: T,
}

#[derive(Debug)]
pub struct Scheduler<T> {
    pending: Vec<Pending<T>>,
    next_id: u64,
}

impl<T> Default for Scheduler<T> {
    fn default() -> Self {
        Self {
            pending: Vec::new(),
            next_id: 0,
        }
    }
}

impl<T> Scheduler<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn schedule(&mut self, due_ms: f64, task: T) -> TimerId {
        let id = TimerId(self.next_id);
        self.next_id += 1;
        self.pending.push(Pending { id, due_ms, task });
        id
    }

    /// Remove a pending timer, returning its task if it had not fired yet.
    pub fn cancel(&mut self, id: TimerId) -> Option<T> {
        let idx = self.pending.iter().position(|p| p.id == id)?;
        Some(self.pending.remove(idx).task)
    }

    /// Remove and return every task due at or before `now_ms`, earliest
    /// first; timers due at the same instant keep scheduling order.
    pub fn take_due(&mut self, now_ms: f64) -> Vec<T> {
        let mut due = Vec::new();
        let mut i = 0;
        while i < self.pending.len() {
            if self.pending[i].due_ms <= now_ms {
                due.push(self.pending.remove(i));
            } else {
                i += 1;
            }
        }
        due.sort_by(|a, b| a.due_ms.total_cmp(&b.due_ms).then(a.id.cmp(&b.id)));
        due.into_iter().map(|p| p.task).collect()
    }

    /// Cancel everything, returning the tasks that will now never fire.
    pub fn drain_all(&mut self) -> Vec<T> {
        self.pending.drain(..).map(|p| p.task).collect()
    }

    pub fn next_due(&self) -> Option<f64> {
        self.pending.iter().map(|p| p.due_ms).min_by(f64::total_cmp)
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
