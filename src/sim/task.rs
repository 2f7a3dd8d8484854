//! Cooperative timed tasks
//!
//! Each task is a loop of "wait N seconds, then do something". The set only tracks the
//! waiting; the owner performs the work when a [`Wakeup`] comes back from [`TaskSet::advance`].
//! Tasks belong to a [`Scope`] (one per match). Cancelling the scope drops every task and
//! invalidates wakeups that were already handed out, so nothing runs after cancellation.

/// Shortest interval accepted, keeps a zero interval from looping forever
pub const MIN_INTERVAL: f32 = 1e-3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TaskId(u64);

/// Cancellation token shared by every task started for one match
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Scope(u64);

#[derive(Debug, Clone)]
struct Task<K> {
    id: TaskId,
    kind: K,
    scope: Scope,
    interval: f32,
    /// Seconds until the next wakeup
    remaining: f32,
}

/// A task finished waiting
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Wakeup<K> {
    pub id: TaskId,
    pub kind: K,
    pub scope: Scope,
    /// Offset into the advanced step at which the wait ended
    pub at: f32,
}

#[derive(Debug, Clone)]
pub struct TaskSet<K> {
    tasks: Vec<Task<K>>,
    scope: Scope,
    next_id: u64,
}

impl<K> Default for TaskSet<K> {
    fn default() -> Self {
        Self {
            tasks: Vec::new(),
            scope: Scope(0),
            next_id: 1,
        }
    }
}

impl<K: Copy + PartialEq> TaskSet<K> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cancel everything and start a fresh scope
    pub fn open_scope(&mut self) -> Scope {
        self.cancel_all();
        self.scope
    }

    /// Drop every task; wakeups already returned become stale
    pub fn cancel_all(&mut self) {
        if !self.tasks.is_empty() {
            log::debug!("cancelling {} task(s)", self.tasks.len());
        }
        self.tasks.clear();
        self.scope = Scope(self.scope.0 + 1);
    }

    pub fn scope(&self) -> Scope {
        self.scope
    }

    /// Start a loop that first waits `first_wait`, then every `interval`
    pub fn spawn(&mut self, kind: K, first_wait: f32, interval: f32) -> TaskId {
        let id = TaskId(self.next_id);
        self.next_id += 1;
        self.tasks.push(Task {
            id,
            kind,
            scope: self.scope,
            interval: interval.max(MIN_INTERVAL),
            remaining: first_wait.max(0.0),
        });
        id
    }

    /// End one loop (its condition no longer holds)
    pub fn finish(&mut self, id: TaskId) {
        self.tasks.retain(|t| t.id != id);
    }

    /// Whether a wakeup may still act: same scope and its task not finished
    pub fn is_live(&self, wakeup: &Wakeup<K>) -> bool {
        wakeup.scope == self.scope && self.tasks.iter().any(|t| t.id == wakeup.id)
    }

    pub fn contains(&self, kind: K) -> bool {
        self.tasks.iter().any(|t| t.kind == kind)
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Let `dt` seconds pass; returns the wakeups in time order
    ///
    /// A task whose interval is shorter than `dt` wakes several times.
    pub fn advance(&mut self, dt: f32) -> Vec<Wakeup<K>> {
        let dt = dt.max(0.0);
        let mut wakeups = Vec::new();
        for task in &mut self.tasks {
            let mut until = task.remaining;
            while until <= dt {
                wakeups.push(Wakeup {
                    id: task.id,
                    kind: task.kind,
                    scope: task.scope,
                    at: until,
                });
                until += task.interval;
            }
            task.remaining = until - dt;
        }
        wakeups.sort_by(|a, b| a.at.total_cmp(&b.at));
        wakeups
    }
}
