use tracing::debug;

use crate::frame::Frame;

/// What a recurring task wants after running for a frame.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum TaskControl {
    Continue,
    /// Unregister the task; it will not run on later frames.
    Cancel,
}

/// A unit of per-frame work executed by the [`FrameScheduler`].
///
/// Tasks run once per frame until cancelled, in a stable order based on
/// `(priority, id, registration order)`.
pub struct RecurringTask<C> {
    pub id: &'static str,
    /// Smaller values run earlier.
    pub priority: i32,
    pub run: fn(frame: Frame, ctx: &mut C) -> TaskControl,
}

impl<C> RecurringTask<C> {
    pub fn new(id: &'static str, run: fn(frame: Frame, ctx: &mut C) -> TaskControl) -> Self {
        Self {
            id,
            priority: 0,
            run,
        }
    }

    pub fn with_priority(
        id: &'static str,
        priority: i32,
        run: fn(frame: Frame, ctx: &mut C) -> TaskControl,
    ) -> Self {
        Self { id, priority, run }
    }
}

/// Identifies a registered task. Handles are never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskHandle(u64);

#[derive(Debug, Copy, Clone, PartialEq, Eq, thiserror::Error)]
#[error("frame scheduler has been shut down")]
pub struct SchedulerClosed;

/// Explicit, cancellable registry of per-frame work.
///
/// The host calls [`FrameScheduler::run_frame`] once per display frame. Once
/// [`FrameScheduler::shutdown`] has been called no task runs again and new
/// registrations are rejected.
pub struct FrameScheduler<C> {
    next_handle: u64,
    tasks: Vec<(TaskHandle, RecurringTask<C>)>,
    closed: bool,
}

impl<C> Default for FrameScheduler<C> {
    fn default() -> Self {
        Self {
            next_handle: 0,
            tasks: Vec::new(),
            closed: false,
        }
    }
}

impl<C> FrameScheduler<C> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, task: RecurringTask<C>) -> Result<TaskHandle, SchedulerClosed> {
        if self.closed {
            return Err(SchedulerClosed);
        }
        let handle = TaskHandle(self.next_handle);
        self.next_handle = self.next_handle.wrapping_add(1);
        debug!(task = task.id, handle = handle.0, "registered frame task");
        self.tasks.push((handle, task));
        Ok(handle)
    }

    /// Returns `true` if the task was registered.
    pub fn cancel(&mut self, handle: TaskHandle) -> bool {
        let before = self.tasks.len();
        self.tasks.retain(|(h, _)| *h != handle);
        let removed = self.tasks.len() != before;
        if removed {
            debug!(handle = handle.0, "cancelled frame task");
        }
        removed
    }

    pub fn is_active(&self, handle: TaskHandle) -> bool {
        self.tasks.iter().any(|(h, _)| *h == handle)
    }

    pub fn task_count(&self) -> usize {
        self.tasks.len()
    }

    pub fn cancel_all(&mut self) {
        self.tasks.clear();
    }

    /// Cancels every task and refuses further registrations.
    pub fn shutdown(&mut self) {
        self.cancel_all();
        self.closed = true;
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Runs every active task once for `frame`.
    ///
    /// Returns how many tasks ran. Tasks that return [`TaskControl::Cancel`]
    /// are removed before this returns.
    pub fn run_frame(&mut self, frame: Frame, ctx: &mut C) -> usize {
        // Total ordering: (priority, id, handle). Stays deterministic even with
        // duplicate task ids.
        self.tasks.sort_by(|(ha, a), (hb, b)| {
            a.priority
                .cmp(&b.priority)
                .then_with(|| a.id.cmp(b.id))
                .then_with(|| ha.cmp(hb))
        });

        let mut finished: Vec<TaskHandle> = Vec::new();
        for (handle, task) in &self.tasks {
            if (task.run)(frame, ctx) == TaskControl::Cancel {
                finished.push(*handle);
            }
        }

        let ran = self.tasks.len();
        if !finished.is_empty() {
            self.tasks.retain(|(h, _)| !finished.contains(h));
            debug!(count = finished.len(), frame = frame.index, "frame tasks finished");
        }
        ran
    }
}
