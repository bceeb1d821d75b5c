use super::*;

#[derive(Debug, Clone)]
pub(crate) struct ScheduledTask {
    pub(crate) id: TimerId,
    pub(crate) due_at: i64,
    pub(crate) order: i64,
    pub(crate) task: PageTask<MockNode>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingTimer {
    pub id: TimerId,
    pub due_at: i64,
    pub order: i64,
}

#[derive(Debug)]
pub(crate) struct SchedulerState {
    pub(crate) task_queue: Vec<ScheduledTask>,
    pub(crate) now_ms: i64,
    pub(crate) timer_step_limit: usize,
    pub(crate) next_timer_id: i64,
    pub(crate) next_task_order: i64,
}

impl Default for SchedulerState {
    fn default() -> Self {
        Self {
            task_queue: Vec::new(),
            now_ms: 0,
            timer_step_limit: 10_000,
            next_timer_id: 1,
            next_task_order: 0,
        }
    }
}

impl SchedulerState {
    pub(crate) fn schedule(&mut self, delay_ms: i64, task: PageTask<MockNode>) -> TimerId {
        let id = TimerId(self.next_timer_id);
        self.next_timer_id += 1;
        let order = self.next_task_order;
        self.next_task_order += 1;
        self.task_queue.push(ScheduledTask {
            id,
            due_at: self.now_ms.saturating_add(delay_ms.max(0)),
            order,
            task,
        });
        id
    }

    pub(crate) fn clear(&mut self, id: TimerId) -> bool {
        let before = self.task_queue.len();
        self.task_queue.retain(|task| task.id != id);
        self.task_queue.len() != before
    }

    pub(crate) fn pending(&self) -> Vec<PendingTimer> {
        let mut timers = self
            .task_queue
            .iter()
            .map(|task| PendingTimer {
                id: task.id,
                due_at: task.due_at,
                order: task.order,
            })
            .collect::<Vec<_>>();
        timers.sort_by_key(|timer| (timer.due_at, timer.order));
        timers
    }

    /// Index of the earliest task, optionally limited to tasks due by
    /// `due_limit`. Ties run in scheduling order.
    pub(crate) fn next_task_index(&self, due_limit: Option<i64>) -> Option<usize> {
        self.task_queue
            .iter()
            .enumerate()
            .filter(|(_, task)| due_limit.is_none_or(|limit| task.due_at <= limit))
            .min_by_key(|(_, task)| (task.due_at, task.order))
            .map(|(idx, _)| idx)
    }

    /// Removes the next runnable task. With `advance_clock` the clock jumps
    /// forward to the task's due time.
    pub(crate) fn take_next(
        &mut self,
        due_limit: Option<i64>,
        advance_clock: bool,
    ) -> Option<ScheduledTask> {
        let idx = self.next_task_index(due_limit)?;
        let task = self.task_queue.remove(idx);
        if advance_clock && task.due_at > self.now_ms {
            self.now_ms = task.due_at;
        }
        Some(task)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tasks_run_by_due_time_then_scheduling_order() {
        let mut scheduler = SchedulerState::default();
        let late = scheduler.schedule(50, PageTask::DismissAlert(MockNode(1)));
        let first = scheduler.schedule(10, PageTask::DismissAlert(MockNode(2)));
        let second = scheduler.schedule(10, PageTask::DismissAlert(MockNode(3)));

        let order = std::iter::from_fn(|| scheduler.take_next(None, true))
            .map(|task| task.id)
            .collect::<Vec<_>>();
        assert_eq!(order, vec![first, second, late]);
        assert_eq!(scheduler.now_ms, 50);
    }

    #[test]
    fn due_limit_keeps_future_tasks_queued() {
        let mut scheduler = SchedulerState::default();
        scheduler.schedule(5_000, PageTask::DismissAlert(MockNode(1)));
        assert!(scheduler.take_next(Some(4_999), false).is_none());
        assert_eq!(scheduler.pending().len(), 1);
        assert!(scheduler.take_next(Some(5_000), false).is_some());
        assert_eq!(scheduler.now_ms, 0);
    }

    #[test]
    fn clear_reports_whether_the_timer_was_pending() {
        let mut scheduler = SchedulerState::default();
        let id = scheduler.schedule(1, PageTask::DismissAlert(MockNode(1)));
        assert!(scheduler.clear(id));
        assert!(!scheduler.clear(id));
    }

    #[test]
    fn negative_delays_fire_immediately_and_large_ones_saturate() {
        let mut scheduler = SchedulerState::default();
        scheduler.schedule(-10, PageTask::DismissAlert(MockNode(1)));
        scheduler.now_ms = i64::MAX - 1;
        scheduler.schedule(100, PageTask::DismissAlert(MockNode(2)));
        let due = scheduler.pending().into_iter().map(|t| t.due_at).collect::<Vec<_>>();
        assert_eq!(due, vec![0, i64::MAX]);
    }
}
