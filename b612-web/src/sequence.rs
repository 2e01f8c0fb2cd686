use crate::timer::{TimerId, TimerQueue};

/// Outcome of moving a sequence forward by one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition<S> {
    pub exited: Option<S>,
    pub entered: Option<S>,
}

/// An ordered list of timed stages, run one after another.
///
/// The sequence only keeps time: it schedules `task` when a stage is entered
/// and expects [`Sequence::advance`] to be called when that task fires. The
/// owner performs each stage's enter/exit effects from the returned
/// [`Transition`].
#[derive(Debug, Clone)]
pub struct Sequence<S> {
    stages: Vec<(S, u64)>,
    cursor: Option<usize>,
    timer: Option<TimerId>,
    finished: bool,
}

impl<S: Copy> Sequence<S> {
    pub fn new(stages: impl IntoIterator<Item = (S, u64)>) -> Self {
        Self {
            stages: stages.into_iter().collect(),
            cursor: None,
            timer: None,
            finished: false,
        }
    }

    /// Enter the first stage. A sequence starts at most once.
    pub fn start<T: Clone>(&mut self, timers: &mut TimerQueue<T>, task: T) -> Option<S> {
        if self.cursor.is_some() || self.finished {
            return None;
        }
        self.enter(0, timers, task)
    }

    /// Leave the current stage and enter the next one, if any.
    pub fn advance<T: Clone>(&mut self, timers: &mut TimerQueue<T>, task: T) -> Transition<S> {
        let Some(index) = self.cursor else {
            return Transition {
                exited: None,
                entered: None,
            };
        };
        self.timer = None;
        let exited = Some(self.stages[index].0);
        let entered = self.enter(index + 1, timers, task);
        Transition { exited, entered }
    }

    /// Stop without running any further stage.
    pub fn cancel<T: Clone>(&mut self, timers: &mut TimerQueue<T>) {
        if let Some(timer) = self.timer.take() {
            timers.cancel(timer);
        }
        self.cursor = None;
        self.finished = true;
    }

    pub fn current(&self) -> Option<S> {
        self.cursor.map(|i| self.stages[i].0)
    }

    pub fn is_running(&self) -> bool {
        self.cursor.is_some()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    fn enter<T: Clone>(&mut self, index: usize, timers: &mut TimerQueue<T>, task: T) -> Option<S> {
        match self.stages.get(index) {
            Some(&(stage, duration)) => {
                self.cursor = Some(index);
                self.timer = Some(timers.after(duration, task));
                Some(stage)
            }
            None => {
                self.cursor = None;
                self.finished = true;
                None
            }
        }
    }
}
