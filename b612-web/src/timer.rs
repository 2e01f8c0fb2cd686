use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};

/// Opaque handle to a scheduled timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerId(u64);

struct Entry<T> {
    due: u64,
    every: Option<u64>,
    task: T,
}

/// Single-threaded timer queue on a millisecond clock.
///
/// Works like `setTimeout`/`setInterval` on a virtual clock: the host calls
/// [`TimerQueue::pop_due`] with the current time and runs each returned task.
/// While a task runs, [`TimerQueue::now`] reports that timer's due time, so
/// anything it schedules is placed relative to when it *should* have fired.
/// Timers due at the same instant fire in scheduling order.
pub struct TimerQueue<T> {
    entries: HashMap<u64, Entry<T>>,
    order: BinaryHeap<Reverse<(u64, u64)>>,
    next_id: u64,
    now: u64,
}

impl<T: Clone> TimerQueue<T> {
    pub fn new(now: u64) -> Self {
        Self {
            entries: HashMap::new(),
            order: BinaryHeap::new(),
            next_id: 1,
            now,
        }
    }

    pub fn now(&self) -> u64 {
        self.now
    }

    /// Run `task` once, `delay` ms from now.
    pub fn after(&mut self, delay: u64, task: T) -> TimerId {
        self.insert(self.now + delay, None, task)
    }

    /// Run `task` every `period` ms, first at `now + period`.
    pub fn every(&mut self, period: u64, task: T) -> TimerId {
        let period = period.max(1);
        self.insert(self.now + period, Some(period), task)
    }

    /// Cancel a timer. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, id: TimerId) -> bool {
        self.entries.remove(&id.0).is_some()
    }

    pub fn is_pending(&self, id: TimerId) -> bool {
        self.entries.contains_key(&id.0)
    }

    /// Number of live timers.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Due time of the earliest live timer.
    pub fn next_due(&self) -> Option<u64> {
        self.entries.values().map(|e| e.due).min()
    }

    /// Pop the next timer due at or before `until`.
    ///
    /// Advances the clock to that timer's due time. Repeating timers are
    /// rescheduled before being returned.
    pub fn pop_due(&mut self, until: u64) -> Option<(TimerId, T)> {
        while let Some(&Reverse((due, id))) = self.order.peek() {
            if due > until {
                return None;
            }
            self.order.pop();

            let Some(entry) = self.entries.get_mut(&id) else {
                continue; // cancelled
            };
            if entry.due != due {
                continue; // stale heap slot
            }

            self.now = self.now.max(due);
            let every = entry.every;
            match every {
                Some(period) => {
                    entry.due = due + period;
                    let task = entry.task.clone();
                    self.order.push(Reverse((due + period, id)));
                    return Some((TimerId(id), task));
                }
                None => {
                    let entry = self.entries.remove(&id)?;
                    return Some((TimerId(id), entry.task));
                }
            }
        }
        None
    }

    /// Move the clock forward once every due timer has been drained.
    pub fn settle(&mut self, now: u64) {
        self.now = self.now.max(now);
    }

    fn insert(&mut self, due: u64, every: Option<u64>, task: T) -> TimerId {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.insert(id, Entry { due, every, task });
        self.order.push(Reverse((due, id)));
        TimerId(id)
    }
}
