//! Single-threaded cooperative task dispatch
//!
//! Everything that touches the icon toolkit runs on one thread. Other threads
//! never call the toolkit directly; they hand work to a [`Dispatcher`], which
//! queues it for the owning loop.
//!
//! Two kinds of work are supported:
//!
//! - **idle tasks**: run once per loop pass until they return [`Step::Done`].
//!   Long jobs do a bounded slice of work per pass and return
//!   [`Step::Continue`], which keeps the loop responsive.
//! - **timeouts**: run once after a delay.
//!
//! [`EventLoop`] is the in-process implementation. It keeps a virtual clock so
//! that tests can step it deterministically; the binary drives it in
//! real time with [`EventLoop::run_until_idle`].

use std::collections::VecDeque;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

/// Result of one slice of an idle task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// Call the task again on a later pass
    Continue,
    /// The task is finished and is dropped
    Done,
}

pub type IdleTask = Box<dyn FnMut() -> Step + Send + 'static>;
pub type TimerTask = Box<dyn FnOnce() + Send + 'static>;

/// Hands work to the thread that owns the cooperative loop
///
/// Implementations must accept calls from any thread.
pub trait Dispatcher: Send + Sync {
    /// Queue a task that is polled on each pass until it returns `Step::Done`
    fn idle(&self, task: IdleTask);

    /// Queue a task to run once after `delay`
    fn timeout(&self, delay: Duration, task: TimerTask);

    /// Queue a one-shot task for the next pass
    fn idle_once(&self, task: TimerTask) {
        let mut task = Some(task);
        self.idle(Box::new(move || {
            if let Some(run) = task.take() {
                run();
            }
            Step::Done
        }));
    }
}

struct Timer {
    due: Duration,
    seq: u64,
    task: TimerTask,
}

#[derive(Default)]
struct Queue {
    now: Duration,
    seq: u64,
    idle: VecDeque<IdleTask>,
    timers: Vec<Timer>,
}

/// Cooperative loop with a virtual clock
#[derive(Default)]
pub struct EventLoop {
    queue: Mutex<Queue>,
}

impl EventLoop {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn queue(&self) -> MutexGuard<'_, Queue> {
        self.queue.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Time elapsed on the loop's clock
    #[must_use]
    pub fn now(&self) -> Duration {
        self.queue().now
    }

    #[must_use]
    pub fn pending_idle(&self) -> usize {
        self.queue().idle.len()
    }

    #[must_use]
    pub fn pending_timers(&self) -> usize {
        self.queue().timers.len()
    }

    /// True when neither idle tasks nor timers are queued
    #[must_use]
    pub fn is_idle(&self) -> bool {
        let queue = self.queue();
        queue.idle.is_empty() && queue.timers.is_empty()
    }

    /// Runs every queued idle task once and returns how many ran
    ///
    /// Tasks queued while the pass is running wait for the next pass.
    pub fn run_idle(&self) -> usize {
        let batch: Vec<IdleTask> = self.queue().idle.drain(..).collect();
        let ran = batch.len();

        for mut task in batch {
            if task() == Step::Continue {
                self.queue().idle.push_back(task);
            }
        }
        ran
    }

    /// Moves the clock forward and fires every timer that became due
    ///
    /// Returns the number of timers fired.
    pub fn advance(&self, delay: Duration) -> usize {
        let due = {
            let mut queue = self.queue();
            queue.now += delay;
            let now = queue.now;

            let (mut due, pending): (Vec<Timer>, Vec<Timer>) =
                queue.timers.drain(..).partition(|timer| timer.due <= now);
            queue.timers = pending;
            due.sort_by_key(|timer| (timer.due, timer.seq));
            due
        };

        let fired = due.len();
        for timer in due {
            (timer.task)();
        }
        fired
    }

    /// Runs idle tasks until none are left, without moving the clock
    pub fn drain_idle(&self) {
        while self.pending_idle() > 0 {
            self.run_idle();
        }
    }

    /// Runs the loop until nothing is queued
    ///
    /// When `realtime` is set the thread sleeps until each timer is due;
    /// otherwise the clock jumps straight to the next deadline.
    pub fn run_until_idle(&self, realtime: bool) {
        loop {
            self.drain_idle();
            self.advance(Duration::ZERO);

            let next_due = {
                let queue = self.queue();
                if !queue.idle.is_empty() {
                    continue;
                }
                queue.timers.iter().map(|timer| timer.due).min().map(|due| due.saturating_sub(queue.now))
            };

            match next_due {
                None => break,
                Some(wait) => {
                    if realtime && !wait.is_zero() {
                        std::thread::sleep(wait);
                    }
                    self.advance(wait);
                }
            }
        }
    }
}

impl Dispatcher for EventLoop {
    fn idle(&self, task: IdleTask) {
        self.queue().idle.push_back(task);
    }

    fn timeout(&self, delay: Duration, task: TimerTask) {
        let mut queue = self.queue();
        queue.seq += 1;
        let timer = Timer {
            due: queue.now + delay,
            seq: queue.seq,
            task,
        };
        queue.timers.push(timer);
    }
}
