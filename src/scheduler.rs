//! Named repeating tasks.
//!
//! Each running task owns one background thread that sleeps on a channel
//! with `recv_timeout`: a timeout means "tick", a closed channel means
//! "stop". Stopping drops the sender and returns immediately; a tick that is
//! already executing finishes on its own.

use std::sync::mpsc::{self, RecvTimeoutError, Sender};
use std::thread;
use std::time::Duration;

use crate::logging;

/// A repeating task with an explicit start/stop lifecycle.
#[derive(Debug)]
pub struct ScheduledTask {
    name: &'static str,
    interval: Duration,
    stop_tx: Option<Sender<()>>,
}

impl ScheduledTask {
    pub fn new(name: &'static str, interval: Duration) -> Self {
        Self {
            name,
            interval,
            stop_tx: None,
        }
    }

    pub fn is_running(&self) -> bool {
        self.stop_tx.is_some()
    }

    /// Start ticking. With `immediate`, the first tick runs right away on
    /// the task thread; otherwise after one interval.
    ///
    /// Returns `false` (and does nothing) if the task is already running.
    /// The tick returns `false` to end the task from the inside.
    pub fn start<F>(&mut self, immediate: bool, mut tick: F) -> bool
    where
        F: FnMut() -> bool + Send + 'static,
    {
        if self.is_running() {
            return false;
        }

        let (stop_tx, stop_rx) = mpsc::channel::<()>();
        let name = self.name;
        let interval = self.interval;

        let spawned = thread::Builder::new()
            .name(format!("mapledash-{name}"))
            .spawn(move || {
                if immediate && !tick() {
                    return;
                }
                loop {
                    match stop_rx.recv_timeout(interval) {
                        Err(RecvTimeoutError::Timeout) => {
                            if !tick() {
                                break;
                            }
                        }
                        Ok(()) | Err(RecvTimeoutError::Disconnected) => break,
                    }
                }
                logging::debug(&format!("task {name} exited"));
            });

        match spawned {
            Ok(_) => {
                self.stop_tx = Some(stop_tx);
                logging::info(&format!(
                    "task {name} started (every {}s)",
                    interval.as_secs_f64()
                ));
                true
            }
            Err(e) => {
                logging::error(&format!("task {name} failed to start: {e}"));
                false
            }
        }
    }

    /// Stop the task. Stopping a task that is not running is a no-op.
    ///
    /// Returns whether a running task was stopped.
    pub fn stop(&mut self) -> bool {
        match self.stop_tx.take() {
            Some(_) => {
                logging::info(&format!("task {} stopped", self.name));
                true
            }
            None => false,
        }
    }
}

impl Drop for ScheduledTask {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn counter() -> (Arc<AtomicUsize>, impl FnMut() -> bool + Send + 'static) {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        (count, move || {
            inner.fetch_add(1, Ordering::SeqCst);
            true
        })
    }

    #[test]
    fn ticks_until_stopped() {
        let (count, tick) = counter();
        let mut task = ScheduledTask::new("test", Duration::from_millis(10));
        assert!(task.start(false, tick));
        thread::sleep(Duration::from_millis(200));
        assert!(task.stop());
        let after_stop = count.load(Ordering::SeqCst);
        assert!(after_stop >= 2, "expected repeated ticks, got {after_stop}");

        thread::sleep(Duration::from_millis(100));
        // at most one tick may have been in flight while stopping
        assert!(count.load(Ordering::SeqCst) <= after_stop + 1);
    }

    #[test]
    fn start_is_a_no_op_while_running() {
        let (_, first) = counter();
        let (_, second) = counter();
        let mut task = ScheduledTask::new("test", Duration::from_secs(60));
        assert!(task.start(false, first));
        assert!(!task.start(false, second));
        assert!(task.is_running());
    }

    #[test]
    fn stop_is_idempotent() {
        let (_, tick) = counter();
        let mut task = ScheduledTask::new("test", Duration::from_secs(60));
        assert!(!task.stop());
        task.start(false, tick);
        assert!(task.stop());
        assert!(!task.stop());
        assert!(!task.is_running());
    }

    #[test]
    fn immediate_start_ticks_without_waiting() {
        let (count, tick) = counter();
        let mut task = ScheduledTask::new("test", Duration::from_secs(60));
        task.start(true, tick);
        let deadline = std::time::Instant::now() + Duration::from_secs(2);
        while count.load(Ordering::SeqCst) == 0 && std::time::Instant::now() < deadline {
            thread::sleep(Duration::from_millis(5));
        }
        assert_eq!(count.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn tick_can_end_the_task() {
        let count = Arc::new(AtomicUsize::new(0));
        let inner = Arc::clone(&count);
        let mut task = ScheduledTask::new("test", Duration::from_millis(5));
        task.start(false, move || inner.fetch_add(1, Ordering::SeqCst) < 2);
        thread::sleep(Duration::from_millis(150));
        assert_eq!(count.load(Ordering::SeqCst), 3);
    }
}
