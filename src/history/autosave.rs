//! Debounced autosave scheduling
//!
//! [`AutosaveTimer`] is a single-slot delayed task: arming it cancels any
//! save that is still pending, so a burst of edits results in exactly one
//! save once the conversation goes quiet. There is never more than one
//! pending save per timer.

use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

/// Cancel-and-reschedule timer for delayed saves
pub struct AutosaveTimer {
    delay: Duration,
    handle: Option<JoinHandle<()>>,
}

impl AutosaveTimer {
    /// Creates a disarmed timer with the given debounce delay.
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            handle: None,
        }
    }

    /// The configured debounce delay.
    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// Whether a save is currently pending.
    pub fn is_armed(&self) -> bool {
        self.handle
            .as_ref()
            .map(|handle| !handle.is_finished())
            .unwrap_or(false)
    }

    /// Arms the timer: cancels any pending save and schedules `save` to run
    /// after the debounce delay.
    pub fn schedule<F>(&mut self, save: F)
    where
        F: Future<Output = ()> + Send + 'static,
    {
        self.cancel();
        let delay = self.delay;
        self.handle = Some(tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            save.await;
        }));
    }

    /// Cancels the pending save, if any.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for AutosaveTimer {
    fn drop(&mut self) {
        self.cancel();
    }
}
