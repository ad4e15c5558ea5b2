//! Long-press detection for preset buttons
//!
//! A press arms one timer task that posts an event back to the controller's
//! channel after the options delay. A release aborts it. Each arm and release
//! bumps a generation number, so an expiry that was already queued when the
//! timer was cancelled is recognised as stale and dropped.

use std::time::Duration;
use tokio::sync::mpsc::UnboundedSender;
use tokio::task::JoinHandle;
use tracing::{debug, trace};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReleaseOutcome {
    /// Run the button's primary action
    Fire,
    /// The options prompt already opened and release suppression is on
    Suppressed,
}

#[derive(Debug)]
struct Pending {
    generation: u64,
    handle: JoinHandle<()>,
}

#[derive(Debug)]
pub struct PressSession {
    pending: Option<Pending>,
    generation: u64,
    submenu_open: bool,
    delay: Duration,
    suppress_release: bool,
}

impl PressSession {
    pub fn new(delay: Duration, suppress_release: bool) -> Self {
        Self {
            pending: None,
            generation: 0,
            submenu_open: false,
            delay,
            suppress_release,
        }
    }

    pub fn submenu_open(&self) -> bool {
        self.submenu_open
    }

    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.handle.abort();
            trace!(generation = pending.generation, "long-press timer cancelled");
        }
    }

    /// Start a fresh session; `event` builds the message posted on expiry
    pub fn arm<E, F>(&mut self, tx: &UnboundedSender<E>, event: F) -> u64
    where
        E: Send + 'static,
        F: FnOnce(u64) -> E + Send + 'static,
    {
        self.cancel();
        self.submenu_open = false;
        self.generation += 1;

        let generation = self.generation;
        let delay = self.delay;
        let tx = tx.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(delay).await;
            // Receiver gone means the controller is shutting down
            let _ = tx.send(event(generation));
        });

        debug!(generation, delay_ms = delay.as_millis() as u64, "long-press armed");
        self.pending = Some(Pending { generation, handle });
        generation
    }

    pub fn release(&mut self) -> ReleaseOutcome {
        self.cancel();
        self.generation += 1;
        if self.suppress_release && self.submenu_open {
            debug!("release suppressed, options already open");
            ReleaseOutcome::Suppressed
        } else {
            ReleaseOutcome::Fire
        }
    }

    /// True when `generation` is the live timer; marks the options as open
    pub fn take_elapsed(&mut self, generation: u64) -> bool {
        match &self.pending {
            Some(pending) if pending.generation == generation => {
                self.pending = None;
                self.submenu_open = true;
                true
            }
            _ => {
                debug!(generation, current = self.generation, "stale long-press expiry ignored");
                false
            }
        }
    }
}

impl Drop for PressSession {
    fn drop(&mut self) {
        self.cancel();
    }
}
