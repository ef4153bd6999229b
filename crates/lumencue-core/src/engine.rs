//! Dispatch loop
//!
//! [`ShowEngine`] owns the action queue and the instrument registry and is
//! driven from a single thread. Each iteration either takes one inbound cue
//! off the hand-off channel, or dispatches the head of the queue if it is due
//! and then ticks every instrument. Nothing in an iteration blocks.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError};

use crate::clock::Clock;
use crate::cue::Action;
use crate::error::{EngineError, Result};
use crate::instrument::InstrumentRegistry;
use crate::scheduler::ActionQueue;

/// Longest idle back-off the loop accepts
pub const MAX_IDLE_BACKOFF: Duration = Duration::from_micros(2_000);

/// What a single loop iteration did
#[derive(Debug)]
pub enum PollOutcome {
    /// An inbound cue was parsed and queued
    Enqueued,
    /// The head of the queue was dispatched
    Dispatched,
    /// Nothing was received or due; instruments were still ticked
    Idle,
    /// A cue was rejected and dropped
    Rejected(EngineError),
}

impl PollOutcome {
    /// Whether the iteration did any work
    pub fn is_idle(&self) -> bool {
        matches!(self, PollOutcome::Idle)
    }
}

/// Cue scheduler and dispatcher
pub struct ShowEngine {
    queue: ActionQueue,
    instruments: InstrumentRegistry,
    inbound: Receiver<String>,
    inbound_closed: bool,
    idle_backoff: Duration,
}

impl ShowEngine {
    /// Create an engine reading raw cues from `inbound`
    pub fn new(instruments: InstrumentRegistry, inbound: Receiver<String>) -> Self {
        Self {
            queue: ActionQueue::new(),
            instruments,
            inbound,
            inbound_closed: false,
            idle_backoff: Duration::ZERO,
        }
    }

    /// Sleep this long on iterations that did nothing (capped at [`MAX_IDLE_BACKOFF`])
    pub fn with_idle_backoff(mut self, backoff: Duration) -> Self {
        self.idle_backoff = backoff.min(MAX_IDLE_BACKOFF);
        self
    }

    /// Configured idle back-off
    pub fn idle_backoff(&self) -> Duration {
        self.idle_backoff
    }

    /// Parse a raw cue and queue it
    ///
    /// Returns the queue index the action settled at.
    pub fn enqueue(&mut self, message: &str, local_now: i64) -> Result<usize> {
        let action = Action::parse(message, local_now)?;
        tracing::debug!(
            "Queued {} in {} ms",
            action.instrument,
            action.deadline.saturating_sub(local_now) / 1_000_000
        );
        Ok(self.queue.insert(action))
    }

    /// Run one non-blocking iteration at `now`
    pub fn poll_once(&mut self, now: i64) -> PollOutcome {
        if !self.inbound_closed {
            match self.inbound.try_recv() {
                Ok(message) => {
                    return match self.enqueue(&message, now) {
                        Ok(_) => PollOutcome::Enqueued,
                        Err(e) => {
                            tracing::warn!("Rejected cue {:?}: {}", message.trim(), e);
                            PollOutcome::Rejected(e)
                        }
                    };
                }
                Err(TryRecvError::Empty) => {}
                Err(TryRecvError::Disconnected) => {
                    tracing::info!("Cue channel closed, draining {} queued cues", self.queue.len());
                    self.inbound_closed = true;
                }
            }
        }

        let outcome = match self.queue.pop_due(now) {
            Some(action) => match self.dispatch(&action, now) {
                Ok(()) => PollOutcome::Dispatched,
                Err(e) => {
                    if e.is_cue_error() {
                        tracing::warn!("Dropped cue for {}: {}", action.instrument, e);
                    } else {
                        tracing::error!("Failed to play cue on {}: {}", action.instrument, e);
                    }
                    PollOutcome::Rejected(e)
                }
            },
            None => PollOutcome::Idle,
        };

        self.instruments.tick_all(now);
        outcome
    }

    fn dispatch(&mut self, action: &Action, now: i64) -> Result<()> {
        tracing::debug!(
            "Dispatching {} late by {} us",
            action.instrument,
            now.saturating_sub(action.deadline) / 1_000
        );
        self.instruments
            .get_mut(&action.instrument)?
            .play(now, action.duration_ns, &action.params)
    }

    /// Drive the loop until `shutdown` is raised, or the cue channel has
    /// closed and every queued cue has been dispatched
    pub fn run<C: Clock + ?Sized>(&mut self, clock: &C, shutdown: &AtomicBool) {
        tracing::info!(
            "Dispatch loop started with {} instruments",
            self.instruments.len()
        );

        while !shutdown.load(Ordering::Relaxed) {
            let outcome = self.poll_once(clock.now_ns());

            if self.inbound_closed && self.queue.is_empty() {
                break;
            }
            if outcome.is_idle() && !self.idle_backoff.is_zero() {
                std::thread::sleep(self.idle_backoff);
            }
        }

        tracing::info!("Dispatch loop stopped, {} cues pending", self.queue.len());
    }

    /// Number of queued actions
    pub fn pending(&self) -> usize {
        self.queue.len()
    }

    /// Deadline of the next action to dispatch
    pub fn next_deadline(&self) -> Option<i64> {
        self.queue.next_deadline()
    }
}
