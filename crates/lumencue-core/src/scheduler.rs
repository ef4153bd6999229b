//! Deadline-ordered action queue
//!
//! The queue is kept sorted ascending by deadline. Insertion appends at the
//! tail and bubbles the new element leftward past every predecessor with a
//! later deadline; since the queue was sorted before the append, only the new
//! element can be out of place. Equal deadlines keep arrival order.

use std::collections::VecDeque;

use crate::cue::Action;

/// Time-ordered queue of pending actions
#[derive(Debug, Default)]
pub struct ActionQueue {
    actions: VecDeque<Action>,
}

impl ActionQueue {
    /// Create an empty queue
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an action, keeping the queue sorted by deadline
    ///
    /// Returns the index the action settled at.
    pub fn insert(&mut self, action: Action) -> usize {
        self.actions.push_back(action);
        let mut i = self.actions.len() - 1;
        while i > 0 && self.actions[i].deadline < self.actions[i - 1].deadline {
            self.actions.swap(i, i - 1);
            i -= 1;
        }
        i
    }

    /// Remove and return the head if it is due at `now`
    pub fn pop_due(&mut self, now: i64) -> Option<Action> {
        if self.actions.front()?.is_due(now) {
            self.actions.pop_front()
        } else {
            None
        }
    }

    /// Deadline of the head, if any
    pub fn next_deadline(&self) -> Option<i64> {
        self.actions.front().map(|a| a.deadline)
    }

    /// Number of pending actions
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether no actions are pending
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Iterate pending actions in dispatch order
    pub fn iter(&self) -> impl Iterator<Item = &Action> {
        self.actions.iter()
    }
}
