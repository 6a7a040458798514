//! Per-window draw queue
//!
//! Holds commands that still have to be applied to a window's surface:
//! `incoming` collects batches received since the last frame started,
//! `pending` holds commands that failed (and everything queued behind them)
//! and must be retried before anything newer.

use std::collections::VecDeque;

use log::debug;

/// Where the queue is in its per-frame cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueState {
    /// Nothing pending between frames
    #[default]
    Idle,
    /// Frame in progress, retrying pending commands
    DrainingPending,
    /// Frame in progress, applying a fresh batch
    ApplyingNew,
    /// Between frames with commands left pending
    Stalled,
    /// The window was closed; terminal
    Disposed,
}

impl QueueState {
    /// Check if a frame is being processed
    pub fn in_frame(&self) -> bool {
        matches!(self, QueueState::DrainingPending | QueueState::ApplyingNew)
    }
}

/// Pending and incoming draw commands for one window
#[derive(Debug)]
pub struct DrawQueue<C> {
    pending: VecDeque<C>,
    incoming: Vec<C>,
    state: QueueState,
}

impl<C> DrawQueue<C> {
    /// Create an empty queue
    pub fn new() -> Self {
        Self {
            pending: VecDeque::new(),
            incoming: Vec::new(),
            state: QueueState::Idle,
        }
    }

    /// Queue a batch for the next frame. Returns false if the queue is disposed.
    pub fn enqueue<I>(&mut self, batch: I) -> bool
    where
        I: IntoIterator<Item = C>,
    {
        if self.state == QueueState::Disposed {
            return false;
        }
        self.incoming.extend(batch);
        true
    }

    /// Current state
    pub fn state(&self) -> QueueState {
        self.state
    }

    /// Commands waiting to be retried
    pub fn pending_len(&self) -> usize {
        self.pending.len()
    }

    /// Commands received since the last frame started
    pub fn incoming_len(&self) -> usize {
        self.incoming.len()
    }

    /// Check if anything is waiting to be retried
    pub fn has_pending(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Check if the queue was disposed
    pub fn is_disposed(&self) -> bool {
        self.state == QueueState::Disposed
    }

    /// Drop everything and refuse further work
    pub fn dispose(&mut self) {
        if self.state == QueueState::Disposed {
            return;
        }
        debug!(
            "Disposing draw queue ({} pending, {} incoming dropped)",
            self.pending.len(),
            self.incoming.len()
        );
        self.pending.clear();
        self.incoming.clear();
        self.state = QueueState::Disposed;
    }

    /// Detach the incoming batch for the frame that is starting. Anything
    /// enqueued afterwards belongs to the next frame.
    pub(crate) fn take_incoming(&mut self) -> Vec<C> {
        std::mem::take(&mut self.incoming)
    }

    /// Append commands behind whatever is already pending
    pub(crate) fn defer<I>(&mut self, commands: I)
    where
        I: IntoIterator<Item = C>,
    {
        self.pending.extend(commands);
    }

    pub(crate) fn front_pending(&self) -> Option<&C> {
        self.pending.front()
    }

    pub(crate) fn pop_pending(&mut self) -> Option<C> {
        self.pending.pop_front()
    }

    pub(crate) fn set_state(&mut self, state: QueueState) {
        if self.state != QueueState::Disposed {
            self.state = state;
        }
    }

    /// Settle the between-frames state from the pending contents
    pub(crate) fn finish_frame(&mut self) {
        let next = if self.pending.is_empty() {
            QueueState::Idle
        } else {
            QueueState::Stalled
        };
        self.set_state(next);
    }
}

impl<C> Default for DrawQueue<C> {
    fn default() -> Self {
        Self::new()
    }
}
