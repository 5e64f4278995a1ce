//! Cancel-and-reschedule timer tokens
//!
//! The viewer never owns a timer. Scheduling hands the host a token and a
//! delay; the host reports the token back when the delay elapses, and only
//! the most recently issued token is honoured.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TimerToken(u64);

#[derive(Debug)]
pub struct Debounce {
    delay: Duration,
    next_id: u64,
    pending: Option<TimerToken>,
}

impl Debounce {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            next_id: 1,
            pending: None,
        }
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn pending(&self) -> Option<TimerToken> {
        self.pending
    }

    /// Issue a new token, superseding any pending one
    pub fn schedule(&mut self) -> TimerToken {
        let token = TimerToken(self.next_id);
        self.next_id += 1;
        self.pending = Some(token);
        token
    }

    /// Consume `token` if it is the pending one
    pub fn settle(&mut self, token: TimerToken) -> bool {
        if self.pending == Some(token) {
            self.pending = None;
            true
        } else {
            false
        }
    }

    pub fn cancel(&mut self) {
        self.pending = None;
    }
}
