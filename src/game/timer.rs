//! One-shot Transition Timer
//!
//! Delayed transitions are entries in a queue keyed by a [`TimerToken`].
//! Each entry fires at most once: polling removes it, and a cancelled token
//! can never fire. Tokens are never reused within one timer.

use std::collections::BTreeMap;
use serde::{Serialize, Deserialize};

/// Handle to one scheduled entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct TimerToken(pub u64);

#[derive(Clone, Debug, PartialEq, Eq)]
struct Entry<T> {
    due_tick: u32,
    payload: T,
}

/// Queue of delayed one-shot payloads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionTimer<T> {
    entries: BTreeMap<TimerToken, Entry<T>>,
    next_token: u64,
}

impl<T> Default for TransitionTimer<T> {
    fn default() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_token: 1,
        }
    }
}

impl<T> TransitionTimer<T> {
    /// Create an empty timer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule `payload` to fire `delay_ticks` after `now`.
    pub fn schedule(&mut self, now: u32, delay_ticks: u32, payload: T) -> TimerToken {
        let token = TimerToken(self.next_token);
        self.next_token += 1;
        self.entries.insert(
            token,
            Entry {
                due_tick: now.saturating_add(delay_ticks),
                payload,
            },
        );
        token
    }

    /// Cancel an entry. Returns false if it already fired or was cancelled.
    pub fn cancel(&mut self, token: TimerToken) -> bool {
        self.entries.remove(&token).is_some()
    }

    /// Cancel everything outstanding.
    pub fn cancel_all(&mut self) {
        self.entries.clear();
    }

    /// True if `token` has neither fired nor been cancelled.
    pub fn is_pending(&self, token: TimerToken) -> bool {
        self.entries.contains_key(&token)
    }

    /// Tick at which `token` fires, if still pending.
    pub fn due_tick(&self, token: TimerToken) -> Option<u32> {
        self.entries.get(&token).map(|e| e.due_tick)
    }

    /// Number of outstanding entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing is outstanding.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Remove and return every entry due at or before `now`, ordered by due
    /// tick and then by scheduling order.
    pub fn poll(&mut self, now: u32) -> Vec<(TimerToken, T)> {
        let due: Vec<TimerToken> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.due_tick <= now)
            .map(|(token, _)| *token)
            .collect();

        let mut fired: Vec<(u32, TimerToken, T)> = due
            .into_iter()
            .filter_map(|token| {
                self.entries
                    .remove(&token)
                    .map(|entry| (entry.due_tick, token, entry.payload))
            })
            .collect();

        fired.sort_by_key(|(due_tick, token, _)| (*due_tick, *token));
        fired.into_iter().map(|(_, token, payload)| (token, payload)).collect()
    }
}
