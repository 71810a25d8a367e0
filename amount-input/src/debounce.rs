//! # Debounced Values
//!
//! A value whose changes reach a callback only after it has been quiet for a
//! fixed delay. The visible value always updates immediately; the callback sees
//! at most one value per burst of edits (the last one), and never a value
//! equal to the one it saw before.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use tracing::debug;

use crate::SharedClock;

type Equality<T> = Box<dyn Fn(&T, &T) -> bool + Send>;
type Callback<T> = Box<dyn FnMut(T) + Send>;

/// A value with a pending, deadline-based commit
pub struct Debounced<T> {
    value: T,
    last_committed: T,
    deadline: Option<DateTime<Utc>>,
    delay: Duration,
    clock: SharedClock,
    equals: Equality<T>,
    on_commit: Callback<T>,
}

impl<T: Clone + PartialEq + Send + 'static> Debounced<T> {
    /// Create a debounced value; `initial` is also the first suppression baseline
    pub fn new(initial: T, delay: Duration, clock: SharedClock, on_commit: impl FnMut(T) + Send + 'static) -> Self {
        Self {
            last_committed: initial.clone(),
            value: initial,
            deadline: None,
            delay,
            clock,
            equals: Box::new(|a: &T, b: &T| a == b),
            on_commit: Box::new(on_commit),
        }
    }
}

impl<T: Clone> Debounced<T> {
    /// Replace the equality used to suppress repeated commits
    pub fn with_equality(mut self, equals: impl Fn(&T, &T) -> bool + Send + 'static) -> Self {
        self.equals = Box::new(equals);
        self
    }

    pub fn value(&self) -> &T {
        &self.value
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    /// When the pending commit fires, if one is armed
    pub fn deadline(&self) -> Option<DateTime<Utc>> {
        self.deadline
    }

    pub fn is_pending(&self) -> bool {
        self.deadline.is_some()
    }

    /// Update the visible value and restart the quiet period
    pub fn set_value(&mut self, next: T) {
        self.value = next;
        let now = self.clock.now();
        self.deadline = Some(now.checked_add_signed(self.delay).unwrap_or(DateTime::<Utc>::MAX_UTC));
    }

    /// Commit right away, with `next` if given or else the current value.
    ///
    /// Returns whether the callback was invoked.
    pub fn commit_now(&mut self, next: Option<T>) -> bool {
        if let Some(next) = next {
            self.value = next;
        }
        self.deadline = None;
        self.commit()
    }

    /// Drop the pending commit, keeping the visible value
    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    /// Fire the pending commit if its deadline has passed.
    ///
    /// Returns whether the callback was invoked.
    pub fn poll(&mut self) -> bool {
        match self.deadline {
            Some(deadline) if self.clock.now() >= deadline => {
                self.deadline = None;
                self.commit()
            }
            _ => false,
        }
    }

    /// Re-initialise without calling back
    pub fn reset(&mut self, value: T) {
        self.last_committed = value.clone();
        self.value = value;
        self.deadline = None;
    }

    fn commit(&mut self) -> bool {
        if (self.equals)(&self.value, &self.last_committed) {
            return false;
        }

        debug!("committing debounced value");
        self.last_committed = self.value.clone();
        (self.on_commit)(self.value.clone());
        true
    }
}

impl<T: fmt::Debug> fmt::Debug for Debounced<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Debounced")
            .field("value", &self.value)
            .field("last_committed", &self.last_committed)
            .field("deadline", &self.deadline)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}
