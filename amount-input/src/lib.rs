//! # Amount Input Library
//!
//! Keeps a typed amount, a percentage slider and preset chips in sync, and
//! forwards the settled amount to a callback at most once per burst of edits.
//!
//! Time is injected through [`Clock`]: a pending commit is plain data with a
//! deadline, fired by [`AmountInput::poll`] (or by [`Debounced::poll`] for a
//! bare debounced value). Hosts schedule a timer at [`AmountInput::deadline`].
//!
//! ## Example
//!
//! ```rust
//! use std::sync::{Arc, Mutex};
//! use amount_input::{AmountInput, InputConfig, ManualClock};
//! use chrono::Duration;
//!
//! let clock = ManualClock::default();
//! let emitted = Arc::new(Mutex::new(Vec::new()));
//! let sink = emitted.clone();
//!
//! let mut input = AmountInput::new(InputConfig::default(), None, Arc::new(clock.clone()), move |value| {
//!     sink.lock().unwrap().push(value);
//! })
//! .unwrap();
//!
//! input.type_text("1");
//! input.type_text("12");
//! clock.advance(Duration::milliseconds(200));
//! input.poll();
//!
//! assert_eq!(emitted.lock().unwrap().len(), 1);
//! ```

pub mod chips;
pub mod clock;
pub mod debounce;
pub mod range;
pub mod sanitize;
pub mod synchronizer;
pub mod types;

pub use chips::*;
pub use clock::*;
pub use debounce::*;
pub use range::*;
pub use sanitize::*;
pub use synchronizer::*;
pub use types::*;

pub use amount_format::{AmountError, Decimal};

use thiserror::Error;

/// Error type for input construction and configuration
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("invalid input config: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Amount(#[from] AmountError),
}

/// Result type alias for input operations
pub type InputResult<T> = Result<T, InputError>;
