//! # Completion Handles
//!
//! **Future-like handles for the eventual result of an asynchronously dispatched call.**
//!
//! A [`CompletionHandle`] is created pending, written once by whoever runs the
//! work, and read by any number of callers. Its state machine is monotonic:
//!
//! ```text
//! Pending -> Completed | Failed | Cancelled
//! ```
//!
//! ## Quick Start
//!
//! ```rust
//! use outcall_handle::prelude::*;
//!
//! let handle = CompletionHandle::new();
//! assert!(handle.complete(21 * 2));
//! assert!(!handle.complete(0)); // already terminal, no-op
//! assert_eq!(handle.wait_blocking().unwrap(), 42);
//! ```
//!
//! ## Architecture
//!
//! - **`CompletionHandle<T>`**: shared state, waiting, continuations, cancellation
//! - **`HandleStatus`**: serializable, value-free status
//! - **State machine**: `validate_transition` / `is_terminal`
//! - **`Interrupt`**: seam through which `cancel(true)` reaches the executing side

pub mod error;
pub mod handle;
pub mod prelude;
pub mod state_machine;

pub use error::{BoxError, HandleError, SharedError};
pub use handle::{CompletionHandle, HandleId, Interrupt, Outcome};
pub use state_machine::{HandleStatus, is_terminal, validate_transition};
