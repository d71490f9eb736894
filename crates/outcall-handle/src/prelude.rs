//! Prelude module for convenient imports.
//!
//! ```rust,no_run
//! use outcall_handle::prelude::*;
//! ```

pub use crate::error::{BoxError, HandleError, SharedError};
pub use crate::handle::{CompletionHandle, HandleId, Interrupt, Outcome};
pub use crate::state_machine::{HandleStatus, is_terminal, validate_transition};
