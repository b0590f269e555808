//! Errors raised when binding a transition table.

use thiserror::Error;

/// Errors that can occur when constructing a state machine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FsmError {
    #[error("Transition table is empty. A table needs at least one row to define the initial state")]
    EmptyTable,
}
