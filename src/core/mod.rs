//! Core state machine types and logic.
//!
//! This module contains the table-driven engine every protocol component is
//! built on:
//! - State definitions via the `State` trait
//! - Guard predicates and actions stored as function pointers
//! - Transition rows and the interpreter that fires them
//!
//! A component owns a [`FiniteStateMachine`] next to its own context and
//! calls [`FiniteStateMachine::fire`] with that context. Tables are `const`
//! slices, so binding one never allocates.

mod error;
mod guard;
mod machine;
mod state;

pub use error::FsmError;
pub use guard::{Action, Guard, TransitionRule};
pub use machine::{FiniteStateMachine, StepResult};
pub use state::State;
