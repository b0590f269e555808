//! Core State trait for table-driven machines.
//!
//! States are small `Copy` identifiers. The engine only compares them and
//! asks for their name when logging a transition.

use std::fmt::Debug;

/// Trait for state machine states.
///
/// All methods are pure. A state is a plain tag; everything a guard needs to
/// look at lives in the owning component's context, not in the state.
///
/// # Required Traits
///
/// - `Copy`: states are stored by value in every transition row
/// - `PartialEq`: the engine matches rows by comparing states
/// - `Debug`: states must be debuggable for diagnostics
///
/// # Example
///
/// ```rust
/// use nec_node::core::State;
///
/// #[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// enum LinkState {
///     Down,
///     Up,
/// }
///
/// impl State for LinkState {
///     fn name(&self) -> &str {
///         match self {
///             Self::Down => "Down",
///             Self::Up => "Up",
///         }
///     }
/// }
///
/// assert_eq!(LinkState::Up.name(), "Up");
/// ```
pub trait State: Copy + PartialEq + Debug + Send + Sync + 'static {
    /// Get the state's name for display/logging.
    fn name(&self) -> &str;
}
