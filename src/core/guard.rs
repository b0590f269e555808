//! Guard predicates, actions and the transition rows built from them.
//!
//! Guards are pure boolean functions over a component's context. Actions are
//! the side effects a row performs when it is taken. Both are stored as plain
//! function pointers, so a whole table can live in a `const`.

use super::state::State;

/// Pure predicate that decides whether a row fires.
pub type Guard<C> = fn(&C) -> bool;

/// Side effect executed when a row fires.
pub type Action<C> = fn(&mut C);

/// One row of a transition table: `(from, guard, to, action?)`.
///
/// # Example
///
/// ```rust
/// use nec_node::core::{State, TransitionRule};
///
/// #[derive(Clone, Copy, PartialEq, Eq, Debug)]
/// enum Lamp { Off, On }
///
/// impl State for Lamp {
///     fn name(&self) -> &str {
///         match self {
///             Self::Off => "Off",
///             Self::On => "On",
///         }
///     }
/// }
///
/// struct Switch { pressed: bool, toggles: u32 }
///
/// fn is_pressed(s: &Switch) -> bool { s.pressed }
/// fn count(s: &mut Switch) { s.toggles += 1; }
///
/// let rule = TransitionRule::new(Lamp::Off, is_pressed, Lamp::On, Some(count));
///
/// let switch = Switch { pressed: true, toggles: 0 };
/// assert!(rule.applies(Lamp::Off, &switch));
/// assert!(!rule.applies(Lamp::On, &switch));
/// ```
pub struct TransitionRule<S: State, C: 'static> {
    /// The state this row is considered from
    pub from: S,
    /// Predicate gating the row
    pub guard: Guard<C>,
    /// The state entered when the row fires
    pub to: S,
    /// Optional side effect run before entering `to`
    pub action: Option<Action<C>>,
}

impl<S: State, C: 'static> TransitionRule<S, C> {
    /// Build a row.
    pub const fn new(from: S, guard: Guard<C>, to: S, action: Option<Action<C>>) -> Self {
        Self {
            from,
            guard,
            to,
            action,
        }
    }

    /// Check if this row fires from `current` given the context (pure).
    pub fn applies(&self, current: S, ctx: &C) -> bool {
        if current != self.from {
            return false;
        }

        (self.guard)(ctx)
    }
}

impl<S: State, C: 'static> Clone for TransitionRule<S, C> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<S: State, C: 'static> Copy for TransitionRule<S, C> {}
