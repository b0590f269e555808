//! Interpreter for priority-ordered guarded transition tables.

use crate::core::error::FsmError;
use crate::core::guard::TransitionRule;
use crate::core::state::State;

/// Result of a single `fire`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepResult<S: State> {
    /// A row fired; its action (if any) ran and the machine moved to `to`
    Transitioned { from: S, to: S },

    /// No guard matched; nothing happened
    Stayed(S),
}

impl<S: State> StepResult<S> {
    /// True when a row fired.
    pub fn is_transition(&self) -> bool {
        matches!(self, Self::Transitioned { .. })
    }
}

/// A state machine bound to a static transition table.
///
/// The machine itself holds only the current state and the table. The data
/// guards look at, and actions mutate, is passed to [`fire`](Self::fire) by
/// the component that owns both.
pub struct FiniteStateMachine<S: State, C: 'static> {
    current: S,
    table: &'static [TransitionRule<S, C>],
}

impl<S: State, C: 'static> FiniteStateMachine<S, C> {
    /// Bind a table. The initial state is the first row's `from`.
    ///
    /// # Panics
    ///
    /// Panics if the table is empty. Use [`try_new`](Self::try_new) for
    /// tables that are not known at compile time.
    pub fn new(table: &'static [TransitionRule<S, C>]) -> Self {
        match Self::try_new(table) {
            Ok(machine) => machine,
            Err(err) => panic!("{err}"),
        }
    }

    /// Bind a table, rejecting an empty one.
    pub fn try_new(table: &'static [TransitionRule<S, C>]) -> Result<Self, FsmError> {
        let first = table.first().ok_or(FsmError::EmptyTable)?;
        Ok(Self {
            current: first.from,
            table,
        })
    }

    /// Get current state (pure)
    pub fn current_state(&self) -> S {
        self.current
    }

    /// Force the current state.
    ///
    /// Used by components that restart a machine from a known state at the
    /// beginning of each job rather than carrying state across jobs.
    pub fn set_state(&mut self, state: S) {
        self.current = state;
    }

    /// The bound table.
    pub fn table(&self) -> &'static [TransitionRule<S, C>] {
        self.table
    }

    /// Perform at most one transition.
    ///
    /// Rows whose `from` matches the current state are tried in table order.
    /// The first one whose guard holds runs its action and moves the machine
    /// to its `to` state. If no guard holds the machine stays where it is;
    /// that is the normal "nothing to do yet" outcome, not an error.
    pub fn fire(&mut self, ctx: &mut C) -> StepResult<S> {
        let from = self.current;
        let Some(rule) = self.table.iter().find(|rule| rule.applies(from, ctx)) else {
            return StepResult::Stayed(from);
        };

        if let Some(action) = rule.action {
            action(ctx);
        }
        self.current = rule.to;
        log::trace!("fsm: {} -> {}", from.name(), rule.to.name());

        StepResult::Transitioned { from, to: rule.to }
    }

    /// Tear the machine down.
    ///
    /// The engine owns nothing beyond its state; components release their own
    /// collaborators in their `destroy`.
    pub fn destroy(self) {}
}
