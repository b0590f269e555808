//! Macros for declaring machine states.

/// Declare a state enum and its `State` implementation.
///
/// Every variant's name doubles as its log name.
///
/// # Example
///
/// ```
/// use nec_node::state_enum;
/// use nec_node::core::State;
///
/// state_enum! {
///     pub enum LinkState {
///         Down,
///         Up,
///     }
/// }
///
/// assert_eq!(LinkState::Down.name(), "Down");
/// ```
#[macro_export]
macro_rules! state_enum {
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident {
            $(
                $(#[$variant_meta:meta])*
                $variant:ident
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Copy, PartialEq, Eq, Debug, serde::Serialize, serde::Deserialize)]
        $vis enum $name {
            $(
                $(#[$variant_meta])*
                $variant
            ),*
        }

        impl $crate::core::State for $name {
            fn name(&self) -> &str {
                match self {
                    $(Self::$variant => stringify!($variant)),*
                }
            }
        }
    };
}

#[cfg(test)]
mod tests {
    use crate::core::State;

    state_enum! {
        enum TestState {
            Off,
            Idle,
            Wait,
        }
    }

    #[test]
    fn state_enum_macro_generates_trait() {
        assert_eq!(TestState::Off.name(), "Off");
        assert_eq!(TestState::Idle.name(), "Idle");
        assert_eq!(TestState::Wait.name(), "Wait");
    }

    #[test]
    fn state_enum_supports_visibility_and_docs() {
        state_enum! {
            /// Documented states
            pub enum PublicState {
                /// First
                A,
                B,
            }
        }

        let state = PublicState::A;
        let copy = state;
        assert_eq!(state, copy);
        assert_eq!(PublicState::B.name(), "B");
    }

    #[test]
    fn state_enum_serializes_by_name() {
        let json = serde_json::to_string(&TestState::Wait).unwrap();
        assert_eq!(json, "\"Wait\"");
    }
}
